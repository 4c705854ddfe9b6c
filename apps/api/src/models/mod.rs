pub mod record;

pub use record::{
    CertificationEntry, EducationEntry, ExperienceEntry, ParsedProfile, ProjectEntry, Record,
};
