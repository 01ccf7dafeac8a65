//! JobGraph Match — ranks jobs against a resume by skill overlap.

pub mod matcher;
pub mod types;

pub use matcher::SkillMatcher;
pub use types::ScoredJob;
