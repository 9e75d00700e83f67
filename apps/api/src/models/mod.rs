pub mod job;
pub mod preferences;

pub use job::{JobRecord, SalaryRange};
pub use preferences::{CandidatePreferences, Dimension, RecommendRequest, WeightVector};
