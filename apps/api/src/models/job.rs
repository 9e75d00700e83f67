use serde::{Deserialize, Serialize};

/// Posted salary band in whole rupees. `min <= max` is enforced at construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "[u64; 2]", from = "[u64; 2]")]
pub struct SalaryRange {
    min: u64,
    max: u64,
}

impl SalaryRange {
    /// Builds a range, reordering a reversed pair.
    pub fn new(a: u64, b: u64) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn min(&self) -> u64 {
        self.min
    }

    pub fn max(&self) -> u64 {
        self.max
    }
}

impl From<[u64; 2]> for SalaryRange {
    fn from([a, b]: [u64; 2]) -> Self {
        Self::new(a, b)
    }
}

impl From<SalaryRange> for [u64; 2] {
    fn from(range: SalaryRange) -> Self {
        [range.min, range.max]
    }
}

/// A single job posting from the catalog. Immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary_range: SalaryRange,
    pub industry: String,
    /// Display casing preserved; compared case-insensitively.
    pub required_skills: Vec<String>,
    pub values_promoted: Vec<String>,
    pub experience_required: String,
    pub role_level: String,
    pub employment_type: Option<String>,
    pub company_size: Option<String>,
}
