//! Job catalog: loaded once at startup from CSV and shared read-only.
//!
//! Encoded columns are decoded here so the scoring core only ever sees typed
//! `JobRecord`s:
//! - `required_skills`, `values_promoted`: `;`-separated lists
//! - `salary_range`: `[min, max]`
//! Malformed values fall back to empty lists / `[0, 0]`.

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::{JobRecord, SalaryRange};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to open catalog {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: csv::Error,
    },
}

/// One CSV row as written by the catalog generator. Every column is optional.
#[derive(Debug, Deserialize)]
struct JobCsvRow {
    job_id: Option<String>,
    title: Option<String>,
    company: Option<String>,
    location: Option<String>,
    salary_range: Option<String>,
    employment_type: Option<String>,
    company_size: Option<String>,
    industry: Option<String>,
    required_skills: Option<String>,
    values_promoted: Option<String>,
    experience_required: Option<String>,
    role_level: Option<String>,
}

impl JobCsvRow {
    fn into_record(self, row_number: usize) -> JobRecord {
        let id = self
            .job_id
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| format!("row-{row_number}"));
        let salary_range = parse_salary_range(self.salary_range.as_deref()).unwrap_or_else(|| {
            warn!(job_id = %id, raw = ?self.salary_range, "Unparsable salary_range, using [0, 0]");
            SalaryRange::default()
        });

        JobRecord {
            title: self.title.unwrap_or_default(),
            company: self.company.unwrap_or_default(),
            location: self.location.unwrap_or_default(),
            salary_range,
            industry: self.industry.unwrap_or_default(),
            required_skills: split_list(self.required_skills.as_deref()),
            values_promoted: split_list(self.values_promoted.as_deref()),
            experience_required: self.experience_required.unwrap_or_default(),
            role_level: self.role_level.unwrap_or_default(),
            employment_type: self.employment_type.filter(|s| !s.is_empty()),
            company_size: self.company_size.filter(|s| !s.is_empty()),
            id,
        }
    }
}

/// Splits a `;`-delimited list, trimming items and dropping empties.
fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(';')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}

/// Parses `[min, max]`. Missing column is `[0, 0]`; anything else malformed is `None`.
fn parse_salary_range(raw: Option<&str>) -> Option<SalaryRange> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Some(SalaryRange::default()),
        Some(raw) => raw,
    };
    if !raw.starts_with('[') {
        return None;
    }
    let pair: Vec<f64> = serde_json::from_str(raw).ok()?;
    match pair.as_slice() {
        [a, b] if a.is_finite() && b.is_finite() && *a >= 0.0 && *b >= 0.0 => {
            Some(SalaryRange::new(*a as u64, *b as u64))
        }
        _ => None,
    }
}

#[derive(Debug, Default)]
pub struct Catalog {
    jobs: Vec<Arc<JobRecord>>,
}

impl Catalog {
    pub fn from_jobs(jobs: Vec<JobRecord>) -> Self {
        Self {
            jobs: jobs.into_iter().map(Arc::new).collect(),
        }
    }

    /// Reads the catalog CSV. Rows that cannot be read are skipped with a warning.
    pub fn load_csv(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_path(path)
            .map_err(|source| CatalogError::Open {
                path: path.display().to_string(),
                source,
            })?;

        let mut jobs = Vec::new();
        for (index, row) in reader.deserialize::<JobCsvRow>().enumerate() {
            let row_number = index + 1;
            match row {
                Ok(row) => jobs.push(row.into_record(row_number)),
                Err(e) => warn!(row = row_number, "Skipping unreadable catalog row: {e}"),
            }
        }

        info!(path = %path.display(), jobs = jobs.len(), "Job catalog loaded");
        Ok(Self::from_jobs(jobs))
    }

    /// Like `load_csv`, but a missing or unreadable file yields an empty catalog.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        Self::load_csv(path).unwrap_or_else(|e| {
            tracing::error!("{e}; serving an empty catalog");
            Self::default()
        })
    }

    pub fn jobs(&self) -> &[Arc<JobRecord>] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
