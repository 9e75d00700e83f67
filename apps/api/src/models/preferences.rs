use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Free-form candidate preferences for a single recommendation call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidatePreferences {
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub titles: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub industries: Vec<String>,
    #[serde(default)]
    pub min_salary: Option<u64>,
}

/// One of the five scoring axes. Declaration order is the fixed iteration order
/// used for aggregation and residual correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Skills,
    Title,
    Location,
    Industry,
    Salary,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::Skills,
        Dimension::Title,
        Dimension::Location,
        Dimension::Industry,
        Dimension::Salary,
    ];

    /// Key used in `breakdown` and `validation_details`.
    pub fn display_name(self) -> &'static str {
        match self {
            Dimension::Skills => "Skills",
            Dimension::Title => "Title",
            Dimension::Location => "Location",
            Dimension::Industry => "Industry",
            Dimension::Salary => "Salary",
        }
    }
}

/// Caller-supplied per-dimension weights. Missing keys weigh zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightVector {
    #[serde(default)]
    pub skills: f64,
    #[serde(default)]
    pub title: f64,
    #[serde(default)]
    pub location: f64,
    #[serde(default)]
    pub industry: f64,
    #[serde(default)]
    pub salary: f64,
}

impl WeightVector {
    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Skills => self.skills,
            Dimension::Title => self.title,
            Dimension::Location => self.location,
            Dimension::Industry => self.industry,
            Dimension::Salary => self.salary,
        }
    }

    pub fn total(&self) -> f64 {
        Dimension::ALL.iter().map(|d| self.get(*d)).sum()
    }

    /// Rejects negative or non-finite weights.
    pub fn validate(&self) -> Result<(), AppError> {
        for dimension in Dimension::ALL {
            let weight = self.get(dimension);
            if !weight.is_finite() || weight < 0.0 {
                return Err(AppError::Validation(format!(
                    "weight for '{}' must be a non-negative number, got {weight}",
                    dimension.display_name().to_lowercase()
                )));
            }
        }
        Ok(())
    }
}

/// Body of `POST /recommend`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecommendRequest {
    #[serde(default)]
    pub preferences: CandidatePreferences,
    #[serde(default)]
    pub weights: WeightVector,
}
