//! Candidate data models — the intake form record and the LLM-extracted profile.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A submitted intake form, as persisted to the submissions log.
/// All fields come straight from the candidate form; none are LLM-derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub session_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub current_location: String,
    #[serde(default)]
    pub ready_to_relocate: bool,
    #[serde(default)]
    pub institute: Option<String>,
    #[serde(default)]
    pub major: Option<String>,
    #[serde(default)]
    pub current_company: Option<String>,
    #[serde(default)]
    pub current_title: Option<String>,
    #[serde(default)]
    pub years_experience: u32,
    pub linkedin: String,
    pub github: String,
    #[serde(default)]
    pub portfolio: Option<String>,
    pub position_applied: String,
    /// Expected salary in LPA.
    pub expected_salary: u32,
    pub tech_stack: String,
    pub submission_date: NaiveDate,
}

impl CandidateRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Structured profile extracted from raw resume text by the summarizer.
/// Every field is optional — the model sets `null` for anything missing or
/// unclear, and callers must tolerate a fully empty profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub portfolio_url: Option<String>,

    #[serde(default)]
    pub institute: Option<String>,
    #[serde(default)]
    pub degree: Option<String>,
    #[serde(default)]
    pub graduation_year: Option<i32>,
    #[serde(default)]
    pub gpa: Option<f64>,

    #[serde(default)]
    pub total_experience_years: Option<f64>,
    #[serde(default)]
    pub experiences: Option<Vec<String>>,

    #[serde(default)]
    pub tech_stack: Option<Vec<String>>,
    #[serde(default)]
    pub programming_languages: Option<Vec<String>>,
    #[serde(default)]
    pub tools_frameworks: Option<Vec<String>>,

    #[serde(default)]
    pub projects: Option<Vec<String>>,

    #[serde(default)]
    pub certifications: Option<Vec<String>>,
    #[serde(default)]
    pub publications: Option<Vec<String>>,
    #[serde(default)]
    pub languages: Option<Vec<String>>,
}
