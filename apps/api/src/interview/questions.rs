//! Screening-question generation — one structured LLM call at session init,
//! validated and persisted to disk for audit.
//!
//! Generation failure is non-fatal: the set stays empty and the state machine
//! treats the session as "questions not generated" until a set exists.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::interview::prompts::{QUESTION_GEN_PROMPT_TEMPLATE, QUESTION_GEN_SYSTEM};
use crate::llm_client::LlmClient;
use crate::models::candidate::CandidateProfile;

/// Number of questions per screening set — one per section.
pub const QUESTION_COUNT: usize = 5;

/// The five fixed sections, in presentation order.
pub const SECTIONS: [&str; QUESTION_COUNT] = [
    "Technical Skills",
    "Problem Solving",
    "Experience & Projects",
    "Behavioral",
    "Role-Specific",
];

/// One generated screening question with its marking guidance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningQuestion {
    pub section: String,
    pub question_number: u32,
    pub question: String,
    pub expected_answer_points: Vec<String>,
    pub evaluation_criteria: String,
    pub max_score: u32,
}

/// The structured-output wrapper the model must return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningQuestionSet {
    pub screening_questions: Vec<ScreeningQuestion>,
}

/// Validates a generated set: exactly 5 questions, numbered 1..=5, with all
/// five sections present exactly once.
pub fn validate_question_set(questions: &[ScreeningQuestion]) -> Result<(), String> {
    if questions.len() != QUESTION_COUNT {
        return Err(format!(
            "expected {QUESTION_COUNT} questions, got {}",
            questions.len()
        ));
    }

    let mut numbers: Vec<u32> = questions.iter().map(|q| q.question_number).collect();
    numbers.sort_unstable();
    if numbers != [1, 2, 3, 4, 5] {
        return Err(format!("question numbers must be 1..=5, got {numbers:?}"));
    }

    for section in SECTIONS {
        let count = questions.iter().filter(|q| q.section == section).count();
        if count != 1 {
            return Err(format!(
                "section '{section}' must appear exactly once, found {count}"
            ));
        }
    }

    Ok(())
}

/// Generates the screening-question set from profile + resume + JD.
/// Any of the inputs may be empty; the prompt degrades to a general role.
pub async fn generate_questions(
    llm: &LlmClient,
    profile: Option<&CandidateProfile>,
    candidate_summary: &str,
    resume_text: &str,
    jd_text: &str,
) -> anyhow::Result<Vec<ScreeningQuestion>> {
    let profile_json = profile
        .map(|p| serde_json::to_string_pretty(p).unwrap_or_default())
        .unwrap_or_else(|| "No extracted profile available".to_owned());

    let prompt = QUESTION_GEN_PROMPT_TEMPLATE
        .replace("{candidate_summary}", candidate_summary)
        .replace("{profile_json}", &profile_json)
        .replace(
            "{resume_text}",
            if resume_text.is_empty() {
                "No resume details provided"
            } else {
                resume_text
            },
        )
        .replace(
            "{jd_text}",
            if jd_text.is_empty() {
                "General technical role"
            } else {
                jd_text
            },
        );

    let set: ScreeningQuestionSet = llm.call_json(QUESTION_GEN_SYSTEM, &[], &prompt, 0.7).await?;

    validate_question_set(&set.screening_questions)
        .map_err(|e| anyhow::anyhow!("generated question set failed validation: {e}"))?;

    debug!(
        "Generated {} screening questions",
        set.screening_questions.len()
    );
    Ok(set.screening_questions)
}

/// Writes a generated set to `<dir>/screening_questions_<name>_<timestamp>.json`.
/// One file per generation event, never overwritten — the audit trail outlives
/// the session.
pub async fn save_question_set(
    dir: &Path,
    candidate_name: &str,
    position: &str,
    years_experience: u32,
    questions: &[ScreeningQuestion],
) -> std::io::Result<PathBuf> {
    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
    let filename = format!(
        "screening_questions_{}_{timestamp}.json",
        sanitize_filename(candidate_name)
    );
    let path = dir.join(filename);

    let record = json!({
        "candidate_info": {
            "name": candidate_name,
            "position": position,
            "experience": years_experience,
            "generated_at": timestamp.to_string(),
        },
        "questions": questions,
    });

    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(&path, serde_json::to_vec_pretty(&record)?).await?;
    info!("Screening questions saved to {}", path.display());
    Ok(path)
}

/// Keeps filenames portable: alphanumerics pass through, everything else maps to '_'.
fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "candidate".to_owned()
    } else {
        cleaned
    }
}
