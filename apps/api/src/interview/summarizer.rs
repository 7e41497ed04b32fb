//! Resume summarizer — one structured LLM call turning raw resume text into a
//! `CandidateProfile` at session init.

use tracing::warn;

use crate::interview::prompts::{summary_prompt, SUMMARY_SYSTEM};
use crate::llm_client::{LlmClient, LlmError};
use crate::models::candidate::CandidateProfile;

/// Resumes shorter than this are treated as unreadable extractions and skipped.
pub const MIN_RESUME_CHARS: usize = 100;

/// Extracts a structured profile from resume text.
/// Returns `Ok(None)` without calling the model when the text is too short to
/// be a real resume.
pub async fn summarize_resume(
    llm: &LlmClient,
    resume_text: &str,
) -> Result<Option<CandidateProfile>, LlmError> {
    if resume_text.len() < MIN_RESUME_CHARS {
        warn!(
            "Resume text too short to summarize ({} chars)",
            resume_text.len()
        );
        return Ok(None);
    }

    let profile: CandidateProfile = llm
        .call_json(SUMMARY_SYSTEM, &[], &summary_prompt(resume_text), 0.5)
        .await?;
    Ok(Some(profile))
}
