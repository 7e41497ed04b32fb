//! HTTP handlers for candidate intake and the interview conversation.

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::documents;
use crate::errors::AppError;
use crate::interview::dispatcher;
use crate::interview::prompts::greeting;
use crate::interview::questions::{generate_questions, save_question_set};
use crate::interview::session::{SessionState, MAX_INTERACTIONS};
use crate::interview::summarizer::summarize_resume;
use crate::models::candidate::{CandidateProfile, CandidateRecord};
use crate::state::{AppState, SessionStore, SharedSession};
use crate::submissions;

/// Intake form accumulated from multipart fields before validation.
#[derive(Default)]
struct IntakeForm {
    fields: std::collections::HashMap<String, String>,
    resume_filename: Option<String>,
    resume_bytes: Option<Vec<u8>>,
}

impl IntakeForm {
    fn required(&self, key: &str) -> Result<String, AppError> {
        self.fields
            .get(key)
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::Validation(format!("Missing required field '{key}'")))
    }

    fn optional(&self, key: &str) -> Option<String> {
        self.fields
            .get(key)
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
    }

    fn parse_u32(&self, key: &str) -> Result<u32, AppError> {
        match self.optional(key) {
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|_| AppError::Validation(format!("Field '{key}' must be a whole number"))),
            None => Ok(0),
        }
    }
}

#[derive(Serialize)]
pub struct IntakeResponse {
    pub session_id: Uuid,
    pub greeting: String,
    pub position: String,
}

/// POST /api/v1/candidates
///
/// Accepts the intake form plus the resume file, creates the session, and
/// kicks off resume summarization and question generation in the background.
/// The greeting is returned immediately; generation races the two casual
/// chat turns.
pub async fn handle_submit_candidate(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<IntakeResponse>), AppError> {
    let mut form = IntakeForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = match field.name() {
            Some(n) => n.to_owned(),
            None => continue,
        };

        if name == "resume" {
            form.resume_filename = field.file_name().map(str::to_owned);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read resume upload: {e}")))?;
            form.resume_bytes = Some(bytes.to_vec());
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read field '{name}': {e}")))?;
            form.fields.insert(name, value);
        }
    }

    let email = form.required("email")?;
    if !email.contains('@') || !email.contains('.') {
        return Err(AppError::Validation(
            "Field 'email' is not a valid email address".to_owned(),
        ));
    }

    let position_applied = form.required("position_applied")?;
    let jd_text = state
        .jds
        .lookup(&position_applied)
        .map(str::to_owned)
        .unwrap_or_default();
    if jd_text.is_empty() {
        warn!("No job description on file for position '{position_applied}'");
    }

    let session_id = Uuid::new_v4();
    let candidate = CandidateRecord {
        session_id,
        first_name: form.required("first_name")?,
        last_name: form.required("last_name")?,
        email,
        phone: form.required("phone")?,
        current_location: form.required("current_location")?,
        ready_to_relocate: form
            .optional("ready_to_relocate")
            .is_some_and(|v| matches!(v.as_str(), "true" | "yes" | "1")),
        institute: form.optional("institute"),
        major: form.optional("major"),
        current_company: form.optional("current_company"),
        current_title: form.optional("current_title"),
        years_experience: form.parse_u32("years_experience")?,
        linkedin: form.required("linkedin")?,
        github: form.required("github")?,
        portfolio: form.optional("portfolio"),
        position_applied: position_applied.clone(),
        expected_salary: form.parse_u32("expected_salary")?,
        tech_stack: form.required("tech_stack")?,
        submission_date: Utc::now().date_naive(),
    };

    let resume_bytes = form
        .resume_bytes
        .ok_or_else(|| AppError::Validation("Missing required file field 'resume'".to_owned()))?;
    let resume_filename = form
        .resume_filename
        .unwrap_or_else(|| "resume.pdf".to_owned());

    let resume_path = submissions::archive_resume(
        &state.config.submissions_dir,
        session_id,
        &resume_filename,
        &resume_bytes,
    )
    .await?;

    // Text extraction is CPU-bound file parsing; run it off the async runtime.
    let extract_path = resume_path.clone();
    let resume_text = tokio::task::spawn_blocking(move || documents::extract_text(&extract_path))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("extraction task panicked: {e}")))??;

    submissions::append_submission(&state.config.submissions_dir, &candidate).await?;

    let opening = greeting(&candidate.first_name, &candidate.position_applied);
    let mut session = SessionState::new(candidate, resume_text, jd_text);
    session.push_assistant(opening.clone());

    info!(
        "Created session {} for {} ({})",
        session_id,
        session.candidate.full_name(),
        position_applied
    );

    state
        .sessions
        .write()
        .await
        .insert(session_id, Arc::new(Mutex::new(session)));
    spawn_session_init(state.clone(), session_id);

    Ok((
        StatusCode::CREATED,
        Json(IntakeResponse {
            session_id,
            greeting: opening,
            position: position_applied,
        }),
    ))
}

/// Looks up a session's handle, holding the map lock only for the lookup.
async fn shared_session(store: &SessionStore, session_id: Uuid) -> Option<SharedSession> {
    store.read().await.get(&session_id).cloned()
}

/// Installs the extracted profile on the session. Kept separate from question
/// installation: the two artifacts are independently absent, so a question
/// generation failure must not lose a successfully extracted profile.
async fn install_profile(shared: &SharedSession, profile: Option<CandidateProfile>) {
    shared.lock().await.profile = profile;
}

/// Background task: summarize the resume, generate the question set, and
/// install it on the session. The session stays in casual chat until the
/// `questions_generated` latch flips; any failure here is logged and leaves
/// the latch down, which the conversation surfaces as "still preparing".
fn spawn_session_init(state: AppState, session_id: Uuid) {
    tokio::spawn(async move {
        let Some(shared) = shared_session(&state.sessions, session_id).await else {
            return;
        };

        let (resume_text, jd_text, candidate_summary, candidate_name, position, experience) = {
            let session = shared.lock().await;
            let c = &session.candidate;
            let summary = format!(
                "{}, {} years of experience, applying for {}. Tech stack: {}.",
                c.full_name(),
                c.years_experience,
                c.position_applied,
                c.tech_stack
            );
            (
                session.resume_text.clone(),
                session.jd_text.clone(),
                summary,
                c.full_name(),
                c.position_applied.clone(),
                c.years_experience,
            )
        };

        let profile = match summarize_resume(&state.llm, &resume_text).await {
            Ok(p) => p,
            Err(e) => {
                warn!("Session {session_id}: resume summarization failed: {e}");
                None
            }
        };
        install_profile(&shared, profile.clone()).await;

        let questions = match generate_questions(
            &state.llm,
            profile.as_ref(),
            &candidate_summary,
            &resume_text,
            &jd_text,
        )
        .await
        {
            Ok(q) => q,
            Err(e) => {
                error!("Session {session_id}: question generation failed: {e}");
                return;
            }
        };

        if let Err(e) = save_question_set(
            &state.config.questions_dir,
            &candidate_name,
            &position,
            experience,
            &questions,
        )
        .await
        {
            // The audit file is best-effort; the interview proceeds without it.
            warn!("Session {session_id}: failed to write question set file: {e}");
        }

        let mut session = shared.lock().await;
        session.install_questions(questions);
        info!("Session {session_id}: screening questions ready");
    });
}

#[derive(serde::Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub phase: Value,
    pub interaction_count: u32,
    pub remaining_interactions: u32,
}

/// POST /api/v1/sessions/:id/chat
pub async fn handle_chat(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let message = req.message.trim();
    if message.is_empty() {
        return Err(AppError::Validation("Message must not be empty".to_owned()));
    }

    let shared = shared_session(&state.sessions, session_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {session_id} not found")))?;
    // The map lock is already released; only this session is held while the
    // turn awaits the model.
    let mut session = shared.lock().await;

    if session.deadline_exceeded() {
        return Err(AppError::SessionLimit(
            "The interview window has closed (10 minute limit)".to_owned(),
        ));
    }
    if session.interactions_exhausted() {
        return Err(AppError::SessionLimit(format!(
            "The interaction limit of {MAX_INTERACTIONS} has been reached"
        )));
    }

    session.push_user(message);
    let reply = dispatcher::respond(&state.llm, &mut session).await;
    session.push_assistant(reply.clone());
    session.interaction_count += 1;

    Ok(Json(ChatResponse {
        reply,
        phase: json!(session.phase),
        interaction_count: session.interaction_count,
        remaining_interactions: session.remaining_interactions(),
    }))
}

#[derive(Serialize)]
pub struct SessionStatusResponse {
    pub session_id: Uuid,
    pub candidate_name: String,
    pub position: String,
    pub phase: Value,
    pub interaction_count: u32,
    pub remaining_interactions: u32,
    pub questions_ready: bool,
    pub analysis_done: bool,
    pub elapsed_seconds: i64,
}

/// GET /api/v1/sessions/:id
pub async fn handle_session_status(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionStatusResponse>, AppError> {
    let shared = shared_session(&state.sessions, session_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {session_id} not found")))?;
    let session = shared.lock().await;

    Ok(Json(SessionStatusResponse {
        session_id,
        candidate_name: session.candidate.full_name(),
        position: session.candidate.position_applied.clone(),
        phase: json!(session.phase),
        interaction_count: session.interaction_count,
        remaining_interactions: session.remaining_interactions(),
        questions_ready: session.questions_generated,
        analysis_done: session.analysis_done,
        elapsed_seconds: session.elapsed_seconds(),
    }))
}

#[derive(Serialize)]
pub struct PositionsResponse {
    pub positions: Vec<String>,
}

/// GET /api/v1/positions
pub async fn handle_list_positions(
    State(state): State<AppState>,
) -> Json<PositionsResponse> {
    Json(PositionsResponse {
        positions: state.jds.position_labels(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::prompts::common_system;
    use crate::interview::session::fixtures;

    #[tokio::test]
    async fn test_profile_survives_question_generation_failure() {
        // The init task installs the profile before generating questions, so
        // a generation failure (which bails without installing questions)
        // still leaves the profile on the session.
        let shared: SharedSession = Arc::new(Mutex::new(fixtures::session()));
        let profile = CandidateProfile {
            name: Some("Asha Patel".to_owned()),
            ..CandidateProfile::default()
        };

        install_profile(&shared, Some(profile)).await;

        let session = shared.lock().await;
        assert!(session.profile.is_some());
        assert!(!session.questions_generated);
        // The interview prompts pick up the profile even without questions.
        assert!(common_system(&session).contains("Resume summary of the candidate"));
    }

    #[tokio::test]
    async fn test_shared_session_lookup_misses_cleanly() {
        let store: SessionStore = Arc::new(tokio::sync::RwLock::new(Default::default()));
        assert!(shared_session(&store, Uuid::new_v4()).await.is_none());
    }
}
