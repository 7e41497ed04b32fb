//! Session state — the explicit, serializable value every interview turn
//! threads through.
//!
//! ARCHITECTURAL RULE: no component holds hidden per-session mutable state.
//! Everything a turn reads or writes lives on `SessionState`, so a session can
//! be snapshotted, inspected, or moved between processes at any turn boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::interview::questions::ScreeningQuestion;
use crate::models::candidate::{CandidateProfile, CandidateRecord};
use crate::models::chat::ChatMessage;

/// Casual-chat turns served before the structured phase.
pub const MAX_CASUAL_CHATS: u32 = 2;
/// Hard cap on user turns per session, enforced by the chat handler.
pub const MAX_INTERACTIONS: u32 = 15;
/// Wall-clock session deadline, enforced by the chat handler.
pub const SESSION_DEADLINE_SECS: i64 = 600;

/// The three ordered stages of a screening session. Transitions are
/// forward-only; a phase is never revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewPhase {
    CasualChat,
    StructuredQuestions,
    PostInterview,
}

impl InterviewPhase {
    pub fn label(&self) -> &'static str {
        match self {
            InterviewPhase::CasualChat => "casual_chat",
            InterviewPhase::StructuredQuestions => "structured_questions",
            InterviewPhase::PostInterview => "post_interview",
        }
    }
}

/// Full per-session state. Mutated only by the interview state machine, the
/// evaluator latch, and the chat handler's counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub id: Uuid,
    pub candidate: CandidateRecord,
    pub resume_text: String,
    pub jd_text: String,
    /// Extracted by the summarizer at init; absent if summarization failed.
    pub profile: Option<CandidateProfile>,

    pub phase: InterviewPhase,
    pub casual_chat_count: u32,
    pub current_question_index: usize,
    pub interaction_count: u32,

    /// Latch: set once question generation completes and validates.
    pub questions_generated: bool,
    /// Latch: set when the evaluator runs; it never runs twice.
    pub analysis_done: bool,
    /// Rendered evaluation report, kept for the recommendation generator.
    pub analysis_report: Option<String>,
    pub screening_questions: Vec<ScreeningQuestion>,

    pub transcript: Vec<ChatMessage>,
    pub started_at: DateTime<Utc>,
}

impl SessionState {
    pub fn new(candidate: CandidateRecord, resume_text: String, jd_text: String) -> Self {
        Self {
            id: candidate.session_id,
            candidate,
            resume_text,
            jd_text,
            profile: None,
            phase: InterviewPhase::CasualChat,
            casual_chat_count: 0,
            current_question_index: 0,
            interaction_count: 0,
            questions_generated: false,
            analysis_done: false,
            analysis_report: None,
            screening_questions: Vec::new(),
            transcript: Vec::new(),
            started_at: Utc::now(),
        }
    }

    pub fn elapsed_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }

    pub fn deadline_exceeded(&self) -> bool {
        self.elapsed_seconds() > SESSION_DEADLINE_SECS
    }

    pub fn interactions_exhausted(&self) -> bool {
        self.interaction_count >= MAX_INTERACTIONS
    }

    pub fn remaining_interactions(&self) -> u32 {
        MAX_INTERACTIONS.saturating_sub(self.interaction_count)
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.transcript.push(ChatMessage::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.transcript.push(ChatMessage::assistant(content));
    }

    /// Installs a validated question set and flips the generation latch.
    pub fn install_questions(&mut self, questions: Vec<ScreeningQuestion>) {
        self.screening_questions = questions;
        self.questions_generated = true;
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::candidate as test_candidate;
    use super::*;

    #[test]
    fn test_new_session_starts_in_casual_chat() {
        let session = SessionState::new(test_candidate(), String::new(), String::new());
        assert_eq!(session.phase, InterviewPhase::CasualChat);
        assert_eq!(session.casual_chat_count, 0);
        assert!(!session.questions_generated);
        assert!(!session.analysis_done);
        assert!(session.transcript.is_empty());
    }

    #[test]
    fn test_phase_ordering_is_monotonic() {
        assert!(InterviewPhase::CasualChat < InterviewPhase::StructuredQuestions);
        assert!(InterviewPhase::StructuredQuestions < InterviewPhase::PostInterview);
    }

    #[test]
    fn test_phase_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&InterviewPhase::StructuredQuestions).unwrap(),
            r#""structured_questions""#
        );
        let phase: InterviewPhase = serde_json::from_str(r#""post_interview""#).unwrap();
        assert_eq!(phase, InterviewPhase::PostInterview);
    }

    #[test]
    fn test_remaining_interactions_saturates() {
        let mut session = SessionState::new(test_candidate(), String::new(), String::new());
        session.interaction_count = MAX_INTERACTIONS + 3;
        assert_eq!(session.remaining_interactions(), 0);
        assert!(session.interactions_exhausted());
    }

    #[test]
    fn test_session_state_round_trips_through_serde() {
        let mut session = SessionState::new(test_candidate(), "resume".into(), "jd".into());
        session.push_user("hello");
        session.push_assistant("welcome");
        session.casual_chat_count = 1;

        let json = serde_json::to_string(&session).unwrap();
        let back: SessionState = serde_json::from_str(&json).unwrap();
        assert_eq!(back.phase, InterviewPhase::CasualChat);
        assert_eq!(back.casual_chat_count, 1);
        assert_eq!(back.transcript.len(), 2);
        assert_eq!(back.candidate.first_name, "Asha");
    }

    #[test]
    fn test_install_questions_flips_latch() {
        let mut session = SessionState::new(test_candidate(), String::new(), String::new());
        session.install_questions(Vec::new());
        assert!(session.questions_generated);
    }
}
