//! Capability dispatch — routes each candidate message to one of the four
//! interview capabilities via model tool selection.
//!
//! The capability set is closed: the model picks a tool name, we validate it
//! against the enum, and anything outside the set is answered with a fixed
//! message rather than executed. Selection failures get exactly one retry
//! with a firmer instruction before falling back.

use std::future::Future;

use serde_json::json;
use tracing::{error, warn};

use crate::interview::evaluator;
use crate::interview::prompts::{
    dispatch_system, ANALYSIS_UNAVAILABLE, DISPATCH_RETRY_SUFFIX, DISPATCH_USER_MESSAGE, FAREWELL,
    NO_TOOL_SELECTED, TURN_FAILURE_APOLOGY,
};
use crate::interview::recommendation;
use crate::interview::session::SessionState;
use crate::interview::state_machine;
use crate::llm_client::{LlmClient, LlmError, ToolSelection, ToolSpec};
use crate::models::chat::trailing_window;

/// Transcript window given to the selection call.
const DISPATCH_WINDOW: usize = 4;

/// The closed set of actions the orchestrator may take on a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ContinueInterview,
    AnalyzePerformance,
    GenerateRecommendation,
    EndConversation,
}

impl Capability {
    pub const ALL: [Capability; 4] = [
        Capability::ContinueInterview,
        Capability::AnalyzePerformance,
        Capability::GenerateRecommendation,
        Capability::EndConversation,
    ];

    /// Wire name used in the tool catalog and selection responses.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Capability::ContinueInterview => "continue_interview",
            Capability::AnalyzePerformance => "analyze_performance",
            Capability::GenerateRecommendation => "generate_recommendation",
            Capability::EndConversation => "end_conversation",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            Capability::ContinueInterview => {
                "Continue the interview with the next casual-chat turn or screening question. \
                 Use this whenever the candidate answers a question or makes small talk."
            }
            Capability::AnalyzePerformance => {
                "Evaluate the candidate's answers and produce the performance analysis. \
                 Use this only when the candidate explicitly asks for their results or feedback."
            }
            Capability::GenerateRecommendation => {
                "Produce the final hiring recommendation report. Use this only when the \
                 candidate or recruiter explicitly asks for the final recommendation."
            }
            Capability::EndConversation => {
                "Close the conversation. Use this only when the candidate says goodbye or \
                 clearly wants to stop."
            }
        }
    }

    /// Validates a model-provided tool name against the closed set.
    pub fn from_wire(name: &str) -> Option<Capability> {
        Self::ALL.iter().copied().find(|c| c.wire_name() == name)
    }

    /// The tool catalog handed to the selection call. All capabilities take
    /// no arguments; routing is the whole decision.
    pub fn catalog() -> Vec<ToolSpec> {
        Self::ALL
            .iter()
            .map(|c| ToolSpec {
                name: c.wire_name(),
                description: c.description(),
                input_schema: json!({
                    "type": "object",
                    "properties": {},
                    "required": []
                }),
            })
            .collect()
    }
}

fn unknown_capability_message(name: &str) -> String {
    let valid: Vec<&str> = Capability::ALL.iter().map(|c| c.wire_name()).collect();
    format!(
        "I can't do that right now ('{name}' is not something I support). \
         I can: {}.",
        valid.join(", ")
    )
}

/// Two-attempt selection policy: one call, and on a legitimate none-selected
/// result exactly one retry. Provider errors are never retried here — the
/// client has its own backoff. `attempt(true)` marks the retry.
async fn attempt_selection<F, Fut>(mut attempt: F) -> Result<Option<ToolSelection>, LlmError>
where
    F: FnMut(bool) -> Fut,
    Fut: Future<Output = Result<Option<ToolSelection>, LlmError>>,
{
    match attempt(false).await {
        Ok(None) => attempt(true).await,
        first => first,
    }
}

/// Selects a capability for the latest candidate message, retrying once when
/// the model fails to pick a tool.
async fn select_capability(llm: &LlmClient, session: &SessionState) -> Result<Capability, String> {
    let system = dispatch_system(session.phase, session.analysis_done);
    let window = trailing_window(&session.transcript, DISPATCH_WINDOW).to_vec();
    let tools = Capability::catalog();
    let session_id = session.id;

    let result = attempt_selection(|is_retry| {
        let message = if is_retry {
            warn!("Session {session_id}: no tool selected, retrying once");
            format!("{DISPATCH_USER_MESSAGE}{DISPATCH_RETRY_SUFFIX}")
        } else {
            DISPATCH_USER_MESSAGE.to_owned()
        };
        let system = &system;
        let window = &window;
        let tools = &tools;
        async move { llm.select_tool(system, window, &message, tools).await }
    })
    .await;

    match result {
        Ok(Some(sel)) => match Capability::from_wire(&sel.name) {
            Some(cap) => Ok(cap),
            None => {
                warn!("Session {session_id}: model selected unknown tool '{}'", sel.name);
                Err(unknown_capability_message(&sel.name))
            }
        },
        Ok(None) => Err(NO_TOOL_SELECTED.to_owned()),
        Err(e) => {
            error!("Capability selection failed: {e}");
            Err(TURN_FAILURE_APOLOGY.to_owned())
        }
    }
}

/// Executes the selected capability against the session, returning the
/// user-facing reply.
async fn route(llm: &LlmClient, session: &mut SessionState, capability: Capability) -> String {
    match capability {
        Capability::ContinueInterview => state_machine::take_interview(llm, session).await,

        Capability::AnalyzePerformance => {
            if session.analysis_done {
                // Idempotent: re-requests return the stored report.
                session
                    .analysis_report
                    .clone()
                    .unwrap_or_else(|| ANALYSIS_UNAVAILABLE.to_owned())
            } else {
                evaluator::run_and_store(llm, session).await
            }
        }

        Capability::GenerateRecommendation => {
            match recommendation::generate_recommendation(llm, session).await {
                Ok(report) => report,
                Err(e) => {
                    error!("Recommendation generation failed: {e}");
                    TURN_FAILURE_APOLOGY.to_owned()
                }
            }
        }

        Capability::EndConversation => FAREWELL.to_owned(),
    }
}

/// Produces the assistant reply for the latest candidate message: picks a
/// capability, routes to it, returns user-facing text.
pub async fn respond(llm: &LlmClient, session: &mut SessionState) -> String {
    match select_capability(llm, session).await {
        Ok(capability) => route(llm, session, capability).await,
        Err(message) => message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::session::fixtures;

    #[test]
    fn test_wire_names_round_trip() {
        for cap in Capability::ALL {
            assert_eq!(Capability::from_wire(cap.wire_name()), Some(cap));
        }
    }

    #[test]
    fn test_unknown_wire_name_is_rejected() {
        assert_eq!(Capability::from_wire("delete_candidate"), None);
        assert_eq!(Capability::from_wire(""), None);
        assert_eq!(Capability::from_wire("Continue_Interview"), None);
    }

    #[test]
    fn test_catalog_covers_all_capabilities() {
        let catalog = Capability::catalog();
        assert_eq!(catalog.len(), 4);
        let names: Vec<&str> = catalog.iter().map(|t| t.name).collect();
        assert!(names.contains(&"continue_interview"));
        assert!(names.contains(&"analyze_performance"));
        assert!(names.contains(&"generate_recommendation"));
        assert!(names.contains(&"end_conversation"));
    }

    #[test]
    fn test_catalog_schemas_take_no_arguments() {
        for tool in Capability::catalog() {
            assert_eq!(tool.input_schema["type"], "object");
            assert!(tool.input_schema["properties"]
                .as_object()
                .is_some_and(|p| p.is_empty()));
        }
    }

    #[test]
    fn test_unknown_capability_message_lists_valid_set() {
        let msg = unknown_capability_message("drop_tables");
        assert!(msg.contains("drop_tables"));
        for cap in Capability::ALL {
            assert!(msg.contains(cap.wire_name()));
        }
    }

    #[tokio::test]
    async fn test_empty_selection_then_end_conversation_routes_to_farewell() {
        // First attempt yields no selection, the retry picks
        // end_conversation; the turn must end with the farewell, not an error.
        let mut attempts: Vec<bool> = Vec::new();
        let selection = attempt_selection(|is_retry| {
            attempts.push(is_retry);
            let selected = is_retry.then(|| ToolSelection {
                name: "end_conversation".to_owned(),
            });
            async move { Ok(selected) }
        })
        .await
        .unwrap()
        .unwrap();
        assert_eq!(attempts, vec![false, true]);

        let capability = Capability::from_wire(&selection.name).unwrap();
        assert_eq!(capability, Capability::EndConversation);

        let llm = LlmClient::new("test-key".to_owned());
        let mut session = fixtures::session();
        assert_eq!(route(&llm, &mut session, capability).await, FAREWELL);
    }

    #[tokio::test]
    async fn test_successful_first_selection_is_not_retried() {
        let mut calls = 0u32;
        let selection = attempt_selection(|_| {
            calls += 1;
            async move {
                Ok(Some(ToolSelection {
                    name: "continue_interview".to_owned(),
                }))
            }
        })
        .await
        .unwrap()
        .unwrap();
        assert_eq!(calls, 1);
        assert_eq!(selection.name, "continue_interview");
    }

    #[tokio::test]
    async fn test_two_empty_selections_stay_empty() {
        let result =
            attempt_selection(|_| async { Ok::<Option<ToolSelection>, LlmError>(None) }).await;
        assert!(matches!(result, Ok(None)));
    }

    #[tokio::test]
    async fn test_provider_error_is_not_retried_by_the_policy() {
        let mut calls = 0u32;
        let result = attempt_selection(|_| {
            calls += 1;
            async move { Err::<Option<ToolSelection>, _>(LlmError::EmptyContent) }
        })
        .await;
        assert_eq!(calls, 1);
        assert!(result.is_err());
    }
}
