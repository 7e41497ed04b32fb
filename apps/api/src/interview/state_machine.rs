//! Interview state machine — phase tracking and turn planning.
//!
//! The machine is split in two: `plan_turn` applies every transition and
//! counter mutation as a pure function of `SessionState`, and
//! `take_interview` executes the resulting plan (the only part that talks to
//! the model). All transition logic is therefore testable without a network.
//!
//! Phase transitions are forward-only: casual_chat → structured_questions →
//! post_interview. A failed model call after planning still consumes the turn;
//! counters are never rolled back.

use tracing::{error, info};

use crate::interview::evaluator;
use crate::interview::prompts::{
    casual_chat_prompt, common_system, question_prompt, INTERVIEW_COMPLETE,
    NO_FURTHER_QUESTIONS, QUESTIONS_NOT_READY, QUESTION_PRESENTER_SYSTEM, RULES_BRIEFING,
    STILL_PREPARING, STILL_PREPARING_SUFFIX, TURN_FAILURE_APOLOGY,
};
use crate::interview::session::{InterviewPhase, SessionState, MAX_CASUAL_CHATS};
use crate::llm_client::LlmClient;
use crate::models::chat::trailing_window;

/// Transcript window for conversational turns (casual chat and question
/// presentation).
const TURN_WINDOW: usize = 2;

/// What the current invocation should do. Produced by `plan_turn`; all state
/// mutation has already happened by the time a plan is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnPlan {
    /// Serve one casual-chat turn via the model.
    CasualTurn {
        chat_number: u32,
        /// The cap was just reached but generation hasn't finished.
        note_still_preparing: bool,
    },
    /// Cap reached, questions not ready — fixed holding message.
    AwaitingQuestions,
    /// Questions became ready after the cap — brief the rules and transition.
    Briefing,
    /// Structured phase entered without a question set — fixed guard message.
    QuestionsNotReady,
    /// Present the question at this index via the model.
    AskQuestion { index: usize },
    /// All questions answered — transition to post-interview and run the
    /// evaluator if it hasn't run.
    CompleteInterview { run_evaluation: bool },
    /// Post-interview: the interview tool has nothing left to ask.
    NoFurtherQuestions,
}

/// Advances the state machine by one invocation and returns the plan.
///
/// Mutations applied here:
/// - casual-chat counter increments
/// - the casual→structured and structured→post transitions
/// - the question-index increment for `AskQuestion`
pub fn plan_turn(session: &mut SessionState) -> TurnPlan {
    match session.phase {
        InterviewPhase::CasualChat => {
            if session.casual_chat_count < MAX_CASUAL_CHATS {
                session.casual_chat_count += 1;
                let chat_number = session.casual_chat_count;

                if session.casual_chat_count >= MAX_CASUAL_CHATS {
                    if session.questions_generated {
                        info!("Session {}: casual chat done, entering structured phase", session.id);
                        session.phase = InterviewPhase::StructuredQuestions;
                        return TurnPlan::CasualTurn {
                            chat_number,
                            note_still_preparing: false,
                        };
                    }
                    return TurnPlan::CasualTurn {
                        chat_number,
                        note_still_preparing: true,
                    };
                }

                TurnPlan::CasualTurn {
                    chat_number,
                    note_still_preparing: false,
                }
            } else if session.questions_generated {
                info!("Session {}: questions ready, entering structured phase", session.id);
                session.phase = InterviewPhase::StructuredQuestions;
                TurnPlan::Briefing
            } else {
                TurnPlan::AwaitingQuestions
            }
        }

        InterviewPhase::StructuredQuestions => {
            if !session.questions_generated || session.screening_questions.is_empty() {
                return TurnPlan::QuestionsNotReady;
            }

            if session.current_question_index >= session.screening_questions.len() {
                info!("Session {}: all questions served, entering post-interview", session.id);
                session.phase = InterviewPhase::PostInterview;
                return TurnPlan::CompleteInterview {
                    run_evaluation: !session.analysis_done,
                };
            }

            let index = session.current_question_index;
            session.current_question_index += 1;
            TurnPlan::AskQuestion { index }
        }

        InterviewPhase::PostInterview => TurnPlan::NoFurtherQuestions,
    }
}

/// Executes one interview turn: plans, then performs any model call the plan
/// requires. Always returns user-facing text.
pub async fn take_interview(llm: &LlmClient, session: &mut SessionState) -> String {
    match plan_turn(session) {
        TurnPlan::CasualTurn {
            chat_number,
            note_still_preparing,
        } => {
            let system = common_system(session);
            let window = trailing_window(&session.transcript, TURN_WINDOW).to_vec();
            match llm
                .call(&system, &window, &casual_chat_prompt(chat_number), 0.7)
                .await
            {
                Ok(reply) if note_still_preparing => {
                    format!("{reply}{STILL_PREPARING_SUFFIX}")
                }
                Ok(reply) => reply,
                Err(e) => {
                    error!("Casual-chat turn failed: {e}");
                    TURN_FAILURE_APOLOGY.to_owned()
                }
            }
        }

        TurnPlan::AwaitingQuestions => STILL_PREPARING.to_owned(),

        TurnPlan::Briefing => RULES_BRIEFING.to_owned(),

        TurnPlan::QuestionsNotReady => QUESTIONS_NOT_READY.to_owned(),

        TurnPlan::AskQuestion { index } => {
            // plan_turn bounds-checks before handing out an index.
            let q = &session.screening_questions[index];
            let prompt = question_prompt(&q.section, q.question_number, &q.question);
            let window = trailing_window(&session.transcript, TURN_WINDOW).to_vec();
            match llm
                .call(QUESTION_PRESENTER_SYSTEM, &window, &prompt, 0.7)
                .await
            {
                Ok(reply) => reply,
                Err(e) => {
                    error!("Question presentation failed: {e}");
                    TURN_FAILURE_APOLOGY.to_owned()
                }
            }
        }

        TurnPlan::CompleteInterview { run_evaluation } => {
            if run_evaluation {
                // The report is stored on the session for the recommendation
                // step; the candidate sees the fixed completion message and
                // asks for the analysis explicitly.
                let _ = evaluator::run_and_store(llm, session).await;
            }
            INTERVIEW_COMPLETE.to_owned()
        }

        TurnPlan::NoFurtherQuestions => NO_FURTHER_QUESTIONS.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::session::fixtures;

    #[test]
    fn test_first_turns_are_casual() {
        let mut session = fixtures::session();
        assert_eq!(
            plan_turn(&mut session),
            TurnPlan::CasualTurn {
                chat_number: 1,
                note_still_preparing: false
            }
        );
        assert_eq!(session.casual_chat_count, 1);
        assert_eq!(session.phase, InterviewPhase::CasualChat);
    }

    #[test]
    fn test_cap_reached_before_generation_appends_note_and_stays() {
        let mut session = fixtures::session();
        plan_turn(&mut session);
        let plan = plan_turn(&mut session);
        assert_eq!(
            plan,
            TurnPlan::CasualTurn {
                chat_number: 2,
                note_still_preparing: true
            }
        );
        assert_eq!(session.phase, InterviewPhase::CasualChat);
    }

    #[test]
    fn test_cap_reached_with_questions_ready_transitions_silently() {
        let mut session = fixtures::session();
        session.install_questions(fixtures::question_set());
        plan_turn(&mut session);
        let plan = plan_turn(&mut session);
        assert_eq!(
            plan,
            TurnPlan::CasualTurn {
                chat_number: 2,
                note_still_preparing: false
            }
        );
        assert_eq!(session.phase, InterviewPhase::StructuredQuestions);
    }

    #[test]
    fn test_awaiting_questions_holds_phase_without_counting() {
        let mut session = fixtures::session();
        plan_turn(&mut session);
        plan_turn(&mut session);
        // Third and fourth invocations with generation still pending.
        assert_eq!(plan_turn(&mut session), TurnPlan::AwaitingQuestions);
        assert_eq!(plan_turn(&mut session), TurnPlan::AwaitingQuestions);
        assert_eq!(session.casual_chat_count, MAX_CASUAL_CHATS);
        assert_eq!(session.phase, InterviewPhase::CasualChat);
    }

    #[test]
    fn test_generation_completion_unblocks_on_next_turn_with_briefing() {
        let mut session = fixtures::session();
        plan_turn(&mut session);
        plan_turn(&mut session);
        assert_eq!(plan_turn(&mut session), TurnPlan::AwaitingQuestions);

        // Background generation lands between turns.
        session.install_questions(fixtures::question_set());

        assert_eq!(plan_turn(&mut session), TurnPlan::Briefing);
        assert_eq!(session.phase, InterviewPhase::StructuredQuestions);
    }

    #[test]
    fn test_structured_phase_guards_against_empty_question_set() {
        let mut session = fixtures::session();
        session.phase = InterviewPhase::StructuredQuestions;
        assert_eq!(plan_turn(&mut session), TurnPlan::QuestionsNotReady);
        // No state changed by the guard.
        assert_eq!(session.current_question_index, 0);
        assert_eq!(session.phase, InterviewPhase::StructuredQuestions);
    }

    #[test]
    fn test_questions_are_served_in_order() {
        let mut session = fixtures::session();
        session.phase = InterviewPhase::StructuredQuestions;
        session.install_questions(fixtures::question_set());

        for expected in 0..5 {
            assert_eq!(plan_turn(&mut session), TurnPlan::AskQuestion { index: expected });
        }
        assert_eq!(session.current_question_index, 5);
    }

    #[test]
    fn test_index_never_reads_past_the_end() {
        let mut session = fixtures::session();
        session.phase = InterviewPhase::StructuredQuestions;
        session.install_questions(fixtures::question_set());
        session.current_question_index = 5;

        let plan = plan_turn(&mut session);
        assert_eq!(plan, TurnPlan::CompleteInterview { run_evaluation: true });
        assert_eq!(session.phase, InterviewPhase::PostInterview);
        // The index stays bounded by the set length.
        assert_eq!(session.current_question_index, 5);
    }

    #[test]
    fn test_completion_skips_evaluation_when_already_done() {
        let mut session = fixtures::session();
        session.phase = InterviewPhase::StructuredQuestions;
        session.install_questions(fixtures::question_set());
        session.current_question_index = 5;
        session.analysis_done = true;

        assert_eq!(
            plan_turn(&mut session),
            TurnPlan::CompleteInterview { run_evaluation: false }
        );
    }

    #[test]
    fn test_post_interview_serves_no_more_questions() {
        let mut session = fixtures::session();
        session.phase = InterviewPhase::PostInterview;
        assert_eq!(plan_turn(&mut session), TurnPlan::NoFurtherQuestions);
        assert_eq!(session.phase, InterviewPhase::PostInterview);
    }

    #[test]
    fn test_phase_never_regresses_over_a_full_session() {
        let mut session = fixtures::session();
        let mut last = session.phase;

        for turn in 0..20 {
            if turn == 3 {
                session.install_questions(fixtures::question_set());
            }
            plan_turn(&mut session);
            assert!(session.phase >= last, "phase regressed at turn {turn}");
            last = session.phase;
        }
        assert_eq!(session.phase, InterviewPhase::PostInterview);
    }
}
