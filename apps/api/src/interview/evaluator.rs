//! Evaluator — scores a completed structured interview against the generated
//! question set.
//!
//! Runs at most once per session: the `analysis_done` latch is set before the
//! model call, so a failed evaluation is never silently retried.

use chrono::Utc;
use tracing::{error, info};

use serde::{Deserialize, Serialize};

use crate::interview::prompts::{
    EVALUATION_SYSTEM_TEMPLATE, EVALUATION_USER_MESSAGE, TURN_FAILURE_APOLOGY,
};
use crate::interview::session::SessionState;
use crate::llm_client::{LlmClient, LlmError};
use crate::models::chat::trailing_window;

/// Wide transcript window for evaluation — the whole structured phase fits.
const EVALUATION_WINDOW: usize = 50;

/// Structured evaluation returned by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestEvaluation {
    /// 0-100 overall score.
    pub score: i64,
    /// Automated-assistance likelihood. The model may return either a 0-1
    /// fraction or a 0-100 scale; display goes through
    /// `ai_assist_percentage`.
    pub ai_assist_probability: f64,
    pub strengths: String,
    pub areas_for_improvement: String,
    pub feedback: String,
}

/// Normalizes the raw assistance signal to a display percentage.
/// Raw values above 1.0 are treated as already-scaled 0-100 values; the
/// displayed percentage is clamped at 100.0.
pub fn ai_assist_percentage(raw: f64) -> f64 {
    let fraction = if raw > 1.0 { raw / 100.0 } else { raw };
    (fraction * 100.0).min(100.0)
}

/// Renders the fixed-layout evaluation report.
pub fn render_evaluation(evaluation: &TestEvaluation, generated_at: &str) -> String {
    let rule = "─".repeat(80);
    let double_rule = "═".repeat(80);
    let percentage = ai_assist_percentage(evaluation.ai_assist_probability);

    format!(
        "EVALUATION METRICS\n{rule}\n\
        - Overall Score: {}/100\n\
        - AI Assistance Probability: {percentage:.2}%\n\n\
        STRENGTHS\n{rule}\n{}\n\n\
        AREAS FOR IMPROVEMENT\n{rule}\n{}\n\n\
        OVERALL FEEDBACK\n{rule}\n{}\n\n\
        {double_rule}\n\
        Report Generated: {generated_at}\n\
        Interviewer: TalentScout AI Screening System\n\
        {double_rule}\n\n\
        You can now proceed to the final recommendation section, where you may ask for your final recommendation.",
        evaluation.score,
        evaluation.strengths,
        evaluation.areas_for_improvement,
        evaluation.feedback,
    )
}

/// One evaluation call: transcript window + original questions in, rendered
/// report out.
pub async fn evaluate(
    llm: &LlmClient,
    session: &SessionState,
) -> Result<String, LlmError> {
    let questions_json = serde_json::to_string_pretty(&session.screening_questions)
        .unwrap_or_else(|_| "[]".to_owned());
    let system = EVALUATION_SYSTEM_TEMPLATE.replace("{questions_json}", &questions_json);
    let window = trailing_window(&session.transcript, EVALUATION_WINDOW);

    let evaluation: TestEvaluation = llm
        .call_json(&system, window, EVALUATION_USER_MESSAGE, 0.7)
        .await?;

    info!(
        "Evaluation complete: score={}, ai_assist={:.2}%",
        evaluation.score,
        ai_assist_percentage(evaluation.ai_assist_probability)
    );

    let generated_at = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
    Ok(render_evaluation(&evaluation, &generated_at))
}

/// Latches and runs the evaluator, storing the rendered report on the session.
/// Always returns user-facing text; a model failure degrades to the standard
/// apology and leaves the report absent.
pub async fn run_and_store(llm: &LlmClient, session: &mut SessionState) -> String {
    // Latch first: even a failed evaluation is never re-run for this session.
    session.analysis_done = true;

    match evaluate(llm, session).await {
        Ok(report) => {
            session.analysis_report = Some(report.clone());
            report
        }
        Err(e) => {
            error!("Evaluation failed: {e}");
            TURN_FAILURE_APOLOGY.to_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluation() -> TestEvaluation {
        TestEvaluation {
            score: 72,
            ai_assist_probability: 0.42,
            strengths: "Solid fundamentals in systems design.".to_owned(),
            areas_for_improvement: "Needs deeper database knowledge.".to_owned(),
            feedback: "Good session overall.".to_owned(),
        }
    }

    #[test]
    fn test_fraction_input_displays_as_percentage() {
        assert!((ai_assist_percentage(0.42) - 42.00).abs() < f64::EPSILON);
    }

    #[test]
    fn test_scaled_input_is_normalized() {
        assert!((ai_assist_percentage(75.0) - 75.00).abs() < f64::EPSILON);
    }

    #[test]
    fn test_out_of_range_input_is_clamped() {
        assert!((ai_assist_percentage(150.0) - 100.00).abs() < f64::EPSILON);
    }

    #[test]
    fn test_boundary_value_one_is_a_fraction() {
        assert!((ai_assist_percentage(1.0) - 100.00).abs() < f64::EPSILON);
    }

    #[test]
    fn test_render_contains_all_sections() {
        let report = render_evaluation(&evaluation(), "2026-08-29 10:00:00");
        assert!(report.contains("EVALUATION METRICS"));
        assert!(report.contains("Overall Score: 72/100"));
        assert!(report.contains("AI Assistance Probability: 42.00%"));
        assert!(report.contains("STRENGTHS"));
        assert!(report.contains("AREAS FOR IMPROVEMENT"));
        assert!(report.contains("OVERALL FEEDBACK"));
        assert!(report.contains("Report Generated: 2026-08-29 10:00:00"));
    }

    #[test]
    fn test_evaluation_deserializes_from_model_output() {
        let json = r#"{
            "score": 85,
            "ai_assist_probability": 12.5,
            "strengths": "s",
            "areas_for_improvement": "a",
            "feedback": "f"
        }"#;
        let evaluation: TestEvaluation = serde_json::from_str(json).unwrap();
        assert_eq!(evaluation.score, 85);
        assert!((ai_assist_percentage(evaluation.ai_assist_probability) - 12.5).abs() < 1e-9);
    }
}
