//! Final recommendation — synthesizes profile, JD, and the stored evaluation
//! into a hiring verdict rendered as a fixed-layout report.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::interview::prompts::{
    RECOMMENDATION_SYSTEM_TEMPLATE, RECOMMENDATION_USER_MESSAGE,
};
use crate::interview::session::SessionState;
use crate::llm_client::{LlmClient, LlmError};
use crate::models::chat::trailing_window;

/// Narrow window — the report is built from session artifacts, not the chat.
const RECOMMENDATION_WINDOW: usize = 2;

/// Placeholder rendered for any list field the model left empty.
pub const NO_DATA: &str = "No data available";

/// Used in the prompt when recommendation is requested before evaluation ran.
const MISSING_EVALUATION: &str =
    "No structured evaluation is available for this candidate yet.";

/// The hiring verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinalDecision {
    Recommended,
    #[serde(rename = "On Hold")]
    OnHold,
    #[serde(rename = "Not Recommended")]
    NotRecommended,
}

impl std::fmt::Display for FinalDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            FinalDecision::Recommended => "RECOMMENDED",
            FinalDecision::OnHold => "ON HOLD",
            FinalDecision::NotRecommended => "NOT RECOMMENDED",
        };
        f.write_str(label)
    }
}

/// Structured verdict object returned by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalCandidateReport {
    #[serde(default)]
    pub jd_requirements_match: Vec<String>,
    #[serde(default)]
    pub screening_test_performance: Vec<String>,
    #[serde(default)]
    pub specific_scores: Vec<String>,
    #[serde(default)]
    pub location_logistics: Vec<String>,
    #[serde(default)]
    pub salary_expectations: Vec<String>,
    pub final_decision: FinalDecision,
    /// Normalized 0-100 hiring-consideration score.
    pub overall_score: i64,
    pub test_performance_impact: String,
    #[serde(default)]
    pub overall_assessment: Vec<String>,
    #[serde(default)]
    pub top_strengths: Vec<String>,
    #[serde(default)]
    pub concerns: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub next_steps: Vec<String>,
    pub timeline_recommendation: String,
}

/// Renders a list field as bullets, or the literal placeholder when empty —
/// the report layout is identical across candidates.
fn bullet_section(items: &[String]) -> String {
    if items.is_empty() {
        NO_DATA.to_owned()
    } else {
        items
            .iter()
            .map(|item| format!("- {item}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Renders the fixed-layout recommendation report.
pub fn render_report(report: &FinalCandidateReport, generated_at: &str) -> String {
    let rule = "─".repeat(80);
    let double_rule = "═".repeat(80);

    format!(
        "FINAL DECISION: {decision}\n\
        Overall Score: {score}/100\n\n\
        JOB REQUIREMENTS MATCH\n{rule}\n{jd_match}\n\n\
        SCREENING TEST PERFORMANCE\n{rule}\n{test_perf}\n\n\
        SPECIFIC SCORES BREAKDOWN\n{rule}\n{scores}\n\n\
        LOCATION & LOGISTICS\n{rule}\n{location}\n\n\
        SALARY EXPECTATIONS\n{rule}\n{salary}\n\n\
        OVERALL ASSESSMENT\n{rule}\n{assessment}\n\n\
        Test Performance Impact: {impact}\n\n\
        TOP STRENGTHS\n{rule}\n{strengths}\n\n\
        AREAS OF CONCERN\n{rule}\n{concerns}\n\n\
        RECOMMENDATIONS\n{rule}\n{recommendations}\n\n\
        SUGGESTED NEXT STEPS\n{rule}\n{next_steps}\n\n\
        TIMELINE RECOMMENDATION\n{rule}\n{timeline}\n\n\
        {double_rule}\n\n\
        PROCESS COMPLETION NOTICE\n{rule}\n\n\
        Next Steps:\n\
        1. You are now formally released from this evaluation process.\n\
        2. For your final report and feedback on next rounds, please contact:\n\
        careers@talentscout.com\n\
        3. To officially conclude this session, type `exit` or `end_conversation`.\n\n\
        {double_rule}\n\
        Thank you for your participation! We appreciate your time and effort.\n\
        Report Generated: {generated_at}\n\
        {double_rule}",
        decision = report.final_decision,
        score = report.overall_score,
        jd_match = bullet_section(&report.jd_requirements_match),
        test_perf = bullet_section(&report.screening_test_performance),
        scores = bullet_section(&report.specific_scores),
        location = bullet_section(&report.location_logistics),
        salary = bullet_section(&report.salary_expectations),
        assessment = bullet_section(&report.overall_assessment),
        impact = report.test_performance_impact,
        strengths = bullet_section(&report.top_strengths),
        concerns = bullet_section(&report.concerns),
        recommendations = bullet_section(&report.recommendations),
        next_steps = bullet_section(&report.next_steps),
        timeline = report.timeline_recommendation,
    )
}

/// One recommendation call. Reachable without an evaluation — the prompt then
/// carries an explicit "no evaluation" marker rather than failing, though the
/// dispatcher's instruction discourages that ordering.
pub async fn generate_recommendation(
    llm: &LlmClient,
    session: &SessionState,
) -> Result<String, LlmError> {
    let c = &session.candidate;
    let candidate_info = format!(
        "- Name: {}\n- Experience: {} years\n- Current Company: {}\n\
         - Location: {}\n- Ready to Relocate: {}\n- Tech Stack: {}\n\
         - Expected Salary: {} LPA",
        c.full_name(),
        c.years_experience,
        c.current_company.as_deref().unwrap_or("Not specified"),
        c.current_location,
        if c.ready_to_relocate { "Yes" } else { "No" },
        c.tech_stack,
        c.expected_salary,
    );

    let resume_summary = session
        .profile
        .as_ref()
        .map(|p| serde_json::to_string_pretty(p).unwrap_or_default())
        .unwrap_or_else(|| "No resume summary available".to_owned());

    let system = RECOMMENDATION_SYSTEM_TEMPLATE
        .replace("{resume_summary}", &resume_summary)
        .replace("{jd_text}", &session.jd_text)
        .replace("{candidate_info}", &candidate_info)
        .replace(
            "{evaluation_summary}",
            session
                .analysis_report
                .as_deref()
                .unwrap_or(MISSING_EVALUATION),
        );

    let window = trailing_window(&session.transcript, RECOMMENDATION_WINDOW);
    let report: FinalCandidateReport = llm
        .call_json(&system, window, RECOMMENDATION_USER_MESSAGE, 0.5)
        .await?;

    info!(
        "Final recommendation: {} (score {})",
        report.final_decision, report.overall_score
    );

    let generated_at = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
    Ok(render_report(&report, &generated_at))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> FinalCandidateReport {
        FinalCandidateReport {
            jd_requirements_match: vec!["Rust: Strong".to_owned()],
            screening_test_performance: vec!["72/100 total".to_owned()],
            specific_scores: vec![],
            location_logistics: vec!["Pune, relocation ready".to_owned()],
            salary_expectations: vec![],
            final_decision: FinalDecision::OnHold,
            overall_score: 64,
            test_performance_impact: "Moderate influence on the decision".to_owned(),
            overall_assessment: vec!["Decent fit".to_owned()],
            top_strengths: vec![],
            concerns: vec!["Limited distributed-systems exposure".to_owned()],
            recommendations: vec![],
            next_steps: vec![],
            timeline_recommendation: "Revisit after technical round".to_owned(),
        }
    }

    #[test]
    fn test_empty_list_renders_placeholder_not_empty_section() {
        let rendered = render_report(&report(), "2026-08-29 12:00:00");
        // top_strengths is empty → literal placeholder line under its header.
        let strengths_idx = rendered.find("TOP STRENGTHS").unwrap();
        let tail = &rendered[strengths_idx..];
        assert!(tail.contains(NO_DATA));
    }

    #[test]
    fn test_populated_list_renders_bullets() {
        let rendered = render_report(&report(), "2026-08-29 12:00:00");
        assert!(rendered.contains("- Rust: Strong"));
        assert!(rendered.contains("- 72/100 total"));
    }

    #[test]
    fn test_decision_renders_uppercase() {
        let rendered = render_report(&report(), "2026-08-29 12:00:00");
        assert!(rendered.contains("FINAL DECISION: ON HOLD"));
        assert!(rendered.contains("Overall Score: 64/100"));
    }

    #[test]
    fn test_decision_serde_uses_display_names() {
        let decision: FinalDecision = serde_json::from_str(r#""On Hold""#).unwrap();
        assert_eq!(decision, FinalDecision::OnHold);
        let decision: FinalDecision = serde_json::from_str(r#""Not Recommended""#).unwrap();
        assert_eq!(decision, FinalDecision::NotRecommended);
        assert_eq!(
            serde_json::to_string(&FinalDecision::Recommended).unwrap(),
            r#""Recommended""#
        );
    }

    #[test]
    fn test_report_deserializes_with_missing_lists() {
        let json = r#"{
            "final_decision": "Recommended",
            "overall_score": 81,
            "test_performance_impact": "High",
            "timeline_recommendation": "Immediate"
        }"#;
        let report: FinalCandidateReport = serde_json::from_str(json).unwrap();
        assert!(report.top_strengths.is_empty());
        assert_eq!(report.final_decision, FinalDecision::Recommended);
    }
}
