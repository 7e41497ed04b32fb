//! All LLM prompt constants and fixed user-facing messages for the interview
//! flow. Templates use `{placeholder}` substitution; builder functions live
//! next to the templates they fill.

use crate::interview::session::{InterviewPhase, SessionState, MAX_CASUAL_CHATS, MAX_INTERACTIONS};

// ────────────────────────────────────────────────────────────────────────────
// Greeting and fixed conversational messages
// ────────────────────────────────────────────────────────────────────────────

/// Opening message pushed to the transcript when a session is created.
pub fn greeting(first_name: &str, position: &str) -> String {
    format!(
        "Hello {first_name}! Welcome to TalentScout.\n\n\
        I'm conducting your interview for the {position} role today. This will be a \
        structured interview covering your background, technical skills, and experience \
        relevant to the job requirements.\n\n\
        IMPORTANT INTERVIEW RULES & FAIRNESS GUIDELINES:\n\
        - Total interaction limit: {MAX_INTERACTIONS} exchanges only\n\
        - After a couple of warm-up questions, you must take a technical test\n\
        - Only after completing the test can you get analysis or recommendations\n\
        - Please manage your responses efficiently — total session time is ~10 minutes\n\
        - This is a straight Q&A session: every message you send moves the conversation forward\n\
        - There is no going back to previous questions\n\
        - Answer honestly based on your own knowledge and experience\n\
        - No external help — AI tools, browsers, or reference materials are strictly prohibited\n\
        - Keep answers concise: about 3-4 lines or under 500 characters\n\
        - If unsure, respond with \"I don't know\" — guessing is discouraged\n\
        - Clarification is allowed only once if truly necessary\n\n\
        In case of any technical issues, reach out to careers@talentscout.com with a screenshot.\n\n\
        Let's begin. Are you ready to start the interview?"
    )
}

/// Briefing emitted exactly once, on the transition into the structured phase.
pub const RULES_BRIEFING: &str = "Perfect! Your customized questions are ready. \
Let's begin the structured assessment.\n\n\
INTERVIEW RULES & FAIRNESS GUIDELINES:\n\
- Answer questions honestly based on your own knowledge and experience\n\
- No external assistance, AI tools, or reference materials allowed\n\
- Keep responses concise: 3-4 lines maximum or under 500 characters\n\
- If you don't know something, simply say \"I don't know\" rather than guessing\n\
- Each question will be asked once - clarification available only if truly needed\n\
- This is a fair assessment designed to evaluate your genuine technical understanding\n\n\
Ready to start? Your first question is coming up next.";

/// Served while the casual-chat cap is reached but generation hasn't finished.
pub const STILL_PREPARING: &str = "I'm still preparing your personalized questions. \
How about we discuss what interests you most about this role?";

/// Appended to a casual reply when the cap is hit before generation completed.
pub const STILL_PREPARING_SUFFIX: &str =
    "\n\nI'm still preparing your customized questions. Let's chat a bit more!";

/// Guard message for the structured phase when no question set exists yet.
pub const QUESTIONS_NOT_READY: &str =
    "I'm still preparing your questions. Please wait a moment.";

/// Emitted when the last structured question has been answered.
pub const INTERVIEW_COMPLETE: &str = "**All screening questions completed!**\n\n\
What would you like to do next?\n\
- Ask for an analysis of your session\n\n\
OR\n\n\
- Type 'exit' to conclude the interview";

/// Served when the model routes to the interview after the question phase ended.
pub const NO_FURTHER_QUESTIONS: &str = "The structured interview is already complete - \
there are no further questions. You can ask for your performance analysis, request a \
final recommendation, or type 'exit' to end the session.";

/// Per-turn failure message. The turn still counts against the interaction
/// limit; counters are never rolled back.
pub const TURN_FAILURE_APOLOGY: &str = "I apologize, but I encountered a technical issue. \
Let's continue with the interview. Could you please repeat your last response?";

/// Terminal dispatcher failure after the selection retry.
pub const NO_TOOL_SELECTED: &str =
    "The interview assistant failed to select an action even after a retry. Please try again.";

/// Session-ending farewell.
pub const FAREWELL: &str = "Thank you for using the TalentScout Interview Assistant. \
The conversation has been ended. Have a great day!";

/// Served when analysis is re-requested after the evaluator already ran but
/// left no report behind.
pub const ANALYSIS_UNAVAILABLE: &str = "Your performance analysis was already attempted and \
could not be completed. You can still request a final recommendation or end the session.";

// ────────────────────────────────────────────────────────────────────────────
// Common interviewer system prompt
// ────────────────────────────────────────────────────────────────────────────

const COMMON_SYSTEM_TEMPLATE: &str = "You are a professional Technical Recruiter and \
Interviewer for TalentScout conducting a structured interview/screening process.

CHATBOT FLOW OVERVIEW:
1. Phase 1: Casual Chat - up to {max_casual} resume-based casual questions while the structured questions are being generated.
2. Phase 2: Structured Questions - screening questions asked one by one in a human, professional tone.
3. Phase 3: Post-Interview - the candidate may request an analysis, a recommendation, or exit.

CANDIDATE RESUME INFORMATION:
{candidate_info}

{resume_summary}

JOB DESCRIPTION:
{jd_excerpt}

INTERVIEW GUIDELINES:
1. Stay focused on the interview/screening process ONLY
2. Do NOT answer questions outside the interview context
3. Do NOT provide information about the company, role details, or general career advice
4. Only respond to: question clarifications, question repeats, basic acknowledgments
5. If the candidate asks irrelevant questions, politely redirect to the interview
6. Maintain professional, structured interview flow
7. Ask one question at a time and wait for complete answers
8. Current interview phase: {phase}
9. Total interactions limit: {max_interactions}

STRICT BOUNDARIES:
- No discussions about salary negotiations, company policies, or role responsibilities
- No answering \"What questions do you have for us?\" until interview completion
- No providing hints or answers to technical questions
- No going back to previous questions unless for clarification
- No casual conversation outside interview context

You are the interviewer. The candidate should answer YOUR questions, not the other way around.";

/// JD text is truncated to bound the system prompt size.
const JD_EXCERPT_CHARS: usize = 1000;

/// Builds the shared interviewer system prompt from session state.
pub fn common_system(session: &SessionState) -> String {
    let c = &session.candidate;
    let candidate_info = format!(
        "- Name: {}\n- Position Applied: {}\n- Experience: {} years\n\
         - Current Company: {}\n- Current Location: {}\n- Ready to Relocate: {}\n\
         - Tech Stack: {}\n- Expected Salary: {} LPA",
        c.full_name(),
        c.position_applied,
        c.years_experience,
        c.current_company.as_deref().unwrap_or("Not specified"),
        c.current_location,
        if c.ready_to_relocate { "Yes" } else { "No" },
        c.tech_stack,
        c.expected_salary,
    );

    let resume_summary = match &session.profile {
        Some(profile) => format!(
            "Resume summary of the candidate:\n{}",
            serde_json::to_string_pretty(profile).unwrap_or_default()
        ),
        None => String::new(),
    };

    let jd_excerpt = if session.jd_text.is_empty() {
        "No JD available".to_owned()
    } else {
        truncate_chars(&session.jd_text, JD_EXCERPT_CHARS)
    };

    COMMON_SYSTEM_TEMPLATE
        .replace("{max_casual}", &MAX_CASUAL_CHATS.to_string())
        .replace("{candidate_info}", &candidate_info)
        .replace("{resume_summary}", &resume_summary)
        .replace("{jd_excerpt}", &jd_excerpt)
        .replace("{phase}", session.phase.label())
        .replace("{max_interactions}", &MAX_INTERACTIONS.to_string())
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Casual chat
// ────────────────────────────────────────────────────────────────────────────

pub const CASUAL_CHAT_PROMPT_TEMPLATE: &str = "Have a casual, professional conversation \
with the candidate while their structured questions are prepared.

Casual chat #{chat_number}/{max_casual}
Topics you can discuss:
- What excites them about this role
- Willingness to relocate if required
- Their learning goals or career aspirations
- Resume projects/experience that align with this role
- Any initial questions they might have about the process

Keep it natural, friendly, and professional. Questions are being prepared in the background.";

pub fn casual_chat_prompt(chat_number: u32) -> String {
    CASUAL_CHAT_PROMPT_TEMPLATE
        .replace("{chat_number}", &chat_number.to_string())
        .replace("{max_casual}", &MAX_CASUAL_CHATS.to_string())
}

// ────────────────────────────────────────────────────────────────────────────
// Structured question presentation
// ────────────────────────────────────────────────────────────────────────────

/// Strict presentation-only instruction: the model quotes the question, never
/// helps with it.
pub const QUESTION_PRESENTER_SYSTEM: &str = "You are an AI Technical Interviewer for \
TalentScout conducting a formal screening.

CORE BEHAVIOR:
- Never provide hints, help, or guidance
- Maintain professional, neutral tone
- Present questions in exact format provided
- Log responses silently (no evaluation during interview)

RESPONSE RULES:
1. If the candidate asks for clarification: simplify ONCE only
2. If they ask again: \"Cannot be simplified further.\"
3. If the candidate says \"I don't know\" or asks for help: issue a formal warning

QUESTION PRESENTATION:
Present each question conversationally but quote these exact elements:
- Section: [section name]
- Question Number: [number]
- Question: [question text]

Stick to this structured format to ensure fairness and consistency. The candidate's \
answers will be evaluated after the interview.";

pub const QUESTION_PROMPT_TEMPLATE: &str = "Ask the following structured question in a \
human, conversational way, quoting all 3 fields below exactly as given:
- Section: {section}
- Question Number: {number}
- Question: {question}";

pub fn question_prompt(section: &str, number: u32, question: &str) -> String {
    QUESTION_PROMPT_TEMPLATE
        .replace("{section}", section)
        .replace("{number}", &number.to_string())
        .replace("{question}", question)
}

// ────────────────────────────────────────────────────────────────────────────
// Resume summarization
// ────────────────────────────────────────────────────────────────────────────

pub const SUMMARY_SYSTEM: &str = "You are a resume analyst. Extract the candidate's \
information from the resume text they provide. \
You MUST respond with valid JSON only, matching the requested schema. \
Do NOT include any text outside the JSON object. \
Do NOT use markdown code fences. \
If any field is missing or unclear, set it to null.";

pub const SUMMARY_PROMPT_TEMPLATE: &str = r#"Extract the candidate's information from the following resume text.

Return a JSON object with this EXACT schema (every field nullable):
{
  "name": "Jane Doe",
  "email": "jane@example.com",
  "phone": "+1 555 0100",
  "location": "Bangalore",
  "portfolio_url": null,
  "institute": "IIT Bombay",
  "degree": "B.Tech CSE",
  "graduation_year": 2019,
  "gpa": 8.4,
  "total_experience_years": 4.5,
  "experiences": ["Backend engineer at Acme, 2019-2023"],
  "tech_stack": ["Rust", "PostgreSQL"],
  "programming_languages": ["Rust", "Python"],
  "tools_frameworks": ["Axum", "Docker"],
  "projects": ["Realtime bidding engine"],
  "certifications": null,
  "publications": null,
  "languages": ["English", "Hindi"]
}

RESUME:
{resume_text}"#;

pub fn summary_prompt(resume_text: &str) -> String {
    SUMMARY_PROMPT_TEMPLATE.replace("{resume_text}", resume_text)
}

// ────────────────────────────────────────────────────────────────────────────
// Screening-question generation
// ────────────────────────────────────────────────────────────────────────────

pub const QUESTION_GEN_SYSTEM: &str = "You are an expert technical recruiter creating \
screening questions. \
You MUST respond with valid JSON only, matching the requested schema. \
Do NOT include any text outside the JSON object. \
Do NOT use markdown code fences.";

pub const QUESTION_GEN_PROMPT_TEMPLATE: &str = r#"Generate exactly 5 screening test questions based on the candidate's profile and job requirements.

CANDIDATE:
{candidate_summary}

EXTRACTED PROFILE:
{profile_json}

RESUME DETAILS:
{resume_text}

JOB DESCRIPTION:
{jd_text}

Generate 5 questions divided into 5 sections (1 question each), in this order:
1. Technical Skills
2. Problem Solving
3. Experience & Projects
4. Behavioral
5. Role-Specific

Each question needs clear evaluation criteria and expected answer points.

Return a JSON object with this EXACT schema:
{
  "screening_questions": [
    {
      "section": "Technical Skills",
      "question_number": 1,
      "question": "...",
      "expected_answer_points": ["...", "..."],
      "evaluation_criteria": "...",
      "max_score": 20
    }
  ]
}

The `section` values MUST be exactly the five section names above, one question per
section, with question_number running 1 through 5."#;

// ────────────────────────────────────────────────────────────────────────────
// Evaluation
// ────────────────────────────────────────────────────────────────────────────

pub const EVALUATION_SYSTEM_TEMPLATE: &str = r#"You are a professional Technical Recruiter and Interviewer for TalentScout. The structured phase of a screening interview has just completed. Evaluate the candidate's answers.

You are given:
- The chat history between the candidate and the interviewer during the structured phase
- The original structured questions with expected answer points and evaluation criteria:
{questions_json}

Evaluate the candidate's performance considering:
- Correctness and depth against the expected answer points
- AI-assistance likelihood factors: unusually perfect or overly comprehensive answers,
  copy/paste formatting, answers exceeding the stated experience level, inconsistent
  knowledge across topics, unsolicited information in suspicious ways

Be honest and fair while remaining constructive and professional.

You MUST respond with valid JSON only, matching this EXACT schema:
{
  "score": 72,
  "ai_assist_probability": 0.15,
  "strengths": "...",
  "areas_for_improvement": "...",
  "feedback": "..."
}

`score` is 0-100. `ai_assist_probability` is a fraction between 0 and 1.
Do NOT include any text outside the JSON object. Do NOT use markdown code fences."#;

pub const EVALUATION_USER_MESSAGE: &str =
    "Evaluate the candidate's structured interview performance.";

// ────────────────────────────────────────────────────────────────────────────
// Final recommendation
// ────────────────────────────────────────────────────────────────────────────

pub const RECOMMENDATION_SYSTEM_TEMPLATE: &str = r#"You are a professional Technical Recruiter and Interviewer at TalentScout, generating a final hiring recommendation report for a candidate based on:

1. Resume summary:
{resume_summary}

2. Job description:
{jd_text}

3. Candidate profile:
{candidate_info}

4. Structured interview evaluation summary (based on 5 questions):
{evaluation_summary}

Analyze the above and return a detailed hiring recommendation.

You MUST respond with valid JSON only, matching this EXACT schema:
{
  "jd_requirements_match": ["Python: Strong", "Django: Moderate"],
  "screening_test_performance": ["Total score 72/100"],
  "specific_scores": ["Technical: 8/10", "Communication: 7/10"],
  "location_logistics": ["Based in Bangalore", "Ready to relocate"],
  "salary_expectations": ["Expected 18 LPA, within range"],
  "final_decision": "Recommended",
  "overall_score": 74,
  "test_performance_impact": "...",
  "overall_assessment": ["..."],
  "top_strengths": ["..."],
  "concerns": ["..."],
  "recommendations": ["..."],
  "next_steps": ["Move to technical round"],
  "timeline_recommendation": "Can join within 30 days"
}

`final_decision` MUST be one of: "Recommended", "On Hold", "Not Recommended".
`overall_score` is 0-100. Use an empty array for any list you have no data for.
Do NOT include any text outside the JSON object. Do NOT use markdown code fences."#;

pub const RECOMMENDATION_USER_MESSAGE: &str =
    "Generate the final candidate recommendation based on all provided information.";

// ────────────────────────────────────────────────────────────────────────────
// Dispatcher (tool selection)
// ────────────────────────────────────────────────────────────────────────────

pub const DISPATCH_SYSTEM_TEMPLATE: &str = "You are an advanced AI Interview Assistant \
for TalentScout, conducting and managing structured screening interviews.

Decide which tool advances the session, using the current phase and the recent chat:
- interview_phase: {phase}
- analysis_done: {analysis_done}

RULES:
- You MUST select exactly one tool every time.
- Never respond directly to the user without selecting a tool.
- If analysis_done=true, do not use analyze_performance again.
- Use end_conversation only when the user clearly requests to stop.";

pub fn dispatch_system(phase: InterviewPhase, analysis_done: bool) -> String {
    DISPATCH_SYSTEM_TEMPLATE
        .replace("{phase}", phase.label())
        .replace("{analysis_done}", if analysis_done { "true" } else { "false" })
}

pub const DISPATCH_USER_MESSAGE: &str =
    "Please continue the interview based on the previous conversation.";

/// Appended to the user message on the second selection attempt.
pub const DISPATCH_RETRY_SUFFIX: &str = "\n\nCRITICAL: You MUST select one tool from the \
available tools list. Do not respond without selecting a tool. Choose the most \
appropriate tool based on the conversation context.";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::session::fixtures;

    #[test]
    fn test_greeting_names_candidate_and_position() {
        let text = greeting("Asha", "Backend Engineer");
        assert!(text.contains("Hello Asha!"));
        assert!(text.contains("Backend Engineer"));
        assert!(text.contains("15 exchanges"));
    }

    #[test]
    fn test_common_system_embeds_phase_and_candidate() {
        let session = fixtures::session();
        let system = common_system(&session);
        assert!(system.contains("Current interview phase: casual_chat"));
        assert!(system.contains("Asha Patel"));
        assert!(system.contains("jd text"));
    }

    #[test]
    fn test_common_system_without_jd_or_profile() {
        let mut session = fixtures::session();
        session.jd_text.clear();
        session.profile = None;
        let system = common_system(&session);
        assert!(system.contains("No JD available"));
        assert!(!system.contains("Resume summary of the candidate"));
    }

    #[test]
    fn test_jd_excerpt_is_truncated() {
        let mut session = fixtures::session();
        session.jd_text = "x".repeat(5000);
        let system = common_system(&session);
        assert!(!system.contains(&"x".repeat(1001)));
        assert!(system.contains(&"x".repeat(1000)));
    }

    #[test]
    fn test_casual_chat_prompt_counts() {
        let prompt = casual_chat_prompt(2);
        assert!(prompt.contains("Casual chat #2/2"));
    }

    #[test]
    fn test_question_prompt_quotes_fields() {
        let prompt = question_prompt("Behavioral", 4, "Describe a conflict you resolved.");
        assert!(prompt.contains("- Section: Behavioral"));
        assert!(prompt.contains("- Question Number: 4"));
        assert!(prompt.contains("Describe a conflict you resolved."));
    }

    #[test]
    fn test_dispatch_system_embeds_state() {
        let system = dispatch_system(InterviewPhase::PostInterview, true);
        assert!(system.contains("interview_phase: post_interview"));
        assert!(system.contains("analysis_done: true"));
    }
}
