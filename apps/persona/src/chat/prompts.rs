// Fixed replies the engine returns instead of a model answer.

pub const QUOTA_ADVISORY: &str = "I apologize, but I've reached my API usage limit. \
Please try again later or contact me directly via email.";

pub const TOOL_LOOP_ADVISORY: &str = "I apologize, but I got stuck while working on that. \
Could you rephrase your question?";

pub fn question_limit_message(max_questions: usize, contact_email: &str) -> String {
    format!(
        "I appreciate your interest! I've answered {max_questions} questions in this session. \
         To continue our conversation, please reach out to me directly via email '{contact_email}' \
         I'd love to hear from you!"
    )
}

pub fn error_advisory(error: &dyn std::fmt::Display) -> String {
    format!("I apologize, but I encountered an error: {error}. Please try again later.")
}
