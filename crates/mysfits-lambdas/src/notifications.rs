/// SNS subjects must stay under 100 characters.
const MAX_SUBJECT_CHARS: usize = 99;

/// Email subject for a newly submitted question.
///
/// Control characters (line breaks included) are not allowed in SNS subjects
/// and are replaced with spaces.
///
/// Example: New Customer Question: fan@example.com
pub fn format_subject(email: &str) -> String {
    format!("New Customer Question: {email}")
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .take(MAX_SUBJECT_CHARS)
        .collect()
}

/// Email body for a newly submitted question.
///
/// Example: USER EMAIL: fan@example.com. QUESTION TEXT: Do mysfits sleep?
pub fn format_message(email: &str, question_text: &str) -> String {
    format!("USER EMAIL: {email}. QUESTION TEXT: {question_text}")
}
