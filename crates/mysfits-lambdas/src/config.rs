/// Start-up configuration errors.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable {0} must be set")]
    Missing(&'static str),
}

/// Read a required variable; empty counts as unset.
pub fn required(var: &'static str) -> Result<String, ConfigError> {
    required_from(var, |name| std::env::var(name).ok())
}

/// Read a variable, falling back to `default` when unset or empty.
pub fn with_default(var: &'static str, default: &str) -> String {
    with_default_from(var, default, |name| std::env::var(name).ok())
}

fn required_from<F>(var: &'static str, lookup: F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(var))
}

fn with_default_from<F>(var: &'static str, default: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    required_from(var, lookup).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_value() {
        let lookup = |_: &str| Some(" https://api.example.com ".to_string());
        assert_eq!(
            required_from("MYSFITS_API_URL", lookup).unwrap(),
            "https://api.example.com"
        );
    }

    #[test]
    fn required_missing_or_empty() {
        assert_eq!(
            required_from("SNS_TOPIC_ARN", |_| None),
            Err(ConfigError::Missing("SNS_TOPIC_ARN"))
        );
        assert_eq!(
            required_from("SNS_TOPIC_ARN", |_| Some(String::new())),
            Err(ConfigError::Missing("SNS_TOPIC_ARN"))
        );
    }

    #[test]
    fn default_used_when_unset() {
        assert_eq!(
            with_default_from("QUESTIONS_TABLE", "MysfitsQuestionsTable", |_| None),
            "MysfitsQuestionsTable"
        );
        assert_eq!(
            with_default_from("QUESTIONS_TABLE", "MysfitsQuestionsTable", |_| {
                Some("Questions".into())
            }),
            "Questions"
        );
    }
}
