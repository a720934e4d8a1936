//! `${VAR_NAME}` expansion for secrets kept out of the config document.

use tierwatch_core::config::is_unset;

use crate::traits::NotifyError;

/// Resolve `${VAR_NAME}` patterns in a string using `std::env::var`.
///
/// Returns an error if a referenced variable is not set.
pub fn resolve_env_vars(input: &str) -> Result<String, NotifyError> {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next();
            let mut var_name = String::new();
            let mut closed = false;
            for c in chars.by_ref() {
                if c == '}' {
                    closed = true;
                    break;
                }
                var_name.push(c);
            }
            if !closed {
                return Err(NotifyError::Config(format!(
                    "unclosed env var reference in: {input}"
                )));
            }
            let value = std::env::var(&var_name).map_err(|_| {
                NotifyError::Config(format!("env var not found: {var_name}"))
            })?;
            result.push_str(&value);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}

/// Resolve a settings field into a usable value.
///
/// Missing, blank, placeholder (`YOUR_...`) and unresolvable values all
/// come back as `None`; the provider then reports the field as missing.
pub(crate) fn setting(field: &str, value: Option<&String>) -> Option<String> {
    if is_unset(value.map(String::as_str)) {
        return None;
    }
    let raw = value?;
    match resolve_env_vars(raw) {
        Ok(resolved) if !is_unset(Some(&resolved)) => Some(resolved),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!(field, error = %e, "could not resolve SMS setting");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("TW_SMS_TEST_HOST", "sms.example.com");
        let result = resolve_env_vars("https://${TW_SMS_TEST_HOST}/send").unwrap();
        assert_eq!(result, "https://sms.example.com/send");
        std::env::remove_var("TW_SMS_TEST_HOST");
    }

    #[test]
    fn resolve_env_vars_missing() {
        let result = resolve_env_vars("${ABSOLUTELY_NOT_SET_12345}");
        match result.unwrap_err() {
            NotifyError::Config(msg) => assert!(msg.contains("ABSOLUTELY_NOT_SET_12345")),
            other => panic!("expected Config error, got: {other:?}"),
        }
    }

    #[test]
    fn resolve_env_vars_unclosed() {
        match resolve_env_vars("${UNCLOSED").unwrap_err() {
            NotifyError::Config(msg) => assert!(msg.contains("unclosed")),
            other => panic!("expected Config error, got: {other:?}"),
        }
    }

    #[test]
    fn resolve_env_vars_no_vars() {
        assert_eq!(resolve_env_vars("+15550002").unwrap(), "+15550002");
    }

    #[test]
    fn setting_treats_placeholders_and_failures_as_missing() {
        assert_eq!(setting("to", None), None);
        assert_eq!(setting("to", Some(&"YOUR_RECIPIENT_PHONE_NUMBER".to_string())), None);
        assert_eq!(setting("to", Some(&"${TW_NEVER_SET_987}".to_string())), None);
        assert_eq!(setting("to", Some(&"+15550002".to_string())).as_deref(), Some("+15550002"));
    }

    #[test]
    fn setting_resolves_env_reference() {
        std::env::set_var("TW_SMS_TEST_TOKEN", "tok-123");
        assert_eq!(
            setting("token", Some(&"${TW_SMS_TEST_TOKEN}".to_string())).as_deref(),
            Some("tok-123")
        );
        std::env::remove_var("TW_SMS_TEST_TOKEN");
    }
}
