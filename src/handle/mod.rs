use regex::Regex;
use std::fmt;

use crate::error::{ResolveError, Result};

/// A validated candidate username.
///
/// Construction rejects empty handles and handles containing whitespace,
/// so every batch runs against a value that can be substituted into a URL
/// template as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handle(String);

impl Handle {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(ResolveError::InvalidHandle {
                handle: raw.to_string(),
                reason: "the handle can't be empty".to_string(),
            });
        }

        if trimmed.chars().any(char::is_whitespace) {
            return Err(ResolveError::InvalidHandle {
                handle: raw.to_string(),
                reason: "the handle can't contain spaces (example: john_doe)".to_string(),
            });
        }

        Ok(Handle(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Builds the case-insensitive whole-word matcher for this handle.
    pub fn matcher(&self) -> Result<HandleMatcher> {
        HandleMatcher::new(self)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Word-boundary, case-insensitive search for a handle in a response body.
#[derive(Debug, Clone)]
pub struct HandleMatcher {
    pattern: Regex,
}

impl HandleMatcher {
    fn new(handle: &Handle) -> Result<Self> {
        let source = format!(r"(?i)\b{}\b", regex::escape(handle.as_str()));
        let pattern = Regex::new(&source).map_err(|e| ResolveError::InvalidHandle {
            handle: handle.to_string(),
            reason: e.to_string(),
        })?;
        Ok(HandleMatcher { pattern })
    }

    pub fn is_match(&self, body: &str) -> bool {
        self.pattern.is_match(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rejects_empty() {
        assert!(matches!(
            Handle::parse("   "),
            Err(ResolveError::InvalidHandle { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_inner_whitespace() {
        assert!(Handle::parse("john doe").is_err());
        assert!(Handle::parse("john\tdoe").is_err());
    }

    #[test]
    fn test_parse_trims_surrounding_whitespace() {
        let handle = Handle::parse("  john_doe\n").unwrap();
        assert_eq!(handle.as_str(), "john_doe");
    }

    #[test]
    fn test_matcher_is_case_insensitive_whole_word() {
        let matcher = Handle::parse("john_doe").unwrap().matcher().unwrap();
        assert!(matcher.is_match("Profile: John_Doe"));
        assert!(matcher.is_match("<title>john_doe | Site</title>"));
        assert!(!matcher.is_match("johnsdoe123"));
        assert!(!matcher.is_match("xjohn_doe"));
        assert!(!matcher.is_match("john_doe2"));
    }

    #[test]
    fn test_matcher_escapes_regex_metacharacters() {
        let matcher = Handle::parse("a.b").unwrap().matcher().unwrap();
        assert!(matcher.is_match("user a.b here"));
        assert!(!matcher.is_match("user axb here"));
    }
}
