//! Ordered regex matching over validator output.
//!
//! Validator messages are matched against a prioritized list of rules; the first rule that
//! matches wins. Each rule names the capture group that carries the extracted text, so the
//! lists stay pure data and the callers only decide what to do with the extracted string.

use regex::Regex;

/// A single extraction rule.
#[derive(Debug, Clone)]
pub struct PatternRule {
    name: &'static str,
    regex: Regex,
    capture_group: usize,
}

impl PatternRule {
    /// Compile a rule. The last capture group is extracted (the whole match when the
    /// pattern has no groups).
    pub fn new(name: &'static str, pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(pattern)?;
        let capture_group = regex.captures_len().saturating_sub(1);
        Ok(Self {
            name,
            regex,
            capture_group,
        })
    }

    /// A rule matching `literal` verbatim anywhere in the text.
    pub fn literal(name: &'static str, literal: &str) -> Self {
        Self {
            name,
            regex: Regex::new(&regex::escape(literal)).expect("escaped literal is a valid regex"),
            capture_group: 0,
        }
    }

    /// Rule name (used in logs).
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the rule matches anywhere in `text`.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// The extracted capture of the first match in `text`.
    pub fn extract<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.regex
            .captures(text)?
            .get(self.capture_group)
            .map(|m| m.as_str())
    }
}

/// The outcome of [`PatternList::first_match`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternMatch<'t> {
    /// Name of the rule that matched.
    pub rule: &'static str,
    /// Extracted text.
    pub text: &'t str,
}

/// A prioritized list of rules.
#[derive(Debug, Clone, Default)]
pub struct PatternList {
    rules: Vec<PatternRule>,
}

impl PatternList {
    /// Create a list; earlier rules take priority.
    pub fn new(rules: Vec<PatternRule>) -> Self {
        Self { rules }
    }

    /// Extract from the first rule that matches `text`.
    ///
    /// A rule whose capture group did not participate in the match is skipped.
    pub fn first_match<'t>(&self, text: &'t str) -> Option<PatternMatch<'t>> {
        self.rules.iter().find_map(|rule| {
            rule.extract(text).map(|extracted| PatternMatch {
                rule: rule.name,
                text: extracted,
            })
        })
    }

    /// Whether any rule matches `text`.
    pub fn any_match(&self, text: &str) -> bool {
        self.rules.iter().any(|rule| rule.is_match(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list() -> PatternList {
        PatternList::new(vec![
            PatternRule::new("type", r"invalid type (.+)").unwrap(),
            PatternRule::new("field", r#"unknown field "(.+)""#).unwrap(),
        ])
    }

    #[test]
    fn test_first_rule_wins() {
        let found = list()
            .first_match(r#"unknown field "x": invalid type trit"#)
            .unwrap();
        assert_eq!(found.rule, "type");
        assert_eq!(found.text, "trit");
    }

    #[test]
    fn test_falls_through_to_later_rules() {
        let found = list().first_match(r#"json: unknown field "podDisruptive""#).unwrap();
        assert_eq!(found.rule, "field");
        assert_eq!(found.text, "podDisruptive");
    }

    #[test]
    fn test_no_match() {
        assert_eq!(list().first_match("all good"), None);
        assert!(!list().any_match("all good"));
    }

    #[test]
    fn test_literal_escapes_metacharacters() {
        let rule = PatternRule::literal("dots", "a.b (c)");
        assert!(rule.is_match("x a.b (c) y"));
        assert!(!rule.is_match("axb (c)"));
        assert_eq!(rule.extract("x a.b (c) y"), Some("a.b (c)"));
    }

    #[test]
    fn test_last_capture_group_is_extracted() {
        let rule = PatternRule::new("pos", r"(\d+):(\d+)$").unwrap();
        assert_eq!(rule.extract("a.cue:32:8"), Some("8"));
    }
}
