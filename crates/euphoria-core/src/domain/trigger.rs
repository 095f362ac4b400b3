//! Trigger words: a user-configurable matching rule.
//!
//! A rule is either a list of literal words/phrases or a single regular
//! expression.  On disk and on the wire the rule is tagged by `mode`:
//!
//! ```toml
//! [trigger_words]
//! mode = "list"
//! words = ["good girl", "treat"]
//! ```
//!
//! ```toml
//! [trigger_words]
//! mode = "regex"
//! pattern = "(?i)good (girl|kitty)"
//! ```
//!
//! The rule is compiled once into a [`TriggerMatcher`] and the matcher is then
//! applied to any number of messages.
//!
//! # List mode semantics
//!
//! Every word is escaped before being joined into an alternation, so a word
//! such as `"c++"` matches the literal text `c++` rather than being read as
//! regex syntax.  List matching is case-insensitive.  Blank entries are
//! skipped; a list with no usable words never matches anything.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Word that the default rule listens for.
pub const DEFAULT_TRIGGER_WORD: &str = "good girl";

/// Errors produced when compiling a [`TriggerWords`] rule.
#[derive(Debug, Error)]
pub enum TriggerError {
    /// The user-supplied pattern is not a valid regular expression.
    #[error("invalid trigger pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// The configured trigger rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum TriggerWords {
    /// Match any of these words or phrases.
    List { words: Vec<String> },
    /// Match this regular expression.
    Regex {
        #[serde(alias = "regex")]
        pattern: String,
    },
}

impl Default for TriggerWords {
    fn default() -> Self {
        TriggerWords::List {
            words: vec![DEFAULT_TRIGGER_WORD.to_string()],
        }
    }
}

impl TriggerWords {
    /// Short name of the active mode, as shown in the settings view.
    pub fn mode_name(&self) -> &'static str {
        match self {
            TriggerWords::List { .. } => "list",
            TriggerWords::Regex { .. } => "regex",
        }
    }

    /// Compiles the rule into a reusable matcher.
    ///
    /// # Errors
    ///
    /// Returns [`TriggerError::InvalidPattern`] when a regex-mode pattern does
    /// not compile.  List mode cannot fail because every word is escaped.
    pub fn compile(&self) -> Result<TriggerMatcher, TriggerError> {
        match self {
            TriggerWords::List { words } => {
                let alternatives: Vec<String> = words
                    .iter()
                    .map(|w| w.trim())
                    .filter(|w| !w.is_empty())
                    .map(regex::escape)
                    .collect();
                if alternatives.is_empty() {
                    return Ok(TriggerMatcher { regex: None });
                }
                let joined = alternatives.join("|");
                let regex = RegexBuilder::new(&joined)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| TriggerError::InvalidPattern {
                        pattern: joined.clone(),
                        source,
                    })?;
                Ok(TriggerMatcher { regex: Some(regex) })
            }
            TriggerWords::Regex { pattern } => {
                let regex = Regex::new(pattern).map_err(|source| TriggerError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })?;
                Ok(TriggerMatcher { regex: Some(regex) })
            }
        }
    }
}

/// A compiled trigger rule.
#[derive(Debug, Clone)]
pub struct TriggerMatcher {
    /// `None` for an empty word list.
    regex: Option<Regex>,
}

impl TriggerMatcher {
    /// Returns `true` when `text` contains a trigger.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.as_ref().is_some_and(|re| re.is_match(text))
    }

    /// Returns the first trigger occurrence in `text`.
    pub fn find<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.regex
            .as_ref()
            .and_then(|re| re.find(text))
            .map(|m| m.as_str())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn list(words: &[&str]) -> TriggerWords {
        TriggerWords::List {
            words: words.iter().map(|w| w.to_string()).collect(),
        }
    }

    #[test]
    fn test_default_rule_is_good_girl_list() {
        assert_eq!(TriggerWords::default(), list(&["good girl"]));
    }

    #[test]
    fn test_list_matches_case_insensitively() {
        let m = list(&["good girl"]).compile().unwrap();
        assert!(m.is_match("such a Good Girl today"));
        assert!(!m.is_match("good morning"));
    }

    #[test]
    fn test_list_escapes_regex_metacharacters() {
        // Arrange: "c++" would be an invalid/odd regex if not escaped.
        let m = list(&["c++", "a.b"]).compile().unwrap();

        // Act / Assert
        assert!(m.is_match("I write c++"));
        assert!(m.is_match("a.b"));
        assert!(!m.is_match("axb"), "dot must be literal");
    }

    #[test]
    fn test_list_find_returns_first_occurrence() {
        let m = list(&["treat", "reward"]).compile().unwrap();
        assert_eq!(m.find("a reward and a treat"), Some("reward"));
    }

    #[test]
    fn test_empty_list_never_matches() {
        let m = list(&[]).compile().unwrap();
        assert!(!m.is_match(""));
        assert!(!m.is_match("anything"));
        assert_eq!(m.find("anything"), None);
    }

    #[test]
    fn test_blank_words_are_ignored() {
        let m = list(&["", "   "]).compile().unwrap();
        assert!(!m.is_match("hello"));
    }

    #[test]
    fn test_regex_mode_uses_pattern_verbatim() {
        let rule = TriggerWords::Regex {
            pattern: r"good (girl|kitt(y|en))".to_string(),
        };
        let m = rule.compile().unwrap();
        assert!(m.is_match("good kitten"));
        // Regex mode is not forced case-insensitive.
        assert!(!m.is_match("GOOD KITTEN"));
    }

    #[test]
    fn test_invalid_regex_is_an_error_not_a_panic() {
        let rule = TriggerWords::Regex {
            pattern: "(unclosed".to_string(),
        };
        let err = rule.compile().unwrap_err();
        assert!(matches!(err, TriggerError::InvalidPattern { .. }));
        assert!(err.to_string().contains("(unclosed"));
    }

    #[test]
    fn test_list_mode_serializes_with_mode_tag() {
        let json = serde_json::to_value(list(&["good girl"])).unwrap();
        assert_eq!(json["mode"], "list");
        assert_eq!(json["words"][0], "good girl");
    }

    #[test]
    fn test_regex_mode_accepts_web_client_key() {
        // The web client's store used `regex` as the field name.
        let rule: TriggerWords =
            serde_json::from_str(r#"{"mode":"regex","regex":"treat"}"#).unwrap();
        assert_eq!(
            rule,
            TriggerWords::Regex {
                pattern: "treat".to_string()
            }
        );
    }

    #[test]
    fn test_mode_name() {
        assert_eq!(list(&[]).mode_name(), "list");
        let rule = TriggerWords::Regex {
            pattern: "x".to_string(),
        };
        assert_eq!(rule.mode_name(), "regex");
    }
}
