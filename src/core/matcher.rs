//! Exact and wildcard state references.
//!
//! A transition endpoint is either a literal state name or a regular
//! expression written as `regex:/<pattern>/` (states that match) or
//! `not-regex:/<pattern>/` (states that do not match). Patterns are compiled
//! once when the matcher is parsed and evaluated against literal state names
//! at resolution time, so a wildcard applies to states added later.

use crate::builder::ConfigError;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

const INCLUDE_PREFIX: &str = "regex:";
const EXCLUDE_PREFIX: &str = "not-regex:";

/// Reference to one or more states on either side of a transition.
///
/// # Example
///
/// ```rust
/// use switchyard::core::StateMatcher;
///
/// let any = StateMatcher::parse("regex:/.*/").unwrap();
/// let not_idle = StateMatcher::parse("not-regex:/start|normal/").unwrap();
/// let exact = StateMatcher::parse("fighting").unwrap();
///
/// assert!(any.matches("fighting"));
/// assert!(not_idle.matches("fighting"));
/// assert!(!not_idle.matches("normal"));
/// assert!(exact.matches("fighting"));
/// assert!(!exact.matches("fight"));
/// ```
#[derive(Clone, Debug)]
pub enum StateMatcher {
    /// Matches the literal name only.
    Exact(String),
    /// Matches every state name the pattern finds a match in.
    Include(Regex),
    /// Matches every state name the pattern finds no match in.
    Exclude(Regex),
}

impl StateMatcher {
    /// Parse the textual form of a matcher.
    ///
    /// Anything without a `regex:` or `not-regex:` prefix is an exact name.
    /// Prefixed forms must wrap the pattern in slashes.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        if let Some(rest) = raw.strip_prefix(EXCLUDE_PREFIX) {
            return compile(raw, rest).map(Self::Exclude);
        }
        if let Some(rest) = raw.strip_prefix(INCLUDE_PREFIX) {
            return compile(raw, rest).map(Self::Include);
        }
        if raw.is_empty() {
            return Err(ConfigError::EmptyStateName);
        }
        Ok(Self::Exact(raw.to_string()))
    }

    pub fn exact(name: impl Into<String>) -> Self {
        Self::Exact(name.into())
    }

    /// Evaluate the matcher against a literal state name.
    pub fn matches(&self, state: &str) -> bool {
        match self {
            Self::Exact(name) => name == state,
            Self::Include(regex) => regex.is_match(state),
            Self::Exclude(regex) => !regex.is_match(state),
        }
    }

    pub fn is_pattern(&self) -> bool {
        !matches!(self, Self::Exact(_))
    }

    /// The literal name for [`StateMatcher::Exact`], `None` for patterns.
    pub fn exact_name(&self) -> Option<&str> {
        match self {
            Self::Exact(name) => Some(name),
            _ => None,
        }
    }
}

fn compile(raw: &str, delimited: &str) -> Result<Regex, ConfigError> {
    let pattern = delimited
        .strip_prefix('/')
        .and_then(|p| p.strip_suffix('/'))
        .ok_or_else(|| ConfigError::MalformedWildcard(raw.to_string()))?;

    Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
        raw: raw.to_string(),
        message: e.to_string(),
    })
}

impl fmt::Display for StateMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(name) => f.write_str(name),
            Self::Include(regex) => write!(f, "{INCLUDE_PREFIX}/{}/", regex.as_str()),
            Self::Exclude(regex) => write!(f, "{EXCLUDE_PREFIX}/{}/", regex.as_str()),
        }
    }
}

impl FromStr for StateMatcher {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl PartialEq for StateMatcher {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}
