use std::fmt;

use serde::{Deserialize, Serialize};

/// How scripts declared at different scopes are composed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ScriptFlow {
    /// Pre-request code runs outermost scope first, post-response code runs
    /// innermost first. Every scope contributes.
    #[default]
    Sandwich,
    /// Each scope replaces the code of the scope above it, kind by kind.
    Sequential,
}

impl ScriptFlow {
    pub fn as_str(self) -> &'static str {
        match self {
            ScriptFlow::Sandwich => "sandwich",
            ScriptFlow::Sequential => "sequential",
        }
    }
}

impl fmt::Display for ScriptFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do when a selector matches more than one request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AmbiguityPolicy {
    /// Refuse to pick; resolution fails with
    /// [`AmbiguousTarget`](crate::ReqscopeError::AmbiguousTarget).
    #[default]
    Error,
    /// Use the first match in depth-first, pre-order traversal order.
    FirstMatch,
}

impl AmbiguityPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            AmbiguityPolicy::Error => "error",
            AmbiguityPolicy::FirstMatch => "first-match",
        }
    }
}

impl fmt::Display for AmbiguityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
