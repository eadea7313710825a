//! Route rules: the ordered path-pattern table that decides whether a request
//! needs an authenticated session.
//!
//! # Example
//! ```
//! use access_gate_core::http::security::{Access, RouteRules};
//!
//! let rules = RouteRules::new()
//!     .permit_all(&["/", "/home"])
//!     .any_request(Access::Protected);
//!
//! assert_eq!(rules.classify("/home"), Access::Public);
//! assert_eq!(rules.classify("/dashboard"), Access::Protected);
//! ```

use std::fmt;

use crate::http::security::ant_matcher::AntMatcher;

/// Access decision for a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Anyone may request the path.
    Public,
    /// The path requires an authenticated session.
    Protected,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::Public => write!(f, "public"),
            Access::Protected => write!(f, "protected"),
        }
    }
}

/// A single path pattern with its access decision.
#[derive(Debug, Clone)]
pub struct RouteRule {
    matcher: AntMatcher,
    access: Access,
}

impl RouteRule {
    pub fn new(pattern: &str, access: Access) -> Self {
        RouteRule {
            matcher: AntMatcher::new(pattern),
            access,
        }
    }

    pub fn public(pattern: &str) -> Self {
        Self::new(pattern, Access::Public)
    }

    pub fn protected(pattern: &str) -> Self {
        Self::new(pattern, Access::Protected)
    }

    pub fn matches(&self, path: &str) -> bool {
        self.matcher.matches(path)
    }

    pub fn get_pattern(&self) -> &str {
        self.matcher.pattern()
    }

    pub fn get_access(&self) -> Access {
        self.access
    }

    pub fn requires_auth(&self) -> bool {
        self.access == Access::Protected
    }
}

/// Ordered rule set. The first matching rule wins; unmatched paths get the
/// default decision, which is [`Access::Protected`] unless changed with
/// [`RouteRules::any_request`].
#[derive(Debug, Clone)]
pub struct RouteRules {
    rules: Vec<RouteRule>,
    default_access: Access,
}

impl RouteRules {
    pub fn new() -> Self {
        RouteRules {
            rules: Vec::new(),
            default_access: Access::Protected,
        }
    }

    /// Appends a rule after the existing ones.
    pub fn add_rule(mut self, rule: RouteRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Appends one public rule per pattern.
    pub fn permit_all(self, patterns: &[&str]) -> Self {
        patterns
            .iter()
            .fold(self, |rules, pattern| rules.add_rule(RouteRule::public(pattern)))
    }

    /// Appends one protected rule per pattern.
    pub fn authenticated(self, patterns: &[&str]) -> Self {
        patterns
            .iter()
            .fold(self, |rules, pattern| rules.add_rule(RouteRule::protected(pattern)))
    }

    /// Sets the decision for paths no rule matches.
    pub fn any_request(mut self, access: Access) -> Self {
        self.default_access = access;
        self
    }

    /// Returns the decision of the first matching rule, or the default.
    pub fn classify(&self, path: &str) -> Access {
        self.rules
            .iter()
            .find(|rule| rule.matches(path))
            .map(RouteRule::get_access)
            .unwrap_or(self.default_access)
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }
}

impl Default for RouteRules {
    fn default() -> Self {
        Self::new()
    }
}
