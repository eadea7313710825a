//! Ant-style path patterns for route rules.
//!
//! # Pattern Syntax
//!
//! - `?` matches exactly one character
//! - `*` matches zero or more characters within a path segment
//! - `**` matches zero or more path segments
//! - `{name}` matches exactly one path segment
//!
//! Empty segments are ignored on both sides, so `/home` and `/home/` are the
//! same path. The pattern `/` matches only the root.
//!
//! # Examples
//!
//! ```rust
//! use access_gate_core::http::security::ant_matcher::AntMatcher;
//!
//! let matcher = AntMatcher::new("/static/**");
//! assert!(matcher.matches("/static/css/site.css"));
//!
//! let matcher = AntMatcher::new("/users/*/profile");
//! assert!(matcher.matches("/users/123/profile"));
//! assert!(!matcher.matches("/users/123/456/profile"));
//! ```

/// A compiled Ant-style path pattern.
#[derive(Debug, Clone)]
pub struct AntMatcher {
    pattern: String,
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    /// `*` or `{name}`
    AnySegment,
    /// `**`
    AnyPath,
    /// Segment containing `*` or `?`
    Glob(Vec<char>),
}

impl AntMatcher {
    pub fn new(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .filter(|part| !part.is_empty())
            .map(|part| match part {
                "**" => Segment::AnyPath,
                "*" => Segment::AnySegment,
                _ if part.starts_with('{') && part.ends_with('}') => Segment::AnySegment,
                _ if part.contains('*') || part.contains('?') => {
                    Segment::Glob(part.chars().collect())
                }
                _ => Segment::Literal(part.to_string()),
            })
            .collect();

        Self {
            pattern: pattern.to_string(),
            segments,
        }
    }

    /// Get the original pattern string
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Check if the given path matches this pattern.
    ///
    /// A query string, if present, is not part of the match.
    pub fn matches(&self, path: &str) -> bool {
        let path = path.split('?').next().unwrap_or_default();
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        self.match_segments(&self.segments, &parts)
    }

    fn match_segments(&self, segments: &[Segment], parts: &[&str]) -> bool {
        match (segments.split_first(), parts.split_first()) {
            (None, None) => true,
            (None, Some(_)) => false,
            (Some((Segment::AnyPath, rest)), _) => {
                (0..=parts.len()).any(|skip| self.match_segments(rest, &parts[skip..]))
            }
            (Some(_), None) => false,
            (Some((segment, rest)), Some((part, remaining))) => {
                let hit = match segment {
                    Segment::Literal(literal) => literal.as_str() == *part,
                    Segment::AnySegment => true,
                    Segment::Glob(glob) => {
                        let text: Vec<char> = part.chars().collect();
                        self.match_glob(glob, &text)
                    }
                    Segment::AnyPath => unreachable!("handled above"),
                };
                hit && self.match_segments(rest, remaining)
            }
        }
    }

    fn match_glob(&self, glob: &[char], text: &[char]) -> bool {
        match glob.split_first() {
            None => text.is_empty(),
            Some(('*', rest)) => (0..=text.len()).any(|skip| self.match_glob(rest, &text[skip..])),
            Some((expected, rest)) => match text.split_first() {
                None => false,
                Some((actual, remaining)) => {
                    (*expected == '?' || expected == actual)
                        && self.match_glob(rest, remaining)
                }
            },
        }
    }
}
