// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Broker subject naming and wildcard matching
//!
//! Events travel on `events.<topic>.<event_type>`. Because event types are
//! themselves dotted (`user.created`), a subject has the shape
//! `events.users.user.created`.

/// Namespace every event subject lives under
pub const SUBJECT_PREFIX: &str = "events";

/// Wildcard covering every event subject
pub const SUBJECT_WILDCARD: &str = "events.>";

/// Build the broker subject for a topic and event type
pub fn subject_for(topic: &str, event_type: &str) -> String {
    format!("{}.{}.{}", SUBJECT_PREFIX, topic, event_type)
}

/// Split a subject back into `(topic, event_type)`.
///
/// Returns None for subjects outside the event namespace or without a type.
pub fn parse_subject(subject: &str) -> Option<(&str, &str)> {
    let rest = subject.strip_prefix(SUBJECT_PREFIX)?.strip_prefix('.')?;
    let (topic, event_type) = rest.split_once('.')?;
    if topic.is_empty() || event_type.is_empty() {
        return None;
    }
    Some((topic, event_type))
}

/// Pattern for matching subjects
/// Supports:
///   - Exact: "events.users.user.created"
///   - Single wildcard: "events.*.user.created" matches one token
///   - Tail wildcard: "events.users.>" matches one or more remaining tokens
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubjectPattern(String);

impl SubjectPattern {
    pub fn new(pattern: &str) -> Self {
        Self(pattern.to_string())
    }

    /// Check if this pattern matches a concrete subject
    pub fn matches(&self, subject: &str) -> bool {
        // Empty pattern matches nothing
        if self.0.is_empty() || subject.is_empty() {
            return false;
        }

        let pattern_parts: Vec<&str> = self.0.split('.').collect();
        let subject_parts: Vec<&str> = subject.split('.').collect();

        Self::match_tokens(&pattern_parts, &subject_parts)
    }

    fn match_tokens(pattern: &[&str], subject: &[&str]) -> bool {
        match (pattern.first(), subject.first()) {
            (None, None) => true,
            // > needs at least one token to swallow
            (Some(&">"), Some(_)) => pattern.len() == 1,
            (Some(&"*"), Some(_)) => Self::match_tokens(&pattern[1..], &subject[1..]),
            (Some(p), Some(s)) if *p == *s => Self::match_tokens(&pattern[1..], &subject[1..]),
            _ => false,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SubjectPattern {
    fn default() -> Self {
        Self::new(SUBJECT_WILDCARD)
    }
}

impl std::fmt::Display for SubjectPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[path = "subject_tests.rs"]
mod tests;
