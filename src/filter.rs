//! Subject filtering for -e subject= expressions
//!
//! Supports:
//! - Individual subjects: -e subject=MATH,PHYS
//! - Regex patterns between slashes: -e subject=/^COM/
//! - A mix of both: -e subject=MATH,/^COM/
//!
//! The filter only restricts what is printed. Counting and duplicate
//! detection always see every record.

use crate::error::{AggregateError, Result};
use regex::Regex;
use std::collections::HashSet;

/// Subject filter that determines which subjects appear in the summary
#[derive(Debug, Clone)]
pub struct SubjectFilter {
    /// Set of subject names to include (None = all subjects)
    include: Option<HashSet<String>>,
    /// Regex patterns, any match includes the subject
    patterns: Vec<Regex>,
}

impl SubjectFilter {
    /// Create a filter that includes all subjects
    pub fn all() -> Self {
        Self {
            include: None,
            patterns: Vec::new(),
        }
    }

    /// Parse a filter expression like "subject=MATH,PHYS" or "subject=/^MA/"
    pub fn from_expr(expr: &str) -> Result<Self> {
        if let Some(spec) = expr.strip_prefix("subject=") {
            Self::from_subject_spec(spec)
        } else {
            Err(AggregateError::InvalidFilter(format!(
                "{}. Expected format: subject=SPEC",
                expr
            )))
        }
    }

    /// Parse a subject specification (the part after "subject=")
    fn from_subject_spec(spec: &str) -> Result<Self> {
        let mut subjects = HashSet::new();
        let mut patterns = Vec::new();

        for part in spec.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            if let Some(pattern) = part
                .strip_prefix('/')
                .and_then(|rest| rest.strip_suffix('/'))
            {
                let regex = Regex::new(pattern).map_err(|e| {
                    AggregateError::InvalidFilter(format!("bad regex /{}/: {}", pattern, e))
                })?;
                patterns.push(regex);
            } else {
                subjects.insert(part.to_string());
            }
        }

        Ok(Self {
            include: Some(subjects),
            patterns,
        })
    }

    /// Check if a subject should be shown
    pub fn should_show(&self, subject: &str) -> bool {
        match &self.include {
            None => true,
            Some(set) => {
                set.contains(subject) || self.patterns.iter().any(|re| re.is_match(subject))
            }
        }
    }

    /// True when the filter lets everything through
    pub fn is_all(&self) -> bool {
        self.include.is_none()
    }
}

impl Default for SubjectFilter {
    fn default() -> Self {
        Self::all()
    }
}
