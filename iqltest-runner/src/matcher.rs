// Copyright (c) The iqltest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ordered-subsequence matching of expected patterns against output lines.

use crate::errors::PatternCompileError;
use regex::Regex;

/// A compiled list of expected patterns.
///
/// Each pattern is anchored at the start of a line but not at the end, so `name` matches the line
/// `name,id`.
#[derive(Clone, Debug)]
pub struct ExpectedPatterns {
    patterns: Vec<(String, Regex)>,
}

impl ExpectedPatterns {
    /// Compiles the given patterns.
    pub fn new(patterns: &[impl AsRef<str>]) -> Result<Self, PatternCompileError> {
        let patterns = patterns
            .iter()
            .enumerate()
            .map(|(index, pattern)| {
                let pattern = pattern.as_ref();
                let regex = Regex::new(&format!("^(?:{pattern})"))
                    .map_err(|err| PatternCompileError::new(index, pattern, err))?;
                Ok((pattern.to_owned(), regex))
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { patterns })
    }

    /// Returns true if there are no patterns.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Matches the patterns against `lines`.
    ///
    /// Patterns must match distinct lines in order; any number of lines may come before, between
    /// or after the matching ones. Each line is tested against the next pattern only.
    pub fn match_lines(&self, lines: &[impl AsRef<str>]) -> MatchOutcome {
        let mut next = 0;
        for line in lines {
            let Some((_, regex)) = self.patterns.get(next) else {
                break;
            };
            if regex.is_match(line.as_ref()) {
                next += 1;
            }
        }

        match self.patterns.get(next) {
            None => MatchOutcome::Matched,
            Some((pattern, _)) => MatchOutcome::Unmatched {
                index: next,
                pattern: pattern.clone(),
            },
        }
    }
}

/// The result of [`ExpectedPatterns::match_lines`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MatchOutcome {
    /// Every pattern matched.
    Matched,

    /// The pattern at `index` was never matched.
    Unmatched {
        /// The index of the first unmatched pattern.
        index: usize,

        /// The uncompiled pattern.
        pattern: String,
    },
}

impl MatchOutcome {
    /// Returns true if every pattern matched.
    pub fn is_matched(&self) -> bool {
        matches!(self, MatchOutcome::Matched)
    }
}
