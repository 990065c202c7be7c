// Copyright (c) 2026 Solon Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Behavior Patterns
//!
//! A pattern is a whitespace-separated template of literal words and named
//! capture slots, e.g. `open cursor {repo}`. Patterns are compiled once at
//! load time into an ordered [`PatternToken`] sequence; matching an input is
//! then a scan over the input tokens, never a runtime string evaluation.
//!
//! ## Matching Rules
//!
//! - Comparison is case-insensitive and whitespace-normalized.
//! - Every literal must appear in the input in pattern order, but literals
//!   need not be contiguous.
//! - A slot captures the input tokens strictly between its surrounding
//!   literal anchors (or the start/end of the input), joined by one space.
//!   A slot must capture at least one token.
//! - The leftmost assignment of literals that satisfies every slot wins.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

/// One element of a compiled pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternToken {
    /// A lowercased word that must appear in the input.
    Literal(String),
    /// A named capture slot.
    Slot(String),
}

/// Errors raised while compiling pattern text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern is empty")]
    Empty,

    #[error("malformed token '{0}': braces must wrap a whole word, e.g. {{repo}}")]
    MalformedToken(String),

    #[error("invalid slot name '{0}'")]
    InvalidSlotName(String),

    #[error("slot '{0}' appears more than once")]
    DuplicateSlot(String),

    #[error("slots '{0}' and '{1}' are adjacent; separate them with a literal word")]
    AdjacentSlots(String, String),

    #[error("pattern has no literal words")]
    NoLiterals,
}

/// Captured parameter values for a single input command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterBinding(BTreeMap<String, String>);

impl ParameterBinding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// A compiled behavior pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    tokens: Vec<PatternToken>,
}

fn slot_name_regex() -> &'static Regex {
    static SLOT_NAME: OnceLock<Regex> = OnceLock::new();
    SLOT_NAME.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("slot name regex is valid")
    })
}

impl Pattern {
    /// Compile pattern text into a token sequence.
    pub fn compile(source: &str) -> Result<Self, PatternError> {
        let mut tokens = Vec::new();
        let mut seen_slots = HashSet::new();

        for word in source.split_whitespace() {
            let token = if let Some(inner) = word.strip_prefix('{') {
                let name = inner
                    .strip_suffix('}')
                    .ok_or_else(|| PatternError::MalformedToken(word.to_string()))?;
                if name.contains('{') || name.contains('}') {
                    return Err(PatternError::MalformedToken(word.to_string()));
                }
                if !slot_name_regex().is_match(name) {
                    return Err(PatternError::InvalidSlotName(name.to_string()));
                }
                if !seen_slots.insert(name.to_string()) {
                    return Err(PatternError::DuplicateSlot(name.to_string()));
                }
                PatternToken::Slot(name.to_string())
            } else {
                if word.contains('{') || word.contains('}') {
                    return Err(PatternError::MalformedToken(word.to_string()));
                }
                PatternToken::Literal(word.to_lowercase())
            };

            if let (Some(PatternToken::Slot(prev)), PatternToken::Slot(next)) =
                (tokens.last(), &token)
            {
                return Err(PatternError::AdjacentSlots(prev.clone(), next.clone()));
            }
            tokens.push(token);
        }

        if tokens.is_empty() {
            return Err(PatternError::Empty);
        }
        if !tokens.iter().any(|t| matches!(t, PatternToken::Literal(_))) {
            return Err(PatternError::NoLiterals);
        }

        Ok(Self {
            source: source.split_whitespace().collect::<Vec<_>>().join(" "),
            tokens,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn tokens(&self) -> &[PatternToken] {
        &self.tokens
    }

    /// Number of literal words; the specificity used for tie-breaking.
    pub fn literal_count(&self) -> usize {
        self.tokens
            .iter()
            .filter(|t| matches!(t, PatternToken::Literal(_)))
            .count()
    }

    /// Tie-break key: literal words first, then capture slots.
    ///
    /// `open cursor {repo}` outranks `open cursor` for inputs both accept.
    pub fn specificity(&self) -> (usize, usize) {
        let literals = self.literal_count();
        (literals, self.tokens.len() - literals)
    }

    pub fn slot_names(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().filter_map(|t| match t {
            PatternToken::Slot(name) => Some(name.as_str()),
            PatternToken::Literal(_) => None,
        })
    }

    pub fn has_slot(&self, name: &str) -> bool {
        self.slot_names().any(|slot| slot == name)
    }

    /// Match input text, returning the captured parameters on success.
    pub fn match_input(&self, input: &str) -> Option<ParameterBinding> {
        let words: Vec<&str> = input.split_whitespace().collect();
        let lowered: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();

        let anchors = self.place(&lowered)?;

        let mut binding = ParameterBinding::new();
        for (index, token) in self.tokens.iter().enumerate() {
            if let PatternToken::Slot(name) = token {
                let (start, end) = self.slot_span(index, &anchors, words.len());
                binding.insert(name.clone(), words[start..end].join(" "));
            }
        }
        Some(binding)
    }

    /// Place every literal at its earliest input position after the
    /// previous anchor, leaving each slot at least one word.
    ///
    /// An earlier anchor never rules out a later placement, so the greedy
    /// scan finds the leftmost assignment in one linear pass.
    ///
    /// `anchors[i]` holds the input position of literal token `i`; slot
    /// entries hold a placeholder and are resolved from their neighbours.
    fn place(&self, input: &[String]) -> Option<Vec<usize>> {
        let mut anchors = Vec::with_capacity(self.tokens.len());
        let mut from = 0;

        for token in &self.tokens {
            match token {
                PatternToken::Slot(_) => {
                    if from >= input.len() {
                        return None;
                    }
                    anchors.push(usize::MAX);
                    from += 1;
                }
                PatternToken::Literal(word) => {
                    let position = from + input[from..].iter().position(|w| w == word)?;
                    anchors.push(position);
                    from = position + 1;
                }
            }
        }
        Some(anchors)
    }

    fn slot_span(&self, slot_index: usize, anchors: &[usize], input_len: usize) -> (usize, usize) {
        let start = slot_index
            .checked_sub(1)
            .map(|prev| anchors[prev] + 1)
            .unwrap_or(0);
        let end = anchors
            .get(slot_index + 1)
            .copied()
            .unwrap_or(input_len);
        (start, end)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
