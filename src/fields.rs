//! Field-name lookup table and whole-token substitution.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::context::EvaluationContext;

static ARITHMETIC_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9\s+\-*/().]+$").unwrap());
static DISALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9\s+\-*/().]").unwrap());
static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*").unwrap());

/// True when `s` holds nothing but digits, whitespace and `+ - * / ( ) .`.
pub fn is_arithmetic(s: &str) -> bool {
    ARITHMETIC_ONLY.is_match(s)
}

/// Distinct characters outside the arithmetic class, in order of appearance.
pub fn disallowed_chars(s: &str) -> Vec<char> {
    DISALLOWED
        .find_iter(s)
        .filter_map(|m| m.as_str().chars().next())
        .unique()
        .collect()
}

/// Identifier-shaped tokens, deduplicated, in order of appearance.
pub fn identifiers(s: &str) -> Vec<&str> {
    IDENTIFIER.find_iter(s).map(|m| m.as_str()).unique().collect()
}

/// Names a formula may use, each mapped to the literal that replaces it.
///
/// With case variants on, every name is also registered upper- and
/// lower-cased. Originals win over variants and upper-case variants win over
/// lower-case ones, so `amount` and `Amount` in one row never clobber each
/// other.
#[derive(Debug, Clone, Default)]
pub struct FieldTable {
    entries: HashMap<String, String>,
}

impl FieldTable {
    pub fn from_context(ctx: &EvaluationContext, case_variants: bool) -> Self {
        Self::build(
            ctx.iter().map(|(name, cell)| (name, format_operand(cell.as_operand()))),
            case_variants,
        )
    }

    /// Every name stands for `replacement`; used for syntax-only checks.
    pub fn from_names<S: AsRef<str>>(names: &[S], replacement: &str, case_variants: bool) -> Self {
        Self::build(
            names.iter().map(|n| (n.as_ref(), replacement.to_string())),
            case_variants,
        )
    }

    fn build<'a>(pairs: impl Iterator<Item = (&'a str, String)>, case_variants: bool) -> Self {
        let pairs: Vec<(&str, String)> = pairs.filter(|(name, _)| !name.is_empty()).collect();
        let mut entries = HashMap::with_capacity(pairs.len() * 3);
        for (name, lit) in &pairs {
            entries.insert(name.to_string(), lit.clone());
        }
        if case_variants {
            for (name, lit) in &pairs {
                entries.entry(name.to_uppercase()).or_insert_with(|| lit.clone());
            }
            for (name, lit) in &pairs {
                entries.entry(name.to_lowercase()).or_insert_with(|| lit.clone());
            }
        }
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Names longest first, ties broken lexically, so a name is always
    /// tried before any shorter name contained in it.
    pub fn substitution_order(&self) -> Vec<&str> {
        self.entries
            .keys()
            .map(String::as_str)
            .sorted_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)))
            .collect()
    }

    /// One alternation over the names that occur in `expression`, longest
    /// first. `None` when no name occurs at all.
    pub fn pattern_for(&self, expression: &str) -> Option<String> {
        let names: Vec<String> = self
            .substitution_order()
            .into_iter()
            .filter(|name| expression.contains(*name))
            .map(regex::escape)
            .collect();
        if names.is_empty() {
            return None;
        }
        Some(format!(r"\b(?:{})\b", names.join("|")))
    }

    /// Replace every whole-token occurrence of every name with its literal
    /// in a single left-to-right pass, so inserted literals are never
    /// matched again.
    pub fn substitute(&self, expression: &str, cache: &PatternCache) -> String {
        if self.is_empty() {
            return expression.to_string();
        }
        let Some(pattern) = self.pattern_for(expression) else {
            return expression.to_string();
        };
        let re = match cache.regex(&pattern) {
            Ok(re) => re,
            Err(e) => {
                tracing::warn!(%pattern, error = %e, "field names cannot be matched");
                return expression.to_string();
            }
        };
        re.replace_all(expression, |caps: &Captures| {
            let name = &caps[0];
            self.get(name).unwrap_or(name).to_string()
        })
        .into_owned()
    }
}

/// Most patterns kept before the cache starts over.
const MAX_CACHED_PATTERNS: usize = 512;

/// Compiled substitution patterns, shared by clones. Rows of one sheet have
/// the same field names, so a calculated column compiles its pattern once.
#[derive(Debug, Clone, Default)]
pub struct PatternCache {
    inner: Arc<Mutex<HashMap<String, Regex>>>,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn regex(&self, pattern: &str) -> Result<Regex, regex::Error> {
        // A poisoned lock only costs the cache, never the evaluation.
        let Ok(mut map) = self.inner.lock() else {
            return Regex::new(pattern);
        };
        if let Some(re) = map.get(pattern) {
            return Ok(re.clone());
        }
        let re = Regex::new(pattern)?;
        if map.len() >= MAX_CACHED_PATTERNS {
            tracing::debug!(size = map.len(), "pattern cache full, clearing");
            map.clear();
        }
        map.insert(pattern.to_string(), re.clone());
        Ok(re)
    }

    /// Number of distinct patterns compiled so far.
    pub fn compiled_count(&self) -> usize {
        self.inner.lock().map(|m| m.len()).unwrap_or(0)
    }
}

/// Literal text for an operand. Never uses exponent notation; infinities
/// come out as `inf`, which the character check then rejects.
pub fn format_operand(n: f64) -> String {
    format!("{n}")
}
