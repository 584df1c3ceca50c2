//! # Name Resolution
//!
//! Tolerant matching of a typed name against a set of known names (plans,
//! siege engines). Stages run in order and stop at the first one that
//! produces any match:
//!
//! 1. exact (case-sensitive first, then case-insensitive or normalized)
//! 2. prefix
//! 3. substring
//! 4. edit distance ≤ 1 (queries of up to 4 characters) or ≤ 2 (longer)
//!
//! "Normalized" means lowercase alphanumerics only, so `"Old Keep"`,
//! `"old-keep"` and `"OLDKEEP"` all compare equal. A stage with one match
//! resolves; a stage with several returns them as suggestions.
//!
//! ## Example
//!
//! ```rust
//! use fort_core::resolver::resolve;
//!
//! let plans = ["North Tower", "South Tower", "Keep"];
//! assert_eq!(resolve(&plans, "kep").resolved.as_deref(), Some("Keep"));
//!
//! let r = resolve(&plans, "tower");
//! assert!(r.resolved.is_none());
//! assert_eq!(r.suggestions, vec!["North Tower", "South Tower"]);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{FortError, FortResult, MAX_SUGGESTIONS};

/// Outcome of resolving a query against a candidate list
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Resolution {
    /// The single matching name, if the match was unique
    pub resolved: Option<String>,
    /// Competing names when the match was ambiguous (at most 8)
    pub suggestions: Vec<String>,
}

impl Resolution {
    fn unique(name: &str) -> Self {
        Resolution {
            resolved: Some(name.to_string()),
            suggestions: Vec::new(),
        }
    }

    fn from_matches(matches: Vec<&str>) -> Option<Self> {
        match matches.len() {
            0 => None,
            1 => Some(Resolution::unique(matches[0])),
            _ => Some(Resolution {
                resolved: None,
                suggestions: matches
                    .into_iter()
                    .take(MAX_SUGGESTIONS)
                    .map(str::to_string)
                    .collect(),
            }),
        }
    }
}

/// Lowercase alphanumerics only
pub fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

struct Candidate<'a> {
    name: &'a str,
    lower: String,
    norm: String,
}

/// Resolve `query` against `candidates`.
///
/// Returns a unique name, or suggestions when several names tie, or an
/// empty [`Resolution`] when nothing is close enough.
pub fn resolve<S: AsRef<str>>(candidates: &[S], query: &str) -> Resolution {
    let query = query.trim();
    if query.is_empty() {
        return Resolution::default();
    }

    let pool: Vec<Candidate<'_>> = candidates
        .iter()
        .map(|c| {
            let name: &str = c.as_ref();
            Candidate {
                name,
                lower: name.to_lowercase(),
                norm: normalize(name),
            }
        })
        .collect();

    if let Some(exact) = pool.iter().find(|c| c.name == query) {
        return Resolution::unique(exact.name);
    }

    let q_lower = query.to_lowercase();
    let q_norm = normalize(query);

    let stage = |test: &dyn Fn(&str, &str) -> bool| -> Option<Resolution> {
        let matches: Vec<&str> = pool
            .iter()
            .filter(|c| {
                test(c.lower.as_str(), q_lower.as_str())
                    || (!q_norm.is_empty() && test(c.norm.as_str(), q_norm.as_str()))
            })
            .map(|c| c.name)
            .collect();
        Resolution::from_matches(matches)
    };

    if let Some(r) = stage(&|c, q| c == q) {
        return r;
    }
    if let Some(r) = stage(&|c, q| c.starts_with(q)) {
        return r;
    }
    if let Some(r) = stage(&|c, q| c.contains(q)) {
        return r;
    }

    // threshold follows the query as typed, not its normalized form
    let threshold = if query.chars().count() <= 4 { 1 } else { 2 };
    let form = if q_norm.is_empty() { &q_lower } else { &q_norm };
    fuzzy_match(&pool, form, threshold).unwrap_or_default()
}

/// Edit-distance stage: compare against both the full candidate and its
/// prefix of the query's length, keep the best if within `threshold`.
fn fuzzy_match(pool: &[Candidate<'_>], query: &str, threshold: usize) -> Option<Resolution> {
    let query_len = query.chars().count();

    let scored: Vec<(usize, &str)> = pool
        .iter()
        .map(|c| {
            let form = if c.norm.is_empty() { &c.lower } else { &c.norm };
            let truncated: String = form.chars().take(query_len).collect();
            let distance = levenshtein(query, &truncated).min(levenshtein(query, form));
            (distance, c.name)
        })
        .collect();

    let best = scored.iter().map(|(d, _)| *d).min()?;
    if best > threshold {
        return None;
    }

    let matches = scored
        .into_iter()
        .filter(|(d, _)| *d == best)
        .map(|(_, name)| name)
        .collect();
    Resolution::from_matches(matches)
}

/// Resolve or fail with `NotFound` / `Ambiguous` naming the entity `kind`
pub fn resolve_name<S: AsRef<str>>(candidates: &[S], query: &str, kind: &str) -> FortResult<String> {
    let resolution = resolve(candidates, query);
    match resolution.resolved {
        Some(name) => Ok(name),
        None if resolution.suggestions.is_empty() => Err(FortError::not_found(kind, query)),
        None => Err(FortError::ambiguous(kind, query, resolution.suggestions)),
    }
}

/// Levenshtein distance over chars.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (m, n) = (a.len(), b.len());
    let mut dp = vec![vec![0usize; n + 1]; m + 1];
    for (i, row) in dp.iter_mut().enumerate() {
        row[0] = i;
    }
    for (j, val) in dp[0].iter_mut().enumerate() {
        *val = j;
    }
    for i in 1..=m {
        for j in 1..=n {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            dp[i][j] = (dp[i - 1][j] + 1)
                .min(dp[i][j - 1] + 1)
                .min(dp[i - 1][j - 1] + cost);
        }
    }
    dp[m][n]
}
