/*!
 * Sentinel-token integrity verification and repair.
 *
 * After dispatch, the ordered token sequence of the translated output is
 * compared against the pre-translation sequence. LLM-class providers get a
 * repair pass first: hallucinated duplicate tokens and unknown tokens are
 * stripped. No permutation correction is ever attempted — silently
 * reordering tokens would misplace formulas or code in the final document.
 */

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use crate::errors::TranslationError;

static TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[COF_(?:FORMULA|CODE)_\d+\]\]").unwrap());

/// Ordered sentinel-token occurrences in `text`
pub fn extract_tokens(text: &str) -> Vec<String> {
    TOKEN.find_iter(text).map(|m| m.as_str().to_string()).collect()
}

/// Comparison of expected vs. observed token populations. Carries counts
/// only, never region content.
#[derive(Debug, Clone)]
pub struct IntegrityReport {
    /// Expected token multiset (token → count)
    pub expected: HashMap<String, usize>,
    /// Observed token multiset
    pub got: HashMap<String, usize>,
    /// Number of expected occurrences absent from the output
    pub missing: usize,
    /// Number of observed occurrences that were not expected
    pub extra: usize,
    /// Whether the observed sequence matches the expected sequence exactly
    pub order_preserved: bool,
}

impl IntegrityReport {
    /// Compare two ordered token sequences
    pub fn compare(expected: &[String], got: &[String]) -> Self {
        let expected_counts = count(expected);
        let got_counts = count(got);

        let missing: usize = expected_counts
            .iter()
            .map(|(token, &n)| n.saturating_sub(got_counts.get(token).copied().unwrap_or(0)))
            .sum();
        let extra: usize = got_counts
            .iter()
            .map(|(token, &n)| n.saturating_sub(expected_counts.get(token).copied().unwrap_or(0)))
            .sum();

        Self {
            expected: expected_counts,
            got: got_counts,
            missing,
            extra,
            order_preserved: expected == got,
        }
    }

    /// Whether the multisets match (order ignored)
    pub fn population_matches(&self) -> bool {
        self.missing == 0 && self.extra == 0
    }

    fn into_error(self) -> TranslationError {
        TranslationError::Integrity {
            missing: self.missing,
            extra: self.extra,
            order_preserved: self.order_preserved,
            expected_total: self.expected.values().sum(),
            got_total: self.got.values().sum(),
        }
    }
}

fn count(tokens: &[String]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for token in tokens {
        *counts.entry(token.clone()).or_insert(0) += 1;
    }
    counts
}

/// Strip token occurrences exceeding their expected multiplicity and token
/// occurrences not in the expected set at all. Used only for LLM-class
/// providers, which may duplicate or invent tokens.
pub fn repair_tokens(expected: &[String], output: &str) -> String {
    let budget = count(expected);
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut stripped = 0usize;

    let repaired = TOKEN
        .replace_all(output, |caps: &regex::Captures<'_>| {
            let token = caps.get(0).unwrap().as_str();
            let allowed = budget.get(token).copied().unwrap_or(0);
            let used = seen.entry(token.to_string()).or_insert(0);
            if *used < allowed {
                *used += 1;
                token.to_string()
            } else {
                stripped += 1;
                String::new()
            }
        })
        .into_owned();

    if stripped > 0 {
        warn!("integrity repair stripped {} surplus token occurrence(s)", stripped);
    }
    repaired
}

/// Verify the translated output against the pre-translation content.
///
/// For LLM providers the repair pass runs first, and the repaired sequence
/// must then match the expected sequence exactly, including order. For all
/// providers the token multisets must be equal. Any failure rejects the
/// whole translation; restoration is never run on unverified output.
pub fn verify_and_repair(
    source: &str,
    output: &str,
    is_llm: bool,
) -> Result<String, TranslationError> {
    let expected = extract_tokens(source);

    let output = if is_llm {
        let repaired = repair_tokens(&expected, output);
        let got = extract_tokens(&repaired);
        let report = IntegrityReport::compare(&expected, &got);
        if !report.order_preserved {
            debug!(
                "repaired token sequence mismatch: {} missing, {} extra",
                report.missing, report.extra
            );
            return Err(report.into_error());
        }
        repaired
    } else {
        output.to_string()
    };

    let got = extract_tokens(&output);
    let report = IntegrityReport::compare(&expected, &got);
    if !report.population_matches() {
        return Err(report.into_error());
    }
    Ok(output)
}
