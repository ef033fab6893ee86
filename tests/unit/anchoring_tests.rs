/*!
 * Unit tests for protected-region anchoring and restoration.
 */

use anchorlate::anchoring::{anchor, restore};
use anchorlate::validation::extract_tokens;

use crate::common::rich_document;

#[test]
fn test_anchor_scenario_input_should_yield_one_formula_and_one_code_anchor() {
    let html = "<p>A <math><mi>x</mi></math> B <pre><code>print('hi')</code></pre> C</p>";
    let (anchored, table) = anchor(html);

    assert_eq!(table.formulas.len(), 1);
    assert_eq!(table.codes.len(), 1);
    assert_eq!(extract_tokens(&anchored).len(), 2);
}

#[test]
fn test_restore_after_token_swap_should_relocate_both_regions() {
    let html = "<p>A <math><mi>x</mi></math> B <pre><code>print('hi')</code></pre> C</p>";
    let (anchored, table) = anchor(html);

    let swapped = anchored
        .replace("[[COF_FORMULA_0]]", "\u{0}")
        .replace("[[COF_CODE_1]]", "[[COF_FORMULA_0]]")
        .replace('\u{0}', "[[COF_CODE_1]]");
    let restored = restore(&swapped, &table, false, &[]);

    assert!(restored.contains("<math>"));
    assert!(restored.contains("<pre>"));
    assert!(restored.contains("print('hi')"));
    assert!(restored.contains(" C"));
}

#[test]
fn test_round_trip_identity_over_rich_document() {
    let html = rich_document();
    let (anchored, table) = anchor(&html);

    assert_eq!(restore(&anchored, &table, false, &[]), html);
}

#[test]
fn test_rich_document_should_anchor_every_pattern_family() {
    let (anchored, table) = anchor(&rich_document());

    // math element, TeX placeholder, data-math element, equation comment
    assert_eq!(table.formulas.len(), 4);
    // pre block plus two inline code spans
    assert_eq!(table.codes.len(), 3);
    assert!(!anchored.contains("<math"));
    assert!(!anchored.contains("<pre"));
    assert!(!anchored.contains("<code"));
    assert!(!anchored.contains("data-math"));
}

#[test]
fn test_every_sentinel_token_should_appear_exactly_once_in_anchored_text() {
    let (anchored, table) = anchor(&rich_document());

    for token in table.tokens() {
        assert_eq!(anchored.matches(token).count(), 1, "token {}", token);
    }
}

#[test]
fn test_restore_with_arbitrary_permutation_should_keep_all_regions() {
    let (anchored, table) = anchor(&rich_document());

    // Reverse the token order without adding or removing any occurrence.
    let tokens = extract_tokens(&anchored);
    let mut permuted = anchored.clone();
    for (i, token) in tokens.iter().enumerate() {
        permuted = permuted.replacen(token.as_str(), &format!("\u{0}{}\u{0}", i), 1);
    }
    for (i, token) in tokens.iter().rev().enumerate() {
        permuted = permuted.replacen(&format!("\u{0}{}\u{0}", i), token, 1);
    }

    let restored = restore(&permuted, &table, false, &[]);
    for region in table.formulas.iter().chain(table.codes.iter()) {
        assert!(
            restored.contains(&region.original),
            "region {} missing after permuted restore",
            region.ordinal
        );
    }
}

#[test]
fn test_restore_should_accept_legacy_comment_tokens() {
    let html = "<math><mi>x</mi></math> text <pre>code</pre>";
    let (_, table) = anchor(html);

    let legacy = "<!--FORMULA_ANCHOR_0--> text <!--CODE_ANCHOR_1-->";
    assert_eq!(restore(legacy, &table, false, &[]), html);
}

#[test]
fn test_anchor_should_number_formula_passes_before_code_passes() {
    let html = "<pre>a</pre> then <math><mi>b</mi></math> then <code>c</code>";
    let (_, table) = anchor(html);

    // Formula passes run before code passes, so the math element gets
    // ordinal 0 even though the pre block appears first in the document;
    // the counter is shared across kinds and never repeats.
    let formula_ordinals: Vec<usize> = table.formulas.iter().map(|r| r.ordinal).collect();
    let code_ordinals: Vec<usize> = table.codes.iter().map(|r| r.ordinal).collect();
    assert_eq!(formula_ordinals, vec![0]);
    assert_eq!(code_ordinals, vec![1, 2]);
}
