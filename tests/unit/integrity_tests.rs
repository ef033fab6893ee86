/*!
 * Unit tests for sentinel-token integrity verification and repair.
 */

use anchorlate::anchoring::anchor;
use anchorlate::errors::TranslationError;
use anchorlate::validation::{IntegrityReport, extract_tokens, repair_tokens, verify_and_repair};

use crate::common::rich_document;

#[test]
fn test_token_population_should_be_invariant_under_faithful_translation() {
    let (anchored, _) = anchor(&rich_document());

    // A faithful translation rewrites prose but carries tokens verbatim.
    let translated = anchored
        .replace("Einstein showed", "Einstein a montré")
        .replace("Some editors", "Certains éditeurs")
        .replace("Call", "Appelez");

    let report = IntegrityReport::compare(&extract_tokens(&anchored), &extract_tokens(&translated));
    assert!(report.population_matches());
    assert!(report.order_preserved);
}

#[test]
fn test_duplicated_token_should_be_repaired_then_match_order_exactly() {
    let (anchored, table) = anchor(&rich_document());
    let victim = table.tokens()[0].to_string();
    let corrupted = anchored.replacen(&victim, &format!("{} {}", victim, victim), 1);

    let verified = verify_and_repair(&anchored, &corrupted, true).unwrap();
    assert_eq!(extract_tokens(&verified), extract_tokens(&anchored));
}

#[test]
fn test_duplicate_plus_missing_occurrence_should_raise_integrity_error() {
    let (anchored, table) = anchor(&rich_document());
    let tokens = table.tokens();
    let duplicated = tokens[0].to_string();
    let dropped = tokens[1].to_string();

    let corrupted = anchored
        .replacen(&duplicated, &format!("{} {}", duplicated, duplicated), 1)
        .replace(&dropped, "");

    let result = verify_and_repair(&anchored, &corrupted, true);
    match result {
        Err(TranslationError::Integrity { missing, .. }) => assert_eq!(missing, 1),
        other => panic!("expected Integrity error, got {:?}", other),
    }
}

#[test]
fn test_repair_should_strip_token_invented_by_the_model() {
    let (anchored, _) = anchor("<p>Only <code>one()</code> region here.</p>");
    let expected = extract_tokens(&anchored);
    let hallucinated = format!("{} [[COF_FORMULA_41]]", anchored);

    let repaired = repair_tokens(&expected, &hallucinated);
    assert!(!repaired.contains("[[COF_FORMULA_41]]"));
    assert_eq!(extract_tokens(&repaired), expected);
}

#[test]
fn test_integrity_error_should_carry_counts_not_content() {
    let source = "<p>secret prose [[COF_CODE_0]]</p>";
    let result = verify_and_repair(source, "<p>translated prose</p>", false);

    let message = format!("{}", result.unwrap_err());
    assert!(!message.contains("secret prose"));
    assert!(!message.contains("translated prose"));
}

#[test]
fn test_non_llm_output_should_not_get_repair_pass() {
    // A machine-translation backend that duplicates a token is a real
    // fault, not a hallucination to paper over.
    let source = "a [[COF_CODE_0]] b";
    let output = "a [[COF_CODE_0]] [[COF_CODE_0]] b";
    let result = verify_and_repair(source, output, false);
    assert!(matches!(
        result,
        Err(TranslationError::Integrity { extra: 1, .. })
    ));
}
