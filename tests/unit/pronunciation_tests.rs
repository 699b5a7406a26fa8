/*!
 * Tests for pronunciation rule parsing and application
 */

use narrasrt::pronunciation::{apply_pronunciation_rules, PronunciationRuleSet, DEFAULT_RULES};

/// Test that empty rules leave text unchanged
#[test]
fn test_apply_withEmptyRules_shouldBeNoOp() {
    assert_eq!(apply_pronunciation_rules("abc", ""), "abc");

    let rules = "x = y";
    let text = "xyz";
    assert_eq!(
        apply_pronunciation_rules(&apply_pronunciation_rules(text, ""), rules),
        apply_pronunciation_rules(text, rules)
    );
}

/// Test that rule order matters
#[test]
fn test_apply_withReorderedRules_shouldDiffer() {
    assert_eq!(apply_pronunciation_rules("a", "a = b\nb = c"), "c");
    assert_eq!(apply_pronunciation_rules("a", "b = c\na = b"), "b");
}

/// Test replacement of every occurrence
#[test]
fn test_apply_withRepeatedPattern_shouldReplaceAll() {
    assert_eq!(apply_pronunciation_rules("la la la", "la=na"), "na na na");
}

/// Test that patterns are literal, not regular expressions
#[test]
fn test_apply_withRegexCharacters_shouldMatchLiterally() {
    assert_eq!(apply_pronunciation_rules("a.b axb", "a.b = ok"), "ok axb");
}

/// Test that CRLF line endings parse the same as LF
#[test]
fn test_parse_withWindowsLineEndings_shouldTrimCarriageReturn() {
    let set = PronunciationRuleSet::parse("a = b\r\nc = d\r\n");
    assert_eq!(set.len(), 2);
    assert_eq!(set.rules()[0].replacement, "b");
    assert_eq!(set.rules()[1].pattern, "c");
}

/// Test rule building by hand
#[test]
fn test_push_withBlankSide_shouldRefuse() {
    let mut set = PronunciationRuleSet::new();
    assert!(!set.push("  ", "x"));
    assert!(!set.push("x", ""));
    assert!(set.push(" ok ", " fine "));
    assert_eq!(set.len(), 1);
    assert_eq!(set.apply("ok!"), "fine!");
}

/// Test the shipped Myanmar rules
#[test]
fn test_defaultRules_shouldAllParse() {
    let set = PronunciationRuleSet::parse(DEFAULT_RULES);
    assert_eq!(set.len(), 5);
    assert_eq!(set.apply("ဥစ္စာ"), "အုတ်စာ");
    assert_eq!(set.apply("ပြဿနာ"), "ပြတ်သနာ");
}
