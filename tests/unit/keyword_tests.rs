//! Unit tests for watched-keyword detection.

use tenant_comms_governor::policy::keywords::KeywordDetector;

fn detector(patterns: &[&str]) -> KeywordDetector {
    let owned: Vec<String> = patterns.iter().map(|p| (*p).to_owned()).collect();
    KeywordDetector::new(&owned)
}

#[test]
fn matches_are_case_insensitive() {
    let keywords = detector(&["flood", r"gas\s+leak"]);
    let matched = keywords.detect("There is a GAS  Leak in unit 4");
    assert_eq!(matched.into_iter().collect::<Vec<_>>(), vec![r"gas\s+leak".to_owned()]);
}

#[test]
fn reports_every_matching_pattern() {
    let keywords = detector(&["flood", "lawyer", "eviction"]);
    let matched = keywords.detect("My lawyer says the flood damage is on you");
    assert_eq!(matched.len(), 2);
    assert!(matched.contains("flood"));
    assert!(matched.contains("lawyer"));
}

#[test]
fn invalid_patterns_are_skipped() {
    let keywords = detector(&["(unclosed", "fire"]);
    assert_eq!(keywords.len(), 1);
    assert!(keywords.detect("fire alarm").contains("fire"));
}

#[test]
fn empty_detector_never_matches() {
    let keywords = KeywordDetector::empty();
    assert!(keywords.is_empty());
    assert!(keywords.detect("flood fire lawyer").is_empty());
}
