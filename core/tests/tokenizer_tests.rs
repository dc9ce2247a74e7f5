use filter_core::tokenizer::{
    bag_of_words, content_terms, is_foreign, is_retweet, normalize, preprocess, term_set, terms,
};

#[test]
fn it_normalizes_and_stems() {
    let words = terms("Running Runners RUN! Flies");
    assert!(words.contains(&"run".to_string()));
    assert!(words.contains(&"fli".to_string()));
    assert_eq!(normalize("Apple"), "appl");
    assert_eq!(normalize("harvesting"), "harvest");
}

#[test]
fn it_filters_stopwords_only_on_request() {
    let all = terms("The quick brown fox and the lazy dog");
    assert!(all.contains(&"the".to_string()));

    let content = content_terms("The quick brown fox and the lazy dog a b");
    assert!(!content.contains(&"the".to_string()));
    assert!(!content.contains(&"and".to_string()));
    assert!(!content.iter().any(|t| t.chars().count() <= 1));
    assert!(content.contains(&"quick".to_string()));
}

#[test]
fn preprocessing_collapses_links_and_punctuation() {
    let text = preprocess("Great read: http://t.co/abc123 (via @bbc)!");
    assert!(text.contains("http"));
    assert!(!text.contains("t.co"));
    assert!(!text.contains('@'));
    assert!(!text.contains('('));
    assert_eq!(content_terms(&text), vec!["great", "read", "http", "via", "bbc"]);
}

#[test]
fn detects_foreign_text_after_allowed_punctuation() {
    assert!(!is_foreign("It\u{2019}s a \u{201C}quote\u{201D} \u{2014} and more\u{2026}"));
    assert!(is_foreign("Caf\u{00e9} au lait"));
    assert!(is_foreign("\u{3053}\u{3093}\u{306b}\u{3061}\u{306f}"));
    assert!(!is_foreign("plain ascii"));
}

#[test]
fn retweets_are_detected_by_prefix() {
    assert!(is_retweet("RT @someone: news"));
    assert!(!is_retweet("not a RT"));
}

#[test]
fn term_sets_are_distinct() {
    let set = term_set("apple apples APPLE harvest");
    assert_eq!(set.len(), 2);
    assert!(set.contains("appl"));
}

#[test]
fn bag_of_words_counts_lowercase_tokens() {
    let bag = bag_of_words("Apple apple Harvest");
    assert_eq!(bag.get("apple"), Some(&2.0));
    assert_eq!(bag.get("harvest"), Some(&1.0));
    assert!(bag.get("Apple").is_none());
}
