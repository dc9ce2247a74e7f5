use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use unicode_normalization::UnicodeNormalization;

/// Token substituted for every link by [`preprocess`].
pub const URL_PLACEHOLDER: &str = "http";

/// Non-ASCII characters that routinely show up in English tweets.
const ALLOWED_NON_ASCII: &[char] = &[
    '\u{00a0}', // non-breaking space
    '\u{2018}', // left single quote
    '\u{2019}', // right single quote
    '\u{201C}', // left double quote
    '\u{201D}', // right double quote
    '\u{2026}', // horizontal ellipsis
    '\u{2013}', // en dash
    '\u{2014}', // em dash
];

lazy_static! {
    static ref WORD_RE: Regex = Regex::new(r"(?u)[\p{L}\p{N}_]+").expect("valid regex");
    static ref URL_RE: Regex = Regex::new(r"http\S+").expect("valid regex");
    static ref PUNCT_RE: Regex = Regex::new(r"[[:punct:]]").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &["the", "is", "at", "of", "on", "and", "a", "to"];
        words.iter().copied().collect()
    };
}

/// Split text into raw word tokens. The iterator is lazy and every call
/// starts over from the beginning of `text`.
pub fn tokenize(text: &str) -> impl Iterator<Item = &str> + '_ {
    WORD_RE.find_iter(text).map(|m| m.as_str())
}

/// Case-fold (after NFKC normalization) and stem a single token.
pub fn normalize(token: &str) -> String {
    let folded = token.nfkc().collect::<String>().to_lowercase();
    STEMMER.stem(&folded).into_owned()
}

/// Stopwords are a handful of articles, conjunctions and prepositions, plus
/// every single-character term.
pub fn is_stopword(term: &str) -> bool {
    term.chars().count() <= 1 || STOPWORDS.contains(term)
}

/// Replace links with [`URL_PLACEHOLDER`] and ASCII punctuation with spaces.
pub fn preprocess(text: &str) -> String {
    let linked = URL_RE.replace_all(text, URL_PLACEHOLDER);
    PUNCT_RE.replace_all(&linked, " ").into_owned()
}

/// Retweets carry no information beyond the original tweet.
pub fn is_retweet(text: &str) -> bool {
    text.starts_with("RT")
}

/// Heuristic for non-English text: anything non-ASCII left once the common
/// typographic characters are ignored.
pub fn is_foreign(text: &str) -> bool {
    text.chars()
        .filter(|c| !ALLOWED_NON_ASCII.contains(c))
        .any(|c| !c.is_ascii())
}

/// Normalized terms of `text`, in order, duplicates kept.
pub fn terms(text: &str) -> Vec<String> {
    tokenize(text).map(normalize).collect()
}

/// Normalized terms with stopwords removed.
pub fn content_terms(text: &str) -> Vec<String> {
    tokenize(text)
        .map(normalize)
        .filter(|t| !is_stopword(t))
        .collect()
}

/// Distinct normalized terms of `text`.
pub fn term_set(text: &str) -> BTreeSet<String> {
    tokenize(text).map(normalize).collect()
}

/// Lower-cased, unstemmed token counts.
pub fn bag_of_words(text: &str) -> BTreeMap<String, f64> {
    let mut bag = BTreeMap::new();
    for token in tokenize(text) {
        *bag.entry(token.to_lowercase()).or_insert(0.0) += 1.0;
    }
    bag
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_tokenize() {
        let t: Vec<&str> = tokenize("Running, runner's run!").collect();
        assert_eq!(t, vec!["Running", "runner", "s", "run"]);
    }

    #[test]
    fn tokenize_restarts_per_call() {
        let text = "apple harvest";
        assert_eq!(tokenize(text).count(), 2);
        assert_eq!(tokenize(text).count(), 2);
    }

    #[test]
    fn single_characters_are_stopwords() {
        assert!(is_stopword("x"));
        assert!(is_stopword("the"));
        assert!(!is_stopword("harvest"));
    }
}
