use super::Filter;
use crate::tokenizer::{normalize, term_set, tokenize};
use crate::{Decision, Result, Topic, Tweet};
use std::collections::BTreeSet;

/// Retrieves any tweet sharing at least one normalized term with the title.
#[derive(Debug, Default, Clone)]
pub struct BooleanOrFilter {
    query: BTreeSet<String>,
}

impl BooleanOrFilter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Filter for BooleanOrFilter {
    fn name(&self) -> &'static str {
        "boolean-or"
    }

    fn configure(&mut self, topic: &Topic) -> Result<()> {
        self.query = term_set(&topic.title);
        Ok(())
    }

    fn decide(&self, tweet: &Tweet) -> Result<Decision> {
        let hit = tokenize(&tweet.text).any(|token| self.query.contains(&normalize(token)));
        Ok(Decision::new(tweet.id, if hit { 1.0 } else { 0.0 }, hit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic(title: &str) -> Topic {
        Topic {
            number: 1,
            title: title.into(),
            query_time: String::new(),
            query_tweet_time: 0,
            query_newest_tweet: 10,
        }
    }

    #[test]
    fn any_shared_term_retrieves() {
        let mut filter = BooleanOrFilter::new();
        filter.configure(&topic("apple harvest")).unwrap();
        assert_eq!(filter.decide(&Tweet::new(1, "Apples everywhere")).unwrap(), Decision::accept(1, 1.0));
        assert_eq!(filter.decide(&Tweet::new(2, "banana split")).unwrap(), Decision::reject(2, 0.0));
    }

    #[test]
    fn decide_is_repeatable() {
        let mut filter = BooleanOrFilter::new();
        filter.configure(&topic("apple harvest")).unwrap();
        let tweet = Tweet::new(3, "harvest moon");
        assert_eq!(filter.decide(&tweet).unwrap(), filter.decide(&tweet).unwrap());
    }

    #[test]
    fn reconfigure_replaces_query() {
        let mut filter = BooleanOrFilter::new();
        filter.configure(&topic("apple")).unwrap();
        filter.configure(&topic("banana")).unwrap();
        assert!(!filter.decide(&Tweet::new(4, "apple")).unwrap().retrieve);
        assert!(filter.decide(&Tweet::new(5, "bananas")).unwrap().retrieve);
    }
}
