use super::{prefilter, Filter};
use crate::config::QueryParams;
use crate::tokenizer::term_set;
use crate::{Decision, FilterError, Result, Topic, Tweet};
use std::collections::BTreeSet;

/// Scores a tweet by the fraction of distinct query terms it contains.
#[derive(Debug, Clone)]
pub struct QueryFilter {
    params: QueryParams,
    query: BTreeSet<String>,
}

impl QueryFilter {
    pub fn new(params: QueryParams) -> Self {
        Self { params, query: BTreeSet::new() }
    }
}

impl Filter for QueryFilter {
    fn name(&self) -> &'static str {
        "query"
    }

    fn configure(&mut self, topic: &Topic) -> Result<()> {
        let query = term_set(&topic.title);
        if query.is_empty() {
            return Err(FilterError::Config(format!("topic {} has no query terms", topic.number)));
        }
        self.query = query;
        Ok(())
    }

    fn decide(&self, tweet: &Tweet) -> Result<Decision> {
        if self.query.is_empty() {
            return Err(FilterError::Config("query filter used before configure".into()));
        }
        if let Some(rejected) = prefilter(tweet) {
            return Ok(rejected);
        }
        let tweet_terms = term_set(&tweet.text);
        let shared = self.query.intersection(&tweet_terms).count();
        let score = shared as f64 / self.query.len() as f64;
        Ok(Decision::new(tweet.id, score, score > self.params.threshold))
    }
}
