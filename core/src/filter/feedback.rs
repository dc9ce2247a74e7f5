use super::{prefilter, Filter};
use crate::config::RocchioParams;
use crate::tokenizer::{content_terms, preprocess};
use crate::vector::TermVector;
use crate::{Decision, FilterError, Relevance, Result, Topic, Tweet};
use std::collections::BTreeSet;
use tracing::debug;

/// Query scoring with Rocchio relevance feedback.
///
/// The effective query is `alpha * original + beta * mean(relevant) +
/// gamma * mean(nonrelevant)`, clipped at zero and rebuilt from the running
/// sums after every judgment. A tweet scores the summed weight of the
/// effective query terms it contains, divided by the query's total weight.
#[derive(Debug, Clone)]
pub struct FeedbackFilter {
    params: RocchioParams,
    orig_query: TermVector,
    rel_sum: TermVector,
    nonrel_sum: TermVector,
    rel_count: u32,
    nonrel_count: u32,
    expanded_query: TermVector,
}

impl FeedbackFilter {
    pub fn new(params: RocchioParams) -> Self {
        Self {
            params,
            orig_query: TermVector::new(),
            rel_sum: TermVector::new(),
            nonrel_sum: TermVector::new(),
            rel_count: 0,
            nonrel_count: 0,
            expanded_query: TermVector::new(),
        }
    }

    pub fn expanded_query(&self) -> &TermVector {
        &self.expanded_query
    }

    pub fn original_query(&self) -> &TermVector {
        &self.orig_query
    }

    pub fn feedback_counts(&self) -> (u32, u32) {
        (self.rel_count, self.nonrel_count)
    }

    fn expand(
        &self,
        rel_sum: &TermVector,
        rel_count: u32,
        nonrel_sum: &TermVector,
        nonrel_count: u32,
    ) -> Result<TermVector> {
        let mut expanded = TermVector::new();
        expanded.scale_and_merge(&self.orig_query, self.params.alpha);
        if rel_count > 0 {
            expanded.scale_and_merge(rel_sum, self.params.beta / rel_count as f64);
        }
        if nonrel_count > 0 {
            expanded.scale_and_merge(nonrel_sum, self.params.gamma / nonrel_count as f64);
        }
        expanded.clip_negative();
        if !expanded.total_weight().is_finite() {
            return Err(FilterError::ModelUpdate(format!(
                "expanded query weight is {}",
                expanded.total_weight()
            )));
        }
        Ok(expanded)
    }
}

impl Filter for FeedbackFilter {
    fn name(&self) -> &'static str {
        "feedback"
    }

    fn configure(&mut self, topic: &Topic) -> Result<()> {
        let orig_query = TermVector::presence(content_terms(&topic.title));
        if orig_query.is_empty() {
            return Err(FilterError::Config(format!(
                "topic {} has no query terms after stopword removal",
                topic.number
            )));
        }
        self.expanded_query = orig_query.clone();
        self.orig_query = orig_query;
        self.rel_sum = TermVector::new();
        self.nonrel_sum = TermVector::new();
        self.rel_count = 0;
        self.nonrel_count = 0;
        Ok(())
    }

    fn decide(&self, tweet: &Tweet) -> Result<Decision> {
        if self.orig_query.is_empty() {
            return Err(FilterError::Config("feedback filter used before configure".into()));
        }
        if let Some(rejected) = prefilter(tweet) {
            return Ok(rejected);
        }
        let terms: BTreeSet<String> = content_terms(&preprocess(&tweet.text)).into_iter().collect();
        let total = self.expanded_query.total_weight();
        let score = if total > 0.0 {
            self.expanded_query.score(terms.iter().map(String::as_str)) / total
        } else {
            0.0
        };
        Ok(Decision::new(tweet.id, score, score > self.params.threshold))
    }

    fn observe_feedback(&mut self, tweet: &Tweet, relevance: Relevance) -> Result<()> {
        let doc = TermVector::frequencies(content_terms(&preprocess(&tweet.text)));

        let (mut rel_sum, mut rel_count) = (self.rel_sum.clone(), self.rel_count);
        let (mut nonrel_sum, mut nonrel_count) = (self.nonrel_sum.clone(), self.nonrel_count);
        if relevance.is_relevant() {
            rel_sum.scale_and_merge(&doc, 1.0);
            rel_count += 1;
        } else {
            nonrel_sum.scale_and_merge(&doc, 1.0);
            nonrel_count += 1;
        }
        let expanded = self.expand(&rel_sum, rel_count, &nonrel_sum, nonrel_count)?;

        self.rel_sum = rel_sum;
        self.rel_count = rel_count;
        self.nonrel_sum = nonrel_sum;
        self.nonrel_count = nonrel_count;
        self.expanded_query = expanded;

        debug!(
            tweet_id = tweet.id,
            relevant = relevance.is_relevant(),
            total_weight = self.expanded_query.total_weight(),
            "expanded query updated"
        );
        for (term, weight) in self.expanded_query.ranked() {
            debug!("{term:>12}\t{weight:2.4}");
        }
        Ok(())
    }
}
