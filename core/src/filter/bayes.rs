use super::Filter;
use crate::classifier::{Class, MultinomialModel};
use crate::config::BayesParams;
use crate::tokenizer::bag_of_words;
use crate::{Decision, Relevance, Result, Topic, Tweet};
use tracing::warn;

/// Score of a tweet retrieved before the classifier has seen both classes.
pub const UNCONDITIONAL_SCORE: f64 = 1.0;
/// Score of a tweet whose decision came from the classifier.
pub const CLASSIFIED_SCORE: f64 = 2.0;

/// Skew-corrected weight for a training example, before clipping.
///
/// A relevant example weighs `nonrel_count / rel_count` and a nonrelevant one
/// the inverse, so the minority class is not drowned out. Until more than one
/// example has been seen the weight is 1. The raw ratio is 0 or infinite
/// while the other class has no examples; callers clip it to
/// `[min_instance_weight, max_instance_weight]` as [`BayesFilter`] does.
pub fn instance_weight(relevant: bool, rel_count: u32, nonrel_count: u32) -> f64 {
    if rel_count + nonrel_count <= 1 {
        return 1.0;
    }
    let (rel, nonrel) = (rel_count as f64, nonrel_count as f64);
    if relevant {
        nonrel / rel
    } else {
        rel / nonrel
    }
}

/// Filters with an incrementally trained multinomial naive Bayes classifier
/// seeded with the topic title.
#[derive(Debug, Clone)]
pub struct BayesFilter {
    params: BayesParams,
    model: MultinomialModel,
    rel_count: u32,
    nonrel_count: u32,
}

impl BayesFilter {
    pub fn new(params: BayesParams) -> Self {
        let model = MultinomialModel::new(params.laplace);
        Self { params, model, rel_count: 0, nonrel_count: 0 }
    }

    pub fn model(&self) -> &MultinomialModel {
        &self.model
    }

    pub fn example_counts(&self) -> (u32, u32) {
        (self.rel_count, self.nonrel_count)
    }

    /// True until real feedback has covered both classes.
    pub fn is_cold(&self) -> bool {
        self.rel_count == 0 || self.nonrel_count == 0
    }

    /// Clipped weight for the next example of the given polarity.
    pub fn next_weight(&self, relevant: bool) -> f64 {
        instance_weight(relevant, self.rel_count, self.nonrel_count)
            .max(self.params.min_instance_weight)
            .min(self.params.max_instance_weight)
    }
}

impl Filter for BayesFilter {
    fn name(&self) -> &'static str {
        "bayes"
    }

    fn configure(&mut self, topic: &Topic) -> Result<()> {
        self.params.validate()?;
        self.model = MultinomialModel::new(self.params.laplace);
        self.rel_count = 0;
        self.nonrel_count = 0;
        if let Err(err) = self.model.update(&bag_of_words(&topic.title), Class::Relevant, self.params.query_weight) {
            warn!(topic = topic.number, error = %err, "could not seed classifier with the query");
        }
        Ok(())
    }

    fn decide(&self, tweet: &Tweet) -> Result<Decision> {
        if self.is_cold() {
            return Ok(Decision::accept(tweet.id, UNCONDITIONAL_SCORE));
        }
        let class = self.model.classify(&bag_of_words(&tweet.text))?;
        Ok(Decision::new(tweet.id, CLASSIFIED_SCORE, class == Class::Relevant))
    }

    fn observe_feedback(&mut self, tweet: &Tweet, relevance: Relevance) -> Result<()> {
        let relevant = relevance.is_relevant();
        let class = if relevant { Class::Relevant } else { Class::Nonrelevant };
        let weight = self.next_weight(relevant);
        self.model.update(&bag_of_words(&tweet.text), class, weight)?;
        if relevant {
            self.rel_count += 1;
        } else {
            self.nonrel_count += 1;
        }
        Ok(())
    }
}
