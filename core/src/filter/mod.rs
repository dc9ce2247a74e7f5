//! Scoring strategies.
//!
//! Every strategy follows the same lifecycle: [`Filter::configure`] for a
//! topic, then any interleaving of [`Filter::decide`] and
//! [`Filter::observe_feedback`] driven by the controller. `decide` never
//! mutates state; `observe_feedback` is the only way a strategy learns.

mod baseline;
mod bayes;
mod boolean_or;
mod feedback;
mod query;

pub use baseline::BaselineFilter;
pub use bayes::{instance_weight, BayesFilter};
pub use boolean_or::BooleanOrFilter;
pub use feedback::FeedbackFilter;
pub use query::QueryFilter;

use crate::config::FilterConfig;
use crate::tokenizer::{is_foreign, is_retweet};
use crate::{Decision, FilterError, Relevance, Result, Topic, Tweet};
use std::fmt;
use std::str::FromStr;

pub trait Filter {
    fn name(&self) -> &'static str;

    /// Reset all state and prepare for `topic`.
    fn configure(&mut self, _topic: &Topic) -> Result<()> {
        Ok(())
    }

    /// Score `tweet` and decide whether to retrieve it.
    fn decide(&self, tweet: &Tweet) -> Result<Decision>;

    /// Reveal the judgment of a tweet. On error the strategy keeps the state
    /// it had before the call.
    fn observe_feedback(&mut self, _tweet: &Tweet, _relevance: Relevance) -> Result<()> {
        Ok(())
    }
}

/// The available strategies, by their command-line names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Baseline,
    BooleanOr,
    Query,
    Feedback,
    Bayes,
}

impl FilterKind {
    pub const ALL: [FilterKind; 5] = [
        FilterKind::Baseline,
        FilterKind::BooleanOr,
        FilterKind::Query,
        FilterKind::Feedback,
        FilterKind::Bayes,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FilterKind::Baseline => "baseline",
            FilterKind::BooleanOr => "boolean-or",
            FilterKind::Query => "query",
            FilterKind::Feedback => "feedback",
            FilterKind::Bayes => "bayes",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            FilterKind::Baseline => "classifies all tweets as relevant",
            FilterKind::BooleanOr => "retrieves tweets with any of the terms in the query",
            FilterKind::Query => "filter using query-based scoring only (no feedback)",
            FilterKind::Feedback => "adds Rocchio relevance feedback to query scoring",
            FilterKind::Bayes => "incremental multinomial naive Bayes classifier",
        }
    }

    /// A fresh, unconfigured instance.
    pub fn build(self, config: &FilterConfig) -> Box<dyn Filter> {
        match self {
            FilterKind::Baseline => Box::new(BaselineFilter),
            FilterKind::BooleanOr => Box::new(BooleanOrFilter::new()),
            FilterKind::Query => Box::new(QueryFilter::new(config.query.clone())),
            FilterKind::Feedback => Box::new(FeedbackFilter::new(config.rocchio.clone())),
            FilterKind::Bayes => Box::new(BayesFilter::new(config.bayes.clone())),
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterKind {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self> {
        FilterKind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| FilterError::Config(format!("unknown filter {s:?}")))
    }
}

/// Retweets and likely non-English tweets are rejected with score 0 before
/// any scoring.
pub(crate) fn prefilter(tweet: &Tweet) -> Option<Decision> {
    if is_retweet(&tweet.text) || is_foreign(&tweet.text) {
        Some(Decision::reject(tweet.id, 0.0))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_parse_from_their_names() {
        for kind in FilterKind::ALL {
            assert_eq!(kind.name().parse::<FilterKind>().unwrap(), kind);
            assert_eq!(kind.build(&FilterConfig::default()).name(), kind.name());
        }
        assert!("rocchio".parse::<FilterKind>().is_err());
    }

    #[test]
    fn prefilter_rejects_retweets_and_foreign_text() {
        assert_eq!(prefilter(&Tweet::new(1, "RT @a: apple")), Some(Decision::reject(1, 0.0)));
        assert_eq!(prefilter(&Tweet::new(2, "pomme r\u{00e9}colte")), Some(Decision::reject(2, 0.0)));
        assert_eq!(prefilter(&Tweet::new(3, "apple harvest")), None);
    }
}
