use super::Filter;
use crate::{Decision, Result, Tweet};

/// Retrieves every tweet with score 1.0. Topic independent and stateless.
#[derive(Debug, Default, Clone, Copy)]
pub struct BaselineFilter;

impl Filter for BaselineFilter {
    fn name(&self) -> &'static str {
        "baseline"
    }

    fn decide(&self, tweet: &Tweet) -> Result<Decision> {
        Ok(Decision::accept(tweet.id, 1.0))
    }
}
