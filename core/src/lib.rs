//! Adaptive tweet filtering engine.
//!
//! A [`controller::FilterController`] drives each topic through the tweet
//! stream in ascending id order. A fresh [`filter::Filter`] decides every
//! tweet on arrival and only learns the judgment of the tweets it chose to
//! retrieve, plus the topic's seed tweet.

pub mod classifier;
pub mod config;
pub mod controller;
pub mod error;
pub mod eval;
pub mod filter;
pub mod model;
pub mod output;
pub mod qrels;
pub mod store;
pub mod tokenizer;
pub mod topics;
pub mod vector;

pub use error::{FilterError, Result};
pub use model::{Decision, Relevance, Topic, TopicNumber, Tweet, TweetId, User};
