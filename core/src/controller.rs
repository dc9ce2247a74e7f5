use crate::filter::Filter;
use crate::output::DecisionSink;
use crate::qrels::Judgments;
use crate::store::TweetSource;
use crate::{Decision, FilterError, Relevance, Result, Topic, TopicNumber, Tweet, TweetId};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, error, info, warn};

/// Which tweets a topic's stream visits.
///
/// `All` walks every stored tweet in the topic window. `Judged` walks only
/// the tweets judged for the topic, so unjudged tweets never end up counted
/// as false positives. Either way the filter only sees a judgment after it
/// retrieved the tweet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
    All,
    #[default]
    Judged,
}

impl FromStr for FetchMode {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(FetchMode::All),
            "judged" | "qrels" => Ok(FetchMode::Judged),
            other => Err(FilterError::Config(format!("unknown fetch mode {other:?}"))),
        }
    }
}

impl fmt::Display for FetchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FetchMode::All => "all",
            FetchMode::Judged => "judged",
        })
    }
}

/// Lifecycle of one topic run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Configured,
    Streaming,
    Done,
    /// The topic or the filter could not be configured; nothing was emitted
    Aborted,
}

/// What happened while running one topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicReport {
    pub topic: TopicNumber,
    pub phase: Phase,
    /// The seed tweet was found and handed to the filter
    pub seeded: bool,
    pub decisions: usize,
    pub retrieved: usize,
    /// Judgments revealed to the filter, seed included
    pub feedback_events: usize,
    pub update_failures: usize,
    pub classification_failures: usize,
    /// The stream ended early on a storage error
    pub stream_error: bool,
}

impl TopicReport {
    fn new(topic: TopicNumber) -> Self {
        Self {
            topic,
            phase: Phase::Idle,
            seeded: false,
            decisions: 0,
            retrieved: 0,
            feedback_events: 0,
            update_failures: 0,
            classification_failures: 0,
            stream_error: false,
        }
    }
}

/// Drives topics through the tweet stream with selective feedback.
pub struct FilterController<'a, S: TweetSource + ?Sized> {
    store: &'a S,
    judgments: &'a Judgments,
    fetch_mode: FetchMode,
}

impl<'a, S: TweetSource + ?Sized> FilterController<'a, S> {
    pub fn new(store: &'a S, judgments: &'a Judgments) -> Self {
        Self { store, judgments, fetch_mode: FetchMode::default() }
    }

    pub fn with_fetch_mode(mut self, mode: FetchMode) -> Self {
        self.fetch_mode = mode;
        self
    }

    pub fn fetch_mode(&self) -> FetchMode {
        self.fetch_mode
    }

    /// Run every topic in order, each with a fresh filter from `make_filter`.
    ///
    /// Fails only when the sink fails or when no topic could be configured.
    pub fn run<F>(&self, topics: &[Topic], mut make_filter: F, sink: &mut dyn DecisionSink) -> Result<Vec<TopicReport>>
    where
        F: FnMut() -> Box<dyn Filter>,
    {
        let mut reports = Vec::with_capacity(topics.len());
        for topic in topics {
            let mut filter = make_filter();
            reports.push(self.run_topic(topic, filter.as_mut(), sink)?);
        }
        if !reports.is_empty() && reports.iter().all(|r| r.phase == Phase::Aborted) {
            return Err(FilterError::Config("no topic could be configured".into()));
        }
        Ok(reports)
    }

    /// Run a single topic with `filter`, which is reconfigured first.
    pub fn run_topic(&self, topic: &Topic, filter: &mut dyn Filter, sink: &mut dyn DecisionSink) -> Result<TopicReport> {
        let mut report = TopicReport::new(topic.number);
        info!(topic = topic.number, filter = filter.name(), mode = %self.fetch_mode, "running topic");

        if let Err(err) = topic.validate().and_then(|_| filter.configure(topic)) {
            error!(topic = topic.number, error = %err, "topic aborted");
            report.phase = Phase::Aborted;
            return Ok(report);
        }
        report.phase = Phase::Configured;

        let seed_id = self.deliver_seed(topic, filter, &mut report);
        report.phase = Phase::Streaming;

        for item in self.stream(topic) {
            let tweet = match item {
                Ok(tweet) => tweet,
                Err(err) => {
                    error!(topic = topic.number, error = %err, "storage failure, ending stream");
                    report.stream_error = true;
                    break;
                }
            };
            if tweet.id > topic.query_newest_tweet {
                break;
            }

            let decision = match filter.decide(&tweet) {
                Ok(decision) => decision,
                Err(err) => {
                    warn!(topic = topic.number, tweet_id = tweet.id, error = %err, "no decision, not retrieving");
                    report.classification_failures += 1;
                    Decision::reject(tweet.id, 0.0)
                }
            };
            sink.emit(topic.number, &decision)?;
            report.decisions += 1;
            if !decision.retrieve {
                continue;
            }
            report.retrieved += 1;

            // The seed judgment was already revealed before the stream started.
            if seed_id == Some(tweet.id) {
                continue;
            }
            let relevance = self.judgments.get(topic.number, tweet.id);
            if relevance.is_judged() {
                self.feedback(topic, filter, &tweet, relevance, &mut report);
            }
        }

        report.phase = Phase::Done;
        info!(
            topic = topic.number,
            decisions = report.decisions,
            retrieved = report.retrieved,
            feedback = report.feedback_events,
            "topic done"
        );
        Ok(report)
    }

    /// Reveal the seed tweet's judgment unconditionally. Returns the seed id
    /// when it was found.
    fn deliver_seed(&self, topic: &Topic, filter: &mut dyn Filter, report: &mut TopicReport) -> Option<TweetId> {
        let seed = match self.store.fetch(topic.query_tweet_time) {
            Ok(Some(tweet)) if tweet.id == topic.query_tweet_time => tweet,
            Ok(_) => {
                warn!(topic = topic.number, tweet_id = topic.query_tweet_time, "oldest known relevant tweet is not in the store");
                return None;
            }
            Err(err) => {
                warn!(topic = topic.number, tweet_id = topic.query_tweet_time, error = %err, "could not fetch seed tweet");
                return None;
            }
        };
        let relevance = self.judgments.get(topic.number, seed.id);
        self.feedback(topic, filter, &seed, relevance, report);
        report.seeded = true;
        Some(seed.id)
    }

    fn feedback(
        &self,
        topic: &Topic,
        filter: &mut dyn Filter,
        tweet: &Tweet,
        relevance: Relevance,
        report: &mut TopicReport,
    ) {
        match filter.observe_feedback(tweet, relevance) {
            Ok(()) => {
                debug!(topic = topic.number, tweet_id = tweet.id, relevance = relevance.value(), "feedback");
                report.feedback_events += 1;
            }
            Err(err) => {
                warn!(topic = topic.number, tweet_id = tweet.id, error = %err, "model update failed, keeping previous model");
                report.update_failures += 1;
            }
        }
    }

    /// A new pass over the topic's tweets, ascending from the seed id.
    fn stream(&self, topic: &Topic) -> Box<dyn Iterator<Item = Result<Tweet>> + 'a> {
        let store: &'a S = self.store;
        let (start, end) = (topic.query_tweet_time, topic.query_newest_tweet);
        match self.fetch_mode {
            FetchMode::All => store.iter_from(start),
            FetchMode::Judged => {
                let topic_number = topic.number;
                let ids = self
                    .judgments
                    .for_topic(topic_number)
                    .into_iter()
                    .flat_map(move |judged| judged.range(start..=end).map(|(id, _)| *id));
                Box::new(ids.filter_map(move |id| match store.fetch(id) {
                    Ok(Some(tweet)) => Some(Ok(tweet)),
                    Ok(None) => {
                        debug!(topic = topic_number, tweet_id = id, "judged tweet not in store, skipping");
                        None
                    }
                    Err(err) => Some(Err(err)),
                }))
            }
        }
    }
}
