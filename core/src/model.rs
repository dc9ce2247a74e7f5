use crate::{FilterError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

pub type TweetId = u64;
pub type TopicNumber = u32;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub screen_name: String,
    pub name: String,
}

/// A stored tweet. The id doubles as the chronological ordering key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tweet {
    pub id: TweetId,
    pub text: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub retweeted: bool,
    #[serde(default)]
    pub retweet_count: u64,
    #[serde(default)]
    pub favorited: bool,
    #[serde(default)]
    pub user: User,
    /// Id originally requested from the API when the tweet was crawled
    #[serde(default)]
    pub requested_id: Option<TweetId>,
}

impl Tweet {
    pub fn new(id: TweetId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            created_at: String::new(),
            retweeted: false,
            retweet_count: 0,
            favorited: false,
            user: User::default(),
            requested_id: None,
        }
    }
}

impl fmt::Display for Tweet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "id:               {}", self.id)?;
        writeln!(f, "text:             {}", self.text)?;
        writeln!(f, "created_at:       {}", self.created_at)?;
        writeln!(f, "retweeted:        {}", self.retweeted)?;
        writeln!(f, "retweet_count:    {}", self.retweet_count)?;
        writeln!(f, "favorited:        {}", self.favorited)?;
        writeln!(f, "user.id:          {}", self.user.id)?;
        writeln!(f, "user.screen_name: {}", self.user.screen_name)?;
        writeln!(f, "user.name:        {}", self.user.name)?;
        match self.requested_id {
            Some(id) => writeln!(f, "requested_id:     {id}"),
            None => writeln!(f, "requested_id:     -"),
        }
    }
}

/// A standing query and its evaluation window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub number: TopicNumber,
    pub title: String,
    /// Free-form timestamp of when the query was issued
    #[serde(default)]
    pub query_time: String,
    /// Id of the oldest known relevant tweet (the seed)
    pub query_tweet_time: TweetId,
    /// Id of the newest tweet to evaluate
    pub query_newest_tweet: TweetId,
}

impl Topic {
    /// Checks the evaluation window. Strategies that score against the title
    /// check it themselves when configured.
    pub fn validate(&self) -> Result<()> {
        if self.query_tweet_time > self.query_newest_tweet {
            return Err(FilterError::Config(format!(
                "topic {}: seed tweet {} is newer than the last tweet {}",
                self.number, self.query_tweet_time, self.query_newest_tweet
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "number:           {}", self.number)?;
        writeln!(f, "title:            {}", self.title)?;
        writeln!(f, "queryTime:        {}", self.query_time)?;
        writeln!(f, "queryTweetTime:   {}", self.query_tweet_time)?;
        writeln!(f, "queryNewestTweet: {}", self.query_newest_tweet)
    }
}

/// Relevance label of a (topic, tweet) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Relevance {
    Nonrelevant,
    NotJudged,
    Relevant,
    HighlyRelevant,
}

impl Relevance {
    /// Lowest judgment value counted as relevant.
    pub const MIN_RELEVANT: i32 = 1;

    /// Maps a qrels value onto a label. Anything above 2 counts as highly
    /// relevant and any negative value as nonrelevant.
    pub fn from_value(value: i32) -> Self {
        match value {
            v if v >= 2 => Relevance::HighlyRelevant,
            1 => Relevance::Relevant,
            0 => Relevance::NotJudged,
            _ => Relevance::Nonrelevant,
        }
    }

    pub fn value(self) -> i32 {
        match self {
            Relevance::Nonrelevant => -2,
            Relevance::NotJudged => 0,
            Relevance::Relevant => 1,
            Relevance::HighlyRelevant => 2,
        }
    }

    pub fn is_relevant(self) -> bool {
        self.value() >= Self::MIN_RELEVANT
    }

    pub fn is_judged(self) -> bool {
        self != Relevance::NotJudged
    }
}

/// Outcome of scoring one tweet.
///
/// `score` is strategy specific and never comparable across strategies. The
/// Bayes strategy uses 1.0 for unconditional retrieval and 2.0 for a
/// classifier-backed decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub tweet_id: TweetId,
    pub score: f64,
    pub retrieve: bool,
}

impl Decision {
    pub fn new(tweet_id: TweetId, score: f64, retrieve: bool) -> Self {
        Self { tweet_id, score, retrieve }
    }

    pub fn accept(tweet_id: TweetId, score: f64) -> Self {
        Self::new(tweet_id, score, true)
    }

    pub fn reject(tweet_id: TweetId, score: f64) -> Self {
        Self::new(tweet_id, score, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relevance_values_round_trip_known_labels() {
        for value in [-2, 0, 1, 2] {
            assert_eq!(Relevance::from_value(value).value(), value);
        }
        assert_eq!(Relevance::from_value(-1), Relevance::Nonrelevant);
        assert_eq!(Relevance::from_value(3), Relevance::HighlyRelevant);
    }

    #[test]
    fn only_positive_labels_are_relevant() {
        assert!(Relevance::Relevant.is_relevant());
        assert!(Relevance::HighlyRelevant.is_relevant());
        assert!(!Relevance::NotJudged.is_relevant());
        assert!(!Relevance::Nonrelevant.is_relevant());
        assert!(!Relevance::NotJudged.is_judged());
    }

    #[test]
    fn topic_window_must_be_ordered() {
        let mut topic = Topic {
            number: 7,
            title: "apple harvest".into(),
            query_time: String::new(),
            query_tweet_time: 10,
            query_newest_tweet: 20,
        };
        assert!(topic.validate().is_ok());
        topic.query_tweet_time = 21;
        assert!(matches!(topic.validate(), Err(FilterError::Config(_))));
        topic.query_tweet_time = 10;
        topic.title = "   ".into();
        assert!(topic.validate().is_ok());
    }
}
