use crate::store::TweetSource;
use crate::{FilterError, Relevance, Result, Topic, TopicNumber, TweetId};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use tracing::debug;

/// Judgments of one topic, ascending by tweet id.
pub type TopicJudgments = BTreeMap<TweetId, Relevance>;

/// Relevance judgments for a run: topic number to tweet id to label.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Judgments {
    topics: BTreeMap<TopicNumber, TopicJudgments>,
}

impl Judgments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, topic: TopicNumber, tweet_id: TweetId, relevance: Relevance) {
        self.topics.entry(topic).or_default().insert(tweet_id, relevance);
    }

    pub fn for_topic(&self, topic: TopicNumber) -> Option<&TopicJudgments> {
        self.topics.get(&topic)
    }

    /// Label of a tweet, [`Relevance::NotJudged`] when absent.
    pub fn get(&self, topic: TopicNumber, tweet_id: TweetId) -> Relevance {
        self.for_topic(topic)
            .and_then(|j| j.get(&tweet_id))
            .copied()
            .unwrap_or(Relevance::NotJudged)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TopicNumber, &TopicJudgments)> + '_ {
        self.topics.iter().map(|(t, j)| (*t, j))
    }

    pub fn len(&self) -> usize {
        self.topics.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

struct QrelsLine {
    topic: TopicNumber,
    tweet_id: TweetId,
    value: i32,
}

fn parse_line(line: &str, number: usize) -> Result<Option<QrelsLine>> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.is_empty() {
        return Ok(None);
    }
    if fields.len() < 4 {
        return Err(FilterError::Parse { line: number, message: format!("expected 4 fields, got {}", fields.len()) });
    }
    let bad = |what: &str, raw: &str| FilterError::Parse { line: number, message: format!("invalid {what} {raw:?}") };
    let topic = fields[0]
        .trim_start_matches("MB")
        .parse()
        .map_err(|_| bad("topic number", fields[0]))?;
    let tweet_id = fields[2].parse().map_err(|_| bad("tweet id", fields[2]))?;
    let value = fields[3].parse().map_err(|_| bad("relevance", fields[3]))?;
    Ok(Some(QrelsLine { topic, tweet_id, value }))
}

/// Read `topic iteration tweet-id relevance` lines. Blank lines are skipped.
pub fn parse_qrels<R: BufRead>(reader: R) -> Result<Judgments> {
    let mut judgments = Judgments::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if let Some(q) = parse_line(&line, idx + 1)? {
            judgments.insert(q.topic, q.tweet_id, Relevance::from_value(q.value));
        }
    }
    debug!(judgments = judgments.len(), "parsed qrels");
    Ok(judgments)
}

pub fn load_qrels<P: AsRef<Path>>(path: P) -> Result<Judgments> {
    let f = File::open(path)?;
    parse_qrels(BufReader::new(f))
}

/// Write judgments as qrels: topics ascending, tweet ids descending.
pub fn write_qrels<W: Write>(judgments: &Judgments, mut out: W) -> Result<()> {
    for (topic, tweets) in judgments.iter() {
        for (tweet_id, relevance) in tweets.iter().rev() {
            writeln!(out, "{} 0 {} {}", topic, tweet_id, relevance.value())?;
        }
    }
    out.flush()?;
    Ok(())
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PruneStats {
    pub kept: usize,
    pub dropped: usize,
}

/// Copy qrels lines whose tweet exists in `store`; other lines are dropped.
pub fn prune_qrels<R, W>(reader: R, mut out: W, store: &dyn TweetSource) -> Result<PruneStats>
where
    R: BufRead,
    W: Write,
{
    let mut stats = PruneStats::default();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let Some(q) = parse_line(&line, idx + 1)? else { continue };
        if store.exists(q.tweet_id)? {
            writeln!(out, "{line}")?;
            stats.kept += 1;
        } else {
            stats.dropped += 1;
        }
    }
    out.flush()?;
    Ok(stats)
}

/// For each topic, every judged-relevant tweet found in `store`, as
/// `MB{topic} {id} {relevance} {text}` lines.
pub fn write_relevant_tweets<W: Write>(
    topics: &[Topic],
    judgments: &Judgments,
    store: &dyn TweetSource,
    mut out: W,
) -> Result<usize> {
    let mut written = 0;
    for topic in topics {
        let Some(tweets) = judgments.for_topic(topic.number) else { continue };
        writeln!(out, "# MB{:03} {}", topic.number, topic.title)?;
        for (tweet_id, relevance) in tweets.iter().filter(|(_, r)| r.is_relevant()) {
            if let Some(tweet) = store.fetch(*tweet_id)? {
                let text = tweet.text.replace(['\n', '\r'], " ");
                writeln!(out, "MB{:03} {} {} {}", topic.number, tweet.id, relevance.value(), text)?;
                written += 1;
            }
        }
    }
    out.flush()?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::Tweet;

    const QRELS: &str = "1 0 100 1\n1 0 300 -2\n\n1 0 200 0\n2 0 50 2\n";

    #[test]
    fn parses_and_sorts_by_tweet_id() {
        let judgments = parse_qrels(QRELS.as_bytes()).unwrap();
        assert_eq!(judgments.len(), 4);
        let ids: Vec<TweetId> = judgments.for_topic(1).unwrap().keys().copied().collect();
        assert_eq!(ids, vec![100, 200, 300]);
        assert_eq!(judgments.get(1, 300), Relevance::Nonrelevant);
        assert_eq!(judgments.get(2, 50), Relevance::HighlyRelevant);
        assert_eq!(judgments.get(2, 51), Relevance::NotJudged);
    }

    #[test]
    fn reports_line_of_malformed_input() {
        let err = parse_qrels("1 0 100 1\n1 0 abc 1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, FilterError::Parse { line: 2, .. }));
        assert!(parse_qrels("1 0 100\n".as_bytes()).is_err());
    }

    #[test]
    fn writes_tweets_descending_within_topic() {
        let judgments = parse_qrels(QRELS.as_bytes()).unwrap();
        let mut out = Vec::new();
        write_qrels(&judgments, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1 0 300 -2\n1 0 200 0\n1 0 100 1\n2 0 50 2\n");
    }

    #[test]
    fn prune_keeps_stored_tweets_only() {
        let store: MemoryStore = [100, 50].into_iter().map(|id| Tweet::new(id, "t")).collect();
        let mut out = Vec::new();
        let stats = prune_qrels(QRELS.as_bytes(), &mut out, &store).unwrap();
        assert_eq!(stats, PruneStats { kept: 2, dropped: 2 });
        assert_eq!(String::from_utf8(out).unwrap(), "1 0 100 1\n2 0 50 2\n");
    }
}
