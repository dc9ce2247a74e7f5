use crate::{Decision, FilterError, Result, TopicNumber, TweetId};
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

/// Receives every decision the controller makes, in order.
pub trait DecisionSink {
    fn emit(&mut self, topic: TopicNumber, decision: &Decision) -> Result<()>;
}

/// Canonical run-file line: `MB{topic:03} {id} {score:.3} {yes|no} {tag}`.
pub fn format_record(topic: TopicNumber, decision: &Decision, run_tag: &str) -> String {
    format!(
        "MB{:03} {} {:.3} {} {}",
        topic,
        decision.tweet_id,
        decision.score,
        if decision.retrieve { "yes" } else { "no" },
        run_tag
    )
}

/// One parsed run-file line.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    pub topic: TopicNumber,
    pub tweet_id: TweetId,
    pub score: f64,
    pub retrieve: bool,
    pub run_tag: String,
}

pub fn parse_record(line: &str, number: usize) -> Result<RunRecord> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let bad = |message: String| FilterError::Parse { line: number, message };
    if fields.len() < 4 {
        return Err(bad(format!("expected at least 4 fields, got {}", fields.len())));
    }
    let topic: TopicNumber = fields[0]
        .strip_prefix("MB")
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| bad(format!("invalid topic {:?}", fields[0])))?;
    let tweet_id: TweetId = fields[1].parse().map_err(|_| bad(format!("invalid tweet id {:?}", fields[1])))?;
    let score: f64 = fields[2].parse().map_err(|_| bad(format!("invalid score {:?}", fields[2])))?;
    let retrieve = match fields[3] {
        "yes" => true,
        "no" => false,
        other => return Err(bad(format!("invalid decision {other:?}"))),
    };
    Ok(RunRecord { topic, tweet_id, score, retrieve, run_tag: fields[4..].join(" ") })
}

pub fn read_run<R: BufRead>(reader: R) -> Result<Vec<RunRecord>> {
    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(parse_record(&line, idx + 1)?);
    }
    Ok(records)
}

pub fn load_run<P: AsRef<Path>>(path: P) -> Result<Vec<RunRecord>> {
    read_run(BufReader::new(File::open(path)?))
}

/// Writes decisions in the canonical run format. Unless `all_decisions` is
/// set only retrieved tweets are written, as TREC run files expect.
pub struct RunWriter<W: Write> {
    out: W,
    run_tag: String,
    all_decisions: bool,
    written: usize,
}

impl<W: Write> RunWriter<W> {
    pub fn new(out: W, run_tag: impl Into<String>) -> Self {
        Self { out, run_tag: run_tag.into(), all_decisions: false, written: 0 }
    }

    pub fn with_all_decisions(mut self, all: bool) -> Self {
        self.all_decisions = all;
        self
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn finish(mut self) -> Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

impl<W: Write> DecisionSink for RunWriter<W> {
    fn emit(&mut self, topic: TopicNumber, decision: &Decision) -> Result<()> {
        if decision.retrieve || self.all_decisions {
            writeln!(self.out, "{}", format_record(topic, decision, &self.run_tag))?;
            self.written += 1;
        }
        Ok(())
    }
}

/// Keeps every emitted decision in memory.
#[derive(Debug, Default, Clone)]
pub struct DecisionLog {
    pub decisions: Vec<(TopicNumber, Decision)>,
}

impl DecisionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_topic(&self, topic: TopicNumber) -> Vec<Decision> {
        self.decisions.iter().filter(|(t, _)| *t == topic).map(|(_, d)| *d).collect()
    }
}

impl DecisionSink for DecisionLog {
    fn emit(&mut self, topic: TopicNumber, decision: &Decision) -> Result<()> {
        self.decisions.push((topic, *decision));
        Ok(())
    }
}
