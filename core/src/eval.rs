use crate::output::RunRecord;
use crate::qrels::Judgments;
use crate::{TopicNumber, TweetId};
use std::collections::{BTreeMap, BTreeSet};

/// Retrieval quality of one topic. Unjudged retrieved tweets count as false
/// positives, the way the TREC scripts treat them.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicEvaluation {
    pub topic: TopicNumber,
    pub true_positives: Vec<TweetId>,
    pub false_positives: Vec<TweetId>,
    pub false_negatives: Vec<TweetId>,
}

impl TopicEvaluation {
    pub fn precision(&self) -> f64 {
        ratio(self.true_positives.len(), self.true_positives.len() + self.false_positives.len())
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_positives.len(), self.true_positives.len() + self.false_negatives.len())
    }

    /// F-measure weighting precision twice as much as recall.
    pub fn f_half(&self) -> f64 {
        f_beta(self.precision(), self.recall(), 0.5)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub topics: Vec<TopicEvaluation>,
}

impl Evaluation {
    fn mean(&self, metric: impl Fn(&TopicEvaluation) -> f64) -> f64 {
        if self.topics.is_empty() {
            return 0.0;
        }
        self.topics.iter().map(metric).sum::<f64>() / self.topics.len() as f64
    }

    pub fn mean_precision(&self) -> f64 {
        self.mean(TopicEvaluation::precision)
    }

    pub fn mean_recall(&self) -> f64 {
        self.mean(TopicEvaluation::recall)
    }

    pub fn mean_f_half(&self) -> f64 {
        self.mean(TopicEvaluation::f_half)
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn f_beta(precision: f64, recall: f64, beta: f64) -> f64 {
    let b2 = beta * beta;
    let den = b2 * precision + recall;
    if den == 0.0 {
        0.0
    } else {
        (1.0 + b2) * precision * recall / den
    }
}

/// Compare the retrieved tweets of a run with the judgments. Every topic
/// that has judgments is evaluated, even when the run retrieved nothing.
pub fn evaluate(judgments: &Judgments, run: &[RunRecord]) -> Evaluation {
    let mut retrieved: BTreeMap<TopicNumber, BTreeSet<TweetId>> = BTreeMap::new();
    for record in run.iter().filter(|r| r.retrieve) {
        retrieved.entry(record.topic).or_default().insert(record.tweet_id);
    }

    let topics = judgments
        .iter()
        .map(|(topic, judged)| {
            let hits = retrieved.remove(&topic).unwrap_or_default();
            let mut eval = TopicEvaluation {
                topic,
                true_positives: Vec::new(),
                false_positives: Vec::new(),
                false_negatives: Vec::new(),
            };
            for id in &hits {
                if judgments.get(topic, *id).is_relevant() {
                    eval.true_positives.push(*id);
                } else {
                    eval.false_positives.push(*id);
                }
            }
            eval.false_negatives = judged
                .iter()
                .filter(|(id, r)| r.is_relevant() && !hits.contains(*id))
                .map(|(id, _)| *id)
                .collect();
            eval
        })
        .collect();
    Evaluation { topics }
}
