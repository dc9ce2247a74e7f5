use filter_core::config::{BayesParams, FilterConfig, RocchioParams};
use filter_core::filter::{instance_weight, BayesFilter, FeedbackFilter, Filter, FilterKind};
use filter_core::{Relevance, Topic, Tweet};
use proptest::prelude::*;

fn topic(title: &str) -> Topic {
    Topic {
        number: 1,
        title: title.into(),
        query_time: String::new(),
        query_tweet_time: 0,
        query_newest_tweet: u64::MAX,
    }
}

const WORDS: &[&str] = &["apple", "harvest", "market", "stock", "orchard", "rain", "good", "the", "a", "cider"];

fn text_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(WORDS), 0..8).prop_map(|w| w.join(" "))
}

fn relevance_strategy() -> impl Strategy<Value = Relevance> {
    prop::sample::select(vec![
        Relevance::Nonrelevant,
        Relevance::NotJudged,
        Relevance::Relevant,
        Relevance::HighlyRelevant,
    ])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn rocchio_weights_stay_non_negative_and_summed(
        gamma in -2.0f64..1.0,
        events in prop::collection::vec((text_strategy(), relevance_strategy()), 1..12),
    ) {
        let params = RocchioParams { gamma, ..RocchioParams::default() };
        let mut filter = FeedbackFilter::new(params);
        filter.configure(&topic("apple harvest")).unwrap();
        for (i, (text, relevance)) in events.iter().enumerate() {
            filter.observe_feedback(&Tweet::new(i as u64, text.clone()), *relevance).unwrap();
            let q = filter.expanded_query();
            prop_assert!(q.iter().all(|(_, w)| w >= 0.0));
            let sum: f64 = q.iter().map(|(_, w)| w).sum();
            prop_assert_eq!(q.total_weight(), sum);
        }
    }

    #[test]
    fn skew_weight_is_exact_ratio_then_clipped(rel in 1u32..500, nonrel in 1u32..500, relevant in any::<bool>()) {
        let raw = instance_weight(relevant, rel, nonrel);
        let expected = if relevant { nonrel as f64 / rel as f64 } else { rel as f64 / nonrel as f64 };
        prop_assert_eq!(raw, expected);
        let params = BayesParams::default();
        let clipped = raw.clamp(params.min_instance_weight, params.max_instance_weight);
        prop_assert!((0.25..=4.0).contains(&clipped));
    }

    #[test]
    fn boolean_or_decide_is_pure(title in text_strategy(), text in text_strategy()) {
        let mut filter = FilterKind::BooleanOr.build(&FilterConfig::default());
        filter.configure(&topic(&title)).unwrap();
        let tweet = Tweet::new(5, text);
        prop_assert_eq!(filter.decide(&tweet).unwrap(), filter.decide(&tweet).unwrap());
    }

    #[test]
    fn bayes_cold_start_always_retrieves(
        texts in prop::collection::vec(text_strategy(), 1..10),
        relevant in any::<bool>(),
    ) {
        let mut filter = BayesFilter::new(BayesParams::default());
        filter.configure(&topic("apple harvest")).unwrap();
        let label = if relevant { Relevance::Relevant } else { Relevance::Nonrelevant };
        for (i, text) in texts.iter().enumerate() {
            let tweet = Tweet::new(i as u64, text.clone());
            let d = filter.decide(&tweet).unwrap();
            prop_assert!(d.retrieve);
            prop_assert_eq!(d.score, 1.0);
            filter.observe_feedback(&tweet, label).unwrap();
        }
        prop_assert!(filter.is_cold());
    }
}

#[test]
fn one_example_of_each_polarity_ends_cold_start() {
    let mut filter = BayesFilter::new(BayesParams::default());
    filter.configure(&topic("apple harvest")).unwrap();
    filter.observe_feedback(&Tweet::new(1, "apple harvest"), Relevance::Relevant).unwrap();
    assert!(filter.is_cold());
    filter.observe_feedback(&Tweet::new(2, "stock market"), Relevance::Nonrelevant).unwrap();
    assert!(!filter.is_cold());
    assert_eq!(filter.decide(&Tweet::new(3, "stock market")).unwrap().score, 2.0);
}

#[test]
fn query_match_scores_fraction_of_stemmed_terms() {
    let mut filter = FilterKind::Query.build(&FilterConfig::default());
    filter.configure(&topic("apple harvest")).unwrap();
    let d = filter.decide(&Tweet::new(1, "I love apple harvesting today")).unwrap();
    assert_eq!(d.score, 1.0);
    assert!(d.retrieve);
}

#[test]
fn rocchio_adds_beta_for_new_relevant_term() {
    let mut filter = FeedbackFilter::new(RocchioParams::default());
    filter.configure(&topic("apple harvest")).unwrap();
    filter.observe_feedback(&Tweet::new(1, "good"), Relevance::Relevant).unwrap();
    assert_eq!(filter.expanded_query().weight("good"), 0.75);

    filter.configure(&topic("good harvest")).unwrap();
    filter.observe_feedback(&Tweet::new(1, "good"), Relevance::Relevant).unwrap();
    assert_eq!(filter.expanded_query().weight("good"), 1.75);
}

#[test]
fn configure_resets_learned_state() {
    let mut filter = FeedbackFilter::new(RocchioParams::default());
    filter.configure(&topic("apple")).unwrap();
    filter.observe_feedback(&Tweet::new(1, "cider"), Relevance::Relevant).unwrap();
    filter.configure(&topic("apple")).unwrap();
    assert_eq!(filter.feedback_counts(), (0, 0));
    assert!(!filter.expanded_query().contains("cider"));
}
