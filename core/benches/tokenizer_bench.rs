use criterion::{criterion_group, criterion_main, Criterion};
use filter_core::tokenizer::{bag_of_words, content_terms, preprocess};

const TWEETS: &[&str] = &[
    "BBC World Service to cut 650 jobs http://bbc.in/abc #media",
    "Sat on the bus reading about the BBC World Service cuts. Grim news for journalism.",
    "RT @someone: Wow, Egypt's protests are growing! http://t.co/xyz",
    "Who else thinks the Super Bowl ads were better this year? #superbowl",
    "Flying to New York tomorrow, hope the snow storm has cleared by then",
];

fn bench_normalize(c: &mut Criterion) {
    let text = TWEETS.join(" ").repeat(20);
    c.bench_function("content_terms", |b| b.iter(|| content_terms(&preprocess(&text))));
    c.bench_function("bag_of_words", |b| b.iter(|| bag_of_words(&text)));
}

criterion_group!(benches, bench_normalize);
criterion_main!(benches);
