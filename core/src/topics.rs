use crate::{FilterError, Result, Topic, TopicNumber, TweetId};
use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::path::Path;

lazy_static! {
    static ref TOP_RE: Regex = Regex::new(r"(?s)<top>(.*?)</top>").expect("valid regex");
    static ref FIELD_RE: Regex =
        Regex::new(r"(?s)<([a-z]+)>(.*?)</([a-z]+)>").expect("valid regex");
    static ref NUM_RE: Regex = Regex::new(r"(?:MB)?0*(\d+)\s*$").expect("valid regex");
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

fn parse_block(block: &str, index: usize) -> Result<Topic> {
    let mut num = None;
    let mut title = None;
    let mut query_time = String::new();
    let mut tweet_time = None;
    let mut newest = None;
    for cap in FIELD_RE.captures_iter(block) {
        if cap[1] != cap[3] {
            continue;
        }
        let text = unescape(cap[2].trim());
        match &cap[1] {
            "num" => num = Some(text),
            "title" => title = Some(text),
            "querytime" => query_time = text,
            "querytweettime" => tweet_time = Some(text),
            "querynewesttweet" => newest = Some(text),
            _ => {}
        }
    }

    let missing = |field: &str| FilterError::Config(format!("topic #{index}: missing <{field}>"));
    let num = num.ok_or_else(|| missing("num"))?;
    let number: TopicNumber = NUM_RE
        .captures(&num)
        .and_then(|c| c[1].parse().ok())
        .ok_or_else(|| FilterError::Config(format!("topic #{index}: bad topic number {num:?}")))?;
    let id = |field: &str, raw: Option<String>| -> Result<TweetId> {
        let raw = raw.ok_or_else(|| missing(field))?;
        raw.parse()
            .map_err(|_| FilterError::Config(format!("topic MB{number:03}: bad <{field}> {raw:?}")))
    };

    Ok(Topic {
        number,
        title: title.ok_or_else(|| missing("title"))?,
        query_time,
        query_tweet_time: id("querytweettime", tweet_time)?,
        query_newest_tweet: id("querynewesttweet", newest)?,
    })
}

/// Parse TREC microblog filtering topics. The `<topics>` root element is
/// optional; topics come back in file order.
pub fn parse_topics(input: &str) -> Result<Vec<Topic>> {
    let topics = TOP_RE
        .captures_iter(input)
        .enumerate()
        .map(|(i, cap)| parse_block(&cap[1], i + 1))
        .collect::<Result<Vec<_>>>()?;
    if topics.is_empty() {
        return Err(FilterError::Config("no <top> elements found".into()));
    }
    Ok(topics)
}

pub fn load_topics<P: AsRef<Path>>(path: P) -> Result<Vec<Topic>> {
    let input = fs::read_to_string(path)?;
    parse_topics(&input)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOPICS: &str = r#"
<top>
<num> Number: MB001 </num>
<title> BBC World Service staff cuts </title>
<querytime> Tue Feb 08 12:30:27 +0000 2011 </querytime>
<querytweettime> 34952194402811904 </querytweettime>
<querynewesttweet> 35088534306033665 </querynewesttweet>
</top>

<top>
<num>MB12</num>
<title>Egypt &amp; Tahrir</title>
<querytweettime>100</querytweettime>
<querynewesttweet>200</querynewesttweet>
</top>
"#;

    #[test]
    fn parses_topics_without_root() {
        let topics = parse_topics(TOPICS).unwrap();
        assert_eq!(topics.len(), 2);
        assert_eq!(topics[0].number, 1);
        assert_eq!(topics[0].title, "BBC World Service staff cuts");
        assert_eq!(topics[0].query_time, "Tue Feb 08 12:30:27 +0000 2011");
        assert_eq!(topics[0].query_tweet_time, 34952194402811904);
        assert_eq!(topics[1].number, 12);
        assert_eq!(topics[1].title, "Egypt & Tahrir");
        assert_eq!(topics[1].query_time, "");
    }

    #[test]
    fn missing_fields_are_configuration_errors() {
        let err = parse_topics("<topics><top><num>MB3</num><title>x</title></top></topics>").unwrap_err();
        assert!(err.to_string().contains("querytweettime"));
        assert!(parse_topics("<topics></topics>").is_err());
    }
}
