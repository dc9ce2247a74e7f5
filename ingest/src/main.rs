use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use filter_core::store::TweetStore;
use filter_core::{Tweet, TweetId, User};
use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// A tweet as written by the crawler. Deleted or protected tweets come back
/// without text and are skipped.
#[derive(Debug, Deserialize)]
struct InputTweet {
    id: Option<TweetId>,
    text: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    retweeted: Option<bool>,
    #[serde(default)]
    retweet_count: Option<serde_json::Value>,
    #[serde(default)]
    favorited: Option<bool>,
    #[serde(default)]
    user: Option<InputUser>,
    #[serde(default)]
    requested_id: Option<TweetId>,
}

#[derive(Debug, Default, Deserialize)]
struct InputUser {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    screen_name: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

/// Twitter reports large counts as strings like "100+".
fn parse_count(value: Option<&serde_json::Value>) -> u64 {
    match value {
        Some(serde_json::Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(serde_json::Value::String(s)) => s.trim_end_matches('+').parse().unwrap_or(0),
        _ => 0,
    }
}

impl InputTweet {
    fn into_tweet(self) -> Option<Tweet> {
        let id = self.id?;
        let text = self.text.filter(|t| !t.is_empty())?;
        let user = self.user.unwrap_or_default();
        Some(Tweet {
            id,
            text,
            created_at: self.created_at.unwrap_or_default(),
            retweeted: self.retweeted.unwrap_or(false),
            retweet_count: parse_count(self.retweet_count.as_ref()),
            favorited: self.favorited.unwrap_or(false),
            user: User {
                id: user.id.unwrap_or(0),
                screen_name: user.screen_name.unwrap_or_default(),
                name: user.name.unwrap_or_default(),
            },
            requested_id: self.requested_id,
        })
    }
}

#[derive(Parser)]
#[command(name = "ingest")]
#[command(about = "Import crawled tweets into the tweet store", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import JSON/JSONL tweet files from a file or directory
    Build {
        /// Input path (file or directory)
        #[arg(long)]
        input: Option<String>,
        /// File listing one input path per line
        #[arg(long)]
        list: Option<String>,
        /// Tweet store directory
        #[arg(long, default_value = "./data/tweets")]
        db: String,
    },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct ImportStats {
    imported: usize,
    duplicates: usize,
    skipped: usize,
    malformed: usize,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, list, db } => {
            let mut files = Vec::new();
            if let Some(input) = input {
                files.extend(collect_files(Path::new(&input)));
            }
            if let Some(list) = list {
                for line in fs::read_to_string(&list).with_context(|| format!("reading {list}"))?.lines() {
                    let line = line.trim();
                    if !line.is_empty() {
                        files.extend(collect_files(Path::new(line)));
                    }
                }
            }
            if files.is_empty() {
                anyhow::bail!("no input files; pass --input or --list");
            }
            let store = TweetStore::open(&db)?;
            let stats = import_files(&store, &files)?;
            tracing::info!(
                db = %db,
                imported = stats.imported,
                duplicates = stats.duplicates,
                skipped = stats.skipped,
                malformed = stats.malformed,
                "import complete"
            );
            Ok(())
        }
    }
}

fn collect_files(input_path: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if input_path.is_dir() {
        for entry in WalkDir::new(input_path).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && matches!(p.extension().and_then(|s| s.to_str()), Some("json" | "jsonl")) {
                files.push(p.to_path_buf());
            }
        }
    } else if input_path.is_file() {
        files.push(input_path.to_path_buf());
    } else {
        tracing::warn!(path = %input_path.display(), "input path not found");
    }
    files
}

fn import_files(store: &TweetStore, files: &[PathBuf]) -> Result<ImportStats> {
    let mut stats = ImportStats::default();
    for (i, file) in files.iter().enumerate() {
        tracing::info!(file = %file.display(), n = i + 1, of = files.len(), "importing");
        if file.extension().and_then(|s| s.to_str()) == Some("json") {
            import_json(store, file, &mut stats)?;
        } else {
            import_jsonl(store, file, &mut stats)?;
        }
        tracing::info!(imported = stats.imported, duplicates = stats.duplicates, "progress");
    }
    store.flush()?;
    store.write_meta_now()?;
    Ok(stats)
}

/// One tweet per line. A line that is not valid JSON is counted and skipped.
fn import_jsonl(store: &TweetStore, file: &Path, stats: &mut ImportStats) -> Result<()> {
    let reader = BufReader::new(File::open(file).with_context(|| format!("opening {}", file.display()))?);
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<InputTweet>(&line) {
            Ok(input) => ingest_tweet(store, input, stats)?,
            Err(err) => {
                tracing::warn!(file = %file.display(), line = idx + 1, error = %err, "malformed tweet");
                stats.malformed += 1;
            }
        }
    }
    Ok(())
}

fn import_json(store: &TweetStore, file: &Path, stats: &mut ImportStats) -> Result<()> {
    let reader = BufReader::new(File::open(file).with_context(|| format!("opening {}", file.display()))?);
    let json: serde_json::Value = serde_json::from_reader(reader)?;
    let values = match json {
        serde_json::Value::Array(arr) => arr,
        obj @ serde_json::Value::Object(_) => vec![obj],
        _ => Vec::new(),
    };
    for v in values {
        match serde_json::from_value::<InputTweet>(v) {
            Ok(input) => ingest_tweet(store, input, stats)?,
            Err(_) => stats.malformed += 1,
        }
    }
    Ok(())
}

fn ingest_tweet(store: &TweetStore, input: InputTweet, stats: &mut ImportStats) -> Result<()> {
    let Some(tweet) = input.into_tweet() else {
        stats.skipped += 1;
        return Ok(());
    };
    if store.insert_new(&tweet)? {
        stats.imported += 1;
    } else {
        stats.duplicates += 1;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use filter_core::store::TweetSource;
    use tempfile::tempdir;

    #[test]
    fn retweet_count_accepts_numbers_and_capped_strings() {
        assert_eq!(parse_count(Some(&serde_json::json!(12))), 12);
        assert_eq!(parse_count(Some(&serde_json::json!("100+"))), 100);
        assert_eq!(parse_count(Some(&serde_json::json!(null))), 0);
        assert_eq!(parse_count(None), 0);
    }

    #[test]
    fn imports_jsonl_and_counts_outcomes() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("tweets.jsonl");
        fs::write(
            &input,
            concat!(
                r#"{"id":30,"text":"apple harvest","retweet_count":"100+","user":{"id":9,"screen_name":"farm","name":"Farm"}}"#,
                "\n",
                r#"{"id":10,"text":"first"}"#,
                "\n",
                r#"{"id":10,"text":"second copy"}"#,
                "\n",
                r#"{"id":11,"requested_id":11}"#,
                "\n",
                "not json\n",
                "\n",
            ),
        )
        .unwrap();

        let store = TweetStore::open(dir.path().join("db")).unwrap();
        let stats = import_files(&store, &collect_files(&input)).unwrap();
        assert_eq!(stats, ImportStats { imported: 2, duplicates: 1, skipped: 1, malformed: 1 });

        let ids: Vec<TweetId> = store.iter_from(0).map(|t| t.unwrap().id).collect();
        assert_eq!(ids, vec![10, 30]);
        assert_eq!(store.fetch(10).unwrap().unwrap().text, "first");
        let farm = store.fetch(30).unwrap().unwrap();
        assert_eq!(farm.retweet_count, 100);
        assert_eq!(farm.user.screen_name, "farm");
        assert_eq!(store.load_meta().unwrap().num_tweets, 2);
    }

    #[test]
    fn directory_input_picks_up_json_arrays() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in");
        fs::create_dir_all(&input).unwrap();
        fs::write(input.join("a.json"), r#"[{"id":1,"text":"one"},{"id":2,"text":"two"}]"#).unwrap();
        fs::write(input.join("notes.txt"), "ignored").unwrap();

        let files = collect_files(&input);
        assert_eq!(files.len(), 1);
        let store = TweetStore::open(dir.path().join("db")).unwrap();
        let stats = import_files(&store, &files).unwrap();
        assert_eq!(stats.imported, 2);
    }
}
