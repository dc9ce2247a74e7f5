use crate::{Result, Tweet, TweetId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{create_dir_all, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Read access to the tweet collection.
pub trait TweetSource {
    /// The tweet with exactly this id, if stored.
    fn fetch(&self, id: TweetId) -> Result<Option<Tweet>>;

    /// Tweets with id >= `id`, ascending. Each call starts a new pass.
    fn iter_from(&self, id: TweetId) -> Box<dyn Iterator<Item = Result<Tweet>> + '_>;

    fn exists(&self, id: TweetId) -> Result<bool> {
        Ok(self.fetch(id)?.is_some())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_tweets: u64,
    pub created_at: String,
    pub version: u32,
}

pub struct StorePaths {
    pub root: PathBuf,
}

impl StorePaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn db(&self) -> PathBuf { self.root.join("tweets.sled") }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

/// Tweets in a sled tree keyed by the big-endian id, so key order is id
/// order. Values are bincode-encoded [`Tweet`]s.
pub struct TweetStore {
    paths: StorePaths,
    _db: sled::Db,
    tweets: sled::Tree,
}

fn key(id: TweetId) -> [u8; 8] {
    id.to_be_bytes()
}

fn decode(bytes: &[u8]) -> Result<Tweet> {
    Ok(bincode::deserialize(bytes)?)
}

impl TweetStore {
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let paths = StorePaths::new(root);
        create_dir_all(&paths.root)?;
        let db = sled::open(paths.db())?;
        let tweets = db.open_tree("tweets")?;
        Ok(Self { paths, _db: db, tweets })
    }

    pub fn root(&self) -> &Path {
        &self.paths.root
    }

    /// Store `tweet`, replacing any tweet with the same id. Returns true when
    /// the id was new.
    pub fn insert(&self, tweet: &Tweet) -> Result<bool> {
        let bytes = bincode::serialize(tweet)?;
        let previous = self.tweets.insert(key(tweet.id), bytes)?;
        Ok(previous.is_none())
    }

    /// Store `tweet` unless its id is already present; the stored tweet wins.
    pub fn insert_new(&self, tweet: &Tweet) -> Result<bool> {
        let bytes = bincode::serialize(tweet)?;
        let swapped = self.tweets.compare_and_swap(key(tweet.id), None as Option<&[u8]>, Some(bytes))?;
        Ok(swapped.is_ok())
    }

    pub fn len(&self) -> usize {
        self.tweets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tweets.is_empty()
    }

    pub fn flush(&self) -> Result<()> {
        self.tweets.flush()?;
        Ok(())
    }

    pub fn save_meta(&self, meta: &MetaFile) -> Result<()> {
        let mut f = File::create(self.paths.meta())?;
        let json = serde_json::to_string_pretty(meta)?;
        f.write_all(json.as_bytes())?;
        Ok(())
    }

    pub fn load_meta(&self) -> Result<MetaFile> {
        let mut f = File::open(self.paths.meta())?;
        let mut buf = String::new();
        f.read_to_string(&mut buf)?;
        let meta: MetaFile = serde_json::from_str(&buf)?;
        Ok(meta)
    }

    /// Record the current tweet count and time in `meta.json`.
    pub fn write_meta_now(&self) -> Result<MetaFile> {
        let meta = MetaFile {
            num_tweets: self.len() as u64,
            created_at: time::OffsetDateTime::now_utc()
                .format(&time::format_description::well_known::Rfc3339)
                .unwrap_or_default(),
            version: 1,
        };
        self.save_meta(&meta)?;
        Ok(meta)
    }
}

impl TweetSource for TweetStore {
    fn fetch(&self, id: TweetId) -> Result<Option<Tweet>> {
        match self.tweets.get(key(id))? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn iter_from(&self, id: TweetId) -> Box<dyn Iterator<Item = Result<Tweet>> + '_> {
        Box::new(self.tweets.range(key(id)..).map(|entry| {
            let (_, bytes) = entry?;
            decode(&bytes)
        }))
    }

    fn exists(&self, id: TweetId) -> Result<bool> {
        Ok(self.tweets.contains_key(key(id))?)
    }
}

/// In-memory tweet collection.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    tweets: BTreeMap<TweetId, Tweet>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tweet: Tweet) {
        self.tweets.insert(tweet.id, tweet);
    }

    pub fn len(&self) -> usize {
        self.tweets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tweets.is_empty()
    }
}

impl FromIterator<Tweet> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = Tweet>>(iter: I) -> Self {
        let tweets = iter.into_iter().map(|t| (t.id, t)).collect();
        Self { tweets }
    }
}

impl TweetSource for MemoryStore {
    fn fetch(&self, id: TweetId) -> Result<Option<Tweet>> {
        Ok(self.tweets.get(&id).cloned())
    }

    fn iter_from(&self, id: TweetId) -> Box<dyn Iterator<Item = Result<Tweet>> + '_> {
        Box::new(self.tweets.range(id..).map(|(_, t)| Ok(t.clone())))
    }

    fn exists(&self, id: TweetId) -> Result<bool> {
        Ok(self.tweets.contains_key(&id))
    }
}
