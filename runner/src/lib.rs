use anyhow::{Context, Result};
use filter_core::config::FilterConfig;
use filter_core::controller::{FetchMode, FilterController, Phase, TopicReport};
use filter_core::eval::{evaluate, Evaluation};
use filter_core::filter::FilterKind;
use filter_core::output::{load_run, RunWriter};
use filter_core::qrels::{load_qrels, prune_qrels, write_qrels, write_relevant_tweets, PruneStats};
use filter_core::store::TweetSource;
use filter_core::topics::load_topics;
use filter_core::TweetId;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber. With `log_file` set, output goes to that
/// file without ANSI colours instead of stderr.
pub fn init_logging(log_file: Option<&Path>) -> Result<()> {
    match log_file {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
            fmt()
                .with_env_filter(EnvFilter::from_default_env())
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        None => fmt().with_env_filter(EnvFilter::from_default_env()).init(),
    }
    Ok(())
}

/// Everything a filtering run needs besides the tweet store.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub filter: FilterKind,
    pub run_tag: String,
    pub topics: PathBuf,
    pub qrels: PathBuf,
    pub fetch_mode: FetchMode,
    pub all_decisions: bool,
    pub config: Option<PathBuf>,
}

#[derive(Debug)]
pub struct RunSummary {
    pub reports: Vec<TopicReport>,
    pub written: usize,
}

impl RunSummary {
    pub fn aborted(&self) -> usize {
        self.reports.iter().filter(|r| r.phase == Phase::Aborted).count()
    }
}

/// Filter every topic against `store` and write the run to `out`.
pub fn run_filter<W: Write>(store: &dyn TweetSource, opts: &RunOptions, out: W) -> Result<RunSummary> {
    let config = match &opts.config {
        Some(path) => FilterConfig::load(path).with_context(|| format!("loading config {}", path.display()))?,
        None => FilterConfig::default(),
    };
    let topics = load_topics(&opts.topics).with_context(|| format!("loading topics {}", opts.topics.display()))?;
    let judgments = load_qrels(&opts.qrels).with_context(|| format!("loading qrels {}", opts.qrels.display()))?;
    tracing::info!(
        filter = opts.filter.name(),
        topics = topics.len(),
        judgments = judgments.len(),
        mode = %opts.fetch_mode,
        "starting run"
    );

    let controller = FilterController::new(store, &judgments).with_fetch_mode(opts.fetch_mode);
    let mut writer = RunWriter::new(out, opts.run_tag.clone()).with_all_decisions(opts.all_decisions);
    let reports = controller.run(&topics, || opts.filter.build(&config), &mut writer)?;
    let written = writer.written();
    writer.finish()?;

    let summary = RunSummary { reports, written };
    tracing::info!(written, aborted = summary.aborted(), "run complete");
    Ok(summary)
}

pub fn show_tweet<W: Write>(store: &dyn TweetSource, id: TweetId, mut out: W) -> Result<()> {
    let tweet = store.fetch(id)?.with_context(|| format!("tweet {id} not found"))?;
    write!(out, "{tweet}")?;
    Ok(())
}

/// Print up to `limit` tweets starting at `id`. Returns how many were printed.
pub fn step_from<W: Write>(store: &dyn TweetSource, id: TweetId, limit: usize, mut out: W) -> Result<usize> {
    let mut shown = 0;
    for tweet in store.iter_from(id).take(limit) {
        let tweet = tweet?;
        if shown > 0 {
            writeln!(out)?;
        }
        write!(out, "{tweet}")?;
        shown += 1;
    }
    Ok(shown)
}

pub fn show_topics<W: Write>(topics: &Path, mut out: W) -> Result<()> {
    for (i, topic) in load_topics(topics)?.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        write!(out, "{topic}")?;
    }
    Ok(())
}

/// Re-emit a qrels file in canonical order.
pub fn rewrite_qrels<W: Write>(qrels: &Path, out: W) -> Result<()> {
    let judgments = load_qrels(qrels)?;
    write_qrels(&judgments, out)?;
    Ok(())
}

pub fn prune<W: Write>(store: &dyn TweetSource, qrels: &Path, out: W) -> Result<PruneStats> {
    let reader = BufReader::new(File::open(qrels).with_context(|| format!("opening {}", qrels.display()))?);
    let stats = prune_qrels(reader, out, store)?;
    tracing::info!(kept = stats.kept, dropped = stats.dropped, "pruned qrels");
    Ok(stats)
}

pub fn write_relevant<W: Write>(store: &dyn TweetSource, topics: &Path, qrels: &Path, out: W) -> Result<usize> {
    let topics = load_topics(topics)?;
    let judgments = load_qrels(qrels)?;
    Ok(write_relevant_tweets(&topics, &judgments, store, out)?)
}

/// Score a run file and print one line per topic plus the macro averages.
pub fn evaluate_run<W: Write>(qrels: &Path, run: &Path, mut out: W) -> Result<Evaluation> {
    let judgments = load_qrels(qrels)?;
    let records = load_run(run).with_context(|| format!("reading run {}", run.display()))?;
    let eval = evaluate(&judgments, &records);

    writeln!(out, "topic   tp   fp   fn  precision  recall  f0.5")?;
    for t in &eval.topics {
        writeln!(
            out,
            "MB{:03} {:4} {:4} {:4} {:10.4} {:7.4} {:5.4}",
            t.topic,
            t.true_positives.len(),
            t.false_positives.len(),
            t.false_negatives.len(),
            t.precision(),
            t.recall(),
            t.f_half()
        )?;
    }
    writeln!(
        out,
        "mean                {:10.4} {:7.4} {:5.4}",
        eval.mean_precision(),
        eval.mean_recall(),
        eval.mean_f_half()
    )?;
    Ok(eval)
}

/// Stdout, or a buffered file when `path` is given.
pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) => Box::new(BufWriter::new(File::create(p).with_context(|| format!("creating {}", p.display()))?)),
        None => Box::new(std::io::stdout().lock()),
    })
}
