use anyhow::Result;
use clap::{Parser, Subcommand};
use filter_core::controller::FetchMode;
use filter_core::filter::FilterKind;
use filter_core::store::TweetStore;
use filter_core::TweetId;
use runner::{
    evaluate_run, init_logging, open_output, prune, rewrite_qrels, run_filter, show_tweet, show_topics, step_from,
    write_relevant, RunOptions,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "runner")]
#[command(about = "Run adaptive tweet filters over TREC microblog topics", long_about = None)]
struct Cli {
    /// Tweet store directory
    #[arg(long, global = true, default_value = "./data/tweets")]
    db: PathBuf,
    /// Write log output to this file instead of stderr
    #[arg(long, global = true)]
    log: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a filter over every topic and write the run file
    Run {
        /// baseline, boolean-or, query, feedback or bayes
        filter: String,
        run_tag: String,
        /// Run file to write (stdout when omitted)
        output: Option<PathBuf>,
        #[arg(long, default_value = "./data/topics.xml")]
        topics: PathBuf,
        #[arg(long, default_value = "./data/qrels.txt")]
        qrels: PathBuf,
        /// all: every stored tweet; judged: only tweets in the qrels
        #[arg(long, default_value = "judged")]
        fetch_mode: String,
        /// Also write rejected tweets, marked "no"
        #[arg(long, default_value_t = false)]
        all_decisions: bool,
        /// JSON file with filter tuning parameters
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print one tweet
    ShowTweet { id: TweetId },
    /// Print tweets in id order starting at an id
    StepFrom {
        id: TweetId,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Print the parsed topics
    ShowTopics {
        #[arg(long, default_value = "./data/topics.xml")]
        topics: PathBuf,
    },
    /// Rewrite a qrels file in canonical order
    WriteQrels {
        #[arg(long, default_value = "./data/qrels.txt")]
        qrels: PathBuf,
        output: Option<PathBuf>,
    },
    /// Keep only judgments whose tweet is in the store
    PruneQrels {
        #[arg(long, default_value = "./data/qrels.txt")]
        qrels: PathBuf,
        output: Option<PathBuf>,
    },
    /// Write the text of every judged-relevant tweet, grouped by topic
    WriteRelevant {
        #[arg(long, default_value = "./data/topics.xml")]
        topics: PathBuf,
        #[arg(long, default_value = "./data/qrels.txt")]
        qrels: PathBuf,
        output: Option<PathBuf>,
    },
    /// Score a run file against the judgments
    Evaluate {
        run: PathBuf,
        #[arg(long, default_value = "./data/qrels.txt")]
        qrels: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log.as_deref())?;

    match cli.command {
        Commands::Run { filter, run_tag, output, topics, qrels, fetch_mode, all_decisions, config } => {
            let opts = RunOptions {
                filter: filter.parse::<FilterKind>()?,
                run_tag,
                topics,
                qrels,
                fetch_mode: fetch_mode.parse::<FetchMode>()?,
                all_decisions,
                config,
            };
            let store = TweetStore::open(&cli.db)?;
            let summary = run_filter(&store, &opts, open_output(output.as_deref())?)?;
            for report in &summary.reports {
                tracing::debug!(?report, "topic report");
            }
            Ok(())
        }
        Commands::ShowTweet { id } => show_tweet(&TweetStore::open(&cli.db)?, id, std::io::stdout().lock()),
        Commands::StepFrom { id, limit } => {
            step_from(&TweetStore::open(&cli.db)?, id, limit, std::io::stdout().lock())?;
            Ok(())
        }
        Commands::ShowTopics { topics } => show_topics(&topics, std::io::stdout().lock()),
        Commands::WriteQrels { qrels, output } => rewrite_qrels(&qrels, open_output(output.as_deref())?),
        Commands::PruneQrels { qrels, output } => {
            prune(&TweetStore::open(&cli.db)?, &qrels, open_output(output.as_deref())?)?;
            Ok(())
        }
        Commands::WriteRelevant { topics, qrels, output } => {
            let written = write_relevant(&TweetStore::open(&cli.db)?, &topics, &qrels, open_output(output.as_deref())?)?;
            tracing::info!(written, "wrote relevant tweets");
            Ok(())
        }
        Commands::Evaluate { run, qrels } => {
            evaluate_run(&qrels, &run, std::io::stdout().lock())?;
            Ok(())
        }
    }
}
