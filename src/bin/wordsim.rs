//! WORDSIM Binary
//!
//! Interactive similarity search over a word embeddings file.

use std::io;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use wordsim::{Config, KeyPolicy, Menu, Session};

/// WORDSIM - Similarity Search with Word Embeddings
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Embeddings file to load at startup
    #[arg(short, long)]
    embeddings: Option<PathBuf>,

    /// File that results are appended to
    #[arg(short, long, default_value = wordsim::config::DEFAULT_OUTPUT_PATH)]
    output: PathBuf,

    /// Matches reported by option (3)
    #[arg(short = 'n', long, default_value_t = wordsim::vector::DEFAULT_TOP_N)]
    top_n: usize,

    /// Match words case-insensitively (keys are lowercased on load)
    #[arg(long)]
    ignore_case: bool,

    /// Print results only, without appending them to the output file
    #[arg(long)]
    no_file_output: bool,

    /// Log filter directive, overridden by RUST_LOG
    #[arg(long, default_value = "wordsim=warn")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr so they never mix with rendered results
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&args.log_level))?;
    fmt().with_env_filter(filter).with_writer(io::stderr).init();

    let key_policy = if args.ignore_case {
        KeyPolicy::IgnoreCase
    } else {
        KeyPolicy::Exact
    };
    let config = Config::default()
        .with_output_path(&args.output)
        .with_top_n(args.top_n)
        .with_key_policy(key_policy)
        .with_write_results(!args.no_file_output);

    info!(?config, "Starting wordsim");
    let session = Session::new(config);

    if let Some(path) = &args.embeddings {
        match session.load_embeddings(path) {
            Ok(store) => println!(
                "Word embeddings file loaded successfully ({} words, {} dimensions).",
                store.len(),
                store.dimension()
            ),
            Err(e) => eprintln!("Error loading word embeddings file: {e}"),
        }
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    Menu::new(&session, stdin.lock(), stdout.lock()).run()?;

    info!(stats = %session.stats(), "Session finished");
    Ok(())
}
