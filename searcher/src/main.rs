use anyhow::{Context, Result};
use boolsearch_core::config::CLI_MAX_DOCUMENTS;
use boolsearch_core::{CorpusSize, QueryProcessor, SearchConfig};
use clap::{Parser, ValueEnum};
use searcher::{render_text, run_query};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Clone, Copy, ValueEnum)]
enum CorpusSizeArg {
    /// Distinct indexed terms (reference ranking)
    Terms,
    /// Distinct documents
    Documents,
}

impl From<CorpusSizeArg> for CorpusSize {
    fn from(arg: CorpusSizeArg) -> Self {
        match arg {
            CorpusSizeArg::Terms => CorpusSize::DistinctTerms,
            CorpusSizeArg::Documents => CorpusSize::Documents,
        }
    }
}

#[derive(Parser)]
#[command(name = "searcher")]
#[command(about = "Run a boolean BM25 query against an index file")]
struct Args {
    /// Index file written by `indexer build`
    index: PathBuf,
    /// Query to run; read as one line from stdin when omitted
    #[arg(long)]
    query: Option<String>,
    /// Maximum number of documents to return
    #[arg(long)]
    max_documents: Option<usize>,
    /// What BM25 counts as the corpus size
    #[arg(long, value_enum)]
    corpus_size: Option<CorpusSizeArg>,
    /// JSON file with search settings; flags take precedence
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print results as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(io::stderr).init();
    let args = Args::parse();

    // defaults, then the config file, then flags
    let mut config = SearchConfig::default().with_max_documents(CLI_MAX_DOCUMENTS);
    if let Some(path) = &args.config {
        config = config.load_over(path)?;
    }
    if let Some(n) = args.max_documents {
        config.max_documents = n;
    }
    if let Some(c) = args.corpus_size {
        config.corpus_size = c.into();
    }

    let processor = QueryProcessor::open(&args.index, config)
        .with_context(|| format!("loading index {}", args.index.display()))?;

    let query = match args.query {
        Some(q) => q,
        None => {
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            line.trim_end_matches(['\r', '\n']).to_string()
        }
    };

    let resp = run_query(&processor, &query)?;
    tracing::info!(query = %resp.query, total_hits = resp.total_hits, took_s = resp.took_s, "query complete");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.json {
        serde_json::to_writer_pretty(&mut out, &resp)?;
        writeln!(out)?;
    } else {
        render_text(&resp, &mut out)?;
    }
    Ok(())
}
