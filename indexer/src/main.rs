use anyhow::{Context, Result};
use boolsearch_core::persist::{index_file_len, save_index};
use boolsearch_core::tokenizer::lossy_lines;
use boolsearch_core::IndexBuilder;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};
use walkdir::WalkDir;

use std::fs;
use std::io;
use std::path::Path;

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build a compressed BM25 inverted index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index every regular file under a directory
    Build {
        /// Directory to walk recursively
        #[arg(long)]
        input: String,
        /// Index file to write
        #[arg(long)]
        output: String,
    },
}

#[derive(Debug, Default, PartialEq)]
struct WalkReport {
    indexed: usize,
    skipped: usize,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(io::stderr).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output } => build_index(&input, &output),
    }
}

fn build_index(input: &str, output: &str) -> Result<()> {
    let input_path = Path::new(input);
    anyhow::ensure!(input_path.is_dir(), "input {input} is not a directory");

    let mut builder = IndexBuilder::new();
    let report = index_directory(input_path, &mut builder);
    let index = builder.finish();
    tracing::info!(indexed = report.indexed, skipped = report.skipped, terms = index.term_count(), "ingested documents");

    save_index(output, &index).with_context(|| format!("writing index {output}"))?;
    let bytes = index_file_len(output)?;
    tracing::info!(output, bytes, "index build complete");
    Ok(())
}

/// Feed every readable file under `root` into `builder`, in file-name order.
fn index_directory(root: &Path, builder: &mut IndexBuilder) -> WalkReport {
    let mut report = WalkReport::default();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable entry");
                report.skipped += 1;
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        match read_document(path) {
            Ok(text) => {
                builder.add_document(&path.to_string_lossy(), &text);
                report.indexed += 1;
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unable to read document, skipping");
                report.skipped += 1;
            }
        }
    }
    report
}

/// Document text as the line reader sees it: every line followed by one space.
/// Only a failed read is an error; undecodable bytes are replaced.
fn read_document(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    let mut text = String::with_capacity(bytes.len() + 1);
    for line in lossy_lines(&bytes) {
        text.push_str(&line);
        text.push(' ');
    }
    Ok(text)
}
