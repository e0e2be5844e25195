mod dedup;
mod error;
mod output;
mod parser;
mod settings;
mod tabular;

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use dedup::Deduplicator;
use error::ExtractError;
use parser::expand::RunContext;

#[derive(Parser)]
#[command(name = "ucc_extract", about = "Rebuild UCC filing records and addresses from scraped registry dumps")]
struct Cli {
    /// TOML settings file (source profile, date format, address columns)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse block-stream dumps into one deduplicated debtor x secured-party CSV
    Blocks {
        /// Dump files; rows from all of them are deduplicated together
        #[arg(short, long = "input", required = true)]
        inputs: Vec<PathBuf>,
        #[arg(short, long)]
        output: PathBuf,
        /// Date stamped into `Processed` (YYYY-MM-DD, default: today)
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
    /// Append parsed Street/City/State/Zip columns after each address column of a CSV
    Addresses {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Address column to parse (repeatable; default from settings)
        #[arg(long = "column")]
        columns: Vec<String>,
        /// Keep only rows where some cell contains this text, e.g. "UCC-1"
        #[arg(long)]
        require: Option<String>,
    },
    /// Normalize a single address and print the result as JSON
    Address { text: String },
}

fn parse_date(s: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = settings::load(cli.config.as_deref()).context("loading settings")?;

    match cli.command {
        Commands::Blocks {
            inputs,
            output,
            date,
        } => {
            // every input is read before anything is written
            let texts = inputs
                .iter()
                .map(|p| read_input(p).with_context(|| format!("reading {}", p.display())))
                .collect::<anyhow::Result<Vec<_>>>()?;

            let ctx = match date {
                Some(d) => RunContext::new(d, &settings.date_format),
                None => RunContext::today(&settings.date_format),
            };
            let mut counts = process_dumps(&inputs, &texts, &settings.profile, &ctx, &output)?;
            counts.elapsed = t0.elapsed();
            println!("{}", counts.summary(ctx.processed()));
        }
        Commands::Addresses {
            input,
            output,
            columns,
            require,
        } => {
            if !input.exists() {
                return Err(ExtractError::InputAbsent(input).into());
            }
            let opts = tabular::TabularOptions {
                address_columns: if columns.is_empty() {
                    settings.address_columns.clone()
                } else {
                    columns
                },
                require,
            };
            let reader = BufReader::new(File::open(&input)?);
            let writer = BufWriter::new(
                File::create(&output).with_context(|| format!("creating {}", output.display()))?,
            );
            let stats = tabular::normalize_table(reader, writer, &opts)?;
            println!(
                "Wrote {} of {} rows ({} addresses parsed) to {} in {:.1}s",
                stats.rows_written,
                stats.rows_read,
                stats.addresses,
                output.display(),
                t0.elapsed().as_secs_f64()
            );
        }
        Commands::Address { text } => {
            let (strategy, address) = parser::address::normalize_traced(&text);
            if address.is_empty() {
                warn!("Nothing to parse in {:?}", text);
            }
            let report = serde_json::json!({
                "input": text,
                "strategy": strategy,
                "address": address,
                "rendered": address.to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn read_input(path: &Path) -> Result<String, ExtractError> {
    if !path.exists() {
        return Err(ExtractError::InputAbsent(path.to_path_buf()));
    }
    Ok(std::fs::read_to_string(path)?)
}

struct RunCounts {
    files: usize,
    blocks: usize,
    partial: usize,
    candidates: usize,
    written: usize,
    duplicates: usize,
    filings: usize,
    elapsed: Duration,
}

impl RunCounts {
    fn summary(&self, processed: &str) -> String {
        format!(
            "{} files, {} blocks ({} without rows), {} filings.\n\
             Wrote {} rows ({} candidates, {} duplicates dropped), processed {} in {:.1}s.",
            self.files,
            self.blocks,
            self.partial,
            self.filings,
            self.written,
            self.candidates,
            self.duplicates,
            processed,
            self.elapsed.as_secs_f64()
        )
    }
}

fn process_dumps(
    inputs: &[PathBuf],
    texts: &[String],
    profile: &parser::blocks::SourceProfile,
    ctx: &RunContext,
    out_path: &Path,
) -> anyhow::Result<RunCounts> {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(texts.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut dedup = Deduplicator::new();
    let mut rows = Vec::new();
    let mut counts = RunCounts {
        files: texts.len(),
        blocks: 0,
        partial: 0,
        candidates: 0,
        written: 0,
        duplicates: 0,
        filings: 0,
        elapsed: Duration::ZERO,
    };

    for (path, text) in inputs.iter().zip(texts) {
        pb.set_message(path.display().to_string());
        let extracted = parser::process_text(text, profile, ctx);
        info!(
            "{}: {} blocks, {} candidate rows",
            path.display(),
            extracted.blocks,
            extracted.rows.len()
        );
        counts.blocks += extracted.blocks;
        counts.partial += extracted.partial;
        counts.candidates += extracted.rows.len();
        rows.extend(dedup.dedup(extracted.rows));
        pb.inc(1);
    }
    pb.finish_and_clear();

    let file =
        File::create(out_path).with_context(|| format!("creating {}", out_path.display()))?;
    output::write_rows(BufWriter::new(file), &rows)?;

    counts.written = rows.len();
    counts.duplicates = dedup.dropped();
    counts.filings = dedup.distinct_filings();
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_reports_counts_and_time() {
        let counts = RunCounts {
            files: 2,
            blocks: 5,
            partial: 1,
            candidates: 7,
            written: 5,
            duplicates: 2,
            filings: 2,
            elapsed: Duration::from_millis(2500),
        };
        let text = counts.summary("01/31/2024");
        assert_eq!(
            text,
            "2 files, 5 blocks (1 without rows), 2 filings.\n\
             Wrote 5 rows (7 candidates, 2 duplicates dropped), processed 01/31/2024 in 2.5s."
        );
    }
}
