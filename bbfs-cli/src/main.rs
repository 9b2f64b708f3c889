mod display;
mod import;
mod interactive;

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use bbfs_db::models::{Draw, Market};
use bbfs_db::store::{data_dir, FileHistoryStore, HistoryStore};
use bbfs_engine::backtest::{backtest_with, save_report, BacktestMode, MIN_BACKTEST_HISTORY};
use bbfs_engine::scorer::{score, MIN_SCORE_HISTORY};
use crate::display::{
    display_backtest, display_backtest_chart, display_history, display_import_summary,
    display_markets, display_prediction,
};

#[derive(Parser)]
#[command(name = "bbfs", version, about = "BBFS 8-digit predictor and backtester for 4D markets")]
struct Cli {
    /// Directory holding one history file per market (default: ./data)
    #[arg(long, global = true, env = "BBFS_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List markets and how many results each holds
    Markets,

    /// Append results to a market (prompts line by line when none are given)
    Add {
        /// Market: 1-4 or a code such as hongkong_pools
        #[arg(short, long)]
        market: Market,

        /// 4-digit results, oldest first
        results: Vec<String>,
    },

    /// Show the latest results of a market
    List {
        #[arg(short, long)]
        market: Market,

        /// Number of results to show
        #[arg(short, long, default_value = "10")]
        last: usize,
    },

    /// Predict the BBFS 8 digits for the next draw
    Predict {
        #[arg(short, long)]
        market: Market,
    },

    /// Replay the history and measure how often the BBFS contained the result
    Backtest {
        #[arg(short, long)]
        market: Market,

        /// 2d: tail digits, 3d: hundreds, tens and units
        #[arg(long, default_value = "2d")]
        mode: BacktestMode,

        /// Write the full report as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Plot the cumulative accuracy
        #[arg(long)]
        chart: bool,

        /// Only print the summary
        #[arg(short, long)]
        quiet: bool,
    },

    /// Append results read from a CSV or plain text file (first field of each record)
    Import {
        #[arg(short, long)]
        market: Market,

        #[arg(short, long)]
        file: PathBuf,

        /// Field delimiter
        #[arg(short, long, default_value = ",")]
        delimiter: char,
    },

    /// Delete the stored history of a market
    Clear {
        #[arg(short, long)]
        market: Market,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Menu-driven mode
    Interactive,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let dir = cli.data_dir.unwrap_or_else(data_dir);
    log::debug!("Data directory: {:?}", dir);
    let store = FileHistoryStore::new(dir);

    match cli.command {
        Command::Markets => cmd_markets(&store),
        Command::Add { market, results } => cmd_add(&store, market, &results),
        Command::List { market, last } => cmd_list(&store, market, last),
        Command::Predict { market } => cmd_predict(&store, market),
        Command::Backtest { market, mode, output, chart, quiet } => {
            cmd_backtest(&store, market, mode, output.as_deref(), chart, !quiet)
        }
        Command::Import { market, file, delimiter } => cmd_import(&store, market, &file, delimiter),
        Command::Clear { market, yes } => cmd_clear(&store, market, yes),
        Command::Interactive => interactive::run_interactive(&store),
    }
}

pub(crate) fn cmd_markets(store: &dyn HistoryStore) -> Result<()> {
    let counts = market_counts(store)?;
    display_markets(&counts);
    Ok(())
}

pub(crate) fn market_counts(store: &dyn HistoryStore) -> Result<Vec<(Market, usize)>> {
    Market::ALL
        .iter()
        .map(|&m| -> Result<(Market, usize)> { Ok((m, store.load(m)?.len())) })
        .collect()
}

pub(crate) fn cmd_add(store: &dyn HistoryStore, market: Market, results: &[String]) -> Result<()> {
    let mut history = store.load(market)?;
    let before = history.len();

    if results.is_empty() {
        println!("\n📁 {} | {} results", market, before);
        println!("Enter 4D results (empty line to finish):");
        loop {
            let Some(input) = prompt(&format!("Result {}: ", history.len() + 1))? else {
                break;
            };
            if input.is_empty() {
                break;
            }
            match input.parse::<Draw>() {
                Ok(draw) => {
                    history.push(draw);
                    println!("✓");
                }
                Err(_) => println!("✗ 4 digits!"),
            }
        }
    } else {
        let parsed = results
            .iter()
            .map(|r| r.trim().parse::<Draw>())
            .collect::<Result<Vec<_>>>()?;
        history.extend(parsed);
    }

    let added = history.len() - before;
    if added > 0 {
        store.save(market, &history)?;
        println!("💾 Saved {} new result(s) to {} ({} total)", added, market, history.len());
    } else {
        println!("Nothing added.");
    }
    Ok(())
}

pub(crate) fn cmd_list(store: &dyn HistoryStore, market: Market, last: usize) -> Result<()> {
    let history = store.load(market)?;
    display_history(market, &history, last);
    Ok(())
}

pub(crate) fn cmd_predict(store: &dyn HistoryStore, market: Market) -> Result<()> {
    let history = store.load(market)?;
    if history.len() < MIN_SCORE_HISTORY {
        println!("⚠️ {} needs at least {} results (has {}).", market, MIN_SCORE_HISTORY, history.len());
        return Ok(());
    }

    let prediction = score(&history);
    display_prediction(market, &prediction);
    Ok(())
}

pub(crate) fn cmd_backtest(
    store: &dyn HistoryStore,
    market: Market,
    mode: BacktestMode,
    output: Option<&Path>,
    chart: bool,
    show_steps: bool,
) -> Result<()> {
    let history = store.load(market)?;
    if history.len() < MIN_BACKTEST_HISTORY {
        println!("❌ Backtest needs at least {} results (has {}).", MIN_BACKTEST_HISTORY, history.len());
        return Ok(());
    }

    let pb = ProgressBar::new((history.len() - 1) as u64);
    pb.set_style(ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .context("Invalid progress template")?
        .progress_chars("=> "));
    pb.set_message(format!("{} {}", mode, market));

    let report = backtest_with(&history, mode, |_| pb.inc(1));
    pb.finish_and_clear();

    let Some(report) = report else {
        bail!("Backtest produced no report for {} results", history.len());
    };

    display_backtest(market, &report, show_steps);
    if chart {
        display_backtest_chart(&report);
    }

    if let Some(path) = output {
        save_report(&report, path)
            .with_context(|| format!("Cannot write report {:?}", path))?;
        println!("\nReport saved to: {}", path.display());
    }
    Ok(())
}

pub(crate) fn cmd_import(store: &dyn HistoryStore, market: Market, file: &Path, delimiter: char) -> Result<()> {
    if !delimiter.is_ascii() {
        bail!("Delimiter must be a single ASCII character, got '{}'", delimiter);
    }

    let (draws, result) = import::import_file(file, delimiter as u8)?;
    if !draws.is_empty() {
        let mut history = store.load(market)?;
        history.extend(draws);
        store.save(market, &history)?;
        log::info!("Imported {} results into {}", result.added, market.code());
    }
    display_import_summary(&result);
    Ok(())
}

pub(crate) fn cmd_clear(store: &dyn HistoryStore, market: Market, yes: bool) -> Result<()> {
    if !yes {
        let confirm = prompt(&format!("Delete all results of {}? (y/n): ", market))?;
        if confirm.map_or(true, |c| c.to_lowercase() != "y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    if store.clear(market)? {
        println!("🗑️ {} cleared", market);
    } else {
        println!("{} had no stored results.", market);
    }
    Ok(())
}

/// `None` at end of input.
pub(crate) fn prompt(msg: &str) -> Result<Option<String>> {
    print!("{}", msg);
    io::stdout().flush()?;
    read_input(&mut io::stdin().lock())
}

fn read_input(reader: &mut impl BufRead) -> Result<Option<String>> {
    let mut input = String::new();
    let read = reader.read_line(&mut input).context("Cannot read input")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}
