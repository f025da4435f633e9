//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;

use crate::adapters::csv_adapter::{CsvAdapter, CsvSnapshotAdapter};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::diagnostics::Diagnostics;
use crate::domain::error::{NameParseError, TradeError};
use crate::domain::market::Market;
use crate::domain::market_tools::markets_from_quotes;
use crate::domain::name_codec;
use crate::domain::order::Order;
use crate::domain::quote::Quote;
use crate::domain::request::{build_order, build_properties};
use crate::domain::settings::{load_settings, Settings};
use crate::domain::simulator::SimulationResult;
use crate::ports::quote_port::QuotePort;
use crate::ports::snapshot_port::SnapshotPort;

#[derive(Parser, Debug)]
#[command(name = "quotetrader", about = "Indicator graphs and trading signals over quote data")]
pub struct Cli {
    /// Log debug events to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay the configured order over a quote history and report P&L
    Simulate {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        data: PathBuf,
    },
    /// Parse property names and print the nodes they build
    Names {
        #[arg(short, long)]
        config: Option<PathBuf>,
        names: Vec<String>,
    },
    /// Compute the configured properties and write daily snapshot files
    Snapshot {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        data: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Feed quotes one at a time and print the live action after each tick
    Replay {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        data: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    init_logging(cli.verbose);
    match cli.command {
        Command::Simulate { config, data } => run_simulate(&config, &data),
        Command::Names { config, names } => run_names(config.as_ref(), &names),
        Command::Snapshot {
            config,
            data,
            output,
        } => run_snapshot(&config, &data, &output),
        Command::Replay {
            config,
            data,
            output,
        } => run_replay(&config, &data, output.as_ref()),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .try_init();
}

fn fail(err: TradeError) -> ExitCode {
    eprintln!("error: {err}");
    (&err).into()
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, TradeError> {
    FileConfigAdapter::from_file(path).map_err(|e| TradeError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn load_inputs(
    config_path: &PathBuf,
    data_path: &PathBuf,
    diagnostics: &mut Diagnostics,
) -> Result<(Settings, Vec<Quote>), TradeError> {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = load_config(config_path)?;
    let settings = load_settings(&adapter, diagnostics)?;
    eprintln!("Loading quotes from {}", data_path.display());
    let quotes = CsvAdapter::new(data_path.clone()).load_quotes()?;
    if quotes.is_empty() {
        return Err(TradeError::DataLoad {
            reason: format!("no quotes in {}", data_path.display()),
        });
    }
    Ok((settings, quotes))
}

/// Registers the configured properties and builds the order on `market`.
pub fn prepare_market(
    market: &mut Market,
    settings: &Settings,
    diagnostics: &mut Diagnostics,
) -> Order {
    build_properties(&settings.properties, market, diagnostics);
    build_order(&settings.actions, market, diagnostics)
}

fn segments(settings: &Settings, quotes: &[Quote]) -> Vec<Market> {
    markets_from_quotes(quotes, settings.market.split_gap(), settings.market.max_rows)
}

fn run_simulate(config_path: &PathBuf, data_path: &PathBuf) -> ExitCode {
    let mut diagnostics = Diagnostics::new();
    let (settings, quotes) = match load_inputs(config_path, data_path, &mut diagnostics) {
        Ok(inputs) => inputs,
        Err(e) => return fail(e),
    };

    let markets = segments(&settings, &quotes);
    eprintln!("Simulating {} segment(s)...", markets.len());

    let mut total_pnl = 0.0;
    let mut total_wins = 0;
    let mut total_losses = 0;
    for (i, mut market) in markets.into_iter().enumerate() {
        let mut order = prepare_market(&mut market, &settings, &mut diagnostics);
        let result = order.simulate_trading(&mut market, &settings.simulation);
        log_trades(&result);
        let index = market.time_index();
        if let (Some(first), Some(last)) = (index.first(), index.last()) {
            println!(
                "segment {}: {} -> {} rows={} pnl={:.4} wins={} losses={}",
                i,
                first,
                last,
                index.len(),
                result.pnl,
                result.wins,
                result.losses
            );
        }
        total_pnl += result.pnl;
        total_wins += result.wins;
        total_losses += result.losses;
    }
    println!(
        "total: pnl={:.4} wins={} losses={}",
        total_pnl, total_wins, total_losses
    );
    report_diagnostics(&diagnostics);
    ExitCode::SUCCESS
}

fn log_trades(result: &SimulationResult) {
    tracing::debug!(
        trades = result.trades.len(),
        final_cash = result.final_cash,
        pnl = result.pnl,
        "simulation done"
    );
}

fn run_names(config_path: Option<&PathBuf>, names: &[String]) -> ExitCode {
    let mut all_names: Vec<String> = Vec::new();
    if let Some(path) = config_path {
        let mut diagnostics = Diagnostics::new();
        let settings = match load_config(path).and_then(|a| load_settings(&a, &mut diagnostics)) {
            Ok(s) => s,
            Err(e) => return fail(e),
        };
        all_names.extend(settings.property_names().into_iter().map(str::to_string));
    }
    all_names.extend(names.iter().cloned());
    if all_names.is_empty() {
        eprintln!("error: no property names given");
        return ExitCode::from(2);
    }

    let mut market = Market::new();
    let mut diagnostics = Diagnostics::new();
    let mut failures = 0;
    for name in &all_names {
        match name_codec::parse(name, &mut market, &mut diagnostics) {
            Ok(id) => {
                println!("{}", market.node(id).name);
                for dep in market.dependencies(id) {
                    let node = market.node(dep);
                    if dep != id {
                        println!("  {} [{}] warmup={}", node.name, node.kind, market.warmup(dep));
                    }
                }
            }
            Err(e) => {
                eprintln!("{}", e.display_with_context(name));
                failures += 1;
            }
        }
    }
    report_diagnostics(&diagnostics);
    if failures > 0 {
        let err = TradeError::NameParse(NameParseError {
            message: format!("{} of {} names failed to parse", failures, all_names.len()),
            position: 0,
        });
        return (&err).into();
    }
    ExitCode::SUCCESS
}

fn run_snapshot(config_path: &PathBuf, data_path: &PathBuf, output: &PathBuf) -> ExitCode {
    let mut diagnostics = Diagnostics::new();
    let (settings, quotes) = match load_inputs(config_path, data_path, &mut diagnostics) {
        Ok(inputs) => inputs,
        Err(e) => return fail(e),
    };

    let writer = CsvSnapshotAdapter::new(output.clone());
    let mut written = 0;
    for mut market in segments(&settings, &quotes) {
        build_properties(&settings.properties, &mut market, &mut diagnostics);
        market.analyse();
        for node in market.nodes().filter(|n| !n.kind.is_base()) {
            tracing::debug!(
                name = %node.name,
                defined = node.series.defined_count(),
                rows = node.series.len(),
                "property computed"
            );
        }
        match writer.save(&market.snapshot()) {
            Ok(rows) => written += rows,
            Err(e) => return fail(e),
        }
    }
    println!("{} rows written to {}", written, output.display());
    report_diagnostics(&diagnostics);
    ExitCode::SUCCESS
}

fn run_replay(config_path: &PathBuf, data_path: &PathBuf, output: Option<&PathBuf>) -> ExitCode {
    let mut diagnostics = Diagnostics::new();
    let (settings, quotes) = match load_inputs(config_path, data_path, &mut diagnostics) {
        Ok(inputs) => inputs,
        Err(e) => return fail(e),
    };
    let writer = output.map(|dir| CsvSnapshotAdapter::new(dir.clone()));

    let mut market = Market::with_max_rows(settings.market.max_rows);
    let mut order = prepare_market(&mut market, &settings, &mut diagnostics);
    let mut last_action = 0;
    for quote in quotes {
        if !market.push_quote(quote) {
            continue;
        }
        market.analyse();
        let action = order.action(&mut market);
        if action != last_action {
            let label = match action {
                1 => "buy",
                -1 => "sell",
                _ => "hold",
            };
            println!("{} {}", quote.time, label);
            last_action = action;
        }
        if market.max_rows() > 0 && market.len() > market.max_rows() {
            if let Some(writer) = &writer {
                if let Err(e) = writer.save(&market.snapshot()) {
                    return fail(e);
                }
            }
            market.clean();
        }
    }
    if let Some(writer) = &writer {
        if let Err(e) = writer.save(&market.snapshot()) {
            return fail(e);
        }
    }
    report_diagnostics(&diagnostics);
    ExitCode::SUCCESS
}

fn report_diagnostics(diagnostics: &Diagnostics) {
    if !diagnostics.is_empty() {
        eprintln!("{} warning(s) while building rules", diagnostics.len());
    }
}
