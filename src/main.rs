//! mail-stats CLI: summarise a maildir over a date range.

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use mail_stats::{
    Analysis, Config, DateWindow, MailSource, MaildirSession, MaildirSource, TextReport, parse_date,
    to_json,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Ranges longer than this ask for confirmation
const LONG_RANGE_DAYS: i64 = 365;

#[derive(Parser)]
#[command(name = "mail-stats")]
#[command(about = "Read ratios, reply habits, top contacts and categories for a maildir", long_about = None)]
#[command(version)]
struct Cli {
    /// First day to analyse (DD-MM-YYYY); prompted for when omitted
    #[arg(short, long)]
    start: Option<String>,

    /// Last day to analyse, inclusive (DD-MM-YYYY); prompted for when omitted
    #[arg(short, long)]
    end: Option<String>,

    /// Account name or address; defaults to the configured or first account
    #[arg(short, long)]
    account: Option<String>,

    /// Root of the maildir store
    #[arg(long, env = "MAIL_STATS_MAILDIR")]
    maildir: Option<String>,

    /// Configuration file (default: <config dir>/mail-stats/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// List accounts in the store and exit
    #[arg(long)]
    list_accounts: bool,

    /// Do not ask for confirmation on long date ranges
    #[arg(short, long)]
    yes: bool,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load(cli.config.as_deref())?;
    let target = config.resolve(cli.maildir.as_deref(), cli.account.as_deref())?;

    let session = MaildirSession::open(&target.maildir)
        .with_context(|| format!("cannot open maildir {}", target.maildir.display()))?;
    let source = MaildirSource::new(&session).with_addresses(config.addresses());

    if cli.list_accounts {
        for (idx, account) in source.list_accounts()?.iter().enumerate() {
            println!("{}. {account}", idx + 1);
        }
        return Ok(());
    }

    match source.list_accounts() {
        Ok(accounts) => {
            info!("Found {} accounts", accounts.len());
            for account in &accounts {
                info!("  {account}");
            }
        }
        Err(e) => warn!("Could not list accounts: {e}"),
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();

    let first_day = date_arg(cli.start.as_deref(), "Start date (DD-MM-YYYY): ", &mut input)?;
    let last_day = date_arg(cli.end.as_deref(), "End date (DD-MM-YYYY): ", &mut input)?;
    let window = DateWindow::new(first_day, last_day)?;

    if window.span_days() > LONG_RANGE_DAYS {
        warn!(
            "Date range spans {} days, analysis may take a while",
            window.span_days()
        );
        if !cli.yes && !confirm("Continue? (y/n): ", &mut input)? {
            bail!("cancelled");
        }
    }

    info!("Analysing mail from {window}");

    let account = target.account.as_deref();
    let folders = source.received_folders(account)?;
    if folders.is_empty() {
        bail!("no inbox folders found");
    }

    let received = source.fetch_received(&folders, &window);
    if received.is_empty() {
        println!("No messages found for {window}.");
        println!("Check the date range and that the maildir is synchronised.");
        return Ok(());
    }
    let sent = source.fetch_sent(account, &window);

    drop(source);
    session.close();

    let analysis = Analysis::compute(&received, &sent);
    match cli.format {
        Format::Text => print!("{}", TextReport::new(&analysis)),
        Format::Json => println!("{}", to_json(&analysis)?),
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        "mail_stats=debug"
    } else {
        "mail_stats=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Parse a date given on the command line, or prompt until one parses.
fn date_arg(arg: Option<&str>, prompt: &str, input: &mut impl BufRead) -> Result<NaiveDate> {
    if let Some(value) = arg {
        return Ok(parse_date(value)?);
    }

    loop {
        let line = prompt_line(prompt, input)?;
        match parse_date(&line) {
            Ok(date) => return Ok(date),
            Err(e) => eprintln!("{e}"),
        }
    }
}

fn confirm(prompt: &str, input: &mut impl BufRead) -> Result<bool> {
    let answer = prompt_line(prompt, input)?;
    Ok(answer.trim().to_lowercase().starts_with('y'))
}

fn prompt_line(prompt: &str, input: &mut impl BufRead) -> Result<String> {
    eprint!("{prompt}");
    io::stderr().flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        bail!("input closed");
    }
    Ok(line.trim().to_string())
}
