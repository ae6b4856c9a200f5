//! CLI interface for sailplan.
//!
//! Touch panels and cockpit tablets drive the reconciler through their own
//! presentation layers; this is the equivalent surface for a terminal.
//! Each subcommand is one interaction cycle: fetch the latest committed
//! state, refresh the reconciler, act, report.
//!
//! Commands:
//!
//! - `sailplan show` — the current configuration.
//! - `sailplan set` — apply edits and log the change.
//! - `sailplan history` — recent entries, newest first.
//! - `sailplan delete <timestamp>` — remove one entry, after confirmation.

mod format;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use jiff::{SignedDuration, Timestamp};

use crate::config::BoatConfig;
use crate::reconcile::{Edit, Reconciler};
use crate::store::{SailLog, SqliteLog, StoreError};
use crate::tz::{BoatClock, Fixed, NoFix};

use format::{history_line, selection_summary};

/// Sailplan — log sail configuration changes.
#[derive(Debug, Parser)]
#[command(name = "sailplan", after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    /// Path to the boat configuration file.
    /// Defaults to `~/.sailplan/boat.toml`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r#"Workflow: logging a sail change
  1. sailplan show
     → Main: FULL + Jib
  2. sailplan set --downwind REACHING_SPI --staysail on --comment "breeze easing"
     → Saved: Main: FULL + Jib (S) + R-Spi @ 08/29 14:32 UTC
  3. sailplan history --limit 10
  4. sailplan delete 2026-08-29T14:32:00Z    (asks before deleting)

Backdating a change noticed late:
  sailplan set --main R1 --backdate 2026-08-29T06:15:00Z"#;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the current sail configuration.
    Show,

    /// Change the sail configuration and log it.
    ///
    /// Flags not given keep their current value. Staysail mode only turns
    /// on when the jib is flown with the reaching spinnaker; an
    /// incompatible request is noted and left off.
    Set(SetArgs),

    /// List recent log entries, newest first.
    History {
        /// Maximum entries to show (default from boat config).
        #[arg(long)]
        limit: Option<usize>,

        /// How many days back to look (default from boat config).
        #[arg(long)]
        days: Option<i64>,

        /// Print entries as JSON instead of formatted rows.
        #[arg(long)]
        json: bool,
    },

    /// Delete the entry at an exact timestamp.
    Delete {
        /// Timestamp of the entry, RFC 3339 (e.g. `2026-08-29T14:32:00Z`).
        timestamp: String,

        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

/// Arguments for `sailplan set`.
#[derive(Debug, Args)]
pub struct SetArgs {
    /// Main sail state.
    #[arg(long)]
    main: Option<String>,

    /// Headsail to fly.
    #[arg(long, conflicts_with = "no_headsail")]
    headsail: Option<String>,

    /// Douse the headsail.
    #[arg(long)]
    no_headsail: bool,

    /// Downwind sail to fly.
    #[arg(long, conflicts_with = "no_downwind")]
    downwind: Option<String>,

    /// Douse the downwind sail.
    #[arg(long)]
    no_downwind: bool,

    /// Staysail mode on or off.
    #[arg(long, value_enum)]
    staysail: Option<StaysailArg>,

    /// Note about conditions or the reason for the change.
    #[arg(long)]
    comment: Option<String>,

    /// Backdate the entry (RFC 3339, must not be in the future).
    #[arg(long)]
    backdate: Option<String>,
}

/// CLI-facing staysail toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StaysailArg {
    /// Fly the jib as a staysail.
    On,
    /// Staysail off.
    Off,
}

/// Run the CLI, returning an error message on failure.
pub fn run() -> Result<(), String> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => BoatConfig::load_from(path)?,
        None => BoatConfig::load()?,
    };

    let db_path = config
        .store
        .path
        .clone()
        .or_else(SqliteLog::default_path)
        .ok_or("could not determine home directory")?;
    let store = SqliteLog::open(&db_path, &config.boat.vessel, config.store.on_collision)
        .map_err(|e| format!("failed to open sail log: {e}"))?;

    let clock = match &config.boat.timezone {
        Some(name) => BoatClock::new(Box::new(Fixed(name.clone()))),
        None => BoatClock::new(Box::new(NoFix)),
    };

    match cli.command {
        Command::Show => cmd_show(&config, &store, &clock),
        Command::Set(args) => cmd_set(&config, &store, &clock, &args),
        Command::History { limit, days, json } => {
            cmd_history(&config, &store, &clock, limit, days, json)
        }
        Command::Delete { timestamp, yes } => cmd_delete(&config, &store, &timestamp, yes),
    }
}

fn cmd_show(config: &BoatConfig, store: &dyn SailLog, clock: &BoatClock) -> Result<(), String> {
    let now = Timestamp::now();
    match store
        .fetch_latest()
        .map_err(|e| format!("failed to read sail log: {e}"))?
    {
        Some(entry) => {
            println!("{}", selection_summary(&entry.selection, config));
            if !entry.selection.comment.is_empty() {
                println!("\"{}\"", entry.selection.comment);
            }
            println!("since {}", clock.format_datetime(entry.timestamp, now));
        }
        None => {
            println!("{}", selection_summary(&config.baseline(), config));
            println!("(no entries logged yet)");
        }
    }
    Ok(())
}

fn cmd_set(
    config: &BoatConfig,
    store: &dyn SailLog,
    clock: &BoatClock,
    args: &SetArgs,
) -> Result<(), String> {
    let edits = collect_edits(config, args)?;
    if edits.is_empty() {
        return Err("specify at least one change (see sailplan set --help)".to_string());
    }

    let now = Timestamp::now();

    // One interaction cycle: refresh from the store, then edit.
    let mut rec = Reconciler::new(config.baseline());
    if let Some(latest) = store
        .fetch_latest()
        .map_err(|e| format!("failed to read sail log: {e}"))?
    {
        rec.refresh(latest.selection);
    }

    for edit in edits {
        rec.apply_edit(edit);
    }

    if args.staysail == Some(StaysailArg::On) && !rec.working().staysail {
        eprintln!("staysail mode needs JIB + REACHING_SPI — left off");
    }

    if let Some(raw) = &args.backdate {
        let backdate: Timestamp = raw
            .parse()
            .map_err(|e| format!("invalid backdate '{raw}': {e}"))?;
        if backdate > now {
            return Err(format!("backdate {backdate} is in the future"));
        }
        rec.set_backdate(Some(backdate));
    }

    let entry = rec.prepare_submit(now).map_err(|e| e.to_string())?;
    store.write(&entry).map_err(|e| match e {
        StoreError::DuplicateTimestamp(ts) => format!(
            "an entry already exists at {ts} — delete it first, or set \
             store.on-collision = \"overwrite\" in the boat config"
        ),
        e => format!("failed to save: {e}"),
    })?;
    rec.commit_submitted(&entry);

    println!(
        "Saved: {} @ {}",
        selection_summary(&entry.selection, config),
        clock.format_datetime(entry.timestamp, now)
    );
    Ok(())
}

/// Translates and validates `set` flags into reconciler edits, in rule
/// order: main, headsail, downwind, staysail, comment.
fn collect_edits(config: &BoatConfig, args: &SetArgs) -> Result<Vec<Edit>, String> {
    let mut edits = Vec::new();

    if let Some(main) = &args.main {
        if !config.is_main_state(main) {
            return Err(unknown_option("main state", main, &config.sails.main.options));
        }
        edits.push(Edit::Main(main.clone()));
    }

    if let Some(headsail) = &args.headsail {
        if !config.is_headsail(headsail) {
            return Err(unknown_option(
                "headsail",
                headsail,
                &config.sails.headsail.options,
            ));
        }
        edits.push(Edit::Headsail(Some(headsail.clone())));
    } else if args.no_headsail {
        edits.push(Edit::Headsail(None));
    }

    if let Some(downwind) = &args.downwind {
        if !config.is_downwind(downwind) {
            return Err(unknown_option(
                "downwind sail",
                downwind,
                &config.sails.downwind.options,
            ));
        }
        edits.push(Edit::Downwind(Some(downwind.clone())));
    } else if args.no_downwind {
        edits.push(Edit::Downwind(None));
    }

    if let Some(staysail) = args.staysail {
        edits.push(Edit::Staysail(staysail == StaysailArg::On));
    }

    if let Some(comment) = &args.comment {
        edits.push(Edit::Comment(comment.clone()));
    }

    Ok(edits)
}

fn unknown_option(what: &str, value: &str, options: &[String]) -> String {
    format!("unknown {what} '{value}' — options: {}", options.join(", "))
}

fn cmd_history(
    config: &BoatConfig,
    store: &dyn SailLog,
    clock: &BoatClock,
    limit: Option<usize>,
    days: Option<i64>,
    json: bool,
) -> Result<(), String> {
    let now = Timestamp::now();
    let limit = limit.unwrap_or(config.history.limit);
    let days = days.unwrap_or(config.history.window_days);
    let since = now
        .checked_sub(SignedDuration::from_hours(days.saturating_mul(24)))
        .map_err(|e| format!("invalid history window of {days} days: {e}"))?;

    let entries = store
        .fetch_history(since, limit)
        .map_err(|e| format!("failed to read history: {e}"))?;

    if json {
        let out = serde_json::to_string_pretty(&entries)
            .map_err(|e| format!("failed to serialize history: {e}"))?;
        println!("{out}");
        return Ok(());
    }

    if entries.is_empty() {
        println!("No entries in the last {days} day(s)");
        return Ok(());
    }
    for entry in &entries {
        println!("{}", history_line(entry, config, clock, now));
    }
    Ok(())
}

fn cmd_delete(
    config: &BoatConfig,
    store: &dyn SailLog,
    timestamp: &str,
    yes: bool,
) -> Result<(), String> {
    let target: Timestamp = timestamp.parse().map_err(|e| {
        format!("invalid timestamp '{timestamp}': {e} (expected RFC 3339, e.g. 2026-08-29T14:32:00Z)")
    })?;

    // Two-phase: the reconciler holds the pending request and only hands
    // back the delete instruction for the matching token.
    let mut rec = Reconciler::new(config.baseline());
    let token = rec.request_delete(target);

    if !yes && !prompt_confirm(&format!("Delete entry at {target}?"))? {
        rec.cancel_delete();
        eprintln!("Cancelled");
        return Ok(());
    }

    let Some(confirmed) = rec.confirm_delete(token) else {
        return Err("delete was not confirmed".to_string());
    };

    store.delete(confirmed).map_err(|e| match e {
        StoreError::NotFound(ts) => format!("no entry at {ts}"),
        e => format!("failed to delete: {e}"),
    })?;

    eprintln!("Deleted entry at {target}");
    Ok(())
}

/// Asks a yes/no question on stderr and reads the answer from stdin.
fn prompt_confirm(question: &str) -> Result<bool, String> {
    eprint!("{question} [y/N] ");
    io::stderr()
        .flush()
        .map_err(|e| format!("failed to prompt: {e}"))?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| format!("failed to read confirmation: {e}"))?;
    Ok(matches!(line.trim(), "y" | "Y" | "yes"))
}
