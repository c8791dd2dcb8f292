use anyhow::{anyhow, bail, Context, Result};
use chrono::{Datelike, NaiveDate};
use nursery_admin::{
    app::App,
    calendar,
    config::AppConfig,
    validation::{self, FormKind},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const USAGE: &str = "\
usage:
  nadmin                                   month viewer
  nadmin weeks [MONTH] [YEAR] [--json]     MONTH is zero-based (0 = January)
  nadmin validate <site|budget|kpi|enquiry> <FILE.json>";

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        // ── nadmin weeks ──────────────────────────────────────────────────────
        Some("weeks")    => cmd_weeks(&args[2..]),
        // ── nadmin validate ───────────────────────────────────────────────────
        Some("validate") => cmd_validate(&args[2..]),
        Some("-h" | "--help" | "help") => {
            println!("{USAGE}");
            Ok(())
        }
        Some(other) => bail!("unknown command `{other}`\n\n{USAGE}"),
        // ── nadmin (TUI) ──────────────────────────────────────────────────────
        None => run_tui(),
    }
}

fn init_stderr_logging() {
    // Logging to stderr so it doesn't interfere with command output
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

// ─── Week grid command ────────────────────────────────────────────────────────

struct WeeksArgs {
    month: i32,
    year:  i32,
    json:  bool,
}

fn cmd_weeks(args: &[String]) -> Result<()> {
    init_stderr_logging();

    let cfg  = AppConfig::load()?;
    let args = parse_weeks_args(args, cfg.clock().today())?;
    print!("{}", render_weeks(&args)?);
    Ok(())
}

/// MONTH and YEAR default to the month containing `today`.
fn parse_weeks_args(args: &[String], today: NaiveDate) -> Result<WeeksArgs> {
    let mut json       = false;
    let mut positional = Vec::new();
    for arg in args {
        match arg.as_str() {
            "--json" => json = true,
            flag if flag.starts_with("--") => bail!("unknown flag `{flag}`\n\n{USAGE}"),
            value => positional.push(value),
        }
    }

    let (month, year) = match positional.as_slice() {
        []               => (today.month0() as i32, today.year()),
        [month]          => (parse_number("month", month)?, today.year()),
        [month, year]    => (parse_number("month", month)?, parse_number("year", year)?),
        [_, _, extra, ..] => bail!("unexpected argument `{extra}`\n\n{USAGE}"),
    };
    Ok(WeeksArgs { month, year, json })
}

fn parse_number(what: &str, value: &str) -> Result<i32> {
    value.parse::<i32>().with_context(|| format!("invalid {what} `{value}`"))
}

fn render_weeks(args: &WeeksArgs) -> Result<String> {
    let partition     = calendar::partition_month(args.month, args.year);
    let (year, month) = calendar::normalize_month(args.month, args.year);
    if partition.is_empty() {
        bail!("{year} is outside the supported date range");
    }
    if args.json {
        return Ok(format!("{}\n", serde_json::to_string_pretty(&partition)?));
    }
    Ok(format!("{} {year}\n{}", calendar::month_name(month), calendar::render_grid(&partition)))
}

// ─── Form validation command ──────────────────────────────────────────────────

fn cmd_validate(args: &[String]) -> Result<()> {
    init_stderr_logging();

    let (kind, path) = match args {
        [kind, path] => (kind.parse::<FormKind>()?, path),
        _ => return Err(anyhow!("expected a form kind and a file\n\n{USAGE}")),
    };
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;

    match validation::validate_json(kind, &text).with_context(|| format!("parsing {path} as a {kind} form"))? {
        Ok(()) => {
            println!("{kind} form is valid");
            Ok(())
        }
        Err(errors) => {
            for e in &errors.0 {
                eprintln!("  {e}");
            }
            Err(errors.into())
        }
    }
}

// ─── TUI ─────────────────────────────────────────────────────────────────────

fn run_tui() -> Result<()> {
    let log_dir = dirs::data_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("nursery-admin");
    std::fs::create_dir_all(&log_dir)?;
    let file_appender = tracing_appender::rolling::daily(&log_dir, "nursery-admin.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking))
        .init();

    tracing::info!("Starting nursery-admin month viewer");

    let cfg = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!("ignoring unreadable config: {e:#}");
        AppConfig::default()
    });

    App::new(&cfg).run()
}
