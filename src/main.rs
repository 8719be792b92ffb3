//! CLI entry point for `mail2chat`.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use mail2chat::config::{self, Config, Profile};
use mail2chat::export::attachment::save_attachments;
use mail2chat::export::report::{MessageReport, ReportStatus};
use mail2chat::extract::DedupCache;
use mail2chat::filter;
use mail2chat::parser::header;
use mail2chat::pipeline::process_message;
use mail2chat::source::{self, RawMail};
use mail2chat::strip::snapshot::SnapshotDir;

/// Show a progress bar from this many messages on.
const PROGRESS_THRESHOLD: usize = 50;

#[derive(Parser)]
#[command(
    name = "mail2chat",
    version,
    about = "Reduce e-mails to their latest reply, ready to post to a chat channel"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (default: $MAIL2CHAT_CONFIG or the user config dir)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter and normalize messages, printing the resulting bodies
    Process {
        /// `.eml` files, MBOX files, or directories of `.eml` files
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Index of the profile to apply
        #[arg(short, long, default_value_t = 0)]
        profile: usize,
        /// Save extracted attachments below this directory
        #[arg(short, long, value_name = "DIR")]
        attachments_dir: Option<PathBuf>,
        /// Print a JSON report instead of text
        #[arg(long)]
        json: bool,
        /// Write before/after snapshots of HTML bodies here
        #[arg(long, value_name = "DIR")]
        snapshots: Option<PathBuf>,
    },
    /// Only evaluate the profile filter for each message
    Filter {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[arg(short, long, default_value_t = 0)]
        profile: usize,
    },
    /// Print the resolved profiles, defaults merged in
    Profiles,
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => config::load_config_from(path)?,
        None => config::load_config(),
    };

    let log_level = match cli.verbose {
        0 => config.logging.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    match cli.command {
        Commands::Process {
            paths,
            profile,
            attachments_dir,
            json,
            snapshots,
        } => cmd_process(
            &config,
            &paths,
            profile,
            attachments_dir.as_deref(),
            json,
            snapshots,
        ),
        Commands::Filter { paths, profile } => cmd_filter(&config, &paths, profile),
        Commands::Profiles => cmd_profiles(&config),
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{Layer, Registry};

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    let json = config.logging.log_type.eq_ignore_ascii_case("json");

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    if json {
        layers.push(stderr_layer.json().boxed());
    } else {
        layers.push(stderr_layer.boxed());
    }

    if let Some((dir, file_name)) = log_file_parts(&config.logging.log_file) {
        if std::fs::create_dir_all(&dir).is_ok() {
            let file_appender = tracing_appender::rolling::never(&dir, file_name);
            let file_layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file_appender);
            if json {
                layers.push(file_layer.json().boxed());
            } else {
                layers.push(file_layer.boxed());
            }
        }
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .init();
}

/// Split the configured log file into directory and file name.
fn log_file_parts(log_file: &str) -> Option<(PathBuf, String)> {
    if log_file.is_empty() {
        return None;
    }
    let path = Path::new(log_file);
    let file_name = path.file_name()?.to_string_lossy().into_owned();
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Some((dir, file_name))
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "mail2chat", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}

fn load_all(paths: &[PathBuf]) -> anyhow::Result<Vec<RawMail>> {
    let mut mails = Vec::new();
    for path in paths {
        let loaded =
            source::load(path).with_context(|| format!("loading {}", path.display()))?;
        mails.extend(loaded);
    }
    Ok(mails)
}

fn progress_bar(len: usize) -> ProgressBar {
    if len < PROGRESS_THRESHOLD {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} Processing [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .expect("valid template")
            .progress_chars("#>-"),
    );
    pb
}

/// Run every message through the pipeline with one shared dedup cache.
fn cmd_process(
    config: &Config,
    paths: &[PathBuf],
    profile_index: usize,
    attachments_dir: Option<&Path>,
    json: bool,
    snapshots: Option<PathBuf>,
) -> anyhow::Result<()> {
    let profile = config.profile(profile_index)?;
    let snapshots = snapshots
        .or_else(|| {
            let dir = &config.logging.snapshot_dir;
            (!dir.is_empty()).then(|| PathBuf::from(dir))
        })
        .map(SnapshotDir::new);

    let mails = load_all(paths)?;
    let cache = DedupCache::new();
    let pb = progress_bar(mails.len());
    let start = Instant::now();

    let mut reports = Vec::with_capacity(mails.len());
    for mail in &mails {
        let processed = process_message(&mail.bytes, &profile, &cache, snapshots.as_ref())
            .with_context(|| format!("processing {}", mail.origin))?;

        let mut report = MessageReport::new(&mail.origin, &processed);
        if let (Some(dir), true) = (attachments_dir, processed.is_accepted()) {
            report.saved = save_attachments(processed.message(), dir)?
                .into_iter()
                .map(|p| p.display().to_string())
                .collect();
        }
        reports.push(report);
        pb.inc(1);
    }
    pb.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    for report in &reports {
        println!("{}", report.to_text());
    }
    let accepted = reports
        .iter()
        .filter(|r| r.status == ReportStatus::Accepted)
        .count();
    println!(
        "{} messages: {} accepted, {} filtered, {} distinct attachments ({:.2?})",
        reports.len(),
        accepted,
        reports.len() - accepted,
        cache.len(),
        start.elapsed()
    );
    Ok(())
}

/// Print whether each message passes the profile filter.
fn cmd_filter(config: &Config, paths: &[PathBuf], profile_index: usize) -> anyhow::Result<()> {
    let profile = config.profile(profile_index)?;
    for mail in load_all(paths)? {
        let message = header::parse_envelope(&mail.bytes);
        let accepted = filter::evaluate(&profile.filter, &message)
            .with_context(|| format!("filtering {}", mail.origin))?;
        println!(
            "{:<6} {}  {}",
            if accepted { "accept" } else { "reject" },
            mail.origin,
            message.subject
        );
    }
    Ok(())
}

#[derive(Serialize)]
struct ResolvedProfiles {
    profile: Vec<Profile>,
}

/// Print every resolved profile as TOML, secrets masked.
fn cmd_profiles(config: &Config) -> anyhow::Result<()> {
    let profile = config
        .resolved_profiles()
        .into_iter()
        .map(|mut p| {
            for secret in [
                &mut p.mail.password,
                &mut p.chat.password,
                &mut p.chat.access_token,
            ] {
                if !secret.is_empty() {
                    *secret = "********".to_string();
                }
            }
            p
        })
        .collect();
    print!("{}", toml::to_string_pretty(&ResolvedProfiles { profile })?);
    Ok(())
}
