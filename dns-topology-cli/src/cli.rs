//! Clap derive structures for the `dns-topology` CLI.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use dns_topology_core::{ReconcilerConfig, ResolverConfig, TargetGroupTieBreak};
use dns_topology_provider::{DnsRecordType, MAX_RECORD_PAGE_SIZE};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// Map public hostnames to the load balancers and instances behind them,
/// and manage TXT records in Route 53.
#[derive(Debug, Parser)]
#[command(
    name = "dns-topology",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Region for load balancer and instance lookups
    #[arg(long, env = "AWS_REGION", global = true)]
    pub region: Option<String>,

    /// Access key id
    #[arg(long, env = "AWS_ACCESS_KEY_ID", global = true, hide_env_values = true)]
    pub access_key_id: Option<String>,

    /// Secret access key
    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", global = true, hide_env_values = true)]
    pub secret_access_key: Option<String>,

    /// Session token for temporary credentials
    #[arg(long, env = "AWS_SESSION_TOKEN", global = true, hide_env_values = true)]
    pub session_token: Option<String>,

    /// TOML file with [aws], [resolver] and [reconciler] tables
    #[arg(long, short = 'c', env = "DNS_TOPOLOGY_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Retries for throttled or failed API calls
    #[arg(long, global = true)]
    pub max_retries: Option<u32>,

    /// Output format
    #[arg(long, short = 'o', default_value = "table", global = true)]
    pub output: OutputFormat,

    /// Increase verbosity (-v debug, -vv trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table
    Table,
    /// Pretty-printed JSON
    Json,
    /// Tab-separated lines, streamed as they resolve
    Plain,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List websites of one or more domains with their serving infrastructure
    Resolve(ResolveArgs),

    /// Create or update TXT records and wait until they are served
    #[command(alias = "txt")]
    Reconcile(ReconcileArgs),
}

#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Domains whose hosted zones are scanned
    #[arg(required = true, value_name = "DOMAIN")]
    pub domains: Vec<String>,

    /// Record sets fetched per page
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_RECORD_PAGE_SIZE)))]
    pub page_size: Option<u32>,

    /// Stop after this many record sets per zone
    #[arg(long)]
    pub max_records: Option<usize>,

    /// Record types to inspect (repeatable)
    #[arg(long = "record-type", value_name = "TYPE", value_parser = parse_record_type)]
    pub record_types: Vec<DnsRecordType>,

    /// Hostname suffix identifying a load balancer (repeatable)
    #[arg(long = "lb-suffix", value_name = "SUFFIX")]
    pub lb_suffixes: Vec<String>,

    /// Target group choice when a balancer has several: first, lowest-name, skip
    #[arg(long)]
    pub tie_break: Option<TargetGroupTieBreak>,

    /// Domains resolved concurrently
    #[arg(long)]
    pub concurrency: Option<usize>,
}

impl ResolveArgs {
    /// Overlay flags on top of file settings.
    pub fn apply(&self, mut config: ResolverConfig) -> ResolverConfig {
        if let Some(page_size) = self.page_size {
            config.page_size = page_size;
        }
        if self.max_records.is_some() {
            config.max_records_per_zone = self.max_records;
        }
        if !self.record_types.is_empty() {
            config.record_types.clone_from(&self.record_types);
        }
        if !self.lb_suffixes.is_empty() {
            config.load_balancer_suffixes.clone_from(&self.lb_suffixes);
        }
        if let Some(tie_break) = self.tie_break {
            config.tie_break = tie_break;
        }
        if let Some(concurrency) = self.concurrency {
            config.domain_concurrency = concurrency;
        }
        config
    }
}

#[derive(Debug, Args)]
pub struct ReconcileArgs {
    /// Records to write, e.g. `_acme-challenge.example.com=abc123`
    #[arg(required = true, value_name = "NAME=VALUE", value_parser = parse_assignment)]
    pub records: Vec<(String, String)>,

    /// TTL of written records in seconds
    #[arg(long)]
    pub ttl: Option<u32>,

    /// Seconds between status polls
    #[arg(long, value_name = "SECS", value_parser = parse_seconds)]
    pub poll_interval: Option<Duration>,

    /// Give up after this many polls
    #[arg(long)]
    pub max_polls: Option<u32>,

    /// Give up after this many seconds of polling
    #[arg(long, value_name = "SECS", value_parser = parse_seconds, conflicts_with = "no_timeout")]
    pub timeout: Option<Duration>,

    /// Poll without a deadline
    #[arg(long)]
    pub no_timeout: bool,

    /// Records reconciled concurrently
    #[arg(long)]
    pub concurrency: Option<usize>,
}

impl ReconcileArgs {
    /// Overlay flags on top of file settings.
    pub fn apply(&self, mut config: ReconcilerConfig) -> ReconcilerConfig {
        if let Some(ttl) = self.ttl {
            config.ttl = ttl;
        }
        if let Some(interval) = self.poll_interval {
            config.poll_interval = interval;
        }
        if self.max_polls.is_some() {
            config.max_poll_attempts = self.max_polls;
        }
        if self.no_timeout {
            config.timeout = None;
        } else if self.timeout.is_some() {
            config.timeout = self.timeout;
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        config
    }
}

// ── Value parsers ────────────────────────────────────────────────────

fn parse_record_type(value: &str) -> Result<DnsRecordType, String> {
    match DnsRecordType::parse(value) {
        DnsRecordType::Other => Err(format!("unsupported record type '{value}'")),
        parsed => Ok(parsed),
    }
}

fn parse_assignment(value: &str) -> Result<(String, String), String> {
    let (name, content) = value
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{value}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing record name in '{value}'"));
    }
    Ok((name.to_string(), content.to_string()))
}

fn parse_seconds(value: &str) -> Result<Duration, String> {
    let secs: f64 = value
        .parse()
        .map_err(|_| format!("'{value}' is not a number of seconds"))?;
    Duration::try_from_secs_f64(secs).map_err(|e| e.to_string())
}
