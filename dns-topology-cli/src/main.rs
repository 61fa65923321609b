//! dns-topology command-line entry point
//!
//! Logs go to stderr through `tracing`; library crates log through the `log`
//! facade, which the subscriber picks up. Results go to stdout.

mod cli;
mod config;
mod output;

use std::pin::pin;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use futures::StreamExt;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use dns_topology_core::{CancellationToken, Outcome, RecordReconciler, TopologyResolver};
use dns_topology_provider::{AwsCredentials, AwsProvider, ResourceClient};

use crate::cli::{Cli, Command, GlobalOpts, OutputFormat, ReconcileArgs, ResolveArgs};
use crate::config::{DEFAULT_REGION, FileConfig};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let file = FileConfig::load(cli.global.config.as_deref())?;
    let client = build_client(&cli.global, &file)?;
    let format = cli.global.output;

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, stopping");
                cancel.cancel();
            }
        });
    }

    match cli.command {
        Command::Resolve(args) => resolve(client, &file, args, format, &cancel).await,
        Command::Reconcile(args) => reconcile(client, &file, &args, format, &cancel).await,
    }
}

fn build_client(global: &GlobalOpts, file: &FileConfig) -> Result<Arc<dyn ResourceClient>> {
    let access_key_id = global
        .access_key_id
        .clone()
        .context("missing access key: set AWS_ACCESS_KEY_ID or pass --access-key-id")?;
    let secret_access_key = global
        .secret_access_key
        .clone()
        .context("missing secret key: set AWS_SECRET_ACCESS_KEY or pass --secret-access-key")?;
    let region = global
        .region
        .clone()
        .or_else(|| file.aws.region.clone())
        .unwrap_or_else(|| DEFAULT_REGION.to_string());

    let mut builder = AwsProvider::builder(
        AwsCredentials {
            access_key_id,
            secret_access_key,
            session_token: global.session_token.clone(),
        },
        region,
    );
    if let Some(retries) = global.max_retries.or(file.aws.max_retries) {
        builder = builder.max_retries(retries);
    }
    let provider = builder.build().context("failed to create AWS client")?;
    tracing::debug!("Using region {}", provider.region());
    Ok(Arc::new(provider))
}

async fn resolve(
    client: Arc<dyn ResourceClient>,
    file: &FileConfig,
    args: ResolveArgs,
    format: OutputFormat,
    cancel: &CancellationToken,
) -> Result<ExitCode> {
    let config = args.apply(file.resolver.clone());
    let resolver = TopologyResolver::with_config(client, config);

    if format == OutputFormat::Plain {
        let mut rows = pin!(resolver.stream(args.domains));
        loop {
            tokio::select! {
                () = cancel.cancelled() => bail!("interrupted"),
                row = rows.next() => match row {
                    Some(row) => println!("{}", output::plain_row(&row)),
                    None => break,
                },
            }
        }
        return Ok(ExitCode::SUCCESS);
    }

    let report = tokio::select! {
        () = cancel.cancelled() => bail!("interrupted"),
        report = resolver.resolve(&args.domains) => report,
    };

    println!("{}", output::render_report(format, &report)?);
    if let Some(summary) = output::skip_summary(&report) {
        eprintln!("{summary}");
    }
    Ok(ExitCode::SUCCESS)
}

async fn reconcile(
    client: Arc<dyn ResourceClient>,
    file: &FileConfig,
    args: &ReconcileArgs,
    format: OutputFormat,
    cancel: &CancellationToken,
) -> Result<ExitCode> {
    let config = args.apply(file.reconciler.clone());
    let reconciler = RecordReconciler::with_config(client, config);

    let outcomes = reconciler
        .reconcile_many_with_cancel(&args.records, cancel)
        .await;
    println!("{}", output::render_outcomes(format, &outcomes)?);

    if outcomes.iter().all(Outcome::is_success) {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
