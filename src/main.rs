mod cli;
mod config;
mod error;
mod fetcher;
mod input;
mod k8s;
mod model;
mod options;
mod pager;
mod render;
mod resolver;

use anyhow::{Context, Result};
use clap::Parser;
use cli::CliArgs;
use config::RuntimeConfig;
use fetcher::KubeFetcher;
use input::TerminalKeys;
use k8s::{KubeGateway, KubeSelection};
use options::{PeekContext, PeekOptions};
use pager::Pager;
use resolver::Resolver;
use std::io;
use std::process::ExitCode;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    if let Err(error) = init_tracing(&args.log_filter) {
        eprintln!("warning: {error:#}");
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(level_filter: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level_filter)
        .or_else(|_| EnvFilter::try_new("warn"))
        .context("failed to initialize tracing filter")?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_writer(io::stderr)
        .try_init();

    Ok(())
}

async fn run(args: CliArgs) -> Result<()> {
    let runtime_config = RuntimeConfig::discover()?;
    if let Some(source) = &runtime_config.source {
        debug!(source = %source, "loaded config");
    }

    // Validation happens before anything talks to the cluster.
    let options = PeekOptions::from_args(&args, &runtime_config)?;
    if options.all_namespaces && options.namespace.is_some() {
        warn!("both --all-namespaces and --namespace were provided, using all namespaces");
    }

    let selection = KubeSelection {
        kubeconfig: args.kubeconfig.clone(),
        context: args.context.clone(),
        cluster: args.cluster.clone(),
        user: args.user.clone(),
    };
    let gateway = KubeGateway::connect(&selection).await?;
    let mapper = gateway.discover_rest_mapper().await?;
    let resource = Resolver::new(&mapper, &runtime_config.aliases).resolve(&options.resource)?;
    let scope = options.namespace_scope(gateway.default_namespace());
    debug!(context = %gateway.context(), resource = %resource, scope = %scope, "resolved");

    let context = PeekContext::new(options, resource, scope);
    let fetcher = KubeFetcher::new(gateway.client(), context.format.is_tabular());

    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr();
    let outcome = Pager::new(&context)
        .run(&fetcher, &mut TerminalKeys, &mut stdout, &mut stderr)
        .await?;
    debug!(outcome = ?outcome, "done");
    Ok(())
}
