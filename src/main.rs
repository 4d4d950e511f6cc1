mod cli;
mod config;
mod llm;
mod server;
mod service;
mod ui;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;
use ui::Output;

#[tokio::main]
async fn main() {
    // 日志写到 stderr，stdout 只输出推荐结果
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("outfit=info,outfit_local=info,model_provider=info")
            }),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        Output::new().error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Init { local } => service::init::initialize(local).await,
        Commands::Ingest { rules } => service::ingest::ingest(config, rules.as_deref()).await,
        Commands::Recommend {
            question,
            pref,
            loc,
        } => {
            service::recommend::recommend(config, &question, pref.as_deref(), loc.as_deref()).await
        }
        Commands::Serve { addr } => service::serve::serve(config, addr).await,
        Commands::Clear { force } => service::clear::clear(config, force).await,
        Commands::Status => service::status::status(config).await,
    }
}
