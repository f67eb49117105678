mod api;
mod cli;
mod error;
mod storage;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::{Cli, Commands, ServeArgs};

/// 初始化日志：RUST_LOG 优先，否则使用默认过滤器
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("todo=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> error::Result<()> {
    // 配置优先级：命令行 > 环境变量 (.env) > 配置文件 > 默认值
    let mut config = storage::config::load_config(cli.config.as_deref())?;
    config.apply_env();
    cli.apply_overrides(&mut config);

    let command = cli
        .command
        .unwrap_or_else(|| Commands::Serve(ServeArgs::default()));

    match command {
        Commands::Serve(_) => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(cli::serve::execute(&config))
        }
        Commands::Migrate { dry_run } => cli::migrate::execute(&config, dry_run),
        Commands::Stats => cli::stats::execute(&config),
    }
}

fn main() -> ExitCode {
    // .env is optional
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "todo failed");
            ExitCode::FAILURE
        }
    }
}
