//! CLI 模块

pub mod migrate;
pub mod serve;
pub mod stats;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::storage::config::Config;

#[derive(Parser)]
#[command(name = "todo")]
#[command(version)]
#[command(about = "To-do list HTTP backend (tasks, lists, stats)")]
pub struct Cli {
    /// Config file (default: ~/.todo/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database URL, overrides config and DATABASE_URL
    #[arg(long, global = true)]
    pub database: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server (default)
    Serve(ServeArgs),
    /// Apply pending schema migrations
    Migrate {
        /// Show what would be done without making changes
        #[arg(long)]
        dry_run: bool,
    },
    /// Print task statistics as JSON
    Stats,
}

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long)]
    pub host: Option<String>,
    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl Cli {
    /// 命令行参数优先于配置文件与环境变量
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(url) = &self.database {
            config.database.url = Some(url.clone());
        }
        if let Some(Commands::Serve(args)) = &self.command {
            if let Some(host) = &args.host {
                config.server.host = host.clone();
            }
            if let Some(port) = args.port {
                config.server.port = port;
            }
        }
    }
}
