//! # linebot CLI
//!
//! 巡线搬运机器人的命令行入口。
//!
//! ```bash
//! # 用仿真后端运行（按钮由脚本模拟）
//! linebot run --backend sim
//!
//! # 在 EV3 上运行，日志写入文件
//! linebot run --backend ev3dev --config linebot.toml --log-file linebot.log
//!
//! # 急停
//! linebot stop --backend ev3dev
//!
//! # 现场标定：对一次采样分类
//! linebot classify 130 50 50
//!
//! # 生成 / 查看配置
//! linebot config init
//! linebot config show --config linebot.toml
//! ```

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

mod backend;
mod commands;

use commands::{ClassifyCommand, ConfigCommand, RunCommand, StopCommand};

/// linebot - 巡线搬运机器人命令行工具
#[derive(Parser, Debug)]
#[command(name = "linebot")]
#[command(about = "Line-following pick-up/drop transport robot", long_about = None)]
#[command(version)]
struct Cli {
    /// 日志写入该文件（追加），不再输出到 stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 运行搬运循环
    Run {
        #[command(flatten)]
        args: RunCommand,
    },

    /// 急停（停止驱动轮和升降机构）
    Stop {
        #[command(flatten)]
        args: StopCommand,
    },

    /// 对 RGB 采样分类
    Classify {
        #[command(flatten)]
        args: ClassifyCommand,
    },

    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// 初始化日志：默认 `linebot=info`，可用 `RUST_LOG` 覆盖
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(
        "linebot=info"
            .parse()
            .context("Invalid default log directive")?,
    );

    let (writer, ansi) = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        },
        None => (BoxMakeWriter::new(std::io::stderr), true),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    match cli.command {
        Commands::Run { args } => args.execute(),
        Commands::Stop { args } => args.execute(),
        Commands::Classify { args } => args.execute(),
        Commands::Config(cmd) => cmd.execute(),
    }
}
