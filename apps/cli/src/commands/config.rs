//! 配置管理命令
//!
//! 查看生效的配置，或生成一份带默认值的配置文件。

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use linebot_control::Config;

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "linebot.toml";

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 显示生效的配置（未指定文件时为默认配置）
    Show {
        /// 配置文件（TOML）
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// 写出默认配置
    Init {
        /// 输出路径
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,

        /// 覆盖已存在的文件
        #[arg(long)]
        force: bool,
    },
}

impl ConfigCommand {
    pub fn execute(self) -> Result<()> {
        match self {
            ConfigCommand::Show { config } => Self::show(config),
            ConfigCommand::Init { config, force } => Self::init(config, force),
        }
    }

    fn show(path: Option<PathBuf>) -> Result<()> {
        let config = super::load_config(path.as_deref())?;
        print!("{}", config.to_toml_string()?);
        Ok(())
    }

    fn init(path: PathBuf, force: bool) -> Result<()> {
        if path.exists() && !force {
            bail!(
                "{} already exists (use --force to overwrite)",
                path.display()
            );
        }
        let text = Config::default().to_toml_string()?;
        fs::write(&path, text).with_context(|| format!("Failed to write {}", path.display()))?;
        println!("✅ Wrote default config to {}", path.display());
        Ok(())
    }
}
