//! 命令定义和实现

pub mod classify;
pub mod config;
pub mod run;
pub mod stop;

pub use classify::ClassifyCommand;
pub use config::ConfigCommand;
pub use run::RunCommand;
pub use stop::StopCommand;

use std::path::Path;

use anyhow::{Context, Result};
use linebot_control::Config;

/// 加载配置文件；未指定时使用默认配置
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(Config::default()),
    }
}
