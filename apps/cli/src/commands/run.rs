//! run 命令
//!
//! 启动守护循环：等待按钮 → 搬运 → 直到 Idle，反复执行直到 Ctrl-C。

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use clap::Args;
use linebot_control::{Supervisor, TransportStateMachine};
use tracing::info;

use crate::backend::BackendArgs;

/// 运行命令参数
#[derive(Args, Debug)]
pub struct RunCommand {
    /// 配置文件（TOML）
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub backend: BackendArgs,

    /// 完成指定轮数后退出
    #[arg(long)]
    pub max_runs: Option<u32>,
}

impl RunCommand {
    pub fn execute(&self) -> Result<()> {
        let config = super::load_config(self.config.as_deref())?;
        let hw = self.backend.open_hardware()?;
        let machine = TransportStateMachine::new(hw, config)?;

        let shutdown = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&shutdown);
        ctrlc::set_handler(move || {
            flag.store(true, Ordering::SeqCst);
        })
        .context("Failed to install Ctrl-C handler")?;

        let mut supervisor = Supervisor::new(machine);
        if let Some(max) = self.max_runs {
            supervisor = supervisor.with_max_runs(max);
        }

        info!("Starting linebot ({:?} backend)", self.backend.backend);
        println!("🤖 Press the button to start (Ctrl-C to quit)");
        let runs = supervisor.run(shutdown)?;

        let stats = supervisor.machine().stats();
        println!("✅ Finished {} runs", runs);
        println!("  Pick-ups: {}", stats.pickups);
        println!("  Drops: {}", stats.drops);
        println!("  Ticks: {}", stats.ticks);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Backend;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: RunCommand,
    }

    #[test]
    fn test_run_command_defaults() {
        let cmd = Wrapper::parse_from(["run"]).args;
        assert!(cmd.config.is_none());
        assert_eq!(cmd.backend.backend, Backend::Sim);
        assert!(cmd.max_runs.is_none());
        assert!(!cmd.backend.fast);
    }

    #[test]
    fn test_run_command_flags() {
        let cmd = Wrapper::parse_from([
            "run",
            "--config",
            "robot.toml",
            "--backend",
            "ev3dev",
            "--max-runs",
            "3",
        ])
        .args;
        assert_eq!(cmd.config, Some(PathBuf::from("robot.toml")));
        assert_eq!(cmd.backend.backend, Backend::Ev3dev);
        assert_eq!(cmd.max_runs, Some(3));
    }

    #[test]
    fn test_run_command_port_overrides() {
        let cmd = Wrapper::parse_from([
            "run",
            "--backend",
            "ev3dev",
            "--left-color-port",
            "ev3-ports:in4",
            "--lift-port",
            "ev3-ports:outD",
        ])
        .args;
        assert_eq!(cmd.backend.left_color_port.as_deref(), Some("ev3-ports:in4"));
        assert_eq!(cmd.backend.lift_port.as_deref(), Some("ev3-ports:outD"));
        assert!(cmd.backend.touch_port.is_none());
    }
}
