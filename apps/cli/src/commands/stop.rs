//! 急停命令
//!
//! 停止左右驱动轮和升降机构

use anyhow::Result;
use clap::Args;
use linebot_hal::Channel;

use crate::backend::BackendArgs;

/// 急停命令参数
#[derive(Args, Debug)]
pub struct StopCommand {
    #[command(flatten)]
    pub backend: BackendArgs,
}

impl StopCommand {
    /// 执行急停（每个通道都尝试，返回第一个错误）
    pub fn execute(&self) -> Result<()> {
        let mut drive = self.backend.open_drive()?;

        println!("🛑 Stopping all motors...");
        let mut first_error = None;
        for channel in Channel::ALL {
            match drive.stop(channel) {
                Ok(()) => println!("  {} stopped", channel),
                Err(e) => {
                    eprintln!("  ❌ {}: {}", channel, e);
                    first_error.get_or_insert(e);
                },
            }
        }

        match first_error {
            Some(e) => Err(e.into()),
            None => {
                println!("✅ Stop complete");
                Ok(())
            },
        }
    }
}
