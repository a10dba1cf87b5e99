//! classify 命令
//!
//! 用当前配置的阈值对一个 RGB 采样分类，便于现场标定。

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use linebot_control::ColorClassifier;
use linebot_protocol::{ColorLabel, ColorSample};

/// 分类命令参数
#[derive(Args, Debug)]
pub struct ClassifyCommand {
    /// 红色通道（0-255）
    pub red: u8,
    /// 绿色通道（0-255）
    pub green: u8,
    /// 蓝色通道（0-255）
    pub blue: u8,

    /// 配置文件（TOML）
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl ClassifyCommand {
    pub fn label(&self) -> Result<ColorLabel> {
        let config = super::load_config(self.config.as_deref())?;
        let classifier = ColorClassifier::new(config.classifier);
        Ok(classifier.classify(ColorSample::new(self.red, self.green, self.blue)))
    }

    pub fn execute(&self) -> Result<()> {
        println!("{}", self.label()?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(red: u8, green: u8, blue: u8) -> ClassifyCommand {
        ClassifyCommand {
            red,
            green,
            blue,
            config: None,
        }
    }

    #[test]
    fn test_default_thresholds() {
        assert_eq!(cmd(30, 30, 30).label().unwrap(), ColorLabel::Black);
        assert_eq!(cmd(130, 50, 50).label().unwrap(), ColorLabel::Red);
        assert_eq!(cmd(40, 110, 30).label().unwrap(), ColorLabel::Green);
        assert_eq!(cmd(0, 0, 200).label().unwrap(), ColorLabel::White);
    }
}
