//! 颜色采样与颜色标签

use std::fmt;
use std::str::FromStr;

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::ProtocolError;

/// 颜色传感器的一次 RGB 采样
///
/// 三个通道均已归一化到 0..=255。每个控制周期产生一次，不做保留。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColorSample {
    /// 红色通道
    pub red: u8,
    /// 绿色通道
    pub green: u8,
    /// 蓝色通道
    pub blue: u8,
}

impl ColorSample {
    /// 创建采样
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// 把原始读数按满量程缩放到 0..=255
    ///
    /// `full_scale` 为 0 时视为 1，超出满量程的读数截断为 255。
    pub fn from_raw(raw: [u32; 3], full_scale: [u32; 3]) -> Self {
        let scale = |value: u32, max: u32| -> u8 {
            let max = max.max(1) as u64;
            ((value as u64 * 255) / max).min(255) as u8
        };
        Self {
            red: scale(raw[0], full_scale[0]),
            green: scale(raw[1], full_scale[1]),
            blue: scale(raw[2], full_scale[2]),
        }
    }
}

impl From<(u8, u8, u8)> for ColorSample {
    fn from((red, green, blue): (u8, u8, u8)) -> Self {
        Self::new(red, green, blue)
    }
}

impl fmt::Display for ColorSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.red, self.green, self.blue)
    }
}

/// 离散颜色标签
///
/// `Unknown` 只由传感器读取失败产生，分类器对任何有效采样都不会返回它。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ColorLabel {
    /// 线（深色路径）
    Black = 0x00,
    /// 地面背景
    White = 0x01,
    /// 红色标记
    Red = 0x02,
    /// 绿色标记
    Green = 0x03,
    /// 读取失败
    Unknown = 0xFF,
}

impl ColorLabel {
    /// 是否为线
    pub const fn is_line(self) -> bool {
        matches!(self, ColorLabel::Black)
    }

    /// 是否可以作为标记颜色使用
    pub const fn is_marker(self) -> bool {
        matches!(self, ColorLabel::Red | ColorLabel::Green)
    }

    /// 大写名称（日志输出用）
    pub const fn as_str(self) -> &'static str {
        match self {
            ColorLabel::Black => "BLACK",
            ColorLabel::White => "WHITE",
            ColorLabel::Red => "RED",
            ColorLabel::Green => "GREEN",
            ColorLabel::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ColorLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColorLabel {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "black" => Ok(ColorLabel::Black),
            "white" => Ok(ColorLabel::White),
            "red" => Ok(ColorLabel::Red),
            "green" => Ok(ColorLabel::Green),
            "unknown" => Ok(ColorLabel::Unknown),
            _ => Err(ProtocolError::UnknownColor(s.to_string())),
        }
    }
}
