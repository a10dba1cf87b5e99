//! 状态指示
//!
//! 操作员通过两侧 LED 区分"就绪"、"丢线"、"错误"、"已停止"等状态。
//! `Status` 到 LED 颜色对的映射是一张穷举表，未知名称在解析时直接拒绝。

use std::fmt;
use std::str::FromStr;

use crate::{ProtocolError, Side};

/// LED 颜色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedColor {
    /// 熄灭
    Black,
    Red,
    Green,
    Amber,
    Orange,
    Yellow,
}

impl LedColor {
    /// 红、绿两路 LED 的亮度（0.0 ~ 1.0）
    ///
    /// EV3 每侧只有红绿两颗灯珠，其余颜色靠混光得到。
    pub const fn mix(self) -> (f32, f32) {
        match self {
            LedColor::Black => (0.0, 0.0),
            LedColor::Red => (1.0, 0.0),
            LedColor::Green => (0.0, 1.0),
            LedColor::Amber => (1.0, 1.0),
            LedColor::Orange => (1.0, 0.5),
            LedColor::Yellow => (0.1, 1.0),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            LedColor::Black => "BLACK",
            LedColor::Red => "RED",
            LedColor::Green => "GREEN",
            LedColor::Amber => "AMBER",
            LedColor::Orange => "ORANGE",
            LedColor::Yellow => "YELLOW",
        }
    }
}

impl fmt::Display for LedColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LedColor {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "black" | "off" => Ok(LedColor::Black),
            "red" => Ok(LedColor::Red),
            "green" => Ok(LedColor::Green),
            "amber" => Ok(LedColor::Amber),
            "orange" => Ok(LedColor::Orange),
            "yellow" => Ok(LedColor::Yellow),
            _ => Err(ProtocolError::UnknownLedColor(s.to_string())),
        }
    }
}

/// 左右两侧的 LED 颜色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LedPair {
    pub left: LedColor,
    pub right: LedColor,
}

impl LedPair {
    pub const fn new(left: LedColor, right: LedColor) -> Self {
        Self { left, right }
    }

    /// 指定侧的颜色
    pub const fn side(&self, side: Side) -> LedColor {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }
}

/// 机器人状态指示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Status {
    /// 等待启动
    Ready,
    /// 丢线恢复中
    Lost,
    /// 传感器故障或未预期错误
    Error,
    /// 巡线中
    Working,
    /// 取货
    Pickup,
    /// 卸货
    Drop,
    /// 暂停
    Paused,
    /// 被操作员停止
    Stopped,
    /// 全部熄灭
    #[default]
    Default,
}

impl Status {
    /// 全部状态（穷举）
    pub const ALL: [Status; 9] = [
        Status::Ready,
        Status::Lost,
        Status::Error,
        Status::Working,
        Status::Pickup,
        Status::Drop,
        Status::Paused,
        Status::Stopped,
        Status::Default,
    ];

    /// 状态对应的 LED 颜色对
    pub const fn led_pair(self) -> LedPair {
        use LedColor::*;
        match self {
            Status::Ready => LedPair::new(Green, Green),
            Status::Lost => LedPair::new(Orange, Orange),
            Status::Error => LedPair::new(Red, Red),
            Status::Working => LedPair::new(Green, Amber),
            Status::Pickup => LedPair::new(Amber, Amber),
            Status::Drop => LedPair::new(Amber, Amber),
            Status::Paused => LedPair::new(Yellow, Red),
            Status::Stopped => LedPair::new(Red, Black),
            Status::Default => LedPair::new(Black, Black),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Status::Ready => "ready",
            Status::Lost => "lost",
            Status::Error => "error",
            Status::Working => "working",
            Status::Pickup => "pickup",
            Status::Drop => "drop",
            Status::Paused => "paused",
            Status::Stopped => "stopped",
            Status::Default => "default",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ready" => Ok(Status::Ready),
            "lost" => Ok(Status::Lost),
            "error" => Ok(Status::Error),
            "working" => Ok(Status::Working),
            "pickup" => Ok(Status::Pickup),
            "drop" => Ok(Status::Drop),
            "paused" | "pause" => Ok(Status::Paused),
            "stopped" => Ok(Status::Stopped),
            "default" => Ok(Status::Default),
            _ => Err(ProtocolError::UnknownStatus(s.to_string())),
        }
    }
}
