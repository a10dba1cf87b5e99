//! 驱动通道与驱动命令

use std::fmt;
use std::ops::Neg;

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// 带符号速度（最大转速的百分比）
///
/// 构造时截断到 `[-100, 100]`，NaN 视为 0。
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "f32", into = "f32"))]
pub struct Speed(f32);

impl Speed {
    /// 速度上限（百分比）
    pub const MAX_PERCENT: f32 = 100.0;

    /// 零速
    pub const ZERO: Speed = Speed(0.0);

    /// 创建速度，超出范围的值被截断
    pub fn new(percent: f32) -> Self {
        if percent.is_nan() {
            return Self::ZERO;
        }
        Speed(percent.clamp(-Self::MAX_PERCENT, Self::MAX_PERCENT))
    }

    /// 百分比数值
    pub fn percent(self) -> f32 {
        self.0
    }

    /// 按系数缩放（结果同样截断）
    pub fn scaled(self, factor: f32) -> Self {
        Self::new(self.0 * factor)
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0.0
    }
}

impl From<f32> for Speed {
    fn from(percent: f32) -> Self {
        Speed::new(percent)
    }
}

impl From<Speed> for f32 {
    fn from(speed: Speed) -> Self {
        speed.0
    }
}

impl Neg for Speed {
    type Output = Speed;

    fn neg(self) -> Self::Output {
        Speed(-self.0)
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+.1}%", self.0)
    }
}

/// 左 / 右（传感器、驱动轮、LED 共用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::Left => "left",
            Side::Right => "right",
        })
    }
}

/// 执行器通道
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum Channel {
    /// 左驱动轮
    LeftWheel = 0,
    /// 右驱动轮
    RightWheel = 1,
    /// 升降机构
    Lift = 2,
}

impl Channel {
    /// 全部通道（急停时按此顺序逐个停止）
    pub const ALL: [Channel; 3] = [Channel::LeftWheel, Channel::RightWheel, Channel::Lift];

    /// 两个驱动轮
    pub const WHEELS: [Channel; 2] = [Channel::LeftWheel, Channel::RightWheel];
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Channel::LeftWheel => "left-wheel",
            Channel::RightWheel => "right-wheel",
            Channel::Lift => "lift",
        };
        f.write_str(name)
    }
}

/// 左右轮速度对
///
/// 下发后完全替换之前的命令，执行器上同一时刻只有一条生效的命令。
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DriveCommand {
    pub left: Speed,
    pub right: Speed,
}

impl DriveCommand {
    /// 两轮静止
    pub const STOP: DriveCommand = DriveCommand {
        left: Speed::ZERO,
        right: Speed::ZERO,
    };

    pub fn new(left: impl Into<Speed>, right: impl Into<Speed>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }

    /// 两轮同速直行（负速度为后退）
    pub fn straight(speed: impl Into<Speed>) -> Self {
        let speed = speed.into();
        Self {
            left: speed,
            right: speed,
        }
    }

    /// 原地旋转：左轮 `speed`，右轮 `-speed`
    pub fn spin(speed: impl Into<Speed>) -> Self {
        let speed = speed.into();
        Self {
            left: speed,
            right: -speed,
        }
    }

    /// 左右互换
    pub fn mirrored(self) -> Self {
        Self {
            left: self.right,
            right: self.left,
        }
    }

    pub fn is_straight(&self) -> bool {
        self.left == self.right
    }

    pub fn is_stop(&self) -> bool {
        self.left.is_zero() && self.right.is_zero()
    }
}

impl fmt::Display for DriveCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L {} / R {}", self.left, self.right)
    }
}
