//! # Linebot HAL
//!
//! 硬件抽象层：控制核心只通过本 crate 的 trait 访问执行器和传感器。
//!
//! ## 后端
//!
//! - [`sim`]：脚本化/记录型替身，用于测试和无硬件运行
//! - [`ev3dev`]（仅 Linux）：基于 ev3dev sysfs 的真实硬件驱动
//!
//! 所有 trait 方法都取 `&mut self`：控制循环是单线程的，执行器只有一个所有者。

use std::time::Duration;

use thiserror::Error;

pub use linebot_protocol::{Channel, ColorSample, DriveCommand, Side, Speed, Status};

#[cfg(target_os = "linux")]
pub mod ev3dev;

pub mod sim;

/// 硬件层统一错误类型
#[derive(Error, Debug)]
pub enum HalError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Device Error: {0}")]
    Device(#[from] DeviceError),
    #[error("Operation timeout: {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

impl HalError {
    /// 是否为不可恢复的错误（设备不存在、无权限）
    pub fn is_fatal(&self) -> bool {
        match self {
            HalError::Device(e) => e.is_fatal(),
            HalError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied
            ),
            HalError::Timeout { .. } => false,
        }
    }
}

/// 设备错误的结构化分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceErrorKind {
    Unknown,
    NotFound,
    AccessDenied,
    InvalidResponse,
    Unsupported,
    /// 注入的故障（仿真后端）
    Injected,
}

/// 结构化设备错误
#[derive(Error, Debug, Clone)]
#[error("{kind:?}: {message}")]
pub struct DeviceError {
    pub kind: DeviceErrorKind,
    pub message: String,
}

impl DeviceError {
    pub fn new(kind: DeviceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind,
            DeviceErrorKind::NotFound | DeviceErrorKind::AccessDenied
        )
    }
}

impl From<String> for DeviceError {
    fn from(message: String) -> Self {
        Self::new(DeviceErrorKind::Unknown, message)
    }
}

impl From<&str> for DeviceError {
    fn from(message: &str) -> Self {
        Self::new(DeviceErrorKind::Unknown, message)
    }
}

/// 驱动执行器（两个驱动轮 + 升降机构）
pub trait DriveActuator {
    /// 以带符号速度持续运行指定通道，替换该通道之前的命令
    fn set_speed(&mut self, channel: Channel, speed: Speed) -> Result<(), HalError>;

    /// 停止指定通道
    fn stop(&mut self, channel: Channel) -> Result<(), HalError>;

    /// 以指定速度转过固定角度，阻塞直到完成
    fn run_for_angle(
        &mut self,
        channel: Channel,
        speed: Speed,
        degrees: u32,
    ) -> Result<(), HalError>;

    /// 同时下发左右轮速度
    fn drive(&mut self, command: DriveCommand) -> Result<(), HalError> {
        self.set_speed(Channel::LeftWheel, command.left)?;
        self.set_speed(Channel::RightWheel, command.right)
    }
}

/// 颜色传感器
pub trait ColorSensor {
    /// 读取一次 RGB 采样，失败时返回错误
    fn read(&mut self) -> Result<ColorSample, HalError>;
}

/// 二值按压传感器（启动 / 取消按钮）
pub trait TouchSensor {
    fn is_pressed(&mut self) -> Result<bool, HalError>;
}

/// 状态指示灯
pub trait StatusIndicator {
    fn set_status(&mut self, status: Status) -> Result<(), HalError>;
}

/// 固定时长暂停
///
/// 控制循环中所有挂起点都经过这里，测试可以替换为不真正休眠的实现。
pub trait Sleeper {
    fn sleep(&mut self, duration: Duration);
}

/// 使用 `spin_sleep` 的暂停实现（微秒级精度）
#[derive(Debug, Clone, Copy, Default)]
pub struct SpinSleeper;

impl Sleeper for SpinSleeper {
    fn sleep(&mut self, duration: Duration) {
        if !duration.is_zero() {
            spin_sleep::sleep(duration);
        }
    }
}

/// 不做任何等待的暂停实现
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSleeper;

impl Sleeper for NoopSleeper {
    fn sleep(&mut self, _duration: Duration) {}
}
