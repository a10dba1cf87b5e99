//! 数据模型层错误类型定义

use thiserror::Error;

/// 数据模型解析错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// 无法识别的颜色名称
    #[error("Unknown color label: {0:?}")]
    UnknownColor(String),

    /// 无法识别的状态名称
    #[error("Unknown status: {0:?}")]
    UnknownStatus(String),

    /// 无法识别的 LED 颜色
    #[error("Unknown LED color: {0:?}")]
    UnknownLedColor(String),
}
