//! # Linebot Protocol
//!
//! 巡线搬运机器人的共享数据模型（无硬件依赖）
//!
//! ## 模块
//!
//! - `color`: 颜色采样与离散颜色标签
//! - `drive`: 驱动通道、带符号速度、驱动命令
//! - `state`: 搬运状态机的状态枚举
//! - `status`: 状态指示（LED）枚举与映射表
//!
//! 硬件层（`linebot-hal`）和控制层（`linebot-control`）都只通过这里的类型交换数据。

pub mod color;
pub mod drive;
mod error;
pub mod state;
pub mod status;

// 重新导出常用类型
pub use color::{ColorLabel, ColorSample};
pub use drive::{Channel, DriveCommand, Side, Speed};
pub use error::ProtocolError;
pub use state::RobotState;
pub use status::{LedColor, LedPair, Status};
