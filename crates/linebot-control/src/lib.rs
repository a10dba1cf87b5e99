//! 控制层模块
//!
//! 巡线搬运机器人的感知到运动控制循环，包括：
//! - 颜色分类（固定顺序的阈值判定）
//! - 巡线跟踪（离散纠偏 + 回正）
//! - 丢线恢复（有界的后退 / 摆动搜索）
//! - 搬运状态机（取货、掉头、卸货，带取消语义）
//! - 进程级守护循环
//!
//! 硬件只通过 [`linebot_hal`] 的 trait 注入，控制逻辑与真实硬件或仿真后端无关。
//!
//! # 使用示例
//!
//! ```no_run
//! use linebot_control::{Config, Hardware, TransportStateMachine};
//! use linebot_hal::sim::{CyclingColorSensor, ScriptedTouchSensor, SimDrive, SimIndicator, samples};
//!
//! let hw = Hardware::new(
//!     SimDrive::new(),
//!     CyclingColorSensor::new(samples::DEMO_CYCLE),
//!     CyclingColorSensor::new(samples::DEMO_CYCLE).with_offset(1),
//!     ScriptedTouchSensor::click(),
//!     SimIndicator::new(),
//! );
//! let mut machine = TransportStateMachine::new(hw, Config::default())?;
//! if machine.wait_for_start()? {
//!     machine.restart()?;
//!     machine.run_cycle()?;
//! }
//! # Ok::<(), linebot_control::ControlError>(())
//! ```

pub mod actions;
pub mod classifier;
pub mod config;
mod error;
pub mod machine;
pub mod recovery;
mod rig;
pub mod supervisor;
pub mod tracker;

pub use actions::ActionOutcome;
pub use classifier::ColorClassifier;
pub use config::{Config, ConfigError, RecoveryStrategy};
pub use error::ControlError;
pub use machine::{IdleReason, TickRecord, TransportStateMachine, TransportStats};
pub use recovery::{RecoveryManager, RecoveryOutcome};
pub use rig::{Hardware, Rig};
pub use supervisor::Supervisor;
pub use tracker::{Decision, LineTracker, TrackOutcome};
