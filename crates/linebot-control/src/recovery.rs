//! 丢线恢复
//!
//! 持续丢线超过阈值后由 [`LineTracker`](crate::tracker::LineTracker) 调用。
//! 搜索有固定的迭代上限，任何一侧重新读到 BLACK 立即返回。

use linebot_protocol::{ColorLabel, DriveCommand, Status};
use tracing::{debug, info, warn};

use crate::config::RecoveryStrategy;
use crate::error::ControlError;
use crate::rig::Rig;

/// 恢复结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryOutcome {
    /// 重新找到线
    Recovered,
    /// 迭代次数用尽，执行器已全部停止
    Exhausted,
    /// 操作员取消，执行器已全部停止
    Cancelled,
}

impl RecoveryOutcome {
    pub fn is_recovered(self) -> bool {
        self == RecoveryOutcome::Recovered
    }
}

/// 丢线恢复管理器
#[derive(Debug, Default)]
pub struct RecoveryManager {
    runs: u32,
}

impl RecoveryManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已执行的恢复次数
    pub fn runs(&self) -> u32 {
        self.runs
    }

    /// 执行一次有界的恢复搜索
    ///
    /// 先切换到 `Lost` 指示并停止所有执行器。`interruptible` 打开时，
    /// 每次迭代的动作结束后、采样之前检查取消。
    pub fn recover(&mut self, rig: &mut Rig) -> Result<RecoveryOutcome, ControlError> {
        let lost_line = rig.config().lost_line.clone();
        let base = rig.config().drive.base_speed;
        self.runs += 1;

        info!(
            "Recovery #{} ({:?}, up to {} iterations)",
            self.runs, lost_line.strategy, lost_line.iterations
        );
        rig.set_status(Status::Lost)?;
        rig.stop_all()?;

        if lost_line.strategy == RecoveryStrategy::Oscillate {
            rig.drive(DriveCommand::straight(-base))?;
            rig.pause(lost_line.backup());
            rig.stop_wheels()?;
        }

        for iteration in 1..=lost_line.iterations {
            match lost_line.strategy {
                RecoveryStrategy::Backoff => {
                    rig.drive(DriveCommand::straight(-base))?;
                    rig.pause(lost_line.backup());
                },
                RecoveryStrategy::Oscillate => {
                    rig.drive(DriveCommand::spin(base))?;
                    rig.pause(lost_line.oscillate());
                    rig.drive(DriveCommand::spin(-base))?;
                    rig.pause(lost_line.oscillate());
                    rig.stop_wheels()?;
                },
            }

            if lost_line.interruptible && rig.cancel_requested() {
                info!("Recovery cancelled at iteration {}", iteration);
                rig.stop_all()?;
                return Ok(RecoveryOutcome::Cancelled);
            }

            let (left, right) = rig.sample()?;
            debug!("recovery {}: {} / {}", iteration, left, right);
            if left == ColorLabel::Black || right == ColorLabel::Black {
                rig.stop_all()?;
                return Ok(RecoveryOutcome::Recovered);
            }
        }

        rig.stop_all()?;
        warn!(
            "Recovery exhausted after {} iterations",
            lost_line.iterations
        );
        Ok(RecoveryOutcome::Exhausted)
    }
}
