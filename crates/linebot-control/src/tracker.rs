//! 巡线跟踪
//!
//! 每个控制周期根据左右两个颜色标签做一次转向决策：
//!
//! | 左 | 右 | 决策 |
//! |----|----|------|
//! | BLACK | BLACK | [`Decision::Centered`]：直行 |
//! | BLACK | WHITE | [`Decision::DriftLeft`]：向左静态纠偏 |
//! | WHITE | BLACK | [`Decision::DriftRight`]：向右静态纠偏 |
//! | 其余含 BLACK | | [`Decision::Straddle`]：直行 |
//! | 都不是 BLACK | | [`Decision::Lost`]：直行并累计丢线计数 |
//!
//! 纠偏是离散的 bang-bang 动作：外侧轮反转，分小步转动并在每步后重新采样，
//! 两侧重新压线后做一次短暂的反向回正。

use linebot_protocol::{ColorLabel, DriveCommand};
use tracing::{debug, info, warn};

use crate::error::ControlError;
use crate::recovery::{RecoveryManager, RecoveryOutcome};
use crate::rig::Rig;
use linebot_protocol::Status;

/// 单周期转向决策
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// 两侧都在线上
    Centered,
    /// 只有左侧在线上，右侧为白
    DriftLeft,
    /// 只有右侧在线上，左侧为白
    DriftRight,
    /// 一侧在线上，另一侧是标记色或读取失败
    Straddle,
    /// 两侧都不在线上
    Lost,
}

impl Decision {
    pub fn from_labels(left: ColorLabel, right: ColorLabel) -> Self {
        use ColorLabel::{Black, White};
        match (left, right) {
            (Black, Black) => Decision::Centered,
            (Black, White) => Decision::DriftLeft,
            (White, Black) => Decision::DriftRight,
            (l, r) if l.is_line() || r.is_line() => Decision::Straddle,
            _ => Decision::Lost,
        }
    }

    pub fn is_drift(self) -> bool {
        matches!(self, Decision::DriftLeft | Decision::DriftRight)
    }
}

/// [`LineTracker::step`] 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackOutcome {
    /// 已按决策完成本周期动作
    Steered(Decision),
    /// 操作员取消（执行器已全部停止）
    Cancelled,
    /// 丢线恢复失败
    GaveUp,
}

/// 纠偏动作的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Correction {
    Completed,
    Cancelled,
}

/// 巡线跟踪器
///
/// 持有丢线计数器：任何一次压线都清零，两侧都不是 BLACK 时每周期加一。
#[derive(Debug, Default)]
pub struct LineTracker {
    lost_counter: u32,
    recovery: RecoveryManager,
}

impl LineTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 连续丢线的周期数
    pub fn lost_counter(&self) -> u32 {
        self.lost_counter
    }

    pub fn reset(&mut self) {
        self.lost_counter = 0;
    }

    pub fn recovery(&self) -> &RecoveryManager {
        &self.recovery
    }

    /// 执行一个周期的巡线决策
    ///
    /// 最多阻塞一个有界的机动（纠偏或丢线恢复）。
    pub fn step(
        &mut self,
        rig: &mut Rig,
        left: ColorLabel,
        right: ColorLabel,
    ) -> Result<TrackOutcome, ControlError> {
        let decision = Decision::from_labels(left, right);
        let base = rig.config().drive.base_speed;

        match decision {
            Decision::Centered | Decision::Straddle => {
                rig.drive(DriveCommand::straight(base))?;
                self.lost_counter = 0;
            },
            Decision::DriftLeft | Decision::DriftRight => {
                if self.correct(rig, decision)? == Correction::Cancelled {
                    return Ok(TrackOutcome::Cancelled);
                }
                self.lost_counter = 0;
            },
            Decision::Lost => {
                rig.drive(DriveCommand::straight(base))?;
                self.lost_counter += 1;

                let threshold = rig.config().lost_line.threshold;
                if self.lost_counter > threshold {
                    warn!(
                        "Line lost for {} ticks (threshold {}), starting recovery",
                        self.lost_counter, threshold
                    );
                    let outcome = self.recovery.recover(rig)?;
                    self.lost_counter = 0;
                    match outcome {
                        RecoveryOutcome::Recovered => {
                            info!("Line recovered");
                            rig.set_status(Status::Working)?;
                        },
                        RecoveryOutcome::Exhausted => return Ok(TrackOutcome::GaveUp),
                        RecoveryOutcome::Cancelled => return Ok(TrackOutcome::Cancelled),
                    }
                }
            },
        }

        debug!(
            "track: {} / {} -> {:?} (lost {})",
            left, right, decision, self.lost_counter
        );
        Ok(TrackOutcome::Steered(decision))
    }

    /// 静态纠偏 + 回正
    fn correct(&mut self, rig: &mut Rig, decision: Decision) -> Result<Correction, ControlError> {
        use ColorLabel::{Black, White};

        let drive = rig.config().drive.clone();
        let base = drive.base_speed;

        // 左侧压线时向左转：左轮反转，右轮前进
        let left_turn = DriveCommand::new(-drive.k_correction_turn * base, base);
        let left_centering = DriveCommand::spin(drive.k_centering_turn * base);
        let (turn, centering, pattern) = match decision {
            Decision::DriftLeft => (left_turn, left_centering, (Black, White)),
            _ => (left_turn.mirrored(), left_centering.mirrored(), (White, Black)),
        };

        rig.stop_all()?;
        rig.pause(drive.pre_turn_stop());

        let mut labels = pattern;
        let mut steps = 0;
        while labels == pattern && steps < drive.correction_step_limit {
            rig.drive(turn)?;
            rig.pause(drive.correction_step());
            labels = rig.sample()?;
            steps += 1;

            if rig.cancel_requested() {
                info!("Corrective turn cancelled after {} steps", steps);
                rig.stop_all()?;
                return Ok(Correction::Cancelled);
            }
        }
        rig.stop_all()?;

        if labels == pattern {
            warn!(
                "Corrective turn gave up after {} steps ({:?})",
                steps, decision
            );
        }

        if labels == (Black, Black) {
            rig.drive(centering)?;
            rig.pause(drive.centering_turn());
            rig.stop_all()?;
        }

        debug!("{:?} corrected in {} steps, now {:?}", decision, steps, labels);
        Ok(Correction::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::rig::Hardware;
    use linebot_hal::sim::{
        ScriptedColorSensor, ScriptedTouchSensor, SimDrive, SimDriveHandle, SimIndicator,
        samples,
    };
    use linebot_hal::{Channel, NoopSleeper, Speed};

    fn make_rig(
        left: ScriptedColorSensor,
        right: ScriptedColorSensor,
        button: ScriptedTouchSensor,
        config: Config,
    ) -> (Rig, SimDriveHandle) {
        let drive = SimDrive::new();
        let dh = drive.handle();
        let hw = Hardware::new(drive, left, right, button, SimIndicator::new())
            .with_sleeper(NoopSleeper);
        (Rig::new(hw, config), dh)
    }

    fn speeds(l: f32, r: f32) -> (Speed, Speed) {
        (Speed::new(l), Speed::new(r))
    }

    #[test]
    fn test_decision_table() {
        use ColorLabel::*;
        assert_eq!(Decision::from_labels(Black, Black), Decision::Centered);
        assert_eq!(Decision::from_labels(Black, White), Decision::DriftLeft);
        assert_eq!(Decision::from_labels(White, Black), Decision::DriftRight);
        assert_eq!(Decision::from_labels(Black, Red), Decision::Straddle);
        assert_eq!(Decision::from_labels(Unknown, Black), Decision::Straddle);
        assert_eq!(Decision::from_labels(White, White), Decision::Lost);
        assert_eq!(Decision::from_labels(Red, Green), Decision::Lost);
        assert_eq!(Decision::from_labels(Unknown, Unknown), Decision::Lost);
    }

    #[test]
    fn test_centered_drives_straight_and_resets_counter() {
        let (mut rig, drive) = make_rig(
            ScriptedColorSensor::constant(samples::BLACK),
            ScriptedColorSensor::constant(samples::BLACK),
            ScriptedTouchSensor::never(),
            Config::default(),
        );
        let mut tracker = LineTracker::new();

        tracker
            .step(&mut rig, ColorLabel::White, ColorLabel::White)
            .unwrap();
        assert_eq!(tracker.lost_counter(), 1);

        let outcome = tracker
            .step(&mut rig, ColorLabel::Black, ColorLabel::Black)
            .unwrap();
        assert_eq!(outcome, TrackOutcome::Steered(Decision::Centered));
        assert_eq!(tracker.lost_counter(), 0);

        let last = *drive.wheel_commands().last().unwrap();
        assert_eq!(last, speeds(10.0, 10.0));
    }

    #[test]
    fn test_drift_left_aborts_when_guide_reads_white() {
        // 纠偏两步后左侧变白
        let (mut rig, drive) = make_rig(
            ScriptedColorSensor::new([samples::BLACK, samples::WHITE]),
            ScriptedColorSensor::constant(samples::WHITE),
            ScriptedTouchSensor::never(),
            Config::default(),
        );
        let mut tracker = LineTracker::new();

        let outcome = tracker
            .step(&mut rig, ColorLabel::Black, ColorLabel::White)
            .unwrap();
        assert_eq!(outcome, TrackOutcome::Steered(Decision::DriftLeft));

        let turns = drive.wheel_commands();
        assert_eq!(turns, vec![speeds(-10.0, 10.0); 2]);
        assert!(drive.all_stopped());
    }

    #[test]
    fn test_drift_right_centers_when_both_black() {
        let (mut rig, drive) = make_rig(
            ScriptedColorSensor::new([samples::WHITE, samples::BLACK]),
            ScriptedColorSensor::constant(samples::BLACK),
            ScriptedTouchSensor::never(),
            Config::default(),
        );
        let mut tracker = LineTracker::new();

        tracker
            .step(&mut rig, ColorLabel::White, ColorLabel::Black)
            .unwrap();

        // 两步右转，随后反向回正
        assert_eq!(
            drive.wheel_commands(),
            vec![speeds(10.0, -10.0), speeds(10.0, -10.0), speeds(-7.0, 7.0)]
        );
        assert!(drive.all_stopped());
        assert_eq!(tracker.lost_counter(), 0);
    }

    #[test]
    fn test_correction_bounded_by_step_limit() {
        let mut config = Config::default();
        config.drive.correction_step_limit = 5;
        let (mut rig, drive) = make_rig(
            ScriptedColorSensor::constant(samples::BLACK),
            ScriptedColorSensor::constant(samples::WHITE),
            ScriptedTouchSensor::never(),
            config,
        );
        let mut tracker = LineTracker::new();

        tracker
            .step(&mut rig, ColorLabel::Black, ColorLabel::White)
            .unwrap();
        assert_eq!(drive.wheel_commands().len(), 5);
        assert!(drive.all_stopped());
    }

    #[test]
    fn test_button_mid_correction_cancels() {
        let (mut rig, drive) = make_rig(
            ScriptedColorSensor::constant(samples::BLACK),
            ScriptedColorSensor::constant(samples::WHITE),
            ScriptedTouchSensor::pressed_from(2),
            Config::default(),
        );
        let mut tracker = LineTracker::new();

        let outcome = tracker
            .step(&mut rig, ColorLabel::Black, ColorLabel::White)
            .unwrap();
        assert_eq!(outcome, TrackOutcome::Cancelled);
        assert_eq!(drive.wheel_commands().len(), 3);
        assert!(drive.all_stopped());
        assert!(drive.live_speed(Channel::LeftWheel).is_zero());
    }

    #[test]
    fn test_lost_escalates_past_threshold() {
        let mut config = Config::default();
        config.lost_line.threshold = 3;
        config.lost_line.iterations = 2;
        let (mut rig, drive) = make_rig(
            ScriptedColorSensor::constant(samples::WHITE),
            ScriptedColorSensor::constant(samples::WHITE),
            ScriptedTouchSensor::never(),
            config,
        );
        let mut tracker = LineTracker::new();

        for expected in 1..=3 {
            let outcome = tracker
                .step(&mut rig, ColorLabel::White, ColorLabel::White)
                .unwrap();
            assert_eq!(outcome, TrackOutcome::Steered(Decision::Lost));
            assert_eq!(tracker.lost_counter(), expected);
        }
        assert_eq!(tracker.recovery().runs(), 0);

        let outcome = tracker
            .step(&mut rig, ColorLabel::White, ColorLabel::White)
            .unwrap();
        assert_eq!(outcome, TrackOutcome::GaveUp);
        assert_eq!(tracker.lost_counter(), 0);
        assert_eq!(tracker.recovery().runs(), 1);
        assert!(drive.all_stopped());
    }
}
