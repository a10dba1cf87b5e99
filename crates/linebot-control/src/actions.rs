//! 取货、卸货、掉头动作序列
//!
//! 每个动作在固定的检查点（每次轮询、每次暂停之后）检查取消；
//! 被取消时停止全部执行器并返回 [`ActionOutcome::Cancelled`]。

use linebot_protocol::{ColorLabel, DriveCommand, Side, Status};
use tracing::{debug, info, warn};

use crate::error::ControlError;
use crate::rig::Rig;

/// 动作序列的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Completed,
    Cancelled,
}

impl ActionOutcome {
    pub fn is_cancelled(self) -> bool {
        self == ActionOutcome::Cancelled
    }
}

fn cancelled(rig: &mut Rig, action: &str) -> Result<ActionOutcome, ControlError> {
    info!("{} cancelled", action);
    rig.stop_all()?;
    Ok(ActionOutcome::Cancelled)
}

/// 看到起点标记的一侧（两侧都看到或都没看到时为 `None`）
fn marker_side(marker: ColorLabel, left: ColorLabel, right: ColorLabel) -> Option<Side> {
    match (left == marker, right == marker) {
        (true, false) => Some(Side::Left),
        (false, true) => Some(Side::Right),
        _ => None,
    }
}

/// 取货
///
/// 只有一侧看到起点标记时，先以半速向该侧原地转动，再轮询另一侧传感器
/// 直到读到 BLACK（次数有上限）。随后前进一小段、停轮、升起货叉、暂停。
pub fn pick_up(
    rig: &mut Rig,
    left: ColorLabel,
    right: ColorLabel,
) -> Result<ActionOutcome, ControlError> {
    let source = rig.config().markers.source_color;
    let lift = rig.config().lift.clone();
    let base = rig.config().drive.base_speed;

    info!("Pick-up at {} marker ({} / {})", source, left, right);
    rig.set_status(Status::Pickup)?;

    if let Some(side) = marker_side(source, left, right) {
        let half = base / 2.0;
        let turn = match side {
            Side::Left => DriveCommand::spin(-half),
            Side::Right => DriveCommand::spin(half),
        };
        rig.drive(turn)?;
        rig.pause(lift.align_turn());
        if rig.cancel_requested() {
            return cancelled(rig, "Pick-up");
        }

        let guide = side.opposite();
        let mut aligned = false;
        for poll in 0..lift.align_poll_limit {
            if rig.sample_side(guide)? == ColorLabel::Black {
                debug!("Aligned on {} after {} polls", guide, poll);
                aligned = true;
                break;
            }
            if rig.cancel_requested() {
                return cancelled(rig, "Pick-up");
            }
            rig.pause(lift.align_poll());
        }
        if !aligned {
            warn!(
                "{} sensor never reached the line after {} polls",
                guide, lift.align_poll_limit
            );
        }
    }

    rig.drive(DriveCommand::straight(base))?;
    rig.pause(lift.approach());
    rig.stop_wheels()?;
    if rig.cancel_requested() {
        return cancelled(rig, "Pick-up");
    }

    rig.run_lift(lift.up_speed, lift.degrees)?;
    rig.pause(lift.pause());
    if rig.cancel_requested() {
        return cancelled(rig, "Pick-up");
    }

    info!("Pick-up complete");
    Ok(ActionOutcome::Completed)
}

/// 卸货：放下货叉并暂停
pub fn drop_off(rig: &mut Rig) -> Result<ActionOutcome, ControlError> {
    let lift = rig.config().lift.clone();

    info!("Drop at {} marker", rig.config().markers.target_color);
    rig.set_status(Status::Drop)?;
    rig.run_lift(lift.down_speed, lift.degrees)?;
    rig.pause(lift.pause());
    if rig.cancel_requested() {
        return cancelled(rig, "Drop");
    }

    info!("Drop complete");
    Ok(ActionOutcome::Completed)
}

/// 原地掉头
///
/// 按固定时长旋转后停止并稳定一小段时间。
pub fn turn_around(rig: &mut Rig) -> Result<ActionOutcome, ControlError> {
    let drive = rig.config().drive.clone();

    rig.set_status(Status::Working)?;
    rig.drive(DriveCommand::spin(drive.base_speed))?;
    rig.pause(drive.turn_around());
    rig.stop_all()?;
    rig.pause(drive.turn_around_settle());
    if rig.cancel_requested() {
        return cancelled(rig, "Turn-around");
    }

    debug!("Turn-around complete");
    Ok(ActionOutcome::Completed)
}
