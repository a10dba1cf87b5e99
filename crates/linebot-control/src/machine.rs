//! 搬运状态机
//!
//! 顶层控制器：驱动轮询循环，在起点 / 终点标记上触发取货、卸货和掉头，
//! 其余时间交给 [`LineTracker`] 巡线。
//!
//! ```text
//!            restart()
//!   Idle ─────────────► ToSource ──(起点标记: 取货 + 掉头)──► ToTarget
//!    ▲                     ▲                                    │
//!    │                     └──────(终点标记: 卸货 + 掉头)────────┘
//!    └── 取消 / 丢线恢复失败（任意运行状态）
//! ```
//!
//! `Delivered` 保留未用，状态机不会进入该状态。

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use linebot_protocol::{ColorLabel, RobotState, Status};
use tracing::{debug, info, warn};

use crate::actions::{self, ActionOutcome};
use crate::config::Config;
use crate::error::ControlError;
use crate::rig::{Hardware, Rig};
use crate::tracker::{LineTracker, TrackOutcome};

// ==================== 统计与遥测 ====================

/// 进入 `Idle` 的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleReason {
    /// 操作员按钮或关机信号
    Cancelled,
    /// 丢线恢复失败
    LineLost,
}

/// 运行统计
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransportStats {
    pub ticks: u64,
    pub pickups: u32,
    pub drops: u32,
    pub turn_arounds: u32,
    pub idle_entries: u32,
}

/// 单个控制周期的遥测记录
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickRecord {
    pub tick: u64,
    pub state: RobotState,
    pub left: ColorLabel,
    pub right: ColorLabel,
    pub lost_counter: u32,
}

impl TickRecord {
    /// 紧凑编码：`[state, left, right]`
    pub fn compact(&self) -> [u8; 3] {
        [
            u8::from(self.state),
            u8::from(self.left),
            u8::from(self.right),
        ]
    }
}

// ==================== 状态机 ====================

/// 搬运状态机
///
/// 独占全部硬件句柄、机器人状态和丢线计数器，所有操作都通过 `&mut self` 进行。
pub struct TransportStateMachine {
    rig: Rig,
    tracker: LineTracker,
    state: RobotState,
    idle_reason: Option<IdleReason>,
    stats: TransportStats,
    last_tick: Option<TickRecord>,
}

impl TransportStateMachine {
    /// 校验配置并创建状态机（初始状态 `Idle`）
    pub fn new(hw: Hardware, config: Config) -> Result<Self, ControlError> {
        config.validate()?;
        info!(
            "Transport machine ready: source={}, target={}, base speed {}%",
            config.markers.source_color, config.markers.target_color, config.drive.base_speed
        );
        Ok(Self {
            rig: Rig::new(hw, config),
            tracker: LineTracker::new(),
            state: RobotState::Idle,
            idle_reason: None,
            stats: TransportStats::default(),
            last_tick: None,
        })
    }

    pub fn state(&self) -> RobotState {
        self.state
    }

    /// 最近一次进入 `Idle` 的原因
    pub fn idle_reason(&self) -> Option<IdleReason> {
        self.idle_reason
    }

    pub fn lost_counter(&self) -> u32 {
        self.tracker.lost_counter()
    }

    pub fn stats(&self) -> TransportStats {
        self.stats
    }

    pub fn last_tick(&self) -> Option<TickRecord> {
        self.last_tick
    }

    /// 已执行的丢线恢复次数
    pub fn recoveries(&self) -> u32 {
        self.tracker.recovery().runs()
    }

    pub fn config(&self) -> &Config {
        self.rig.config()
    }

    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        self.rig.shutdown_flag()
    }

    /// 使用外部关机标志（例如 Ctrl-C 处理器持有的那个）
    pub fn use_shutdown_flag(&mut self, flag: Arc<AtomicBool>) {
        self.rig.use_shutdown_flag(flag);
    }

    pub fn set_status(&mut self, status: Status) -> Result<(), ControlError> {
        self.rig.set_status(status)
    }

    /// 停止左轮、右轮和升降机构
    pub fn stop_all(&mut self) -> Result<(), ControlError> {
        self.rig.stop_all()
    }

    /// `Idle → ToSource`
    pub fn restart(&mut self) -> Result<(), ControlError> {
        if self.state != RobotState::Idle {
            return Err(ControlError::InvalidTransition {
                state: self.state,
                action: "restart",
            });
        }
        self.tracker.reset();
        self.idle_reason = None;
        self.transition(RobotState::ToSource);
        self.rig.set_status(Status::Working)
    }

    /// 等待操作员按下并松开按钮
    ///
    /// 返回 `false` 表示等待期间收到关机信号。
    pub fn wait_for_start(&mut self) -> Result<bool, ControlError> {
        self.rig.set_status(Status::Ready)?;
        info!("Waiting for button press");

        let poll = self.rig.config().button.poll();
        for wanted in [true, false] {
            loop {
                if self.rig.shutdown_requested() {
                    return Ok(false);
                }
                if self.rig.button_pressed()? == wanted {
                    break;
                }
                self.rig.pause(poll);
            }
        }

        info!("Start requested");
        self.rig.set_status(Status::Working)?;
        Ok(true)
    }

    /// 等待按钮松开（取消后按钮可能仍被按住）
    pub fn wait_for_release(&mut self) -> Result<(), ControlError> {
        let poll = self.rig.config().button.poll();
        while !self.rig.shutdown_requested() && self.rig.button_pressed()? {
            self.rig.pause(poll);
        }
        Ok(())
    }

    /// 执行一个控制周期，返回周期结束时的状态
    ///
    /// 顺序：
    /// 1. 同时采样左右传感器
    /// 2. 标记判定，命中则执行取货 / 卸货序列并返回新状态
    /// 3. 巡线一步；取消或恢复失败进入 `Idle`
    /// 4. 检查取消
    /// 5. 暂停一个循环步长
    pub fn tick(&mut self) -> Result<RobotState, ControlError> {
        if !self.state.is_transporting() {
            return Ok(self.state);
        }

        let (left, right) = self.rig.sample()?;
        self.stats.ticks += 1;
        let record = TickRecord {
            tick: self.stats.ticks,
            state: self.state,
            left,
            right,
            lost_counter: self.tracker.lost_counter(),
        };
        debug!(
            tick = record.tick,
            state = %record.state,
            left = %left,
            right = %right,
            lost = record.lost_counter,
            code = ?record.compact(),
            "tick"
        );
        self.last_tick = Some(record);

        if let Some(next) = self.handle_marker(left, right)? {
            return Ok(next);
        }

        match self.tracker.step(&mut self.rig, left, right)? {
            TrackOutcome::Steered(_) => {},
            TrackOutcome::Cancelled => return self.enter_idle(IdleReason::Cancelled),
            TrackOutcome::GaveUp => return self.enter_idle(IdleReason::LineLost),
        }

        if self.rig.cancel_requested() {
            return self.enter_idle(IdleReason::Cancelled);
        }

        let step = self.rig.config().drive.loop_step();
        self.rig.pause(step);
        Ok(self.state)
    }

    /// 持续执行控制周期直到状态改变（完成一段搬运或进入 `Idle`）
    pub fn run_cycle(&mut self) -> Result<RobotState, ControlError> {
        let start = self.state;
        if !start.is_transporting() {
            return Ok(start);
        }
        loop {
            let next = self.tick()?;
            if next != start {
                return Ok(next);
            }
        }
    }

    /// 持续搬运直到进入 `Idle`
    pub fn run_until_idle(&mut self) -> Result<RobotState, ControlError> {
        while self.state.is_transporting() {
            self.run_cycle()?;
        }
        Ok(self.state)
    }

    // ==================== 内部 ====================

    /// 当前状态对应的标记出现在任一侧时执行取货 / 卸货
    ///
    /// 状态判定作用于整个"左或右"条件：`ToSource` 只响应起点颜色，
    /// `ToTarget` 只响应终点颜色。
    fn handle_marker(
        &mut self,
        left: ColorLabel,
        right: ColorLabel,
    ) -> Result<Option<RobotState>, ControlError> {
        let markers = &self.rig.config().markers;
        let (source, target) = (markers.source_color, markers.target_color);
        let seen = |color: ColorLabel| left == color || right == color;

        let next = match self.state {
            RobotState::ToSource if seen(source) => {
                info!("Source marker {} detected", source);
                self.rig.stop_all()?;
                if actions::pick_up(&mut self.rig, left, right)?.is_cancelled() {
                    return self.enter_idle(IdleReason::Cancelled).map(Some);
                }
                self.stats.pickups += 1;
                RobotState::ToTarget
            },
            RobotState::ToTarget if seen(target) => {
                info!("Target marker {} detected", target);
                self.rig.stop_all()?;
                if actions::drop_off(&mut self.rig)?.is_cancelled() {
                    return self.enter_idle(IdleReason::Cancelled).map(Some);
                }
                self.stats.drops += 1;
                RobotState::ToSource
            },
            _ => return Ok(None),
        };

        self.transition(next);
        self.tracker.reset();
        if actions::turn_around(&mut self.rig)? == ActionOutcome::Cancelled {
            return self.enter_idle(IdleReason::Cancelled).map(Some);
        }
        self.stats.turn_arounds += 1;
        Ok(Some(self.state))
    }

    fn enter_idle(&mut self, reason: IdleReason) -> Result<RobotState, ControlError> {
        match reason {
            IdleReason::Cancelled => info!("Cancelled in {}, going idle", self.state),
            IdleReason::LineLost => warn!("Line lost in {}, going idle", self.state),
        }
        self.transition(RobotState::Idle);
        self.idle_reason = Some(reason);
        self.stats.idle_entries += 1;
        self.tracker.reset();

        self.rig.stop_all()?;
        let status = match reason {
            IdleReason::Cancelled => Status::Stopped,
            IdleReason::LineLost => Status::Lost,
        };
        self.rig.set_status(status)?;
        Ok(RobotState::Idle)
    }

    fn transition(&mut self, next: RobotState) {
        if self.state != next {
            info!("State: {} -> {}", self.state, next);
            self.state = next;
        }
    }
}
