//! 进程级守护循环
//!
//! 反复执行"等待按钮 → 重新开始 → 搬运直到 Idle"，直到关机标志置位。
//! 任何错误都会先无条件停止执行器并切换到错误指示，然后再向上传播。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use linebot_protocol::Status;
use tracing::{error, info};

use crate::error::ControlError;
use crate::machine::TransportStateMachine;

/// 守护循环
pub struct Supervisor {
    machine: TransportStateMachine,
    max_runs: Option<u32>,
    runs: u32,
}

impl Supervisor {
    pub fn new(machine: TransportStateMachine) -> Self {
        Self {
            machine,
            max_runs: None,
            runs: 0,
        }
    }

    /// 最多执行 `runs` 轮搬运后退出
    pub fn with_max_runs(mut self, runs: u32) -> Self {
        self.max_runs = Some(runs);
        self
    }

    pub fn machine(&self) -> &TransportStateMachine {
        &self.machine
    }

    /// 已完成的轮数
    pub fn runs(&self) -> u32 {
        self.runs
    }

    /// 运行直到关机或达到轮数上限，返回完成的轮数
    ///
    /// 退出时停止全部执行器并显示 `Stopped`。
    pub fn run(&mut self, shutdown: Arc<AtomicBool>) -> Result<u32, ControlError> {
        self.machine.use_shutdown_flag(Arc::clone(&shutdown));

        while !shutdown.load(Ordering::SeqCst) && !self.limit_reached() {
            match self.run_once() {
                Ok(true) => self.runs += 1,
                Ok(false) => break,
                Err(e) => {
                    error!("Control loop failed: {}", e);
                    self.guard();
                    return Err(e);
                },
            }
        }

        info!("Shutting down after {} runs", self.runs);
        self.machine.stop_all()?;
        self.machine.set_status(Status::Stopped)?;
        Ok(self.runs)
    }

    fn limit_reached(&self) -> bool {
        self.max_runs.is_some_and(|max| self.runs >= max)
    }

    /// 执行一轮；等待期间收到关机信号时返回 `false`
    fn run_once(&mut self) -> Result<bool, ControlError> {
        if !self.machine.wait_for_start()? {
            return Ok(false);
        }
        self.machine.restart()?;
        self.machine.run_until_idle()?;

        let stats = self.machine.stats();
        info!(
            "Run {} finished ({:?}): {} pickups, {} drops, {} ticks",
            self.runs + 1,
            self.machine.idle_reason(),
            stats.pickups,
            stats.drops,
            stats.ticks
        );
        self.machine.wait_for_release()?;
        Ok(true)
    }

    /// 出错后的兜底：停止执行器、显示错误，失败只记录日志
    fn guard(&mut self) {
        if let Err(e) = self.machine.stop_all() {
            error!("Emergency stop failed: {}", e);
        }
        if let Err(e) = self.machine.set_status(Status::Error) {
            error!("Failed to show error status: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::rig::Hardware;
    use linebot_hal::sim::{
        CyclingColorSensor, ScriptedColorSensor, ScriptedTouchSensor, SimDrive, SimIndicator,
        samples,
    };
    use linebot_hal::{Channel, NoopSleeper};

    #[test]
    fn test_runs_until_max_and_stops() {
        // 每轮：按下启动，几次巡线后再按下取消
        let button = ScriptedTouchSensor::new(
            [true, false, false, false, true, false, true, false, false, false, true, false],
            false,
        );
        let drive = SimDrive::new();
        let leds = SimIndicator::new();
        let (dh, lh) = (drive.handle(), leds.handle());
        let hw = Hardware::new(
            drive,
            CyclingColorSensor::new([samples::BLACK]),
            ScriptedColorSensor::constant(samples::BLACK),
            button,
            leds,
        )
        .with_sleeper(NoopSleeper);
        let machine = TransportStateMachine::new(hw, Config::default()).unwrap();

        let mut supervisor = Supervisor::new(machine).with_max_runs(2);
        let runs = supervisor.run(Arc::new(AtomicBool::new(false))).unwrap();
        assert_eq!(runs, 2);
        assert!(dh.all_stopped());
        assert_eq!(lh.current(), Status::Stopped);
        assert_eq!(lh.count(Status::Ready), 2);
    }

    #[test]
    fn test_error_stops_everything_and_shows_error() {
        let drive = SimDrive::new();
        let leds = SimIndicator::new();
        let (dh, lh) = (drive.handle(), leds.handle());
        dh.inject_fault(Channel::LeftWheel);
        let hw = Hardware::new(
            drive,
            ScriptedColorSensor::constant(samples::BLACK),
            ScriptedColorSensor::constant(samples::BLACK),
            ScriptedTouchSensor::click(),
            leds,
        )
        .with_sleeper(NoopSleeper);
        let machine = TransportStateMachine::new(hw, Config::default()).unwrap();

        let mut supervisor = Supervisor::new(machine);
        let err = supervisor.run(Arc::new(AtomicBool::new(false))).unwrap_err();
        assert!(matches!(err, ControlError::Hal(_)));
        assert!(dh.all_stopped());
        assert_eq!(lh.current(), Status::Error);
    }

    #[test]
    fn test_shutdown_before_start() {
        let hw = Hardware::new(
            SimDrive::new(),
            ScriptedColorSensor::constant(samples::BLACK),
            ScriptedColorSensor::constant(samples::BLACK),
            ScriptedTouchSensor::never(),
            SimIndicator::new(),
        )
        .with_sleeper(NoopSleeper);
        let machine = TransportStateMachine::new(hw, Config::default()).unwrap();
        let mut supervisor = Supervisor::new(machine);
        assert_eq!(supervisor.run(Arc::new(AtomicBool::new(true))).unwrap(), 0);
    }
}
