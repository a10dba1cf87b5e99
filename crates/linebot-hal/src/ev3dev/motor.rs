//! tacho-motor 驱动

use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::sysfs::{self, Device};
use crate::{Channel, DriveActuator, HalError, Speed};

const CLASS: &str = "tacho-motor";
/// 定角运行时轮询 `state` 的间隔
const STATE_POLL: Duration = Duration::from_millis(10);

/// 单个 tacho 电机
#[derive(Debug)]
pub struct TachoMotor {
    device: Device,
    /// 满速对应的 `speed_sp`（度/秒）
    max_speed: i32,
}

impl TachoMotor {
    /// 按端口地址打开电机（如 `ev3-ports:outA`）
    pub fn open(root: &Path, address: &str) -> Result<Self, HalError> {
        let device = sysfs::find_device(root, CLASS, address)?;
        let max_speed = device.read_i32("max_speed")?;
        device.write("stop_action", "coast")?;
        debug!(
            "Opened tacho motor {} at {} (max_speed {})",
            address,
            device.path().display(),
            max_speed
        );
        Ok(Self { device, max_speed })
    }

    /// 百分比速度换算为 `speed_sp`
    fn speed_sp(&self, speed: Speed) -> i32 {
        (speed.percent() / Speed::MAX_PERCENT * self.max_speed as f32).round() as i32
    }

    pub fn run_forever(&mut self, speed: Speed) -> Result<(), HalError> {
        self.device.write("speed_sp", self.speed_sp(speed))?;
        self.device.write("command", "run-forever")
    }

    pub fn stop(&mut self) -> Result<(), HalError> {
        self.device.write("command", "stop")
    }

    /// 相对转动 `degrees` 度，阻塞直到电机不再处于 running 状态
    ///
    /// 负速度表示反向转动。
    pub fn run_for_degrees(
        &mut self,
        speed: Speed,
        degrees: u32,
        timeout: Duration,
    ) -> Result<(), HalError> {
        let sp = self.speed_sp(speed);
        let position = if sp < 0 {
            -(degrees as i64)
        } else {
            degrees as i64
        };
        self.device.write("speed_sp", sp.abs())?;
        self.device.write("position_sp", position)?;
        self.device.write("command", "run-to-rel-pos")?;

        let start = Instant::now();
        loop {
            let state = self.device.read_string("state")?;
            if !state.split_whitespace().any(|flag| flag == "running") {
                return Ok(());
            }
            if start.elapsed() >= timeout {
                warn!(
                    "Motor {} still running after {:?}, stopping",
                    self.device.path().display(),
                    timeout
                );
                self.stop()?;
                return Err(HalError::Timeout {
                    timeout_ms: timeout.as_millis() as u64,
                });
            }
            spin_sleep::sleep(STATE_POLL);
        }
    }
}

/// 三通道驱动：左轮、右轮、升降
#[derive(Debug)]
pub struct Ev3Drive {
    left: TachoMotor,
    right: TachoMotor,
    lift: TachoMotor,
    angle_timeout: Duration,
}

impl Ev3Drive {
    pub fn new(
        left: TachoMotor,
        right: TachoMotor,
        lift: TachoMotor,
        angle_timeout: Duration,
    ) -> Self {
        Self {
            left,
            right,
            lift,
            angle_timeout,
        }
    }

    fn motor(&mut self, channel: Channel) -> &mut TachoMotor {
        match channel {
            Channel::LeftWheel => &mut self.left,
            Channel::RightWheel => &mut self.right,
            Channel::Lift => &mut self.lift,
        }
    }
}

impl DriveActuator for Ev3Drive {
    fn set_speed(&mut self, channel: Channel, speed: Speed) -> Result<(), HalError> {
        self.motor(channel).run_forever(speed)
    }

    fn stop(&mut self, channel: Channel) -> Result<(), HalError> {
        self.motor(channel).stop()
    }

    fn run_for_angle(
        &mut self,
        channel: Channel,
        speed: Speed,
        degrees: u32,
    ) -> Result<(), HalError> {
        let timeout = self.angle_timeout;
        self.motor(channel).run_for_degrees(speed, degrees, timeout)
    }
}
