//! 硬件句柄与感知
//!
//! [`Hardware`] 把注入的执行器、传感器、指示灯、暂停实现打包在一起；
//! [`Rig`] 在此之上加入配置、分类器和关机标志，给巡线、恢复、取放货动作提供
//! 统一的"采样 / 下发 / 暂停 / 检查取消"操作。
//!
//! 所有硬件由一个 `Rig` 独占，控制循环通过 `&mut` 访问，不需要锁。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use linebot_hal::{
    Channel, ColorSensor, DriveActuator, DriveCommand, HalError, Sleeper, SpinSleeper,
    StatusIndicator, TouchSensor,
};
use linebot_protocol::{ColorLabel, Side, Status};
use tracing::{error, info, warn};

use crate::classifier::ColorClassifier;
use crate::config::Config;
use crate::error::ControlError;

/// 注入的硬件能力
pub struct Hardware {
    pub drive: Box<dyn DriveActuator>,
    pub left_eye: Box<dyn ColorSensor>,
    pub right_eye: Box<dyn ColorSensor>,
    pub button: Box<dyn TouchSensor>,
    pub indicator: Box<dyn StatusIndicator>,
    pub sleeper: Box<dyn Sleeper>,
}

impl Hardware {
    /// 默认使用 [`SpinSleeper`] 暂停
    pub fn new(
        drive: impl DriveActuator + 'static,
        left_eye: impl ColorSensor + 'static,
        right_eye: impl ColorSensor + 'static,
        button: impl TouchSensor + 'static,
        indicator: impl StatusIndicator + 'static,
    ) -> Self {
        Self {
            drive: Box::new(drive),
            left_eye: Box::new(left_eye),
            right_eye: Box::new(right_eye),
            button: Box::new(button),
            indicator: Box::new(indicator),
            sleeper: Box::new(SpinSleeper),
        }
    }

    /// 替换暂停实现
    pub fn with_sleeper(mut self, sleeper: impl Sleeper + 'static) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }
}

/// 控制循环使用的硬件上下文
pub struct Rig {
    hw: Hardware,
    config: Config,
    classifier: ColorClassifier,
    shutdown: Arc<AtomicBool>,
    /// 上一次采样是否有传感器故障
    sensor_fault: bool,
    /// 最近一次请求的状态，传感器故障恢复后重新显示
    status: Status,
}

impl Rig {
    pub fn new(hw: Hardware, config: Config) -> Self {
        let classifier = ColorClassifier::new(config.classifier);
        Self {
            hw,
            config,
            classifier,
            shutdown: Arc::new(AtomicBool::new(false)),
            sensor_fault: false,
            status: Status::Default,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn classifier(&self) -> &ColorClassifier {
        &self.classifier
    }

    /// 关机标志（由 Ctrl-C 处理器置位）
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    pub fn use_shutdown_flag(&mut self, flag: Arc<AtomicBool>) {
        self.shutdown = flag;
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// 读取并分类左右两个传感器
    ///
    /// 两次读取都完成后才返回，调用方基于同一对读数做决策。
    /// 读取失败记为 `Unknown`，记录日志并切换到错误指示。
    pub fn sample(&mut self) -> Result<(ColorLabel, ColorLabel), ControlError> {
        let left = self.hw.left_eye.read();
        let right = self.hw.right_eye.read();
        let labels = (
            self.classifier.classify_reading(&left),
            self.classifier.classify_reading(&right),
        );

        let mut faulted = false;
        for (side, reading) in [("left", &left), ("right", &right)] {
            if let Err(e) = reading {
                error!("Sensor read error ({}): {}", side, e);
                faulted = true;
            }
        }
        self.note_sensor_health(faulted)?;
        Ok(labels)
    }

    /// 只读取一侧传感器（取货对准时轮询使用）
    pub fn sample_side(&mut self, side: Side) -> Result<ColorLabel, ControlError> {
        let reading = match side {
            Side::Left => self.hw.left_eye.read(),
            Side::Right => self.hw.right_eye.read(),
        };
        if let Err(e) = &reading {
            error!("Sensor read error ({}): {}", side, e);
        }
        self.note_sensor_health(reading.is_err())?;
        Ok(self.classifier.classify_reading(&reading))
    }

    fn note_sensor_health(&mut self, faulted: bool) -> Result<(), ControlError> {
        if faulted {
            self.hw.indicator.set_status(Status::Error)?;
        } else if self.sensor_fault {
            info!("Color sensors healthy again, back to {}", self.status);
            self.hw.indicator.set_status(self.status)?;
        }
        self.sensor_fault = faulted;
        Ok(())
    }

    /// 下发左右轮命令（替换之前的命令）
    pub fn drive(&mut self, command: DriveCommand) -> Result<(), ControlError> {
        self.hw.drive.drive(command)?;
        Ok(())
    }

    pub fn stop_wheels(&mut self) -> Result<(), ControlError> {
        for channel in Channel::WHEELS {
            self.hw.drive.stop(channel)?;
        }
        Ok(())
    }

    /// 升降机构转过固定角度（阻塞）
    pub fn run_lift(&mut self, speed: f32, degrees: u32) -> Result<(), ControlError> {
        self.hw
            .drive
            .run_for_angle(Channel::Lift, speed.into(), degrees)?;
        Ok(())
    }

    /// 停止全部执行器
    ///
    /// 即使某个通道失败也会继续尝试其余通道，返回第一个错误。
    pub fn stop_all(&mut self) -> Result<(), ControlError> {
        let mut first_error: Option<HalError> = None;
        for channel in Channel::ALL {
            if let Err(e) = self.hw.drive.stop(channel) {
                error!("Failed to stop {}: {}", channel, e);
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    pub fn set_status(&mut self, status: Status) -> Result<(), ControlError> {
        self.status = status;
        self.hw.indicator.set_status(status)?;
        Ok(())
    }

    /// 最近一次请求的状态（不含传感器故障时临时显示的 `Error`）
    pub fn status(&self) -> Status {
        self.status
    }

    pub fn pause(&mut self, duration: Duration) {
        self.hw.sleeper.sleep(duration);
    }

    /// 原始按钮状态
    pub fn button_pressed(&mut self) -> Result<bool, ControlError> {
        Ok(self.hw.button.is_pressed()?)
    }

    /// 取消检查点
    ///
    /// 关机标志置位或按钮按下时返回 true；按钮读取失败按"已按下"处理。
    pub fn cancel_requested(&mut self) -> bool {
        if self.shutdown_requested() {
            return true;
        }
        match self.hw.button.is_pressed() {
            Ok(pressed) => pressed,
            Err(e) => {
                warn!("Button read failed, treating as pressed: {}", e);
                true
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linebot_hal::NoopSleeper;
    use linebot_hal::sim::{
        IndicatorHandle, ScriptedColorSensor, ScriptedTouchSensor, SimDrive, SimDriveHandle,
        SimIndicator, samples,
    };

    fn make_rig(
        left: ScriptedColorSensor,
        right: ScriptedColorSensor,
        button: ScriptedTouchSensor,
    ) -> (Rig, SimDriveHandle, IndicatorHandle) {
        let drive = SimDrive::new();
        let leds = SimIndicator::new();
        let (dh, lh) = (drive.handle(), leds.handle());
        let hw = Hardware::new(drive, left, right, button, leds).with_sleeper(NoopSleeper);
        (Rig::new(hw, Config::default()), dh, lh)
    }

    #[test]
    fn test_sample_reads_both_sides() {
        let (mut rig, _, _) = make_rig(
            ScriptedColorSensor::constant(samples::BLACK),
            ScriptedColorSensor::constant(samples::RED),
            ScriptedTouchSensor::never(),
        );
        assert_eq!(rig.sample().unwrap(), (ColorLabel::Black, ColorLabel::Red));
    }

    #[test]
    fn test_sensor_fault_sets_error_then_restores_previous_status() {
        let (mut rig, _, leds) = make_rig(
            ScriptedColorSensor::new([samples::WHITE])
                .then_fault()
                .then(samples::BLACK, 1),
            ScriptedColorSensor::constant(samples::WHITE),
            ScriptedTouchSensor::never(),
        );
        rig.set_status(Status::Lost).unwrap();
        assert_eq!(rig.sample().unwrap(), (ColorLabel::White, ColorLabel::White));
        assert_eq!(rig.sample().unwrap(), (ColorLabel::Unknown, ColorLabel::White));
        assert_eq!(leds.current(), Status::Error);
        assert_eq!(rig.status(), Status::Lost);
        assert_eq!(rig.sample().unwrap(), (ColorLabel::Black, ColorLabel::White));
        assert_eq!(leds.current(), Status::Lost);
        assert_eq!(leds.history(), vec![Status::Lost, Status::Error, Status::Lost]);
    }

    #[test]
    fn test_single_side_fault_restores_pickup_status() {
        let (mut rig, _, leds) = make_rig(
            ScriptedColorSensor::new([samples::WHITE])
                .then_fault()
                .then(samples::BLACK, 1),
            ScriptedColorSensor::constant(samples::RED),
            ScriptedTouchSensor::never(),
        );
        rig.set_status(Status::Pickup).unwrap();
        assert_eq!(rig.sample_side(Side::Left).unwrap(), ColorLabel::White);
        assert_eq!(rig.sample_side(Side::Left).unwrap(), ColorLabel::Unknown);
        assert_eq!(rig.sample_side(Side::Left).unwrap(), ColorLabel::Black);
        assert_eq!(
            leds.history(),
            vec![Status::Pickup, Status::Error, Status::Pickup]
        );
    }

    #[test]
    fn test_stop_all_stops_every_channel() {
        let (mut rig, drive, _) = make_rig(
            ScriptedColorSensor::constant(samples::BLACK),
            ScriptedColorSensor::constant(samples::BLACK),
            ScriptedTouchSensor::never(),
        );
        rig.drive(DriveCommand::straight(10.0)).unwrap();
        assert!(!drive.all_stopped());
        rig.stop_all().unwrap();
        assert!(drive.all_stopped());
    }

    #[test]
    fn test_cancel_requested_by_button_or_shutdown() {
        let (mut rig, _, _) = make_rig(
            ScriptedColorSensor::constant(samples::BLACK),
            ScriptedColorSensor::constant(samples::BLACK),
            ScriptedTouchSensor::pressed_from(1),
        );
        assert!(!rig.cancel_requested());
        assert!(rig.cancel_requested());

        let (mut rig, _, _) = make_rig(
            ScriptedColorSensor::constant(samples::BLACK),
            ScriptedColorSensor::constant(samples::BLACK),
            ScriptedTouchSensor::never(),
        );
        rig.shutdown_flag().store(true, Ordering::SeqCst);
        assert!(rig.cancel_requested());
    }
}
