//! 集成测试公共设施
//!
//! 用仿真后端组装一台完整的搬运状态机，并保留各替身的共享句柄。

#![allow(dead_code)]

use linebot_control::{Config, Hardware, TransportStateMachine};
use linebot_hal::sim::{
    IndicatorHandle, RecordingSleeper, ScriptedColorSensor, ScriptedTouchSensor, SensorHandle,
    SimDrive, SimDriveHandle, SimIndicator, SleepHandle, TouchHandle,
};

/// 测试日志（`RUST_LOG=linebot=debug cargo test` 查看控制循环遥测）
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// 仿真台架
pub struct Bench {
    pub machine: TransportStateMachine,
    pub drive: SimDriveHandle,
    pub leds: IndicatorHandle,
    pub clock: SleepHandle,
    pub left: SensorHandle,
    pub right: SensorHandle,
    pub button: TouchHandle,
}

impl Bench {
    pub fn new(
        left: ScriptedColorSensor,
        right: ScriptedColorSensor,
        button: ScriptedTouchSensor,
    ) -> Self {
        Self::with_config(left, right, button, Config::default())
    }

    pub fn with_config(
        left: ScriptedColorSensor,
        right: ScriptedColorSensor,
        button: ScriptedTouchSensor,
        config: Config,
    ) -> Self {
        init_tracing();
        let drive = SimDrive::new();
        let leds = SimIndicator::new();
        let sleeper = RecordingSleeper::new();

        let handles = (
            drive.handle(),
            leds.handle(),
            sleeper.handle(),
            left.handle(),
            right.handle(),
            button.handle(),
        );
        let hw = Hardware::new(drive, left, right, button, leds).with_sleeper(sleeper);
        let machine = TransportStateMachine::new(hw, config).expect("valid config");

        Self {
            machine,
            drive: handles.0,
            leds: handles.1,
            clock: handles.2,
            left: handles.3,
            right: handles.4,
            button: handles.5,
        }
    }

    /// 重新开始（`Idle → ToSource`）后返回自身
    pub fn started(mut self) -> Self {
        self.machine.restart().expect("restart from idle");
        self
    }
}
