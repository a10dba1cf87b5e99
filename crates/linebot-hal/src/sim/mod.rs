//! 仿真后端
//!
//! 无硬件依赖的替身实现：
//! - [`SimDrive`]：记录每条执行器命令，并跟踪每个通道当前生效的速度
//! - [`ScriptedColorSensor`] / [`CyclingColorSensor`]：按脚本或循环返回采样
//! - [`ScriptedTouchSensor`]：按脚本返回按钮状态
//! - [`SimIndicator`]：记录状态指示变化
//! - [`RecordingSleeper`]：记录暂停时长，不真正休眠
//!
//! 每个替身都可以通过 `handle()` 取得共享句柄，替身被移交给控制器之后，
//! 测试仍能从句柄检查记录。

mod clock;
mod drive;
mod indicator;
mod sensor;

pub use clock::{RecordingSleeper, SleepHandle};
pub use drive::{DriveEvent, SimDrive, SimDriveHandle};
pub use indicator::{IndicatorHandle, SimIndicator};
pub use sensor::{
    CyclingColorSensor, ScriptedColorSensor, ScriptedTouchSensor, SensorHandle, TouchHandle,
};

/// 典型地面采样（与默认分类阈值配套）
pub mod samples {
    use linebot_protocol::ColorSample;

    /// 黑线
    pub const BLACK: ColorSample = ColorSample::new(30, 30, 30);
    /// 白色地面
    pub const WHITE: ColorSample = ColorSample::new(120, 120, 120);
    /// 绿色标记
    pub const GREEN: ColorSample = ColorSample::new(40, 110, 30);
    /// 红色标记
    pub const RED: ColorSample = ColorSample::new(130, 50, 50);
    /// 强反光（蓝色通道饱和）
    pub const BRIGHT_WHITE: ColorSample = ColorSample::new(200, 200, 200);

    /// 无硬件运行时循环使用的采样序列
    pub const DEMO_CYCLE: [ColorSample; 5] = [BLACK, WHITE, GREEN, RED, BRIGHT_WHITE];
}
