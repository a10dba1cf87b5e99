//! # ev3dev 后端
//!
//! 通过 ev3dev 内核驱动的 sysfs 接口访问 EV3 电机、传感器和状态灯。
//!
//! 设备按端口地址查找（`/sys/class/tacho-motor/*/address` 等），
//! 根目录可配置，测试时指向临时目录中的假 sysfs 树。

mod led;
mod motor;
mod sensor;
mod sysfs;

use std::path::PathBuf;
use std::time::Duration;

use tracing::info;

pub use led::Ev3Leds;
pub use motor::{Ev3Drive, TachoMotor};
pub use sensor::{DEFAULT_RGB_FULL_SCALE, Ev3ColorSensor, Ev3TouchSensor};

use crate::HalError;

/// 默认 sysfs 根目录
pub const DEFAULT_SYSFS_ROOT: &str = "/sys/class";

/// 端口分配
#[derive(Debug, Clone)]
pub struct Ev3Ports {
    /// sysfs 根目录
    pub root: PathBuf,
    pub left_wheel: String,
    pub right_wheel: String,
    pub lift: String,
    pub touch: String,
    pub left_color: String,
    pub right_color: String,
    /// 定角运行的最长等待时间
    pub angle_timeout: Duration,
}

impl Default for Ev3Ports {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_SYSFS_ROOT),
            left_wheel: "ev3-ports:outA".to_string(),
            right_wheel: "ev3-ports:outB".to_string(),
            lift: "ev3-ports:outC".to_string(),
            touch: "ev3-ports:in1".to_string(),
            left_color: "ev3-ports:in3".to_string(),
            right_color: "ev3-ports:in2".to_string(),
            angle_timeout: Duration::from_secs(10),
        }
    }
}

/// 打开的全部 EV3 设备
#[derive(Debug)]
pub struct Ev3Hardware {
    pub drive: Ev3Drive,
    pub left_color: Ev3ColorSensor,
    pub right_color: Ev3ColorSensor,
    pub touch: Ev3TouchSensor,
    pub leds: Ev3Leds,
}

impl Ev3Hardware {
    pub fn open(ports: &Ev3Ports) -> Result<Self, HalError> {
        let root = ports.root.as_path();
        let drive = Ev3Drive::new(
            TachoMotor::open(root, &ports.left_wheel)?,
            TachoMotor::open(root, &ports.right_wheel)?,
            TachoMotor::open(root, &ports.lift)?,
            ports.angle_timeout,
        );
        let hw = Self {
            drive,
            left_color: Ev3ColorSensor::open(root, &ports.left_color)?,
            right_color: Ev3ColorSensor::open(root, &ports.right_color)?,
            touch: Ev3TouchSensor::open(root, &ports.touch)?,
            leds: Ev3Leds::open(root)?,
        };
        info!("EV3 hardware opened under {}", root.display());
        Ok(hw)
    }

    /// 只打开驱动电机（急停工具使用）
    pub fn open_drive(ports: &Ev3Ports) -> Result<Ev3Drive, HalError> {
        let root = ports.root.as_path();
        Ok(Ev3Drive::new(
            TachoMotor::open(root, &ports.left_wheel)?,
            TachoMotor::open(root, &ports.right_wheel)?,
            TachoMotor::open(root, &ports.lift)?,
            ports.angle_timeout,
        ))
    }
}
