//! lego-sensor 驱动

use std::path::Path;

use tracing::debug;

use super::sysfs::{self, Device};
use crate::{ColorSample, ColorSensor, HalError, TouchSensor};

const CLASS: &str = "lego-sensor";

/// RGB-RAW 模式下的默认满量程（与 ev3dev 官方库的 `red_max` 等默认值一致）
pub const DEFAULT_RGB_FULL_SCALE: [u32; 3] = [300, 300, 300];

/// EV3 颜色传感器（RGB-RAW 模式）
#[derive(Debug)]
pub struct Ev3ColorSensor {
    device: Device,
    full_scale: [u32; 3],
}

impl Ev3ColorSensor {
    pub fn open(root: &Path, address: &str) -> Result<Self, HalError> {
        let device = sysfs::find_device(root, CLASS, address)?;
        device.write("mode", "RGB-RAW")?;
        debug!("Opened color sensor {} in RGB-RAW mode", address);
        Ok(Self {
            device,
            full_scale: DEFAULT_RGB_FULL_SCALE,
        })
    }

    /// 使用白平衡标定得到的满量程
    pub fn with_full_scale(mut self, full_scale: [u32; 3]) -> Self {
        self.full_scale = full_scale;
        self
    }
}

impl ColorSensor for Ev3ColorSensor {
    fn read(&mut self) -> Result<ColorSample, HalError> {
        let mut raw = [0u32; 3];
        for (i, slot) in raw.iter_mut().enumerate() {
            *slot = self.device.read_i32(&format!("value{}", i))?.max(0) as u32;
        }
        Ok(ColorSample::from_raw(raw, self.full_scale))
    }
}

/// EV3 触碰传感器
#[derive(Debug)]
pub struct Ev3TouchSensor {
    device: Device,
}

impl Ev3TouchSensor {
    pub fn open(root: &Path, address: &str) -> Result<Self, HalError> {
        let device = sysfs::find_device(root, CLASS, address)?;
        debug!("Opened touch sensor {}", address);
        Ok(Self { device })
    }
}

impl TouchSensor for Ev3TouchSensor {
    fn is_pressed(&mut self) -> Result<bool, HalError> {
        Ok(self.device.read_i32("value0")? != 0)
    }
}
