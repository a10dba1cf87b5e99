//! 主机状态灯（brick-status LED）

use std::path::Path;

use linebot_protocol::{LedColor, Side};

use super::sysfs::{self, Device};
use crate::{HalError, Status, StatusIndicator};

const CLASS: &str = "leds";

/// 单侧的红、绿两颗灯珠
#[derive(Debug)]
struct LedGroup {
    red: Device,
    green: Device,
    max_brightness: i32,
}

impl LedGroup {
    fn open(root: &Path, index: u8) -> Result<Self, HalError> {
        let red = sysfs::open_named(root, CLASS, &format!("led{}:red:brick-status", index))?;
        let green = sysfs::open_named(root, CLASS, &format!("led{}:green:brick-status", index))?;
        let max_brightness = red.read_i32("max_brightness")?;
        Ok(Self {
            red,
            green,
            max_brightness,
        })
    }

    fn set(&self, color: LedColor) -> Result<(), HalError> {
        let (red, green) = color.mix();
        let level = |x: f32| (x * self.max_brightness as f32).round() as i32;
        self.red.write("brightness", level(red))?;
        self.green.write("brightness", level(green))
    }
}

/// EV3 主机两侧状态灯
#[derive(Debug)]
pub struct Ev3Leds {
    left: LedGroup,
    right: LedGroup,
}

impl Ev3Leds {
    pub fn open(root: &Path) -> Result<Self, HalError> {
        Ok(Self {
            left: LedGroup::open(root, 0)?,
            right: LedGroup::open(root, 1)?,
        })
    }

    fn group(&self, side: Side) -> &LedGroup {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }
}

impl StatusIndicator for Ev3Leds {
    fn set_status(&mut self, status: Status) -> Result<(), HalError> {
        let pair = status.led_pair();
        for side in [Side::Left, Side::Right] {
            self.group(side).set(pair.side(side))?;
        }
        Ok(())
    }
}
