//! 脚本化传感器

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::{ColorSample, ColorSensor, DeviceError, DeviceErrorKind, HalError, TouchSensor};

#[derive(Debug)]
struct ColorScript {
    /// `None` 表示该次读取失败
    queue: VecDeque<Option<ColorSample>>,
    /// 脚本耗尽后重复的读数
    rest: Option<ColorSample>,
    reads: usize,
}

/// 按脚本返回采样的颜色传感器
///
/// 脚本耗尽后重复最后一个成功读数（或 `rest` 设定的读数）。
#[derive(Debug)]
pub struct ScriptedColorSensor {
    script: Arc<Mutex<ColorScript>>,
}

impl ScriptedColorSensor {
    pub fn new(samples: impl IntoIterator<Item = ColorSample>) -> Self {
        let queue: VecDeque<_> = samples.into_iter().map(Some).collect();
        let rest = queue.back().copied().flatten();
        Self {
            script: Arc::new(Mutex::new(ColorScript {
                queue,
                rest,
                reads: 0,
            })),
        }
    }

    /// 始终返回同一读数
    pub fn constant(sample: ColorSample) -> Self {
        Self::new([sample])
    }

    /// 追加若干次相同读数
    pub fn then(self, sample: ColorSample, times: usize) -> Self {
        {
            let mut script = self.script.lock();
            script.queue.extend(std::iter::repeat_n(Some(sample), times));
            script.rest = Some(sample);
        }
        self
    }

    /// 追加一次读取失败
    pub fn then_fault(self) -> Self {
        self.script.lock().queue.push_back(None);
        self
    }

    /// 脚本耗尽后重复的读数
    pub fn rest(self, sample: ColorSample) -> Self {
        self.script.lock().rest = Some(sample);
        self
    }

    pub fn handle(&self) -> SensorHandle {
        SensorHandle {
            script: Arc::clone(&self.script),
        }
    }
}

impl ColorSensor for ScriptedColorSensor {
    fn read(&mut self) -> Result<ColorSample, HalError> {
        let mut script = self.script.lock();
        script.reads += 1;
        match script.queue.pop_front() {
            Some(Some(sample)) => Ok(sample),
            Some(None) => Err(DeviceError::new(
                DeviceErrorKind::Injected,
                "scripted color sensor fault",
            )
            .into()),
            None => script.rest.ok_or_else(|| {
                DeviceError::new(DeviceErrorKind::InvalidResponse, "empty color script").into()
            }),
        }
    }
}

/// [`ScriptedColorSensor`] 的共享句柄
#[derive(Debug, Clone)]
pub struct SensorHandle {
    script: Arc<Mutex<ColorScript>>,
}

impl SensorHandle {
    /// 已读取次数
    pub fn reads(&self) -> usize {
        self.script.lock().reads
    }

    /// 尚未消费的脚本条目数
    pub fn remaining(&self) -> usize {
        self.script.lock().queue.len()
    }
}

/// 循环返回固定序列的颜色传感器
#[derive(Debug, Clone)]
pub struct CyclingColorSensor {
    samples: Vec<ColorSample>,
    cursor: usize,
}

impl CyclingColorSensor {
    /// `samples` 为空时每次读取都失败
    pub fn new(samples: impl IntoIterator<Item = ColorSample>) -> Self {
        Self {
            samples: samples.into_iter().collect(),
            cursor: 0,
        }
    }

    /// 从序列的指定位置开始
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.cursor = offset;
        self
    }
}

impl ColorSensor for CyclingColorSensor {
    fn read(&mut self) -> Result<ColorSample, HalError> {
        if self.samples.is_empty() {
            return Err(DeviceError::new(DeviceErrorKind::InvalidResponse, "no samples").into());
        }
        let sample = self.samples[self.cursor % self.samples.len()];
        self.cursor = self.cursor.wrapping_add(1);
        Ok(sample)
    }
}

#[derive(Debug)]
struct TouchScript {
    queue: VecDeque<bool>,
    rest: bool,
    polls: usize,
}

/// 按脚本返回按压状态的按钮
#[derive(Debug)]
pub struct ScriptedTouchSensor {
    script: Arc<Mutex<TouchScript>>,
}

impl ScriptedTouchSensor {
    /// 先依次返回 `script`，之后一直返回 `rest`
    pub fn new(script: impl IntoIterator<Item = bool>, rest: bool) -> Self {
        Self {
            script: Arc::new(Mutex::new(TouchScript {
                queue: script.into_iter().collect(),
                rest,
                polls: 0,
            })),
        }
    }

    /// 从不按下
    pub fn never() -> Self {
        Self::new([], false)
    }

    /// 第 `poll` 次查询（从 0 开始）时按下，之后保持按下
    pub fn pressed_from(poll: usize) -> Self {
        Self::new(std::iter::repeat_n(false, poll), true)
    }

    /// 按下并松开一次，之后不再按下
    pub fn click() -> Self {
        Self::new([true, false], false)
    }

    pub fn handle(&self) -> TouchHandle {
        TouchHandle {
            script: Arc::clone(&self.script),
        }
    }
}

impl TouchSensor for ScriptedTouchSensor {
    fn is_pressed(&mut self) -> Result<bool, HalError> {
        let mut script = self.script.lock();
        script.polls += 1;
        Ok(script.queue.pop_front().unwrap_or(script.rest))
    }
}

/// [`ScriptedTouchSensor`] 的共享句柄
#[derive(Debug, Clone)]
pub struct TouchHandle {
    script: Arc<Mutex<TouchScript>>,
}

impl TouchHandle {
    /// 已查询次数
    pub fn polls(&self) -> usize {
        self.script.lock().polls
    }

    /// 追加脚本（例如在一轮搬运结束后安排下一次按压）
    pub fn push(&self, pressed: impl IntoIterator<Item = bool>) {
        self.script.lock().queue.extend(pressed);
    }

    /// 修改脚本耗尽后的返回值
    pub fn set_rest(&self, pressed: bool) {
        self.script.lock().rest = pressed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::samples::{BLACK, RED, WHITE};

    #[test]
    fn test_scripted_sensor_repeats_last() {
        let mut sensor = ScriptedColorSensor::new([WHITE, BLACK]);
        let handle = sensor.handle();
        assert_eq!(sensor.read().unwrap(), WHITE);
        assert_eq!(sensor.read().unwrap(), BLACK);
        assert_eq!(sensor.read().unwrap(), BLACK);
        assert_eq!(handle.reads(), 3);
        assert_eq!(handle.remaining(), 0);
    }

    #[test]
    fn test_scripted_sensor_builder() {
        let mut sensor = ScriptedColorSensor::new([WHITE]).then(RED, 2).then_fault();
        assert_eq!(sensor.read().unwrap(), WHITE);
        assert_eq!(sensor.read().unwrap(), RED);
        assert_eq!(sensor.read().unwrap(), RED);
        assert!(sensor.read().is_err());
        // 故障之后回到最后设定的读数
        assert_eq!(sensor.read().unwrap(), RED);
    }

    #[test]
    fn test_empty_script_fails() {
        let mut sensor = ScriptedColorSensor::new([]);
        assert!(sensor.read().is_err());
        let mut sensor = ScriptedColorSensor::new([]).rest(BLACK);
        assert_eq!(sensor.read().unwrap(), BLACK);
    }

    #[test]
    fn test_cycling_sensor_wraps() {
        let mut sensor = CyclingColorSensor::new([BLACK, WHITE]).with_offset(1);
        assert_eq!(sensor.read().unwrap(), WHITE);
        assert_eq!(sensor.read().unwrap(), BLACK);
        assert_eq!(sensor.read().unwrap(), WHITE);
        assert!(CyclingColorSensor::new([]).read().is_err());
    }

    #[test]
    fn test_touch_script() {
        let mut button = ScriptedTouchSensor::pressed_from(2);
        let handle = button.handle();
        assert!(!button.is_pressed().unwrap());
        assert!(!button.is_pressed().unwrap());
        assert!(button.is_pressed().unwrap());
        assert!(button.is_pressed().unwrap());
        assert_eq!(handle.polls(), 4);

        let mut click = ScriptedTouchSensor::click();
        assert!(click.is_pressed().unwrap());
        assert!(!click.is_pressed().unwrap());
        assert!(!click.is_pressed().unwrap());
    }
}
