//! 颜色分类
//!
//! 把一次 RGB 采样映射为离散颜色标签。各颜色的阈值区间相互重叠，
//! 因此判定顺序本身就是约定的一部分（先命中者优先）：
//!
//! 1. 读取失败 → `Unknown`
//! 2. 蓝色通道高于 `blue_bright` → `White`（反光表面的蓝色通道最强）
//! 3. 绿色通道高于 `green_high` → `Green`
//! 4. 红色通道低于 `red_low` → `Black`
//! 5. 红色通道高于 `red_high` → `Red`
//! 6. 其他 → `White`

use linebot_hal::HalError;
use linebot_protocol::{ColorLabel, ColorSample};

use crate::config::ClassifierThresholds;

/// 颜色分类器（纯函数，无内部状态）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColorClassifier {
    thresholds: ClassifierThresholds,
}

impl ColorClassifier {
    pub fn new(thresholds: ClassifierThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ClassifierThresholds {
        &self.thresholds
    }

    /// 对有效采样分类，永远不会返回 `Unknown`
    pub fn classify(&self, sample: ColorSample) -> ColorLabel {
        let t = &self.thresholds;
        if sample.blue > t.blue_bright {
            ColorLabel::White
        } else if sample.green > t.green_high {
            ColorLabel::Green
        } else if sample.red < t.red_low {
            ColorLabel::Black
        } else if sample.red > t.red_high {
            ColorLabel::Red
        } else {
            ColorLabel::White
        }
    }

    /// 对一次读取结果分类，读取失败返回 `Unknown`
    pub fn classify_reading(&self, reading: &Result<ColorSample, HalError>) -> ColorLabel {
        match reading {
            Ok(sample) => self.classify(*sample),
            Err(_) => ColorLabel::Unknown,
        }
    }
}
