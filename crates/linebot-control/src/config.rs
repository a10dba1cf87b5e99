//! 调参配置
//!
//! 所有调参常量集中在一个不可变的 [`Config`] 中，启动时加载一次，沿调用链传递。
//! 文件格式为 TOML，时长字段以毫秒为单位，缺省字段取默认值：
//!
//! ```toml
//! [markers]
//! source_color = "red"
//! target_color = "green"
//!
//! [drive]
//! base_speed = 10.0
//!
//! [lost_line]
//! threshold = 80
//! strategy = "backoff"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use linebot_protocol::ColorLabel;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML 解析失败
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML 序列化失败
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// 字段取值无效
    #[error("Invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// 完整配置
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub markers: MarkerConfig,
    pub drive: DriveConfig,
    pub lost_line: LostLineConfig,
    pub lift: LiftConfig,
    pub classifier: ClassifierThresholds,
    pub button: ButtonConfig,
}

impl Config {
    /// 从 TOML 文本解析并校验
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// 从文件加载并校验
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// 序列化为 TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// 校验取值范围
    pub fn validate(&self) -> Result<(), ConfigError> {
        let markers = &self.markers;
        if !markers.source_color.is_marker() {
            return Err(ConfigError::invalid(
                "markers.source_color",
                format!("{} is not a marker color", markers.source_color),
            ));
        }
        if !markers.target_color.is_marker() {
            return Err(ConfigError::invalid(
                "markers.target_color",
                format!("{} is not a marker color", markers.target_color),
            ));
        }
        if markers.source_color == markers.target_color {
            return Err(ConfigError::invalid(
                "markers.target_color",
                "source and target markers must differ",
            ));
        }

        let drive = &self.drive;
        if !(drive.base_speed > 0.0 && drive.base_speed <= 100.0) {
            return Err(ConfigError::invalid(
                "drive.base_speed",
                format!("{} is outside (0, 100]", drive.base_speed),
            ));
        }
        for (field, k) in [
            ("drive.k_correction_turn", drive.k_correction_turn),
            ("drive.k_centering_turn", drive.k_centering_turn),
        ] {
            if !(0.0..=1.0).contains(&k) {
                return Err(ConfigError::invalid(field, format!("{} is outside [0, 1]", k)));
            }
        }
        if drive.correction_step_limit == 0 {
            return Err(ConfigError::invalid(
                "drive.correction_step_limit",
                "must be at least 1",
            ));
        }

        if self.lost_line.iterations == 0 {
            return Err(ConfigError::invalid(
                "lost_line.iterations",
                "must be at least 1",
            ));
        }

        let lift = &self.lift;
        for (field, speed) in [
            ("lift.up_speed", lift.up_speed),
            ("lift.down_speed", lift.down_speed),
        ] {
            if !(-100.0..=100.0).contains(&speed) || speed == 0.0 {
                return Err(ConfigError::invalid(
                    field,
                    format!("{} must be non-zero and within [-100, 100]", speed),
                ));
            }
        }
        if lift.align_poll_limit == 0 {
            return Err(ConfigError::invalid(
                "lift.align_poll_limit",
                "must be at least 1",
            ));
        }

        let thresholds = &self.classifier;
        if thresholds.red_low > thresholds.red_high {
            return Err(ConfigError::invalid(
                "classifier.red_low",
                format!(
                    "red_low ({}) exceeds red_high ({})",
                    thresholds.red_low, thresholds.red_high
                ),
            ));
        }

        Ok(())
    }
}

/// 标记颜色
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkerConfig {
    /// 取货点颜色
    pub source_color: ColorLabel,
    /// 卸货点颜色
    pub target_color: ColorLabel,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            source_color: ColorLabel::Red,
            target_color: ColorLabel::Green,
        }
    }
}

/// 行驶与巡线参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DriveConfig {
    /// 基础速度（百分比）
    pub base_speed: f32,
    /// 修正转向时外侧轮反转速度系数（1.0 表示与内侧轮等速反向）
    pub k_correction_turn: f32,
    /// 回正转向速度系数
    pub k_centering_turn: f32,
    /// 主循环每个周期的暂停
    pub loop_step_ms: u64,
    /// 修正转向前的停车时间
    pub pre_turn_stop_ms: u64,
    /// 修正转向每一小步的时长
    pub correction_step_ms: u64,
    /// 单次修正转向的最大步数
    pub correction_step_limit: u32,
    /// 回正转向时长
    pub centering_turn_ms: u64,
    /// 原地掉头时长
    pub turn_around_ms: u64,
    /// 掉头后的静止时间
    pub turn_around_settle_ms: u64,
}

impl DriveConfig {
    pub fn loop_step(&self) -> Duration {
        Duration::from_millis(self.loop_step_ms)
    }

    pub fn pre_turn_stop(&self) -> Duration {
        Duration::from_millis(self.pre_turn_stop_ms)
    }

    pub fn correction_step(&self) -> Duration {
        Duration::from_millis(self.correction_step_ms)
    }

    pub fn centering_turn(&self) -> Duration {
        Duration::from_millis(self.centering_turn_ms)
    }

    pub fn turn_around(&self) -> Duration {
        Duration::from_millis(self.turn_around_ms)
    }

    pub fn turn_around_settle(&self) -> Duration {
        Duration::from_millis(self.turn_around_settle_ms)
    }
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            base_speed: 10.0,
            k_correction_turn: 1.0,
            k_centering_turn: 0.7,
            loop_step_ms: 10,
            pre_turn_stop_ms: 50,
            correction_step_ms: 20,
            correction_step_limit: 250,
            centering_turn_ms: 100,
            turn_around_ms: 1200,
            turn_around_settle_ms: 200,
        }
    }
}

/// 丢线恢复策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryStrategy {
    /// 每轮后退一小段再采样
    #[default]
    Backoff,
    /// 先后退一次，之后每轮左右摆动再采样
    Oscillate,
}

/// 丢线检测与恢复参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LostLineConfig {
    /// 连续丢线周期数超过此值时触发恢复
    pub threshold: u32,
    pub strategy: RecoveryStrategy,
    /// 恢复的最大轮数
    pub iterations: u32,
    /// 后退时长
    pub backup_ms: u64,
    /// 单向摆动时长（oscillate 策略）
    pub oscillate_ms: u64,
    /// 恢复过程中是否检查取消按钮
    pub interruptible: bool,
}

impl LostLineConfig {
    pub fn backup(&self) -> Duration {
        Duration::from_millis(self.backup_ms)
    }

    pub fn oscillate(&self) -> Duration {
        Duration::from_millis(self.oscillate_ms)
    }
}

impl Default for LostLineConfig {
    fn default() -> Self {
        Self {
            threshold: 80,
            strategy: RecoveryStrategy::Backoff,
            iterations: 20,
            backup_ms: 100,
            oscillate_ms: 200,
            interruptible: true,
        }
    }
}

/// 升降机构与取货对准参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LiftConfig {
    pub up_speed: f32,
    pub down_speed: f32,
    /// 升降行程（度）
    pub degrees: u32,
    /// 升降后的暂停
    pub pause_ms: u64,
    /// 抬升前向前行驶的时长
    pub approach_ms: u64,
    /// 对准转向时长
    pub align_turn_ms: u64,
    /// 对准时的轮询间隔
    pub align_poll_ms: u64,
    /// 对准的最大轮询次数
    pub align_poll_limit: u32,
}

impl LiftConfig {
    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }

    pub fn approach(&self) -> Duration {
        Duration::from_millis(self.approach_ms)
    }

    pub fn align_turn(&self) -> Duration {
        Duration::from_millis(self.align_turn_ms)
    }

    pub fn align_poll(&self) -> Duration {
        Duration::from_millis(self.align_poll_ms)
    }
}

impl Default for LiftConfig {
    fn default() -> Self {
        Self {
            up_speed: 10.0,
            down_speed: -10.0,
            degrees: 200,
            pause_ms: 500,
            approach_ms: 500,
            align_turn_ms: 100,
            align_poll_ms: 50,
            align_poll_limit: 100,
        }
    }
}

/// 颜色分类阈值
///
/// 不同场地的环境光不同，阈值需要按场地调整；分类逻辑本身固定。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassifierThresholds {
    /// 蓝色通道高于此值判为白（反光表面）
    pub blue_bright: u8,
    /// 绿色通道高于此值判为绿
    pub green_high: u8,
    /// 红色通道低于此值判为黑
    pub red_low: u8,
    /// 红色通道高于此值判为红
    pub red_high: u8,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            blue_bright: 100,
            green_high: 100,
            red_low: 100,
            red_high: 120,
        }
    }
}

/// 按钮参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ButtonConfig {
    /// 等待启动时的轮询间隔
    pub poll_ms: u64,
}

impl ButtonConfig {
    pub fn poll(&self) -> Duration {
        Duration::from_millis(self.poll_ms)
    }
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self { poll_ms: 50 }
    }
}
