//! 控制层错误类型定义

use linebot_hal::HalError;
use linebot_protocol::RobotState;
use thiserror::Error;

use crate::config::ConfigError;

/// 控制层错误
///
/// 取消和丢线都不是错误（分别以 `Idle` 状态返回）；这里只包含未预期的故障。
#[derive(Error, Debug)]
pub enum ControlError {
    /// 执行器或指示灯故障
    #[error("Hardware error: {0}")]
    Hal(#[from] HalError),

    /// 配置无效
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// 当前状态不允许该操作
    #[error("Invalid transition: cannot {action} from {state}")]
    InvalidTransition {
        state: RobotState,
        action: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use linebot_hal::{DeviceError, DeviceErrorKind};

    #[test]
    fn test_control_error_display() {
        let err = ControlError::InvalidTransition {
            state: RobotState::ToTarget,
            action: "restart",
        };
        assert_eq!(
            format!("{}", err),
            "Invalid transition: cannot restart from TO_TARGET"
        );

        let err: ControlError =
            HalError::Device(DeviceError::new(DeviceErrorKind::Injected, "lift")).into();
        let msg = format!("{}", err);
        assert!(msg.contains("Hardware error") && msg.contains("lift"), "{}", msg);
    }
}
