//! 搬运状态

use std::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// 搬运状态机的状态
///
/// 状态只由状态机自身修改：标记触发的转换、取消、丢线恢复失败、显式重启。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum RobotState {
    /// 空闲：启动时、取消后、丢线无法恢复后进入
    #[default]
    Idle = 0,
    /// 前往取货点
    ToSource = 1,
    /// 前往卸货点
    ToTarget = 2,
    /// 保留状态，当前转换表不会到达
    Delivered = 3,
}

impl RobotState {
    /// 是否处于搬运中（巡线有效）
    pub const fn is_transporting(self) -> bool {
        matches!(self, RobotState::ToSource | RobotState::ToTarget)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            RobotState::Idle => "IDLE",
            RobotState::ToSource => "TO_SOURCE",
            RobotState::ToTarget => "TO_TARGET",
            RobotState::Delivered => "DELIVERED",
        }
    }
}

impl fmt::Display for RobotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        assert_eq!(RobotState::default(), RobotState::Idle);
    }

    #[test]
    fn test_transporting_states() {
        assert!(RobotState::ToSource.is_transporting());
        assert!(RobotState::ToTarget.is_transporting());
        assert!(!RobotState::Idle.is_transporting());
        assert!(!RobotState::Delivered.is_transporting());
    }

    #[test]
    fn test_state_encoding() {
        assert_eq!(u8::from(RobotState::ToTarget), 2);
        assert_eq!(RobotState::try_from(3u8).unwrap(), RobotState::Delivered);
        assert!(RobotState::try_from(4u8).is_err());
    }
}
