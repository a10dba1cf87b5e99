//! 记录型状态指示灯

use std::sync::Arc;

use linebot_protocol::LedPair;
use parking_lot::Mutex;
use tracing::debug;

use crate::{HalError, Status, StatusIndicator};

/// 记录每次状态变化的指示灯
#[derive(Debug, Default)]
pub struct SimIndicator {
    history: Arc<Mutex<Vec<Status>>>,
}

impl SimIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> IndicatorHandle {
        IndicatorHandle {
            history: Arc::clone(&self.history),
        }
    }
}

impl StatusIndicator for SimIndicator {
    fn set_status(&mut self, status: Status) -> Result<(), HalError> {
        let LedPair { left, right } = status.led_pair();
        debug!("[LED] {}: LEFT={} RIGHT={}", status, left, right);
        self.history.lock().push(status);
        Ok(())
    }
}

/// [`SimIndicator`] 的共享句柄
#[derive(Debug, Clone)]
pub struct IndicatorHandle {
    history: Arc<Mutex<Vec<Status>>>,
}

impl IndicatorHandle {
    pub fn history(&self) -> Vec<Status> {
        self.history.lock().clone()
    }

    /// 当前状态（从未设置时为 `Status::Default`）
    pub fn current(&self) -> Status {
        self.history.lock().last().copied().unwrap_or_default()
    }

    pub fn count(&self, status: Status) -> usize {
        self.history.lock().iter().filter(|&&s| s == status).count()
    }

    pub fn contains(&self, status: Status) -> bool {
        self.count(status) > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indicator_history() {
        let mut leds = SimIndicator::new();
        let handle = leds.handle();
        assert_eq!(handle.current(), Status::Default);

        leds.set_status(Status::Ready).unwrap();
        leds.set_status(Status::Working).unwrap();
        leds.set_status(Status::Ready).unwrap();

        assert_eq!(handle.current(), Status::Ready);
        assert_eq!(handle.count(Status::Ready), 2);
        assert!(handle.contains(Status::Working));
        assert!(!handle.contains(Status::Error));
    }
}
