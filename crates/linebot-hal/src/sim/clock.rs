//! 记录型暂停

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::Sleeper;

#[derive(Debug, Default)]
struct SleepLog {
    pauses: Vec<Duration>,
}

/// 只记录、不休眠的 [`Sleeper`]
///
/// 累计时长可以当作仿真时钟使用。
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    log: Arc<Mutex<SleepLog>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> SleepHandle {
        SleepHandle {
            log: Arc::clone(&self.log),
        }
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&mut self, duration: Duration) {
        self.log.lock().pauses.push(duration);
    }
}

/// [`RecordingSleeper`] 的共享句柄
#[derive(Debug, Clone)]
pub struct SleepHandle {
    log: Arc<Mutex<SleepLog>>,
}

impl SleepHandle {
    pub fn pauses(&self) -> Vec<Duration> {
        self.log.lock().pauses.clone()
    }

    /// 仿真时间（全部暂停之和）
    pub fn elapsed(&self) -> Duration {
        self.log.lock().pauses.iter().sum()
    }

    /// 指定时长的暂停次数
    pub fn count_of(&self, duration: Duration) -> usize {
        self.log
            .lock()
            .pauses
            .iter()
            .filter(|&&d| d == duration)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sleeper_accumulates() {
        let mut sleeper = RecordingSleeper::new();
        let handle = sleeper.handle();
        sleeper.sleep(Duration::from_millis(10));
        sleeper.sleep(Duration::from_millis(20));
        sleeper.sleep(Duration::from_millis(10));
        assert_eq!(handle.elapsed(), Duration::from_millis(40));
        assert_eq!(handle.count_of(Duration::from_millis(10)), 2);
        assert_eq!(handle.pauses().len(), 3);
    }
}
