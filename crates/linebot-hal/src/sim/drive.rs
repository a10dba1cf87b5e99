//! 记录型驱动执行器

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use crate::{Channel, DeviceError, DeviceErrorKind, DriveActuator, HalError, Speed};

/// 执行器收到的一条命令
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriveEvent {
    SetSpeed { channel: Channel, speed: Speed },
    Stop { channel: Channel },
    RunForAngle {
        channel: Channel,
        speed: Speed,
        degrees: u32,
    },
}

impl DriveEvent {
    pub fn channel(&self) -> Channel {
        match *self {
            DriveEvent::SetSpeed { channel, .. }
            | DriveEvent::Stop { channel }
            | DriveEvent::RunForAngle { channel, .. } => channel,
        }
    }
}

#[derive(Debug, Default)]
struct DriveState {
    events: Vec<DriveEvent>,
    /// 每个通道当前生效的速度（按 Channel 的 u8 编码索引）
    live: [Speed; 3],
    /// 注入故障的通道
    faulty: Option<Channel>,
}

/// 仿真驱动执行器
#[derive(Debug, Default)]
pub struct SimDrive {
    state: Arc<Mutex<DriveState>>,
}

impl SimDrive {
    pub fn new() -> Self {
        Self::default()
    }

    /// 取得共享句柄
    pub fn handle(&self) -> SimDriveHandle {
        SimDriveHandle {
            state: Arc::clone(&self.state),
        }
    }

    fn check_fault(state: &DriveState, channel: Channel) -> Result<(), HalError> {
        if state.faulty == Some(channel) {
            return Err(DeviceError::new(
                DeviceErrorKind::Injected,
                format!("injected fault on {}", channel),
            )
            .into());
        }
        Ok(())
    }
}

impl DriveActuator for SimDrive {
    fn set_speed(&mut self, channel: Channel, speed: Speed) -> Result<(), HalError> {
        let mut state = self.state.lock();
        Self::check_fault(&state, channel)?;
        trace!("sim drive: {} -> {}", channel, speed);
        state.events.push(DriveEvent::SetSpeed { channel, speed });
        state.live[u8::from(channel) as usize] = speed;
        Ok(())
    }

    fn stop(&mut self, channel: Channel) -> Result<(), HalError> {
        let mut state = self.state.lock();
        // 停止命令总是生效，即使该通道被注入了故障
        state.events.push(DriveEvent::Stop { channel });
        state.live[u8::from(channel) as usize] = Speed::ZERO;
        Ok(())
    }

    fn run_for_angle(
        &mut self,
        channel: Channel,
        speed: Speed,
        degrees: u32,
    ) -> Result<(), HalError> {
        let mut state = self.state.lock();
        Self::check_fault(&state, channel)?;
        trace!("sim drive: {} run {}° at {}", channel, degrees, speed);
        state.events.push(DriveEvent::RunForAngle {
            channel,
            speed,
            degrees,
        });
        // 阻塞式定角运行结束后通道静止
        state.live[u8::from(channel) as usize] = Speed::ZERO;
        Ok(())
    }
}

/// [`SimDrive`] 的共享句柄
#[derive(Debug, Clone)]
pub struct SimDriveHandle {
    state: Arc<Mutex<DriveState>>,
}

impl SimDriveHandle {
    /// 全部命令的快照
    pub fn events(&self) -> Vec<DriveEvent> {
        self.state.lock().events.clone()
    }

    pub fn event_count(&self) -> usize {
        self.state.lock().events.len()
    }

    /// 通道当前生效的速度
    pub fn live_speed(&self, channel: Channel) -> Speed {
        self.state.lock().live[u8::from(channel) as usize]
    }

    /// 所有通道是否都已静止
    pub fn all_stopped(&self) -> bool {
        self.state.lock().live.iter().all(|s| s.is_zero())
    }

    /// 指定通道的定角运行记录 `(speed, degrees)`
    pub fn angle_runs(&self, channel: Channel) -> Vec<(Speed, u32)> {
        self.state
            .lock()
            .events
            .iter()
            .filter_map(|e| match *e {
                DriveEvent::RunForAngle {
                    channel: c,
                    speed,
                    degrees,
                } if c == channel => Some((speed, degrees)),
                _ => None,
            })
            .collect()
    }

    /// 依次下发给左右轮的速度对
    ///
    /// 相邻的左轮、右轮 `SetSpeed` 事件合并为一对。
    pub fn wheel_commands(&self) -> Vec<(Speed, Speed)> {
        let state = self.state.lock();
        let mut pairs = Vec::new();
        let mut pending_left = None;
        for event in &state.events {
            match *event {
                DriveEvent::SetSpeed {
                    channel: Channel::LeftWheel,
                    speed,
                } => pending_left = Some(speed),
                DriveEvent::SetSpeed {
                    channel: Channel::RightWheel,
                    speed,
                } => {
                    if let Some(left) = pending_left.take() {
                        pairs.push((left, speed));
                    }
                },
                _ => pending_left = None,
            }
        }
        pairs
    }

    /// 让指定通道之后的运行命令失败
    pub fn inject_fault(&self, channel: Channel) {
        self.state.lock().faulty = Some(channel);
    }

    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.events.clear();
    }
}
