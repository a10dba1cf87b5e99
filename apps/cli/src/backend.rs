//! 硬件后端选择
//!
//! `sim` 使用仿真替身，`ev3dev` 通过 sysfs 打开真实硬件（仅 Linux）。

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use linebot_control::Hardware;
use linebot_hal::sim::{
    CyclingColorSensor, ScriptedTouchSensor, SimDrive, SimIndicator, samples,
};
use linebot_hal::{DriveActuator, NoopSleeper};

/// 硬件后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Backend {
    /// 仿真后端（无硬件）
    #[default]
    Sim,
    /// ev3dev sysfs 驱动
    Ev3dev,
}

/// 后端相关参数
#[derive(Args, Debug, Clone, Default)]
pub struct BackendArgs {
    /// 硬件后端
    #[arg(short, long, value_enum, default_value_t = Backend::Sim)]
    pub backend: Backend,

    /// sysfs 根目录（ev3dev 后端）
    #[arg(long)]
    pub sysfs_root: Option<PathBuf>,

    /// 左轮端口，如 `ev3-ports:outA`
    #[arg(long)]
    pub left_wheel_port: Option<String>,

    /// 右轮端口
    #[arg(long)]
    pub right_wheel_port: Option<String>,

    /// 升降电机端口
    #[arg(long)]
    pub lift_port: Option<String>,

    /// 左侧颜色传感器端口
    #[arg(long)]
    pub left_color_port: Option<String>,

    /// 右侧颜色传感器端口
    #[arg(long)]
    pub right_color_port: Option<String>,

    /// 触摸传感器端口
    #[arg(long)]
    pub touch_port: Option<String>,

    /// 仿真后端：启动后第 N 次查询按钮时模拟按下（取消）
    #[arg(long)]
    pub sim_cancel_after: Option<usize>,

    /// 仿真后端：跳过真实暂停
    #[arg(long)]
    pub fast: bool,
}

impl BackendArgs {
    /// 打开全部硬件
    pub fn open_hardware(&self) -> Result<Hardware> {
        match self.backend {
            Backend::Sim => Ok(self.sim_hardware()),
            Backend::Ev3dev => self.ev3dev_hardware(),
        }
    }

    /// 只打开驱动执行器
    pub fn open_drive(&self) -> Result<Box<dyn DriveActuator>> {
        match self.backend {
            Backend::Sim => Ok(Box::new(SimDrive::new())),
            Backend::Ev3dev => self.ev3dev_drive(),
        }
    }

    fn sim_hardware(&self) -> Hardware {
        // 先按下并松开一次启动，之后按需模拟取消
        let mut script = vec![true, false];
        if let Some(polls) = self.sim_cancel_after {
            script.extend(std::iter::repeat_n(false, polls));
            script.push(true);
        }

        let hw = Hardware::new(
            SimDrive::new(),
            CyclingColorSensor::new(samples::DEMO_CYCLE),
            CyclingColorSensor::new(samples::DEMO_CYCLE).with_offset(1),
            ScriptedTouchSensor::new(script, false),
            SimIndicator::new(),
        );
        if self.fast {
            hw.with_sleeper(NoopSleeper)
        } else {
            hw
        }
    }

    #[cfg(target_os = "linux")]
    fn ports(&self) -> linebot_hal::ev3dev::Ev3Ports {
        let mut ports = linebot_hal::ev3dev::Ev3Ports::default();
        if let Some(root) = &self.sysfs_root {
            ports.root = root.clone();
        }
        let overrides = [
            (&mut ports.left_wheel, &self.left_wheel_port),
            (&mut ports.right_wheel, &self.right_wheel_port),
            (&mut ports.lift, &self.lift_port),
            (&mut ports.left_color, &self.left_color_port),
            (&mut ports.right_color, &self.right_color_port),
            (&mut ports.touch, &self.touch_port),
        ];
        for (port, address) in overrides {
            if let Some(address) = address {
                port.clone_from(address);
            }
        }
        ports
    }

    #[cfg(target_os = "linux")]
    fn ev3dev_hardware(&self) -> Result<Hardware> {
        let ev3 = linebot_hal::ev3dev::Ev3Hardware::open(&self.ports())?;
        Ok(Hardware::new(
            ev3.drive,
            ev3.left_color,
            ev3.right_color,
            ev3.touch,
            ev3.leds,
        ))
    }

    #[cfg(target_os = "linux")]
    fn ev3dev_drive(&self) -> Result<Box<dyn DriveActuator>> {
        Ok(Box::new(linebot_hal::ev3dev::Ev3Hardware::open_drive(
            &self.ports(),
        )?))
    }

    #[cfg(not(target_os = "linux"))]
    fn ev3dev_hardware(&self) -> Result<Hardware> {
        anyhow::bail!("ev3dev backend is only available on Linux")
    }

    #[cfg(not(target_os = "linux"))]
    fn ev3dev_drive(&self) -> Result<Box<dyn DriveActuator>> {
        anyhow::bail!("ev3dev backend is only available on Linux")
    }
}
