//! sysfs 属性读写

use std::fs;
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::{DeviceError, DeviceErrorKind, HalError};

/// sysfs 设备目录（如 `/sys/class/tacho-motor/motor0`）
#[derive(Debug, Clone)]
pub(crate) struct Device {
    dir: PathBuf,
}

impl Device {
    pub(crate) fn path(&self) -> &Path {
        &self.dir
    }

    pub(crate) fn read_string(&self, attr: &str) -> Result<String, HalError> {
        let value = fs::read_to_string(self.dir.join(attr))?;
        Ok(value.trim().to_string())
    }

    pub(crate) fn read_i32(&self, attr: &str) -> Result<i32, HalError> {
        let raw = self.read_string(attr)?;
        raw.parse::<i32>().map_err(|_| {
            DeviceError::new(
                DeviceErrorKind::InvalidResponse,
                format!("{}/{}: not an integer: {:?}", self.dir.display(), attr, raw),
            )
            .into()
        })
    }

    pub(crate) fn write(&self, attr: &str, value: impl ToString) -> Result<(), HalError> {
        let value = value.to_string();
        trace!("sysfs write {}/{} = {}", self.dir.display(), attr, value);
        fs::write(self.dir.join(attr), value)?;
        Ok(())
    }
}

/// 在 `<root>/<class>/*` 中查找 `address` 属性等于 `address` 的设备
pub(crate) fn find_device(root: &Path, class: &str, address: &str) -> Result<Device, HalError> {
    let class_dir = root.join(class);
    let entries = fs::read_dir(&class_dir).map_err(|e| {
        DeviceError::new(
            DeviceErrorKind::NotFound,
            format!("{}: {}", class_dir.display(), e),
        )
    })?;

    for entry in entries {
        let dir = entry?.path();
        let Ok(found) = fs::read_to_string(dir.join("address")) else {
            continue;
        };
        if found.trim() == address {
            return Ok(Device { dir });
        }
    }

    Err(DeviceError::new(
        DeviceErrorKind::NotFound,
        format!("no {} device at {}", class, address),
    )
    .into())
}

/// 按目录名直接打开设备（LED 没有 address 属性）
pub(crate) fn open_named(root: &Path, class: &str, name: &str) -> Result<Device, HalError> {
    let dir = root.join(class).join(name);
    if !dir.is_dir() {
        return Err(DeviceError::new(
            DeviceErrorKind::NotFound,
            format!("{} does not exist", dir.display()),
        )
        .into());
    }
    Ok(Device { dir })
}

#[cfg(test)]
pub(crate) mod fake {
    //! 测试用的假 sysfs 树

    use std::fs;
    use std::path::Path;

    /// 创建设备目录并写入属性
    pub(crate) fn device(root: &Path, class: &str, name: &str, attrs: &[(&str, &str)]) {
        let dir = root.join(class).join(name);
        fs::create_dir_all(&dir).unwrap();
        for (attr, value) in attrs {
            fs::write(dir.join(attr), value).unwrap();
        }
    }

    pub(crate) fn read(root: &Path, class: &str, name: &str, attr: &str) -> String {
        fs::read_to_string(root.join(class).join(name).join(attr))
            .unwrap()
            .trim()
            .to_string()
    }
}
