use std::fmt::Display;

/// The device to run on, as named on the command line
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Device {
    /// The CPU
    Cpu,

    /// A CUDA device, by index
    Cuda(usize),
}

impl TryFrom<&str> for Device {
    type Error = DeviceError;

    /// Parse `cpu`, `cuda` or `cuda:<index>`
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let value = value.trim().to_lowercase();

        let device = match value.split_once(':') {
            None if value == "cpu" => Some(Device::Cpu),
            None if value == "cuda" => Some(Device::Cuda(0)),
            Some(("cuda", index)) => index.parse().ok().map(Device::Cuda),
            _ => None,
        };

        device.ok_or(DeviceError::Unknown(value))
    }
}

impl Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Device::Cpu => write!(f, "cpu"),
            Device::Cuda(index) => write!(f, "cuda:{}", index),
        }
    }
}

/// Device Error
#[derive(thiserror::Error, Debug)]
pub enum DeviceError {
    /// No device found for the given string
    #[error("no device found for {0}")]
    Unknown(String),

    /// The device needs a backend this build does not include
    #[error("{0} is not available in this build, enable the `tch` feature")]
    Unsupported(Device),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_devices() {
        assert_eq!(Device::try_from("cpu").unwrap(), Device::Cpu);
        assert_eq!(Device::try_from("CUDA").unwrap(), Device::Cuda(0));
        assert_eq!(Device::try_from("cuda:2").unwrap(), Device::Cuda(2));
    }

    #[test]
    fn test_unknown_devices() {
        assert!(matches!(Device::try_from("tpu"), Err(DeviceError::Unknown(_))));
        assert!(matches!(Device::try_from("cuda:x"), Err(DeviceError::Unknown(_))));
    }

    #[test]
    fn test_display_round_trips() {
        let device = Device::Cuda(1);

        assert_eq!(Device::try_from(device.to_string().as_str()).unwrap(), device);
    }
}
