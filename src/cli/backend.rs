//! The backend the binaries run on: LibTorch with the `tch` feature, NdArray otherwise

use super::devices::{Device, DeviceError};

#[cfg(feature = "tch")]
mod selected {
    use burn::backend::{libtorch::LibTorchDevice, LibTorch};

    use super::{Device, DeviceError};

    /// The inference backend
    pub type Backend = LibTorch;

    /// Resolve a command line device for this backend
    pub fn resolve(device: Device) -> Result<LibTorchDevice, DeviceError> {
        Ok(match device {
            Device::Cpu => LibTorchDevice::Cpu,
            Device::Cuda(index) => LibTorchDevice::Cuda(index),
        })
    }
}

#[cfg(not(feature = "tch"))]
mod selected {
    use burn::backend::{ndarray::NdArrayDevice, NdArray};

    use super::{Device, DeviceError};

    /// The inference backend
    pub type Backend = NdArray;

    /// Resolve a command line device for this backend
    pub fn resolve(device: Device) -> Result<NdArrayDevice, DeviceError> {
        match device {
            Device::Cpu => Ok(NdArrayDevice::Cpu),
            other => Err(DeviceError::Unsupported(other)),
        }
    }
}

pub use selected::{resolve, Backend};

/// The training backend
pub type TrainingBackend = burn::backend::Autodiff<Backend>;

#[cfg(all(test, not(feature = "tch")))]
mod tests {
    use super::*;

    #[test]
    fn test_cuda_needs_libtorch() {
        assert!(resolve(Device::Cpu).is_ok());
        assert!(matches!(
            resolve(Device::Cuda(0)),
            Err(DeviceError::Unsupported(Device::Cuda(0)))
        ));
    }
}
