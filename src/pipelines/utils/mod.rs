use candle_core::Device;

use crate::error::{ReasonerError, Result};

/// Which device the model should be loaded onto.
#[derive(Clone, Default)]
pub enum DeviceRequest {
    /// CPU inference (default).
    #[default]
    Cpu,
    /// A specific CUDA GPU.
    Cuda(usize),
}

impl DeviceRequest {
    pub fn resolve(self) -> Result<Device> {
        match self {
            DeviceRequest::Cpu => Ok(Device::Cpu),
            DeviceRequest::Cuda(i) => Device::new_cuda(i).map_err(|e| {
                ReasonerError::Device(format!(
                    "Failed to init CUDA device {i}: {e}. Try CPU as fallback."
                ))
            }),
        }
    }
}
