use candle_core::Device;

use crate::{Result, SentimentError};

/// Request for a specific compute device, resolved once at pipeline build
/// time. The resolved device is immutable for the pipeline's lifetime.
#[derive(Clone, Default)]
pub enum DeviceRequest {
    /// Use CUDA if available, otherwise CPU (default behavior).
    #[default]
    Default,
    /// Force CPU even if CUDA is available.
    Cpu,
    /// Select a specific CUDA device by index.
    Cuda(usize),
    /// Provide an already constructed device.
    Explicit(Device),
}

impl DeviceRequest {
    /// Resolve the request into an actual [`Device`].
    pub fn resolve(self) -> Result<Device> {
        match self {
            DeviceRequest::Default => Device::cuda_if_available(0)
                .map_err(|e| SentimentError::Device(e.to_string())),
            DeviceRequest::Cpu => Ok(Device::Cpu),
            DeviceRequest::Cuda(index) => {
                Device::new_cuda(index).map_err(|e| SentimentError::Device(e.to_string()))
            }
            DeviceRequest::Explicit(device) => Ok(device),
        }
    }
}
