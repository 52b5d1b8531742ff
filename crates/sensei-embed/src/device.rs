//! Compute device for the local model. GPU backends are opt-in cargo
//! features; a backend that fails to initialise falls through to CPU.
use candle_core::Device;
use tracing::info;

pub fn select_device() -> Device {
    #[cfg(feature = "metal")]
    match Device::new_metal(0) {
        Ok(dev) => {
            info!(device = "metal", "local embedder device");
            return dev;
        }
        Err(e) => tracing::warn!(error = %e, "metal unavailable"),
    }
    #[cfg(feature = "cuda")]
    match Device::new_cuda(0) {
        Ok(dev) => {
            info!(device = "cuda", "local embedder device");
            return dev;
        }
        Err(e) => tracing::warn!(error = %e, "cuda unavailable"),
    }
    info!(device = "cpu", "local embedder device");
    Device::Cpu
}
