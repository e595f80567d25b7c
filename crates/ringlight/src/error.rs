/// Reasons attaching the renderer to a host window can fail.
///
/// None of these are retried: the host is expected to leave the overlay
/// disabled and carry on.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("failed to create a rendering surface for the host window")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible GPU adapter found")]
    NoAdapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to open the GPU device")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("surface is not presentable with this adapter: {0}")]
    UnsupportedSurface(String),
    #[error("ring light pipeline failed to build: {0}")]
    Pipeline(String),
}

/// Outcome of a frame that could not be presented.
#[derive(Debug, thiserror::Error)]
pub enum PresentError {
    /// The frame was dropped; the next tick proceeds normally.
    #[error("frame skipped: {0}")]
    Skipped(#[source] wgpu::SurfaceError),
    /// The surface can no longer present and must be detached.
    #[error("surface is unusable: {0}")]
    Fatal(#[source] wgpu::SurfaceError),
}

impl PresentError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, PresentError::Fatal(_))
    }
}

impl From<wgpu::SurfaceError> for PresentError {
    fn from(value: wgpu::SurfaceError) -> Self {
        match value {
            wgpu::SurfaceError::OutOfMemory => PresentError::Fatal(value),
            other => PresentError::Skipped(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_out_of_memory_is_fatal() {
        assert!(PresentError::from(wgpu::SurfaceError::OutOfMemory).is_fatal());
        for transient in [
            wgpu::SurfaceError::Timeout,
            wgpu::SurfaceError::Outdated,
            wgpu::SurfaceError::Lost,
        ] {
            assert!(!PresentError::from(transient).is_fatal());
        }
    }
}
