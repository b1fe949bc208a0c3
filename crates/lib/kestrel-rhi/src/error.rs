use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("swapchain is out of date and must be recreated")]
    SwapchainOutOfDate,

    #[error("failed to acquire physical resources for frame {frame_index}: {reason}")]
    AcquireFailed { frame_index: usize, reason: String },

    #[error("failed to dispatch frame {frame_index}: {reason}")]
    DispatchFailed { frame_index: usize, reason: String },

    #[error("failed to clear frame {frame_index}")]
    ClearFailed { frame_index: usize },
}
