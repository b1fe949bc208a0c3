pub mod access;
pub mod encoder;
pub mod error;
pub mod resource;
pub mod swapchain;

pub use access::{RwFlags, ALL_READ_ACCESS, ALL_WRITE_ACCESS, IMAGE_IMPLIED_WRITE_ACCESS};
pub use encoder::CommandEncoder;
pub use error::BackendError;
pub use resource::{
    name_hash, BufferInfo, ImageAttachmentInfo, ImageInfo, ResourceFlags, ResourceHandle,
    ResourceInfo, ResourceKind, TextureHandle, TextureSamplerInfo,
};
pub use swapchain::SwapchainInfo;
