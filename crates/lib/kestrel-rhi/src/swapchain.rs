use crate::resource::ResourceHandle;

/// Swapchain snapshot filled in by the backend.
///
/// Contract: the backend sets `image_count` and fills the three vectors
/// index-aligned, one entry per swapchain image. A return of `false` from
/// the query means the snapshot is not usable yet (the swapchain is being
/// recreated, or `image_count` changed mid-query) and the caller must ask
/// again; the rendergraph loops until the backend reports `true`.
#[derive(Clone, Default)]
pub struct SwapchainInfo {
    pub image_count: usize,
    pub images: Vec<ResourceHandle>,
    pub widths: Vec<u32>,
    pub heights: Vec<u32>,
}

impl SwapchainInfo {
    pub fn is_consistent(&self) -> bool {
        self.images.len() == self.image_count
            && self.widths.len() == self.image_count
            && self.heights.len() == self.image_count
    }
}
