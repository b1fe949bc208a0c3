use ash::vk;

use kestrel_rhi::{BackendError, CommandEncoder, ResourceHandle, ResourceInfo, SwapchainInfo};

use crate::pass::RenderPass;

/// Everything the rendergraph needs from the backend that owns the
/// physical resources, plus the hooks the outer frame loop drives.
///
/// The allocator, staging and pipeline-cache tokens are opaque to the
/// graph; they are fetched per frame and handed straight back through
/// `create_encoder`.
pub trait RenderBackend {
    type TransientAllocators;
    type StagingAllocator;
    type PipelineCache;

    /// Number of swapchain images, which is also the number of in-flight
    /// frames the renderer rotates through by default.
    fn num_swapchain_images(&self) -> usize;

    /// One transient allocator per recording worker, from the frame's
    /// own pool.
    fn transient_allocators(&mut self, frame_index: usize) -> Self::TransientAllocators;

    fn staging_allocator(&mut self, frame_index: usize) -> Self::StagingAllocator;

    fn pipeline_cache(&mut self) -> Self::PipelineCache;

    /// Fill `info` with the current swapchain images and extents.
    /// Returning `false` means the snapshot is not usable and the caller
    /// must query again (see [`SwapchainInfo`]).
    fn swapchain_info(&mut self, info: &mut SwapchainInfo) -> bool;

    /// Realize the physical resources for this frame: the swapchain
    /// image, every resource the passes reference, and everything
    /// pre-declared on the graph. Failure is surfaced to the frame loop;
    /// the graph never retries.
    fn acquire_physical_resources(
        &mut self,
        frame_index: usize,
        passes: &[RenderPass],
        declared_resources: &[ResourceHandle],
        declared_infos: &[ResourceInfo],
    ) -> Result<(), BackendError>;

    fn create_encoder(
        &mut self,
        allocators: &Self::TransientAllocators,
        pipeline_cache: &Self::PipelineCache,
        staging: &Self::StagingAllocator,
        extent: vk::Extent2D,
    ) -> Box<dyn CommandEncoder>;

    /// Translate the recorded command streams into API command buffers.
    /// The backend steals each pass's encoder here and owns its
    /// destruction afterwards.
    fn process_frame(&mut self, frame_index: usize, passes: &mut [RenderPass]);

    /// Submit the frame's queue workloads, partitioned by the graph's
    /// affinity masks.
    fn dispatch_frame(&mut self, frame_index: usize) -> Result<(), BackendError>;

    /// `true` once the frame's fence has been reached. May be polled in a
    /// loop; the backend is allowed to block inside.
    fn poll_frame_fence(&mut self, frame_index: usize) -> bool;

    fn clear_frame(&mut self, frame_index: usize) -> Result<(), BackendError>;

    /// Recreate the swapchain after an acquire or dispatch failure.
    fn reset_swapchain(&mut self);
}
