use ash::vk;

use kestrel_rhi::{ResourceHandle, SwapchainInfo};

use crate::backend::RenderBackend;
use crate::graph::RenderGraph;

impl RenderGraph {
    /// Record commands for every surviving pass that has execute
    /// callbacks.
    ///
    /// For each such pass this creates an encoder bound to the frame's
    /// allocators and the pipeline cache, resolves a zero extent from the
    /// swapchain (preferring a swapchain image the pass actually targets,
    /// falling back to image 0), pre-records the default viewport and
    /// scissor for graphics passes, and runs the callbacks in insertion
    /// order. The encoder stays on the pass until the backend steals it.
    pub fn execute<B: RenderBackend>(&mut self, frame_index: usize, backend: &mut B) {
        let allocators = backend.transient_allocators(frame_index);
        let staging = backend.staging_allocator(frame_index);
        let pipeline_cache = backend.pipeline_cache();

        let mut swapchain = SwapchainInfo::default();
        while !backend.swapchain_info(&mut swapchain) {}

        for pass in &mut self.passes {
            if !pass.has_execute_callback() {
                continue;
            }

            let mut extent = vk::Extent2D {
                width: pass.width,
                height: pass.height,
            };

            if (extent.width == 0 || extent.height == 0) && !swapchain.images.is_empty() {
                let matching = find_matching_swapchain_image(&pass.attachment_resources, &swapchain);
                extent.width = swapchain.widths[matching];
                extent.height = swapchain.heights[matching];
                // The pass keeps the resolved extent.
                pass.width = extent.width;
                pass.height = extent.height;
            }

            let mut encoder =
                backend.create_encoder(&allocators, &pipeline_cache, &staging, extent);

            if pass.queue_type.contains(vk::QueueFlags::GRAPHICS) {
                // Default scissor and viewport cover the full extent.
                encoder.set_scissor(
                    0,
                    &[vk::Rect2D {
                        offset: vk::Offset2D { x: 0, y: 0 },
                        extent,
                    }],
                );
                encoder.set_viewport(
                    0,
                    &[vk::Viewport {
                        x: 0.0,
                        y: 0.0,
                        width: extent.width as f32,
                        height: extent.height as f32,
                        min_depth: 0.0,
                        max_depth: 1.0,
                    }],
                );
            }

            pass.encoder = Some(encoder);
            pass.record_execute_callbacks();
        }
    }
}

/// Index of the first swapchain image referenced by the pass's
/// attachments; image 0 when none matches.
fn find_matching_swapchain_image(
    attachments: &[ResourceHandle],
    swapchain: &SwapchainInfo,
) -> usize {
    for attachment in attachments {
        for (idx, image) in swapchain.images.iter().enumerate() {
            if image == attachment {
                return idx;
            }
        }
    }
    0
}
