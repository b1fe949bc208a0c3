#![allow(dead_code)]

use std::any::Any;

use ash::vk;

use kestrel_rg::{RenderBackend, RenderPass};
use kestrel_rhi::{
    BackendError, CommandEncoder, ResourceHandle, ResourceInfo, SwapchainInfo,
};

/// Encoder that records what the graph pre-records into it.
pub struct RecordingEncoder {
    pub extent: vk::Extent2D,
    pub viewports: Vec<vk::Viewport>,
    pub scissors: Vec<vk::Rect2D>,
}

impl CommandEncoder for RecordingEncoder {
    fn set_viewport(&mut self, _first_viewport: u32, viewports: &[vk::Viewport]) {
        self.viewports.extend_from_slice(viewports);
    }

    fn set_scissor(&mut self, _first_scissor: u32, scissors: &[vk::Rect2D]) {
        self.scissors.extend_from_slice(scissors);
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Backend double with injectable failures and a call log.
#[derive(Default)]
pub struct MockBackend {
    /// (handle, width, height) per swapchain image.
    pub swapchain: Vec<(ResourceHandle, u32, u32)>,
    /// Answer `false` to this many swapchain queries before agreeing.
    pub swapchain_denials: usize,
    pub fail_acquires: usize,
    pub fail_dispatches: usize,

    pub swapchain_queries: usize,
    pub encoders_created: usize,
    pub calls: Vec<String>,
}

impl MockBackend {
    pub fn with_swapchain(images: &[(&ResourceHandle, u32, u32)]) -> Self {
        Self {
            swapchain: images
                .iter()
                .map(|(handle, width, height)| ((*handle).clone(), *width, *height))
                .collect(),
            ..Default::default()
        }
    }
}

impl RenderBackend for MockBackend {
    type TransientAllocators = ();
    type StagingAllocator = ();
    type PipelineCache = ();

    fn num_swapchain_images(&self) -> usize {
        self.swapchain.len()
    }

    fn transient_allocators(&mut self, _frame_index: usize) {}

    fn staging_allocator(&mut self, _frame_index: usize) {}

    fn pipeline_cache(&mut self) {}

    fn swapchain_info(&mut self, info: &mut SwapchainInfo) -> bool {
        self.swapchain_queries += 1;
        info.image_count = self.swapchain.len();

        if self.swapchain_denials > 0 {
            self.swapchain_denials -= 1;
            return false;
        }

        info.images = self.swapchain.iter().map(|(h, _, _)| h.clone()).collect();
        info.widths = self.swapchain.iter().map(|(_, w, _)| *w).collect();
        info.heights = self.swapchain.iter().map(|(_, _, h)| *h).collect();
        true
    }

    fn acquire_physical_resources(
        &mut self,
        frame_index: usize,
        _passes: &[RenderPass],
        _declared_resources: &[ResourceHandle],
        _declared_infos: &[ResourceInfo],
    ) -> Result<(), BackendError> {
        self.calls.push(format!("acquire:{frame_index}"));
        if self.fail_acquires > 0 {
            self.fail_acquires -= 1;
            return Err(BackendError::AcquireFailed {
                frame_index,
                reason: "swapchain reset".into(),
            });
        }
        Ok(())
    }

    fn create_encoder(
        &mut self,
        _allocators: &(),
        _pipeline_cache: &(),
        _staging: &(),
        extent: vk::Extent2D,
    ) -> Box<dyn CommandEncoder> {
        self.encoders_created += 1;
        Box::new(RecordingEncoder {
            extent,
            viewports: Vec::new(),
            scissors: Vec::new(),
        })
    }

    fn process_frame(&mut self, frame_index: usize, passes: &mut [RenderPass]) {
        self.calls.push(format!("process:{frame_index}"));
        for pass in passes {
            let _ = pass.steal_encoder();
        }
    }

    fn dispatch_frame(&mut self, frame_index: usize) -> Result<(), BackendError> {
        self.calls.push(format!("dispatch:{frame_index}"));
        if self.fail_dispatches > 0 {
            self.fail_dispatches -= 1;
            return Err(BackendError::DispatchFailed {
                frame_index,
                reason: "surface lost".into(),
            });
        }
        Ok(())
    }

    fn poll_frame_fence(&mut self, _frame_index: usize) -> bool {
        true
    }

    fn clear_frame(&mut self, frame_index: usize) -> Result<(), BackendError> {
        self.calls.push(format!("clear:{frame_index}"));
        Ok(())
    }

    fn reset_swapchain(&mut self) {
        self.calls.push("reset_swapchain".into());
    }
}
