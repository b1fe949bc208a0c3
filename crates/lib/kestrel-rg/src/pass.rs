use std::sync::Arc;

use ash::vk;
use parking_lot::Mutex;

use kestrel_rhi::access::{self, RwFlags};
use kestrel_rhi::{
    name_hash, CommandEncoder, ImageAttachmentInfo, ResourceHandle, TextureHandle,
    TextureSamplerInfo,
};

use crate::node::RootPassesField;

/// Decides during staging whether the pass joins the frame's graph. The
/// callback receives the pass itself so it can declare resource uses and
/// attachments; returning `false` drops the pass for this frame.
pub type SetupFn = dyn FnMut(&mut RenderPass) -> bool + 'static;

/// Records commands for one pass into the encoder the graph created for
/// it. A pass may carry several of these; they run in insertion order.
pub type ExecuteFn = dyn FnMut(&mut dyn CommandEncoder) + 'static;

/// A named unit of GPU work and the resources it touches.
///
/// `resources`, `resources_rw` and `resources_access` are index-aligned:
/// one slot per distinct resource the pass uses, carrying the coarse
/// read/write summary next to the accumulated fine-grained access bits.
/// The attachment and texture vectors are index-aligned pairs as well.
///
/// Cloning a pass duplicates its declarations but shares the callbacks,
/// so a pass handed to several graphs keeps a single callback state.
/// The encoder slot never clones; whichever pass instance was executed
/// owns its encoder until the backend steals it.
pub struct RenderPass {
    pub(crate) id: u64,
    pub(crate) debug_name: String,
    pub(crate) queue_type: vk::QueueFlags,

    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) sample_count: vk::SampleCountFlags,

    pub(crate) is_root: bool,
    pub(crate) root_passes_affinity: RootPassesField,

    pub(crate) resources: Vec<ResourceHandle>,
    pub(crate) resources_rw: Vec<RwFlags>,
    pub(crate) resources_access: Vec<vk::AccessFlags2>,

    pub(crate) image_attachments: Vec<ImageAttachmentInfo>,
    pub(crate) attachment_resources: Vec<ResourceHandle>,

    pub(crate) texture_handles: Vec<TextureHandle>,
    pub(crate) texture_infos: Vec<TextureSamplerInfo>,

    pub(crate) setup_callback: Option<Arc<Mutex<SetupFn>>>,
    pub(crate) execute_callbacks: Vec<Arc<Mutex<ExecuteFn>>>,

    pub(crate) encoder: Option<Box<dyn CommandEncoder>>,
}

impl RenderPass {
    pub fn new(name: &str, queue_type: vk::QueueFlags) -> Self {
        Self {
            id: name_hash(name),
            debug_name: name.to_owned(),
            queue_type,
            width: 0,
            height: 0,
            sample_count: vk::SampleCountFlags::TYPE_1,
            is_root: false,
            root_passes_affinity: 0,
            resources: Vec::new(),
            resources_rw: Vec::new(),
            resources_access: Vec::new(),
            image_attachments: Vec::new(),
            attachment_resources: Vec::new(),
            texture_handles: Vec::new(),
            texture_infos: Vec::new(),
            setup_callback: None,
            execute_callbacks: Vec::new(),
            encoder: None,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn debug_name(&self) -> &str {
        &self.debug_name
    }

    pub fn queue_type(&self) -> vk::QueueFlags {
        self.queue_type
    }

    /// Queue requirement plus the root-affinity mask `build` assigned.
    /// The backend groups passes into queue submissions by testing the
    /// mask against the graph's affinity masks.
    pub fn queue_submission_info(&self) -> (vk::QueueFlags, RootPassesField) {
        (self.queue_type, self.root_passes_affinity)
    }

    pub fn is_root(&self) -> bool {
        self.is_root
    }

    /// Force the pass to be kept regardless of contribution analysis.
    pub fn set_is_root(&mut self, is_root: bool) {
        self.is_root = is_root;
    }

    pub fn root_passes_affinity(&self) -> RootPassesField {
        self.root_passes_affinity
    }

    /// Width in pixels, identical for all attachments. Zero means "use
    /// the swapchain extent", resolved during execute.
    pub fn set_width(&mut self, width: u32) {
        self.width = width;
    }

    pub fn set_height(&mut self, height: u32) {
        self.height = height;
    }

    pub fn set_sample_count(&mut self, sample_count: vk::SampleCountFlags) {
        self.sample_count = sample_count;
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn sample_count(&self) -> vk::SampleCountFlags {
        self.sample_count
    }

    /// Framebuffer extent and sample count; only graphics passes have
    /// them.
    pub fn framebuffer_settings(&self) -> Option<(u32, u32, vk::SampleCountFlags)> {
        if !self.queue_type.contains(vk::QueueFlags::GRAPHICS) {
            return None;
        }
        Some((self.width, self.height, self.sample_count))
    }

    pub fn set_setup_callback(&mut self, callback: impl FnMut(&mut RenderPass) -> bool + 'static) {
        let callback: Arc<Mutex<SetupFn>> = Arc::new(Mutex::new(callback));
        self.setup_callback = Some(callback);
    }

    pub fn add_execute_callback(&mut self, callback: impl FnMut(&mut dyn CommandEncoder) + 'static) {
        let callback: Arc<Mutex<ExecuteFn>> = Arc::new(Mutex::new(callback));
        self.execute_callbacks.push(callback);
    }

    pub fn has_setup_callback(&self) -> bool {
        self.setup_callback.is_some()
    }

    pub fn has_execute_callback(&self) -> bool {
        !self.execute_callbacks.is_empty()
    }

    /// Associate a resource with this pass. The access flags decide
    /// whether the use counts as a read, a write, or both; a write to the
    /// swapchain image promotes the pass to a root pass.
    ///
    /// Registering the same resource twice is a programmer error. The
    /// recovery path ORs the new access bits into the existing slot.
    pub fn use_resource(&mut self, resource: &ResourceHandle, access_flags: vk::AccessFlags2) {
        let resource_idx = match self.resources.iter().position(|r| r == resource) {
            None => {
                self.resources.push(resource.clone());
                self.resources_rw.push(RwFlags::UNDEFINED);
                self.resources_access.push(access_flags);
                self.resources.len() - 1
            }
            Some(idx) => {
                glog::error!(
                    "pass '{}' registered resource '{}' more than once",
                    self.debug_name,
                    resource.name()
                );
                debug_assert!(false, "a resource may only be registered once per pass");
                self.resources_access[idx] |= access_flags;
                idx
            }
        };

        let rw = access::classify_access(access_flags, resource.is_image());

        if rw.is_write() && resource.is_swapchain_image() {
            // Writing the swapchain image makes this pass a root pass.
            self.is_root = true;
        }

        self.resources_rw[resource_idx] |= rw;
    }

    /// Attach a color target. Load ops translate to attachment reads,
    /// store ops to attachment writes.
    pub fn add_color_attachment(&mut self, image: &ResourceHandle, info: &ImageAttachmentInfo) {
        self.image_attachments.push(*info);
        self.attachment_resources.push(image.clone());

        let mut access_flags = vk::AccessFlags2::empty();
        if info.load_op == vk::AttachmentLoadOp::LOAD {
            access_flags |= vk::AccessFlags2::COLOR_ATTACHMENT_READ;
        }
        if info.store_op == vk::AttachmentStoreOp::STORE {
            access_flags |= vk::AccessFlags2::COLOR_ATTACHMENT_WRITE;
        }

        self.use_resource(image, access_flags);
    }

    pub fn add_depth_stencil_attachment(
        &mut self,
        image: &ResourceHandle,
        info: &ImageAttachmentInfo,
    ) {
        self.image_attachments.push(*info);
        self.attachment_resources.push(image.clone());

        let mut access_flags = vk::AccessFlags2::empty();
        if info.load_op == vk::AttachmentLoadOp::LOAD {
            access_flags |= vk::AccessFlags2::DEPTH_STENCIL_ATTACHMENT_READ;
        }
        if info.store_op == vk::AttachmentStoreOp::STORE {
            access_flags |= vk::AccessFlags2::DEPTH_STENCIL_ATTACHMENT_WRITE;
        }

        self.use_resource(image, access_flags);
    }

    /// Bind a texture for sampling. Registering the same texture handle
    /// again is a no-op; the first sampler info wins.
    pub fn sample_texture(&mut self, texture: &TextureHandle, info: &TextureSamplerInfo) {
        if self.texture_handles.contains(texture) {
            return;
        }

        self.texture_handles.push(texture.clone());
        self.texture_infos.push(info.clone());

        self.use_resource(&info.image, vk::AccessFlags2::SHADER_SAMPLED_READ);
    }

    /// Resources this pass touches and their accumulated access bits,
    /// index-aligned.
    pub fn used_resources(&self) -> (&[ResourceHandle], &[vk::AccessFlags2]) {
        debug_assert_eq!(self.resources.len(), self.resources_access.len());
        (&self.resources, &self.resources_access)
    }

    /// Attachments with their load/store settings and the image each one
    /// targets, index-aligned.
    pub fn image_attachments(&self) -> (&[ImageAttachmentInfo], &[ResourceHandle]) {
        (&self.image_attachments, &self.attachment_resources)
    }

    pub fn texture_handles(&self) -> &[TextureHandle] {
        &self.texture_handles
    }

    pub fn texture_infos(&self) -> &[TextureSamplerInfo] {
        &self.texture_infos
    }

    /// Take the recorded encoder for submission. The caller owns its
    /// destruction from here on; subsequent calls return `None`.
    pub fn steal_encoder(&mut self) -> Option<Box<dyn CommandEncoder>> {
        self.encoder.take()
    }

    pub(crate) fn run_setup_callback(&mut self) -> bool {
        let Some(setup) = self.setup_callback.clone() else {
            return true;
        };
        let result = (&mut *setup.lock())(self);
        result
    }

    pub(crate) fn record_execute_callbacks(&mut self) {
        if let Some(encoder) = self.encoder.as_mut() {
            for callback in &self.execute_callbacks {
                (&mut *callback.lock())(encoder.as_mut());
            }
        }
    }
}

impl Clone for RenderPass {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            debug_name: self.debug_name.clone(),
            queue_type: self.queue_type,
            width: self.width,
            height: self.height,
            sample_count: self.sample_count,
            is_root: self.is_root,
            root_passes_affinity: self.root_passes_affinity,
            resources: self.resources.clone(),
            resources_rw: self.resources_rw.clone(),
            resources_access: self.resources_access.clone(),
            image_attachments: self.image_attachments.clone(),
            attachment_resources: self.attachment_resources.clone(),
            texture_handles: self.texture_handles.clone(),
            texture_infos: self.texture_infos.clone(),
            setup_callback: self.setup_callback.clone(),
            execute_callbacks: self.execute_callbacks.clone(),
            // recorded commands belong to exactly one pass instance
            encoder: None,
        }
    }
}
