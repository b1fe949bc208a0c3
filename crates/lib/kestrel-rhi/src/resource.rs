use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::sync::Arc;

use ash::vk;

const FNV1A_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV1A_PRIME: u64 = 0x0000_0100_0000_01b3;

/// FNV-1a over the debug name. Stable across processes, so handle ids can
/// be compared between a recorded frame and whatever the backend stored.
pub fn name_hash(name: &str) -> u64 {
    let mut hash = FNV1A_OFFSET_BASIS;
    for byte in name.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(FNV1A_PRIME);
    }
    hash
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Image,
    Buffer,
}

/// Image-only handle flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ResourceFlags(u8);

impl ResourceFlags {
    pub const NONE: Self = Self(0);
    /// Marks the swapchain image. Writing to a handle carrying this bit
    /// turns the writing pass into a root pass.
    pub const IS_ROOT: Self = Self(0b1);

    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    pub const fn as_raw(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ResourceFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ResourceFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Identity of a GPU resource as the rendergraph sees it.
///
/// Handles compare structurally (id, kind, flags) so they can be used as
/// keys; the id is derived from the name, so creating the same handle
/// twice yields equal values. The physical resource behind a handle is
/// the backend's business.
#[derive(Clone)]
pub struct ResourceHandle {
    id: u64,
    kind: ResourceKind,
    flags: ResourceFlags,
    name: Arc<str>,
}

impl ResourceHandle {
    pub fn image(name: &str) -> Self {
        Self::with_flags(name, ResourceKind::Image, ResourceFlags::NONE)
    }

    pub fn buffer(name: &str) -> Self {
        Self::with_flags(name, ResourceKind::Buffer, ResourceFlags::NONE)
    }

    /// The swapchain image handle: an image whose IS_ROOT flag is set.
    pub fn swapchain_image(name: &str) -> Self {
        Self::with_flags(name, ResourceKind::Image, ResourceFlags::IS_ROOT)
    }

    pub fn with_flags(name: &str, kind: ResourceKind, flags: ResourceFlags) -> Self {
        Self {
            id: name_hash(name),
            kind,
            flags,
            name: Arc::from(name),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn flags(&self) -> ResourceFlags {
        self.flags
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_image(&self) -> bool {
        self.kind == ResourceKind::Image
    }

    pub fn is_buffer(&self) -> bool {
        self.kind == ResourceKind::Buffer
    }

    pub fn is_swapchain_image(&self) -> bool {
        self.is_image() && self.flags.contains(ResourceFlags::IS_ROOT)
    }
}

impl PartialEq for ResourceHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.kind == other.kind && self.flags == other.flags
    }
}

impl Eq for ResourceHandle {}

impl std::hash::Hash for ResourceHandle {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.kind.hash(state);
        self.flags.hash(state);
    }
}

impl fmt::Debug for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceHandle")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("flags", &self.flags)
            .finish()
    }
}

/// Identity of a combined image-sampler binding.
#[derive(Clone)]
pub struct TextureHandle {
    id: u64,
    name: Arc<str>,
}

impl TextureHandle {
    pub fn new(name: &str) -> Self {
        Self {
            id: name_hash(name),
            name: Arc::from(name),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for TextureHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TextureHandle {}

impl fmt::Debug for TextureHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextureHandle").field("name", &self.name).finish()
    }
}

/// Declared descriptor for an image resource. Forwarded verbatim to the
/// backend at acquire time; the graph itself only reads the extent.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct ImageInfo {
    pub flags: vk::ImageCreateFlags,
    pub format: vk::Format,
    pub extent: [u32; 3],
    pub mip_levels: u32,
    pub array_layers: u32,
    pub samples: vk::SampleCountFlags,
    pub usage: vk::ImageUsageFlags,
}

impl Default for ImageInfo {
    fn default() -> Self {
        Self {
            flags: vk::ImageCreateFlags::empty(),
            format: vk::Format::UNDEFINED,
            extent: [0, 0, 1],
            mip_levels: 1,
            array_layers: 1,
            samples: vk::SampleCountFlags::TYPE_1,
            usage: vk::ImageUsageFlags::SAMPLED,
        }
    }
}

impl ImageInfo {
    pub fn new_2d(extent: [u32; 2], format: vk::Format) -> Self {
        Self {
            extent: [extent[0], extent[1], 1],
            format,
            ..Default::default()
        }
    }

    #[inline]
    pub fn usage_flags(mut self, usage: vk::ImageUsageFlags) -> Self {
        self.usage = usage;
        self
    }

    #[inline]
    pub fn mip_levels(mut self, mip_levels: u32) -> Self {
        self.mip_levels = mip_levels;
        self
    }

    #[inline]
    pub fn array_layers(mut self, array_layers: u32) -> Self {
        self.array_layers = array_layers;
        self
    }

    #[inline]
    pub fn sample_count(mut self, samples: vk::SampleCountFlags) -> Self {
        self.samples = samples;
        self
    }
}

/// Declared descriptor for a buffer resource.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct BufferInfo {
    pub size: u64,
    pub usage: vk::BufferUsageFlags,
}

impl Default for BufferInfo {
    fn default() -> Self {
        Self {
            size: 0,
            usage: vk::BufferUsageFlags::TRANSFER_DST,
        }
    }
}

impl BufferInfo {
    pub fn new(size: u64, usage: vk::BufferUsageFlags) -> Self {
        Self { size, usage }
    }
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum ResourceInfo {
    Image(ImageInfo),
    Buffer(BufferInfo),
}

impl ResourceInfo {
    pub fn default_image() -> Self {
        Self::Image(ImageInfo::default())
    }

    pub fn default_buffer() -> Self {
        Self::Buffer(BufferInfo::default())
    }

    pub fn as_image(&self) -> Option<&ImageInfo> {
        match self {
            Self::Image(info) => Some(info),
            Self::Buffer(_) => None,
        }
    }

    pub fn as_buffer(&self) -> Option<&BufferInfo> {
        match self {
            Self::Image(_) => None,
            Self::Buffer(info) => Some(info),
        }
    }
}

impl From<ImageInfo> for ResourceInfo {
    fn from(info: ImageInfo) -> Self {
        Self::Image(info)
    }
}

impl From<BufferInfo> for ResourceInfo {
    fn from(info: BufferInfo) -> Self {
        Self::Buffer(info)
    }
}

/// Load/store settings for one attachment of a graphics pass.
#[derive(Clone, Copy)]
pub struct ImageAttachmentInfo {
    pub load_op: vk::AttachmentLoadOp,
    pub store_op: vk::AttachmentStoreOp,
    pub clear_value: vk::ClearValue,
}

impl Default for ImageAttachmentInfo {
    fn default() -> Self {
        Self {
            load_op: vk::AttachmentLoadOp::CLEAR,
            store_op: vk::AttachmentStoreOp::STORE,
            clear_value: vk::ClearValue {
                color: vk::ClearColorValue { float32: [0.0; 4] },
            },
        }
    }
}

impl ImageAttachmentInfo {
    #[inline]
    pub fn load_op(mut self, load_op: vk::AttachmentLoadOp) -> Self {
        self.load_op = load_op;
        self
    }

    #[inline]
    pub fn store_op(mut self, store_op: vk::AttachmentStoreOp) -> Self {
        self.store_op = store_op;
        self
    }

    #[inline]
    pub fn clear_value(mut self, clear_value: vk::ClearValue) -> Self {
        self.clear_value = clear_value;
        self
    }
}

/// Sampler settings for a texture binding, plus the image it views.
#[derive(Clone)]
pub struct TextureSamplerInfo {
    pub image: ResourceHandle,
    pub mag_filter: vk::Filter,
    pub min_filter: vk::Filter,
}

impl TextureSamplerInfo {
    pub fn linear(image: ResourceHandle) -> Self {
        Self {
            image,
            mag_filter: vk::Filter::LINEAR,
            min_filter: vk::Filter::LINEAR,
        }
    }

    pub fn nearest(image: ResourceHandle) -> Self {
        Self {
            image,
            mag_filter: vk::Filter::NEAREST,
            min_filter: vk::Filter::NEAREST,
        }
    }
}
