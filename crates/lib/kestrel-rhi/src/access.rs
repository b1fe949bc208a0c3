//! Classification of fine-grained `vk::AccessFlags2` bits into the coarse
//! read/write summary the dependency analysis runs on.

use std::ops::{BitOr, BitOrAssign};

use ash::vk;

/// Every access bit that reads memory.
pub const ALL_READ_ACCESS: vk::AccessFlags2 = vk::AccessFlags2::from_raw(
    vk::AccessFlags2::INDIRECT_COMMAND_READ.as_raw()
        | vk::AccessFlags2::INDEX_READ.as_raw()
        | vk::AccessFlags2::VERTEX_ATTRIBUTE_READ.as_raw()
        | vk::AccessFlags2::UNIFORM_READ.as_raw()
        | vk::AccessFlags2::INPUT_ATTACHMENT_READ.as_raw()
        | vk::AccessFlags2::SHADER_READ.as_raw()
        | vk::AccessFlags2::COLOR_ATTACHMENT_READ.as_raw()
        | vk::AccessFlags2::DEPTH_STENCIL_ATTACHMENT_READ.as_raw()
        | vk::AccessFlags2::TRANSFER_READ.as_raw()
        | vk::AccessFlags2::HOST_READ.as_raw()
        | vk::AccessFlags2::MEMORY_READ.as_raw()
        | vk::AccessFlags2::SHADER_SAMPLED_READ.as_raw()
        | vk::AccessFlags2::SHADER_STORAGE_READ.as_raw()
        | vk::AccessFlags2::COMMAND_PREPROCESS_READ_NV.as_raw()
        | vk::AccessFlags2::COLOR_ATTACHMENT_READ_NONCOHERENT_EXT.as_raw()
        | vk::AccessFlags2::CONDITIONAL_RENDERING_READ_EXT.as_raw()
        | vk::AccessFlags2::ACCELERATION_STRUCTURE_READ_KHR.as_raw()
        | vk::AccessFlags2::TRANSFORM_FEEDBACK_COUNTER_READ_EXT.as_raw()
        | vk::AccessFlags2::FRAGMENT_DENSITY_MAP_READ_EXT.as_raw()
        | vk::AccessFlags2::FRAGMENT_SHADING_RATE_ATTACHMENT_READ_KHR.as_raw()
        | vk::AccessFlags2::INVOCATION_MASK_READ_HUAWEI.as_raw(),
);

/// Every access bit that writes memory.
pub const ALL_WRITE_ACCESS: vk::AccessFlags2 = vk::AccessFlags2::from_raw(
    vk::AccessFlags2::SHADER_WRITE.as_raw()
        | vk::AccessFlags2::COLOR_ATTACHMENT_WRITE.as_raw()
        | vk::AccessFlags2::DEPTH_STENCIL_ATTACHMENT_WRITE.as_raw()
        | vk::AccessFlags2::TRANSFER_WRITE.as_raw()
        | vk::AccessFlags2::HOST_WRITE.as_raw()
        | vk::AccessFlags2::MEMORY_WRITE.as_raw()
        | vk::AccessFlags2::SHADER_STORAGE_WRITE.as_raw()
        | vk::AccessFlags2::COMMAND_PREPROCESS_WRITE_NV.as_raw()
        | vk::AccessFlags2::ACCELERATION_STRUCTURE_WRITE_KHR.as_raw()
        | vk::AccessFlags2::TRANSFORM_FEEDBACK_WRITE_EXT.as_raw()
        | vk::AccessFlags2::TRANSFORM_FEEDBACK_COUNTER_WRITE_EXT.as_raw(),
);

/// Reads of an image that may force a layout transition, which is a
/// read/write operation as far as dependencies are concerned. Only
/// provably transition-free image reads could ever leave this set.
pub const IMAGE_IMPLIED_WRITE_ACCESS: vk::AccessFlags2 = vk::AccessFlags2::from_raw(
    vk::AccessFlags2::SHADER_SAMPLED_READ.as_raw()
        | vk::AccessFlags2::SHADER_READ.as_raw()
        | vk::AccessFlags2::SHADER_STORAGE_READ.as_raw(),
);

pub fn is_read_access(access: vk::AccessFlags2) -> bool {
    access.intersects(ALL_READ_ACCESS)
}

pub fn is_write_access(access: vk::AccessFlags2) -> bool {
    access.intersects(ALL_WRITE_ACCESS)
}

/// Coarse per-resource access summary, two bits.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
pub struct RwFlags(u32);

impl RwFlags {
    pub const UNDEFINED: Self = Self(0);
    pub const READ: Self = Self(0b01);
    pub const WRITE: Self = Self(0b10);

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_read(self) -> bool {
        self.contains(Self::READ)
    }

    pub const fn is_write(self) -> bool {
        self.contains(Self::WRITE)
    }
}

impl BitOr for RwFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for RwFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Derive the coarse summary for one `use_resource` registration.
///
/// `is_image` widens reads that may imply a layout transition into
/// read/writes.
pub fn classify_access(access: vk::AccessFlags2, is_image: bool) -> RwFlags {
    let mut rw = RwFlags::UNDEFINED;

    if access.intersects(ALL_READ_ACCESS) {
        rw |= RwFlags::READ;
    }

    let mut writes = access.intersects(ALL_WRITE_ACCESS);
    if is_image {
        writes |= access.intersects(IMAGE_IMPLIED_WRITE_ACCESS);
    }
    if writes {
        rw |= RwFlags::WRITE;
    }

    rw
}
