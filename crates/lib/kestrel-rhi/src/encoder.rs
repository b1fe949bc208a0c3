use std::any::Any;

use ash::vk;

/// Pass-scoped command stream provided by the backend.
///
/// The rendergraph creates one encoder per executed pass, pre-records the
/// default viewport and scissor for graphics passes, hands the encoder to
/// the pass's execute callbacks, and keeps it on the pass until the
/// backend steals it for submission. Callbacks must not retain the
/// encoder beyond their invocation.
pub trait CommandEncoder {
    fn set_viewport(&mut self, first_viewport: u32, viewports: &[vk::Viewport]);

    fn set_scissor(&mut self, first_scissor: u32, scissors: &[vk::Rect2D]);

    /// Escape hatch for callbacks that need the concrete encoder of the
    /// backend they were registered against.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
