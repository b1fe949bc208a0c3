use kestrel_rhi::{ResourceHandle, ResourceInfo};

use crate::graph::RenderGraph;
use crate::pass::RenderPass;

/// The unbuilt collection of passes the application composes each frame.
///
/// Staging a module into a graph runs every pass's setup callback and
/// transfers ownership of the survivors; the module comes out empty.
#[derive(Default)]
pub struct RenderModule {
    passes: Vec<RenderPass>,
    declared_resources_id: Vec<ResourceHandle>,
    declared_resources_info: Vec<ResourceInfo>,
}

impl RenderModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pass to the module. The module owns a clone; callback state
    /// stays shared with the caller's instance.
    pub fn add_renderpass(&mut self, pass: &RenderPass) {
        self.passes.push(pass.clone());
    }

    pub fn declare_resource(&mut self, resource: ResourceHandle, info: ResourceInfo) {
        self.declared_resources_id.push(resource);
        self.declared_resources_info.push(info);
    }

    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
            && self.declared_resources_id.is_empty()
            && self.declared_resources_info.is_empty()
    }

    /// Run setup on every pass, in order of addition, and move the
    /// survivors into `dst`.
    ///
    /// A pass without a setup callback always moves. A pass whose setup
    /// returns `false` has opted out for this frame and is destroyed.
    /// Declared resources move along with the passes.
    pub fn setup_passes(&mut self, dst: &mut RenderGraph) {
        for mut pass in self.passes.drain(..) {
            if pass.run_setup_callback() {
                dst.passes.push(pass);
            } else {
                glog::debug!("pass '{}' opted out during setup", pass.debug_name());
            }
        }

        dst.declared_resources_id
            .append(&mut self.declared_resources_id);
        dst.declared_resources_info
            .append(&mut self.declared_resources_info);
    }
}
