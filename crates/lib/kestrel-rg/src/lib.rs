mod backend;
mod dot;
mod execute;
mod graph;
mod module;
mod node;
mod pass;
mod renderer;

pub use backend::RenderBackend;
pub use graph::RenderGraph;
pub use module::RenderModule;
pub use node::{RootPassesField, MAX_GRAPH_RESOURCES, MAX_GRAPH_ROOTS};
pub use pass::{ExecuteFn, RenderPass, SetupFn};
pub use renderer::{FrameState, Renderer, RendererConfig};
