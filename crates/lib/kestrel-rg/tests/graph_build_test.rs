use ash::vk;

use kestrel_rg::{RenderGraph, RenderPass};
use kestrel_rhi::ResourceHandle;

fn graphics_pass(name: &str) -> RenderPass {
    RenderPass::new(name, vk::QueueFlags::GRAPHICS)
}

fn pass_names(graph: &RenderGraph) -> Vec<String> {
    graph
        .passes()
        .iter()
        .map(|p| p.debug_name().to_owned())
        .collect()
}

#[test]
fn chain_of_producers_is_fully_retained() {
    let r = ResourceHandle::buffer("r");
    let s = ResourceHandle::buffer("s");
    let swapchain = ResourceHandle::swapchain_image("swapchain");

    let mut a = graphics_pass("a");
    a.use_resource(&r, vk::AccessFlags2::SHADER_WRITE);

    let mut b = graphics_pass("b");
    b.use_resource(&r, vk::AccessFlags2::SHADER_READ);
    b.use_resource(&s, vk::AccessFlags2::SHADER_WRITE);

    let mut c = graphics_pass("c");
    c.use_resource(&s, vk::AccessFlags2::SHADER_READ);
    c.use_resource(&swapchain, vk::AccessFlags2::COLOR_ATTACHMENT_WRITE);

    let mut graph = RenderGraph::new();
    graph.add_renderpass(&a);
    graph.add_renderpass(&b);
    graph.add_renderpass(&c);
    graph.build();

    assert_eq!(pass_names(&graph), ["a", "b", "c"]);
    assert_eq!(graph.root_passes_affinity_masks(), &[0b1]);
    assert!(graph.passes()[2].is_root());
}

#[test]
fn dead_branch_is_pruned() {
    let r = ResourceHandle::buffer("r");
    let s = ResourceHandle::buffer("s");
    let q = ResourceHandle::buffer("q");
    let swapchain = ResourceHandle::swapchain_image("swapchain");

    let mut a = graphics_pass("a");
    a.use_resource(&r, vk::AccessFlags2::SHADER_WRITE);

    let mut b = graphics_pass("b");
    b.use_resource(&r, vk::AccessFlags2::SHADER_READ);
    b.use_resource(&s, vk::AccessFlags2::SHADER_WRITE);

    // reads q, which nothing produces; a and b feed nothing
    let mut c = graphics_pass("c");
    c.use_resource(&q, vk::AccessFlags2::SHADER_READ);
    c.use_resource(&swapchain, vk::AccessFlags2::COLOR_ATTACHMENT_WRITE);

    let mut graph = RenderGraph::new();
    graph.add_renderpass(&a);
    graph.add_renderpass(&b);
    graph.add_renderpass(&c);
    graph.build();

    assert_eq!(pass_names(&graph), ["c"]);
    assert_eq!(graph.root_passes_affinity_masks(), &[0b1]);
}

#[test]
fn isolated_roots_get_distinct_queue_masks() {
    let swapchain_0 = ResourceHandle::swapchain_image("swapchain_0");
    let swapchain_1 = ResourceHandle::swapchain_image("swapchain_1");

    let mut a = graphics_pass("a");
    a.use_resource(&swapchain_0, vk::AccessFlags2::COLOR_ATTACHMENT_WRITE);

    let mut b = graphics_pass("b");
    b.use_resource(&swapchain_1, vk::AccessFlags2::COLOR_ATTACHMENT_WRITE);

    let mut graph = RenderGraph::new();
    graph.add_renderpass(&a);
    graph.add_renderpass(&b);
    graph.build();

    let masks = graph.root_passes_affinity_masks();
    assert_eq!(masks.len(), 2);
    assert!(masks.iter().all(|m| m.count_ones() == 1));
    assert_eq!(masks[0] & masks[1], 0);

    let affinity_a = graph.passes()[0].root_passes_affinity();
    let affinity_b = graph.passes()[1].root_passes_affinity();
    assert_eq!(affinity_a.count_ones(), 1);
    assert_eq!(affinity_b.count_ones(), 1);
    assert_ne!(affinity_a, affinity_b);
}

#[test]
fn roots_sharing_a_producer_are_combined() {
    let r = ResourceHandle::buffer("r");
    let swapchain_0 = ResourceHandle::swapchain_image("swapchain_0");
    let swapchain_1 = ResourceHandle::swapchain_image("swapchain_1");

    let mut a = graphics_pass("a");
    a.use_resource(&r, vk::AccessFlags2::SHADER_WRITE);

    let mut b = graphics_pass("b");
    b.use_resource(&r, vk::AccessFlags2::SHADER_READ);
    b.use_resource(&swapchain_0, vk::AccessFlags2::COLOR_ATTACHMENT_WRITE);

    let mut c = graphics_pass("c");
    c.use_resource(&r, vk::AccessFlags2::SHADER_READ);
    c.use_resource(&swapchain_1, vk::AccessFlags2::COLOR_ATTACHMENT_WRITE);

    let mut graph = RenderGraph::new();
    graph.add_renderpass(&a);
    graph.add_renderpass(&b);
    graph.add_renderpass(&c);
    graph.build();

    assert_eq!(pass_names(&graph), ["a", "b", "c"]);
    // both trees read what a wrote, so they share one submission lane
    assert_eq!(graph.root_passes_affinity_masks(), &[0b11]);
    assert_eq!(graph.passes()[0].root_passes_affinity(), 0b11);

    let affinity_b = graph.passes()[1].root_passes_affinity();
    let affinity_c = graph.passes()[2].root_passes_affinity();
    assert_eq!(affinity_b.count_ones(), 1);
    assert_eq!(affinity_c.count_ones(), 1);
    assert_ne!(affinity_b, affinity_c);
}

#[test]
fn affinity_masks_are_pairwise_disjoint() {
    let r = ResourceHandle::buffer("r");
    let swapchain_0 = ResourceHandle::swapchain_image("swapchain_0");
    let swapchain_1 = ResourceHandle::swapchain_image("swapchain_1");
    let swapchain_2 = ResourceHandle::swapchain_image("swapchain_2");

    let mut a = graphics_pass("a");
    a.use_resource(&r, vk::AccessFlags2::SHADER_WRITE);

    let mut b = graphics_pass("b");
    b.use_resource(&r, vk::AccessFlags2::SHADER_READ);
    b.use_resource(&swapchain_0, vk::AccessFlags2::COLOR_ATTACHMENT_WRITE);

    let mut c = graphics_pass("c");
    c.use_resource(&r, vk::AccessFlags2::SHADER_READ);
    c.use_resource(&swapchain_1, vk::AccessFlags2::COLOR_ATTACHMENT_WRITE);

    let mut d = graphics_pass("d");
    d.use_resource(&swapchain_2, vk::AccessFlags2::COLOR_ATTACHMENT_WRITE);

    let mut graph = RenderGraph::new();
    graph.add_renderpass(&a);
    graph.add_renderpass(&b);
    graph.add_renderpass(&c);
    graph.add_renderpass(&d);
    graph.build();

    let masks = graph.root_passes_affinity_masks();
    assert_eq!(masks.len(), 2);

    let mut accum = 0u64;
    for mask in masks {
        assert_eq!(mask & accum, 0);
        accum |= mask;
    }

    // every pass affinity is covered by exactly one mask
    for pass in graph.passes() {
        let covering = masks
            .iter()
            .filter(|m| pass.root_passes_affinity() & **m != 0)
            .count();
        assert_eq!(covering, 1, "pass '{}'", pass.debug_name());
    }
}

#[test]
fn swapchain_write_promotes_pass_to_root() {
    let swapchain = ResourceHandle::swapchain_image("swapchain");

    let mut reader = graphics_pass("reader");
    reader.use_resource(&swapchain, vk::AccessFlags2::COLOR_ATTACHMENT_READ);
    assert!(!reader.is_root());

    let mut writer = graphics_pass("writer");
    assert!(!writer.is_root());
    writer.use_resource(&swapchain, vk::AccessFlags2::COLOR_ATTACHMENT_WRITE);
    assert!(writer.is_root());

    let mut graph = RenderGraph::new();
    graph.add_renderpass(&writer);
    graph.build();
    assert_eq!(pass_names(&graph), ["writer"]);
}

#[test]
fn explicit_root_is_kept_without_a_swapchain() {
    let out = ResourceHandle::buffer("readback");

    let mut reduce = RenderPass::new("reduce", vk::QueueFlags::COMPUTE);
    reduce.use_resource(&out, vk::AccessFlags2::SHADER_WRITE);
    reduce.set_is_root(true);

    let mut graph = RenderGraph::new();
    graph.add_renderpass(&reduce);
    graph.build();

    assert_eq!(pass_names(&graph), ["reduce"]);
    assert_eq!(graph.root_passes_affinity_masks(), &[0b1]);
}

#[test]
fn insertion_order_is_preserved_among_survivors() {
    let r = ResourceHandle::buffer("r");
    let x = ResourceHandle::buffer("x");
    let y = ResourceHandle::buffer("y");
    let swapchain = ResourceHandle::swapchain_image("swapchain");

    let mut dead_0 = graphics_pass("dead_0");
    dead_0.use_resource(&x, vk::AccessFlags2::SHADER_WRITE);

    let mut a = graphics_pass("a");
    a.use_resource(&r, vk::AccessFlags2::SHADER_WRITE);

    let mut dead_1 = graphics_pass("dead_1");
    dead_1.use_resource(&y, vk::AccessFlags2::SHADER_WRITE);

    let mut b = graphics_pass("b");
    b.use_resource(&r, vk::AccessFlags2::SHADER_READ);
    b.use_resource(&swapchain, vk::AccessFlags2::COLOR_ATTACHMENT_WRITE);

    let mut graph = RenderGraph::new();
    graph.add_renderpass(&dead_0);
    graph.add_renderpass(&a);
    graph.add_renderpass(&dead_1);
    graph.add_renderpass(&b);
    graph.build();

    assert_eq!(pass_names(&graph), ["a", "b"]);
}

#[test]
fn build_is_idempotent() {
    let r = ResourceHandle::buffer("r");
    let swapchain_0 = ResourceHandle::swapchain_image("swapchain_0");
    let swapchain_1 = ResourceHandle::swapchain_image("swapchain_1");

    let mut a = graphics_pass("a");
    a.use_resource(&r, vk::AccessFlags2::SHADER_WRITE);

    let mut b = graphics_pass("b");
    b.use_resource(&r, vk::AccessFlags2::SHADER_READ);
    b.use_resource(&swapchain_0, vk::AccessFlags2::COLOR_ATTACHMENT_WRITE);

    let mut c = graphics_pass("c");
    c.use_resource(&swapchain_1, vk::AccessFlags2::COLOR_ATTACHMENT_WRITE);

    let mut graph = RenderGraph::new();
    graph.add_renderpass(&a);
    graph.add_renderpass(&b);
    graph.add_renderpass(&c);

    graph.build();
    let names = pass_names(&graph);
    let masks = graph.root_passes_affinity_masks().to_vec();
    let affinities: Vec<_> = graph
        .passes()
        .iter()
        .map(|p| p.root_passes_affinity())
        .collect();

    graph.build();
    assert_eq!(pass_names(&graph), names);
    assert_eq!(graph.root_passes_affinity_masks(), masks);
    let affinities_again: Vec<_> = graph
        .passes()
        .iter()
        .map(|p| p.root_passes_affinity())
        .collect();
    assert_eq!(affinities_again, affinities);
}

#[test]
fn reset_drops_passes_and_declarations() {
    let swapchain = ResourceHandle::swapchain_image("swapchain");

    let mut a = graphics_pass("a");
    a.use_resource(&swapchain, vk::AccessFlags2::COLOR_ATTACHMENT_WRITE);

    let mut graph = RenderGraph::new();
    graph.add_renderpass(&a);
    graph.declare_resource(
        ResourceHandle::image("shadow_map"),
        kestrel_rhi::ResourceInfo::default_image(),
    );
    graph.build();

    graph.reset();
    assert!(graph.passes().is_empty());
    assert!(graph.declared_resources().0.is_empty());
    assert!(graph.root_passes_affinity_masks().is_empty());
}
