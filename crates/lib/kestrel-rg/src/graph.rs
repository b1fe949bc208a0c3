use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use kestrel_rhi::{ResourceHandle, ResourceInfo};

use crate::node::{
    tag_contributing_nodes, Node, ResourceField, RootPassesField, MAX_GRAPH_RESOURCES,
    MAX_GRAPH_ROOTS,
};
use crate::pass::RenderPass;

/// The analyzed, pruned, queue-partitioned collection of passes for one
/// frame. Owns its passes; a graph instance is only ever touched by one
/// thread at a time.
#[derive(Default)]
pub struct RenderGraph {
    pub(crate) passes: Vec<RenderPass>,
    pub(crate) declared_resources_id: Vec<ResourceHandle>,
    pub(crate) declared_resources_info: Vec<ResourceInfo>,

    /// One mask per distinct resource-isolated tree in the graph. Passes
    /// whose `root_passes_affinity` intersects a mask belong to that
    /// tree; each tree can go out as its own queue submission.
    pub(crate) root_passes_affinity_masks: Vec<RootPassesField>,
}

impl RenderGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pass to this graph. The graph owns a clone; the caller keeps
    /// its instance (callback state is shared between the two).
    pub fn add_renderpass(&mut self, pass: &RenderPass) {
        self.passes.push(pass.clone());
    }

    /// Pre-declare a resource and its descriptor. Declarations are
    /// forwarded to the backend when physical resources are acquired.
    pub fn declare_resource(&mut self, resource: ResourceHandle, info: ResourceInfo) {
        self.declared_resources_id.push(resource);
        self.declared_resources_info.push(info);
    }

    pub fn passes(&self) -> &[RenderPass] {
        &self.passes
    }

    pub fn passes_mut(&mut self) -> &mut [RenderPass] {
        &mut self.passes
    }

    pub fn declared_resources(&self) -> (&[ResourceHandle], &[ResourceInfo]) {
        (&self.declared_resources_id, &self.declared_resources_info)
    }

    pub fn root_passes_affinity_masks(&self) -> &[RootPassesField] {
        &self.root_passes_affinity_masks
    }

    /// Destroy all passes (and any encoders they still own) and drop all
    /// declarations, returning the graph to its freshly-created state.
    pub fn reset(&mut self) {
        self.passes.clear();
        self.declared_resources_id.clear();
        self.declared_resources_info.clear();
        self.root_passes_affinity_masks.clear();
    }

    /// Express the pass list as bitset nodes over the table of unique
    /// resource handles.
    pub(crate) fn collect_nodes(&self) -> (Vec<Node>, Vec<ResourceHandle>) {
        let mut nodes = Vec::with_capacity(self.passes.len());
        let mut unique_handles: Vec<ResourceHandle> = Vec::new();

        for pass in &self.passes {
            let mut node = Node::default();

            for (handle, rw) in pass.resources.iter().zip(&pass.resources_rw) {
                let res_idx = match unique_handles.iter().position(|h| h == handle) {
                    Some(idx) => idx,
                    None => {
                        unique_handles.push(handle.clone());
                        assert!(
                            unique_handles.len() <= MAX_GRAPH_RESOURCES,
                            "graph exceeds {} unique resources",
                            MAX_GRAPH_RESOURCES
                        );
                        unique_handles.len() - 1
                    }
                };

                node.reads.set(res_idx, rw.is_read());
                node.writes.set(res_idx, rw.is_write());
            }

            node.is_root = pass.is_root;
            nodes.push(node);
        }

        (nodes, unique_handles)
    }

    /// Analyze the graph: tag passes that contribute to a root, group
    /// roots into resource-isolated queue-submission trees, write the
    /// affinity masks back, and drop every pass that contributes to
    /// nothing. Insertion order is preserved among survivors.
    ///
    /// Building an already-built graph is a no-op.
    pub fn build(&mut self) {
        self.root_passes_affinity_masks.clear();

        let (mut nodes, _unique_handles) = self.collect_nodes();

        let root_count = tag_contributing_nodes(&mut nodes) as usize;
        assert!(
            root_count <= MAX_GRAPH_ROOTS,
            "graph exceeds {} root passes",
            MAX_GRAPH_ROOTS
        );

        // Accumulate, per root, the reads and writes of every node in its
        // tree, tagging each node with the roots it feeds. Roots are
        // numbered from the back, and an earlier node joins a tree when
        // its writes touch the tree's accumulated reads.
        let mut root_reads = vec![ResourceField::EMPTY; root_count];
        let mut root_writes = vec![ResourceField::EMPTY; root_count];

        let mut root_index = 0u32;
        for i in (0..nodes.len()).rev() {
            if !nodes[i].is_root {
                continue;
            }

            let mut read_accum = nodes[i].reads;
            let mut write_accum = nodes[i].writes;
            nodes[i].root_affinity |= 1 << root_index;

            for j in (0..i).rev() {
                if nodes[j].is_root {
                    continue;
                }
                if nodes[j].writes.intersects(read_accum) {
                    read_accum |= nodes[j].reads;
                    write_accum |= nodes[j].writes;
                    nodes[j].root_affinity |= 1 << root_index;
                }
            }

            root_reads[root_index as usize] = read_accum;
            root_writes[root_index as usize] = write_accum;
            root_index += 1;
        }
        debug_assert_eq!(root_index as usize, root_count);

        // Two trees may share a queue-submission lane only if they are
        // resource-isolated: any write of one touching a read of the
        // other forces a merge. Mutual reads do not (concurrent reads
        // are safe). Queue ids start as one bit per root and are
        // combined union-find style towards the lower index.
        let mut queue_id: Vec<RootPassesField> = (0..root_count).map(|i| 1 << i).collect();
        let mut queue_id_idx: Vec<usize> = (0..root_count).collect();

        for i in 0..root_count {
            for j in (i + 1)..root_count {
                if root_reads[i].intersects(root_writes[j])
                    || root_reads[j].intersects(root_writes[i])
                {
                    glog::info!(
                        "rendergraph trees with roots {} and {} are not isolated and must be combined",
                        i,
                        j
                    );

                    let combined = queue_id[queue_id_idx[j]] | queue_id[queue_id_idx[i]];

                    if queue_id_idx[i] <= queue_id_idx[j] {
                        queue_id_idx[j] = queue_id_idx[i];
                    } else {
                        queue_id_idx[i] = queue_id_idx[j];
                    }

                    queue_id[queue_id_idx[i]] = combined;
                }
            }
        }

        // Merged trees point at a shared queue id; keep the first
        // occurrence of each.
        let mut seen = vec![false; root_count];
        queue_id_idx.retain(|&idx| !std::mem::replace(&mut seen[idx], true));

        let mut check_queue_accum: RootPassesField = 0;
        for &idx in &queue_id_idx {
            let mask = queue_id[idx];
            assert!(
                mask & check_queue_accum == 0,
                "queue lanes must be independent"
            );
            check_queue_accum |= mask;
            self.root_passes_affinity_masks.push(mask);
        }

        // Keep contributing passes (copying back root status and
        // affinity), destroy the rest.
        let passes = std::mem::take(&mut self.passes);
        self.passes = passes
            .into_iter()
            .zip(nodes.iter())
            .filter_map(|(mut pass, node)| {
                if node.is_contributing {
                    pass.is_root = node.is_root;
                    pass.root_passes_affinity = node.root_affinity;
                    Some(pass)
                } else {
                    glog::debug!("dropping non-contributing pass '{}'", pass.debug_name);
                    None
                }
            })
            .collect();
    }

    /// Cheap fingerprint of the graph's topology, used to notice when the
    /// structure changed between frames (e.g. to re-dump diagnostics).
    pub fn topology_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.passes.len().hash(&mut hasher);
        for pass in &self.passes {
            pass.id.hash(&mut hasher);
            for (handle, rw) in pass.resources.iter().zip(&pass.resources_rw) {
                handle.id().hash(&mut hasher);
                rw.hash(&mut hasher);
            }
        }
        hasher.finish()
    }
}
