use std::fs::File;
use std::path::PathBuf;

use crate::backend::RenderBackend;
use crate::graph::RenderGraph;
use crate::module::RenderModule;

/// Lifecycle of one in-flight frame slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameState {
    Initial,
    Cleared,
    Acquired,
    Recorded,
    Processed,
    Dispatched,
    FailedAcquire,
    FailedDispatch,
    FailedClear,
}

struct Frame {
    state: FrameState,
    graph: RenderGraph,
    frame_number: u64,
}

#[derive(Clone, Copy, Debug)]
pub struct RendererConfig {
    /// Number of frame slots to rotate through. Zero means one per
    /// swapchain image.
    pub frames_in_flight: usize,
    /// Dump a graphviz description of the graph whenever its topology
    /// changes (written next to the working directory as `graph.dot`
    /// plus a numbered copy).
    pub graph_dump: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            frames_in_flight: 0,
            graph_dump: false,
        }
    }
}

/// Drives the per-frame pipeline over a set of rotating frame slots:
/// record frame N on the caller's thread while frame N+2 is acquired,
/// processed and dispatched, and frame N+1 is cleared for reuse.
///
/// Each slot owns its own graph; no graph is ever touched by more than
/// one stage at a time.
pub struct Renderer<B: RenderBackend> {
    backend: B,
    config: RendererConfig,
    frames: Vec<Frame>,
    current_frame_number: u64,
    swapchain_dirty: bool,
    last_topology_hash: u64,
}

impl<B: RenderBackend> Renderer<B> {
    pub fn new(backend: B, config: RendererConfig) -> Self {
        let count = if config.frames_in_flight == 0 {
            backend.num_swapchain_images().max(1)
        } else {
            config.frames_in_flight
        };

        let frames = (0..count)
            .map(|_| Frame {
                state: FrameState::Initial,
                graph: RenderGraph::new(),
                frame_number: u64::MAX,
            })
            .collect();

        Self {
            backend,
            config,
            frames,
            current_frame_number: 0,
            swapchain_dirty: false,
            last_topology_hash: 0,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn frames_in_flight(&self) -> usize {
        self.frames.len()
    }

    pub fn frame_state(&self, frame_index: usize) -> FrameState {
        self.frames[frame_index].state
    }

    /// Advance the pipeline by one frame: stage the module into the
    /// current slot and record it, push the slot two ahead through
    /// acquire/process/dispatch, and clear the slot in between.
    pub fn update(&mut self, module: &mut RenderModule) {
        let index = self.current_frame_number as usize;
        let num_frames = self.frames.len();

        self.record_frame(index % num_frames, module);
        self.render_frame((index + 2) % num_frames);
        // May block on the frame fence, so it runs last.
        self.clear_frame((index + 1) % num_frames);

        if self.swapchain_dirty {
            // Frames already processed were recorded against the old
            // swapchain images; they must be flushed out before the
            // swapchain can be recreated.
            for i in 0..self.frames.len() {
                match self.frames[i].state {
                    FrameState::Processed => {
                        self.dispatch_frame(i);
                        self.clear_frame(i);
                    }
                    FrameState::Dispatched => {}
                    _ => self.clear_frame(i),
                }
            }

            self.backend.reset_swapchain();
            self.swapchain_dirty = false;
        }

        self.current_frame_number += 1;
    }

    /// Clear every slot and hand the backend back.
    pub fn shutdown(mut self) -> B {
        let num_frames = self.frames.len();
        let last = self.current_frame_number as usize;

        for i in 0..num_frames {
            self.clear_frame((last + i) % num_frames);
        }

        self.backend
    }

    fn record_frame(&mut self, frame_index: usize, module: &mut RenderModule) {
        let frame = &mut self.frames[frame_index];
        if frame.state != FrameState::Cleared && frame.state != FrameState::Initial {
            return;
        }
        frame.frame_number = self.current_frame_number;

        module.setup_passes(&mut frame.graph);
        frame.graph.build();

        if self.config.graph_dump {
            let hash = frame.graph.topology_hash();
            if hash != self.last_topology_hash {
                self.last_topology_hash = hash;
                dump_graph(&frame.graph, frame.frame_number);
            }
        }

        frame.graph.execute(frame_index, &mut self.backend);

        frame.state = FrameState::Recorded;
    }

    fn render_frame(&mut self, frame_index: usize) {
        self.acquire_backend_resources(frame_index);
        self.process_frame(frame_index);
        self.dispatch_frame(frame_index);
    }

    fn acquire_backend_resources(&mut self, frame_index: usize) {
        let frame = &mut self.frames[frame_index];
        if frame.state != FrameState::Recorded {
            return;
        }

        let (declared_ids, declared_infos) = frame.graph.declared_resources();
        let result = self.backend.acquire_physical_resources(
            frame_index,
            frame.graph.passes(),
            declared_ids,
            declared_infos,
        );

        match result {
            Ok(()) => frame.state = FrameState::Acquired,
            Err(err) => {
                // Most likely the swapchain was reset, e.g. by a window
                // resize.
                glog::warn!("could not acquire frame {}: {}", frame_index, err);
                frame.state = FrameState::FailedAcquire;
                self.swapchain_dirty = true;
            }
        }
    }

    fn process_frame(&mut self, frame_index: usize) {
        let frame = &mut self.frames[frame_index];
        if frame.state != FrameState::Acquired {
            return;
        }

        self.backend.process_frame(frame_index, frame.graph.passes_mut());
        frame.state = FrameState::Processed;
    }

    fn dispatch_frame(&mut self, frame_index: usize) {
        let frame = &mut self.frames[frame_index];
        if frame.state != FrameState::Processed {
            return;
        }

        match self.backend.dispatch_frame(frame_index) {
            Ok(()) => frame.state = FrameState::Dispatched,
            Err(err) => {
                glog::warn!(
                    "present failed on frame {}: {}",
                    frame.frame_number,
                    err
                );
                frame.state = FrameState::FailedDispatch;
                self.swapchain_dirty = true;
            }
        }
    }

    fn clear_frame(&mut self, frame_index: usize) {
        let frame = &mut self.frames[frame_index];
        if frame.state == FrameState::Cleared {
            return;
        }

        if matches!(
            frame.state,
            FrameState::Dispatched | FrameState::FailedDispatch | FrameState::FailedClear
        ) {
            // The frame owns GPU work; wait for its fence before touching
            // anything it references.
            while !self.backend.poll_frame_fence(frame_index) {}

            if self.backend.clear_frame(frame_index).is_err() {
                glog::error!("could not clear frame {}", frame_index);
                frame.state = FrameState::FailedClear;
                return;
            }
        }

        frame.graph.reset();
        frame.state = FrameState::Cleared;
    }
}

fn dump_graph(graph: &RenderGraph, frame_number: u64) {
    let write_one = |path: PathBuf| match File::create(&path) {
        Ok(mut file) => {
            if graph.write_dot(frame_number, &mut file).is_ok() {
                glog::info!("generated graphviz dump '{}'", path.display());
            }
        }
        Err(err) => glog::warn!("could not write '{}': {}", path.display(), err),
    };

    write_one(PathBuf::from("graph.dot"));
    write_one(PathBuf::from(format!("graph_{:08}.dot", frame_number)));
}
