//! Common test utilities for integration tests.

#![allow(dead_code)]

use pipe_graph::{
    ConnectionLimit, DragOutcome, GraphEvent, GraphInteractionController, NodeGraph, NodeId,
    PipeId, Point, PortConfig, PortId, RadiusHitTest,
};
use std::cell::RefCell;
use std::rc::Rc;

/// Install a test-writer subscriber once; `RUST_LOG` picks the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Records every graph event for later assertions.
#[derive(Default, Clone)]
pub struct EventRecorder {
    pub events: Rc<RefCell<Vec<GraphEvent>>>,
}

impl EventRecorder {
    pub fn attach(graph: &mut NodeGraph) -> Self {
        let recorder = Self::default();
        let events = recorder.events.clone();
        graph.subscribe(move |event| events.borrow_mut().push(event.clone()));
        recorder
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn deleted_pipes(&self) -> Vec<PipeId> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                GraphEvent::PipeDeleted { pipe } => Some(*pipe),
                _ => None,
            })
            .collect()
    }

    pub fn committed_pipes(&self) -> Vec<PipeId> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                GraphEvent::PipeCommitted { pipe, .. } => Some(*pipe),
                _ => None,
            })
            .collect()
    }

    pub fn tentative_changes(&self) -> Vec<(PipeId, bool)> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                GraphEvent::TentativeChanged { pipe, tentative } => Some((*pipe, *tentative)),
                _ => None,
            })
            .collect()
    }
}

/// Nodes X, Y, Z laid out left to right with the ports the scenarios use.
///
/// X has output `o` (unbounded), Y has input `i`, Z has input `i2`,
/// W has output `o2`.
pub struct Scene {
    pub graph: NodeGraph,
    pub x: NodeId,
    pub y: NodeId,
    pub z: NodeId,
    pub w: NodeId,
    pub o: PortId,
    pub o2: PortId,
    pub i: PortId,
    pub i2: PortId,
}

impl Scene {
    pub fn new() -> Self {
        let mut graph = NodeGraph::new();
        let x = graph.add_node("X", Point::new(0.0, 0.0));
        let y = graph.add_node("Y", Point::new(400.0, 0.0));
        let z = graph.add_node("Z", Point::new(400.0, 200.0));
        let w = graph.add_node("W", Point::new(0.0, 200.0));
        let o = graph.add_output_port(x, "o", ConnectionLimit::Unbounded).unwrap();
        let i = graph.add_input_port(y, "i", ConnectionLimit::Unbounded).unwrap();
        let i2 = graph.add_input_port(z, "i2", ConnectionLimit::Unbounded).unwrap();
        let o2 = graph.add_output_port(w, "o2", ConnectionLimit::Unbounded).unwrap();
        Self { graph, x, y, z, w, o, o2, i, i2 }
    }

    /// Add a port to `node`, panicking on failure
    pub fn port(&mut self, node: NodeId, config: PortConfig) -> PortId {
        self.graph.add_port(node, config).unwrap()
    }

    pub fn position(&self, port: PortId) -> Point {
        self.graph.port(port).unwrap().position()
    }

    pub fn attached(&self, port: PortId) -> Vec<PipeId> {
        self.graph.port(port).unwrap().attached_pipes().to_vec()
    }

    /// Press on `from`, move the pointer towards `release` in a few steps, release.
    pub fn drag_to(
        &mut self,
        ctrl: &mut GraphInteractionController,
        from: PortId,
        release: Point,
    ) -> DragOutcome {
        ctrl.start_connection(&mut self.graph, from).unwrap();
        let start = self.position(from);
        for step in 1..=4 {
            let t = step as f32 / 4.0;
            let p = Point::new(
                start.x + (release.x - start.x) * t,
                start.y + (release.y - start.y) * t,
            );
            ctrl.update_drag(&mut self.graph, p);
        }
        ctrl.finish_connection(&mut self.graph, &RadiusHitTest::default(), release)
    }

    /// Drag from `from` and release on the centre of `to`.
    pub fn drag(&mut self, ctrl: &mut GraphInteractionController, from: PortId, to: PortId) -> DragOutcome {
        let release = self.position(to);
        self.drag_to(ctrl, from, release)
    }
}
