//! Cloneable facade wiring the graph, the drag controller and rendering
//! into Slint callbacks.
//!
//! ```ignore
//! slint::include_modules!();
//!
//! let window = MainWindow::new()?;
//! let editor = NodeEditor::new();
//!
//! let model = Rc::new(VecModel::<PipePath>::default());
//! editor.bind_paths_model(model.clone(), |id, commands, color, width, tentative| PipePath {
//!     id, commands, color: color.into(), width, tentative,
//! });
//! window.set_pipe_paths(ModelRc::from(model));
//!
//! window.on_port_pressed(editor.pointer_pressed_callback());
//! window.on_pointer_moved(editor.pointer_moved_callback());
//! window.on_pointer_released(editor.pointer_released_callback());
//! window.on_extend_modifier(editor.extend_modifier_callback());
//! window.on_cancel_drag(editor.cancel_callback());
//! ```

use crate::controller::{DragOutcome, GraphInteractionController};
use crate::geometry::Point;
use crate::graph::{NodeGraph, PortId};
use crate::hit_test::{PortHitTest, RadiusHitTest};
use crate::render::PipePathRenderer;
use slint::{Color, SharedString, VecModel};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::warn;

/// Shared editor state. Clone it into every UI callback.
///
/// Each pointer event borrows the graph for the duration of the call and
/// re-renders pipe paths afterwards, so a bound model is current as soon
/// as the handler returns.
#[derive(Clone)]
pub struct NodeEditor {
    graph: Rc<RefCell<NodeGraph>>,
    controller: Rc<RefCell<GraphInteractionController>>,
    hit_test: Rc<dyn PortHitTest>,
    renderer: Rc<RefCell<PipePathRenderer>>,
    last_outcome: Rc<RefCell<Option<DragOutcome>>>,
}

impl Default for NodeEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeEditor {
    pub fn new() -> Self {
        Self::with_graph(NodeGraph::new())
    }

    /// Wrap an existing graph; hit testing uses the graph's configured radius.
    pub fn with_graph(graph: NodeGraph) -> Self {
        let hit_test = RadiusHitTest::from_config(graph.config());
        Self {
            graph: Rc::new(RefCell::new(graph)),
            controller: Rc::new(RefCell::new(GraphInteractionController::new())),
            hit_test: Rc::new(hit_test),
            renderer: Rc::new(RefCell::new(PipePathRenderer::new())),
            last_outcome: Rc::new(RefCell::new(None)),
        }
    }

    /// Replace the hit tester, e.g. with one backed by the scene's spatial index.
    pub fn with_hit_test(mut self, hit_test: impl PortHitTest + 'static) -> Self {
        self.hit_test = Rc::new(hit_test);
        self
    }

    pub fn with_controller(self, controller: GraphInteractionController) -> Self {
        *self.controller.borrow_mut() = controller;
        self
    }

    pub fn graph(&self) -> Rc<RefCell<NodeGraph>> {
        self.graph.clone()
    }

    pub fn renderer(&self) -> Rc<RefCell<PipePathRenderer>> {
        self.renderer.clone()
    }

    pub fn is_dragging(&self) -> bool {
        self.controller.borrow().is_dragging()
    }

    /// Outcome of the most recent pointer release
    pub fn last_outcome(&self) -> Option<DragOutcome> {
        self.last_outcome.borrow().clone()
    }

    /// Bind the pipe path model and fill it from the current graph.
    pub fn bind_paths_model<P, F>(&self, model: Rc<VecModel<P>>, constructor: F)
    where
        P: Clone + 'static,
        F: Fn(i32, SharedString, Color, f32, bool) -> P + 'static,
    {
        self.renderer.borrow_mut().bind_model(model, constructor);
        self.refresh();
    }

    /// Re-render pipe paths after changing the graph outside the handlers.
    pub fn refresh(&self) {
        self.renderer.borrow_mut().update(&self.graph.borrow());
    }

    // === Callback factories ===

    /// Returns a callback for pointer-down on a port (raw port id).
    pub fn pointer_pressed_callback(&self) -> impl Fn(i32) {
        let editor = self.clone();
        move |port| {
            editor.handle_pointer_pressed(port);
        }
    }

    /// Returns a callback for pointer moves in scene coordinates.
    pub fn pointer_moved_callback(&self) -> impl Fn(f32, f32) {
        let editor = self.clone();
        move |x, y| editor.handle_pointer_moved(x, y)
    }

    /// Returns a callback for pointer-up in scene coordinates.
    pub fn pointer_released_callback(&self) -> impl Fn(f32, f32) {
        let editor = self.clone();
        move |x, y| {
            editor.handle_pointer_released(x, y);
        }
    }

    /// Returns a callback for the extend modifier changing state.
    pub fn extend_modifier_callback(&self) -> impl Fn(bool) {
        let editor = self.clone();
        move |held| editor.handle_extend_modifier(held)
    }

    /// Returns a callback that abandons the current drag (escape key).
    pub fn cancel_callback(&self) -> impl Fn() {
        let editor = self.clone();
        move || {
            editor.handle_cancel();
        }
    }

    // === Direct handlers ===

    /// Start a drag from `port`. Returns false if the port does not exist.
    pub fn handle_pointer_pressed(&self, port: i32) -> bool {
        let mut graph = self.graph.borrow_mut();
        let started = self
            .controller
            .borrow_mut()
            .start_connection(&mut graph, PortId::from_raw(port));
        drop(graph);
        if let Err(err) = &started {
            warn!(port, error = %err, "pointer pressed on unknown port");
        }
        self.refresh();
        started.is_ok()
    }

    pub fn handle_pointer_moved(&self, x: f32, y: f32) {
        let mut graph = self.graph.borrow_mut();
        let mut controller = self.controller.borrow_mut();
        if !controller.is_dragging() {
            return;
        }
        controller.update_drag(&mut graph, Point::new(x, y));
        drop(controller);
        self.renderer.borrow_mut().update(&graph);
    }

    pub fn handle_pointer_released(&self, x: f32, y: f32) -> DragOutcome {
        let mut graph = self.graph.borrow_mut();
        let outcome = self.controller.borrow_mut().finish_connection(
            &mut graph,
            &*self.hit_test,
            Point::new(x, y),
        );
        drop(graph);
        self.refresh();
        *self.last_outcome.borrow_mut() = Some(outcome.clone());
        outcome
    }

    pub fn handle_extend_modifier(&self, held: bool) {
        self.controller.borrow_mut().set_extend(held);
    }

    pub fn handle_cancel(&self) -> bool {
        let mut graph = self.graph.borrow_mut();
        let cancelled = self.controller.borrow_mut().cancel(&mut graph);
        drop(graph);
        self.refresh();
        cancelled
    }
}
