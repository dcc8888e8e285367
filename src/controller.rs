//! Drag-to-connect interaction state machine.
//!
//! [`GraphInteractionController`] turns pointer-down on a port, pointer
//! moves and pointer-up into connectivity changes on a [`NodeGraph`]:
//!
//! - pressing a port starts a provisional pipe that follows the pointer;
//!   a single pipe already on that port is marked tentative because the
//!   drag may replace or remove it
//! - releasing over nothing drops the provisional pipe and removes that
//!   single existing pipe
//! - releasing over an invalid port restores the existing pipe
//! - releasing over the far end of a pipe the start port already has
//!   changes nothing
//! - releasing over a valid port evicts pipes beyond the target's limit,
//!   displaces the target's single pipe when it has no explicit limit,
//!   replaces the existing pipe (or keeps it, for an output port while
//!   the extend modifier is held) and commits
//!
//! The controller holds no graph reference; each call borrows the graph.

use crate::error::{GraphError, Result};
use crate::geometry::Point;
use crate::graph::{NodeGraph, PipeId, PortId};
use crate::hit_test::PortHitTest;
use crate::port::Direction;
use crate::validation::{validate_drop, CompositeValidator, ValidationError};
use tracing::{debug, warn};

/// Bookkeeping for the drag in progress
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveDrag {
    pub start_port: PortId,
    /// The provisional connection, keyed by its pipe
    pub connection: PipeId,
    /// Pipes attached to the start port when the drag began
    pub existing: Vec<PipeId>,
}

impl ActiveDrag {
    /// The existing pipe the drag may replace, when there is exactly one
    fn single_existing(&self) -> Option<PipeId> {
        match self.existing.as_slice() {
            [pipe] => Some(*pipe),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(ActiveDrag),
}

/// What a pointer release did to the graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragOutcome {
    /// A new pipe was committed. `replaced` is the start port's previous
    /// pipe when the drag swapped it out; `evicted` lists pipes removed to
    /// honour connection limits or displaced from the target.
    Committed {
        pipe: PipeId,
        replaced: Option<PipeId>,
        evicted: Vec<PipeId>,
    },
    /// The drop target failed validation; nothing changed
    Rejected(ValidationError),
    /// Released over empty canvas; `removed` is the existing pipe this deleted
    Released { removed: Option<PipeId> },
    /// Dropped onto a port the start port is already piped to
    Unchanged,
    /// No drag was in progress
    Idle,
}

#[derive(Default)]
pub struct GraphInteractionController {
    state: DragState,
    extend: bool,
    validator: CompositeValidator,
}

impl GraphInteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extra drop rules, run after the structural ones.
    pub fn with_validator(mut self, validator: CompositeValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// Pipe of the provisional connection, while dragging
    pub fn active_pipe(&self) -> Option<PipeId> {
        match &self.state {
            DragState::Dragging(drag) => Some(drag.connection),
            DragState::Idle => None,
        }
    }

    pub fn is_extending(&self) -> bool {
        self.extend
    }

    /// Extend modifier pressed (`true`) or released (`false`).
    pub fn set_extend(&mut self, extend: bool) {
        self.extend = extend;
    }

    fn keeps_existing(&self, direction: Direction) -> bool {
        direction == Direction::Out && self.extend
    }

    /// Pointer-down on `port`: start dragging a provisional pipe from it.
    ///
    /// A drag already in progress is cancelled first.
    pub fn start_connection(&mut self, graph: &mut NodeGraph, port: PortId) -> Result<PipeId> {
        if self.is_dragging() {
            warn!(port = %port, "drag started while another drag is active, cancelling it");
            self.cancel(graph);
        }

        let start = graph.port(port).ok_or(GraphError::UnknownPort(port))?;
        let existing = start.attached_pipes().to_vec();
        let direction = start.direction();
        let connection = graph.begin_connection(port)?;

        let drag = ActiveDrag {
            start_port: port,
            connection,
            existing,
        };
        if let Some(pipe) = drag.single_existing() {
            if !self.keeps_existing(direction) {
                graph.set_pipe_tentative(pipe, true)?;
            }
        }

        debug!(port = %port, pipe = %connection, existing = drag.existing.len(), "drag started");
        self.state = DragState::Dragging(drag);
        Ok(connection)
    }

    /// Pointer-move: the provisional pipe's free end follows `position`.
    pub fn update_drag(&mut self, graph: &mut NodeGraph, position: Point) {
        let DragState::Dragging(drag) = &self.state else {
            return;
        };
        if let Err(err) = graph.update_free_position(drag.connection, position) {
            warn!(error = %err, "active connection disappeared, abandoning drag");
            let drag = drag.clone();
            self.state = DragState::Idle;
            restore_existing(graph, &drag);
        }
    }

    /// Pointer-up at `position`: apply the drop policy and return to idle.
    pub fn finish_connection(
        &mut self,
        graph: &mut NodeGraph,
        hit_test: &dyn PortHitTest,
        position: Point,
    ) -> DragOutcome {
        let DragState::Dragging(drag) = std::mem::take(&mut self.state) else {
            return DragOutcome::Idle;
        };
        let Some(start) = graph.port(drag.start_port) else {
            warn!(port = %drag.start_port, "start port disappeared during drag");
            graph.discard_connection(drag.connection);
            return DragOutcome::Released { removed: None };
        };
        let direction = start.direction();
        let keeps_existing = self.keeps_existing(direction);
        let single = drag.single_existing();

        let Some(target_id) = hit_test.topmost_port_at(graph, position) else {
            graph.discard_connection(drag.connection);
            // Under extend an output's pipe was left untouched at press time, and stays
            let removed = match single {
                Some(pipe) if !keeps_existing => graph.delete_pipe(pipe).then_some(pipe),
                _ => None,
            };
            debug!(port = %drag.start_port, ?removed, "released over empty canvas");
            return DragOutcome::Released { removed };
        };

        let Some(target) = graph.port(target_id) else {
            graph.discard_connection(drag.connection);
            restore_existing(graph, &drag);
            return DragOutcome::Released { removed: None };
        };
        if let Some(reason) = validate_drop(graph, start, target, &self.validator).err() {
            debug!(from = %drag.start_port, to = %target_id, %reason, "drop rejected");
            restore_existing(graph, &drag);
            graph.discard_connection(drag.connection);
            return DragOutcome::Rejected(reason);
        }

        restore_existing(graph, &drag);
        let already_connected = drag.existing.iter().copied().find(|&pipe| {
            graph.pipe(pipe).and_then(|p| p.other_end(drag.start_port)) == Some(target_id)
        });
        if let Some(pipe) = already_connected {
            debug!(pipe = %pipe, "dropped onto existing connection");
            graph.discard_connection(drag.connection);
            return DragOutcome::Unchanged;
        }

        let mut evicted = graph.evict_to_fit(target_id);
        evicted.extend(self.displace_target_pipe(graph, target_id));
        let replaced = match single {
            Some(pipe) if !keeps_existing => graph.delete_pipe(pipe).then_some(pipe),
            _ => None,
        };
        evicted.extend(graph.evict_to_fit(drag.start_port));

        if let Err(err) = graph.commit_connection(drag.connection, target_id) {
            debug_assert!(false, "validated drop failed to commit: {err}");
            warn!(error = %err, "validated drop failed to commit");
            graph.discard_connection(drag.connection);
            return DragOutcome::Released { removed: replaced };
        }

        debug!(
            pipe = %drag.connection,
            from = %drag.start_port,
            to = %target_id,
            ?replaced,
            evicted = evicted.len(),
            "drag committed"
        );
        DragOutcome::Committed {
            pipe: drag.connection,
            replaced,
            evicted,
        }
    }

    /// Delete the single pipe on a target without an explicit limit. An
    /// output target keeps it while extending.
    fn displace_target_pipe(&self, graph: &mut NodeGraph, target: PortId) -> Option<PipeId> {
        let port = graph.port(target)?;
        if !port.connection_limit().replaces_on_drop() || self.keeps_existing(port.direction()) {
            return None;
        }
        let &[pipe] = port.attached_pipes() else {
            return None;
        };
        graph.delete_pipe(pipe).then_some(pipe)
    }

    /// Abandon the drag without touching other pipes. Returns false when idle.
    pub fn cancel(&mut self, graph: &mut NodeGraph) -> bool {
        let DragState::Dragging(drag) = std::mem::take(&mut self.state) else {
            return false;
        };
        restore_existing(graph, &drag);
        graph.discard_connection(drag.connection);
        debug!(pipe = %drag.connection, "drag cancelled");
        true
    }
}

/// Un-mark the tentative style of the single existing pipe, if it still exists.
fn restore_existing(graph: &mut NodeGraph, drag: &ActiveDrag) {
    if let Some(pipe) = drag.single_existing() {
        if let Err(err) = graph.set_pipe_tentative(pipe, false) {
            debug!(pipe = %pipe, error = %err, "existing pipe gone before restore");
        }
    }
}
