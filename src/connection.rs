//! Live bookkeeping for one pipe being drawn or already committed.
//!
//! A [`Connection`] remembers which port the pipe was drawn from, which
//! port it ended on (none while dragging), the last known position of each
//! end and the observer handles it holds on those ports. The graph owns
//! every live connection, keyed by its pipe; operations that need the
//! ports or the node geometry live on
//! [`NodeGraph`](crate::graph::NodeGraph):
//!
//! - [`begin_connection`](crate::graph::NodeGraph::begin_connection)
//! - [`update_free_position`](crate::graph::NodeGraph::update_free_position)
//! - [`commit_connection`](crate::graph::NodeGraph::commit_connection)
//! - [`discard_connection`](crate::graph::NodeGraph::discard_connection)

use crate::geometry::Point;
use crate::graph::{PipeId, PortId};
use crate::port::{Endpoint, ObserverId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Following the pointer, only the start port is bound
    Provisional,
    Committed,
}

#[derive(Debug, Clone)]
pub struct Connection {
    pipe: PipeId,
    from: PortId,
    to: Option<PortId>,
    start: Point,
    end: Point,
    state: ConnectionState,
    from_observer: ObserverId,
    to_observer: Option<ObserverId>,
}

impl Connection {
    pub(crate) fn new(pipe: PipeId, from: PortId, start: Point, from_observer: ObserverId) -> Self {
        Self {
            pipe,
            from,
            to: None,
            start,
            end: start,
            state: ConnectionState::Provisional,
            from_observer,
            to_observer: None,
        }
    }

    pub fn pipe(&self) -> PipeId {
        self.pipe
    }

    /// The port the pipe was drawn from; its node anchors the path
    pub fn from_port(&self) -> PortId {
        self.from
    }

    pub fn to_port(&self) -> Option<PortId> {
        self.to
    }

    pub fn start_position(&self) -> Point {
        self.start
    }

    pub fn end_position(&self) -> Point {
        self.end
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_provisional(&self) -> bool {
        self.state == ConnectionState::Provisional
    }

    /// Observer registrations held by this connection, per port
    pub(crate) fn observers(&self) -> impl Iterator<Item = (PortId, ObserverId)> {
        std::iter::once((self.from, self.from_observer))
            .chain(self.to.zip(self.to_observer))
    }

    pub(crate) fn set_position(&mut self, end: Endpoint, position: Point) {
        match end {
            Endpoint::Start => self.start = position,
            Endpoint::End => self.end = position,
        }
    }

    pub(crate) fn commit(&mut self, to: PortId, to_position: Point, to_observer: ObserverId) {
        self.to = Some(to);
        self.end = to_position;
        self.to_observer = Some(to_observer);
        self.state = ConnectionState::Committed;
    }
}
