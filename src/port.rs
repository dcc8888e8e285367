//! Ports: directional connection points owned by a node.
//!
//! A port keeps the ordered list of pipes attached to it and an ordered
//! registry of position observers. Observers are invoked synchronously, in
//! registration order, every time the port moves (see
//! [`NodeGraph::set_port_position`](crate::graph::NodeGraph::set_port_position)).

use crate::error::{GraphError, Result};
use crate::geometry::Point;
use crate::graph::{NodeId, PipeId, PortId};
use std::fmt;
use std::num::NonZeroUsize;

/// Which side of a pipe a port can sit on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Direction::In => Direction::Out,
            Direction::Out => Direction::In,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::In => write!(f, "in"),
            Direction::Out => write!(f, "out"),
        }
    }
}

/// Maximum number of pipes a port may hold once a drag completes
///
/// `Replace` is what a port gets without an explicit limit: a drop onto it
/// deletes its single pipe first, except on an output while the extend
/// modifier is held. Pipes added through [`NodeGraph::connect`] are not
/// capped.
///
/// [`NodeGraph::connect`]: crate::graph::NodeGraph::connect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionLimit {
    #[default]
    Replace,
    Unbounded,
    AtMost(NonZeroUsize),
}

impl ConnectionLimit {
    /// Build a finite limit, rejecting zero.
    pub fn at_most(max: usize) -> Result<Self> {
        NonZeroUsize::new(max)
            .map(ConnectionLimit::AtMost)
            .ok_or(GraphError::InvalidConnectionLimit(max))
    }

    /// The finite cap, if any
    pub fn max(&self) -> Option<usize> {
        match self {
            ConnectionLimit::Replace | ConnectionLimit::Unbounded => None,
            ConnectionLimit::AtMost(n) => Some(n.get()),
        }
    }

    /// Whether a port holding `count` pipes is within this limit
    pub fn allows(&self, count: usize) -> bool {
        self.max().map_or(true, |max| count <= max)
    }

    /// Whether a drop onto the port displaces its single existing pipe
    pub fn replaces_on_drop(&self) -> bool {
        matches!(self, ConnectionLimit::Replace)
    }
}

impl From<Option<NonZeroUsize>> for ConnectionLimit {
    fn from(limit: Option<NonZeroUsize>) -> Self {
        limit.map_or(ConnectionLimit::Replace, ConnectionLimit::AtMost)
    }
}

/// Construction parameters for a port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortConfig {
    pub name: String,
    pub direction: Direction,
    pub limit: ConnectionLimit,
}

impl PortConfig {
    pub fn new(name: impl Into<String>, direction: Direction) -> Self {
        Self {
            name: name.into(),
            direction,
            limit: ConnectionLimit::default(),
        }
    }

    pub fn input(name: impl Into<String>) -> Self {
        Self::new(name, Direction::In)
    }

    pub fn output(name: impl Into<String>) -> Self {
        Self::new(name, Direction::Out)
    }

    pub fn with_limit(mut self, limit: ConnectionLimit) -> Self {
        self.limit = limit;
        self
    }

    /// Shorthand for `with_limit(ConnectionLimit::at_most(max)?)`.
    pub fn with_max_connections(self, max: usize) -> Result<Self> {
        Ok(self.with_limit(ConnectionLimit::at_most(max)?))
    }
}

/// Handle for a registered position observer, unique within its port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Which end of a pipe a connection observer drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    End,
}

pub(crate) enum PositionObserver {
    /// A connection tracking this port as one of its endpoints
    Connection { pipe: PipeId, end: Endpoint },
    Callback(Box<dyn FnMut(Point)>),
}

impl fmt::Debug for PositionObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionObserver::Connection { pipe, end } => f
                .debug_struct("Connection")
                .field("pipe", pipe)
                .field("end", end)
                .finish(),
            PositionObserver::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

/// A connection point on a node
#[derive(Debug)]
pub struct Port {
    id: PortId,
    node: NodeId,
    name: String,
    direction: Direction,
    limit: ConnectionLimit,
    position: Point,
    /// Attached pipes in attach order; the last entry is the most recent
    attached: Vec<PipeId>,
    observers: Vec<(ObserverId, PositionObserver)>,
    next_observer: u64,
}

impl Port {
    pub(crate) fn new(id: PortId, node: NodeId, config: PortConfig, position: Point) -> Self {
        Self {
            id,
            node,
            name: config.name,
            direction: config.direction,
            limit: config.limit,
            position,
            attached: Vec::new(),
            observers: Vec::new(),
            next_observer: 0,
        }
    }

    pub fn id(&self) -> PortId {
        self.id
    }

    /// The node owning this port
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn connection_limit(&self) -> ConnectionLimit {
        self.limit
    }

    /// Current scene position; authoritative source for pipe endpoints
    pub fn position(&self) -> Point {
        self.position
    }

    pub fn attached_pipes(&self) -> &[PipeId] {
        &self.attached
    }

    pub fn is_connected(&self) -> bool {
        !self.attached.is_empty()
    }

    /// Whether one more pipe fits under the connection limit
    pub fn has_room(&self) -> bool {
        self.limit.allows(self.attached.len() + 1)
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub(crate) fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    pub(crate) fn attach(&mut self, pipe: PipeId) {
        if !self.attached.contains(&pipe) {
            self.attached.push(pipe);
        }
    }

    pub(crate) fn detach(&mut self, pipe: PipeId) -> bool {
        let before = self.attached.len();
        self.attached.retain(|&p| p != pipe);
        self.attached.len() != before
    }

    pub(crate) fn add_observer(&mut self, observer: PositionObserver) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, observer));
        id
    }

    /// Remove by handle; unknown handles are ignored.
    pub(crate) fn remove_observer(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(oid, _)| *oid != id);
        self.observers.len() != before
    }

    /// Move the registry out for dispatch; pair with [`Self::restore_observers`].
    pub(crate) fn take_observers(&mut self) -> Vec<(ObserverId, PositionObserver)> {
        std::mem::take(&mut self.observers)
    }

    pub(crate) fn restore_observers(&mut self, mut observers: Vec<(ObserverId, PositionObserver)>) {
        // Anything registered during dispatch goes after the original entries
        observers.append(&mut self.observers);
        self.observers = observers;
    }
}
