//! The node graph: arena of nodes, ports, pipes and live connections.
//!
//! All cross references are non-owning id handles. The graph owns every
//! object and enforces the deletion cascade: deleting a node deletes its
//! ports, deleting a port deletes every pipe attached to it, deleting a
//! pipe detaches it from both ports and drops its observer registrations.
//!
//! Changes are reported synchronously to listeners registered with
//! [`NodeGraph::subscribe`] so a rendering layer can mirror them.
//!
//! # Example
//!
//! ```
//! use pipe_graph::{NodeGraph, Point, PortConfig};
//!
//! let mut graph = NodeGraph::new();
//! let a = graph.add_node("Source", Point::new(0.0, 0.0));
//! let b = graph.add_node("Sink", Point::new(300.0, 0.0));
//! let out = graph.add_port(a, PortConfig::output("value")).unwrap();
//! let input = graph.add_port(b, PortConfig::input("value")).unwrap();
//!
//! let pipe = graph.connect(out, input).unwrap();
//! graph.move_node(b, Point::new(400.0, 50.0)).unwrap();
//!
//! let end = graph.pipe(pipe).unwrap().path().end();
//! assert_eq!(end, graph.port(input).unwrap().position());
//! ```

use crate::config::EditorConfig;
use crate::connection::Connection;
use crate::error::{GraphError, Result};
use crate::geometry::{Point, Rect};
use crate::node::Node;
use crate::path::CubicBezier;
use crate::pipe::{Pipe, PipeStyle};
use crate::port::{ConnectionLimit, Direction, Endpoint, ObserverId, Port, PortConfig, PositionObserver};
use crate::validation::{BasicConnectionValidator, ConnectionValidator};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::{debug, trace};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) i32);

        impl $name {
            /// Rebuild a handle from its raw value (e.g. an id coming back from the UI).
            pub fn from_raw(raw: i32) -> Self {
                Self(raw)
            }

            pub fn get(self) -> i32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "#{}"), self.0)
            }
        }
    };
}

id_type!(
    /// Handle to a [`Node`]
    NodeId,
    "node"
);
id_type!(
    /// Handle to a [`Port`]
    PortId,
    "port"
);
id_type!(
    /// Handle to a [`Pipe`]; also identifies the pipe's live connection
    PipeId,
    "pipe"
);

/// Change notifications for the rendering collaborator
#[derive(Debug, Clone, PartialEq)]
pub enum GraphEvent {
    NodeAdded { node: NodeId },
    PortAdded { port: PortId, node: NodeId },
    /// A provisional pipe was created by a drag or a programmatic connect
    PipeStarted { pipe: PipeId, from: PortId },
    PathChanged { pipe: PipeId, path: CubicBezier },
    TentativeChanged { pipe: PipeId, tentative: bool },
    PipeCommitted { pipe: PipeId, in_port: PortId, out_port: PortId },
    PipeDeleted { pipe: PipeId },
    PortDeleted { port: PortId, node: NodeId },
    NodeDeleted { node: NodeId },
}

/// Handle returned by [`NodeGraph::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&GraphEvent)>;

pub struct NodeGraph {
    config: EditorConfig,
    nodes: BTreeMap<NodeId, Node>,
    ports: BTreeMap<PortId, Port>,
    pipes: BTreeMap<PipeId, Pipe>,
    /// Every live connection, provisional or committed, keyed by its pipe
    connections: HashMap<PipeId, Connection>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
    next_node: i32,
    next_port: i32,
    next_pipe: i32,
}

impl Default for NodeGraph {
    fn default() -> Self {
        Self::with_config(EditorConfig::default())
    }
}

impl fmt::Debug for NodeGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeGraph")
            .field("nodes", &self.nodes.len())
            .field("ports", &self.ports.len())
            .field("pipes", &self.pipes.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl NodeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            config,
            nodes: BTreeMap::new(),
            ports: BTreeMap::new(),
            pipes: BTreeMap::new(),
            connections: HashMap::new(),
            listeners: Vec::new(),
            next_listener: 0,
            next_node: 1,
            next_port: 1,
            next_pipe: 1,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Register a listener for [`GraphEvent`]s.
    ///
    /// Listeners run synchronously inside the mutating call and must not
    /// try to reach the graph themselves. A listener stays registered
    /// until [`unsubscribe`](Self::unsubscribe) or until the graph drops.
    pub fn subscribe(&mut self, listener: impl FnMut(&GraphEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener, _)| *listener != id);
        self.listeners.len() != before
    }

    fn emit(&mut self, event: GraphEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(&event);
        }
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn port(&self, id: PortId) -> Option<&Port> {
        self.ports.get(&id)
    }

    pub fn pipe(&self, id: PipeId) -> Option<&Pipe> {
        self.pipes.get(&id)
    }

    pub fn connection(&self, pipe: PipeId) -> Option<&Connection> {
        self.connections.get(&pipe)
    }

    /// Nodes in creation order; later nodes are drawn on top
    pub fn nodes(&self) -> impl DoubleEndedIterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn ports(&self) -> impl Iterator<Item = &Port> {
        self.ports.values()
    }

    /// All pipes, including one still being dragged
    pub fn pipes(&self) -> impl Iterator<Item = &Pipe> {
        self.pipes.values()
    }

    /// Pipes bound at both ends
    pub fn committed_pipes(&self) -> impl Iterator<Item = &Pipe> {
        self.pipes.values().filter(|pipe| pipe.is_bound())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn pipe_count(&self) -> usize {
        self.pipes.len()
    }

    /// Ports at the far end of every pipe attached to `port`
    pub fn connected_ports(&self, port: PortId) -> Vec<PortId> {
        self.ports
            .get(&port)
            .map(|p| {
                p.attached_pipes()
                    .iter()
                    .filter_map(|pipe| self.pipes.get(pipe)?.other_end(port))
                    .collect()
            })
            .unwrap_or_default()
    }

    // ========================================================================
    // Nodes and ports
    // ========================================================================

    /// Add a node with its top-left corner at `position` and the minimum size.
    pub fn add_node(&mut self, name: impl Into<String>, position: Point) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        let rect = Rect::new(
            position.x,
            position.y,
            self.config.min_node_width,
            self.config.min_node_height,
        );
        self.nodes.insert(id, Node::new(id, name.into(), rect));
        debug!(node = %id, "node added");
        self.emit(GraphEvent::NodeAdded { node: id });
        id
    }

    /// Add a port to `node` and re-lay-out the node's ports.
    pub fn add_port(&mut self, node: NodeId, config: PortConfig) -> Result<PortId> {
        let id = PortId(self.next_port);
        let owner = self.nodes.get_mut(&node).ok_or(GraphError::UnknownNode(node))?;
        self.next_port += 1;
        owner.push_port(config.direction, id);
        let origin = owner.position();
        self.ports.insert(id, Port::new(id, node, config, origin));
        self.emit(GraphEvent::PortAdded { port: id, node });
        self.relayout(node)?;
        Ok(id)
    }

    pub fn add_input_port(
        &mut self,
        node: NodeId,
        name: impl Into<String>,
        limit: ConnectionLimit,
    ) -> Result<PortId> {
        self.add_port(node, PortConfig::new(name, Direction::In).with_limit(limit))
    }

    pub fn add_output_port(
        &mut self,
        node: NodeId,
        name: impl Into<String>,
        limit: ConnectionLimit,
    ) -> Result<PortId> {
        self.add_port(node, PortConfig::new(name, Direction::Out).with_limit(limit))
    }

    pub fn rename_node(&mut self, node: NodeId, name: impl Into<String>) -> Result<()> {
        self.nodes
            .get_mut(&node)
            .ok_or(GraphError::UnknownNode(node))?
            .set_name(name.into());
        Ok(())
    }

    /// Move a node's top-left corner; its ports follow by the same delta.
    pub fn move_node(&mut self, node: NodeId, position: Point) -> Result<()> {
        let owner = self.nodes.get_mut(&node).ok_or(GraphError::UnknownNode(node))?;
        let delta = position - owner.position();
        owner.set_origin(position);
        let ports: Vec<PortId> = owner.ports().collect();
        for port in ports {
            let current = self.ports.get(&port).ok_or(GraphError::UnknownPort(port))?.position();
            self.set_port_position(port, current + delta)?;
        }
        Ok(())
    }

    /// Resize a node, never below the configured minimum, and re-lay-out ports.
    pub fn resize_node(&mut self, node: NodeId, width: f32, height: f32) -> Result<()> {
        self.nodes
            .get_mut(&node)
            .ok_or(GraphError::UnknownNode(node))?
            .set_size(width, height);
        self.relayout(node)
    }

    fn relayout(&mut self, node: NodeId) -> Result<()> {
        let owner = self.nodes.get_mut(&node).ok_or(GraphError::UnknownNode(node))?;
        let rect = owner.bounding_rect();
        let (width, height) = owner.fitted_size(rect.width, rect.height, &self.config);
        owner.set_size(width, height);
        let layout = owner.port_layout(self.config.port_size);
        for (port, position) in layout {
            self.set_port_position(port, position)?;
        }
        Ok(())
    }

    /// Move a port and notify its observers in registration order.
    ///
    /// Every pipe attached to the port has its path recomputed before this
    /// returns.
    pub fn set_port_position(&mut self, port: PortId, position: Point) -> Result<()> {
        let target = self.ports.get_mut(&port).ok_or(GraphError::UnknownPort(port))?;
        target.set_position(position);
        let mut observers = target.take_observers();
        trace!(port = %port, %position, observers = observers.len(), "port moved");

        for (_, observer) in observers.iter_mut() {
            match observer {
                PositionObserver::Connection { pipe, end } => {
                    let (pipe, end) = (*pipe, *end);
                    if let Some(connection) = self.connections.get_mut(&pipe) {
                        connection.set_position(end, position);
                    }
                    self.recompute_path(pipe);
                }
                PositionObserver::Callback(callback) => callback(position),
            }
        }

        if let Some(target) = self.ports.get_mut(&port) {
            target.restore_observers(observers);
        }
        Ok(())
    }

    /// Register an arbitrary position observer on a port.
    pub fn add_port_observer(
        &mut self,
        port: PortId,
        observer: impl FnMut(Point) + 'static,
    ) -> Result<ObserverId> {
        let target = self.ports.get_mut(&port).ok_or(GraphError::UnknownPort(port))?;
        Ok(target.add_observer(PositionObserver::Callback(Box::new(observer))))
    }

    /// Returns false when the observer (or the port) is already gone.
    pub fn remove_port_observer(&mut self, port: PortId, observer: ObserverId) -> bool {
        self.ports
            .get_mut(&port)
            .map_or(false, |target| target.remove_observer(observer))
    }

    // ========================================================================
    // Connections
    // ========================================================================

    /// Start a provisional connection anchored at `from`.
    ///
    /// The new pipe is not attached to any port yet; its free end sits on
    /// `from` until [`update_free_position`](Self::update_free_position).
    pub fn begin_connection(&mut self, from: PortId) -> Result<PipeId> {
        let id = PipeId(self.next_pipe);
        let port = self.ports.get_mut(&from).ok_or(GraphError::UnknownPort(from))?;
        self.next_pipe += 1;
        let start = port.position();
        let observer = port.add_observer(PositionObserver::Connection {
            pipe: id,
            end: Endpoint::Start,
        });
        self.pipes.insert(id, Pipe::new(id, start, self.config.pipe_style));
        self.connections.insert(id, Connection::new(id, from, start, observer));
        debug!(pipe = %id, from = %from, "connection started");
        self.emit(GraphEvent::PipeStarted { pipe: id, from });
        self.recompute_path(id);
        Ok(id)
    }

    /// Move the unbound end of a provisional connection.
    pub fn update_free_position(&mut self, pipe: PipeId, position: Point) -> Result<()> {
        let connection = self.connections.get_mut(&pipe).ok_or(GraphError::UnknownPipe(pipe))?;
        if !connection.is_provisional() {
            return Err(GraphError::ConnectionInert(pipe));
        }
        connection.set_position(Endpoint::End, position);
        self.recompute_path(pipe);
        Ok(())
    }

    /// Bind a provisional connection to `to` and attach the pipe to both ports.
    ///
    /// Connection limits are not checked here; callers make room first with
    /// [`evict_to_fit`](Self::evict_to_fit). On error the connection stays
    /// provisional.
    pub fn commit_connection(&mut self, pipe_id: PipeId, to: PortId) -> Result<()> {
        let connection = self.connections.get(&pipe_id).ok_or(GraphError::UnknownPipe(pipe_id))?;
        if !connection.is_provisional() {
            return Err(GraphError::ConnectionInert(pipe_id));
        }
        let from_id = connection.from_port();
        let from = self.ports.get(&from_id).ok_or(GraphError::UnknownPort(from_id))?;
        let target = self.ports.get(&to).ok_or(GraphError::UnknownPort(to))?;
        let pipe = self.pipes.get_mut(&pipe_id).ok_or(GraphError::UnknownPipe(pipe_id))?;
        let (in_port, out_port) = pipe.bind(from, target)?;
        let to_position = target.position();

        if let Some(port) = self.ports.get_mut(&from_id) {
            port.attach(pipe_id);
        }
        let to_observer = match self.ports.get_mut(&to) {
            Some(port) => {
                port.attach(pipe_id);
                port.add_observer(PositionObserver::Connection {
                    pipe: pipe_id,
                    end: Endpoint::End,
                })
            }
            None => return Err(GraphError::UnknownPort(to)),
        };
        if let Some(connection) = self.connections.get_mut(&pipe_id) {
            connection.commit(to, to_position, to_observer);
        }

        debug!(pipe = %pipe_id, %in_port, %out_port, "connection committed");
        self.recompute_path(pipe_id);
        self.emit(GraphEvent::PipeCommitted {
            pipe: pipe_id,
            in_port,
            out_port,
        });
        Ok(())
    }

    /// Drop a connection and its pipe. Safe to call more than once.
    pub fn discard_connection(&mut self, pipe: PipeId) -> bool {
        self.delete_pipe(pipe)
    }

    /// Connect two ports directly, bypassing the interaction controller.
    ///
    /// The ports must pass the structural drop rules. Finite connection
    /// limits on either side are enforced by evicting the most recently
    /// attached pipes first.
    pub fn connect(&mut self, from: PortId, to: PortId) -> Result<PipeId> {
        let start = self.ports.get(&from).ok_or(GraphError::UnknownPort(from))?;
        let target = self.ports.get(&to).ok_or(GraphError::UnknownPort(to))?;
        if let Some(reason) = BasicConnectionValidator.validate(self, start, target).err() {
            return Err(GraphError::Rejected(reason));
        }

        self.evict_to_fit(to);
        self.evict_to_fit(from);
        let pipe = self.begin_connection(from)?;
        if let Err(err) = self.commit_connection(pipe, to) {
            self.delete_pipe(pipe);
            return Err(err);
        }
        Ok(pipe)
    }

    /// Delete the most recently attached pipes on `port` until one more fits.
    ///
    /// Returns the evicted pipes; empty for unbounded ports.
    pub fn evict_to_fit(&mut self, port: PortId) -> Vec<PipeId> {
        let mut evicted = Vec::new();
        loop {
            let Some(target) = self.ports.get(&port) else { break };
            if target.has_room() {
                break;
            }
            let Some(&last) = target.attached_pipes().last() else { break };
            if !self.delete_pipe(last) {
                if let Some(target) = self.ports.get_mut(&port) {
                    target.detach(last);
                }
            }
            debug!(pipe = %last, port = %port, "pipe evicted by connection limit");
            evicted.push(last);
        }
        evicted
    }

    // ========================================================================
    // Pipe state
    // ========================================================================

    pub fn set_pipe_tentative(&mut self, pipe: PipeId, tentative: bool) -> Result<()> {
        let changed = self
            .pipes
            .get_mut(&pipe)
            .ok_or(GraphError::UnknownPipe(pipe))?
            .set_tentative(tentative);
        if changed {
            trace!(pipe = %pipe, tentative, "tentative flag changed");
            self.emit(GraphEvent::TentativeChanged { pipe, tentative });
        }
        Ok(())
    }

    pub fn set_pipe_style(&mut self, pipe: PipeId, style: PipeStyle) -> Result<()> {
        self.pipes
            .get_mut(&pipe)
            .ok_or(GraphError::UnknownPipe(pipe))?
            .set_style(style);
        Ok(())
    }

    fn recompute_path(&mut self, pipe_id: PipeId) {
        let Some(connection) = self.connections.get(&pipe_id) else { return };
        let Some(from) = self.ports.get(&connection.from_port()) else { return };
        let Some(anchor) = self.nodes.get(&from.node()) else { return };
        let Some(pipe) = self.pipes.get_mut(&pipe_id) else { return };

        let path = *pipe.set_endpoints(
            connection.start_position(),
            connection.end_position(),
            anchor,
            from.direction(),
        );
        trace!(pipe = %pipe_id, start = %path.p0, end = %path.p3, "path recomputed");
        self.emit(GraphEvent::PathChanged { pipe: pipe_id, path });
    }

    // ========================================================================
    // Deletion
    // ========================================================================

    /// Delete a pipe, detaching it from its ports.
    ///
    /// Returns false (and does nothing) when the pipe is already gone.
    pub fn delete_pipe(&mut self, pipe_id: PipeId) -> bool {
        let Some(mut pipe) = self.pipes.remove(&pipe_id) else {
            return false;
        };
        if let Some(connection) = self.connections.remove(&pipe_id) {
            for (port, observer) in connection.observers() {
                if let Some(port) = self.ports.get_mut(&port) {
                    port.remove_observer(observer);
                }
            }
        }
        for port in [pipe.in_port(), pipe.out_port()].into_iter().flatten() {
            if let Some(port) = self.ports.get_mut(&port) {
                port.detach(pipe_id);
            }
        }
        pipe.unbind();
        debug!(pipe = %pipe_id, "pipe deleted");
        self.emit(GraphEvent::PipeDeleted { pipe: pipe_id });
        true
    }

    /// Delete a port together with every pipe touching it.
    pub fn delete_port(&mut self, port_id: PortId) -> bool {
        let Some(port) = self.ports.get(&port_id) else {
            return false;
        };
        let mut doomed = port.attached_pipes().to_vec();
        // A provisional pipe anchored here is not attached yet
        doomed.extend(
            self.connections
                .values()
                .filter(|c| c.from_port() == port_id || c.to_port() == Some(port_id))
                .map(|c| c.pipe()),
        );
        for pipe in doomed {
            self.delete_pipe(pipe);
        }

        let Some(port) = self.ports.remove(&port_id) else {
            return false;
        };
        let node = port.node();
        if let Some(owner) = self.nodes.get_mut(&node) {
            owner.remove_port(port_id);
        }
        debug!(port = %port_id, node = %node, "port deleted");
        self.emit(GraphEvent::PortDeleted { port: port_id, node });
        true
    }

    /// Delete a node: first every pipe on its ports, then the ports, then the node.
    pub fn delete_node(&mut self, node_id: NodeId) -> bool {
        let Some(node) = self.nodes.get(&node_id) else {
            return false;
        };
        let ports: Vec<PortId> = node.ports().collect();
        let pipes: Vec<PipeId> = ports
            .iter()
            .filter_map(|port| self.ports.get(port))
            .flat_map(|port| port.attached_pipes().iter().copied())
            .collect();
        for pipe in pipes {
            self.delete_pipe(pipe);
        }
        for port in ports {
            self.delete_port(port);
        }
        self.nodes.remove(&node_id);
        debug!(node = %node_id, "node deleted");
        self.emit(GraphEvent::NodeDeleted { node: node_id });
        true
    }
}
