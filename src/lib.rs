//! # pipe-graph
//!
//! Connection engine for visual node-graph editors: nodes carry input and
//! output ports, and pipes (cubic bezier connectors) are drawn between
//! ports by dragging.
//!
//! ## Features
//!
//! - **Arena graph** - [`NodeGraph`] owns nodes, ports and pipes; handles
//!   are plain ids and deletion cascades from nodes to ports to pipes
//! - **Live paths** - ports notify registered observers synchronously, so
//!   every attached pipe is redrawn before a move returns
//! - **Drag to connect** - [`GraphInteractionController`] implements the
//!   drop policy: validation, connection limits, replace or extend
//! - **Pluggable rules** - extra [`ConnectionValidator`]s and your own
//!   [`PortHitTest`]
//! - **Slint ready** - [`NodeEditor`] hands out UI callbacks and keeps a
//!   `VecModel` of pipe paths in step with the graph
//!
//! ## Quick Start
//!
//! ```
//! use pipe_graph::{DragOutcome, GraphInteractionController, NodeGraph, Point, PortConfig, RadiusHitTest};
//!
//! let mut graph = NodeGraph::new();
//! let source = graph.add_node("Source", Point::new(0.0, 0.0));
//! let sink = graph.add_node("Sink", Point::new(300.0, 0.0));
//! let out = graph.add_port(source, PortConfig::output("value")).unwrap();
//! let input = graph.add_port(sink, PortConfig::input("value")).unwrap();
//!
//! let mut controller = GraphInteractionController::new();
//! controller.start_connection(&mut graph, out).unwrap();
//! controller.update_drag(&mut graph, Point::new(250.0, 40.0));
//!
//! let drop_at = graph.port(input).unwrap().position();
//! let outcome = controller.finish_connection(&mut graph, &RadiusHitTest::default(), drop_at);
//! assert!(matches!(outcome, DragOutcome::Committed { .. }));
//! assert_eq!(graph.connected_ports(out), vec![input]);
//! ```
//!
//! The library logs through `tracing` and never installs a subscriber.

pub mod config;
pub mod connection;
pub mod controller;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod hit_test;
pub mod node;
pub mod path;
pub mod pipe;
pub mod port;
pub mod render;
pub mod validation;

pub use config::EditorConfig;
pub use connection::{Connection, ConnectionState};
pub use controller::{ActiveDrag, DragOutcome, DragState, GraphInteractionController};
pub use editor::NodeEditor;
pub use error::{GraphError, Result};
pub use geometry::{Point, Rect};
pub use graph::{GraphEvent, ListenerId, NodeGraph, NodeId, PipeId, PortId};
pub use hit_test::{find_port_at, topmost_node_at, PortHitTest, RadiusHitTest};
pub use node::Node;
pub use path::{build_pipe_path, CubicBezier};
pub use pipe::{Pipe, PipeStyle};
pub use port::{ConnectionLimit, Direction, Endpoint, ObserverId, Port, PortConfig};
pub use render::{pipe_paths, PipePathData, PipePathRenderer};
pub use validation::{
    validate_drop, BasicConnectionValidator, CompositeValidator, ConnectionValidator,
    NoDuplicatesValidator, ValidationError, ValidationResult,
};
