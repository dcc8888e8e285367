//! Editor-wide tunables.
//!
//! All values are in scene units. Defaults match the stock look of the
//! editor: 8-unit round ports, 150x100 minimum nodes, an amber pipe that
//! turns into a thin violet line while it is a candidate for replacement.

use crate::pipe::PipeStyle;

/// Configuration shared by the graph, the hit tester and the editor facade.
#[derive(Clone, Debug, PartialEq)]
pub struct EditorConfig {
    /// Diameter of a port; also the inset of ports from the node edge
    pub port_size: f32,
    /// Pointer distance within which a port counts as hit
    pub port_hit_radius: f32,
    pub min_node_width: f32,
    pub min_node_height: f32,
    /// Style given to newly created pipes
    pub pipe_style: PipeStyle,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            port_size: 8.0,
            port_hit_radius: 6.0,
            min_node_width: 150.0,
            min_node_height: 100.0,
            pipe_style: PipeStyle::default(),
        }
    }
}

impl EditorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_port_size(mut self, size: f32) -> Self {
        self.port_size = size;
        self
    }

    pub fn with_port_hit_radius(mut self, radius: f32) -> Self {
        self.port_hit_radius = radius;
        self
    }

    /// Set the minimum node size; nodes are never resized below it.
    pub fn with_min_node_size(mut self, width: f32, height: f32) -> Self {
        self.min_node_width = width;
        self.min_node_height = height;
        self
    }

    pub fn with_pipe_style(mut self, style: PipeStyle) -> Self {
        self.pipe_style = style;
        self
    }
}
