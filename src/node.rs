use crate::config::EditorConfig;
use crate::geometry::{Point, Rect};
use crate::graph::{NodeId, PortId};
use crate::port::Direction;

/// A container of ports with a bounding rectangle in scene coordinates.
///
/// Inputs sit along the left edge and outputs along the right edge; the
/// graph re-lays-out ports whenever the node is resized or gains a port.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    name: String,
    rect: Rect,
    inputs: Vec<PortId>,
    outputs: Vec<PortId>,
}

impl Node {
    pub(crate) fn new(id: NodeId, name: String, rect: Rect) -> Self {
        Self {
            id,
            name,
            rect,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bounding_rect(&self) -> Rect {
        self.rect
    }

    pub fn position(&self) -> Point {
        self.rect.origin()
    }

    pub fn inputs(&self) -> &[PortId] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[PortId] {
        &self.outputs
    }

    /// All ports, inputs first, each side in creation order
    pub fn ports(&self) -> impl Iterator<Item = PortId> + '_ {
        self.inputs.iter().chain(self.outputs.iter()).copied()
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_origin(&mut self, origin: Point) {
        self.rect.x = origin.x;
        self.rect.y = origin.y;
    }

    pub(crate) fn set_size(&mut self, width: f32, height: f32) {
        self.rect.width = width;
        self.rect.height = height;
    }

    pub(crate) fn push_port(&mut self, direction: Direction, port: PortId) {
        match direction {
            Direction::In => self.inputs.push(port),
            Direction::Out => self.outputs.push(port),
        }
    }

    pub(crate) fn remove_port(&mut self, port: PortId) {
        self.inputs.retain(|&p| p != port);
        self.outputs.retain(|&p| p != port);
    }

    /// Smallest size that satisfies the configured minimum and fits the ports
    pub(crate) fn fitted_size(&self, width: f32, height: f32, config: &EditorConfig) -> (f32, f32) {
        let rows = self.inputs.len().max(self.outputs.len()) + 1;
        let ports_height = config.port_size * 2.0 * rows as f32;
        (
            width.max(config.min_node_width),
            height.max(config.min_node_height).max(ports_height),
        )
    }

    /// Absolute scene position of every port under the current rectangle.
    pub(crate) fn port_layout(&self, port_size: f32) -> Vec<(PortId, Point)> {
        let origin = self.rect.origin();
        let left = port_size;
        let right = self.rect.width - port_size;

        let mut layout = Vec::with_capacity(self.inputs.len() + self.outputs.len());
        for (side, x) in [(&self.inputs, left), (&self.outputs, right)] {
            let ys = edge_offsets(side.len(), self.rect.height, port_size);
            layout.extend(
                side.iter()
                    .zip(ys)
                    .map(|(&port, y)| (port, origin + Point::new(x, y))),
            );
        }
        layout
    }
}

/// Vertical offsets for `count` ports spread along an edge of `height`.
fn edge_offsets(count: usize, height: f32, port_size: f32) -> Vec<f32> {
    match count {
        0 => Vec::new(),
        1 => vec![height / 2.0],
        n => {
            let chunk = height / (n - 1) as f32;
            (0..n)
                .map(|i| {
                    if i == 0 {
                        port_size
                    } else if i == n - 1 {
                        height - port_size
                    } else {
                        chunk * i as f32
                    }
                })
                .collect()
        }
    }
}
