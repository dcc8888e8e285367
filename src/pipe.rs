//! Pipes: the visual edge between one input port and one output port.
//!
//! A pipe carries no connectivity logic of its own beyond remembering its
//! bound ports; it stores the path last computed for it and the styling
//! state the renderer reads.

use crate::error::{GraphError, Result};
use crate::geometry::Point;
use crate::graph::{PipeId, PortId};
use crate::node::Node;
use crate::path::{build_pipe_path, CubicBezier};
use crate::port::{Direction, Port};
use slint::Color;

/// Colours and widths for the two visual states of a pipe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipeStyle {
    pub color: Color,
    pub line_width: f32,
    /// Dotted look while the pipe may be replaced or removed
    pub tentative_color: Color,
    pub tentative_line_width: f32,
}

impl Default for PipeStyle {
    fn default() -> Self {
        Self {
            color: Color::from_rgb_u8(0xC2, 0x8D, 0x34),
            line_width: 2.0,
            tentative_color: Color::from_rgb_u8(0x6B, 0x3C, 0x6A),
            tentative_line_width: 1.0,
        }
    }
}

impl PipeStyle {
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_tentative_color(mut self, color: Color) -> Self {
        self.tentative_color = color;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Pipe {
    id: PipeId,
    path: CubicBezier,
    in_port: Option<PortId>,
    out_port: Option<PortId>,
    tentative: bool,
    style: PipeStyle,
}

impl Pipe {
    pub(crate) fn new(id: PipeId, start: Point, style: PipeStyle) -> Self {
        Self {
            id,
            path: CubicBezier::point(start),
            in_port: None,
            out_port: None,
            tentative: false,
            style,
        }
    }

    pub fn id(&self) -> PipeId {
        self.id
    }

    pub fn path(&self) -> &CubicBezier {
        &self.path
    }

    pub fn in_port(&self) -> Option<PortId> {
        self.in_port
    }

    pub fn out_port(&self) -> Option<PortId> {
        self.out_port
    }

    /// Whether both ends are bound
    pub fn is_bound(&self) -> bool {
        self.in_port.is_some() && self.out_port.is_some()
    }

    /// The port at the opposite end from `port`, if `port` is bound here
    pub fn other_end(&self, port: PortId) -> Option<PortId> {
        if self.in_port == Some(port) {
            self.out_port
        } else if self.out_port == Some(port) {
            self.in_port
        } else {
            None
        }
    }

    pub fn is_tentative(&self) -> bool {
        self.tentative
    }

    pub fn style(&self) -> &PipeStyle {
        &self.style
    }

    /// Colour and width matching the current tentative state
    pub fn current_stroke(&self) -> (Color, f32) {
        if self.tentative {
            (self.style.tentative_color, self.style.tentative_line_width)
        } else {
            (self.style.color, self.style.line_width)
        }
    }

    pub(crate) fn set_style(&mut self, style: PipeStyle) {
        self.style = style;
    }

    /// Recompute the stored path; `anchor` is the node owning the start port.
    pub(crate) fn set_endpoints(
        &mut self,
        start: Point,
        end: Point,
        anchor: &Node,
        start_direction: Direction,
    ) -> &CubicBezier {
        self.path = build_pipe_path(start, end, anchor.bounding_rect().width, start_direction);
        &self.path
    }

    /// Returns true when the flag actually changed.
    pub(crate) fn set_tentative(&mut self, tentative: bool) -> bool {
        let changed = self.tentative != tentative;
        self.tentative = tentative;
        changed
    }

    /// Record the two endpoints of a committed pipe.
    ///
    /// The ports may be passed in either order; they are sorted into the
    /// input and output slot by direction, returned as `(in, out)`.
    pub(crate) fn bind(&mut self, a: &Port, b: &Port) -> Result<(PortId, PortId)> {
        if a.direction() == b.direction() {
            return Err(GraphError::InvalidBinding {
                in_port: a.id(),
                out_port: b.id(),
            });
        }
        if a.node() == b.node() {
            return Err(GraphError::SameNode(a.id(), b.id()));
        }
        let (input, output) = match a.direction() {
            Direction::In => (a, b),
            Direction::Out => (b, a),
        };
        self.in_port = Some(input.id());
        self.out_port = Some(output.id());
        Ok((input.id(), output.id()))
    }

    pub(crate) fn unbind(&mut self) {
        self.in_port = None;
        self.out_port = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeId;
    use crate::port::PortConfig;

    fn port(id: i32, node: i32, direction: Direction) -> Port {
        Port::new(
            PortId(id),
            NodeId(node),
            PortConfig::new("p", direction),
            Point::default(),
        )
    }

    #[test]
    fn test_new_pipe_is_unbound_and_normal() {
        let pipe = Pipe::new(PipeId(1), Point::new(3.0, 4.0), PipeStyle::default());
        assert!(!pipe.is_bound());
        assert!(!pipe.is_tentative());
        assert_eq!(pipe.path().start(), Point::new(3.0, 4.0));
        assert_eq!(pipe.path().end(), Point::new(3.0, 4.0));
    }

    #[test]
    fn test_bind_sorts_ports_by_direction() {
        let mut pipe = Pipe::new(PipeId(1), Point::default(), PipeStyle::default());
        let input = port(10, 1, Direction::In);
        let output = port(20, 2, Direction::Out);

        pipe.bind(&input, &output).unwrap();
        assert_eq!(pipe.in_port(), Some(PortId(10)));
        assert_eq!(pipe.out_port(), Some(PortId(20)));

        pipe.bind(&output, &input).unwrap();
        assert_eq!(pipe.in_port(), Some(PortId(10)));
        assert_eq!(pipe.out_port(), Some(PortId(20)));
    }

    #[test]
    fn test_bind_rejects_same_direction() {
        let mut pipe = Pipe::new(PipeId(1), Point::default(), PipeStyle::default());
        let a = port(10, 1, Direction::In);
        let b = port(11, 2, Direction::In);

        assert_eq!(
            pipe.bind(&a, &b),
            Err(GraphError::InvalidBinding {
                in_port: PortId(10),
                out_port: PortId(11)
            })
        );
        assert!(!pipe.is_bound());
    }

    #[test]
    fn test_bind_rejects_same_node() {
        let mut pipe = Pipe::new(PipeId(1), Point::default(), PipeStyle::default());
        let a = port(10, 1, Direction::In);
        let b = port(11, 1, Direction::Out);

        assert_eq!(pipe.bind(&a, &b), Err(GraphError::SameNode(PortId(10), PortId(11))));
    }

    #[test]
    fn test_other_end() {
        let mut pipe = Pipe::new(PipeId(1), Point::default(), PipeStyle::default());
        pipe.bind(&port(10, 1, Direction::In), &port(20, 2, Direction::Out)).unwrap();

        assert_eq!(pipe.other_end(PortId(10)), Some(PortId(20)));
        assert_eq!(pipe.other_end(PortId(20)), Some(PortId(10)));
        assert_eq!(pipe.other_end(PortId(99)), None);
    }

    #[test]
    fn test_set_tentative_reports_changes_only() {
        let mut pipe = Pipe::new(PipeId(1), Point::default(), PipeStyle::default());
        assert!(pipe.set_tentative(true));
        assert!(!pipe.set_tentative(true));
        assert_eq!(pipe.current_stroke(), (PipeStyle::default().tentative_color, 1.0));
        assert!(pipe.set_tentative(false));
        assert_eq!(pipe.current_stroke(), (PipeStyle::default().color, 2.0));
    }
}
