use crate::geometry::Point;
use crate::port::Direction;

/// Cubic bezier segment of a pipe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    pub p0: Point, // Start point
    pub p1: Point, // Control point 1
    pub p2: Point, // Control point 2
    pub p3: Point, // End point
}

impl CubicBezier {
    /// A zero-length segment sitting on `p`, used before a pipe has an end.
    pub fn point(p: Point) -> Self {
        Self { p0: p, p1: p, p2: p, p3: p }
    }

    pub fn start(&self) -> Point {
        self.p0
    }

    pub fn end(&self) -> Point {
        self.p3
    }

    /// Evaluate the bezier curve at parameter t (0.0 to 1.0)
    pub fn eval(&self, t: f32) -> Point {
        let t2 = t * t;
        let t3 = t2 * t;
        let mt = 1.0 - t;
        let mt2 = mt * mt;
        let mt3 = mt2 * mt;

        let x = mt3 * self.p0.x
            + 3.0 * mt2 * t * self.p1.x
            + 3.0 * mt * t2 * self.p2.x
            + t3 * self.p3.x;
        let y = mt3 * self.p0.y
            + 3.0 * mt2 * t * self.p1.y
            + 3.0 * mt * t2 * self.p2.y
            + t3 * self.p3.y;

        Point::new(x, y)
    }

    /// SVG path command for a Slint `Path` element
    ///
    /// # Returns
    /// e.g. "M 10 20 C 60 20 90 80 140 80"
    pub fn to_svg_commands(&self) -> String {
        format!(
            "M {} {} C {} {} {} {} {} {}",
            self.p0.x, self.p0.y, self.p1.x, self.p1.y, self.p2.x, self.p2.y, self.p3.x, self.p3.y
        )
    }
}

/// Compute the pipe curve between two endpoints
///
/// The control points bow horizontally away from the start port's node:
/// to the left for an input (which sits on the node's left edge), to the
/// right for an output. The bow is the horizontal distance between the
/// endpoints, clamped to the anchoring node's width so short pipes stay
/// tight and long ones do not overshoot. Both control points keep their
/// endpoint's `y`.
///
/// # Arguments
/// * `start` - Position of the port the connection was drawn from
/// * `end` - Far end: the other port, or the pointer while dragging
/// * `anchor_width` - Bounding width of the node owning the start port
/// * `start_direction` - Direction of the start port
pub fn build_pipe_path(
    start: Point,
    end: Point,
    anchor_width: f32,
    start_direction: Direction,
) -> CubicBezier {
    let tangent = (start.x - end.x).abs().min(anchor_width);

    let (ctrl1_x, ctrl2_x) = match start_direction {
        Direction::In => (start.x - tangent, end.x + tangent),
        Direction::Out => (start.x + tangent, end.x - tangent),
    };

    CubicBezier {
        p0: start,
        p1: Point::new(ctrl1_x, start.y),
        p2: Point::new(ctrl2_x, end.y),
        p3: end,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // build_pipe_path() - Tangent Calculation
    // ========================================================================

    #[test]
    fn test_out_port_bows_right_then_left() {
        let path = build_pipe_path(Point::new(0.0, 0.0), Point::new(100.0, 50.0), 150.0, Direction::Out);

        assert_eq!(path.p0, Point::new(0.0, 0.0));
        assert_eq!(path.p1, Point::new(100.0, 0.0));
        assert_eq!(path.p2, Point::new(0.0, 50.0));
        assert_eq!(path.p3, Point::new(100.0, 50.0));
    }

    #[test]
    fn test_in_port_bows_left_then_right() {
        let path = build_pipe_path(Point::new(200.0, 10.0), Point::new(120.0, 90.0), 150.0, Direction::In);

        assert_eq!(path.p1, Point::new(120.0, 10.0));
        assert_eq!(path.p2, Point::new(200.0, 90.0));
    }

    #[test]
    fn test_tangent_clamped_to_anchor_width() {
        let path = build_pipe_path(Point::new(0.0, 0.0), Point::new(500.0, 0.0), 150.0, Direction::Out);

        assert_eq!(path.p1.x, 150.0);
        assert_eq!(path.p2.x, 350.0);
    }

    #[test]
    fn test_tangent_uses_absolute_distance() {
        // End to the left of an output start: still bows right out of the port
        let path = build_pipe_path(Point::new(100.0, 0.0), Point::new(40.0, 30.0), 150.0, Direction::Out);

        assert_eq!(path.p1.x, 160.0);
        assert_eq!(path.p2.x, -20.0);
    }

    #[test]
    fn test_control_points_keep_endpoint_y() {
        let path = build_pipe_path(Point::new(5.0, -40.0), Point::new(80.0, 70.0), 150.0, Direction::In);

        assert_eq!(path.p1.y, -40.0);
        assert_eq!(path.p2.y, 70.0);
    }

    #[test]
    fn test_vertical_pipe_has_no_bow() {
        let path = build_pipe_path(Point::new(50.0, 0.0), Point::new(50.0, 100.0), 150.0, Direction::Out);

        assert_eq!(path.p1.x, 50.0);
        assert_eq!(path.p2.x, 50.0);
    }

    #[test]
    fn test_same_inputs_same_path() {
        let a = build_pipe_path(Point::new(3.0, 4.0), Point::new(250.0, -7.5), 120.0, Direction::Out);
        let b = build_pipe_path(Point::new(3.0, 4.0), Point::new(250.0, -7.5), 120.0, Direction::Out);
        assert_eq!(a, b);
    }

    // ========================================================================
    // CubicBezier
    // ========================================================================

    #[test]
    fn test_eval_at_bounds_returns_endpoints() {
        let bezier = build_pipe_path(Point::new(10.0, 20.0), Point::new(100.0, 80.0), 150.0, Direction::Out);

        let start = bezier.eval(0.0);
        let end = bezier.eval(1.0);
        assert!((start.x - 10.0).abs() < 0.001);
        assert!((start.y - 20.0).abs() < 0.001);
        assert!((end.x - 100.0).abs() < 0.001);
        assert!((end.y - 80.0).abs() < 0.001);
    }

    #[test]
    fn test_eval_symmetric_s_curve() {
        // Endpoints at equal y: the S-curve is symmetric around the middle
        let bezier = build_pipe_path(Point::new(0.0, 0.0), Point::new(100.0, 0.0), 150.0, Direction::Out);

        let left = bezier.eval(0.25);
        let right = bezier.eval(0.75);
        assert!((left.x + right.x - 100.0).abs() < 0.1);
        assert!((left.y - right.y).abs() < 0.001);
    }

    #[test]
    fn test_point_bezier_is_degenerate() {
        let p = Point::new(50.0, 50.0);
        let bezier = CubicBezier::point(p);
        assert_eq!(bezier.eval(0.5), p);
        assert_eq!(bezier.start(), bezier.end());
    }

    #[test]
    fn test_svg_commands_format() {
        let bezier = build_pipe_path(Point::new(10.0, 20.0), Point::new(100.0, 80.0), 150.0, Direction::Out);
        let path = bezier.to_svg_commands();

        assert!(path.starts_with("M 10 20 C"));
        assert!(path.ends_with("100 80"));
        assert_eq!(path, "M 10 20 C 100 20 10 80 100 80");
    }
}
