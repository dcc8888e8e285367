//! Port lookup under the pointer.
//!
//! The controller never inspects scene geometry itself; it asks a
//! [`PortHitTest`] for the topmost port under the release position. The
//! rendering layer can plug in its own spatial index, or use
//! [`RadiusHitTest`], which checks distance to each port centre.

use crate::config::EditorConfig;
use crate::geometry::Point;
use crate::graph::{NodeGraph, NodeId, PortId};
use crate::port::Port;

/// Resolves the topmost port under a scene position
pub trait PortHitTest {
    fn topmost_port_at(&self, graph: &NodeGraph, position: Point) -> Option<PortId>;
}

impl<F> PortHitTest for F
where
    F: Fn(&NodeGraph, Point) -> Option<PortId>,
{
    fn topmost_port_at(&self, graph: &NodeGraph, position: Point) -> Option<PortId> {
        self(graph, position)
    }
}

/// Hit test by distance to port centres.
///
/// Nodes created later are drawn above earlier ones, so they are checked
/// first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusHitTest {
    pub radius: f32,
}

impl RadiusHitTest {
    pub fn new(radius: f32) -> Self {
        Self { radius }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(config.port_hit_radius)
    }
}

impl Default for RadiusHitTest {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}

impl PortHitTest for RadiusHitTest {
    fn topmost_port_at(&self, graph: &NodeGraph, position: Point) -> Option<PortId> {
        graph.nodes().rev().find_map(|node| {
            find_port_at(
                position,
                node.ports().filter_map(|port| graph.port(port)),
                self.radius,
            )
        })
    }
}

/// First port whose centre lies within `hit_radius` of `position`.
pub fn find_port_at<'a, I>(position: Point, ports: I, hit_radius: f32) -> Option<PortId>
where
    I: IntoIterator<Item = &'a Port>,
{
    let hit_radius_sq = hit_radius * hit_radius;
    ports
        .into_iter()
        .find(|port| port.position().distance_sq(position) <= hit_radius_sq)
        .map(|port| port.id())
}

/// Topmost node whose bounding rectangle contains `position`
pub fn topmost_node_at(graph: &NodeGraph, position: Point) -> Option<NodeId> {
    graph
        .nodes()
        .rev()
        .find(|node| node.bounding_rect().contains(position))
        .map(|node| node.id())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::PortConfig;

    #[test]
    fn test_hit_within_radius() {
        let mut graph = NodeGraph::new();
        let node = graph.add_node("A", Point::new(0.0, 0.0));
        let input = graph.add_port(node, PortConfig::input("in")).unwrap();

        // Input sits at (8, 50)
        let hit = RadiusHitTest::default();
        assert_eq!(hit.topmost_port_at(&graph, Point::new(12.0, 53.0)), Some(input));
        assert_eq!(hit.topmost_port_at(&graph, Point::new(8.0, 57.0)), None);
        assert_eq!(hit.topmost_port_at(&graph, Point::new(200.0, 200.0)), None);
    }

    #[test]
    fn test_later_node_wins_overlap() {
        let mut graph = NodeGraph::new();
        let below = graph.add_node("Below", Point::new(0.0, 0.0));
        let above = graph.add_node("Above", Point::new(0.0, 0.0));
        graph.add_port(below, PortConfig::input("in")).unwrap();
        let top = graph.add_port(above, PortConfig::input("in")).unwrap();

        let hit = RadiusHitTest::new(4.0);
        assert_eq!(hit.topmost_port_at(&graph, Point::new(8.0, 50.0)), Some(top));
        assert_eq!(topmost_node_at(&graph, Point::new(75.0, 20.0)), Some(above));
    }

    #[test]
    fn test_closure_hit_test() {
        let graph = NodeGraph::new();
        let fixed = |_: &NodeGraph, _: Point| Some(PortId(9));
        assert_eq!(fixed.topmost_port_at(&graph, Point::default()), Some(PortId(9)));
    }

    #[test]
    fn test_from_config_uses_hit_radius() {
        let config = EditorConfig::default().with_port_hit_radius(12.5);
        assert_eq!(RadiusHitTest::from_config(&config).radius, 12.5);
    }
}
