use bit_set::BitSet;
use crate::{Node, Weight, Set};
use crate::data::Instance;

/// One mandatory group: either a node that must appear somewhere on the route,
/// or a segment `from -> to` that must be traversed as a single step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Waypoint {
  Node(Node),
  Segment { from: Node, to: Node, weight: Weight },
}

impl Waypoint {
  /// Node a route arrives at to start this group.
  #[inline]
  pub fn entry(&self) -> Node {
    match *self {
      Waypoint::Node(n) => n,
      Waypoint::Segment { from, .. } => from,
    }
  }

  /// Node a route is at after finishing this group.
  #[inline]
  pub fn exit(&self) -> Node {
    match *self {
      Waypoint::Node(n) => n,
      Waypoint::Segment { to, .. } => to,
    }
  }

  /// Weight added on top of the path to the entry node.
  #[inline]
  pub fn weight(&self) -> Weight {
    match *self {
      Waypoint::Node(_) => 0.0,
      Waypoint::Segment { weight, .. } => weight,
    }
  }

  pub fn is_satisfied_by(&self, route: &[Node]) -> bool {
    match *self {
      Waypoint::Node(n) => route.contains(&n),
      Waypoint::Segment { from, to, .. } => route.windows(2).any(|w| w[0] == from && w[1] == to),
    }
  }

  pub fn with_unit_weight(self) -> Waypoint {
    match self {
      Waypoint::Segment { from, to, .. } => Waypoint::Segment { from, to, weight: 1.0 },
      node => node,
    }
  }
}

/// Mandatory groups of an instance: nodes first, then segments, each in file order.
/// Repeated entries are listed once.
pub fn from_instance(instance: &Instance) -> Vec<Waypoint> {
  let mut seen_nodes = Set::default();
  let mut seen_segments = Set::default();

  let nodes = instance.green_nodes.iter()
    .filter(|&&n| seen_nodes.insert(n))
    .map(|&n| Waypoint::Node(n));

  let segments = instance.green_edges.iter()
    .filter(|&&(arc, _)| seen_segments.insert(arc))
    .map(|&((from, to), weight)| Waypoint::Segment { from, to, weight });

  nodes.chain(segments).collect()
}

/// Indices of the groups in `waypoints` that `route` satisfies.
pub fn satisfied(waypoints: &[Waypoint], route: &[Node]) -> BitSet {
  let mut done = BitSet::with_capacity(waypoints.len());
  for (k, w) in waypoints.iter().enumerate() {
    if w.is_satisfied_by(route) {
      done.insert(k);
    }
  }
  done
}
