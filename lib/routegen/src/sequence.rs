use bit_set::BitSet;
use anyhow::Result;
use tracing::*;

use crate::{Error, Graph, Node, Weight, Waypoint};
use crate::search::{shortest_path, Path};

/// One shortest-path hop of an itinerary.
#[derive(Debug, Clone, PartialEq)]
pub struct Leg {
  /// Waypoint group this leg completes, `None` for the final leg to the end node.
  pub group: Option<usize>,
  pub nodes: Vec<Node>,
  pub weight: Weight,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Itinerary {
  pub legs: Vec<Leg>,
  pub weight: Weight,
  /// All legs joined, with the node shared by consecutive legs listed once.
  pub route: Vec<Node>,
}

impl Itinerary {
  fn from_legs(legs: Vec<Leg>) -> Itinerary {
    let weight = legs.iter().map(|l| l.weight).sum();
    let mut route: Vec<Node> = Vec::new();
    for leg in &legs {
      let skip = if route.is_empty() { 0 } else { 1 };
      route.extend_from_slice(&leg.nodes[skip..]);
    }
    Itinerary { legs, weight, route }
  }
}

/// Greedy nearest-next visitor of the waypoint groups.
pub struct Sequencer<'a> {
  graph: &'a Graph,
  waypoints: &'a [Waypoint],
}

impl<'a> Sequencer<'a> {
  pub fn new(graph: &'a Graph, waypoints: &'a [Waypoint]) -> Self {
    Sequencer { graph, waypoints }
  }

  /// Goes from `start` to the closest unvisited group until all are visited, then to `end`.
  ///
  /// A segment is entered at its `from` node and left at its `to` node, adding
  /// its own weight.  Ties between equally close groups go to the earlier group.
  #[instrument(level="debug", skip(self))]
  pub fn run(&self, start: Node, end: Node) -> Result<Itinerary> {
    let mut visited = BitSet::with_capacity(self.waypoints.len());
    let mut legs = Vec::with_capacity(self.waypoints.len() + 1);
    let mut pos = start;

    while visited.len() < self.waypoints.len() {
      let mut best: Option<(usize, Path)> = None;
      let mut first_unvisited = None;

      for (k, w) in self.waypoints.iter().enumerate() {
        if visited.contains(k) { continue; }
        first_unvisited.get_or_insert(w.entry());
        if let Some(path) = shortest_path(self.graph, pos, w.entry()) {
          if best.as_ref().map_or(true, |(_, b)| path.weight < b.weight) {
            best = Some((k, path));
          }
        }
      }

      let (k, Path { mut weight, mut nodes }) = match best {
        Some(b) => b,
        None => {
          let to = first_unvisited.unwrap_or(end);
          return Err(Error::Unreachable { from: pos, to }.into());
        }
      };

      let group = &self.waypoints[k];
      if let Waypoint::Segment { to, weight: w, .. } = *group {
        nodes.push(to);
        weight += w;
      }
      trace!(group=k, ?nodes, weight, "leg");
      visited.insert(k);
      pos = group.exit();
      legs.push(Leg { group: Some(k), nodes, weight });
    }

    let Path { weight, nodes } = shortest_path(self.graph, pos, end)
      .ok_or(Error::Unreachable { from: pos, to: end })?;
    trace!(?nodes, weight, "final leg");
    legs.push(Leg { group: None, nodes, weight });

    let itinerary = Itinerary::from_legs(legs);
    debug!(weight=itinerary.weight, nodes=itinerary.route.len(), "sequenced");
    Ok(itinerary)
  }
}

/// Lower bound on the number of route nodes needed to visit every group: the
/// greedy itinerary over unit weights, counted in steps, plus one.
#[instrument(level="debug", skip(graph, waypoints))]
pub fn min_steps(graph: &Graph, waypoints: &[Waypoint], start: Node, end: Node) -> Result<usize> {
  let graph = graph.unweighted();
  let waypoints: Vec<_> = waypoints.iter().map(|w| w.with_unit_weight()).collect();
  let itinerary = Sequencer::new(&graph, &waypoints).run(start, end)?;
  let steps = itinerary.legs.iter().map(|l| l.weight).sum::<Weight>() as usize + 1;
  debug!(steps);
  Ok(steps)
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::graph::tests::{arb_graph, cycle4};
  use crate::init_test_logging;
  use proptest::prelude::*;

  #[test]
  fn cycle_with_waypoint() -> Result<()> {
    init_test_logging(None::<&str>);
    let g = cycle4();
    let w = [Waypoint::Node(2)];
    let it = Sequencer::new(&g, &w).run(0, 0)?;
    assert_eq!(it.route, vec![0, 1, 2, 3, 0]);
    assert_eq!(it.weight, 4.0);
    assert_eq!(it.legs.len(), 2);
    assert_eq!(it.legs[0].group, Some(0));
    assert_eq!(it.legs[1].group, None);
    assert_eq!(min_steps(&g, &w, 0, 0)?, 5);
    Ok(())
  }

  #[test]
  fn no_waypoints_is_shortest_path() -> Result<()> {
    let g = Graph::from_edges(&[((0, 2), 10.0), ((0, 1), 2.0), ((1, 2), 3.0)]);
    let it = Sequencer::new(&g, &[]).run(0, 2)?;
    assert_eq!(it.route, vec![0, 1, 2]);
    assert_eq!(it.weight, 5.0);
    assert_eq!(min_steps(&g, &[], 0, 2)?, 2);
    Ok(())
  }

  #[test]
  fn nearest_group_first() -> Result<()> {
    // 0 -> 1 -> 2 -> 3 -> 4, with a shortcut 0 -> 3
    let g = Graph::from_edges(&[((0, 1), 1.0), ((1, 2), 1.0), ((2, 3), 1.0), ((3, 4), 1.0), ((0, 3), 1.0), ((3, 1), 1.0)]);
    let w = [Waypoint::Node(1), Waypoint::Node(3)];
    let it = Sequencer::new(&g, &w).run(0, 4)?;
    // both are one step away: the earlier group wins the tie
    assert_eq!(it.legs[0].group, Some(0));
    assert_eq!(it.route, vec![0, 1, 2, 3, 4]);
    Ok(())
  }

  #[test]
  fn segment_is_traversed_in_order() -> Result<()> {
    let g = Graph::from_edges(&[((0, 1), 1.0), ((1, 2), 1.0), ((2, 3), 1.0), ((3, 0), 1.0), ((0, 2), 1.0)]);
    let w = [Waypoint::Segment { from: 1, to: 2, weight: 5.0 }];
    let it = Sequencer::new(&g, &w).run(0, 3)?;
    assert_eq!(it.route, vec![0, 1, 2, 3]);
    assert_eq!(it.legs[0].nodes, vec![0, 1, 2]);
    assert_eq!(it.legs[0].weight, 6.0);
    assert_eq!(it.weight, 7.0);
    assert_eq!(min_steps(&g, &w, 0, 3)?, 4);
    Ok(())
  }

  #[test]
  fn unreachable_group() {
    let g = Graph::from_edges(&[((0, 1), 1.0), ((2, 1), 1.0)]);
    let err = Sequencer::new(&g, &[Waypoint::Node(2)]).run(0, 1).unwrap_err();
    assert_eq!(err.downcast_ref::<Error>(), Some(&Error::Unreachable { from: 0, to: 2 }));

    let err = Sequencer::new(&g, &[Waypoint::Node(1)]).run(0, 2).unwrap_err();
    assert_eq!(err.downcast_ref::<Error>(), Some(&Error::Unreachable { from: 1, to: 2 }));
  }

  proptest! {
    #[test]
    fn itinerary_is_continuous(
      g in arb_graph(10),
      s in 0usize..10,
      t in 0usize..10,
      groups in proptest::collection::vec(0usize..10, 0..4),
      segments in proptest::collection::vec(any::<usize>(), 0..3),
    ) {
      let n = g.num_nodes();
      let (s, t) = (s % n, t % n);
      let edges: Vec<_> = g.edges().filter(|&((i, j), _)| i != j).collect();
      let mut waypoints: Vec<_> = groups.iter().map(|&k| Waypoint::Node(k % n)).collect();
      if !edges.is_empty() {
        waypoints.extend(segments.iter().map(|&k| {
          let ((from, to), weight) = edges[k % edges.len()];
          Waypoint::Segment { from, to, weight }
        }));
      }
      if let Ok(it) = Sequencer::new(&g, &waypoints).run(s, t) {
        prop_assert_eq!(it.route.first(), Some(&s));
        prop_assert_eq!(it.route.last(), Some(&t));
        prop_assert!(g.is_walk(&it.route));
        prop_assert_eq!(g.route_weight(&it.route), it.weight);

        let mut seen: Vec<_> = it.legs.iter().filter_map(|l| l.group).collect();
        seen.sort_unstable();
        prop_assert_eq!(seen, (0..waypoints.len()).collect::<Vec<_>>());
        for leg in &it.legs {
          if let Some(k) = leg.group {
            prop_assert_eq!(leg.nodes.last(), Some(&waypoints[k].exit()));
          }
        }
        for w in &waypoints {
          prop_assert!(w.is_satisfied_by(&it.route));
        }
      }
    }
  }
}
