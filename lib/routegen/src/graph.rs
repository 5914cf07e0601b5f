use itertools::Itertools;
use anyhow::Result;

use crate::{Error, INF};
use crate::data::{Node, Weight, Edge};

/// Directed graph with weighted edges over the nodes `0..n`.
///
/// Weights live in a dense `n * n` matrix with an explicit presence flag, so an
/// edge of weight zero is distinct from a missing edge.  The out-neighbours of
/// each node are kept separately, in insertion order, for walking the graph.
/// A graph never changes after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
  num_nodes: usize,
  weights: Vec<Option<Weight>>,
  neighbours: Vec<Vec<Node>>,
}

impl Graph {
  /// Builds a graph on `num_nodes` nodes.  A repeated edge overwrites the earlier weight.
  pub fn new(num_nodes: usize, edges: impl IntoIterator<Item=Edge>) -> Result<Graph> {
    let mut graph = Graph {
      num_nodes,
      weights: vec![None; num_nodes * num_nodes],
      neighbours: vec![Vec::new(); num_nodes],
    };
    for ((i, j), w) in edges {
      if i >= num_nodes { return Err(Error::NodeOutOfRange(i).into()); }
      if j >= num_nodes { return Err(Error::NodeOutOfRange(j).into()); }
      let slot = &mut graph.weights[i * num_nodes + j];
      if slot.is_none() {
        graph.neighbours[i].push(j);
      }
      *slot = Some(w);
    }
    Ok(graph)
  }

  /// Builds a graph just large enough to hold every edge endpoint.
  pub fn from_edges(edges: &[Edge]) -> Graph {
    let num_nodes = edges.iter()
      .map(|&((i, j), _)| i.max(j) + 1)
      .max()
      .unwrap_or(0);
    Graph::new(num_nodes, edges.iter().copied())
      .expect("node count covers every endpoint")
  }

  #[inline]
  pub fn num_nodes(&self) -> usize { self.num_nodes }

  pub fn num_edges(&self) -> usize {
    self.neighbours.iter().map(Vec::len).sum()
  }

  /// Stored weight of `u -> v`, without the implicit zero-cost self step.
  #[inline]
  pub fn edge(&self, u: Node, v: Node) -> Option<Weight> {
    if u >= self.num_nodes || v >= self.num_nodes {
      return None;
    }
    self.weights[u * self.num_nodes + v]
  }

  #[inline]
  pub fn has_edge(&self, u: Node, v: Node) -> bool {
    self.edge(u, v).is_some()
  }

  /// Cost of going from `u` to `v` in one step: `0` if `u == v`, [`INF`] if there
  /// is no such edge (or either node is out of range), otherwise the edge weight.
  #[inline]
  pub fn weight(&self, u: Node, v: Node) -> Weight {
    if u == v {
      return 0.0;
    }
    self.edge(u, v).unwrap_or(INF)
  }

  /// Out-neighbours of `u`; empty for nodes out of range.
  #[inline]
  pub fn neighbours(&self, u: Node) -> &[Node] {
    self.neighbours.get(u).map_or(&[], Vec::as_slice)
  }

  pub fn edges<'a>(&'a self) -> impl Iterator<Item=Edge> + 'a {
    self.neighbours.iter()
      .enumerate()
      .flat_map(move |(i, nbrs)| nbrs.iter().map(move |&j| ((i, j), self.weights[i * self.num_nodes + j].unwrap_or(INF))))
  }

  /// Same topology with every edge weight set to 1, for counting steps instead of cost.
  pub fn unweighted(&self) -> Graph {
    Graph {
      num_nodes: self.num_nodes,
      weights: self.weights.iter().map(|w| w.map(|_| 1.0)).collect(),
      neighbours: self.neighbours.clone(),
    }
  }

  /// Total weight of the steps of `route`; [`INF`] if some step is not an edge.
  pub fn route_weight(&self, route: &[Node]) -> Weight {
    route.iter()
      .tuple_windows()
      .map(|(&u, &v)| self.weight(u, v))
      .sum()
  }

  /// True if every consecutive pair of `route` is an edge.
  pub fn is_walk(&self, route: &[Node]) -> bool {
    route.iter().tuple_windows().all(|(&u, &v)| self.has_edge(u, v))
  }
}


#[cfg(test)]
pub(crate) mod tests {
  use super::*;
  use proptest::prelude::*;

  /// 0 -> 1 -> 2 -> 3 -> 0 with unit weights.
  pub fn cycle4() -> Graph {
    Graph::from_edges(&[((0, 1), 1.0), ((1, 2), 1.0), ((2, 3), 1.0), ((3, 0), 1.0)])
  }

  prop_compose! {
    /// Random graph on 2..max_nodes nodes with weights in 1..10.
    pub fn arb_graph(max_nodes: usize)(n in 2..max_nodes)
      (edges in proptest::collection::vec(((0..n, 0..n), 1u32..10), 0..n * n), n in Just(n))
      -> Graph
    {
      Graph::new(n, edges.into_iter().map(|(arc, w)| (arc, w as Weight))).unwrap()
    }
  }

  #[test]
  fn lookups() {
    let g = cycle4();
    assert_eq!(g.num_nodes(), 4);
    assert_eq!(g.num_edges(), 4);
    assert_eq!(g.weight(0, 1), 1.0);
    assert_eq!(g.weight(1, 0), INF);
    assert_eq!(g.weight(2, 2), 0.0);
    assert_eq!(g.weight(0, 7), INF);
    assert_eq!(g.edge(2, 2), None);
    assert_eq!(g.neighbours(3), &[0]);
    assert!(g.neighbours(9).is_empty());
  }

  #[test]
  fn zero_weight_edge_is_an_edge() {
    let g = Graph::from_edges(&[((0, 1), 0.0)]);
    assert!(g.has_edge(0, 1));
    assert_eq!(g.weight(0, 1), 0.0);
    assert_eq!(g.weight(1, 0), INF);
  }

  #[test]
  fn duplicate_edges() {
    let g = Graph::new(2, vec![((0, 1), 4.0), ((0, 1), 2.5)]).unwrap();
    assert_eq!(g.neighbours(0), &[1]);
    assert_eq!(g.weight(0, 1), 2.5);
  }

  #[test]
  fn out_of_range_edge() {
    let e = Graph::new(2, vec![((0, 2), 1.0)]).unwrap_err();
    assert_eq!(e.downcast_ref::<Error>(), Some(&Error::NodeOutOfRange(2)));
  }

  #[test]
  fn unweighted_keeps_topology() {
    let g = Graph::from_edges(&[((0, 1), 3.5), ((1, 2), 0.25), ((2, 0), 7.0)]);
    let u = g.unweighted();
    assert_eq!(u.edges().collect::<Vec<_>>(), vec![((0, 1), 1.0), ((1, 2), 1.0), ((2, 0), 1.0)]);
    assert_eq!(g.weight(0, 1), 3.5);
  }

  #[test]
  fn route_weights() {
    let g = cycle4();
    assert_eq!(g.route_weight(&[0, 1, 2, 3, 0]), 4.0);
    assert_eq!(g.route_weight(&[0, 2]), INF);
    assert!(g.is_walk(&[1, 2, 3]));
    assert!(!g.is_walk(&[1, 3]));
  }

  proptest! {
    #[test]
    fn self_distance_is_zero(g in arb_graph(12)) {
      for u in 0..g.num_nodes() {
        prop_assert_eq!(g.weight(u, u), 0.0);
      }
    }

    #[test]
    fn missing_edges_are_infinite(g in arb_graph(12)) {
      for u in 0..g.num_nodes() {
        for v in 0..g.num_nodes() {
          if u != v && !g.neighbours(u).contains(&v) {
            prop_assert_eq!(g.weight(u, v), INF);
          }
        }
      }
    }
  }
}
