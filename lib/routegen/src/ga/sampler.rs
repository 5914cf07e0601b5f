use bit_set::BitSet;
use rand::Rng;
use rand::seq::SliceRandom;
use anyhow::Result;
use tracing::*;

use crate::{Error, Graph, Node};

/// Draws random walks of a fixed node count from `start` to `end`.
///
/// Position `0` is `start` and the last position is `end`.  The second node is
/// neither `start` nor `end` (unless it is the last node) and no later node
/// before the last is `start`.  `completable[p]` holds the nodes that may sit at
/// position `p` and still be extended into a full walk, so sampling never has
/// to backtrack.
pub struct WalkSampler<'a> {
  graph: &'a Graph,
  start: Node,
  end: Node,
  completable: Vec<BitSet>,
}

impl<'a> WalkSampler<'a> {
  pub fn new(graph: &'a Graph, start: Node, end: Node, length: usize) -> Result<Self> {
    if length < 2 {
      return Err(Error::InvalidPathLength(length).into());
    }
    let n = graph.num_nodes();
    let last = length - 1;
    let allowed = |p: usize, v: Node| -> bool {
      if p == 0 { v == start }
      else if p == last { v == end }
      else if p == 1 { v != start && v != end }
      else { v != start }
    };

    let mut completable = vec![BitSet::with_capacity(n); length];
    if end < n {
      completable[last].insert(end);
    }
    for p in (0..last).rev() {
      let (head, tail) = completable.split_at_mut(p + 1);
      let next = &tail[0];
      let this = &mut head[p];
      for v in (0..n).filter(|&v| allowed(p, v)) {
        if graph.neighbours(v).iter().any(|&u| next.contains(u)) {
          this.insert(v);
        }
      }
    }

    if !completable[0].contains(start) {
      return Err(Error::NoFeasibleRoute { length }.into());
    }
    debug!(
      length,
      width=?completable.iter().map(BitSet::len).collect::<Vec<_>>(),
      "walk table built"
    );
    Ok(WalkSampler { graph, start, end, completable })
  }

  #[inline]
  pub fn length(&self) -> usize { self.completable.len() }

  /// A uniformly chosen completable step at every position.
  pub fn sample(&self, rng: &mut impl Rng) -> Vec<Node> {
    let mut route = Vec::with_capacity(self.length());
    let mut current = self.start;
    route.push(current);

    for next in &self.completable[1..] {
      let choices: Vec<Node> = self.graph.neighbours(current).iter()
        .copied()
        .filter(|&u| next.contains(u))
        .collect();
      current = *choices.choose(rng).expect("completable node has a completable successor");
      route.push(current);
    }

    debug_assert_eq!(route.last(), Some(&self.end));
    route
  }
}
