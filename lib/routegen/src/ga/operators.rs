use rand::Rng;
use tracing::*;

use crate::{Graph, Node, Weight};
use super::Candidate;

/// Offspring of `population[i]` and a random member of the fitter half.
///
/// A random range `[a, b]` of positions is taken from the donor and the rest from
/// the acting parent.  The splice is kept only if both joins are edges of the
/// graph; after `max_attempts` rejected splices the acting parent is returned as is.
/// `population` must be sorted by fitness.
pub fn crossover(
  graph: &Graph,
  population: &[Candidate],
  i: usize,
  max_attempts: usize,
  rng: &mut impl Rng,
) -> Vec<Node> {
  let parent = &population[i].route;
  let len = parent.len();
  let fitter_half = (population.len() / 2).max(1);

  for _ in 0..max_attempts {
    let donor = &population[rng.gen_range(0, fitter_half)].route;
    let a = rng.gen_range(0, len);
    let b = rng.gen_range(a, len);

    if a > 0 && !graph.has_edge(parent[a - 1], donor[a]) {
      trace!(i, a, b, "rejected splice start");
      continue;
    }
    if b < len - 1 && !graph.has_edge(donor[b], parent[b + 1]) {
      trace!(i, a, b, "rejected splice end");
      continue;
    }

    let mut child = Vec::with_capacity(len);
    child.extend_from_slice(&parent[..a]);
    child.extend_from_slice(&donor[a..=b]);
    child.extend_from_slice(&parent[b + 1..]);
    return child;
  }

  trace!(i, "no splice found, copying parent");
  parent.clone()
}

/// Refills a sorted population in proportion to fitness.
///
/// Walking from the fittest, each candidate takes `floor((1 - f / total) * P)`
/// consecutive slots.  Slots left over once every candidate has had its turn
/// keep the sorted population's own entries.
pub fn replicate_proportionally(sorted: &[Candidate], total: Weight) -> Vec<Candidate> {
  let size = sorted.len();
  let mut next = Vec::with_capacity(size);

  for c in sorted {
    if next.len() >= size { break; }
    let share = if total > 0.0 { 1.0 - c.fitness / total } else { 0.0 };
    let copies = ((share * size as Weight).floor() as usize).min(size - next.len());
    next.extend(std::iter::repeat(c).take(copies).cloned());
  }

  let filled = next.len();
  next.extend_from_slice(&sorted[filled..]);
  next
}
