use crate::{Graph, Node, Weight, INF};

/// A node sequence together with its total weight.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
  pub weight: Weight,
  pub nodes: Vec<Node>,
}

/// Walks a predecessor table back from `target` to `source`.  `None` if the chain breaks.
fn trace_back(pred: &[Option<Node>], source: Node, target: Node) -> Option<Vec<Node>> {
  let mut nodes = vec![target];
  let mut v = target;
  while v != source {
    v = pred[v]?;
    nodes.push(v);
  }
  nodes.reverse();
  Some(nodes)
}

/// Minimum-weight path from `source` to `target`, or `None` if `target` cannot be reached.
///
/// Plain Dijkstra over the dense weight matrix; ties between equally close
/// unsettled nodes go to the lowest index.
pub fn shortest_path(graph: &Graph, source: Node, target: Node) -> Option<Path> {
  let n = graph.num_nodes();
  if source >= n || target >= n {
    return None;
  }

  let mut dist = vec![INF; n];
  let mut pred: Vec<Option<Node>> = vec![None; n];
  let mut settled = vec![false; n];
  dist[source] = 0.0;

  loop {
    let u = (0..n)
      .filter(|&v| !settled[v] && dist[v] < INF)
      .min_by(|&a, &b| dist[a].partial_cmp(&dist[b]).unwrap_or(std::cmp::Ordering::Equal));
    let u = match u {
      Some(u) => u,
      None => break,
    };
    if u == target {
      break;
    }
    settled[u] = true;

    for &v in graph.neighbours(u) {
      if settled[v] { continue; }
      let d = dist[u] + graph.weight(u, v);
      if d < dist[v] {
        dist[v] = d;
        pred[v] = Some(u);
      }
    }
  }

  if dist[target] == INF {
    return None;
  }
  let nodes = trace_back(&pred, source, target)?;
  Some(Path { weight: dist[target], nodes })
}

/// Minimum-weight walk from `source` to `target` with exactly `k` nodes (`k - 1` steps).
///
/// Staying on a node counts as a step of weight zero, so the returned sequence
/// may repeat a node.  `None` if `k < 2` or no such walk exists.
pub fn hop_constrained_path(graph: &Graph, source: Node, target: Node, k: usize) -> Option<Path> {
  let n = graph.num_nodes();
  if k < 2 || source >= n || target >= n {
    return None;
  }

  // layer m holds the best weight of reaching each node in m + 1 steps
  let mut dist: Vec<Weight> = (0..n).map(|j| graph.weight(source, j)).collect();
  let mut preds: Vec<Vec<Option<Node>>> = Vec::with_capacity(k - 2);

  for _ in 1..k - 1 {
    let mut next = vec![INF; n];
    let mut pred = vec![None; n];
    for i in (0..n).filter(|&i| dist[i] < INF) {
      for j in 0..n {
        let d = dist[i] + graph.weight(i, j);
        if d < next[j] {
          next[j] = d;
          pred[j] = Some(i);
        }
      }
    }
    dist = next;
    preds.push(pred);
  }

  if dist[target] == INF {
    return None;
  }

  let mut nodes = Vec::with_capacity(k);
  let mut v = target;
  nodes.push(v);
  for pred in preds.iter().rev() {
    v = pred[v]?;
    nodes.push(v);
  }
  nodes.push(source);
  nodes.reverse();
  debug_assert_eq!(nodes.len(), k);

  Some(Path { weight: dist[target], nodes })
}
