use super::*;
use crate::parsers::{ParseInstance, XmlFmt};
use crate::raw::{graph::GraphXml, FromRaw};
use crate::{Map, Set};

pub type Node = usize;
pub type Weight = f64;
pub type Edge = ((Node, Node), Weight);

/// A routing problem with forbidden nodes and edges already removed.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Instance {
  pub id: String,
  pub num_nodes: usize,
  /// Remaining edges, sorted by `(from, to)`.
  pub edges: Vec<Edge>,
  /// Nodes that must be visited.
  pub green_nodes: Vec<Node>,
  /// Ordered pairs that must be traversed as one step, with their weight.
  pub green_edges: Vec<Edge>,
  /// Nodes that were removed, kept for validation and reporting.
  pub red_nodes: Vec<Node>,
  pub start: Node,
  pub end: Node,
  pub required_steps: usize,
}

impl FromRaw<GraphXml> for Instance {
  fn from_raw(raw: GraphXml, id: Cow<str>) -> Instance {
    let num_nodes = raw.max_index().map_or(0, |i| i + 1);
    let red_nodes: Set<Node> = raw.red_nodes.iter().copied().collect();

    let mut edges: Map<(Node, Node), Weight> = Map::default();
    for &(i, j, w) in &raw.edges {
      if red_nodes.contains(&i) || red_nodes.contains(&j) {
        continue;
      }
      edges.insert((i, j), w);
    }

    // A forbidden edge only matches an edge with the same endpoints and weight
    for &(i, j, w) in &raw.red_edges {
      if edges.get(&(i, j)) == Some(&w) {
        edges.remove(&(i, j));
      }
    }

    let mut edges: Vec<Edge> = edges.into_iter().collect();
    edges.sort_by_key(|&(arc, _)| arc);

    let mut red_nodes: Vec<Node> = red_nodes.into_iter().collect();
    red_nodes.sort_unstable();

    Instance {
      id: id.into_owned(),
      num_nodes,
      edges,
      green_nodes: raw.green_nodes,
      green_edges: raw.green_edges.into_iter().map(|(i, j, w)| ((i, j), w)).collect(),
      red_nodes,
      start: raw.start,
      end: raw.end,
      required_steps: raw.required_steps,
    }
  }
}

impl Instance {
  /// Checks the assumptions the search code relies on.
  pub fn validate(&self) -> Result<()> {
    let invalid = |msg: String| -> Result<()> { Err(Error::InvalidInstance(msg).into()) };
    let n = self.num_nodes;

    if self.start >= n || self.end >= n {
      return invalid(format!("start {} / end {} outside 0..{}", self.start, self.end, n));
    }
    if self.required_steps < 2 {
      return invalid(format!("required step count {} is below 2", self.required_steps));
    }
    for &((i, j), w) in self.edges.iter().chain(&self.green_edges) {
      if i >= n || j >= n {
        return invalid(format!("edge ({}, {}) outside 0..{}", i, j, n));
      }
      if !(w.is_finite() && w > 0.0) {
        return invalid(format!("edge ({}, {}) has weight {}", i, j, w));
      }
    }
    let mandatory = self.green_nodes.iter()
      .copied()
      .chain(self.green_edges.iter().flat_map(|&((i, j), _)| vec![i, j]));
    for i in mandatory {
      if i >= n {
        return invalid(format!("mandatory node {} outside 0..{}", i, n));
      }
      if self.red_nodes.binary_search(&i).is_ok() {
        return invalid(format!("node {} is both mandatory and forbidden", i));
      }
    }
    for &((i, j), _) in &self.green_edges {
      if self.edges.binary_search_by_key(&(i, j), |&(arc, _)| arc).is_err() {
        return invalid(format!("mandatory segment ({}, {}) is not an edge", i, j));
      }
    }
    for &i in &[self.start, self.end] {
      if self.red_nodes.binary_search(&i).is_ok() {
        return invalid(format!("start/end node {} is forbidden", i));
      }
    }
    Ok(())
  }
}

/// Loads, converts and validates a single instance file.  The file stem becomes the instance id.
pub fn load_file(path: impl AsRef<Path>) -> Result<Instance> {
  let path = path.as_ref();
  let raw = GraphXml::parse(XmlFmt(path)).context(format!("failed to load {:?}", path))?;
  let id = path.file_stem().map_or(Cow::Borrowed("instance"), |s| s.to_string_lossy());
  let instance = Instance::from_raw(raw, id);
  instance.validate().context(format!("failed to validate {:?}", path))?;
  Ok(instance)
}

pub enum RouteXml {}

impl Dataset for StdLayout<RouteXml> {
  type Instance = Instance;

  fn load_instance(&self, idx: usize) -> Result<Self::Instance> {
    let path = self.instance_path(idx)?;
    let mut instance = load_file(&path)?;
    instance.id = self.index_to_name(idx)?.into_owned();
    Ok(instance)
  }
}

/// The default dataset, `$DATA_ROOT/routegen`.
pub fn dataset() -> Result<StdLayout<RouteXml>> {
  StdLayout::from_env("routegen", "xml")
}
