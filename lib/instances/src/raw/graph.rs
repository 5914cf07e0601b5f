/// Graph instance exactly as described by the XML file, before any forbidden
/// nodes or edges have been removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphXml {
  pub start: usize,
  pub end: usize,
  pub required_steps: usize,
  pub edges: Vec<(usize, usize, f64)>,
  pub red_nodes: Vec<usize>,
  pub red_edges: Vec<(usize, usize, f64)>,
  pub green_nodes: Vec<usize>,
  pub green_edges: Vec<(usize, usize, f64)>,
}

impl GraphXml {
  /// Largest node index referenced anywhere in the description.
  pub fn max_index(&self) -> Option<usize> {
    let edge_ends = self.edges.iter()
      .chain(&self.red_edges)
      .chain(&self.green_edges)
      .flat_map(|&(i, j, _)| vec![i, j]);

    edge_ends
      .chain(self.red_nodes.iter().copied())
      .chain(self.green_nodes.iter().copied())
      .chain(vec![self.start, self.end])
      .max()
  }
}
