use std::path::Path;
use anyhow::Result;
use instances::dataset::Dataset;
use tracing::*;

pub use instances::dataset::graph::{Instance, Node, Weight, Edge};

use crate::graph::Graph;
use crate::waypoint::{self, Waypoint};

pub trait InstanceExt {
  fn graph(&self) -> Result<Graph>;
  fn waypoints(&self) -> Vec<Waypoint>;
}

impl InstanceExt for Instance {
  #[inline]
  fn graph(&self) -> Result<Graph> {
    Graph::new(self.num_nodes, self.edges.iter().copied())
  }

  #[inline]
  fn waypoints(&self) -> Vec<Waypoint> {
    waypoint::from_instance(self)
  }
}

pub fn get_instance_by_name(name : &str) -> Result<Instance> {
  instances::dataset::graph::dataset()?.load_instance_by_name(name)
}

pub fn get_instance_by_index(idx : usize) -> Result<Instance> {
  instances::dataset::graph::dataset()?.load_instance(idx)
}

/// Loads `spec` as a file if it exists, otherwise as an instance name of the default dataset.
pub fn load_instance(spec: &str) -> Result<Instance> {
  if Path::new(spec).is_file() {
    debug!(path=spec, "loading instance file");
    instances::dataset::graph::load_file(spec)
  } else {
    debug!(name=spec, "loading instance from dataset");
    get_instance_by_name(spec)
  }
}
