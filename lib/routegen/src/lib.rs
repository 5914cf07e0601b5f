use std::fmt;
use std::path::Path;
use fnv::FnvHashSet;

pub mod data;
pub mod graph;
pub mod search;
pub mod waypoint;
pub mod sequence;
pub mod ga;

pub use data::{Node, Weight};
pub use graph::Graph;
pub use waypoint::Waypoint;

pub type Set<T> = FnvHashSet<T>;

/// Distance reported for missing edges and unreachable targets.
pub const INF: Weight = Weight::INFINITY;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// No path exists between the two nodes.
    Unreachable { from: Node, to: Node },
    /// No route with exactly `length` nodes satisfies the start, end and revisit rules.
    NoFeasibleRoute { length: usize },
    InvalidPathLength(usize),
    EmptyPopulation,
    NodeOutOfRange(Node),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Unreachable { from, to } => write!(f, "node {} is unreachable from node {}", to, from),
            Error::NoFeasibleRoute { length } => write!(f, "no feasible route with {} nodes exists", length),
            Error::InvalidPathLength(l) => write!(f, "path length must be at least 2 (got {})", l),
            Error::EmptyPopulation => write!(f, "population size must be positive"),
            Error::NodeOutOfRange(i) => write!(f, "node {} is out of range", i),
        }
    }
}

impl std::error::Error for Error {}


mod logging_setup {
    use super::*;
    use tracing_subscriber::{EnvFilter, fmt, registry, prelude::*};
    use tracing_appender::{non_blocking, non_blocking::WorkerGuard};
    use std::fs::OpenOptions;

    fn build_and_set_global_subscriber<P>(logfile: Option<P>, is_test : bool) -> anyhow::Result<Option<WorkerGuard>> where
        P : AsRef<Path>
    {
        let stderr_log = fmt::layer().with_writer(std::io::stderr);
        let env_filter = EnvFilter::from_default_env();
        let r = registry().with(stderr_log).with(env_filter);

        let flush_guard = match logfile {
            Some(p) => {
                let logfile = OpenOptions::new()
                    .create(true)
                    .write(true)
                    .truncate(true)
                    .open(p)?;
                let (writer, guard) = non_blocking::NonBlockingBuilder::default()
                    .lossy(false)
                    .finish(logfile);
                let json = fmt::layer()
                    .json()
                    .with_span_list(true)
                    .with_current_span(false)
                    .with_writer(writer);

                let r = r.with(json);
                if is_test { r.try_init().ok(); }
                else { r.try_init()?; }
                Some(guard)
            },
            None => {
                if is_test { r.try_init().ok(); }
                else { r.try_init()?; }
                None
            }
        };
        Ok(flush_guard)
    }

    /// Installs the global subscriber: stderr output filtered by `RUST_LOG`, plus
    /// newline-delimited JSON in `logfile` if given.  Keep the guard alive until exit.
    pub fn init_logging(logfile: Option<impl AsRef<Path>>) -> anyhow::Result<Option<WorkerGuard>> {
        build_and_set_global_subscriber(logfile, false)
    }

    #[allow(dead_code)]
    pub(crate) fn init_test_logging(logfile: Option<impl AsRef<Path>>) -> Option<WorkerGuard> {
        build_and_set_global_subscriber(logfile, true).ok().flatten()
    }
}
pub use logging_setup::*;
