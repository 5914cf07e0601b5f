use std::collections::VecDeque;
use std::str::FromStr;
use std::cmp::Ordering;
use rand::{Rng, SeedableRng, rngs::StdRng};
use rayon::prelude::*;
use anyhow::Result;
use tracing::*;

use crate::{Error, Graph, Node, Weight, Waypoint};
use crate::waypoint::satisfied;

mod sampler;
mod operators;

pub use sampler::WalkSampler;
pub use operators::{crossover, replicate_proportionally};

/// How the next population is formed after a generation has been sorted.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Replacement {
  /// Keep the sorted population as is.
  Elitist,
  /// Refill the population with copies in proportion to fitness.
  Proportional,
}

pub const REPLACEMENT_STRINGS: [&str; 2] = ["elitist", "proportional"];

impl FromStr for Replacement {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    return match s {
      "elitist" => Ok(Replacement::Elitist),
      "proportional" => Ok(Replacement::Proportional),
      _ => Err(format!("invalid string: {}", s)),
    };
  }
}

impl Default for Replacement {
  fn default() -> Self { Replacement::Elitist }
}

#[derive(Debug, Clone)]
pub struct GaConfig {
  pub population_size: usize,
  pub max_generations: usize,
  /// Fraction of the population carried over unchanged each generation.
  pub elite_rate: f64,
  /// Stop once this many consecutive generations have the same best fitness.
  pub convergence_window: usize,
  /// Splice attempts per offspring before the parent is copied instead.
  pub max_mate_attempts: usize,
  pub replacement: Replacement,
  /// Fixed seed for reproducible runs; drawn from the OS if `None`.
  pub seed: Option<u64>,
}

impl Default for GaConfig {
  fn default() -> Self {
    GaConfig {
      population_size: 655,
      max_generations: 65536,
      elite_rate: 0.1,
      convergence_window: 20,
      max_mate_attempts: 1000,
      replacement: Replacement::default(),
      seed: None,
    }
  }
}

impl GaConfig {
  pub fn num_elites(&self) -> usize {
    let n = (self.population_size as f64 * self.elite_rate).floor() as usize;
    if self.elite_rate > 0.0 { n.max(1).min(self.population_size) } else { 0 }
  }
}

/// Fixed-length routing problem: a walk of exactly `path_length` nodes from
/// `start` to `end` that visits as many waypoint groups as possible, as cheaply as possible.
#[derive(Debug, Copy, Clone)]
pub struct RouteProblem<'a> {
  pub graph: &'a Graph,
  pub waypoints: &'a [Waypoint],
  pub start: Node,
  pub end: Node,
  pub path_length: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
  pub route: Vec<Node>,
  pub weight: Weight,
  /// Number of waypoint groups the route satisfies.
  pub satisfied: usize,
  /// Weight doubled for every unsatisfied group.  Lower is better.
  pub fitness: Weight,
}

impl<'a> RouteProblem<'a> {
  pub fn fitness(&self, weight: Weight, num_satisfied: usize) -> Weight {
    let missing = self.waypoints.len().saturating_sub(num_satisfied);
    weight * 2f64.powi(missing as i32)
  }

  pub fn evaluate(&self, route: Vec<Node>) -> Candidate {
    let weight = self.graph.route_weight(&route);
    let satisfied = satisfied(self.waypoints, &route).len();
    let fitness = self.fitness(weight, satisfied);
    Candidate { route, weight, satisfied, fitness }
  }
}

#[derive(Debug, Clone)]
pub struct Evolution {
  pub best: Candidate,
  /// Generations run after the initial population.
  pub generations: usize,
  /// False if the run stopped at the generation limit.
  pub converged: bool,
  /// Best fitness of the initial population followed by the best of each generation.
  pub history: Vec<Weight>,
}

fn sort_population(population: &mut [Candidate]) {
  population.sort_by(|a, b| a.fitness.partial_cmp(&b.fitness).unwrap_or(Ordering::Equal));
}

pub struct Optimizer<'a> {
  problem: RouteProblem<'a>,
  config: GaConfig,
  rng: StdRng,
}

impl<'a> Optimizer<'a> {
  pub fn new(problem: RouteProblem<'a>, config: GaConfig) -> Self {
    let rng = match config.seed {
      Some(seed) => StdRng::seed_from_u64(seed),
      None => StdRng::from_entropy(),
    };
    Optimizer { problem, config, rng }
  }

  /// One seed per population slot, so every slot has its own random stream
  /// no matter how rayon distributes the work.
  fn slot_seeds(&mut self, count: usize) -> Vec<u64> {
    (0..count).map(|_| self.rng.gen()).collect()
  }

  fn initial_population(&mut self, sampler: &WalkSampler) -> Vec<Candidate> {
    let problem = self.problem;
    let seeds = self.slot_seeds(self.config.population_size);
    let mut population: Vec<_> = seeds.into_par_iter()
      .map(|s| problem.evaluate(sampler.sample(&mut StdRng::seed_from_u64(s))))
      .collect();
    sort_population(&mut population);
    population
  }

  fn next_generation(&mut self, population: Vec<Candidate>) -> Vec<Candidate> {
    let problem = self.problem;
    let num_elites = self.config.num_elites();
    let max_attempts = self.config.max_mate_attempts;
    let seeds = self.slot_seeds(population.len() - num_elites);

    let offspring: Vec<_> = seeds.into_par_iter()
      .enumerate()
      .map(|(k, s)| {
        let mut rng = StdRng::seed_from_u64(s);
        let child = crossover(problem.graph, &population, num_elites + k, max_attempts, &mut rng);
        problem.evaluate(child)
      })
      .collect();

    let mut next = population;
    next.truncate(num_elites);
    next.extend(offspring);
    sort_population(&mut next);

    if self.config.replacement == Replacement::Proportional {
      let total: Weight = next.par_iter().map(|c| c.fitness).sum();
      next = replicate_proportionally(&next, total);
    }
    next
  }

  /// Evolves the population until the best fitness stays put for
  /// `convergence_window` generations or `max_generations` is reached.
  #[instrument(level="info", name="evolve", skip(self))]
  pub fn run(&mut self) -> Result<Evolution> {
    if self.config.population_size == 0 {
      return Err(Error::EmptyPopulation.into());
    }
    let problem = self.problem;
    let sampler = WalkSampler::new(problem.graph, problem.start, problem.end, problem.path_length)?;

    let mut population = self.initial_population(&sampler);
    let mut history = vec![population[0].fitness];
    info!(size=population.len(), best=population[0].fitness, "population initialised");

    let window = self.config.convergence_window;
    let mut recent: VecDeque<Weight> = VecDeque::with_capacity(window + 1);
    let mut generations = 0;
    let mut converged = false;

    while generations < self.config.max_generations {
      population = self.next_generation(population);
      generations += 1;

      let best = population[0].fitness;
      debug!(generation=generations, best, weight=population[0].weight, satisfied=population[0].satisfied);
      history.push(best);

      recent.push_back(best);
      if recent.len() > window {
        recent.pop_front();
      }
      if window > 0 && recent.len() == window && recent.iter().all(|&f| f == best) {
        converged = true;
        break;
      }
    }

    let best = population.swap_remove(0);
    info!(generations, converged, fitness=best.fitness, weight=best.weight, satisfied=best.satisfied, "finished");
    Ok(Evolution { best, generations, converged, history })
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::graph::tests::cycle4;
  use crate::init_test_logging;

  fn config(seed: u64) -> GaConfig {
    GaConfig { population_size: 40, seed: Some(seed), ..GaConfig::default() }
  }

  #[test]
  fn cycle_through_waypoint() -> Result<()> {
    init_test_logging(None::<&str>);
    let g = cycle4();
    let waypoints = [Waypoint::Node(2)];
    let problem = RouteProblem { graph: &g, waypoints: &waypoints, start: 0, end: 0, path_length: 5 };
    let evo = Optimizer::new(problem, config(11)).run()?;
    assert_eq!(evo.best.route, vec![0, 1, 2, 3, 0]);
    assert_eq!(evo.best.weight, 4.0);
    assert_eq!(evo.best.fitness, 4.0);
    assert_eq!(evo.best.satisfied, 1);
    Ok(())
  }

  #[test]
  fn cycle_through_segment() -> Result<()> {
    let g = cycle4();
    let waypoints = [Waypoint::Segment { from: 1, to: 2, weight: 5.0 }];
    let problem = RouteProblem { graph: &g, waypoints: &waypoints, start: 0, end: 0, path_length: 5 };
    let evo = Optimizer::new(problem, config(17)).run()?;
    let route = &evo.best.route;
    assert_eq!(route, &vec![0, 1, 2, 3, 0]);
    let at = route.iter().position(|&v| v == 1).unwrap();
    assert_eq!(route[at + 1], 2);
    assert_eq!(evo.best.satisfied, 1);
    assert_eq!(evo.best.fitness, 4.0);
    Ok(())
  }

  #[test]
  fn penalty_favours_segment() -> Result<()> {
    // 0-1-2-3-0 carries the segment, 0-4-5-3-0 is cheaper but misses it
    let g = Graph::from_edges(&[
      ((0, 1), 1.0), ((1, 2), 1.0), ((2, 3), 1.0), ((3, 0), 1.0),
      ((0, 4), 0.6), ((4, 5), 0.6), ((5, 3), 0.6),
    ]);
    let waypoints = [Waypoint::Segment { from: 1, to: 2, weight: 5.0 }];
    let problem = RouteProblem { graph: &g, waypoints: &waypoints, start: 0, end: 0, path_length: 5 };
    let evo = Optimizer::new(problem, config(5)).run()?;
    assert_eq!(evo.best.route, vec![0, 1, 2, 3, 0]);
    assert!(waypoints[0].is_satisfied_by(&evo.best.route));
    Ok(())
  }

  #[test]
  fn converges_on_stable_best() -> Result<()> {
    let g = cycle4();
    let problem = RouteProblem { graph: &g, waypoints: &[], start: 0, end: 0, path_length: 5 };
    let evo = Optimizer::new(problem, config(2)).run()?;
    assert!(evo.converged);
    assert_eq!(evo.generations, 20);
    assert_eq!(evo.history.len(), 21);

    let cfg = GaConfig { max_generations: 5, ..config(2) };
    let evo = Optimizer::new(problem, cfg).run()?;
    assert!(!evo.converged);
    assert_eq!(evo.generations, 5);
    Ok(())
  }

  fn dense_graph() -> Graph {
    let n = 8;
    let edges: Vec<_> = (0..n)
      .flat_map(|i| (0..n).filter(move |&j| j != i).map(move |j| ((i, j), ((i * 7 + j * 3) % 11 + 1) as Weight)))
      .collect();
    Graph::from_edges(&edges)
  }

  #[test]
  fn elitism_never_loses_best() -> Result<()> {
    let g = dense_graph();
    let waypoints = [Waypoint::Node(3), Waypoint::Node(6), Waypoint::Segment { from: 1, to: 5, weight: 1.0 }];
    let problem = RouteProblem { graph: &g, waypoints: &waypoints, start: 0, end: 7, path_length: 7 };

    for &replacement in &[Replacement::Elitist, Replacement::Proportional] {
      let cfg = GaConfig { max_generations: 40, convergence_window: 1000, replacement, ..config(9) };
      let evo = Optimizer::new(problem, cfg).run()?;
      assert_eq!(evo.generations, 40);
      assert!(evo.history.windows(2).all(|w| w[1] <= w[0]));
      assert_eq!(evo.best.fitness, *evo.history.last().unwrap());
      assert_eq!(evo.best.route.len(), 7);
      assert!(g.is_walk(&evo.best.route));
    }
    Ok(())
  }

  #[test]
  fn seeded_runs_repeat() -> Result<()> {
    let g = dense_graph();
    let waypoints = [Waypoint::Node(2), Waypoint::Node(4)];
    let problem = RouteProblem { graph: &g, waypoints: &waypoints, start: 1, end: 1, path_length: 6 };
    let cfg = GaConfig { max_generations: 15, ..config(123) };
    let a = Optimizer::new(problem, cfg.clone()).run()?;
    let b = Optimizer::new(problem, cfg).run()?;
    assert_eq!(a.best, b.best);
    assert_eq!(a.history, b.history);
    Ok(())
  }

  #[test]
  fn fitness_halves_per_satisfied_group() {
    let g = cycle4();
    let waypoints = [Waypoint::Node(1), Waypoint::Node(2), Waypoint::Node(3)];
    let problem = RouteProblem { graph: &g, waypoints: &waypoints, start: 0, end: 0, path_length: 5 };
    assert_eq!(problem.fitness(3.0, 3), 3.0);
    assert_eq!(problem.fitness(3.0, 2), 6.0);
    assert_eq!(problem.fitness(3.0, 0), 24.0);
    assert!((0..3).all(|k| problem.fitness(5.0, k + 1) < problem.fitness(5.0, k)));
  }

  #[test]
  fn evaluate_rewards_satisfied_groups() {
    let g = Graph::from_edges(&[((0, 1), 1.0), ((1, 3), 1.0), ((0, 2), 1.0), ((2, 3), 1.0)]);
    let waypoints = [Waypoint::Node(1), Waypoint::Segment { from: 1, to: 3, weight: 1.0 }];
    let problem = RouteProblem { graph: &g, waypoints: &waypoints, start: 0, end: 3, path_length: 3 };

    let through = problem.evaluate(vec![0, 1, 3]);
    let around = problem.evaluate(vec![0, 2, 3]);
    assert_eq!(through.weight, around.weight);
    assert_eq!((through.satisfied, around.satisfied), (2, 0));
    assert_eq!(through.fitness, 2.0);
    assert_eq!(around.fitness, 8.0);
    assert!(through.fitness < around.fitness);

    let only_node = RouteProblem { waypoints: &waypoints[..1], ..problem };
    assert!(only_node.evaluate(vec![0, 1, 3]).fitness < only_node.evaluate(vec![0, 2, 3]).fitness);
  }

  #[test]
  fn run_errors() {
    let g = cycle4();
    let problem = RouteProblem { graph: &g, waypoints: &[], start: 0, end: 0, path_length: 4 };
    let err = Optimizer::new(problem, config(0)).run().unwrap_err();
    assert_eq!(err.downcast_ref::<Error>(), Some(&Error::NoFeasibleRoute { length: 4 }));

    let problem = RouteProblem { path_length: 1, ..problem };
    let err = Optimizer::new(problem, config(0)).run().unwrap_err();
    assert_eq!(err.downcast_ref::<Error>(), Some(&Error::InvalidPathLength(1)));

    let cfg = GaConfig { population_size: 0, ..config(0) };
    let err = Optimizer::new(problem, cfg).run().unwrap_err();
    assert_eq!(err.downcast_ref::<Error>(), Some(&Error::EmptyPopulation));
  }
}
