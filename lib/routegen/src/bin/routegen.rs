use rayon::ThreadPoolBuilder;
use itertools::Itertools;
use anyhow::Result;
use tracing::*;
use structopt::StructOpt;

use routegen::*;
use routegen::data::{load_instance, Instance, InstanceExt};
use routegen::sequence::{Itinerary, Sequencer, min_steps};
use routegen::ga::{Evolution, GaConfig, Optimizer, Replacement, RouteProblem, REPLACEMENT_STRINGS};

mod common;
use common::*;

#[derive(Debug, StructOpt)]
struct ClArgs {
    /// Instance file, or an instance name in $DATA_ROOT/routegen
    #[structopt()]
    instance: String,
    #[structopt(long, short="c", default_value="1", validator=clap_range_validator(Some(1), None))]
    cpus: usize,
    #[structopt(long, default_value="655", validator=clap_range_validator(Some(1), None))]
    population: usize,
    #[structopt(long, default_value="65536")]
    generations: usize,
    #[structopt(long="elite-rate", default_value="0.1", validator=clap_range_validator(Some(0.0), Some(1.0)))]
    elite_rate: f64,
    /// Stop after this many generations without a change in the best fitness
    #[structopt(long, default_value="20", validator=clap_range_validator(Some(1), None))]
    window: usize,
    #[structopt(long="mate-attempts", default_value="1000")]
    mate_attempts: usize,
    #[structopt(long)]
    seed: Option<u64>,
    /// Number of nodes in the route, overriding the instance's requiredStep
    #[structopt(long="path-length", validator=clap_range_validator(Some(2), None))]
    path_length: Option<usize>,
    #[structopt(long, parse(try_from_str), possible_values=&REPLACEMENT_STRINGS, default_value="elitist")]
    replacement: Replacement,
    #[structopt(flatten)]
    output: OutputOptions,
}

struct RunReport<'a> {
    instance: &'a Instance,
    path_length: usize,
    num_groups: usize,
    baseline: Option<Itinerary>,
    min_steps: Option<usize>,
    evolution: Option<Evolution>,
}

impl<'a> Report for RunReport<'a> {
    fn to_json_summary(&self) -> json::JsonValue {
        let best = self.evolution.as_ref().map(|e| &e.best);
        return json::object! {
            id: self.instance.id.as_str(),
            path_length: self.path_length,
            groups: self.num_groups,
            baseline_weight: self.baseline.as_ref().map(|b| b.weight),
            baseline_nodes: self.baseline.as_ref().map(|b| b.route.len()),
            min_steps: self.min_steps,
            ga_weight: best.map(|c| c.weight),
            ga_fitness: best.map(|c| c.fitness),
            ga_satisfied: best.map(|c| c.satisfied),
            generations: self.evolution.as_ref().map(|e| e.generations),
            converged: self.evolution.as_ref().map(|e| e.converged),
        }
    }

    fn to_json(&self) -> json::JsonValue {
        let mut root = self.to_json_summary();
        let (legs, route): (json::JsonValue, json::JsonValue) = match &self.baseline {
            Some(b) => {
                let legs: json::JsonValue = b.legs.iter()
                    .map(|l| json::object! {
                        group: l.group,
                        nodes: l.nodes.clone(),
                        weight: l.weight,
                    })
                    .collect_vec()
                    .into();
                (legs, b.route.clone().into())
            },
            None => (json::Null, json::Null),
        };
        root["baseline_legs"] = legs;
        root["baseline_route"] = route;
        root["ga_route"] = self.evolution.as_ref().map(|e| e.best.route.clone()).into();
        root["ga_history"] = self.evolution.as_ref().map(|e| e.history.clone()).into();
        return root;
    }
}


fn main() -> Result<()> {
    let args: ClArgs = StructOpt::from_args();
    let _g = init_logging(args.output.log.as_ref())?;
    debug!(?args);
    ThreadPoolBuilder::new().num_threads(args.cpus).build_global()?;

    let instance = load_instance(&args.instance)?;
    let graph = instance.graph()?;
    let waypoints = instance.waypoints();
    let path_length = args.path_length.unwrap_or(instance.required_steps);
    info!(id=%instance.id, nodes=graph.num_nodes(), edges=graph.num_edges(), groups=waypoints.len(), path_length, "instance loaded");

    let baseline = Sequencer::new(&graph, &waypoints)
        .run(instance.start, instance.end)
        .map_err(|e| warn!("no baseline route: {:#}", e))
        .ok();
    let min_steps = min_steps(&graph, &waypoints, instance.start, instance.end)
        .map_err(|e| warn!("cannot bound the step count: {:#}", e))
        .ok();
    if let Some(m) = min_steps {
        if path_length < m {
            warn!(path_length, min_steps=m, "route is too short to visit every waypoint group");
        }
    }

    let problem = RouteProblem {
        graph: &graph,
        waypoints: &waypoints,
        start: instance.start,
        end: instance.end,
        path_length,
    };
    let config = GaConfig {
        population_size: args.population,
        max_generations: args.generations,
        elite_rate: args.elite_rate,
        convergence_window: args.window,
        max_mate_attempts: args.mate_attempts,
        replacement: args.replacement,
        seed: args.seed,
    };
    let evolution = Optimizer::new(problem, config)
        .run()
        .map_err(|e| warn!("optimizer failed: {:#}", e))
        .ok();

    let report = RunReport {
        instance: &instance,
        path_length,
        num_groups: waypoints.len(),
        baseline,
        min_steps,
        evolution,
    };
    output_report(&args.output, report)
}
