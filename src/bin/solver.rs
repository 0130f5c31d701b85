use flowmatch::{
    augmenting_path::SearchOrder,
    capacities::randomize_capacities,
    min_cut::max_flow_min_cut_with_limit,
    error::NetworkError,
    network::{FlowNetwork, VertexLabels},
    parser::{FlowProblem, ParsedInstance},
    reduction::cross_validate_with_limit,
    report::{write_flow_report, write_matching_report},
    time_limit::TimeLimit,
};
use log::{debug, LevelFilter};
use rand::{rngs::StdRng, SeedableRng};
use std::{
    error::Error,
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
    time::Duration,
};
use structopt::StructOpt;

#[derive(StructOpt)]
#[structopt(about = "Maximum flow, minimum cut and bipartite matching")]
struct Args {
    /// Instance file (`p flow <source> <sink>` or `p match`)
    input: PathBuf,

    /// Plain Ford-Fulkerson augmenting paths instead of Edmonds-Karp
    #[structopt(short, long)]
    depth_first: bool,

    /// Solve again with capacities drawn from --min-capacity..=--max-capacity
    #[structopt(short, long)]
    randomize: bool,

    #[structopt(long, default_value = "100")]
    min_capacity: u64,

    #[structopt(long, default_value = "1000")]
    max_capacity: u64,

    #[structopt(long)]
    seed: Option<u64>,

    /// Seconds allowed for each solve
    #[structopt(short, long)]
    time_limit: Option<f64>,

    #[structopt(short, long)]
    verbose: bool,
}

impl Args {
    fn order(&self) -> SearchOrder {
        if self.depth_first {
            SearchOrder::DepthFirst
        } else {
            SearchOrder::BreadthFirst
        }
    }

    fn time_limit(&self) -> TimeLimit {
        TimeLimit::new(self.time_limit.map(Duration::from_secs_f64))
    }
}

enum Status {
    Solved,
    NoResult,
}

// Mimalloc allocator
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> ExitCode {
    let args = Args::from_args();

    let level = if args.verbose || cfg!(feature = "verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    debug!("Debug enabled");

    match run(&args) {
        Ok(Status::Solved) => ExitCode::SUCCESS,
        Ok(Status::NoResult) => ExitCode::from(2),
        Err(error) => {
            eprintln!("error: {}", error);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<Status, Box<dyn Error>> {
    if args.randomize && args.min_capacity > args.max_capacity {
        return Err(NetworkError::EmptyCapacityRange {
            start: args.min_capacity,
            end: args.max_capacity,
        }
        .into());
    }
    if let Some(seconds) = args.time_limit {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(format!("invalid time limit {}", seconds).into());
        }
    }

    let instance = ParsedInstance::from_file(&args.input)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if let Some(problem) = instance.flow_problem() {
        return solve_flow(problem?, args, &mut out);
    }

    let Some(graph) = instance.matching_graph() else {
        unreachable!("instance is neither a flow nor a matching problem");
    };
    let graph = graph?;
    log::info!(
        "Matching instance: {} vertices, {} edges",
        graph.vertex_count(),
        graph.edges().len()
    );

    let time_limit = args.time_limit();
    match cross_validate_with_limit(&graph, &time_limit)? {
        Some(check) => {
            log_budget(&time_limit);
            write_matching_report(&mut out, &check, &graph)?;
            Ok(Status::Solved)
        }
        None => {
            writeln!(out, "No result: time limit expired")?;
            Ok(Status::NoResult)
        }
    }
}

fn solve_flow(
    problem: FlowProblem,
    args: &Args,
    out: &mut impl Write,
) -> Result<Status, Box<dyn Error>> {
    let FlowProblem {
        mut network,
        labels,
        source,
        sink,
    } = problem;
    log::info!(
        "Flow instance: {} vertices, {} edges",
        network.vertex_count(),
        network.snapshot().edges().len()
    );

    let original = network.snapshot();
    if let Status::NoResult = solve_and_report(&mut network, &labels, source, sink, args, out)? {
        return Ok(Status::NoResult);
    }

    if args.randomize {
        let mut rng = match args.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut randomized = randomize_capacities(
            &original,
            args.min_capacity..=args.max_capacity,
            &mut rng,
        )?;
        writeln!(
            out,
            "\nRandomized capacities in {}..={}:",
            args.min_capacity, args.max_capacity
        )?;
        return solve_and_report(&mut randomized, &labels, source, sink, args, out);
    }

    Ok(Status::Solved)
}

fn solve_and_report(
    network: &mut FlowNetwork,
    labels: &VertexLabels<String>,
    source: usize,
    sink: usize,
    args: &Args,
    out: &mut impl Write,
) -> Result<Status, Box<dyn Error>> {
    let time_limit = args.time_limit();
    let Some(outcome) =
        max_flow_min_cut_with_limit(network, source, sink, args.order(), &time_limit)
    else {
        writeln!(out, "No result: time limit expired")?;
        return Ok(Status::NoResult);
    };
    log_budget(&time_limit);

    write_flow_report(out, &outcome, network, labels)?;
    Ok(Status::Solved)
}

fn log_budget(time_limit: &TimeLimit) {
    if let Some(remaining) = time_limit.remaining() {
        debug!(
            "Finished after {} steps, {:.3}s of the time limit left",
            time_limit.steps(),
            remaining.as_secs_f64()
        );
    }
}
