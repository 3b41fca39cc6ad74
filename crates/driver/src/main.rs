use solver::{
    ArbitraryDecisionPolicy,
    PriorityDecisionPolicy,
    Solver,
};
use std::{
    fs,
    path::PathBuf,
    process,
    str::FromStr,
};
use structopt::StructOpt;

/// Which [`solver::DecisionPolicy`] the search uses, selectable from the
/// command line.
#[derive(Debug, Copy, Clone)]
enum Policy {
    Arbitrary,
    Vsides,
}

impl FromStr for Policy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "arbitrary" => Ok(Self::Arbitrary),
            "vsides" => Ok(Self::Vsides),
            other => Err(format!("unknown policy `{}`, expected `arbitrary` or `vsides`", other)),
        }
    }
}

impl Policy {
    fn build_solver(self) -> Solver {
        match self {
            Self::Arbitrary => Solver::with_decider(ArbitraryDecisionPolicy),
            Self::Vsides => Solver::with_decider(PriorityDecisionPolicy::new()),
        }
    }
}

/// Command line interface for the super-simple-sat solver.
///
/// Reads a DIMACS CNF file, runs the CDCL core to completion, and prints
/// `SAT`/`UNSAT` to standard output. On `SAT` the satisfying assignment is
/// written to standard error, one variable per line, DIMACS-style (`-n` for
/// `false`).
#[derive(StructOpt, Debug)]
#[structopt(name = "s3sat")]
struct Opt {
    /// Path to a `.cnf` file in DIMACS format.
    #[structopt(name = "input .cnf file", parse(from_os_str))]
    input: PathBuf,

    /// Increase log verbosity; repeatable (warn, then info, debug, trace).
    #[structopt(short, long, parse(from_occurrences))]
    verbose: u8,

    /// Decision policy to drive the search with.
    #[structopt(long, default_value = "arbitrary")]
    policy: Policy,
}

fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();
}

fn main() {
    let opt = Opt::from_args();
    init_logging(opt.verbose);
    let exit_code = match run(&opt.input, opt.policy) {
        Ok(code) => code,
        Err(message) => {
            log::error!("{}", message);
            1
        }
    };
    process::exit(exit_code);
}

fn run(input: &PathBuf, policy: Policy) -> Result<i32, String> {
    let cnf_contents =
        fs::read(input).map_err(|error| format!("couldn't read `{}`: {}", input.display(), error))?;
    let builder = solver::parse_dimacs_with_solver(&mut &cnf_contents[..], policy.build_solver())
        .map_err(|error| format!("couldn't decode `{}`: {}", input.display(), error))?;
    let mut solver: Solver = builder.finalize();
    log::info!(
        "loaded {} variable(s), {} clause(s), starting search",
        solver.len_variables(),
        solver.len_clauses(),
    );
    let is_sat = solver.solve();
    let stats = solver.get_statistics();
    log::debug!(
        "solved in {:?} ({} decision(s), {} backjump(s))",
        stats.time_cost(),
        stats.decision_count(),
        stats.backjump_count(),
    );
    if is_sat {
        println!("SAT");
        let model = solver
            .get_result()
            .expect("solve returned true, so a model must be available");
        eprint!("{}", model);
    } else {
        println!("UNSAT");
    }
    Ok(0)
}
