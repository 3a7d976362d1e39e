use std::env;
use std::fs;
use std::io::Write;

use anyhow::{Context, Error};
use clap::{value_t, App, AppSettings};
use env_logger::{fmt, Builder, Target};
use log::{error, info};
use log::{Level, LevelFilter, Record};

use cedarsat::{Solver, SolverConfig};

fn main() {
    let exit_code = match main_with_err() {
        Err(err) => {
            error!("{}", err);
            2
        }
        Ok(exit_code) => exit_code,
    };
    std::process::exit(exit_code);
}

fn init_logging() {
    // Everything the solver prints besides the result is a DIMACS comment line.
    let format = |buf: &mut fmt::Formatter, record: &Record| {
        if record.level() == Level::Info {
            writeln!(buf, "c {}", record.args())
        } else {
            writeln!(buf, "c {}: {}", record.level(), record.args())
        }
    };

    let mut builder = Builder::new();
    builder
        .target(Target::Stdout)
        .format(format)
        .filter(None, LevelFilter::Info);

    if let Ok(ref env_var) = env::var("CEDARSAT_LOG") {
        builder.parse_filters(env_var);
    }

    builder.init();
}

fn main_with_err() -> Result<i32, Error> {
    init_logging();

    let matches = App::new("cedarsat")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A CDCL based SAT solver")
        .setting(AppSettings::DisableHelpSubcommand)
        .arg_from_usage("<INPUT> 'The DIMACS CNF file to solve'")
        .arg_from_usage(
            "--seed=[SEED] 'Seed for the branching heuristic, overrides the SAT_SEED \
             environment variable'",
        )
        .get_matches();

    let mut config = SolverConfig::default();

    if let Ok(seed) = env::var("SAT_SEED") {
        config.seed = seed
            .parse()
            .with_context(|| format!("Invalid SAT_SEED value '{}'", seed))?;
    }

    if matches.is_present("seed") {
        config.seed = value_t!(matches, "seed", u64).unwrap_or_else(|err| err.exit());
    }

    info!("cedarsat {}", env!("CARGO_PKG_VERSION"));
    info!("Using seed {}", config.seed);

    let mut solver = Solver::with_config(config);

    let path = matches.value_of("INPUT").unwrap();
    info!("Reading file '{}'", path);
    let file = fs::File::open(path).with_context(|| format!("Failed to open '{}'", path))?;

    solver.add_dimacs_cnf(file)?;

    let result = solver.solve();

    let stats = solver.stats();
    info!(
        "{} decisions, {} conflicts, {} learned clauses, {} propagations",
        stats.decisions, stats.conflicts, stats.learnt_clauses, stats.propagations
    );

    match result {
        Some(true) => {
            println!("s SATISFIABLE");
            print!("v");
            for lit in solver.model().unwrap() {
                print!(" {}", lit);
            }
            println!(" 0");
            Ok(10)
        }
        Some(false) => {
            println!("s UNSATISFIABLE");
            Ok(20)
        }
        None => {
            println!("s UNKNOWN");
            Ok(30)
        }
    }
}
