use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;

use transport::parse::{self, ReaderConfig};
use transport::{Method, Problem, Solution};

#[derive(Parser, Debug)]
#[clap(author, version, about = "Initial solutions for the transportation problem")]
struct Args {
    #[clap(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct Input {
    /// Path to the problem table
    #[clap(parse(from_os_str))]
    path: PathBuf,
    /// The table has no header line
    #[clap(long)]
    no_header: bool,
    /// Field delimiter of the table
    #[clap(short, long, default_value = ",")]
    delimiter: char,
    /// Add a dummy origin or destination if total supply and demand differ
    #[clap(long)]
    balance: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Solve a problem with one or more methods
    Solve {
        #[clap(flatten)]
        input: Input,
        /// The methods to run, all of them if none are given
        #[clap(short, long)]
        method: Vec<Method>,
        /// Print the solutions as JSON
        #[clap(long)]
        json: bool,
    },
    /// Pick methods from a menu, one at a time
    Interactive {
        #[clap(flatten)]
        input: Input,
    },
    /// Print a random balanced problem as a table
    Generate {
        origins: usize,
        destinations: usize,
        #[clap(long)]
        seed: Option<u64>,
        #[clap(long, default_value_t = 100)]
        max_quantity: u32,
        #[clap(long, default_value_t = 50)]
        max_cost: u32,
        /// Leave out the header line
        #[clap(long)]
        no_header: bool,
    },
}

#[derive(Serialize)]
struct Report<'a> {
    method: Method,
    total_cost: f64,
    degenerate: bool,
    solution: &'a Solution,
}

fn config(no_header: bool, delimiter: char) -> Result<ReaderConfig> {
    if !delimiter.is_ascii() {
        bail!("delimiter must be a single ASCII character, got {:?}", delimiter);
    }

    Ok(ReaderConfig {
        has_headers: !no_header,
        delimiter: delimiter as u8,
    })
}

fn load(input: &Input) -> Result<Problem> {
    let config = config(input.no_header, input.delimiter)?;
    let problem = parse::read_problem(&input.path, &config)
        .with_context(|| format!("Failed to read problem from {}", input.path.display()))?;

    info!(
        "loaded {} origins and {} destinations from {}",
        problem.origins(),
        problem.destinations(),
        input.path.display()
    );

    if !problem.is_balanced() {
        warn!(
            "total supply {} differs from total demand {}",
            problem.total_supply(),
            problem.total_demand()
        );
        if input.balance {
            return Ok(problem.balanced());
        }
    }

    Ok(problem)
}

fn print_solution<W: Write>(
    out: &mut W,
    problem: &Problem,
    method: Method,
    solution: &Solution,
) -> std::io::Result<()> {
    writeln!(out, "\nAllocation ({}):", method)?;
    write!(out, "{}", solution)?;
    writeln!(out, "Total cost: {}", solution.total_cost(problem))?;

    if !solution.is_complete() {
        warn!(
            "{} left supply {:?} and demand {:?} unallocated",
            method,
            solution.residual_supply(),
            solution.residual_demand()
        );
    }

    Ok(())
}

fn solve(problem: &Problem, methods: &[Method], json: bool) -> Result<()> {
    let methods = if methods.is_empty() {
        &Method::ALL[..]
    } else {
        methods
    };

    let mut solutions = Vec::new();
    for &method in methods {
        let solution = method
            .solve(problem)
            .with_context(|| format!("{} failed", method))?;
        solutions.push((method, solution));
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if json {
        let reports = solutions
            .iter()
            .map(|(method, solution)| Report {
                method: *method,
                total_cost: solution.total_cost(problem),
                degenerate: solution.is_degenerate(),
                solution,
            })
            .collect::<Vec<_>>();
        serde_json::to_writer_pretty(&mut out, &reports)?;
        writeln!(out)?;
    } else {
        for (method, solution) in &solutions {
            print_solution(&mut out, problem, *method, solution)?;
        }
    }

    Ok(())
}

/// The menu loop. Each choice runs one method on the problem; nothing carries over between choices.
fn interactive<R: BufRead, W: Write>(problem: &Problem, mut input: R, mut out: W) -> Result<()> {
    writeln!(out, "Supply: {:?}", problem.supply())?;
    writeln!(out, "Demand: {:?}", problem.demand())?;
    writeln!(out, "Cost Matrix:\n{}", problem.cost())?;

    let mut line = String::new();
    let mut read = |input: &mut R| -> Result<Option<String>> {
        line.clear();
        match input.read_line(&mut line)? {
            0 => Ok(None),
            _ => Ok(Some(line.trim().to_lowercase())),
        }
    };

    let exit = Method::ALL.len() + 1;

    loop {
        writeln!(out, "\nChoose a method to solve the transportation problem:")?;
        for (i, method) in Method::ALL.iter().enumerate() {
            writeln!(out, "{}. {}", i + 1, method)?;
        }
        writeln!(out, "{}. Exit", exit)?;
        write!(out, "Enter your choice (1-{}): ", exit)?;
        out.flush()?;

        let choice = match read(&mut input)? {
            Some(choice) => choice,
            None => break,
        };

        let method = match choice.parse::<usize>() {
            Ok(n) if n == exit => {
                writeln!(out, "Exiting the program.")?;
                break;
            }
            Ok(n) if (1..exit).contains(&n) => Method::ALL[n - 1],
            _ => {
                writeln!(out, "Invalid choice! Please try again.")?;
                continue;
            }
        };

        match method.solve(problem) {
            Ok(solution) => print_solution(&mut out, problem, method, &solution)?,
            Err(err) => writeln!(out, "\n{} failed: {}", method, err)?,
        }

        write!(out, "\nWould you like to try another method? (yes/no): ")?;
        out.flush()?;
        if read(&mut input)?.as_deref() != Some("yes") {
            writeln!(out, "Goodbye!")?;
            break;
        }
    }

    Ok(())
}

pub fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    match args.command {
        Command::Solve {
            input,
            method,
            json,
        } => {
            let problem = load(&input)?;
            solve(&problem, &method, json)
        }
        Command::Interactive { input } => {
            let problem = load(&input)?;
            let stdin = std::io::stdin();
            interactive(&problem, stdin.lock(), std::io::stdout())
        }
        Command::Generate {
            origins,
            destinations,
            seed,
            max_quantity,
            max_cost,
            no_header,
        } => {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let problem = Problem::random(&mut rng, origins, destinations, max_quantity, max_cost)
                .context("Failed to generate problem")?;
            parse::write_problem(std::io::stdout(), &problem, &config(no_header, ',')?)?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn problem() -> Problem {
        Problem::from_rows(
            vec![20.0, 30.0, 25.0],
            vec![10.0, 25.0, 40.0],
            &[
                vec![4.0, 8.0, 8.0],
                vec![16.0, 24.0, 16.0],
                vec![8.0, 16.0, 24.0],
            ],
        )
        .unwrap()
    }

    fn run(input: &str) -> String {
        let mut out = Vec::new();
        interactive(&problem(), input.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn menu_runs_a_method_and_quits() {
        let out = run("1\nno\n");

        assert!(out.contains("1. Northwest Corner Rule"));
        assert!(out.contains("6. Exit"));
        assert!(out.contains("Allocation (Northwest Corner Rule):"));
        assert!(out.contains("Total cost: 1320"));
        assert!(out.ends_with("Goodbye!\n"));
    }

    #[test]
    fn menu_reprompts_on_invalid_choice() {
        let out = run("9\nabc\n5\nyes\n6\n");

        assert_eq!(out.matches("Invalid choice! Please try again.").count(), 2);
        assert!(out.contains("Allocation (Vogel's Approximation Method):"));
        assert!(out.contains("Total cost: 960"));
        assert!(out.ends_with("Exiting the program.\n"));
    }

    #[test]
    fn menu_stops_at_end_of_input() {
        let out = run("");
        assert!(out.ends_with("Enter your choice (1-6): "));
    }

    #[test]
    fn delimiter_must_be_ascii() {
        assert!(config(false, ';').is_ok());
        assert!(config(false, 'é').is_err());
    }
}
