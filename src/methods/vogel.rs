use float_ord::FloatOrd;
use itertools::Itertools;
use log::{debug, trace};

use crate::problem::{Cost, Problem};
use crate::solution::Solution;

use super::{cheapest, largest_penalty, Error, State};

/// The difference between the two smallest costs. A line with a single open cell has an infinite penalty.
fn penalty<I>(costs: I) -> f64
where
    I: Iterator<Item = Cost>,
{
    let smallest = costs.map(FloatOrd).k_smallest(2).collect::<Vec<_>>();
    match smallest.as_slice() {
        [first, second] => second.0 - first.0,
        _ => f64::INFINITY,
    }
}

/// Vogel's Approximation Method.
///
/// In every iteration the penalty of each origin with supply left and each destination with demand
/// left is computed over the cells that are still open. The row or column with the largest penalty
/// is chosen (the row wins ties against the column, and the lowest index wins ties within rows or
/// columns), and as much as possible is shipped through its cheapest open cell.
///
/// Exhausted origins and destinations are never candidates, so every iteration closes at least one
/// of them and the loop ends after at most `m + n - 1` iterations.
///
/// Returns `Error::Unbalanced` unless total supply equals total demand.
pub fn vogel(problem: &Problem) -> Result<Solution, Error> {
    if !problem.is_balanced() {
        return Err(Error::Unbalanced {
            supply: problem.total_supply(),
            demand: problem.total_demand(),
        });
    }

    let cost = problem.cost();
    let mut state = State::new(problem);
    let mut iteration = 0;

    loop {
        let rows = state.open_origins().collect::<Vec<_>>();
        let columns = state.open_destinations().collect::<Vec<_>>();

        let row = rows
            .iter()
            .map(|&i| (i, penalty(columns.iter().map(|&j| cost[[i, j]]))))
            .max_by(largest_penalty);
        let column = columns
            .iter()
            .map(|&j| (j, penalty(rows.iter().map(|&i| cost[[i, j]]))))
            .max_by(largest_penalty);

        let (row, column) = match (row, column) {
            (Some(row), Some(column)) => (row, column),
            _ => break,
        };

        trace!(
            "iteration {}: row {} has penalty {}, column {} has penalty {}",
            iteration,
            row.0,
            row.1,
            column.0,
            column.1
        );

        let cell = if row.1 >= column.1 {
            let i = row.0;
            cheapest(columns.iter().map(|&j| (j, cost[[i, j]]))).map(|j| (i, j))
        } else {
            let j = column.0;
            cheapest(rows.iter().map(|&i| (i, cost[[i, j]]))).map(|i| (i, j))
        };

        match cell {
            Some((i, j)) => {
                debug_assert!(state.is_open(i, j));
                state.allocate(i, j);
            }
            None => break,
        }

        iteration += 1;
    }

    debug!("vogel finished after {} iterations", iteration);
    Ok(state.into_solution())
}
