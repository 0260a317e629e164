use log::debug;

use crate::problem::Problem;
use crate::solution::Solution;

use super::{cheapest_cell, Cell, State};

fn cells(problem: &Problem) -> impl Iterator<Item = Cell> + '_ {
    problem.cells().map(move |(origin, destination)| Cell {
        cost: problem.cost()[[origin, destination]],
        origin,
        destination,
    })
}

/// The Minimum Cost Method as a single pass: all cells are sorted once by [`cheapest_cell`] and visited in order,
/// allocating wherever both the origin and the destination still have something left.
/// A cell whose row or column is exhausted when it is visited is skipped for good.
pub fn minimum_cost(problem: &Problem) -> Solution {
    let mut state = State::new(problem);

    let mut sorted = cells(problem).collect::<Vec<_>>();
    sorted.sort_by(cheapest_cell);

    for cell in sorted {
        if state.is_open(cell.origin, cell.destination) {
            state.allocate(cell.origin, cell.destination);
        }
    }

    state.into_solution()
}

/// The classical Minimum Cost Method: after every allocation, find the cheapest cell among those
/// that are still open (ties by [`cheapest_cell`]) and allocate there.
pub fn minimum_cost_rescan(problem: &Problem) -> Solution {
    let mut state = State::new(problem);
    let mut scans = 0;

    loop {
        scans += 1;
        let next = cells(problem)
            .filter(|cell| state.is_open(cell.origin, cell.destination))
            .min_by(cheapest_cell);

        match next {
            Some(cell) => state.allocate(cell.origin, cell.destination),
            None => break,
        };
    }

    debug!("minimum cost rescan finished after {} scans", scans);
    state.into_solution()
}
