use crate::problem::Problem;
use crate::solution::Solution;

use super::{cheapest, State};

/// The Minimum Row Cost Method. Origins are served in index order, each shipping to its cheapest
/// destination with demand left (ties to the lowest index) until it runs out of supply.
/// An origin that still has supply when no demand is left keeps it.
pub fn minimum_row_cost(problem: &Problem) -> Solution {
    let cost = problem.cost();
    let mut state = State::new(problem);

    for i in 0..problem.origins() {
        while state.supply[i] > 0.0 {
            let j = match cheapest(state.open_destinations().map(|j| (j, cost[[i, j]]))) {
                Some(j) => j,
                None => break,
            };

            state.allocate(i, j);
        }
    }

    state.into_solution()
}
