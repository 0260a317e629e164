use log::debug;

use crate::problem::Problem;
use crate::solution::Solution;

use super::State;

/// The Northwest Corner Rule. Starting in the top left cell, ship as much as possible,
/// then move down if the origin is exhausted and otherwise right.
///
/// When an origin and a destination are exhausted in the same step only the row advances,
/// which writes a zero allocation in the next row of the same column. No epsilon allocation is made.
/// The cost matrix is never consulted.
pub fn northwest_corner(problem: &Problem) -> Solution {
    let (m, n) = (problem.origins(), problem.destinations());
    let mut state = State::new(problem);
    let (mut i, mut j) = (0, 0);

    while i < m && j < n {
        state.allocate(i, j);

        if state.supply[i] == 0.0 {
            i += 1;
        } else if state.demand[j] == 0.0 {
            j += 1;
        }
    }

    debug!("northwest corner stopped at ({}, {})", i, j);
    state.into_solution()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn simultaneous_exhaustion_moves_down() {
        let problem = Problem::from_rows(
            vec![5.0, 5.0],
            vec![5.0, 5.0],
            &[vec![1.0, 1.0], vec![1.0, 1.0]],
        )
        .unwrap();

        let solution = northwest_corner(&problem);
        assert_eq!(solution.allocation(), &array![[5.0, 0.0], [0.0, 5.0]]);

        // (0, 0) exhausts both, then a zero is written at (1, 0) before moving right
        let steps = solution
            .shipments()
            .iter()
            .map(|s| (s.origin, s.destination, s.quantity))
            .collect::<Vec<_>>();
        assert_eq!(steps, vec![(0, 0, 5.0), (1, 0, 0.0), (1, 1, 5.0)]);
        assert!(solution.is_degenerate());
    }

    #[test]
    fn leftover_supply_is_reported() {
        let problem =
            Problem::from_rows(vec![10.0, 10.0], vec![12.0], &[vec![1.0], vec![2.0]]).unwrap();

        let solution = northwest_corner(&problem);
        assert_eq!(solution.allocation(), &array![[10.0], [2.0]]);
        assert_eq!(solution.residual_supply(), &[0.0, 8.0]);
        assert!(!solution.is_complete());
    }
}
