use std::fmt::Display;

use itertools::Itertools;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::problem::{Cost, DestinationIndex, OriginIndex, Problem, Quantity};

/// The tolerance used when checking whether the allocation meets supply and demand
pub const EPSILON: f64 = 1e-6;

/// A single allocation step: `quantity` shipped from `origin` to `destination`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    pub origin: OriginIndex,
    pub destination: DestinationIndex,
    pub quantity: Quantity,
}

/// An initial solution to a transportation problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    /// The quantity shipped from each origin (row) to each destination (column)
    allocation: Array2<Quantity>,
    /// Supply left at each origin once the method finished
    residual_supply: Vec<Quantity>,
    /// Demand left at each destination once the method finished
    residual_demand: Vec<Quantity>,
    /// The allocations in the order the method made them
    shipments: Vec<Shipment>,
}

impl Solution {
    pub fn new(
        allocation: Array2<Quantity>,
        residual_supply: Vec<Quantity>,
        residual_demand: Vec<Quantity>,
        shipments: Vec<Shipment>,
    ) -> Solution {
        Solution {
            allocation,
            residual_supply,
            residual_demand,
            shipments,
        }
    }

    /// The allocation matrix, indexed by `[[origin, destination]]`
    pub fn allocation(&self) -> &Array2<Quantity> {
        &self.allocation
    }

    /// The quantity shipped from `origin` to `destination`
    pub fn get(&self, origin: OriginIndex, destination: DestinationIndex) -> Quantity {
        self.allocation[[origin, destination]]
    }

    /// Supply left at each origin. All zero for a balanced problem.
    pub fn residual_supply(&self) -> &[Quantity] {
        &self.residual_supply
    }

    /// Demand left at each destination. All zero for a balanced problem.
    pub fn residual_demand(&self) -> &[Quantity] {
        &self.residual_demand
    }

    /// The allocations in the order they were made. May include zero-quantity steps on degenerate problems.
    pub fn shipments(&self) -> &[Shipment] {
        &self.shipments
    }

    /// Whether every unit of supply and demand has been allocated
    pub fn is_complete(&self) -> bool {
        self.residual_supply
            .iter()
            .chain(&self.residual_demand)
            .all(|x| x.abs() < EPSILON)
    }

    /// The total shipping cost of the allocation
    pub fn total_cost(&self, problem: &Problem) -> Cost {
        (&self.allocation * problem.cost()).sum()
    }

    /// The cells with a strictly positive allocation, in row-major order
    pub fn occupied(&self) -> Vec<(OriginIndex, DestinationIndex)> {
        self.allocation
            .indexed_iter()
            .filter(|&(_, &x)| x > 0.0)
            .map(|(idx, _)| idx)
            .collect()
    }

    /// A basic solution is degenerate if it has fewer than m + n - 1 occupied cells.
    pub fn is_degenerate(&self) -> bool {
        let (m, n) = self.allocation.dim();
        self.occupied().len() + 1 < m + n
    }

    /// Check that the allocation ships exactly the supply of every origin and the demand of every destination
    pub fn satisfies(&self, problem: &Problem) -> bool {
        let rows = self.allocation.rows().into_iter().map(|row| row.sum());
        let columns = self.allocation.columns().into_iter().map(|col| col.sum());

        self.allocation.iter().all(|&x| x >= 0.0)
            && rows
                .zip(problem.supply())
                .all(|(shipped, supply)| (shipped - supply).abs() < EPSILON)
            && columns
                .zip(problem.demand())
                .all(|(received, demand)| (received - demand).abs() < EPSILON)
    }
}

impl Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cells = self
            .allocation
            .rows()
            .into_iter()
            .map(|row| row.iter().map(|x| format!("{}", x)).collect::<Vec<_>>())
            .collect::<Vec<_>>();
        let width = cells.iter().flatten().map(|s| s.len()).max().unwrap_or(1);

        for row in &cells {
            writeln!(
                f,
                "[{}]",
                row.iter().map(|s| format!("{:>width$}", s)).join(" ")
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

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

    #[test]
    fn total_cost_and_occupied_cells() {
        let solution = Solution::new(
            array![[10.0, 10.0, 0.0], [0.0, 15.0, 15.0], [0.0, 0.0, 25.0]],
            vec![0.0; 3],
            vec![0.0; 3],
            vec![],
        );

        assert!(solution.satisfies(&problem()));
        assert!(solution.is_complete());
        assert_eq!(
            solution.total_cost(&problem()),
            40.0 + 80.0 + 360.0 + 240.0 + 600.0
        );
        assert_eq!(solution.occupied(), vec![(0, 0), (0, 1), (1, 1), (1, 2), (2, 2)]);
        assert!(!solution.is_degenerate());
    }

    #[test]
    fn partial_allocation_is_reported() {
        let solution = Solution::new(
            array![[10.0, 10.0, 0.0], [0.0, 15.0, 15.0], [0.0, 0.0, 20.0]],
            vec![0.0, 0.0, 5.0],
            vec![0.0, 0.0, 5.0],
            vec![],
        );

        assert!(!solution.satisfies(&problem()));
        assert!(!solution.is_complete());
    }

    #[test]
    fn display_aligns_columns() {
        let solution = Solution::new(array![[1.0, 10.0], [100.0, 0.0]], vec![], vec![], vec![]);
        assert_eq!(format!("{}", solution), "[  1  10]\n[100   0]\n");
    }
}
