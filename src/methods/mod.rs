//! Construction heuristics for an initial basic feasible solution.
//!
//! Every method takes the problem by reference, works on its own copy of the
//! supply and demand, and hands the remainders back in the [`Solution`].
pub mod min_cost;
pub mod min_row_cost;
pub mod northwest;
pub mod vogel;

use std::cmp::Ordering;
use std::str::FromStr;

use derive_more::Display;
use float_ord::FloatOrd;
use log::{debug, trace};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::problem::{Cost, DestinationIndex, OriginIndex, Problem, Quantity};
use crate::solution::{Shipment, Solution};

pub use min_cost::{minimum_cost, minimum_cost_rescan};
pub use min_row_cost::minimum_row_cost;
pub use northwest::northwest_corner;
pub use vogel::vogel;

#[derive(Debug, Clone, PartialEq, Display)]
pub enum Error {
    /// The method requires total supply to equal total demand
    #[display(
        fmt = "unbalanced problem: total supply {} does not match total demand {}",
        supply,
        demand
    )]
    Unbalanced { supply: Quantity, demand: Quantity },
}

impl std::error::Error for Error {}

/// The available construction methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum Method {
    #[display(fmt = "Northwest Corner Rule")]
    #[serde(rename = "northwest")]
    NorthwestCorner,
    /// Single pass over all cells sorted by cost
    #[display(fmt = "Minimum Cost Method")]
    #[serde(rename = "min-cost")]
    MinimumCost,
    /// Re-selects the cheapest open cell after every allocation
    #[display(fmt = "Minimum Cost Method (rescanning)")]
    #[serde(rename = "min-cost-rescan")]
    MinimumCostRescan,
    #[display(fmt = "Minimum Row Cost Method")]
    #[serde(rename = "min-row-cost")]
    MinimumRowCost,
    #[display(fmt = "Vogel's Approximation Method")]
    #[serde(rename = "vogel")]
    Vogel,
}

impl Method {
    pub const ALL: [Method; 5] = [
        Method::NorthwestCorner,
        Method::MinimumCost,
        Method::MinimumCostRescan,
        Method::MinimumRowCost,
        Method::Vogel,
    ];

    /// The short name accepted by `Method::from_str`
    pub fn key(&self) -> &'static str {
        match self {
            Method::NorthwestCorner => "northwest",
            Method::MinimumCost => "min-cost",
            Method::MinimumCostRescan => "min-cost-rescan",
            Method::MinimumRowCost => "min-row-cost",
            Method::Vogel => "vogel",
        }
    }

    /// Construct an initial solution to `problem` with this method
    pub fn solve(&self, problem: &Problem) -> Result<Solution, Error> {
        debug!(
            "solving {}x{} problem with {}",
            problem.origins(),
            problem.destinations(),
            self
        );

        match self {
            Method::NorthwestCorner => Ok(northwest_corner(problem)),
            Method::MinimumCost => Ok(minimum_cost(problem)),
            Method::MinimumCostRescan => Ok(minimum_cost_rescan(problem)),
            Method::MinimumRowCost => Ok(minimum_row_cost(problem)),
            Method::Vogel => vogel(problem),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display(fmt = "unknown method `{}`, expected one of {}", _0, _1)]
pub struct ParseMethodError(String, String);

impl std::error::Error for ParseMethodError {}

impl FromStr for Method {
    type Err = ParseMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('_', "-");
        match key.as_str() {
            "northwest" | "northwest-corner" | "nw" => Ok(Method::NorthwestCorner),
            "min-cost" | "minimum-cost" => Ok(Method::MinimumCost),
            "min-cost-rescan" | "minimum-cost-rescan" => Ok(Method::MinimumCostRescan),
            "min-row-cost" | "minimum-row-cost" | "row" => Ok(Method::MinimumRowCost),
            "vogel" | "vam" => Ok(Method::Vogel),
            _ => Err(ParseMethodError(
                s.to_string(),
                Method::ALL.iter().map(|m| m.key()).collect::<Vec<_>>().join(", "),
            )),
        }
    }
}

/// A cell of the cost matrix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub cost: Cost,
    pub origin: OriginIndex,
    pub destination: DestinationIndex,
}

/// Cheapest cost first, then the lowest origin index, then the lowest destination index.
pub fn cheapest_cell(a: &Cell, b: &Cell) -> Ordering {
    FloatOrd(a.cost)
        .cmp(&FloatOrd(b.cost))
        .then(a.origin.cmp(&b.origin))
        .then(a.destination.cmp(&b.destination))
}

/// Orders `(index, cost)` candidates: cheapest cost first, then the lowest index.
pub fn cheapest_index(a: &(usize, Cost), b: &(usize, Cost)) -> Ordering {
    FloatOrd(a.1).cmp(&FloatOrd(b.1)).then(a.0.cmp(&b.0))
}

/// Orders `(index, penalty)` candidates such that the maximum is the largest penalty,
/// and among equal penalties the one with the lowest index.
pub fn largest_penalty(a: &(usize, f64), b: &(usize, f64)) -> Ordering {
    FloatOrd(a.1).cmp(&FloatOrd(b.1)).then(b.0.cmp(&a.0))
}

/// The index of the cheapest candidate, ties going to the lowest index
pub fn cheapest<I>(candidates: I) -> Option<usize>
where
    I: IntoIterator<Item = (usize, Cost)>,
{
    candidates
        .into_iter()
        .min_by(cheapest_index)
        .map(|(idx, _)| idx)
}

/// The working state of a single run
#[derive(Debug)]
pub(crate) struct State {
    pub supply: Vec<Quantity>,
    pub demand: Vec<Quantity>,
    allocation: Array2<Quantity>,
    shipments: Vec<Shipment>,
}

impl State {
    pub fn new(problem: &Problem) -> State {
        State {
            supply: problem.supply().to_vec(),
            demand: problem.demand().to_vec(),
            allocation: Array2::zeros((problem.origins(), problem.destinations())),
            shipments: Vec::new(),
        }
    }

    /// Whether both the origin and the destination have something left
    pub fn is_open(&self, origin: OriginIndex, destination: DestinationIndex) -> bool {
        self.supply[origin] > 0.0 && self.demand[destination] > 0.0
    }

    /// Origins with remaining supply
    pub fn open_origins(&self) -> impl Iterator<Item = OriginIndex> + '_ {
        self.supply
            .iter()
            .enumerate()
            .filter(|&(_, &s)| s > 0.0)
            .map(|(i, _)| i)
    }

    /// Destinations with remaining demand
    pub fn open_destinations(&self) -> impl Iterator<Item = DestinationIndex> + '_ {
        self.demand
            .iter()
            .enumerate()
            .filter(|&(_, &d)| d > 0.0)
            .map(|(j, _)| j)
    }

    /// Ship as much as possible from `origin` to `destination`. Returns the quantity shipped.
    pub fn allocate(&mut self, origin: OriginIndex, destination: DestinationIndex) -> Quantity {
        let quantity = self.supply[origin].min(self.demand[destination]);
        trace!("allocate {} at ({}, {})", quantity, origin, destination);

        self.allocation[[origin, destination]] += quantity;
        self.supply[origin] -= quantity;
        self.demand[destination] -= quantity;
        self.shipments.push(Shipment {
            origin,
            destination,
            quantity,
        });

        quantity
    }

    pub fn into_solution(self) -> Solution {
        Solution::new(self.allocation, self.supply, self.demand, self.shipments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn methods_serialize_as_their_keys() {
        for method in Method::ALL {
            let json = serde_json::to_string(&method).unwrap();
            assert_eq!(json, format!("\"{}\"", method.key()));
            assert_eq!(serde_json::from_str::<Method>(&json).unwrap(), method);
        }
    }

    #[test]
    fn methods_parse_from_their_keys() {
        for method in Method::ALL {
            assert_eq!(method.key().parse::<Method>(), Ok(method));
        }
        assert_eq!("VAM".parse::<Method>(), Ok(Method::Vogel));
        assert_eq!("min_row_cost".parse::<Method>(), Ok(Method::MinimumRowCost));
        assert!("simplex".parse::<Method>().is_err());
    }

    #[test]
    fn cheapest_prefers_lowest_index_on_ties() {
        assert_eq!(cheapest(vec![(3, 2.0), (1, 1.0), (0, 1.0)]), Some(0));
        assert_eq!(cheapest(vec![(5, 0.5), (1, 1.0)]), Some(5));
        assert_eq!(cheapest(Vec::new()), None);
    }

    #[test]
    fn largest_penalty_prefers_lowest_index_on_ties() {
        let candidates = vec![(0, 1.0), (1, 4.0), (2, 4.0), (3, 2.0)];
        assert_eq!(
            candidates.iter().cloned().max_by(largest_penalty),
            Some((1, 4.0))
        );

        let candidates = vec![(0, 3.0), (1, f64::INFINITY), (2, f64::INFINITY)];
        assert_eq!(
            candidates.iter().cloned().max_by(largest_penalty),
            Some((1, f64::INFINITY))
        );
    }

    #[test]
    fn cells_sort_by_cost_then_row_then_column() {
        let cell = |cost, origin, destination| Cell {
            cost,
            origin,
            destination,
        };
        let mut cells = vec![
            cell(2.0, 0, 0),
            cell(1.0, 1, 1),
            cell(1.0, 1, 0),
            cell(1.0, 0, 2),
        ];
        cells.sort_by(cheapest_cell);

        assert_eq!(
            cells,
            vec![
                cell(1.0, 0, 2),
                cell(1.0, 1, 0),
                cell(1.0, 1, 1),
                cell(2.0, 0, 0)
            ]
        );
    }
}
