use derive_more::Display;
use itertools::iproduct;
use log::{debug, trace};
use ndarray::{s, Array2};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// The type used for supplied and demanded quantities
pub type Quantity = f64;
/// The type used for cost.
pub type Cost = f64;

pub type OriginIndex = usize;
pub type DestinationIndex = usize;

/// A transportation problem: ship the supply of every origin to the destinations,
/// meeting their demand, where each unit shipped from origin `i` to destination `j`
/// costs `cost[[i, j]]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedProblem")]
pub struct Problem {
    /// The quantity available at each origin
    supply: Vec<Quantity>,
    /// The quantity required by each destination
    demand: Vec<Quantity>,
    /// Unit cost of shipping from an origin (row) to a destination (column)
    cost: Array2<Cost>,
}

/// The serialized form of a `Problem`, validated through `Problem::new` when deserialized
#[derive(Deserialize)]
struct UncheckedProblem {
    supply: Vec<Quantity>,
    demand: Vec<Quantity>,
    cost: Array2<Cost>,
}

impl TryFrom<UncheckedProblem> for Problem {
    type Error = ProblemConstructionError;

    fn try_from(value: UncheckedProblem) -> Result<Self, Self::Error> {
        Problem::new(value.supply, value.demand, value.cost)
    }
}

#[derive(Debug, Clone, PartialEq, Display)]
pub enum ProblemConstructionError {
    /// There must be at least one origin
    #[display(fmt = "the problem has no origins")]
    NoOrigins,
    /// There must be at least one destination
    #[display(fmt = "the problem has no destinations")]
    NoDestinations,
    /// The size of the cost matrix is not (origins, destinations)
    #[display(
        fmt = "cost matrix has shape {:?}, expected {:?}",
        actual,
        expected
    )]
    CostSizeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
    /// Origin `origin` has a negative supply
    #[display(fmt = "origin {} has negative supply {}", origin, value)]
    NegativeSupply { origin: OriginIndex, value: Quantity },
    /// Destination `destination` has a negative demand
    #[display(fmt = "destination {} has negative demand {}", destination, value)]
    NegativeDemand {
        destination: DestinationIndex,
        value: Quantity,
    },
    /// The unit cost from `origin` to `destination` is negative
    #[display(
        fmt = "cost from origin {} to destination {} is negative ({})",
        origin,
        destination,
        value
    )]
    NegativeCost {
        origin: OriginIndex,
        destination: DestinationIndex,
        value: Cost,
    },
    /// A supply, demand or cost is NaN or infinite
    #[display(fmt = "{} contains a value that is not finite", _0)]
    NotFinite(&'static str),
}

impl std::error::Error for ProblemConstructionError {}

impl Problem {
    pub fn new(
        supply: Vec<Quantity>,
        demand: Vec<Quantity>,
        cost: Array2<Cost>,
    ) -> Result<Problem, ProblemConstructionError> {
        use ProblemConstructionError::*;

        if supply.is_empty() {
            return Err(NoOrigins);
        }
        if demand.is_empty() {
            return Err(NoDestinations);
        }
        if cost.dim() != (supply.len(), demand.len()) {
            return Err(CostSizeMismatch {
                expected: (supply.len(), demand.len()),
                actual: cost.dim(),
            });
        }

        if !supply.iter().all(|x| x.is_finite()) {
            return Err(NotFinite("supply"));
        }
        if !demand.iter().all(|x| x.is_finite()) {
            return Err(NotFinite("demand"));
        }
        if !cost.iter().all(|x| x.is_finite()) {
            return Err(NotFinite("cost"));
        }

        if let Some((origin, &value)) = supply.iter().enumerate().find(|&(_, &s)| s < 0.0) {
            return Err(NegativeSupply { origin, value });
        }
        if let Some((destination, &value)) = demand.iter().enumerate().find(|&(_, &d)| d < 0.0) {
            return Err(NegativeDemand { destination, value });
        }
        if let Some(((origin, destination), &value)) =
            cost.indexed_iter().find(|&(_, &c)| c < 0.0)
        {
            return Err(NegativeCost {
                origin,
                destination,
                value,
            });
        }

        Ok(Problem {
            supply,
            demand,
            cost,
        })
    }

    /// Construct a problem from nested rows of costs. Convenient for tests and small instances.
    pub fn from_rows(
        supply: Vec<Quantity>,
        demand: Vec<Quantity>,
        rows: &[Vec<Cost>],
    ) -> Result<Problem, ProblemConstructionError> {
        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        if let Some(row) = rows.iter().find(|r| r.len() != width) {
            return Err(ProblemConstructionError::CostSizeMismatch {
                expected: (supply.len(), demand.len()),
                actual: (rows.len(), row.len()),
            });
        }

        let flat = rows.iter().flatten().cloned().collect::<Vec<_>>();
        let cost = Array2::from_shape_vec((rows.len(), width), flat).map_err(|_| {
            ProblemConstructionError::CostSizeMismatch {
                expected: (supply.len(), demand.len()),
                actual: (rows.len(), width),
            }
        })?;

        Problem::new(supply, demand, cost)
    }

    /// A random balanced problem with `origins` origins and `destinations` destinations.
    /// Quantities are integral in `1..=max_quantity` per origin and the total is split over the destinations,
    /// costs are integral in `0..=max_cost`.
    pub fn random<R: Rng>(
        rng: &mut R,
        origins: usize,
        destinations: usize,
        max_quantity: u32,
        max_cost: u32,
    ) -> Result<Problem, ProblemConstructionError> {
        let supply: Vec<Quantity> = (0..origins)
            .map(|_| rng.gen_range(1..=max_quantity.max(1)) as Quantity)
            .collect();
        let total = supply.iter().sum::<Quantity>() as u64;

        // Split the total supply into `destinations` parts at random cut points
        let mut cuts = (1..destinations)
            .map(|_| rng.gen_range(0..=total))
            .collect::<Vec<_>>();
        cuts.sort_unstable();
        let demand = std::iter::once(0)
            .chain(cuts.iter().cloned())
            .zip(cuts.iter().cloned().chain(std::iter::once(total)))
            .map(|(from, to)| (to - from) as Quantity)
            .collect::<Vec<_>>();

        let cost = Array2::from_shape_fn((origins, destinations), |_| {
            rng.gen_range(0..=max_cost) as Cost
        });

        trace!("random problem: supply = {:?}, demand = {:?}", supply, demand);
        Problem::new(supply, demand, cost)
    }

    /// The quantity available at each origin
    pub fn supply(&self) -> &[Quantity] {
        &self.supply
    }

    /// The quantity required by each destination
    pub fn demand(&self) -> &[Quantity] {
        &self.demand
    }

    /// The unit cost matrix, indexed by `[[origin, destination]]`
    pub fn cost(&self) -> &Array2<Cost> {
        &self.cost
    }

    /// The number of origins
    pub fn origins(&self) -> usize {
        self.supply.len()
    }

    /// The number of destinations
    pub fn destinations(&self) -> usize {
        self.demand.len()
    }

    pub fn total_supply(&self) -> Quantity {
        self.supply.iter().sum()
    }

    pub fn total_demand(&self) -> Quantity {
        self.demand.iter().sum()
    }

    /// Whether total supply equals total demand. The only slack allowed is the rounding error
    /// of summing `m + n` values of the magnitude of the totals.
    pub fn is_balanced(&self) -> bool {
        let (supply, demand) = (self.total_supply(), self.total_demand());
        let terms = (self.origins() + self.destinations()) as f64;
        let scale = supply.max(demand).max(1.0);

        (supply - demand).abs() <= f64::EPSILON * terms * scale
    }

    /// An equivalent balanced problem. Excess supply is sent to a dummy destination and
    /// excess demand is served by a dummy origin, both at zero cost.
    /// Returns a plain copy if the problem is already balanced.
    pub fn balanced(&self) -> Problem {
        if self.is_balanced() {
            return self.clone();
        }

        let (m, n) = self.cost.dim();
        let excess = self.total_supply() - self.total_demand();
        let mut supply = self.supply.clone();
        let mut demand = self.demand.clone();

        let cost = if excess > 0.0 {
            debug!("adding dummy destination with demand {}", excess);
            demand.push(excess);
            let mut cost = Array2::zeros((m, n + 1));
            cost.slice_mut(s![.., ..n]).assign(&self.cost);
            cost
        } else {
            debug!("adding dummy origin with supply {}", -excess);
            supply.push(-excess);
            let mut cost = Array2::zeros((m + 1, n));
            cost.slice_mut(s![..m, ..]).assign(&self.cost);
            cost
        };

        Problem {
            supply,
            demand,
            cost,
        }
    }

    /// All cells of the problem as `(origin, destination)` pairs, in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (OriginIndex, DestinationIndex)> {
        iproduct!(0..self.origins(), 0..self.destinations())
    }
}
