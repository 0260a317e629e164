//! Initial basic feasible solutions for the transportation problem.
//!
//! ```
//! use transport::{Method, Problem};
//!
//! let problem = Problem::from_rows(
//!     vec![20.0, 30.0, 25.0],
//!     vec![10.0, 25.0, 40.0],
//!     &[vec![4.0, 8.0, 8.0], vec![16.0, 24.0, 16.0], vec![8.0, 16.0, 24.0]],
//! )
//! .unwrap();
//!
//! let solution = Method::Vogel.solve(&problem).unwrap();
//! assert!(solution.satisfies(&problem));
//! assert_eq!(solution.total_cost(&problem), 960.0);
//! ```
pub mod methods;
pub mod parse;
pub mod problem;
pub mod solution;

pub use methods::{Error, Method};
pub use problem::Problem;
pub use solution::Solution;
