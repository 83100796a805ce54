//! Exact subset-sum search engine.
//!
//! Finds subsets of up to ~10^6 positive integers (each ≤ 2^53) that sum
//! exactly to a target, optionally within a cardinality range. Two engines
//! are available:
//!
//! - meet-in-the-middle for find-one requests over at most 40 values;
//! - branch-and-bound DFS over an explicit stack for everything else,
//!   including the resumable [`BatchController`] used for find-all.
//!
//! ```
//! use subsetsum_core::{SearchParams, Solver};
//!
//! let result = Solver::new()
//!     .find_one(&[3.0, 34.0, 4.0, 12.0, 5.0, 2.0], SearchParams::new(9, 1, 6))
//!     .unwrap();
//! assert_eq!(result.combination.unwrap().sum, 9);
//! ```

pub mod batch;
pub mod cancel;
pub mod dfs;
mod error;
pub mod generator;
pub mod input;
pub mod mitm;
mod report;
mod solver;

pub use batch::{BatchController, SessionState};
pub use cancel::{CancelToken, Interrupted};
pub use error::{SearchError, SessionStateError, ValidationError};
pub use generator::{GeneratorConfig, Instance, InstanceGenerator};
pub use input::{parse_target, Entry, Problem, SearchParams, MAX_SAFE_INTEGER};
pub use report::{BatchRecord, Combination, FindOneResult, Status};
pub use solver::{Mode, Solver, SolverConfig, Strategy};
