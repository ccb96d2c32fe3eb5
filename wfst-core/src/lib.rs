//! Weighted finite-state transducers over the tropical semiring: the core
//! algebra, structural transforms, and path-enumeration primitives. The
//! regex-compiler front end lives in a sibling crate.

pub mod algebra;
pub mod att;
pub mod copy;
pub mod error;
pub mod fst;
pub mod label;
pub mod paths;
pub mod state;
pub mod traverse;
pub mod transform;
pub mod weight;

pub use algebra::ClosureMode;
pub use error::{Diagnostic, WfstError, WfstResult};
pub use fst::{Fst, RlgLhs, RlgRule};
pub use label::{sym, Label, Symbol, EPSILON, WILDCARD};
pub use state::{ArcEnd, StateId, State, Transition};
pub use weight::Weight;
