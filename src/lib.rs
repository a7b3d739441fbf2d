#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_doc_code_examples)]
#![warn(clippy::missing_docs_in_private_items)]
#![doc = include_str!("../README.md")]

mod config;
mod errors;
mod geometry;
mod input;
mod member;
mod node;
mod results;
mod stability;
mod truss;

pub use config::{SolverConfig, DEFAULT_MAX_CONDITION_NUMBER, DEFAULT_ZERO_FORCE_TOLERANCE};
pub use errors::{
    AnalysisError, ConstructionError, InputError, InstabilityError, ModelIncompleteError,
    RowError, Table, TrussEditError,
};
pub use geometry::{point, DirectionCosines, Displacement, Force, Point};
pub use input::{
    Cell, InputTables, LoadInput, LoadRecord, MemberInput, MemberRecord, NodeInput, NodeRecord,
    TrussInput,
};
pub use member::{Member, MemberNature};
pub use node::Node;
pub use results::{AnalysisResults, MemberResult, NodeResult};
pub use stability::{check_stability, condition_number};
pub use truss::{Solution, SolveState, TrussSystem};
