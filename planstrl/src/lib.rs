//! planstrl - contingent plan traces to Esterel plan controllers
//!
//! The pipeline is a single sequential pass:
//!
//! 1. [`parser::CffPlanParser`] reads the planner trace line by line, tracking
//!    branch points on a continuation stack, and builds a [`graph::PlanGraph`].
//! 2. For every action, [`resolver`] grounds the operator's preconditions from
//!    the [`domain::DomainModel`] into CONDITION edges.
//! 3. [`emitter::EsterelEmitter`] lowers the finished graph into Esterel text.

pub mod config;
pub mod domain;
pub mod emitter;
pub mod error;
pub mod export;
pub mod graph;
pub mod parser;
pub mod resolver;
pub mod utils;

pub use config::PlanstrlConfig;
pub use domain::DomainModel;
pub use emitter::{produce_esterel, EsterelEmitter};
pub use error::{LookupKind, PlanError, PlanResult, TraceWarning};
pub use export::PlanExport;
pub use graph::{
    Condition, DispatchRecord, Edge, EdgeKind, KeyValue, KnowledgeKind, Node, NodeId, PlanGraph,
};
pub use parser::{CffPlanParser, ParseReport};
