//! # Declarative
//!
//! A framework for declaring infrastructure as a typed resource graph.
//!
//! This crate does not provision anything. It models the desired state an
//! external orchestration engine consumes, and the dependency edges implied by
//! one declaration reading another's not-yet-known outputs.
//!
//! ## Core Concepts
//!
//! - **Resource**: a typed description of one object (or read-only query)
//! - **Input**: a property value, either literal or deferred on other outputs
//! - **StackGraph**: declarations and exports, with edges derived from inputs
//! - **ExecutionPlan**: apply waves computed by topological sort
//! - **ResolvedOutputs**: engine-reported outputs used to evaluate exports
//!
//! ## Example
//!
//! ```ignore
//! use declarative::{Input, Inputs, Resource, StackGraph, Transform};
//!
//! #[derive(Debug)]
//! struct Group;
//!
//! impl Resource for Group {
//!     fn name(&self) -> &str { "k8s" }
//!     fn type_token(&self) -> &'static str { "azure-native:resources:ResourceGroup" }
//!     fn inputs(&self) -> Inputs { Inputs::new() }
//! }
//!
//! let mut graph = StackGraph::new();
//! let group = graph.declare(&Group)?;
//! graph.export("groupName", group.output("name"), false)?;
//!
//! let plan = graph.plan()?;
//! assert_eq!(plan.order(), vec!["k8s"]);
//! ```

pub mod error;
pub mod eval;
pub mod graph;
pub mod planner;
pub mod resource;
pub mod types;

// Re-export main types at crate root
pub use error::{Error, Result};
pub use eval::{ResolvedOutputs, evaluate};
pub use graph::{Export, Handle, StackGraph};
pub use planner::{ExecutionPlan, Wave};
pub use resource::{Declaration, DeclarationKind, Resource};
pub use types::{Input, Inputs, OutputRef, Transform};
