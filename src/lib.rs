//! Workflow authorization engine for a multi-stage video production pipeline.
//!
//! The engine answers four questions for a `(role, status)` pair (may the
//! role list the video, open its detail view, revert it, clear its
//! assignee) and validates status changes against the pipeline graph,
//! appending one approval event per accepted change. It holds no state of
//! its own; records live in a [`store::VideoStore`], whose status writes are
//! compare-and-swap.

pub mod cli;
pub mod config;
pub mod error;
pub mod service;
pub mod store;
pub mod ui;
pub mod workflow;

pub use error::{Action, Result, WorkflowError};
