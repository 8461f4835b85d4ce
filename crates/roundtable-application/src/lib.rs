//! Session orchestration for Roundtable.
//!
//! Ties the domain layer and the generation seam together: the phase state
//! machine lives in [`orchestrator`], the caller-facing session façade in
//! [`coordinator`].

pub mod coordinator;
pub mod orchestrator;

pub use coordinator::{CoordinatorOptions, SessionCoordinator};
pub use orchestrator::{Phase, PhaseOutcome, RoundOrchestrator, TurnPolicy};
