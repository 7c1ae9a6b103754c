//! Admissibility pre-check engine for air cargo shipments.
//!
//! The core is a pure, deterministic rule evaluator: build a
//! [`ShipmentRecord`], load the immutable [`ReferenceTables`] once at
//! startup, and call [`evaluate`] to get a graded [`Verdict`] with every
//! corrective action listed. Freight metrics (volumetric weight, chargeable
//! weight, concentrated-load pressure) live in [`domain::metrics`].
//!
//! Collaborators around the core — the fail-closed LLM explanation client
//! and the append-only evaluation log — live in [`infra`] and [`util`];
//! neither can influence a verdict.

pub mod domain;
pub mod infra;
pub mod util;

pub use domain::{
    evaluate, evaluate_with_policy, EvaluationPolicy, Finding, FindingCode, Phase,
    QuestionCatalog, ReferenceError, ReferenceTables, Severity, ShipmentRecord, Status, Verdict,
};
