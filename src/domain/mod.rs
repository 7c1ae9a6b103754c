//! Domain logic for the admissibility pre-check lives here.

pub mod catalog;
pub mod evaluation;
pub mod metrics;
pub mod reference;
pub mod shipment;
pub mod verdict;

pub use catalog::{Question, QuestionCatalog};
pub use evaluation::{evaluate, evaluate_with_policy, EvaluationPolicy};
pub use reference::{AircraftKind, ReferenceError, ReferenceTables, UldSpec};
pub use shipment::{ContentCategory, OverhangReport, ShipmentMode, ShipmentRecord};
pub use verdict::{Finding, FindingCode, Phase, Severity, Status, Verdict};
