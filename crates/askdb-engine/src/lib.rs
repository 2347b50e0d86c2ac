//! # askdb-engine
//!
//! Training and routing over a discovered schema catalog.
//!
//! - [`TrainingCorpusManager`]: submits artifacts to the oracle and keeps a
//!   bounded history of accepted ones
//! - [`PriorityOrderedTrainer`]: trains every catalogued table, priority
//!   databases first, without stopping on failures
//! - [`QueryRouter`]: resolves a question by table-name match, falling back to
//!   the oracle
//! - [`PairSynthesizer`]: bulk question/SQL pairs with template backfill
//! - [`QueryExecutor`]: runs resolved SQL across target databases
//! - [`RoutingSession`]: owns all of the above for one user

pub mod corpus;
pub mod error;
pub mod execute;
pub mod extract;
pub mod intent;
pub mod router;
pub mod session;
pub mod synth;
pub mod templates;
pub mod trainer;

pub use corpus::{BatchOutcome, TrainingCorpusManager};
pub use error::EngineError;
pub use execute::{DatabaseRows, ExecutionReport, QueryExecutor, apply_limit};
pub use intent::QueryIntent;
pub use router::{QueryRouter, exact_match};
pub use session::RoutingSession;
pub use synth::{DiversityLevel, PairSynthesizer, SynthesisTable};
pub use templates::SqlPair;
pub use trainer::{PriorityOrderedTrainer, TrainingRunResult};
