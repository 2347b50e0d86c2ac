//! # askdb-oracle
//!
//! The natural-language-to-SQL oracle seam for askdb.
//!
//! [`SqlOracle`] is what the routing engine talks to: SQL generation, a
//! training intake, and a raw completion call for pair synthesis.
//! [`ChatOracle`] implements it against any OpenAI-compatible chat endpoint.

mod chat;
mod error;
mod http;
mod oracle;
pub mod prompt;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use chat::ChatOracle;
pub use error::OracleError;
pub use oracle::{CompletionOptions, SqlOracle};
