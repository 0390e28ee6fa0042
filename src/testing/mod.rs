//! Testing Utilities Module
//!
//! Helpers for exercising bridge flows without live nodes and for asserting
//! outcomes in end-to-end runs.
//!
//! ## Submodules
//!
//! - `mock_chain` - In-memory `ChainRpc`/`ZksRpc` with scripted contract reads
//! - `fixtures` - Deployment addresses plus log and receipt builders
//! - `assertions` - Common test assertions

pub mod assertions;
pub mod fixtures;
pub mod mock_chain;

// Re-export commonly used items
pub use assertions::*;
pub use mock_chain::MockChain;
