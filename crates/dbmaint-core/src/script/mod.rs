//! Script model: scripts, identifiers, tags and execution outcomes.

pub mod executed;
pub mod identifier;
pub mod model;
pub mod tag;

pub use executed::{current_timestamp, ExecutedScript, ExecutionOutcome, ExecutionStatus};
pub use identifier::{IdentifierPattern, DEFAULT_IDENTIFIER_PATTERN};
pub use model::{checksum, Script};
pub use tag::{Tag, TagMatcher};
