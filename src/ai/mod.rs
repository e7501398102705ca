//! AI Output Handling
//!
//! Everything that touches model output before it becomes domain data:
//! tiered parsing, repair and the timeout helpers shared with weather lookups.

pub mod timeout;
pub mod validation;

pub use timeout::{Deadline, with_timeout};
pub use validation::{ParseOutcome, ResponseParser};
