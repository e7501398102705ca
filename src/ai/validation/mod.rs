//! Model Output Validation
//!
//! Recovery layer between raw model text and typed itinerary data:
//! - Tiered parsing with an explicit record of which tier succeeded
//! - Text-level repair for fenced, prose-wrapped and truncated JSON
//! - A bounded literal evaluator in place of any code execution
//!
//! ## Design Philosophy
//! - Prefer the least invasive tier that yields a value
//! - Never return a partially parsed value: a result is either whole or a `ParseError`

mod json_repair;
mod literal;
mod response_parser;

pub use json_repair::{fix_trailing_commas, object_substring, preprocess, repair_structure};
pub use literal::{Grammar, LiteralError, Limits, evaluate_expression, parse_lenient};
pub use response_parser::{ParseOutcome, ResponseParser};
