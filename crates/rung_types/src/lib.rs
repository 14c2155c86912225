//! # Rung parameter types
//!
//! Closed set of parameter type descriptors an extension can declare in
//! `config.params`, together with the pure operations the input pipeline runs
//! over them:
//!
//! - [`TypeDescriptor::type_name`] renders a human label (`Char(10)`,
//!   `IntegerRange(10, 20)`, `OneOf([A, B])`)
//! - [`filter`] casts a raw answer into the type's value, yielding
//!   [`serde_json::Value::Null`] when the cast fails
//! - [`validate`] checks an already filtered value
//!
//! Descriptors travel between the sandbox and the host as plain JSON objects
//! tagged by `name`, e.g. `{"name": "IntegerRange", "from": 10, "to": 20}`.

mod descriptor;
mod filter;
mod number;
mod validate;

pub use descriptor::{DescriptorError, TypeDescriptor};
pub use filter::filter;
pub use number::{format_number, parse_float, parse_int};
pub use validate::validate;
