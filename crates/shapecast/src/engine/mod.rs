//! The generic type-directed recursion engine.
//!
//! One algorithm family walks a [`Shape`](crate::schema::Shape) in
//! lockstep with a runtime value or its parsed JSON form:
//!
//! - `validate`: shape × value → verdict
//! - `json`: value → JSON text, and parsed JSON × shapes → value
//! - `synthesize`: shapes alone → a fresh structurally-valid value
//!
//! The engine performs no I/O and holds no state of its own; callers
//! pass the registry view they are operating under.

pub mod json;
pub mod synthesize;
pub mod validate;

pub use json::JsonMode;
