// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Filter expressions for remote queries.
//!
//! Expressions take the form:
//!
//! ```text
//! field op value
//! ```
//!
//! # Fields
//!
//! A top-level payload field, or a dotted path into nested objects
//! (`vendor.name`).
//!
//! # Operators
//!
//! - `<`, `<=`, `>`, `>=`, `=`, `!=`
//!
//! # Values
//!
//! Any JSON literal (`10`, `true`, `null`, `"Corner Shop"`). Anything that
//! is not valid JSON is taken as a bare string.
//!
//! # Examples
//!
//! ```text
//! amount >= 10
//! category = food
//! vendor.name != "Corner Shop"
//! ```

mod parser;

pub use parser::{parse_clause, parse_duration, parse_filter};
