//! Standard library built-in objects.
//!
//! This module contains the `Function.prototype` methods, `%ThrowTypeError%` and the
//! `ArrayBuffer` constructor with its prototype.

pub mod array_buffer;
pub mod core;
pub mod function;
