//! Abstract operations shared by the built-ins and the evaluator.

pub mod array_buffer;
pub mod lex_env;
pub mod object;
pub mod test_and_comparison;
pub mod type_conversion;
