//! Runtime data structures: values, objects, environments and realms.

pub mod array_buffer_object;
pub mod env_record;
pub mod error;
pub mod execution_context;
pub mod function_object;
pub mod heap;
pub mod lex_env;
pub mod module_record;
pub mod object;
pub mod object_property;
pub mod operations;
pub mod realm;
pub mod symbol;
pub mod value;
