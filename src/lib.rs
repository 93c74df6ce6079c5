//! # just-runtime - ECMAScript runtime semantics in Rust
//!
//! The conformance-critical core that an ECMAScript evaluator is built on:
//! - the environment/binding chain, including live module import bindings
//! - the `ArrayBuffer` object (resize, slice, detach)
//! - function composition (`Function.prototype.bind`, `call`, `apply`)
//!
//! Parsing and statement evaluation are not part of this crate. An evaluator drives the
//! runtime through [`runner::ds::execution_context::EvalContext`], the environment records
//! and the abstract operations in [`runner::ds::operations`].
//!
//! ## Quick Start
//!
//! ### Creating and slicing a buffer
//!
//! ```
//! use just_runtime::runner::ds::execution_context::EvalContext;
//! use just_runtime::runner::ds::object_property::PropertyKey;
//! use just_runtime::runner::ds::operations::object::{call, construct, get};
//! use just_runtime::runner::ds::realm::WellKnownIntrinsics;
//! use just_runtime::runner::ds::value::JsValue;
//!
//! let mut ctx = EvalContext::new();
//! let ctor = ctx.realm.get_intrinsics_value(WellKnownIntrinsics::ArrayBuffer).clone();
//! let buffer = construct(&mut ctx, &ctor, vec![JsValue::from(8.0)], None).unwrap();
//! let buffer = buffer.as_object().unwrap().clone();
//!
//! let slice = get(&mut ctx, &buffer, &PropertyKey::from("slice")).unwrap();
//! let part = call(&mut ctx, &slice, JsValue::Object(buffer), vec![JsValue::from(-3.0)]).unwrap();
//! let part = part.as_object().unwrap().clone();
//! let len = get(&mut ctx, &part, &PropertyKey::from("byteLength")).unwrap();
//! assert_eq!(len, JsValue::from(3.0));
//! ```
//!
//! ### Live import bindings
//!
//! ```
//! use std::rc::Rc;
//! use just_runtime::runner::ds::env_record::new_module_environment;
//! use just_runtime::runner::ds::execution_context::EvalContext;
//! use just_runtime::runner::ds::module_record::{JsModuleType, LinkedModule};
//! use just_runtime::runner::ds::value::JsValue;
//!
//! let mut ctx = EvalContext::new();
//! let exporting_env = new_module_environment(Some(ctx.realm.global_env.clone()));
//! let exporter = exporting_env.inner.as_env_record();
//! exporter.create_mutable_binding(&mut ctx, "count".to_string(), false).unwrap();
//! exporter.initialize_binding(&mut ctx, "count", JsValue::from(1.0)).unwrap();
//! let module: JsModuleType = Rc::new(LinkedModule::new(exporting_env.clone()));
//!
//! let importing_env = new_module_environment(Some(ctx.realm.global_env.clone()));
//! let importer = importing_env.inner.as_module_env().unwrap();
//! importer
//!     .create_import_binding(&mut ctx, "count".to_string(), &module, "count".to_string())
//!     .unwrap();
//!
//! exporter.set_mutable_binding(&mut ctx, "count", JsValue::from(2.0), true).unwrap();
//! let seen = importing_env.inner.as_env_record().get_binding_value(&mut ctx, "count", true);
//! assert_eq!(seen.unwrap(), JsValue::from(2.0));
//! ```
//!
//! ## Architecture
//!
//! - **[`runner::ds`]** - Data structures (values, objects, environments, realms)
//!   - **[`runner::ds::operations`]** - Abstract operations (conversion, property access,
//!     identifier resolution, buffer allocation)
//! - **[`runner::std_lib`]** - Built-in objects (`Function.prototype`, `ArrayBuffer`)

#[macro_use]
extern crate lazy_static;

pub mod runner;
