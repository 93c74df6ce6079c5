//! Tests for the ArrayBuffer constructor and prototype.
//!
//! These tests drive the built-ins the way an evaluator would: property lookups followed by
//! `Call`/`Construct` through the abstract operations.

extern crate just_runtime;

use std::cell::RefCell;
use std::rc::Rc;

use just_runtime::runner::ds::array_buffer_object::ArrayBufferObject;
use just_runtime::runner::ds::error::JErrorType;
use just_runtime::runner::ds::execution_context::EvalContext;
use just_runtime::runner::ds::function_object::native_function_create;
use just_runtime::runner::ds::heap::HeapConfig;
use just_runtime::runner::ds::object::{object_create, JsObjectType, ObjectType};
use just_runtime::runner::ds::object_property::PropertyKey;
use just_runtime::runner::ds::operations::array_buffer::detach_array_buffer;
use just_runtime::runner::ds::operations::object::{
    call, construct, create_data_property, get,
};
use just_runtime::runner::ds::realm::WellKnownIntrinsics;
use just_runtime::runner::ds::symbol::{SYMBOL_SPECIES, SYMBOL_TO_STRING_TAG};
use just_runtime::runner::ds::value::JsValue;

use proptest::prelude::*;

// ============================================================================
// Helpers
// ============================================================================

fn array_buffer_ctor(ctx: &EvalContext) -> JsObjectType {
    ctx.realm
        .get_intrinsics_value(WellKnownIntrinsics::ArrayBuffer)
        .clone()
}

fn new_buffer(ctx: &mut EvalContext, len: f64, max: Option<f64>) -> JsObjectType {
    let ctor = array_buffer_ctor(ctx);
    let mut args = vec![JsValue::from(len)];
    if let Some(max) = max {
        let options = object_create(None);
        create_data_property(&options, "maxByteLength".into(), JsValue::from(max));
        args.push(JsValue::Object(options));
    }
    construct(ctx, &ctor, args, None)
        .expect("new ArrayBuffer should succeed")
        .as_object()
        .expect("new ArrayBuffer should return an object")
        .clone()
}

fn invoke(
    ctx: &mut EvalContext,
    o: &JsObjectType,
    method: &str,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let f = get(ctx, o, &PropertyKey::from(method))?;
    call(ctx, &f, JsValue::Object(o.clone()), args)
}

fn read(ctx: &mut EvalContext, o: &JsObjectType, property: &str) -> JsValue {
    get(ctx, o, &PropertyKey::from(property)).expect("property read should succeed")
}

fn bytes(o: &JsObjectType) -> Vec<u8> {
    o.borrow()
        .as_array_buffer()
        .and_then(|b| b.data())
        .map(|d| d.to_vec())
        .unwrap_or_default()
}

fn fill(o: &JsObjectType, values: &[u8]) {
    let mut o = o.borrow_mut();
    let data = o.as_array_buffer_mut().unwrap().data_mut().unwrap();
    data[..values.len()].copy_from_slice(values);
}

fn slice_of(ctx: &mut EvalContext, o: &JsObjectType, args: Vec<JsValue>) -> JsObjectType {
    invoke(ctx, o, "slice", args)
        .expect("slice should succeed")
        .as_object()
        .unwrap()
        .clone()
}

// ============================================================================
// Constructor
// ============================================================================

mod constructor_tests {
    use super::*;

    #[test]
    fn test_new_array_buffer_is_zero_filled() {
        let mut ctx = EvalContext::new();
        let b = new_buffer(&mut ctx, 4.0, None);
        assert_eq!(bytes(&b), vec![0, 0, 0, 0]);
        assert_eq!(read(&mut ctx, &b, "byteLength"), JsValue::from(4.0));
        assert_eq!(read(&mut ctx, &b, "resizable"), JsValue::Boolean(false));
        assert_eq!(read(&mut ctx, &b, "maxByteLength"), JsValue::from(4.0));
        assert_eq!(read(&mut ctx, &b, "detached"), JsValue::Boolean(false));
    }

    #[test]
    fn test_call_without_new_is_type_error() {
        let mut ctx = EvalContext::new();
        let ctor = array_buffer_ctor(&ctx);
        let err = call(
            &mut ctx,
            &JsValue::Object(ctor),
            JsValue::Undefined,
            vec![JsValue::from(8.0)],
        )
        .unwrap_err();
        assert!(err.is_type_error());
    }

    #[test]
    fn test_length_above_max_byte_length_is_range_error() {
        let mut ctx = EvalContext::new();
        let ctor = array_buffer_ctor(&ctx);
        let options = object_create(None);
        create_data_property(&options, "maxByteLength".into(), JsValue::from(4.0));
        let err = construct(
            &mut ctx,
            &ctor,
            vec![JsValue::from(8.0), JsValue::Object(options)],
            None,
        )
        .unwrap_err();
        assert!(err.is_range_error());
    }

    #[test]
    fn test_negative_length_is_range_error() {
        let mut ctx = EvalContext::new();
        let ctor = array_buffer_ctor(&ctx);
        let err = construct(&mut ctx, &ctor, vec![JsValue::from(-1.0)], None).unwrap_err();
        assert!(err.is_range_error());
    }

    #[test]
    fn test_non_object_options_are_ignored() {
        let mut ctx = EvalContext::new();
        let ctor = array_buffer_ctor(&ctx);
        let b = construct(
            &mut ctx,
            &ctor,
            vec![JsValue::from(2.0), JsValue::from(10.0)],
            None,
        )
        .unwrap();
        let b = b.as_object().unwrap().clone();
        assert_eq!(read(&mut ctx, &b, "resizable"), JsValue::Boolean(false));
    }

    #[test]
    fn test_prototype_wiring() {
        let mut ctx = EvalContext::new();
        let ctor = array_buffer_ctor(&ctx);
        let proto = ctx
            .realm
            .get_intrinsics_value(WellKnownIntrinsics::ArrayBufferPrototype)
            .clone();
        assert_eq!(
            read(&mut ctx, &proto, "constructor"),
            JsValue::Object(ctor.clone())
        );
        let tag = get(&mut ctx, &proto, &PropertyKey::from(&*SYMBOL_TO_STRING_TAG)).unwrap();
        assert_eq!(tag, JsValue::from("ArrayBuffer"));
        let species = get(&mut ctx, &ctor, &PropertyKey::from(&*SYMBOL_SPECIES)).unwrap();
        assert_eq!(species, JsValue::Object(ctor));
    }

    #[test]
    fn test_allocation_respects_heap_limit() {
        let mut ctx = EvalContext::with_heap_config(HeapConfig::with_limit(8));
        let ctor = array_buffer_ctor(&ctx);
        let err = construct(&mut ctx, &ctor, vec![JsValue::from(16.0)], None).unwrap_err();
        assert!(err.is_range_error());

        let b = new_buffer(&mut ctx, 4.0, Some(64.0));
        let err = invoke(&mut ctx, &b, "resize", vec![JsValue::from(32.0)]).unwrap_err();
        assert!(err.is_range_error());
        assert_eq!(read(&mut ctx, &b, "byteLength"), JsValue::from(4.0));
        assert_eq!(ctx.heap.get_allocated(), 4);
    }

    #[test]
    fn test_dropped_buffers_release_heap_bytes() {
        let mut ctx = EvalContext::with_heap_config(HeapConfig::with_limit(16));
        let ctor = array_buffer_ctor(&ctx);
        for _ in 0..4 {
            let b = construct(&mut ctx, &ctor, vec![JsValue::from(8.0)], None).unwrap();
            assert_eq!(ctx.heap.get_allocated(), 8);
            drop(b);
        }
        assert_eq!(ctx.heap.get_allocated(), 0);

        let kept = new_buffer(&mut ctx, 8.0, Some(16.0));
        let err = construct(&mut ctx, &ctor, vec![JsValue::from(9.0)], None).unwrap_err();
        assert!(err.is_range_error());
        drop(kept);
        construct(&mut ctx, &ctor, vec![JsValue::from(16.0)], None).unwrap();
    }
}

// ============================================================================
// Prototype methods
// ============================================================================

mod resize_tests {
    use super::*;

    #[test]
    fn test_resize_within_max() {
        let mut ctx = EvalContext::new();
        let b = new_buffer(&mut ctx, 2.0, Some(10.0));
        fill(&b, &[1, 2]);
        invoke(&mut ctx, &b, "resize", vec![JsValue::from(10.0)]).unwrap();
        assert_eq!(read(&mut ctx, &b, "byteLength"), JsValue::from(10.0));
        assert_eq!(bytes(&b)[..3], [1, 2, 0]);
        invoke(&mut ctx, &b, "resize", vec![JsValue::from(1.0)]).unwrap();
        assert_eq!(bytes(&b), vec![1]);
        assert_eq!(read(&mut ctx, &b, "maxByteLength"), JsValue::from(10.0));
    }

    #[test]
    fn test_resize_above_max_is_range_error() {
        let mut ctx = EvalContext::new();
        let b = new_buffer(&mut ctx, 2.0, Some(10.0));
        let err = invoke(&mut ctx, &b, "resize", vec![JsValue::from(11.0)]).unwrap_err();
        assert!(err.is_range_error());
        assert_eq!(read(&mut ctx, &b, "byteLength"), JsValue::from(2.0));
    }

    #[test]
    fn test_resize_fixed_length_is_type_error() {
        let mut ctx = EvalContext::new();
        let b = new_buffer(&mut ctx, 4.0, None);
        for len in [0.0, 4.0, 8.0].iter() {
            let err = invoke(&mut ctx, &b, "resize", vec![JsValue::from(*len)]).unwrap_err();
            assert!(err.is_type_error());
        }
    }

    #[test]
    fn test_resize_on_incompatible_receiver() {
        let mut ctx = EvalContext::new();
        let b = new_buffer(&mut ctx, 4.0, Some(8.0));
        let resize = read(&mut ctx, &b, "resize");
        let err = call(&mut ctx, &resize, JsValue::Object(object_create(None)), vec![])
            .unwrap_err();
        assert!(err.is_type_error());
        assert!(err
            .message()
            .starts_with("Method ArrayBuffer.prototype.resize called on incompatible receiver"));
    }
}

mod slice_tests {
    use super::*;

    #[test]
    fn test_negative_start_counts_from_end() {
        let mut ctx = EvalContext::new();
        let b = new_buffer(&mut ctx, 5.0, None);
        fill(&b, &[0, 1, 2, 3, 4]);
        let a = slice_of(&mut ctx, &b, vec![JsValue::from(-2.0)]);
        let c = slice_of(&mut ctx, &b, vec![JsValue::from(3.0)]);
        assert_eq!(bytes(&a), vec![3, 4]);
        assert_eq!(bytes(&a), bytes(&c));
    }

    #[test]
    fn test_slice_without_arguments_is_independent_copy() {
        let mut ctx = EvalContext::new();
        let b = new_buffer(&mut ctx, 3.0, None);
        fill(&b, &[7, 8, 9]);
        let copy = slice_of(&mut ctx, &b, vec![]);
        assert_eq!(bytes(&copy), vec![7, 8, 9]);
        fill(&copy, &[1]);
        assert_eq!(bytes(&b), vec![7, 8, 9]);
        assert!(!Rc::ptr_eq(&copy, &b));
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let mut ctx = EvalContext::new();
        let b = new_buffer(&mut ctx, 5.0, None);
        let s = slice_of(&mut ctx, &b, vec![JsValue::from(4.0), JsValue::from(1.0)]);
        assert_eq!(read(&mut ctx, &s, "byteLength"), JsValue::from(0.0));
    }

    #[test]
    fn test_slice_of_resizable_buffer_is_fixed_length() {
        let mut ctx = EvalContext::new();
        let b = new_buffer(&mut ctx, 4.0, Some(8.0));
        let s = slice_of(&mut ctx, &b, vec![]);
        assert_eq!(read(&mut ctx, &s, "resizable"), JsValue::Boolean(false));
    }
}

mod detach_tests {
    use super::*;

    #[test]
    fn test_detached_buffer_reads_zero_and_rejects_operations() {
        let mut ctx = EvalContext::new();
        let b = new_buffer(&mut ctx, 4.0, Some(8.0));
        detach_array_buffer(&mut ctx, &b).unwrap();
        assert_eq!(read(&mut ctx, &b, "byteLength"), JsValue::from(0.0));
        assert_eq!(read(&mut ctx, &b, "maxByteLength"), JsValue::from(0.0));
        assert_eq!(read(&mut ctx, &b, "detached"), JsValue::Boolean(true));
        assert!(invoke(&mut ctx, &b, "resize", vec![JsValue::from(2.0)])
            .unwrap_err()
            .is_type_error());
        assert!(invoke(&mut ctx, &b, "slice", vec![])
            .unwrap_err()
            .is_type_error());
    }

    #[test]
    fn test_detached_fixed_length_buffer() {
        let mut ctx = EvalContext::new();
        let b = new_buffer(&mut ctx, 4.0, None);
        detach_array_buffer(&mut ctx, &b).unwrap();
        assert_eq!(read(&mut ctx, &b, "maxByteLength"), JsValue::from(0.0));
        assert_eq!(ctx.heap.get_allocated(), 0);
    }
}

// ============================================================================
// Species constructors
// ============================================================================

mod species_tests {
    use super::*;

    fn victim(ctx: &mut EvalContext) -> JsObjectType {
        let global = ctx.realm.global_this.clone();
        get(ctx, &global, &PropertyKey::from("victim"))
            .unwrap()
            .as_object()
            .unwrap()
            .clone()
    }

    fn default_construct(ctx: &mut EvalContext, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
        let ctor = array_buffer_ctor(ctx);
        construct(ctx, &ctor, args, None)
    }

    fn detaching(
        ctx: &mut EvalContext,
        args: Vec<JsValue>,
        _new_target: JsObjectType,
    ) -> Result<JsValue, JErrorType> {
        let v = victim(ctx);
        detach_array_buffer(ctx, &v)?;
        default_construct(ctx, args)
    }

    fn shrinking(
        ctx: &mut EvalContext,
        args: Vec<JsValue>,
        _new_target: JsObjectType,
    ) -> Result<JsValue, JErrorType> {
        let v = victim(ctx);
        let resize = get(ctx, &v, &PropertyKey::from("resize"))?;
        call(ctx, &resize, JsValue::Object(v), vec![JsValue::from(3.0)])?;
        default_construct(ctx, args)
    }

    fn returning_receiver(
        ctx: &mut EvalContext,
        _args: Vec<JsValue>,
        _new_target: JsObjectType,
    ) -> Result<JsValue, JErrorType> {
        Ok(JsValue::Object(victim(ctx)))
    }

    fn returning_shared(
        _ctx: &mut EvalContext,
        _args: Vec<JsValue>,
        _new_target: JsObjectType,
    ) -> Result<JsValue, JErrorType> {
        let shared = ArrayBufferObject::new_shared(None, 64)?;
        Ok(JsValue::Object(Rc::new(RefCell::new(ObjectType::ArrayBuffer(
            shared,
        )))))
    }

    fn returning_detached(
        ctx: &mut EvalContext,
        args: Vec<JsValue>,
        _new_target: JsObjectType,
    ) -> Result<JsValue, JErrorType> {
        let b = default_construct(ctx, args)?;
        if let JsValue::Object(o) = &b {
            detach_array_buffer(ctx, o)?;
        }
        Ok(b)
    }

    fn returning_undersized(
        ctx: &mut EvalContext,
        _args: Vec<JsValue>,
        _new_target: JsObjectType,
    ) -> Result<JsValue, JErrorType> {
        default_construct(ctx, vec![JsValue::from(1.0)])
    }

    fn returning_plain_object(
        _ctx: &mut EvalContext,
        _args: Vec<JsValue>,
        _new_target: JsObjectType,
    ) -> Result<JsValue, JErrorType> {
        Ok(JsValue::Object(object_create(None)))
    }

    fn not_callable(
        _ctx: &mut EvalContext,
        _this: JsValue,
        _args: Vec<JsValue>,
    ) -> Result<JsValue, JErrorType> {
        Err(JErrorType::TypeError("species called without new".to_string()))
    }

    /// A buffer whose `constructor[@@species]` is a native constructor built from `behaviour`.
    fn buffer_with_species(
        ctx: &mut EvalContext,
        max: Option<f64>,
        behaviour: fn(&mut EvalContext, Vec<JsValue>, JsObjectType) -> Result<JsValue, JErrorType>,
    ) -> JsObjectType {
        let b = new_buffer(ctx, 6.0, max);
        fill(&b, &[10, 11, 12, 13, 14, 15]);
        let species = native_function_create(
            None,
            &PropertyKey::from("Species"),
            1,
            not_callable,
            Some(behaviour),
        );
        let constructor = object_create(None);
        create_data_property(
            &constructor,
            PropertyKey::from(&*SYMBOL_SPECIES),
            JsValue::Object(species),
        );
        create_data_property(&b, "constructor".into(), JsValue::Object(constructor));
        let global = ctx.realm.global_this.clone();
        create_data_property(&global, "victim".into(), JsValue::Object(b.clone()));
        b
    }

    fn assert_slice_type_error(ctx: &mut EvalContext, b: &JsObjectType) {
        let err = invoke(ctx, b, "slice", vec![JsValue::from(1.0), JsValue::from(5.0)])
            .unwrap_err();
        assert!(err.is_type_error(), "expected a type error, got {:?}", err);
    }

    #[test]
    fn test_species_detaching_receiver_fails() {
        let mut ctx = EvalContext::new();
        let b = buffer_with_species(&mut ctx, None, detaching);
        assert_slice_type_error(&mut ctx, &b);
    }

    #[test]
    fn test_species_returning_receiver_fails() {
        let mut ctx = EvalContext::new();
        let b = buffer_with_species(&mut ctx, None, returning_receiver);
        assert_slice_type_error(&mut ctx, &b);
    }

    #[test]
    fn test_species_returning_shared_buffer_fails() {
        let mut ctx = EvalContext::new();
        let b = buffer_with_species(&mut ctx, None, returning_shared);
        assert_slice_type_error(&mut ctx, &b);
    }

    #[test]
    fn test_species_returning_detached_buffer_fails() {
        let mut ctx = EvalContext::new();
        let b = buffer_with_species(&mut ctx, None, returning_detached);
        assert_slice_type_error(&mut ctx, &b);
    }

    #[test]
    fn test_species_returning_undersized_buffer_fails() {
        let mut ctx = EvalContext::new();
        let b = buffer_with_species(&mut ctx, None, returning_undersized);
        assert_slice_type_error(&mut ctx, &b);
    }

    #[test]
    fn test_species_returning_non_buffer_fails() {
        let mut ctx = EvalContext::new();
        let b = buffer_with_species(&mut ctx, None, returning_plain_object);
        assert_slice_type_error(&mut ctx, &b);
    }

    #[test]
    fn test_species_shrinking_receiver_copies_remaining_bytes() {
        let mut ctx = EvalContext::new();
        let b = buffer_with_species(&mut ctx, Some(6.0), shrinking);
        let s = slice_of(&mut ctx, &b, vec![JsValue::from(1.0), JsValue::from(5.0)]);
        // The receiver shrank to 3 bytes; only bytes 1 and 2 are still there to copy.
        assert_eq!(bytes(&s), vec![11, 12, 0, 0]);
    }

    #[test]
    fn test_non_object_constructor_is_type_error() {
        let mut ctx = EvalContext::new();
        let b = new_buffer(&mut ctx, 4.0, None);
        create_data_property(&b, "constructor".into(), JsValue::from("nope"));
        assert!(invoke(&mut ctx, &b, "slice", vec![])
            .unwrap_err()
            .is_type_error());
    }

    #[test]
    fn test_undefined_species_uses_default() {
        let mut ctx = EvalContext::new();
        let b = new_buffer(&mut ctx, 4.0, None);
        create_data_property(&b, "constructor".into(), JsValue::Object(object_create(None)));
        let s = slice_of(&mut ctx, &b, vec![]);
        assert_eq!(read(&mut ctx, &s, "byteLength"), JsValue::from(4.0));
    }
}

// ============================================================================
// Properties
// ============================================================================

fn clamp(relative: i32, len: usize) -> usize {
    if relative < 0 {
        (len as i64 + relative as i64).max(0) as usize
    } else {
        (relative as usize).min(len)
    }
}

proptest! {
    #[test]
    fn prop_slice_length_matches_clamped_range(
        len in 0usize..24,
        start in -32i32..32,
        end in proptest::option::of(-32i32..32),
    ) {
        let mut ctx = EvalContext::new();
        let b = new_buffer(&mut ctx, len as f64, None);
        let data: Vec<u8> = (0..len as u8).collect();
        fill(&b, &data);
        let mut args = vec![JsValue::from(start as f64)];
        if let Some(end) = end {
            args.push(JsValue::from(end as f64));
        }
        let s = slice_of(&mut ctx, &b, args);
        let first = clamp(start, len);
        let last = end.map_or(len, |e| clamp(e, len));
        let expected: Vec<u8> = if last > first { data[first..last].to_vec() } else { vec![] };
        prop_assert_eq!(bytes(&s), expected);
    }
}
