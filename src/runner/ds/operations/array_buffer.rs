use std::cell::RefCell;
use std::rc::Rc;

use crate::runner::ds::array_buffer_object::ArrayBufferObject;
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::execution_context::EvalContext;
use crate::runner::ds::object::{JsObjectType, ObjectType};
use crate::runner::ds::object_property::PropertyKey;
use crate::runner::ds::operations::object::{get, get_prototype_from_constructor};
use crate::runner::ds::operations::type_conversion::to_index;
use crate::runner::ds::realm::WellKnownIntrinsics;
use crate::runner::ds::value::JsValue;

/// AllocateArrayBuffer. The data block is charged to the heap before it is created.
pub fn allocate_array_buffer(
    ctx: &mut EvalContext,
    constructor: &JsObjectType,
    byte_length: usize,
    max_byte_length: Option<usize>,
) -> Result<JsObjectType, JErrorType> {
    if let Some(max) = max_byte_length {
        if byte_length > max {
            return Err(JErrorType::RangeError(format!(
                "byteLength {} exceeds maxByteLength {}",
                byte_length, max
            )));
        }
    }
    let proto =
        get_prototype_from_constructor(ctx, constructor, WellKnownIntrinsics::ArrayBufferPrototype)?;
    let reservation = ctx.heap.reserve(byte_length)?;
    let buffer =
        ArrayBufferObject::new(Some(proto), byte_length, max_byte_length)?.with_reservation(reservation);
    Ok(Rc::new(RefCell::new(ObjectType::ArrayBuffer(buffer))))
}

/// GetArrayBufferMaxByteLengthOption. Only an object `options` with a defined
/// `maxByteLength` makes the buffer resizable.
pub fn get_array_buffer_max_byte_length_option(
    ctx: &mut EvalContext,
    options: &JsValue,
) -> Result<Option<usize>, JErrorType> {
    let options = match options {
        JsValue::Object(o) => o,
        _ => return Ok(None),
    };
    let max_byte_length = get(ctx, options, &PropertyKey::from("maxByteLength"))?;
    if max_byte_length.is_undefined() {
        return Ok(None);
    }
    Ok(Some(to_index(ctx, &max_byte_length)?))
}

/// DetachArrayBuffer. Releases the data block; detaching twice is a no-op.
pub fn detach_array_buffer(_ctx: &mut EvalContext, buffer: &JsObjectType) -> Result<(), JErrorType> {
    let freed = {
        let mut b = buffer.borrow_mut();
        let b = match b.as_array_buffer_mut() {
            Some(b) => b,
            None => {
                return Err(JErrorType::TypeError(
                    "Cannot detach a value that is not an ArrayBuffer".to_string(),
                ))
            }
        };
        if b.is_shared() {
            return Err(JErrorType::TypeError(
                "Cannot detach a SharedArrayBuffer".to_string(),
            ));
        }
        b.detach()
    };
    tracing::debug!(freed, "array buffer detached");
    Ok(())
}

pub fn is_detached_buffer(buffer: &JsObjectType) -> bool {
    buffer
        .borrow()
        .as_array_buffer()
        .map_or(false, |b| b.is_detached())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ds::heap::HeapConfig;

    #[test]
    fn test_allocation_is_charged_to_heap() {
        let mut ctx = EvalContext::with_heap_config(HeapConfig::with_limit(16));
        let ctor = ctx
            .realm
            .get_intrinsics_value(WellKnownIntrinsics::ArrayBuffer)
            .clone();
        let b = allocate_array_buffer(&mut ctx, &ctor, 12, None).unwrap();
        assert_eq!(ctx.heap.get_allocated(), 12);
        assert!(allocate_array_buffer(&mut ctx, &ctor, 8, None)
            .unwrap_err()
            .is_range_error());
        detach_array_buffer(&mut ctx, &b).unwrap();
        assert_eq!(ctx.heap.get_allocated(), 0);
        assert!(is_detached_buffer(&b));
        detach_array_buffer(&mut ctx, &b).unwrap();
    }

    #[test]
    fn test_unreachable_buffer_releases_heap_bytes() {
        let mut ctx = EvalContext::with_heap_config(HeapConfig::with_limit(16));
        let ctor = ctx
            .realm
            .get_intrinsics_value(WellKnownIntrinsics::ArrayBuffer)
            .clone();
        for _ in 0..4 {
            let b = allocate_array_buffer(&mut ctx, &ctor, 12, None).unwrap();
            assert_eq!(ctx.heap.get_allocated(), 12);
            drop(b);
        }
        assert_eq!(ctx.heap.get_allocated(), 0);
    }

    #[test]
    fn test_length_above_max_is_range_error() {
        let mut ctx = EvalContext::new();
        let ctor = ctx
            .realm
            .get_intrinsics_value(WellKnownIntrinsics::ArrayBuffer)
            .clone();
        assert!(allocate_array_buffer(&mut ctx, &ctor, 8, Some(4))
            .unwrap_err()
            .is_range_error());
    }

    #[test]
    fn test_shared_buffer_cannot_be_detached() {
        let mut ctx = EvalContext::new();
        let shared = Rc::new(RefCell::new(ObjectType::ArrayBuffer(
            ArrayBufferObject::new_shared(None, 4).unwrap(),
        )));
        assert!(detach_array_buffer(&mut ctx, &shared)
            .unwrap_err()
            .is_type_error());
    }
}
