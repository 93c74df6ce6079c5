//! The `ArrayBuffer` constructor and `ArrayBuffer.prototype`.
//!
//! Every prototype method validates its receiver first and re-validates after any step that
//! can run user code (argument coercion, the species constructor).

use std::rc::Rc;

use crate::runner::ds::array_buffer_object::ArrayBufferObject;
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::execution_context::EvalContext;
use crate::runner::ds::function_object::native_function_create;
use crate::runner::ds::object::{object_create, JsObjectType};
use crate::runner::ds::object_property::PropertyKey;
use crate::runner::ds::operations::array_buffer::{
    allocate_array_buffer, get_array_buffer_max_byte_length_option,
};
use crate::runner::ds::operations::object::{construct, species_constructor};
use crate::runner::ds::operations::type_conversion::{to_index, to_integer_or_infinity};
use crate::runner::ds::realm::WellKnownIntrinsics;
use crate::runner::ds::symbol::{SYMBOL_SPECIES, SYMBOL_TO_STRING_TAG};
use crate::runner::ds::value::{JsNumberType, JsValue};
use crate::runner::std_lib::core::{get_argument, BuiltInObject};

/// Creates `%ArrayBuffer%` and `%ArrayBuffer.prototype%`, wired to each other.
pub fn create_array_buffer_constructor(
    object_prototype: &JsObjectType,
    function_prototype: &JsObjectType,
) -> (JsObjectType, JsObjectType) {
    let constructor = native_function_create(
        Some(function_prototype.clone()),
        &PropertyKey::from("ArrayBuffer"),
        1,
        array_buffer_call,
        Some(array_buffer_construct),
    );
    let prototype = BuiltInObject::new(
        object_create(Some(object_prototype.clone())),
        function_prototype.clone(),
    )
    .add_getter("byteLength".into(), array_buffer_byte_length)
    .add_getter("detached".into(), array_buffer_detached)
    .add_getter("maxByteLength".into(), array_buffer_max_byte_length)
    .add_getter("resizable".into(), array_buffer_resizable)
    .add_method("resize", 1, array_buffer_resize)
    .add_method("slice", 2, array_buffer_slice)
    .add_property("constructor".into(), JsValue::Object(constructor.clone()))
    .add_readonly_property(
        PropertyKey::from(&*SYMBOL_TO_STRING_TAG),
        JsValue::from("ArrayBuffer"),
    )
    .build();
    let constructor = BuiltInObject::new(constructor, function_prototype.clone())
        .add_constant("prototype".into(), JsValue::Object(prototype.clone()))
        .add_getter(PropertyKey::from(&*SYMBOL_SPECIES), array_buffer_species)
        .build();
    (constructor, prototype)
}

fn array_buffer_call(
    _ctx: &mut EvalContext,
    _this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Err(JErrorType::TypeError(
        "Constructor ArrayBuffer requires 'new'".to_string(),
    ))
}

/// ArrayBuffer(length, options)
fn array_buffer_construct(
    ctx: &mut EvalContext,
    args: Vec<JsValue>,
    new_target: JsObjectType,
) -> Result<JsValue, JErrorType> {
    let byte_length = to_index(ctx, &get_argument(&args, 0))?;
    let requested_max_byte_length =
        get_array_buffer_max_byte_length_option(ctx, &get_argument(&args, 1))?;
    let buffer = allocate_array_buffer(ctx, &new_target, byte_length, requested_max_byte_length)?;
    Ok(JsValue::Object(buffer))
}

/// get ArrayBuffer[@@species]
fn array_buffer_species(
    _ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(this)
}

/// Receiver check shared by the prototype methods: a non-shared array buffer.
fn this_array_buffer(this: &JsValue, method: &str) -> Result<JsObjectType, JErrorType> {
    if let JsValue::Object(o) = this {
        if o.borrow().as_array_buffer().map_or(false, |b| !b.is_shared()) {
            return Ok(o.clone());
        }
    }
    Err(JErrorType::TypeError(format!(
        "Method ArrayBuffer.prototype.{} called on incompatible receiver {}",
        method, this
    )))
}

/// Runs `f` on the receiver's buffer. The receiver was validated, so the variant is known.
fn with_buffer<R>(
    o: &JsObjectType,
    method: &str,
    f: impl FnOnce(&ArrayBufferObject) -> R,
) -> Result<R, JErrorType> {
    match o.borrow().as_array_buffer() {
        Some(b) => Ok(f(b)),
        None => Err(JErrorType::TypeError(format!(
            "Method ArrayBuffer.prototype.{} called on incompatible receiver",
            method
        ))),
    }
}

fn length_value(n: usize) -> JsValue {
    JsValue::Number(JsNumberType::from_f64(n as f64))
}

fn array_buffer_byte_length(
    _ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let o = this_array_buffer(&this, "byteLength")?;
    with_buffer(&o, "byteLength", |b| length_value(b.byte_length()))
}

fn array_buffer_detached(
    _ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let o = this_array_buffer(&this, "detached")?;
    with_buffer(&o, "detached", |b| JsValue::Boolean(b.is_detached()))
}

fn array_buffer_max_byte_length(
    _ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let o = this_array_buffer(&this, "maxByteLength")?;
    with_buffer(&o, "maxByteLength", |b| {
        if b.is_detached() {
            length_value(0)
        } else {
            length_value(b.max_byte_length().unwrap_or_else(|| b.byte_length()))
        }
    })
}

fn array_buffer_resizable(
    _ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let o = this_array_buffer(&this, "resizable")?;
    with_buffer(&o, "resizable", |b| JsValue::Boolean(!b.is_fixed_length()))
}

/// ArrayBuffer.prototype.resize(newLength)
fn array_buffer_resize(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let o = this_array_buffer(&this, "resize")?;
    let new_byte_length = to_index(ctx, &get_argument(&args, 0))?;

    let mut buffer = o.borrow_mut();
    let buffer = match buffer.as_array_buffer_mut() {
        Some(b) => b,
        None => return Err(JErrorType::TypeError("ArrayBuffer expected".to_string())),
    };
    if buffer.is_detached() {
        return Err(JErrorType::TypeError(
            "Cannot perform ArrayBuffer.prototype.resize on a detached ArrayBuffer".to_string(),
        ));
    }
    let max = match buffer.max_byte_length() {
        Some(max) => max,
        None => {
            return Err(JErrorType::TypeError(
                "Method ArrayBuffer.prototype.resize called on a fixed-length ArrayBuffer"
                    .to_string(),
            ))
        }
    };
    if new_byte_length > max {
        return Err(JErrorType::RangeError(format!(
            "ArrayBuffer.prototype.resize: Invalid length {} exceeds maxByteLength {}",
            new_byte_length, max
        )));
    }
    let old_byte_length = buffer.byte_length();
    buffer.resize(new_byte_length)?;
    tracing::trace!(old_byte_length, new_byte_length, "array buffer resized");
    Ok(JsValue::Undefined)
}

/// Clamps a relative index (negative counts from the end) into `0..=len`.
fn relative_index(relative: f64, len: usize) -> usize {
    let len_f = len as f64;
    let index = if relative < 0.0 {
        (len_f + relative).max(0.0)
    } else {
        relative.min(len_f)
    };
    index as usize
}

/// ArrayBuffer.prototype.slice(start, end)
fn array_buffer_slice(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let o = this_array_buffer(&this, "slice")?;
    let (detached, len) = with_buffer(&o, "slice", |b| (b.is_detached(), b.byte_length()))?;
    if detached {
        return Err(JErrorType::TypeError(
            "Cannot perform ArrayBuffer.prototype.slice on a detached ArrayBuffer".to_string(),
        ));
    }

    let relative_start = to_integer_or_infinity(ctx, &get_argument(&args, 0))?;
    let first = relative_index(relative_start, len);
    let end = get_argument(&args, 1);
    let relative_end = if end.is_undefined() {
        len as f64
    } else {
        to_integer_or_infinity(ctx, &end)?
    };
    let final_index = relative_index(relative_end, len);
    let new_len = final_index.saturating_sub(first);

    let default_constructor = ctx
        .realm
        .get_intrinsics_value(WellKnownIntrinsics::ArrayBuffer)
        .clone();
    let ctor = species_constructor(ctx, &o, &default_constructor)?;
    tracing::trace!(
        species = !Rc::ptr_eq(&ctor, &default_constructor),
        first,
        new_len,
        "array buffer slice"
    );
    let new = construct(ctx, &ctor, vec![length_value(new_len)], None)?;

    let new = match new {
        JsValue::Object(n) => n,
        _ => {
            return Err(JErrorType::TypeError(
                "Species constructor did not return an ArrayBuffer".to_string(),
            ))
        }
    };
    {
        let n = new.borrow();
        let nb = match n.as_array_buffer() {
            Some(nb) if !nb.is_shared() => nb,
            _ => {
                return Err(JErrorType::TypeError(
                    "Species constructor did not return an ArrayBuffer".to_string(),
                ))
            }
        };
        if nb.is_detached() {
            return Err(JErrorType::TypeError(
                "Species constructor returned a detached ArrayBuffer".to_string(),
            ));
        }
        if Rc::ptr_eq(&new, &o) {
            return Err(JErrorType::TypeError(
                "ArrayBuffer subclass returned this from species constructor".to_string(),
            ));
        }
        if nb.byte_length() < new_len {
            return Err(JErrorType::TypeError(format!(
                "Species constructor returned an ArrayBuffer of {} bytes, expected at least {}",
                nb.byte_length(),
                new_len
            )));
        }
    }

    let source = o.borrow();
    let from = match source.as_array_buffer().and_then(|b| b.data()) {
        Some(data) => data,
        None => {
            return Err(JErrorType::TypeError(
                "Cannot perform ArrayBuffer.prototype.slice on a detached ArrayBuffer"
                    .to_string(),
            ))
        }
    };
    if first < from.len() {
        let count = new_len.min(from.len() - first);
        let mut target = new.borrow_mut();
        if let Some(to) = target.as_array_buffer_mut().and_then(|b| b.data_mut()) {
            to[..count].copy_from_slice(&from[first..first + count]);
        }
    }
    drop(source);
    Ok(JsValue::Object(new))
}
