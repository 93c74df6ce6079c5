//! `Function.prototype` and `%ThrowTypeError%`.

use std::cell::RefCell;
use std::rc::Rc;

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::execution_context::EvalContext;
use crate::runner::ds::function_object::{
    bound_function_create, native_function_create, set_function_length, set_function_name,
    FunctionVariant,
};
use crate::runner::ds::object::{JsObject, JsObjectType, ObjectType};
use crate::runner::ds::object_property::{
    PropertyDescriptor, PropertyDescriptorSetter, PropertyKey,
};
use crate::runner::ds::operations::object::{call, get, has_own_property};
use crate::runner::ds::operations::test_and_comparison::is_callable;
use crate::runner::ds::operations::type_conversion::{integer_or_infinity, to_uint32};
use crate::runner::ds::realm::WellKnownIntrinsics;
use crate::runner::ds::value::{JsNumberType, JsValue};
use crate::runner::std_lib::core::{get_argument, BuiltInObject};

/// `%Function.prototype%` is itself callable and returns undefined.
pub fn create_function_prototype(object_prototype: &JsObjectType) -> JsObjectType {
    native_function_create(
        Some(object_prototype.clone()),
        &PropertyKey::from(""),
        0,
        function_prototype_call,
        None,
    )
}

fn function_prototype_call(
    _ctx: &mut EvalContext,
    _this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(JsValue::Undefined)
}

/// `%ThrowTypeError%`: frozen `length` and `name`, not extensible.
pub fn create_throw_type_error(function_prototype: &JsObjectType) -> JsObjectType {
    let f = native_function_create(
        Some(function_prototype.clone()),
        &PropertyKey::from(""),
        0,
        throw_type_error,
        None,
    );
    {
        let mut o = f.borrow_mut();
        let o = o.as_js_object_mut();
        for key in ["length", "name"].iter() {
            o.define_own_property(
                PropertyKey::from(*key),
                PropertyDescriptorSetter {
                    honour_value: false,
                    honour_writable: true,
                    honour_set: false,
                    honour_get: false,
                    honour_enumerable: false,
                    honour_configurable: true,
                    descriptor: PropertyDescriptor::new_data(JsValue::Undefined, false, false, false),
                },
            );
        }
        o.prevent_extensions();
    }
    f
}

fn throw_type_error(
    _ctx: &mut EvalContext,
    _this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Err(JErrorType::TypeError(
        "'caller', 'callee', and 'arguments' properties may not be accessed on strict mode functions or the arguments objects for calls to them".to_string(),
    ))
}

pub fn install_function_prototype_methods(function_prototype: &JsObjectType) {
    BuiltInObject::new(function_prototype.clone(), function_prototype.clone())
        .add_method("apply", 2, function_apply)
        .add_method("bind", 1, function_bind)
        .add_method("call", 1, function_call)
        .add_method("toString", 0, function_to_string)
        .build();
}

fn require_callable(this: &JsValue, method: &str) -> Result<(), JErrorType> {
    if is_callable(this) {
        Ok(())
    } else {
        Err(JErrorType::TypeError(format!(
            "Function.prototype.{} called on {}, which is not a function",
            method, this
        )))
    }
}

/// CreateListFromArrayLike. The length goes through ToUint32; missing indices read as
/// undefined.
pub fn create_list_from_array_like(
    ctx: &mut EvalContext,
    v: &JsValue,
) -> Result<Vec<JsValue>, JErrorType> {
    let o = match v {
        JsValue::Object(o) => o,
        _ => {
            return Err(JErrorType::TypeError(
                "CreateListFromArrayLike called on non-object".to_string(),
            ))
        }
    };
    let length = get(ctx, o, &PropertyKey::from("length"))?;
    let len = to_uint32(ctx, &length)?;
    let mut list = Vec::new();
    for index in 0..len {
        list.push(get(ctx, o, &PropertyKey::Str(index.to_string()))?);
    }
    Ok(list)
}

/// Function.prototype.apply(thisArg, argArray)
fn function_apply(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    require_callable(&this, "apply")?;
    let this_arg = get_argument(&args, 0);
    let arg_array = get_argument(&args, 1);
    let arg_list = if arg_array.is_null_or_undefined() {
        vec![]
    } else {
        create_list_from_array_like(ctx, &arg_array)?
    };
    call(ctx, &this, this_arg, arg_list)
}

/// Function.prototype.call(thisArg, ...args)
fn function_call(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    require_callable(&this, "call")?;
    let mut args = args.into_iter();
    let this_arg = args.next().unwrap_or(JsValue::Undefined);
    call(ctx, &this, this_arg, args.collect())
}

/// Function.prototype.bind(thisArg, ...args)
fn function_bind(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let target = match &this {
        JsValue::Object(o) if o.borrow().is_callable() => o.clone(),
        _ => return Err(JErrorType::TypeError("Bind must be called on a function".to_string())),
    };
    let mut args = args.into_iter();
    let bound_this = args.next().unwrap_or(JsValue::Undefined);
    let bound_args: Vec<JsValue> = args.collect();
    let arg_count = bound_args.len() as f64;
    let mut f = bound_function_create(&target, bound_this, bound_args)?;

    let mut length = 0.0;
    if has_own_property(&target, &PropertyKey::from("length")) {
        if let JsValue::Number(target_len) = get(ctx, &target, &PropertyKey::from("length"))? {
            let target_len = target_len.to_f64();
            if target_len == f64::INFINITY {
                length = f64::INFINITY;
            } else if target_len != f64::NEG_INFINITY {
                length = (integer_or_infinity(target_len) - arg_count).max(0.0);
            }
        }
    }
    set_function_length(&mut f, JsNumberType::from_f64(length));

    let target_name = match get(ctx, &target, &PropertyKey::from("name"))? {
        JsValue::String(s) => s,
        _ => String::new(),
    };
    set_function_name(&mut f, &PropertyKey::Str(target_name), Some("bound"));

    let thrower = ctx
        .realm
        .get_intrinsics_value(WellKnownIntrinsics::ThrowTypeError)
        .clone();
    for key in ["caller", "callee"].iter() {
        f.define_own_property(
            PropertyKey::from(*key),
            PropertyDescriptorSetter::new_from_property_descriptor(
                PropertyDescriptor::new_accessor(
                    Some(thrower.clone()),
                    Some(thrower.clone()),
                    false,
                    false,
                ),
            ),
        );
    }
    tracing::debug!(name = %f.name(), length, "bound function created");
    Ok(JsValue::Object(Rc::new(RefCell::new(ObjectType::Function(f)))))
}

/// Function.prototype.toString()
fn function_to_string(
    _ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    require_callable(&this, "toString")?;
    let (name, body) = match &this {
        JsValue::Object(o) => {
            let o = o.borrow();
            match o.as_function_object() {
                Some(fo) => {
                    let body = match fo.variant() {
                        FunctionVariant::Ordinary(d) => Some(d.body.clone()),
                        _ => None,
                    };
                    (fo.name(), body)
                }
                None => (String::new(), None),
            }
        }
        _ => (String::new(), None),
    };
    if let Some(source) = body.and_then(|b| b.source_text()) {
        return Ok(JsValue::String(source));
    }
    Ok(JsValue::String(format!(
        "function {}() {{ [native code] }}",
        name
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ds::operations::object::get_own_property;

    #[test]
    fn test_throw_type_error_is_frozen() {
        let mut ctx = EvalContext::new();
        let thrower = ctx
            .realm
            .get_intrinsics_value(WellKnownIntrinsics::ThrowTypeError)
            .clone();
        assert!(!thrower.borrow().as_js_object().is_extensible());
        let length = get_own_property(&thrower, &"length".into()).unwrap();
        assert!(!length.is_configurable());
        assert_eq!(
            length,
            PropertyDescriptor::new_data(JsValue::from(0.0), false, false, false)
        );
        let err = call(&mut ctx, &JsValue::Object(thrower), JsValue::Undefined, vec![])
            .unwrap_err();
        assert!(err.is_type_error());
    }

    #[test]
    fn test_function_prototype_is_callable() {
        let mut ctx = EvalContext::new();
        let fp = ctx
            .realm
            .get_intrinsics_value(WellKnownIntrinsics::FunctionPrototype)
            .clone();
        let result = call(&mut ctx, &JsValue::Object(fp), JsValue::Null, vec![JsValue::Null]);
        assert_eq!(result.unwrap(), JsValue::Undefined);
    }
}
