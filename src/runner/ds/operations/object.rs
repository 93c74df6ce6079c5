use crate::runner::ds::error::JErrorType;
use crate::runner::ds::execution_context::EvalContext;
use crate::runner::ds::function_object::{call_function_object, construct_function_object};
use crate::runner::ds::object::{object_create, JsObjectType};
use crate::runner::ds::object_property::{
    PropertyDescriptor, PropertyDescriptorSetter, PropertyKey,
};
use crate::runner::ds::realm::WellKnownIntrinsics;
use crate::runner::ds::symbol::SYMBOL_SPECIES;
use crate::runner::ds::operations::test_and_comparison::is_constructor;
use crate::runner::ds::value::JsValue;

/// Own property of `o`, cloned so that no borrow outlives the call.
pub fn get_own_property(o: &JsObjectType, p: &PropertyKey) -> Option<PropertyDescriptor> {
    o.borrow().as_js_object().get_own_property(p).cloned()
}

pub fn get_prototype_of(o: &JsObjectType) -> Option<JsObjectType> {
    o.borrow().as_js_object().get_prototype_of()
}

/// Finds `p` on `o` or its prototype chain.
fn lookup_property(o: &JsObjectType, p: &PropertyKey) -> Option<PropertyDescriptor> {
    let mut current = o.clone();
    loop {
        if let Some(desc) = get_own_property(&current, p) {
            return Some(desc);
        }
        match get_prototype_of(&current) {
            Some(proto) => current = proto,
            None => return None,
        }
    }
}

/// OrdinaryGet with an explicit receiver.
pub fn ordinary_get(
    ctx: &mut EvalContext,
    o: &JsObjectType,
    p: &PropertyKey,
    receiver: JsValue,
) -> Result<JsValue, JErrorType> {
    match lookup_property(o, p) {
        None => Ok(JsValue::Undefined),
        Some(PropertyDescriptor::Data { value, .. }) => Ok(value),
        Some(PropertyDescriptor::Accessor { get: None, .. }) => Ok(JsValue::Undefined),
        Some(PropertyDescriptor::Accessor {
            get: Some(getter), ..
        }) => call_function_object(ctx, &getter, receiver, vec![]),
    }
}

pub fn get(ctx: &mut EvalContext, o: &JsObjectType, p: &PropertyKey) -> Result<JsValue, JErrorType> {
    ordinary_get(ctx, o, p, JsValue::Object(o.clone()))
}

/// OrdinarySet with an explicit receiver. Returns whether the assignment took effect.
pub fn ordinary_set(
    ctx: &mut EvalContext,
    o: &JsObjectType,
    p: PropertyKey,
    v: JsValue,
    receiver: JsValue,
) -> Result<bool, JErrorType> {
    let own_desc = match lookup_property(o, &p) {
        Some(desc) => desc,
        None => PropertyDescriptor::new_data(JsValue::Undefined, true, true, true),
    };
    match own_desc {
        PropertyDescriptor::Data { writable, .. } => {
            if !writable {
                return Ok(false);
            }
            let receiver = match receiver {
                JsValue::Object(r) => r,
                _ => return Ok(false),
            };
            match get_own_property(&receiver, &p) {
                Some(PropertyDescriptor::Accessor { .. }) => Ok(false),
                Some(PropertyDescriptor::Data {
                    writable: false, ..
                }) => Ok(false),
                Some(PropertyDescriptor::Data { .. }) => Ok(receiver
                    .borrow_mut()
                    .as_js_object_mut()
                    .define_own_property(p, PropertyDescriptorSetter::new_value_only(v))),
                None => Ok(create_data_property(&receiver, p, v)),
            }
        }
        PropertyDescriptor::Accessor { set: None, .. } => Ok(false),
        PropertyDescriptor::Accessor {
            set: Some(setter), ..
        } => {
            call_function_object(ctx, &setter, receiver, vec![v])?;
            Ok(true)
        }
    }
}

/// Set. With `throw`, a rejected assignment is a TypeError.
pub fn set(
    ctx: &mut EvalContext,
    o: &JsObjectType,
    p: PropertyKey,
    v: JsValue,
    throw: bool,
) -> Result<bool, JErrorType> {
    let key_text = if throw { Some(p.to_string()) } else { None };
    let success = ordinary_set(ctx, o, p, v, JsValue::Object(o.clone()))?;
    match key_text {
        Some(key) if !success => Err(JErrorType::TypeError(format!(
            "Cannot assign to read only property '{}'",
            key
        ))),
        _ => Ok(success),
    }
}

pub fn has_property(o: &JsObjectType, p: &PropertyKey) -> bool {
    lookup_property(o, p).is_some()
}

pub fn has_own_property(o: &JsObjectType, p: &PropertyKey) -> bool {
    o.borrow().as_js_object().get_own_property(p).is_some()
}

pub fn define_property_or_throw(
    o: &JsObjectType,
    p: PropertyKey,
    desc: PropertyDescriptorSetter,
) -> Result<(), JErrorType> {
    let key_text = p.to_string();
    if o.borrow_mut().as_js_object_mut().define_own_property(p, desc) {
        Ok(())
    } else {
        Err(JErrorType::TypeError(format!(
            "Cannot define property '{}'",
            key_text
        )))
    }
}

pub fn create_data_property(o: &JsObjectType, p: PropertyKey, v: JsValue) -> bool {
    o.borrow_mut().as_js_object_mut().define_own_property(
        p,
        PropertyDescriptorSetter::new_from_property_descriptor(PropertyDescriptor::new_data(
            v, true, true, true,
        )),
    )
}

/// GetMethod. `None` when the property is undefined or null.
pub fn get_method(
    ctx: &mut EvalContext,
    o: &JsObjectType,
    p: &PropertyKey,
) -> Result<Option<JsObjectType>, JErrorType> {
    match get(ctx, o, p)? {
        JsValue::Undefined | JsValue::Null => Ok(None),
        JsValue::Object(f) if f.borrow().is_callable() => Ok(Some(f)),
        _ => Err(JErrorType::TypeError(format!("'{}' is not a function", p))),
    }
}

pub fn call(
    ctx: &mut EvalContext,
    f: &JsValue,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    match f {
        JsValue::Object(o) if o.borrow().is_callable() => call_function_object(ctx, o, this, args),
        _ => Err(JErrorType::TypeError(format!("{} is not a function", f))),
    }
}

/// Construct. `new_target` defaults to `f`.
pub fn construct(
    ctx: &mut EvalContext,
    f: &JsObjectType,
    args: Vec<JsValue>,
    new_target: Option<&JsObjectType>,
) -> Result<JsValue, JErrorType> {
    construct_function_object(ctx, f, args, new_target)
}

/// SpeciesConstructor. Reads `o.constructor` and then `constructor[@@species]`; both reads
/// may run user code.
pub fn species_constructor(
    ctx: &mut EvalContext,
    o: &JsObjectType,
    default_constructor: &JsObjectType,
) -> Result<JsObjectType, JErrorType> {
    let c = get(ctx, o, &PropertyKey::from("constructor"))?;
    let c = match c {
        JsValue::Undefined => return Ok(default_constructor.clone()),
        JsValue::Object(c) => c,
        _ => {
            return Err(JErrorType::TypeError(
                "object.constructor is not an object".to_string(),
            ))
        }
    };
    let s = get(ctx, &c, &PropertyKey::from(&*SYMBOL_SPECIES))?;
    if s.is_null_or_undefined() {
        return Ok(default_constructor.clone());
    }
    if is_constructor(&s) {
        if let JsValue::Object(s) = s {
            return Ok(s);
        }
    }
    Err(JErrorType::TypeError(
        "object.constructor[Symbol.species] is not a constructor".to_string(),
    ))
}

/// GetPrototypeFromConstructor
pub fn get_prototype_from_constructor(
    ctx: &mut EvalContext,
    constructor: &JsObjectType,
    intrinsic_default_proto: WellKnownIntrinsics,
) -> Result<JsObjectType, JErrorType> {
    match get(ctx, constructor, &PropertyKey::from("prototype"))? {
        JsValue::Object(proto) => Ok(proto),
        _ => Ok(ctx
            .realm
            .get_intrinsics_value(intrinsic_default_proto)
            .clone()),
    }
}

/// OrdinaryCreateFromConstructor for ordinary objects.
pub fn ordinary_create_from_constructor(
    ctx: &mut EvalContext,
    constructor: &JsObjectType,
    intrinsic_default_proto: WellKnownIntrinsics,
) -> Result<JsObjectType, JErrorType> {
    let proto = get_prototype_from_constructor(ctx, constructor, intrinsic_default_proto)?;
    Ok(object_create(Some(proto)))
}
