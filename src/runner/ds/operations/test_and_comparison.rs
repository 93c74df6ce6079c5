use crate::runner::ds::value::JsValue;
use std::rc::Rc;

fn same_number(a: f64, b: f64, zero_sign_matters: bool) -> bool {
    if a.is_nan() && b.is_nan() {
        true
    } else if a == 0.0 && b == 0.0 {
        !zero_sign_matters || a.is_sign_negative() == b.is_sign_negative()
    } else {
        a == b
    }
}

fn same_non_number(a: &JsValue, b: &JsValue) -> bool {
    match (a, b) {
        (JsValue::Undefined, JsValue::Undefined) => true,
        (JsValue::Null, JsValue::Null) => true,
        (JsValue::Boolean(a), JsValue::Boolean(b)) => a == b,
        (JsValue::String(a), JsValue::String(b)) => a == b,
        (JsValue::Symbol(a), JsValue::Symbol(b)) => a == b,
        (JsValue::Object(a), JsValue::Object(b)) => Rc::ptr_eq(a, b),
        _ => false,
    }
}

/// SameValue: NaN equals NaN, +0 and -0 differ.
pub fn same_value(a: &JsValue, b: &JsValue) -> bool {
    match (a, b) {
        (JsValue::Number(a), JsValue::Number(b)) => same_number(a.to_f64(), b.to_f64(), true),
        _ => same_non_number(a, b),
    }
}

/// SameValueZero: like SameValue but +0 equals -0.
pub fn same_value_zero(a: &JsValue, b: &JsValue) -> bool {
    match (a, b) {
        (JsValue::Number(a), JsValue::Number(b)) => same_number(a.to_f64(), b.to_f64(), false),
        _ => same_non_number(a, b),
    }
}

/// IsStrictlyEqual (`===`).
pub fn is_strictly_equal(a: &JsValue, b: &JsValue) -> bool {
    match (a, b) {
        (JsValue::Number(a), JsValue::Number(b)) => a.to_f64() == b.to_f64(),
        _ => same_non_number(a, b),
    }
}

pub fn is_callable(v: &JsValue) -> bool {
    match v {
        JsValue::Object(o) => o.borrow().is_callable(),
        _ => false,
    }
}

pub fn is_constructor(v: &JsValue) -> bool {
    match v {
        JsValue::Object(o) => o
            .borrow()
            .as_function_object()
            .map_or(false, |f| f.is_constructor()),
        _ => false,
    }
}
