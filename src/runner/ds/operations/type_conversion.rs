use crate::runner::ds::error::JErrorType;
use crate::runner::ds::execution_context::EvalContext;
use crate::runner::ds::object::JsObjectType;
use crate::runner::ds::object_property::PropertyKey;
use crate::runner::ds::operations::object::{call, get, get_method};
use crate::runner::ds::operations::test_and_comparison::is_callable;
use crate::runner::ds::symbol::SYMBOL_TO_PRIMITIVE;
use crate::runner::ds::value::JsValue;
use std::convert::TryFrom;

pub const TYPE_STR_UNDEFINED: &str = "undefined";
pub const TYPE_STR_NULL: &str = "null";
pub const TYPE_STR_STRING: &str = "string";
pub const TYPE_STR_NUMBER: &str = "number";

/// 2^53 - 1
pub const MAX_SAFE_INTEGER: f64 = 9007199254740991.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PreferredType {
    Default,
    String,
    Number,
}
impl PreferredType {
    fn hint(&self) -> &'static str {
        match self {
            PreferredType::Default => "default",
            PreferredType::String => TYPE_STR_STRING,
            PreferredType::Number => TYPE_STR_NUMBER,
        }
    }
}

pub fn to_boolean(v: &JsValue) -> bool {
    match v {
        JsValue::Undefined | JsValue::Null => false,
        JsValue::Boolean(b) => *b,
        JsValue::String(s) => !s.is_empty(),
        JsValue::Symbol(_) => true,
        JsValue::Number(n) => {
            let n = n.to_f64();
            !(n.is_nan() || n == 0.0)
        }
        JsValue::Object(_) => true,
    }
}

/// ToPrimitive. May run user code through `@@toPrimitive`, `valueOf` or `toString`.
pub fn to_primitive(
    ctx: &mut EvalContext,
    v: &JsValue,
    preferred_type: PreferredType,
) -> Result<JsValue, JErrorType> {
    let o = match v {
        JsValue::Object(o) => o,
        _ => return Ok(v.clone()),
    };
    let exotic_to_prim = get_method(ctx, o, &PropertyKey::from(&*SYMBOL_TO_PRIMITIVE))?;
    match exotic_to_prim {
        Some(f) => {
            let result = call(
                ctx,
                &JsValue::Object(f),
                v.clone(),
                vec![JsValue::from(preferred_type.hint())],
            )?;
            if let JsValue::Object(_) = result {
                Err(JErrorType::TypeError(
                    "Cannot convert object to primitive value".to_string(),
                ))
            } else {
                Ok(result)
            }
        }
        None => {
            let hint = match preferred_type {
                PreferredType::String => PreferredType::String,
                _ => PreferredType::Number,
            };
            ordinary_to_primitive(ctx, o, hint)
        }
    }
}

pub fn ordinary_to_primitive(
    ctx: &mut EvalContext,
    o: &JsObjectType,
    hint: PreferredType,
) -> Result<JsValue, JErrorType> {
    let method_names = if let PreferredType::String = hint {
        ["toString", "valueOf"]
    } else {
        ["valueOf", "toString"]
    };
    for name in method_names.iter() {
        let method = get(ctx, o, &PropertyKey::from(*name))?;
        if is_callable(&method) {
            let result = call(ctx, &method, JsValue::Object(o.clone()), vec![])?;
            if !matches!(result, JsValue::Object(_)) {
                return Ok(result);
            }
        }
    }
    Err(JErrorType::TypeError(
        "Cannot convert object to primitive value".to_string(),
    ))
}

pub fn to_number(ctx: &mut EvalContext, v: &JsValue) -> Result<f64, JErrorType> {
    match v {
        JsValue::Undefined => Ok(f64::NAN),
        JsValue::Null => Ok(0.0),
        JsValue::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
        JsValue::String(s) => Ok(string_to_number(s)),
        JsValue::Symbol(s) => Err(JErrorType::TypeError(format!(
            "'{}' cannot be converted to number",
            s
        ))),
        JsValue::Number(n) => Ok(n.to_f64()),
        JsValue::Object(_) => {
            let pv = to_primitive(ctx, v, PreferredType::Number)?;
            to_number(ctx, &pv)
        }
    }
}

fn is_js_whitespace(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

fn is_decimal_literal(s: &str) -> bool {
    let s = s.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(s);
    let (mantissa, exponent) = match s.find(|c: char| c == 'e' || c == 'E') {
        Some(i) => (&s[..i], Some(&s[i + 1..])),
        None => (s, None),
    };
    let mut digits = 0;
    let mut dots = 0;
    for c in mantissa.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' => dots += 1,
            _ => return false,
        }
    }
    if digits == 0 || dots > 1 {
        return false;
    }
    match exponent {
        None => true,
        Some(e) => {
            let e = e.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(e);
            !e.is_empty() && e.chars().all(|c| c.is_ascii_digit())
        }
    }
}

fn parse_radix_literal(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    let mut n = 0.0;
    for c in digits.chars() {
        match c.to_digit(radix) {
            Some(d) => n = n * radix as f64 + d as f64,
            None => return f64::NAN,
        }
    }
    n
}

/// StringToNumber
pub fn string_to_number(s: &str) -> f64 {
    let s = s.trim_matches(is_js_whitespace);
    if s.is_empty() {
        return 0.0;
    }
    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    if s.len() > 2 && s.starts_with('0') {
        let radix = match s.as_bytes()[1] {
            b'x' | b'X' => Some(16),
            b'o' | b'O' => Some(8),
            b'b' | b'B' => Some(2),
            _ => None,
        };
        if let Some(radix) = radix {
            return parse_radix_literal(&s[2..], radix);
        }
    }
    if !is_decimal_literal(s) {
        return f64::NAN;
    }
    s.parse::<f64>().unwrap_or(f64::NAN)
}

/// Number::toString for radix 10.
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.is_infinite() {
        if n > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        let formatted = format!("{:e}", n);
        match formatted.find('e') {
            Some(i) if !formatted[i + 1..].starts_with('-') => {
                format!("{}e+{}", &formatted[..i], &formatted[i + 1..])
            }
            _ => formatted,
        }
    } else if n.fract() == 0.0 {
        format!("{:.0}", n)
    } else {
        format!("{}", n)
    }
}

pub fn to_string(ctx: &mut EvalContext, v: &JsValue) -> Result<String, JErrorType> {
    match v {
        JsValue::Undefined => Ok(TYPE_STR_UNDEFINED.to_string()),
        JsValue::Null => Ok(TYPE_STR_NULL.to_string()),
        JsValue::Boolean(b) => Ok(b.to_string()),
        JsValue::String(s) => Ok(s.to_string()),
        JsValue::Symbol(s) => Err(JErrorType::TypeError(format!(
            "'{}' cannot be converted to string",
            s
        ))),
        JsValue::Number(n) => Ok(number_to_string(n.to_f64())),
        JsValue::Object(_) => {
            let pv = to_primitive(ctx, v, PreferredType::String)?;
            to_string(ctx, &pv)
        }
    }
}

/// ToPropertyKey
pub fn to_property_key(ctx: &mut EvalContext, v: &JsValue) -> Result<PropertyKey, JErrorType> {
    let key = to_primitive(ctx, v, PreferredType::String)?;
    match key {
        JsValue::Symbol(s) => Ok(PropertyKey::Sym(s)),
        _ => Ok(PropertyKey::Str(to_string(ctx, &key)?)),
    }
}

/// ToIntegerOrInfinity: NaN and zeros become 0, finite values are truncated.
pub fn to_integer_or_infinity(ctx: &mut EvalContext, v: &JsValue) -> Result<f64, JErrorType> {
    let n = to_number(ctx, v)?;
    Ok(integer_or_infinity(n))
}

pub fn integer_or_infinity(n: f64) -> f64 {
    if n.is_nan() || n == 0.0 {
        0.0
    } else if n.is_infinite() {
        n
    } else {
        n.trunc()
    }
}

/// ToIndex. Undefined maps to 0; anything outside `0..=2^53-1` is a RangeError.
pub fn to_index(ctx: &mut EvalContext, v: &JsValue) -> Result<usize, JErrorType> {
    if v.is_undefined() {
        return Ok(0);
    }
    let integer = to_integer_or_infinity(ctx, v)?;
    if !(0.0..=MAX_SAFE_INTEGER).contains(&integer) {
        return Err(JErrorType::RangeError(format!(
            "{} is not a valid index",
            number_to_string(integer)
        )));
    }
    usize::try_from(integer as u64).map_err(|_| {
        JErrorType::RangeError(format!(
            "{} is not a valid index",
            number_to_string(integer)
        ))
    })
}

pub fn to_uint32(ctx: &mut EvalContext, v: &JsValue) -> Result<u32, JErrorType> {
    let n = to_number(ctx, v)?;
    if n.is_nan() || n.is_infinite() || n == 0.0 {
        return Ok(0);
    }
    Ok(n.trunc().rem_euclid(4294967296.0) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_to_number() {
        assert_eq!(string_to_number("  42 "), 42.0);
        assert_eq!(string_to_number(""), 0.0);
        assert_eq!(string_to_number("0x1F"), 31.0);
        assert_eq!(string_to_number("0b101"), 5.0);
        assert_eq!(string_to_number("-Infinity"), f64::NEG_INFINITY);
        assert_eq!(string_to_number("1e3"), 1000.0);
        assert_eq!(string_to_number(".5"), 0.5);
        assert!(string_to_number("inf").is_nan());
        assert!(string_to_number("12px").is_nan());
        assert!(string_to_number("-0x10").is_nan());
    }

    #[test]
    fn test_number_to_string() {
        assert_eq!(number_to_string(3.0), "3");
        assert_eq!(number_to_string(-0.0), "0");
        assert_eq!(number_to_string(1.5), "1.5");
        assert_eq!(number_to_string(1e21), "1e+21");
        assert_eq!(number_to_string(f64::NAN), "NaN");
    }

    #[test]
    fn test_to_index() {
        let mut ctx = EvalContext::new();
        assert_eq!(to_index(&mut ctx, &JsValue::Undefined).unwrap(), 0);
        assert_eq!(to_index(&mut ctx, &JsValue::from(f64::NAN)).unwrap(), 0);
        assert_eq!(to_index(&mut ctx, &JsValue::from(3.7)).unwrap(), 3);
        assert_eq!(to_index(&mut ctx, &JsValue::from("8")).unwrap(), 8);
        assert_eq!(to_index(&mut ctx, &JsValue::from(-0.5)).unwrap(), 0);
        assert!(to_index(&mut ctx, &JsValue::from(-1.0))
            .unwrap_err()
            .is_range_error());
        assert!(to_index(&mut ctx, &JsValue::from(f64::INFINITY))
            .unwrap_err()
            .is_range_error());
    }

    #[test]
    fn test_to_uint32_wraps() {
        let mut ctx = EvalContext::new();
        assert_eq!(to_uint32(&mut ctx, &JsValue::from(-1.0)).unwrap(), u32::MAX);
        assert_eq!(to_uint32(&mut ctx, &JsValue::from(4294967297.0)).unwrap(), 1);
        assert_eq!(to_uint32(&mut ctx, &JsValue::from(2.9)).unwrap(), 2);
        assert_eq!(to_uint32(&mut ctx, &JsValue::Undefined).unwrap(), 0);
    }

    #[test]
    fn test_to_property_key() {
        let mut ctx = EvalContext::new();
        assert_eq!(
            to_property_key(&mut ctx, &JsValue::from(1.0)).unwrap(),
            PropertyKey::from("1")
        );
        let species = JsValue::Symbol(crate::runner::ds::symbol::SYMBOL_SPECIES.clone());
        assert_eq!(
            to_property_key(&mut ctx, &species).unwrap(),
            PropertyKey::from(&*crate::runner::ds::symbol::SYMBOL_SPECIES)
        );
    }

    #[test]
    fn test_to_boolean() {
        assert!(!to_boolean(&JsValue::from(f64::NAN)));
        assert!(!to_boolean(&JsValue::from("")));
        assert!(to_boolean(&JsValue::from("0")));
        assert!(!to_boolean(&JsValue::Null));
    }
}
