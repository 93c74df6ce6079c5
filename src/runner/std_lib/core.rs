//! Helpers for building the built-in objects of a realm.

use crate::runner::ds::function_object::{native_function_create, set_function_name, NativeFn};
use crate::runner::ds::object::{JsObjectType, ObjectType};
use crate::runner::ds::object_property::{
    PropertyDescriptor, PropertyDescriptorSetter, PropertyKey,
};
use crate::runner::ds::value::JsValue;

/// The argument at `index`, or undefined when fewer were passed.
pub fn get_argument(args: &[JsValue], index: usize) -> JsValue {
    args.get(index).cloned().unwrap_or(JsValue::Undefined)
}

/// Defines a property on a built-in object that is still being set up. Such objects are
/// extensible and carry no conflicting property, so the definition always succeeds.
pub fn define_builtin_property(
    o: &JsObjectType,
    key: PropertyKey,
    value: JsValue,
    writable: bool,
    enumerable: bool,
    configurable: bool,
) {
    let defined = o.borrow_mut().as_js_object_mut().define_own_property(
        key,
        PropertyDescriptorSetter::new_from_property_descriptor(PropertyDescriptor::new_data(
            value,
            writable,
            enumerable,
            configurable,
        )),
    );
    debug_assert!(defined);
}

pub fn define_builtin_accessor(
    o: &JsObjectType,
    key: PropertyKey,
    get: Option<JsObjectType>,
    set: Option<JsObjectType>,
    enumerable: bool,
    configurable: bool,
) {
    let defined = o.borrow_mut().as_js_object_mut().define_own_property(
        key,
        PropertyDescriptorSetter::new_from_property_descriptor(PropertyDescriptor::new_accessor(
            get,
            set,
            enumerable,
            configurable,
        )),
    );
    debug_assert!(defined);
}

/// Builder that installs native methods, getters and values on an existing object.
///
/// Methods and getters are created with the realm's `%Function.prototype%` as their
/// prototype and follow the attribute defaults of built-ins: writable, configurable and
/// non-enumerable.
pub struct BuiltInObject {
    target: JsObjectType,
    function_prototype: JsObjectType,
}

impl BuiltInObject {
    pub fn new(target: JsObjectType, function_prototype: JsObjectType) -> Self {
        BuiltInObject {
            target,
            function_prototype,
        }
    }

    /// Add a native method.
    pub fn add_method(self, name: &str, arity: u32, func: NativeFn) -> Self {
        let key = PropertyKey::from(name);
        let f = native_function_create(
            Some(self.function_prototype.clone()),
            &key,
            arity,
            func,
            None,
        );
        define_builtin_property(&self.target, key, JsValue::Object(f), true, false, true);
        self
    }

    /// Add an accessor with only a getter. The getter is named `get <key>`.
    pub fn add_getter(self, key: PropertyKey, func: NativeFn) -> Self {
        let f = native_function_create(
            Some(self.function_prototype.clone()),
            &key,
            0,
            func,
            None,
        );
        if let ObjectType::Function(fo) = &mut *f.borrow_mut() {
            set_function_name(fo, &key, Some("get"));
        }
        define_builtin_accessor(&self.target, key, Some(f), None, false, true);
        self
    }

    /// Add a writable, configurable value.
    pub fn add_property(self, key: PropertyKey, value: JsValue) -> Self {
        define_builtin_property(&self.target, key, value, true, false, true);
        self
    }

    /// Add a value that cannot be reassigned but can still be redefined.
    pub fn add_readonly_property(self, key: PropertyKey, value: JsValue) -> Self {
        define_builtin_property(&self.target, key, value, false, false, true);
        self
    }

    /// Add a value that can neither be reassigned nor redefined.
    pub fn add_constant(self, key: PropertyKey, value: JsValue) -> Self {
        define_builtin_property(&self.target, key, value, false, false, false);
        self
    }

    pub fn build(self) -> JsObjectType {
        self.target
    }
}
