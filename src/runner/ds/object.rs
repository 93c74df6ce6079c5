use crate::runner::ds::array_buffer_object::ArrayBufferObject;
use crate::runner::ds::function_object::FunctionObject;
use crate::runner::ds::object_property::{
    same_function_slot, PropertyDescriptor, PropertyDescriptorSetter, PropertyKey,
};
use crate::runner::ds::operations::test_and_comparison::same_value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

pub type JsObjectType = Rc<RefCell<ObjectType>>;

/// Closed set of object kinds known to the runtime. Capabilities (callable, buffer) are
/// answered by matching on the tag.
pub enum ObjectType {
    Ordinary(OrdinaryObject),
    Function(FunctionObject),
    ArrayBuffer(ArrayBufferObject),
}
impl std::fmt::Debug for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectType::Ordinary(_) => write!(f, "ObjectType::Ordinary(...)"),
            ObjectType::Function(_) => write!(f, "ObjectType::Function(...)"),
            ObjectType::ArrayBuffer(_) => write!(f, "ObjectType::ArrayBuffer(...)"),
        }
    }
}

impl ObjectType {
    pub fn is_callable(&self) -> bool {
        matches!(self, ObjectType::Function(_))
    }

    pub fn as_js_object(&self) -> &dyn JsObject {
        match self {
            ObjectType::Ordinary(o) => o,
            ObjectType::Function(o) => o,
            ObjectType::ArrayBuffer(o) => o,
        }
    }

    pub fn as_js_object_mut(&mut self) -> &mut dyn JsObject {
        match self {
            ObjectType::Ordinary(o) => o,
            ObjectType::Function(o) => o,
            ObjectType::ArrayBuffer(o) => o,
        }
    }

    pub fn as_function_object(&self) -> Option<&FunctionObject> {
        match self {
            ObjectType::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_array_buffer(&self) -> Option<&ArrayBufferObject> {
        match self {
            ObjectType::ArrayBuffer(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_array_buffer_mut(&mut self) -> Option<&mut ArrayBufferObject> {
        match self {
            ObjectType::ArrayBuffer(b) => Some(b),
            _ => None,
        }
    }
}

pub struct ObjectBase {
    properties: HashMap<PropertyKey, PropertyDescriptor>,
    is_extensible: bool,
    prototype: Option<JsObjectType>,
}
impl ObjectBase {
    pub fn new() -> Self {
        ObjectBase {
            properties: HashMap::new(),
            is_extensible: true,
            prototype: None,
        }
    }

    pub fn with_prototype(prototype: Option<JsObjectType>) -> Self {
        ObjectBase {
            properties: HashMap::new(),
            is_extensible: true,
            prototype,
        }
    }
}
impl Default for ObjectBase {
    fn default() -> Self {
        Self::new()
    }
}

pub trait JsObject {
    fn get_object_base_mut(&mut self) -> &mut ObjectBase;

    fn get_object_base(&self) -> &ObjectBase;

    fn get_prototype_of(&self) -> Option<JsObjectType> {
        self.get_object_base().prototype.clone()
    }

    fn is_extensible(&self) -> bool {
        self.get_object_base().is_extensible
    }

    fn prevent_extensions(&mut self) -> bool {
        self.get_object_base_mut().is_extensible = false;
        true
    }

    fn get_own_property(&self, property: &PropertyKey) -> Option<&PropertyDescriptor> {
        self.get_object_base().properties.get(property)
    }

    fn define_own_property(
        &mut self,
        property: PropertyKey,
        descriptor_setter: PropertyDescriptorSetter,
    ) -> bool {
        ordinary_define_own_property(self, property, descriptor_setter)
    }

    fn delete(&mut self, property: &PropertyKey) -> bool {
        match self.get_own_property(property) {
            None => true,
            Some(pd) => {
                if pd.is_configurable() {
                    self.get_object_base_mut().properties.remove(property);
                    true
                } else {
                    false
                }
            }
        }
    }

    fn to_string(&self) -> String {
        "object".to_string()
    }
}

pub struct OrdinaryObject {
    object_base: ObjectBase,
}
impl OrdinaryObject {
    pub fn new(prototype: Option<JsObjectType>) -> Self {
        OrdinaryObject {
            object_base: ObjectBase::with_prototype(prototype),
        }
    }
}
impl JsObject for OrdinaryObject {
    fn get_object_base_mut(&mut self) -> &mut ObjectBase {
        &mut self.object_base
    }

    fn get_object_base(&self) -> &ObjectBase {
        &self.object_base
    }
}

pub fn object_create(prototype: Option<JsObjectType>) -> JsObjectType {
    Rc::new(RefCell::new(ObjectType::Ordinary(OrdinaryObject::new(
        prototype,
    ))))
}

/// ValidateAndApplyPropertyDescriptor for an ordinary object.
pub fn ordinary_define_own_property<J: JsObject + ?Sized>(
    o: &mut J,
    property: PropertyKey,
    descriptor_setter: PropertyDescriptorSetter,
) -> bool {
    let current = match o.get_own_property(&property) {
        None => {
            if !o.is_extensible() {
                return false;
            }
            let new_desc = descriptor_setter.apply_to(None);
            o.get_object_base_mut().properties.insert(property, new_desc);
            return true;
        }
        Some(current) => current.clone(),
    };
    if descriptor_setter.is_empty() {
        return true;
    }
    if !current.is_configurable() {
        let desc = &descriptor_setter.descriptor;
        if descriptor_setter.honour_configurable && desc.is_configurable() {
            return false;
        }
        if descriptor_setter.honour_enumerable && desc.is_enumerable() != current.is_enumerable()
        {
            return false;
        }
        if !descriptor_setter.is_generic_descriptor()
            && descriptor_setter.is_accessor_descriptor() != current.is_accessor_descriptor()
        {
            return false;
        }
        match (&current, desc) {
            (
                PropertyDescriptor::Accessor {
                    get: current_get,
                    set: current_set,
                    ..
                },
                PropertyDescriptor::Accessor { get, set, .. },
            ) => {
                if descriptor_setter.honour_get && !same_function_slot(current_get, get) {
                    return false;
                }
                if descriptor_setter.honour_set && !same_function_slot(current_set, set) {
                    return false;
                }
            }
            (
                PropertyDescriptor::Data {
                    value: current_value,
                    writable: false,
                    ..
                },
                PropertyDescriptor::Data {
                    value, writable, ..
                },
            ) => {
                if descriptor_setter.honour_writable && *writable {
                    return false;
                }
                if descriptor_setter.honour_value && !same_value(current_value, value) {
                    return false;
                }
            }
            _ => {}
        }
    }
    let new_desc = descriptor_setter.apply_to(Some(&current));
    o.get_object_base_mut().properties.insert(property, new_desc);
    true
}
