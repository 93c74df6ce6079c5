use std::fmt;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

use crate::runner::ds::object::JsObjectType;
use crate::runner::ds::operations::test_and_comparison::same_value;
use crate::runner::ds::symbol::SymbolData;
use crate::runner::ds::value::JsValue;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    Str(String),
    Sym(SymbolData),
}
impl Display for PropertyKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKey::Str(s) => write!(f, "{}", s),
            PropertyKey::Sym(s) => write!(f, "{}", s),
        }
    }
}
impl From<&str> for PropertyKey {
    fn from(s: &str) -> Self {
        PropertyKey::Str(s.to_string())
    }
}
impl From<&SymbolData> for PropertyKey {
    fn from(s: &SymbolData) -> Self {
        PropertyKey::Sym(s.clone())
    }
}

/// A possibly partial descriptor, as passed to `[[DefineOwnProperty]]`. Only the fields
/// marked with `honour_*` are applied; the remaining fields of `descriptor` are ignored.
pub struct PropertyDescriptorSetter {
    pub honour_value: bool,
    pub honour_writable: bool,
    pub honour_set: bool,
    pub honour_get: bool,
    pub honour_enumerable: bool,
    pub honour_configurable: bool,
    pub descriptor: PropertyDescriptor,
}
impl PropertyDescriptorSetter {
    pub fn new_from_property_descriptor(desc: PropertyDescriptor) -> Self {
        match desc {
            PropertyDescriptor::Data { .. } => PropertyDescriptorSetter {
                honour_value: true,
                honour_writable: true,
                honour_configurable: true,
                honour_enumerable: true,
                descriptor: desc,
                honour_set: false,
                honour_get: false,
            },
            PropertyDescriptor::Accessor { .. } => PropertyDescriptorSetter {
                honour_set: true,
                honour_get: true,
                honour_configurable: true,
                honour_enumerable: true,
                descriptor: desc,
                honour_value: false,
                honour_writable: false,
            },
        }
    }

    /// Setter that only replaces the value of an existing data property.
    pub fn new_value_only(value: JsValue) -> Self {
        PropertyDescriptorSetter {
            honour_value: true,
            honour_writable: false,
            honour_set: false,
            honour_get: false,
            honour_enumerable: false,
            honour_configurable: false,
            descriptor: PropertyDescriptor::new_data(value, false, false, false),
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.honour_configurable
            && !self.honour_enumerable
            && !self.honour_get
            && !self.honour_set
            && !self.honour_value
            && !self.honour_writable
    }

    pub fn is_generic_descriptor(&self) -> bool {
        !self.honour_get && !self.honour_set && !self.honour_value && !self.honour_writable
    }

    pub fn is_accessor_descriptor(&self) -> bool {
        self.honour_get || self.honour_set
    }

    /// Produces the descriptor that results from applying this setter on top of `current`
    /// (or on top of the default descriptor when the property does not exist yet).
    pub fn apply_to(self, current: Option<&PropertyDescriptor>) -> PropertyDescriptor {
        let enumerable = if self.honour_enumerable {
            self.descriptor.is_enumerable()
        } else {
            current.map_or(false, |c| c.is_enumerable())
        };
        let configurable = if self.honour_configurable {
            self.descriptor.is_configurable()
        } else {
            current.map_or(false, |c| c.is_configurable())
        };
        let wants_accessor = if self.is_generic_descriptor() {
            current.map_or(false, |c| c.is_accessor_descriptor())
        } else {
            self.is_accessor_descriptor()
        };
        if wants_accessor {
            let (cur_get, cur_set) = match current {
                Some(PropertyDescriptor::Accessor { get, set, .. }) => (get.clone(), set.clone()),
                _ => (None, None),
            };
            let (new_get, new_set) = match self.descriptor {
                PropertyDescriptor::Accessor { get, set, .. } => (get, set),
                PropertyDescriptor::Data { .. } => (None, None),
            };
            PropertyDescriptor::Accessor {
                get: if self.honour_get { new_get } else { cur_get },
                set: if self.honour_set { new_set } else { cur_set },
                enumerable,
                configurable,
            }
        } else {
            let (cur_value, cur_writable) = match current {
                Some(PropertyDescriptor::Data {
                    value, writable, ..
                }) => (value.clone(), *writable),
                _ => (JsValue::Undefined, false),
            };
            let (new_value, new_writable) = match self.descriptor {
                PropertyDescriptor::Data {
                    value, writable, ..
                } => (value, writable),
                PropertyDescriptor::Accessor { .. } => (JsValue::Undefined, false),
            };
            PropertyDescriptor::Data {
                value: if self.honour_value { new_value } else { cur_value },
                writable: if self.honour_writable {
                    new_writable
                } else {
                    cur_writable
                },
                enumerable,
                configurable,
            }
        }
    }
}

#[derive(Clone)]
pub enum PropertyDescriptor {
    Data {
        value: JsValue,
        writable: bool,
        enumerable: bool,
        configurable: bool,
    },
    Accessor {
        set: Option<JsObjectType>,
        get: Option<JsObjectType>,
        enumerable: bool,
        configurable: bool,
    },
}
impl PropertyDescriptor {
    pub fn new_data(value: JsValue, writable: bool, enumerable: bool, configurable: bool) -> Self {
        PropertyDescriptor::Data {
            value,
            writable,
            enumerable,
            configurable,
        }
    }

    pub fn new_accessor(
        get: Option<JsObjectType>,
        set: Option<JsObjectType>,
        enumerable: bool,
        configurable: bool,
    ) -> Self {
        PropertyDescriptor::Accessor {
            get,
            set,
            enumerable,
            configurable,
        }
    }

    pub fn is_enumerable(&self) -> bool {
        match self {
            PropertyDescriptor::Data { enumerable, .. } => *enumerable,
            PropertyDescriptor::Accessor { enumerable, .. } => *enumerable,
        }
    }

    pub fn is_configurable(&self) -> bool {
        match self {
            PropertyDescriptor::Data { configurable, .. } => *configurable,
            PropertyDescriptor::Accessor { configurable, .. } => *configurable,
        }
    }

    pub fn is_accessor_descriptor(&self) -> bool {
        matches!(self, PropertyDescriptor::Accessor { .. })
    }
}
impl fmt::Debug for PropertyDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PropertyDescriptor::Data {
                value,
                writable,
                enumerable,
                configurable,
            } => write!(
                f,
                "Data {{ value: {:?}, writable: {}, enumerable: {}, configurable: {} }}",
                value, writable, enumerable, configurable
            ),
            PropertyDescriptor::Accessor {
                get,
                set,
                enumerable,
                configurable,
            } => write!(
                f,
                "Accessor {{ get: {}, set: {}, enumerable: {}, configurable: {} }}",
                get.is_some(),
                set.is_some(),
                enumerable,
                configurable
            ),
        }
    }
}
impl PartialEq for PropertyDescriptor {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                PropertyDescriptor::Data {
                    value,
                    writable,
                    enumerable,
                    configurable,
                },
                PropertyDescriptor::Data {
                    value: other_value,
                    writable: other_writable,
                    enumerable: other_enumerable,
                    configurable: other_configurable,
                },
            ) => {
                same_value(value, other_value)
                    && writable == other_writable
                    && enumerable == other_enumerable
                    && configurable == other_configurable
            }
            (
                PropertyDescriptor::Accessor {
                    set,
                    get,
                    enumerable,
                    configurable,
                },
                PropertyDescriptor::Accessor {
                    set: other_set,
                    get: other_get,
                    enumerable: other_enumerable,
                    configurable: other_configurable,
                },
            ) => {
                same_function_slot(set, other_set)
                    && same_function_slot(get, other_get)
                    && enumerable == other_enumerable
                    && configurable == other_configurable
            }
            _ => false,
        }
    }
}

pub(crate) fn same_function_slot(a: &Option<JsObjectType>, b: &Option<JsObjectType>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => Rc::ptr_eq(a, b),
        _ => false,
    }
}
