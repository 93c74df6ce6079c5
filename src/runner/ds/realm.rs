use crate::runner::ds::env_record::new_global_environment;
use crate::runner::ds::lex_env::JsLexEnvironmentType;
use crate::runner::ds::object::{object_create, JsObjectType};
use crate::runner::ds::value::{JsNumberType, JsValue};
use crate::runner::std_lib::array_buffer::create_array_buffer_constructor;
use crate::runner::std_lib::core::define_builtin_property;
use crate::runner::std_lib::function::{
    create_function_prototype, create_throw_type_error, install_function_prototype_methods,
};
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WellKnownIntrinsics {
    ArrayBuffer,
    ArrayBufferPrototype,
    FunctionPrototype,
    ObjectPrototype,
    ThrowTypeError,
}

pub struct Intrinsics {
    pub array_buffer: JsObjectType,
    pub array_buffer_prototype: JsObjectType,
    pub function_prototype: JsObjectType,
    pub object_prototype: JsObjectType,
    pub throw_type_error: JsObjectType,
}

pub type JsCodeRealmType = Rc<CodeRealm>;

/// A realm: its intrinsics, global object and global environment. Built completely up front
/// and immutable afterwards.
pub struct CodeRealm {
    pub intrinsics: Intrinsics,
    pub global_this: JsObjectType,
    pub global_env: JsLexEnvironmentType,
}
impl CodeRealm {
    pub fn new() -> Self {
        let intrinsics = create_intrinsics();
        let global_this = object_create(Some(intrinsics.object_prototype.clone()));
        set_default_global_bindings(&global_this, &intrinsics);
        let global_env = new_global_environment(global_this.clone(), global_this.clone());
        tracing::debug!("realm created");
        CodeRealm {
            intrinsics,
            global_this,
            global_env,
        }
    }

    pub fn get_intrinsics_value(&self, int_name: WellKnownIntrinsics) -> &JsObjectType {
        match int_name {
            WellKnownIntrinsics::ArrayBuffer => &self.intrinsics.array_buffer,
            WellKnownIntrinsics::ArrayBufferPrototype => &self.intrinsics.array_buffer_prototype,
            WellKnownIntrinsics::FunctionPrototype => &self.intrinsics.function_prototype,
            WellKnownIntrinsics::ObjectPrototype => &self.intrinsics.object_prototype,
            WellKnownIntrinsics::ThrowTypeError => &self.intrinsics.throw_type_error,
        }
    }
}
impl Default for CodeRealm {
    fn default() -> Self {
        Self::new()
    }
}

/// CreateIntrinsics. Order matters: every function needs `%Function.prototype%`.
pub fn create_intrinsics() -> Intrinsics {
    let object_prototype = object_create(None);
    let function_prototype = create_function_prototype(&object_prototype);
    let throw_type_error = create_throw_type_error(&function_prototype);
    install_function_prototype_methods(&function_prototype);
    let (array_buffer, array_buffer_prototype) =
        create_array_buffer_constructor(&object_prototype, &function_prototype);
    Intrinsics {
        array_buffer,
        array_buffer_prototype,
        function_prototype,
        object_prototype,
        throw_type_error,
    }
}

/// SetDefaultGlobalBindings
pub fn set_default_global_bindings(global_obj: &JsObjectType, intrinsics: &Intrinsics) {
    define_builtin_property(
        global_obj,
        "globalThis".into(),
        JsValue::Object(global_obj.clone()),
        true,
        false,
        true,
    );
    define_builtin_property(
        global_obj,
        "Infinity".into(),
        JsValue::Number(JsNumberType::PositiveInfinity),
        false,
        false,
        false,
    );
    define_builtin_property(
        global_obj,
        "NaN".into(),
        JsValue::Number(JsNumberType::NaN),
        false,
        false,
        false,
    );
    define_builtin_property(
        global_obj,
        "undefined".into(),
        JsValue::Undefined,
        false,
        false,
        false,
    );
    define_builtin_property(
        global_obj,
        "ArrayBuffer".into(),
        JsValue::Object(intrinsics.array_buffer.clone()),
        true,
        false,
        true,
    );
}
