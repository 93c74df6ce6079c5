use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::execution_context::EvalContext;
use crate::runner::ds::function_object::{FunctionVariant, ThisMode};
use crate::runner::ds::lex_env::{JsLexEnvironmentType, LexEnvironment};
use crate::runner::ds::module_record::{JsModuleType, ModuleRecord};
use crate::runner::ds::object::JsObjectType;
use crate::runner::ds::object_property::{
    PropertyDescriptor, PropertyDescriptorSetter, PropertyKey,
};
use crate::runner::ds::operations::object::{
    define_property_or_throw, get, has_own_property, has_property, set,
};
use crate::runner::ds::operations::type_conversion::to_boolean;
use crate::runner::ds::symbol::SYMBOL_UNSCOPABLES;
use crate::runner::ds::value::JsValue;

/// Environment record protocol. Every method takes `&self`: records keep their state behind
/// `RefCell`s and release every borrow before user code (getters, setters) can run.
pub trait EnvironmentRecord {
    fn has_binding(&self, ctx: &mut EvalContext, name: &str) -> Result<bool, JErrorType>;
    fn create_mutable_binding(
        &self,
        ctx: &mut EvalContext,
        name: String,
        can_delete: bool,
    ) -> Result<(), JErrorType>;
    fn create_immutable_binding(
        &self,
        ctx: &mut EvalContext,
        name: String,
        strict: bool,
    ) -> Result<(), JErrorType>;
    fn initialize_binding(
        &self,
        ctx: &mut EvalContext,
        name: &str,
        value: JsValue,
    ) -> Result<(), JErrorType>;
    fn set_mutable_binding(
        &self,
        ctx: &mut EvalContext,
        name: &str,
        value: JsValue,
        strict: bool,
    ) -> Result<(), JErrorType>;
    fn get_binding_value(
        &self,
        ctx: &mut EvalContext,
        name: &str,
        strict: bool,
    ) -> Result<JsValue, JErrorType>;
    /// Probe used for conditional resolution. `None` when the name is absent or its binding
    /// is not yet initialized.
    fn try_get_binding(
        &self,
        ctx: &mut EvalContext,
        name: &str,
        strict: bool,
    ) -> Result<Option<(Binding, JsValue)>, JErrorType>;
    fn delete_binding(&self, ctx: &mut EvalContext, name: &str) -> Result<bool, JErrorType>;
    fn has_this_binding(&self) -> bool;
    fn has_super_binding(&self) -> bool;
    fn with_base_object(&self) -> Option<JsObjectType> {
        None
    }
    fn get_this_binding(&self, _ctx: &mut EvalContext) -> Result<JsValue, JErrorType> {
        Err(JErrorType::ReferenceError(
            "environment has no 'this' binding".to_string(),
        ))
    }
}

pub enum EnvironmentRecordType {
    Declarative(DeclarativeEnvironmentRecord),
    Object(ObjectEnvironmentRecord),
    Function(FunctionEnvironmentRecord),
    Global(GlobalEnvironmentRecord),
    Module(ModuleEnvironmentRecord),
}
impl EnvironmentRecordType {
    pub fn as_env_record(&self) -> &dyn EnvironmentRecord {
        match self {
            EnvironmentRecordType::Declarative(d) => d,
            EnvironmentRecordType::Object(d) => d,
            EnvironmentRecordType::Function(d) => d,
            EnvironmentRecordType::Global(d) => d,
            EnvironmentRecordType::Module(d) => d,
        }
    }

    pub fn as_function_env(&self) -> Option<&FunctionEnvironmentRecord> {
        match self {
            EnvironmentRecordType::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_global_env(&self) -> Option<&GlobalEnvironmentRecord> {
        match self {
            EnvironmentRecordType::Global(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_module_env(&self) -> Option<&ModuleEnvironmentRecord> {
        match self {
            EnvironmentRecordType::Module(m) => Some(m),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Binding {
    /// `None` until the binding is initialized.
    pub value: Option<JsValue>,
    pub mutable: bool,
    pub can_be_deleted: bool,
    pub strict: bool,
}
impl Binding {
    pub fn is_initialized(&self) -> bool {
        self.value.is_some()
    }
}

fn not_defined(name: &str) -> JErrorType {
    JErrorType::ReferenceError(format!("'{}' is not defined", name))
}

fn not_initialized(name: &str) -> JErrorType {
    JErrorType::ReferenceError(format!("Cannot access '{}' before initialization", name))
}

pub struct DeclarativeEnvironmentRecord {
    bindings: RefCell<HashMap<String, Binding>>,
}
impl DeclarativeEnvironmentRecord {
    pub fn new() -> Self {
        DeclarativeEnvironmentRecord {
            bindings: RefCell::new(HashMap::new()),
        }
    }

    fn has_own_binding(&self, name: &str) -> bool {
        self.bindings.borrow().contains_key(name)
    }

    fn insert_binding(&self, name: String, mutable: bool, can_delete: bool, strict: bool) {
        self.bindings
            .borrow_mut()
            .entry(name)
            .or_insert(Binding {
                value: None,
                mutable,
                can_be_deleted: can_delete,
                strict,
            });
    }
}
impl Default for DeclarativeEnvironmentRecord {
    fn default() -> Self {
        Self::new()
    }
}
impl EnvironmentRecord for DeclarativeEnvironmentRecord {
    fn has_binding(&self, _ctx: &mut EvalContext, name: &str) -> Result<bool, JErrorType> {
        Ok(self.has_own_binding(name))
    }

    fn create_mutable_binding(
        &self,
        _ctx: &mut EvalContext,
        name: String,
        can_delete: bool,
    ) -> Result<(), JErrorType> {
        self.insert_binding(name, true, can_delete, false);
        Ok(())
    }

    fn create_immutable_binding(
        &self,
        _ctx: &mut EvalContext,
        name: String,
        strict: bool,
    ) -> Result<(), JErrorType> {
        self.insert_binding(name, false, false, strict);
        Ok(())
    }

    fn initialize_binding(
        &self,
        _ctx: &mut EvalContext,
        name: &str,
        value: JsValue,
    ) -> Result<(), JErrorType> {
        match self.bindings.borrow_mut().get_mut(name) {
            None => Err(not_defined(name)),
            Some(b) => {
                b.value = Some(value);
                Ok(())
            }
        }
    }

    fn set_mutable_binding(
        &self,
        ctx: &mut EvalContext,
        name: &str,
        value: JsValue,
        strict: bool,
    ) -> Result<(), JErrorType> {
        if !self.has_own_binding(name) {
            if strict {
                return Err(not_defined(name));
            }
            self.create_mutable_binding(ctx, name.to_string(), true)?;
            return self.initialize_binding(ctx, name, value);
        }
        let mut bindings = self.bindings.borrow_mut();
        let binding = match bindings.get_mut(name) {
            None => return Err(not_defined(name)),
            Some(b) => b,
        };
        let strict = strict || binding.strict;
        if !binding.is_initialized() {
            Err(not_initialized(name))
        } else if binding.mutable {
            binding.value = Some(value);
            Ok(())
        } else if strict {
            Err(JErrorType::TypeError(format!(
                "Assignment to constant variable '{}'",
                name
            )))
        } else {
            Ok(())
        }
    }

    fn get_binding_value(
        &self,
        _ctx: &mut EvalContext,
        name: &str,
        _strict: bool,
    ) -> Result<JsValue, JErrorType> {
        match self.bindings.borrow().get(name) {
            None => Err(not_defined(name)),
            Some(Binding { value: None, .. }) => Err(not_initialized(name)),
            Some(Binding { value: Some(v), .. }) => Ok(v.clone()),
        }
    }

    fn try_get_binding(
        &self,
        _ctx: &mut EvalContext,
        name: &str,
        _strict: bool,
    ) -> Result<Option<(Binding, JsValue)>, JErrorType> {
        Ok(match self.bindings.borrow().get(name) {
            Some(b) => b.value.clone().map(|v| (b.clone(), v)),
            None => None,
        })
    }

    fn delete_binding(&self, _ctx: &mut EvalContext, name: &str) -> Result<bool, JErrorType> {
        let mut bindings = self.bindings.borrow_mut();
        Ok(match bindings.get(name) {
            None => true,
            Some(b) if !b.can_be_deleted => false,
            Some(_) => {
                bindings.remove(name);
                true
            }
        })
    }

    fn has_this_binding(&self) -> bool {
        false
    }

    fn has_super_binding(&self) -> bool {
        false
    }
}

pub struct ObjectEnvironmentRecord {
    binding_object: JsObjectType,
    is_with_environment: bool,
}
impl ObjectEnvironmentRecord {
    pub fn new(o: JsObjectType, is_with_environment: bool) -> Self {
        ObjectEnvironmentRecord {
            binding_object: o,
            is_with_environment,
        }
    }

    pub fn binding_object(&self) -> &JsObjectType {
        &self.binding_object
    }
}
impl EnvironmentRecord for ObjectEnvironmentRecord {
    fn has_binding(&self, ctx: &mut EvalContext, name: &str) -> Result<bool, JErrorType> {
        let key = PropertyKey::from(name);
        if !has_property(&self.binding_object, &key) {
            return Ok(false);
        }
        if !self.is_with_environment {
            return Ok(true);
        }
        let unscopables = get(ctx, &self.binding_object, &PropertyKey::from(&*SYMBOL_UNSCOPABLES))?;
        if let JsValue::Object(u) = unscopables {
            let blocked = get(ctx, &u, &key)?;
            if to_boolean(&blocked) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn create_mutable_binding(
        &self,
        _ctx: &mut EvalContext,
        name: String,
        can_delete: bool,
    ) -> Result<(), JErrorType> {
        define_property_or_throw(
            &self.binding_object,
            PropertyKey::Str(name),
            PropertyDescriptorSetter::new_from_property_descriptor(PropertyDescriptor::new_data(
                JsValue::Undefined,
                true,
                true,
                can_delete,
            )),
        )
    }

    fn create_immutable_binding(
        &self,
        _ctx: &mut EvalContext,
        name: String,
        _strict: bool,
    ) -> Result<(), JErrorType> {
        Err(JErrorType::TypeError(format!(
            "Cannot create immutable binding '{}' in an object environment",
            name
        )))
    }

    fn initialize_binding(
        &self,
        ctx: &mut EvalContext,
        name: &str,
        value: JsValue,
    ) -> Result<(), JErrorType> {
        self.set_mutable_binding(ctx, name, value, false)
    }

    fn set_mutable_binding(
        &self,
        ctx: &mut EvalContext,
        name: &str,
        value: JsValue,
        strict: bool,
    ) -> Result<(), JErrorType> {
        let key = PropertyKey::from(name);
        let still_exists = has_property(&self.binding_object, &key);
        if !still_exists && strict {
            return Err(not_defined(name));
        }
        set(ctx, &self.binding_object, key, value, strict)?;
        Ok(())
    }

    fn get_binding_value(
        &self,
        ctx: &mut EvalContext,
        name: &str,
        strict: bool,
    ) -> Result<JsValue, JErrorType> {
        let key = PropertyKey::from(name);
        if !has_property(&self.binding_object, &key) {
            return if strict {
                Err(not_defined(name))
            } else {
                Ok(JsValue::Undefined)
            };
        }
        get(ctx, &self.binding_object, &key)
    }

    fn try_get_binding(
        &self,
        ctx: &mut EvalContext,
        name: &str,
        strict: bool,
    ) -> Result<Option<(Binding, JsValue)>, JErrorType> {
        if !self.has_binding(ctx, name)? {
            return Ok(None);
        }
        let value = self.get_binding_value(ctx, name, strict)?;
        Ok(Some((
            Binding {
                value: Some(value.clone()),
                mutable: true,
                can_be_deleted: true,
                strict: false,
            },
            value,
        )))
    }

    fn delete_binding(&self, _ctx: &mut EvalContext, name: &str) -> Result<bool, JErrorType> {
        Ok(self
            .binding_object
            .borrow_mut()
            .as_js_object_mut()
            .delete(&PropertyKey::from(name)))
    }

    fn has_this_binding(&self) -> bool {
        false
    }

    fn has_super_binding(&self) -> bool {
        false
    }

    fn with_base_object(&self) -> Option<JsObjectType> {
        if self.is_with_environment {
            Some(self.binding_object.clone())
        } else {
            None
        }
    }
}

pub struct FunctionEnvironmentRecord {
    base_env: DeclarativeEnvironmentRecord,
    this_value: RefCell<Option<JsValue>>,
    is_lexical_binding: bool,
    function_object: JsObjectType,
    new_target: Option<JsObjectType>,
}
impl FunctionEnvironmentRecord {
    pub fn new(f: JsObjectType, new_target: Option<JsObjectType>, this_mode: ThisMode) -> Self {
        FunctionEnvironmentRecord {
            base_env: DeclarativeEnvironmentRecord::new(),
            this_value: RefCell::new(None),
            is_lexical_binding: this_mode == ThisMode::Lexical,
            function_object: f,
            new_target,
        }
    }

    pub fn bind_this_value(&self, this: JsValue) -> Result<(), JErrorType> {
        if self.is_lexical_binding {
            return Err(JErrorType::TypeError(
                "Cannot set 'this' of Arrow Function".to_string(),
            ));
        }
        let mut this_value = self.this_value.borrow_mut();
        if this_value.is_some() {
            Err(JErrorType::ReferenceError(
                "'this' is already initialized".to_string(),
            ))
        } else {
            *this_value = Some(this);
            Ok(())
        }
    }

    pub fn function_object(&self) -> &JsObjectType {
        &self.function_object
    }

    pub fn new_target(&self) -> Option<&JsObjectType> {
        self.new_target.as_ref()
    }
}
impl EnvironmentRecord for FunctionEnvironmentRecord {
    fn has_binding(&self, ctx: &mut EvalContext, name: &str) -> Result<bool, JErrorType> {
        self.base_env.has_binding(ctx, name)
    }

    fn create_mutable_binding(
        &self,
        ctx: &mut EvalContext,
        name: String,
        can_delete: bool,
    ) -> Result<(), JErrorType> {
        self.base_env.create_mutable_binding(ctx, name, can_delete)
    }

    fn create_immutable_binding(
        &self,
        ctx: &mut EvalContext,
        name: String,
        strict: bool,
    ) -> Result<(), JErrorType> {
        self.base_env.create_immutable_binding(ctx, name, strict)
    }

    fn initialize_binding(
        &self,
        ctx: &mut EvalContext,
        name: &str,
        value: JsValue,
    ) -> Result<(), JErrorType> {
        self.base_env.initialize_binding(ctx, name, value)
    }

    fn set_mutable_binding(
        &self,
        ctx: &mut EvalContext,
        name: &str,
        value: JsValue,
        strict: bool,
    ) -> Result<(), JErrorType> {
        self.base_env.set_mutable_binding(ctx, name, value, strict)
    }

    fn get_binding_value(
        &self,
        ctx: &mut EvalContext,
        name: &str,
        strict: bool,
    ) -> Result<JsValue, JErrorType> {
        self.base_env.get_binding_value(ctx, name, strict)
    }

    fn try_get_binding(
        &self,
        ctx: &mut EvalContext,
        name: &str,
        strict: bool,
    ) -> Result<Option<(Binding, JsValue)>, JErrorType> {
        self.base_env.try_get_binding(ctx, name, strict)
    }

    fn delete_binding(&self, ctx: &mut EvalContext, name: &str) -> Result<bool, JErrorType> {
        self.base_env.delete_binding(ctx, name)
    }

    fn has_this_binding(&self) -> bool {
        !self.is_lexical_binding
    }

    fn has_super_binding(&self) -> bool {
        false
    }

    fn get_this_binding(&self, _ctx: &mut EvalContext) -> Result<JsValue, JErrorType> {
        if self.is_lexical_binding {
            return Err(JErrorType::TypeError(
                "Cannot get 'this' of Arrow Function".to_string(),
            ));
        }
        match &*self.this_value.borrow() {
            Some(this) => Ok(this.clone()),
            None => Err(JErrorType::ReferenceError(
                "'this' is not initialized".to_string(),
            )),
        }
    }
}

pub struct GlobalEnvironmentRecord {
    object_record: ObjectEnvironmentRecord,
    declarative_record: DeclarativeEnvironmentRecord,
    global_this_value: JsObjectType,
    var_names: RefCell<Vec<String>>,
}
impl GlobalEnvironmentRecord {
    pub fn new(global_object: JsObjectType, this_value: JsObjectType) -> Self {
        GlobalEnvironmentRecord {
            object_record: ObjectEnvironmentRecord::new(global_object, false),
            declarative_record: DeclarativeEnvironmentRecord::new(),
            global_this_value: this_value,
            var_names: RefCell::new(Vec::new()),
        }
    }

    pub fn global_object(&self) -> &JsObjectType {
        &self.object_record.binding_object
    }

    pub fn has_var_declaration(&self, name: &str) -> bool {
        self.var_names.borrow().iter().any(|n| n == name)
    }

    pub fn has_lexical_declaration(&self, name: &str) -> bool {
        self.declarative_record.has_own_binding(name)
    }

    pub fn has_restricted_global_property(&self, name: &str) -> bool {
        self.global_object()
            .borrow()
            .as_js_object()
            .get_own_property(&PropertyKey::from(name))
            .map_or(false, |desc| !desc.is_configurable())
    }

    pub fn can_declare_global_var(&self, name: &str) -> bool {
        if has_own_property(self.global_object(), &PropertyKey::from(name)) {
            true
        } else {
            self.global_object().borrow().as_js_object().is_extensible()
        }
    }

    pub fn can_declare_global_function(&self, name: &str) -> bool {
        let global = self.global_object().borrow();
        match global
            .as_js_object()
            .get_own_property(&PropertyKey::from(name))
        {
            None => global.as_js_object().is_extensible(),
            Some(desc) if desc.is_configurable() => true,
            Some(PropertyDescriptor::Data {
                writable: true,
                enumerable: true,
                ..
            }) => true,
            Some(_) => false,
        }
    }

    fn record_var_name(&self, name: String) {
        let mut var_names = self.var_names.borrow_mut();
        if !var_names.contains(&name) {
            var_names.push(name);
        }
    }

    pub fn create_global_var_binding(
        &self,
        ctx: &mut EvalContext,
        name: String,
        can_delete: bool,
    ) -> Result<(), JErrorType> {
        let has_property = has_own_property(self.global_object(), &PropertyKey::from(name.as_str()));
        let is_extensible = self.global_object().borrow().as_js_object().is_extensible();
        if !has_property && is_extensible {
            self.object_record
                .create_mutable_binding(ctx, name.to_string(), can_delete)?;
            self.object_record
                .initialize_binding(ctx, &name, JsValue::Undefined)?;
        }
        self.record_var_name(name);
        Ok(())
    }

    pub fn create_global_function_binding(
        &self,
        ctx: &mut EvalContext,
        name: String,
        f: JsValue,
        can_delete: bool,
    ) -> Result<(), JErrorType> {
        let key = PropertyKey::from(name.as_str());
        let existing_configurable = self
            .global_object()
            .borrow()
            .as_js_object()
            .get_own_property(&key)
            .map(|d| d.is_configurable());
        let new_desc = match existing_configurable {
            None | Some(true) => PropertyDescriptorSetter::new_from_property_descriptor(
                PropertyDescriptor::new_data(f.clone(), true, true, can_delete),
            ),
            Some(false) => PropertyDescriptorSetter::new_value_only(f.clone()),
        };
        define_property_or_throw(self.global_object(), key.clone(), new_desc)?;
        set(ctx, self.global_object(), key, f, false)?;
        self.record_var_name(name);
        Ok(())
    }
}
impl EnvironmentRecord for GlobalEnvironmentRecord {
    fn has_binding(&self, ctx: &mut EvalContext, name: &str) -> Result<bool, JErrorType> {
        if self.declarative_record.has_own_binding(name) {
            Ok(true)
        } else {
            self.object_record.has_binding(ctx, name)
        }
    }

    fn create_mutable_binding(
        &self,
        ctx: &mut EvalContext,
        name: String,
        can_delete: bool,
    ) -> Result<(), JErrorType> {
        if self.declarative_record.has_own_binding(&name) {
            Err(JErrorType::TypeError(format!(
                "'{}' binding is already present",
                name
            )))
        } else {
            self.declarative_record
                .create_mutable_binding(ctx, name, can_delete)
        }
    }

    fn create_immutable_binding(
        &self,
        ctx: &mut EvalContext,
        name: String,
        strict: bool,
    ) -> Result<(), JErrorType> {
        if self.declarative_record.has_own_binding(&name) {
            Err(JErrorType::TypeError(format!(
                "'{}' binding is already present",
                name
            )))
        } else {
            self.declarative_record
                .create_immutable_binding(ctx, name, strict)
        }
    }

    fn initialize_binding(
        &self,
        ctx: &mut EvalContext,
        name: &str,
        value: JsValue,
    ) -> Result<(), JErrorType> {
        if self.declarative_record.has_own_binding(name) {
            self.declarative_record.initialize_binding(ctx, name, value)
        } else {
            self.object_record.initialize_binding(ctx, name, value)
        }
    }

    fn set_mutable_binding(
        &self,
        ctx: &mut EvalContext,
        name: &str,
        value: JsValue,
        strict: bool,
    ) -> Result<(), JErrorType> {
        if self.declarative_record.has_own_binding(name) {
            self.declarative_record
                .set_mutable_binding(ctx, name, value, strict)
        } else {
            self.object_record
                .set_mutable_binding(ctx, name, value, strict)
        }
    }

    fn get_binding_value(
        &self,
        ctx: &mut EvalContext,
        name: &str,
        strict: bool,
    ) -> Result<JsValue, JErrorType> {
        if self.declarative_record.has_own_binding(name) {
            self.declarative_record.get_binding_value(ctx, name, strict)
        } else {
            self.object_record.get_binding_value(ctx, name, strict)
        }
    }

    fn try_get_binding(
        &self,
        ctx: &mut EvalContext,
        name: &str,
        strict: bool,
    ) -> Result<Option<(Binding, JsValue)>, JErrorType> {
        if self.declarative_record.has_own_binding(name) {
            self.declarative_record.try_get_binding(ctx, name, strict)
        } else {
            self.object_record.try_get_binding(ctx, name, strict)
        }
    }

    fn delete_binding(&self, ctx: &mut EvalContext, name: &str) -> Result<bool, JErrorType> {
        if self.declarative_record.has_own_binding(name) {
            return self.declarative_record.delete_binding(ctx, name);
        }
        if has_own_property(self.global_object(), &PropertyKey::from(name)) {
            let deleted = self.object_record.delete_binding(ctx, name)?;
            if deleted {
                self.var_names.borrow_mut().retain(|n| n != name);
            }
            Ok(deleted)
        } else {
            Ok(true)
        }
    }

    fn has_this_binding(&self) -> bool {
        true
    }

    fn has_super_binding(&self) -> bool {
        false
    }

    fn get_this_binding(&self, _ctx: &mut EvalContext) -> Result<JsValue, JErrorType> {
        Ok(JsValue::Object(self.global_this_value.clone()))
    }
}

/// A live alias to a binding owned by another module. The target is held weakly; the module
/// graph owns modules, not the environments that import from them.
#[derive(Clone)]
struct IndirectBinding {
    module: Weak<dyn ModuleRecord>,
    binding_name: String,
}
impl IndirectBinding {
    fn get_value(&self, ctx: &mut EvalContext, local_name: &str) -> Result<JsValue, JErrorType> {
        match self.module.upgrade() {
            Some(module) => module.get_binding_value(ctx, &self.binding_name, true),
            None => Err(JErrorType::ReferenceError(format!(
                "module providing import '{}' is no longer available",
                local_name
            ))),
        }
    }
}

pub struct ModuleEnvironmentRecord {
    base_env: DeclarativeEnvironmentRecord,
    import_bindings: RefCell<HashMap<String, IndirectBinding>>,
}
impl ModuleEnvironmentRecord {
    pub fn new() -> Self {
        ModuleEnvironmentRecord {
            base_env: DeclarativeEnvironmentRecord::new(),
            import_bindings: RefCell::new(HashMap::new()),
        }
    }

    fn import_binding(&self, name: &str) -> Option<IndirectBinding> {
        self.import_bindings.borrow().get(name).cloned()
    }

    /// CreateImportBinding. Reads of `import_name` are forwarded to `module` on every access;
    /// the local slot only exists so the name is known to this environment.
    pub fn create_import_binding(
        &self,
        ctx: &mut EvalContext,
        import_name: String,
        module: &JsModuleType,
        name: String,
    ) -> Result<(), JErrorType> {
        tracing::debug!(import = %import_name, export = %name, "creating import binding");
        self.import_bindings.borrow_mut().insert(
            import_name.clone(),
            IndirectBinding {
                module: Rc::downgrade(module),
                binding_name: name,
            },
        );
        self.base_env
            .create_immutable_binding(ctx, import_name.clone(), true)?;
        self.base_env
            .initialize_binding(ctx, &import_name, JsValue::Undefined)
    }
}
impl Default for ModuleEnvironmentRecord {
    fn default() -> Self {
        Self::new()
    }
}
impl EnvironmentRecord for ModuleEnvironmentRecord {
    fn has_binding(&self, ctx: &mut EvalContext, name: &str) -> Result<bool, JErrorType> {
        self.base_env.has_binding(ctx, name)
    }

    fn create_mutable_binding(
        &self,
        ctx: &mut EvalContext,
        name: String,
        can_delete: bool,
    ) -> Result<(), JErrorType> {
        self.base_env.create_mutable_binding(ctx, name, can_delete)
    }

    fn create_immutable_binding(
        &self,
        ctx: &mut EvalContext,
        name: String,
        strict: bool,
    ) -> Result<(), JErrorType> {
        self.base_env.create_immutable_binding(ctx, name, strict)
    }

    fn initialize_binding(
        &self,
        ctx: &mut EvalContext,
        name: &str,
        value: JsValue,
    ) -> Result<(), JErrorType> {
        self.base_env.initialize_binding(ctx, name, value)
    }

    fn set_mutable_binding(
        &self,
        ctx: &mut EvalContext,
        name: &str,
        value: JsValue,
        strict: bool,
    ) -> Result<(), JErrorType> {
        self.base_env.set_mutable_binding(ctx, name, value, strict)
    }

    fn get_binding_value(
        &self,
        ctx: &mut EvalContext,
        name: &str,
        strict: bool,
    ) -> Result<JsValue, JErrorType> {
        match self.import_binding(name) {
            Some(indirect) => indirect.get_value(ctx, name),
            None => self.base_env.get_binding_value(ctx, name, strict),
        }
    }

    fn try_get_binding(
        &self,
        ctx: &mut EvalContext,
        name: &str,
        strict: bool,
    ) -> Result<Option<(Binding, JsValue)>, JErrorType> {
        match self.import_binding(name) {
            Some(indirect) => {
                let value = indirect.get_value(ctx, name)?;
                Ok(Some((
                    Binding {
                        value: Some(value.clone()),
                        mutable: false,
                        can_be_deleted: false,
                        strict: true,
                    },
                    value,
                )))
            }
            None => self.base_env.try_get_binding(ctx, name, strict),
        }
    }

    fn delete_binding(&self, ctx: &mut EvalContext, name: &str) -> Result<bool, JErrorType> {
        self.base_env.delete_binding(ctx, name)
    }

    fn has_this_binding(&self) -> bool {
        true
    }

    fn has_super_binding(&self) -> bool {
        false
    }

    fn get_this_binding(&self, _ctx: &mut EvalContext) -> Result<JsValue, JErrorType> {
        Ok(JsValue::Undefined)
    }
}

pub fn new_declarative_environment(outer_lex: Option<JsLexEnvironmentType>) -> JsLexEnvironmentType {
    Rc::new(LexEnvironment {
        inner: EnvironmentRecordType::Declarative(DeclarativeEnvironmentRecord::new()),
        outer: outer_lex,
    })
}

pub fn new_object_environment(
    o: JsObjectType,
    is_with_environment: bool,
    outer_lex: Option<JsLexEnvironmentType>,
) -> JsLexEnvironmentType {
    Rc::new(LexEnvironment {
        inner: EnvironmentRecordType::Object(ObjectEnvironmentRecord::new(
            o,
            is_with_environment,
        )),
        outer: outer_lex,
    })
}

/// NewFunctionEnvironment. The outer environment is the one the function closed over.
pub fn new_function_environment(
    f: JsObjectType,
    new_target: Option<JsObjectType>,
) -> Result<JsLexEnvironmentType, JErrorType> {
    let (outer_lex, this_mode) = {
        let o = f.borrow();
        match o.as_function_object().map(|fo| fo.variant()) {
            Some(FunctionVariant::Ordinary(d)) => (d.environment.clone(), d.this_mode),
            _ => {
                return Err(JErrorType::TypeError(
                    "Function environments are only created for ordinary functions".to_string(),
                ))
            }
        }
    };
    Ok(Rc::new(LexEnvironment {
        inner: EnvironmentRecordType::Function(FunctionEnvironmentRecord::new(
            f, new_target, this_mode,
        )),
        outer: Some(outer_lex),
    }))
}

pub fn new_global_environment(
    global_object: JsObjectType,
    this_value: JsObjectType,
) -> JsLexEnvironmentType {
    Rc::new(LexEnvironment {
        inner: EnvironmentRecordType::Global(GlobalEnvironmentRecord::new(
            global_object,
            this_value,
        )),
        outer: None,
    })
}

pub fn new_module_environment(outer_lex: Option<JsLexEnvironmentType>) -> JsLexEnvironmentType {
    Rc::new(LexEnvironment {
        inner: EnvironmentRecordType::Module(ModuleEnvironmentRecord::new()),
        outer: outer_lex,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ds::object::object_create;

    #[test]
    fn test_declarative_tdz() {
        let mut ctx = EvalContext::new();
        let env = DeclarativeEnvironmentRecord::new();
        env.create_mutable_binding(&mut ctx, "x".to_string(), false)
            .unwrap();
        assert!(env
            .get_binding_value(&mut ctx, "x", true)
            .unwrap_err()
            .is_reference_error());
        assert!(env
            .set_mutable_binding(&mut ctx, "x", JsValue::Null, false)
            .unwrap_err()
            .is_reference_error());
        assert!(env.try_get_binding(&mut ctx, "x", true).unwrap().is_none());
        env.initialize_binding(&mut ctx, "x", JsValue::from(1.0))
            .unwrap();
        assert_eq!(
            env.get_binding_value(&mut ctx, "x", true).unwrap(),
            JsValue::from(1.0)
        );
    }

    #[test]
    fn test_declarative_immutable_binding() {
        let mut ctx = EvalContext::new();
        let env = DeclarativeEnvironmentRecord::new();
        env.create_immutable_binding(&mut ctx, "c".to_string(), false)
            .unwrap();
        env.initialize_binding(&mut ctx, "c", JsValue::from("v"))
            .unwrap();
        // Sloppy assignment is ignored, strict assignment throws.
        env.set_mutable_binding(&mut ctx, "c", JsValue::from("w"), false)
            .unwrap();
        assert_eq!(
            env.get_binding_value(&mut ctx, "c", false).unwrap(),
            JsValue::from("v")
        );
        assert!(env
            .set_mutable_binding(&mut ctx, "c", JsValue::from("w"), true)
            .unwrap_err()
            .is_type_error());
        assert!(!env.delete_binding(&mut ctx, "c").unwrap());
    }

    #[test]
    fn test_declarative_sloppy_set_creates_binding() {
        let mut ctx = EvalContext::new();
        let env = DeclarativeEnvironmentRecord::new();
        assert!(env
            .set_mutable_binding(&mut ctx, "y", JsValue::from(2.0), true)
            .unwrap_err()
            .is_reference_error());
        env.set_mutable_binding(&mut ctx, "y", JsValue::from(2.0), false)
            .unwrap();
        assert!(env.delete_binding(&mut ctx, "y").unwrap());
        assert!(!env.has_binding(&mut ctx, "y").unwrap());
    }

    #[test]
    fn test_object_environment_reads_properties() {
        let mut ctx = EvalContext::new();
        let o = object_create(None);
        let env = ObjectEnvironmentRecord::new(o.clone(), false);
        assert_eq!(
            env.get_binding_value(&mut ctx, "missing", false).unwrap(),
            JsValue::Undefined
        );
        assert!(env
            .get_binding_value(&mut ctx, "missing", true)
            .unwrap_err()
            .is_reference_error());
        env.create_mutable_binding(&mut ctx, "p".to_string(), true)
            .unwrap();
        env.initialize_binding(&mut ctx, "p", JsValue::from(5.0))
            .unwrap();
        assert_eq!(
            env.get_binding_value(&mut ctx, "p", true).unwrap(),
            JsValue::from(5.0)
        );
        assert!(env.with_base_object().is_none());
        assert!(env
            .create_immutable_binding(&mut ctx, "q".to_string(), true)
            .unwrap_err()
            .is_type_error());
    }

    #[test]
    fn test_with_environment_honours_unscopables() {
        let mut ctx = EvalContext::new();
        let o = object_create(None);
        let unscopables = object_create(None);
        set(&mut ctx, &o, PropertyKey::from("hidden"), JsValue::from(1.0), true).unwrap();
        set(&mut ctx, &unscopables, PropertyKey::from("hidden"), JsValue::Boolean(true), true)
            .unwrap();
        set(
            &mut ctx,
            &o,
            PropertyKey::from(&*SYMBOL_UNSCOPABLES),
            JsValue::Object(unscopables),
            true,
        )
        .unwrap();
        let env = ObjectEnvironmentRecord::new(o.clone(), true);
        assert!(!env.has_binding(&mut ctx, "hidden").unwrap());
        assert!(env.with_base_object().is_some());
    }

    #[test]
    fn test_global_environment_var_and_lexical_declarations() {
        let mut ctx = EvalContext::new();
        let global_env = ctx.realm.global_env.clone();
        let global = global_env.inner.as_global_env().unwrap();
        global
            .create_global_var_binding(&mut ctx, "v".to_string(), false)
            .unwrap();
        assert!(global.has_var_declaration("v"));
        assert!(global.has_restricted_global_property("v"));
        assert!(global.can_declare_global_var("v"));
        global
            .create_immutable_binding(&mut ctx, "k".to_string(), true)
            .unwrap();
        assert!(global.has_lexical_declaration("k"));
        assert!(global
            .create_mutable_binding(&mut ctx, "k".to_string(), false)
            .unwrap_err()
            .is_type_error());
        // NaN is non-writable and non-configurable on the global object.
        assert!(!global.can_declare_global_function("NaN"));
        assert!(global.has_this_binding());
    }

    #[test]
    fn test_module_environment_this() {
        let mut ctx = EvalContext::new();
        let env = ModuleEnvironmentRecord::new();
        assert!(env.has_this_binding());
        assert_eq!(env.get_this_binding(&mut ctx).unwrap(), JsValue::Undefined);
        let plain = DeclarativeEnvironmentRecord::new();
        assert!(!plain.has_this_binding());
    }
}
