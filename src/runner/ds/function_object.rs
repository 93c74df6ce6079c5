use std::cell::RefCell;
use std::rc::Rc;

use crate::runner::ds::env_record::new_function_environment;
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::execution_context::{EvalContext, ExecutionContext};
use crate::runner::ds::lex_env::JsLexEnvironmentType;
use crate::runner::ds::object::{
    ordinary_define_own_property, JsObject, JsObjectType, ObjectBase, ObjectType,
};
use crate::runner::ds::object_property::{
    PropertyDescriptor, PropertyDescriptorSetter, PropertyKey,
};
use crate::runner::ds::operations::object::ordinary_create_from_constructor;
use crate::runner::ds::realm::WellKnownIntrinsics;
use crate::runner::ds::value::{JsNumberType, JsValue};

/// Signature of a built-in function's `[[Call]]`.
pub type NativeFn =
    fn(ctx: &mut EvalContext, this: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType>;

/// Signature of a built-in function's `[[Construct]]`.
pub type NativeConstructFn = fn(
    ctx: &mut EvalContext,
    args: Vec<JsValue>,
    new_target: JsObjectType,
) -> Result<JsValue, JErrorType>;

/// The code of an ordinary function. Supplied by the evaluator; the runtime only prepares
/// the function environment and hands it over.
pub trait FunctionBody {
    fn evaluate(
        &self,
        ctx: &mut EvalContext,
        function: &JsObjectType,
        env: &JsLexEnvironmentType,
        args: Vec<JsValue>,
    ) -> Result<JsValue, JErrorType>;

    fn source_text(&self) -> Option<String> {
        None
    }
}
impl<F> FunctionBody for F
where
    F: Fn(
        &mut EvalContext,
        &JsObjectType,
        &JsLexEnvironmentType,
        Vec<JsValue>,
    ) -> Result<JsValue, JErrorType>,
{
    fn evaluate(
        &self,
        ctx: &mut EvalContext,
        function: &JsObjectType,
        env: &JsLexEnvironmentType,
        args: Vec<JsValue>,
    ) -> Result<JsValue, JErrorType> {
        self(ctx, function, env, args)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FunctionKind {
    Normal,
    ClassConstructor,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConstructorKind {
    Base,
    Derived,
    None,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ThisMode {
    Lexical,
    Strict,
    Global,
}

pub struct OrdinaryFunction {
    pub environment: JsLexEnvironmentType,
    pub function_kind: FunctionKind,
    pub constructor_kind: ConstructorKind,
    pub this_mode: ThisMode,
    pub body: Rc<dyn FunctionBody>,
}

pub struct NativeFunction {
    pub name: String,
    pub arity: u32,
    pub callback: NativeFn,
    pub construct: Option<NativeConstructFn>,
}

pub struct BoundFunction {
    pub bound_target_function: JsObjectType,
    pub bound_this: JsValue,
    pub bound_arguments: Vec<JsValue>,
}

pub enum FunctionVariant {
    Ordinary(OrdinaryFunction),
    Native(NativeFunction),
    Bound(BoundFunction),
}

pub struct FunctionObject {
    object_base: ObjectBase,
    variant: FunctionVariant,
}
impl FunctionObject {
    pub fn new(prototype: Option<JsObjectType>, variant: FunctionVariant) -> Self {
        FunctionObject {
            object_base: ObjectBase::with_prototype(prototype),
            variant,
        }
    }

    pub fn variant(&self) -> &FunctionVariant {
        &self.variant
    }

    pub fn is_constructor(&self) -> bool {
        match &self.variant {
            FunctionVariant::Ordinary(o) => o.constructor_kind != ConstructorKind::None,
            FunctionVariant::Native(n) => n.construct.is_some(),
            FunctionVariant::Bound(b) => match b.bound_target_function.try_borrow() {
                Ok(t) => t.as_function_object().map_or(false, |f| f.is_constructor()),
                Err(_) => false,
            },
        }
    }

    /// Name as currently recorded in the own `name` property.
    pub fn name(&self) -> String {
        match self.get_own_property(&PropertyKey::from("name")) {
            Some(PropertyDescriptor::Data {
                value: JsValue::String(s),
                ..
            }) => s.to_string(),
            _ => String::new(),
        }
    }
}
impl JsObject for FunctionObject {
    fn get_object_base_mut(&mut self) -> &mut ObjectBase {
        &mut self.object_base
    }

    fn get_object_base(&self) -> &ObjectBase {
        &self.object_base
    }

    fn to_string(&self) -> String {
        format!("function {}", self.name())
    }
}

/// SetFunctionLength
pub fn set_function_length(f: &mut FunctionObject, length: JsNumberType) {
    ordinary_define_own_property(
        f,
        PropertyKey::from("length"),
        PropertyDescriptorSetter::new_from_property_descriptor(PropertyDescriptor::new_data(
            JsValue::Number(length),
            false,
            false,
            true,
        )),
    );
}

fn function_name_from_key(name: &PropertyKey) -> String {
    match name {
        PropertyKey::Str(s) => s.to_string(),
        PropertyKey::Sym(s) => s.function_name(),
    }
}

/// SetFunctionName
pub fn set_function_name(f: &mut FunctionObject, name: &PropertyKey, prefix: Option<&str>) {
    let name = function_name_from_key(name);
    let name = match prefix {
        None => name,
        Some(p) => format!("{} {}", p, name),
    };
    ordinary_define_own_property(
        f,
        PropertyKey::from("name"),
        PropertyDescriptorSetter::new_from_property_descriptor(PropertyDescriptor::new_data(
            JsValue::String(name),
            false,
            false,
            true,
        )),
    );
}

pub fn native_function_create(
    function_prototype: Option<JsObjectType>,
    name: &PropertyKey,
    arity: u32,
    callback: NativeFn,
    construct: Option<NativeConstructFn>,
) -> JsObjectType {
    let mut f = FunctionObject::new(
        function_prototype,
        FunctionVariant::Native(NativeFunction {
            name: function_name_from_key(name),
            arity,
            callback,
            construct,
        }),
    );
    set_function_length(&mut f, JsNumberType::Integer(arity as i64));
    set_function_name(&mut f, name, None);
    Rc::new(RefCell::new(ObjectType::Function(f)))
}

/// OrdinaryFunctionCreate followed by SetFunctionName. The function's prototype is the
/// realm's `%Function.prototype%`.
pub fn ordinary_function_create(
    ctx: &EvalContext,
    name: &str,
    length: u32,
    data: OrdinaryFunction,
) -> JsObjectType {
    let prototype = ctx
        .realm
        .get_intrinsics_value(WellKnownIntrinsics::FunctionPrototype)
        .clone();
    let mut f = FunctionObject::new(Some(prototype), FunctionVariant::Ordinary(data));
    set_function_length(&mut f, JsNumberType::Integer(length as i64));
    set_function_name(&mut f, &PropertyKey::from(name), None);
    Rc::new(RefCell::new(ObjectType::Function(f)))
}

/// BoundFunctionCreate. Length, name and the poisoned accessors are added by the caller.
pub fn bound_function_create(
    target: &JsObjectType,
    bound_this: JsValue,
    bound_arguments: Vec<JsValue>,
) -> Result<FunctionObject, JErrorType> {
    let prototype = {
        let t = target.borrow();
        if !t.is_callable() {
            return Err(JErrorType::TypeError(
                "Bind must be called on a function".to_string(),
            ));
        }
        t.as_js_object().get_prototype_of()
    };
    Ok(FunctionObject::new(
        prototype,
        FunctionVariant::Bound(BoundFunction {
            bound_target_function: target.clone(),
            bound_this,
            bound_arguments,
        }),
    ))
}

enum Callee {
    Ordinary,
    Native(NativeFn),
    Bound(JsObjectType, JsValue, Vec<JsValue>),
}

/// `[[Call]]` of any function object. No borrow of `f` is held while user code runs.
pub fn call_function_object(
    ctx: &mut EvalContext,
    f: &JsObjectType,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let callee = {
        let o = f.borrow();
        match o.as_function_object() {
            None => {
                return Err(JErrorType::TypeError(format!(
                    "{} is not a function",
                    o.as_js_object().to_string()
                )))
            }
            Some(fo) => match &fo.variant {
                FunctionVariant::Ordinary(_) => Callee::Ordinary,
                FunctionVariant::Native(n) => Callee::Native(n.callback),
                FunctionVariant::Bound(b) => Callee::Bound(
                    b.bound_target_function.clone(),
                    b.bound_this.clone(),
                    b.bound_arguments.clone(),
                ),
            },
        }
    };
    match callee {
        Callee::Ordinary => ordinary_call(ctx, f, this, args),
        Callee::Native(callback) => callback(ctx, this, args),
        Callee::Bound(target, bound_this, bound_args) => {
            let mut new_args = bound_args;
            new_args.extend(args);
            call_function_object(ctx, &target, bound_this, new_args)
        }
    }
}

enum ConstructTarget {
    Ordinary,
    Native(NativeConstructFn),
    Bound(JsObjectType, Vec<JsValue>),
}

/// `[[Construct]]` of any function object.
pub fn construct_function_object(
    ctx: &mut EvalContext,
    f: &JsObjectType,
    args: Vec<JsValue>,
    new_target: Option<&JsObjectType>,
) -> Result<JsValue, JErrorType> {
    let new_target = new_target.cloned().unwrap_or_else(|| f.clone());
    let target = {
        let o = f.borrow();
        let not_a_constructor =
            || JErrorType::TypeError(format!("{} is not a constructor", o.as_js_object().to_string()));
        match o.as_function_object() {
            None => return Err(not_a_constructor()),
            Some(fo) => {
                if !fo.is_constructor() {
                    return Err(not_a_constructor());
                }
                match &fo.variant {
                    FunctionVariant::Ordinary(_) => ConstructTarget::Ordinary,
                    FunctionVariant::Native(n) => match n.construct {
                        Some(c) => ConstructTarget::Native(c),
                        None => return Err(not_a_constructor()),
                    },
                    FunctionVariant::Bound(b) => ConstructTarget::Bound(
                        b.bound_target_function.clone(),
                        b.bound_arguments.clone(),
                    ),
                }
            }
        }
    };
    match target {
        ConstructTarget::Ordinary => ordinary_construct(ctx, f, args, new_target),
        ConstructTarget::Native(construct) => construct(ctx, args, new_target),
        ConstructTarget::Bound(bound_target, bound_args) => {
            let mut new_args = bound_args;
            new_args.extend(args);
            let new_target = if Rc::ptr_eq(&new_target, f) {
                bound_target.clone()
            } else {
                new_target
            };
            construct_function_object(ctx, &bound_target, new_args, Some(&new_target))
        }
    }
}

struct OrdinaryCallee {
    function_kind: FunctionKind,
    constructor_kind: ConstructorKind,
    this_mode: ThisMode,
    body: Rc<dyn FunctionBody>,
}

fn ordinary_callee(f: &JsObjectType) -> Result<OrdinaryCallee, JErrorType> {
    let o = f.borrow();
    match o.as_function_object().map(|fo| &fo.variant) {
        Some(FunctionVariant::Ordinary(d)) => Ok(OrdinaryCallee {
            function_kind: d.function_kind,
            constructor_kind: d.constructor_kind,
            this_mode: d.this_mode,
            body: d.body.clone(),
        }),
        _ => Err(JErrorType::TypeError(
            "Expected an ordinary function".to_string(),
        )),
    }
}

fn ordinary_call(
    ctx: &mut EvalContext,
    f: &JsObjectType,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let callee = ordinary_callee(f)?;
    if let FunctionKind::ClassConstructor = callee.function_kind {
        let name = f
            .borrow()
            .as_function_object()
            .map(|fo| fo.name())
            .unwrap_or_default();
        return Err(JErrorType::TypeError(format!(
            "Class constructor '{}' cannot be invoked without 'new'",
            name
        )));
    }
    let callee_context = prepare_for_ordinary_call(f, None)?;
    ordinary_call_bind_this(ctx, &callee_context, callee.this_mode, this)?;
    evaluate_body(ctx, f, callee_context, &callee.body, args)
}

fn ordinary_construct(
    ctx: &mut EvalContext,
    f: &JsObjectType,
    args: Vec<JsValue>,
    new_target: JsObjectType,
) -> Result<JsValue, JErrorType> {
    let callee = ordinary_callee(f)?;
    let this_argument = if let ConstructorKind::Base = callee.constructor_kind {
        Some(ordinary_create_from_constructor(
            ctx,
            &new_target,
            WellKnownIntrinsics::ObjectPrototype,
        )?)
    } else {
        None
    };
    let callee_context = prepare_for_ordinary_call(f, Some(new_target))?;
    let env = callee_context.lex_env.clone();
    if let Some(this_argument) = &this_argument {
        ordinary_call_bind_this(
            ctx,
            &callee_context,
            callee.this_mode,
            JsValue::Object(this_argument.clone()),
        )?;
    }
    let result = evaluate_body(ctx, f, callee_context, &callee.body, args)?;
    if let JsValue::Object(_) = result {
        return Ok(result);
    }
    if let Some(this_argument) = this_argument {
        return Ok(JsValue::Object(this_argument));
    }
    if !result.is_undefined() {
        return Err(JErrorType::TypeError(
            "Derived constructors may only return object or undefined".to_string(),
        ));
    }
    env.inner.as_env_record().get_this_binding(ctx)
}

fn evaluate_body(
    ctx: &mut EvalContext,
    f: &JsObjectType,
    callee_context: ExecutionContext,
    body: &Rc<dyn FunctionBody>,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let env = callee_context.lex_env.clone();
    ctx.ctx_stack.push_execution_ctx(callee_context);
    let result = body.evaluate(ctx, f, &env, args);
    ctx.ctx_stack.pop_running_execution_ctx();
    result
}

pub fn prepare_for_ordinary_call(
    f: &JsObjectType,
    new_target: Option<JsObjectType>,
) -> Result<ExecutionContext, JErrorType> {
    let local_env = new_function_environment(f.clone(), new_target)?;
    Ok(ExecutionContext {
        function: Some(f.clone()),
        var_env: local_env.clone(),
        lex_env: local_env,
    })
}

pub fn ordinary_call_bind_this(
    ctx: &EvalContext,
    callee_context: &ExecutionContext,
    this_mode: ThisMode,
    this_argument: JsValue,
) -> Result<(), JErrorType> {
    let this_value = match this_mode {
        ThisMode::Lexical => return Ok(()),
        ThisMode::Strict => this_argument,
        ThisMode::Global => {
            if this_argument.is_null_or_undefined() {
                JsValue::Object(ctx.realm.global_this.clone())
            } else {
                this_argument
            }
        }
    };
    match callee_context.lex_env.inner.as_function_env() {
        Some(f_env) => f_env.bind_this_value(this_value),
        None => Err(JErrorType::TypeError(
            "Function environment expected".to_string(),
        )),
    }
}
