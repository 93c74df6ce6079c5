use crate::runner::ds::error::JErrorType;
use crate::runner::ds::execution_context::EvalContext;
use crate::runner::ds::lex_env::JsLexEnvironmentType;
use crate::runner::ds::object_property::PropertyKey;
use crate::runner::ds::operations::object::set;
use crate::runner::ds::value::JsValue;

pub enum ReferenceBase {
    Environment(JsLexEnvironmentType),
    Unresolvable,
}

/// A Reference Record whose base is an environment (or nothing).
pub struct IdentifierReference {
    pub base: ReferenceBase,
    pub name: String,
    pub strict: bool,
}
impl IdentifierReference {
    pub fn is_unresolvable_reference(&self) -> bool {
        matches!(self.base, ReferenceBase::Unresolvable)
    }

    pub fn get_value(&self, ctx: &mut EvalContext) -> Result<JsValue, JErrorType> {
        match &self.base {
            ReferenceBase::Unresolvable => Err(JErrorType::ReferenceError(format!(
                "'{}' is not defined",
                self.name
            ))),
            ReferenceBase::Environment(env) => {
                env.inner
                    .as_env_record()
                    .get_binding_value(ctx, &self.name, self.strict)
            }
        }
    }

    /// PutValue. An unresolvable name becomes a property of the global object unless the
    /// reference is strict.
    pub fn put_value(&self, ctx: &mut EvalContext, v: JsValue) -> Result<(), JErrorType> {
        match &self.base {
            ReferenceBase::Unresolvable => {
                if self.strict {
                    return Err(JErrorType::ReferenceError(format!(
                        "'{}' is not defined",
                        self.name
                    )));
                }
                let global = ctx.realm.global_this.clone();
                set(ctx, &global, PropertyKey::from(self.name.as_str()), v, false)?;
                Ok(())
            }
            ReferenceBase::Environment(env) => {
                env.inner
                    .as_env_record()
                    .set_mutable_binding(ctx, &self.name, v, self.strict)
            }
        }
    }

    /// `this` to use when the reference is called: the binding object of a `with`
    /// environment, otherwise undefined.
    pub fn get_this_value(&self) -> JsValue {
        match &self.base {
            ReferenceBase::Environment(env) => match env.inner.as_env_record().with_base_object() {
                Some(o) => JsValue::Object(o),
                None => JsValue::Undefined,
            },
            ReferenceBase::Unresolvable => JsValue::Undefined,
        }
    }
}

/// GetIdentifierReference. Walks outward from `lex` until some record has `name`.
pub fn get_identifier_reference(
    ctx: &mut EvalContext,
    lex: Option<JsLexEnvironmentType>,
    name: &str,
    strict: bool,
) -> Result<IdentifierReference, JErrorType> {
    let mut current = lex;
    while let Some(env) = current {
        if env.inner.as_env_record().has_binding(ctx, name)? {
            return Ok(IdentifierReference {
                base: ReferenceBase::Environment(env),
                name: name.to_string(),
                strict,
            });
        }
        current = env.outer.clone();
    }
    Ok(IdentifierReference {
        base: ReferenceBase::Unresolvable,
        name: name.to_string(),
        strict,
    })
}

/// ResolveBinding against the running execution context.
pub fn resolve_binding(
    ctx: &mut EvalContext,
    name: &str,
    strict: bool,
) -> Result<IdentifierReference, JErrorType> {
    let env = ctx.running_lex_env();
    get_identifier_reference(ctx, Some(env), name, strict)
}

/// Non-throwing resolution used by `typeof`. `None` when the name is unresolvable; an
/// uninitialized binding is still a ReferenceError.
pub fn try_resolve_binding_value(
    ctx: &mut EvalContext,
    lex: Option<JsLexEnvironmentType>,
    name: &str,
    strict: bool,
) -> Result<Option<JsValue>, JErrorType> {
    let mut current = lex;
    while let Some(env) = current {
        let record = env.inner.as_env_record();
        if let Some((_, value)) = record.try_get_binding(ctx, name, strict)? {
            return Ok(Some(value));
        }
        if record.has_binding(ctx, name)? {
            return Err(JErrorType::ReferenceError(format!(
                "Cannot access '{}' before initialization",
                name
            )));
        }
        current = env.outer.clone();
    }
    Ok(None)
}

/// GetThisEnvironment
pub fn get_this_environment(ctx: &EvalContext) -> JsLexEnvironmentType {
    let mut env = ctx.running_lex_env();
    loop {
        if env.inner.as_env_record().has_this_binding() {
            return env;
        }
        match env.outer.clone() {
            Some(outer) => env = outer,
            None => return env,
        }
    }
}

/// ResolveThisBinding
pub fn resolve_this_binding(ctx: &mut EvalContext) -> Result<JsValue, JErrorType> {
    let env = get_this_environment(ctx);
    env.inner.as_env_record().get_this_binding(ctx)
}
