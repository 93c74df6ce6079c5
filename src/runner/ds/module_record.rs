//! Minimal view of a module needed by import bindings.

use std::rc::Rc;

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::execution_context::EvalContext;
use crate::runner::ds::lex_env::JsLexEnvironmentType;
use crate::runner::ds::value::JsValue;

pub type JsModuleType = Rc<dyn ModuleRecord>;

/// A module whose exported bindings can be read by other modules.
pub trait ModuleRecord {
    fn get_binding_value(
        &self,
        ctx: &mut EvalContext,
        name: &str,
        strict: bool,
    ) -> Result<JsValue, JErrorType>;
}

/// A module that has been linked to its own module environment. Exports are the bindings of
/// that environment under the same name.
pub struct LinkedModule {
    environment: JsLexEnvironmentType,
}
impl LinkedModule {
    pub fn new(environment: JsLexEnvironmentType) -> Self {
        LinkedModule { environment }
    }

    pub fn environment(&self) -> &JsLexEnvironmentType {
        &self.environment
    }
}
impl ModuleRecord for LinkedModule {
    fn get_binding_value(
        &self,
        ctx: &mut EvalContext,
        name: &str,
        strict: bool,
    ) -> Result<JsValue, JErrorType> {
        self.environment
            .inner
            .as_env_record()
            .get_binding_value(ctx, name, strict)
    }
}
