use crate::runner::ds::heap::{Heap, HeapConfig};
use crate::runner::ds::lex_env::JsLexEnvironmentType;
use crate::runner::ds::object::JsObjectType;
use crate::runner::ds::realm::{CodeRealm, JsCodeRealmType};
use std::rc::Rc;

pub struct ExecutionContext {
    pub function: Option<JsObjectType>,
    pub lex_env: JsLexEnvironmentType,
    pub var_env: JsLexEnvironmentType,
}

pub struct ExecutionContextStack {
    stack: Vec<ExecutionContext>,
}
impl ExecutionContextStack {
    pub fn new() -> Self {
        ExecutionContextStack { stack: Vec::new() }
    }

    pub fn get_running_execution_ctx(&self) -> Option<&ExecutionContext> {
        self.stack.last()
    }

    pub fn pop_running_execution_ctx(&mut self) -> Option<ExecutionContext> {
        self.stack.pop()
    }

    pub fn push_execution_ctx(&mut self, ctx: ExecutionContext) {
        self.stack.push(ctx)
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}
impl Default for ExecutionContextStack {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything the runtime operations need: the realm, the heap and the stack of running
/// execution contexts. Passed explicitly to every operation that may run user code.
pub struct EvalContext {
    pub realm: JsCodeRealmType,
    pub heap: Heap,
    pub ctx_stack: ExecutionContextStack,
}
impl EvalContext {
    pub fn new() -> Self {
        Self::with_heap_config(HeapConfig::default())
    }

    pub fn with_heap_config(config: HeapConfig) -> Self {
        EvalContext {
            realm: Rc::new(CodeRealm::new()),
            heap: Heap::new(config),
            ctx_stack: ExecutionContextStack::new(),
        }
    }

    /// The lexical environment of the running execution context, or the global environment
    /// when nothing is running.
    pub fn running_lex_env(&self) -> JsLexEnvironmentType {
        match self.ctx_stack.get_running_execution_ctx() {
            Some(c) => c.lex_env.clone(),
            None => self.realm.global_env.clone(),
        }
    }
}
impl Default for EvalContext {
    fn default() -> Self {
        Self::new()
    }
}
