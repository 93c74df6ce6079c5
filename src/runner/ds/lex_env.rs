use crate::runner::ds::env_record::EnvironmentRecordType;
use std::rc::Rc;

pub type JsLexEnvironmentType = Rc<LexEnvironment>;

/// One link of the scope chain. The chain is immutable once built; records mutate their
/// bindings through interior mutability.
pub struct LexEnvironment {
    pub inner: EnvironmentRecordType,
    pub outer: Option<JsLexEnvironmentType>,
}
