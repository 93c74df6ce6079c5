use std::fmt;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use uuid::Uuid;

/// A symbol value. Identity is the generated id, never the description, so two symbols
/// created with the same description are still distinct.
#[derive(Clone, Debug)]
pub struct SymbolData {
    id: Uuid,
    description: Option<String>,
}

impl SymbolData {
    pub fn new(description: String) -> Self {
        SymbolData {
            id: Uuid::new_v4(),
            description: Some(description),
        }
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Name used when a function is keyed by this symbol, e.g. `[Symbol.species]`.
    pub fn function_name(&self) -> String {
        match &self.description {
            None => String::new(),
            Some(d) => format!("[{}]", d),
        }
    }
}
impl PartialEq for SymbolData {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for SymbolData {}
impl Hash for SymbolData {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
impl Display for SymbolData {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.description.as_deref().unwrap_or(""))
    }
}

/* Well known symbols */
lazy_static! {
    pub static ref SYMBOL_SPECIES: SymbolData = SymbolData::new("Symbol.species".to_string());
    pub static ref SYMBOL_TO_PRIMITIVE: SymbolData =
        SymbolData::new("Symbol.toPrimitive".to_string());
    pub static ref SYMBOL_TO_STRING_TAG: SymbolData =
        SymbolData::new("Symbol.toStringTag".to_string());
    pub static ref SYMBOL_UNSCOPABLES: SymbolData =
        SymbolData::new("Symbol.unscopables".to_string());
}
