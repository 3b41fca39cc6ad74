use crate::{
    ids::ClauseId,
    value::VariableValue,
};
use ahash::AHashSet;

/// The mutable, per-variable bookkeeping the solver keeps alongside the
/// dense [`crate::literal::Variable`] index.
#[derive(Debug, Clone)]
pub struct VariableRecord {
    pub(crate) value: VariableValue,
    pub(crate) clauses: AHashSet<ClauseId>,
    original_name: u64,
}

impl VariableRecord {
    pub(crate) fn new(original_name: u64) -> Self {
        Self {
            value: VariableValue::Unassigned,
            clauses: AHashSet::default(),
            original_name,
        }
    }

    /// The external identifier this variable was registered under.
    pub fn original_name(&self) -> u64 {
        self.original_name
    }

    /// The variable's current value.
    pub fn value(&self) -> VariableValue {
        self.value
    }
}
