use crate::{
    ids::ClauseId,
    literal::{
        Sign,
        Variable,
    },
    propagation_queue::PropagationQueue,
    value::{
        literal_value,
        VariableValue,
        VALUES,
    },
};
use ahash::{
    AHashMap,
    AHashSet,
};

/// A disjunction of literals.
///
/// Tracks, for every literal value, the set of variables whose literal
/// currently carries that value. These `by_value` buckets are a derived
/// index: every mutation to a variable's value must be mirrored here via
/// [`Clause::assign`] or [`Clause::reset`] before the global value changes.
#[derive(Debug, Clone)]
pub struct Clause {
    id: ClauseId,
    literals: AHashMap<Variable, Sign>,
    by_value: [AHashSet<Variable>; 3],
}

impl Clause {
    /// Creates a new, empty clause with the given identifier.
    pub fn new(id: ClauseId) -> Self {
        Self {
            id,
            literals: AHashMap::default(),
            by_value: Default::default(),
        }
    }

    /// Returns the identifier of this clause.
    #[inline]
    pub fn id(&self) -> ClauseId {
        self.id
    }

    /// Inserts a literal for `variable` with the given `sign`, given the
    /// variable's `current_value`.
    ///
    /// Returns `true` if the literal was accepted (inserted, or absorbed as
    /// a same-polarity duplicate). Returns `false` if `variable` is already
    /// present with the opposite polarity: the clause is a tautology and the
    /// caller must discard it in its entirety without registering it.
    ///
    /// Only meaningful during clause construction; never called again once
    /// the clause has been handed to the solver's propagation machinery.
    pub fn add_literal(
        &mut self,
        variable: Variable,
        sign: Sign,
        current_value: VariableValue,
    ) -> bool {
        match self.literals.get(&variable) {
            Some(&existing) if existing == sign => true,
            Some(_) => false,
            None => {
                self.literals.insert(variable, sign);
                let bucket = literal_value(current_value, sign);
                let is_new = self.by_value[bucket.bucket()].insert(variable);
                debug_assert!(is_new, "variable already present in a by_value bucket");
                true
            }
        }
    }

    /// Moves `variable` between buckets, recomputing each bucket from the
    /// literal's sign and the given `from`/`to` variable values.
    ///
    /// Never reads the variable's *current* global value: the caller is
    /// responsible for supplying `from` before the global value changes and
    /// `to` as the value it is about to become.
    fn change_assignment(&mut self, variable: Variable, from: VariableValue, to: VariableValue) {
        let sign = *self
            .literals
            .get(&variable)
            .expect("change_assignment called for a variable not in this clause");
        let from_bucket = literal_value(from, sign).bucket();
        let to_bucket = literal_value(to, sign).bucket();
        let removed = self.by_value[from_bucket].remove(&variable);
        debug_assert!(removed, "variable missing from its expected bucket");
        let inserted = self.by_value[to_bucket].insert(variable);
        debug_assert!(inserted, "variable already present in destination bucket");
    }

    /// Notifies the clause that `variable` has just been assigned `value`,
    /// moving from `Unassigned`.
    ///
    /// If the clause becomes unit as a result, its own id is pushed onto
    /// `queue`. This never removes stale entries already in the queue; the
    /// propagator re-validates every entry it drains.
    ///
    /// Returns `false` iff the clause is now in conflict.
    pub fn assign(&mut self, variable: Variable, value: bool, queue: &mut PropagationQueue) -> bool {
        self.change_assignment(variable, VariableValue::Unassigned, VariableValue::from_bool(value));
        if self.to_decide_num() == 1 {
            queue.push(self.id);
        }
        !self.is_conflict()
    }

    /// Notifies the clause that `variable`, currently holding `old_value`,
    /// is about to be reset to `Unassigned`.
    ///
    /// Does not touch the propagation queue.
    pub fn reset(&mut self, variable: Variable, old_value: VariableValue) {
        self.change_assignment(variable, old_value, VariableValue::Unassigned);
    }

    /// Returns `true` iff every literal of this clause is `FALSE`.
    #[inline]
    pub fn is_conflict(&self) -> bool {
        self.by_value[VariableValue::Unassigned.bucket()].is_empty()
            && self.by_value[VariableValue::True.bucket()].is_empty()
    }

    /// Returns the clause's own value: `TRUE` if any literal is `TRUE`, else
    /// `UNASSIGNED` if any is `UNASSIGNED`, else `FALSE`.
    pub fn value(&self) -> VariableValue {
        if !self.by_value[VariableValue::True.bucket()].is_empty() {
            VariableValue::True
        } else if !self.by_value[VariableValue::Unassigned.bucket()].is_empty() {
            VariableValue::Unassigned
        } else {
            VariableValue::False
        }
    }

    /// Returns the number of literals still needed to decide this clause: `0`
    /// if already satisfied, otherwise the number of unassigned literals.
    pub fn to_decide_num(&self) -> usize {
        if !self.by_value[VariableValue::True.bucket()].is_empty() {
            0
        } else {
            self.by_value[VariableValue::Unassigned.bucket()].len()
        }
    }

    /// Returns the set of variables whose literal currently has value `v`.
    pub fn literals_by_value(&self, v: VariableValue) -> &AHashSet<Variable> {
        &self.by_value[v.bucket()]
    }

    /// Returns the sign of the literal over `variable` in this clause.
    ///
    /// # Panics
    ///
    /// If `variable` does not appear in this clause.
    pub fn literal(&self, variable: Variable) -> Sign {
        self.literals[&variable]
    }

    /// Returns an iterator over the `(variable, sign)` pairs of this clause.
    pub fn iter(&self) -> impl Iterator<Item = (Variable, Sign)> + '_ {
        self.literals.iter().map(|(&var, &sign)| (var, sign))
    }

    /// Returns the number of literals in this clause.
    pub fn len(&self) -> usize {
        self.literals.len()
    }

    /// Returns `true` if this clause has no literals.
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }
}
