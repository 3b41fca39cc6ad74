use crate::literal::{
    Sign,
    Variable,
};
use ahash::AHashSet;
use bounded::{
    BoundedHeap,
    Index as _,
};
use core::ops::Add;

/// Picks the next `(variable, polarity)` to branch on.
///
/// The variable must come from the solver's current set of unassigned
/// variables; the baseline contract is "pick any, try `true` first".
/// Implementations are free to track their own auxiliary state (e.g. a
/// priority queue bumped on conflicts) as long as they honor that contract.
pub trait DecisionPolicy {
    /// Registers newly introduced variables with the policy.
    ///
    /// Called once per `initiate`, with the *total* number of variables
    /// known so far (not just the delta), mirroring how the solver itself
    /// sizes its dense arrays.
    fn register_variables(&mut self, total_variables: usize);

    /// Chooses the next variable and polarity to decide on.
    ///
    /// # Panics
    ///
    /// Implementations may assume `unassigned` is non-empty; the solver only
    /// calls this while `variables_by_value[UNASSIGNED]` is non-empty.
    fn decide(&mut self, unassigned: &AHashSet<Variable>) -> (Variable, Sign);

    /// Informs the policy that a learnt clause blamed `variable` in a
    /// conflict, for heuristics that reward recently-conflicting variables.
    ///
    /// The baseline policy ignores this.
    fn bump(&mut self, _variable: Variable) {}
}

/// The baseline decision policy: picks an arbitrary unassigned variable and
/// always tries the positive polarity first.
#[derive(Debug, Default, Clone)]
pub struct ArbitraryDecisionPolicy;

impl DecisionPolicy for ArbitraryDecisionPolicy {
    fn register_variables(&mut self, _total_variables: usize) {}

    fn decide(&mut self, unassigned: &AHashSet<Variable>) -> (Variable, Sign) {
        let variable = *unassigned
            .iter()
            .next()
            .expect("decide called with no unassigned variables");
        (variable, Sign::POS)
    }
}

/// The priority of a variable used for branching decisions under
/// [`PriorityDecisionPolicy`].
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Priority(u64);

impl Add<u64> for Priority {
    type Output = Self;

    fn add(self, rhs: u64) -> Self::Output {
        Self(self.0 + rhs)
    }
}

/// A VSIDS-flavored decision policy: every variable carries a priority that
/// is bumped whenever conflict analysis blames it, and the policy always
/// proposes the highest-priority variable still unassigned.
#[derive(Debug, Default, Clone)]
pub struct PriorityDecisionPolicy {
    len_variables: usize,
    priorities: BoundedHeap<Variable, Priority>,
    bump_amount: u64,
}

impl PriorityDecisionPolicy {
    /// The priority increment applied to a variable each time it is blamed
    /// in conflict analysis.
    const DEFAULT_BUMP_AMOUNT: u64 = 1;

    pub fn new() -> Self {
        Self {
            bump_amount: Self::DEFAULT_BUMP_AMOUNT,
            ..Default::default()
        }
    }
}

impl DecisionPolicy for PriorityDecisionPolicy {
    fn register_variables(&mut self, total_variables: usize) {
        if total_variables <= self.len_variables {
            return
        }
        self.priorities.resize_capacity(total_variables);
        for i in self.len_variables..total_variables {
            let variable = Variable::from_index(i);
            self.priorities
                .push_or_update(variable, core::convert::identity)
                .expect("freshly resized heap rejected a variable within capacity");
        }
        self.len_variables = total_variables;
    }

    fn decide(&mut self, unassigned: &AHashSet<Variable>) -> (Variable, Sign) {
        // Already-assigned entries are only popped off the heap transiently:
        // a variable can become unassigned again after a backjump, at which
        // point it must still be a candidate, so every popped entry is
        // restored with its weight intact before returning, not just the
        // one actually chosen.
        let mut skipped = Vec::new();
        let chosen = loop {
            let (variable, priority) = self
                .priorities
                .pop()
                .expect("decide called with no unassigned variables");
            if unassigned.contains(&variable) {
                break (variable, priority)
            }
            // Already assigned by some other means (e.g. unit propagation);
            // stash it and keep looking, restoring it below.
            skipped.push((variable, priority));
        };
        for (variable, priority) in skipped {
            self.priorities
                .push_or_update(variable, move |_| priority)
                .expect("re-inserting a just-popped variable cannot go out of bounds");
        }
        self.priorities
            .push_or_update(chosen.0, move |_| chosen.1)
            .expect("re-inserting a just-popped variable cannot go out of bounds");
        (chosen.0, Sign::POS)
    }

    fn bump(&mut self, variable: Variable) {
        let amount = self.bump_amount;
        self.priorities
            .push_or_update(variable, |old| old + amount)
            .expect("bumping a registered variable cannot go out of bounds");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bounded::Index;

    fn var(n: usize) -> Variable {
        Variable::from_index(n)
    }

    #[test]
    fn arbitrary_policy_picks_true_polarity() {
        let mut policy = ArbitraryDecisionPolicy;
        let mut unassigned = AHashSet::default();
        unassigned.insert(var(0));
        let (variable, sign) = policy.decide(&unassigned);
        assert_eq!(variable, var(0));
        assert_eq!(sign, Sign::POS);
    }

    #[test]
    fn decide_restores_skipped_entries_for_later_reselection() {
        let mut policy = PriorityDecisionPolicy::new();
        policy.register_variables(2);
        policy.bump(var(1));

        // var(1) outranks var(0) but is not a candidate yet (e.g. already
        // assigned); decide() must skip over it without losing it from the
        // heap.
        let mut unassigned = AHashSet::default();
        unassigned.insert(var(0));
        let (chosen, _) = policy.decide(&unassigned);
        assert_eq!(chosen, var(0));

        // var(1) becomes a candidate again (e.g. unassigned by a backjump);
        // it must still be selectable instead of having been dropped.
        unassigned.insert(var(1));
        let (chosen, _) = policy.decide(&unassigned);
        assert_eq!(chosen, var(1));
    }

    #[test]
    fn priority_policy_prefers_bumped_variable() {
        let mut policy = PriorityDecisionPolicy::new();
        policy.register_variables(3);
        policy.bump(var(2));
        policy.bump(var(2));
        let mut unassigned = AHashSet::default();
        unassigned.insert(var(0));
        unassigned.insert(var(1));
        unassigned.insert(var(2));
        let (variable, _sign) = policy.decide(&unassigned);
        assert_eq!(variable, var(2));
    }
}
