use crate::{
    clause::Clause,
    ids::ClauseId,
    literal::Variable,
};
use ahash::{
    AHashMap,
    AHashSet,
};
use std::collections::BTreeSet;

/// The count of decisions made so far along the current search path.
///
/// Level `0` means no decision has been made yet; the first decision pushes
/// level `1`.
pub type DecisionLevel = usize;

/// A single entry on the implication graph's stack.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Node {
    pub variable: Variable,
    pub decision_level: DecisionLevel,
    /// `None` for a decision node, `Some(clause)` for a node forced by unit
    /// propagation of `clause`.
    pub derive_from: Option<ClauseId>,
}

impl Node {
    #[inline]
    pub fn is_decision(&self) -> bool {
        self.derive_from.is_none()
    }
}

/// The ordered stack of decision and propagated nodes, together with the
/// indices needed to run 1-UIP conflict analysis and non-chronological
/// backjump.
#[derive(Debug, Default, Clone)]
pub struct ImplicationGraph {
    stack: Vec<Node>,
    /// `decision_points[i]` is the stack index of the decision node that
    /// opened decision level `i + 1`.
    decision_points: Vec<usize>,
    var2pos: AHashMap<Variable, usize>,
}

impl ImplicationGraph {
    /// Returns the current decision level.
    #[inline]
    pub fn decision_level(&self) -> DecisionLevel {
        self.decision_points.len()
    }

    /// Returns the number of nodes on the stack.
    #[inline]
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Returns the node at the given stack index.
    #[inline]
    pub fn get(&self, pos: usize) -> Node {
        self.stack[pos]
    }

    /// Returns the topmost node on the stack.
    ///
    /// # Panics
    ///
    /// If the stack is empty.
    pub fn back(&self) -> Node {
        *self.stack.last().expect("implication graph stack is empty")
    }

    /// Returns the stack position of `variable`, if it is currently assigned.
    pub fn position_of(&self, variable: Variable) -> Option<usize> {
        self.var2pos.get(&variable).copied()
    }

    /// Pushes a new decision node for `variable`, opening a new decision
    /// level.
    pub fn push_decision(&mut self, variable: Variable) {
        self.decision_points.push(self.stack.len());
        let decision_level = self.decision_level();
        self.var2pos.insert(variable, self.stack.len());
        self.stack.push(Node {
            variable,
            decision_level,
            derive_from: None,
        });
    }

    /// Pushes a node for `variable` forced by unit propagation of `clause`,
    /// tagged with the current decision level.
    pub fn push_propagated(&mut self, variable: Variable, clause: ClauseId) {
        let decision_level = self.decision_level();
        self.var2pos.insert(variable, self.stack.len());
        self.stack.push(Node {
            variable,
            decision_level,
            derive_from: Some(clause),
        });
    }

    /// Pops the topmost node, closing its decision level if it was a
    /// decision node.
    ///
    /// # Panics
    ///
    /// If the stack is empty.
    pub fn pop(&mut self) -> Node {
        let node = self.stack.pop().expect("cannot pop from empty stack");
        if node.is_decision() {
            let opened_at = self
                .decision_points
                .pop()
                .expect("decision node without a matching decision point");
            debug_assert_eq!(opened_at, self.stack.len());
        }
        self.var2pos.remove(&node.variable);
        node
    }

    /// Runs 1-UIP conflict analysis over the clause at `conflict_clause`
    /// (looked up via `clauses`, indexed by [`ClauseId::into_index`]), which
    /// must currently have every literal `FALSE`.
    ///
    /// Returns a list of stack positions whose first element is the First
    /// Unique Implication Point and whose remaining elements (in arbitrary
    /// order) are the other reason nodes, all at strictly lower decision
    /// levels. If the result is `[0]` and `stack[0]` is not a decision node,
    /// the formula is unsatisfiable.
    pub fn conflict_analysis(&self, conflict_clause: ClauseId, clauses: &[Clause]) -> Vec<usize> {
        let level = self.decision_level();
        let clause_at = |id: ClauseId| &clauses[id.into_index()];

        // Nodes at the current decision level are visited in descending
        // stack-position order so that the most recently derived node is
        // always resolved next; `other_DL` nodes are deduplicated by a set
        // since the same node can be reached through multiple resolution
        // steps.
        let mut cur_dl: BTreeSet<usize> = BTreeSet::new();
        let mut other_dl: AHashSet<usize> = AHashSet::new();

        let mut classify = |pos: usize, cur_dl: &mut BTreeSet<usize>, other_dl: &mut AHashSet<usize>| {
            if self.stack[pos].decision_level == level {
                cur_dl.insert(pos);
            } else {
                other_dl.insert(pos);
            }
        };

        for (variable, _sign) in clause_at(conflict_clause).iter() {
            let pos = self
                .position_of(variable)
                .expect("conflict clause references an unassigned variable");
            classify(pos, &mut cur_dl, &mut other_dl);
        }
        assert!(!cur_dl.is_empty(), "conflict has no node at the current decision level");

        while cur_dl.len() > 1 {
            let pos = *cur_dl
                .iter()
                .next_back()
                .expect("cur_dl is non-empty by loop condition");
            cur_dl.remove(&pos);
            let node = self.stack[pos];
            let reason_clause_id = node
                .derive_from
                .expect("a node resolved away from cur_DL must be a propagated node, not a decision");
            for (variable, _sign) in clause_at(reason_clause_id).iter() {
                if variable == node.variable {
                    continue
                }
                let pos = self
                    .position_of(variable)
                    .expect("reason clause references an unassigned variable");
                classify(pos, &mut cur_dl, &mut other_dl);
            }
        }
        assert_eq!(cur_dl.len(), 1, "conflict analysis must converge on exactly one UIP");

        let mut result = Vec::with_capacity(1 + other_dl.len());
        result.extend(cur_dl.into_iter());
        result.extend(other_dl.into_iter());
        result
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
    fn push_decision_advances_level() {
        let mut graph = ImplicationGraph::default();
        assert_eq!(graph.decision_level(), 0);
        graph.push_decision(var(0));
        assert_eq!(graph.decision_level(), 1);
        assert!(graph.back().is_decision());
    }

    #[test]
    fn push_propagated_keeps_level() {
        let mut graph = ImplicationGraph::default();
        graph.push_decision(var(0));
        graph.push_propagated(var(1), ClauseId::from_index(0));
        assert_eq!(graph.decision_level(), 1);
        assert!(!graph.back().is_decision());
    }

    #[test]
    fn pop_closes_decision_level() {
        let mut graph = ImplicationGraph::default();
        graph.push_decision(var(0));
        graph.push_propagated(var(1), ClauseId::from_index(0));
        graph.pop();
        assert_eq!(graph.decision_level(), 1);
        graph.pop();
        assert_eq!(graph.decision_level(), 0);
        assert!(graph.is_empty());
    }

    #[test]
    fn position_of_tracks_and_forgets() {
        let mut graph = ImplicationGraph::default();
        graph.push_decision(var(0));
        assert_eq!(graph.position_of(var(0)), Some(0));
        graph.pop();
        assert_eq!(graph.position_of(var(0)), None);
    }

    #[test]
    fn conflict_analysis_is_deterministic_across_repeated_calls() {
        use crate::{
            literal::Sign,
            value::VariableValue,
        };

        // x0 (decision) implies x1 via `reason`; `conflict` then falsifies
        // both literals, so conflict analysis must resolve to {x0} (the
        // decision itself is the 1-UIP since x1 is the only other node at
        // the current level and it is immediately resolved away).
        let mut reason = Clause::new(ClauseId::from_index(0));
        reason.add_literal(var(0), Sign::NEG, VariableValue::Unassigned);
        reason.add_literal(var(1), Sign::POS, VariableValue::Unassigned);

        let mut conflict = Clause::new(ClauseId::from_index(1));
        conflict.add_literal(var(0), Sign::NEG, VariableValue::Unassigned);
        conflict.add_literal(var(1), Sign::NEG, VariableValue::Unassigned);

        let clauses = vec![reason, conflict];

        let mut graph = ImplicationGraph::default();
        graph.push_decision(var(0));
        graph.push_propagated(var(1), ClauseId::from_index(0));

        let first = graph.conflict_analysis(ClauseId::from_index(1), &clauses);
        let second = graph.conflict_analysis(ClauseId::from_index(1), &clauses);
        assert_eq!(first, second);
        assert_eq!(first, vec![0]);
    }
}
