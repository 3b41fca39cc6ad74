#![deny(unsafe_code)]
#![warn(unsafe_op_in_unsafe_fn)]
#![allow(clippy::len_without_is_empty)]

mod builder;
mod clause;
mod decider;
mod error;
mod ids;
mod implication_graph;
mod literal;
mod model;
mod propagation_queue;
mod stats;
mod value;
mod variable;


use crate::{
    clause::Clause,
    ids::ClauseId,
    implication_graph::ImplicationGraph,
    propagation_queue::PropagationQueue,
    value::VariableValue,
    variable::VariableRecord,
};
use ahash::AHashMap;
use bounded::{
    Bool,
    Index as _,
};
use core::fmt;
use log::debug;
use std::time::Instant;

pub use crate::{
    builder::{
        parse_dimacs,
        parse_dimacs_with_solver,
        DimacsBuilder,
    },
    decider::{
        ArbitraryDecisionPolicy,
        DecisionPolicy,
        PriorityDecisionPolicy,
    },
    error::{
        DimacsError,
        SolverError,
    },
    literal::{
        Sign,
        Variable,
    },
    model::Model,
    stats::Statistics,
};

/// The solver instance: the mutable index of clauses, variables and literal
/// values, the propagation queue, and the implication graph, driven by a
/// pluggable [`DecisionPolicy`].
///
/// A single instance supports one `initiate` + `solve` cycle; there is no
/// incremental solving API.
pub struct Solver {
    variables: Vec<VariableRecord>,
    name_to_variable: AHashMap<u64, Variable>,
    clauses: Vec<Clause>,
    variables_by_value: [ahash::AHashSet<Variable>; 3],
    propagation_queue: PropagationQueue,
    implication_graph: ImplicationGraph,
    decider: Box<dyn DecisionPolicy>,
    last_model: Option<Model>,
    stats: Statistics,
    /// Set once ingestion produces a clause that can never be satisfied:
    /// either the empty clause, or a unit clause whose literal is
    /// immediately found in conflict with another unit clause's buckets
    /// during propagation. `solve` short-circuits to UNSAT without
    /// entering the main loop.
    unsat: bool,
}

impl fmt::Debug for Solver {
    /// The decision policy is a trait object and opts out of `Debug`;
    /// summarize the solver by its sizes and search progress instead.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Solver")
            .field("len_variables", &self.variables.len())
            .field("len_clauses", &self.clauses.len())
            .field("decision_level", &self.implication_graph.decision_level())
            .field("unsat", &self.unsat)
            .finish()
    }
}

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver {
    /// Creates a new, empty solver using the baseline [`ArbitraryDecisionPolicy`].
    pub fn new() -> Self {
        Self::with_decider(ArbitraryDecisionPolicy)
    }

    /// Creates a new, empty solver using the given [`DecisionPolicy`].
    pub fn with_decider<D>(decider: D) -> Self
    where
        D: DecisionPolicy + 'static,
    {
        Self {
            variables: Vec::new(),
            name_to_variable: AHashMap::default(),
            clauses: Vec::new(),
            variables_by_value: Default::default(),
            propagation_queue: PropagationQueue::default(),
            implication_graph: ImplicationGraph::default(),
            decider: Box::new(decider),
            last_model: None,
            stats: Statistics::default(),
            unsat: false,
        }
    }

    /// Returns the number of currently registered variables.
    pub fn len_variables(&self) -> usize {
        self.variables.len()
    }

    /// Returns the number of clauses currently in the solver's arena,
    /// including any learnt clauses appended since the last `solve`.
    ///
    /// This reflects clauses actually stored, not the count from a DIMACS
    /// `p cnf` header: tautological input clauses are discarded at
    /// ingestion and never counted here.
    pub fn len_clauses(&self) -> usize {
        self.clauses.len()
    }

    /// Looks up the dense [`Variable`] for `name`, registering a fresh one
    /// in `UNASSIGNED` state on first appearance.
    fn register_variable(&mut self, name: u64) -> Variable {
        if let Some(&variable) = self.name_to_variable.get(&name) {
            return variable
        }
        let index = self.variables.len();
        let variable =
            Variable::try_from_index(index).expect("exceeded the maximum number of supported variables");
        self.variables.push(VariableRecord::new(name));
        self.name_to_variable.insert(name, variable);
        let inserted = self.variables_by_value[VariableValue::Unassigned.bucket()].insert(variable);
        debug_assert!(inserted, "freshly registered variable already tracked as unassigned");
        self.decider.register_variables(self.variables.len());
        variable
    }

    /// Ingests a sequence of clauses, each a finite sequence of
    /// `(polarity, variable_name)` pairs. Polarity `true` means the
    /// positive literal.
    ///
    /// Variables are allocated dense ids on first appearance. Clauses that
    /// are tautological (the same variable with both polarities) are
    /// discarded; clauses that are unit after construction are queued for
    /// propagation when `solve` runs.
    pub fn initiate<I, C>(&mut self, clauses: I)
    where
        I: IntoIterator<Item = C>,
        C: IntoIterator<Item = (bool, u64)>,
    {
        for clause in clauses {
            self.add_clause(clause);
        }
    }

    /// Ingests a single clause. See [`Solver::initiate`].
    pub fn add_clause<C>(&mut self, literals: C)
    where
        C: IntoIterator<Item = (bool, u64)>,
    {
        let clause_id = ClauseId::from_index(self.clauses.len());
        let mut clause = Clause::new(clause_id);
        let mut touched = Vec::new();
        let mut is_tautology = false;
        for (polarity, name) in literals {
            let variable = self.register_variable(name);
            let current_value = self.variables[variable.into_index()].value;
            let sign = Sign::from_bool(polarity);
            if !clause.add_literal(variable, sign, current_value) {
                is_tautology = true;
                break
            }
            touched.push(variable);
        }
        if is_tautology {
            return
        }
        if clause.is_empty() {
            self.unsat = true;
            return
        }
        for &variable in &touched {
            let newly_referenced = self.variables[variable.into_index()].clauses.insert(clause_id);
            debug_assert!(newly_referenced, "clause referenced the same variable twice");
        }
        let is_unit = clause.to_decide_num() == 1;
        let is_conflict = clause.is_conflict();
        self.clauses.push(clause);
        if is_conflict {
            self.unsat = true;
        }
        if is_unit {
            self.propagation_queue.push(clause_id);
        }
    }

    /// Notifies every clause referencing `variable` that it has just been
    /// assigned `value`, then updates the global value.
    ///
    /// Returns the first clause observed in conflict, if any. Every
    /// referencing clause is still visited after a conflict is found, to
    /// keep the derived `by_value` indices consistent.
    fn assign(&mut self, variable: Variable, value: bool) -> Option<ClauseId> {
        let index = variable.into_index();
        debug_assert!(
            self.variables[index].value.is_unassigned(),
            "assign called for an already-assigned variable"
        );
        let unassigned_bucket = VariableValue::Unassigned.bucket();
        let target_bucket = VariableValue::from_bool(value).bucket();
        let removed = self.variables_by_value[unassigned_bucket].remove(&variable);
        debug_assert!(removed);
        let inserted = self.variables_by_value[target_bucket].insert(variable);
        debug_assert!(inserted);

        // Swap the variable's clause set out so the loop below can borrow
        // `self.clauses` mutably without also holding a borrow of
        // `self.variables`.
        let referenced_clauses = core::mem::take(&mut self.variables[index].clauses);
        let mut conflict = None;
        for &clause_id in &referenced_clauses {
            let still_consistent =
                self.clauses[clause_id.into_index()].assign(variable, value, &mut self.propagation_queue);
            if !still_consistent && conflict.is_none() {
                conflict = Some(clause_id);
            }
        }
        self.variables[index].clauses = referenced_clauses;
        self.variables[index].value = VariableValue::from_bool(value);
        conflict
    }

    /// The inverse of [`Solver::assign`]: notifies every clause referencing
    /// `variable` that it is about to return to `UNASSIGNED`.
    fn reset(&mut self, variable: Variable) {
        let index = variable.into_index();
        let old_value = self.variables[index].value;
        debug_assert!(!old_value.is_unassigned(), "reset called for an unassigned variable");
        let old_bucket = old_value.bucket();
        let removed = self.variables_by_value[old_bucket].remove(&variable);
        debug_assert!(removed);

        let referenced_clauses = core::mem::take(&mut self.variables[index].clauses);
        for &clause_id in &referenced_clauses {
            self.clauses[clause_id.into_index()].reset(variable, old_value);
        }
        self.variables[index].clauses = referenced_clauses;

        self.variables[index].value = VariableValue::Unassigned;
        let inserted = self.variables_by_value[VariableValue::Unassigned.bucket()].insert(variable);
        debug_assert!(inserted);
    }

    /// Drains the propagation queue, assigning forced literals until it is
    /// empty or a conflict is found.
    ///
    /// Every drained entry is re-validated: it may already be satisfied, or
    /// may no longer be unit, since the queue is never eagerly cleaned up.
    fn unit_propagate(&mut self) -> Option<ClauseId> {
        while let Some(clause_id) = self.propagation_queue.pop_front() {
            let clause = &self.clauses[clause_id.into_index()];
            if clause.value() != VariableValue::Unassigned {
                // Already satisfied, or (unreachable here, see below) in
                // conflict: conflicts are always detected at the moment of
                // the assignment that causes them, never rediscovered by
                // draining a stale queue entry.
                continue
            }
            if clause.to_decide_num() != 1 {
                continue
            }
            let variable = *clause
                .literals_by_value(VariableValue::Unassigned)
                .iter()
                .next()
                .expect("a unit clause has exactly one unassigned literal");
            let forced_value = clause.literal(variable).is_pos();
            // The node must land on the implication graph before the
            // conflict check below: conflict analysis looks up every
            // variable referenced by the conflicting clause via the graph,
            // including the one whose assignment just triggered it.
            let conflict = self.assign(variable, forced_value);
            self.implication_graph.push_propagated(variable, clause_id);
            if let Some(conflict) = conflict {
                self.propagation_queue.clear();
                return Some(conflict)
            }
        }
        None
    }

    /// Runs 1-UIP conflict analysis on `conflict_clause`, learns the
    /// resulting clause, and backjumps to the appropriate decision level.
    ///
    /// Returns `false` if the analysis shows the formula is unsatisfiable.
    fn resolve_conflict(&mut self, conflict_clause: ClauseId) -> bool {
        let uip_positions = self
            .implication_graph
            .conflict_analysis(conflict_clause, &self.clauses);
        if uip_positions.len() == 1
            && uip_positions[0] == 0
            && !self.implication_graph.get(0).is_decision()
        {
            return false
        }

        let learnt_id = ClauseId::from_index(self.clauses.len());
        let mut learnt = Clause::new(learnt_id);
        let mut touched = Vec::with_capacity(uip_positions.len());
        for &pos in &uip_positions {
            let variable = self.implication_graph.get(pos).variable;
            let current_value = self.variables[variable.into_index()].value;
            let current_bool = current_value
                .as_bool()
                .expect("every node on the implication graph stack is assigned");
            let sign = Sign::from_bool(!current_bool);
            let accepted = learnt.add_literal(variable, sign, current_value);
            debug_assert!(accepted, "conflict analysis produced a self-conflicting learnt clause");
            touched.push(variable);
            self.decider.bump(variable);
        }
        for &variable in &touched {
            self.variables[variable.into_index()].clauses.insert(learnt_id);
        }
        self.clauses.push(learnt);
        // The learnt clause is guaranteed unit only after the backjump
        // below unassigns the nodes it blames; the queue is allowed to
        // hold this stale entry until then.
        self.propagation_queue.push(learnt_id);

        let target_level = if uip_positions.len() == 1 {
            0
        } else {
            uip_positions[1..]
                .iter()
                .map(|&pos| self.implication_graph.get(pos).decision_level)
                .max()
                .expect("more than one uip position guarantees a non-empty slice")
        };
        while self.implication_graph.decision_level() > target_level {
            let variable = self.implication_graph.back().variable;
            self.reset(variable);
            self.implication_graph.pop();
        }
        self.stats.record_backjump();
        true
    }

    /// Builds the satisfying [`Model`] from the current (fully assigned)
    /// variable values.
    fn build_model(&self) -> Model {
        let assignment = self
            .variables
            .iter()
            .map(|record| {
                let value = record
                    .value()
                    .as_bool()
                    .expect("every variable must be assigned once the main loop terminates as SAT");
                (record.original_name(), value)
            })
            .collect();
        Model::new(assignment)
    }

    /// Runs the CDCL search loop to completion.
    ///
    /// Returns `true` if the instance is satisfiable, `false` otherwise. On
    /// `true`, the satisfying assignment is available from
    /// [`Solver::get_result`].
    pub fn solve(&mut self) -> bool {
        let start = Instant::now();
        let result = self.solve_inner();
        self.stats.record_time_cost(start.elapsed());
        debug!("solve finished: sat = {}, stats = {:?}", result, self.stats);
        result
    }

    fn solve_inner(&mut self) -> bool {
        if self.unsat {
            return false
        }
        let unassigned_bucket = VariableValue::Unassigned.bucket();
        loop {
            if self.variables_by_value[unassigned_bucket].is_empty() {
                break
            }
            if self.propagation_queue.is_empty() {
                let (variable, sign) = self
                    .decider
                    .decide(&self.variables_by_value[unassigned_bucket]);
                self.implication_graph.push_decision(variable);
                self.stats.record_decision();
                let conflict = self.assign(variable, sign.is_pos());
                assert!(
                    conflict.is_none(),
                    "decision policy proposed a variable already in conflict: a bug in the core, \
                     since decisions only ever assign unassigned variables"
                );
            }
            if let Some(conflict_clause) = self.unit_propagate() {
                if !self.resolve_conflict(conflict_clause) {
                    return false
                }
            }
        }
        self.last_model = Some(self.build_model());
        true
    }

    /// Returns the satisfying assignment found by the last `solve` call, if
    /// it returned `true`.
    pub fn get_result(&self) -> Result<&Model, SolverError> {
        self.last_model.as_ref().ok_or(SolverError::NoModel)
    }

    /// Returns a snapshot of the informational statistics accumulated over
    /// the last `solve` call.
    pub fn get_statistics(&self) -> Statistics {
        self.stats
    }
}
