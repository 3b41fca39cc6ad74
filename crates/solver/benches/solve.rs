use criterion::{
    black_box,
    criterion_group,
    criterion_main,
    BatchSize,
    BenchmarkId,
    Criterion,
};
use s3sat_solver::Solver;

criterion_group!(bench_solve, bench_planted_3sat_sat, bench_planted_3sat_unsat);
criterion_main!(bench_solve);

/// A fixed-seed linear congruential generator, good enough to scatter clause
/// shapes deterministically across benchmark runs without pulling in an
/// external `rand` dependency just for synthetic instances.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0
    }
}

/// Builds a planted-solution random 3-SAT instance: every variable is `true`
/// under the planted assignment and every clause carries at least one
/// agreeing literal, so the instance is satisfiable by construction.
fn planted_3sat(num_vars: u64, num_clauses: usize, seed: u64) -> Vec<Vec<(bool, u64)>> {
    let mut rng = Lcg(seed);
    let mut clauses = Vec::with_capacity(num_clauses);
    for _ in 0..num_clauses {
        let satisfied_var = 1 + rng.next() % num_vars;
        let mut clause = vec![(true, satisfied_var)];
        for _ in 0..2 {
            let mut var = 1 + rng.next() % num_vars;
            while var == satisfied_var {
                var = 1 + rng.next() % num_vars;
            }
            let polarity = rng.next() % 2 == 0;
            clause.push((polarity, var));
        }
        clauses.push(clause);
    }
    clauses
}

/// Turns a planted-SAT instance into one where the planted assignment is
/// additionally forbidden by a unit clause over a fresh variable, so the
/// solver must exhaust the search instead of finding the trivial model.
fn make_unsat(mut clauses: Vec<Vec<(bool, u64)>>, fresh_var: u64) -> Vec<Vec<(bool, u64)>> {
    clauses.push(vec![(true, fresh_var)]);
    clauses.push(vec![(false, fresh_var)]);
    clauses
}

fn bench_planted_3sat_sat(c: &mut Criterion) {
    let mut g = c.benchmark_group("Solver::solve");
    g.sample_size(10);
    for &(num_vars, num_clauses) in &[(50u64, 200usize), (150, 640)] {
        let clauses = planted_3sat(num_vars, num_clauses, 0x5EED);
        g.bench_function(BenchmarkId::new("planted 3-SAT (sat)", num_vars), |bencher| {
            bencher.iter_batched(
                || {
                    let mut solver = Solver::new();
                    solver.initiate(clauses.clone());
                    solver
                },
                |mut solver| {
                    let result = black_box(solver.solve());
                    assert!(result);
                },
                BatchSize::SmallInput,
            )
        });
    }
}

fn bench_planted_3sat_unsat(c: &mut Criterion) {
    let mut g = c.benchmark_group("Solver::solve");
    g.sample_size(10);
    for &(num_vars, num_clauses) in &[(50u64, 200usize), (150, 640)] {
        let clauses = make_unsat(planted_3sat(num_vars, num_clauses, 0xC0FFEE), num_vars + 1);
        g.bench_function(BenchmarkId::new("planted 3-SAT (unsat)", num_vars), |bencher| {
            bencher.iter_batched(
                || {
                    let mut solver = Solver::new();
                    solver.initiate(clauses.clone());
                    solver
                },
                |mut solver| {
                    let result = black_box(solver.solve());
                    assert!(!result);
                },
                BatchSize::SmallInput,
            )
        });
    }
}
