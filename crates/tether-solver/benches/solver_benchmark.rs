//! Solver benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tether_solver::{Constrain, Constraint, Solver, Strength, Variable};

/// A row of boxes, each placed after the previous one inside a fixed-width container.
fn box_chain(count: usize) -> (Vec<Variable>, Vec<Constraint>) {
    let lefts: Vec<Variable> = (0..count).map(|i| Variable::named(format!("box{i}.left"))).collect();
    let mut constraints = vec![(&lefts[0]).greater_or_equal(0.0)];

    for pair in lefts.windows(2) {
        constraints.push((&pair[1]).greater_or_equal(&pair[0] + 10.0));
        constraints.push(
            (&pair[1])
                .equal_to(&pair[0] + 20.0)
                .with_strength(Strength::WEAK),
        );
    }
    if let Some(last) = lefts.last() {
        constraints.push((last + 10.0).less_or_equal(20.0 * count as f64));
    }

    (lefts, constraints)
}

fn add_constraints(c: &mut Criterion) {
    let (_, constraints) = box_chain(100);
    c.bench_function("add_constraints_100", |b| {
        b.iter(|| {
            let mut solver = Solver::new();
            solver.add_constraints(black_box(&constraints)).unwrap();
            solver.update_variables();
            solver
        })
    });
}

fn suggest_values(c: &mut Criterion) {
    let (lefts, constraints) = box_chain(100);
    let mut solver = Solver::new();
    solver.add_constraints(&constraints).unwrap();
    solver.add_edit_variable(&lefts[0], Strength::STRONG).unwrap();

    let mut value = 0.0;
    c.bench_function("suggest_value_100", |b| {
        b.iter(|| {
            value = (value + 7.0) % 500.0;
            solver.suggest_value(&lefts[0], black_box(value)).unwrap();
            solver.update_variables();
        })
    });
}

criterion_group!(benches, add_constraints, suggest_values);
criterion_main!(benches);
