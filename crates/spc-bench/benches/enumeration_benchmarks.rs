use std::collections::HashMap;
use std::str::FromStr;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rust_decimal::Decimal;

use spc_calc::{optimum, price};
use spc_core::{Atom, Catalog, Design, Expression, Party};
use spc_enum::Enumerator;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// A single linear chain of `levels` make-from-one-input designs over one
/// raw atom, one maker per level, one price entry at the bottom. Exercises
/// the enumerator's stack-depth discipline (§5) without the combinatorial
/// blowup a branching BOM would add.
fn linear_chain_catalog(levels: usize) -> (Catalog, Atom) {
    let tool = Atom::id("tool");
    let raw = Atom::id("level-0");

    let mut parties = vec![Party::new("raw-supplier", [raw.clone()], [], [])];
    let mut designs = Vec::with_capacity(levels);
    let mut price_map = HashMap::new();
    price_map.insert(raw.identifier.clone(), dec("1"));

    for level in 1..=levels {
        let input = Atom::id(&format!("level-{}", level - 1));
        let output = Atom::id(&format!("level-{level}"));
        let cost_expr = Expression::konst(dec("1")).add(Expression::var(input.identifier.clone()));
        designs.push(
            Design::new(
                format!("assemble-{level}"),
                output,
                [input],
                [tool.clone()],
                [],
                cost_expr,
            )
            .unwrap(),
        );
        parties.push(Party::new(format!("maker-{level}"), [], [tool.clone()], []));
    }

    let top = Atom::id(&format!("level-{levels}"));
    let catalog = Catalog::try_new(parties, designs, price_map).unwrap();
    (catalog, top)
}

/// A branching BOM: each level's design consumes `width` distinct atoms
/// from the level below, so the enumerator's Cartesian-product odometer
/// (the AND step over a design's bom) does real work alongside the OR step.
fn branching_catalog(levels: usize, width: usize) -> (Catalog, Atom) {
    let tool = Atom::id("tool");
    let mut parties = Vec::new();
    let mut designs = Vec::new();
    let mut price_map = HashMap::new();

    for w in 0..width {
        let leaf = Atom::id(&format!("leaf-{w}"));
        parties.push(Party::new(format!("raw-supplier-{w}"), [leaf.clone()], [], []));
        price_map.insert(leaf.identifier.clone(), dec("1"));
    }
    parties.push(Party::new("maker", [], [tool.clone()], []));

    for level in 1..=levels {
        let inputs: Vec<Atom> = if level == 1 {
            (0..width).map(|w| Atom::id(&format!("leaf-{w}"))).collect()
        } else {
            (0..width)
                .map(|w| Atom::id(&format!("level-{}-{w}", level - 1)))
                .collect()
        };
        let mut cost_expr = Expression::konst(dec("1"));
        for input in &inputs {
            cost_expr = cost_expr.add(Expression::var(input.identifier.clone()));
        }
        let output = Atom::id(&format!("level-{level}-0"));
        designs.push(Design::new(format!("assemble-{level}"), output, inputs, [tool.clone()], [], cost_expr).unwrap());
    }

    let top = Atom::id(&format!("level-{levels}-0"));
    let catalog = Catalog::try_new(parties, designs, price_map).unwrap();
    (catalog, top)
}

fn bench_linear_enumeration(c: &mut Criterion) {
    let mut group = c.benchmark_group("linear_enumeration");

    for &levels in &[8usize, 16, 32, 64] {
        let (catalog, top) = linear_chain_catalog(levels);

        group.bench_with_input(BenchmarkId::new("enumerate", levels), &levels, |b, _| {
            b.iter(|| {
                let trees: Vec<_> = Enumerator::new(&catalog).enumerate(&top).collect();
                black_box(trees)
            })
        });
    }

    group.finish();
}

fn bench_branching_enumeration(c: &mut Criterion) {
    let mut group = c.benchmark_group("branching_enumeration");

    for &(levels, width) in &[(3usize, 2usize), (4, 2), (3, 3)] {
        let (catalog, top) = branching_catalog(levels, width);

        group.bench_with_input(
            BenchmarkId::new("enumerate", format!("L{levels}W{width}")),
            &levels,
            |b, _| {
                b.iter(|| {
                    let trees: Vec<_> = Enumerator::new(&catalog).enumerate(&top).collect();
                    black_box(trees)
                })
            },
        );
    }

    group.finish();
}

fn bench_optimum(c: &mut Criterion) {
    let mut group = c.benchmark_group("optimum");

    for &levels in &[8usize, 16, 32] {
        let (catalog, top) = linear_chain_catalog(levels);

        group.bench_with_input(BenchmarkId::new("price_optimum", levels), &levels, |b, _| {
            b.iter(|| black_box(optimum(&top, &catalog, price).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_linear_enumeration, bench_branching_enumeration, bench_optimum);
criterion_main!(benches);
