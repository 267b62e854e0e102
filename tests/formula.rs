use otter_psl::structures::{
    atom::QueryAtom,
    constant::Argument,
    formula::Formula,
};

fn atom(predicate: u32) -> Formula {
    QueryAtom {
        predicate,
        arguments: vec![Argument::var("A")],
    }
    .into()
}

/// Whether the formulas agree on every assignment of truth to predicates `0..atoms`.
fn equivalent(a: &Formula, b: &Formula, atoms: u32) -> bool {
    (0..(1_u32 << atoms)).all(|assignment| {
        let truth = |atom: &QueryAtom| assignment & (1 << atom.predicate) != 0;
        a.evaluate(&truth) == b.evaluate(&truth)
    })
}

fn formulas() -> Vec<(Formula, u32)> {
    let (p, q, r, s) = (atom(0), atom(1), atom(2), atom(3));

    vec![
        (p.clone(), 1),
        (!!p.clone(), 1),
        (Formula::implies(p.clone(), q.clone()), 2),
        (!Formula::implies(p.clone(), q.clone()), 2),
        (Formula::or(vec![p.clone(), Formula::and(vec![q.clone(), !r.clone()])]), 3),
        (
            Formula::and(vec![
                Formula::or(vec![p.clone(), q.clone()]),
                Formula::or(vec![!r.clone(), s.clone()]),
            ]),
            4,
        ),
        (
            !Formula::and(vec![
                Formula::implies(p.clone(), q.clone()),
                Formula::or(vec![r.clone(), !s.clone()]),
            ]),
            4,
        ),
        (
            Formula::implies(
                Formula::and(vec![p.clone(), Formula::or(vec![q.clone(), r.clone()])]),
                !Formula::implies(s.clone(), p.clone()),
            ),
            4,
        ),
        (
            Formula::or(vec![
                Formula::and(vec![p.clone(), p.clone()]),
                !Formula::or(vec![q.clone(), !q.clone()]),
                Formula::implies(r.clone(), Formula::and(vec![s.clone(), !p.clone()])),
            ]),
            4,
        ),
    ]
}

mod basic {
    use super::*;

    #[test]
    fn dnf_is_equivalent() {
        for (formula, atoms) in formulas() {
            let dnf = formula.dnf();
            assert!(equivalent(&formula, &dnf, atoms), "{formula:?} and {dnf:?}");
        }
    }

    #[test]
    fn dnf_has_normal_shape() {
        for (formula, _) in formulas() {
            assert!(formula.dnf().is_dnf());
        }
    }

    #[test]
    fn flatten_is_equivalent() {
        for (formula, atoms) in formulas() {
            assert!(equivalent(&formula, &formula.flatten(), atoms));
        }
    }

    #[test]
    fn negated_implication_is_one_clause() {
        let (p, q, r) = (atom(0), atom(1), atom(2));

        let rule = Formula::implies(Formula::and(vec![p, q]), r);
        assert_eq!((!rule.clone()).dnf_clauses().len(), 1);
        assert_eq!(rule.dnf_clauses().len(), 3);
    }
}
