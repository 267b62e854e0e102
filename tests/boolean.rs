use otter_psl::{
    config::{Config, ReasonerKind},
    context::Context,
    reports::Report,
    structures::{
        comparator::Comparator,
        constant::{Argument, Constant, ConstantType},
        formula::Formula,
        predicate::PredicateId,
        rule::ArithmeticExpression,
    },
    types::err::{ErrorKind, ReasonerError},
};

const ENTITIES: [&str; 4] = ["e0", "e1", "e2", "e3"];

/// Seeds of labels, by entity, as (x, y).
const SEEDS: [(f32, f32); 4] = [(1.0, 0.2), (0.1, 0.7), (0.0, 1.0), (0.6, 0.5)];

/// Each entity has exactly one of two labels, with seeds pulling labels up.
fn label_context(reasoner: ReasonerKind, bound: f64) -> (Context, PredicateId) {
    let mut config = Config::default();
    config.reasoner.value = reasoner;
    config.seed.value = 17;

    let mut ctx = Context::from_config(config);
    let label = ctx
        .add_predicate("Label", &[ConstantType::Text, ConstantType::Text], false)
        .unwrap();
    let seed = ctx
        .add_predicate("Seed", &[ConstantType::Text, ConstantType::Text], true)
        .unwrap();

    for (entity, (x, y)) in ENTITIES.iter().zip(SEEDS) {
        ctx.observe(seed, vec![(*entity).into(), "x".into()], x).unwrap();
        ctx.observe(seed, vec![(*entity).into(), "y".into()], y).unwrap();
        ctx.target(label, vec![(*entity).into(), "x".into()], 0.5).unwrap();
        ctx.target(label, vec![(*entity).into(), "y".into()], 0.5).unwrap();
    }

    let (a, l) = (Argument::var("A"), Argument::var("L"));

    let seeded = Formula::implies(
        ctx.atom(seed, vec![a.clone(), l.clone()]).unwrap().into(),
        ctx.atom(label, vec![a.clone(), l]).unwrap().into(),
    );
    ctx.add_logical_rule(seeded, Some(1.0), false).unwrap();

    let exactly_one = ArithmeticExpression {
        terms: vec![
            (1.0, ctx.atom(label, vec![a.clone(), Argument::constant("x")]).unwrap()),
            (1.0, ctx.atom(label, vec![a, Argument::constant("y")]).unwrap()),
        ],
        comparator: Comparator::Equal,
        constant: bound,
    };
    ctx.add_arithmetic_rule(exactly_one, None, false).unwrap();

    (ctx, label)
}

fn label_value(ctx: &Context, label: PredicateId, entity: &str, l: &str) -> f32 {
    ctx.value_of(label, &[Constant::from(entity), Constant::from(l)])
        .unwrap()
}

mod max_walk_sat {
    use super::*;

    #[test]
    fn seeds_decide_labels() {
        let (mut ctx, label) = label_context(ReasonerKind::MaxWalkSat, 1.0);

        assert!(ctx.infer().is_ok());
        let optimization = ctx.last_optimization().unwrap();
        assert_eq!(optimization.violated_constraints, 0);

        // Each entity loses the lesser of its seeds.
        assert!((optimization.objective - (0.2 + 0.1 + 0.0 + 0.5)).abs() < 1e-4);

        let expected = [("e0", "x"), ("e1", "y"), ("e2", "y"), ("e3", "x")];
        for (entity, l) in expected {
            assert_eq!(label_value(&ctx, label, entity, l), 1.0);
        }
        for entity in ENTITIES {
            let sum = label_value(&ctx, label, entity, "x") + label_value(&ctx, label, entity, "y");
            assert_eq!(sum, 1.0);
        }
    }

    #[test]
    fn unsupported_constraint() {
        let (mut ctx, _) = label_context(ReasonerKind::MaxWalkSat, 2.0);

        assert_eq!(
            ctx.infer(),
            Err(ErrorKind::Reasoner(ReasonerError::UnsupportedConstraint))
        );
    }
}

mod mc_sat {
    use super::*;

    #[test]
    fn marginals() {
        let (mut ctx, label) = label_context(ReasonerKind::MCSat, 1.0);

        assert_eq!(ctx.infer(), Ok(Report::Converged));

        for entity in ENTITIES {
            let x = label_value(&ctx, label, entity, "x");
            let y = label_value(&ctx, label, entity, "y");
            assert!((x + y - 1.0).abs() < 1e-4);
        }

        // p(x) ∝ exp(−loss), so e0 takes x with probability 1/(1 + e^−0.8).
        let e0 = label_value(&ctx, label, "e0", "x");
        assert!((e0 - 0.69).abs() < 0.05);

        // Seeds of e2 are certain to within a factor of e.
        assert!(label_value(&ctx, label, "e2", "y") > label_value(&ctx, label, "e2", "x"));
    }
}
