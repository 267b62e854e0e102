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
};

const ENTITIES: [&str; 5] = ["e0", "e1", "e2", "e3", "e4"];

/// Seeds of labels, by entity, as (x, y).
const SEEDS: [(f32, f32); 5] = [(1.0, 0.2), (0.3, 0.3), (0.0, 0.9), (0.6, 0.0), (0.5, 0.5)];

/// Each entity has exactly one of two labels, with seeds pulling labels up and a weak prior pulling labels down.
fn label_context(config: Config) -> (Context, PredicateId) {
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
        ctx.target(label, vec![(*entity).into(), "x".into()], 0.0).unwrap();
        ctx.target(label, vec![(*entity).into(), "y".into()], 0.0).unwrap();
    }

    let (a, l) = (Argument::var("A"), Argument::var("L"));

    let seeded = Formula::implies(
        ctx.atom(seed, vec![a.clone(), l.clone()]).unwrap().into(),
        ctx.atom(label, vec![a.clone(), l.clone()]).unwrap().into(),
    );
    ctx.add_logical_rule(seeded, Some(1.0), true).unwrap();

    let prior = !Formula::from(ctx.atom(label, vec![a.clone(), l]).unwrap());
    ctx.add_logical_rule(prior, Some(0.1), true).unwrap();

    let exactly_one = ArithmeticExpression {
        terms: vec![
            (1.0, ctx.atom(label, vec![a.clone(), Argument::constant("x")]).unwrap()),
            (1.0, ctx.atom(label, vec![a, Argument::constant("y")]).unwrap()),
        ],
        comparator: Comparator::Equal,
        constant: 1.0,
    };
    ctx.add_arithmetic_rule(exactly_one, None, false).unwrap();

    (ctx, label)
}

fn admm_config() -> Config {
    let mut config = Config::default();
    config.reasoner.value = ReasonerKind::ADMM;
    config.admm.epsilon_rel.value = 1e-4;
    config
}

fn label_value(ctx: &Context, label: PredicateId, entity: &str, l: &str) -> f32 {
    ctx.value_of(label, &[Constant::from(entity), Constant::from(l)])
        .unwrap()
}

mod basic {
    use super::*;

    #[test]
    fn feasible() {
        let (mut ctx, label) = label_context(admm_config());

        assert_eq!(ctx.infer(), Ok(Report::Converged));

        for atom in ctx.atom_db.random_variables() {
            let value = ctx.atom_db.values()[atom as usize];
            assert!((-1e-4..=1.0 + 1e-4).contains(&value));
        }

        let tolerance = ctx.config.stopping.constraint_tolerance.value;
        assert!(ctx.violated_constraints(tolerance as f64).is_empty());
        assert_eq!(ctx.last_optimization().unwrap().violated_constraints, 0);

        for entity in ENTITIES {
            let sum = label_value(&ctx, label, entity, "x") + label_value(&ctx, label, entity, "y");
            assert!((sum - 1.0).abs() <= tolerance);
        }
    }

    #[test]
    fn seeds_decide_labels() {
        let (mut ctx, label) = label_context(admm_config());
        assert_eq!(ctx.infer(), Ok(Report::Converged));

        assert!(label_value(&ctx, label, "e0", "x") > label_value(&ctx, label, "e0", "y"));
        assert!(label_value(&ctx, label, "e2", "y") > label_value(&ctx, label, "e2", "x"));

        // Symmetric seeds give symmetric labels.
        let x = label_value(&ctx, label, "e4", "x");
        let y = label_value(&ctx, label, "e4", "y");
        assert!((x - y).abs() < 1e-2);
    }

    #[test]
    fn reoptimisation_is_idempotent() {
        let (mut ctx, _) = label_context(admm_config());

        assert_eq!(ctx.infer(), Ok(Report::Converged));
        let first = ctx.atom_db.values().to_vec();

        assert_eq!(ctx.infer(), Ok(Report::Converged));
        let second = ctx.atom_db.values();

        for (a, b) in first.iter().zip(second) {
            assert!((a - b).abs() < 1e-2);
        }
        assert_eq!(ctx.counters.terms, ctx.term_db.len());
    }

    #[test]
    fn parallel_agrees_with_serial() {
        let mut serial_config = admm_config();
        serial_config.threads.value = 1;
        let (mut serial, _) = label_context(serial_config);

        let mut parallel_config = admm_config();
        parallel_config.threads.value = 4;
        let (mut parallel, _) = label_context(parallel_config);

        assert_eq!(serial.infer(), Ok(Report::Converged));
        assert_eq!(parallel.infer(), Ok(Report::Converged));

        for (a, b) in serial.atom_db.values().iter().zip(parallel.atom_db.values()) {
            assert!((a - b).abs() < 1e-3);
        }
    }

    #[test]
    fn iteration_limit_is_reported() {
        let mut config = admm_config();
        config.admm.max_iterations.value = 3;
        let (mut ctx, _) = label_context(config);

        assert_eq!(ctx.infer(), Ok(Report::MaxIterations));
        assert_eq!(ctx.report(), Report::MaxIterations);
        assert_eq!(ctx.last_optimization().unwrap().iterations, 3);
    }
}
