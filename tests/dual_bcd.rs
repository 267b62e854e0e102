use otter_psl::{
    config::{Config, ReasonerKind},
    context::Context,
    reports::Report,
    structures::{
        constant::{Argument, ConstantType},
        formula::Formula,
        predicate::PredicateId,
    },
};

const ENTITIES: [&str; 5] = ["e0", "e1", "e2", "e3", "e4"];

/// Cancer, by entity.
const CANCER: [f32; 5] = [0.0, 1.0, 0.5, 0.0, 0.0];

/// Smoking spreads along a chain of friends, and smoking without cancer is penalised.
///
/// Three predicates, two rules, and five entities.
/// The optimal objective is 15/16, with the last two entities smoking to degree 1/8.
fn smokers(reasoner: ReasonerKind) -> (Context, PredicateId) {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut config = Config::default();
    config.reasoner.value = reasoner;
    config.admm.epsilon_rel.value = 1e-4;

    let mut ctx = Context::from_config(config);
    let knows = ctx
        .add_predicate("Knows", &[ConstantType::Text, ConstantType::Text], true)
        .unwrap();
    let smokes = ctx.add_predicate("Smokes", &[ConstantType::Text], false).unwrap();
    let cancer = ctx.add_predicate("Cancer", &[ConstantType::Text], true).unwrap();

    for pair in ENTITIES.windows(2) {
        ctx.observe(knows, vec![pair[0].into(), pair[1].into()], 1.0).unwrap();
    }
    for (entity, value) in ENTITIES.iter().zip(CANCER) {
        ctx.observe(cancer, vec![(*entity).into()], value).unwrap();
    }
    ctx.observe(smokes, vec!["e0".into()], 1.0).unwrap();
    for entity in &ENTITIES[1..] {
        ctx.target(smokes, vec![(*entity).into()], 0.0).unwrap();
    }

    let (a, b) = (Argument::var("A"), Argument::var("B"));

    let spread = Formula::implies(
        Formula::and(vec![
            ctx.atom(knows, vec![a.clone(), b.clone()]).unwrap().into(),
            ctx.atom(smokes, vec![a.clone()]).unwrap().into(),
        ]),
        ctx.atom(smokes, vec![b]).unwrap().into(),
    );
    ctx.add_logical_rule(spread, Some(1.0), false).unwrap();

    let causes = Formula::implies(
        ctx.atom(smokes, vec![a.clone()]).unwrap().into(),
        ctx.atom(cancer, vec![a]).unwrap().into(),
    );
    ctx.add_logical_rule(causes, Some(2.0), true).unwrap();

    (ctx, smokes)
}

fn within(a: f64, b: f64, ratio: f64) -> bool {
    (a - b).abs() <= ratio * a.abs().max(b.abs())
}

mod basic {
    use super::*;

    #[test]
    fn agrees_with_admm() {
        let (mut admm, _) = smokers(ReasonerKind::ADMM);
        assert_eq!(admm.infer(), Ok(Report::Converged));
        let admm_objective = admm.total_weighted_incompatibility();
        assert!(within(admm_objective, 0.9375, 0.01));

        let (mut dual, _) = smokers(ReasonerKind::DualBCD);
        assert_eq!(dual.infer(), Ok(Report::Converged));
        let dual_objective = dual.total_weighted_incompatibility();

        assert!(within(admm_objective, dual_objective, 0.05));
        assert!(within(dual.last_optimization().unwrap().objective, dual_objective, 1e-3));
    }

    #[test]
    fn distributed_agrees_with_admm() {
        let (mut admm, _) = smokers(ReasonerKind::ADMM);
        assert_eq!(admm.infer(), Ok(Report::Converged));

        let (mut distributed, _) = smokers(ReasonerKind::DistributedDualBCD);
        assert_eq!(distributed.infer(), Ok(Report::Converged));

        assert!(within(
            admm.total_weighted_incompatibility(),
            distributed.total_weighted_incompatibility(),
            0.05
        ));
    }

    #[test]
    fn values_in_unit_interval() {
        for reasoner in [ReasonerKind::DualBCD, ReasonerKind::DistributedDualBCD] {
            let (mut ctx, smokes) = smokers(reasoner);
            ctx.infer().unwrap();

            for entity in ENTITIES {
                let value = ctx.value_of(smokes, &[entity.into()]).unwrap();
                assert!((0.0..=1.0).contains(&value));
            }

            assert!(ctx.value_of(smokes, &["e1".into()]).unwrap() > 0.9);
            assert!(ctx.value_of(smokes, &["e4".into()]).unwrap() < 0.25);
        }
    }

    #[test]
    fn iteration_limit_is_reported() {
        let (mut ctx, _) = smokers(ReasonerKind::DualBCD);
        ctx.config.dual_bcd.max_iterations.value = 1;
        ctx.config.dual_bcd.compute_period.value = 1;

        assert_eq!(ctx.infer(), Ok(Report::MaxIterations));
    }
}
