use otter_psl::{
    config::Config,
    context::{Context, ContextState},
    structures::{
        constant::{Argument, Constant, ConstantType},
        formula::Formula,
        predicate::{Builtin, PredicateId},
    },
    types::err::{ErrorKind, RegistryError, RuleError},
};

const ENTITIES: [&str; 5] = ["alice", "bob", "carol", "dave", "eve"];

/// A context with `P` observed true of each entity, and `Q` an open binary predicate.
fn entity_context() -> (Context, PredicateId, PredicateId) {
    let mut ctx = Context::from_config(Config::default());
    let p = ctx.add_predicate("P", &[ConstantType::Text], true).unwrap();
    let q = ctx
        .add_predicate("Q", &[ConstantType::Text, ConstantType::Text], false)
        .unwrap();

    for entity in ENTITIES {
        ctx.observe(p, vec![Constant::from(entity)], 1.0).unwrap();
    }

    (ctx, p, q)
}

fn var(name: &str) -> Argument {
    Argument::var(name)
}

mod basic {
    use super::*;

    #[test]
    fn every_pair() {
        let (mut ctx, p, q) = entity_context();

        let body = Formula::and(vec![
            ctx.atom(p, vec![var("A")]).unwrap().into(),
            ctx.atom(p, vec![var("B")]).unwrap().into(),
        ]);
        let head = ctx.atom(q, vec![var("A"), var("B")]).unwrap();
        ctx.add_logical_rule(Formula::implies(body, head.into()), Some(1.0), false)
            .unwrap();

        let summary = ctx.ground().unwrap();
        assert_eq!(summary.rows, 25);
        assert_eq!(summary.added, 25);
        assert_eq!(ctx.ground_rule_db.len(), 25);
        assert_eq!(ctx.state, ContextState::Grounded);
    }

    #[test]
    fn distinct_pairs() {
        let (mut ctx, p, q) = entity_context();
        let not_equal = ctx.registry.builtin(Builtin::NotEqual);

        let body = Formula::and(vec![
            ctx.atom(p, vec![var("A")]).unwrap().into(),
            ctx.atom(p, vec![var("B")]).unwrap().into(),
            ctx.atom(not_equal, vec![var("A"), var("B")]).unwrap().into(),
        ]);
        let head = ctx.atom(q, vec![var("A"), var("B")]).unwrap();
        ctx.add_logical_rule(Formula::implies(body, head.into()), Some(1.0), false)
            .unwrap();

        let summary = ctx.ground().unwrap();
        assert_eq!(summary.rows, 20);
        assert_eq!(ctx.ground_rule_db.len(), 20);

        for entity in ENTITIES {
            assert!(ctx.atom_db.find(q, &[entity.into(), entity.into()]).is_none());
        }
    }

    #[test]
    fn grounding_is_incremental() {
        let (mut ctx, p, q) = entity_context();
        ctx.target(q, vec!["alice".into(), "bob".into()], 0.5).unwrap();
        ctx.target(q, vec!["bob".into(), "alice".into()], 0.5).unwrap();

        let implication = Formula::implies(
            Formula::and(vec![
                ctx.atom(p, vec![var("A")]).unwrap().into(),
                ctx.atom(p, vec![var("B")]).unwrap().into(),
            ]),
            ctx.atom(q, vec![var("A"), var("B")]).unwrap().into(),
        );
        ctx.add_logical_rule(implication, Some(1.0), false).unwrap();
        assert_eq!(ctx.ground().unwrap().added, 25);

        // Atoms of Q created by grounding are lazy, and so the prior ranges over the two targets only.
        let prior = !Formula::from(ctx.atom(q, vec![var("A"), var("B")]).unwrap());
        ctx.add_logical_rule(prior, Some(0.5), true).unwrap();
        let summary = ctx.ground().unwrap();
        assert_eq!(summary.rows, 2);
        assert_eq!(ctx.ground_rule_db.len(), 27);

        assert_eq!(ctx.ground().unwrap().rows, 0);
        assert_eq!(ctx.counters.ground_rules_added, 27);
        assert_eq!(ctx.atom_db.lazy_atoms().count(), 23);
    }

    #[test]
    fn tautologies_are_pruned() {
        let mut ctx = Context::from_config(Config::default());
        let friends = ctx
            .add_predicate("Friends", &[ConstantType::Text, ConstantType::Text], false)
            .unwrap();

        for a in ENTITIES {
            for b in ENTITIES {
                ctx.target(friends, vec![a.into(), b.into()], 0.5).unwrap();
            }
        }

        let atom: Formula = ctx.atom(friends, vec![var("A"), var("B")]).unwrap().into();
        ctx.add_logical_rule(Formula::implies(atom.clone(), atom), Some(1.0), false)
            .unwrap();

        let summary = ctx.ground().unwrap();
        assert_eq!(summary.rows, 25);
        assert_eq!(summary.pruned, 25);
        assert!(ctx.ground_rule_db.is_empty());

        ctx.generate_terms();
        assert!(ctx.term_db.is_empty());
    }

    #[test]
    fn closed_rules_are_constant() {
        let (mut ctx, p, _) = entity_context();
        let r = ctx.add_predicate("R", &[ConstantType::Text], true).unwrap();
        ctx.observe(r, vec!["alice".into()], 1.0).unwrap();

        // Every atom is observed, so no ground rule has a random variable.
        let rule = Formula::implies(
            ctx.atom(p, vec![var("A")]).unwrap().into(),
            ctx.atom(r, vec![var("A")]).unwrap().into(),
        );
        ctx.add_logical_rule(rule, Some(1.0), false).unwrap();

        let summary = ctx.ground().unwrap();
        assert_eq!(summary.rows, 5);
        assert_eq!(summary.pruned, 5);
    }

    #[test]
    fn callback_on_each_ground_rule() {
        use std::{cell::Cell, rc::Rc};

        let (mut ctx, p, q) = entity_context();

        let count = Rc::new(Cell::new(0));
        let counter = count.clone();
        ctx.set_callback_ground_rule(Box::new(move |_, rule| {
            assert_eq!(rule.literals.len(), 2);
            counter.set(counter.get() + 1);
        }));

        let rule = Formula::implies(
            ctx.atom(p, vec![var("A")]).unwrap().into(),
            ctx.atom(q, vec![var("A"), Argument::constant("eve")]).unwrap().into(),
        );
        ctx.add_logical_rule(rule, Some(1.0), false).unwrap();
        ctx.ground().unwrap();

        assert_eq!(count.get(), 5);
    }
}

mod errors {
    use super::*;

    #[test]
    fn rule_shape() {
        let (mut ctx, p, q) = entity_context();

        // The negation has two clauses.
        let disjunctive_body = Formula::implies(
            Formula::or(vec![
                ctx.atom(p, vec![var("A")]).unwrap().into(),
                ctx.atom(p, vec![var("B")]).unwrap().into(),
            ]),
            ctx.atom(q, vec![var("A"), var("B")]).unwrap().into(),
        );
        assert_eq!(
            ctx.add_logical_rule(disjunctive_body, Some(1.0), false),
            Err(ErrorKind::Rule(RuleError::NotDisjunctionOfLiterals))
        );

        let unbound = Formula::implies(
            ctx.atom(p, vec![var("A")]).unwrap().into(),
            ctx.atom(q, vec![var("A"), var("B")]).unwrap().into(),
        );
        assert_eq!(
            ctx.add_logical_rule(unbound, Some(1.0), false),
            Err(ErrorKind::Rule(RuleError::UnboundVariables(vec!["B".to_string()])))
        );

        let ground = Formula::implies(
            ctx.atom(p, vec![Argument::constant("alice")]).unwrap().into(),
            ctx.atom(q, vec![Argument::constant("alice"), Argument::constant("bob")])
                .unwrap()
                .into(),
        );
        assert_eq!(
            ctx.add_logical_rule(ground, Some(1.0), false),
            Err(ErrorKind::Rule(RuleError::NoVariables))
        );

        let head = ctx.atom(q, vec![var("A"), var("A")]).unwrap();
        let weightless = Formula::implies(ctx.atom(p, vec![var("A")]).unwrap().into(), head.into());
        assert_eq!(
            ctx.add_logical_rule(weightless, Some(f64::NAN), false)
                .map_err(|e| matches!(e, ErrorKind::Rule(RuleError::InvalidWeight(_)))),
            Err(true)
        );

        assert!(ctx.rules.is_empty());
    }

    #[test]
    fn predicate_signatures() {
        let (mut ctx, p, q) = entity_context();

        assert_eq!(
            ctx.atom(p, vec![var("A"), var("B")]),
            Err(ErrorKind::Registry(RegistryError::ArityMismatch {
                predicate: "P".to_string(),
                expected: 1,
                found: 2,
            }))
        );

        assert_eq!(
            ctx.add_predicate("Empty", &[], false),
            Err(ErrorKind::Registry(RegistryError::EmptyArguments))
        );

        assert_eq!(
            ctx.add_predicate("Q", &[ConstantType::Text], false),
            Err(ErrorKind::Registry(RegistryError::NameConflict("Q".to_string())))
        );

        assert_eq!(
            ctx.observe(q, vec![Constant::from(1_i64), Constant::from("bob")], 1.0),
            Err(ErrorKind::Registry(RegistryError::TypeMismatch {
                predicate: "Q".to_string(),
                position: 0,
            }))
        );
    }
}
