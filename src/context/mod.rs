/*!
The context --- to which predicates, observations, and rules are added, and within which grounding and inference take place.

Strictly, a [GenericContext] and a [Context].

The generic context is generic over the source of randomness, and [from_config](Context::from_config) is implemented for a context rather than a generic context to avoid requiring a source of randomness to be supplied alongside a config.

# Example
```rust
# use otter_psl::config::Config;
# use otter_psl::context::{Context, ContextState};
# use otter_psl::reports::Report;
# use otter_psl::structures::constant::{Argument, Constant, ConstantType};
# use otter_psl::structures::formula::Formula;
let mut the_context = Context::from_config(Config::default());

let lives = the_context.add_predicate("Lives", &[ConstantType::Text, ConstantType::Text], false).unwrap();
let knows = the_context.add_predicate("Knows", &[ConstantType::Text, ConstantType::Text], true).unwrap();

the_context.observe(knows, vec!["a".into(), "b".into()], 1.0).unwrap();
the_context.observe(lives, vec!["a".into(), "paris".into()], 1.0).unwrap();
the_context.target(lives, vec!["b".into(), "paris".into()], 0.0).unwrap();

let body = Formula::and(vec![
    the_context.atom(knows, vec![Argument::var("P"), Argument::var("Q")]).unwrap().into(),
    the_context.atom(lives, vec![Argument::var("P"), Argument::var("L")]).unwrap().into(),
]);
let head = the_context.atom(lives, vec![Argument::var("Q"), Argument::var("L")]).unwrap();

assert!(the_context.add_logical_rule(Formula::implies(body, head.into()), Some(2.0), false).is_ok());
assert_eq!(the_context.state, ContextState::Input);

assert_eq!(the_context.infer(), Ok(Report::Converged));
assert_eq!(the_context.state, ContextState::Optimized);

let value = the_context.value_of(lives, &["b".into(), "paris".into()]).unwrap();
assert!(value > 0.99);
```
*/

pub mod callbacks;
mod counters;
pub use counters::Counters;
mod generic;
pub use generic::GenericContext;
mod specific;
pub use specific::Context;

/// The state of a context.
///
/// States are ordered, and options of a [config](crate::config) may be changed up to some state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ContextState {
    /// The context allows for configuration.
    Configuration,

    /// The context allows input, and some input has been given.
    Input,

    /// Rules have been grounded.
    Grounded,

    /// Values have been inferred.
    Optimized,
}

impl std::fmt::Display for ContextState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration"),
            Self::Input => write!(f, "Input"),
            Self::Grounded => write!(f, "Grounded"),
            Self::Optimized => write!(f, "Optimized"),
        }
    }
}
