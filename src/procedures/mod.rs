/*!
Procedures of a context.

Each procedure is implemented as a method on a [context](crate::context::GenericContext), in a dedicated file, together with any free functions the procedure is built from.

- [ground] compiles rules into ground rules.
- [lazy] activates lazily created atoms and regrounds rules which depend on them.
- [terms] builds the term database from the ground rule database.
- [infer] runs a reasoner over the term database.
- [evaluate] summarises the ground rule database under the current values of atoms.
*/

pub mod evaluate;
pub mod ground;
pub mod infer;
pub mod lazy;
pub mod terms;
