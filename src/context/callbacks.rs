/*!
Callbacks associated with a context.

# Callback types

Callbacks may be mutable functions.
Still, information passed from the context is non-mutable, and a callback has no influence on grounding or inference.
*/

use crate::{db::GroundRuleKey, structures::ground_rule::GroundRule};

use super::GenericContext;

/// A callback made with a ground rule, and the key of the ground rule.
pub type CallbackOnGroundRule = dyn FnMut(GroundRuleKey, &GroundRule);

impl<R: rand::Rng + std::default::Default> GenericContext<R> {
    /// Set a callback to be made when a ground rule is added to the ground rule database.
    pub fn set_callback_ground_rule(&mut self, callback: Box<CallbackOnGroundRule>) {
        self.ground_rule_db.set_callback_addition(callback);
    }
}
