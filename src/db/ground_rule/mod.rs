/*!
A database of ground rules.

Ground rules are stored in a [SlotMap], and so keys of removed ground rules are not reused.
Ground rules are deduplicated by [identity](GroundRule::identity), i.e. the rule, kind, literals, and constant of the ground rule.

A callback may be set to be made whenever a ground rule is added.
*/

use std::collections::HashMap;

use slotmap::SlotMap;

use crate::{
    context::callbacks::CallbackOnGroundRule,
    db::GroundRuleKey,
    misc::log::targets::{self},
    structures::ground_rule::{GroundRule, GroundRuleIdentity},
    types::err::GroundRuleDBError,
};

/// Ok results when inserting a ground rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroundRuleOk {
    /// The ground rule was added with the key.
    Added(GroundRuleKey),

    /// An identical ground rule is stored with the key.
    Duplicate(GroundRuleKey),
}

/// The ground rule database.
#[derive(Default)]
pub struct GroundRuleDB {
    rules: SlotMap<GroundRuleKey, GroundRule>,

    identities: HashMap<GroundRuleIdentity, GroundRuleKey>,

    /// Added ground rules are passed in.
    callback_addition: Option<Box<CallbackOnGroundRule>>,
}

impl GroundRuleDB {
    /// Stores a ground rule, unless an identical ground rule is stored.
    pub fn insert(&mut self, rule: GroundRule) -> GroundRuleOk {
        let identity = rule.identity();
        if let Some(key) = self.identities.get(&identity) {
            log::trace!(target: targets::GROUND_RULE_DB, "Duplicate of {key:?}");
            return GroundRuleOk::Duplicate(*key);
        }

        let key = self.rules.insert(rule);
        self.identities.insert(identity, key);

        if let Some(callback) = &mut self.callback_addition {
            if let Some(rule) = self.rules.get(key) {
                callback(key, rule);
            }
        }

        GroundRuleOk::Added(key)
    }

    /// Whether an identical ground rule is stored.
    pub fn contains(&self, rule: &GroundRule) -> bool {
        self.identities.contains_key(&rule.identity())
    }

    pub fn get(&self, key: GroundRuleKey) -> Result<&GroundRule, GroundRuleDBError> {
        self.rules.get(key).ok_or(GroundRuleDBError::MissingKey)
    }

    /// Removes a ground rule, returning the ground rule.
    pub fn remove(&mut self, key: GroundRuleKey) -> Result<GroundRule, GroundRuleDBError> {
        match self.rules.remove(key) {
            Some(rule) => {
                self.identities.remove(&rule.identity());
                log::trace!(target: targets::GROUND_RULE_DB, "Removed {key:?}");
                Ok(rule)
            }
            None => Err(GroundRuleDBError::MissingKey),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (GroundRuleKey, &GroundRule)> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Set a callback to be made when a ground rule is added.
    pub fn set_callback_addition(&mut self, callback: Box<CallbackOnGroundRule>) {
        self.callback_addition = Some(callback);
    }
}

#[cfg(test)]
mod ground_rule_db_tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::structures::ground_rule::GroundRuleKind;

    fn rule(atoms: &[u32]) -> GroundRule {
        GroundRule::logical(
            0,
            GroundRuleKind::Weighted {
                weight: 1.0,
                squared: false,
            },
            atoms,
            &[],
        )
    }

    #[test]
    fn deduplication() {
        let mut db = GroundRuleDB::default();

        let GroundRuleOk::Added(key) = db.insert(rule(&[0, 1])) else {
            panic!("Not added");
        };
        assert_eq!(db.insert(rule(&[0, 1])), GroundRuleOk::Duplicate(key));
        assert!(matches!(db.insert(rule(&[1, 0])), GroundRuleOk::Added(_)));
        assert_eq!(db.len(), 2);

        assert!(db.remove(key).is_ok());
        assert!(!db.contains(&rule(&[0, 1])));
        assert_eq!(db.get(key), Err(GroundRuleDBError::MissingKey));
        assert!(matches!(db.insert(rule(&[0, 1])), GroundRuleOk::Added(k) if k != key));
    }

    #[test]
    fn addition_callback() {
        let mut db = GroundRuleDB::default();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let record = seen.clone();
        db.set_callback_addition(Box::new(move |key, _| record.borrow_mut().push(key)));

        db.insert(rule(&[0]));
        db.insert(rule(&[0]));
        db.insert(rule(&[1]));

        assert_eq!(seen.borrow().len(), 2);
    }
}
