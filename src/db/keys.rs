/// The index of an atom in the atom database, and of its value in the shared array of values.
pub type AtomIndex = u32;

slotmap::new_key_type! {
    /// A key to access a ground rule stored in the ground rule database.
    ///
    /// Keys carry a version, and so the key of a removed ground rule is never confused with the key of a ground rule added later.
    pub struct GroundRuleKey;
}
