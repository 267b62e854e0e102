use std::time::Duration;

/// Counts for various things which count, roughly.
pub struct Counters {
    /// A count of every substitution returned by a grounding query.
    pub groundings: usize,

    /// A count of ground rules added to the ground rule database.
    pub ground_rules_added: usize,

    /// A count of ground rules discarded as they could never be violated.
    pub ground_rules_pruned: usize,

    /// A count of ground rules identical to some stored ground rule.
    pub ground_rules_duplicate: usize,

    /// The count of terms generated on the most recent call to generate terms.
    pub terms: usize,

    /// A count of ground rules without a term on the most recent call to generate terms.
    pub terms_dropped: usize,

    /// The total number of iterations of every reasoner.
    pub iterations: usize,

    /// The number of rounds of lazy inference.
    pub lazy_rounds: usize,

    /// A count of lazily created atoms activated.
    pub activated_atoms: usize,

    /// The time taken during inference.
    pub time: Duration,
}

impl Default for Counters {
    fn default() -> Self {
        Counters {
            groundings: 0,
            ground_rules_added: 0,
            ground_rules_pruned: 0,
            ground_rules_duplicate: 0,

            terms: 0,
            terms_dropped: 0,

            iterations: 0,
            lazy_rounds: 0,
            activated_atoms: 0,

            time: Duration::from_secs(0),
        }
    }
}
