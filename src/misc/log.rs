/*!
Miscelanous items related to [logging](log).

Calls to the log macro are made throughout the library.
These are intended to provide useful information for extending the library and/or fixing issues.

Note, no log implementation is provided.
For more details, see [log].
*/

/// Targets to be used within a [log]! macro.
pub mod targets {
    /// Logs related to [grounding](crate::procedures::ground)
    pub const GROUNDING: &str = "grounding";

    /// Logs related to [lazy grounding](crate::procedures::lazy)
    pub const LAZY: &str = "lazy";

    /// Logs related to queries against the [atom database](crate::db::atom)
    pub const QUERY: &str = "query";

    /// Logs related to the [atom database](crate::db::atom)
    pub const ATOM_DB: &str = "atom_db";

    /// Logs related to the [ground rule database](crate::db::ground_rule)
    pub const GROUND_RULE_DB: &str = "ground_rule_db";

    /// Logs related to [term generation](crate::procedures::terms)
    pub const TERMS: &str = "terms";

    /// Logs related to [ADMM](crate::reasoner::admm)
    pub const ADMM: &str = "admm";

    /// Logs related to [dual block coordinate descent](crate::reasoner::dual_bcd)
    pub const DUAL_BCD: &str = "dual_bcd";

    /// Logs related to [MaxWalkSat](crate::reasoner::boolean::max_walk_sat)
    pub const WALKSAT: &str = "walksat";

    /// Logs related to [MC-SAT](crate::reasoner::boolean::mc_sat)
    pub const MCSAT: &str = "mcsat";

    /// Logs related to the [worker pool](crate::generic::parallel)
    pub const PARALLEL: &str = "parallel";
}
