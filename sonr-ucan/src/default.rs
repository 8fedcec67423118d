//! Default values for building and validating tokens.

use sonr_key::JwsAlgorithm;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The signing algorithm a builder starts with.
pub const DEFAULT_ALGORITHM: JwsAlgorithm = JwsAlgorithm::EdDSA;

/// The UCAN spec version a builder starts with.
pub const DEFAULT_VERSION: &str = "0.10.0";

/// The default number of seconds a clock may be off when checking `exp` and `nbf`.
pub const DEFAULT_CLOCK_DRIFT_TOLERANCE: u64 = 60;

/// The default limit on how many proofs deep a delegation chain may go.
pub const DEFAULT_MAX_PROOF_DEPTH: usize = 16;

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

pub(crate) const fn default_clock_drift_tolerance() -> u64 {
    DEFAULT_CLOCK_DRIFT_TOLERANCE
}

pub(crate) const fn default_max_proof_depth() -> usize {
    DEFAULT_MAX_PROOF_DEPTH
}

pub(crate) const fn default_true() -> bool {
    true
}

pub(crate) fn default_algorithms() -> Vec<JwsAlgorithm> {
    JwsAlgorithm::ALL.to_vec()
}
