//! Delegation chain validation.

use crate::{
    parse_token, validation::validate_at_depth, SignatureVerifier, Ucan, ValidationCode,
    ValidationError, ValidationOptions, ValidationResult,
};

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Validates the proofs a token's authority is delegated from.
///
/// A token without proofs is a root token and passes. Otherwise every proof must:
/// - parse and pass validation with the same options, recursively,
/// - be addressed to this token's issuer,
/// - have a validity window that covers this token's.
///
/// Then every capability of this token must be covered by some capability of some proof.
pub fn validate_proof_chain(
    token: &Ucan,
    options: &ValidationOptions,
    verifier: &dyn SignatureVerifier,
    depth: usize,
) -> ValidationResult {
    if token.proofs().is_empty() {
        tracing::trace!(issuer = token.issuer(), "root ucan");
        return Ok(());
    }

    if depth >= options.max_proof_depth {
        return Err(ValidationError::new(
            ValidationCode::ProofDepthExceeded,
            format!(
                "Delegation chain is deeper than {} proofs",
                options.max_proof_depth
            ),
        ));
    }

    let mut proofs = Vec::with_capacity(token.proofs().len());
    for (index, encoded) in token.proofs().iter().enumerate() {
        let proof = parse_token(encoded).map_err(|e| {
            ValidationError::new(
                ValidationCode::InvalidProof,
                format!("Proof at index {index} cannot be parsed: {e}"),
            )
        })?;

        if proof.audience() != token.issuer() {
            return Err(ValidationError::new(
                ValidationCode::ProofChainBroken,
                format!(
                    "Proof at index {index} is addressed to {}, not to issuer {}",
                    proof.audience(),
                    token.issuer()
                ),
            ));
        }

        if !proof.lifetime_encompasses(token) {
            return Err(ValidationError::new(
                ValidationCode::ProofChainBroken,
                format!("Proof at index {index} does not cover the delegated token's lifetime"),
            ));
        }

        validate_at_depth(&proof, options, verifier, depth + 1)
            .map_err(|e| e.context(format_args!("Proof at index {index}")))?;

        proofs.push(proof);
    }

    for (index, capability) in token.capabilities().iter().enumerate() {
        let delegated = proofs
            .iter()
            .flat_map(Ucan::capabilities)
            .any(|parent| {
                parent.permits(capability) && (!options.check_caveats || parent.caveats_permit(capability))
            });

        if !delegated {
            return Err(ValidationError::new(
                ValidationCode::AttenuationFailed,
                format!(
                    "Capability at index {index} ({} on {}) is not delegated by any proof",
                    capability.ability(),
                    capability.resource()
                ),
            ));
        }
    }

    Ok(())
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
