//! Semantic validation of parsed tokens.
//!
//! Checks run in a fixed order and stop at the first failure: algorithm, issuer, audience,
//! validity window, capabilities, signature and finally the proof chain.

use crate::{
    ability_permits, is_valid_did, resource_permits, validate_proof_chain, Capability,
    SignatureVerifier, Ucan, UcanHeader, UcanPayload, UnwiredVerifier, ValidationCode,
    ValidationError, ValidationOptions, ABILITY_SEPARATOR,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The outcome of a validation.
pub type ValidationResult = Result<(), ValidationError>;

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Validates a token with the signature check left to [`UnwiredVerifier`].
///
/// With the default options that means every token fails with
/// [`SignatureUnavailable`](ValidationCode::SignatureUnavailable) once its other checks pass. Set
/// `verify_signature` to `false` or use [`validate_token_with`] and a real verifier.
pub fn validate_token(token: &Ucan, options: &ValidationOptions) -> ValidationResult {
    validate_token_with(token, options, &UnwiredVerifier)
}

/// Validates a token, checking its signature with `verifier`.
pub fn validate_token_with(
    token: &Ucan,
    options: &ValidationOptions,
    verifier: &dyn SignatureVerifier,
) -> ValidationResult {
    validate_at_depth(token, options, verifier, 0).inspect_err(|e| {
        tracing::debug!(code = %e.code(), message = e.message(), "ucan failed validation");
    })
}

pub(crate) fn validate_at_depth(
    token: &Ucan,
    options: &ValidationOptions,
    verifier: &dyn SignatureVerifier,
    depth: usize,
) -> ValidationResult {
    validate_algorithm(token.header(), options)?;
    validate_did(token.issuer(), ValidationCode::InvalidIssuer, "issuer")?;
    validate_did(token.audience(), ValidationCode::InvalidAudience, "audience")?;
    validate_timestamps(
        token.payload(),
        options.current_time(),
        options.clock_drift_tolerance,
    )?;
    validate_capabilities(token.capabilities())?;

    if options.verify_signature {
        validate_signature(token, verifier)?;
    }

    if options.validate_proof_chain {
        validate_proof_chain(token, options, verifier, depth)?;
    }

    tracing::trace!(issuer = token.issuer(), depth, "ucan is valid");

    Ok(())
}

/// Checks that the header algorithm is one of the accepted ones.
pub fn validate_algorithm(header: &UcanHeader, options: &ValidationOptions) -> ValidationResult {
    if options.algorithms.contains(&header.alg()) {
        return Ok(());
    }

    Err(ValidationError::new(
        ValidationCode::UnsupportedAlgorithm,
        format!("Unsupported algorithm: {}", header.alg()),
    ))
}

/// Checks the validity window of a payload at time `now`.
///
/// A token is expired when `now > exp + clock_drift_tolerance` and not yet valid when
/// `now < nbf - clock_drift_tolerance`. A `null` expiration never expires.
pub fn validate_timestamps(
    payload: &UcanPayload,
    now: i64,
    clock_drift_tolerance: u64,
) -> ValidationResult {
    if is_token_expired(payload, now, clock_drift_tolerance) {
        return Err(ValidationError::new(
            ValidationCode::Expired,
            format!(
                "Token expired at {} (now {now}, tolerance {clock_drift_tolerance}s)",
                payload.expiration().unwrap_or_default()
            ),
        ));
    }

    if is_token_not_yet_valid(payload, now, clock_drift_tolerance) {
        return Err(ValidationError::new(
            ValidationCode::NotYetValid,
            format!(
                "Token is not valid before {} (now {now}, tolerance {clock_drift_tolerance}s)",
                payload.not_before().unwrap_or_default()
            ),
        ));
    }

    Ok(())
}

/// Checks if the payload is past its expiration at time `now`.
pub fn is_token_expired(payload: &UcanPayload, now: i64, clock_drift_tolerance: u64) -> bool {
    payload
        .expiration()
        .is_some_and(|exp| now > exp.saturating_add_unsigned(clock_drift_tolerance))
}

/// Checks if the payload is before its not-before time at `now`.
pub fn is_token_not_yet_valid(payload: &UcanPayload, now: i64, clock_drift_tolerance: u64) -> bool {
    payload
        .not_before()
        .is_some_and(|nbf| now < nbf.saturating_sub_unsigned(clock_drift_tolerance))
}

/// Checks that there is at least one capability and each is well-formed.
///
/// A resource must be a URI with a scheme, e.g. `storage://photos`, or `*`. An ability must be a
/// `/`-separated path without empty segments or whitespace.
pub fn validate_capabilities(capabilities: &[Capability]) -> ValidationResult {
    if capabilities.is_empty() {
        return Err(ValidationError::new(
            ValidationCode::InvalidCapability,
            "Token must carry at least one capability",
        ));
    }

    for (index, capability) in capabilities.iter().enumerate() {
        let resource = capability.resource();
        if resource.is_empty() || resource.chars().any(char::is_whitespace) || !is_uri_like(resource)
        {
            return Err(ValidationError::new(
                ValidationCode::InvalidCapability,
                format!("Capability at index {index} has invalid resource {resource:?}"),
            ));
        }

        let ability = capability.ability();
        if ability.chars().any(char::is_whitespace)
            || ability.split(ABILITY_SEPARATOR).any(str::is_empty)
        {
            return Err(ValidationError::new(
                ValidationCode::InvalidCapability,
                format!("Capability at index {index} has invalid ability {ability:?}"),
            ));
        }
    }

    Ok(())
}

/// Checks that `child` is equal to or narrower than `parent` in resource and ability.
///
/// Caveats are not compared. See [`Capability::caveats_permit`].
pub fn validate_capability_attenuation(child: &Capability, parent: &Capability) -> ValidationResult {
    if !resource_permits(parent.resource(), child.resource()) {
        return Err(ValidationError::new(
            ValidationCode::AttenuationFailed,
            format!(
                "Resource {:?} is not covered by {:?}",
                child.resource(),
                parent.resource()
            ),
        ));
    }

    if !ability_permits(parent.ability(), child.ability()) {
        return Err(ValidationError::new(
            ValidationCode::AttenuationFailed,
            format!(
                "Ability {:?} is not covered by {:?}",
                child.ability(),
                parent.ability()
            ),
        ));
    }

    Ok(())
}

/// Checks the token signature over its signing message with `verifier`.
pub fn validate_signature(token: &Ucan, verifier: &dyn SignatureVerifier) -> ValidationResult {
    let message = token.signing_message().map_err(|e| {
        ValidationError::new(
            ValidationCode::InvalidSignature,
            format!("cannot build the signing message: {e}"),
        )
    })?;

    verifier.verify(
        token.algorithm(),
        token.issuer(),
        message.as_bytes(),
        token.signature().as_bytes(),
    )
}

fn validate_did(did: &str, code: ValidationCode, role: &str) -> ValidationResult {
    if is_valid_did(did) {
        return Ok(());
    }

    Err(ValidationError::new(code, format!("Invalid {role} DID: {did}")))
}

fn is_uri_like(resource: &str) -> bool {
    if resource == "*" {
        return true;
    }

    resource.split_once(':').is_some_and(|(scheme, rest)| {
        !rest.is_empty()
            && scheme
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic())
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
