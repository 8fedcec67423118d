use serde_json::json;
use sonr_key::{DidKeyEncode, Ed25519KeyPair, GetPublicKey, KeyPairGenerate, P256KeyPair};
use sonr_ucan::{
    format_token, parse_token, validate_capability_attenuation, validate_timestamps,
    validate_token, validate_token_with, Capability, DidKeyVerifier, TokenPart, Ucan, UcanBuilder,
    UcanError, UcanHeader, UcanPayload, UcanSignature, ValidationCode, ValidationOptions,
};

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[test_log::test]
fn test_concrete_token_round_trip() -> anyhow::Result<()> {
    let payload = UcanPayload::new(
        "did:key:abc",
        "did:key:xyz",
        Some(1735689600),
        vec![Capability::new("storage://x", "crud/read")],
    );
    let token = Ucan::from_parts(
        UcanHeader::default(),
        payload,
        UcanSignature::from(vec![1u8, 2, 3, 4, 5]),
    );

    let formatted = format_token(&token)?;
    assert_eq!(formatted.split('.').count(), 3);

    let parsed = parse_token(&formatted)?;
    assert_eq!(parsed.header().alg().as_str(), "EdDSA");
    assert_eq!(parsed.header().typ(), "JWT");
    assert_eq!(parsed.header().version(), "0.10.0");
    assert_eq!(parsed.issuer(), "did:key:abc");
    assert_eq!(parsed.audience(), "did:key:xyz");
    assert_eq!(parsed.expiration(), Some(1735689600));
    assert_eq!(
        parsed.capabilities(),
        [Capability::new("storage://x", "crud/read")]
    );
    assert_eq!(parsed.signature().as_bytes(), [1, 2, 3, 4, 5]);
    assert_eq!(format_token(&parsed)?, formatted);

    Ok(())
}

#[test_log::test]
fn test_expired_token() -> anyhow::Result<()> {
    let now = 1_700_000_000;
    let token = UcanBuilder::default()
        .issuer("did:key:abc")?
        .audience("did:key:xyz")?
        .expiration(Some(now - 3600))?
        .add_capability(Capability::new("storage://x", "crud/read"))?
        .build_token(&[1])?;

    let result = validate_timestamps(token.payload(), now, 60);
    assert_eq!(result.map_err(|e| e.code()), Err(ValidationCode::Expired));

    let options = ValidationOptions::builder().now(now).build();
    let result = validate_token(&token, &options);
    assert_eq!(result.map_err(|e| e.code()), Err(ValidationCode::Expired));

    Ok(())
}

#[test_log::test]
fn test_null_expiration_never_expires() -> anyhow::Result<()> {
    let token = UcanBuilder::default()
        .issuer("did:key:abc")?
        .audience("did:key:xyz")?
        .expiration(None)?
        .add_capability(Capability::new("storage://x", "crud/read"))?
        .build_token(&[1])?;

    for now in [i64::MIN, 0, 1_700_000_000, i64::MAX] {
        assert!(validate_timestamps(token.payload(), now, 0).is_ok());
    }

    Ok(())
}

#[test_log::test]
fn test_attenuation_scenarios() {
    let parent = Capability::new("storage://*", "crud/*");

    assert!(validate_capability_attenuation(
        &Capability::new("storage://photos", "crud/read"),
        &parent
    )
    .is_ok());

    assert!(validate_capability_attenuation(
        &Capability::new("different://x", "crud/*"),
        &parent
    )
    .is_err());
}

#[test_log::test]
fn test_builder_aggregate_error() {
    let error = UcanBuilder::default().build(&[1, 2, 3]);
    match error {
        Err(UcanError::Incomplete(violations)) => assert_eq!(violations.len(), 4),
        other => panic!("expected all four violations, got {other:?}"),
    }
}

#[test_log::test]
fn test_parser_rejections() -> anyhow::Result<()> {
    let valid = UcanBuilder::default()
        .issuer("did:key:abc")?
        .audience("did:key:xyz")?
        .expiration(None)?
        .add_capability(Capability::new("storage://x", "crud/read"))?
        .build(&[1, 2, 3])?;
    let parts = valid.split('.').collect::<Vec<_>>();
    let &[header, payload, signature] = parts.as_slice() else {
        anyhow::bail!("built token does not have three parts");
    };

    let segment = |value: serde_json::Value| sonr_ucan::encode_string(value.to_string());
    let bad_alg = segment(json!({ "alg": "HS256", "typ": "JWT", "ucv": "0.10.0" }));
    let no_iss = segment(json!({ "aud": "did:key:xyz", "exp": null, "att": [{ "with": "a:b", "can": "c" }] }));
    let no_aud = segment(json!({ "iss": "did:key:abc", "exp": null, "att": [{ "with": "a:b", "can": "c" }] }));
    let no_att = segment(json!({ "iss": "did:key:abc", "aud": "did:key:xyz", "exp": null, "att": [] }));
    let bad_cap = segment(json!({
        "iss": "did:key:abc",
        "aud": "did:key:xyz",
        "exp": null,
        "att": [{ "with": "a:b", "can": "c" }, { "with": "a:b", "can": "c" }, { "with": "a:b" }],
    }));

    let rejected = [
        format!("{header}.{payload}"),
        format!("{header}.{payload}.{signature}.{signature}"),
        format!(".{payload}.{signature}"),
        format!("{header}..{signature}"),
        format!("{header}.{payload}."),
        format!("{header}.{payload}.***"),
        format!("{header}.pay+load.{signature}"),
        format!("{bad_alg}.{payload}.{signature}"),
        format!("{header}.{no_iss}.{signature}"),
        format!("{header}.{no_aud}.{signature}"),
        format!("{header}.{no_att}.{signature}"),
    ];

    for token in &rejected {
        let result = parse_token(token);
        tracing::debug!(?token, ?result);
        assert!(result.is_err(), "{token} should be rejected");
    }

    match parse_token(&format!("{header}.{bad_cap}.{signature}")) {
        Err(UcanError::Schema {
            part: TokenPart::Payload,
            violations,
        }) => assert_eq!(
            violations,
            ["Capability at index 2 missing or invalid 'can' field"]
        ),
        other => panic!("expected payload schema error, got {other:?}"),
    }

    Ok(())
}

#[test_log::test]
fn test_signed_delegation_chain() -> anyhow::Result<()> {
    let rng = &mut rand::thread_rng();
    let alice = Ed25519KeyPair::generate(rng)?;
    let bob = P256KeyPair::generate(rng)?;
    let carol = Ed25519KeyPair::generate(rng)?;

    let root = UcanBuilder::default()
        .issuer(alice.public_key().to_did_key())?
        .audience(bob.public_key().to_did_key())?
        .expires_in(3600.0)?
        .add_capability(Capability::new("storage://alice/*", "crud/*"))?
        .sign(&alice)?;

    let child = UcanBuilder::default()
        .issuer(bob.public_key().to_did_key())?
        .audience(carol.public_key().to_did_key())?
        .expires_in(600.0)?
        .random_nonce()
        .add_capability(Capability::new("storage://alice/photos", "crud/read"))?
        .add_proof(root.clone())?
        .sign(&bob)?;

    let options = ValidationOptions::builder().validate_proof_chain(true).build();
    let verifier = DidKeyVerifier::did_key();

    let child = parse_token(&child)?;
    validate_token_with(&child, &options, &verifier)?;

    let unwired = validate_token(&child, &options);
    assert_eq!(
        unwired.map_err(|e| e.code()),
        Err(ValidationCode::SignatureUnavailable)
    );

    let forged = Ucan::from_parts(
        child.header().clone(),
        child.payload().clone(),
        vec![7u8; 64],
    );
    let result = validate_token_with(&forged, &options, &verifier);
    assert_eq!(
        result.map_err(|e| e.code()),
        Err(ValidationCode::InvalidSignature)
    );

    let escalated = UcanBuilder::default()
        .issuer(bob.public_key().to_did_key())?
        .audience(carol.public_key().to_did_key())?
        .expires_in(600.0)?
        .add_capability(Capability::new("storage://bob/photos", "crud/read"))?
        .add_proof(root)?
        .sign(&bob)?;
    let result = validate_token_with(&parse_token(&escalated)?, &options, &verifier);
    assert_eq!(
        result.map_err(|e| e.code()),
        Err(ValidationCode::AttenuationFailed)
    );

    Ok(())
}
