use chrono::Duration;
use jsonwebtoken::{DecodingKey, Validation, decode};
use newsroom_api::{
    config::TokenSecrets,
    id::ObjectId,
    token::{EmailClaims, SessionClaims, TokenClass, TokenCodec, TokenError},
};

fn codec() -> TokenCodec {
    TokenCodec::new(&TokenSecrets::default())
}

/// Reads the claims of a token without checking its signature or expiry.
fn payload(token: &str) -> serde_json::Value {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    decode::<serde_json::Value>(token, &DecodingKey::from_secret(&[]), &validation)
        .unwrap()
        .claims
}

#[test]
fn test_session_claims_round_trip() {
    let codec = codec();
    let claims = SessionClaims {
        sub: ObjectId::new(),
        is_admin: Some(true),
    };

    let token = codec.issue(TokenClass::Access, &claims).unwrap();
    let decoded: SessionClaims = codec.verify(TokenClass::Access, &token).unwrap();

    assert_eq!(decoded, claims);
}

#[test]
fn test_email_claims_round_trip_for_every_email_class() {
    let codec = codec();
    let claims = EmailClaims {
        email: "reader@example.com".to_string(),
    };

    for class in [TokenClass::ForgotPassword, TokenClass::SignUp, TokenClass::ChangeEmail] {
        let token = codec.issue(class, &claims).unwrap();
        let decoded: EmailClaims = codec.verify(class, &token).unwrap();
        assert_eq!(decoded, claims);
    }
}

#[test]
fn test_token_does_not_verify_under_another_class() {
    let codec = codec();
    let claims = EmailClaims {
        email: "reader@example.com".to_string(),
    };
    let token = codec.issue(TokenClass::SignUp, &claims).unwrap();

    for class in [TokenClass::ForgotPassword, TokenClass::ChangeEmail, TokenClass::Access] {
        assert_eq!(
            codec.verify::<EmailClaims>(class, &token),
            Err(TokenError::InvalidSignature)
        );
    }
}

#[test]
fn test_expired_token_is_rejected() {
    let codec = codec();
    let claims = SessionClaims {
        sub: ObjectId::new(),
        is_admin: None,
    };
    let token = codec
        .issue_with_ttl(TokenClass::Access, &claims, Some(Duration::seconds(-1)))
        .unwrap();

    assert_eq!(
        codec.verify::<SessionClaims>(TokenClass::Access, &token),
        Err(TokenError::Expired)
    );
}

#[test]
fn test_tampered_token_is_rejected() {
    let codec = codec();
    let claims = SessionClaims {
        sub: ObjectId::new(),
        is_admin: Some(false),
    };
    let token = codec.issue(TokenClass::Access, &claims).unwrap();
    let mut tampered = token.clone();
    tampered.push('x');

    assert_eq!(
        codec.verify::<SessionClaims>(TokenClass::Access, &tampered),
        Err(TokenError::InvalidSignature)
    );
    assert_eq!(
        codec.verify::<SessionClaims>(TokenClass::Access, "not.a.token"),
        Err(TokenError::InvalidSignature)
    );
}

#[test]
fn test_refresh_tokens_have_no_expiry_and_access_tokens_last_an_hour() {
    let codec = codec();
    let claims = SessionClaims {
        sub: ObjectId::new(),
        is_admin: Some(false),
    };

    let refresh = payload(&codec.issue(TokenClass::Refresh, &claims).unwrap());
    assert!(refresh.get("exp").is_none());
    assert!(refresh.get("iat").is_some());

    let access = payload(&codec.issue(TokenClass::Access, &claims).unwrap());
    let lifetime = access["exp"].as_i64().unwrap() - access["iat"].as_i64().unwrap();
    assert_eq!(lifetime, 3600);
    assert_eq!(access["isAdmin"], false);
    assert_eq!(access["sub"], claims.sub.as_str());
}

#[test]
fn test_absent_admin_claim_is_not_serialized() {
    let codec = codec();
    let claims = SessionClaims {
        sub: ObjectId::new(),
        is_admin: None,
    };

    let body = payload(&codec.issue(TokenClass::Access, &claims).unwrap());
    assert!(body.get("isAdmin").is_none());
}
