use dormitory_core::db::open_db_in_memory;
use dormitory_core::{
    AuthFailure, Conflict, DormError, Dormitory, ErrorKind, PrivilegeLevel, RequestContext,
};
use std::time::Duration;

#[test]
fn registered_user_can_authenticate() {
    let conn = open_db_in_memory().unwrap();
    let dorm = Dormitory::try_new(&conn).unwrap();
    let ctx = RequestContext::anonymous();

    dorm.auth
        .register_user(&ctx, "warden", "keys", PrivilegeLevel::Comend)
        .unwrap();
    assert_eq!(
        dorm.auth.try_to_auth(&ctx, "warden", "keys").unwrap(),
        PrivilegeLevel::Comend
    );
}

#[test]
fn unknown_login_and_wrong_password_are_distinct() {
    let conn = open_db_in_memory().unwrap();
    let dorm = Dormitory::try_new(&conn).unwrap();
    let ctx = RequestContext::anonymous();
    dorm.auth
        .register_user(&ctx, "supply", "boxes", PrivilegeLevel::Supply)
        .unwrap();

    let missing = dorm.auth.try_to_auth(&ctx, "nobody", "boxes").unwrap_err();
    assert!(matches!(
        missing,
        DormError::Auth(AuthFailure::CredentialNotFound)
    ));
    assert_eq!(missing.to_string(), "user not found");

    let mismatch = dorm.auth.try_to_auth(&ctx, "supply", "crates").unwrap_err();
    assert!(matches!(
        mismatch,
        DormError::Auth(AuthFailure::PasswordMismatch)
    ));
    assert_eq!(mismatch.kind(), ErrorKind::Auth);
}

#[test]
fn login_yields_authenticated_context() {
    let conn = open_db_in_memory().unwrap();
    let dorm = Dormitory::try_new(&conn).unwrap();
    let ctx = RequestContext::anonymous().with_timeout(Duration::from_secs(60));
    dorm.auth
        .register_user(&ctx, "supply", "boxes", PrivilegeLevel::Supply)
        .unwrap();

    let session = dorm.auth.login(&ctx, "supply", "boxes").unwrap();
    assert_eq!(session.login(), Some("supply"));
    assert_eq!(session.actor(), "supply");
    assert_eq!(session.role(), PrivilegeLevel::Supply);
    assert_eq!(session.deadline(), ctx.deadline());
}

#[test]
fn duplicate_login_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let dorm = Dormitory::try_new(&conn).unwrap();
    let ctx = RequestContext::anonymous();
    dorm.auth
        .register_user(&ctx, "supply", "boxes", PrivilegeLevel::Supply)
        .unwrap();

    let err = dorm
        .auth
        .register_user(&ctx, "supply", "other", PrivilegeLevel::Student)
        .unwrap_err();
    assert!(matches!(err, DormError::Conflict(Conflict::LoginOccupied)));
    assert_eq!(
        dorm.auth.try_to_auth(&ctx, "supply", "boxes").unwrap(),
        PrivilegeLevel::Supply
    );
}

#[test]
fn passwords_are_not_stored_in_clear() {
    let conn = open_db_in_memory().unwrap();
    let dorm = Dormitory::try_new(&conn).unwrap();
    let ctx = RequestContext::anonymous();
    dorm.auth
        .register_user(&ctx, "warden", "plain-text", PrivilegeLevel::Comend)
        .unwrap();

    let (salt, hash): (String, String) = conn
        .query_row(
            "SELECT password_salt, password_hash FROM users WHERE login = 'warden';",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert!(!salt.is_empty());
    assert_ne!(hash, "plain-text");
    assert_eq!(hash.len(), 64);
}
