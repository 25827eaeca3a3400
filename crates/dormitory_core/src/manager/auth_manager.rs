//! Credential checks and account registration.
//!
//! Session state is not kept here: a successful login yields a
//! `RequestContext` the caller passes into later manager calls.

use crate::context::RequestContext;
use crate::controller::user_controller::UserController;
use crate::error::{AuthFailure, DormError, DormResult};
use crate::manager::observe;
use crate::model::ids::UserId;
use crate::model::user::PrivilegeLevel;
use crate::store::user_store::UserStore;

/// Authentication use-cases.
pub struct AuthManager<U: UserStore> {
    users: UserController<U>,
}

impl<U: UserStore> AuthManager<U> {
    pub fn new(users: UserController<U>) -> Self {
        Self { users }
    }

    /// Verifies a credential and returns the role it carries.
    ///
    /// # Errors
    /// - `Auth(CredentialNotFound)` when no account has `login`.
    /// - `Auth(PasswordMismatch)` when the password does not match.
    pub fn try_to_auth(
        &self,
        ctx: &RequestContext,
        login: &str,
        password: &str,
    ) -> DormResult<PrivilegeLevel> {
        observe("auth_try", ctx, || self.verify(ctx, login, password))
    }

    /// Verifies a credential and returns a context bound to that identity.
    ///
    /// The caller's deadline carries over.
    pub fn login(
        &self,
        ctx: &RequestContext,
        login: &str,
        password: &str,
    ) -> DormResult<RequestContext> {
        observe("auth_login", ctx, || {
            let role = self.verify(ctx, login, password)?;
            let session = RequestContext::authenticated(login.trim(), role);
            Ok(match ctx.deadline() {
                Some(deadline) => session.with_deadline(deadline),
                None => session,
            })
        })
    }

    /// Creates an account with an explicit role.
    pub fn register_user(
        &self,
        ctx: &RequestContext,
        login: &str,
        password: &str,
        privilege: PrivilegeLevel,
    ) -> DormResult<UserId> {
        observe("auth_register", ctx, || {
            self.users.atomically(ctx.deadline(), || {
                self.users.add_user(login, password, privilege)
            })
        })
    }

    fn verify(&self, ctx: &RequestContext, login: &str, password: &str) -> DormResult<PrivilegeLevel> {
        if self.users.is_login_free(login)? {
            return Err(AuthFailure::CredentialNotFound.into());
        }
        ctx.checkpoint()?;
        let user_id = self
            .users
            .get_user_id_by_login(login)
            .map_err(credential_not_found)?;
        ctx.checkpoint()?;
        let user = self.users.get_user(user_id).map_err(credential_not_found)?;
        if !user.password.matches(password) {
            return Err(AuthFailure::PasswordMismatch.into());
        }
        Ok(user.privilege)
    }
}

// A row that vanished between lookups reads as an unknown credential.
fn credential_not_found(err: DormError) -> DormError {
    match err {
        DormError::NotFound(_) => AuthFailure::CredentialNotFound.into(),
        other => other,
    }
}
