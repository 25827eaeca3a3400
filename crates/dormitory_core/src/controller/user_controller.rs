//! Account controller.

use crate::controller::unique_as;
use crate::error::{require_text, Conflict, DormResult, NotFound};
use crate::model::ids::UserId;
use crate::model::user::{PasswordDigest, PrivilegeLevel, User};
use crate::store::user_store::UserStore;
use std::time::Instant;

/// Account use-cases over a `UserStore`.
pub struct UserController<S: UserStore> {
    store: S,
}

impl<S: UserStore> UserController<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Creates an account; the password is stored as a salted digest.
    ///
    /// # Errors
    /// - `InvalidInput` for a blank login or password.
    /// - `Conflict(LoginOccupied)` when the login is taken.
    pub fn add_user(
        &self,
        login: &str,
        password: &str,
        privilege: PrivilegeLevel,
    ) -> DormResult<UserId> {
        require_text("login", login)?;
        require_text("password", password)?;
        let login = login.trim();

        self.store.atomically(None, || {
            if !self.is_login_free(login)? {
                return Err(Conflict::LoginOccupied.into());
            }
            let digest = PasswordDigest::derive(password);
            self.store
                .create_user(login, &digest, privilege)
                .map_err(unique_as(Conflict::LoginOccupied))
        })
    }

    pub fn is_login_free(&self, login: &str) -> DormResult<bool> {
        Ok(self.store.get_user_id_by_login(login.trim())?.is_none())
    }

    pub fn get_user_id_by_login(&self, login: &str) -> DormResult<UserId> {
        let login = login.trim();
        self.store
            .get_user_id_by_login(login)?
            .ok_or_else(|| NotFound::Login(login.to_string()).into())
    }

    pub fn get_user(&self, id: UserId) -> DormResult<User> {
        self.store
            .get_user(id)?
            .ok_or_else(|| NotFound::User(id).into())
    }

    pub(crate) fn atomically<T, F>(&self, deadline: Option<Instant>, work: F) -> DormResult<T>
    where
        F: FnOnce() -> DormResult<T>,
    {
        self.store.atomically(deadline, work)
    }
}
