//! IdentityStore trait definition
//!
//! Abstract interface over the relational identity store, mirroring
//! `PgIdentityStore` so tests can run against an in-memory mock.

use crate::identity::models::{Account, NameInfo, NewIdentity};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

/// Number of consecutive failed logins that locks an account.
pub const MAX_FAILED_ATTEMPTS: i32 = 5;

/// Abstract interface for account and identity operations.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Look up an account by email (login, duplicate-registration check)
    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>>;

    /// Insert the account row and the role-matching identity record in one
    /// transaction
    async fn create_account(&self, account: &Account, identity: &NewIdentity) -> Result<()>;

    /// Reset the failure counter and stamp last_login_at
    async fn record_login_success(&self, account_id: Uuid) -> Result<()>;

    /// Increment the failure counter, locking the account when it reaches
    /// MAX_FAILED_ATTEMPTS. Returns the new counter value.
    async fn record_login_failure(&self, account_id: Uuid) -> Result<i32>;

    /// Batch pseudonym -> name lookup across all identity tables. Ids with no
    /// identity record are simply absent from the result.
    async fn resolve_names(&self, pseudonym_ids: &[String]) -> Result<HashMap<String, NameInfo>>;

    /// Connectivity probe
    async fn health_check(&self) -> Result<bool>;
}
