//! In-memory mock implementation of IdentityStore.

use crate::identity::models::{Account, NameInfo, NewIdentity};
use crate::identity::traits::{IdentityStore, MAX_FAILED_ATTEMPTS};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory mock implementation of IdentityStore.
#[derive(Default)]
pub struct MockIdentityStore {
    /// Keyed by account id
    pub accounts: RwLock<HashMap<Uuid, Account>>,
    /// pseudonym_id -> name record
    pub names: RwLock<HashMap<String, NameInfo>>,
    /// When true, every query returns an error.
    pub fail_queries: RwLock<bool>,
}

impl MockIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_failing(&self, failing: bool) {
        *self.fail_queries.write().await = failing;
    }

    async fn check_failing(&self) -> Result<()> {
        if *self.fail_queries.read().await {
            Err(anyhow!("mock identity store failure"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl IdentityStore for MockIdentityStore {
    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        self.check_failing().await?;
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|a| a.email == email)
            .cloned())
    }

    async fn create_account(&self, account: &Account, identity: &NewIdentity) -> Result<()> {
        self.check_failing().await?;
        let mut accounts = self.accounts.write().await;
        if accounts.values().any(|a| a.email == account.email) {
            return Err(anyhow!("duplicate email"));
        }
        accounts.insert(account.id, account.clone());
        self.names.write().await.insert(
            account.pseudonym_id.clone(),
            NameInfo {
                first_name: identity.first_name.clone(),
                last_name: identity.last_name.clone(),
            },
        );
        Ok(())
    }

    async fn record_login_success(&self, account_id: Uuid) -> Result<()> {
        self.check_failing().await?;
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(&account_id)
            .ok_or_else(|| anyhow!("account not found"))?;
        account.failed_attempts = 0;
        account.last_login_at = Some(chrono::Utc::now());
        Ok(())
    }

    async fn record_login_failure(&self, account_id: Uuid) -> Result<i32> {
        self.check_failing().await?;
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(&account_id)
            .ok_or_else(|| anyhow!("account not found"))?;
        account.failed_attempts += 1;
        if account.failed_attempts >= MAX_FAILED_ATTEMPTS {
            account.is_locked = true;
        }
        Ok(account.failed_attempts)
    }

    async fn resolve_names(&self, pseudonym_ids: &[String]) -> Result<HashMap<String, NameInfo>> {
        self.check_failing().await?;
        let names = self.names.read().await;
        Ok(pseudonym_ids
            .iter()
            .filter_map(|id| names.get(id).map(|n| (id.clone(), n.clone())))
            .collect())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(!*self.fail_queries.read().await)
    }
}
