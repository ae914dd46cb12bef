//! Postgres-backed IdentityStore implementation (sqlx).

use crate::identity::models::{Account, NameInfo, NewIdentity, Role};
use crate::identity::traits::{IdentityStore, MAX_FAILED_ATTEMPTS};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use std::collections::HashMap;
use uuid::Uuid;

/// Postgres client for the identity store.
pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    /// Connect to Postgres and create the schema if missing.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await?;
        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_accounts (
                id UUID PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL,
                pseudonym_id TEXT NOT NULL UNIQUE,
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                is_locked BOOLEAN NOT NULL DEFAULT FALSE,
                failed_attempts INTEGER NOT NULL DEFAULT 0,
                created_at TIMESTAMPTZ NOT NULL,
                last_login_at TIMESTAMPTZ
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        for table in ["player_identities", "coach_identities", "admin_identities"] {
            sqlx::query(&format!(
                r#"
                CREATE TABLE IF NOT EXISTS {table} (
                    pseudonym_id TEXT PRIMARY KEY,
                    first_name TEXT NOT NULL,
                    last_name TEXT NOT NULL,
                    date_of_birth DATE,
                    email TEXT NOT NULL
                )
                "#,
            ))
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }

    fn row_to_account(row: &PgRow) -> Result<Account> {
        let role_str: String = row.try_get("role")?;
        let role =
            Role::parse(&role_str).ok_or_else(|| anyhow!("unknown account role: {}", role_str))?;
        Ok(Account {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            role,
            pseudonym_id: row.try_get("pseudonym_id")?,
            is_active: row.try_get("is_active")?,
            is_locked: row.try_get("is_locked")?,
            failed_attempts: row.try_get("failed_attempts")?,
            created_at: row.try_get("created_at")?,
            last_login_at: row.try_get("last_login_at")?,
        })
    }

    fn identity_table(role: Role) -> &'static str {
        match role {
            Role::Player => "player_identities",
            Role::Coach => "coach_identities",
            Role::Admin => "admin_identities",
        }
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let row = sqlx::query("SELECT * FROM user_accounts WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_account).transpose()
    }

    async fn create_account(&self, account: &Account, identity: &NewIdentity) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO user_accounts
                (id, email, password_hash, role, pseudonym_id,
                 is_active, is_locked, failed_attempts, created_at, last_login_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(account.id)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.role.as_str())
        .bind(&account.pseudonym_id)
        .bind(account.is_active)
        .bind(account.is_locked)
        .bind(account.failed_attempts)
        .bind(account.created_at)
        .bind(account.last_login_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(&format!(
            r#"
            INSERT INTO {} (pseudonym_id, first_name, last_name, date_of_birth, email)
            VALUES ($1, $2, $3, $4, $5)
            "#,
            Self::identity_table(account.role)
        ))
        .bind(&account.pseudonym_id)
        .bind(&identity.first_name)
        .bind(&identity.last_name)
        .bind(identity.date_of_birth)
        .bind(&identity.email)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn record_login_success(&self, account_id: Uuid) -> Result<()> {
        sqlx::query(
            "UPDATE user_accounts SET failed_attempts = 0, last_login_at = NOW() WHERE id = $1",
        )
        .bind(account_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn record_login_failure(&self, account_id: Uuid) -> Result<i32> {
        let row = sqlx::query(
            r#"
            UPDATE user_accounts
            SET failed_attempts = failed_attempts + 1,
                is_locked = (failed_attempts + 1 >= $2)
            WHERE id = $1
            RETURNING failed_attempts
            "#,
        )
        .bind(account_id)
        .bind(MAX_FAILED_ATTEMPTS)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get("failed_attempts")?)
    }

    async fn resolve_names(&self, pseudonym_ids: &[String]) -> Result<HashMap<String, NameInfo>> {
        if pseudonym_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query(
            r#"
            SELECT pseudonym_id, first_name, last_name FROM player_identities
                WHERE pseudonym_id = ANY($1)
            UNION ALL
            SELECT pseudonym_id, first_name, last_name FROM coach_identities
                WHERE pseudonym_id = ANY($1)
            UNION ALL
            SELECT pseudonym_id, first_name, last_name FROM admin_identities
                WHERE pseudonym_id = ANY($1)
            "#,
        )
        .bind(pseudonym_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut names = HashMap::with_capacity(rows.len());
        for row in rows {
            let pseudonym_id: String = row.try_get("pseudonym_id")?;
            names.insert(
                pseudonym_id,
                NameInfo {
                    first_name: row.try_get("first_name")?,
                    last_name: row.try_get("last_name")?,
                },
            );
        }
        Ok(names)
    }

    async fn health_check(&self) -> Result<bool> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(true)
    }
}
