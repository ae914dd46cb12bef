//! Registration, login, and account lockout.
//!
//! On registration the account and real-name identity land in Postgres while
//! a pseudonymous Player/Coach node is created in the graph; the pseudonym id
//! is the only value shared between the two stores.

use crate::auth::jwt::encode_jwt;
use crate::graph::models::{CoachNode, PlayerNode};
use crate::graph::GraphStore;
use crate::identity::models::{Account, NewIdentity, Role};
use crate::identity::IdentityStore;
use crate::services::error::{ServiceError, ServiceResult};
use chrono::{NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

pub struct AuthService {
    graph: Arc<dyn GraphStore>,
    identity: Arc<dyn IdentityStore>,
    jwt_secret: String,
    jwt_expiry_secs: u64,
}

/// Registration payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    #[serde(rename = "identityType", alias = "role")]
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    // Player-only
    pub position: Option<String>,
    pub jersey_number: Option<i64>,
    // Coach-only
    pub specialization: Option<String>,
}

/// Login payload
#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Account view returned after register/login (no hash, no real name)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDto {
    pub id: String,
    pub email: String,
    #[serde(rename = "identityType")]
    pub role: Role,
    pub pseudonym_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub user: AccountDto,
}

impl AuthService {
    pub fn new(
        graph: Arc<dyn GraphStore>,
        identity: Arc<dyn IdentityStore>,
        jwt_secret: String,
        jwt_expiry_secs: u64,
    ) -> Self {
        Self {
            graph,
            identity,
            jwt_secret,
            jwt_expiry_secs,
        }
    }

    /// Generate a fresh pseudonym id, e.g. `PSY-PLAYER-3fa9c1`.
    fn generate_pseudonym_id(role: Role) -> String {
        let tag: u32 = rand::thread_rng().gen_range(0..0x1000000);
        format!("PSY-{}-{:06x}", role.as_str().to_uppercase(), tag)
    }

    pub async fn register(&self, input: RegisterInput) -> ServiceResult<AuthResponse> {
        if !input.email.contains('@') {
            return Err(ServiceError::BadRequest("Invalid email address".to_string()));
        }
        if input.password.len() < 8 {
            return Err(ServiceError::BadRequest(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        if self
            .identity
            .find_account_by_email(&input.email)
            .await?
            .is_some()
        {
            // Same status as a failed login so registration can't be used to
            // probe which emails exist
            return Err(ServiceError::Unauthorized("Registration failed".to_string()));
        }

        let password_hash = bcrypt::hash(&input.password, bcrypt::DEFAULT_COST)
            .map_err(|e| ServiceError::Internal(e.into()))?;

        let account = Account {
            id: Uuid::new_v4(),
            email: input.email.clone(),
            password_hash,
            role: input.role,
            pseudonym_id: Self::generate_pseudonym_id(input.role),
            is_active: true,
            is_locked: false,
            failed_attempts: 0,
            created_at: Utc::now(),
            last_login_at: None,
        };
        let identity = NewIdentity {
            first_name: input.first_name,
            last_name: input.last_name,
            date_of_birth: input.date_of_birth,
            email: input.email.clone(),
        };

        self.identity.create_account(&account, &identity).await?;

        match input.role {
            Role::Player => {
                self.graph
                    .create_player(&PlayerNode {
                        pseudonym_id: account.pseudonym_id.clone(),
                        position: input.position,
                        jersey_number: input.jersey_number,
                        active: true,
                    })
                    .await?;
            }
            Role::Coach => {
                self.graph
                    .create_coach(&CoachNode {
                        pseudonym_id: account.pseudonym_id.clone(),
                        specialization: input.specialization,
                    })
                    .await?;
            }
            Role::Admin => {}
        }

        tracing::info!(
            pseudonym_id = %account.pseudonym_id,
            role = account.role.as_str(),
            "Registered new account"
        );
        self.respond(&account)
    }

    pub async fn login(&self, input: LoginInput) -> ServiceResult<AuthResponse> {
        let account = self
            .identity
            .find_account_by_email(&input.email)
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("Invalid email or password".to_string()))?;

        // A locked account rejects even correct credentials until unlocked
        // out-of-band
        if account.is_locked {
            return Err(ServiceError::Unauthorized("Account is locked".to_string()));
        }
        if !account.is_active {
            return Err(ServiceError::Unauthorized("Account is disabled".to_string()));
        }

        let valid = bcrypt::verify(&input.password, &account.password_hash)
            .map_err(|e| ServiceError::Internal(e.into()))?;
        if !valid {
            let attempts = self.identity.record_login_failure(account.id).await?;
            tracing::warn!(
                pseudonym_id = %account.pseudonym_id,
                attempts,
                "Failed login attempt"
            );
            return Err(ServiceError::Unauthorized(
                "Invalid email or password".to_string(),
            ));
        }

        self.identity.record_login_success(account.id).await?;
        self.respond(&account)
    }

    fn respond(&self, account: &Account) -> ServiceResult<AuthResponse> {
        let token = encode_jwt(
            account.id,
            &account.email,
            account.role,
            &account.pseudonym_id,
            &self.jwt_secret,
            self.jwt_expiry_secs,
        )?;
        Ok(AuthResponse {
            access_token: token,
            user: AccountDto {
                id: account.id.to_string(),
                email: account.email.clone(),
                role: account.role,
                pseudonym_id: account.pseudonym_id.clone(),
            },
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
