//! 账户与令牌服务
//!
//! 账户来自配置，启动时用 argon2 哈希口令，明文不保留。每个账户最多一个
//! 令牌，重复登录返回同一个令牌。

use std::collections::HashMap;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::RngCore;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::infrastructure::config::AuthConfig;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("failed to hash password for {username}: {reason}")]
    Hash { username: String, reason: String },
}

#[derive(Debug, Clone)]
pub struct Account {
    pub username: String,
    pub is_staff: bool,
    password_hash: String,
}

#[derive(Debug, Default)]
struct TokenTable {
    by_username: HashMap<String, String>,
    by_key: HashMap<String, String>,
}

#[derive(Debug)]
pub struct Authenticator {
    accounts: HashMap<String, Account>,
    tokens: RwLock<TokenTable>,
    require_token: bool,
}

impl Authenticator {
    pub fn from_config(config: &AuthConfig) -> Result<Self, AuthError> {
        let mut accounts = HashMap::new();
        for account in &config.accounts {
            let password_hash = hash_password(&account.password).map_err(|e| AuthError::Hash {
                username: account.username.clone(),
                reason: e.to_string(),
            })?;
            accounts.insert(
                account.username.clone(),
                Account {
                    username: account.username.clone(),
                    is_staff: account.is_staff,
                    password_hash,
                },
            );
        }
        info!("Loaded {} account(s)", accounts.len());

        Ok(Self {
            accounts,
            tokens: RwLock::new(TokenTable::default()),
            require_token: config.require_token,
        })
    }

    pub fn require_token(&self) -> bool {
        self.require_token
    }

    /// 校验口令，成功返回账户
    ///
    /// argon2 校验耗 CPU，放到阻塞线程池执行。
    pub async fn check_credentials(&self, username: &str, password: &str) -> Option<Account> {
        let account = self.accounts.get(username)?.clone();
        let password_hash = account.password_hash.clone();
        let password = password.to_owned();

        let verified =
            tokio::task::spawn_blocking(move || verify_password(&password_hash, &password))
                .await
                .unwrap_or_else(|e| {
                    warn!("Password verification task failed: {}", e);
                    false
                });
        verified.then_some(account)
    }

    /// 校验口令并返回该账户的令牌（不存在则生成）
    pub async fn obtain_token(&self, username: &str, password: &str) -> Option<String> {
        let Some(account) = self.check_credentials(username, password).await else {
            warn!("Rejected token request for {:?}", username);
            return None;
        };

        let mut tokens = self.tokens.write().await;
        if let Some(key) = tokens.by_username.get(&account.username) {
            return Some(key.clone());
        }

        let key = new_token_key();
        tokens
            .by_username
            .insert(account.username.clone(), key.clone());
        tokens.by_key.insert(key.clone(), account.username.clone());
        info!("Issued token for {}", account.username);
        Some(key)
    }

    /// 令牌对应的账户名
    pub async fn authenticate_token(&self, key: &str) -> Option<String> {
        self.tokens.read().await.by_key.get(key).cloned()
    }
}

fn verify_password(password_hash: &str, password: &str) -> bool {
    PasswordHash::new(password_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// 40 位小写十六进制
fn new_token_key() -> String {
    let mut buf = [0u8; 20];
    rand::thread_rng().fill_bytes(&mut buf);
    hex::encode(buf)
}
