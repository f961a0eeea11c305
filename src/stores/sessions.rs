//! Logged-in users keyed by session token.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::db::{keys, KvStore};
use crate::errors::AppError;
use crate::models::User;

pub struct SessionStore {
    kv: KvStore,
    sessions: RwLock<HashMap<String, User>>,
}

impl SessionStore {
    /// Restore persisted sessions; an unreadable document logs everyone out.
    pub async fn load(kv: KvStore) -> Result<Self, AppError> {
        let sessions: HashMap<String, User> =
            kv.load_json(keys::SESSIONS).await?.ok().unwrap_or_default();
        tracing::debug!("Restored {} sessions", sessions.len());

        Ok(Self {
            kv,
            sessions: RwLock::new(sessions),
        })
    }

    /// Start a session for `user` and return its token.
    pub async fn create(&self, user: &User) -> Result<String, AppError> {
        let token = uuid::Uuid::new_v4().to_string();
        let mut sessions = self.sessions.write().await;
        let mut next = sessions.clone();
        next.insert(token.clone(), user.without_password());
        self.kv.save_json(keys::SESSIONS, &next).await?;
        *sessions = next;
        Ok(token)
    }

    pub async fn get(&self, token: &str) -> Option<User> {
        self.sessions.read().await.get(token).cloned()
    }

    /// End a session. Returns whether it existed.
    pub async fn remove(&self, token: &str) -> Result<bool, AppError> {
        let mut sessions = self.sessions.write().await;
        if !sessions.contains_key(token) {
            return Ok(false);
        }
        let mut next = sessions.clone();
        next.remove(token);
        self.kv.save_json(keys::SESSIONS, &next).await?;
        *sessions = next;
        Ok(true)
    }
}
