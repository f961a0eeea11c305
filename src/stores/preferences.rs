//! Per-user theme preference.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::db::{keys, KvStore};
use crate::errors::AppError;
use crate::models::Theme;

pub struct PreferenceStore {
    kv: KvStore,
    themes: RwLock<HashMap<String, Theme>>,
}

impl PreferenceStore {
    pub async fn load(kv: KvStore) -> Result<Self, AppError> {
        let themes: HashMap<String, Theme> =
            kv.load_json(keys::THEME).await?.ok().unwrap_or_default();

        Ok(Self {
            kv,
            themes: RwLock::new(themes),
        })
    }

    pub async fn theme(&self, user_id: &str) -> Theme {
        self.themes
            .read()
            .await
            .get(user_id)
            .copied()
            .unwrap_or_default()
    }

    pub async fn set_theme(&self, user_id: &str, theme: Theme) -> Result<Theme, AppError> {
        self.store(user_id, |_| theme).await
    }

    pub async fn toggle_theme(&self, user_id: &str) -> Result<Theme, AppError> {
        self.store(user_id, Theme::toggled).await
    }

    /// Compute the user's new theme from the current one, persist, then commit.
    async fn store(&self, user_id: &str, update: impl FnOnce(Theme) -> Theme) -> Result<Theme, AppError> {
        let mut themes = self.themes.write().await;
        let theme = update(themes.get(user_id).copied().unwrap_or_default());

        let mut next = themes.clone();
        next.insert(user_id.to_string(), theme);
        self.kv.save_json(keys::THEME, &next).await?;
        *themes = next;
        Ok(theme)
    }
}
