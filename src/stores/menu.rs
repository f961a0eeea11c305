//! Weekly menu document.

use tokio::sync::RwLock;

use crate::db::{keys, KvStore};
use crate::errors::AppError;
use crate::models::{DayOfWeek, MealPatch, MealType, SingleMealMenu, WeeklyMenu};

pub struct MenuStore {
    kv: KvStore,
    menu: RwLock<WeeklyMenu>,
}

impl MenuStore {
    /// Load the saved menu, or the default one when nothing readable is stored.
    pub async fn load(kv: KvStore) -> Result<Self, AppError> {
        let menu: WeeklyMenu = kv.load_json(keys::WEEKLY_MENU).await?.ok().unwrap_or_default();

        Ok(Self {
            kv,
            menu: RwLock::new(menu),
        })
    }

    pub async fn get(&self) -> WeeklyMenu {
        self.menu.read().await.clone()
    }

    /// Replace the whole menu.
    pub async fn save(&self, new_menu: WeeklyMenu) -> Result<WeeklyMenu, AppError> {
        let mut menu = self.menu.write().await;
        self.kv.save_json(keys::WEEKLY_MENU, &new_menu).await?;
        *menu = new_menu.clone();

        tracing::info!("Weekly menu saved");
        Ok(new_menu)
    }

    /// Replace the whole menu with the default one.
    pub async fn reset(&self) -> Result<WeeklyMenu, AppError> {
        self.save(WeeklyMenu::default()).await
    }

    /// Patch a single meal entry and persist the menu.
    pub async fn patch(
        &self,
        day: DayOfWeek,
        meal_type: MealType,
        patch: &MealPatch,
    ) -> Result<SingleMealMenu, AppError> {
        let mut menu = self.menu.write().await;
        let mut next = menu.clone();
        let updated = next.patch(day, meal_type, patch).clone();
        self.kv.save_json(keys::WEEKLY_MENU, &next).await?;
        *menu = next;

        tracing::info!("Menu updated for {:?} {}", day, meal_type);
        Ok(updated)
    }
}
