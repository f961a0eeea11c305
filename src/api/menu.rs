//! Weekly menu endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{Datelike, Utc};

use super::{success, ApiResult};
use crate::models::{DailyMenu, DayOfWeek, MealPatch, MealType, SingleMealMenu, WeeklyMenu};
use crate::AppState;

/// GET /api/menu - The weekly menu.
pub async fn get_menu(State(state): State<AppState>) -> ApiResult<WeeklyMenu> {
    success(state.stores.menu.get().await)
}

/// GET /api/menu/today - Today's meals (UTC weekday).
pub async fn today_menu(State(state): State<AppState>) -> ApiResult<DailyMenu> {
    let day = DayOfWeek::from(Utc::now().weekday());
    let menu = state.stores.menu.get().await;
    let daily = MealType::ALL
        .into_iter()
        .filter_map(|meal_type| menu.meal(day, meal_type).map(|m| (meal_type, m.clone())))
        .collect();
    success(daily)
}

/// PUT /api/admin/menu - Replace the whole menu.
pub async fn save_menu(
    State(state): State<AppState>,
    Json(menu): Json<WeeklyMenu>,
) -> ApiResult<WeeklyMenu> {
    success(state.stores.menu.save(menu).await?)
}

/// POST /api/admin/menu/reset - Restore the default menu.
pub async fn reset_menu(State(state): State<AppState>) -> ApiResult<WeeklyMenu> {
    success(state.stores.menu.reset().await?)
}

/// PATCH /api/admin/menu/{day}/{mealType} - Update one meal entry.
pub async fn patch_meal(
    State(state): State<AppState>,
    Path((day, meal_type)): Path<(DayOfWeek, MealType)>,
    Json(patch): Json<MealPatch>,
) -> ApiResult<SingleMealMenu> {
    success(state.stores.menu.patch(day, meal_type, &patch).await?)
}
