//! Meal selection and token verification endpoints.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::Utc;

use super::{success, ApiResult};
use crate::auth::CurrentUser;
use crate::models::{
    DashboardSummary, MealFilter, MealSelection, MonthlySummary, SelectMealRequest,
    SelectMealResponse, TokenView, VerifyTokenRequest,
};
use crate::stores::date_key;
use crate::AppState;

/// POST /api/meals/select - Get today's token for a meal.
pub async fn select_meal(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<SelectMealRequest>,
) -> ApiResult<SelectMealResponse> {
    let issued = state
        .stores
        .meals
        .select(&current.user, request.meal_type, Utc::now())
        .await?;

    success(SelectMealResponse {
        token: issued.selection.token,
        meal_type: issued.selection.meal_type,
        date: issued.selection.date,
        created: issued.created,
    })
}

/// GET /api/meals/history - The caller's selections, newest first.
pub async fn meal_history(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Vec<MealSelection>> {
    success(state.stores.meals.history(&current.user.id).await)
}

/// GET /api/meals/summary - Consumed meals and bill for this month.
pub async fn monthly_summary(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<MonthlySummary> {
    let summary = state
        .stores
        .meals
        .monthly_summary(&current.user.id, Utc::now(), state.config.price_per_meal)
        .await;
    success(summary)
}

/// GET /api/admin/dashboard - Today's counts and unredeemed tokens.
pub async fn dashboard(State(state): State<AppState>) -> ApiResult<DashboardSummary> {
    let today = date_key(Utc::now().date_naive());
    let counts = state.stores.meals.counts_for(&today).await;
    let active_tokens = state
        .stores
        .meals
        .active_on(&today)
        .await
        .iter()
        .map(TokenView::from)
        .collect();

    success(DashboardSummary {
        date: today,
        counts,
        active_tokens,
    })
}

/// GET /api/admin/meals - All selections with masked tokens.
///
/// With both `date` and `mealType` set only that slot is returned.
pub async fn list_meals(
    State(state): State<AppState>,
    Query(filter): Query<MealFilter>,
) -> ApiResult<Vec<TokenView>> {
    let selections = match (&filter.date, filter.meal_type) {
        (Some(date), Some(meal_type)) => state.stores.meals.by_date_and_type(date, meal_type).await,
        _ => state
            .stores
            .meals
            .all()
            .await
            .into_iter()
            .filter(|s| filter.date.as_ref().map_or(true, |d| &s.date == d))
            .filter(|s| filter.meal_type.map_or(true, |m| s.meal_type == m))
            .collect(),
    };

    success(selections.iter().map(TokenView::from).collect())
}

/// POST /api/admin/meals/{id}/verify - Check the entered token and consume it.
pub async fn verify_token(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<VerifyTokenRequest>,
) -> ApiResult<TokenView> {
    let selection = state
        .stores
        .meals
        .verify_and_consume(&id, &request.token)
        .await?;
    success(TokenView::from(&selection))
}
