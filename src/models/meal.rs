//! Meal selection model matching the frontend MealSelection interface.

use serde::{Deserialize, Serialize};

/// Meals served per day, in serving order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealType {
    pub const ALL: [MealType; 3] = [MealType::Breakfast, MealType::Lunch, MealType::Dinner];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "Breakfast",
            MealType::Lunch => "Lunch",
            MealType::Dinner => "Dinner",
        }
    }
}

impl std::fmt::Display for MealType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One issued meal token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MealSelection {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub meal_type: MealType,
    /// Calendar date, YYYY-MM-DD
    pub date: String,
    pub token: String,
    pub consumed: bool,
    /// Creation time in epoch milliseconds
    pub timestamp: i64,
}

/// Hide all but the last four characters of a token.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}

/// A selection as shown to staff: the token is masked so it has to be read
/// off the student's screen.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenView {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub meal_type: MealType,
    pub date: String,
    pub masked_token: String,
    pub consumed: bool,
    pub timestamp: i64,
}

impl From<&MealSelection> for TokenView {
    fn from(selection: &MealSelection) -> Self {
        Self {
            id: selection.id.clone(),
            user_id: selection.user_id.clone(),
            user_name: selection.user_name.clone(),
            meal_type: selection.meal_type,
            date: selection.date.clone(),
            masked_token: mask_token(&selection.token),
            consumed: selection.consumed,
            timestamp: selection.timestamp,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MealCount {
    pub meal_type: MealType,
    pub count: usize,
}

/// Request body for selecting a meal.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectMealRequest {
    pub meal_type: MealType,
}

/// Result of a selection: `created` is false when today's token already existed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectMealResponse {
    pub token: String,
    pub meal_type: MealType,
    pub date: String,
    pub created: bool,
}

/// Request body for staff token verification.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyTokenRequest {
    #[serde(default)]
    pub token: String,
}

/// Query string for filtering the admin token list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealFilter {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub meal_type: Option<MealType>,
}

/// Today's counts and outstanding tokens for the admin dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub date: String,
    pub counts: Vec<MealCount>,
    pub active_tokens: Vec<TokenView>,
}

/// Consumed meals and resulting bill for the current month.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    /// YYYY-MM
    pub month: String,
    pub consumed_meals: usize,
    pub price_per_meal: u32,
    pub total_bill: u64,
}
