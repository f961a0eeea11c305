//! Meal token issuance and redemption.
//!
//! A student gets at most one selection per meal type per calendar day;
//! asking again returns the token already issued. Staff redeem a token by
//! typing it in; a selection only ever moves from active to consumed.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rand::{distributions::Alphanumeric, Rng};
use tokio::sync::RwLock;

use crate::db::{keys, KvStore, Loaded};
use crate::errors::AppError;
use crate::models::{MealCount, MealSelection, MealType, MonthlySummary, User};

/// Length of generated meal tokens.
pub const TOKEN_LEN: usize = 8;

/// Random uppercase alphanumeric token. Collisions with existing tokens are
/// not checked.
pub fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(|b| (b as char).to_ascii_uppercase())
        .collect()
}

/// Date key used for the one-per-day rule.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Outcome of a selection request.
#[derive(Debug, Clone)]
pub struct Issued {
    pub selection: MealSelection,
    /// False when today's selection already existed
    pub created: bool,
}

pub struct MealStore {
    kv: KvStore,
    selections: RwLock<Vec<MealSelection>>,
}

impl MealStore {
    /// Load selections. An unreadable document is dropped and the store
    /// starts empty.
    pub async fn load(kv: KvStore) -> Result<Self, AppError> {
        let selections = match kv.load_json::<Vec<MealSelection>>(keys::MEALS).await? {
            Loaded::Value(selections) => selections,
            Loaded::Missing => Vec::new(),
            Loaded::Corrupt => {
                kv.remove(keys::MEALS).await?;
                Vec::new()
            }
        };

        Ok(Self {
            kv,
            selections: RwLock::new(selections),
        })
    }

    /// Issue `meal_type` for `user` on the day of `now`, or return the
    /// selection already issued for that day.
    pub async fn select(
        &self,
        user: &User,
        meal_type: MealType,
        now: DateTime<Utc>,
    ) -> Result<Issued, AppError> {
        let today = date_key(now.date_naive());
        let mut selections = self.selections.write().await;

        if let Some(existing) = selections
            .iter()
            .find(|s| s.user_id == user.id && s.meal_type == meal_type && s.date == today)
        {
            tracing::debug!("{} already selected {} on {}", user.id, meal_type, today);
            return Ok(Issued {
                selection: existing.clone(),
                created: false,
            });
        }

        let selection = MealSelection {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            user_name: user.name.clone(),
            meal_type,
            date: today,
            token: generate_token(),
            consumed: false,
            timestamp: now.timestamp_millis(),
        };

        // Persist before committing so a failed write leaves no phantom token
        let mut next = selections.clone();
        next.push(selection.clone());
        self.kv.save_json(keys::MEALS, &next).await?;
        *selections = next;

        tracing::info!(
            "Issued {} token for {} on {}",
            selection.meal_type,
            selection.user_id,
            selection.date
        );
        Ok(Issued {
            selection,
            created: true,
        })
    }

    /// Compare the staff-entered token with the selection's token, ignoring
    /// case and surrounding whitespace, and mark it consumed on a match.
    ///
    /// Re-verifying a consumed selection succeeds without changes. A wrong
    /// token changes nothing; there is no attempt limit.
    pub async fn verify_and_consume(
        &self,
        selection_id: &str,
        entered: &str,
    ) -> Result<MealSelection, AppError> {
        let entered = entered.trim();
        if entered.is_empty() {
            return Err(AppError::Validation(
                "Please enter the student's token.".to_string(),
            ));
        }

        let mut selections = self.selections.write().await;
        let index = selections
            .iter()
            .position(|s| s.id == selection_id)
            .ok_or_else(|| AppError::NotFound(format!("Meal selection {} not found", selection_id)))?;

        let selection = &selections[index];
        if !selection.token.eq_ignore_ascii_case(entered) {
            tracing::warn!("Token mismatch for selection {}", selection_id);
            return Err(AppError::VerificationFailed(
                "The entered token is incorrect. Please try again.".to_string(),
            ));
        }

        if selection.consumed {
            return Ok(selection.clone());
        }

        let mut next = selections.clone();
        next[index].consumed = true;
        let consumed = next[index].clone();
        self.kv.save_json(keys::MEALS, &next).await?;
        *selections = next;

        tracing::info!("Token for {} consumed ({})", consumed.user_name, consumed.meal_type);
        Ok(consumed)
    }

    /// A user's selections, newest first.
    pub async fn history(&self, user_id: &str) -> Vec<MealSelection> {
        let mut history: Vec<MealSelection> = self
            .selections
            .read()
            .await
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        sort_newest_first(&mut history);
        history
    }

    /// Every selection, newest first.
    pub async fn all(&self) -> Vec<MealSelection> {
        let mut all = self.selections.read().await.clone();
        sort_newest_first(&mut all);
        all
    }

    /// Selections for one date and meal type, in issue order.
    pub async fn by_date_and_type(&self, date: &str, meal_type: MealType) -> Vec<MealSelection> {
        self.selections
            .read()
            .await
            .iter()
            .filter(|s| s.date == date && s.meal_type == meal_type)
            .cloned()
            .collect()
    }

    /// Number of selections per meal type on `date`.
    pub async fn counts_for(&self, date: &str) -> Vec<MealCount> {
        let selections = self.selections.read().await;
        MealType::ALL
            .into_iter()
            .map(|meal_type| MealCount {
                meal_type,
                count: selections
                    .iter()
                    .filter(|s| s.date == date && s.meal_type == meal_type)
                    .count(),
            })
            .collect()
    }

    /// Unconsumed selections on `date`, newest first.
    pub async fn active_on(&self, date: &str) -> Vec<MealSelection> {
        let mut active: Vec<MealSelection> = self
            .selections
            .read()
            .await
            .iter()
            .filter(|s| s.date == date && !s.consumed)
            .cloned()
            .collect();
        sort_newest_first(&mut active);
        active
    }

    /// Consumed meals of `user_id` in the month of `now`, priced per meal.
    pub async fn monthly_summary(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
        price_per_meal: u32,
    ) -> MonthlySummary {
        let consumed_meals = self
            .selections
            .read()
            .await
            .iter()
            .filter(|s| s.user_id == user_id && s.consumed)
            .filter_map(|s| DateTime::from_timestamp_millis(s.timestamp))
            .filter(|at| at.year() == now.year() && at.month() == now.month())
            .count();

        MonthlySummary {
            month: now.format("%Y-%m").to_string(),
            consumed_meals,
            price_per_meal,
            total_bill: consumed_meals as u64 * u64::from(price_per_meal),
        }
    }
}

fn sort_newest_first(selections: &mut [MealSelection]) {
    selections.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use crate::models::UserRole;
    use chrono::TimeZone;
    use tempfile::TempDir;

    async fn open_kv() -> (KvStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let pool = init_database(&dir.path().join("meals.sqlite")).await.unwrap();
        (KvStore::new(pool), dir)
    }

    fn student(id: &str) -> User {
        User {
            id: id.to_string(),
            email: format!("{}@example.com", id),
            name: format!("Name of {}", id),
            role: UserRole::Student,
            hostel: Some("Hostel A".to_string()),
            password: None,
        }
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_generate_token_shape() {
        for _ in 0..50 {
            let token = generate_token();
            assert_eq!(token.len(), TOKEN_LEN);
            assert!(token
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        }
    }

    #[tokio::test]
    async fn test_select_twice_same_day_returns_same_token() {
        let (kv, _dir) = open_kv().await;
        let meals = MealStore::load(kv).await.unwrap();
        let user = student("student1");

        let first = meals.select(&user, MealType::Breakfast, at(10, 7)).await.unwrap();
        assert!(first.created);
        assert!(!first.selection.consumed);
        assert_eq!(first.selection.date, "2024-05-10");

        let second = meals.select(&user, MealType::Breakfast, at(10, 9)).await.unwrap();
        assert!(!second.created);
        assert_eq!(second.selection.token, first.selection.token);
        assert_eq!(meals.all().await.len(), 1);
    }

    #[tokio::test]
    async fn test_select_is_per_user_meal_and_day() {
        let (kv, _dir) = open_kv().await;
        let meals = MealStore::load(kv).await.unwrap();

        meals.select(&student("a"), MealType::Lunch, at(10, 12)).await.unwrap();
        meals.select(&student("a"), MealType::Dinner, at(10, 19)).await.unwrap();
        meals.select(&student("b"), MealType::Lunch, at(10, 12)).await.unwrap();
        let next_day = meals.select(&student("a"), MealType::Lunch, at(11, 12)).await.unwrap();

        assert!(next_day.created);
        assert_eq!(meals.all().await.len(), 4);
    }

    #[tokio::test]
    async fn test_scenario_select_reselect_redeem() {
        let (kv, _dir) = open_kv().await;
        let meals = MealStore::load(kv.clone()).await.unwrap();
        let user = student("student1");

        let issued = meals.select(&user, MealType::Breakfast, at(10, 7)).await.unwrap();
        let again = meals.select(&user, MealType::Breakfast, at(10, 8)).await.unwrap();
        assert_eq!(again.selection.token, issued.selection.token);
        assert_eq!(meals.all().await.len(), 1);

        let entered = format!("  {}  ", issued.selection.token.to_lowercase());
        let consumed = meals
            .verify_and_consume(&issued.selection.id, &entered)
            .await
            .unwrap();
        assert!(consumed.consumed);

        // Persisted
        let reloaded = MealStore::load(kv).await.unwrap();
        assert!(reloaded.all().await[0].consumed);
    }

    #[tokio::test]
    async fn test_wrong_token_changes_nothing_and_redeem_is_idempotent() {
        let (kv, _dir) = open_kv().await;
        let meals = MealStore::load(kv).await.unwrap();
        let issued = meals
            .select(&student("s"), MealType::Dinner, at(10, 19))
            .await
            .unwrap();
        let id = issued.selection.id.clone();

        for _ in 0..3 {
            let err = meals.verify_and_consume(&id, "WRONG123").await.unwrap_err();
            assert!(matches!(err, AppError::VerificationFailed(_)));
        }
        assert!(!meals.all().await[0].consumed);

        let err = meals.verify_and_consume(&id, "   ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        meals.verify_and_consume(&id, &issued.selection.token).await.unwrap();
        let again = meals.verify_and_consume(&id, &issued.selection.token).await.unwrap();
        assert!(again.consumed);

        // A wrong token after consumption does not revert it
        assert!(meals.verify_and_consume(&id, "WRONG123").await.is_err());
        assert!(meals.all().await[0].consumed);

        let err = meals.verify_and_consume("missing", "X").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_queries_and_counts() {
        let (kv, _dir) = open_kv().await;
        let meals = MealStore::load(kv).await.unwrap();

        let a = meals.select(&student("a"), MealType::Breakfast, at(10, 7)).await.unwrap();
        meals.select(&student("b"), MealType::Breakfast, at(10, 8)).await.unwrap();
        meals.select(&student("a"), MealType::Dinner, at(10, 19)).await.unwrap();
        meals.select(&student("a"), MealType::Dinner, at(9, 19)).await.unwrap();
        meals
            .verify_and_consume(&a.selection.id, &a.selection.token)
            .await
            .unwrap();

        let counts = meals.counts_for("2024-05-10").await;
        assert_eq!(
            counts,
            vec![
                MealCount { meal_type: MealType::Breakfast, count: 2 },
                MealCount { meal_type: MealType::Lunch, count: 0 },
                MealCount { meal_type: MealType::Dinner, count: 1 },
            ]
        );

        let active = meals.active_on("2024-05-10").await;
        assert_eq!(active.len(), 2);
        assert!(active.iter().all(|s| !s.consumed));

        let history = meals.history("a").await;
        assert_eq!(history.len(), 3);
        assert!(history.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));

        let breakfasts = meals.by_date_and_type("2024-05-10", MealType::Breakfast).await;
        assert_eq!(breakfasts.len(), 2);
    }

    #[tokio::test]
    async fn test_monthly_summary_counts_consumed_meals_in_month() {
        let (kv, _dir) = open_kv().await;
        let meals = MealStore::load(kv).await.unwrap();
        let user = student("a");

        let may = meals.select(&user, MealType::Breakfast, at(10, 7)).await.unwrap();
        meals
            .verify_and_consume(&may.selection.id, &may.selection.token)
            .await
            .unwrap();
        let may_dinner = meals.select(&user, MealType::Dinner, at(12, 19)).await.unwrap();
        meals
            .verify_and_consume(&may_dinner.selection.id, &may_dinner.selection.token)
            .await
            .unwrap();
        // Issued but never redeemed
        meals.select(&user, MealType::Lunch, at(12, 12)).await.unwrap();
        // Previous month
        let april = Utc.with_ymd_and_hms(2024, 4, 30, 8, 0, 0).unwrap();
        let old = meals.select(&user, MealType::Breakfast, april).await.unwrap();
        meals
            .verify_and_consume(&old.selection.id, &old.selection.token)
            .await
            .unwrap();

        let summary = meals.monthly_summary("a", at(20, 12), 35).await;
        assert_eq!(summary.month, "2024-05");
        assert_eq!(summary.consumed_meals, 2);
        assert_eq!(summary.total_bill, 70);
    }

    #[tokio::test]
    async fn test_corrupt_meals_document_is_dropped() {
        let (kv, _dir) = open_kv().await;
        kv.set(keys::MEALS, "garbage").await.unwrap();

        let meals = MealStore::load(kv.clone()).await.unwrap();
        assert!(meals.all().await.is_empty());
        assert!(kv.get(keys::MEALS).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_write_leaves_selections_untouched() {
        let dir = TempDir::new().unwrap();
        let pool = init_database(&dir.path().join("meals.sqlite")).await.unwrap();
        let meals = MealStore::load(KvStore::new(pool.clone())).await.unwrap();
        let user = student("student1");

        let breakfast = meals.select(&user, MealType::Breakfast, at(10, 7)).await.unwrap();
        pool.close().await;

        assert!(meals.select(&user, MealType::Dinner, at(10, 19)).await.is_err());
        assert_eq!(meals.all().await.len(), 1);

        // Retrying must not hand out a token that was never stored
        assert!(meals.select(&user, MealType::Dinner, at(10, 19)).await.is_err());
        assert_eq!(meals.counts_for("2024-05-10").await[2].count, 0);

        assert!(meals
            .verify_and_consume(&breakfast.selection.id, &breakfast.selection.token)
            .await
            .is_err());
        assert!(!meals.all().await[0].consumed);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_selects_issue_a_single_token() {
        let (kv, _dir) = open_kv().await;
        let meals = std::sync::Arc::new(MealStore::load(kv).await.unwrap());
        let now = at(10, 12);

        let handles: Vec<_> = (0..20)
            .map(|_| {
                let meals = std::sync::Arc::clone(&meals);
                tokio::spawn(async move {
                    meals
                        .select(&student("student1"), MealType::Lunch, now)
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut tokens = std::collections::HashSet::new();
        let mut created = 0;
        for handle in handles {
            let issued = handle.await.unwrap();
            if issued.created {
                created += 1;
            }
            tokens.insert(issued.selection.token);
        }

        assert_eq!(tokens.len(), 1);
        assert_eq!(created, 1);
        assert_eq!(meals.all().await.len(), 1);
    }
}
