//! In-memory stores mirrored to the key-value table.
//!
//! Every store loads its document once when opened and rewrites it in full
//! after each mutation. Stores never coordinate with each other.

mod meals;
mod menu;
mod preferences;
mod records;
mod sessions;
mod users;

pub use meals::*;
pub use menu::*;
pub use preferences::*;
pub use records::*;
pub use sessions::*;
pub use users::*;

use crate::db::KvStore;
use crate::errors::AppError;

/// All stores of the application, opened against one key-value store.
pub struct Stores {
    pub sessions: SessionStore,
    pub users: UserDirectory,
    pub meals: MealStore,
    pub menu: MenuStore,
    pub notifications: NotificationLog,
    pub feedback: FeedbackLog,
    pub bills: BillLog,
    pub preferences: PreferenceStore,
}

impl Stores {
    /// Load every store from its persisted document.
    pub async fn open(kv: KvStore) -> Result<Self, AppError> {
        Ok(Self {
            sessions: SessionStore::load(kv.clone()).await?,
            users: UserDirectory::load(kv.clone()).await?,
            meals: MealStore::load(kv.clone()).await?,
            menu: MenuStore::load(kv.clone()).await?,
            notifications: NotificationLog::load(kv.clone()).await?,
            feedback: FeedbackLog::load(kv.clone()).await?,
            bills: BillLog::load(kv.clone()).await?,
            preferences: PreferenceStore::load(kv).await?,
        })
    }
}
