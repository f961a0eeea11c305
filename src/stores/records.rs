//! Append-only record lists: notifications, feedback and uploaded bills.

use tokio::sync::RwLock;

use crate::db::{keys, KvStore};
use crate::errors::AppError;
use crate::models::{FeedbackItem, NotificationItem, UploadedBill};

/// A record kept in a [`RecordLog`].
pub trait LogRecord: Clone + serde::Serialize + serde::de::DeserializeOwned + Send + Sync {
    /// Key of the persisted list.
    const KEY: &'static str;

    fn id(&self) -> &str;

    /// RFC 3339 creation time used for newest-first ordering.
    fn recorded_at(&self) -> &str;
}

impl LogRecord for NotificationItem {
    const KEY: &'static str = keys::NOTIFICATIONS;

    fn id(&self) -> &str {
        &self.id
    }

    fn recorded_at(&self) -> &str {
        &self.sent_at
    }
}

impl LogRecord for FeedbackItem {
    const KEY: &'static str = keys::FEEDBACK;

    fn id(&self) -> &str {
        &self.id
    }

    fn recorded_at(&self) -> &str {
        &self.submitted_at
    }
}

impl LogRecord for UploadedBill {
    const KEY: &'static str = keys::BILLS;

    fn id(&self) -> &str {
        &self.id
    }

    fn recorded_at(&self) -> &str {
        &self.uploaded_at
    }
}

pub type NotificationLog = RecordLog<NotificationItem>;
pub type FeedbackLog = RecordLog<FeedbackItem>;
pub type BillLog = RecordLog<UploadedBill>;

/// Newest-first list of records persisted under `T::KEY`.
pub struct RecordLog<T: LogRecord> {
    kv: KvStore,
    records: RwLock<Vec<T>>,
}

impl<T: LogRecord> RecordLog<T> {
    /// Load the list; a missing or unreadable document starts empty.
    pub async fn load(kv: KvStore) -> Result<Self, AppError> {
        let mut records: Vec<T> = kv.load_json(T::KEY).await?.ok().unwrap_or_default();
        sort_newest_first(&mut records);

        Ok(Self {
            kv,
            records: RwLock::new(records),
        })
    }

    /// All records, newest first.
    pub async fn list(&self) -> Vec<T> {
        self.records.read().await.clone()
    }

    /// Records matching `predicate`, newest first.
    pub async fn filter(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        self.records
            .read()
            .await
            .iter()
            .filter(|r| predicate(*r))
            .cloned()
            .collect()
    }

    /// Append a record, re-sort and persist the whole list.
    pub async fn append(&self, record: T) -> Result<T, AppError> {
        let mut records = self.records.write().await;
        let mut next = records.clone();
        next.push(record.clone());
        sort_newest_first(&mut next);
        self.kv.save_json(T::KEY, &next).await?;
        *records = next;

        tracing::debug!("Appended {} record {}", T::KEY, record.id());
        Ok(record)
    }

    /// Remove the record with `id`, keeping the order of the rest.
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let mut records = self.records.write().await;
        let Some(pos) = records.iter().position(|r| r.id() == id) else {
            return Err(AppError::NotFound(format!("Record {} not found", id)));
        };

        let mut next = records.clone();
        next.remove(pos);
        self.kv.save_json(T::KEY, &next).await?;
        *records = next;

        tracing::debug!("Deleted {} record {}", T::KEY, id);
        Ok(())
    }
}

// RFC 3339 timestamps produced by chrono in UTC compare correctly as strings.
fn sort_newest_first<T: LogRecord>(records: &mut [T]) {
    records.sort_by(|a, b| b.recorded_at().cmp(a.recorded_at()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use crate::models::NotificationType;
    use tempfile::TempDir;

    fn notification(id: &str, sent_at: &str) -> NotificationItem {
        NotificationItem {
            id: id.to_string(),
            title: format!("Title {}", id),
            message: "Mess closed for maintenance".to_string(),
            kind: NotificationType::Info,
            sent_at: sent_at.to_string(),
        }
    }

    fn bill(id: &str, uploaded_at: &str) -> UploadedBill {
        UploadedBill {
            id: id.to_string(),
            name: format!("{}.pdf", id),
            content_type: "application/pdf".to_string(),
            size: 2048,
            uploaded_at: uploaded_at.to_string(),
        }
    }

    async fn open_kv() -> (KvStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let pool = init_database(&dir.path().join("log.sqlite")).await.unwrap();
        (KvStore::new(pool), dir)
    }

    #[tokio::test]
    async fn test_append_keeps_newest_first() {
        let (kv, _dir) = open_kv().await;
        let log = NotificationLog::load(kv).await.unwrap();

        log.append(notification("b", "2024-05-02T10:00:00+00:00")).await.unwrap();
        log.append(notification("a", "2024-05-01T10:00:00+00:00")).await.unwrap();
        log.append(notification("c", "2024-05-03T10:00:00+00:00")).await.unwrap();

        let ids: Vec<String> = log.list().await.into_iter().map(|n| n.id).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn test_delete_removes_exactly_one_and_keeps_order() {
        let (kv, _dir) = open_kv().await;
        let log = BillLog::load(kv.clone()).await.unwrap();

        for (id, at) in [
            ("b1", "2024-05-01T10:00:00+00:00"),
            ("b2", "2024-05-02T10:00:00+00:00"),
            ("b3", "2024-05-03T10:00:00+00:00"),
            ("b4", "2024-05-04T10:00:00+00:00"),
        ] {
            log.append(bill(id, at)).await.unwrap();
        }

        log.delete("b2").await.unwrap();
        let ids: Vec<String> = log.list().await.into_iter().map(|b| b.id).collect();
        assert_eq!(ids, vec!["b4", "b3", "b1"]);

        // Persisted copy matches
        let reopened = BillLog::load(kv).await.unwrap();
        let ids: Vec<String> = reopened.list().await.into_iter().map(|b| b.id).collect();
        assert_eq!(ids, vec!["b4", "b3", "b1"]);
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_not_found() {
        let (kv, _dir) = open_kv().await;
        let log = NotificationLog::load(kv).await.unwrap();
        log.append(notification("a", "2024-05-01T10:00:00+00:00")).await.unwrap();

        let err = log.delete("missing").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(log.list().await.len(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_document_starts_empty() {
        let (kv, _dir) = open_kv().await;
        kv.set(keys::FEEDBACK, "[{\"broken\"").await.unwrap();

        let log = FeedbackLog::load(kv).await.unwrap();
        assert!(log.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_write_keeps_previous_list() {
        let dir = TempDir::new().unwrap();
        let pool = init_database(&dir.path().join("log.sqlite")).await.unwrap();
        let log = NotificationLog::load(KvStore::new(pool.clone())).await.unwrap();
        log.append(notification("a", "2024-05-01T10:00:00+00:00")).await.unwrap();
        pool.close().await;

        assert!(log.append(notification("b", "2024-05-02T10:00:00+00:00")).await.is_err());
        assert!(log.delete("a").await.is_err());

        let ids: Vec<String> = log.list().await.into_iter().map(|n| n.id).collect();
        assert_eq!(ids, vec!["a"]);
    }
}
