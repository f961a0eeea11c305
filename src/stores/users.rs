//! User directory: seeded mock users plus registered students.

use tokio::sync::RwLock;

use crate::auth::constant_time_compare;
use crate::db::{keys, KvStore, Loaded};
use crate::errors::AppError;
use crate::models::{RegisterRequest, User, UserRole};

/// Users present on first start. None of them has a stored password.
fn seed_users() -> Vec<User> {
    let mut users = vec![
        seed("student1", "student@example.com", "Test Student", UserRole::Student, "Hostel A"),
        seed("admin1", "admin@example.com", "Test Admin", UserRole::Admin, "N/A"),
    ];

    for letter in 'a'..='j' {
        users.push(seed(
            &format!("student{}", letter),
            &format!("student{}@example.com", letter),
            &format!("Student {} (Hostel A)", letter.to_ascii_uppercase()),
            UserRole::Student,
            "Hostel A",
        ));
    }

    users
}

fn seed(id: &str, email: &str, name: &str, role: UserRole, hostel: &str) -> User {
    User {
        id: id.to_string(),
        email: email.to_string(),
        name: name.to_string(),
        role,
        hostel: Some(hostel.to_string()),
        password: None,
    }
}

pub struct UserDirectory {
    kv: KvStore,
    users: RwLock<Vec<User>>,
}

impl UserDirectory {
    /// Load the directory, seeding (and persisting) the mock users when the
    /// document is missing or unreadable.
    pub async fn load(kv: KvStore) -> Result<Self, AppError> {
        let users = match kv.load_json::<Vec<User>>(keys::USERS).await? {
            Loaded::Value(users) => users,
            Loaded::Missing | Loaded::Corrupt => {
                let users = seed_users();
                kv.save_json(keys::USERS, &users).await?;
                tracing::info!("Seeded user directory with {} users", users.len());
                users
            }
        };

        Ok(Self {
            kv,
            users: RwLock::new(users),
        })
    }

    /// Look up a user by id, without password.
    pub async fn get(&self, id: &str) -> Option<User> {
        self.users
            .read()
            .await
            .iter()
            .find(|u| u.id == id)
            .map(User::without_password)
    }

    /// Register a new student. Emails are unique.
    pub async fn register(&self, request: &RegisterRequest) -> Result<User, AppError> {
        let mut users = self.users.write().await;

        if users.iter().any(|u| u.email == request.email) {
            return Err(AppError::Conflict("Email already exists.".to_string()));
        }

        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            email: request.email.clone(),
            name: request.name.clone(),
            role: UserRole::Student,
            hostel: request.hostel.clone(),
            password: Some(request.password.clone()),
        };

        let mut next = users.clone();
        next.push(user.clone());
        self.kv.save_json(keys::USERS, &next).await?;
        *users = next;

        tracing::info!("Registered user {} ({})", user.id, user.email);
        Ok(user.without_password())
    }

    /// Check credentials. A user with a stored password must supply it; a
    /// user without one is accepted with the fallback password.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
        fallback_password: &str,
    ) -> Option<User> {
        let users = self.users.read().await;
        let user = users.iter().find(|u| u.email == email)?;

        let expected = user.password.as_deref().unwrap_or(fallback_password);
        if constant_time_compare(password, expected) {
            Some(user.without_password())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use tempfile::TempDir;

    async fn open_kv() -> (KvStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let pool = init_database(&dir.path().join("users.sqlite")).await.unwrap();
        (KvStore::new(pool), dir)
    }

    fn registration(email: &str) -> RegisterRequest {
        RegisterRequest {
            name: "New Student".to_string(),
            email: email.to_string(),
            password: "hunter2".to_string(),
            hostel: Some("Hostel B".to_string()),
        }
    }

    #[tokio::test]
    async fn test_seeded_directory() {
        let (kv, _dir) = open_kv().await;
        let users = UserDirectory::load(kv.clone()).await.unwrap();

        assert_eq!(users.users.read().await.len(), 12);
        let admin = users.get("admin1").await.unwrap();
        assert!(admin.is_admin());
        assert_eq!(users.get("studentj").await.unwrap().name, "Student J (Hostel A)");

        // Seed was persisted
        assert!(kv.get(keys::USERS).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_fallback_password_only_for_users_without_one() {
        let (kv, _dir) = open_kv().await;
        let users = UserDirectory::load(kv).await.unwrap();

        let user = users
            .authenticate("student@example.com", "password", "password")
            .await
            .unwrap();
        assert_eq!(user.id, "student1");
        assert!(users
            .authenticate("student@example.com", "wrong", "password")
            .await
            .is_none());

        users.register(&registration("new@example.com")).await.unwrap();
        assert!(users
            .authenticate("new@example.com", "password", "password")
            .await
            .is_none());
        let registered = users
            .authenticate("new@example.com", "hunter2", "password")
            .await
            .unwrap();
        assert_eq!(registered.role, UserRole::Student);
        assert!(registered.password.is_none());

        assert!(users
            .authenticate("nobody@example.com", "password", "password")
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_email_and_survives_reload() {
        let (kv, _dir) = open_kv().await;
        let users = UserDirectory::load(kv.clone()).await.unwrap();

        let created = users.register(&registration("dup@example.com")).await.unwrap();
        let err = users.register(&registration("dup@example.com")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let reloaded = UserDirectory::load(kv).await.unwrap();
        assert_eq!(reloaded.users.read().await.len(), 13);
        assert_eq!(reloaded.get(&created.id).await.unwrap().email, "dup@example.com");
    }

    #[tokio::test]
    async fn test_corrupt_directory_is_reseeded() {
        let (kv, _dir) = open_kv().await;
        kv.set(keys::USERS, "not json").await.unwrap();

        let users = UserDirectory::load(kv).await.unwrap();
        assert_eq!(users.users.read().await.len(), 12);
    }

    #[tokio::test]
    async fn test_failed_write_does_not_register() {
        let dir = TempDir::new().unwrap();
        let pool = init_database(&dir.path().join("users.sqlite")).await.unwrap();
        let users = UserDirectory::load(KvStore::new(pool.clone())).await.unwrap();
        pool.close().await;

        assert!(users.register(&registration("late@example.com")).await.is_err());
        assert_eq!(users.users.read().await.len(), 12);
        assert!(users
            .authenticate("late@example.com", "hunter2", "password")
            .await
            .is_none());
    }
}
