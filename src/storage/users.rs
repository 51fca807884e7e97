//! User-collection storage helpers.

use super::traits::{HasId, Storage};
use crate::domain::User;
use crate::error::Result;

/// Collection name for users.
pub const USERS_COLLECTION: &str = "users";

impl HasId for User {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Helper for user-specific storage access.
pub struct UserStore<'a, S: Storage> {
    storage: &'a S,
}

impl<'a, S: Storage> UserStore<'a, S> {
    /// Create a new UserStore wrapping the given storage.
    pub fn new(storage: &'a S) -> Self {
        Self { storage }
    }

    /// Get a user by ID.
    pub fn get(&self, id: &str) -> Result<Option<User>> {
        self.storage.get(USERS_COLLECTION, id)
    }

    /// Register a new user.
    pub fn create(&self, user: &User) -> Result<()> {
        self.storage.create(USERS_COLLECTION, user)
    }

    /// List all registered users.
    pub fn list_all(&self) -> Result<Vec<User>> {
        self.storage.list(USERS_COLLECTION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::JsonlStorage;
    use chrono::Utc;
    use tempfile::TempDir;

    #[test]
    fn test_create_get_and_list_users() {
        let temp_dir = TempDir::new().unwrap();
        let storage = JsonlStorage::new(temp_dir.path()).unwrap();
        let users = UserStore::new(&storage);

        let ada = User::new("Ada Lovelace", "ada@example.com", Utc::now());
        users.create(&ada).unwrap();

        assert_eq!(users.get(&ada.id).unwrap(), Some(ada));
        assert_eq!(users.get("user-missing").unwrap(), None);
        assert_eq!(users.list_all().unwrap().len(), 1);
    }
}
