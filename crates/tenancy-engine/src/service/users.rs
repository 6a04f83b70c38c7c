//! User registration and removal.

use tenancy_org::user::{is_plausible_email, normalize_email};
use tenancy_org::User;
use tracing::{debug, info};
use uuid::Uuid;

use super::{validate_name, TenancyService};
use crate::error::{TenancyError, TenancyResult};

impl TenancyService {
    /// Register a user. Emails are unique case-insensitively.
    pub async fn register_user(&self, email: &str, display_name: &str) -> TenancyResult<User> {
        let email = normalize_email(email);
        debug!(email = %email, "Registering user");

        if !is_plausible_email(&email) {
            return Err(TenancyError::Validation(format!("invalid email: {email}")));
        }
        let display_name = validate_name(display_name, &self.config)?;

        let user = self.store.insert_user(User::new(email, display_name)).await?;

        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    pub async fn get_user(&self, user_id: Uuid) -> TenancyResult<User> {
        self.store
            .get_user(user_id)
            .await?
            .ok_or_else(|| TenancyError::not_found("user"))
    }

    /// Delete a user and their memberships.
    ///
    /// Fails with `ReferentialIntegrity` while the user owns an organization,
    /// active or soft deleted.
    pub async fn delete_user(&self, user_id: Uuid) -> TenancyResult<()> {
        debug!(user_id = %user_id, "Deleting user");

        self.store.delete_user(user_id).await?;

        info!(user_id = %user_id, "User deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_user() {
        let service = TenancyService::in_memory();
        let user = service
            .register_user(" Owner@Example.com ", "Owner")
            .await
            .unwrap();
        assert_eq!(user.email, "owner@example.com");
        assert_eq!(service.get_user(user.id).await.unwrap(), user);
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let service = TenancyService::in_memory();
        service.register_user("a@example.com", "A").await.unwrap();

        let result = service.register_user("A@EXAMPLE.COM", "B").await;
        assert!(matches!(result, Err(TenancyError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_register_invalid_input() {
        let service = TenancyService::in_memory();
        assert!(matches!(
            service.register_user("not-an-email", "A").await,
            Err(TenancyError::Validation(_))
        ));
        assert!(matches!(
            service.register_user("a@example.com", " ").await,
            Err(TenancyError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_missing_user() {
        let service = TenancyService::in_memory();
        let result = service.delete_user(Uuid::now_v7()).await;
        assert!(matches!(result, Err(TenancyError::NotFound(_))));
    }
}
