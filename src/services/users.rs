use crate::{
    entities::{user, User, UserModel},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

/// Profile store. Authentication is handled by an external identity provider;
/// this service only keeps the profile rows other collections key on.
#[derive(Clone)]
pub struct UserService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserInput {
    #[validate(length(min = 3, max = 64, message = "Username must be 3-64 characters"))]
    pub username: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserInput {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl UserService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Creates a profile. Username and email must both be unused.
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn create_user(&self, input: CreateUserInput) -> Result<UserModel, ServiceError> {
        input.validate()?;

        let taken = User::find()
            .filter(
                Condition::any()
                    .add(user::Column::Username.eq(&input.username))
                    .add(user::Column::Email.eq(&input.email)),
            )
            .one(&*self.db)
            .await?;
        if taken.is_some() {
            return Err(ServiceError::Conflict(
                "Username or email is already in use".to_string(),
            ));
        }

        let user_id = Uuid::new_v4();
        let model = user::ActiveModel {
            id: Set(user_id),
            username: Set(input.username.clone()),
            email: Set(input.email),
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
        };

        let model = model.insert(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::UserCreated(user_id))
            .await;

        info!("Created user {} ({})", input.username, user_id);
        Ok(model)
    }

    pub async fn get_user(&self, id: Uuid) -> Result<UserModel, ServiceError> {
        User::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", id)))
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<UserModel, ServiceError> {
        User::find()
            .filter(user::Column::Username.eq(username))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", username)))
    }

    pub async fn list_users(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<UserModel>, u64), ServiceError> {
        let paginator = User::find()
            .order_by_asc(user::Column::Username)
            .paginate(&*self.db, per_page);

        let total = paginator.num_items().await?;
        let data = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((data, total))
    }

    /// Updates profile fields. The username is immutable; a new email must be
    /// unused by any other profile.
    #[instrument(skip(self, input))]
    pub async fn update_user(
        &self,
        id: Uuid,
        input: UpdateUserInput,
    ) -> Result<UserModel, ServiceError> {
        let existing = self.get_user(id).await?;

        if let Some(email) = &input.email {
            let taken = User::find()
                .filter(user::Column::Email.eq(email))
                .filter(user::Column::Id.ne(id))
                .one(&*self.db)
                .await?;
            if taken.is_some() {
                return Err(ServiceError::Conflict(
                    "Email is already in use".to_string(),
                ));
            }
        }

        let mut model: user::ActiveModel = existing.into();
        if let Some(email) = input.email {
            model.email = Set(email);
        }
        if let Some(first_name) = input.first_name {
            model.first_name = Set(Some(first_name));
        }
        if let Some(last_name) = input.last_name {
            model.last_name = Set(Some(last_name));
        }
        model.updated_at = Set(Utc::now());

        Ok(model.update(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = User::delete_by_id(id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("User {} not found", id)));
        }

        self.event_sender.send_or_log(Event::UserDeleted(id)).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_input_validation() {
        let input = CreateUserInput {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            first_name: None,
            last_name: None,
        };
        assert!(input.validate().is_ok());

        let short = CreateUserInput {
            username: "al".to_string(),
            ..input.clone()
        };
        assert!(short.validate().is_err());

        let bad_email = CreateUserInput {
            email: "nope".to_string(),
            ..input
        };
        assert!(bad_email.validate().is_err());
    }
}
