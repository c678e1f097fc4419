use admin_crud::{CommandHandler, DispatchResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::{
    domain::{User, UserId},
    error::CommandError,
};
use storage::Storage;
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUser {
    pub id: UserId,
    pub username: String,
    pub email: String,
}

impl UpdateUser {
    /// Prefills the command with the current values of `user`.
    pub fn for_user(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteUser {
    pub id: UserId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BanUser {
    pub id: UserId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnbanUser {
    pub id: UserId,
}

#[derive(Clone)]
pub struct UserCommandHandler {
    storage: Storage,
}

impl UserCommandHandler {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    async fn existing(&self, id: UserId) -> Result<User, CommandError> {
        self.storage
            .find_user(id)
            .await?
            .ok_or_else(|| CommandError::rejected("This user no longer exists."))
    }

    /// Rejects `username`/`email` when they belong to an account other than `owner`.
    async fn ensure_unique(
        &self,
        username: &str,
        email: &str,
        owner: Option<UserId>,
    ) -> Result<(), CommandError> {
        if let Some(other) = self.storage.find_user_by_username(username).await? {
            if Some(other.id) != owner {
                return Err(CommandError::rejected("This username is already taken."));
            }
        }
        if let Some(other) = self.storage.find_user_by_email(email).await? {
            if Some(other.id) != owner {
                return Err(CommandError::rejected(
                    "This email address is already in use.",
                ));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CommandHandler<CreateUser> for UserCommandHandler {
    async fn handle(&self, command: CreateUser) -> DispatchResult {
        self.ensure_unique(&command.username, &command.email, None)
            .await?;
        let id = self
            .storage
            .create_user(&command.username, &command.email)
            .await?;
        info!(user_id = id.0, username = %command.username, "user created");
        Ok(())
    }
}

#[async_trait]
impl CommandHandler<UpdateUser> for UserCommandHandler {
    async fn handle(&self, command: UpdateUser) -> DispatchResult {
        self.existing(command.id).await?;
        self.ensure_unique(&command.username, &command.email, Some(command.id))
            .await?;
        if !self
            .storage
            .update_user(command.id, &command.username, &command.email)
            .await?
        {
            return Err(CommandError::rejected("This user no longer exists."));
        }
        Ok(())
    }
}

#[async_trait]
impl CommandHandler<DeleteUser> for UserCommandHandler {
    async fn handle(&self, command: DeleteUser) -> DispatchResult {
        if !self.storage.delete_user(command.id).await? {
            return Err(CommandError::rejected("This user no longer exists."));
        }
        info!(user_id = command.id.0, "user deleted");
        Ok(())
    }
}

#[async_trait]
impl CommandHandler<BanUser> for UserCommandHandler {
    async fn handle(&self, command: BanUser) -> DispatchResult {
        let user = self.existing(command.id).await?;
        if user.is_banned {
            return Err(CommandError::rejected("This user is already banned."));
        }
        self.storage.set_banned(command.id, true).await?;
        Ok(())
    }
}

#[async_trait]
impl CommandHandler<UnbanUser> for UserCommandHandler {
    async fn handle(&self, command: UnbanUser) -> DispatchResult {
        let user = self.existing(command.id).await?;
        if !user.is_banned {
            return Err(CommandError::rejected("This user is not banned."));
        }
        self.storage.set_banned(command.id, false).await?;
        Ok(())
    }
}
