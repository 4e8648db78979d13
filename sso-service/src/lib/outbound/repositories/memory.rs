use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::auth::errors::StoreError;
use crate::domain::auth::models::App;
use crate::domain::auth::models::AppId;
use crate::domain::auth::models::EmailAddress;
use crate::domain::auth::models::NewUser;
use crate::domain::auth::models::User;
use crate::domain::auth::models::UserId;
use crate::domain::auth::ports::CredentialStore;

/// Process-local credential store.
///
/// Reference implementation of [`CredentialStore`] for tests and single-node
/// experiments. All state sits behind one lock, so a registration is visible to the
/// next read as soon as `create_user` returns.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    state: RwLock<State>,
}

#[derive(Default)]
struct State {
    users: HashMap<UserId, User>,
    ids_by_email: HashMap<EmailAddress, UserId>,
    apps: HashMap<AppId, App>,
    last_user_id: i64,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-provisioned with `apps`.
    pub fn with_apps(apps: impl IntoIterator<Item = App>) -> Self {
        let state = State {
            apps: apps.into_iter().map(|app| (app.id, app)).collect(),
            ..State::default()
        };
        Self {
            state: RwLock::new(state),
        }
    }

    /// Insert or replace an app.
    pub async fn upsert_app(&self, app: App) {
        self.state.write().await.apps.insert(app.id, app);
    }

    /// Grant or revoke the admin flag.
    pub async fn set_admin(&self, id: UserId, is_admin: bool) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("user {id}")))?;
        user.is_admin = is_admin;
        Ok(())
    }

    pub async fn user_count(&self) -> usize {
        self.state.read().await.users.len()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn create_user(&self, user: NewUser) -> Result<UserId, StoreError> {
        let mut state = self.state.write().await;

        if state.ids_by_email.contains_key(&user.email) {
            return Err(StoreError::AlreadyExists(format!("user {}", user.email)));
        }

        state.last_user_id += 1;
        let id = UserId(state.last_user_id);
        state.ids_by_email.insert(user.email.clone(), id);
        state.users.insert(
            id,
            User {
                id,
                email: user.email,
                password_hash: user.password_hash,
                is_admin: false,
                created_at: user.created_at,
            },
        );

        Ok(id)
    }

    async fn get_user_by_email(&self, email: &EmailAddress) -> Result<User, StoreError> {
        let state = self.state.read().await;
        state
            .ids_by_email
            .get(email)
            .and_then(|id| state.users.get(id))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("user {email}")))
    }

    async fn get_user_by_id(&self, id: UserId) -> Result<User, StoreError> {
        self.state
            .read()
            .await
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("user {id}")))
    }

    async fn get_app_by_id(&self, id: AppId) -> Result<App, StoreError> {
        self.state
            .read()
            .await
            .apps
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("app {id}")))
    }
}
