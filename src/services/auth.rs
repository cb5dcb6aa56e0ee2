//! Authenticated session shared with the API client

use std::{
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{error, info, warn};

/// Signed-in user as stored in the session file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    pub id: String,
    pub name: String,
    pub avatar_url: String,
    pub token: String,
}

/// User payload of the OAuth callback (`/auth/callback`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiUser {
    #[serde(default)]
    pub node_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

impl ApiUser {
    /// Convert to local user data. A payload without a token is rejected.
    pub fn into_user(self) -> Result<UserData, String> {
        let token = self
            .token
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| "Token not found in the authentication response".to_string())?;

        Ok(UserData {
            id: self.node_id,
            name: self
                .name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| "User".to_string()),
            avatar_url: self.avatar_url.unwrap_or_default(),
            token,
        })
    }
}

/// Explicit session handle, created at startup and injected where needed.
///
/// Clones share the same session. When a path is set, sign-in persists the
/// user there and sign-out removes the file.
#[derive(Debug, Clone, Default)]
pub struct AuthSession {
    user: Arc<RwLock<Option<UserData>>>,
    path: Option<PathBuf>,
}

impl AuthSession {
    /// A session that lives in memory only
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Restore the session stored at `path`.
    ///
    /// A missing file means signed out. A corrupt file is removed.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let user = match fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<UserData>(&bytes) {
                Ok(user) if !user.token.is_empty() => {
                    info!("Restored session for {}", user.name);
                    Some(user)
                }
                Ok(_) => {
                    warn!("Stored session has no token, ignoring it");
                    remove_file(&path).await;
                    None
                }
                Err(err) => {
                    error!("Failed to parse session file {}: {}", path.display(), err);
                    remove_file(&path).await;
                    None
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => {
                error!("Failed to read session file {}: {}", path.display(), err);
                None
            }
        };

        Self {
            user: Arc::new(RwLock::new(user)),
            path: Some(path),
        }
    }

    pub fn user(&self) -> Option<UserData> {
        self.user.read().ok().and_then(|user| user.clone())
    }

    pub fn token(&self) -> Option<String> {
        self.user()
            .map(|user| user.token)
            .filter(|token| !token.is_empty())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Store `user` as the signed-in user
    pub async fn sign_in(&self, user: UserData) -> Result<(), String> {
        self.set(Some(user.clone()))?;

        if let Some(path) = &self.path {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| format!("Failed to create session directory: {}", e))?;
            }
            let payload = serde_json::to_vec_pretty(&user)
                .map_err(|e| format!("Failed to encode session: {}", e))?;
            fs::write(path, payload)
                .await
                .map_err(|e| format!("Failed to write session file: {}", e))?;
        }

        info!("Signed in as {}", user.name);
        Ok(())
    }

    /// Forget the signed-in user
    pub async fn sign_out(&self) -> Result<(), String> {
        self.set(None)?;
        if let Some(path) = &self.path {
            remove_file(path).await;
        }
        info!("Signed out");
        Ok(())
    }

    fn set(&self, user: Option<UserData>) -> Result<(), String> {
        let mut slot = self
            .user
            .write()
            .map_err(|e| format!("Failed to lock session: {}", e))?;
        *slot = user;
        Ok(())
    }
}

async fn remove_file(path: &Path) {
    match fs::remove_file(path).await {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => warn!("Failed to remove session file {}: {}", path.display(), err),
    }
}
