//! Authentication boundary.
//!
//! Credential verification is an external concern; the core only needs
//! "who is the current user, if anyone". The provider is explicit
//! application-lifetime state injected where needed, loaded on startup
//! and cleared on logout, rather than ambient global storage.

use anyhow::Result;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::sync::Arc;

use crate::storage::csv::CsvConnection;

/// The signed-in user as reported by the credential store
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentUser {
    pub id: String,
    pub display_name: String,
}

/// Narrow interface the core uses to learn about the current user
pub trait AuthProvider: Send + Sync {
    fn current_user(&self) -> Result<Option<CurrentUser>>;
    fn sign_in(&self, user: CurrentUser) -> Result<()>;
    fn logout(&self) -> Result<()>;
}

/// Persisted global configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct GlobalConfig {
    current_user_id: Option<String>,
    current_user_name: Option<String>,
}

/// Auth provider backed by the global YAML config in the data directory
#[derive(Clone)]
pub struct LocalAuthProvider {
    connection: Arc<CsvConnection>,
}

impl LocalAuthProvider {
    pub fn new(connection: Arc<CsvConnection>) -> Self {
        Self { connection }
    }

    fn load_config(&self) -> Result<GlobalConfig> {
        let path = self.connection.global_config_path();
        if !path.exists() {
            return Ok(GlobalConfig::default());
        }
        let content = fs::read_to_string(&path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    fn save_config(&self, config: &GlobalConfig) -> Result<()> {
        let path = self.connection.global_config_path();
        let content = serde_yaml::to_string(config)?;

        // Atomic write using temp file
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, content)?;
        fs::rename(&temp_path, &path)?;
        Ok(())
    }
}

impl AuthProvider for LocalAuthProvider {
    fn current_user(&self) -> Result<Option<CurrentUser>> {
        let config = self.load_config()?;
        Ok(match (config.current_user_id, config.current_user_name) {
            (Some(id), Some(display_name)) => Some(CurrentUser { id, display_name }),
            _ => None,
        })
    }

    fn sign_in(&self, user: CurrentUser) -> Result<()> {
        let mut config = self.load_config()?;
        config.current_user_id = Some(user.id.clone());
        config.current_user_name = Some(user.display_name.clone());
        self.save_config(&config)?;

        info!("Signed in user: {} ({})", user.display_name, user.id);
        Ok(())
    }

    fn logout(&self) -> Result<()> {
        let mut config = self.load_config()?;
        config.current_user_id = None;
        config.current_user_name = None;
        self.save_config(&config)?;

        info!("Cleared current user");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (LocalAuthProvider, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let connection = CsvConnection::new(temp_dir.path()).unwrap();
        (LocalAuthProvider::new(Arc::new(connection)), temp_dir)
    }

    #[test]
    fn test_no_user_initially() {
        let (auth, _dir) = setup();
        assert!(auth.current_user().unwrap().is_none());
    }

    #[test]
    fn test_sign_in_and_out() {
        let (auth, _dir) = setup();

        auth.sign_in(CurrentUser {
            id: "user::42".to_string(),
            display_name: "Maria".to_string(),
        })
        .unwrap();

        let user = auth.current_user().unwrap().unwrap();
        assert_eq!(user.id, "user::42");
        assert_eq!(user.display_name, "Maria");

        auth.logout().unwrap();
        assert!(auth.current_user().unwrap().is_none());
    }

    #[test]
    fn test_sign_in_replaces_previous_user() {
        let (auth, _dir) = setup();

        auth.sign_in(CurrentUser {
            id: "user::1".to_string(),
            display_name: "A".to_string(),
        })
        .unwrap();
        auth.sign_in(CurrentUser {
            id: "user::2".to_string(),
            display_name: "B".to_string(),
        })
        .unwrap();

        assert_eq!(auth.current_user().unwrap().unwrap().id, "user::2");
    }
}
