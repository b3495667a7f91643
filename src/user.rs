use std::path::PathBuf;
use std::{env, fmt, fs};

use dotenvy::dotenv;
use error_stack::{IntoReport, Report, ResultExt};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;

#[derive(Debug, Clone)]
pub struct UserError;
impl fmt::Display for UserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("User config error")
    }
}
impl std::error::Error for UserError {}

pub type UserResult<T> = error_stack::Result<T, UserError>;

/// Session data and preferences stored in `~/.tidal_shuffler/config.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct User {
    #[serde(default)]
    pub tidal_access_token: String,
    #[serde(default)]
    pub tidal_user_id: String,
    #[serde(default)]
    pub country_code: String,
    #[serde(default)]
    pub export_dir: String,
}

impl User {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the config file when there is one and lets the environment
    /// (or a `.env` file) override any of its values.
    pub fn load() -> UserResult<Self> {
        let mut user = Self::new();
        if Self::config_file_exists()? {
            user.read_config_file()?;
        }
        dotenv().ok();
        user.apply_overrides(|key| env::var(key).ok());
        Ok(user)
    }

    pub fn read_config_file(&mut self) -> UserResult<()> {
        let config_path =
            Self::get_config_file_path().attach_printable("Failed to get the config file path")?;
        if !config_path.is_file() {
            return Err(Report::new(UserError).attach_printable(format!(
                "Config file not found at: {}. Run `tidal-shuffler login` first.",
                config_path.display()
            )));
        }
        let config_content = fs::read_to_string(&config_path)
            .into_report()
            .attach_printable(format!(
                "Failed to read config file at {}",
                config_path.display()
            ))
            .change_context(UserError)?;
        let config: User = serde_json::from_str(&config_content)
            .into_report()
            .attach_printable("Failed to parse the config file. Ensure it is valid JSON.")
            .change_context(UserError)?;
        self.clone_from(&config);
        Ok(())
    }

    pub fn save_config_file(&self) -> UserResult<()> {
        let serialized = serde_json::to_string_pretty(self)
            .into_report()
            .attach_printable("Failed to serialize the user configuration to JSON")
            .change_context(UserError)?;
        let config_path =
            Self::get_config_file_path().attach_printable("Failed to get the config file path")?;
        if let Some(folder_path) = config_path.parent() {
            fs::create_dir_all(folder_path)
                .into_report()
                .attach_printable(format!(
                    "Failed to create directory at {}",
                    folder_path.display()
                ))
                .change_context(UserError)?;
        }
        fs::write(&config_path, serialized)
            .into_report()
            .attach_printable(format!(
                "Failed to write config file at {}",
                config_path.display()
            ))
            .change_context(UserError)?;
        Ok(())
    }

    pub fn get_config_file_path() -> UserResult<PathBuf> {
        dirs::home_dir()
            .ok_or(UserError)
            .into_report()
            .attach_printable("Failed to retrieve the home directory")
            .map(|home_path| home_path.join(".tidal_shuffler").join("config.json"))
    }

    pub fn config_file_exists() -> UserResult<bool> {
        Ok(Self::get_config_file_path()?.exists())
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let fields = [
            ("TIDAL_ACCESS_TOKEN", &mut self.tidal_access_token),
            ("TIDAL_USER_ID", &mut self.tidal_user_id),
            ("TIDAL_COUNTRY_CODE", &mut self.country_code),
            ("TIDAL_EXPORT_DIR", &mut self.export_dir),
        ];
        for (key, field) in fields {
            if let Some(value) = lookup(key).filter(|value| !value.trim().is_empty()) {
                *field = value.trim().to_string();
            }
        }
    }

    pub fn country_code(&self) -> String {
        if self.country_code.is_empty() {
            AppConfig::DEFAULT_COUNTRY_CODE.to_string()
        } else {
            self.country_code.to_uppercase()
        }
    }

    pub fn export_dir(&self) -> PathBuf {
        if self.export_dir.is_empty() {
            PathBuf::from(AppConfig::DEFAULT_EXPORT_DIR)
        } else {
            PathBuf::from(&self.export_dir)
        }
    }

    /// Copy safe to print: the access token only shows its last characters.
    pub fn masked(&self) -> Self {
        let token = &self.tidal_access_token;
        let visible = token.len().min(4);
        let tail = token.get(token.len() - visible..).unwrap_or_default();
        Self {
            tidal_access_token: format!("{}{}", "*".repeat(token.len() - visible), tail),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_overrides_replace_non_empty_values() {
        let mut user = User {
            tidal_access_token: "from-file".to_string(),
            tidal_user_id: "1".to_string(),
            ..Default::default()
        };
        let env = HashMap::from([
            ("TIDAL_ACCESS_TOKEN", "from-env"),
            ("TIDAL_USER_ID", "   "),
            ("TIDAL_EXPORT_DIR", "/tmp/exports"),
        ]);
        user.apply_overrides(|key| env.get(key).map(|value| value.to_string()));
        assert_eq!(user.tidal_access_token, "from-env");
        assert_eq!(user.tidal_user_id, "1");
        assert_eq!(user.export_dir(), PathBuf::from("/tmp/exports"));
    }

    #[test]
    fn test_defaults() {
        let user = User::new();
        assert_eq!(user.country_code(), "US");
        assert_eq!(user.export_dir(), PathBuf::from("./exports"));
    }

    #[test]
    fn test_masked_token() {
        let user = User {
            tidal_access_token: "abcdefgh".to_string(),
            ..Default::default()
        };
        assert_eq!(user.masked().tidal_access_token, "****efgh");
        assert_eq!(User::new().masked().tidal_access_token, "");
    }
}
