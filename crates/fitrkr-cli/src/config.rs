//! Configuration file management for fitrkr.
//!
//! Provides a TOML-based config file at `~/.config/fitrkr/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fitrkr_db::config::DbConfig;

pub const USER_ID_ENV: &str = "FITRKR_USER_ID";
pub const DATABASE_URL_ENV: &str = "FITRKR_DATABASE_URL";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    pub database: DatabaseSection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<IdentitySection>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub url: String,
}

/// The user every command acts as, standing in for an authenticated caller.
#[derive(Debug, Serialize, Deserialize)]
pub struct IdentitySection {
    pub user_id: Uuid,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the fitrkr config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/fitrkr` or `~/.config/fitrkr`,
/// including on macOS.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("fitrkr");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("fitrkr")
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    load_config_from(&config_path())
}

fn load_config_from(path: &Path) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    toml::from_str(&contents).context("failed to parse config file")
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    save_config_to(config, &config_path())
}

fn save_config_to(config: &ConfigFile, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create config directory {}", dir.display()))?;
    }

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct FitrkrConfig {
    pub db_config: DbConfig,
    pub user_id: Option<Uuid>,
}

impl FitrkrConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - DB URL: `cli_db_url` > `FITRKR_DATABASE_URL` > `database.url` > `DbConfig::DEFAULT_URL`
    /// - User: `cli_user` > `FITRKR_USER_ID` > `identity.user_id` > none
    pub fn resolve(cli_db_url: Option<&str>, cli_user: Option<&str>) -> Result<Self> {
        Self::resolve_with(load_config().ok(), cli_db_url, cli_user)
    }

    fn resolve_with(
        file_config: Option<ConfigFile>,
        cli_db_url: Option<&str>,
        cli_user: Option<&str>,
    ) -> Result<Self> {
        let db_url = if let Some(url) = cli_db_url {
            url.to_owned()
        } else if let Ok(url) = std::env::var(DATABASE_URL_ENV) {
            url
        } else if let Some(ref cfg) = file_config {
            cfg.database.url.clone()
        } else {
            DbConfig::DEFAULT_URL.to_owned()
        };

        let user_id = if let Some(raw) = cli_user {
            Some(parse_user(raw, "--user")?)
        } else if let Ok(raw) = std::env::var(USER_ID_ENV) {
            Some(parse_user(&raw, USER_ID_ENV)?)
        } else {
            file_config
                .as_ref()
                .and_then(|cfg| cfg.identity.as_ref())
                .map(|identity| identity.user_id)
        };

        Ok(Self {
            db_config: DbConfig::new(db_url),
            user_id,
        })
    }

    /// The acting user, required by every playlist command.
    pub fn require_user(&self) -> Result<Uuid> {
        match self.user_id {
            Some(id) => Ok(id),
            None => bail!(
                "no user id configured; pass --user, set {USER_ID_ENV}, or run `fitrkr init --user <uuid>`"
            ),
        }
    }
}

fn parse_user(raw: &str, source: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).with_context(|| format!("invalid user id from {source}: {raw:?}"))
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        crate::test_util::lock_env()
    }

    fn file(url: &str, user: Option<Uuid>) -> ConfigFile {
        ConfigFile {
            database: DatabaseSection {
                url: url.to_owned(),
            },
            identity: user.map(|user_id| IdentitySection { user_id }),
        }
    }

    #[test]
    fn save_and_load_config_roundtrip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("fitrkr").join("config.toml");
        let user = Uuid::new_v4();

        save_config_to(&file("postgresql://testhost:5432/testdb", Some(user)), &path).unwrap();
        let loaded = load_config_from(&path).unwrap();

        assert_eq!(loaded.database.url, "postgresql://testhost:5432/testdb");
        assert_eq!(loaded.identity.map(|i| i.user_id), Some(user));
    }

    #[test]
    fn identity_section_is_optional() {
        let loaded: ConfigFile =
            toml::from_str("[database]\nurl = \"postgresql://h:5432/db\"\n").unwrap();
        assert!(loaded.identity.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn save_config_sets_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        save_config_to(&file("postgresql://h:5432/db", None), &path).unwrap();

        let meta = std::fs::metadata(&path).unwrap();
        assert_eq!(meta.permissions().mode() & 0o777, 0o600);
    }

    #[test]
    fn cli_flags_override_env_and_file() {
        let _lock = lock_env();
        let env_user = Uuid::new_v4();
        let cli_user = Uuid::new_v4();
        unsafe { std::env::set_var(DATABASE_URL_ENV, "postgresql://env:5432/envdb") };
        unsafe { std::env::set_var(USER_ID_ENV, env_user.to_string()) };

        let config = FitrkrConfig::resolve_with(
            Some(file("postgresql://file:5432/filedb", Some(Uuid::new_v4()))),
            Some("postgresql://cli:5432/clidb"),
            Some(&cli_user.to_string()),
        )
        .unwrap();

        unsafe { std::env::remove_var(DATABASE_URL_ENV) };
        unsafe { std::env::remove_var(USER_ID_ENV) };

        assert_eq!(config.db_config.database_url, "postgresql://cli:5432/clidb");
        assert_eq!(config.user_id, Some(cli_user));
    }

    #[test]
    fn env_overrides_file() {
        let _lock = lock_env();
        let env_user = Uuid::new_v4();
        unsafe { std::env::set_var(DATABASE_URL_ENV, "postgresql://env:5432/envdb") };
        unsafe { std::env::set_var(USER_ID_ENV, env_user.to_string()) };

        let config = FitrkrConfig::resolve_with(
            Some(file("postgresql://file:5432/filedb", Some(Uuid::new_v4()))),
            None,
            None,
        )
        .unwrap();

        unsafe { std::env::remove_var(DATABASE_URL_ENV) };
        unsafe { std::env::remove_var(USER_ID_ENV) };

        assert_eq!(config.db_config.database_url, "postgresql://env:5432/envdb");
        assert_eq!(config.user_id, Some(env_user));
    }

    #[test]
    fn file_used_when_nothing_else_set() {
        let _lock = lock_env();
        unsafe { std::env::remove_var(DATABASE_URL_ENV) };
        unsafe { std::env::remove_var(USER_ID_ENV) };
        let user = Uuid::new_v4();

        let config = FitrkrConfig::resolve_with(
            Some(file("postgresql://file:5432/filedb", Some(user))),
            None,
            None,
        )
        .unwrap();
        assert_eq!(config.db_config.database_url, "postgresql://file:5432/filedb");
        assert_eq!(config.require_user().unwrap(), user);
    }

    #[test]
    fn defaults_without_file() {
        let _lock = lock_env();
        unsafe { std::env::remove_var(DATABASE_URL_ENV) };
        unsafe { std::env::remove_var(USER_ID_ENV) };

        let config = FitrkrConfig::resolve_with(None, None, None).unwrap();
        assert_eq!(config.db_config.database_url, DbConfig::DEFAULT_URL);
        assert!(config.user_id.is_none());
        let msg = config.require_user().unwrap_err().to_string();
        assert!(msg.contains("no user id configured"), "unexpected error: {msg}");
    }

    #[test]
    fn malformed_user_is_rejected() {
        let _lock = lock_env();
        unsafe { std::env::remove_var(USER_ID_ENV) };

        let err = FitrkrConfig::resolve_with(None, None, Some("not-a-uuid")).unwrap_err();
        assert!(err.to_string().contains("--user"));
    }

    #[test]
    fn config_path_ends_with_expected_filename() {
        let path = config_path();
        assert!(
            path.ends_with("fitrkr/config.toml"),
            "unexpected config path: {}",
            path.display()
        );
    }
}
