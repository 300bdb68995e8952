// Settings consumed at startup. Values come from the process environment,
// optionally seeded from `.env` files; nothing here validates them, the
// identity endpoint or the storage API rejects what is missing.

use std::path::PathBuf;

pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";
pub const DEFAULT_GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";

const REQUIRED: [&str; 4] = ["CLIENT_ID", "TENANT_ID", "CLIENT_SECRET", "CONTAINER_TYPE_ID"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub client_id: String,
    pub tenant_id: String,
    pub client_secret: String,
    pub container_type_id: String,
    pub graph_base_url: String,
    pub authority_host: String,
    pub scope: String,
}

impl Settings {
    /// Read the process environment. Call `load_env_files` first so `.env`
    /// values are visible here.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup. Unset keys become empty strings
    /// (required values) or the public Microsoft endpoints (URLs, scope).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).map(|v| v.trim().to_string()).unwrap_or_default();
        let or_default = |key: &str, default: &str| {
            let v = value(key);
            if v.is_empty() {
                default.to_string()
            } else {
                v
            }
        };
        Settings {
            client_id: value("CLIENT_ID"),
            tenant_id: value("TENANT_ID"),
            client_secret: value("CLIENT_SECRET"),
            container_type_id: value("CONTAINER_TYPE_ID"),
            graph_base_url: or_default("GRAPH_BASE_URL", DEFAULT_GRAPH_BASE_URL),
            authority_host: or_default("AUTHORITY_HOST", DEFAULT_AUTHORITY_HOST),
            scope: or_default("GRAPH_SCOPE", DEFAULT_GRAPH_SCOPE),
        }
    }

    /// Names of required variables that are empty.
    pub fn missing(&self) -> Vec<&'static str> {
        let values = [
            &self.client_id,
            &self.tenant_id,
            &self.client_secret,
            &self.container_type_id,
        ];
        REQUIRED
            .iter()
            .zip(values)
            .filter(|(_, v)| v.is_empty())
            .map(|(name, _)| *name)
            .collect()
    }
}

/// Outcome of seeding the environment from `.env` files.
#[derive(Debug, Default)]
pub struct EnvFiles {
    pub loaded: Vec<PathBuf>,
    /// Files that exist but could not be parsed, with the reason.
    pub unreadable: Vec<(PathBuf, String)>,
}

impl EnvFiles {
    /// Report what happened. Runs after logging is up, since the files may
    /// carry the log filter themselves.
    pub fn log(&self) {
        for path in &self.loaded {
            tracing::debug!(path = %path.display(), "loaded environment file");
        }
        for (path, reason) in &self.unreadable {
            tracing::warn!(path = %path.display(), error = %reason, "ignoring unreadable env file");
        }
    }
}

/// `.env` in the working directory first, then the per-user file. dotenvy
/// never overrides a variable that is already set.
pub fn load_env_files() -> EnvFiles {
    let mut candidates = vec![PathBuf::from(".env")];
    candidates.extend(user_env_file());
    load_env_files_from(&candidates)
}

/// Load each existing file in order; missing files are skipped.
pub fn load_env_files_from(paths: &[PathBuf]) -> EnvFiles {
    let mut outcome = EnvFiles::default();
    for path in paths.iter().filter(|p| p.is_file()) {
        match dotenvy::from_path(path) {
            Ok(()) => outcome.loaded.push(path.clone()),
            Err(err) => outcome.unreadable.push((path.clone(), err.to_string())),
        }
    }
    outcome
}

/// `<config dir>/spe-demo/.env`, e.g. `~/.config/spe-demo/.env` on Linux.
pub fn user_env_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("spe-demo").join(".env"))
}
