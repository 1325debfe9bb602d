use std::{
    env, fmt, fs,
    path::{Path, PathBuf},
};

use crate::{errors::Error, Result};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_MAX_PHOTOS: usize = 10;
pub const DEFAULT_SESSION_FILE: &str = "dpgrab.session";
/// Upper bound of one `photos.getUserPhotos` page.
pub const MAX_PHOTOS_LIMIT: usize = 100;

/// Typed process configuration.
#[derive(Clone)]
pub struct Config {
    // Credentials
    pub api_id: i32,
    pub api_hash: String,
    pub bot_token: String,

    // Liveness endpoint
    pub port: u16,

    // MTProto session (bot authorization only, no user data)
    pub session_file: PathBuf,

    // Behavior
    pub max_photos: usize,
    pub temp_dir: PathBuf,
    pub require_start: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_id", &self.api_id)
            .field("api_hash", &"<redacted>")
            .field("bot_token", &"<redacted>")
            .field("port", &self.port)
            .field("session_file", &self.session_file)
            .field("max_photos", &self.max_photos)
            .field("temp_dir", &self.temp_dir)
            .field("require_start", &self.require_start)
            .finish()
    }
}

impl Config {
    /// Load from the process environment, after merging an optional `.env`.
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        let cfg = Self::from_lookup(env_str)?;
        fs::create_dir_all(&cfg.temp_dir)?;
        Ok(cfg)
    }

    /// Build a config from an arbitrary key lookup. Does not touch the filesystem.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_id_raw = required(&lookup, "API_ID")?;
        let api_id = api_id_raw
            .trim()
            .parse::<i32>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| Error::Config("API_ID must be a positive integer".to_string()))?;
        let api_hash = required(&lookup, "API_HASH")?;
        let bot_token = required(&lookup, "BOT_TOKEN")?;

        let port = match lookup("PORT").and_then(non_empty) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| Error::Config(format!("PORT is not a valid port number: {raw}")))?,
            None => DEFAULT_PORT,
        };

        let max_photos = match lookup("MAX_PHOTOS").and_then(non_empty) {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|_| Error::Config(format!("MAX_PHOTOS is not a valid count: {raw}")))?
                .clamp(1, MAX_PHOTOS_LIMIT),
            None => DEFAULT_MAX_PHOTOS,
        };

        let session_file = lookup("SESSION_FILE")
            .and_then(non_empty)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE));

        let temp_dir = lookup("TEMP_DIR")
            .and_then(non_empty)
            .map(PathBuf::from)
            .unwrap_or_else(|| env::temp_dir().join("dpgrab"));

        let require_start = lookup("REQUIRE_START")
            .map(|s| parse_bool(&s))
            .unwrap_or(false);

        Ok(Self {
            api_id,
            api_hash,
            bot_token,
            port,
            session_file,
            max_photos,
            temp_dir,
            require_start,
        })
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    lookup(key)
        .and_then(non_empty)
        .map(|s| s.trim().to_string())
        .ok_or_else(|| Error::Config(format!("{key} environment variable is required")))
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        out.push((key.to_string(), val));
    }
    out
}

fn parse_bool(s: &str) -> bool {
    matches!(
        s.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
