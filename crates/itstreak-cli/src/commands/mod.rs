use itstreak_core::{Config, CoreError};

pub mod config;
pub mod notify;
pub mod profile;
pub mod progress;
pub mod streak;

/// Resolve the target user: an explicit `--user` wins, otherwise the
/// configured `default_user`.
pub fn resolve_user(flag: Option<String>) -> Result<String, Box<dyn std::error::Error>> {
    if let Some(user) = flag {
        return Ok(user);
    }
    let config = Config::load()?;
    config
        .default_user
        .ok_or_else(|| CoreError::NotAuthenticated.into())
}
