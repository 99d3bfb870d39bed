//! Configuration resolution for the Soundclash server
//!
//! Everything is supplied via CLI flags or environment variables and
//! validated once at startup. A missing admin password is a startup
//! error; missing Spotify credentials only degrade catalog lookups.

use crate::{Error, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::warn;

/// Soundclash: audience-voted music bracket tournaments
#[derive(Debug, Clone, Parser)]
#[command(name = "soundclash", version)]
pub struct Config {
    /// Path to the SQLite database file
    #[arg(long, env = "SOUNDCLASH_DATABASE", default_value = "soundclash.db")]
    pub database_path: PathBuf,

    /// Address to listen on
    #[arg(long, env = "SOUNDCLASH_BIND", default_value = "127.0.0.1:5740")]
    pub bind: String,

    /// Password required for admin login
    #[arg(long, env = "SOUNDCLASH_ADMIN_PASSWORD")]
    pub admin_password: Option<String>,

    /// Secret used to sign admin bearer tokens.
    /// Falls back to the Spotify client secret when unset.
    #[arg(long, env = "SOUNDCLASH_SIGNING_SECRET")]
    pub signing_secret: Option<String>,

    /// Spotify client id (optional; catalog lookups disabled without it)
    #[arg(long, env = "SOUNDCLASH_SPOTIFY_CLIENT_ID")]
    pub spotify_client_id: Option<String>,

    /// Spotify client secret (optional; catalog lookups disabled without it)
    #[arg(long, env = "SOUNDCLASH_SPOTIFY_CLIENT_SECRET")]
    pub spotify_client_secret: Option<String>,
}

impl Config {
    /// The admin password, required for the service to start.
    pub fn require_admin_password(&self) -> Result<&str> {
        self.admin_password.as_deref().ok_or_else(|| {
            Error::Config(
                "admin password not configured (set SOUNDCLASH_ADMIN_PASSWORD)".to_string(),
            )
        })
    }

    /// The token signing secret: explicit value, or the Spotify client
    /// secret when one is configured.
    pub fn resolve_signing_secret(&self) -> Result<String> {
        if let Some(secret) = &self.signing_secret {
            return Ok(secret.clone());
        }
        if let Some(secret) = &self.spotify_client_secret {
            warn!("SOUNDCLASH_SIGNING_SECRET not set, signing tokens with the Spotify client secret");
            return Ok(secret.clone());
        }
        Err(Error::Config(
            "no signing secret configured (set SOUNDCLASH_SIGNING_SECRET)".to_string(),
        ))
    }

    /// Spotify credentials, when both halves are present.
    pub fn spotify_credentials(&self) -> Option<(String, String)> {
        match (&self.spotify_client_id, &self.spotify_client_secret) {
            (Some(id), Some(secret)) => Some((id.clone(), secret.clone())),
            _ => None,
        }
    }
}
