//! Token persistence
//!
//! Tokens live in a two-line text file: line 1 is the access token, line 2
//! the refresh token. Refresh tokens rotate on use, so every refresh
//! overwrites the whole file.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

use crate::error::{OdriveError, Result};

/// A credential pair issued by the identity provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Reads and writes the token file
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Load the stored credential pair.
    ///
    /// An absent file means the user has not logged in yet and maps to
    /// `MissingCredentials` rather than an IO error.
    pub fn load(&self) -> Result<TokenPair> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(OdriveError::MissingCredentials)
            }
            Err(e) => return Err(e.into()),
        };

        let mut lines = content.lines();
        let access_token = lines.next().unwrap_or("").to_string();
        let refresh_token = lines.next().unwrap_or("").to_string();

        if access_token.is_empty() || refresh_token.is_empty() {
            return Err(OdriveError::Auth(format!(
                "Token file {} is malformed; log in again",
                self.path.display()
            )));
        }

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Persist a credential pair, replacing any previous one
    pub fn save(&self, pair: &TokenPair) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(
            &self.path,
            format!("{}\n{}\n", pair.access_token, pair.refresh_token),
        )?;
        debug!("Saved tokens to {:?}", self.path);
        Ok(())
    }
}
