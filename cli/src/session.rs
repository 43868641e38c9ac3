//! Session gate.
//!
//! Holds the current token and decides which area a navigation lands in. A
//! present token is trusted until logout clears it; there is no expiry.

use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Catalog,
}

#[derive(Debug, Default)]
pub struct Session {
    token: Option<String>,
    token_file: Option<PathBuf>,
}

impl Session {
    pub fn new(token_file: Option<PathBuf>) -> Self {
        Session {
            token: None,
            token_file,
        }
    }

    /// An explicit token wins over one remembered in the token file.
    pub fn restore(explicit: Option<String>, token_file: Option<PathBuf>) -> Self {
        let remembered = token_file
            .as_ref()
            .and_then(|path| fs::read_to_string(path).ok())
            .map(|t| t.trim().to_string());
        let token = explicit
            .or(remembered)
            .filter(|t| !t.trim().is_empty());
        Session { token, token_file }
    }

    pub fn current_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Replace the token, keeping the token file in step. `None` logs out.
    pub fn set_token(&mut self, token: Option<String>) -> Result<()> {
        self.token = token.filter(|t| !t.trim().is_empty());
        let Some(path) = &self.token_file else {
            return Ok(());
        };
        match &self.token {
            Some(token) => {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create token directory '{}'", parent.display())
                    })?;
                }
                fs::write(path, token)
                    .with_context(|| format!("Failed to write token file '{}'", path.display()))
            }
            None => match fs::remove_file(path) {
                Err(e) if e.kind() != ErrorKind::NotFound => Err(e)
                    .with_context(|| format!("Failed to remove token file '{}'", path.display())),
                _ => Ok(()),
            },
        }
    }

    pub fn route(&self) -> Route {
        if self.token.is_some() {
            Route::Catalog
        } else {
            Route::Login
        }
    }
}
