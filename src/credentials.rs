// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! API key storage.
//!
//! Keys live in a small JSON file (`{"api-key": ..., "secret-key": ...}`).
//! A missing file or an incomplete entry triggers an interactive prompt and
//! the answers are written back.

use crate::error::TradeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const DEFAULT_KEY_FILE: &str = "dev-key.json";
pub const TESTNET_KEY_FILE: &str = "test-dev-key.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct KeyFile {
    #[serde(rename = "api-key", default)]
    api_key: String,
    #[serde(rename = "secret-key", default)]
    secret_key: String,
}

/// An API key pair.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub secret_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load a complete key pair, or `None` if the file is absent or incomplete.
    pub fn load(&self) -> Result<Option<Credentials>, TradeError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        let keys: KeyFile = match serde_json::from_str(&content) {
            Ok(keys) => keys,
            Err(e) => {
                warn!("Ignoring malformed key file {}: {}", self.path.display(), e);
                return Ok(None);
            }
        };

        if keys.api_key.is_empty() || keys.secret_key.is_empty() {
            return Ok(None);
        }

        Ok(Some(Credentials {
            api_key: keys.api_key,
            secret_key: keys.secret_key,
        }))
    }

    pub fn save(&self, credentials: &Credentials) -> Result<(), TradeError> {
        let keys = KeyFile {
            api_key: credentials.api_key.clone(),
            secret_key: credentials.secret_key.clone(),
        };
        fs::write(&self.path, serde_json::to_string_pretty(&keys)?)?;
        Ok(())
    }

    /// Load keys, prompting on stdin when they are missing.
    pub fn load_or_prompt(&self) -> Result<Credentials, TradeError> {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        self.load_or_prompt_with(&mut stdin.lock(), &mut stdout)
    }

    pub fn load_or_prompt_with<R: BufRead, W: Write>(
        &self,
        input: &mut R,
        output: &mut W,
    ) -> Result<Credentials, TradeError> {
        if let Some(credentials) = self.load()? {
            info!("🔑 Loaded API keys from {}", self.path.display());
            return Ok(credentials);
        }

        writeln!(
            output,
            "Binance API user keys either incomplete or not found.\nPlease insert your keys before usage."
        )?;
        let api_key = prompt_line(input, output, "Enter public key:")?;
        let secret_key = prompt_line(input, output, "Enter private key:")?;

        if api_key.is_empty() || secret_key.is_empty() {
            return Err(TradeError::Configuration(
                "both the public and the private key are required".into(),
            ));
        }

        let credentials = Credentials {
            api_key,
            secret_key,
        };
        self.save(&credentials)?;
        writeln!(output, "Generated '{}'", self.path.display())?;

        Ok(credentials)
    }
}

fn prompt_line<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
) -> Result<String, TradeError> {
    write!(output, "{}", prompt)?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}
