// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Backend channel credentials.
//!
//! Credentials are built once per process at startup and shared by every
//! backend channel afterwards. Initialization is single-assignment: a racing
//! second initializer gets the handle stored by the first.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static CREDENTIALS: OnceLock<ChannelCredentials> = OnceLock::new();

/// Credentials used to open backend channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelCredentials {
    /// Plaintext channel.
    Insecure,
    /// TLS channel trusting the given DER-encoded CA certificates.
    Tls { ca_certificates: Vec<Vec<u8>> },
}

impl ChannelCredentials {
    pub fn mode(&self) -> &'static str {
        match self {
            ChannelCredentials::Insecure => "insecure",
            ChannelCredentials::Tls { .. } => "tls",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    #[error("Failed to read CA root file at {}", path.display())]
    ReadCaFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CA root file at {} is not a valid certificate bundle: {reason}", path.display())]
    InvalidCaBundle { path: PathBuf, reason: String },
    #[error("TLS credentials have not been initialized")]
    NotInitialized,
}

/// Build credentials from an optional CA bundle without touching the
/// process-wide handle.
pub fn load_credentials(ca_file: Option<&Path>) -> Result<ChannelCredentials, TlsError> {
    let Some(path) = ca_file else {
        return Ok(ChannelCredentials::Insecure);
    };

    let raw = std::fs::read(path).map_err(|source| TlsError::ReadCaFile {
        path: path.to_path_buf(),
        source,
    })?;
    let blocks = pem::parse_many(&raw).map_err(|e| TlsError::InvalidCaBundle {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let ca_certificates: Vec<Vec<u8>> = blocks
        .iter()
        .filter(|block| block.tag() == "CERTIFICATE")
        .map(|block| block.contents().to_vec())
        .collect();
    if ca_certificates.is_empty() {
        return Err(TlsError::InvalidCaBundle {
            path: path.to_path_buf(),
            reason: "no CERTIFICATE blocks".to_string(),
        });
    }

    Ok(ChannelCredentials::Tls { ca_certificates })
}

/// Initialize the process-wide credentials. Later calls return the existing
/// handle and ignore their argument.
pub fn initialize_tls(ca_file: Option<&Path>) -> Result<&'static ChannelCredentials, TlsError> {
    if let Some(existing) = CREDENTIALS.get() {
        return Ok(existing);
    }
    let credentials = load_credentials(ca_file)?;
    let stored = CREDENTIALS.get_or_init(|| credentials);
    tracing::info!(mode = stored.mode(), "Backend channel credentials initialized");
    Ok(stored)
}

/// The process-wide credentials; fails before [`initialize_tls`].
pub fn channel_credentials() -> Result<&'static ChannelCredentials, TlsError> {
    CREDENTIALS.get().ok_or(TlsError::NotInitialized)
}
