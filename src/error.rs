//! Errors surfaced by the asset-load pipeline.

use thiserror::Error;

/// A failed step of the load pipeline.
///
/// Both variants keep the URI that was being loaded and the underlying cause
/// (network, I/O or decode failure) as their source.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to load environment map from {uri}")]
    Environment {
        uri: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("failed to load model from {uri}")]
    Model {
        uri: String,
        #[source]
        source: anyhow::Error,
    },
}

impl LoadError {
    pub fn environment(uri: &str, source: anyhow::Error) -> Self {
        Self::Environment {
            uri: uri.to_string(),
            source,
        }
    }

    pub fn model(uri: &str, source: anyhow::Error) -> Self {
        Self::Model {
            uri: uri.to_string(),
            source,
        }
    }

    pub fn uri(&self) -> &str {
        match self {
            Self::Environment { uri, .. } | Self::Model { uri, .. } => uri,
        }
    }
}
