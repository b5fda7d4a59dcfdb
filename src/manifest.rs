//! Function manifest: which functions to subscribe when the bus starts.
//!
//! ```toml
//! lambda_port = 3002
//!
//! [functions.notify]
//! name = "my-service-dev-notify"   # optional, defaults to the table key
//! events = [
//!   { eventBridge = { eventBus = "marketing", pattern = { source = ["acme.campaign"] } } },
//!   { http = { path = "/notify" } },
//! ]
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::rules::SubscriptionRequest;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse manifest: {0}")]
    Parse(#[from] toml::de::Error),
    /// Functions listen to EventBridge but the bus would not know where to call them.
    #[error("lambda_port is not set; cannot subscribe {0}")]
    MissingLambdaPort(String),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub lambda_port: Option<u16>,
    #[serde(default)]
    pub functions: BTreeMap<String, FunctionDef>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FunctionDef {
    /// Deployed function name; the table key is used when absent.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub events: Vec<Value>,
}

impl FunctionDef {
    fn listens_to_event_bridge(&self) -> bool {
        self.events
            .iter()
            .any(|event| event.get("eventBridge").is_some_and(|v| !v.is_null()))
    }
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ManifestError> {
        Ok(toml::from_str(text)?)
    }

    /// One subscription request per function that has `eventBridge` events.
    pub fn subscriptions(&self) -> Result<Vec<SubscriptionRequest>, ManifestError> {
        let mut requests = Vec::new();
        for (key, function) in &self.functions {
            if !function.listens_to_event_bridge() {
                continue;
            }
            let name = function.name.clone().unwrap_or_else(|| key.clone());
            let lambda_port = self
                .lambda_port
                .ok_or_else(|| ManifestError::MissingLambdaPort(name.clone()))?;
            requests.push(SubscriptionRequest {
                name,
                lambda_port,
                events: function.events.clone(),
            });
        }
        Ok(requests)
    }

    /// Deployed names of every function in the manifest.
    pub fn function_names(&self) -> BTreeSet<String> {
        self.functions
            .iter()
            .map(|(key, f)| f.name.clone().unwrap_or_else(|| key.clone()))
            .collect()
    }
}
