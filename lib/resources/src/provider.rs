//! Resource inventory providers
//!
//! The browser and the API only see [`ResourceProvider`]; the process-spawn
//! detail of the Azure CLI lives in [`AzCliProvider`].

use crate::record::parse_resource_list;
use crate::{ResourceError, ResourceRecord, Result};
use async_trait::async_trait;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[async_trait]
pub trait ResourceProvider: Send + Sync {
    /// List every resource of one resource group
    async fn list_resources(&self, resource_group: &str) -> Result<Vec<ResourceRecord>>;
}

/// Lists resources by running `az resource list` and reading its JSON output
#[derive(Debug, Clone)]
pub struct AzCliProvider {
    binary: String,
    timeout: Duration,
}

impl AzCliProvider {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    fn command_line(&self, resource_group: &str) -> String {
        format!(
            "{} resource list --resource-group {} --output json",
            self.binary, resource_group
        )
    }
}

impl Default for AzCliProvider {
    fn default() -> Self {
        Self::new("az", DEFAULT_TIMEOUT)
    }
}

#[async_trait]
impl ResourceProvider for AzCliProvider {
    async fn list_resources(&self, resource_group: &str) -> Result<Vec<ResourceRecord>> {
        debug!("Running {}", self.command_line(resource_group));

        let child = Command::new(&self.binary)
            .args(["resource", "list", "--resource-group", resource_group, "--output", "json"])
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.timeout, child).await {
            Ok(Ok(output)) => output,
            Ok(Err(source)) => {
                return Err(ResourceError::Spawn {
                    command: self.command_line(resource_group),
                    source,
                })
            }
            Err(_) => {
                warn!("Inventory command timed out after {:?}", self.timeout);
                return Err(ResourceError::Timeout(self.timeout));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ResourceError::CommandFailed {
                status: output.status.to_string(),
                stderr,
            });
        }

        let records = parse_resource_list(&output.stdout)?;
        debug!("Inventory returned {} resources", records.len());
        Ok(records)
    }
}

/// Fixed in-memory inventory, ignores the resource group
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    records: Vec<ResourceRecord>,
}

impl StaticProvider {
    pub fn new(records: Vec<ResourceRecord>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl ResourceProvider for StaticProvider {
    async fn list_resources(&self, _resource_group: &str) -> Result<Vec<ResourceRecord>> {
        Ok(self.records.clone())
    }
}

/// Keep records whose name contains `search` (case-insensitive).
/// `None` or an empty search keeps everything.
pub fn filter_by_name(records: Vec<ResourceRecord>, search: Option<&str>) -> Vec<ResourceRecord> {
    match search.map(str::trim).filter(|s| !s.is_empty()) {
        Some(term) => {
            let term = term.to_lowercase();
            records
                .into_iter()
                .filter(|r| r.name.to_lowercase().contains(&term))
                .collect()
        }
        None => records,
    }
}
