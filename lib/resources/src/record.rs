use serde::{Deserialize, Deserializer, Serialize};

/// Shown when the inventory does not report a location
pub const UNKNOWN_LOCATION: &str = "N/A";

/// A cloud resource as reported by the inventory tool
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceRecord {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default = "unknown_location", deserialize_with = "location_or_unknown")]
    pub location: String,
}

impl ResourceRecord {
    pub fn new(
        name: impl Into<String>,
        resource_type: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            resource_type: resource_type.into(),
            location: location.into(),
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

fn unknown_location() -> String {
    UNKNOWN_LOCATION.to_string()
}

fn location_or_unknown<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(unknown_location))
}

/// Parse the JSON array printed by `az resource list --output json`.
///
/// Extra fields (tags, sku, kind...) are ignored.
pub fn parse_resource_list(raw: &[u8]) -> crate::Result<Vec<ResourceRecord>> {
    Ok(serde_json::from_slice(raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_az_output() {
        let raw = br#"[
            {
                "id": "/subscriptions/x/resourceGroups/RSGYAPE001/providers/Microsoft.Compute/virtualMachines/vm1",
                "name": "vm1",
                "type": "Microsoft.Compute/virtualMachines",
                "location": "eastus",
                "tags": {"env": "dev"},
                "sku": null
            },
            {"name": "disk1", "type": "Microsoft.Compute/disks", "location": null},
            {"name": "nsg1", "type": "Microsoft.Network/networkSecurityGroups"}
        ]"#;

        let records = parse_resource_list(raw).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].name, "vm1");
        assert_eq!(records[0].location, "eastus");
        assert!(records[0].id.as_deref().unwrap().ends_with("/vm1"));
        assert_eq!(records[1].location, UNKNOWN_LOCATION);
        assert_eq!(records[2].location, UNKNOWN_LOCATION);
        assert_eq!(records[2].id, None);
    }

    #[test]
    fn test_parse_malformed_output() {
        assert!(parse_resource_list(b"ERROR: Please run 'az login'").is_err());
        assert!(parse_resource_list(br#"{"name": "not-an-array"}"#).is_err());
    }

    #[test]
    fn test_serialize_uses_type_key() {
        let json = serde_json::to_value(ResourceRecord::new("vm1", "VM", "East US")).unwrap();
        assert_eq!(json["type"], "VM");
        assert_eq!(json["id"], serde_json::Value::Null);
    }
}
