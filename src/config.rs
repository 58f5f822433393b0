use crate::error::DynResult;
use serde_derive::Deserialize;
use std::path::Path;

/// Fixed properties of the gear, answered by queries
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GearConfig {
    /// Lowest level the output stage can produce. Also the reset value of
    /// the minimum level.
    pub physical_min_level: u8,
    pub version_number: u8,
    pub device_type: u8,
}

impl Default for GearConfig {
    fn default() -> Self {
        GearConfig {
            physical_min_level: 50,
            version_number: 0,
            device_type: 0,
        }
    }
}

impl GearConfig {
    pub fn from_json(json: &str) -> DynResult<GearConfig> {
        let config: GearConfig = serde_json::from_str(json)?;
        if config.physical_min_level == 0 || config.physical_min_level > 253 {
            return Err(format!(
                "Physical minimum level {} out of range",
                config.physical_min_level
            )
            .into());
        }
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> DynResult<GearConfig> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

#[test]
fn partial_config() {
    let c = GearConfig::from_json(r#"{"version_number": 8}"#).unwrap();
    assert_eq!(c.version_number, 8);
    assert_eq!(c.physical_min_level, 50);
    assert!(GearConfig::from_json(r#"{"physical_min_level": 254}"#).is_err());
    assert!(GearConfig::from_json(r#""x""#).is_err());
    assert!(GearConfig::from_json(r#"{"physical_min_level": "a"}"#).is_err());
}
