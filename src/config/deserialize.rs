// ABOUTME: Custom serde deserializers for config types.
// ABOUTME: Handles service names, image refs, and service lists.

use nonempty::NonEmpty;
use serde::Deserialize;

use crate::types::{ImageRef, ServiceName};

pub fn deserialize_service_name<'de, D>(deserializer: D) -> Result<ServiceName, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    ServiceName::new(&s).map_err(serde::de::Error::custom)
}

pub fn deserialize_image_ref<'de, D>(deserializer: D) -> Result<ImageRef, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    ImageRef::parse(&s).map_err(serde::de::Error::custom)
}

/// Accepts either a YAML list or a comma separated string.
pub fn deserialize_services<'de, D>(deserializer: D) -> Result<NonEmpty<ServiceName>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let names = match ServiceList::deserialize(deserializer)? {
        ServiceList::Joined(s) => ServiceName::parse_list(&s).map_err(serde::de::Error::custom)?,
        ServiceList::List(values) => values
            .iter()
            .map(|v| ServiceName::new(v))
            .collect::<Result<Vec<_>, _>>()
            .map_err(serde::de::Error::custom)?,
    };

    NonEmpty::from_vec(names)
        .ok_or_else(|| serde::de::Error::custom("at least one service is required"))
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ServiceList {
    Joined(String),
    List(Vec<String>),
}
