// ABOUTME: ECS service identifier validation: a bare name or a full service ARN.
// ABOUTME: Names are up to 255 letters, digits, hyphens and underscores.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceNameError {
    #[error("service name cannot be empty")]
    Empty,

    #[error("service name exceeds maximum length of 255 characters")]
    TooLong,

    #[error("invalid character in service name: '{0}'")]
    InvalidChar(char),

    #[error("malformed service ARN '{0}': expected arn:<partition>:ecs:<region>:<account>:service/...")]
    MalformedArn(String),
}

/// A service name, or a service ARN passed to ECS verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ServiceName(String);

impl ServiceName {
    pub fn new(value: &str) -> Result<Self, ServiceNameError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(ServiceNameError::Empty);
        }

        if value.starts_with("arn:") {
            let name = arn_service_name(value)
                .ok_or_else(|| ServiceNameError::MalformedArn(value.to_string()))?;
            validate_name(name)?;
        } else {
            validate_name(value)?;
        }

        Ok(Self(value.to_string()))
    }

    /// Parse a comma separated list such as `api,worker,cron`.
    pub fn parse_list(value: &str) -> Result<Vec<Self>, ServiceNameError> {
        value.split(',').map(Self::new).collect()
    }

    /// The identifier as given, name or ARN.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The bare service name: the last segment of an ARN, or the name itself.
    pub fn short_name(&self) -> &str {
        arn_service_name(&self.0).unwrap_or(&self.0)
    }
}

/// Name segment of `arn:<partition>:ecs:<region>:<account>:service/[<cluster>/]<name>`.
fn arn_service_name(arn: &str) -> Option<&str> {
    let mut parts = arn.splitn(6, ':');
    let (Some("arn"), Some(partition), Some("ecs"), Some(_region), Some(account), Some(resource)) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return None;
    };
    if partition.is_empty() || account.is_empty() {
        return None;
    }

    let path = resource.strip_prefix("service/")?;
    let segments: Vec<&str> = path.split('/').collect();
    match segments.as_slice() {
        [name] | [_, name] if !name.is_empty() => Some(*name),
        _ => None,
    }
}

fn validate_name(name: &str) -> Result<(), ServiceNameError> {
    if name.len() > 255 {
        return Err(ServiceNameError::TooLong);
    }

    if let Some(c) = name
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && *c != '-' && *c != '_')
    {
        return Err(ServiceNameError::InvalidChar(c));
    }

    Ok(())
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ServiceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
