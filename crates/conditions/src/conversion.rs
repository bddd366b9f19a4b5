//! # Conversion
//!
//! Hooks for a multi-version API layer rendering statuses in older shapes.
//!
//! Narrowing never fails on extra data: unknown JSON fields are ignored and
//! fields the narrower version declares unsupported are dropped. It fails only
//! when the narrower version requires a field the source does not have.

use crate::condition_set::ConditionSet;
use crate::duck::{v1, v1beta1};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// Recoverable conversion failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("{kind} requires field {field:?} which the source does not set")]
    MissingRequiredField {
        kind: &'static str,
        field: &'static str,
    },
    #[error("unknown API version {0:?}")]
    UnknownVersion(String),
    #[error("malformed {version} document: {message}")]
    Malformed { version: ApiVersion, message: String },
}

/// API versions the duck types are rendered in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiVersion {
    V1,
    V1Beta1,
}

impl ApiVersion {
    pub fn as_str(self) -> &'static str {
        match self {
            ApiVersion::V1 => "v1",
            ApiVersion::V1Beta1 => "v1beta1",
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiVersion {
    type Err = ConversionError;

    /// Accepts a bare version (`v1`) or a group version (`duck.knative.dev/v1`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let version = s.rsplit('/').next().unwrap_or(s);
        match version {
            "v1" => Ok(ApiVersion::V1),
            "v1beta1" => Ok(ApiVersion::V1Beta1),
            _ => Err(ConversionError::UnknownVersion(s.to_owned())),
        }
    }
}

fn decode<T: DeserializeOwned>(
    version: ApiVersion,
    value: serde_json::Value,
) -> Result<T, ConversionError> {
    serde_json::from_value(value).map_err(|e| ConversionError::Malformed {
        version,
        message: e.to_string(),
    })
}

fn encode<T: Serialize>(
    version: ApiVersion,
    value: &T,
) -> Result<serde_json::Value, ConversionError> {
    serde_json::to_value(value).map_err(|e| ConversionError::Malformed {
        version,
        message: e.to_string(),
    })
}

/// A status in one of the supported API versions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionedStatus {
    V1(v1::Status),
    V1Beta1(v1beta1::Status),
}

impl VersionedStatus {
    /// Decodes a status document of the named version
    pub fn from_json(version: &str, value: serde_json::Value) -> Result<Self, ConversionError> {
        match version.parse()? {
            ApiVersion::V1 => Ok(Self::V1(decode(ApiVersion::V1, value)?)),
            ApiVersion::V1Beta1 => Ok(Self::V1Beta1(decode(ApiVersion::V1Beta1, value)?)),
        }
    }

    pub fn to_json(&self) -> Result<serde_json::Value, ConversionError> {
        match self {
            Self::V1(status) => encode(ApiVersion::V1, status),
            Self::V1Beta1(status) => encode(ApiVersion::V1Beta1, status),
        }
    }

    pub fn version(&self) -> ApiVersion {
        match self {
            Self::V1(_) => ApiVersion::V1,
            Self::V1Beta1(_) => ApiVersion::V1Beta1,
        }
    }

    /// Renders this status in `target`
    ///
    /// v1 to v1beta1 projects onto the top-level condition of `set`; v1beta1 to
    /// v1 is lossy and never reconstructs dependents. Converting to the version
    /// the status is already in returns it unchanged.
    pub fn convert(self, target: ApiVersion, set: &ConditionSet) -> Self {
        debug!("Converting status {} -> {}", self.version(), target);
        match (self, target) {
            (Self::V1(status), ApiVersion::V1Beta1) => Self::V1Beta1(status.narrow(set)),
            (Self::V1Beta1(status), ApiVersion::V1) => Self::V1(v1::Status::widen(&status)),
            (same, _) => same,
        }
    }
}

/// An addressable in one of the supported API versions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionedAddressable {
    V1(v1::Addressable),
    V1Beta1(v1beta1::Addressable),
}

impl VersionedAddressable {
    pub fn from_json(version: &str, value: serde_json::Value) -> Result<Self, ConversionError> {
        match version.parse()? {
            ApiVersion::V1 => Ok(Self::V1(decode(ApiVersion::V1, value)?)),
            ApiVersion::V1Beta1 => Ok(Self::V1Beta1(decode(ApiVersion::V1Beta1, value)?)),
        }
    }

    pub fn version(&self) -> ApiVersion {
        match self {
            Self::V1(_) => ApiVersion::V1,
            Self::V1Beta1(_) => ApiVersion::V1Beta1,
        }
    }

    /// Renders this addressable in `target`, failing if v1beta1 lacks its URL
    ///
    /// Converting to the version the addressable is already in returns it
    /// unchanged.
    pub fn convert(self, target: ApiVersion) -> Result<Self, ConversionError> {
        match (self, target) {
            (Self::V1(addr), ApiVersion::V1Beta1) => {
                Ok(Self::V1Beta1(v1beta1::Addressable::try_from(&addr)?))
            }
            (Self::V1Beta1(addr), ApiVersion::V1) => Ok(Self::V1(v1::Addressable::from(&addr))),
            (same, _) => Ok(same),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_versions() {
        assert_eq!("v1".parse::<ApiVersion>().unwrap(), ApiVersion::V1);
        assert_eq!(
            "duck.knative.dev/v1beta1".parse::<ApiVersion>().unwrap(),
            ApiVersion::V1Beta1
        );
        assert_eq!(
            "v1alpha1".parse::<ApiVersion>().unwrap_err(),
            ConversionError::UnknownVersion("v1alpha1".to_owned())
        );
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let status = VersionedStatus::from_json(
            "v1beta1",
            json!({"observedGeneration": 2, "somethingNew": {"x": 1}}),
        )
        .unwrap();
        assert_eq!(status.version(), ApiVersion::V1Beta1);
    }

    #[test]
    fn test_malformed_document() {
        let err =
            VersionedStatus::from_json("v1", json!({"observedGeneration": "two"})).unwrap_err();
        assert!(matches!(err, ConversionError::Malformed { version: ApiVersion::V1, .. }));
    }

    #[test]
    fn test_same_version_conversion_is_identity() {
        let set = ConditionSet::living().with_dependents(["Foo"]).unwrap();
        let status = VersionedStatus::from_json(
            "v1",
            json!({"conditions": [{"type": "Foo", "status": "False", "reason": "bad"}]}),
        )
        .unwrap();
        assert_eq!(status.clone().convert(ApiVersion::V1, &set), status);

        let addr = VersionedAddressable::from_json("v1beta1", json!({"url": "https://bar.com"}))
            .unwrap();
        assert_eq!(addr.clone().convert(ApiVersion::V1Beta1).unwrap(), addr);
    }

    #[test]
    fn test_status_conversion_by_version() {
        let set = ConditionSet::living().with_dependents(["Foo"]).unwrap();
        let wide = VersionedStatus::from_json(
            "v1",
            json!({
                "observedGeneration": 5,
                "conditions": [
                    {"type": "Foo", "status": "True"},
                    {"type": "Ready", "status": "True"}
                ]
            }),
        )
        .unwrap();

        let narrow = wide.convert(ApiVersion::V1Beta1, &set);
        assert_eq!(
            narrow.to_json().unwrap(),
            json!({
                "observedGeneration": 5,
                "conditions": [{"type": "Ready", "status": "True"}]
            })
        );

        let VersionedStatus::V1(back) = narrow.convert(ApiVersion::V1, &set) else {
            panic!("expected v1");
        };
        assert_eq!(back.conditions.len(), 1);
    }

    #[test]
    fn test_addressable_conversion_by_version() {
        let addr =
            VersionedAddressable::from_json("v1", json!({"url": "https://bar.com"})).unwrap();
        let narrow = addr.clone().convert(ApiVersion::V1Beta1).unwrap();
        assert_eq!(narrow.version(), ApiVersion::V1Beta1);
        assert_eq!(narrow.convert(ApiVersion::V1).unwrap(), addr);

        let empty = VersionedAddressable::from_json("v1", json!({})).unwrap();
        assert!(matches!(
            empty.convert(ApiVersion::V1Beta1),
            Err(ConversionError::MissingRequiredField { field: "url", .. })
        ));
    }
}
