//! # v1 Addressable
//!
//! Resources that can be the target of an event or request expose an address.

use crate::conversion::ConversionError;
use crate::duck::v1beta1;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::trace;
use url::Url;

/// Address of a resource, with optional TLS and audience metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Addressable {
    /// Name of the address, for resources exposing several
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<Url>,
    /// PEM-encoded CA certificates trusted for `url`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_certs: Option<String>,
    /// OIDC audience of the addressable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
}

impl TryFrom<&Addressable> for v1beta1::Addressable {
    type Error = ConversionError;

    /// `name`, `caCerts` and `audience` are unsupported by v1beta1 and
    /// dropped. `url` is required there.
    fn try_from(source: &Addressable) -> Result<Self, Self::Error> {
        let url = source
            .url
            .clone()
            .ok_or(ConversionError::MissingRequiredField {
                kind: "Addressable",
                field: "url",
            })?;
        if source.name.is_some() || source.ca_certs.is_some() || source.audience.is_some() {
            trace!("Dropping fields unsupported by v1beta1 Addressable");
        }
        Ok(Self { url })
    }
}

impl From<&v1beta1::Addressable> for Addressable {
    fn from(source: &v1beta1::Addressable) -> Self {
        Self {
            url: Some(source.url.clone()),
            ..Self::default()
        }
    }
}
