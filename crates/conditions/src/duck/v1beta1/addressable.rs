use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

/// Address of a resource as understood by v1beta1
///
/// Only the URL is supported, and it is required.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Addressable {
    pub url: Url,
}
