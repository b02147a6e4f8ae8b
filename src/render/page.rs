//! Page object sent to the client.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::render::template::unescape_html;

/// Serialized as `{component, props, url, version}`; `props` always carries `errors`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub component: String,
    pub props: Map<String, Value>,
    pub url: String,
    pub version: String,
}

impl Page {
    /// Decode a page from a data-only response body.
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Extract the page embedded in a client-side bootstrap document.
    ///
    /// Returns `None` if no `data-page` attribute is present or it does not decode.
    pub fn from_html(html: &str) -> Option<Self> {
        const ATTR: &str = "data-page=\"";

        let start = html.find(ATTR)? + ATTR.len();
        let end = start + html[start..].find('"')?;
        serde_json::from_str(&unescape_html(&html[start..end])).ok()
    }
}
