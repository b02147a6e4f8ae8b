//! Protocol header names and request header parsing.
//!
//! # Responsibilities
//! - Name every header that is part of the wire contract
//! - Detect protocol-aware requests
//! - Parse partial-reload directives and the back-navigation target

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};
use indexmap::IndexSet;

use crate::props::PartialReload;

/// Marker header sent by the client on every client-side visit.
pub const X_INERTIA: HeaderName = HeaderName::from_static("x-inertia");

/// Asset version the client was built against.
pub const X_INERTIA_VERSION: HeaderName = HeaderName::from_static("x-inertia-version");

/// Forces the client to perform a full page visit to the given URL.
pub const X_INERTIA_LOCATION: HeaderName = HeaderName::from_static("x-inertia-location");

/// Component targeted by a partial reload.
pub const X_INERTIA_PARTIAL_COMPONENT: HeaderName =
    HeaderName::from_static("x-inertia-partial-component");

/// Comma-separated props to include in a partial reload.
pub const X_INERTIA_PARTIAL_DATA: HeaderName = HeaderName::from_static("x-inertia-partial-data");

/// Comma-separated props to exclude from a partial reload.
pub const X_INERTIA_PARTIAL_EXCEPT: HeaderName =
    HeaderName::from_static("x-inertia-partial-except");

/// Value written into the `X-Inertia` response header.
pub const INERTIA_TRUE: HeaderValue = HeaderValue::from_static("true");

/// Returns true if the request was made by the client-side router.
pub fn is_inertia_request(headers: &HeaderMap) -> bool {
    headers.contains_key(X_INERTIA)
}

/// Asset version declared by the client, empty if absent.
pub fn client_version(headers: &HeaderMap) -> &str {
    header_str(headers, &X_INERTIA_VERSION)
}

/// Back-navigation target taken from `Referer`, empty if absent.
pub fn referer(headers: &HeaderMap) -> &str {
    header_str(headers, &header::REFERER)
}

/// Parse the partial-reload directive; only protocol-aware requests carry one.
pub fn partial_reload(headers: &HeaderMap) -> Option<PartialReload> {
    if !is_inertia_request(headers) {
        return None;
    }

    let component = header_str(headers, &X_INERTIA_PARTIAL_COMPONENT);
    if component.is_empty() {
        return None;
    }

    Some(PartialReload {
        component: component.to_string(),
        only: split_names(header_str(headers, &X_INERTIA_PARTIAL_DATA)),
        except: split_names(header_str(headers, &X_INERTIA_PARTIAL_EXCEPT)),
    })
}

/// Append `X-Inertia` to `Vary` unless it is already listed.
pub fn add_vary(headers: &mut HeaderMap) {
    let listed = headers
        .get_all(header::VARY)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .any(|v| v.trim().eq_ignore_ascii_case(X_INERTIA.as_str()));

    if !listed {
        headers.append(header::VARY, HeaderValue::from_static("X-Inertia"));
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &HeaderName) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

fn split_names(raw: &str) -> IndexSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
