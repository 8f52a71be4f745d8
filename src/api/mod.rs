//! Records API: data model, request building and the HTTP transport.
//!
//! The client never touches the network itself. `RecordClient` turns each
//! operation into an [`HttpRequest`] and interprets the [`HttpResponse`]; a
//! [`Transport`] performs the round-trip in between.

pub mod client;
pub mod http;
pub mod transport;

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

pub use client::RecordClient;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{Transport, UreqTransport};

/// Server-assigned record identifier, kept as a string for display and keying.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// mockapi.io hands out string ids, other mock servers use numbers.
impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Int(i64),
            Uint(u64),
        }
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => RecordId(s),
            Raw::Int(n) => RecordId(n.to_string()),
            Raw::Uint(n) => RecordId(n.to_string()),
        })
    }
}

/// A user record as returned by the collection endpoint.
///
/// Extra fields the server adds (timestamps and the like) are ignored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub name: String,
    pub avatar: String,
}

/// Body of create and update requests.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordInput {
    pub name: String,
    pub avatar: String,
}

impl RecordInput {
    pub fn new(name: impl Into<String>, avatar: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            avatar: avatar.into(),
        }
    }
}
