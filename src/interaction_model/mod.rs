//! Interaction model types (chapter 8 and 10) as seen by a cluster server.
//!
//! Requests arrive here already decoded from TLV: paths are concrete (no
//! wildcards) and command fields are a list of context-tagged values.

use crate::data_model::{AttributeId, AttributeValue, ClusterId, CommandId, EndpointId};

/// Interaction model status codes (8.10.1)
#[repr(u8)]
#[derive(FromPrimitive, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success = 0x00,
    Failure = 0x01,
    InvalidSubscription = 0x7D,
    UnsupportedAccess = 0x7E,
    UnsupportedEndpoint = 0x7F,
    InvalidAction = 0x80,
    UnsupportedCommand = 0x81,
    InvalidCommand = 0x85,
    UnsupportedAttribute = 0x86,
    ConstraintError = 0x87,
    UnsupportedWrite = 0x88,
    ResourceExhausted = 0x89,
    NotFound = 0x8B,
    UnreportableAttribute = 0x8C,
    InvalidDataType = 0x8D,
    UnsupportedRead = 0x8F,
    DataVersionMismatch = 0x92,
    Timeout = 0x94,
    Busy = 0x9C,
    UnsupportedCluster = 0xC3,
    NoUpstreamSubscription = 0xC5,
    NeedsTimedInteraction = 0xC6,
    UnsupportedEvent = 0xC7,
    PathsExhausted = 0xC8,
    TimedRequestMismatch = 0xC9,
    FailsafeRequired = 0xCA,
}

impl Status {
    pub fn is_success(&self) -> bool {
        *self == Status::Success
    }

    /// Collapse a boolean outcome into the status sent in a default response.
    pub fn from_success(success: bool) -> Self {
        if success {
            Status::Success
        } else {
            Status::Failure
        }
    }
}

/// StatusIB (10.6.17)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusIB {
    pub status: Status,
    pub cluster_status: Option<u8>,
}

impl StatusIB {
    pub const fn new(status: Status) -> Self {
        Self {
            status,
            cluster_status: None,
        }
    }
}

impl From<Status> for StatusIB {
    fn from(status: Status) -> Self {
        Self::new(status)
    }
}

/// A concrete AttributePathIB (10.6.2), every component is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributePathIB {
    pub endpoint: EndpointId,
    pub cluster: ClusterId,
    pub attribute: AttributeId,
}

impl AttributePathIB {
    pub const fn new(endpoint: EndpointId, cluster: ClusterId, attribute: AttributeId) -> Self {
        Self {
            endpoint,
            cluster,
            attribute,
        }
    }
}

/// CommandPathIB (10.6.11)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandPathIB {
    pub endpoint: EndpointId,
    pub cluster: ClusterId,
    pub command: CommandId,
}

impl CommandPathIB {
    pub const fn new(endpoint: EndpointId, cluster: ClusterId, command: CommandId) -> Self {
        Self {
            endpoint,
            cluster,
            command,
        }
    }
}

/// AttributeReportIB (10.6.5), carrying either data or a status.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeReportIB {
    pub path: AttributePathIB,
    pub data: Result<AttributeValue, StatusIB>,
}

/// AttributeStatusIB (10.6.16), the result of a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeStatusIB {
    pub path: AttributePathIB,
    pub status: StatusIB,
}

/// The single response produced for an invoke.
///
/// The door lock commands only ever answer with a status, so there is no
/// `CommandDataIB` variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvokeResponseIB {
    pub path: CommandPathIB,
    pub status: StatusIB,
}

/// Decoded command fields, keyed by context tag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandFields {
    fields: Vec<(u8, AttributeValue)>,
}

impl CommandFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder used by decoders and tests.
    pub fn with(mut self, tag: u8, value: impl Into<AttributeValue>) -> Self {
        self.fields.retain(|(t, _)| *t != tag);
        self.fields.push((tag, value.into()));
        self
    }

    pub fn get(&self, tag: u8) -> Option<&AttributeValue> {
        self.fields
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, value)| value)
    }

    /// An optional octet string field. A field of any other type is an
    /// invalid command.
    pub fn optional_octet_string(&self, tag: u8) -> Result<Option<&[u8]>, Status> {
        match self.get(tag) {
            None | Some(AttributeValue::Null) => Ok(None),
            Some(AttributeValue::OctetString(bytes)) => Ok(Some(bytes.as_slice())),
            Some(_) => Err(Status::InvalidCommand),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
