//! Defines core types in the data model

use bitflags::bitflags;

use crate::interaction_model::Status;

pub mod access;
pub mod device;
pub mod device_type;
pub mod endpoint;
pub mod event;
pub mod handler;
pub mod reporting;
pub mod store;

pub type EndpointId = u16;
pub type ClusterId = u32;
pub type AttributeId = u32;
pub type CommandId = u32;
pub type EventId = u32;
/// Monotonically increasing per node (7.14.2.1)
pub type EventNumber = u64;

bitflags! {
    /// Attribute qualities (7.7)
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Quality: u8 {
        const NULLABLE = 0x01;
        const NON_VOLATILE = 0x02;
        const FIXED = 0x04;
        const LIST = 0x08;
        const SCENE = 0x10;
    }
}

bitflags! {
    /// Access privileges an attribute grants to a remote peer
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Access: u8 {
        const READ = 0x01;
        const WRITE = 0x02;
        const RW = Self::READ.bits() | Self::WRITE.bits();
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Attribute {
    pub id: AttributeId,
    pub quality: Quality,
    pub access: Access,
}

impl Attribute {
    pub const fn new(id: AttributeId, quality: Quality, access: Access) -> Self {
        Self {
            id,
            quality,
            access,
        }
    }

    pub const fn is_writable(&self) -> bool {
        self.access.contains(Access::WRITE)
    }
}

/// A decoded attribute or field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    Null,
    Boolean(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Utf8(String),
    OctetString(Vec<u8>),
    List(Vec<AttributeValue>),
    /// Struct fields keyed by context tag
    Struct(Vec<(u8, AttributeValue)>),
}

impl AttributeValue {
    pub fn empty_list() -> Self {
        AttributeValue::List(vec![])
    }

    pub fn as_list(&self) -> Option<&[AttributeValue]> {
        match self {
            AttributeValue::List(items) => Some(items),
            _ => None,
        }
    }
}

macro_rules! attribute_value_conversions {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$ty> for AttributeValue {
                fn from(value: $ty) -> Self {
                    AttributeValue::$variant(value)
                }
            }

            impl TryFrom<AttributeValue> for $ty {
                type Error = Status;

                fn try_from(value: AttributeValue) -> Result<Self, Self::Error> {
                    match value {
                        AttributeValue::$variant(value) => Ok(value),
                        _ => Err(Status::InvalidDataType),
                    }
                }
            }
        )+
    };
}

attribute_value_conversions!(
    bool => Boolean,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    String => Utf8,
    Vec<u8> => OctetString,
);

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Utf8(value.into())
    }
}

/// Event priority levels (7.14.2.2)
#[repr(u8)]
#[derive(FromPrimitive, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventPriority {
    Debug = 0,
    Info = 1,
    Critical = 2,
}
