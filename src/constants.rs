//! All the constants used by the cluster servers.
//! Capacities are fixed at compile time so that the containers holding
//! them never allocate past a known bound.

/// Maximum number of active hardware faults (11.11.4)
pub const MAX_HARDWARE_FAULTS: usize = 11;
/// Maximum number of active radio faults
pub const MAX_RADIO_FAULTS: usize = 7;
/// Maximum number of active network faults
pub const MAX_NETWORK_FAULTS: usize = 4;

/// Longest PIN accepted as the reference credential.
pub const MAX_PIN_LENGTH: usize = 8;
pub const MIN_PIN_LENGTH: usize = 4;
// TODO: drop once SetCredential stores real credentials.
pub const DEFAULT_PIN_CODE: [u8; 4] = [1, 2, 3, 4];

/// Language attribute is an ISO 639-1 code, at most 3 bytes.
pub const MAX_LANGUAGE_LENGTH: usize = 3;
pub const MAX_SOUND_VOLUME: u8 = 3;

/// Number of attribute values a [`MemoryAttributeStore`] can hold.
///
/// [`MemoryAttributeStore`]: crate::data_model::store::MemoryAttributeStore
pub const ATTRIBUTE_STORE_CAPACITY: usize = 128;
/// Number of events retained by an event log before it reports no space.
pub const EVENT_LOG_CAPACITY: usize = 32;
/// Attribute changes buffered before the reporting layer drains them.
pub const CHANGE_QUEUE_CAPACITY: usize = 32;

/// Vendor ID reserved for testing, used as the prefix of
/// manufacturer-specific attribute IDs.
pub const TEST_VENDOR_ID: u16 = 0xFFF1;
