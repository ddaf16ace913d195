//! Door Lock cluster (5.2)
//!
//! Remote lock and unlock commands are checked against the configured PIN
//! and the `RequirePINforRemoteOperation` policy before the actuator is
//! driven. User and credential management commands are accepted but not
//! implemented yet.

use bitflags::bitflags;
use log::{error, info, warn};
use num::FromPrimitive;

use crate::{
    cluster::{Cluster, ClusterClassification},
    constants::{
        DEFAULT_PIN_CODE, MAX_LANGUAGE_LENGTH, MAX_PIN_LENGTH, MAX_SOUND_VOLUME, MIN_PIN_LENGTH,
        TEST_VENDOR_ID,
    },
    data_model::{
        handler::Handler, store::AttributeStore, Access, Attribute, AttributeId, AttributeValue,
        ClusterId, EndpointId, Quality,
    },
    interaction_model::{AttributePathIB, CommandFields, CommandPathIB, Status},
    Error,
};

pub const CLUSTER_ID: ClusterId = 0x0101;

/// Counter of failed credential checks, outside the standard attribute range.
pub const WRONG_CODE_ENTRY_COUNT_ID: AttributeId = (TEST_VENDOR_ID as u32) << 16;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Feature: u32 {
        const PIN_CREDENTIAL = 0x0001;
        const RFID_CREDENTIAL = 0x0002;
        const FINGER_CREDENTIALS = 0x0004;
        const LOGGING = 0x0008;
        const WEEK_DAY_ACCESS_SCHEDULES = 0x0010;
        const DOOR_POSITION_SENSOR = 0x0020;
    }
}

const SETTING: Quality = Quality::NON_VOLATILE;

pub const CLUSTER: Cluster<'static> = Cluster {
    id: CLUSTER_ID,
    classification: ClusterClassification::Application,
    revision: 6,
    features: Feature::PIN_CREDENTIAL
        .union(Feature::DOOR_POSITION_SENSOR)
        .bits(),
    attributes: &[
        Attribute::new(Attributes::LockState as _, Quality::NULLABLE, Access::READ),
        Attribute::new(Attributes::LockType as _, Quality::empty(), Access::READ),
        Attribute::new(Attributes::ActuatorEnabled as _, Quality::empty(), Access::READ),
        Attribute::new(Attributes::DoorState as _, Quality::NULLABLE, Access::READ),
        Attribute::new(Attributes::Language as _, SETTING, Access::RW),
        Attribute::new(Attributes::AutoRelockTime as _, SETTING, Access::RW),
        Attribute::new(Attributes::SoundVolume as _, SETTING, Access::RW),
        Attribute::new(Attributes::OperatingMode as _, SETTING, Access::RW),
        Attribute::new(Attributes::EnableOneTouchLocking as _, SETTING, Access::RW),
        Attribute::new(Attributes::EnablePrivacyModeButton as _, SETTING, Access::RW),
        Attribute::new(Attributes::WrongCodeEntryLimit as _, SETTING, Access::RW),
        Attribute::new(
            Attributes::RequirePINforRemoteOperation as _,
            SETTING,
            Access::RW,
        ),
        Attribute::new(
            Attributes::WrongCodeEntryCount as _,
            Quality::NON_VOLATILE,
            Access::READ,
        ),
    ],
    commands: &[
        Commands::LockDoor as _,
        Commands::UnlockDoor as _,
        Commands::SetUser as _,
        Commands::GetUser as _,
        Commands::ClearUser as _,
        Commands::SetCredential as _,
        Commands::GetCredentialStatus as _,
        Commands::ClearCredential as _,
    ],
    generated_commands: &[],
    events: &[],
};

#[repr(u32)]
#[derive(FromPrimitive, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attributes {
    LockState = 0x0000,
    LockType = 0x0001,
    ActuatorEnabled = 0x0002,
    DoorState = 0x0003,
    Language = 0x0021,
    AutoRelockTime = 0x0023,
    SoundVolume = 0x0024,
    OperatingMode = 0x0025,
    EnableOneTouchLocking = 0x0029,
    EnablePrivacyModeButton = 0x002B,
    WrongCodeEntryLimit = 0x0030,
    RequirePINforRemoteOperation = 0x0033,
    WrongCodeEntryCount = WRONG_CODE_ENTRY_COUNT_ID,
}

#[repr(u32)]
#[derive(FromPrimitive, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    LockDoor = 0x00,
    UnlockDoor = 0x01,
    SetUser = 0x1A,
    GetUser = 0x1B,
    ClearUser = 0x1D,
    SetCredential = 0x22,
    GetCredentialStatus = 0x24,
    ClearCredential = 0x26,
}

#[repr(u8)]
#[derive(FromPrimitive, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    NotFullyLocked = 0,
    Locked = 1,
    Unlocked = 2,
}

#[repr(u8)]
#[derive(FromPrimitive, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorState {
    Open = 0,
    Closed = 1,
    Jammed = 2,
    ForcedOpen = 3,
    UnspecifiedError = 4,
    Ajar = 5,
}

#[repr(u8)]
#[derive(FromPrimitive, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatingMode {
    Normal = 0,
    Vacation = 1,
    Privacy = 2,
    NoRemoteLockUnlock = 3,
    Passage = 4,
}

/// Runtime configuration of a door lock endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoorLockConfig {
    pin: heapless::Vec<u8, MAX_PIN_LENGTH>,
}

impl DoorLockConfig {
    /// A configuration checking remote operations against `pin`.
    pub fn new(pin: &[u8]) -> Result<Self, Error> {
        if pin.len() < MIN_PIN_LENGTH {
            return Err(Error::InvalidArgument);
        }
        let pin = heapless::Vec::from_slice(pin).map_err(|_| Error::BufferTooSmall)?;
        Ok(Self { pin })
    }

    pub fn pin(&self) -> &[u8] {
        &self.pin
    }
}

impl Default for DoorLockConfig {
    fn default() -> Self {
        Self {
            pin: heapless::Vec::from_slice(&DEFAULT_PIN_CODE).unwrap_or_default(),
        }
    }
}

/// Drives the physical lock. Returning `false` fails the command.
pub trait DoorLockDelegate {
    fn on_lock_command(&mut self, _endpoint: EndpointId, _pin: Option<&[u8]>) -> bool {
        false
    }

    fn on_unlock_command(&mut self, _endpoint: EndpointId, _pin: Option<&[u8]>) -> bool {
        false
    }
}

impl<D> DoorLockDelegate for &mut D
where
    D: DoorLockDelegate,
{
    fn on_lock_command(&mut self, endpoint: EndpointId, pin: Option<&[u8]>) -> bool {
        (**self).on_lock_command(endpoint, pin)
    }

    fn on_unlock_command(&mut self, endpoint: EndpointId, pin: Option<&[u8]>) -> bool {
        (**self).on_unlock_command(endpoint, pin)
    }
}

/// A lock with no actuator attached: every remote operation fails.
pub struct DefaultDoorLockDelegate;

impl DoorLockDelegate for DefaultDoorLockDelegate {}

/// How a remote lock or unlock request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockOutcome {
    Success,
    ActuatorDisabled,
    InvalidCredential,
    CredentialRequired,
    ActuatorFailed,
    /// The actuator moved but the new state could not be stored, the
    /// reported `LockState` may be stale.
    StateCommitFailed,
}

impl LockOutcome {
    pub fn is_success(&self) -> bool {
        *self == LockOutcome::Success
    }

    /// Whether the request counts as a wrong code entry.
    pub fn is_wrong_entry(&self) -> bool {
        matches!(
            self,
            LockOutcome::InvalidCredential | LockOutcome::CredentialRequired
        )
    }
}

impl From<LockOutcome> for Status {
    fn from(outcome: LockOutcome) -> Self {
        Status::from_success(outcome.is_success())
    }
}

const fn path(endpoint: EndpointId, attribute: Attributes) -> AttributePathIB {
    AttributePathIB::new(endpoint, CLUSTER_ID, attribute as _)
}

fn write_attribute<S, T>(
    store: &mut S,
    endpoint: EndpointId,
    attribute: Attributes,
    value: T,
) -> Result<(), Status>
where
    S: AttributeStore,
    T: Into<AttributeValue>,
{
    store
        .set_as(&path(endpoint, attribute), value)
        .map_err(|status| {
            error!("Door Lock: failed to set {attribute:?} on endpoint {endpoint}: {status:?}");
            status
        })
}

pub fn set_lock_state<S: AttributeStore>(
    store: &mut S,
    endpoint: EndpointId,
    state: LockState,
) -> Result<(), Status> {
    write_attribute(store, endpoint, Attributes::LockState, state as u8)
}

pub fn set_actuator_enabled<S: AttributeStore>(
    store: &mut S,
    endpoint: EndpointId,
    enabled: bool,
) -> Result<(), Status> {
    write_attribute(store, endpoint, Attributes::ActuatorEnabled, enabled)
}

pub fn set_door_state<S: AttributeStore>(
    store: &mut S,
    endpoint: EndpointId,
    state: DoorState,
) -> Result<(), Status> {
    write_attribute(store, endpoint, Attributes::DoorState, state as u8)
}

/// Seconds before the lock relocks itself, 0 disables auto relock.
pub fn set_auto_relock_time<S: AttributeStore>(
    store: &mut S,
    endpoint: EndpointId,
    seconds: u32,
) -> Result<(), Status> {
    write_attribute(store, endpoint, Attributes::AutoRelockTime, seconds)
}

pub fn set_language<S: AttributeStore>(
    store: &mut S,
    endpoint: EndpointId,
    language: &str,
) -> Result<(), Status> {
    if language.len() > MAX_LANGUAGE_LENGTH {
        warn!("Door Lock: language {language:?} is longer than {MAX_LANGUAGE_LENGTH} bytes");
        return Err(Status::ConstraintError);
    }
    write_attribute(store, endpoint, Attributes::Language, language)
}

pub fn set_sound_volume<S: AttributeStore>(
    store: &mut S,
    endpoint: EndpointId,
    volume: u8,
) -> Result<(), Status> {
    if volume > MAX_SOUND_VOLUME {
        warn!("Door Lock: sound volume {volume} out of range");
        return Err(Status::ConstraintError);
    }
    write_attribute(store, endpoint, Attributes::SoundVolume, volume)
}

pub fn set_one_touch_locking<S: AttributeStore>(
    store: &mut S,
    endpoint: EndpointId,
    enabled: bool,
) -> Result<(), Status> {
    write_attribute(store, endpoint, Attributes::EnableOneTouchLocking, enabled)
}

pub fn set_privacy_mode_button<S: AttributeStore>(
    store: &mut S,
    endpoint: EndpointId,
    enabled: bool,
) -> Result<(), Status> {
    write_attribute(store, endpoint, Attributes::EnablePrivacyModeButton, enabled)
}

/// Persist the wrong code entry counter after a lock request got past the
/// actuator check, counting one more entry if the credential check failed.
///
/// A counter that was never stored starts at zero. Any other read failure
/// leaves the stored count untouched.
fn record_wrong_entry<S: AttributeStore>(
    store: &mut S,
    endpoint: EndpointId,
    outcome: LockOutcome,
) {
    let counter = path(endpoint, Attributes::WrongCodeEntryCount);
    let wrong_entries = match store.get_as::<u32>(&counter) {
        Ok(count) => count,
        Err(Status::UnsupportedAttribute) => 0,
        Err(status) => {
            error!("Door Lock: WrongCodeEntryCount unreadable on endpoint {endpoint} ({status:?}), not updating it");
            return;
        }
    };
    let wrong_entries = if outcome.is_wrong_entry() {
        wrong_entries.saturating_add(1)
    } else {
        wrong_entries
    };
    let _ = write_attribute(store, endpoint, Attributes::WrongCodeEntryCount, wrong_entries);
}

pub struct DoorLockCluster<D> {
    config: DoorLockConfig,
    delegate: D,
}

impl<D: DoorLockDelegate> DoorLockCluster<D> {
    pub const fn new(config: DoorLockConfig, delegate: D) -> Self {
        Self { config, delegate }
    }

    pub fn delegate(&self) -> &D {
        &self.delegate
    }

    /// Put a freshly activated endpoint in its initial state: locked, with
    /// the actuator enabled. A rejected write is logged and ignored.
    pub fn init_server<S: AttributeStore>(&self, store: &mut S, endpoint: EndpointId) {
        info!("Door Lock: initializing server on endpoint {endpoint}");
        let _ = set_lock_state(store, endpoint, LockState::Locked);
        let _ = set_actuator_enabled(store, endpoint, true);
    }

    pub fn lock_door<S: AttributeStore>(
        &mut self,
        store: &mut S,
        endpoint: EndpointId,
        pin: Option<&[u8]>,
    ) -> LockOutcome {
        info!("Door Lock: LockDoor on endpoint {endpoint}");
        let outcome = self.set_lock_state_remotely(store, endpoint, pin, LockState::Locked);
        if outcome != LockOutcome::ActuatorDisabled {
            record_wrong_entry(store, endpoint, outcome);
        }
        self.commit_lock_state(store, endpoint, outcome, LockState::Locked)
    }

    pub fn unlock_door<S: AttributeStore>(
        &mut self,
        store: &mut S,
        endpoint: EndpointId,
        pin: Option<&[u8]>,
    ) -> LockOutcome {
        info!("Door Lock: UnlockDoor on endpoint {endpoint}");
        // Unlock never touches the wrong code entry counter.
        let outcome = self.set_lock_state_remotely(store, endpoint, pin, LockState::Unlocked);
        self.commit_lock_state(store, endpoint, outcome, LockState::Unlocked)
    }

    /// Check the request against the settings and drive the actuator. The
    /// lock state attribute is left untouched.
    fn set_lock_state_remotely<S: AttributeStore>(
        &mut self,
        store: &mut S,
        endpoint: EndpointId,
        pin: Option<&[u8]>,
        target: LockState,
    ) -> LockOutcome {
        // Unreadable settings fail closed.
        let require_pin = store
            .get_as::<bool>(&path(endpoint, Attributes::RequirePINforRemoteOperation))
            .unwrap_or_else(|status| {
                warn!("Door Lock: RequirePINforRemoteOperation unreadable ({status:?}), requiring a PIN");
                true
            });
        let actuator_enabled = store
            .get_as::<bool>(&path(endpoint, Attributes::ActuatorEnabled))
            .unwrap_or_else(|status| {
                warn!("Door Lock: ActuatorEnabled unreadable ({status:?})");
                false
            });
        if !actuator_enabled {
            info!("Door Lock: actuator disabled on endpoint {endpoint}");
            return LockOutcome::ActuatorDisabled;
        }

        let outcome = match pin {
            Some(pin) if pin == self.config.pin() => self.actuate(endpoint, Some(pin), target),
            Some(_) => LockOutcome::InvalidCredential,
            None if require_pin => LockOutcome::CredentialRequired,
            None => self.actuate(endpoint, None, target),
        };
        if outcome.is_wrong_entry() {
            warn!("Door Lock: {outcome:?} on endpoint {endpoint}");
        }
        outcome
    }

    /// Store the new lock state once the actuator moved.
    fn commit_lock_state<S: AttributeStore>(
        &self,
        store: &mut S,
        endpoint: EndpointId,
        outcome: LockOutcome,
        target: LockState,
    ) -> LockOutcome {
        if !outcome.is_success() {
            return outcome;
        }
        match set_lock_state(store, endpoint, target) {
            Ok(()) => LockOutcome::Success,
            Err(_) => {
                error!("Door Lock: actuator moved to {target:?} on endpoint {endpoint} but the state was not stored, lock state unknown");
                LockOutcome::StateCommitFailed
            }
        }
    }

    fn actuate(
        &mut self,
        endpoint: EndpointId,
        pin: Option<&[u8]>,
        target: LockState,
    ) -> LockOutcome {
        let moved = match target {
            LockState::Unlocked => self.delegate.on_unlock_command(endpoint, pin),
            LockState::Locked | LockState::NotFullyLocked => {
                self.delegate.on_lock_command(endpoint, pin)
            }
        };
        if moved {
            LockOutcome::Success
        } else {
            info!("Door Lock: actuator refused {target:?} on endpoint {endpoint}");
            LockOutcome::ActuatorFailed
        }
    }

    fn validate_write(attribute: Attributes, value: &AttributeValue) -> Result<(), Status> {
        match attribute {
            Attributes::RequirePINforRemoteOperation
            | Attributes::EnableOneTouchLocking
            | Attributes::EnablePrivacyModeButton => {
                bool::try_from(value.clone())?;
            }
            Attributes::AutoRelockTime => {
                u32::try_from(value.clone())?;
            }
            Attributes::Language => {
                if String::try_from(value.clone())?.len() > MAX_LANGUAGE_LENGTH {
                    return Err(Status::ConstraintError);
                }
            }
            Attributes::SoundVolume => {
                if u8::try_from(value.clone())? > MAX_SOUND_VOLUME {
                    return Err(Status::ConstraintError);
                }
            }
            Attributes::OperatingMode => {
                OperatingMode::from_u8(u8::try_from(value.clone())?)
                    .ok_or(Status::ConstraintError)?;
            }
            Attributes::WrongCodeEntryLimit => {
                if u8::try_from(value.clone())? == 0 {
                    return Err(Status::ConstraintError);
                }
            }
            _ => return Err(Status::UnsupportedWrite),
        }
        Ok(())
    }
}

impl<D: DoorLockDelegate> Handler for DoorLockCluster<D> {
    fn handle_init<S: AttributeStore>(
        &mut self,
        store: &mut S,
        endpoint: EndpointId,
        cluster: ClusterId,
    ) {
        if cluster == CLUSTER_ID {
            self.init_server(store, endpoint);
        }
    }

    fn handle_write<S: AttributeStore>(
        &mut self,
        store: &mut S,
        attr: &AttributePathIB,
        value: AttributeValue,
    ) -> Result<(), Status> {
        let attribute =
            Attributes::from_u32(attr.attribute).ok_or(Status::UnsupportedAttribute)?;
        Self::validate_write(attribute, &value)?;
        store.set(attr, value)
    }

    fn handle_invoke<S: AttributeStore>(
        &mut self,
        store: &mut S,
        cmd: &CommandPathIB,
        fields: &CommandFields,
    ) -> Status {
        let Some(command) = Commands::from_u32(cmd.command) else {
            return Status::UnsupportedCommand;
        };
        match command {
            Commands::LockDoor | Commands::UnlockDoor => {
                // PINCode, context tag 0
                let pin = match fields.optional_octet_string(0) {
                    Ok(pin) => pin,
                    Err(status) => return status,
                };
                let outcome = if command == Commands::LockDoor {
                    self.lock_door(store, cmd.endpoint, pin)
                } else {
                    self.unlock_door(store, cmd.endpoint, pin)
                };
                outcome.into()
            }
            Commands::SetUser
            | Commands::GetUser
            | Commands::ClearUser
            | Commands::SetCredential
            | Commands::GetCredentialStatus
            | Commands::ClearCredential => {
                info!("Door Lock: {command:?} on endpoint {} not implemented", cmd.endpoint);
                Status::Success
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;
    use crate::{
        data_model::{
            device::{Device, Endpoint, Node},
            device_type::DEVICE_TYPE_DOOR_LOCK,
            endpoint::door_lock_endpoint,
            handler::EmptyHandler,
            store::MemoryAttributeStore,
        },
        interaction_model::StatusIB,
    };

    const ENDPOINT: EndpointId = 1;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[derive(Default)]
    struct RecordingDelegate {
        accept: bool,
        calls: Vec<(&'static str, EndpointId, Option<Vec<u8>>)>,
    }

    impl RecordingDelegate {
        fn accepting() -> Self {
            Self {
                accept: true,
                calls: vec![],
            }
        }
    }

    impl DoorLockDelegate for RecordingDelegate {
        fn on_lock_command(&mut self, endpoint: EndpointId, pin: Option<&[u8]>) -> bool {
            self.calls.push(("lock", endpoint, pin.map(<[u8]>::to_vec)));
            self.accept
        }

        fn on_unlock_command(&mut self, endpoint: EndpointId, pin: Option<&[u8]>) -> bool {
            self.calls.push(("unlock", endpoint, pin.map(<[u8]>::to_vec)));
            self.accept
        }
    }

    /// Refuses writes to one attribute, delegating everything else.
    struct FailingStore {
        inner: MemoryAttributeStore,
        rejected: AttributeId,
    }

    impl AttributeStore for FailingStore {
        fn get(&self, path: &AttributePathIB) -> Result<AttributeValue, Status> {
            self.inner.get(path)
        }

        fn set(&mut self, path: &AttributePathIB, value: AttributeValue) -> Result<(), Status> {
            if path.attribute == self.rejected {
                return Err(Status::Failure);
            }
            self.inner.set(path, value)
        }
    }

    fn cluster(delegate: RecordingDelegate) -> DoorLockCluster<RecordingDelegate> {
        DoorLockCluster::new(DoorLockConfig::default(), delegate)
    }

    /// A store as left by endpoint activation, with the given PIN policy.
    fn activated_store(
        cluster: &DoorLockCluster<RecordingDelegate>,
        require_pin: bool,
    ) -> MemoryAttributeStore {
        let mut store = MemoryAttributeStore::new();
        cluster.init_server(&mut store, ENDPOINT);
        store
            .set_as(
                &path(ENDPOINT, Attributes::RequirePINforRemoteOperation),
                require_pin,
            )
            .unwrap();
        store
    }

    fn lock_state(store: &impl AttributeStore) -> u8 {
        store.get_as(&path(ENDPOINT, Attributes::LockState)).unwrap()
    }

    fn wrong_entries(store: &impl AttributeStore) -> u32 {
        store
            .get_as(&path(ENDPOINT, Attributes::WrongCodeEntryCount))
            .unwrap()
    }

    #[test]
    fn test_init_server() {
        init();
        let lock = cluster(RecordingDelegate::default());
        let mut store = MemoryAttributeStore::new();
        lock.init_server(&mut store, ENDPOINT);
        assert_eq!(lock_state(&store), LockState::Locked as u8);
        assert_eq!(
            store.get_as::<bool>(&path(ENDPOINT, Attributes::ActuatorEnabled)),
            Ok(true)
        );
    }

    #[test]
    fn test_init_server_tolerates_store_rejection() {
        init();
        let lock = cluster(RecordingDelegate::default());
        let mut store = FailingStore {
            inner: MemoryAttributeStore::new(),
            rejected: Attributes::LockState as _,
        };
        lock.init_server(&mut store, ENDPOINT);
        assert_eq!(
            store.get(&path(ENDPOINT, Attributes::LockState)),
            Err(Status::UnsupportedAttribute)
        );
        assert_eq!(
            store.get_as::<bool>(&path(ENDPOINT, Attributes::ActuatorEnabled)),
            Ok(true)
        );
    }

    fn counter_unset(store: &impl AttributeStore) -> bool {
        store.get(&path(ENDPOINT, Attributes::WrongCodeEntryCount))
            == Err(Status::UnsupportedAttribute)
    }

    #[test]
    fn test_unlock_with_correct_pin() {
        init();
        let mut lock = cluster(RecordingDelegate::accepting());
        let mut store = activated_store(&lock, true);

        let outcome = lock.unlock_door(&mut store, ENDPOINT, Some(&hex!("01020304")[..]));
        assert_eq!(outcome, LockOutcome::Success);
        assert_eq!(lock_state(&store), LockState::Unlocked as u8);
        assert!(counter_unset(&store));
        assert_eq!(
            lock.delegate().calls,
            vec![("unlock", ENDPOINT, Some(vec![1, 2, 3, 4]))]
        );
    }

    #[test]
    fn test_lock_with_correct_pin() {
        init();
        let mut lock = cluster(RecordingDelegate::accepting());
        let mut store = activated_store(&lock, true);
        set_lock_state(&mut store, ENDPOINT, LockState::Unlocked).unwrap();

        let outcome = lock.lock_door(&mut store, ENDPOINT, Some(&DEFAULT_PIN_CODE[..]));
        assert_eq!(outcome, LockOutcome::Success);
        assert_eq!(lock_state(&store), LockState::Locked as u8);
        // persisted even though nothing went wrong
        assert_eq!(wrong_entries(&store), 0);
        assert_eq!(
            lock.delegate().calls,
            vec![("lock", ENDPOINT, Some(DEFAULT_PIN_CODE.to_vec()))]
        );
    }

    #[test]
    fn test_lock_wrong_pin_counts_and_skips_actuator() {
        init();
        let mut lock = cluster(RecordingDelegate::accepting());
        let mut store = activated_store(&lock, false);
        set_lock_state(&mut store, ENDPOINT, LockState::Unlocked).unwrap();

        for expected in 1..=3 {
            let outcome = lock.lock_door(&mut store, ENDPOINT, Some(&hex!("09090909")[..]));
            assert_eq!(outcome, LockOutcome::InvalidCredential);
            assert_eq!(Status::from(outcome), Status::Failure);
            assert_eq!(wrong_entries(&store), expected);
        }
        assert_eq!(lock_state(&store), LockState::Unlocked as u8);
        assert!(lock.delegate().calls.is_empty());

        // a later success leaves the counter alone
        assert_eq!(
            lock.lock_door(&mut store, ENDPOINT, Some(&DEFAULT_PIN_CODE[..])),
            LockOutcome::Success
        );
        assert_eq!(wrong_entries(&store), 3);
    }

    #[test]
    fn test_lock_missing_pin_when_required() {
        init();
        let mut lock = cluster(RecordingDelegate::accepting());
        let mut store = activated_store(&lock, true);
        set_lock_state(&mut store, ENDPOINT, LockState::Unlocked).unwrap();

        assert_eq!(
            lock.lock_door(&mut store, ENDPOINT, None),
            LockOutcome::CredentialRequired
        );
        assert_eq!(wrong_entries(&store), 1);
        assert_eq!(lock_state(&store), LockState::Unlocked as u8);
        assert!(lock.delegate().calls.is_empty());
    }

    #[test]
    fn test_lock_missing_pin_when_not_required_mirrors_actuator() {
        init();
        let mut lock = cluster(RecordingDelegate::accepting());
        let mut store = activated_store(&lock, false);
        set_lock_state(&mut store, ENDPOINT, LockState::Unlocked).unwrap();
        assert_eq!(lock.lock_door(&mut store, ENDPOINT, None), LockOutcome::Success);
        assert_eq!(lock_state(&store), LockState::Locked as u8);

        let mut lock = cluster(RecordingDelegate::default());
        let mut store = activated_store(&lock, false);
        set_lock_state(&mut store, ENDPOINT, LockState::Unlocked).unwrap();
        assert_eq!(
            lock.lock_door(&mut store, ENDPOINT, None),
            LockOutcome::ActuatorFailed
        );
        assert_eq!(lock_state(&store), LockState::Unlocked as u8);
        assert_eq!(wrong_entries(&store), 0);
        assert_eq!(lock.delegate().calls, vec![("lock", ENDPOINT, None)]);
    }

    #[test]
    fn test_unlock_failures_leave_counter_alone() {
        init();
        let mut lock = cluster(RecordingDelegate::accepting());
        let mut store = activated_store(&lock, true);

        assert_eq!(
            lock.unlock_door(&mut store, ENDPOINT, Some(&hex!("09090909")[..])),
            LockOutcome::InvalidCredential
        );
        assert_eq!(
            lock.unlock_door(&mut store, ENDPOINT, None),
            LockOutcome::CredentialRequired
        );
        assert!(counter_unset(&store));

        // nor does it reset a count left by failed lock attempts
        lock.lock_door(&mut store, ENDPOINT, None);
        lock.unlock_door(&mut store, ENDPOINT, Some(&hex!("09090909")[..]));
        assert_eq!(wrong_entries(&store), 1);
        assert_eq!(lock_state(&store), LockState::Locked as u8);
        assert!(lock.delegate().calls.is_empty());
    }

    #[test]
    fn test_unlock_missing_pin_when_not_required_mirrors_actuator() {
        init();
        let mut lock = cluster(RecordingDelegate::accepting());
        let mut store = activated_store(&lock, false);
        assert_eq!(lock.unlock_door(&mut store, ENDPOINT, None), LockOutcome::Success);
        assert_eq!(lock_state(&store), LockState::Unlocked as u8);

        let mut lock = cluster(RecordingDelegate::default());
        let mut store = activated_store(&lock, false);
        assert_eq!(
            lock.unlock_door(&mut store, ENDPOINT, None),
            LockOutcome::ActuatorFailed
        );
        assert_eq!(lock_state(&store), LockState::Locked as u8);
        assert!(counter_unset(&store));
        assert_eq!(lock.delegate().calls, vec![("unlock", ENDPOINT, None)]);
    }

    /// Fails every read of the wrong code entry counter.
    struct BusyCounterStore {
        inner: MemoryAttributeStore,
    }

    impl AttributeStore for BusyCounterStore {
        fn get(&self, path: &AttributePathIB) -> Result<AttributeValue, Status> {
            if path.attribute == WRONG_CODE_ENTRY_COUNT_ID {
                return Err(Status::Busy);
            }
            self.inner.get(path)
        }

        fn set(&mut self, path: &AttributePathIB, value: AttributeValue) -> Result<(), Status> {
            self.inner.set(path, value)
        }
    }

    #[test]
    fn test_unreadable_counter_is_not_reset() {
        init();
        let mut lock = cluster(RecordingDelegate::accepting());
        let mut inner = activated_store(&lock, true);
        inner
            .set_as(&path(ENDPOINT, Attributes::WrongCodeEntryCount), 41u32)
            .unwrap();
        let mut store = BusyCounterStore { inner };

        assert_eq!(
            lock.lock_door(&mut store, ENDPOINT, Some(&hex!("09090909")[..])),
            LockOutcome::InvalidCredential
        );
        assert_eq!(
            lock.lock_door(&mut store, ENDPOINT, Some(&DEFAULT_PIN_CODE[..])),
            LockOutcome::Success
        );
        assert_eq!(wrong_entries(&store.inner), 41);
    }

    #[test]
    fn test_actuator_disabled() {
        init();
        let mut lock = cluster(RecordingDelegate::accepting());
        let mut store = activated_store(&lock, true);
        set_actuator_enabled(&mut store, ENDPOINT, false).unwrap();

        for pin in [Some(&DEFAULT_PIN_CODE[..]), Some(&hex!("00000000")[..]), None] {
            assert_eq!(
                lock.lock_door(&mut store, ENDPOINT, pin),
                LockOutcome::ActuatorDisabled
            );
        }
        assert_eq!(
            store.get(&path(ENDPOINT, Attributes::WrongCodeEntryCount)),
            Err(Status::UnsupportedAttribute)
        );
        assert!(lock.delegate().calls.is_empty());
    }

    #[test]
    fn test_unreadable_policy_requires_pin() {
        init();
        let mut lock = cluster(RecordingDelegate::accepting());
        let mut store = MemoryAttributeStore::new();
        lock.init_server(&mut store, ENDPOINT);
        assert_eq!(
            lock.unlock_door(&mut store, ENDPOINT, None),
            LockOutcome::CredentialRequired
        );
    }

    #[test]
    fn test_state_commit_failure() {
        init();
        let mut lock = cluster(RecordingDelegate::accepting());
        let mut store = FailingStore {
            inner: activated_store(&lock, true),
            rejected: Attributes::LockState as _,
        };
        let outcome = lock.unlock_door(&mut store, ENDPOINT, Some(&DEFAULT_PIN_CODE[..]));
        assert_eq!(outcome, LockOutcome::StateCommitFailed);
        assert_eq!(Status::from(outcome), Status::Failure);
        assert_eq!(lock.delegate().calls.len(), 1);
        assert_eq!(lock_state(&store), LockState::Locked as u8);
    }

    #[test]
    fn test_counter_saturates() {
        init();
        let mut lock = cluster(RecordingDelegate::accepting());
        let mut store = activated_store(&lock, true);
        store
            .set_as(&path(ENDPOINT, Attributes::WrongCodeEntryCount), u32::MAX)
            .unwrap();
        lock.lock_door(&mut store, ENDPOINT, None);
        assert_eq!(wrong_entries(&store), u32::MAX);
    }

    #[test]
    fn test_config() {
        assert_eq!(DoorLockConfig::default().pin(), &DEFAULT_PIN_CODE);
        assert_eq!(
            DoorLockConfig::new(b"987654").map(|c| c.pin().len()),
            Ok(6)
        );
        assert_eq!(DoorLockConfig::new(b"12"), Err(Error::InvalidArgument));
        assert_eq!(
            DoorLockConfig::new(b"0123456789"),
            Err(Error::BufferTooSmall)
        );
    }

    #[test]
    fn test_setters() {
        init();
        let mut store = MemoryAttributeStore::new();
        set_door_state(&mut store, ENDPOINT, DoorState::Ajar).unwrap();
        assert_eq!(
            store.get(&path(ENDPOINT, Attributes::DoorState)),
            Ok(AttributeValue::U8(5))
        );
        set_auto_relock_time(&mut store, ENDPOINT, 300).unwrap();
        assert_eq!(
            store.get(&path(ENDPOINT, Attributes::AutoRelockTime)),
            Ok(AttributeValue::U32(300))
        );
        set_language(&mut store, ENDPOINT, "en").unwrap();
        assert_eq!(
            set_language(&mut store, ENDPOINT, "english"),
            Err(Status::ConstraintError)
        );
        assert_eq!(
            set_sound_volume(&mut store, ENDPOINT, 4),
            Err(Status::ConstraintError)
        );
        set_one_touch_locking(&mut store, ENDPOINT, true).unwrap();
        set_privacy_mode_button(&mut store, ENDPOINT, false).unwrap();
        assert_eq!(
            store.get(&path(ENDPOINT, Attributes::Language)),
            Ok(AttributeValue::Utf8("en".to_string()))
        );

        let mut store = FailingStore {
            inner: MemoryAttributeStore::new(),
            rejected: Attributes::SoundVolume as _,
        };
        assert_eq!(set_sound_volume(&mut store, ENDPOINT, 2), Err(Status::Failure));
    }

    const NODE: Node<'static> = Node {
        id: 0x0102_0304,
        endpoints: &[Endpoint {
            id: ENDPOINT,
            device_type: DEVICE_TYPE_DOOR_LOCK,
            clusters: &door_lock_endpoint::CLUSTERS,
        }],
    };

    #[test]
    fn test_commands_through_device() {
        init();
        let mut delegate = RecordingDelegate::accepting();
        let handler =
            door_lock_endpoint::handler(ENDPOINT, DoorLockConfig::default(), &mut delegate);
        let mut device = Device::new(&NODE, handler, MemoryAttributeStore::new());
        device.init();
        let written = device.write(
            &path(ENDPOINT, Attributes::RequirePINforRemoteOperation),
            AttributeValue::Boolean(true),
        );
        assert_eq!(written.status, StatusIB::new(Status::Success));

        let unlock = CommandPathIB::new(ENDPOINT, CLUSTER_ID, Commands::UnlockDoor as _);
        let response = device.invoke(&unlock, &CommandFields::new());
        assert_eq!(response.status, StatusIB::new(Status::Failure));

        let fields = CommandFields::new().with(0, DEFAULT_PIN_CODE.to_vec());
        let response = device.invoke(&unlock, &fields);
        assert_eq!(response.path, unlock);
        assert_eq!(response.status, StatusIB::new(Status::Success));
        assert_eq!(
            device.read(&path(ENDPOINT, Attributes::LockState)).data,
            Ok(AttributeValue::U8(LockState::Unlocked as u8))
        );

        // a PIN of the wrong type is rejected before any check
        let fields = CommandFields::new().with(0, "1234");
        assert_eq!(
            device.invoke(&unlock, &fields).status,
            StatusIB::new(Status::InvalidCommand)
        );

        let set_user = CommandPathIB::new(ENDPOINT, CLUSTER_ID, Commands::SetUser as _);
        assert_eq!(
            device.invoke(&set_user, &CommandFields::new()).status,
            StatusIB::new(Status::Success)
        );
        let unknown = CommandPathIB::new(ENDPOINT, CLUSTER_ID, 0x0B);
        assert_eq!(
            device.invoke(&unknown, &CommandFields::new()).status,
            StatusIB::new(Status::UnsupportedCommand)
        );
        drop(device);
        assert_eq!(delegate.calls.len(), 1);
    }

    #[test]
    fn test_write_validation() {
        init();
        let handler = door_lock_endpoint::handler(
            ENDPOINT,
            DoorLockConfig::default(),
            DefaultDoorLockDelegate,
        );
        let mut device = Device::new(&NODE, handler, MemoryAttributeStore::new());
        device.init();

        let mut write = |attribute: Attributes, value: AttributeValue| {
            device.write(&path(ENDPOINT, attribute), value).status.status
        };
        assert_eq!(
            write(Attributes::SoundVolume, AttributeValue::U8(2)),
            Status::Success
        );
        assert_eq!(
            write(Attributes::SoundVolume, AttributeValue::U8(9)),
            Status::ConstraintError
        );
        assert_eq!(
            write(Attributes::Language, "fr".into()),
            Status::Success
        );
        assert_eq!(
            write(Attributes::Language, "fran".into()),
            Status::ConstraintError
        );
        assert_eq!(
            write(Attributes::WrongCodeEntryLimit, AttributeValue::U8(0)),
            Status::ConstraintError
        );
        assert_eq!(
            write(Attributes::OperatingMode, AttributeValue::U8(7)),
            Status::ConstraintError
        );
        assert_eq!(
            write(Attributes::AutoRelockTime, AttributeValue::U8(60)),
            Status::InvalidDataType
        );
        assert_eq!(
            write(Attributes::LockState, AttributeValue::U8(2)),
            Status::UnsupportedWrite
        );
        assert_eq!(
            write(Attributes::WrongCodeEntryCount, AttributeValue::U32(0)),
            Status::UnsupportedWrite
        );
        assert_eq!(
            device.read(&path(ENDPOINT, Attributes::SoundVolume)).data,
            Ok(AttributeValue::U8(2))
        );
    }

    const LOCKS: Node<'static> = Node {
        id: 0x0102_0305,
        endpoints: &[
            Endpoint {
                id: 1,
                device_type: DEVICE_TYPE_DOOR_LOCK,
                clusters: &door_lock_endpoint::CLUSTERS,
            },
            Endpoint {
                id: 2,
                device_type: DEVICE_TYPE_DOOR_LOCK,
                clusters: &door_lock_endpoint::CLUSTERS,
            },
            Endpoint {
                id: 5,
                device_type: DEVICE_TYPE_DOOR_LOCK,
                clusters: &door_lock_endpoint::CLUSTERS,
            },
        ],
    };

    #[test]
    fn test_every_endpoint_starts_locked() {
        init();
        let handler = EmptyHandler.chain_all(
            CLUSTER_ID,
            DoorLockCluster::new(DoorLockConfig::default(), DefaultDoorLockDelegate),
        );
        let mut device = Device::new(&LOCKS, handler, MemoryAttributeStore::new());
        device.init();

        for endpoint in LOCKS.endpoints {
            assert_eq!(
                device.read(&path(endpoint.id, Attributes::LockState)).data,
                Ok(AttributeValue::U8(LockState::Locked as u8))
            );
            assert_eq!(
                device.read(&path(endpoint.id, Attributes::ActuatorEnabled)).data,
                Ok(AttributeValue::Boolean(true))
            );
        }

        // a failed lock on one endpoint only counts there
        let lock = CommandPathIB::new(2, CLUSTER_ID, Commands::LockDoor as _);
        let fields = CommandFields::new().with(0, hex!("09090909").to_vec());
        assert_eq!(
            device.invoke(&lock, &fields).status,
            StatusIB::new(Status::Failure)
        );
        assert_eq!(
            device.read(&path(2, Attributes::WrongCodeEntryCount)).data,
            Ok(AttributeValue::U32(1))
        );
        assert_eq!(
            device.read(&path(1, Attributes::WrongCodeEntryCount)).data,
            Err(StatusIB::new(Status::UnsupportedAttribute))
        );
    }
}
