//! General Diagnostics cluster (11.11)
//!
//! Every attribute of this cluster is computed: reads are served from a
//! [`DiagnosticDataProvider`] supplied by the platform, through the
//! capability-gated readers in [`crate::data_model::access`]. Fault
//! transitions reported by the platform are broadcast by
//! [`GeneralDiagnosticsDelegate`].

use log::{error, info};
use num::FromPrimitive;

use crate::{
    cluster::{Cluster, ClusterClassification},
    constants::{MAX_HARDWARE_FAULTS, MAX_NETWORK_FAULTS, MAX_RADIO_FAULTS},
    data_model::{
        access::{read_if_supported, read_list_if_supported},
        device::{Loop, Node},
        event::{ClusterEvent, EventSink},
        handler::Handler,
        reporting::AttributeReporter,
        store::AttributeStore,
        Access, Attribute, AttributeValue, ClusterId, EventId, EventPriority, Quality,
    },
    interaction_model::{AttributePathIB, Status},
    Error,
};

pub const CLUSTER_ID: ClusterId = 0x0033;

pub const CLUSTER: Cluster<'static> = Cluster {
    id: CLUSTER_ID,
    classification: ClusterClassification::Utility,
    revision: 1,
    features: 0,
    attributes: &[
        Attribute::new(Attributes::NetworkInterfaces as _, Quality::LIST, Access::READ),
        Attribute::new(Attributes::RebootCount as _, Quality::NON_VOLATILE, Access::READ),
        Attribute::new(Attributes::UpTime as _, Quality::empty(), Access::READ),
        Attribute::new(
            Attributes::TotalOperationalHours as _,
            Quality::NON_VOLATILE,
            Access::READ,
        ),
        Attribute::new(Attributes::BootReasons as _, Quality::empty(), Access::READ),
        Attribute::new(Attributes::ActiveHardwareFaults as _, Quality::LIST, Access::READ),
        Attribute::new(Attributes::ActiveRadioFaults as _, Quality::LIST, Access::READ),
        Attribute::new(Attributes::ActiveNetworkFaults as _, Quality::LIST, Access::READ),
    ],
    commands: &[],
    generated_commands: &[],
    events: &[
        Events::HardwareFaultChange as _,
        Events::RadioFaultChange as _,
        Events::NetworkFaultChange as _,
        Events::BootReason as _,
    ],
};

#[repr(u32)]
#[derive(FromPrimitive, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attributes {
    NetworkInterfaces = 0x0000,
    RebootCount = 0x0001,
    UpTime = 0x0002,
    TotalOperationalHours = 0x0003,
    BootReasons = 0x0004,
    ActiveHardwareFaults = 0x0005,
    ActiveRadioFaults = 0x0006,
    ActiveNetworkFaults = 0x0007,
}

#[repr(u32)]
#[derive(FromPrimitive, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Events {
    HardwareFaultChange = 0x00,
    RadioFaultChange = 0x01,
    NetworkFaultChange = 0x02,
    BootReason = 0x03,
}

#[repr(u8)]
#[derive(FromPrimitive, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BootReason {
    #[default]
    Unspecified = 0,
    PowerOnReboot = 1,
    BrownOutReset = 2,
    SoftwareWatchdogReset = 3,
    HardwareWatchdogReset = 4,
    SoftwareUpdateCompleted = 5,
    SoftwareReset = 6,
}

#[repr(u8)]
#[derive(FromPrimitive, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareFault {
    Unspecified = 0,
    Radio = 1,
    Sensor = 2,
    ResettableOverTemp = 3,
    NonResettableOverTemp = 4,
    PowerSource = 5,
    VisualDisplayFault = 6,
    AudioOutputFault = 7,
    UserInterfaceFault = 8,
    NonVolatileMemoryError = 9,
    TamperDetected = 10,
}

#[repr(u8)]
#[derive(FromPrimitive, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioFault {
    Unspecified = 0,
    WiFiFault = 1,
    CellularFault = 2,
    ThreadFault = 3,
    NFCFault = 4,
    BLEFault = 5,
    EthernetFault = 6,
}

#[repr(u8)]
#[derive(FromPrimitive, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkFault {
    Unspecified = 0,
    HardwareFailure = 1,
    NetworkJammed = 2,
    ConnectionFailed = 3,
}

#[repr(u8)]
#[derive(FromPrimitive, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterfaceType {
    #[default]
    Unspecified = 0,
    WiFi = 1,
    Ethernet = 2,
    Cellular = 3,
    Thread = 4,
}

/// Encodes an enum8 the way it is reported on the wire.
pub trait Enum8: Copy {
    fn code(self) -> u8;
}

macro_rules! enum8 {
    ($($ty:ty),+) => {
        $(
            impl Enum8 for $ty {
                fn code(self) -> u8 {
                    self as u8
                }
            }
        )+
    };
}

enum8!(BootReason, HardwareFault, RadioFault, NetworkFault, InterfaceType);

/// The faults active in one category, at most `N` of them, in the order the
/// platform raised them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultSet<T, const N: usize> {
    faults: heapless::Vec<T, N>,
}

pub type HardwareFaults = FaultSet<HardwareFault, MAX_HARDWARE_FAULTS>;
pub type RadioFaults = FaultSet<RadioFault, MAX_RADIO_FAULTS>;
pub type NetworkFaults = FaultSet<NetworkFault, MAX_NETWORK_FAULTS>;

impl<T: Copy + PartialEq, const N: usize> FaultSet<T, N> {
    pub const fn new() -> Self {
        Self {
            faults: heapless::Vec::new(),
        }
    }

    pub fn from_slice(faults: &[T]) -> Result<Self, Error> {
        let mut set = Self::new();
        for fault in faults {
            set.add(*fault)?;
        }
        Ok(set)
    }

    /// Add a fault. A fault already present is not added twice.
    pub fn add(&mut self, fault: T) -> Result<(), Error> {
        if self.contains(fault) {
            return Ok(());
        }
        self.faults.push(fault).map_err(|_| Error::BufferTooSmall)
    }

    pub fn contains(&self, fault: T) -> bool {
        self.faults.contains(&fault)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.faults
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn len(&self) -> usize {
        self.faults.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faults.is_empty()
    }
}

impl<T: Copy + PartialEq, const N: usize> Default for FaultSet<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> IntoIterator for FaultSet<T, N> {
    type Item = T;
    type IntoIter = <heapless::Vec<T, N> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.faults.into_iter()
    }
}

/// NetworkInterface struct (11.11.6.6)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkInterface {
    pub name: String,
    pub is_operational: bool,
    pub off_premise_services_reachable_ipv4: Option<bool>,
    pub off_premise_services_reachable_ipv6: Option<bool>,
    pub hardware_address: Vec<u8>,
    pub ipv4_addresses: Vec<[u8; 4]>,
    pub ipv6_addresses: Vec<[u8; 16]>,
    pub interface_type: InterfaceType,
}

impl From<NetworkInterface> for AttributeValue {
    fn from(netif: NetworkInterface) -> Self {
        let nullable =
            |value: Option<bool>| value.map_or(AttributeValue::Null, AttributeValue::Boolean);
        AttributeValue::Struct(vec![
            (0, AttributeValue::Utf8(netif.name)),
            (1, AttributeValue::Boolean(netif.is_operational)),
            (2, nullable(netif.off_premise_services_reachable_ipv4)),
            (3, nullable(netif.off_premise_services_reachable_ipv6)),
            (4, AttributeValue::OctetString(netif.hardware_address)),
            (
                5,
                AttributeValue::List(
                    netif
                        .ipv4_addresses
                        .iter()
                        .map(|a| AttributeValue::OctetString(a.to_vec()))
                        .collect(),
                ),
            ),
            (
                6,
                AttributeValue::List(
                    netif
                        .ipv6_addresses
                        .iter()
                        .map(|a| AttributeValue::OctetString(a.to_vec()))
                        .collect(),
                ),
            ),
            (7, AttributeValue::U8(netif.interface_type.code())),
        ])
    }
}

/// Platform source of diagnostic data. Every getter defaults to
/// [`Error::UnsupportedFeature`], a platform overrides what it can supply.
pub trait DiagnosticDataProvider {
    fn reboot_count(&self) -> Result<u16, Error> {
        Err(Error::UnsupportedFeature)
    }

    /// Seconds since the last reboot
    fn up_time(&self) -> Result<u64, Error> {
        Err(Error::UnsupportedFeature)
    }

    fn total_operational_hours(&self) -> Result<u32, Error> {
        Err(Error::UnsupportedFeature)
    }

    fn boot_reason(&self) -> Result<BootReason, Error> {
        Err(Error::UnsupportedFeature)
    }

    fn active_hardware_faults(&self) -> Result<HardwareFaults, Error> {
        Err(Error::UnsupportedFeature)
    }

    fn active_radio_faults(&self) -> Result<RadioFaults, Error> {
        Err(Error::UnsupportedFeature)
    }

    fn active_network_faults(&self) -> Result<NetworkFaults, Error> {
        Err(Error::UnsupportedFeature)
    }

    fn network_interfaces(&self) -> Result<Vec<NetworkInterface>, Error> {
        Err(Error::UnsupportedFeature)
    }
}

impl<P: DiagnosticDataProvider> DiagnosticDataProvider for &P {
    fn reboot_count(&self) -> Result<u16, Error> {
        (**self).reboot_count()
    }

    fn up_time(&self) -> Result<u64, Error> {
        (**self).up_time()
    }

    fn total_operational_hours(&self) -> Result<u32, Error> {
        (**self).total_operational_hours()
    }

    fn boot_reason(&self) -> Result<BootReason, Error> {
        (**self).boot_reason()
    }

    fn active_hardware_faults(&self) -> Result<HardwareFaults, Error> {
        (**self).active_hardware_faults()
    }

    fn active_radio_faults(&self) -> Result<RadioFaults, Error> {
        (**self).active_radio_faults()
    }

    fn active_network_faults(&self) -> Result<NetworkFaults, Error> {
        (**self).active_network_faults()
    }

    fn network_interfaces(&self) -> Result<Vec<NetworkInterface>, Error> {
        (**self).network_interfaces()
    }
}

/// A platform that supplies no diagnostics at all.
pub struct NoDiagnostics;

impl DiagnosticDataProvider for NoDiagnostics {}

pub struct GeneralDiagnosticsCluster<P> {
    provider: P,
}

impl<P: DiagnosticDataProvider> GeneralDiagnosticsCluster<P> {
    pub const fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Read a computed attribute from the provider. Absent capabilities read
    /// as zero or as an empty list.
    pub fn read(&self, attribute: Attributes) -> Result<AttributeValue, Error> {
        let p = &self.provider;
        let value = match attribute {
            Attributes::NetworkInterfaces => AttributeValue::List(
                read_list_if_supported(p, P::network_interfaces)?
                    .into_iter()
                    .map(AttributeValue::from)
                    .collect(),
            ),
            Attributes::RebootCount => read_if_supported(p, P::reboot_count)?.into(),
            Attributes::UpTime => read_if_supported(p, P::up_time)?.into(),
            Attributes::TotalOperationalHours => {
                read_if_supported(p, P::total_operational_hours)?.into()
            }
            Attributes::BootReasons => read_if_supported(p, P::boot_reason)?.code().into(),
            Attributes::ActiveHardwareFaults => {
                enum_list(read_list_if_supported(p, P::active_hardware_faults)?)
            }
            Attributes::ActiveRadioFaults => {
                enum_list(read_list_if_supported(p, P::active_radio_faults)?)
            }
            Attributes::ActiveNetworkFaults => {
                enum_list(read_list_if_supported(p, P::active_network_faults)?)
            }
        };
        Ok(value)
    }
}

fn enum_list<T: Enum8>(items: Vec<T>) -> AttributeValue {
    AttributeValue::List(items.into_iter().map(|i| AttributeValue::U8(i.code())).collect())
}

impl<P: DiagnosticDataProvider> Handler for GeneralDiagnosticsCluster<P> {
    fn handle_read<S: AttributeStore>(
        &self,
        store: &S,
        attr: &AttributePathIB,
    ) -> Result<AttributeValue, Status> {
        if attr.cluster != CLUSTER_ID {
            // We shouldn't have been called at all.
            return Err(Status::UnsupportedCluster);
        }
        match Attributes::from_u32(attr.attribute) {
            Some(attribute) => self.read(attribute).map_err(Status::from),
            None => store.get(attr),
        }
    }
}

/// Payload of the fault change events: the faults active after the
/// transition, and those active before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultChange<T> {
    pub current: Vec<T>,
    pub previous: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneralDiagnosticsEvent {
    HardwareFaultChange(FaultChange<HardwareFault>),
    RadioFaultChange(FaultChange<RadioFault>),
    NetworkFaultChange(FaultChange<NetworkFault>),
    BootReason(BootReason),
}

impl ClusterEvent for GeneralDiagnosticsEvent {
    const CLUSTER_ID: ClusterId = CLUSTER_ID;

    fn event_id(&self) -> EventId {
        let event = match self {
            GeneralDiagnosticsEvent::HardwareFaultChange(_) => Events::HardwareFaultChange,
            GeneralDiagnosticsEvent::RadioFaultChange(_) => Events::RadioFaultChange,
            GeneralDiagnosticsEvent::NetworkFaultChange(_) => Events::NetworkFaultChange,
            GeneralDiagnosticsEvent::BootReason(_) => Events::BootReason,
        };
        event as _
    }

    fn priority(&self) -> EventPriority {
        EventPriority::Critical
    }
}

/// Receives notifications from the platform and fans them out to every
/// endpoint hosting the General Diagnostics server.
///
/// Holds no fault history: the platform hands over both snapshots of a
/// transition. Each endpoint is handled independently, a failure to record
/// an event on one endpoint does not stop the broadcast.
pub struct GeneralDiagnosticsDelegate<'a, R, E> {
    node: &'a Node<'a>,
    reporter: R,
    events: E,
}

impl<'a, R, E> GeneralDiagnosticsDelegate<'a, R, E>
where
    R: AttributeReporter,
    E: EventSink<GeneralDiagnosticsEvent>,
{
    pub const fn new(node: &'a Node<'a>, reporter: R, events: E) -> Self {
        Self {
            node,
            reporter,
            events,
        }
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn events(&self) -> &E {
        &self.events
    }

    /// Gets called when any network interface on the node is updated.
    pub fn on_network_info_changed(&mut self) {
        info!("GeneralDiagnosticsDelegate: OnNetworkInfoChanged");
        self.report_attribute_on_all_endpoints(Attributes::NetworkInterfaces);
    }

    /// Gets called when the device has been rebooted.
    pub fn on_device_rebooted(&mut self, reason: BootReason) {
        info!("GeneralDiagnosticsDelegate: OnDeviceRebooted ({reason:?})");
        self.broadcast(Attributes::BootReasons, || {
            GeneralDiagnosticsEvent::BootReason(reason)
        });
    }

    pub fn on_hardware_faults_detected(&mut self, previous: &HardwareFaults, current: &HardwareFaults) {
        info!("GeneralDiagnosticsDelegate: OnHardwareFaultsDetected");
        self.broadcast(Attributes::ActiveHardwareFaults, || {
            GeneralDiagnosticsEvent::HardwareFaultChange(fault_change(previous, current))
        });
    }

    pub fn on_radio_faults_detected(&mut self, previous: &RadioFaults, current: &RadioFaults) {
        info!("GeneralDiagnosticsDelegate: OnRadioFaultsDetected");
        self.broadcast(Attributes::ActiveRadioFaults, || {
            GeneralDiagnosticsEvent::RadioFaultChange(fault_change(previous, current))
        });
    }

    pub fn on_network_faults_detected(&mut self, previous: &NetworkFaults, current: &NetworkFaults) {
        info!("GeneralDiagnosticsDelegate: OnNetworkFaultsDetected");
        self.broadcast(Attributes::ActiveNetworkFaults, || {
            GeneralDiagnosticsEvent::NetworkFaultChange(fault_change(previous, current))
        });
    }

    fn report_attribute_on_all_endpoints(&mut self, attribute: Attributes) {
        let reporter = &mut self.reporter;
        self.node
            .for_each_endpoint_with_server_cluster(CLUSTER_ID, |endpoint| {
                reporter.attribute_changed(AttributePathIB::new(
                    endpoint,
                    CLUSTER_ID,
                    attribute as _,
                ));
                Loop::Continue
            });
    }

    /// Mark `attribute` changed and record the event built by `event` on
    /// every endpoint hosting the cluster.
    fn broadcast<F>(&mut self, attribute: Attributes, event: F)
    where
        F: Fn() -> GeneralDiagnosticsEvent,
    {
        let reporter = &mut self.reporter;
        let events = &mut self.events;
        self.node
            .for_each_endpoint_with_server_cluster(CLUSTER_ID, |endpoint| {
                reporter.attribute_changed(AttributePathIB::new(
                    endpoint,
                    CLUSTER_ID,
                    attribute as _,
                ));
                if let Err(e) = events.log_event(endpoint, event()) {
                    error!(
                        "GeneralDiagnosticsDelegate: Failed to record {attribute:?} event on endpoint {endpoint}: {e}"
                    );
                }
                Loop::Continue
            });
    }
}

fn fault_change<T: Copy + PartialEq, const N: usize>(
    previous: &FaultSet<T, N>,
    current: &FaultSet<T, N>,
) -> FaultChange<T> {
    FaultChange {
        current: current.as_slice().to_vec(),
        previous: previous.as_slice().to_vec(),
    }
}
