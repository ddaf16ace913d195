use num::FromPrimitive;

use crate::data_model::{
    Access, Attribute, AttributeId, AttributeValue, ClusterId, CommandId, EventId, Quality,
};

pub mod door_lock;
pub mod utility;

/// Static description of a server cluster: what it exposes, not its state.
pub struct Cluster<'a> {
    pub id: ClusterId,
    pub classification: ClusterClassification,
    pub revision: u16,
    pub features: u32,
    pub attributes: &'a [Attribute],
    /// Commands accepted from clients
    pub commands: &'a [CommandId],
    /// Commands generated as responses
    pub generated_commands: &'a [CommandId],
    pub events: &'a [EventId],
}

impl<'a> Cluster<'a> {
    pub fn attribute(&self, id: AttributeId) -> Option<&Attribute> {
        self.attributes
            .iter()
            .chain(GLOBAL_ATTRIBUTES.iter())
            .find(|a| a.id == id)
    }

    pub fn accepts_command(&self, id: CommandId) -> bool {
        self.commands.contains(&id)
    }

    /// Serve a global attribute (7.13) from the descriptor. Returns `None`
    /// for cluster-specific attributes.
    pub fn read_global(&self, attribute: AttributeId) -> Option<AttributeValue> {
        let global = GlobalAttributes::from_u32(attribute)?;
        let value = match global {
            GlobalAttributes::ClusterRevision => AttributeValue::U16(self.revision),
            GlobalAttributes::FeatureMap => AttributeValue::U32(self.features),
            GlobalAttributes::AttributeList => id_list(
                self.attributes
                    .iter()
                    .chain(GLOBAL_ATTRIBUTES.iter())
                    .map(|a| a.id),
            ),
            GlobalAttributes::EventList => id_list(self.events.iter().copied()),
            GlobalAttributes::AcceptedCommandList => id_list(self.commands.iter().copied()),
            GlobalAttributes::GeneratedCommandList => {
                id_list(self.generated_commands.iter().copied())
            }
        };
        Some(value)
    }
}

fn id_list(ids: impl Iterator<Item = u32>) -> AttributeValue {
    AttributeValue::List(ids.map(AttributeValue::U32).collect())
}

#[repr(u32)]
#[derive(FromPrimitive, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalAttributes {
    ClusterRevision = 0xFFFD,
    FeatureMap = 0xFFFC,
    AttributeList = 0xFFFB,
    EventList = 0xFFFA,
    AcceptedCommandList = 0xFFF9,
    GeneratedCommandList = 0xFFF8,
}

/// The classification of the cluster (7.10.8)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterClassification {
    /// Used for the primary operation of the endpoint.
    /// Supports one or more persistent application interactions between a client and server.
    Application,
    /// Used for configuration, discovery, addressing, diagnosing, monitoring, etc.
    Utility,
}

// Global attributes
pub const ATTR_CLUSTER_REVISION: Attribute = Attribute::new(
    GlobalAttributes::ClusterRevision as _,
    Quality::FIXED,
    Access::READ,
);
pub const ATTR_FEATURE_MAP: Attribute = Attribute::new(
    GlobalAttributes::FeatureMap as _,
    Quality::FIXED,
    Access::READ,
);
pub const ATTR_ATTRIBUTE_LIST: Attribute = Attribute::new(
    GlobalAttributes::AttributeList as _,
    Quality::FIXED.union(Quality::LIST),
    Access::READ,
);
pub const ATTR_EVENT_LIST: Attribute = Attribute::new(
    GlobalAttributes::EventList as _,
    Quality::FIXED.union(Quality::LIST),
    Access::READ,
);
pub const ATTR_ACCEPTED_COMMAND_LIST: Attribute = Attribute::new(
    GlobalAttributes::AcceptedCommandList as _,
    Quality::FIXED.union(Quality::LIST),
    Access::READ,
);
pub const ATTR_GENERATED_COMMAND_LIST: Attribute = Attribute::new(
    GlobalAttributes::GeneratedCommandList as _,
    Quality::FIXED.union(Quality::LIST),
    Access::READ,
);

pub const GLOBAL_ATTRIBUTES: [Attribute; 6] = [
    ATTR_GENERATED_COMMAND_LIST,
    ATTR_ACCEPTED_COMMAND_LIST,
    ATTR_EVENT_LIST,
    ATTR_ATTRIBUTE_LIST,
    ATTR_FEATURE_MAP,
    ATTR_CLUSTER_REVISION,
];
