use log::{debug, info};

use crate::{
    cluster::Cluster,
    interaction_model::{
        AttributePathIB, AttributeReportIB, AttributeStatusIB, CommandFields, CommandPathIB,
        InvokeResponseIB, Status, StatusIB,
    },
};

use super::{handler::Handler, store::AttributeStore, AttributeValue, ClusterId, EndpointId};

/// Node (7.8)
pub struct Node<'a> {
    pub id: u64,
    pub endpoints: &'a [Endpoint<'a>],
}

pub struct Endpoint<'a> {
    pub id: EndpointId,
    pub device_type: DeviceType,
    pub clusters: &'a [Cluster<'a>],
}

/// Device Type (7.15)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceType {
    pub device_type: u16,
    pub device_revision: u16,
}

/// Whether an enumeration should carry on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loop {
    Continue,
    Break,
}

impl<'a> Endpoint<'a> {
    pub fn server_cluster(&self, cluster: ClusterId) -> Option<&Cluster<'a>> {
        self.clusters.iter().find(|c| c.id == cluster)
    }

    pub fn has_server_cluster(&self, cluster: ClusterId) -> bool {
        self.server_cluster(cluster).is_some()
    }
}

impl<'a> Node<'a> {
    pub fn endpoint(&self, id: EndpointId) -> Option<&Endpoint<'a>> {
        self.endpoints.iter().find(|e| e.id == id)
    }

    /// Call `f` for every endpoint that hosts `cluster` as a server, in
    /// endpoint order, until it returns [`Loop::Break`].
    ///
    /// Endpoints without the cluster are never visited.
    pub fn for_each_endpoint_with_server_cluster<F>(&self, cluster: ClusterId, mut f: F) -> Loop
    where
        F: FnMut(EndpointId) -> Loop,
    {
        for endpoint in self.endpoints {
            if !endpoint.has_server_cluster(cluster) {
                continue;
            }
            if f(endpoint.id) == Loop::Break {
                return Loop::Break;
            }
        }
        Loop::Continue
    }

    fn server_cluster(
        &self,
        endpoint: EndpointId,
        cluster: ClusterId,
    ) -> Result<&Cluster<'a>, Status> {
        self.endpoint(endpoint)
            .ok_or(Status::UnsupportedEndpoint)?
            .server_cluster(cluster)
            .ok_or(Status::UnsupportedCluster)
    }
}

/// The composition root: a node description, the cluster servers serving
/// it, and the attribute store they share.
pub struct Device<'a, H, S> {
    pub node: &'a Node<'a>,
    pub handler: H,
    pub store: S,
}

impl<'a, H, S> Device<'a, H, S>
where
    H: Handler,
    S: AttributeStore,
{
    pub const fn new(node: &'a Node<'a>, handler: H, store: S) -> Self {
        Self {
            node,
            handler,
            store,
        }
    }

    /// Activate every endpoint, letting each hosted cluster set its
    /// initial attribute values.
    pub fn init(&mut self) {
        for endpoint in self.node.endpoints {
            for cluster in endpoint.clusters {
                debug!(
                    "Initializing cluster {:#06x} on endpoint {}",
                    cluster.id, endpoint.id
                );
                self.handler
                    .handle_init(&mut self.store, endpoint.id, cluster.id);
            }
        }
        info!("Node {:#x} initialized", self.node.id);
    }

    pub fn read(&self, path: &AttributePathIB) -> AttributeReportIB {
        AttributeReportIB {
            path: *path,
            data: self.read_value(path).map_err(StatusIB::from),
        }
    }

    fn read_value(&self, path: &AttributePathIB) -> Result<AttributeValue, Status> {
        let cluster = self.node.server_cluster(path.endpoint, path.cluster)?;
        if let Some(value) = cluster.read_global(path.attribute) {
            return Ok(value);
        }
        if cluster.attribute(path.attribute).is_none() {
            return Err(Status::UnsupportedAttribute);
        }
        self.handler.handle_read(&self.store, path)
    }

    pub fn write(&mut self, path: &AttributePathIB, value: AttributeValue) -> AttributeStatusIB {
        let status = match self.write_value(path, value) {
            Ok(()) => Status::Success,
            Err(status) => status,
        };
        AttributeStatusIB {
            path: *path,
            status: status.into(),
        }
    }

    fn write_value(&mut self, path: &AttributePathIB, value: AttributeValue) -> Result<(), Status> {
        let cluster = self.node.server_cluster(path.endpoint, path.cluster)?;
        let attribute = cluster
            .attribute(path.attribute)
            .ok_or(Status::UnsupportedAttribute)?;
        if !attribute.is_writable() {
            return Err(Status::UnsupportedWrite);
        }
        self.handler.handle_write(&mut self.store, path, value)
    }

    /// Invoke a command. Exactly one response is produced for every call.
    pub fn invoke(&mut self, cmd: &CommandPathIB, fields: &CommandFields) -> InvokeResponseIB {
        let status = match self.node.server_cluster(cmd.endpoint, cmd.cluster) {
            Ok(cluster) if cluster.accepts_command(cmd.command) => {
                self.handler.handle_invoke(&mut self.store, cmd, fields)
            }
            Ok(_) => Status::UnsupportedCommand,
            Err(status) => status,
        };
        InvokeResponseIB {
            path: *cmd,
            status: status.into(),
        }
    }
}
