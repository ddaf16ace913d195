use crate::{
    cluster::{
        door_lock::{self, DoorLockConfig, DoorLockDelegate},
        Cluster,
    },
    data_model::{handler::EmptyHandler, EndpointId},
    handler_chain_type,
};

pub type DoorLockEndpointHandler<D> = handler_chain_type!(door_lock::DoorLockCluster<D>);

pub const CLUSTERS: [Cluster<'static>; 1] = [door_lock::CLUSTER];

pub fn handler<D: DoorLockDelegate>(
    endpoint_id: EndpointId,
    config: DoorLockConfig,
    delegate: D,
) -> DoorLockEndpointHandler<D> {
    EmptyHandler.chain(
        endpoint_id,
        door_lock::CLUSTER.id,
        door_lock::DoorLockCluster::new(config, delegate),
    )
}
