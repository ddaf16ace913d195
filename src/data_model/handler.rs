// The chained handler layout follows ivmarkov/matter-rs experiments: a
// statically typed list of cluster handlers, so that dispatch never needs
// a boxed `dyn Handler`.

use crate::interaction_model::{AttributePathIB, CommandFields, CommandPathIB, Status};

use super::{store::AttributeStore, AttributeValue, ClusterId, EndpointId};

pub trait ChangeNotifier<T> {
    fn consume_change(&mut self) -> Option<T>;
}

/// A cluster server. Path validation against the node has already happened
/// by the time any of these are called.
pub trait Handler {
    /// Called once per endpoint hosting the cluster, when the endpoint is
    /// activated.
    fn handle_init<S: AttributeStore>(
        &mut self,
        _store: &mut S,
        _endpoint: EndpointId,
        _cluster: ClusterId,
    ) {
    }

    /// Read an attribute. Clusters without computed attributes read through
    /// to the store.
    fn handle_read<S: AttributeStore>(
        &self,
        store: &S,
        attr: &AttributePathIB,
    ) -> Result<AttributeValue, Status> {
        store.get(attr)
    }

    fn handle_write<S: AttributeStore>(
        &mut self,
        _store: &mut S,
        _attr: &AttributePathIB,
        _value: AttributeValue,
    ) -> Result<(), Status> {
        Err(Status::UnsupportedWrite)
    }

    /// Handle a command, returning the status of its single response.
    fn handle_invoke<S: AttributeStore>(
        &mut self,
        _store: &mut S,
        _cmd: &CommandPathIB,
        _fields: &CommandFields,
    ) -> Status {
        Status::UnsupportedCommand
    }
}

impl<T> Handler for &mut T
where
    T: Handler,
{
    fn handle_init<S: AttributeStore>(
        &mut self,
        store: &mut S,
        endpoint: EndpointId,
        cluster: ClusterId,
    ) {
        (**self).handle_init(store, endpoint, cluster)
    }

    fn handle_read<S: AttributeStore>(
        &self,
        store: &S,
        attr: &AttributePathIB,
    ) -> Result<AttributeValue, Status> {
        (**self).handle_read(store, attr)
    }

    fn handle_write<S: AttributeStore>(
        &mut self,
        store: &mut S,
        attr: &AttributePathIB,
        value: AttributeValue,
    ) -> Result<(), Status> {
        (**self).handle_write(store, attr, value)
    }

    fn handle_invoke<S: AttributeStore>(
        &mut self,
        store: &mut S,
        cmd: &CommandPathIB,
        fields: &CommandFields,
    ) -> Status {
        (**self).handle_invoke(store, cmd, fields)
    }
}

/// End of a handler chain: nothing is served from here.
pub struct EmptyHandler;

impl EmptyHandler {
    pub const fn chain<H>(
        self,
        handler_endpoint: EndpointId,
        handler_cluster: ClusterId,
        handler: H,
    ) -> ChainedHandler<H, Self> {
        ChainedHandler {
            handler_endpoint: Some(handler_endpoint),
            handler_cluster,
            handler,
            next: self,
        }
    }

    /// Register `handler` for `handler_cluster` on every endpoint.
    pub const fn chain_all<H>(
        self,
        handler_cluster: ClusterId,
        handler: H,
    ) -> ChainedHandler<H, Self> {
        ChainedHandler {
            handler_endpoint: None,
            handler_cluster,
            handler,
            next: self,
        }
    }
}

impl Handler for EmptyHandler {
    fn handle_read<S: AttributeStore>(
        &self,
        _store: &S,
        _attr: &AttributePathIB,
    ) -> Result<AttributeValue, Status> {
        Err(Status::UnsupportedCluster)
    }

    fn handle_write<S: AttributeStore>(
        &mut self,
        _store: &mut S,
        _attr: &AttributePathIB,
        _value: AttributeValue,
    ) -> Result<(), Status> {
        Err(Status::UnsupportedCluster)
    }

    fn handle_invoke<S: AttributeStore>(
        &mut self,
        _store: &mut S,
        _cmd: &CommandPathIB,
        _fields: &CommandFields,
    ) -> Status {
        Status::UnsupportedCluster
    }
}

pub struct ChainedHandler<H, T> {
    /// `None` serves the cluster on all endpoints
    pub handler_endpoint: Option<EndpointId>,
    pub handler_cluster: ClusterId,
    pub handler: H,
    pub next: T,
}

impl<H, T> ChainedHandler<H, T> {
    pub const fn chain<H2>(
        self,
        handler_endpoint: EndpointId,
        handler_cluster: ClusterId,
        handler: H2,
    ) -> ChainedHandler<H2, Self> {
        ChainedHandler {
            handler_endpoint: Some(handler_endpoint),
            handler_cluster,
            handler,
            next: self,
        }
    }

    pub const fn chain_all<H2>(
        self,
        handler_cluster: ClusterId,
        handler: H2,
    ) -> ChainedHandler<H2, Self> {
        ChainedHandler {
            handler_endpoint: None,
            handler_cluster,
            handler,
            next: self,
        }
    }

    fn serves(&self, endpoint: EndpointId, cluster: ClusterId) -> bool {
        self.handler_cluster == cluster
            && self.handler_endpoint.map_or(true, |e| e == endpoint)
    }
}

impl<H, T> Handler for ChainedHandler<H, T>
where
    H: Handler,
    T: Handler,
{
    fn handle_init<S: AttributeStore>(
        &mut self,
        store: &mut S,
        endpoint: EndpointId,
        cluster: ClusterId,
    ) {
        if self.serves(endpoint, cluster) {
            self.handler.handle_init(store, endpoint, cluster)
        } else {
            self.next.handle_init(store, endpoint, cluster)
        }
    }

    fn handle_read<S: AttributeStore>(
        &self,
        store: &S,
        attr: &AttributePathIB,
    ) -> Result<AttributeValue, Status> {
        if self.serves(attr.endpoint, attr.cluster) {
            self.handler.handle_read(store, attr)
        } else {
            self.next.handle_read(store, attr)
        }
    }

    fn handle_write<S: AttributeStore>(
        &mut self,
        store: &mut S,
        attr: &AttributePathIB,
        value: AttributeValue,
    ) -> Result<(), Status> {
        if self.serves(attr.endpoint, attr.cluster) {
            self.handler.handle_write(store, attr, value)
        } else {
            self.next.handle_write(store, attr, value)
        }
    }

    fn handle_invoke<S: AttributeStore>(
        &mut self,
        store: &mut S,
        cmd: &CommandPathIB,
        fields: &CommandFields,
    ) -> Status {
        if self.serves(cmd.endpoint, cmd.cluster) {
            self.handler.handle_invoke(store, cmd, fields)
        } else {
            self.next.handle_invoke(store, cmd, fields)
        }
    }
}

#[allow(unused_macros)]
#[macro_export]
macro_rules! handler_chain_type {
    ($h:ty) => {
        $crate::data_model::handler::ChainedHandler<$h, $crate::data_model::handler::EmptyHandler>
    };
    ($h1:ty, $($rest:ty),+) => {
        $crate::data_model::handler::ChainedHandler<$h1, $crate::handler_chain_type!($($rest),+)>
    };
}
