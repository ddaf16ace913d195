use crate::{
    cluster::{
        utility::general_diagnostics::{self, DiagnosticDataProvider},
        Cluster,
    },
    data_model::{handler::EmptyHandler, EndpointId},
    handler_chain_type,
};

pub type RootEndpointHandler<P> =
    handler_chain_type!(general_diagnostics::GeneralDiagnosticsCluster<P>);

pub const CLUSTERS: [Cluster<'static>; 1] = [general_diagnostics::CLUSTER];

pub fn handler<P: DiagnosticDataProvider>(
    endpoint_id: EndpointId,
    provider: P,
) -> RootEndpointHandler<P> {
    EmptyHandler.chain(
        endpoint_id,
        general_diagnostics::CLUSTER.id,
        general_diagnostics::GeneralDiagnosticsCluster::new(provider),
    )
}
