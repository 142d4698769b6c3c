//! Diff-based reconciliation of desired virtual services against the live
//! IPVS table.

use std::sync::Arc;

use common::{Error, Result};
use tracing::{debug, info};

use crate::config::{ForwardingMode, RealServerConfig, VirtualServiceConfig};
use crate::table::IpvsTable;
use crate::types::{Destination, FwdMethod, Protocol, Service};

/// Reconciles desired virtual-service configuration against the kernel IPVS
/// table through an [`IpvsTable`] handle.
pub struct Reconciler {
    table: Arc<dyn IpvsTable>,
}

impl Reconciler {
    pub fn new(table: Arc<dyn IpvsTable>) -> Self {
        Self { table }
    }

    /// Drive the live table to match `desired`.
    ///
    /// Two passes over the table: prune services and destinations that no
    /// longer appear in the desired set, then create or update everything
    /// that does. Records that already match are left untouched, so a
    /// reconciliation against an already-converged table issues no mutations.
    ///
    /// The first failed listing or mutation aborts the pass with an error
    /// naming the offending entity; changes applied before the failure are
    /// not rolled back. Callers recover by reconciling again on the next
    /// trigger.
    pub async fn reconcile(&self, desired: &[VirtualServiceConfig]) -> Result<()> {
        let live = self
            .table
            .list_services()
            .await
            .map_err(|e| Error::ipvs(format!("failed to list services: {e}")))?;

        self.prune(&live, desired).await?;

        for conf in desired {
            let service = build_service(conf);
            match find_service(&live, conf) {
                None => {
                    self.table
                        .new_service(&service)
                        .await
                        .map_err(|e| service_error("create", conf, e))?;
                    info!(service = %service, "created ipvs service");
                }
                Some(current) if *current != service => {
                    self.table
                        .update_service(&service)
                        .await
                        .map_err(|e| service_error("update", conf, e))?;
                    info!(service = %service, "updated ipvs service");
                }
                Some(_) => {
                    debug!(service = %service, "ipvs service already up to date");
                }
            }

            // Re-list against the service as it exists now; the pruned
            // listing from pass 1 is stale by this point.
            let dests = self.table.list_destinations(&service).await.map_err(|e| {
                Error::ipvs(format!(
                    "failed to list destinations for {}:{}: {e}",
                    conf.address, conf.port
                ))
            })?;

            for server in &conf.servers {
                let dest = build_destination(conf.forwarding, server);
                match dests.iter().find(|d| d.address == server.address) {
                    None => {
                        self.table
                            .new_destination(&service, &dest)
                            .await
                            .map_err(|e| destination_error("create", &dest, e))?;
                        info!(service = %service, destination = %dest, "created ipvs destination");
                    }
                    Some(current) if *current != dest => {
                        self.table
                            .update_destination(&service, &dest)
                            .await
                            .map_err(|e| destination_error("update", &dest, e))?;
                        info!(service = %service, destination = %dest, "updated ipvs destination");
                    }
                    Some(_) => {
                        debug!(service = %service, destination = %dest, "ipvs destination already up to date");
                    }
                }
            }
        }

        Ok(())
    }

    /// Pass 1: delete live services absent from the desired set, and live
    /// destinations absent from their matching desired service.
    async fn prune(&self, live: &[Service], desired: &[VirtualServiceConfig]) -> Result<()> {
        for service in live {
            let Some(conf) = desired
                .iter()
                .find(|c| c.address == service.address && c.port == service.port)
            else {
                self.table.del_service(service).await.map_err(|e| {
                    Error::ipvs(format!(
                        "failed to delete service {}:{}: {e}",
                        service.address, service.port
                    ))
                })?;
                info!(service = %service, "deleted ipvs service");
                continue;
            };

            let dests = self.table.list_destinations(service).await.map_err(|e| {
                Error::ipvs(format!(
                    "failed to list destinations for {}:{}: {e}",
                    service.address, service.port
                ))
            })?;

            for dest in &dests {
                if !conf.servers.iter().any(|s| s.address == dest.address) {
                    self.table.del_destination(service, dest).await.map_err(|e| {
                        Error::ipvs(format!(
                            "failed to delete destination {}:{}: {e}",
                            dest.address, dest.port
                        ))
                    })?;
                    info!(service = %service, destination = %dest, "deleted ipvs destination");
                }
            }
        }

        Ok(())
    }
}

fn find_service<'a>(live: &'a [Service], conf: &VirtualServiceConfig) -> Option<&'a Service> {
    live.iter()
        .find(|s| s.address == conf.address && s.port == conf.port)
}

fn build_service(conf: &VirtualServiceConfig) -> Service {
    Service {
        address: conf.address,
        port: conf.port,
        protocol: Protocol::TCP,
        scheduler: conf.schedule.clone(),
    }
}

fn build_destination(forwarding: ForwardingMode, server: &RealServerConfig) -> Destination {
    let fwd_method = match forwarding {
        ForwardingMode::DirectRoute => FwdMethod::Route,
        ForwardingMode::Masquerade => FwdMethod::Masq,
    };
    Destination {
        address: server.address,
        port: server.port,
        weight: server.weight,
        fwd_method,
    }
}

fn service_error(op: &str, conf: &VirtualServiceConfig, err: Error) -> Error {
    Error::ipvs(format!(
        "failed to {op} service, address={} port={} schedule={}: {err}",
        conf.address, conf.port, conf.schedule
    ))
}

fn destination_error(op: &str, dest: &Destination, err: Error) -> Error {
    Error::ipvs(format!(
        "failed to {op} destination, address={} port={} fwd={} weight={}: {err}",
        dest.address, dest.port, dest.fwd_method, dest.weight
    ))
}
