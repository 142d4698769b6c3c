//! Abstract interface to the kernel-resident IPVS table.

use async_trait::async_trait;
use common::Result;
#[cfg(test)]
use mockall::automock;

use crate::types::{Destination, Service};

/// Access to the kernel's virtual-service and destination tables.
///
/// A production implementation sits on a netlink socket; the reconciler only
/// depends on this trait. The table is externally mutable (ipvsadm, other
/// daemons), so listings are point-in-time snapshots and every read-then-write
/// sequence is best effort.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait IpvsTable: Send + Sync {
    /// List all virtual services currently in the kernel table.
    async fn list_services(&self) -> Result<Vec<Service>>;

    /// List the destinations attached to `service`.
    async fn list_destinations(&self, service: &Service) -> Result<Vec<Destination>>;

    /// Create a new virtual service.
    async fn new_service(&self, service: &Service) -> Result<()>;

    /// Overwrite an existing virtual service keyed by address and port.
    async fn update_service(&self, service: &Service) -> Result<()>;

    /// Delete a virtual service. The kernel drops its destinations with it.
    async fn del_service(&self, service: &Service) -> Result<()>;

    /// Attach a destination to `service`.
    async fn new_destination(&self, service: &Service, dest: &Destination) -> Result<()>;

    /// Overwrite a destination of `service` keyed by address.
    async fn update_destination(&self, service: &Service, dest: &Destination) -> Result<()>;

    /// Detach a destination from `service`.
    async fn del_destination(&self, service: &Service, dest: &Destination) -> Result<()>;
}
