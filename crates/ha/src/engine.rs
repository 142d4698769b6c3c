//! HA role transitions: VIP attachment and announcer lifecycle.

use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;

use common::{Error, Result};
use tracing::{error, info};

use crate::addr::AddressClient;
use crate::announce::{self, ANNOUNCE_INTERVAL, AnnouncerHandle};
use crate::config::HaConfig;

/// HA role of this node as decided by the external VRRP election.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaRole {
    Active,
    Standby,
}

impl fmt::Display for HaRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HaRole::Active => write!(f, "ACTIVE"),
            HaRole::Standby => write!(f, "STANDBY"),
        }
    }
}

/// One VIP under HA control.
///
/// Lives for the whole process; the announcer handle is its only mutable
/// state and always reflects whether an announcement task is running for
/// this VIP.
pub struct VipEntry {
    pub ip: IpAddr,
    pub prefix_len: u8,
    announcer: Option<AnnouncerHandle>,
}

impl VipEntry {
    pub fn new(ip: IpAddr, prefix_len: u8) -> Self {
        Self {
            ip,
            prefix_len,
            announcer: None,
        }
    }

    /// Whether an announcement task is currently running for this VIP.
    pub fn announcing(&self) -> bool {
        self.announcer.is_some()
    }
}

/// Applies Active/Standby transitions to the configured VIPs.
///
/// Callers serialize `apply_role` invocations; the engine does not lock
/// against overlapping calls.
pub struct VipEngine {
    interface: String,
    client: Arc<dyn AddressClient>,
    vips: Vec<VipEntry>,
}

impl VipEngine {
    pub fn new(config: &HaConfig, client: Arc<dyn AddressClient>) -> Self {
        Self {
            interface: config.interface.clone(),
            client,
            vips: config
                .vips
                .iter()
                .map(|v| VipEntry::new(v.address, v.prefix))
                .collect(),
        }
    }

    pub fn vips(&self) -> &[VipEntry] {
        &self.vips
    }

    /// Apply a role transition to every configured VIP, in configuration
    /// order.
    ///
    /// Entries are mutually independent: a failure on one is logged and ends
    /// only that entry's processing, never the loop. Always returns `Ok(())`
    /// once the loop completes; convergence of a failed entry is retried on
    /// the next transition.
    pub async fn apply_role(&mut self, role: HaRole) -> Result<()> {
        for entry in self.vips.iter_mut() {
            if let Err(e) = Self::apply_role_to_vip(&self.client, &self.interface, role, entry).await
            {
                error!(role = %role, interface = %self.interface, vip = %entry.ip, error = %e,
                       "failed to apply HA role to VIP");
            }
        }
        Ok(())
    }

    async fn apply_role_to_vip(
        client: &Arc<dyn AddressClient>,
        interface: &str,
        role: HaRole,
        entry: &mut VipEntry,
    ) -> Result<()> {
        let held = client.has_address(interface, entry.ip).await.map_err(|e| {
            Error::address(format!(
                "failed to check interface {interface} for VIP {}: {e}",
                entry.ip
            ))
        })?;

        match role {
            HaRole::Active => {
                if held {
                    // The upstream election signaled a transition without an
                    // actual state change; worth noticing in the logs.
                    info!(role = %role, interface = %interface, vip = %entry.ip,
                          prefix = entry.prefix_len, "role applied but VIP already acquired");
                } else {
                    client
                        .add_address(interface, entry.ip, entry.prefix_len, "")
                        .await
                        .map_err(|e| {
                            Error::address(format!(
                                "failed to add VIP {}/{} to {interface}: {e}",
                                entry.ip, entry.prefix_len
                            ))
                        })?;
                }

                if entry.announcer.is_none() {
                    info!(interface = %interface, vip = %entry.ip, "starting announcer");
                    entry.announcer = Some(announce::spawn(
                        client.clone(),
                        interface.to_string(),
                        entry.ip,
                        ANNOUNCE_INTERVAL,
                    ));
                }
            }
            HaRole::Standby => {
                if held {
                    client
                        .del_address(interface, entry.ip, entry.prefix_len)
                        .await
                        .map_err(|e| {
                            Error::address(format!(
                                "failed to delete VIP {}/{} from {interface}: {e}",
                                entry.ip, entry.prefix_len
                            ))
                        })?;
                } else {
                    info!(role = %role, interface = %interface, vip = %entry.ip,
                          prefix = entry.prefix_len, "role applied but VIP already released");
                }

                // Reap the announcer even when the address was already gone;
                // a handle left behind here would keep a task announcing an
                // address this node no longer holds.
                if let Some(handle) = entry.announcer.take() {
                    handle.stop().await;
                }

                if !held {
                    return Ok(());
                }
            }
        }

        info!(role = %role, interface = %interface, vip = %entry.ip, prefix = entry.prefix_len,
              "HA role applied to VIP");
        Ok(())
    }
}
