//! Abstract interface to network-interface address state.

use async_trait::async_trait;
use common::Result;
#[cfg(test)]
use mockall::automock;
use std::net::IpAddr;

/// Interface address operations used by the HA VIP engine.
///
/// A production implementation sits on rtnetlink plus a packet socket for the
/// announcement primitive. Interface addresses are externally mutable, so a
/// presence check is a point-in-time answer only.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AddressClient: Send + Sync {
    /// Report whether `interface` currently holds `ip`.
    async fn has_address(&self, interface: &str, ip: IpAddr) -> Result<bool>;

    /// Add `ip/prefix_len` to `interface`, optionally tagged with an address
    /// label (empty for none).
    async fn add_address(&self, interface: &str, ip: IpAddr, prefix_len: u8, label: &str)
    -> Result<()>;

    /// Remove `ip/prefix_len` from `interface`.
    async fn del_address(&self, interface: &str, ip: IpAddr, prefix_len: u8) -> Result<()>;

    /// Broadcast a link-layer announcement (gratuitous ARP or unsolicited
    /// neighbor advertisement) asserting ownership of `ip`.
    async fn send_announcement(&self, interface: &str, ip: IpAddr) -> Result<()>;
}
