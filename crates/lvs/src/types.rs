//! IPVS data types, shared between built (desired) records and live
//! snapshots returned by the kernel table.

use std::fmt;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// IP protocol for IPVS services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    TCP,
    UDP,
    Other(u8),
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::TCP => write!(f, "TCP"),
            Protocol::UDP => write!(f, "UDP"),
            Protocol::Other(n) => write!(f, "IP({})", n),
        }
    }
}

/// IPVS scheduling algorithm.
///
/// Serialized as the kernel's short scheduler name; names this crate does not
/// know pass through as [`Scheduler::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Scheduler {
    RoundRobin,
    WeightedRoundRobin,
    LeastConnection,
    WeightedLeastConnection,
    SourceHashing,
    MaglevHashing,
    Other(String),
}

impl fmt::Display for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheduler::RoundRobin => write!(f, "rr"),
            Scheduler::WeightedRoundRobin => write!(f, "wrr"),
            Scheduler::LeastConnection => write!(f, "lc"),
            Scheduler::WeightedLeastConnection => write!(f, "wlc"),
            Scheduler::SourceHashing => write!(f, "sh"),
            Scheduler::MaglevHashing => write!(f, "mh"),
            Scheduler::Other(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Scheduler {
    fn from(s: &str) -> Self {
        match s {
            "rr" => Scheduler::RoundRobin,
            "wrr" => Scheduler::WeightedRoundRobin,
            "lc" => Scheduler::LeastConnection,
            "wlc" => Scheduler::WeightedLeastConnection,
            "sh" => Scheduler::SourceHashing,
            "mh" => Scheduler::MaglevHashing,
            other => Scheduler::Other(other.to_string()),
        }
    }
}

impl From<String> for Scheduler {
    fn from(s: String) -> Self {
        Scheduler::from(s.as_str())
    }
}

impl From<Scheduler> for String {
    fn from(s: Scheduler) -> Self {
        s.to_string()
    }
}

/// Packet forwarding method for a destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FwdMethod {
    /// NAT mode (masquerading)
    Masq,
    /// Tunnel mode (IP-in-IP)
    Tunnel,
    /// Route mode (DSR - Direct Server Return)
    Route,
}

impl fmt::Display for FwdMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FwdMethod::Masq => write!(f, "Masq"),
            FwdMethod::Tunnel => write!(f, "Tunnel"),
            FwdMethod::Route => write!(f, "Route"),
        }
    }
}

/// An IPVS virtual service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    pub address: IpAddr,
    pub port: u16,
    pub protocol: Protocol,
    pub scheduler: Scheduler,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}:{} ({})",
            self.protocol, self.address, self.port, self.scheduler
        )
    }
}

/// An IPVS destination (real server).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub address: IpAddr,
    pub port: u16,
    pub weight: u32,
    pub fwd_method: FwdMethod,
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}
