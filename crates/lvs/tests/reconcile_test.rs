//! Reconciler behavior against a scripted in-memory IPVS table.

use async_trait::async_trait;
use common::Result;
use lvs::config::{ForwardingMode, LvsConfig, RealServerConfig, VirtualServiceConfig};
use lvs::{Destination, FwdMethod, IpvsTable, Protocol, Reconciler, Scheduler, Service};
use std::net::IpAddr;
use std::sync::{Arc, Mutex};

/// One recorded table mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Op {
    NewService(Service),
    UpdateService(Service),
    DelService(Service),
    NewDestination(Service, Destination),
    UpdateDestination(Service, Destination),
    DelDestination(Service, Destination),
}

/// In-memory stand-in for the kernel table. Applies every mutation to its
/// own state and records it, so tests can assert both the exact call
/// sequence and the converged result.
#[derive(Default)]
struct FakeTable {
    services: Mutex<Vec<(Service, Vec<Destination>)>>,
    ops: Mutex<Vec<Op>>,
}

impl FakeTable {
    fn with_services(services: Vec<(Service, Vec<Destination>)>) -> Self {
        Self {
            services: Mutex::new(services),
            ops: Mutex::new(Vec::new()),
        }
    }

    fn ops(&self) -> Vec<Op> {
        self.ops.lock().unwrap().clone()
    }

    fn dump(&self) -> Vec<(Service, Vec<Destination>)> {
        self.services.lock().unwrap().clone()
    }
}

#[async_trait]
impl IpvsTable for FakeTable {
    async fn list_services(&self) -> Result<Vec<Service>> {
        Ok(self
            .services
            .lock()
            .unwrap()
            .iter()
            .map(|(s, _)| s.clone())
            .collect())
    }

    async fn list_destinations(&self, service: &Service) -> Result<Vec<Destination>> {
        Ok(self
            .services
            .lock()
            .unwrap()
            .iter()
            .find(|(s, _)| s.address == service.address && s.port == service.port)
            .map(|(_, dests)| dests.clone())
            .unwrap_or_default())
    }

    async fn new_service(&self, service: &Service) -> Result<()> {
        self.ops.lock().unwrap().push(Op::NewService(service.clone()));
        self.services
            .lock()
            .unwrap()
            .push((service.clone(), Vec::new()));
        Ok(())
    }

    async fn update_service(&self, service: &Service) -> Result<()> {
        self.ops
            .lock()
            .unwrap()
            .push(Op::UpdateService(service.clone()));
        let mut services = self.services.lock().unwrap();
        if let Some(entry) = services
            .iter_mut()
            .find(|(s, _)| s.address == service.address && s.port == service.port)
        {
            entry.0 = service.clone();
        }
        Ok(())
    }

    async fn del_service(&self, service: &Service) -> Result<()> {
        self.ops.lock().unwrap().push(Op::DelService(service.clone()));
        self.services
            .lock()
            .unwrap()
            .retain(|(s, _)| !(s.address == service.address && s.port == service.port));
        Ok(())
    }

    async fn new_destination(&self, service: &Service, dest: &Destination) -> Result<()> {
        self.ops
            .lock()
            .unwrap()
            .push(Op::NewDestination(service.clone(), dest.clone()));
        let mut services = self.services.lock().unwrap();
        if let Some(entry) = services
            .iter_mut()
            .find(|(s, _)| s.address == service.address && s.port == service.port)
        {
            entry.1.push(dest.clone());
        }
        Ok(())
    }

    async fn update_destination(&self, service: &Service, dest: &Destination) -> Result<()> {
        self.ops
            .lock()
            .unwrap()
            .push(Op::UpdateDestination(service.clone(), dest.clone()));
        let mut services = self.services.lock().unwrap();
        if let Some(entry) = services
            .iter_mut()
            .find(|(s, _)| s.address == service.address && s.port == service.port)
        {
            if let Some(existing) = entry.1.iter_mut().find(|d| d.address == dest.address) {
                *existing = dest.clone();
            }
        }
        Ok(())
    }

    async fn del_destination(&self, service: &Service, dest: &Destination) -> Result<()> {
        self.ops
            .lock()
            .unwrap()
            .push(Op::DelDestination(service.clone(), dest.clone()));
        let mut services = self.services.lock().unwrap();
        if let Some(entry) = services
            .iter_mut()
            .find(|(s, _)| s.address == service.address && s.port == service.port)
        {
            entry.1.retain(|d| d.address != dest.address);
        }
        Ok(())
    }
}

fn addr(s: &str) -> IpAddr {
    s.parse().unwrap()
}

fn service(address: &str, port: u16, scheduler: Scheduler) -> Service {
    Service {
        address: addr(address),
        port,
        protocol: Protocol::TCP,
        scheduler,
    }
}

fn destination(address: &str, port: u16, weight: u32, fwd_method: FwdMethod) -> Destination {
    Destination {
        address: addr(address),
        port,
        weight,
        fwd_method,
    }
}

fn web_service() -> VirtualServiceConfig {
    VirtualServiceConfig {
        name: "web".to_string(),
        address: addr("10.0.0.1"),
        port: 80,
        schedule: Scheduler::RoundRobin,
        forwarding: ForwardingMode::Masquerade,
        servers: vec![
            RealServerConfig {
                address: addr("10.0.0.2"),
                port: 80,
                weight: 1,
            },
            RealServerConfig {
                address: addr("10.0.0.3"),
                port: 80,
                weight: 2,
            },
        ],
    }
}

#[tokio::test]
async fn test_empty_table_creates_everything() {
    let table = Arc::new(FakeTable::default());
    let reconciler = Reconciler::new(table.clone());

    reconciler.reconcile(&[web_service()]).await.unwrap();

    let expected = service("10.0.0.1", 80, Scheduler::RoundRobin);
    assert_eq!(
        table.ops(),
        vec![
            Op::NewService(expected.clone()),
            Op::NewDestination(expected.clone(), destination("10.0.0.2", 80, 1, FwdMethod::Masq)),
            Op::NewDestination(expected, destination("10.0.0.3", 80, 2, FwdMethod::Masq)),
        ]
    );
}

#[tokio::test]
async fn test_orphan_service_needs_one_delete() {
    let orphan = service("10.0.0.9", 80, Scheduler::RoundRobin);
    let table = Arc::new(FakeTable::with_services(vec![(
        orphan.clone(),
        vec![destination("10.0.0.10", 80, 1, FwdMethod::Masq)],
    )]));
    let reconciler = Reconciler::new(table.clone());

    reconciler.reconcile(&[]).await.unwrap();

    // The kernel drops destinations with the service, so no DelDestination.
    assert_eq!(table.ops(), vec![Op::DelService(orphan)]);
    assert!(table.dump().is_empty());
}

#[tokio::test]
async fn test_converged_table_issues_no_mutations() {
    let table = Arc::new(FakeTable::with_services(vec![(
        service("10.0.0.1", 80, Scheduler::RoundRobin),
        vec![
            destination("10.0.0.2", 80, 1, FwdMethod::Masq),
            destination("10.0.0.3", 80, 2, FwdMethod::Masq),
        ],
    )]));
    let reconciler = Reconciler::new(table.clone());

    reconciler.reconcile(&[web_service()]).await.unwrap();

    assert!(table.ops().is_empty());
}

#[tokio::test]
async fn test_convergence_from_arbitrary_state() {
    // Live table: an orphan service, plus the desired service carrying a
    // stale scheduler, an orphan destination, and a destination with a stale
    // weight.
    let table = Arc::new(FakeTable::with_services(vec![
        (
            service("10.0.0.9", 8080, Scheduler::LeastConnection),
            vec![destination("10.0.0.10", 8080, 1, FwdMethod::Masq)],
        ),
        (
            service("10.0.0.1", 80, Scheduler::WeightedLeastConnection),
            vec![
                destination("10.0.0.2", 80, 1, FwdMethod::Masq),
                destination("10.0.0.3", 80, 7, FwdMethod::Masq),
                destination("10.0.0.99", 80, 1, FwdMethod::Masq),
            ],
        ),
    ]));
    let reconciler = Reconciler::new(table.clone());

    reconciler.reconcile(&[web_service()]).await.unwrap();

    assert_eq!(
        table.dump(),
        vec![(
            service("10.0.0.1", 80, Scheduler::RoundRobin),
            vec![
                destination("10.0.0.2", 80, 1, FwdMethod::Masq),
                destination("10.0.0.3", 80, 2, FwdMethod::Masq),
            ],
        )]
    );

    // A second pass over the converged table is a no-op.
    let before = table.ops().len();
    reconciler.reconcile(&[web_service()]).await.unwrap();
    assert_eq!(table.ops().len(), before);
}

#[tokio::test]
async fn test_prune_is_independent_of_listing_order() {
    let keeper = service("10.0.0.1", 80, Scheduler::RoundRobin);
    let first_orphan = service("10.0.0.8", 80, Scheduler::RoundRobin);
    let last_orphan = service("10.0.0.9", 80, Scheduler::RoundRobin);

    // Orphans sit before and after the kept service in the live listing.
    let table = Arc::new(FakeTable::with_services(vec![
        (first_orphan.clone(), Vec::new()),
        (
            keeper,
            vec![
                destination("10.0.0.2", 80, 1, FwdMethod::Masq),
                destination("10.0.0.3", 80, 2, FwdMethod::Masq),
            ],
        ),
        (last_orphan.clone(), Vec::new()),
    ]));
    let reconciler = Reconciler::new(table.clone());

    reconciler.reconcile(&[web_service()]).await.unwrap();

    assert_eq!(
        table.ops(),
        vec![Op::DelService(first_orphan), Op::DelService(last_orphan)]
    );
}

#[tokio::test]
async fn test_direct_route_maps_to_route_forwarding() {
    let raw = r#"
lvs:
  - name: dsr
    address: 192.0.2.1
    port: 443
    schedule: mh
    type: dr
    servers:
      - address: 192.0.2.10
        port: 443
        weight: 100
"#;
    let config = LvsConfig::from_yaml(raw).unwrap();
    let table = Arc::new(FakeTable::default());
    let reconciler = Reconciler::new(table.clone());

    reconciler.reconcile(&config.lvs).await.unwrap();

    let state = table.dump();
    assert_eq!(state.len(), 1);
    assert_eq!(state[0].0.scheduler, Scheduler::MaglevHashing);
    assert_eq!(state[0].1[0].fwd_method, FwdMethod::Route);
    assert_eq!(state[0].1[0].weight, 100);
}
