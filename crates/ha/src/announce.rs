//! Periodic ownership announcement task for a held VIP.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::addr::AddressClient;

/// Interval between ownership announcements while a VIP is held.
pub const ANNOUNCE_INTERVAL: Duration = Duration::from_secs(1);

/// Cancellation handle for a running announcement task.
///
/// Held inside a [`VipEntry`](crate::engine::VipEntry) while its announcer is
/// alive. Stopping consumes the handle, so a task can never be stopped twice
/// and a cleared entry can never leak a running task.
pub struct AnnouncerHandle {
    stop: Arc<Notify>,
    task: JoinHandle<()>,
}

impl AnnouncerHandle {
    /// Signal the task to stop and wait for it to exit.
    ///
    /// No announcement is sent after this returns; an attempt already in
    /// flight when the signal lands is allowed to finish.
    pub async fn stop(self) {
        self.stop.notify_one();
        let _ = self.task.await;
    }
}

/// Spawn the announcement loop for `ip` on `interface`.
///
/// The first announcement goes out one `period` after start. A failed send is
/// logged and the loop keeps going; only [`AnnouncerHandle::stop`] ends it.
pub fn spawn(
    client: Arc<dyn AddressClient>,
    interface: String,
    ip: IpAddr,
    period: Duration,
) -> AnnouncerHandle {
    let stop = Arc::new(Notify::new());
    let stop_signal = stop.clone();

    let task = tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.tick().await; // consume the immediate first tick

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match client.send_announcement(&interface, ip).await {
                        Ok(()) => {
                            debug!(interface = %interface, vip = %ip, "sent announcement");
                        }
                        Err(e) => {
                            warn!(interface = %interface, vip = %ip, error = %e,
                                  "failed to send announcement");
                        }
                    }
                }
                _ = stop_signal.notified() => {
                    info!(interface = %interface, vip = %ip, "announcer exiting");
                    break;
                }
            }
        }
    });

    AnnouncerHandle { stop, task }
}
