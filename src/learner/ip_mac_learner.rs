//! Background learner bound to one frame source.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use super::{AddressTable, KnownAddresses, TrackingMode};
use crate::capture::FrameSource;
use crate::domain::HardwareAddress;
use crate::error::LearnerError;
use crate::listener::{BindingListener, ListenerStats};
use crate::reporter::BindingReporter;

type Worker = JoinHandle<Result<ListenerStats, LearnerError>>;

/// Learns which network addresses the tracked hardware addresses claim.
///
/// A worker thread runs a `BindingListener` over the source until
/// `close` is called or the source ends.
pub struct IpMacLearner {
    interface: String,
    table: Arc<Mutex<AddressTable>>,
    running: Arc<AtomicBool>,
    worker: Option<Worker>,
}

impl IpMacLearner {
    /// Start learning from `source`, reporting every binding to `reporter`.
    pub fn start(
        source: Box<dyn FrameSource>,
        reporter: Box<dyn BindingReporter>,
        mode: TrackingMode,
    ) -> Result<Self, LearnerError> {
        let table = Arc::new(Mutex::new(AddressTable::new(mode)));
        let running = Arc::new(AtomicBool::new(true));

        let mut listener = BindingListener::new(source, reporter)
            .with_table(Arc::clone(&table))
            .with_running(Arc::clone(&running));
        let interface = listener.interface_name().to_string();

        let worker = thread::Builder::new()
            .name(format!("ipmac-{interface}"))
            .spawn(move || listener.run())?;

        tracing::debug!(interface = %interface, ?mode, "learner started");

        Ok(Self {
            interface,
            table,
            running,
            worker: Some(worker),
        })
    }

    pub fn interface_name(&self) -> &str {
        &self.interface
    }

    /// Add a hardware address to the set being tracked, forgetting any
    /// addresses it had already learned.
    pub fn add_mac(&self, mac: HardwareAddress) -> Result<(), LearnerError> {
        tracing::debug!(mac = %mac, "adding mac to filter");
        self.table()?.track(mac);
        Ok(())
    }

    /// Stop tracking a hardware address.
    pub fn del_mac(&self, mac: &HardwareAddress) -> Result<bool, LearnerError> {
        Ok(self.table()?.untrack(mac))
    }

    /// Stop tracking every hardware address.
    pub fn flush(&self) -> Result<(), LearnerError> {
        self.table()?.flush();
        Ok(())
    }

    /// Addresses known for a tracked hardware address.
    pub fn get_ip_from_mac(
        &self,
        mac: &HardwareAddress,
    ) -> Result<Option<KnownAddresses>, LearnerError> {
        Ok(self.table()?.lookup(mac))
    }

    pub fn snapshot(&self) -> Result<Vec<(HardwareAddress, KnownAddresses)>, LearnerError> {
        Ok(self.table()?.snapshot())
    }

    /// Whether the worker has stopped on its own (source ended or failed).
    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().map_or(true, |worker| worker.is_finished())
    }

    /// Stop learning and wait for the worker.
    ///
    /// Returns `None` if the learner was already closed.
    pub fn close(&mut self) -> Result<Option<ListenerStats>, LearnerError> {
        self.running.store(false, Ordering::SeqCst);

        let Some(worker) = self.worker.take() else {
            return Ok(None);
        };

        let stats = worker.join().map_err(|_| LearnerError::WorkerPanicked)??;
        tracing::debug!(interface = %self.interface, "learner closed");
        Ok(Some(stats))
    }

    fn table(&self) -> Result<MutexGuard<'_, AddressTable>, LearnerError> {
        self.table.lock().map_err(|_| LearnerError::Poisoned)
    }
}

impl Drop for IpMacLearner {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!(interface = %self.interface, "learner stopped with error: {}", e);
        }
    }
}
