//! Blaze test framework.
//!
//! `MockBackend` implements the backend contract without a node: it
//! records every call it receives and answers with scripted values,
//! so tests can assert both on what the session returns and on what
//! reached the backend.
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, Once};
use std::time::Duration;

use async_trait::async_trait;
pub use tempfile::TempDir;

use blaze_common::backend::{
    Backend, BackendConfig, BackendError, BackendInvoice, BackendNodeInfo, BackendPayment,
    BackendPaymentRecord, BackendSession, EventListener, NodeIdentity,
};
use blaze_common::bitcoin::Network;
use blaze_common::conf::BlazeConf;
use blaze_common::error;
use blaze_common::event::node::NodeEvent;

static INIT: Once = Once::new();

/// Initialize the logger once for the whole test binary.
pub fn init() {
    INIT.call_once(|| {
        use blaze_common::logger;

        let conf = BlazeConf {
            log_level: "trace".to_owned(),
            ..BlazeConf::default()
        };
        // another logger may already be installed by the harness
        let _ = logger::init_from(&conf);
    });
}

/// Configuration pointing to a fresh temporary working directory.
pub fn test_conf() -> error::Result<(Arc<BlazeConf>, TempDir)> {
    let dir = tempfile::tempdir()?;
    let conf = BlazeConf::new(Some(dir.path().to_string_lossy().to_string()), None);
    Ok((Arc::new(conf), dir))
}

/// A call that reached the backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Configure {
        network: Network,
        working_dir: PathBuf,
        identity: NodeIdentity,
    },
    Connect {
        seed_path: PathBuf,
    },
    NodeInfo,
    ReceivePayment {
        amount_msat: u64,
        description: String,
    },
    SendPayment {
        bolt11: String,
    },
    ListPayments,
    Sync,
    Disconnect,
}

/// How the mock answers, every field can be changed while a session
/// is running.
#[derive(Clone, Debug)]
pub struct Script {
    pub configure_error: Option<String>,
    pub connect_error: Option<String>,
    pub node_info: Result<BackendNodeInfo, BackendError>,
    pub invoice: Result<BackendInvoice, BackendError>,
    pub payment: Result<BackendPayment, BackendError>,
    pub payments: Vec<BackendPaymentRecord>,
    pub disconnect_error: Option<String>,
    /// Events pushed synchronously to the listener inside every
    /// `receive_payment` and `send_payment` call.
    pub events_per_call: Vec<NodeEvent>,
    /// Events pushed to the listener inside `connect`, before it
    /// knows whether the connection succeeds.
    pub events_on_connect: Vec<NodeEvent>,
    /// Keep the listener after `disconnect`, like a backend whose
    /// threads still deliver while shutting down.
    pub keep_listener: bool,
    /// Time every session call takes.
    pub latency: Option<Duration>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            configure_error: None,
            connect_error: None,
            node_info: Ok(BackendNodeInfo {
                id: "02eec7245d6b7d2ccb30380bfbe2a3648cd7a942653f5aa340edcea1f283686619"
                    .to_owned(),
                max_payable_msat: 150_000_500,
                max_receivable_msat: 2_000_000_999,
                channels_balance_msat: 150_000_500,
            }),
            invoice: Ok(BackendInvoice {
                bolt11: "lnbc1mockinvoice".to_owned(),
                payment_hash: "0001020304050607080900010203040506070809000102030405060708090102"
                    .to_owned(),
            }),
            payment: Ok(BackendPayment {
                payment_id: "mock-payment-hash".to_owned(),
                amount_msat: 1_000,
            }),
            payments: Vec::new(),
            disconnect_error: None,
            events_per_call: Vec::new(),
            events_on_connect: Vec::new(),
            keep_listener: false,
            latency: None,
        }
    }
}

#[derive(Default)]
struct MockState {
    calls: Mutex<Vec<Call>>,
    script: Mutex<Script>,
    listener: Mutex<Option<Arc<dyn EventListener>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|err| err.into_inner())
}

impl MockState {
    fn record(&self, call: Call) {
        log::trace!(target: "mock", "backend call {:?}", call);
        lock(&self.calls).push(call);
    }

    fn script(&self) -> Script {
        lock(&self.script).clone()
    }

    async fn delay(&self) {
        if let Some(latency) = self.script().latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn fire_events(&self, events: Vec<NodeEvent>) {
        let listener = lock(&self.listener).clone();
        if let Some(listener) = listener {
            for event in events {
                listener.on_event(event);
            }
        }
    }
}

/// Scripted backend that records every call it receives.
#[derive(Clone, Default)]
pub struct MockBackend {
    state: Arc<MockState>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(script: Script) -> Self {
        let mock = Self::default();
        *lock(&mock.state.script) = script;
        mock
    }

    /// Change the script of a running mock.
    pub fn script<F: FnOnce(&mut Script)>(&self, edit: F) {
        let mut script = lock(&self.state.script);
        edit(&mut *script);
    }

    pub fn calls(&self) -> Vec<Call> {
        lock(&self.state.calls).clone()
    }

    /// Number of recorded calls that match `filter`.
    pub fn count<F: Fn(&Call) -> bool>(&self, filter: F) -> usize {
        lock(&self.state.calls).iter().filter(|&call| filter(call)).count()
    }

    /// Push an event through the listener registered at connect time,
    /// like the backend does from its own threads.
    pub fn emit(&self, event: NodeEvent) -> bool {
        let listener = lock(&self.state.listener).clone();
        match listener {
            Some(listener) => {
                listener.on_event(event);
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl Backend for MockBackend {
    fn configure(
        &self,
        network: Network,
        working_dir: &Path,
        identity: NodeIdentity,
    ) -> error::Result<BackendConfig> {
        self.state.record(Call::Configure {
            network,
            working_dir: working_dir.to_path_buf(),
            identity: identity.clone(),
        });
        if let Some(err) = self.state.script().configure_error {
            error::bail!(err);
        }
        Ok(BackendConfig {
            network,
            working_dir: working_dir.to_path_buf(),
            identity,
        })
    }

    async fn connect(
        &self,
        _: BackendConfig,
        seed_path: &Path,
        listener: Arc<dyn EventListener>,
    ) -> error::Result<Arc<dyn BackendSession>> {
        self.state.record(Call::Connect {
            seed_path: seed_path.to_path_buf(),
        });
        *lock(&self.state.listener) = Some(listener);
        let script = self.state.script();
        self.state.fire_events(script.events_on_connect);
        if let Some(err) = script.connect_error {
            error::bail!(err);
        }
        Ok(Arc::new(MockSession {
            state: self.state.clone(),
        }))
    }
}

pub struct MockSession {
    state: Arc<MockState>,
}

#[async_trait]
impl BackendSession for MockSession {
    async fn node_info(&self) -> error::Result<BackendNodeInfo> {
        self.state.record(Call::NodeInfo);
        self.state.delay().await;
        Ok(self.state.script().node_info?)
    }

    async fn receive_payment(
        &self,
        amount_msat: u64,
        description: &str,
    ) -> error::Result<BackendInvoice> {
        self.state.record(Call::ReceivePayment {
            amount_msat,
            description: description.to_owned(),
        });
        self.state.delay().await;
        self.state.fire_events(self.state.script().events_per_call);
        Ok(self.state.script().invoice?)
    }

    async fn send_payment(&self, bolt11: &str) -> error::Result<BackendPayment> {
        self.state.record(Call::SendPayment {
            bolt11: bolt11.to_owned(),
        });
        self.state.delay().await;
        self.state.fire_events(self.state.script().events_per_call);
        Ok(self.state.script().payment?)
    }

    async fn list_payments(&self) -> error::Result<Vec<BackendPaymentRecord>> {
        self.state.record(Call::ListPayments);
        self.state.delay().await;
        Ok(self.state.script().payments)
    }

    async fn sync(&self) -> error::Result<()> {
        self.state.record(Call::Sync);
        self.state.delay().await;
        Ok(())
    }

    async fn disconnect(&self) -> error::Result<()> {
        self.state.record(Call::Disconnect);
        let script = self.state.script();
        if !script.keep_listener {
            *lock(&self.state.listener) = None;
        }
        if let Some(err) = script.disconnect_error {
            error::bail!(err);
        }
        Ok(())
    }
}
