//! Contract of the Lightning node SDK that a session delegates to.
//!
//! The SDK owns everything about the protocol (keys, gossip, channels,
//! routing, persistence). The session only configures it, connects
//! to it and forwards calls, so this module is the whole surface
//! that an SDK binding has to implement.
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use bitcoin::Network;

use crate::error;
use crate::event::node::NodeEvent;
use crate::types::{PaymentStatus, PaymentType};

/// Optional partner credentials, forwarded to the node provider when
/// the wallet is registered by a partner.
#[derive(Clone, PartialEq, Eq)]
pub struct PartnerCredentials {
    pub developer_cert: Vec<u8>,
    pub developer_key: Vec<u8>,
}

impl fmt::Debug for PartnerCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartnerCredentials")
            .field("developer_cert", &format!("<{} bytes>", self.developer_cert.len()))
            .field("developer_key", &"<redacted>")
            .finish()
    }
}

/// Identity of the node, derived from the certificate supplied by the caller.
#[derive(Clone, PartialEq, Eq)]
pub struct NodeIdentity {
    pub certificate: Vec<u8>,
    pub partner_credentials: Option<PartnerCredentials>,
}

impl NodeIdentity {
    pub fn new(certificate: &[u8], partner_credentials: Option<PartnerCredentials>) -> Self {
        Self {
            certificate: certificate.to_vec(),
            partner_credentials,
        }
    }
}

impl fmt::Debug for NodeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeIdentity")
            .field("certificate", &format!("<{} bytes>", self.certificate.len()))
            .field("partner_credentials", &self.partner_credentials)
            .finish()
    }
}

/// Configuration produced by the backend, consumed by `Backend::connect`.
#[derive(Clone, Debug)]
pub struct BackendConfig {
    pub network: Network,
    pub working_dir: PathBuf,
    pub identity: NodeIdentity,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendNodeInfo {
    pub id: String,
    pub max_payable_msat: u64,
    pub max_receivable_msat: u64,
    pub channels_balance_msat: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendInvoice {
    pub bolt11: String,
    pub payment_hash: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendPayment {
    pub payment_id: String,
    pub amount_msat: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendPaymentRecord {
    pub id: String,
    pub payment_type: PaymentType,
    pub payment_time: i64,
    pub amount_msat: u64,
    pub fee_msat: u64,
    pub status: PaymentStatus,
    pub description: Option<String>,
    pub bolt11: Option<String>,
}

/// Errors that a backend can attach to its failures to tell the
/// session how to react.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// The request was refused, the session is still usable.
    #[error("{0}")]
    Rejected(String),
    /// The backend session is gone and must be torn down.
    #[error("{0}")]
    Fatal(String),
}

/// Return true when any cause of the error is a `BackendError::Fatal`.
pub fn is_fatal(err: &error::Error) -> bool {
    err.chain()
        .any(|cause| matches!(cause.downcast_ref::<BackendError>(), Some(BackendError::Fatal(_))))
}

/// Receives the events produced by the backend.
///
/// It is called from the backend execution context, so an
/// implementation must hand the event off and return without
/// calling back into the backend.
pub trait EventListener: Send + Sync {
    fn on_event(&self, event: NodeEvent);
}

/// Entry point of the node SDK.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Build the configuration for the node, this is where a
    /// malformed identity is rejected.
    fn configure(
        &self,
        network: Network,
        working_dir: &Path,
        identity: NodeIdentity,
    ) -> error::Result<BackendConfig>;

    /// Start the node and return the live session.
    async fn connect(
        &self,
        config: BackendConfig,
        seed_path: &Path,
        listener: Arc<dyn EventListener>,
    ) -> error::Result<Arc<dyn BackendSession>>;
}

/// A live connection to the node.
///
/// Implementations are `Send + Sync`, and so the methods that do not
/// change the lifecycle are allowed to run in parallel.
#[async_trait]
pub trait BackendSession: Send + Sync {
    async fn node_info(&self) -> error::Result<BackendNodeInfo>;

    async fn receive_payment(
        &self,
        amount_msat: u64,
        description: &str,
    ) -> error::Result<BackendInvoice>;

    async fn send_payment(&self, bolt11: &str) -> error::Result<BackendPayment>;

    async fn list_payments(&self) -> error::Result<Vec<BackendPaymentRecord>>;

    async fn sync(&self) -> error::Result<()>;

    async fn disconnect(&self) -> error::Result<()>;
}
