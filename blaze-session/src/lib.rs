//! Blaze node session.
//!
//! `NodeSession` is the single authority over the connection with the
//! Lightning node backend: it validates the caller input, owns the
//! backend session handle and is the only piece of code that calls
//! into the backend.
//!
//! Lifecycle changes (connect, disconnect) take the state lock in
//! exclusive mode, all the other operations share it, so they can
//! run in parallel but never observe a half connected session.
pub mod bridge;
pub mod errors;

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::RwLock;

use blaze_common::backend::{self, Backend, BackendSession, EventListener, NodeIdentity};
use blaze_common::chan;
use blaze_common::conf::BlazeConf;
use blaze_common::error;
use blaze_common::event::node::NodeEvent;
use blaze_common::event::session::SessionEvent;
use blaze_common::event::{Emitter, Event, Subscriber};
use blaze_common::handler::Handler;
use blaze_common::invoice::{self, DecodeError};
use blaze_common::logger::short;
use blaze_common::model::request::{CreateInvoice, PayInvoice};
use blaze_common::model::response::{DecodedInvoice, Invoice, NodeInfo, PayResult, Payment};
use blaze_common::types::{sats_to_msat, SessionState};

use crate::errors::{ConnectError, InvoiceError, PaymentError, SessionError};

/// The running backend session and the forwarder its events go through.
struct Active {
    session: Arc<dyn BackendSession>,
    forwarder: Arc<EventForwarder>,
}

enum State {
    Disconnected,
    Connected(Active),
}

impl State {
    fn session(&self) -> Option<Arc<dyn BackendSession>> {
        match self {
            State::Connected(active) => Some(active.session.clone()),
            State::Disconnected => None,
        }
    }
}

enum Delivery {
    /// The connect call did not complete yet.
    Pending(Vec<NodeEvent>),
    Live,
    Closed,
}

/// Hands the backend events over to the session listeners.
///
/// Every connect attempt gets its own forwarder. Events that arrive
/// while the backend is still connecting are held back until the
/// session is live, and everything is dropped once it is closed, so a
/// failed connect or a stale backend thread never reach the listeners.
///
/// `Emitter::emit` only pushes on unbounded queues, so the backend
/// thread that calls `on_event` is never held by a slow listener.
struct EventForwarder {
    emitter: Emitter<Event>,
    delivery: Mutex<Delivery>,
}

impl EventForwarder {
    fn new(emitter: Emitter<Event>) -> Self {
        Self {
            emitter,
            delivery: Mutex::new(Delivery::Pending(Vec::new())),
        }
    }

    fn delivery(&self) -> MutexGuard<'_, Delivery> {
        self.delivery.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start delivering, flushing what arrived during the connect.
    fn go_live(&self) {
        let mut delivery = self.delivery();
        if let Delivery::Pending(held) = std::mem::replace(&mut *delivery, Delivery::Live) {
            for event in held {
                self.emitter.emit(Event::Node(event));
            }
        }
    }

    fn close(&self) {
        *self.delivery() = Delivery::Closed;
    }
}

impl EventListener for EventForwarder {
    fn on_event(&self, event: NodeEvent) {
        let mut delivery = self.delivery();
        match &mut *delivery {
            Delivery::Pending(held) => held.push(event),
            Delivery::Live => {
                log::trace!(target: "emitter", "backend event {:?}", event);
                self.emitter.emit(Event::Node(event));
            }
            Delivery::Closed => {
                log::debug!(target: "emitter", "dropping event of a closed session {:?}", event)
            }
        }
    }
}

pub struct NodeSession {
    conf: Arc<BlazeConf>,
    backend: Arc<dyn Backend>,
    state: RwLock<State>,
    emitter: Emitter<Event>,
    subscriber: Subscriber<Event>,
}

impl NodeSession {
    pub fn new(conf: Arc<BlazeConf>, backend: Arc<dyn Backend>) -> Self {
        let emitter = Emitter::default();
        let subscriber = emitter.subscriber();
        Self {
            conf,
            backend,
            state: RwLock::new(State::Disconnected),
            emitter,
            subscriber,
        }
    }

    pub async fn state(&self) -> SessionState {
        match *self.state.read().await {
            State::Connected(_) => SessionState::Connected,
            State::Disconnected => SessionState::Disconnected,
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.state().await == SessionState::Connected
    }

    /// Connect to the node backend using `certificate` as node identity.
    ///
    /// A second call while connected fails with `AlreadyConnected`,
    /// the running session is left untouched. On any failure the
    /// session stays disconnected and nothing the backend reported
    /// during the attempt reaches the listeners.
    pub async fn connect(&self, certificate: &[u8]) -> Result<(), ConnectError> {
        if certificate.is_empty() {
            return Err(ConnectError::MissingCertificate);
        }
        let mut state = self.state.write().await;
        if let State::Connected(_) = *state {
            log::debug!(target: "session", "connect called on an active session");
            return Err(ConnectError::AlreadyConnected);
        }

        self.conf.prepare_dirs().map_err(|err| {
            ConnectError::Backend(format!("cannot prepare the working dir: {err}"))
        })?;
        let identity = NodeIdentity::new(certificate, self.conf.partner_credentials.clone());
        log::info!(
            target: "session",
            "connecting to the node on `{}` with working dir `{}`",
            self.conf.network,
            self.conf.path
        );
        let config = self
            .backend
            .configure(self.conf.network, Path::new(&self.conf.path), identity)
            .map_err(|err| ConnectError::Backend(format!("{err}")))?;
        let forwarder = Arc::new(EventForwarder::new(self.emitter.clone()));
        let session = match self
            .backend
            .connect(config, &self.conf.seed_path(), forwarder.clone())
            .await
        {
            Ok(session) => session,
            Err(err) => {
                forwarder.close();
                log::error!(target: "session", "connection failed: {err}");
                return Err(ConnectError::Backend(format!("{err}")));
            }
        };
        // a session that cannot tell who it is is not usable
        let node_id = match session.node_info().await {
            Ok(info) => info.id,
            Err(err) => {
                forwarder.close();
                log::error!(target: "session", "cannot read the node identity: {err}");
                if let Err(err) = session.disconnect().await {
                    log::warn!(target: "session", "backend disconnect failed: {err}");
                }
                return Err(ConnectError::Backend(format!("{err}")));
            }
        };

        *state = State::Connected(Active {
            session,
            forwarder: forwarder.clone(),
        });
        log::info!(target: "session", "connected to the node `{node_id}`");
        // lifecycle events are emitted under the lock to keep them in state order
        self.emit(Event::Session(SessionEvent::Connected { node_id }));
        forwarder.go_live();
        drop(state);
        Ok(())
    }

    /// Tear down the backend session, calling it while disconnected
    /// is a no-op. The session ends up disconnected even when the
    /// backend fails to shut down.
    pub async fn disconnect(&self) {
        let mut state = self.state.write().await;
        let State::Connected(active) = std::mem::replace(&mut *state, State::Disconnected) else {
            log::debug!(target: "session", "disconnect called without an active session");
            return;
        };
        active.forwarder.close();
        if let Err(err) = active.session.disconnect().await {
            log::warn!(target: "session", "backend disconnect failed: {err}");
        }
        log::info!(target: "session", "disconnected from the node");
        self.emit(Event::Session(SessionEvent::Disconnected));
        drop(state);
    }

    /// Fresh snapshot of the node, never cached.
    pub async fn node_info(&self) -> Result<NodeInfo, SessionError> {
        let state = self.state.read().await;
        let session = state.session().ok_or(SessionError::NotConnected)?;
        let result = session.node_info().await;
        drop(state);
        match result {
            Ok(info) => Ok(NodeInfo::from(info)),
            Err(err) => Err(SessionError::Backend(self.backend_failure(&session, err).await)),
        }
    }

    /// Spendable channels balance in sats.
    pub async fn balance(&self) -> Result<u64, SessionError> {
        let info = self.node_info().await?;
        Ok(info.channels_balance_sats)
    }

    /// Ask the backend to sync the node state.
    pub async fn sync(&self) -> Result<(), SessionError> {
        let state = self.state.read().await;
        let session = state.session().ok_or(SessionError::NotConnected)?;
        log::debug!(target: "session", "syncing node state");
        let result = session.sync().await;
        drop(state);
        if let Err(err) = result {
            return Err(SessionError::Backend(self.backend_failure(&session, err).await));
        }
        Ok(())
    }

    /// Create a bolt11 invoice.
    ///
    /// The amount is validated before looking at the connection, so a
    /// zero amount is always `InvalidAmount`.
    pub async fn create_invoice(&self, request: &CreateInvoice) -> Result<Invoice, InvoiceError> {
        let amount_msat = match request.amount_sats {
            0 => None,
            sats => sats_to_msat(sats),
        }
        .ok_or(InvoiceError::InvalidAmount(request.amount_sats))?;
        let description = request.description.as_deref().unwrap_or_default();

        let state = self.state.read().await;
        let session = state.session().ok_or(InvoiceError::NotConnected)?;
        log::info!(target: "session", "creating invoice for {} sats", request.amount_sats);
        let result = session.receive_payment(amount_msat, description).await;
        drop(state);
        match result {
            Ok(invoice) if invoice.bolt11.is_empty() || invoice.payment_hash.is_empty() => Err(
                InvoiceError::Backend("backend returned an empty invoice".to_owned()),
            ),
            Ok(invoice) => {
                log::info!(target: "session", "invoice created `{}`", short(&invoice.bolt11));
                Ok(Invoice::from(invoice))
            }
            Err(err) => Err(InvoiceError::Backend(self.backend_failure(&session, err).await)),
        }
    }

    /// Pay a bolt11 invoice, the string is forwarded unmodified.
    ///
    /// The amount in the result is truncated from msat to sat, so it
    /// does not match the invoice amount when that is not a multiple
    /// of 1000 msat.
    pub async fn pay_invoice(&self, request: &PayInvoice) -> Result<PayResult, PaymentError> {
        if request.bolt11.trim().is_empty() {
            return Err(PaymentError::EmptyInvoice);
        }

        let state = self.state.read().await;
        let session = state.session().ok_or(PaymentError::NotConnected)?;
        log::info!(target: "session", "paying invoice `{}`", short(&request.bolt11));
        let result = session.send_payment(&request.bolt11).await;
        drop(state);
        match result {
            Ok(payment) => {
                log::info!(target: "session", "payment `{}` sent", payment.payment_id);
                Ok(PayResult::from(payment))
            }
            Err(err) => Err(PaymentError::Backend(self.backend_failure(&session, err).await)),
        }
    }

    pub async fn list_payments(&self) -> Result<Vec<Payment>, SessionError> {
        let state = self.state.read().await;
        let session = state.session().ok_or(SessionError::NotConnected)?;
        let result = session.list_payments().await;
        drop(state);
        match result {
            Ok(records) => Ok(records.into_iter().map(Payment::from).collect()),
            Err(err) => Err(SessionError::Backend(self.backend_failure(&session, err).await)),
        }
    }

    /// Decode a bolt11 invoice locally, no session is needed.
    pub fn decode_invoice(&self, bolt11: &str) -> Result<DecodedInvoice, DecodeError> {
        invoice::decode(bolt11)
    }

    /// Turn a backend error into the message returned to the caller,
    /// dropping the session when the backend reports the failure as fatal.
    ///
    /// The caller must not hold the state lock.
    async fn backend_failure(&self, session: &Arc<dyn BackendSession>, err: error::Error) -> String {
        let message = format!("{err}");
        if !backend::is_fatal(&err) {
            log::warn!(target: "session", "backend error: {message}");
            return message;
        }

        log::error!(target: "session", "fatal backend error: {message}");
        let mut state = self.state.write().await;
        // another caller may already have replaced the session
        let current =
            matches!(&*state, State::Connected(active) if Arc::ptr_eq(&active.session, session));
        if current {
            if let State::Connected(active) = std::mem::replace(&mut *state, State::Disconnected) {
                active.forwarder.close();
            }
            if let Err(err) = session.disconnect().await {
                log::warn!(target: "session", "backend disconnect failed: {err}");
            }
            self.emit(Event::Session(SessionEvent::Disconnected));
        }
        drop(state);
        message
    }
}

impl Handler for NodeSession {
    fn events(&self) -> chan::Receiver<Event> {
        log::debug!(target: "listener", "subscribe for events");
        self.subscriber.subscribe()
    }

    fn emit(&self, event: Event) {
        log::debug!(target: "emitter", "emit event: {:?}", event);
        self.emitter.emit(event)
    }
}
