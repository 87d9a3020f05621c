//! Request/response dispatcher for the UI bridge.
//!
//! Every method takes a JSON payload and answers with a JSON payload
//! or an `RpcError` carrying a human readable message.
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use blaze_common::chan;
use blaze_common::error;
use blaze_common::event::Event;
use blaze_common::handler::Handler;
use blaze_common::invoice::DecodeError;
use blaze_common::json;
use blaze_common::model::request::{Connect, CreateInvoice, DecodeInvoice, PayInvoice};
use blaze_common::model::response::{Balance, Payments, Status};
use blaze_common::rpc::{self, Request, Response, RpcError};

use crate::errors::{ConnectError, ErrorKind, InvoiceError, PaymentError, SessionError};
use crate::NodeSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Connect,
    GetNodeInfo,
    GetBalance,
    Sync,
    CreateInvoice,
    PayInvoice,
    DecodeInvoice,
    ListPayments,
    IsConnected,
    Disconnect,
}

impl FromStr for Method {
    type Err = error::Error;

    fn from_str(s: &str) -> error::Result<Self> {
        let method = match s {
            "connect" => Method::Connect,
            "getNodeInfo" => Method::GetNodeInfo,
            "getBalance" => Method::GetBalance,
            "sync" => Method::Sync,
            "createInvoice" => Method::CreateInvoice,
            "payInvoice" => Method::PayInvoice,
            "decodeInvoice" => Method::DecodeInvoice,
            "listPayments" => Method::ListPayments,
            "isConnected" => Method::IsConnected,
            "disconnect" => Method::Disconnect,
            _ => error::bail!("method `{s}` not found"),
        };
        Ok(method)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Method::Connect => "connect",
            Method::GetNodeInfo => "getNodeInfo",
            Method::GetBalance => "getBalance",
            Method::Sync => "sync",
            Method::CreateInvoice => "createInvoice",
            Method::PayInvoice => "payInvoice",
            Method::DecodeInvoice => "decodeInvoice",
            Method::ListPayments => "listPayments",
            Method::IsConnected => "isConnected",
            Method::Disconnect => "disconnect",
        };
        write!(f, "{name}")
    }
}

impl Method {
    /// What the method does, used to give context to backend failures.
    fn action(&self) -> &'static str {
        match self {
            Method::Connect => "connect",
            Method::GetNodeInfo => "get node info",
            Method::GetBalance => "get balance",
            Method::Sync => "sync",
            Method::CreateInvoice => "create invoice",
            Method::PayInvoice => "pay invoice",
            Method::DecodeInvoice => "decode invoice",
            Method::ListPayments => "list payments",
            Method::IsConnected => "check connection",
            Method::Disconnect => "disconnect",
        }
    }
}

fn code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Validation => rpc::VALIDATION_ERROR,
        ErrorKind::NotConnected => rpc::NOT_CONNECTED,
        ErrorKind::AlreadyConnected => rpc::ALREADY_CONNECTED,
        ErrorKind::Backend => rpc::BACKEND_ERROR,
    }
}

macro_rules! rpc_error {
    ($($err:ty),*) => {
        $(
            impl From<$err> for RpcError {
                fn from(err: $err) -> Self {
                    RpcError::new(code(err.kind()), err.to_string())
                }
            }
        )*
    };
}

rpc_error!(ConnectError, SessionError, InvoiceError, PaymentError);

fn decode_error(err: DecodeError) -> RpcError {
    RpcError::new(rpc::VALIDATION_ERROR, err.to_string())
}

fn params<T: json::DeserializeOwned>(method: Method, params: json::Value) -> Result<T, RpcError> {
    json::from_value(params).map_err(|err| RpcError::invalid_params(&method.to_string(), err))
}

fn to_value<T: json::Serialize>(value: T) -> Result<json::Value, RpcError> {
    json::to_value(value).map_err(|err| RpcError::new(rpc::BACKEND_ERROR, err.to_string()))
}

/// Exposes a `NodeSession` to the bridge layer.
#[derive(Clone)]
pub struct SessionBridge {
    session: Arc<NodeSession>,
}

impl SessionBridge {
    pub fn new(session: Arc<NodeSession>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> Arc<NodeSession> {
        self.session.clone()
    }

    /// One-way channel of session events for the bridge listener.
    pub fn events(&self) -> chan::Receiver<Event> {
        self.session.events()
    }

    pub async fn handle(&self, request: &Request<json::Value>) -> Response<json::Value> {
        match self.call(&request.method, request.params.clone()).await {
            Ok(result) => Response::ok(request.id.clone(), result),
            Err(err) => Response::err(request.id.clone(), err),
        }
    }

    /// Dispatch `method` with its JSON payload to the session.
    pub async fn call(&self, method: &str, payload: json::Value) -> Result<json::Value, RpcError> {
        let method = Method::from_str(method).map_err(|_| RpcError::method_not_found(method))?;
        log::debug!(target: "bridge", "call for `{method}`");
        self.dispatch(method, payload).await.map_err(|mut err| {
            if err.code == rpc::BACKEND_ERROR {
                err.message = format!("Failed to {}: {}", method.action(), err.message);
            }
            log::info!(target: "bridge", "`{method}` rejected: {err}");
            err
        })
    }

    async fn dispatch(&self, method: Method, payload: json::Value) -> Result<json::Value, RpcError> {
        let session = &self.session;
        match method {
            Method::Connect => {
                let request: Connect = params(method, payload)?;
                session.connect(request.certificate.as_bytes()).await?;
                Ok(json::json!({}))
            }
            Method::GetNodeInfo => to_value(session.node_info().await?),
            Method::GetBalance => to_value(Balance {
                balance_sats: session.balance().await?,
            }),
            Method::Sync => {
                session.sync().await?;
                Ok(json::json!({}))
            }
            Method::CreateInvoice => {
                let request: CreateInvoice = params(method, payload)?;
                to_value(session.create_invoice(&request).await?)
            }
            Method::PayInvoice => {
                let request: PayInvoice = params(method, payload)?;
                to_value(session.pay_invoice(&request).await?)
            }
            Method::DecodeInvoice => {
                let request: DecodeInvoice = params(method, payload)?;
                to_value(session.decode_invoice(&request.bolt11).map_err(decode_error)?)
            }
            Method::ListPayments => to_value(Payments {
                payments: session.list_payments().await?,
            }),
            Method::IsConnected => to_value(Status::from(session.state().await)),
            Method::Disconnect => {
                session.disconnect().await;
                Ok(json::json!({}))
            }
        }
    }
}
