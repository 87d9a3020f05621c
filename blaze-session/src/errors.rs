//! Errors returned by the node session.
//!
//! Every operation has its own error, so a caller can only match
//! on the failures that operation can produce. Backend messages are
//! kept verbatim.

/// Broad classification of a failure, shared by all the errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected locally, the backend was never contacted.
    Validation,
    NotConnected,
    AlreadyConnected,
    Backend,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectError {
    #[error("Certificate is required")]
    MissingCertificate,
    #[error("Already connected")]
    AlreadyConnected,
    #[error("{0}")]
    Backend(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Not connected")]
    NotConnected,
    #[error("{0}")]
    Backend(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvoiceError {
    #[error("Not connected")]
    NotConnected,
    #[error("Invalid amount: {0} sats, it must be greater than zero and fit in msat")]
    InvalidAmount(u64),
    #[error("{0}")]
    Backend(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentError {
    #[error("Not connected")]
    NotConnected,
    #[error("Invoice is required")]
    EmptyInvoice,
    #[error("{0}")]
    Backend(String),
}

impl ConnectError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingCertificate => ErrorKind::Validation,
            Self::AlreadyConnected => ErrorKind::AlreadyConnected,
            Self::Backend(_) => ErrorKind::Backend,
        }
    }
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotConnected => ErrorKind::NotConnected,
            Self::Backend(_) => ErrorKind::Backend,
        }
    }
}

impl InvoiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotConnected => ErrorKind::NotConnected,
            Self::InvalidAmount(_) => ErrorKind::Validation,
            Self::Backend(_) => ErrorKind::Backend,
        }
    }
}

impl PaymentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotConnected => ErrorKind::NotConnected,
            Self::EmptyInvoice => ErrorKind::Validation,
            Self::Backend(_) => ErrorKind::Backend,
        }
    }
}
