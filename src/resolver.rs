use async_trait::async_trait;
use bytes::Bytes;
use std::net::SocketAddr;
use thiserror::Error;

use crate::enums::Rcode;

/// Failure of an address or reverse lookup, getaddrinfo-style. Only the
/// broad shape matters to the orchestrator: any of these counts as "no
/// answer" and is recorded for the logs.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("name or address not known")]
    NotFound,
    #[error("temporary failure in name resolution")]
    TryAgain,
    #[error("non-recoverable failure in name resolution")]
    Fail,
}

/// Failure of a raw record query, the h_errno analogue.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("host not found")]
    HostNotFound,
    #[error("no records of the requested type")]
    NoData,
    #[error("non-recoverable name server error")]
    NoRecovery,
    #[error("temporary name server failure")]
    TryAgain,
}

/// Completion of a raw record query. A no-data completion still carries a
/// decodable payload with an empty answer section, and the rcode is
/// meaningful whenever a response was received at all.
#[derive(Clone, Debug)]
pub struct RawResponse {
    pub payload: Bytes,
    pub error: Option<QueryError>,
    pub rcode: Rcode,
}

/// The asynchronous resolver capability this core drives. Implementations
/// wrap whatever stub resolver the platform provides; retry behavior, TCP
/// fallback and timeouts all live behind this seam.
#[async_trait]
pub trait Resolver: Send + Sync + 'static {
    /// Dual-family A+AAAA lookup of a host name.
    async fn lookup_host(&self, host: &str) -> Result<Vec<SocketAddr>, ResolveError>;

    /// Reverse lookup of a socket address.
    async fn lookup_ptr(&self, addr: SocketAddr) -> Result<String, ResolveError>;

    /// Raw MX query for a domain, returning the undecoded response payload.
    async fn query_mx(&self, domain: &str) -> RawResponse;
}
