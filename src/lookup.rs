use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::HOST_NAME_MAX;
use crate::config::DnsConfig;
use crate::enums::{DnsStatus, Rcode};
use crate::error::MailDnsError;
use crate::literal::{parse_domain_literal, strip_literal_brackets};
use crate::reply::DnsReply;
use crate::resolver::{QueryError, RawResponse, ResolveError, Resolver};
use crate::unpack::{encode_dname, mx_records};

/// Sender half of a caller's reply channel.
pub type ReplySender = mpsc::UnboundedSender<DnsReply>;

/// Requests the resolution engine services. Each carries the caller's opaque
/// `reply_tag`, echoed in every message sent back on `reply`.
#[derive(Debug)]
pub enum DnsRequest {
    /// Resolve the A and AAAA records of one host name.
    Host {
        reply_tag: u64,
        host: String,
        reply: ReplySender,
    },
    /// Reverse-resolve a peer address for the transfer agent.
    PtrMta {
        reply_tag: u64,
        addr: SocketAddr,
        reply: ReplySender,
    },
    /// Reverse-resolve a peer address for the ingress listener.
    PtrSmtp {
        reply_tag: u64,
        addr: SocketAddr,
        reply: ReplySender,
    },
    /// Resolve a domain's MX set, then the addresses of every exchange.
    Mx {
        reply_tag: u64,
        domain: String,
        reply: ReplySender,
    },
    /// Find a candidate host in a domain's MX set and report its preference.
    MxPreference {
        reply_tag: u64,
        domain: String,
        mx: String,
        reply: ReplySender,
    },
}

/// Create the inbound request channel at the configured depth.
pub fn request_channel(
    config: &DnsConfig,
) -> (mpsc::Sender<DnsRequest>, mpsc::Receiver<DnsRequest>) {
    mpsc::channel(config.request_queue.max(1))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RequestKind {
    Host,
    PtrMta,
    PtrSmtp,
    Mx,
    MxPreference,
}

/// One in-flight request. Sessions live in the engine's table, keyed by a
/// monotonically increasing id; sub-lookup tasks carry only the id.
struct Session {
    reply_tag: u64,
    reply: ReplySender,
    kind: RequestKind,
    /// Origin domain for MX requests, candidate exchange for preference
    /// requests, unused otherwise.
    name: String,
    /// Addresses emitted so far across all sub-lookups.
    found: usize,
    /// Last sub-lookup failure, kept for the logs only.
    error: Option<ResolveError>,
    /// Unfinished sub-lookups. The terminator fires when this reaches zero.
    outstanding: usize,
}

impl Session {
    fn new(reply_tag: u64, reply: ReplySender, kind: RequestKind, name: String) -> Self {
        Session {
            reply_tag,
            reply,
            kind,
            name,
            found: 0,
            error: None,
            outstanding: 0,
        }
    }

    /// Best-effort send: a caller that went away stops receiving, and the
    /// session drains the rest of its lookups into the void.
    fn send(&self, message: DnsReply) {
        if self.reply.send(message).is_err() {
            debug!("reply channel closed for request {:#x}", self.reply_tag);
        }
    }
}

/// Completions flowing back from spawned sub-lookup tasks.
enum Completion {
    Host {
        session: u64,
        preference: i32,
        result: Result<Vec<SocketAddr>, ResolveError>,
    },
    Ptr {
        session: u64,
        result: Result<String, ResolveError>,
    },
    MxSet {
        session: u64,
        response: RawResponse,
    },
    MxPreference {
        session: u64,
        response: RawResponse,
    },
}

type DoneSender = mpsc::UnboundedSender<Completion>;

/// Service loop for the resolution engine. Requests arrive on `rx`;
/// sub-lookup completions are fed back over an internal channel and may
/// interleave arbitrarily. The loop ends once the request channel closes and
/// every session has drained.
pub async fn manager(
    mut rx: mpsc::Receiver<DnsRequest>,
    resolver: Arc<dyn Resolver>,
    config: DnsConfig,
) -> Result<(), MailDnsError> {
    let (done_tx, mut done_rx) = mpsc::unbounded_channel();
    let mut engine = Engine {
        sessions: HashMap::new(),
        next_id: 0,
        max_in_flight: config.max_in_flight,
        resolver,
        done_tx,
    };
    let mut inbound_open = true;

    while inbound_open || !engine.sessions.is_empty() {
        tokio::select! {
            request = rx.recv(), if inbound_open => match request {
                Some(request) => engine.dispatch(request),
                None => inbound_open = false,
            },
            Some(done) = done_rx.recv() => engine.complete(done),
        }
    }
    Ok(())
}

struct Engine {
    sessions: HashMap<u64, Session>,
    next_id: u64,
    max_in_flight: usize,
    resolver: Arc<dyn Resolver>,
    done_tx: DoneSender,
}

impl Engine {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn dispatch(&mut self, request: DnsRequest) {
        if self.sessions.len() >= self.max_in_flight {
            warn!("session table full, shedding request");
            shed(request);
            return;
        }
        match request {
            DnsRequest::Host {
                reply_tag,
                host,
                reply,
            } => {
                debug!("host request {reply_tag:#x} for {host:?}");
                let id = self.allocate_id();
                let mut session = Session::new(reply_tag, reply, RequestKind::Host, String::new());
                spawn_host_lookup(&self.resolver, &self.done_tx, &mut session, id, &host, -1);
                self.sessions.insert(id, session);
            }
            DnsRequest::PtrMta {
                reply_tag,
                addr,
                reply,
            } => self.start_ptr(reply_tag, addr, reply, RequestKind::PtrMta),
            DnsRequest::PtrSmtp {
                reply_tag,
                addr,
                reply,
            } => self.start_ptr(reply_tag, addr, reply, RequestKind::PtrSmtp),
            DnsRequest::Mx {
                reply_tag,
                domain,
                reply,
            } => {
                debug!("mx request {reply_tag:#x} for {domain:?}");
                if let Some(addr) = parse_domain_literal(&domain) {
                    // Address literals never touch the resolver.
                    let _ = reply.send(DnsReply::Host {
                        reply_tag,
                        addr,
                        preference: -1,
                    });
                    let _ = reply.send(DnsReply::HostEnd {
                        reply_tag,
                        status: DnsStatus::Ok,
                    });
                    return;
                }
                if let Err(err) = encode_dname(&domain) {
                    warn!("cannot submit mx query for {domain:?}: {err}");
                    let _ = reply.send(DnsReply::HostEnd {
                        reply_tag,
                        status: DnsStatus::Invalid,
                    });
                    return;
                }
                let id = self.allocate_id();
                let session = Session::new(reply_tag, reply, RequestKind::Mx, domain.clone());
                self.spawn_mx_query(id, domain, RequestKind::Mx);
                self.sessions.insert(id, session);
            }
            DnsRequest::MxPreference {
                reply_tag,
                domain,
                mx,
                reply,
            } => {
                debug!("mx preference request {reply_tag:#x} for {mx:?} in {domain:?}");
                if mx.len() > HOST_NAME_MAX || encode_dname(&domain).is_err() {
                    warn!("cannot submit mx query for {domain:?}");
                    let _ = reply.send(DnsReply::MxPreference {
                        reply_tag,
                        status: DnsStatus::Invalid,
                        preference: None,
                    });
                    return;
                }
                let id = self.allocate_id();
                let session = Session::new(reply_tag, reply, RequestKind::MxPreference, mx);
                self.spawn_mx_query(id, domain, RequestKind::MxPreference);
                self.sessions.insert(id, session);
            }
        }
    }

    fn start_ptr(
        &mut self,
        reply_tag: u64,
        addr: SocketAddr,
        reply: ReplySender,
        kind: RequestKind,
    ) {
        debug!("ptr request {reply_tag:#x} for {addr}");
        let id = self.allocate_id();
        let session = Session::new(reply_tag, reply, kind, String::new());
        let resolver = Arc::clone(&self.resolver);
        let done_tx = self.done_tx.clone();
        tokio::spawn(async move {
            let result = resolver.lookup_ptr(addr).await;
            let _ = done_tx.send(Completion::Ptr {
                session: id,
                result,
            });
        });
        self.sessions.insert(id, session);
    }

    fn spawn_mx_query(&self, id: u64, domain: String, kind: RequestKind) {
        let resolver = Arc::clone(&self.resolver);
        let done_tx = self.done_tx.clone();
        tokio::spawn(async move {
            let response = resolver.query_mx(&domain).await;
            let done = match kind {
                RequestKind::MxPreference => Completion::MxPreference {
                    session: id,
                    response,
                },
                _ => Completion::MxSet {
                    session: id,
                    response,
                },
            };
            let _ = done_tx.send(done);
        });
    }

    fn complete(&mut self, done: Completion) {
        match done {
            Completion::Host {
                session,
                preference,
                result,
            } => self.finish_host_lookup(session, preference, result),
            Completion::Ptr { session, result } => self.finish_ptr(session, result),
            Completion::MxSet { session, response } => self.finish_mx_set(session, response),
            Completion::MxPreference { session, response } => {
                self.finish_mx_preference(session, response)
            }
        }
    }

    fn finish_host_lookup(
        &mut self,
        id: u64,
        preference: i32,
        result: Result<Vec<SocketAddr>, ResolveError>,
    ) {
        let Some(session) = self.sessions.get_mut(&id) else {
            error!("host lookup completed for unknown session {id}");
            return;
        };
        match result {
            Ok(addrs) => {
                for addr in addrs {
                    session.found += 1;
                    session.send(DnsReply::Host {
                        reply_tag: session.reply_tag,
                        addr,
                        preference,
                    });
                }
            }
            Err(err) => session.error = Some(err),
        }
        session.outstanding -= 1;
        if session.outstanding > 0 {
            return;
        }
        let status = if session.found > 0 {
            DnsStatus::Ok
        } else {
            DnsStatus::NotFound
        };
        if let Some(err) = session.error {
            debug!(
                "request {:#x} had a failed lookup: {err}",
                session.reply_tag
            );
        }
        session.send(DnsReply::HostEnd {
            reply_tag: session.reply_tag,
            status,
        });
        self.sessions.remove(&id);
    }

    fn finish_ptr(&mut self, id: u64, result: Result<String, ResolveError>) {
        let Some(session) = self.sessions.remove(&id) else {
            error!("ptr lookup completed for unknown session {id}");
            return;
        };
        let (status, name) = match result {
            Ok(name) => (DnsStatus::Ok, Some(name)),
            Err(_) => (DnsStatus::NotFound, None),
        };
        let reply_tag = session.reply_tag;
        let message = match session.kind {
            RequestKind::PtrMta => DnsReply::PtrMta {
                reply_tag,
                status,
                name,
            },
            RequestKind::PtrSmtp => DnsReply::PtrSmtp {
                reply_tag,
                status,
                name,
            },
            kind => {
                error!("ptr completion for a {kind:?} session");
                return;
            }
        };
        session.send(message);
    }

    fn finish_mx_set(&mut self, id: u64, response: RawResponse) {
        if let Some(err) = response.error {
            if err != QueryError::NoData {
                let Some(session) = self.sessions.remove(&id) else {
                    error!("mx query completed for unknown session {id}");
                    return;
                };
                let status = if response.rcode == Rcode::NameError {
                    DnsStatus::NoName
                } else if err == QueryError::NoRecovery {
                    DnsStatus::Invalid
                } else {
                    DnsStatus::Retry
                };
                session.send(DnsReply::HostEnd {
                    reply_tag: session.reply_tag,
                    status,
                });
                return;
            }
        }

        let (records, truncated) = mx_records(&response.payload);
        if let Some(err) = truncated {
            let prefix = &response.payload[..response.payload.len().min(64)];
            warn!(
                "mx response for session {id} cut short ({err}), keeping {} records; payload starts {}",
                records.len(),
                hex::encode(prefix),
            );
        }
        let resolver = Arc::clone(&self.resolver);
        let done_tx = self.done_tx.clone();
        let Some(session) = self.sessions.get_mut(&id) else {
            error!("mx query completed for unknown session {id}");
            return;
        };
        if records.is_empty() {
            // No MX at all: fall back to the domain itself, RFC 5321 5.1.
            let name = session.name.clone();
            spawn_host_lookup(&resolver, &done_tx, session, id, &name, 0);
        } else {
            for record in records {
                spawn_host_lookup(
                    &resolver,
                    &done_tx,
                    session,
                    id,
                    &record.exchange,
                    record.preference as i32,
                );
            }
        }
    }

    fn finish_mx_preference(&mut self, id: u64, response: RawResponse) {
        let Some(session) = self.sessions.remove(&id) else {
            error!("mx query completed for unknown session {id}");
            return;
        };
        let (status, preference) = if let Some(err) = response.error {
            let status = if response.rcode == Rcode::NameError {
                DnsStatus::NoName
            } else if matches!(err, QueryError::NoRecovery | QueryError::NoData) {
                DnsStatus::Invalid
            } else {
                DnsStatus::Retry
            };
            (status, None)
        } else {
            let (records, truncated) = mx_records(&response.payload);
            if let Some(err) = truncated {
                warn!("mx response for session {id} cut short ({err})");
            }
            match records
                .iter()
                .find(|record| record.exchange.eq_ignore_ascii_case(&session.name))
            {
                Some(record) => (DnsStatus::Ok, Some(record.preference)),
                None => (DnsStatus::NotFound, None),
            }
        };
        session.send(DnsReply::MxPreference {
            reply_tag: session.reply_tag,
            status,
            preference,
        });
    }
}

/// Schedule one dual-family address lookup on behalf of a session, bumping
/// its refcount. Bracketed literal hosts are unwrapped first.
fn spawn_host_lookup(
    resolver: &Arc<dyn Resolver>,
    done_tx: &DoneSender,
    session: &mut Session,
    id: u64,
    host: &str,
    preference: i32,
) {
    session.outstanding += 1;
    let host = strip_literal_brackets(host).to_string();
    let resolver = Arc::clone(resolver);
    let done_tx = done_tx.clone();
    tokio::spawn(async move {
        let result = resolver.lookup_host(&host).await;
        let _ = done_tx.send(Completion::Host {
            session: id,
            preference,
            result,
        });
    });
}

/// Terminal answer for a request the engine refuses to track.
fn shed(request: DnsRequest) {
    let (reply, message) = match &request {
        DnsRequest::Host { reply_tag, reply, .. } | DnsRequest::Mx { reply_tag, reply, .. } => (
            reply,
            DnsReply::HostEnd {
                reply_tag: *reply_tag,
                status: DnsStatus::Retry,
            },
        ),
        DnsRequest::PtrMta { reply_tag, reply, .. } => (
            reply,
            DnsReply::PtrMta {
                reply_tag: *reply_tag,
                status: DnsStatus::Retry,
                name: None,
            },
        ),
        DnsRequest::PtrSmtp { reply_tag, reply, .. } => (
            reply,
            DnsReply::PtrSmtp {
                reply_tag: *reply_tag,
                status: DnsStatus::Retry,
                name: None,
            },
        ),
        DnsRequest::MxPreference { reply_tag, reply, .. } => (
            reply,
            DnsReply::MxPreference {
                reply_tag: *reply_tag,
                status: DnsStatus::Retry,
                preference: None,
            },
        ),
    };
    let _ = reply.send(message);
}
