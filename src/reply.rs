use std::net::{IpAddr, SocketAddr};

use crate::enums::DnsStatus;

/// Messages streamed back to a caller. Every message echoes the caller's
/// `reply_tag` verbatim; multi-message requests finish with exactly one
/// [DnsReply::HostEnd].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DnsReply {
    /// One resolved address of a host, with the MX preference it came from
    /// (`-1` for a direct host request, `0` for the implicit-MX fallback).
    Host {
        reply_tag: u64,
        addr: SocketAddr,
        preference: i32,
    },
    /// Terminator for host and MX requests.
    HostEnd { reply_tag: u64, status: DnsStatus },
    /// Reverse-lookup answer for the transfer agent. The name is present iff
    /// the status is [DnsStatus::Ok].
    PtrMta {
        reply_tag: u64,
        status: DnsStatus,
        name: Option<String>,
    },
    /// Reverse-lookup answer for the ingress listener.
    PtrSmtp {
        reply_tag: u64,
        status: DnsStatus,
        name: Option<String>,
    },
    /// Preference of a candidate exchange within a domain's MX set, present
    /// iff the status is [DnsStatus::Ok].
    MxPreference {
        reply_tag: u64,
        status: DnsStatus,
        preference: Option<u16>,
    },
}

impl DnsReply {
    /// The caller identifier this message echoes.
    pub fn reply_tag(&self) -> u64 {
        match self {
            DnsReply::Host { reply_tag, .. }
            | DnsReply::HostEnd { reply_tag, .. }
            | DnsReply::PtrMta { reply_tag, .. }
            | DnsReply::PtrSmtp { reply_tag, .. }
            | DnsReply::MxPreference { reply_tag, .. } => *reply_tag,
        }
    }

    fn wire_tag(&self) -> u8 {
        match self {
            DnsReply::Host { .. } => 1,
            DnsReply::HostEnd { .. } => 2,
            DnsReply::PtrMta { .. } => 3,
            DnsReply::PtrSmtp { .. } => 4,
            DnsReply::MxPreference { .. } => 5,
        }
    }
}

/// Fixed-order byte form for the IPC boundary: message tag, then reply tag,
/// then the per-variant fields in declaration order. Socket addresses encode
/// as a family byte (4 or 6), the address octets, and a big-endian port;
/// names as a big-endian u16 length and the bytes.
impl From<&DnsReply> for Vec<u8> {
    fn from(reply: &DnsReply) -> Self {
        let mut out = vec![reply.wire_tag()];
        out.extend(reply.reply_tag().to_be_bytes());
        match reply {
            DnsReply::Host {
                addr, preference, ..
            } => {
                push_sockaddr(&mut out, addr);
                out.extend(preference.to_be_bytes());
            }
            DnsReply::HostEnd { status, .. } => {
                out.extend(i32::from(*status).to_be_bytes());
            }
            DnsReply::PtrMta { status, name, .. } | DnsReply::PtrSmtp { status, name, .. } => {
                out.extend(i32::from(*status).to_be_bytes());
                if *status == DnsStatus::Ok {
                    if let Some(name) = name {
                        out.extend((name.len() as u16).to_be_bytes());
                        out.extend(name.as_bytes());
                    }
                }
            }
            DnsReply::MxPreference {
                status, preference, ..
            } => {
                out.extend(i32::from(*status).to_be_bytes());
                if *status == DnsStatus::Ok {
                    if let Some(preference) = preference {
                        out.extend(preference.to_be_bytes());
                    }
                }
            }
        }
        out
    }
}

fn push_sockaddr(out: &mut Vec<u8>, addr: &SocketAddr) {
    match addr.ip() {
        IpAddr::V4(ip) => {
            out.push(4);
            out.extend(ip.octets());
        }
        IpAddr::V6(ip) => {
            out.push(6);
            out.extend(ip.octets());
        }
    }
    out.extend(addr.port().to_be_bytes());
}
