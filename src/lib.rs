//! DNS resolution core for an outbound mail transfer system.
//!
//! The delivery engine asks three kinds of questions: which hosts accept mail
//! for a domain (MX fan-out with per-exchange A/AAAA resolution), what the
//! preference of a known exchange is, and what the reverse name of a peer
//! address is. Requests arrive as [lookup::DnsRequest] messages on a channel,
//! each carrying the sender half of its own reply channel; answers stream
//! back as [reply::DnsReply] messages, always finishing with exactly one
//! terminal message per request.
//!
//! The actual stub resolver is behind the [resolver::Resolver] trait; this
//! crate drives it and decodes the raw MX responses itself.

use packed_struct::prelude::*;

/// Configuration for the resolution engine.
pub mod config;
pub mod enums;
pub mod error;
/// Bracketed address-literal handling.
pub mod literal;
/// The resolution orchestrator: sessions, dispatch, fan-out.
pub mod lookup;
pub mod reply;
pub mod resolver;
#[cfg(test)]
mod tests;
/// Wire-format decoding of DNS response payloads.
pub mod unpack;

/// Longest on-wire form of a domain name, terminating zero byte included.
pub const MAXDNAME: usize = 255;
/// Longest host name accepted in a request.
pub const HOST_NAME_MAX: usize = 255;
/// The size of a DNS message header.
pub const HEADER_BYTES: usize = 12;
/// Default ceiling on concurrently tracked requests.
pub const MAX_IN_FLIGHT: usize = 512;

/// The header of a DNS message. Ref [RFC1035](https://www.rfc-editor.org/rfc/rfc1035#section-4.1.1) section 4.1.1.
///
/// The sixteen flag bits stay undecoded: the resolver reports rcode and
/// lookup failures out of band, so nothing here branches on them.
#[derive(Debug, PackedStruct, PartialEq, Eq, Clone)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "12")]
pub struct Header {
    /// The query ID the resolver assigned to this transaction.
    #[packed_field(bits = "0..=15", endian = "msb")]
    pub id: u16,
    /// QR, opcode, AA, TC, RD, RA, Z and rcode, packed as on the wire.
    #[packed_field(bits = "16..=31", endian = "msb")]
    pub flags: u16,
    /// Number of entries in the question section.
    #[packed_field(bits = "32..=47", endian = "msb")]
    pub qdcount: u16,
    /// Number of entries in the answer section.
    #[packed_field(bits = "48..=63", endian = "msb")]
    pub ancount: u16,
    /// Number of name server records in the authority section.
    #[packed_field(bits = "64..=79", endian = "msb")]
    pub nscount: u16,
    /// Number of records in the additional section.
    #[packed_field(bits = "80..=95", endian = "msb")]
    pub arcount: u16,
}
