use enum_iterator::Sequence;
use std::fmt::Display;

/// RR type codes, eg A, NS, MX. Only the types this core decodes get a
/// variant; everything else falls through to the opaque record arm.
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Sequence)]
pub enum RecordType {
    /// A host address
    A = 1,
    /// Authoritative name server
    NS = 2,
    CNAME = 5, // 5 the canonical name for an alias
    SOA = 6,   // 6 marks the start of a zone of authority
    PTR = 12,  // 12 a domain name pointer
    MX = 15,   // 15 mail exchange
    /// IPv6 records <https://www.rfc-editor.org/rfc/rfc3596#section-2.1>
    AAAA = 28,
    InvalidType = 0,
}

impl From<u16> for RecordType {
    fn from(input: u16) -> Self {
        match input {
            1 => Self::A,
            2 => Self::NS,
            5 => Self::CNAME,
            6 => Self::SOA,
            12 => Self::PTR,
            15 => Self::MX,
            28 => Self::AAAA,
            _ => Self::InvalidType,
        }
    }
}

impl Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            RecordType::A => "A",
            RecordType::NS => "NS",
            RecordType::CNAME => "CNAME",
            RecordType::SOA => "SOA",
            RecordType::PTR => "PTR",
            RecordType::MX => "MX",
            RecordType::AAAA => "AAAA",
            RecordType::InvalidType => "",
        })
    }
}

/// CLASS fields appear in resource records, most entries should be IN.
/// Ref RFC1035 3.2.4.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Sequence)]
pub enum RecordClass {
    /// IN - Internet
    Internet = 1,
    /// CS - CSNET class (Obsolete - used only for examples in some obsolete RFCs)
    CsNet = 2,
    /// CH - Chaos
    Chaos = 3,
    /// Hesiod [Dyer 87]
    Hesiod = 4,

    InvalidType = 0,
}

impl From<u16> for RecordClass {
    fn from(input: u16) -> Self {
        match input {
            1 => Self::Internet,
            2 => Self::CsNet,
            3 => Self::Chaos,
            4 => Self::Hesiod,
            _ => Self::InvalidType,
        }
    }
}

impl Display for RecordClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            RecordClass::Internet => "IN",
            RecordClass::CsNet => "CS",
            RecordClass::Chaos => "CHAOS",
            RecordClass::Hesiod => "HESIOD",
            RecordClass::InvalidType => "Invalid",
        })
    }
}

/// Response code from a name server, as surfaced by the resolver alongside
/// its own error indicator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rcode {
    /// No error condition
    NoError = 0,
    /// Format error - the name server was unable to interpret the query.
    FormatError = 1,
    /// Server failure
    ServFail = 2,
    /// Name error - the queried domain name does not exist (NXDOMAIN).
    NameError = 3,
    /// Not implemented
    NotImplemented = 4,
    /// Refused for policy reasons
    Refused = 5,
    /// 6..15 reserved for future use
    Reserved = 15,
}

impl From<u16> for Rcode {
    fn from(input: u16) -> Self {
        match input {
            0 => Self::NoError,
            1 => Self::FormatError,
            2 => Self::ServFail,
            3 => Self::NameError,
            4 => Self::NotImplemented,
            5 => Self::Refused,
            _ => Self::Reserved,
        }
    }
}

/// Request outcome shared with the caller across the reply channel. The
/// numeric values are part of the wire contract and must not be renumbered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DnsStatus {
    /// At least one answer was delivered.
    Ok = 0,
    /// Transient failure, worth retrying later.
    Retry = 1,
    /// The request can never succeed as posed.
    Invalid = 2,
    /// The domain does not exist.
    NoName = 3,
    /// The domain exists but produced no usable answer.
    NotFound = 4,
}

impl From<DnsStatus> for i32 {
    fn from(status: DnsStatus) -> i32 {
        status as i32
    }
}

impl Display for DnsStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            DnsStatus::Ok => "ok",
            DnsStatus::Retry => "retry",
            DnsStatus::Invalid => "invalid",
            DnsStatus::NoName => "no such name",
            DnsStatus::NotFound => "not found",
        })
    }
}
