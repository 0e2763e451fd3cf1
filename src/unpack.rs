use packed_struct::prelude::*;
use std::net::{Ipv4Addr, Ipv6Addr};
use thiserror::Error;

use crate::enums::{RecordClass, RecordType};
use crate::{HEADER_BYTES, Header, MAXDNAME};

/// Why a payload failed to decode. The walk over an answer section stops at
/// the first of these; everything decoded before it stays valid.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum UnpackError {
    #[error("too short")]
    TooShort,
    #[error("bad domain name")]
    BadName,
    #[error("domain name too long")]
    NameTooLong,
    #[error("bad dlen")]
    BadDataLength,
}

/// A question section entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Question {
    /// Wire-form name being queried.
    pub qname: Vec<u8>,
    pub qtype: RecordType,
    pub qclass: RecordClass,
}

/// One decoded resource record. `Other` bodies borrow from the response
/// buffer, so the record cannot outlive the decode of the payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceRecord<'a> {
    /// Wire-form owner name.
    pub name: Vec<u8>,
    pub record_type: RecordType,
    pub class: RecordClass,
    pub ttl: u32,
    pub rdata: RecordData<'a>,
}

/// The typed body of a resource record. Types outside this core's interest,
/// and A/AAAA outside class IN, are carried opaquely.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordData<'a> {
    Cname(Vec<u8>),
    Mx { preference: u16, exchange: Vec<u8> },
    Ns(Vec<u8>),
    Ptr(Vec<u8>),
    Soa {
        mname: Vec<u8>,
        rname: Vec<u8>,
        serial: u32,
        refresh: u32,
        retry: u32,
        expire: u32,
        minimum: u32,
    },
    A(Ipv4Addr),
    Aaaa(Ipv6Addr),
    Other(&'a [u8]),
}

/// Cursor over an immutable response buffer. Every read is bounds-checked;
/// failures propagate with `?` so a partly-consumed cursor is never reused.
pub struct Unpacker<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> Unpacker<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Unpacker { buf, offset: 0 }
    }

    /// Current byte position in the buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.offset
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], UnpackError> {
        if self.remaining() < len {
            return Err(UnpackError::TooShort);
        }
        let bytes = &self.buf[self.offset..self.offset + len];
        self.offset += len;
        Ok(bytes)
    }

    pub fn read_u16(&mut self) -> Result<u16, UnpackError> {
        let bytes = self.take(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32, UnpackError> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_in_addr(&mut self) -> Result<Ipv4Addr, UnpackError> {
        let bytes = self.take(4)?;
        Ok(Ipv4Addr::new(bytes[0], bytes[1], bytes[2], bytes[3]))
    }

    fn read_in6_addr(&mut self) -> Result<Ipv6Addr, UnpackError> {
        let bytes = self.take(16)?;
        let mut octets = [0u8; 16];
        octets.copy_from_slice(bytes);
        Ok(Ipv6Addr::from(octets))
    }

    /// Expand a possibly-compressed domain name at the cursor, advancing past
    /// the first name encountered (never past a pointer target).
    pub fn read_dname(&mut self) -> Result<Vec<u8>, UnpackError> {
        let (name, end) = dname_expand(self.buf, self.offset)?;
        self.offset = end;
        Ok(name)
    }

    pub fn read_header(&mut self) -> Result<Header, UnpackError> {
        let bytes = self.take(HEADER_BYTES)?;
        let mut fixed = [0u8; HEADER_BYTES];
        fixed.copy_from_slice(bytes);
        Header::unpack(&fixed).map_err(|_| UnpackError::TooShort)
    }

    pub fn read_question(&mut self) -> Result<Question, UnpackError> {
        Ok(Question {
            qname: self.read_dname()?,
            qtype: RecordType::from(self.read_u16()?),
            qclass: RecordClass::from(self.read_u16()?),
        })
    }

    pub fn read_rr(&mut self) -> Result<ResourceRecord<'a>, UnpackError> {
        let name = self.read_dname()?;
        let record_type = RecordType::from(self.read_u16()?);
        let class = RecordClass::from(self.read_u16()?);
        let ttl = self.read_u32()?;
        let rdlength = self.read_u16()? as usize;
        if self.remaining() < rdlength {
            return Err(UnpackError::TooShort);
        }
        let body_start = self.offset;
        let rdata = match (record_type, class) {
            (RecordType::CNAME, _) => RecordData::Cname(self.read_dname()?),
            (RecordType::MX, _) => RecordData::Mx {
                preference: self.read_u16()?,
                exchange: self.read_dname()?,
            },
            (RecordType::NS, _) => RecordData::Ns(self.read_dname()?),
            (RecordType::PTR, _) => RecordData::Ptr(self.read_dname()?),
            (RecordType::SOA, _) => RecordData::Soa {
                mname: self.read_dname()?,
                rname: self.read_dname()?,
                serial: self.read_u32()?,
                refresh: self.read_u32()?,
                retry: self.read_u32()?,
                expire: self.read_u32()?,
                minimum: self.read_u32()?,
            },
            (RecordType::A, RecordClass::Internet) => RecordData::A(self.read_in_addr()?),
            (RecordType::AAAA, RecordClass::Internet) => RecordData::Aaaa(self.read_in6_addr()?),
            _ => RecordData::Other(self.take(rdlength)?),
        };
        // make sure the advertised rdlength was really consumed
        if self.offset - body_start != rdlength {
            return Err(UnpackError::BadDataLength);
        }
        Ok(ResourceRecord {
            name,
            record_type,
            class,
            ttl,
            rdata,
        })
    }
}

/// Expand the compressed name starting at `offset`, returning its wire form
/// (length-prefixed labels, zero-terminated) and the offset just past the
/// first pointer-free segment. A pointer must aim strictly below the start
/// of the segment being expanded, which rules out forward references and
/// loops; after one is followed the returned offset is frozen at two bytes
/// past it.
pub(crate) fn dname_expand(data: &[u8], offset: usize) -> Result<(Vec<u8>, usize), UnpackError> {
    if offset >= data.len() {
        return Err(UnpackError::BadName);
    }
    let mut name = Vec::new();
    let mut offset = offset;
    let mut start = offset;
    let mut end = offset;

    loop {
        if offset >= data.len() {
            return Err(UnpackError::BadName);
        }
        let n = data[offset] as usize;
        if n == 0 {
            break;
        }
        if n & 0xc0 == 0xc0 {
            if offset + 2 > data.len() {
                return Err(UnpackError::BadName);
            }
            let target = ((n & 0x3f) << 8) | data[offset + 1] as usize;
            if target >= start {
                return Err(UnpackError::BadName);
            }
            if end < offset + 2 {
                end = offset + 2;
            }
            offset = target;
            start = target;
            continue;
        }
        if offset + n + 1 > data.len() {
            return Err(UnpackError::BadName);
        }
        name.extend_from_slice(&data[offset..offset + n + 1]);
        if name.len() + 1 > MAXDNAME {
            return Err(UnpackError::NameTooLong);
        }
        offset += n + 1;
        if end < offset {
            end = offset;
        }
    }
    if end < offset + 1 {
        end = offset + 1;
    }
    name.push(0);
    Ok((name, end))
}

/// Dotted printable form of a wire-form name. Always carries a trailing dot;
/// the root is a lone `.`.
pub fn print_dname(dname: &[u8]) -> String {
    if dname.is_empty() || dname[0] == 0 {
        return ".".to_string();
    }
    let mut out = String::new();
    let mut at = 0;
    while at < dname.len() {
        let n = dname[at] as usize;
        if n == 0 {
            break;
        }
        let next = (at + 1 + n).min(dname.len());
        out.push_str(&String::from_utf8_lossy(&dname[at + 1..next]));
        out.push('.');
        at = next;
    }
    out
}

/// Encode a dotted host name into wire form. One trailing dot is tolerated;
/// the empty name encodes the root. Rejects empty labels, labels over 63
/// bytes, and names whose wire form would exceed [MAXDNAME].
pub fn encode_dname(name: &str) -> Result<Vec<u8>, UnpackError> {
    let trimmed = name.strip_suffix('.').unwrap_or(name);
    let mut out = Vec::with_capacity(trimmed.len() + 2);
    if !trimmed.is_empty() {
        for label in trimmed.split('.') {
            if label.is_empty() || label.len() > 63 {
                return Err(UnpackError::BadName);
            }
            out.push(label.len() as u8);
            out.extend_from_slice(label.as_bytes());
        }
    }
    out.push(0);
    if out.len() > MAXDNAME {
        return Err(UnpackError::NameTooLong);
    }
    Ok(out)
}

/// One entry of a domain's MX set, ready for a host lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MxRecord {
    pub preference: u16,
    /// Printable exchange name, trailing dot already stripped.
    pub exchange: String,
}

/// Walk a raw MX response and collect the exchanges from its answer section.
/// A decode error ends the walk; whatever was extracted before it is
/// returned alongside the error so the caller can log the truncation and
/// carry on with the partial set.
pub fn mx_records(payload: &[u8]) -> (Vec<MxRecord>, Option<UnpackError>) {
    let mut records = Vec::new();
    let mut cursor = Unpacker::new(payload);
    let header = match cursor.read_header() {
        Ok(header) => header,
        Err(err) => return (records, Some(err)),
    };
    for _ in 0..header.qdcount {
        if let Err(err) = cursor.read_question() {
            return (records, Some(err));
        }
    }
    for _ in 0..header.ancount {
        let rr = match cursor.read_rr() {
            Ok(rr) => rr,
            Err(err) => return (records, Some(err)),
        };
        if let RecordData::Mx {
            preference,
            exchange,
        } = rr.rdata
        {
            let mut exchange = print_dname(&exchange);
            exchange.pop();
            records.push(MxRecord {
                preference,
                exchange,
            });
        }
    }
    (records, None)
}
