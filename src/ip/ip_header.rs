use crate::ip::ip_flags::IpFlags;
use crate::packet::errors::HeaderError;
use std::net::Ipv4Addr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpHeader {
    pub version: u8, // Always 4 for IPv4
    pub ihl: u8,     // Always 5 since we have no options
    pub tos: u8,
    pub total_len: u16,
    pub id: u16,
    pub flags: IpFlags,   // 3 bits, part of u16
    pub frag_offset: u16, // 13 bits, part of u16
    pub ttl: u8,
    pub protocol: u8,
    pub checksum: u16,
    pub src_ip: Ipv4Addr,
    pub dst_ip: Ipv4Addr,
}

impl IpHeader {
    pub const LENGTH: usize = 20;
    pub const DEFAULT_TTL: u8 = 64;

    /// Serialize an `IpHeader` into a byte array of size 20.
    /// The stored `checksum` is written as is; see `compute_checksum`.
    pub fn serialize(&self, buf: &mut [u8]) -> Result<usize, HeaderError> {
        if buf.len() < Self::LENGTH {
            return Err(HeaderError::too_short(Self::LENGTH, buf.len()));
        }

        self.write_fields(buf);
        buf[10..12].copy_from_slice(&self.checksum.to_be_bytes());

        Ok(Self::LENGTH)
    }

    /// Parse a byte array into an `IpHeader`.
    pub fn parse(buf: &[u8]) -> Result<Self, HeaderError> {
        if buf.len() < Self::LENGTH {
            return Err(HeaderError::too_short(Self::LENGTH, buf.len()));
        }

        let version = buf[0] >> 4;
        let ihl = buf[0] & 0x0f;
        if version != 4 {
            return Err(HeaderError::Unsupported(format!("IP version {version}")));
        }
        if ihl != 5 {
            return Err(HeaderError::Unsupported(format!("IP header length {ihl}")));
        }

        if Self::checksum(&buf[0..Self::LENGTH]) != 0 {
            return Err(HeaderError::BadChecksum("IP".to_string()));
        };

        let tos = buf[1];
        let total_len = u16::from_be_bytes([buf[2], buf[3]]);
        let id = u16::from_be_bytes([buf[4], buf[5]]);
        let combo_flags = u16::from_be_bytes([buf[6], buf[7]]);
        let (flags, frag_offset) = IpFlags::unpack(combo_flags);
        let ttl = buf[8];
        let protocol = buf[9];
        let checksum = u16::from_be_bytes([buf[10], buf[11]]);
        let src_ip = Ipv4Addr::new(buf[12], buf[13], buf[14], buf[15]);
        let dst_ip = Ipv4Addr::new(buf[16], buf[17], buf[18], buf[19]);

        Ok(IpHeader {
            version,
            ihl,
            tos,
            total_len,
            id,
            flags,
            frag_offset,
            ttl,
            protocol,
            checksum,
            src_ip,
            dst_ip,
        })
    }

    /// Recompute `checksum` from the other fields. Call after any field changes.
    pub fn compute_checksum(&mut self) {
        let mut buf = [0u8; Self::LENGTH];
        self.write_fields(&mut buf);
        self.checksum = Self::checksum(&buf);
    }

    /// Compute the checksum for an `IpHeader` (Ipv4).
    /// Wiki: https://en.wikipedia.org/wiki/IPv4_header_checksum.
    pub fn checksum(data: &[u8]) -> u16 {
        // Sum every 2 bytes as a 16-bit value
        let mut sum: u32 = data
            .chunks(2)
            .map(|chunk| u16::from_be_bytes([chunk[0], *chunk.get(1).unwrap_or(&0)]) as u32)
            .sum();

        // Fold the carry bits
        while sum >> 16 != 0 {
            sum = (sum & 0xffff) + (sum >> 16);
        }
        !(sum as u16)
    }

    /// Every field but the checksum, which is left zeroed
    fn write_fields(&self, buf: &mut [u8]) {
        buf[0] = (self.version << 4) | self.ihl;
        buf[1] = self.tos;
        buf[2..4].copy_from_slice(&self.total_len.to_be_bytes());
        buf[4..6].copy_from_slice(&self.id.to_be_bytes());
        let flags = self.flags.pack(self.frag_offset);
        buf[6..8].copy_from_slice(&flags.to_be_bytes());
        buf[8] = self.ttl;
        buf[9] = self.protocol;
        buf[10..12].fill(0);
        buf[12..16].copy_from_slice(&self.src_ip.octets());
        buf[16..20].copy_from_slice(&self.dst_ip.octets());
    }
}

impl Default for IpHeader {
    fn default() -> Self {
        IpHeader {
            version: 4,
            ihl: 5,
            tos: 0,
            total_len: Self::LENGTH as u16,
            id: 0,
            flags: IpFlags::DF,
            frag_offset: 0,
            ttl: Self::DEFAULT_TTL,
            protocol: 0,
            checksum: 0,
            src_ip: Ipv4Addr::UNSPECIFIED,
            dst_ip: Ipv4Addr::UNSPECIFIED,
        }
    }
}

// -- Unit tests --
