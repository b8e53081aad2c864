use crate::packet::errors::HeaderError;
use std::fmt;
use std::str::FromStr;

/// A six-octet Ethernet II address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EthernetAddress(pub [u8; 6]);

impl EthernetAddress {
    pub const BROADCAST: EthernetAddress = EthernetAddress([0xff; 6]);
    pub const ZERO: EthernetAddress = EthernetAddress([0; 6]);

    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }

    pub fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl fmt::Display for EthernetAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl FromStr for EthernetAddress {
    type Err = HeaderError;

    /// Parse `aa:bb:cc:dd:ee:ff`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits: String = s.split(':').collect();
        let bytes = hex::decode(&digits)
            .map_err(|err| HeaderError::Unsupported(format!("Ethernet address {s:?}: {err}")))?;
        let octets: [u8; 6] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| HeaderError::too_short(6, bytes.len()))?;
        Ok(EthernetAddress(octets))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EthernetHeader {
    pub dst: EthernetAddress,
    pub src: EthernetAddress,
    pub ether_type: u16,
}

impl EthernetHeader {
    pub const LENGTH: usize = 14;
    pub const TYPE_IPV4: u16 = 0x0800;
    pub const TYPE_ARP: u16 = 0x0806;

    pub fn parse(buf: &[u8]) -> Result<Self, HeaderError> {
        if buf.len() < Self::LENGTH {
            return Err(HeaderError::too_short(Self::LENGTH, buf.len()));
        }

        let mut dst = [0u8; 6];
        let mut src = [0u8; 6];
        dst.copy_from_slice(&buf[0..6]);
        src.copy_from_slice(&buf[6..12]);
        let ether_type = u16::from_be_bytes([buf[12], buf[13]]);

        Ok(EthernetHeader {
            dst: EthernetAddress(dst),
            src: EthernetAddress(src),
            ether_type,
        })
    }

    pub fn serialize(&self, buf: &mut [u8]) -> Result<usize, HeaderError> {
        if buf.len() < Self::LENGTH {
            return Err(HeaderError::too_short(Self::LENGTH, buf.len()));
        }

        buf[0..6].copy_from_slice(&self.dst.octets());
        buf[6..12].copy_from_slice(&self.src.octets());
        buf[12..14].copy_from_slice(&self.ether_type.to_be_bytes());
        Ok(Self::LENGTH)
    }
}

/// An Ethernet frame as handed to and received from the link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EthernetFrame {
    pub header: EthernetHeader,
    pub payload: Vec<u8>,
}

impl EthernetFrame {
    pub fn parse(buf: &[u8]) -> Result<Self, HeaderError> {
        let header = EthernetHeader::parse(buf)?;
        Ok(EthernetFrame {
            header,
            payload: buf[EthernetHeader::LENGTH..].to_vec(),
        })
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = vec![0u8; EthernetHeader::LENGTH + self.payload.len()];
        let n = self.header.serialize(&mut buf).unwrap_or(EthernetHeader::LENGTH);
        buf[n..].copy_from_slice(&self.payload);
        buf
    }
}

// -- Unit tests --

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::test_utils;

    #[test]
    fn test_address_display_and_parse() {
        let addr = EthernetAddress([0x02, 0, 0, 0, 0xab, 0x0c]);
        assert_eq!(addr.to_string(), "02:00:00:00:ab:0c");
        assert_eq!("02:00:00:00:ab:0c".parse::<EthernetAddress>(), Ok(addr));
        assert!("02:00:00".parse::<EthernetAddress>().is_err());
        assert!("zz:00:00:00:00:00".parse::<EthernetAddress>().is_err());
        assert!(EthernetAddress::BROADCAST.is_broadcast());
    }

    #[test]
    fn test_header_from_bytes() {
        let bytes = hex::decode(test_utils::get_ethernet_header_hex()).unwrap();
        let header = EthernetHeader::parse(&bytes).unwrap();
        assert_eq!(header.dst, EthernetAddress::BROADCAST);
        assert_eq!(header.src, EthernetAddress([2, 0, 0, 0, 0, 2]));
        assert_eq!(header.ether_type, EthernetHeader::TYPE_ARP);

        let mut buf = [0u8; 14];
        assert_eq!(header.serialize(&mut buf), Ok(14));
        assert_eq!(buf.to_vec(), bytes);
    }

    #[test]
    fn test_frame_round_trip() {
        let frame = EthernetFrame {
            header: EthernetHeader {
                dst: EthernetAddress([1, 2, 3, 4, 5, 6]),
                src: EthernetAddress([6, 5, 4, 3, 2, 1]),
                ether_type: EthernetHeader::TYPE_IPV4,
            },
            payload: b"data".to_vec(),
        };
        let bytes = frame.serialize();
        assert_eq!(bytes.len(), 18);
        assert_eq!(EthernetFrame::parse(&bytes), Ok(frame));
    }

    #[test]
    fn test_parse_short_frame() {
        assert_eq!(
            EthernetFrame::parse(&[0u8; 13]),
            Err(HeaderError::InvalidBuffer {
                expected: 14,
                actual: 13
            })
        );
    }
}
