use crate::ip::ip_header::IpHeader;
use crate::packet::errors::HeaderError;
use std::net::Ipv4Addr;

/// An IPv4 datagram: header plus opaque payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternetDatagram {
    pub header: IpHeader,
    pub payload: Vec<u8>,
}

impl InternetDatagram {
    /// Build a datagram with a consistent length and checksum.
    /// Fails when the payload would not fit the 16-bit total length.
    pub fn new(
        src_ip: Ipv4Addr,
        dst_ip: Ipv4Addr,
        protocol: u8,
        payload: Vec<u8>,
    ) -> Result<Self, HeaderError> {
        let total_len = u16::try_from(IpHeader::LENGTH + payload.len()).map_err(|_| {
            HeaderError::Unsupported(format!("IP payload of {} bytes", payload.len()))
        })?;

        let mut header = IpHeader {
            protocol,
            src_ip,
            dst_ip,
            total_len,
            ..Default::default()
        };
        header.compute_checksum();
        Ok(InternetDatagram { header, payload })
    }

    pub fn parse(buf: &[u8]) -> Result<Self, HeaderError> {
        let header = IpHeader::parse(buf)?;

        let total_len = header.total_len as usize;
        if total_len < IpHeader::LENGTH || buf.len() < total_len {
            return Err(HeaderError::too_short(total_len.max(IpHeader::LENGTH), buf.len()));
        }

        // Anything past total_len is link-layer padding
        let payload = buf[IpHeader::LENGTH..total_len].to_vec();
        Ok(InternetDatagram { header, payload })
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = vec![0u8; IpHeader::LENGTH + self.payload.len()];
        // The buffer is sized for the header, so this cannot fail
        let n = self.header.serialize(&mut buf).unwrap_or(IpHeader::LENGTH);
        buf[n..].copy_from_slice(&self.payload);
        buf
    }
}

// -- Unit tests --

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_well_formed() {
        let dgram = InternetDatagram::new(
            Ipv4Addr::new(10, 0, 0, 1),
            Ipv4Addr::new(10, 0, 1, 5),
            17,
            b"payload".to_vec(),
        )
        .unwrap();
        assert_eq!(dgram.header.total_len, 27);
        assert_eq!(dgram.header.ttl, 64);

        let bytes = dgram.serialize();
        assert_eq!(bytes.len(), 27);
        assert_eq!(IpHeader::checksum(&bytes[..20]), 0);
        assert_eq!(InternetDatagram::parse(&bytes).unwrap(), dgram);
    }

    #[test]
    fn test_parse_strips_padding() {
        let dgram = InternetDatagram::new(
            Ipv4Addr::new(1, 2, 3, 4),
            Ipv4Addr::new(5, 6, 7, 8),
            6,
            b"hi".to_vec(),
        )
        .unwrap();
        let mut bytes = dgram.serialize();
        bytes.extend_from_slice(&[0u8; 24]);

        let parsed = InternetDatagram::parse(&bytes).unwrap();
        assert_eq!(parsed.payload, b"hi".to_vec());
    }

    #[test]
    fn test_parse_rejects_truncated_payload() {
        let dgram = InternetDatagram::new(
            Ipv4Addr::new(1, 2, 3, 4),
            Ipv4Addr::new(5, 6, 7, 8),
            6,
            b"hello".to_vec(),
        )
        .unwrap();
        let bytes = dgram.serialize();
        assert_eq!(
            InternetDatagram::parse(&bytes[..22]),
            Err(HeaderError::InvalidBuffer {
                expected: 25,
                actual: 22
            })
        );
    }

    #[test]
    fn test_new_rejects_oversize_payload() {
        let src = Ipv4Addr::new(1, 2, 3, 4);
        let dst = Ipv4Addr::new(5, 6, 7, 8);

        let largest = u16::MAX as usize - IpHeader::LENGTH;
        let dgram = InternetDatagram::new(src, dst, 17, vec![0u8; largest]).unwrap();
        assert_eq!(dgram.header.total_len, u16::MAX);

        assert!(matches!(
            InternetDatagram::new(src, dst, 17, vec![0u8; largest + 1]),
            Err(HeaderError::Unsupported(_))
        ));
    }
}
