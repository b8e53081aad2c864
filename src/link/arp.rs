use crate::link::ethernet::{EthernetAddress, EthernetHeader};
use crate::packet::errors::HeaderError;
use std::net::Ipv4Addr;

/// An ARP message for Ethernet hardware and IPv4 protocol addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArpMessage {
    pub opcode: u16,
    pub sender_ethernet_address: EthernetAddress,
    pub sender_ip_address: Ipv4Addr,
    pub target_ethernet_address: EthernetAddress,
    pub target_ip_address: Ipv4Addr,
}

impl ArpMessage {
    pub const LENGTH: usize = 28;
    pub const OPCODE_REQUEST: u16 = 1;
    pub const OPCODE_REPLY: u16 = 2;

    const TYPE_ETHERNET: u16 = 1;

    pub fn request(
        sender_ethernet_address: EthernetAddress,
        sender_ip_address: Ipv4Addr,
        target_ip_address: Ipv4Addr,
    ) -> Self {
        ArpMessage {
            opcode: Self::OPCODE_REQUEST,
            sender_ethernet_address,
            sender_ip_address,
            target_ethernet_address: EthernetAddress::ZERO,
            target_ip_address,
        }
    }

    pub fn reply(
        sender_ethernet_address: EthernetAddress,
        sender_ip_address: Ipv4Addr,
        target_ethernet_address: EthernetAddress,
        target_ip_address: Ipv4Addr,
    ) -> Self {
        ArpMessage {
            opcode: Self::OPCODE_REPLY,
            sender_ethernet_address,
            sender_ip_address,
            target_ethernet_address,
            target_ip_address,
        }
    }

    pub fn is_request(&self) -> bool {
        self.opcode == Self::OPCODE_REQUEST
    }

    pub fn is_reply(&self) -> bool {
        self.opcode == Self::OPCODE_REPLY
    }

    pub fn parse(buf: &[u8]) -> Result<Self, HeaderError> {
        if buf.len() < Self::LENGTH {
            return Err(HeaderError::too_short(Self::LENGTH, buf.len()));
        }

        let hardware_type = u16::from_be_bytes([buf[0], buf[1]]);
        let protocol_type = u16::from_be_bytes([buf[2], buf[3]]);
        let hardware_len = buf[4];
        let protocol_len = buf[5];
        if hardware_type != Self::TYPE_ETHERNET
            || protocol_type != EthernetHeader::TYPE_IPV4
            || hardware_len != 6
            || protocol_len != 4
        {
            return Err(HeaderError::Unsupported(format!(
                "ARP hardware/protocol {hardware_type:#06x}/{protocol_type:#06x}"
            )));
        }

        let opcode = u16::from_be_bytes([buf[6], buf[7]]);
        if opcode != Self::OPCODE_REQUEST && opcode != Self::OPCODE_REPLY {
            return Err(HeaderError::Unsupported(format!("ARP opcode {opcode}")));
        }

        let mut sender_mac = [0u8; 6];
        let mut target_mac = [0u8; 6];
        sender_mac.copy_from_slice(&buf[8..14]);
        target_mac.copy_from_slice(&buf[18..24]);

        Ok(ArpMessage {
            opcode,
            sender_ethernet_address: EthernetAddress(sender_mac),
            sender_ip_address: Ipv4Addr::new(buf[14], buf[15], buf[16], buf[17]),
            target_ethernet_address: EthernetAddress(target_mac),
            target_ip_address: Ipv4Addr::new(buf[24], buf[25], buf[26], buf[27]),
        })
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = vec![0u8; Self::LENGTH];
        buf[0..2].copy_from_slice(&Self::TYPE_ETHERNET.to_be_bytes());
        buf[2..4].copy_from_slice(&EthernetHeader::TYPE_IPV4.to_be_bytes());
        buf[4] = 6;
        buf[5] = 4;
        buf[6..8].copy_from_slice(&self.opcode.to_be_bytes());
        buf[8..14].copy_from_slice(&self.sender_ethernet_address.octets());
        buf[14..18].copy_from_slice(&self.sender_ip_address.octets());
        buf[18..24].copy_from_slice(&self.target_ethernet_address.octets());
        buf[24..28].copy_from_slice(&self.target_ip_address.octets());
        buf
    }
}

// -- Unit tests --

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::test_utils;

    fn fixture_request() -> ArpMessage {
        ArpMessage::request(
            EthernetAddress([2, 0, 0, 0, 0, 2]),
            Ipv4Addr::new(10, 0, 0, 2),
            Ipv4Addr::new(10, 0, 0, 1),
        )
    }

    #[test]
    fn test_arp_to_bytes() {
        let bytes = hex::decode(test_utils::get_arp_request_hex()).unwrap();
        assert_eq!(fixture_request().serialize(), bytes);
    }

    #[test]
    fn test_arp_from_bytes() {
        let bytes = hex::decode(test_utils::get_arp_request_hex()).unwrap();
        let msg = ArpMessage::parse(&bytes).unwrap();
        assert!(msg.is_request());
        assert!(!msg.is_reply());
        assert_eq!(msg, fixture_request());
    }

    #[test]
    fn test_arp_reply_fields() {
        let reply = ArpMessage::reply(
            EthernetAddress([2, 0, 0, 0, 0, 1]),
            Ipv4Addr::new(10, 0, 0, 1),
            EthernetAddress([2, 0, 0, 0, 0, 2]),
            Ipv4Addr::new(10, 0, 0, 2),
        );
        let parsed = ArpMessage::parse(&reply.serialize()).unwrap();
        assert!(parsed.is_reply());
        assert!(!parsed.is_request());
        assert_eq!(parsed.target_ethernet_address, EthernetAddress([2, 0, 0, 0, 0, 2]));
    }

    #[test]
    fn test_arp_rejects_other_protocols() {
        let mut bytes = hex::decode(test_utils::get_arp_request_hex()).unwrap();
        bytes[3] = 0xdd; // 0x08dd
        assert!(matches!(
            ArpMessage::parse(&bytes),
            Err(HeaderError::Unsupported(_))
        ));
    }

    #[test]
    fn test_arp_rejects_bad_opcode() {
        let mut bytes = hex::decode(test_utils::get_arp_request_hex()).unwrap();
        bytes[7] = 9;
        assert!(ArpMessage::parse(&bytes).is_err());
    }

    #[test]
    fn test_arp_rejects_short_buffer() {
        assert_eq!(
            ArpMessage::parse(&[0u8; 27]),
            Err(HeaderError::InvalidBuffer {
                expected: 28,
                actual: 27
            })
        );
    }
}
