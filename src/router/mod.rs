pub mod errors;
pub mod trie;

pub use errors::RouteError;
pub use trie::{Route, RouteTrie};

use crate::ip::datagram::InternetDatagram;
use crate::link::interface::NetworkInterface;
use std::net::Ipv4Addr;

/// A router with several network interfaces, forwarding by longest-prefix match.
///
/// The router owns its interfaces. Drivers deliver inbound frames through
/// `interface_mut(n).recv_frame(..)` and then call `route()`.
#[derive(Debug, Default)]
pub struct Router {
    interfaces: Vec<NetworkInterface>,
    routes: RouteTrie,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an interface; returns its index
    pub fn add_interface(&mut self, interface: NetworkInterface) -> usize {
        self.interfaces.push(interface);
        self.interfaces.len() - 1
    }

    pub fn interface(&self, n: usize) -> Option<&NetworkInterface> {
        self.interfaces.get(n)
    }

    pub fn interface_mut(&mut self, n: usize) -> Option<&mut NetworkInterface> {
        self.interfaces.get_mut(n)
    }

    pub fn interfaces(&self) -> &[NetworkInterface] {
        &self.interfaces
    }

    /// Add a forwarding rule.
    ///
    /// `prefix_length` high-order bits of `route_prefix` must match a
    /// datagram's destination for the route to apply. `next_hop` is `None`
    /// when the network is directly attached, in which case the datagram's
    /// own destination is the next hop.
    pub fn add_route(
        &mut self,
        route_prefix: u32,
        prefix_length: u8,
        next_hop: Option<Ipv4Addr>,
        interface_num: usize,
    ) -> Result<(), RouteError> {
        if prefix_length > 32 {
            return Err(RouteError::InvalidPrefixLength(prefix_length));
        }

        log::debug!(
            "[router] adding route {}/{} => {} on interface {}",
            Ipv4Addr::from(route_prefix),
            prefix_length,
            next_hop.map_or_else(|| "(direct)".to_string(), |hop| hop.to_string()),
            interface_num
        );

        self.routes.insert(
            route_prefix,
            prefix_length,
            Route {
                next_hop,
                interface_num,
            },
        );
        Ok(())
    }

    /// Forward every datagram waiting on every interface
    pub fn route(&mut self) {
        for n in 0..self.interfaces.len() {
            let inbound = std::mem::take(self.interfaces[n].datagrams_received_mut());
            for dgram in inbound {
                self.forward(dgram);
            }
        }
    }

    fn forward(&mut self, mut dgram: InternetDatagram) {
        if dgram.header.ttl <= 1 {
            log::debug!("[router] TTL expired for datagram to {}", dgram.header.dst_ip);
            return;
        }
        dgram.header.ttl -= 1;
        dgram.header.compute_checksum();

        let dst = dgram.header.dst_ip;
        let Some(&route) = self.routes.find(u32::from(dst)) else {
            log::debug!("[router] no route to {dst}");
            return;
        };

        let next_hop = route.next_hop.unwrap_or(dst);
        match self.interfaces.get_mut(route.interface_num) {
            Some(interface) => interface.send_datagram(dgram, next_hop),
            None => log::warn!(
                "[router] route to {dst} names missing interface {}",
                route.interface_num
            ),
        }
    }
}

// -- Unit tests --

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::ethernet::{EthernetAddress, EthernetFrame, EthernetHeader};
    use crate::link::interface::OutputPort;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    type Sent = Rc<RefCell<VecDeque<(String, EthernetFrame)>>>;

    /// Shared by all interfaces; remembers which one sent each frame
    struct SharedLog(Sent);

    impl OutputPort for SharedLog {
        fn transmit(&mut self, sender: &str, frame: EthernetFrame) {
            self.0.borrow_mut().push_back((sender.to_string(), frame));
        }
    }

    fn ip(a: u8, b: u8, c: u8, d: u8) -> u32 {
        u32::from(Ipv4Addr::new(a, b, c, d))
    }

    fn mac(n: u8) -> EthernetAddress {
        EthernetAddress([2, 0, 0, 0, 0, n])
    }

    /// Router with interfaces eth0 and eth1, routes 10/8 -> 0 and 10.0.1/24 -> 1
    fn create_router() -> (Router, Sent) {
        let sent: Sent = Rc::default();
        let mut router = Router::new();
        for n in 0..2u8 {
            router.add_interface(NetworkInterface::new(
                format!("eth{n}"),
                Box::new(SharedLog(sent.clone())),
                mac(n),
                Ipv4Addr::new(192, 168, n, 1),
            ));
        }
        router.add_route(ip(10, 0, 0, 0), 8, None, 0).unwrap();
        router.add_route(ip(10, 0, 1, 0), 24, None, 1).unwrap();
        (router, sent)
    }

    fn deliver(router: &mut Router, n: usize, dgram: &InternetDatagram) {
        let frame = EthernetFrame {
            header: EthernetHeader {
                dst: mac(n as u8),
                src: mac(99),
                ether_type: EthernetHeader::TYPE_IPV4,
            },
            payload: dgram.serialize(),
        };
        router.interface_mut(n).unwrap().recv_frame(&frame);
    }

    fn dgram_to(dst: Ipv4Addr, ttl: u8) -> InternetDatagram {
        let mut dgram =
            InternetDatagram::new(Ipv4Addr::new(172, 16, 0, 1), dst, 17, b"x".to_vec()).unwrap();
        dgram.header.ttl = ttl;
        dgram.header.compute_checksum();
        dgram
    }

    /// The ARP request the router broadcast for `target`, and from which interface
    fn arp_target(entry: &(String, EthernetFrame)) -> (String, Ipv4Addr) {
        let msg = crate::link::arp::ArpMessage::parse(&entry.1.payload).unwrap();
        (entry.0.clone(), msg.target_ip_address)
    }

    #[test]
    fn test_rejects_long_prefix() {
        let mut router = Router::new();
        assert_eq!(
            router.add_route(0, 33, None, 0),
            Err(RouteError::InvalidPrefixLength(33))
        );
    }

    #[test]
    fn test_longest_match_picks_interface() {
        let (mut router, sent) = create_router();
        let names: Vec<&str> = router.interfaces().iter().map(|i| i.name()).collect();
        assert_eq!(names, ["eth0", "eth1"]);

        deliver(&mut router, 0, &dgram_to(Ipv4Addr::new(10, 0, 1, 5), 64));
        router.route();

        let out = sent.borrow_mut().pop_front().expect("ARP request");
        assert_eq!(arp_target(&out), ("eth1".to_string(), Ipv4Addr::new(10, 0, 1, 5)));
        assert!(router.interface(0).unwrap().datagrams_received().is_empty());

        deliver(&mut router, 1, &dgram_to(Ipv4Addr::new(10, 9, 9, 9), 64));
        router.route();
        let out = sent.borrow_mut().pop_front().expect("ARP request");
        assert_eq!(arp_target(&out), ("eth0".to_string(), Ipv4Addr::new(10, 9, 9, 9)));
    }

    #[test]
    fn test_ttl_one_dropped() {
        let (mut router, sent) = create_router();

        deliver(&mut router, 0, &dgram_to(Ipv4Addr::new(10, 0, 1, 5), 1));
        router.route();
        assert!(sent.borrow().is_empty());
        assert_eq!(router.interface(1).unwrap().pending_count(Ipv4Addr::new(10, 0, 1, 5)), 0);
    }

    #[test]
    fn test_ttl_decremented_and_checksum_updated() {
        let (mut router, sent) = create_router();
        let dst = Ipv4Addr::new(10, 0, 1, 5);

        // Resolve the destination on eth1 first
        let reply = crate::link::arp::ArpMessage::reply(mac(50), dst, mac(1), Ipv4Addr::new(192, 168, 1, 1));
        router.interface_mut(1).unwrap().recv_frame(&EthernetFrame {
            header: EthernetHeader {
                dst: mac(1),
                src: mac(50),
                ether_type: EthernetHeader::TYPE_ARP,
            },
            payload: reply.serialize(),
        });

        deliver(&mut router, 0, &dgram_to(dst, 2));
        router.route();

        let (sender, frame) = sent.borrow_mut().pop_front().expect("forwarded frame");
        assert_eq!(sender, "eth1");
        assert_eq!(frame.header.dst, mac(50));
        let forwarded = InternetDatagram::parse(&frame.payload).expect("valid checksum");
        assert_eq!(forwarded.header.ttl, 1);
    }

    #[test]
    fn test_next_hop_used_when_configured() {
        let (mut router, sent) = create_router();
        let gateway = Ipv4Addr::new(192, 168, 0, 254);
        router.add_route(0, 0, Some(gateway), 0).unwrap();

        deliver(&mut router, 1, &dgram_to(Ipv4Addr::new(8, 8, 8, 8), 64));
        router.route();

        let out = sent.borrow_mut().pop_front().expect("ARP request");
        assert_eq!(arp_target(&out), ("eth0".to_string(), gateway));
        assert_eq!(router.interface(0).unwrap().pending_count(gateway), 1);
    }

    #[test]
    fn test_no_route_dropped() {
        let (mut router, sent) = create_router();
        deliver(&mut router, 0, &dgram_to(Ipv4Addr::new(11, 0, 0, 1), 64));
        router.route();
        assert!(sent.borrow().is_empty());
    }
}
