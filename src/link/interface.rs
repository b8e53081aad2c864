use crate::config::InterfaceConfig;
use crate::ip::datagram::InternetDatagram;
use crate::link::arp::ArpMessage;
use crate::link::ethernet::{EthernetAddress, EthernetFrame, EthernetHeader};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::net::Ipv4Addr;

/// The physical side of a `NetworkInterface`.
pub trait OutputPort {
    /// Hand a frame to the link. Fire-and-forget.
    fn transmit(&mut self, sender: &str, frame: EthernetFrame);
}

/// Connects IP (the internet layer) with Ethernet (the link layer).
///
/// Outbound datagrams are addressed to a next hop IP; the interface resolves
/// that to an Ethernet address with ARP, queueing datagrams until an answer
/// arrives. Inbound IPv4 datagrams are queued for whoever owns the interface.
pub struct NetworkInterface {
    name: String,
    port: Box<dyn OutputPort>,
    ethernet_address: EthernetAddress,
    ip_address: Ipv4Addr,
    config: InterfaceConfig,
    timer: u64,                                                 // ms since creation
    ip_to_mac: HashMap<Ipv4Addr, (EthernetAddress, u64)>,       // Address and when it was last seen
    last_broadcast: HashMap<Ipv4Addr, u64>,                     // When we last asked for an address
    pending: HashMap<Ipv4Addr, Vec<(InternetDatagram, Ipv4Addr)>>, // Waiting on ARP, by next hop
    datagrams_received: VecDeque<InternetDatagram>,
}

impl NetworkInterface {
    pub fn new(
        name: impl Into<String>,
        port: Box<dyn OutputPort>,
        ethernet_address: EthernetAddress,
        ip_address: Ipv4Addr,
    ) -> Self {
        Self::with_config(name, port, ethernet_address, ip_address, InterfaceConfig::default())
    }

    pub fn with_config(
        name: impl Into<String>,
        port: Box<dyn OutputPort>,
        ethernet_address: EthernetAddress,
        ip_address: Ipv4Addr,
        config: InterfaceConfig,
    ) -> Self {
        let name = name.into();
        log::debug!(
            "[arp] interface {name} has Ethernet address {ethernet_address} and IP address {ip_address}"
        );
        NetworkInterface {
            name,
            port,
            ethernet_address,
            ip_address,
            config,
            timer: 0,
            ip_to_mac: HashMap::new(),
            last_broadcast: HashMap::new(),
            pending: HashMap::new(),
            datagrams_received: VecDeque::new(),
        }
    }

    /// Send `dgram` towards `next_hop`, resolving its Ethernet address first if needed
    pub fn send_datagram(&mut self, dgram: InternetDatagram, next_hop: Ipv4Addr) {
        if let Some(dst) = self.lookup(next_hop) {
            let frame = EthernetFrame {
                header: EthernetHeader {
                    dst,
                    src: self.ethernet_address,
                    ether_type: EthernetHeader::TYPE_IPV4,
                },
                payload: dgram.serialize(),
            };
            self.transmit(frame);
            return;
        }

        let throttled = self
            .last_broadcast
            .get(&next_hop)
            .is_some_and(|&sent_at| self.timer - sent_at < self.config.arp_request_interval_ms);
        if !throttled {
            self.last_broadcast.insert(next_hop, self.timer);
            self.broadcast(next_hop);
        }

        self.pending.entry(next_hop).or_default().push((dgram, next_hop));
    }

    /// Take in a frame from the link
    pub fn recv_frame(&mut self, frame: &EthernetFrame) {
        let dst = frame.header.dst;
        if dst != self.ethernet_address && !dst.is_broadcast() {
            return;
        }

        match frame.header.ether_type {
            EthernetHeader::TYPE_IPV4 => match InternetDatagram::parse(&frame.payload) {
                Ok(dgram) => self.datagrams_received.push_back(dgram),
                Err(err) => log::debug!("[arp] {}: dropping IPv4 frame: {err}", self.name),
            },
            EthernetHeader::TYPE_ARP => match ArpMessage::parse(&frame.payload) {
                Ok(msg) => self.recv_arp(msg),
                Err(err) => log::debug!("[arp] {}: dropping ARP frame: {err}", self.name),
            },
            _ => {}
        }
    }

    /// Advance the interface clock
    pub fn tick(&mut self, ms_since_last_tick: u64) {
        self.timer += ms_since_last_tick;

        let now = self.timer;
        let ttl = self.config.arp_cache_ttl_ms;
        let interval = self.config.arp_request_interval_ms;
        self.ip_to_mac.retain(|_, (_, seen)| now - *seen < ttl);
        self.last_broadcast.retain(|_, sent_at| now - *sent_at < interval);

        // Datagrams only wait as long as their ARP request is outstanding
        let last_broadcast = &self.last_broadcast;
        let name = &self.name;
        self.pending.retain(|next_hop, queued| {
            let waiting = last_broadcast.contains_key(next_hop);
            if !waiting {
                log::debug!(
                    "[arp] {name}: no reply from {next_hop}; dropping {} queued datagrams",
                    queued.len()
                );
            }
            waiting
        });
    }

    /// Ask everyone on the link who owns `target_ip`
    pub fn broadcast(&mut self, target_ip: Ipv4Addr) {
        log::debug!("[arp] {}: who has {target_ip}?", self.name);
        let request = ArpMessage::request(self.ethernet_address, self.ip_address, target_ip);
        self.transmit_arp(EthernetAddress::BROADCAST, &request);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ethernet_address(&self) -> EthernetAddress {
        self.ethernet_address
    }

    pub fn ip_address(&self) -> Ipv4Addr {
        self.ip_address
    }

    /// Inbound IPv4 datagrams, oldest first
    pub fn datagrams_received(&self) -> &VecDeque<InternetDatagram> {
        &self.datagrams_received
    }

    pub fn datagrams_received_mut(&mut self) -> &mut VecDeque<InternetDatagram> {
        &mut self.datagrams_received
    }

    /// Datagrams waiting for `next_hop` to be resolved
    pub fn pending_count(&self, next_hop: Ipv4Addr) -> usize {
        self.pending.get(&next_hop).map_or(0, Vec::len)
    }

    fn recv_arp(&mut self, msg: ArpMessage) {
        let sender_ip = msg.sender_ip_address;
        if msg.is_reply() {
            log::debug!("[arp] {}: {sender_ip} is at {}", self.name, msg.sender_ethernet_address);
        }
        self.ip_to_mac
            .insert(sender_ip, (msg.sender_ethernet_address, self.timer));

        if msg.is_request() && msg.target_ip_address == self.ip_address {
            log::debug!("[arp] {}: {} is at {}", self.name, self.ip_address, self.ethernet_address);
            let reply = ArpMessage::reply(
                self.ethernet_address,
                self.ip_address,
                msg.sender_ethernet_address,
                sender_ip,
            );
            self.transmit_arp(msg.sender_ethernet_address, &reply);
        }

        if let Some(queued) = self.pending.remove(&sender_ip) {
            for (dgram, next_hop) in queued {
                self.send_datagram(dgram, next_hop);
            }
        }
    }

    /// A usable mapping for `ip`, if one was seen recently enough
    fn lookup(&self, ip: Ipv4Addr) -> Option<EthernetAddress> {
        self.ip_to_mac
            .get(&ip)
            .filter(|(_, seen)| self.timer - seen < self.config.arp_cache_ttl_ms)
            .map(|&(mac, _)| mac)
    }

    fn transmit_arp(&mut self, dst: EthernetAddress, msg: &ArpMessage) {
        let frame = EthernetFrame {
            header: EthernetHeader {
                dst,
                src: self.ethernet_address,
                ether_type: EthernetHeader::TYPE_ARP,
            },
            payload: msg.serialize(),
        };
        self.transmit(frame);
    }

    fn transmit(&mut self, frame: EthernetFrame) {
        self.port.transmit(&self.name, frame);
    }
}

impl fmt::Debug for NetworkInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkInterface")
            .field("name", &self.name)
            .field("ethernet_address", &self.ethernet_address)
            .field("ip_address", &self.ip_address)
            .field("timer", &self.timer)
            .field("datagrams_received", &self.datagrams_received.len())
            .finish()
    }
}

// -- Unit tests --
