use std::net::Ipv4Addr;

/// Where to send datagrams matching a prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    /// `None` when the network is directly attached
    pub next_hop: Option<Ipv4Addr>,
    pub interface_num: usize,
}

#[derive(Debug, Default)]
struct TrieNode {
    route: Option<Route>,
    children: [Option<usize>; 2], // Indexes into the arena, by next bit
}

/// Binary trie over IPv4 prefixes, most significant bit first.
///
/// Nodes live in one `Vec` and refer to each other by index. Node 0 is the
/// root and holds the default route (prefix length 0), if any.
#[derive(Debug)]
pub struct RouteTrie {
    nodes: Vec<TrieNode>,
}

impl RouteTrie {
    pub fn new() -> Self {
        RouteTrie {
            nodes: vec![TrieNode::default()],
        }
    }

    /// Add or replace the route for `prefix/prefix_length`. Bits past the length are ignored.
    pub fn insert(&mut self, prefix: u32, prefix_length: u8, route: Route) {
        let mut node = 0;
        for depth in 0..prefix_length.min(32) {
            let bit = Self::bit(prefix, depth);
            node = match self.nodes[node].children[bit] {
                Some(child) => child,
                None => {
                    self.nodes.push(TrieNode::default());
                    let child = self.nodes.len() - 1;
                    self.nodes[node].children[bit] = Some(child);
                    child
                }
            };
        }
        self.nodes[node].route = Some(route);
    }

    /// Longest-prefix match: the deepest route on the path to `addr`
    pub fn find(&self, addr: u32) -> Option<&Route> {
        let mut node = 0;
        let mut best = self.nodes[node].route.as_ref();

        for depth in 0..32 {
            let Some(child) = self.nodes[node].children[Self::bit(addr, depth)] else {
                break;
            };
            node = child;
            if let Some(route) = &self.nodes[node].route {
                best = Some(route);
            }
        }
        best
    }

    /// Number of nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.iter().all(|node| node.route.is_none())
    }

    fn bit(addr: u32, depth: u8) -> usize {
        ((addr >> (31 - depth)) & 1) as usize
    }
}

impl Default for RouteTrie {
    fn default() -> Self {
        Self::new()
    }
}

// -- Unit tests --
