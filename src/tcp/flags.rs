use bitflags::bitflags;

bitflags! {
    // Bit positions match the TCP header: [ ..., RST, SYN, FIN ]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TcpFlags: u8 {
        const RST = 1 << 2;
        const SYN = 1 << 1;
        const FIN = 1 << 0;
    }
}

// -- Unit tests --
