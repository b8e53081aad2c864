use std::fmt;
use std::ops::Add;

/// A sequence number modulo 2^32, as carried in the TCP header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Wrap32 {
    value: u32,
}

impl Wrap32 {
    const WRAP_SIZE: u64 = 1 << 32;
    const HALF_WRAP: u64 = 1 << 31;

    pub fn new(value: u32) -> Self {
        Wrap32 { value }
    }

    pub fn raw(&self) -> u32 {
        self.value
    }

    /// Wrap an absolute `seq_no` given an `initial seq_no`
    pub fn wrap(n: u64, isn: Wrap32) -> Self {
        Wrap32::new((n as u32).wrapping_add(isn.value))
    }

    /// Unwrap into the absolute `seq_no` closest to the `checkpoint`.
    /// Ties go to the smaller candidate.
    pub fn unwrap(&self, isn: Wrap32, checkpoint: u64) -> u64 {
        // Offset from the ISN inside the first wrap
        let relative = self.value.wrapping_sub(isn.value) as u64;

        // Number of whole wraps that lands within half a wrap of the checkpoint
        let k = (checkpoint.saturating_add(Self::HALF_WRAP - 1)).saturating_sub(relative) >> 32;

        // k < 2^32 and relative < 2^32, so this cannot overflow
        relative + k * Self::WRAP_SIZE
    }
}

impl Add for Wrap32 {
    type Output = Wrap32;

    fn add(self, other: Wrap32) -> Wrap32 {
        Wrap32::new(self.value.wrapping_add(other.value))
    }
}

impl Add<u32> for Wrap32 {
    type Output = Wrap32;

    fn add(self, n: u32) -> Wrap32 {
        Wrap32::new(self.value.wrapping_add(n))
    }
}

impl fmt::Display for Wrap32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

// -- Unit tests --
