use thiserror::Error;

#[derive(Debug, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("Invalid prefix length {0}: must be at most 32")]
    InvalidPrefixLength(u8),
}
