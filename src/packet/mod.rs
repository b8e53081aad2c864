pub mod errors;

pub use errors::HeaderError;

// Unit test helpers
