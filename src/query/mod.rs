pub mod aggregate;
pub mod codec;
pub mod transport;

pub use aggregate::query_servers;
