//! Legacy UDP game-server query client: challenge handshake, rules and
//! player decoding, concurrent fan-out across servers, and a paced
//! tabular report.

pub mod config;
pub mod error;
pub mod gate;
pub mod handlers;
pub mod models;
pub mod output;
pub mod query;
pub mod render;
pub mod utils;
