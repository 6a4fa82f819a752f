// Types shared by the server and its tests
pub mod common;

pub mod server;

pub use common::Token;
