mod models;

pub use models::Token;
