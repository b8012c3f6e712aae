pub mod broadcast;
pub mod client;
