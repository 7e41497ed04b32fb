pub mod candidate;
pub mod chat;
