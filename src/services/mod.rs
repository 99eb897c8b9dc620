// src/services/mod.rs
pub mod chatbot;
pub mod countries;
pub mod dice;
pub mod giphy;
pub mod transcript;
pub mod turn_client;
