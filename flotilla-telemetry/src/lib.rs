pub mod config;
pub mod fleet;
pub mod sim;
pub mod web;
