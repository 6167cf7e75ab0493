pub mod call;
pub mod command;
pub mod config;
pub mod direction;
pub mod elevator_status;
pub mod error;
pub mod request;
pub mod requests;
pub mod subscribers;
