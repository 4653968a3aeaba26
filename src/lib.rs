pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod contact;
pub mod controller;
pub mod dev_server;
pub mod error;
pub mod gateway;
pub mod sort;
pub mod validation;

pub use contact::{Contact, ContactId, Page};
pub use error::{ClientError, ErrorKind};
