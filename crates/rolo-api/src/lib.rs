//! Typed async client for the Rolo contact directory REST API.
//!
//! The server wraps every JSON response in a `{ success, message, data }`
//! envelope; [`DirectoryClient`] strips it and maps HTTP failures onto the
//! [`Error`] taxonomy. The client is stateless: the bearer token is read
//! from a [`TokenSource`] at send time, so a session cleared mid-flight is
//! never re-attached to later requests.

pub mod auth;
pub mod client;
pub mod contacts;
pub mod error;
pub mod model;
pub mod transfer;
pub mod transport;

pub use client::{DirectoryClient, TokenSource};
pub use error::Error;
pub use model::{
    AuthResponse, ChangePasswordRequest, Contact, ContactEmail, ContactPhone, ContactRequest,
    EmailType, LoginRequest, PageRequest, PageResponse, PhoneType, RegisterRequest, SortDir,
    TransferFormat, User,
};
pub use transport::TransportConfig;
