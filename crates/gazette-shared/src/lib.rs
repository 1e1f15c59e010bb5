//! # Gazette Shared
//!
//! Request/response types shared between the API server and its clients.
//! Kept free of domain and infrastructure dependencies so it can also be
//! compiled into client-side code.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse};
