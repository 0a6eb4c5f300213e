//! Backend API client — trait seam, DTOs, and the HTTP implementation.

pub mod client;
pub mod session;
pub mod traits;
pub mod types;

pub use client::HttpBackend;
pub use session::SessionToken;
pub use traits::BackendApi;
