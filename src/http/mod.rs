//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (hyper HTTP/1.1, one task per connection)
//!     → request.rs (normalize into Request envelope)
//!     → [routing registry picks handler]
//!     → response.rs (Reply envelope → HTTP response)
//!     → Send to client, close connection
//! ```

pub mod envelope;
pub mod request;
pub mod response;
pub mod server;

pub use envelope::ApiEnvelope;
pub use request::Request;
pub use response::{Reply, DEFAULT_MIME_TYPE, NOT_FOUND_BODY};
pub use server::{Dispatcher, HandlerFailure, Outcome, ServerContext, ServerError};
