//! HTTP protocol handling subsystem.
//!
//! A deliberately small HTTP/1.1 dialect spoken over raw sockets: GET only,
//! all input in the query string, one request per connection.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (accept loop, one task per connection)
//!     → request.rs (request line, headers, query decoding)
//!     → Handler (backend or facade service)
//!     → response.rs (status line, fixed headers, body)
//!     → Send to client, close
//! ```

pub mod error;
pub mod request;
pub mod response;
pub mod server;

pub use error::HttpError;
pub use request::HttpRequest;
pub use response::HttpResponse;
pub use server::{ConnectionSettings, Handler, HttpServer};
