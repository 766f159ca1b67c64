pub mod client;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod transport;

pub use client::{ApiClient, ApiError, RequestOptions, ADMIN_KEY_HEADER};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport, TransportError};
