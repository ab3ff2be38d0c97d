//! Core OData client types.
//!
//! These types enforce their invariants at construction time,
//! ensuring invalid states are unrepresentable.

mod cookie;
mod method;
mod service_url;

pub use cookie::Cookie;
pub use method::Method;
pub use service_url::ServiceUrl;
