//! HTTP Middleware
//! Mission: Cross-cutting request plumbing

pub mod logging;
