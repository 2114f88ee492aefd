//! Kitchen order ticket service: order submission, ticket numbering,
//! cancellation, retrieval for printing and staff login.

pub mod server;
