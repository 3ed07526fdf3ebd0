//! Blob-upload service: stores raw media bytes on disk keyed by generated
//! filename, and deletes them on request. Shares nothing with the other
//! services except the token contract.

pub mod routes;
pub mod storage;
