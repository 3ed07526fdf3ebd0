//! HTTP layer shared by the stride auth and media services: handlers,
//! middleware, the error taxonomy, and router assembly. The upload service
//! is self-contained and only shares the token contract from stride-types.

pub mod auth;
pub mod comments;
pub mod error;
pub mod habits;
pub mod likes;
pub mod messages;
pub mod middleware;
pub mod password;
pub mod posts;
pub mod reflections;
pub mod router;
pub mod state;
pub mod uploads;
pub mod users;
