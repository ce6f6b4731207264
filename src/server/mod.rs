//! Quiz collection server.
//!
//! Hosts a [`QuizCollection`](crate::store::QuizCollection) over WebSocket
//! for any number of clients.

mod server;

pub use server::{SharedCollection, handle_request, run, serve};
