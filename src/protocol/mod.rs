//! Wire protocol between the collection server and its clients.

mod messages;

pub use messages::{DEFAULT_PORT, StoreRequest, StoreResponse, status};
