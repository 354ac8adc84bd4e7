pub mod scripted;
pub mod shared_buffer;

#[allow(unused_imports)]
pub use scripted::{Script, ScriptedConnector};
#[allow(unused_imports)]
pub use shared_buffer::{SharedBuf, wait_for_len};

/// Credential accepted by the engine in tests.
#[allow(dead_code)]
pub const TOKEN: &str = "550e8400-e29b-41d4-a716-446655440000";
