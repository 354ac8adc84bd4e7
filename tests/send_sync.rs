//! Send/Sync guarantees for core types.

use logentries::{
    CancellationToken, EngineBuilder, EngineConfig, Frame, FrameQueue, LogentriesEngine,
    LogentriesLogger, TcpConnector,
};
use rstest::rstest;
use static_assertions::assert_impl_all;

#[rstest]
fn builders_are_send_sync() {
    assert_impl_all!(EngineBuilder: Send, Sync);
    assert_impl_all!(EngineConfig: Send, Sync);
}

#[rstest]
fn components_are_send_sync() {
    assert_impl_all!(LogentriesEngine<TcpConnector>: Send, Sync);
    assert_impl_all!(LogentriesLogger<TcpConnector>: Send, Sync);
    assert_impl_all!(FrameQueue: Send, Sync);
    assert_impl_all!(Frame: Send, Sync);
    assert_impl_all!(CancellationToken: Send, Sync);
}
