/// Message channel endpoints
///
/// The pipeline driver consumes posts from a `PostSource` and hands the
/// enriched results to a `PostSink`. Both are capabilities backed by an
/// external transport; any failure they report is fatal to the loop.
pub mod udp;

use crate::error::TransportError;
use crate::types::Post;

pub use udp::{UdpSink, UdpSource};

#[allow(async_fn_in_trait)]
pub trait PostSource {
    /// Wait for the next inbound post, in stable arrival order.
    ///
    /// `Ok(None)` means the source is exhausted and the loop should end
    /// cleanly; an error is a transport failure.
    async fn next_post(&mut self) -> Result<Option<Post>, TransportError>;
}

#[allow(async_fn_in_trait)]
pub trait PostSink {
    /// Hand one enriched post to the transport. May block until the
    /// message is durably accepted.
    async fn publish(&mut self, post: &Post) -> Result<(), TransportError>;
}
