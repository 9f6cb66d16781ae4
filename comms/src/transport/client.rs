use tokio::net::{tcp::OwnedWriteHalf, TcpStream};

use crate::{command, event};

use super::common::{decode_lines, BoxedStream, FrameWriter};

/// [EventStream] is a stream of [crate::event::Event]s sent by the server
///
/// # Cancel Safety
///
/// This stream is cancel-safe, meaning that it can be used in [tokio::select!]
/// without the risk of missing events.
pub type EventStream = BoxedStream<anyhow::Result<event::Event>>;

/// [CommandWriter] writes [crate::command::UserCommand]s to the server
pub struct CommandWriter {
    inner: FrameWriter<OwnedWriteHalf>,
}

impl CommandWriter {
    pub fn new(writer: OwnedWriteHalf) -> Self {
        Self {
            inner: FrameWriter::new(writer),
        }
    }

    /// Send a [crate::command::UserCommand] to the backing [TcpStream]
    ///
    /// # Cancel Safety
    ///
    /// Not cancellation safe, a command may be partially written when the
    /// future is dropped mid-way.
    pub async fn write(&mut self, command: &command::UserCommand) -> anyhow::Result<()> {
        self.inner.write(command).await
    }
}

/// Splits a TCP stream connected to the server into a stream of events and a command writer.
pub fn split_tcp_stream(stream: TcpStream) -> (EventStream, CommandWriter) {
    let (reader, writer) = stream.into_split();

    (decode_lines(reader, "server"), CommandWriter::new(writer))
}
