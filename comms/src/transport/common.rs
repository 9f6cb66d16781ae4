use std::pin::Pin;

use anyhow::Context;
use serde::{de::DeserializeOwned, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio_stream::{wrappers::LinesStream, Stream, StreamExt};

pub const NEW_LINE: &[u8; 2] = b"\r\n";

pub type BoxedStream<Item> = Pin<Box<dyn Stream<Item = Item> + Send>>;

/// Writes serializable frames as single JSON lines terminated by [NEW_LINE]
pub struct FrameWriter<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin> FrameWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub async fn write<T: Serialize>(&mut self, frame: &T) -> anyhow::Result<()> {
        let mut serialized_bytes = serde_json::to_vec(frame)?;
        serialized_bytes.extend_from_slice(NEW_LINE);

        self.writer.write_all(serialized_bytes.as_slice()).await?;
        self.writer.flush().await?;

        Ok(())
    }
}

/// Turns a reader into a stream of JSON frames, one per line.
/// Blank lines are skipped, a line that can not be parsed yields an error item
/// but does not end the stream.
pub fn decode_lines<R, T>(reader: R, peer: &'static str) -> BoxedStream<anyhow::Result<T>>
where
    R: AsyncRead + Send + 'static,
    T: DeserializeOwned + Send + 'static,
{
    Box::pin(
        LinesStream::new(BufReader::new(reader).lines())
            .filter(|line| !matches!(line, Ok(line) if line.trim().is_empty()))
            .map(move |line| {
                line.with_context(|| format!("could not read line from the {}", peer))
                    .and_then(|line| {
                        serde_json::from_str::<T>(&line)
                            .with_context(|| format!("failed to deserialize frame from the {}", peer))
                    })
            }),
    )
}
