//! Socket plumbing: typed frame I/O over the split WebSocket halves

use crate::error::{GatewayError, GatewayResult};
use crate::protocol::{GatewayFrame, OpCode};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

/// Buffer of the outbound frame queue feeding the writer task
pub(crate) const OUTBOUND_BUFFER: usize = 64;

/// How long the writer gets to flush queued frames on teardown
pub(crate) const WRITER_FLUSH: Duration = Duration::from_secs(2);

/// Close code used when the stream ends without a close frame
const ABNORMAL_CLOSURE: u16 = 1006;

/// Outcome of reading one socket message
pub(crate) enum Incoming {
    /// A text message
    Text(String),
    /// The session ended
    Closed(GatewayError),
}

/// Read the next text message, skipping control and binary frames
pub(crate) async fn next_text<S>(reader: &mut S) -> Incoming
where
    S: Stream<Item = Result<Message, WsError>> + Unpin,
{
    loop {
        match reader.next().await {
            Some(Ok(Message::Text(text))) => return Incoming::Text(text),
            Some(Ok(Message::Close(frame))) => {
                let code = frame.as_ref().map_or(1000, |f| f.code.into());
                return Incoming::Closed(GatewayError::Closed { code });
            }
            Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Binary(_) | Message::Frame(_))) => {
                // Ping/pong handled by tungstenite; binary skipped
            }
            Some(Err(e)) => return Incoming::Closed(e.into()),
            None => {
                return Incoming::Closed(GatewayError::Closed {
                    code: ABNORMAL_CLOSURE,
                })
            }
        }
    }
}

/// Read the next frame and require it to carry `expected`
///
/// Used for the handshake, where any other opcode is a protocol violation.
pub(crate) async fn expect_frame<S>(reader: &mut S, expected: OpCode) -> GatewayResult<GatewayFrame>
where
    S: Stream<Item = Result<Message, WsError>> + Unpin,
{
    match next_text(reader).await {
        Incoming::Text(text) => {
            let frame = GatewayFrame::from_json(&text)?;
            if frame.op != expected {
                return Err(GatewayError::UnexpectedOpcode {
                    expected,
                    actual: frame.op,
                });
            }
            Ok(frame)
        }
        Incoming::Closed(e) => Err(e),
    }
}

/// Send one frame directly on the sink
pub(crate) async fn send_frame<W>(writer: &mut W, frame: &GatewayFrame) -> GatewayResult<()>
where
    W: Sink<Message, Error = WsError> + Unpin,
{
    let json = frame.to_json()?;
    writer.send(Message::Text(json)).await?;
    Ok(())
}

/// Spawn the task that owns the write half
///
/// It drains `outbound` until the queue closes or a send fails.
pub(crate) fn spawn_writer<W>(mut writer: W, mut outbound: mpsc::Receiver<GatewayFrame>) -> JoinHandle<()>
where
    W: Sink<Message, Error = WsError> + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        while let Some(frame) = outbound.recv().await {
            if let Err(e) = send_frame(&mut writer, &frame).await {
                tracing::debug!(error = %e, "Writer task: send failed");
                break;
            }
        }
    })
}
