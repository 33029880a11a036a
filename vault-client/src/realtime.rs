//! Realtime change subscription
//!
//! Opens the server's WebSocket feed and forwards decoded
//! [`RealtimeMessage`]s on an mpsc channel. Feed them to
//! [`CollectionView::on_message`](crate::view::CollectionView::on_message).

use futures::{SinkExt, StreamExt};
use shared::realtime::RealtimeMessage;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

use crate::{ClientConfig, ClientError, ClientResult};

const CHANNEL_CAPACITY: usize = 64;

/// A live feed; dropping `messages` ends the reader task
#[derive(Debug)]
pub struct Subscription {
    pub messages: mpsc::Receiver<RealtimeMessage>,
    pub task: JoinHandle<()>,
}

/// Decode one text frame; unknown frames are skipped
pub fn parse_frame(text: &str) -> Option<RealtimeMessage> {
    match serde_json::from_str(text) {
        Ok(message) => Some(message),
        Err(e) => {
            tracing::debug!("Skipping unrecognized realtime frame: {e}");
            None
        }
    }
}

/// Connect to the feed. Needs a session token in `config`.
pub async fn subscribe(config: &ClientConfig) -> ClientResult<Subscription> {
    let url = config
        .realtime_url()
        .ok_or(ClientError::Unauthorized)?;
    let (ws_stream, _response) = tokio_tungstenite::connect_async(url)
        .await
        .map_err(|e| ClientError::Realtime(e.to_string()))?;
    tracing::info!(base_url = %config.base_url, "Realtime feed connected");

    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    let task = tokio::spawn(async move {
        let (mut ws_sink, mut ws_stream) = ws_stream.split();
        loop {
            tokio::select! {
                _ = tx.closed() => {
                    let _ = ws_sink.send(Message::Close(None)).await;
                    return;
                }
                msg = ws_stream.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            if let Some(message) = parse_frame(&text)
                                && tx.send(message).await.is_err()
                            {
                                return;
                            }
                        }
                        Some(Ok(Message::Ping(data))) => {
                            let _ = ws_sink.send(Message::Pong(data)).await;
                        }
                        Some(Ok(Message::Close(_))) => {
                            tracing::info!("Realtime feed closed by server");
                            return;
                        }
                        Some(Err(e)) => {
                            tracing::warn!("Realtime feed error: {e}");
                            return;
                        }
                        None => return,
                        _ => {}
                    }
                }
            }
        }
    });

    Ok(Subscription { messages: rx, task })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::realtime::{ChangeEvent, ChangeTable};

    #[test]
    fn parses_known_frames() {
        assert_eq!(parse_frame(r#"{"type":"Ready"}"#), Some(RealtimeMessage::Ready));
        assert_eq!(
            parse_frame(r#"{"type":"Change","event":{"table":"collections","op":"delete","id":9}}"#),
            Some(RealtimeMessage::Change {
                event: ChangeEvent::deleted(ChangeTable::Collections, 9)
            })
        );
        assert_eq!(parse_frame("not json"), None);
        assert_eq!(parse_frame(r#"{"type":"Heartbeat"}"#), None);
    }

    #[tokio::test]
    async fn subscribe_requires_token() {
        let err = subscribe(&ClientConfig::default()).await.unwrap_err();
        assert!(matches!(err, ClientError::Unauthorized));
    }
}
