//! Newline-delimited JSON command host.
//!
//! Each input line is one [`Request`]; each gets exactly one [`Response`]
//! line back. Notifications are written as separate lines carrying an
//! `event` field whenever they happen.

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;

use crate::command::handle::OrchestratorHandle;
use crate::command::protocol::{Request, Response};
use crate::error::{Error, Result};

/// Output lines buffered before the reader side waits.
const OUTPUT_BUFFER: usize = 256;

/// Serve requests read from `reader`, writing responses and notifications to
/// `writer`, until `reader` reaches end of input.
pub async fn serve<R, W>(handle: OrchestratorHandle, reader: R, writer: W) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (output, mut lines_out) = mpsc::channel::<String>(OUTPUT_BUFFER);

    let writer_task = tokio::spawn(async move {
        let mut writer = writer;
        while let Some(line) = lines_out.recv().await {
            writer.write_all(line.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }
        writer.shutdown().await
    });

    let mut events = handle.subscribe();
    let event_output = output.clone();
    let forwarder = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(notification) => {
                    let line = match serde_json::to_string(&notification) {
                        Ok(line) => line,
                        Err(e) => {
                            tracing::warn!("Failed to encode notification: {}", e);
                            continue;
                        }
                    };
                    if event_output.send(line).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!("Dropped {} notifications for a slow reader", missed);
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let mut lines = BufReader::new(reader).lines();
    let served = async {
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            let response = match serde_json::from_str::<Request>(&line) {
                Ok(request) => {
                    tracing::debug!("Request: {:?}", request);
                    handle.send(request).await?
                }
                Err(e) => Response::failure(format!("Invalid request: {}", e)),
            };

            output
                .send(serde_json::to_string(&response)?)
                .await
                .map_err(|_| Error::Protocol("Output closed".to_string()))?;
        }
        Ok::<(), Error>(())
    }
    .await;

    forwarder.abort();
    let _ = forwarder.await;
    drop(output);

    let written = writer_task
        .await
        .map_err(|e| Error::Protocol(format!("Writer task failed: {}", e)))?;

    served?;
    written?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::download::testing::{test_orchestrator, ScriptedDownloader};
    use crate::store::MemoryStore;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tokio::io::AsyncReadExt;

    async fn run_script(script: &'static str) -> Vec<Value> {
        let tmp = tempfile::tempdir().unwrap();
        let orchestrator = test_orchestrator(
            Arc::new(MemoryStore::new()),
            Arc::new(ScriptedDownloader::new()),
            Settings::default(),
            tmp.path().to_path_buf(),
        );
        let (handle, _task) = orchestrator.spawn();

        let (writer, mut reader) = tokio::io::duplex(64 * 1024);
        serve(handle, script.as_bytes(), writer).await.unwrap();

        let mut output = String::new();
        reader.read_to_string(&mut output).await.unwrap();
        output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_one_response_per_request() {
        let lines = run_script(
            "{\"action\":\"getStatus\"}\n\
             \n\
             not json\n\
             {\"action\":\"stop\"}\n\
             {\"action\":\"resume\"}\n\
             {\"action\":\"enqueue\",\"urls\":[\"http://cdn.example/a.jpg\"],\"ownerName\":\"jo\"}\n",
        )
        .await;

        let responses: Vec<&Value> = lines.iter().filter(|v| v.get("event").is_none()).collect();
        assert_eq!(responses.len(), 5);
        assert_eq!(responses[0]["isDownloading"], json!(false));
        assert_eq!(responses[0]["hasSavedState"], json!(false));
        assert_eq!(responses[1]["success"], json!(false));
        assert!(responses[1]["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid request"));
        assert_eq!(responses[2], &json!({"success": true}));
        assert_eq!(
            responses[3],
            &json!({"success": false, "error": "No saved state found"})
        );
        assert_eq!(
            responses[4],
            &json!({"success": false, "error": "No valid media URLs found"})
        );
    }
}
