//! JSON-lines intake of tool notifications.
//!
//! Each non-blank line is one `ToolNotification`. Lines that fail to decode
//! are logged and skipped; read errors end the intake.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

use chronocode_timeline::{TimelineError, TimelineRecorder};

use crate::error::HostError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub recorded: usize,
    pub skipped: usize,
}

pub async fn ingest_lines<R>(
    recorder: &TimelineRecorder,
    reader: R,
) -> Result<IngestStats, HostError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut stats = IngestStats::default();
    let mut line_no = 0usize;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match recorder.ingest_line(line).await {
            Ok(id) => {
                stats.recorded += 1;
                debug!(line = line_no, event = %id, "Recorded notification");
            }
            Err(TimelineError::InvalidNotification(e)) => {
                stats.skipped += 1;
                warn!(line = line_no, error = %e, "Skipping malformed notification");
            }
            Err(other) => return Err(other.into()),
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronocode_timeline::{EventKind, TimelineStore};

    #[tokio::test]
    async fn test_ingest_mixed_input() {
        let input = concat!(
            r#"{"phase":"pre","session_id":"s1","tool":"grep","args":{"pattern":"todo"}}"#,
            "\n",
            "\n",
            "this is not json\n",
            r#"{"phase":"post_tool_use","session_id":"s1","tool":"grep","result":["a.rs"]}"#,
            "\n",
        );
        let recorder = TimelineRecorder::new(TimelineStore::new());

        let stats = ingest_lines(&recorder, input.as_bytes()).await.unwrap();
        assert_eq!(
            stats,
            IngestStats {
                recorded: 2,
                skipped: 1
            }
        );

        let kinds: Vec<_> = recorder
            .store()
            .all_events()
            .await
            .iter()
            .map(|e| e.kind())
            .collect();
        assert_eq!(kinds, vec![EventKind::ToolCall, EventKind::Response]);
    }

    #[tokio::test]
    async fn test_ingest_empty_input() {
        let recorder = TimelineRecorder::new(TimelineStore::new());
        let stats = ingest_lines(&recorder, &b""[..]).await.unwrap();
        assert_eq!(stats, IngestStats::default());
    }
}
