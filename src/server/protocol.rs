//! Line protocol framing.
//!
//! A request is a run of lines closed by a literal `END` line (or EOF). The
//! first line names the index, the remaining lines form the question. A reply
//! is the answer text followed by its own `END` line.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{QaError, Result};

/// Line closing both requests and replies.
pub const TERMINATOR: &str = "END";

/// One framed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub index: String,
    pub question: String,
}

impl Request {
    /// Build a request from its lines, without the terminator.
    ///
    /// Question lines are trimmed and each one is followed by `\n`.
    pub fn from_lines(lines: &[String]) -> Result<Self> {
        let (index, rest) = lines
            .split_first()
            .ok_or_else(|| QaError::Protocol("empty request".to_string()))?;
        let index = index.trim();
        if index.is_empty() {
            return Err(QaError::Protocol("missing index name".to_string()));
        }

        let mut question = String::new();
        for line in rest {
            question.push_str(line.trim());
            question.push('\n');
        }
        Ok(Self {
            index: index.to_string(),
            question,
        })
    }
}

/// Read lines up to the terminator or EOF and frame them as a request.
pub async fn read_request<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<Request> {
    let mut lines = Vec::new();
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }
        let content = line.trim_end_matches(|c: char| c == '\r' || c == '\n');
        if content == TERMINATOR {
            break;
        }
        lines.push(content.to_string());
    }
    Request::from_lines(&lines)
}

/// Write `text` followed by the terminator line.
pub async fn write_reply<W: AsyncWrite + Unpin>(writer: &mut W, text: &str) -> Result<()> {
    let mut reply = String::with_capacity(text.len() + TERMINATOR.len() + 2);
    reply.push_str(text);
    reply.push('\n');
    reply.push_str(TERMINATOR);
    reply.push('\n');
    writer.write_all(reply.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}
