//! Render sink error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum RenderError {
    #[error("failed to write progress line: {message}")]
    SinkWrite { message: String },

    #[error("render sink closed")]
    SinkClosed,
}

impl From<std::io::Error> for RenderError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::BrokenPipe => Self::SinkClosed,
            _ => Self::SinkWrite {
                message: err.to_string(),
            },
        }
    }
}

impl UserFacingError for RenderError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::SinkWrite { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::SinkWrite { .. } => "render.sink_write",
            Self::SinkClosed => "render.sink_closed",
        })
    }
}
