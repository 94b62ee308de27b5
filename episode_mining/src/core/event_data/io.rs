use std::io::Read;

use flate2::read::GzDecoder;

use crate::core::event_data::EventStream;
use crate::core::io::Importable;

/// Error type for [`EventStream`] IO operations
#[derive(Debug)]
pub enum EventStreamIOError {
    /// IO Error
    Io(std::io::Error),
    /// JSON Parsing Error
    Json(serde_json::Error),
    /// Unsupported Format
    UnsupportedFormat(String),
}

impl std::fmt::Display for EventStreamIOError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventStreamIOError::Io(e) => write!(f, "IO Error: {}", e),
            EventStreamIOError::Json(e) => write!(f, "JSON Error: {}", e),
            EventStreamIOError::UnsupportedFormat(s) => write!(f, "Unsupported Format: {}", s),
        }
    }
}

impl std::error::Error for EventStreamIOError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EventStreamIOError::Io(e) => Some(e),
            EventStreamIOError::Json(e) => Some(e),
            EventStreamIOError::UnsupportedFormat(_) => None,
        }
    }
}

impl From<std::io::Error> for EventStreamIOError {
    fn from(e: std::io::Error) -> Self {
        EventStreamIOError::Io(e)
    }
}

impl From<serde_json::Error> for EventStreamIOError {
    fn from(e: serde_json::Error) -> Self {
        EventStreamIOError::Json(e)
    }
}

impl Importable for EventStream {
    type Error = EventStreamIOError;

    fn import_from_reader<R: Read>(reader: R, format: &str) -> Result<Self, Self::Error> {
        let stream: EventStream = match format {
            "json" => serde_json::from_reader(reader)?,
            "json.gz" | "gz" => serde_json::from_reader(GzDecoder::new(reader))?,
            _ => return Err(EventStreamIOError::UnsupportedFormat(format.to_string())),
        };
        tracing::debug!(events = stream.len(), format, "imported event stream");
        Ok(stream)
    }
}
