use std::path::{Path, PathBuf};

use bytes::Bytes;
use mime::Mime;

/// A binary attachment sent as a file part of a multipart payload.
///
/// The builder never looks inside an attachment: its presence alone switches a
/// request to multipart mode. Contents are only read by the transport when the
/// descriptor is sent.
#[derive(Clone, PartialEq, Eq, derive_more::Debug)]
pub enum Attachment {
    /// A file on the local filesystem, read at send time.
    File(PathBuf),

    /// In-memory content with an optional filename and media type.
    ///
    /// Also covers an already received upload that is forwarded as-is.
    Bytes {
        /// Filename announced in the part's `Content-Disposition`.
        filename: Option<String>,
        /// Media type of the part, `application/octet-stream` when absent.
        content_type: Option<Mime>,
        /// The raw content.
        #[debug("{} bytes", content.len())]
        content: Bytes,
    },
}

impl Attachment {
    /// Creates an attachment pointing at a file on disk.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    /// Creates an in-memory attachment with a filename.
    pub fn bytes(filename: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self::Bytes {
            filename: Some(filename.into()),
            content_type: None,
            content: content.into(),
        }
    }

    /// Sets the media type of an in-memory attachment.
    ///
    /// File attachments get their media type from the transport, so this is a no-op for them.
    #[must_use]
    pub fn with_content_type(self, media_type: Mime) -> Self {
        match self {
            Self::Bytes {
                filename, content, ..
            } => Self::Bytes {
                filename,
                content_type: Some(media_type),
                content,
            },
            file @ Self::File(_) => file,
        }
    }

    /// The filename announced for this attachment, if any.
    pub fn filename(&self) -> Option<&str> {
        match self {
            Self::File(path) => path.file_name().and_then(|name| name.to_str()),
            Self::Bytes { filename, .. } => filename.as_deref(),
        }
    }
}

impl From<PathBuf> for Attachment {
    fn from(value: PathBuf) -> Self {
        Self::File(value)
    }
}

impl From<&Path> for Attachment {
    fn from(value: &Path) -> Self {
        Self::File(value.to_path_buf())
    }
}
