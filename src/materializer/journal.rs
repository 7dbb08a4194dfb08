use std::path::{Path, PathBuf};

use bincode::{Decode, Encode};
use compio::fs;
use snafu::{ResultExt, Snafu};
use tracing::debug;

use crate::ext::PathDisplayExt;

use super::CreatedItems;

const COMPRESSION_LEVEL: i32 = 3;

/// The created paths of one run, kept on disk so the run can be undone
/// later from another process.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct UndoJournal {
    root: String,
    created: Vec<String>,
}

impl UndoJournal {
    pub fn new(root: &Path, created: &CreatedItems) -> Self {
        Self {
            root: root.to_string_lossy().into_owned(),
            created: created
                .iter()
                .map(|path| path.to_string_lossy().into_owned())
                .collect(),
        }
    }

    pub fn root(&self) -> &Path {
        Path::new(&self.root)
    }

    pub fn created(&self) -> Vec<PathBuf> {
        self.created.iter().map(PathBuf::from).collect()
    }

    pub async fn write(&self, path: &Path) -> Result<(), JournalError> {
        let encoded = bincode::encode_to_vec(self, bincode::config::standard())
            .context(EncodeSnafu)?;
        let compressed = zstd::encode_all(encoded.as_slice(), COMPRESSION_LEVEL)
            .context(CompressionSnafu)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.context(WriteSnafu {
                file_path: path.display_absolute(),
            })?;
        }

        debug!(
            "Writing undo journal with {} entries to {}",
            self.created.len(),
            path.display_absolute()
        );
        fs::write(path, compressed).await.0.context(WriteSnafu {
            file_path: path.display_absolute(),
        })?;
        Ok(())
    }

    pub async fn read(path: &Path) -> Result<Self, JournalError> {
        debug!("Reading undo journal {}", path.display_absolute());
        let compressed = fs::read(path).await.context(ReadSnafu {
            file_path: path.display_absolute(),
        })?;
        let encoded = zstd::decode_all(compressed.as_slice()).context(CompressionSnafu)?;
        let (journal, _) =
            bincode::decode_from_slice::<Self, _>(&encoded, bincode::config::standard())
                .context(DecodeSnafu {
                    file_path: path.display_absolute(),
                })?;
        Ok(journal)
    }

    /// Deletes the journal file once it has been replayed.
    pub async fn discard(path: &Path) -> Result<(), JournalError> {
        fs::remove_file(path).await.context(WriteSnafu {
            file_path: path.display_absolute(),
        })
    }
}

#[derive(Debug, Snafu)]
pub enum JournalError {
    #[snafu(display("Failed to read the undo journal: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to write the undo journal: {}", file_path))]
    WriteError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to encode the undo journal"))]
    EncodeError { source: bincode::error::EncodeError },
    #[snafu(display("The undo journal {} is corrupted", file_path))]
    DecodeError {
        file_path: String,
        source: bincode::error::DecodeError,
    },
    #[snafu(display("Failed to (de)compress the undo journal"))]
    CompressionError { source: std::io::Error },
}
