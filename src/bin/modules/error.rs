use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    /// Errors originating from the eqcharge library.
    #[error("Calculation error: {0}")]
    Calculation(#[from] eqcharge::ChargeError),

    /// I/O errors associated with a specific file path.
    #[error("I/O error for '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// General I/O errors not tied to a specific file.
    #[error("I/O error: {0}")]
    GenericIo(#[from] std::io::Error),

    /// Errors parsing SDF input.
    #[error("Failed to parse SDF from {source_name}: {details}")]
    SdfParse {
        source_name: String,
        details: String,
    },

    /// Every molecule was removed during classification or failed during calculation.
    #[error("No charges were calculated ({removed} molecules unclassified, {failed} failed)")]
    NothingCalculated { removed: usize, failed: usize },
}
