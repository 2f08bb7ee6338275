use miette::Diagnostic;
use thiserror::Error;

/// Main error type for layerport operations
#[derive(Error, Diagnostic, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    #[diagnostic(code(layerport::io))]
    IoError(#[from] std::io::Error),

    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(layerport::io))]
    Io {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Image error: {0}")]
    #[diagnostic(code(layerport::image))]
    Image(#[from] image::ImageError),

    #[error("Parse error: {message}")]
    #[diagnostic(code(layerport::parse))]
    Parse {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("XML error: {message}")]
    #[diagnostic(code(layerport::xml))]
    Xml { message: String },

    #[error("Build error: {message}")]
    #[diagnostic(code(layerport::build))]
    Build {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Target directory no longer exists: {path}")]
    #[diagnostic(
        code(layerport::missing_directory),
        help("The directory was removed after it was selected; pick it again")
    )]
    DirectoryMissing { path: String },

    #[error("View '{name}' already exists")]
    #[diagnostic(
        code(layerport::view_exists),
        help("Pass --replace to overwrite the existing view")
    )]
    ViewExists { name: String },
}

impl ExportError {
    /// Shorthand for a build error without help text.
    pub fn build(message: impl Into<String>) -> Self {
        ExportError::Build {
            message: message.into(),
            help: None,
        }
    }

    /// Shorthand for a parse error without help text.
    pub fn parse(message: impl Into<String>) -> Self {
        ExportError::Parse {
            message: message.into(),
            help: None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;
