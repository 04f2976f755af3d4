use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unable to access {path}: {source}")]
    File {
        path: String,
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Config(#[from] toml::de::Error),
    #[error("Invalid game data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Typst compilation failed: {0}")]
    Typst(String),
    #[error("PDF generation failed: {0}")]
    Pdf(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn file(path: &std::path::Path, source: std::io::Error) -> Self {
        Error::File {
            path: path.display().to_string(),
            source,
        }
    }
}
