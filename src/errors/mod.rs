use thiserror::Error;

pub type Result<T> = std::result::Result<T, RecommenderError>;

/// Every failure the recommender core can report
#[derive(Debug, Error)]
pub enum RecommenderError {
    #[error("schema error in table '{table}': {message}")]
    Schema { table: String, message: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("cannot build an index over an empty matrix")]
    EmptyMatrix,

    #[error("the similarity index has not been built yet")]
    NotBuilt,

    #[error("unknown title: '{0}'")]
    UnknownTitle(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("matrix of {rows}x{cols} exceeds the limit of {max_cells} cells")]
    MatrixTooLarge {
        rows: usize,
        cols: usize,
        max_cells: usize,
    },

    #[error("k must be greater than zero")]
    InvalidK,

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to (de)serialize artifact '{name}': {source}")]
    Serialization {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

impl RecommenderError {
    pub fn schema(table: &str, message: impl Into<String>) -> Self {
        Self::Schema {
            table: table.to_string(),
            message: message.into(),
        }
    }

    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    /// Fatal errors abort a run; the rest are for the caller to correct
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::EmptyMatrix
                | Self::NotBuilt
                | Self::UnknownTitle(_)
                | Self::InvalidK
                | Self::MatrixTooLarge { .. }
        )
    }
}
