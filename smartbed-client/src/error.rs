#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A 200 response whose body is not a valid status payload
    #[error("Malformed status payload from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Settings error: {0}")]
    Settings(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
