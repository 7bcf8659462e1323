use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum PeekError {
    #[error("{0}")]
    Configuration(String),

    #[error("the server doesn't have a resource type \"{0}\"")]
    UnknownResource(String),

    #[error("failed to list {resource}: {source}")]
    RemoteQuery {
        resource: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to read keystroke: {0}")]
    Input(#[source] std::io::Error),

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl PeekError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn remote(resource: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::RemoteQuery {
            resource: resource.into(),
            source: source.into(),
        }
    }
}
