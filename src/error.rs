use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {key}: {value}")]
    InvalidSetting { key: &'static str, value: String },

    #[error("failed to render image: {0}")]
    Image(String),

    #[error("server error: {0}")]
    Server(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_names_the_path() {
        let source = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = Error::io("content/blog/hello.mdx", source);
        let msg = err.to_string();
        assert!(msg.contains("content/blog/hello.mdx"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn invalid_setting_display() {
        let err = Error::InvalidSetting {
            key: "PORT",
            value: "eighty".to_string(),
        };
        assert_eq!(err.to_string(), "invalid value for PORT: eighty");
    }

    #[test]
    fn image_error_display() {
        let err = Error::Image("bad svg".to_string());
        assert_eq!(err.to_string(), "failed to render image: bad svg");
    }
}
