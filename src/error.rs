use thiserror::Error;

use crate::unpack::UnpackError;

/// When things go awry above the wire-decode layer.
#[derive(Debug, Error)]
pub enum MailDnsError {
    /// Something was wrong with the configuration file.
    #[error("bad configuration: {0}")]
    Config(#[from] config::ConfigError),
    /// A payload or name failed to decode.
    #[error("decode error: {0}")]
    Unpack(#[from] UnpackError),
}
