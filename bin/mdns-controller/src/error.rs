use mdns_discovery::DiscoveryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("Record channel closed: no consumer is receiving records")]
    ChannelClosed,

    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {var_name}: {reason}")]
    InvalidValue {
        var_name: String,
        value: String,
        reason: String,
    },
}
