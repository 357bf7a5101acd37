use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DiscoveryError>;

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Timed out after {0:?} listing routing-layer services")]
    Timeout(Duration),

    #[error("Kubernetes error: {0}")]
    KubernetesError(#[from] kube::Error),

    #[error("Invalid label selector {0:?}: expected key=value")]
    InvalidLabelSelector(String),
}
