//! Discovery of the addresses the routing layer is reachable on
pub mod error;
pub mod resolver;

pub use error::DiscoveryError;
pub use resolver::{load_balancer_ips, RouterLabel, ServiceIpResolver};
