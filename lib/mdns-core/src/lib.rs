//! Core record pipeline for mDNS advertisement of cluster routes
//!
//! This library provides:
//! - A parser for Traefik-style rule expressions into an explicit AST
//! - Extraction and canonicalization of advertisable `.local` hostnames
//! - The `Record` type sent to the mDNS advertiser and the builder producing it

pub mod builder;
pub mod error;
pub mod hosts;
pub mod record;
pub mod rule;

pub use builder::RecordBuilder;
pub use error::{CoreError, Result};
pub use hosts::{canonical_name, extract_hosts, LOCAL_SUFFIX};
pub use record::{Action, Record};
pub use rule::{parse, Matcher, Operator, Rule};
