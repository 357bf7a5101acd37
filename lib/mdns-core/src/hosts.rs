//! Hostname extraction and canonicalization
//!
//! Every non-negated `Host` clause reachable from the root contributes its first
//! argument, whatever the combinators above it. Only names under the `.local`
//! pseudo-TLD are advertisable.

use crate::rule::{Matcher, Rule};
use crate::{CoreError, Result};
use url::{Host, Url};

/// Suffix a host must end with to be advertised over mDNS
pub const LOCAL_SUFFIX: &str = ".local";

/// Collect the advertisable `.local` hosts of a rule, in traversal order.
///
/// Fails on the first `HostRegexp` clause that is not negated, since a pattern
/// cannot be advertised.
pub fn extract_hosts(rule: &Rule) -> Result<Vec<String>> {
    let mut hosts = Vec::new();
    collect_hosts(rule, &mut hosts)?;
    hosts.retain(|host| host.ends_with(LOCAL_SUFFIX));
    Ok(hosts)
}

fn collect_hosts(rule: &Rule, hosts: &mut Vec<String>) -> Result<()> {
    match rule {
        Rule::Composite { left, right, .. } => {
            collect_hosts(left, hosts)?;
            collect_hosts(right, hosts)
        }
        Rule::Clause { negated: true, .. } => Ok(()),
        Rule::Clause { matcher, args, .. } => match matcher {
            Matcher::Host => {
                let host = args.first().ok_or(CoreError::MissingArgument(Matcher::Host))?;
                hosts.push(host.clone());
                Ok(())
            }
            Matcher::HostRegexp => Err(CoreError::UnsupportedMatcher(Matcher::HostRegexp)),
            _ => Ok(()),
        },
    }
}

/// Strip the top-level label from a `.local` host.
///
/// The last label is the top-level label, the one before it the domain, and
/// anything left of that the subdomain: `svc.ns.local` becomes `svc.ns`.
pub fn canonical_name(host: &str) -> Result<String> {
    let invalid = |reason: String| CoreError::InvalidHostname {
        host: host.to_string(),
        reason,
    };

    let url = Url::parse(&format!("http://{host}")).map_err(|e| invalid(e.to_string()))?;
    let name = match url.host() {
        Some(Host::Domain(name)) => name,
        Some(_) => return Err(invalid("IP literals cannot be advertised".to_string())),
        None => return Err(invalid("missing host".to_string())),
    };

    let labels: Vec<&str> = name.split('.').collect();
    if labels.iter().any(|label| label.is_empty()) {
        return Err(invalid("empty label".to_string()));
    }
    let Some((_tld, rest)) = labels.split_last() else {
        return Err(invalid("missing host".to_string()));
    };
    let Some((domain, subdomain)) = rest.split_last() else {
        return Err(invalid("no domain below the top-level label".to_string()));
    };

    if subdomain.is_empty() {
        Ok(domain.to_string())
    } else {
        Ok(format!("{}.{}", subdomain.join("."), domain))
    }
}
