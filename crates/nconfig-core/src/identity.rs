//! Machine identity candidates
//!
//! Produces the ordered list of identity strings used to look up this
//! machine in the environments-definitions document: FQDN first, then the
//! short hostname, the domain, then every bound IP address. Lookup
//! failures degrade to whatever was gathered so far; this never fails.

use std::net::IpAddr;

/// Source of identity candidates, in priority order (most specific
/// first). Injectable so resolution is testable with fixed candidates.
pub trait Identity: Send + Sync {
    fn candidate_keys(&self) -> Vec<String>;
}

/// Identity derived from the host's network configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostIdentity;

impl HostIdentity {
    pub fn new() -> Self {
        Self
    }
}

impl Identity for HostIdentity {
    fn candidate_keys(&self) -> Vec<String> {
        let Some(host) = local_hostname() else {
            tracing::warn!("Could not determine local hostname");
            return Vec::new();
        };

        let addresses = match dns_lookup::lookup_host(&host) {
            Ok(addrs) => addrs,
            Err(e) => {
                // DNS failure: fall back to the name we already have.
                tracing::debug!(host = %host, error = %e, "Hostname lookup failed");
                return finalize(split_name(&host), Vec::new());
            }
        };

        let fqdn = reverse_name(&addresses).or_else(|| host.contains('.').then(|| host.clone()));
        let mut names = Vec::new();
        if let Some(fqdn) = fqdn {
            let (short, domain) = match fqdn.split_once('.') {
                Some((short, domain)) => (short.to_string(), Some(domain.to_string())),
                None => (fqdn.clone(), None),
            };
            names.push(fqdn);
            names.push(short);
            if let Some(domain) = domain {
                names.push(domain);
            }
        } else {
            names = split_name(&host);
        }

        finalize(names, addresses)
    }
}

/// Fixed candidate list, for hosts that want to pin their identity and
/// for tests.
#[derive(Debug, Clone)]
pub struct FixedIdentity {
    candidates: Vec<String>,
}

impl FixedIdentity {
    pub fn new(candidates: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            candidates: candidates.into_iter().map(Into::into).collect(),
        }
    }
}

impl Identity for FixedIdentity {
    fn candidate_keys(&self) -> Vec<String> {
        finalize(self.candidates.clone(), Vec::new())
    }
}

fn local_hostname() -> Option<String> {
    hostname::get().ok().map(|h| h.to_string_lossy().into_owned())
}

/// Reverse-resolve the first address that yields a dotted name.
fn reverse_name(addresses: &[IpAddr]) -> Option<String> {
    addresses
        .iter()
        .filter(|a| !a.is_loopback())
        .find_map(|a| dns_lookup::lookup_addr(a).ok())
        .filter(|name| name.contains('.'))
}

/// Expand a possibly-qualified name into [fqdn, short, domain] order.
fn split_name(name: &str) -> Vec<String> {
    match name.split_once('.') {
        Some((short, domain)) => vec![name.to_string(), short.to_string(), domain.to_string()],
        None => vec![name.to_string()],
    }
}

/// Lowercase, append addresses, drop duplicates preserving order.
fn finalize(names: Vec<String>, addresses: Vec<IpAddr>) -> Vec<String> {
    let mut keys: Vec<String> = names
        .into_iter()
        .map(|n| n.to_lowercase())
        .chain(addresses.iter().map(|a| a.to_string().to_lowercase()))
        .collect();
    let mut seen = std::collections::BTreeSet::new();
    keys.retain(|k| !k.is_empty() && seen.insert(k.clone()));
    keys
}
