//! Embedded-resolver and namespace-entry contracts.
//!
//! The embedded DNS proxy itself lives outside this crate; the sandbox only
//! depends on the narrow surface below to point resolution at it, hand it
//! the external upstreams, and run its socket setup inside the sandbox's
//! network namespace.

use std::io;
use std::net::IpAddr;
use std::os::unix::io::RawFd;

use crate::resolvconf::{self, IpFamily};

/// Fixed sandbox-local address every embedded resolver binds to.
pub const RESOLVER_IP: &str = "127.0.0.11";

/// One nameserver the embedded resolver may forward external queries to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtDnsEntry {
    /// The nameserver address as written in the configuration.
    pub address: String,
    /// `true` when the address is an IPv4 loopback that refers to a
    /// resolver bound in the *host's* namespace, not the sandbox's own.
    pub host_loopback: bool,
}

/// Surface of the embedded DNS proxy the sandbox drives.
pub trait NameResolver: Send {
    /// Address the resolver serves on inside the sandbox.
    fn nameserver(&self) -> &str;

    /// Resolver options the proxy wants in the sandbox's configuration
    /// (e.g. a low `ndots` to prioritize short service-name lookups).
    fn resolver_options(&self) -> Vec<String>;

    /// Supplies the upstream nameservers for forwarded queries.
    fn set_external_servers(&mut self, servers: &[ExtDnsEntry]);

    /// Closure to run with the sandbox's namespace descriptor before
    /// [`start`](Self::start); binds the resolver's sockets in there.
    fn setup_func(&mut self) -> Box<dyn FnOnce(RawFd) -> io::Result<()> + Send>;

    /// Begins serving queries.
    ///
    /// # Errors
    ///
    /// Returns [`io::Error`] if the resolver cannot start serving.
    fn start(&mut self) -> io::Result<()>;
}

/// Capability to run a closure with a descriptor for the sandbox's network
/// namespace, supplied by the sandbox's execution context.
pub trait NamespaceContext {
    /// Invokes `func` with the namespace descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`io::Error`] if the namespace cannot be entered or the
    /// closure itself fails.
    fn invoke(&self, func: Box<dyn FnOnce(RawFd) -> io::Result<()> + Send>) -> io::Result<()>;
}

/// Extracts the nameservers of `family` from resolver-config content.
///
/// With `check_loopback`, IPv4 loopback addresses are flagged as
/// [`host_loopback`](ExtDnsEntry::host_loopback): seen from inside a
/// sandbox, such an address can only mean a resolver bound on the host's
/// loopback. Malformed lines are skipped; this never fails.
#[must_use]
pub fn extract_external_resolvers(
    content: &str,
    family: IpFamily,
    check_loopback: bool,
) -> Vec<ExtDnsEntry> {
    resolvconf::get_nameservers(content, family)
        .into_iter()
        .map(|address| ExtDnsEntry {
            host_loopback: check_loopback && is_ipv4_loopback(&address),
            address,
        })
        .collect()
}

/// IPv4 loopback (127.0.0.0/8), including the IPv4-mapped IPv6 form.
fn is_ipv4_loopback(address: &str) -> bool {
    match address.parse() {
        Ok(IpAddr::V4(v4)) => v4.octets()[0] == 127,
        Ok(IpAddr::V6(v6)) => v6.to_ipv4_mapped().is_some_and(|v4| v4.octets()[0] == 127),
        Err(_) => false,
    }
}
