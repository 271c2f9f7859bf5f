//! Per-sandbox resolution settings.

use std::path::{Path, PathBuf};

/// One static hostname-to-address entry supplied by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtraHost {
    /// Hostname to map.
    pub name: String,
    /// Address the name resolves to.
    pub ip: String,
}

/// A request to push this sandbox's name and address into the hosts table
/// of a sandbox that depends on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentUpdate {
    /// Container ID of the dependent sandbox.
    pub container_id: String,
    /// Address to publish.
    pub ip: String,
    /// Name to publish.
    pub name: String,
}

/// Resolution settings for one sandbox.
///
/// Built once at sandbox construction; the DNS lists and extra hosts are
/// immutable snapshots of user intent. Supplying any of the DNS lists puts
/// the resolver configuration in user-managed mode, which disables
/// transparent reconciliation with host changes.
///
/// # Example
///
/// ```
/// use sandbox_dns::SandboxConfig;
///
/// let config = SandboxConfig::new()
///     .with_hostname("web1")
///     .with_domain_name("example.com")
///     .with_extra_host("db", "10.0.0.9")
///     .with_dns("1.1.1.1");
///
/// assert!(config.is_user_managed_dns());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SandboxConfig {
    pub(crate) hostname: String,
    pub(crate) domain_name: String,
    pub(crate) hosts_path: Option<PathBuf>,
    pub(crate) resolv_conf_path: Option<PathBuf>,
    pub(crate) origin_hosts_path: Option<PathBuf>,
    pub(crate) origin_resolv_conf_path: Option<PathBuf>,
    pub(crate) extra_hosts: Vec<ExtraHost>,
    pub(crate) dns_list: Vec<String>,
    pub(crate) dns_search_list: Vec<String>,
    pub(crate) dns_options_list: Vec<String>,
    pub(crate) host_network: bool,
    pub(crate) parent_updates: Vec<ParentUpdate>,
    pub(crate) ndots_set: bool,
}

impl SandboxConfig {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sandbox hostname.
    #[must_use]
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    /// Sets the sandbox domain name.
    #[must_use]
    pub fn with_domain_name(mut self, domain: impl Into<String>) -> Self {
        self.domain_name = domain.into();
        self
    }

    /// Sets an explicit hosts file path, overriding the derived default.
    #[must_use]
    pub fn with_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.hosts_path = Some(path.into());
        self
    }

    /// Sets an explicit resolver-config path, overriding the derived default.
    #[must_use]
    pub fn with_resolv_conf_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.resolv_conf_path = Some(path.into());
        self
    }

    /// Sets the host hosts file to copy or manage against.
    #[must_use]
    pub fn with_origin_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.origin_hosts_path = Some(path.into());
        self
    }

    /// Sets the host resolver config to derive from.
    #[must_use]
    pub fn with_origin_resolv_conf_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.origin_resolv_conf_path = Some(path.into());
        self
    }

    /// Adds a static hostname-to-address entry.
    #[must_use]
    pub fn with_extra_host(mut self, name: impl Into<String>, ip: impl Into<String>) -> Self {
        self.extra_hosts.push(ExtraHost {
            name: name.into(),
            ip: ip.into(),
        });
        self
    }

    /// Adds an explicit nameserver. Any explicit nameserver makes the
    /// resolver configuration user-managed.
    #[must_use]
    pub fn with_dns(mut self, nameserver: impl Into<String>) -> Self {
        self.dns_list.push(nameserver.into());
        self
    }

    /// Adds an explicit search domain.
    #[must_use]
    pub fn with_dns_search(mut self, domain: impl Into<String>) -> Self {
        self.dns_search_list.push(domain.into());
        self
    }

    /// Adds an explicit resolver option (e.g. `ndots:1`).
    #[must_use]
    pub fn with_dns_option(mut self, option: impl Into<String>) -> Self {
        self.dns_options_list.push(option.into());
        self
    }

    /// Marks the sandbox as sharing the host's network namespace.
    #[must_use]
    pub const fn with_host_network(mut self, host_network: bool) -> Self {
        self.host_network = host_network;
        self
    }

    /// Records a dependent sandbox whose hosts table must learn this
    /// sandbox's name and address.
    #[must_use]
    pub fn with_parent_update(
        mut self,
        container_id: impl Into<String>,
        ip: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        self.parent_updates.push(ParentUpdate {
            container_id: container_id.into(),
            ip: ip.into(),
            name: name.into(),
        });
        self
    }

    /// Returns the sandbox hostname.
    #[must_use]
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Returns the hosts file path, if set or already derived.
    #[must_use]
    pub fn hosts_path(&self) -> Option<&Path> {
        self.hosts_path.as_deref()
    }

    /// Returns the resolver-config path, if set or already derived.
    #[must_use]
    pub fn resolv_conf_path(&self) -> Option<&Path> {
        self.resolv_conf_path.as_deref()
    }

    /// `true` when the user supplied any nameserver, search domain, or
    /// resolver option; such configurations are static by policy.
    #[must_use]
    pub fn is_user_managed_dns(&self) -> bool {
        !self.dns_list.is_empty()
            || !self.dns_search_list.is_empty()
            || !self.dns_options_list.is_empty()
    }

    /// `true` once a user-supplied `ndots` option has been honored during
    /// an embedded-resolver rebuild.
    #[must_use]
    pub const fn ndots_set(&self) -> bool {
        self.ndots_set
    }

    /// The fully qualified name: `hostname.domain`, or the bare hostname
    /// when no domain is configured.
    #[must_use]
    pub fn fqdn(&self) -> String {
        if self.domain_name.is_empty() {
            self.hostname.clone()
        } else {
            format!("{}.{}", self.hostname, self.domain_name)
        }
    }
}
