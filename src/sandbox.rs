//! Per-sandbox reconciliation of resolver configuration and hosts tables.
//!
//! A [`Sandbox`] owns the two resolution files its processes consult and
//! keeps them consistent with the host's configuration, user overrides, and
//! the embedded resolver, without clobbering edits a user makes to the
//! files after the sandbox starts. Out-of-band edits are detected through a
//! fingerprint sidecar next to the resolver config; on mismatch the file is
//! skipped, never merged.

use std::io::Write as _;
use std::os::unix::fs::PermissionsExt as _;
use std::path::{Path, PathBuf};

use crate::config::SandboxConfig;
use crate::error::{DnsError, Result};
use crate::etchosts::{self, Record};
use crate::resolvconf::{self, IpFamily};
use crate::resolver::{
    ExtDnsEntry, NameResolver, NamespaceContext, RESOLVER_IP, extract_external_resolvers,
};
use crate::util;

/// Base directory for derived per-sandbox file paths.
const DEFAULT_PREFIX: &str = "/var/lib/sandbox-dns";

/// Mode bits for files this module writes.
const FILE_MODE: u32 = 0o644;

/// Locates live sandboxes so service records can be pushed into their
/// hosts tables.
pub trait SandboxRegistry {
    /// Hosts file path of the live sandbox for `container_id`; `None` when
    /// that sandbox no longer exists or has not materialized a hosts file.
    fn hosts_path(&self, container_id: &str) -> Option<PathBuf>;
}

/// What a reconciliation pass did to the resolver configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Content and fingerprint were rewritten.
    Updated,
    /// The configuration is static by policy (host network or explicit
    /// user overrides) and is never reconciled.
    Static,
    /// No configuration file has been materialized yet.
    Missing,
    /// The file was edited out of band; it was left untouched.
    ExternallyModified,
}

/// A container network sandbox's name-resolution state.
///
/// Construct one per sandbox, then:
///
/// 1. [`setup_resolution_files`](Self::setup_resolution_files) at creation,
/// 2. [`update_dns`](Self::update_dns) when IPv6 availability changes,
/// 3. [`update_hosts_file`](Self::update_hosts_file) /
///    [`delete_hosts_entries`](Self::delete_hosts_entries) as dynamic
///    endpoints come and go,
/// 4. [`start_resolver`](Self::start_resolver) to install the embedded
///    resolver, at most once.
///
/// Concurrent callers serialize through whatever synchronization owns the
/// `Sandbox` itself; no operation takes internal locks.
pub struct Sandbox {
    id: String,
    config: SandboxConfig,
    ext_dns: Vec<ExtDnsEntry>,
    resolver: Option<Box<dyn NameResolver>>,
    resolver_started: bool,
}

impl Sandbox {
    /// Creates the resolution state for sandbox `id`.
    #[must_use]
    pub fn new(id: impl Into<String>, config: SandboxConfig) -> Self {
        Self {
            id: id.into(),
            config,
            ext_dns: Vec::new(),
            resolver: None,
            resolver_started: false,
        }
    }

    /// The sandbox ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The sandbox's resolution settings.
    #[must_use]
    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    /// External nameservers recorded for the embedded resolver to forward to.
    #[must_use]
    pub fn ext_dns(&self) -> &[ExtDnsEntry] {
        &self.ext_dns
    }

    /// `true` while an embedded resolver is installed for this sandbox.
    #[must_use]
    pub fn resolver_installed(&self) -> bool {
        self.resolver.is_some()
    }

    /// Materializes the hosts file and resolver configuration for a newly
    /// created sandbox, and publishes its name to dependent sandboxes.
    ///
    /// # Errors
    ///
    /// Returns the first hard I/O error; missing origin files are tolerated.
    pub fn setup_resolution_files(&mut self, registry: &dyn SandboxRegistry) -> Result<()> {
        self.build_hosts_file()?;
        self.update_parent_hosts(registry)?;
        self.setup_dns()
    }

    // -----------------------------------------------------------------------
    // Hosts table
    // -----------------------------------------------------------------------

    /// Builds the sandbox's hosts file.
    ///
    /// Host-network sandboxes with no extra hosts get a verbatim copy of the
    /// origin hosts file (a missing origin is not an error). Everything else
    /// gets a fresh table built from the hostname, domain, and extra hosts.
    ///
    /// # Errors
    ///
    /// Returns [`DnsError::Io`] or [`DnsError::CopyOrigin`] on write failure.
    pub fn build_hosts_file(&mut self) -> Result<()> {
        let hosts_path = self.ensure_hosts_path();
        util::ensure_parent_dir(&hosts_path)?;

        if self.config.host_network && self.config.extra_hosts.is_empty() {
            let origin = self.config.origin_hosts_path.clone().unwrap_or_default();
            match util::copy_file(&origin, &hosts_path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(source) => {
                    return Err(DnsError::CopyOrigin {
                        src: origin.display().to_string(),
                        dst: hosts_path.display().to_string(),
                        source,
                    });
                }
            }
            return Ok(());
        }

        let extra: Vec<Record> = self
            .config
            .extra_hosts
            .iter()
            .map(|h| Record::new(h.ip.clone(), &h.name))
            .collect();
        etchosts::build(
            &hosts_path,
            "",
            &self.config.hostname,
            &self.config.domain_name,
            &extra,
        )?;
        tracing::debug!(
            sandbox = %self.id,
            path = %hosts_path.display(),
            extra = extra.len(),
            "Built sandbox hosts file"
        );
        Ok(())
    }

    /// Registers the sandbox's own name for the given interface addresses:
    /// one record per address, mapping the fully qualified name and, when it
    /// contains a dot, the bare first label as well.
    ///
    /// No-op without addresses, and for sandboxes whose hosts file is a
    /// verbatim origin copy (those are not dynamically managed).
    pub fn update_hosts_file(&self, iface_ips: &[String]) {
        if iface_ips.is_empty() || self.config.origin_hosts_path.is_some() {
            return;
        }

        let fqdn = self.config.fqdn();
        let mut names = fqdn.clone();
        if let Some((bare, _)) = fqdn.split_once('.') {
            names.push(' ');
            names.push_str(bare);
        }

        let records: Vec<Record> = iface_ips
            .iter()
            .map(|ip| Record::new(ip.clone(), &names))
            .collect();
        self.add_hosts_entries(&records);
    }

    /// Adds service records to the hosts table, best effort: failures are
    /// logged and swallowed so a failed dynamic update never aborts the
    /// caller's broader operation. Repeated adds are idempotent per record.
    pub fn add_hosts_entries(&self, records: &[Record]) {
        let Some(path) = self.config.hosts_path.as_deref() else {
            tracing::warn!(sandbox = %self.id, "No hosts file to add service entries to");
            return;
        };
        if let Err(err) = etchosts::add(path, records) {
            tracing::warn!(
                sandbox = %self.id,
                error = %err,
                "Failed adding service host entries"
            );
        }
    }

    /// Removes service records from the hosts table, best effort like
    /// [`add_hosts_entries`](Self::add_hosts_entries).
    pub fn delete_hosts_entries(&self, records: &[Record]) {
        let Some(path) = self.config.hosts_path.as_deref() else {
            return;
        };
        if let Err(err) = etchosts::delete(path, records) {
            tracing::warn!(
                sandbox = %self.id,
                error = %err,
                "Failed deleting service host entries"
            );
        }
    }

    /// Pushes this sandbox's recorded name/address mappings into the hosts
    /// tables of the sandboxes that depend on it. A dependent that no
    /// longer exists is skipped silently.
    ///
    /// # Errors
    ///
    /// Propagates the first hard I/O error from a dependent's table.
    pub fn update_parent_hosts(&self, registry: &dyn SandboxRegistry) -> Result<()> {
        for update in &self.config.parent_updates {
            let Some(hosts_path) = registry.hosts_path(&update.container_id) else {
                tracing::debug!(
                    sandbox = %self.id,
                    container = %update.container_id,
                    "Dependent sandbox is gone, skipping hosts update"
                );
                continue;
            };
            etchosts::update(&hosts_path, &update.ip, &update.name)?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Resolver configuration
    // -----------------------------------------------------------------------

    /// Builds the sandbox's initial resolver configuration.
    ///
    /// Host-network sandboxes with no DNS overrides get a verbatim copy of
    /// the origin config (an empty file if the origin is missing) and no
    /// fingerprint: verbatim copies are not self-managed. With user
    /// overrides, each unset category falls back to the origin's value and
    /// the merged triple is written. Otherwise the origin config is copied
    /// with loopback nameservers replaced. In both self-managed cases the
    /// content fingerprint is persisted next to the file and the external
    /// nameservers implied by the result are recorded for the embedded
    /// resolver.
    ///
    /// # Errors
    ///
    /// Returns [`DnsError::Io`] or [`DnsError::CopyOrigin`] on read/write
    /// failure; missing origin files are tolerated.
    pub fn setup_dns(&mut self) -> Result<()> {
        let resolv_path = self.ensure_resolv_conf_path();
        util::ensure_parent_dir(&resolv_path)?;

        if self.config.host_network && !self.config.is_user_managed_dns() {
            let origin = self.config.origin_resolv_conf_path.clone().unwrap_or_default();
            match util::copy_file(&origin, &resolv_path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::info!(
                        origin = %origin.display(),
                        "Origin resolv.conf does not exist, creating an empty one"
                    );
                    util::touch(&resolv_path)?;
                }
                Err(source) => {
                    return Err(DnsError::CopyOrigin {
                        src: origin.display().to_string(),
                        dst: resolv_path.display().to_string(),
                        source,
                    });
                }
            }
            return Ok(());
        }

        let origin_path = self
            .config
            .origin_resolv_conf_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(resolvconf::DEFAULT_PATH));
        let origin_content = match std::fs::read_to_string(&origin_path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(
                    path = %origin_path.display(),
                    "No resolv.conf found, falling back to default nameservers"
                );
                String::new()
            }
            Err(e) => return Err(e.into()),
        };

        if self.config.is_user_managed_dns() {
            let nameservers = if self.config.dns_list.is_empty() {
                resolvconf::get_nameservers(&origin_content, IpFamily::All)
            } else {
                self.config.dns_list.clone()
            };
            let search = if self.config.dns_search_list.is_empty() {
                resolvconf::get_search_domains(&origin_content)
            } else {
                self.config.dns_search_list.clone()
            };
            let options = if self.config.dns_options_list.is_empty() {
                resolvconf::get_options(&origin_content)
            } else {
                self.config.dns_options_list.clone()
            };
            let built = resolvconf::build(&resolv_path, &nameservers, &search, &options)?;
            // An explicit 127.0.0.x nameserver refers to the sandbox's own
            // loopback; only fallback nameservers are host-loopback-checked.
            let check_loopback = self.config.dns_list.is_empty();
            self.record_external_resolvers(&built.content, IpFamily::V4, check_loopback);
        } else {
            // A host loopback resolver is reachable only through the
            // embedded resolver, so record it before filtering it out.
            self.record_external_resolvers(&origin_content, IpFamily::V4, true);
            // IPv6 availability is unknown at this point; keep IPv6 servers.
            let filtered = resolvconf::filter(&origin_content, true);
            std::fs::write(&resolv_path, &filtered.content)?;
            std::fs::write(
                resolvconf::hash_path_for(&resolv_path),
                &filtered.fingerprint,
            )?;
        }

        Ok(())
    }

    /// Reconciles the resolver configuration after a runtime change, the
    /// IPv6 toggle in particular: loopback nameservers are replaced and,
    /// with `ipv6_enabled` false, IPv6 nameservers are stripped.
    ///
    /// The file is rewritten only when its fingerprint still matches the
    /// sidecar, i.e. nobody edited it out of band since the last write. The
    /// new fingerprint is committed atomically (directory-local temp file
    /// renamed over the sidecar); the content write before it is not atomic,
    /// so a crash between the two leaves a mismatch that the next pass
    /// treats as an external edit and skips. Known limitation.
    ///
    /// # Errors
    ///
    /// Returns [`DnsError::Io`] on read/write failure.
    pub fn update_dns(&mut self, ipv6_enabled: bool) -> Result<UpdateOutcome> {
        if self.config.host_network || self.config.is_user_managed_dns() {
            return Ok(UpdateOutcome::Static);
        }
        let Some(resolv_path) = self.config.resolv_conf_path.clone() else {
            return Ok(UpdateOutcome::Missing);
        };

        let curr = match resolvconf::load(&resolv_path) {
            Ok(rc) => rc,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(UpdateOutcome::Missing);
            }
            Err(e) => return Err(e.into()),
        };
        let hash_path = resolvconf::hash_path_for(&resolv_path);
        let curr_hash = match std::fs::read_to_string(&hash_path) {
            Ok(hash) => hash,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };

        if !curr_hash.is_empty() && curr_hash != curr.fingerprint {
            tracing::debug!(
                sandbox = %self.id,
                path = %resolv_path.display(),
                "resolv.conf was touched by the user, skipping update"
            );
            return Ok(UpdateOutcome::ExternallyModified);
        }

        let new_rc = resolvconf::filter(&curr.content, ipv6_enabled);
        std::fs::write(&resolv_path, &new_rc.content)?;

        let dir = resolv_path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(FILE_MODE))?;
        tmp.write_all(new_rc.fingerprint.as_bytes())?;
        tmp.persist(&hash_path).map_err(|e| DnsError::Io(e.error))?;

        tracing::debug!(
            sandbox = %self.id,
            ipv6_enabled,
            "Reconciled resolv.conf"
        );
        Ok(UpdateOutcome::Updated)
    }

    /// Rebuilds the resolver configuration so the embedded resolver becomes
    /// the primary nameserver: its address leads the nameserver list,
    /// followed by any IPv6 nameservers already present (IPv6 traffic
    /// bypasses the IPv4-only embedded resolver). Search domains are
    /// preserved. If both the user and the embedded resolver set `ndots`, a
    /// valid non-negative user value wins and the resolver's options are not
    /// appended; a malformed or negative user value is a hard error.
    ///
    /// # Errors
    ///
    /// [`DnsError::ResolverNotInstalled`] before
    /// [`start_resolver`](Self::start_resolver) has installed a resolver,
    /// [`DnsError::InvalidNdots`] for a defective user `ndots` option, or
    /// [`DnsError::Io`] on read/write failure.
    pub fn rebuild_dns(&mut self) -> Result<()> {
        let Some(resolver) = self.resolver.as_ref() else {
            return Err(DnsError::ResolverNotInstalled);
        };
        let resolver_options = resolver.resolver_options();
        let resolver_addr = resolver.nameserver().to_string();

        let resolv_path = self.ensure_resolv_conf_path();
        let curr = std::fs::read_to_string(&resolv_path)?;
        let mut options = resolvconf::get_options(&curr);

        if resolver_options.iter().any(|opt| opt.contains("ndots")) {
            for option in &options {
                if !option.contains("ndots") {
                    continue;
                }
                let value = option
                    .split_once(':')
                    .map(|(_, v)| v)
                    .ok_or_else(|| DnsError::InvalidNdots(option.clone()))?;
                match value.parse::<i32>() {
                    Ok(n) if n >= 0 => self.config.ndots_set = true,
                    _ => return Err(DnsError::InvalidNdots(option.clone())),
                }
                break;
            }
        }
        if !self.config.ndots_set {
            // Pin ndots low so short service-name lookups resolve first.
            options.extend(resolver_options);
        }

        if self.ext_dns.is_empty() {
            self.record_external_resolvers(&curr, IpFamily::V4, false);
        }

        // External IPv6 upstreams must stay listed for direct reachability.
        let mut nameservers = vec![resolver_addr];
        nameservers.extend(resolvconf::get_nameservers(&curr, IpFamily::V6));
        let search = resolvconf::get_search_domains(&curr);

        resolvconf::build(&resolv_path, &nameservers, &search, &options)?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Embedded resolver lifecycle
    // -----------------------------------------------------------------------

    /// Installs and starts the embedded resolver, exactly once per sandbox:
    /// repeat calls return immediately, whether the first attempt succeeded
    /// or failed. Failures at any step are logged, the resolver handle is
    /// discarded, and nothing is retried or propagated; the sandbox then
    /// simply runs without an embedded resolver.
    ///
    /// With `restore` set (live restore), the resolver configuration already
    /// reflects the desired end state and the rebuild is skipped.
    pub fn start_resolver<F>(&mut self, restore: bool, ns: &dyn NamespaceContext, new_resolver: F)
    where
        F: FnOnce(&str, bool) -> Box<dyn NameResolver>,
    {
        if self.resolver_started {
            return;
        }
        self.resolver_started = true;

        // Proxying of external queries is always on; making connect fail
        // fast without external connectivity is the network driver's job.
        self.resolver = Some(new_resolver(RESOLVER_IP, true));

        if !restore {
            if let Err(err) = self.rebuild_dns() {
                tracing::error!(
                    sandbox = %self.id,
                    error = %err,
                    "Updating resolv.conf for the embedded resolver failed"
                );
                self.resolver = None;
                return;
            }
        }

        let Some(mut resolver) = self.resolver.take() else {
            return;
        };
        resolver.set_external_servers(&self.ext_dns);

        if let Err(err) = ns.invoke(resolver.setup_func()) {
            tracing::error!(
                sandbox = %self.id,
                error = %err,
                "Resolver namespace setup failed"
            );
            return;
        }
        if let Err(err) = resolver.start() {
            tracing::error!(sandbox = %self.id, error = %err, "Resolver start failed");
            return;
        }
        self.resolver = Some(resolver);
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn record_external_resolvers(&mut self, content: &str, family: IpFamily, check_loopback: bool) {
        self.ext_dns
            .extend(extract_external_resolvers(content, family, check_loopback));
    }

    fn ensure_hosts_path(&mut self) -> PathBuf {
        self.config
            .hosts_path
            .get_or_insert_with(|| default_file_path(&self.id, "hosts"))
            .clone()
    }

    fn ensure_resolv_conf_path(&mut self) -> PathBuf {
        self.config
            .resolv_conf_path
            .get_or_insert_with(|| default_file_path(&self.id, "resolv.conf"))
            .clone()
    }
}

fn default_file_path(sandbox_id: &str, file: &str) -> PathBuf {
    [DEFAULT_PREFIX, sandbox_id, file].iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SandboxConfig;

    struct EmptyRegistry;

    impl SandboxRegistry for EmptyRegistry {
        fn hosts_path(&self, _container_id: &str) -> Option<PathBuf> {
            None
        }
    }

    fn sandbox_in(dir: &Path, config: SandboxConfig) -> Sandbox {
        Sandbox::new(
            "sb1",
            config
                .with_hosts_path(dir.join("hosts"))
                .with_resolv_conf_path(dir.join("resolv.conf")),
        )
    }

    #[test]
    fn default_paths_derive_once_and_stick() {
        let mut sb = Sandbox::new("abc123", SandboxConfig::new());
        let hosts = sb.ensure_hosts_path();
        let resolv = sb.ensure_resolv_conf_path();

        assert_eq!(hosts, Path::new("/var/lib/sandbox-dns/abc123/hosts"));
        assert_eq!(resolv, Path::new("/var/lib/sandbox-dns/abc123/resolv.conf"));
        assert_eq!(sb.ensure_hosts_path(), hosts);

        // Explicit paths are never overridden.
        let mut sb = Sandbox::new(
            "abc123",
            SandboxConfig::new().with_hosts_path("/custom/hosts"),
        );
        assert_eq!(sb.ensure_hosts_path(), Path::new("/custom/hosts"));
    }

    #[test]
    fn build_hosts_file_writes_extra_hosts() {
        let dir = tempfile::tempdir().unwrap();
        let mut sb = sandbox_in(
            dir.path(),
            SandboxConfig::new()
                .with_hostname("web1")
                .with_extra_host("db", "10.0.0.9"),
        );

        sb.build_hosts_file().unwrap();

        let content = std::fs::read_to_string(dir.path().join("hosts")).unwrap();
        assert!(content.starts_with("127.0.0.1\tlocalhost\n"));
        assert!(content.contains("10.0.0.9\tdb\n"));
    }

    #[test]
    fn host_network_hosts_copies_origin_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let origin = dir.path().join("origin-hosts");
        std::fs::write(&origin, "127.0.0.1 localhost\n10.1.1.1 host-entry\n").unwrap();

        let mut sb = sandbox_in(
            dir.path(),
            SandboxConfig::new()
                .with_host_network(true)
                .with_origin_hosts_path(&origin),
        );
        sb.build_hosts_file().unwrap();

        assert_eq!(
            std::fs::read_to_string(dir.path().join("hosts")).unwrap(),
            "127.0.0.1 localhost\n10.1.1.1 host-entry\n"
        );
    }

    #[test]
    fn host_network_hosts_missing_origin_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let mut sb = sandbox_in(
            dir.path(),
            SandboxConfig::new()
                .with_host_network(true)
                .with_origin_hosts_path(dir.path().join("absent")),
        );
        sb.build_hosts_file().unwrap();
        assert!(!dir.path().join("hosts").exists());
    }

    #[test]
    fn update_hosts_file_records_fqdn_and_bare_label() {
        let dir = tempfile::tempdir().unwrap();
        let mut sb = sandbox_in(
            dir.path(),
            SandboxConfig::new()
                .with_hostname("web1")
                .with_domain_name("example.com"),
        );
        sb.build_hosts_file().unwrap();

        sb.update_hosts_file(&["10.0.0.5".to_string()]);

        let content = std::fs::read_to_string(dir.path().join("hosts")).unwrap();
        assert!(content.contains("10.0.0.5\tweb1.example.com web1\n"));
    }

    #[test]
    fn update_hosts_file_bare_hostname_single_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut sb = sandbox_in(dir.path(), SandboxConfig::new().with_hostname("web1"));
        sb.build_hosts_file().unwrap();

        sb.update_hosts_file(&["10.0.0.5".to_string()]);

        let content = std::fs::read_to_string(dir.path().join("hosts")).unwrap();
        assert!(content.contains("10.0.0.5\tweb1\n"));
        assert!(!content.contains("web1 web1"));
    }

    #[test]
    fn update_hosts_file_skips_origin_managed() {
        let dir = tempfile::tempdir().unwrap();
        let hosts = dir.path().join("hosts");
        std::fs::write(&hosts, "127.0.0.1 localhost\n").unwrap();

        let sb = Sandbox::new(
            "sb1",
            SandboxConfig::new()
                .with_hostname("web1")
                .with_hosts_path(&hosts)
                .with_origin_hosts_path(dir.path().join("origin")),
        );
        sb.update_hosts_file(&["10.0.0.5".to_string()]);

        assert_eq!(
            std::fs::read_to_string(&hosts).unwrap(),
            "127.0.0.1 localhost\n"
        );
    }

    #[test]
    fn add_and_delete_entries_swallow_failures() {
        // No hosts file exists; both calls must only log.
        let dir = tempfile::tempdir().unwrap();
        let sb = sandbox_in(dir.path(), SandboxConfig::new());
        let recs = [Record::new("10.0.0.5", "svc")];
        sb.add_hosts_entries(&recs);
        sb.delete_hosts_entries(&recs);
    }

    #[test]
    fn update_parent_hosts_missing_parent_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let sb = sandbox_in(
            dir.path(),
            SandboxConfig::new().with_parent_update("gone", "10.0.0.2", "web1"),
        );
        sb.update_parent_hosts(&EmptyRegistry).unwrap();
    }

    #[test]
    fn setup_dns_user_lists_merge_with_origin() {
        let dir = tempfile::tempdir().unwrap();
        let origin = dir.path().join("origin-resolv.conf");
        std::fs::write(
            &origin,
            "nameserver 10.0.0.2\nsearch host.example\noptions timeout:2\n",
        )
        .unwrap();

        let mut sb = sandbox_in(
            dir.path(),
            SandboxConfig::new()
                .with_dns("1.1.1.1")
                .with_origin_resolv_conf_path(&origin),
        );
        sb.setup_dns().unwrap();

        let content = std::fs::read_to_string(dir.path().join("resolv.conf")).unwrap();
        // User nameserver, origin search and options.
        assert_eq!(
            content,
            "nameserver 1.1.1.1\nsearch host.example\noptions timeout:2\n"
        );
    }

    #[test]
    fn setup_dns_explicit_loopback_dns_not_flagged() {
        let dir = tempfile::tempdir().unwrap();
        let mut sb = sandbox_in(
            dir.path(),
            SandboxConfig::new()
                .with_dns("127.0.0.1")
                .with_origin_resolv_conf_path(dir.path().join("absent")),
        );
        sb.setup_dns().unwrap();

        // --dns 127.0.0.1 refers to the sandbox's own namespace.
        assert_eq!(sb.ext_dns().len(), 1);
        assert!(!sb.ext_dns()[0].host_loopback);
    }

    #[test]
    fn setup_dns_records_host_loopback_then_filters() {
        let dir = tempfile::tempdir().unwrap();
        let origin = dir.path().join("origin-resolv.conf");
        std::fs::write(&origin, "nameserver 127.0.0.53\nnameserver 8.8.8.8\n").unwrap();

        let mut sb = sandbox_in(
            dir.path(),
            SandboxConfig::new().with_origin_resolv_conf_path(&origin),
        );
        sb.setup_dns().unwrap();

        // Both recorded, loopback flagged.
        assert_eq!(sb.ext_dns().len(), 2);
        assert!(sb.ext_dns()[0].host_loopback);
        assert!(!sb.ext_dns()[1].host_loopback);

        // Loopback filtered out of the written file.
        let content = std::fs::read_to_string(dir.path().join("resolv.conf")).unwrap();
        assert_eq!(content, "nameserver 8.8.8.8\n");
    }

    #[test]
    fn update_dns_static_modes() {
        let dir = tempfile::tempdir().unwrap();

        let mut host_net =
            sandbox_in(dir.path(), SandboxConfig::new().with_host_network(true));
        assert_eq!(host_net.update_dns(true).unwrap(), UpdateOutcome::Static);

        let mut user_managed = sandbox_in(dir.path(), SandboxConfig::new().with_dns("1.1.1.1"));
        assert_eq!(user_managed.update_dns(true).unwrap(), UpdateOutcome::Static);
    }

    #[test]
    fn update_dns_missing_file_short_circuits() {
        let dir = tempfile::tempdir().unwrap();
        let mut sb = sandbox_in(dir.path(), SandboxConfig::new());
        assert_eq!(sb.update_dns(true).unwrap(), UpdateOutcome::Missing);
    }

    #[test]
    fn update_dns_strips_ipv6_when_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let origin = dir.path().join("origin-resolv.conf");
        std::fs::write(
            &origin,
            "nameserver 8.8.8.8\nnameserver 2001:4860:4860::8888\n",
        )
        .unwrap();

        let mut sb = sandbox_in(
            dir.path(),
            SandboxConfig::new().with_origin_resolv_conf_path(&origin),
        );
        sb.setup_dns().unwrap();
        assert_eq!(sb.update_dns(false).unwrap(), UpdateOutcome::Updated);

        let content = std::fs::read_to_string(dir.path().join("resolv.conf")).unwrap();
        assert_eq!(content, "nameserver 8.8.8.8\n");
    }
}
