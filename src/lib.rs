//! # sandbox-dns
//!
//! Reconcile the name-resolution files of container network sandboxes.
//!
//! Every sandbox carries two files its processes consult: a resolver
//! configuration (`resolv.conf`) and a static hosts table. This crate keeps
//! both consistent with the host's own configuration, user-supplied
//! overrides (nameservers, search domains, resolver options, extra hosts),
//! and an embedded DNS proxy that may be installed inside the sandbox's
//! namespace. It stays correct across repeated invocation from independent
//! triggers, and never clobbers edits a user makes to the files after the
//! sandbox starts.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use sandbox_dns::{Sandbox, SandboxConfig};
//!
//! let config = SandboxConfig::new()
//!     .with_hostname("web1")
//!     .with_domain_name("example.com")
//!     .with_origin_resolv_conf_path("/etc/resolv.conf");
//! let mut sandbox = Sandbox::new("abc123", config);
//!
//! // At creation: materialize hosts + resolv.conf.
//! sandbox.setup_resolution_files(&registry)?;
//!
//! // When an endpoint joins: publish the sandbox's own name.
//! sandbox.update_hosts_file(&["172.17.0.2".to_string()]);
//!
//! // When IPv6 availability changes: reconcile, respecting user edits.
//! sandbox.update_dns(false)?;
//!
//! // At most once: install the embedded resolver.
//! sandbox.start_resolver(false, &namespace, |addr, proxy| {
//!     Box::new(MyResolver::new(addr, proxy))
//! });
//! ```
//!
//! ## Non-destructive reconciliation
//!
//! Each self-managed resolver configuration is written together with a
//! fingerprint sidecar (`<path>.hash`). Before rewriting, the current file
//! content is fingerprinted and compared against the sidecar; a mismatch
//! means someone edited the file out of band, and the file is skipped:
//! detect-and-skip, never merge. Host-network sandboxes that copy the
//! host's files verbatim are not self-managed and carry no fingerprint.
//!
//! ## Collaborators
//!
//! The embedded DNS proxy itself, and the capability to run a closure
//! inside the sandbox's network namespace, are supplied by the caller
//! through the [`NameResolver`] and [`NamespaceContext`] traits. Dependent
//! sandboxes are resolved through [`SandboxRegistry`].

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod etchosts;
pub mod resolvconf;
pub mod resolver;
pub mod sandbox;
mod util;

pub use config::{ExtraHost, ParentUpdate, SandboxConfig};
pub use error::{DnsError, Result};
pub use resolver::{
    ExtDnsEntry, NameResolver, NamespaceContext, RESOLVER_IP, extract_external_resolvers,
};
pub use sandbox::{Sandbox, SandboxRegistry, UpdateOutcome};
