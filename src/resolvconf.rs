//! Resolver-configuration file format.
//!
//! Line-oriented `nameserver` / `search` / `options` parsing and building,
//! plus the content fingerprint used to detect out-of-band edits. Parsing
//! never fails: malformed lines are skipped by the getters and preserved
//! verbatim by [`filter`].

use std::fmt::Write as _;
use std::io;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

/// Conventional resolver configuration path, used as the origin fallback.
pub const DEFAULT_PATH: &str = "/etc/resolv.conf";

/// Nameservers injected when filtering leaves none behind.
const DEFAULT_V4_NAMESERVERS: &[&str] = &["8.8.8.8", "8.8.4.4"];
const DEFAULT_V6_NAMESERVERS: &[&str] = &["2001:4860:4860::8888", "2001:4860:4860::8844"];

/// Address family selector for [`get_nameservers`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpFamily {
    /// IPv4 addresses only.
    V4,
    /// IPv6 addresses only.
    V6,
    /// Both families.
    All,
}

impl IpFamily {
    const fn matches(self, addr: IpAddr) -> bool {
        match self {
            Self::V4 => addr.is_ipv4(),
            Self::V6 => addr.is_ipv6(),
            Self::All => true,
        }
    }
}

/// A resolver configuration together with its content fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvConf {
    /// The file content.
    pub content: String,
    /// Fingerprint of `content`, in `sha256:<hex>` form.
    pub fingerprint: String,
}

/// Computes the fingerprint of resolver configuration content.
#[must_use]
pub fn fingerprint(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    let mut out = String::with_capacity(7 + digest.len() * 2);
    out.push_str("sha256:");
    for byte in digest {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Sidecar path holding the fingerprint for the configuration at `config_path`.
#[must_use]
pub fn hash_path_for(config_path: &Path) -> PathBuf {
    let mut raw = config_path.as_os_str().to_os_string();
    raw.push(".hash");
    PathBuf::from(raw)
}

/// Reads the configuration at `path` and computes its fingerprint.
///
/// # Errors
///
/// Returns the underlying I/O error; `NotFound` is left to the caller to
/// interpret.
pub fn load(path: &Path) -> io::Result<ResolvConf> {
    let content = std::fs::read_to_string(path)?;
    Ok(ResolvConf {
        fingerprint: fingerprint(&content),
        content,
    })
}

/// Extracts nameserver addresses of the requested family, in file order.
#[must_use]
pub fn get_nameservers(content: &str, family: IpFamily) -> Vec<String> {
    content
        .lines()
        .filter_map(nameserver_address)
        .filter(|addr| family.matches(*addr))
        .map(|addr| addr.to_string())
        .collect()
}

/// Extracts the search domains. The last `search` line wins, matching
/// resolver semantics.
#[must_use]
pub fn get_search_domains(content: &str) -> Vec<String> {
    last_directive_fields(content, "search")
}

/// Extracts the resolver options. The last `options` line wins.
#[must_use]
pub fn get_options(content: &str) -> Vec<String> {
    last_directive_fields(content, "options")
}

/// Serializes a configuration from the given triple and writes it to `path`,
/// along with its fingerprint sidecar (see [`hash_path_for`]).
///
/// A `search` line is omitted when the joined value is empty or the bare
/// root domain `.`; an `options` line is omitted when empty.
///
/// # Errors
///
/// Returns [`io::Error`] if either file cannot be written.
pub fn build(
    path: &Path,
    nameservers: &[String],
    search: &[String],
    options: &[String],
) -> io::Result<ResolvConf> {
    let mut content = String::new();
    for ns in nameservers {
        let _ = writeln!(content, "nameserver {ns}");
    }
    let search = search.join(" ");
    if !search.trim().is_empty() && search.trim() != "." {
        let _ = writeln!(content, "search {search}");
    }
    let options = options.join(" ");
    if !options.trim().is_empty() {
        let _ = writeln!(content, "options {options}");
    }

    let rc = ResolvConf {
        fingerprint: fingerprint(&content),
        content,
    };
    std::fs::write(path, &rc.content)?;
    std::fs::write(hash_path_for(path), &rc.fingerprint)?;
    Ok(rc)
}

/// Rewrites `content` with loopback nameservers removed and, when
/// `ipv6_enabled` is false, IPv6 nameservers removed as well. All other
/// lines pass through verbatim.
///
/// If no nameserver survives, the built-in default nameservers are appended
/// so the sandbox is never left without an upstream.
#[must_use]
pub fn filter(content: &str, ipv6_enabled: bool) -> ResolvConf {
    let mut out = String::new();
    let mut kept = 0usize;
    for line in content.lines() {
        if let Some(addr) = nameserver_address(line) {
            if is_loopback(addr) || (addr.is_ipv6() && !ipv6_enabled) {
                continue;
            }
            kept += 1;
        }
        out.push_str(line);
        out.push('\n');
    }

    if kept == 0 {
        for ns in DEFAULT_V4_NAMESERVERS {
            let _ = writeln!(out, "nameserver {ns}");
        }
        if ipv6_enabled {
            for ns in DEFAULT_V6_NAMESERVERS {
                let _ = writeln!(out, "nameserver {ns}");
            }
        }
    }

    ResolvConf {
        fingerprint: fingerprint(&out),
        content: out,
    }
}

/// Parses a `nameserver` directive line; `None` for anything else,
/// comments and malformed addresses included.
fn nameserver_address(line: &str) -> Option<IpAddr> {
    let mut fields = line.split_whitespace();
    if fields.next()? != "nameserver" {
        return None;
    }
    fields.next()?.parse().ok()
}

/// Loopback in either family, including IPv4-mapped IPv6 forms.
fn is_loopback(addr: IpAddr) -> bool {
    match addr {
        IpAddr::V4(v4) => v4.octets()[0] == 127,
        IpAddr::V6(v6) => {
            v6.is_loopback() || v6.to_ipv4_mapped().is_some_and(|v4| v4.octets()[0] == 127)
        }
    }
}

fn last_directive_fields(content: &str, directive: &str) -> Vec<String> {
    let mut fields = Vec::new();
    for line in content.lines() {
        let mut parts = line.split_whitespace();
        if parts.next() == Some(directive) {
            fields = parts.map(str::to_string).collect();
        }
    }
    fields
}
