//! Hosts-table file mutation.
//!
//! Line-oriented primitives over a hosts file: build it fresh, append or
//! remove records incrementally, and rewrite the address of an existing
//! name. Unrelated lines, comments included, are never touched by the
//! incremental operations.

use std::fmt::Write as _;
use std::io;
use std::path::Path;

/// Standard entries written at the top of every freshly built hosts file.
const BOILERPLATE: &[(&str, &str)] = &[
    ("127.0.0.1", "localhost"),
    ("::1", "localhost ip6-localhost ip6-loopback"),
    ("fe00::0", "ip6-localnet"),
    ("ff00::0", "ip6-mcastprefix"),
    ("ff02::1", "ip6-allnodes"),
    ("ff02::2", "ip6-allrouters"),
];

/// One hostname-set-to-address mapping, rendered as `ip\tname1 name2 ...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Hostnames sharing the address, in render order.
    pub names: Vec<String>,
    /// The address, IPv4 or IPv6, as written to the file.
    pub ip: String,
}

impl Record {
    /// Creates a record mapping whitespace-separated `names` to `ip`.
    #[must_use]
    pub fn new(ip: impl Into<String>, names: &str) -> Self {
        Self {
            names: names.split_whitespace().map(str::to_string).collect(),
            ip: ip.into(),
        }
    }

    fn line(&self) -> String {
        format!("{}\t{}", self.ip, self.names.join(" "))
    }

    /// `true` when a table line carries exactly this record.
    fn matches(&self, line: &str) -> bool {
        parse_line(line).is_some_and(|(ip, names)| ip == self.ip && names == self.names)
    }
}

/// Splits a table line into address and name fields. Comments and blank
/// lines yield `None`.
fn parse_line(line: &str) -> Option<(&str, Vec<&str>)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let mut fields = line.split_whitespace();
    let ip = fields.next()?;
    let names: Vec<&str> = fields.collect();
    if names.is_empty() {
        return None;
    }
    Some((ip, names))
}

/// Builds the hosts file at `path` from scratch, replacing prior content.
///
/// The file starts with the standard localhost boilerplate, followed by the
/// sandbox's own record when `ip` is non-empty (`hostname.domain hostname`,
/// or bare `hostname` without a domain), then the extra records.
///
/// # Errors
///
/// Returns [`io::Error`] if the file cannot be written.
pub fn build(
    path: &Path,
    ip: &str,
    hostname: &str,
    domain: &str,
    extra: &[Record],
) -> io::Result<()> {
    let mut content = String::new();
    for (addr, names) in BOILERPLATE {
        let _ = writeln!(content, "{addr}\t{names}");
    }
    if !ip.is_empty() && !hostname.is_empty() {
        if domain.is_empty() {
            let _ = writeln!(content, "{ip}\t{hostname}");
        } else {
            let _ = writeln!(content, "{ip}\t{hostname}.{domain} {hostname}");
        }
    }
    for record in extra {
        let _ = writeln!(content, "{}", record.line());
    }
    std::fs::write(path, content)
}

/// Appends `records` to the table, skipping any already present, so
/// repeated adds of the same record are idempotent.
///
/// # Errors
///
/// Returns [`io::Error`] if the file cannot be read or written.
pub fn add(path: &Path, records: &[Record]) -> io::Result<()> {
    if records.is_empty() {
        return Ok(());
    }

    let mut content = std::fs::read_to_string(path)?;
    let missing: Vec<&Record> = records
        .iter()
        .filter(|r| !content.lines().any(|line| r.matches(line)))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }

    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    for record in missing {
        let _ = writeln!(content, "{}", record.line());
    }
    std::fs::write(path, content)
}

/// Removes every line carrying one of `records`. Unrelated lines are
/// preserved byte-for-byte; removing an absent record is a no-op.
///
/// # Errors
///
/// Returns [`io::Error`] if the file cannot be read or written.
pub fn delete(path: &Path, records: &[Record]) -> io::Result<()> {
    if records.is_empty() {
        return Ok(());
    }

    let content = std::fs::read_to_string(path)?;
    let kept: Vec<&str> = content
        .lines()
        .filter(|line| !records.iter().any(|r| r.matches(line)))
        .collect();
    if kept.len() == content.lines().count() {
        return Ok(());
    }

    let mut updated = kept.join("\n");
    if !updated.is_empty() {
        updated.push('\n');
    }
    std::fs::write(path, updated)
}

/// Rewrites the address of every record whose name fields contain `name`.
/// Lines not mentioning the name are untouched.
///
/// # Errors
///
/// Returns [`io::Error`] if the file cannot be read or written.
pub fn update(path: &Path, ip: &str, name: &str) -> io::Result<()> {
    let content = std::fs::read_to_string(path)?;
    let mut changed = false;
    let mut updated = String::new();
    for line in content.lines() {
        match parse_line(line) {
            Some((_, names)) if names.contains(&name) => {
                let _ = writeln!(updated, "{ip}\t{}", names.join(" "));
                changed = true;
            }
            _ => {
                updated.push_str(line);
                updated.push('\n');
            }
        }
    }

    if changed {
        std::fs::write(path, updated)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ip: &str, names: &str) -> Record {
        Record::new(ip, names)
    }

    #[test]
    fn build_writes_boilerplate_and_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hosts");

        build(
            &path,
            "",
            "web1",
            "example.com",
            &[record("10.0.0.9", "db")],
        )
        .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("127.0.0.1\tlocalhost\n"));
        assert!(content.contains("::1\tlocalhost ip6-localhost ip6-loopback\n"));
        assert!(content.ends_with("10.0.0.9\tdb\n"));
        // No self record without an address.
        assert!(!content.contains("web1"));
    }

    #[test]
    fn build_self_record_forms() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hosts");

        build(&path, "172.17.0.2", "web1", "example.com", &[]).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("172.17.0.2\tweb1.example.com web1\n"));

        build(&path, "172.17.0.2", "web1", "", &[]).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("172.17.0.2\tweb1\n"));
    }

    #[test]
    fn add_appends_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hosts");
        build(&path, "", "", "", &[]).unwrap();

        let recs = [record("10.0.0.5", "svc.example.com svc")];
        add(&path, &recs).unwrap();
        add(&path, &recs).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content.matches("10.0.0.5\tsvc.example.com svc").count(),
            1
        );
    }

    #[test]
    fn add_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = add(&dir.path().join("absent"), &[record("1.2.3.4", "x")]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn delete_removes_only_matching_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hosts");
        std::fs::write(
            &path,
            "127.0.0.1\tlocalhost\n# comment kept\n10.0.0.5\tsvc\n10.0.0.6\tother\n",
        )
        .unwrap();

        delete(&path, &[record("10.0.0.5", "svc")]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "127.0.0.1\tlocalhost\n# comment kept\n10.0.0.6\tother\n"
        );

        // Absent record is a no-op.
        delete(&path, &[record("10.0.0.5", "svc")]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), content);
    }

    #[test]
    fn update_rewrites_matching_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hosts");
        std::fs::write(
            &path,
            "127.0.0.1\tlocalhost\n10.0.0.5\tsvc.example.com svc\n10.0.0.6\tother\n",
        )
        .unwrap();

        update(&path, "10.0.0.99", "svc").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("10.0.0.99\tsvc.example.com svc\n"));
        assert!(content.contains("10.0.0.6\tother\n"));
        assert!(!content.contains("10.0.0.5"));
    }

    #[test]
    fn update_without_match_leaves_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hosts");
        let original = "127.0.0.1\tlocalhost\n";
        std::fs::write(&path, original).unwrap();

        update(&path, "10.0.0.99", "nothere").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
    }
}
