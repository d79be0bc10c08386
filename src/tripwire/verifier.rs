//! FSC-007: Verifier — authenticate the database, then re-check each file.
//!
//! AUTHENTICATING → COMPARING → DONE, or AUTHENTICATING → ABORTED on a
//! failed tag. Per-file problems are reported and never stop the loop.

use crate::core::database;
use crate::core::types::{
    ArtifactPaths, AuthOutcome, DigestEntry, EntryReport, EntryStatus, SecretKey,
    VerificationReport, VerifierState,
};
use crate::error::FscError;
use crate::tripwire::{hasher, seal};
use std::path::Path;
use tracing::{debug, info, warn};

/// One check run over a sealed digest database.
#[derive(Debug)]
pub struct Verifier<'a> {
    paths: &'a ArtifactPaths,
    key: &'a SecretKey,
    state: VerifierState,
}

impl<'a> Verifier<'a> {
    pub fn new(paths: &'a ArtifactPaths, key: &'a SecretKey) -> Self {
        Self {
            paths,
            key,
            state: VerifierState::Authenticating,
        }
    }

    pub fn state(&self) -> VerifierState {
        self.state
    }

    /// Run to completion, collecting every entry.
    pub fn run(&mut self) -> Result<VerificationReport, FscError> {
        self.run_with(|_| {})
    }

    /// Run to completion, handing each entry to `on_entry` as soon as it is checked.
    pub fn run_with(
        &mut self,
        mut on_entry: impl FnMut(&EntryReport),
    ) -> Result<VerificationReport, FscError> {
        let sealed = seal::read_sealed(&self.paths.database, &self.paths.auth_tag)?;

        if let AuthOutcome::Fail(reason) = sealed.authenticate(self.key) {
            warn!(%reason, "database authentication failed");
            self.state = VerifierState::Aborted;
            return Ok(VerificationReport {
                state: self.state,
                entries: Vec::new(),
            });
        }

        // parse exactly the bytes that were authenticated
        let text = String::from_utf8(sealed.bytes).map_err(|_| FscError::MalformedDatabase {
            line: 0,
            reason: "database is not valid UTF-8".to_string(),
        })?;
        let db = database::parse(&text)?;

        self.state = VerifierState::Comparing;
        info!(entries = db.entries.len(), "database authenticated, comparing files");

        let mut entries = Vec::with_capacity(db.entries.len());
        for entry in &db.entries {
            let report = check_entry(entry);
            on_entry(&report);
            entries.push(report);
        }

        self.state = VerifierState::Done;
        Ok(VerificationReport {
            state: self.state,
            entries,
        })
    }
}

/// Re-fingerprint one entry against the live filesystem.
pub fn check_entry(entry: &DigestEntry) -> EntryReport {
    let status = match hasher::digest(Path::new(&entry.path)) {
        Ok(actual) if actual == entry.fingerprint => {
            debug!(path = %entry.path, "okay");
            EntryStatus::Okay
        }
        Ok(actual) => {
            warn!(
                path = %entry.path,
                expected = %entry.fingerprint,
                actual = %actual,
                "file changed"
            );
            EntryStatus::Changed
        }
        Err(e) => {
            warn!(path = %entry.path, error = %e, "file unreadable");
            EntryStatus::Unreadable {
                reason: e.to_string(),
            }
        }
    };
    EntryReport {
        path: entry.path.clone(),
        status,
    }
}

/// Authenticate then compare, using the artifacts named in `paths`.
pub fn verify(paths: &ArtifactPaths, key: &SecretKey) -> Result<VerificationReport, FscError> {
    Verifier::new(paths, key).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Fingerprint;

    struct Fixture {
        _dir: tempfile::TempDir,
        paths: ArtifactPaths,
        files: Vec<std::path::PathBuf>,
    }

    fn generated(files: &[(&str, &str)], key: &str) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let mut list = String::new();
        let mut created = Vec::new();
        for (name, content) in files {
            let p = dir.path().join(name);
            std::fs::write(&p, content).unwrap();
            list.push_str(&format!("\"{}\"\n", p.display()));
            created.push(p);
        }
        let paths = ArtifactPaths {
            targets: dir.path().join("config"),
            database: dir.path().join("filedb"),
            auth_tag: dir.path().join("hashdb"),
        };
        std::fs::write(&paths.targets, list).unwrap();
        database::generate(&paths, &key.parse().unwrap()).unwrap();
        Fixture {
            _dir: dir,
            paths,
            files: created,
        }
    }

    fn key(s: &str) -> SecretKey {
        s.parse().unwrap()
    }

    #[test]
    fn test_fsc007_scenario_a_unmodified_is_okay() {
        let fx = generated(&[("a.txt", "hello")], "k1");
        let k = key("k1");
        let mut v = Verifier::new(&fx.paths, &k);
        let report = v.run().unwrap();
        assert_eq!(v.state(), VerifierState::Done);
        assert!(report.authenticated());
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].status, EntryStatus::Okay);
        assert_eq!(
            report.entries[0].to_string(),
            format!("\"{}\" okay", fx.files[0].display())
        );
    }

    #[test]
    fn test_fsc007_scenario_b_appended_byte_is_changed() {
        let fx = generated(&[("a.txt", "hello")], "k1");
        let mut f = std::fs::OpenOptions::new()
            .append(true)
            .open(&fx.files[0])
            .unwrap();
        std::io::Write::write_all(&mut f, b"!").unwrap();
        drop(f);

        let report = verify(&fx.paths, &key("k1")).unwrap();
        assert_eq!(report.state, VerifierState::Done);
        assert_eq!(report.entries[0].status, EntryStatus::Changed);
        assert!(report.entries[0].to_string().ends_with("changed"));
    }

    #[test]
    fn test_fsc007_scenario_c_edited_database_aborts() {
        let fx = generated(&[("a.txt", "hello")], "k1");
        let mut text = std::fs::read_to_string(&fx.paths.database).unwrap();
        // flip the final hex char of the digest
        let pos = text.len() - 2;
        let c = text.as_bytes()[pos];
        let replacement = if c == b'0' { "1" } else { "0" };
        text.replace_range(pos..pos + 1, replacement);
        std::fs::write(&fx.paths.database, text).unwrap();

        let k = key("k1");
        let mut v = Verifier::new(&fx.paths, &k);
        let mut emitted = 0;
        let report = v.run_with(|_| emitted += 1).unwrap();
        assert_eq!(v.state(), VerifierState::Aborted);
        assert!(!report.authenticated());
        assert!(report.entries.is_empty());
        assert_eq!(emitted, 0, "no per-file output after failed authentication");
    }

    #[test]
    fn test_fsc007_scenario_d_wrong_key_aborts() {
        let fx = generated(&[("a.txt", "hello")], "k1");
        let report = verify(&fx.paths, &key("k2")).unwrap();
        assert_eq!(report.state, VerifierState::Aborted);
        assert!(report.entries.is_empty());
    }

    #[test]
    fn test_fsc007_replaced_database_with_valid_digests_aborts() {
        // attacker rewrites the database to match a modified file but cannot reseal
        let fx = generated(&[("a.txt", "hello")], "k1");
        std::fs::write(&fx.files[0], "evil!").unwrap();
        let forged = database::build(&fx.files).unwrap().to_bytes().unwrap();
        std::fs::write(&fx.paths.database, forged).unwrap();

        let report = verify(&fx.paths, &key("k1")).unwrap();
        assert_eq!(report.state, VerifierState::Aborted);
    }

    #[test]
    fn test_fsc007_unreadable_file_does_not_hide_others() {
        let fx = generated(&[("a.txt", "a"), ("b.txt", "b"), ("c.txt", "c")], "k1");
        std::fs::remove_file(&fx.files[1]).unwrap();
        std::fs::write(&fx.files[2], "changed").unwrap();

        let report = verify(&fx.paths, &key("k1")).unwrap();
        assert_eq!(report.state, VerifierState::Done);
        assert_eq!(report.entries.len(), 3);
        assert_eq!(report.entries[0].status, EntryStatus::Okay);
        assert!(matches!(
            report.entries[1].status,
            EntryStatus::Unreadable { .. }
        ));
        assert_eq!(report.entries[2].status, EntryStatus::Changed);
        assert_eq!(report.problems(), 2);
    }

    #[test]
    fn test_fsc007_entries_streamed_in_order() {
        let fx = generated(&[("b.txt", "b"), ("a.txt", "a")], "k1");
        let k = key("k1");
        let mut seen = Vec::new();
        Verifier::new(&fx.paths, &k)
            .run_with(|e| seen.push(e.path.clone()))
            .unwrap();
        let expected: Vec<String> = fx.files.iter().map(|p| p.display().to_string()).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_fsc007_missing_database_is_fatal() {
        let fx = generated(&[("a.txt", "hello")], "k1");
        std::fs::remove_file(&fx.paths.database).unwrap();
        let k = key("k1");
        let mut v = Verifier::new(&fx.paths, &k);
        assert!(v.run().is_err());
        assert_eq!(v.state(), VerifierState::Authenticating);
    }

    #[test]
    fn test_fsc007_check_entry_unreadable() {
        let entry = DigestEntry {
            path: "/nonexistent/file.txt".to_string(),
            fingerprint: Fingerprint::from_bytes([0; 32]),
        };
        let report = check_entry(&entry);
        assert!(matches!(report.status, EntryStatus::Unreadable { .. }));
        assert_eq!(report.to_string(), "\"/nonexistent/file.txt\" unreadable");
    }
}
