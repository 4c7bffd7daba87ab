//! Mod source resolution against the unpacked mod pack.
//!
//! File mods are fetched from a base directory (the extension package, or a
//! local checkout of it). Existence probes mirror the original loader's
//! tolerance: a probe that fails for any reason other than "not found" is
//! treated as present, because some transports report spurious errors for
//! files that fetch fine.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::CoreError;

/// Resolver for file-mod sources under a pack directory.
#[derive(Debug, Clone)]
pub struct ModSource {
    base: Option<PathBuf>,
}

impl ModSource {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: Some(base.into()),
        }
    }

    /// A resolver with no pack directory; probes report absent and fetches
    /// fail. Used before the injector has supplied the base location.
    pub fn unresolved() -> Self {
        Self { base: None }
    }

    pub fn base(&self) -> Option<&Path> {
        self.base.as_deref()
    }

    /// Probe whether a catalog path exists in the pack.
    ///
    /// `NotFound` is the only probe outcome treated as absent; other errors
    /// (permissions, transient I/O) fall back to "present" so discovery does
    /// not drop mods over transport quirks.
    pub fn probe(&self, path: &str) -> bool {
        let Some(base) = &self.base else {
            return false;
        };
        match std::fs::metadata(base.join(path)) {
            Ok(meta) => meta.is_file(),
            Err(err) if err.kind() == ErrorKind::NotFound => false,
            Err(err) => {
                log::debug!("probe for {path} failed ({err}), assuming present");
                true
            }
        }
    }

    /// Fetch a mod's source text.
    pub fn fetch(&self, path: &str) -> Result<String, CoreError> {
        let base = self.base.as_ref().ok_or(CoreError::NoPackDir)?;
        std::fs::read_to_string(base.join(path)).map_err(|source| CoreError::SourceFetch {
            path: path.to_string(),
            source,
        })
    }
}
