//! Per-document parse bookkeeping for hosts that re-parse on every edit.

use anyhow::Result;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

use crate::executor::parse;
use crate::tree::SyntaxTree;
use trellis_syntax::rule::Grammar;
use trellis_syntax::text::Snapshot;

#[derive(Debug)]
struct Parsed {
    version: u64,
    tree: Arc<SyntaxTree>,
}

enum Lookup {
    Cached(Arc<SyntaxTree>),
    Stale,
    Missing,
}

fn lookup(latest: Option<&Parsed>, version: u64) -> Lookup {
    match latest {
        Some(parsed) if parsed.version == version => Lookup::Cached(Arc::clone(&parsed.tree)),
        Some(parsed) if parsed.version > version => {
            debug!(
                requested = version,
                latest = parsed.version,
                "skipping stale snapshot"
            );
            Lookup::Stale
        }
        _ => Lookup::Missing,
    }
}

/// Keeps the latest syntax tree of one document.
///
/// Hosts call [`ensure_parsed`](ParseSession::ensure_parsed) with whatever
/// snapshot they currently hold; repeated calls for the same version are
/// served from the cache and requests for versions older than the one already
/// parsed are dropped.
#[derive(Debug)]
pub struct ParseSession {
    grammar: Arc<Grammar>,
    latest: Mutex<Option<Parsed>>,
}

impl ParseSession {
    pub fn new(grammar: Arc<Grammar>) -> Self {
        Self {
            grammar,
            latest: Mutex::new(None),
        }
    }

    pub fn grammar(&self) -> &Arc<Grammar> {
        &self.grammar
    }

    /// Tree for `snapshot`, parsing it if needed.
    ///
    /// Returns `Ok(None)` when a newer version has already been parsed. The
    /// lock is not held while parsing; a newer result stored in the meantime
    /// wins over this one.
    pub fn ensure_parsed(&self, snapshot: &Snapshot) -> Result<Option<Arc<SyntaxTree>>> {
        let version = snapshot.version();
        match lookup(self.lock()?.as_ref(), version) {
            Lookup::Cached(tree) => return Ok(Some(tree)),
            Lookup::Stale => return Ok(None),
            Lookup::Missing => {}
        }

        let tree = Arc::new(parse(&self.grammar, snapshot)?);

        let mut latest = self.lock()?;
        match lookup(latest.as_ref(), version) {
            Lookup::Cached(tree) => Ok(Some(tree)),
            Lookup::Stale => Ok(None),
            Lookup::Missing => {
                *latest = Some(Parsed {
                    version,
                    tree: Arc::clone(&tree),
                });
                Ok(Some(tree))
            }
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<Parsed>>> {
        self.latest
            .lock()
            .map_err(|_| anyhow::anyhow!("parse session lock poisoned"))
    }

    /// Most recently parsed tree, if any.
    pub fn latest(&self) -> Option<Arc<SyntaxTree>> {
        let latest = self.latest.lock().ok()?;
        latest.as_ref().map(|parsed| Arc::clone(&parsed.tree))
    }

    /// Version of the most recently parsed snapshot.
    pub fn latest_version(&self) -> Option<u64> {
        let latest = self.latest.lock().ok()?;
        latest.as_ref().map(|parsed| parsed.version)
    }
}
