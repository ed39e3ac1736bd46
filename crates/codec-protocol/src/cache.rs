//! Session-owned memoization of parsed descriptors and bound codecs.
//!
//! One `CodecCache` lives as long as its connection and is passed by
//! reference to every bind. Lookups are read-mostly; the map is only
//! written on a miss.
//!
//! Codecs are keyed by (descriptor id, root cardinality, target shape).
//! Each key owns a `OnceLock`, so when several threads miss on the same key
//! at once the first one builds and the others block on the same cell and
//! reuse its result, including a bind failure.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use codec_core::{Descriptor, Shape, Uuid};
use dashmap::DashMap;
use tracing::debug;

use crate::binder;
use crate::codec::Codec;
use crate::descriptor_parser::parse_descriptor;
use crate::error::{BindError, ParseError};
use crate::wire_types::Dialect;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CodecKey {
    id: Uuid,
    required: bool,
    shape: Shape,
}

type CodecSlot = Arc<OnceLock<Result<Arc<Codec>, BindError>>>;

#[derive(Debug, Default)]
pub struct CodecCache {
    descriptors: DashMap<(Dialect, Uuid), Arc<Descriptor>>,
    codecs: DashMap<CodecKey, CodecSlot>,
    builds: AtomicUsize,
}

impl CodecCache {
    pub fn new() -> Self {
        CodecCache::default()
    }

    /// Descriptor for a type id announced by the server, parsing `bytes`
    /// only if the id has not been seen on this session. The parsed root
    /// must carry `id`; nothing is stored otherwise.
    pub fn descriptor(
        &self,
        id: Uuid,
        bytes: &[u8],
        dialect: Dialect,
    ) -> Result<Arc<Descriptor>, ParseError> {
        if let Some(desc) = self.descriptors.get(&(dialect, id)) {
            return Ok(desc.value().clone());
        }
        let desc = parse_descriptor(bytes, dialect)?;
        if desc.id != id {
            return Err(ParseError::IdMismatch {
                expected: id,
                found: desc.id,
            });
        }
        let entry = self.descriptors.entry((dialect, id)).or_insert(desc);
        Ok(entry.value().clone())
    }

    /// Bound codec for `(desc.id, required, shape)`, building it at most once.
    pub fn bind(
        &self,
        desc: &Descriptor,
        required: bool,
        shape: &Shape,
    ) -> Result<Arc<Codec>, BindError> {
        let key = CodecKey {
            id: desc.id,
            required,
            shape: shape.clone(),
        };

        let existing = self.codecs.get(&key).map(|slot| slot.value().clone());
        let slot = match existing {
            Some(slot) => slot,
            None => self
                .codecs
                .entry(key)
                .or_insert_with(|| Arc::new(OnceLock::new()))
                .value()
                .clone(),
        };

        slot.get_or_init(|| {
            self.builds.fetch_add(1, Ordering::Relaxed);
            debug!(id = %desc.id, kind = %desc.kind, required, shape = %shape, "binding codec");
            binder::bind(desc, required, shape).map(Arc::new)
        })
        .clone()
    }

    /// Number of times the binder has actually run.
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }

    /// Number of cached (id, cardinality, shape) entries.
    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }

    /// Drop everything, e.g. after the server reports a schema change.
    pub fn clear(&self) {
        self.descriptors.clear();
        self.codecs.clear();
    }
}
