//! Memoization layer: pluggable key/value backends and the cache hierarchy.
//!
//! The `ModuleCache` maps content digests to serialized result maps, the
//! `UserCache` gives module implementations a scratch store between calls,
//! and the `ManagerCache` hands both out keyed by implementation identity,
//! so every copy of the same implementation shares one set of entries.
//!
//! # Backends
//! A backend is a flat `key → bytes` store behind [`CacheBackend`]. The
//! in-memory default is process-local; [`SqliteBackend`] is the durable
//! variant. Backends are shared behind one mutex-guarded slot, so a manager
//! can be pointed at a save location mid-flight and every handle migrates
//! with it.
//!
//! # Storage Layout
//! `change_save_location(<root>)` materializes two databases:
//! * `<root>/cache/cache.db` — content and scratch entries;
//! * `<root>/uuid/uuid.db` — the identity registry (implementation key →
//!   cache namespace).
//!
//! # Serialization
//! Result maps are framed as `(key, data type identifier, canonical bytes)`
//! triples and rehydrated through `AnyValue::from_tagged`. Only values and
//! declared types survive storage; descriptions, flags and checks are
//! declaration-side state and are re-established by the module itself.

// used for persistence
use rusqlite::{params, Connection, Error};

// other backends use HashMap
use std::collections::HashMap;
use std::hash::BuildHasherDefault;
use std::path::Path;
use std::sync::{Arc, Mutex};

use seahash::SeaHasher;
use tracing::debug;

use crate::digest::digest_of;
use crate::error::{PlugboardError, Result};
use crate::field::{FieldMap, FieldSpec};
use crate::value::{AnyValue, DataType};

pub type BackendHasher = BuildHasherDefault<SeaHasher>;

/// Mutex-guarded, swappable backend shared by every cache handle of one
/// manager.
pub type SharedBackend = Arc<Mutex<Box<dyn CacheBackend>>>;

// ------------- CacheBackend -------------

/// Flat key/value storage contract. Values are opaque byte strings.
pub trait CacheBackend: Send {
    fn contains(&self, key: &str) -> Result<bool>;
    fn insert(&mut self, key: &str, value: &[u8]) -> Result<()>;
    fn at(&self, key: &str) -> Result<Vec<u8>>;
    fn erase(&mut self, key: &str) -> Result<()>;
    fn keys(&self) -> Result<Vec<String>>;
    /// Flushes pending state to durable storage where that means anything.
    fn backup(&mut self) -> Result<()>;
    /// Drops every entry.
    fn dump(&mut self) -> Result<()>;
}

/// Process-local default backend. Not safe for concurrent callers beyond
/// the mutex slot it lives in.
#[derive(Default)]
pub struct MemoryBackend {
    entries: HashMap<String, Vec<u8>, BackendHasher>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheBackend for MemoryBackend {
    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.entries.contains_key(key))
    }
    fn insert(&mut self, key: &str, value: &[u8]) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }
    fn at(&self, key: &str) -> Result<Vec<u8>> {
        self.entries
            .get(key)
            .cloned()
            .ok_or_else(|| PlugboardError::NotFound(key.to_string()))
    }
    fn erase(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }
    fn backup(&mut self) -> Result<()> {
        Ok(())
    }
    fn dump(&mut self) -> Result<()> {
        self.entries.clear();
        Ok(())
    }
}

// ------------- SqliteBackend -------------

/// Durable backend. Creates (and if needed migrates) the underlying schema;
/// file-backed operation opens a fresh connection per call so the backend
/// can be shared without holding a connection across threads.
pub struct SqliteBackend {
    db_path: String,
}

impl SqliteBackend {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        // Enable WAL for better concurrency on file-backed DBs
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;");
        conn.execute_batch(
            "
            create table if not exists Entry (
                Entry_Key text not null,
                Entry_Value blob not null,
                constraint unique_and_referenceable_Entry_Key primary key (
                    Entry_Key
                )
            ) STRICT;
            ",
        )?;
        Ok(Self {
            db_path: path.to_string_lossy().into_owned(),
        })
    }

    /// Helper: run an operation with a fresh Connection. A busy timeout
    /// helps under concurrent writes.
    fn with_conn<T>(&self, op: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = Connection::open(&self.db_path)?;
        let _ = conn.busy_timeout(std::time::Duration::from_millis(5000));
        op(&conn)
    }
}

impl CacheBackend for SqliteBackend {
    fn contains(&self, key: &str) -> Result<bool> {
        self.with_conn(|conn| {
            match conn
                .prepare("select 1 from Entry where Entry_Key = ?")?
                .query_row(params![key], |_| Ok(()))
            {
                Ok(()) => Ok(true),
                Err(Error::QueryReturnedNoRows) => Ok(false),
                Err(err) => Err(err.into()),
            }
        })
    }
    fn insert(&mut self, key: &str, value: &[u8]) -> Result<()> {
        self.with_conn(|conn| {
            conn.prepare("insert or replace into Entry (Entry_Key, Entry_Value) values (?, ?)")?
                .execute(params![key, value])?;
            Ok(())
        })
    }
    fn at(&self, key: &str) -> Result<Vec<u8>> {
        self.with_conn(|conn| {
            match conn
                .prepare("select Entry_Value from Entry where Entry_Key = ?")?
                .query_row(params![key], |row| row.get::<_, Vec<u8>>(0))
            {
                Ok(value) => Ok(value),
                Err(Error::QueryReturnedNoRows) => Err(PlugboardError::NotFound(key.to_string())),
                Err(err) => Err(err.into()),
            }
        })
    }
    fn erase(&mut self, key: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.prepare("delete from Entry where Entry_Key = ?")?
                .execute(params![key])?;
            Ok(())
        })
    }
    fn keys(&self) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("select Entry_Key from Entry")?;
            let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
            let mut out = Vec::new();
            for key in rows {
                out.push(key?);
            }
            Ok(out)
        })
    }
    fn backup(&mut self) -> Result<()> {
        self.with_conn(|conn| {
            let _ = conn.execute_batch("PRAGMA wal_checkpoint(FULL);");
            Ok(())
        })
    }
    fn dump(&mut self) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute_batch("delete from Entry;")?;
            Ok(())
        })
    }
}

// ------------- result map framing -------------

fn push_frame(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    out.extend_from_slice(bytes);
}

fn read_frame<'a>(rest: &mut &'a [u8]) -> Result<&'a [u8]> {
    if rest.len() < 4 {
        return Err(corrupt());
    }
    let (head, tail) = rest.split_at(4);
    let len = u32::from_le_bytes(head.try_into().map_err(|_| corrupt())?) as usize;
    if tail.len() < len {
        return Err(corrupt());
    }
    let (frame, tail) = tail.split_at(len);
    *rest = tail;
    Ok(frame)
}

fn corrupt() -> PlugboardError {
    PlugboardError::Backend("stored result map does not decode".to_string())
}

fn serialize_results(results: &FieldMap) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for (key, spec) in results.iter() {
        let (uid, bytes) = spec.any_value().tagged_bytes().ok_or_else(|| {
            PlugboardError::Backend(format!("result {key} has no value to store"))
        })?;
        push_frame(&mut out, key.as_bytes());
        out.push(uid);
        push_frame(&mut out, &bytes);
    }
    Ok(out)
}

fn deserialize_results(bytes: &[u8]) -> Result<FieldMap> {
    let mut rest = bytes;
    let mut map = FieldMap::new();
    while !rest.is_empty() {
        let key = String::from_utf8(read_frame(&mut rest)?.to_vec()).map_err(|_| corrupt())?;
        let (uid, tail) = rest.split_first().ok_or_else(corrupt)?;
        rest = tail;
        let value = AnyValue::from_tagged(*uid, read_frame(&mut rest)?)?;
        map.insert(&key, FieldSpec::holding(value));
    }
    Ok(map)
}

// ------------- ModuleCache -------------

/// Content cache of one implementation: digest → serialized result map.
/// Entries are immutable once inserted (first write wins) and a digest is
/// only ever reported present when its entry exists.
pub struct ModuleCache {
    slot: SharedBackend,
    namespace: String,
}

impl ModuleCache {
    fn full_key(&self, digest: &str) -> String {
        format!("{}:{}", self.namespace, digest)
    }

    pub fn contains(&self, digest: &str) -> Result<bool> {
        self.slot.lock()?.contains(&self.full_key(digest))
    }

    pub fn insert(&self, digest: &str, results: &FieldMap) -> Result<()> {
        let key = self.full_key(digest);
        let mut backend = self.slot.lock()?;
        if backend.contains(&key)? {
            return Ok(());
        }
        let bytes = serialize_results(results)?;
        backend.insert(&key, &bytes)
    }

    pub fn fetch(&self, digest: &str) -> Result<FieldMap> {
        let bytes = self.slot.lock()?.at(&self.full_key(digest))?;
        deserialize_results(&bytes)
    }

    /// Drops every entry of this implementation.
    pub fn reset(&self) -> Result<()> {
        let prefix = format!("{}:", self.namespace);
        let mut backend = self.slot.lock()?;
        for key in backend.keys()? {
            if key.starts_with(&prefix) {
                backend.erase(&key)?;
            }
        }
        Ok(())
    }

    pub fn size(&self) -> Result<usize> {
        let prefix = format!("{}:", self.namespace);
        let backend = self.slot.lock()?;
        Ok(backend
            .keys()?
            .into_iter()
            .filter(|k| k.starts_with(&prefix))
            .count())
    }
}

// ------------- UserCache -------------

/// Scratch store scoped to one implementation; a place for modules to keep
/// intermediate artifacts between calls. Shares the content backend under a
/// mangled namespace so user entries never collide with memoized results.
pub struct UserCache {
    slot: SharedBackend,
    namespace: String,
}

impl UserCache {
    fn full_key(&self, key: &str) -> String {
        format!("{}:{}", self.namespace, key)
    }

    pub fn insert<T: DataType>(&self, key: &str, value: T) -> Result<()> {
        let (uid, bytes) = AnyValue::new(value)
            .tagged_bytes()
            .ok_or_else(|| PlugboardError::Backend("value has no encoding".to_string()))?;
        let mut framed = vec![uid];
        framed.extend_from_slice(&bytes);
        self.slot.lock()?.insert(&self.full_key(key), &framed)
    }

    pub fn at<T: DataType>(&self, key: &str) -> Result<T> {
        let bytes = self.slot.lock()?.at(&self.full_key(key))?;
        let (uid, rest) = bytes.split_first().ok_or_else(corrupt)?;
        AnyValue::from_tagged(*uid, rest)?.cast::<T>()
    }

    pub fn contains(&self, key: &str) -> Result<bool> {
        self.slot.lock()?.contains(&self.full_key(key))
    }

    pub fn erase(&self, key: &str) -> Result<()> {
        self.slot.lock()?.erase(&self.full_key(key))
    }

    pub fn reset(&self) -> Result<()> {
        let prefix = format!("{}:", self.namespace);
        let mut backend = self.slot.lock()?;
        for key in backend.keys()? {
            if key.starts_with(&prefix) {
                backend.erase(&key)?;
            }
        }
        Ok(())
    }
}

// ------------- ManagerCache -------------

/// Factory for module and user caches, keyed by implementation identity.
/// Registering a module and copying it obtain the same handles, so
/// memoization hits transfer between copies.
pub struct ManagerCache {
    content_slot: SharedBackend,
    identity_slot: SharedBackend,
    module_caches: HashMap<String, Arc<ModuleCache>, BackendHasher>,
    user_caches: HashMap<String, Arc<UserCache>, BackendHasher>,
}

impl ManagerCache {
    pub fn new() -> Self {
        Self {
            content_slot: Arc::new(Mutex::new(
                Box::new(MemoryBackend::new()) as Box<dyn CacheBackend>
            )),
            identity_slot: Arc::new(Mutex::new(
                Box::new(MemoryBackend::new()) as Box<dyn CacheBackend>
            )),
            module_caches: HashMap::default(),
            user_caches: HashMap::default(),
        }
    }

    /// Stable cache namespace of an implementation, registered in the
    /// identity backend on first sight.
    fn namespace_for(&self, implementation: &str) -> Result<String> {
        let mut registry = self.identity_slot.lock()?;
        if registry.contains(implementation)? {
            return String::from_utf8(registry.at(implementation)?)
                .map_err(|_| PlugboardError::Backend("identity registry corrupt".to_string()));
        }
        let namespace = digest_of(implementation.as_bytes()).to_hex();
        registry.insert(implementation, namespace.as_bytes())?;
        Ok(namespace)
    }

    pub fn module_cache(&mut self, implementation: &str) -> Result<Arc<ModuleCache>> {
        if let Some(cache) = self.module_caches.get(implementation) {
            return Ok(Arc::clone(cache));
        }
        let namespace = self.namespace_for(implementation)?;
        let cache = Arc::new(ModuleCache {
            slot: Arc::clone(&self.content_slot),
            namespace,
        });
        self.module_caches
            .insert(implementation.to_string(), Arc::clone(&cache));
        Ok(cache)
    }

    pub fn user_cache(&mut self, implementation: &str) -> Result<Arc<UserCache>> {
        if let Some(cache) = self.user_caches.get(implementation) {
            return Ok(Arc::clone(cache));
        }
        let namespace = format!("{}-USER", self.namespace_for(implementation)?);
        let cache = Arc::new(UserCache {
            slot: Arc::clone(&self.content_slot),
            namespace,
        });
        self.user_caches
            .insert(implementation.to_string(), Arc::clone(&cache));
        Ok(cache)
    }

    /// Points the caches at durable storage under `root`, creating
    /// `<root>/cache/` and `<root>/uuid/`, carrying current entries over,
    /// and keeping whatever the durable side already holds.
    pub fn change_save_location(&mut self, root: &Path) -> Result<()> {
        let cache_dir = root.join("cache");
        let uuid_dir = root.join("uuid");
        std::fs::create_dir_all(&cache_dir)
            .and_then(|()| std::fs::create_dir_all(&uuid_dir))
            .map_err(|e| PlugboardError::Backend(e.to_string()))?;
        debug!(root = %root.display(), "relocating caches to durable storage");
        let content = SqliteBackend::open(&cache_dir.join("cache.db"))?;
        let identity = SqliteBackend::open(&uuid_dir.join("uuid.db"))?;
        replace_backend(&self.content_slot, Box::new(content))?;
        replace_backend(&self.identity_slot, Box::new(identity))
    }

    /// Flushes both backends.
    pub fn backup(&self) -> Result<()> {
        self.content_slot.lock()?.backup()?;
        self.identity_slot.lock()?.backup()
    }

    /// Drops every entry in both backends.
    pub fn dump(&self) -> Result<()> {
        self.content_slot.lock()?.dump()?;
        self.identity_slot.lock()?.dump()
    }
}

impl Default for ManagerCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Swaps `slot` to `fresh` after carrying the current entries over.
/// Entries already present in `fresh` win; they are the durable state.
fn replace_backend(slot: &SharedBackend, mut fresh: Box<dyn CacheBackend>) -> Result<()> {
    let mut guard = slot.lock()?;
    for key in guard.keys()? {
        if !fresh.contains(&key)? {
            let value = guard.at(&key)?;
            fresh.insert(&key, &value)?;
        }
    }
    *guard = fresh;
    Ok(())
}
