//! Modules: developer-authored computational units and their runtime state.
//!
//! A developer implements [`ModuleBase`]: a declaration step populating a
//! [`ModuleSpec`] (satisfied property types, extra fields, submodule
//! requests, metadata) and the pure computational body `run_`. The framework
//! wraps every registered implementation in a [`ModuleInstance`], which owns
//! *copies* of the declared maps so user overrides never touch the
//! developer's defaults. The instance adds the run lifecycle: readiness
//! checks, recursive locking, digests, memoization, and per-call profiling.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, Mutex, Weak};
use std::time::{Duration, Instant};

use chrono::Local;
use tracing::debug;

use crate::cache::{ModuleCache, UserCache};
use crate::digest::{Digest, Digester};
use crate::error::{PlugboardError, Result};
use crate::field::{FieldMap, FieldSpec, OrderedMap};
use crate::property::{PropertyType, TypeKey};
use crate::value::{AnyValue, DataType};

/// Ordered keyed collection of submodule requests.
pub type SubmoduleMap = OrderedMap<SubmoduleRequest>;

/// How instances are shared between the manager and submodule bindings.
pub type SharedModule = Arc<Mutex<ModuleInstance>>;

/// Submodule keys recorded while a call body runs.
type CallTrace = Arc<Mutex<Vec<String>>>;

// ------------- time formatting -------------

fn time_stamp() -> String {
    Local::now().format("%m-%d-%Y %H:%M:%S%.3f").to_string()
}

/// Renders a duration as `H h M m S s MS ms`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let ms = elapsed.as_millis();
    let h = ms / 3_600_000;
    let m = (ms / 60_000) % 60;
    let s = (ms / 1_000) % 60;
    let ms = ms % 1_000;
    format!("{h} h {m} m {s} s {ms} ms")
}

// ------------- ModuleRef -------------

/// Logical reference to an instance in a manager's table: the registration
/// key plus a weak handle. Erasing the key from the manager drops the only
/// strong handle, so stale references fail readiness instead of keeping the
/// instance alive.
#[derive(Clone)]
pub struct ModuleRef {
    key: String,
    target: Weak<Mutex<ModuleInstance>>,
}

impl ModuleRef {
    pub fn new(key: &str, target: &SharedModule) -> Self {
        Self {
            key: key.to_string(),
            target: Arc::downgrade(target),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn upgrade(&self) -> Option<SharedModule> {
        self.target.upgrade()
    }
}

impl PartialEq for ModuleRef {
    fn eq(&self, other: &Self) -> bool {
        self.key.eq_ignore_ascii_case(&other.key) && self.target.ptr_eq(&other.target)
    }
}

impl fmt::Debug for ModuleRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ModuleRef({})", self.key)
    }
}

// ------------- SubmoduleRequest -------------

/// Declares a callback slot: the property type the submodule will be run
/// as, a description, and (once wired) a reference to the instance that
/// will take the calls.
#[derive(Clone, Default)]
pub struct SubmoduleRequest {
    expected: Option<TypeKey>,
    description: Option<String>,
    binding: Option<ModuleRef>,
    // the expected contract's input declaration; readiness is probed with
    // these keys exempted, since the caller supplies them at call time
    probe: FieldMap,
    // per-call plumbing installed by the owning instance, never compared
    trace: Option<CallTrace>,
    slot: Option<String>,
}

impl SubmoduleRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares the property type the bound module must satisfy.
    pub fn set_type<PT: PropertyType>(&mut self) -> &mut Self {
        self.expected = Some(PT::type_key());
        self.probe = PT::inputs();
        self
    }

    pub fn set_description(&mut self, description: &str) -> &mut Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn expected(&self) -> Option<TypeKey> {
        self.expected
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn bound_key(&self) -> Option<&str> {
        self.binding.as_ref().map(ModuleRef::key)
    }

    /// Binds `target`. Fails with `WrongType` when the target does not
    /// satisfy the expected property type.
    pub fn change(&mut self, target: ModuleRef) -> Result<&mut Self> {
        let expected = self.expected.ok_or_else(|| {
            PlugboardError::NoType("submodule bound before set_type".to_string())
        })?;
        let shared = target
            .upgrade()
            .ok_or_else(|| PlugboardError::NotFound(target.key().to_string()))?;
        let satisfies = {
            let guard = shared.try_lock().map_err(|_| {
                PlugboardError::Locked(format!("module {} is in use", target.key()))
            })?;
            guard.satisfies(expected)
        };
        if !satisfies {
            return Err(PlugboardError::WrongType {
                expected: expected.to_string(),
                found: format!("module {}", target.key()),
            });
        }
        self.binding = Some(target);
        Ok(self)
    }

    /// Ready when a live, itself-ready module is bound. The inputs the
    /// expected contract supplies at call time are taken as given. Never
    /// fails.
    pub fn ready(&self) -> bool {
        let Some(shared) = self.binding.as_ref().and_then(ModuleRef::upgrade) else {
            return false;
        };
        let result = match shared.try_lock() {
            Ok(guard) => guard.ready(&self.probe).unwrap_or(false),
            Err(_) => false,
        };
        result
    }

    /// Recursively locks the bound module.
    pub fn lock(&self) -> Result<()> {
        let shared = self.target()?;
        let mut guard = shared.try_lock().map_err(|_| {
            PlugboardError::Locked(format!(
                "submodule cycle through {}",
                self.bound_key().unwrap_or("?")
            ))
        })?;
        guard.lock()
    }

    /// Digest of the bound module under its currently bound inputs.
    pub fn digest(&self) -> Result<Digest> {
        let shared = self.target()?;
        let guard = shared.try_lock().map_err(|_| {
            PlugboardError::Locked(format!(
                "submodule cycle through {}",
                self.bound_key().unwrap_or("?")
            ))
        })?;
        guard.digest(&FieldMap::new())
    }

    /// An unbound request does not veto memoization; a bound one passes the
    /// question through to its module.
    pub fn is_memoizable(&self) -> bool {
        match self.binding.as_ref().and_then(ModuleRef::upgrade) {
            Some(shared) => match shared.try_lock() {
                Ok(guard) => guard.is_memoizable(),
                Err(_) => false,
            },
            None => true,
        }
    }

    /// Runs the bound module as `PT`, recording the call in the owning
    /// instance's active trace.
    pub fn run_as<PT: PropertyType>(&self, args: PT::Inputs) -> Result<PT::Results> {
        match (self.expected, PT::type_key()) {
            (Some(expected), requested) if expected != requested => {
                return Err(PlugboardError::WrongType {
                    expected: expected.to_string(),
                    found: requested.to_string(),
                })
            }
            (None, _) => {
                return Err(PlugboardError::NoType(
                    "submodule invoked before set_type".to_string(),
                ))
            }
            _ => {}
        }
        let shared = self.target()?;
        if let Some(trace) = &self.trace {
            let label = self
                .slot
                .clone()
                .or_else(|| self.bound_key().map(str::to_string))
                .unwrap_or_default();
            trace.lock()?.push(label);
        }
        let wrapped = PT::wrap_inputs(PT::inputs(), args)?;
        let out = {
            let mut guard = shared.try_lock().map_err(|_| {
                PlugboardError::Locked(format!(
                    "submodule cycle through {}",
                    self.bound_key().unwrap_or("?")
                ))
            })?;
            guard.run(wrapped)?
        };
        PT::unwrap_results(&out)
    }

    fn target(&self) -> Result<SharedModule> {
        let binding = self.binding.as_ref().ok_or_else(|| {
            PlugboardError::NotReady("submodule not bound".to_string())
        })?;
        binding
            .upgrade()
            .ok_or_else(|| PlugboardError::NotFound(binding.key().to_string()))
    }

    fn with_trace(&self, trace: CallTrace, slot: &str) -> Self {
        let mut copy = self.clone();
        copy.trace = Some(trace);
        copy.slot = Some(slot.to_string());
        copy
    }
}

impl PartialEq for SubmoduleRequest {
    fn eq(&self, other: &Self) -> bool {
        self.expected == other.expected
            && self.description == other.description
            && self.binding == other.binding
    }
}

impl fmt::Debug for SubmoduleRequest {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SubmoduleRequest")
            .field("expected", &self.expected)
            .field("bound", &self.bound_key())
            .finish()
    }
}

// ------------- ModuleSpec and ModuleBase -------------

/// Declarative state a module implementation assembles in
/// [`ModuleBase::declare`].
#[derive(Clone)]
pub struct ModuleSpec {
    property_types: Vec<TypeKey>,
    inputs: FieldMap,
    results: FieldMap,
    submods: SubmoduleMap,
    description: Option<String>,
    citations: Vec<String>,
    memoizable: bool,
}

impl ModuleSpec {
    pub fn new() -> Self {
        Self {
            property_types: Vec::new(),
            inputs: FieldMap::new(),
            results: FieldMap::new(),
            submods: SubmoduleMap::new(),
            description: None,
            citations: Vec::new(),
            memoizable: true,
        }
    }

    /// Adopts the input and result fields of `PT` and records that this
    /// module may be dispatched as `PT`. The property type's field schemas
    /// are a subset of the module's own from here on by construction.
    pub fn satisfies_property_type<PT: PropertyType>(&mut self) -> &mut Self {
        for (key, spec) in PT::inputs().iter() {
            self.inputs.insert(key, spec.clone());
        }
        for (key, spec) in PT::results().iter() {
            self.results.insert(key, spec.clone());
        }
        let key = PT::type_key();
        if !self.property_types.contains(&key) {
            self.property_types.push(key);
        }
        self
    }

    /// Declares an input beyond what the satisfied property types specify.
    pub fn add_input<T: DataType>(&mut self, key: &str) -> &mut FieldSpec {
        self.inputs.entry(key).set_type::<T>()
    }

    /// Declares a result beyond what the satisfied property types specify.
    pub fn add_result<T: DataType>(&mut self, key: &str) -> &mut FieldSpec {
        self.results.entry(key).set_type::<T>()
    }

    /// Declares a callback slot to be run as `PT`.
    pub fn add_submodule<PT: PropertyType>(&mut self, key: &str) -> &mut SubmoduleRequest {
        self.submods.entry(key).set_type::<PT>()
    }

    /// Post-hoc access to a declared input, e.g. to sharpen a description
    /// inherited from a property type.
    pub fn change_input(&mut self, key: &str) -> Result<&mut FieldSpec> {
        self.inputs.at_mut(key)
    }

    pub fn change_result(&mut self, key: &str) -> Result<&mut FieldSpec> {
        self.results.at_mut(key)
    }

    pub fn description(&mut self, text: &str) -> &mut Self {
        self.description = Some(text.to_string());
        self
    }

    /// Adds a literature reference. Repeatable.
    pub fn citation(&mut self, text: &str) -> &mut Self {
        self.citations.push(text.to_string());
        self
    }

    pub fn turn_off_memoization(&mut self) -> &mut Self {
        self.memoizable = false;
        self
    }

    pub fn turn_on_memoization(&mut self) -> &mut Self {
        self.memoizable = true;
        self
    }
}

impl Default for ModuleSpec {
    fn default() -> Self {
        Self::new()
    }
}

/// The developer surface. Implementations are stateless: everything the
/// framework needs to know is assembled into the [`ModuleSpec`] during
/// `declare`, and `run_` is a pure function of its arguments.
pub trait ModuleBase: Send + Sync + 'static {
    /// Declares property types, fields, submodules and metadata.
    fn declare(&self, spec: &mut ModuleSpec) -> Result<()>;

    /// The computational body. Inputs have been validated and merged;
    /// submodules are wired and locked.
    fn run_(&self, inputs: &FieldMap, submods: &SubmoduleMap) -> Result<FieldMap>;

    /// Stable implementation identity; keyed into digests and the cache.
    fn implementation_key(&self) -> TypeKey {
        std::any::type_name::<Self>()
    }
}

// ------------- ModuleInstance -------------

/// What is still missing before a module can run, partitioned the way a
/// caller would fix it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NotSet {
    pub inputs: BTreeSet<String>,
    pub submodules: BTreeSet<String>,
}

impl NotSet {
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty() && self.submodules.is_empty()
    }
}

/// One completed call: when it started, how long it took, and which
/// submodule slots the body invoked, in order.
#[derive(Clone, Debug)]
pub struct CallRecord {
    pub started: String,
    pub elapsed: Duration,
    pub submodules: Vec<String>,
}

/// Runtime wrapper around a [`ModuleBase`]. Owns effective inputs and
/// submodule bindings (copies, independent of the declaration), the lock
/// state, the per-call profiling log, and the memoization handles.
#[derive(Clone, Default)]
pub struct ModuleInstance {
    base: Option<Arc<dyn ModuleBase>>,
    property_types: Vec<TypeKey>,
    inputs: FieldMap,
    results: FieldMap,
    submods: SubmoduleMap,
    description: Option<String>,
    citations: Vec<String>,
    memoizable: bool,
    locked: bool,
    calls: Vec<CallRecord>,
    cache: Option<Arc<ModuleCache>>,
    user_cache: Option<Arc<UserCache>>,
}

impl ModuleInstance {
    /// An instance with no implementation; a placeholder that fails with
    /// `NoModule` when run.
    pub fn unbound() -> Self {
        Self::default()
    }

    /// Wraps an implementation, copying its declared state.
    pub fn bind(
        base: Arc<dyn ModuleBase>,
        cache: Option<Arc<ModuleCache>>,
        user_cache: Option<Arc<UserCache>>,
    ) -> Result<Self> {
        let mut spec = ModuleSpec::new();
        base.declare(&mut spec)?;
        Ok(Self {
            base: Some(base),
            property_types: spec.property_types,
            inputs: spec.inputs,
            results: spec.results,
            submods: spec.submods,
            description: spec.description,
            citations: spec.citations,
            memoizable: spec.memoizable,
            locked: false,
            calls: Vec::new(),
            cache,
            user_cache,
        })
    }

    pub fn has_module(&self) -> bool {
        self.base.is_some()
    }

    /// Implementation identity, shared by every copy of the same module.
    pub fn implementation_key(&self) -> Result<TypeKey> {
        self.base
            .as_ref()
            .map(|b| b.implementation_key())
            .ok_or_else(no_module)
    }

    pub fn description(&self) -> Result<&str> {
        self.base.as_ref().ok_or_else(no_module)?;
        self.description
            .as_deref()
            .ok_or_else(|| PlugboardError::NotFound("description not set".to_string()))
    }

    pub fn citations(&self) -> Result<&[String]> {
        self.base.as_ref().ok_or_else(no_module)?;
        Ok(&self.citations)
    }

    pub fn property_types(&self) -> &[TypeKey] {
        &self.property_types
    }

    pub fn satisfies(&self, property_type: TypeKey) -> bool {
        self.property_types.contains(&property_type)
    }

    pub fn inputs(&self) -> &FieldMap {
        &self.inputs
    }

    pub fn results(&self) -> &FieldMap {
        &self.results
    }

    pub fn submods(&self) -> &SubmoduleMap {
        &self.submods
    }

    pub fn inputs_mut(&mut self) -> Result<&mut FieldMap> {
        self.assert_unlocked()?;
        Ok(&mut self.inputs)
    }

    pub fn submods_mut(&mut self) -> Result<&mut SubmoduleMap> {
        self.assert_unlocked()?;
        Ok(&mut self.submods)
    }

    /// Binds `value` to the input under `key`.
    pub fn change_input(&mut self, key: &str, value: AnyValue) -> Result<()> {
        self.assert_unlocked()?;
        self.inputs.at_mut(key)?.change(value)?;
        Ok(())
    }

    /// Wires the submodule slot under `key` to `target`.
    pub fn change_submod(&mut self, key: &str, target: ModuleRef) -> Result<()> {
        self.assert_unlocked()?;
        self.submods.at_mut(key)?.change(target)?;
        Ok(())
    }

    /// Lists unbound required inputs and unsatisfied submodule slots. Keys
    /// appearing in `extra` are taken as supplied by the caller and are not
    /// reported (their values are not inspected).
    pub fn not_set(&self, extra: &FieldMap) -> Result<NotSet> {
        self.base.as_ref().ok_or_else(no_module)?;
        let mut missing = NotSet::default();
        for (key, spec) in self.inputs.iter() {
            if !spec.ready() && !extra.contains(key) {
                missing.inputs.insert(key.to_string());
            }
        }
        for (key, request) in self.submods.iter() {
            if !request.ready() {
                missing.submodules.insert(key.to_string());
            }
        }
        Ok(missing)
    }

    /// True when every required input is bound (here or in `extra`) and
    /// every submodule request is satisfied.
    pub fn ready(&self, extra: &FieldMap) -> Result<bool> {
        Ok(self.not_set(extra)?.is_empty())
    }

    /// Freezes this instance and, transitively, every bound submodule.
    /// Fails with `SubmoduleNotReady` when a submodule cannot run and with
    /// `Locked` when the submodule graph loops back into an instance that
    /// is already being locked. Idempotent once locked.
    pub fn lock(&mut self) -> Result<()> {
        if self.locked {
            return Ok(());
        }
        for (key, request) in self.submods.iter() {
            if !request.ready() {
                return Err(PlugboardError::SubmoduleNotReady(key.to_string()));
            }
            request.lock()?;
        }
        self.locked = true;
        Ok(())
    }

    /// Unfreezes this instance only; submodules stay locked.
    pub fn unlock(&mut self) {
        self.locked = false;
    }

    pub fn locked(&self) -> bool {
        self.locked
    }

    /// Memoizable iff declared memoizable and every bound submodule is.
    pub fn is_memoizable(&self) -> bool {
        self.memoizable && self.submods.iter().all(|(_, r)| r.is_memoizable())
    }

    /// Content digest over the bound inputs merged with `extra`, the bound
    /// submodules, and the implementation identity.
    pub fn digest(&self, extra: &FieldMap) -> Result<Digest> {
        let merged = self.merge_inputs(extra)?;
        self.digest_merged(&merged)
    }

    fn digest_merged(&self, merged: &FieldMap) -> Result<Digest> {
        let base = self.base.as_ref().ok_or_else(no_module)?;
        let mut digester = Digester::new();
        for (key, spec) in merged.iter() {
            digester.update_str(key);
            digester.update(spec.digest().bytes());
        }
        for (_, request) in self.submods.iter() {
            if request.bound_key().is_some() {
                digester.update(request.digest()?.bytes());
            }
        }
        digester.update_str(base.implementation_key());
        Ok(digester.finish())
    }

    /// Whether the result of running with `extra` is already cached.
    pub fn is_cached(&self, extra: &FieldMap) -> bool {
        let Some(cache) = &self.cache else {
            return false;
        };
        let Ok(digest) = self.digest(extra) else {
            return false;
        };
        cache.contains(&digest.to_hex()).unwrap_or(false)
    }

    /// Drops every memoized result of this implementation.
    pub fn reset_cache(&self) -> Result<()> {
        match &self.cache {
            Some(cache) => cache.reset(),
            None => Ok(()),
        }
    }

    /// The scratch cache scoped to this implementation. Refused while the
    /// instance is locked; the scratch store is frozen for the duration of
    /// a call.
    pub fn user_cache(&self) -> Result<Arc<UserCache>> {
        if self.locked {
            return Err(PlugboardError::Locked(
                "user cache is frozen while the module is locked".to_string(),
            ));
        }
        self.user_cache
            .clone()
            .ok_or_else(|| PlugboardError::NotFound("no user cache attached".to_string()))
    }

    /// Drops every scratch entry of this implementation.
    pub fn reset_user_cache(&self) -> Result<()> {
        if self.locked {
            return Err(PlugboardError::Locked(
                "user cache is frozen while the module is locked".to_string(),
            ));
        }
        match &self.user_cache {
            Some(cache) => cache.reset(),
            None => Ok(()),
        }
    }

    /// Completed call records, oldest first.
    pub fn calls(&self) -> &[CallRecord] {
        &self.calls
    }

    /// Timing log for this module and, indented, its submodules.
    pub fn profile_info(&self) -> String {
        let mut out = String::new();
        for call in &self.calls {
            out.push_str(&format!(
                "{} : {}\n",
                call.started,
                format_elapsed(call.elapsed)
            ));
        }
        for (key, request) in self.submods.iter() {
            let Some(shared) = request.binding.as_ref().and_then(ModuleRef::upgrade) else {
                continue;
            };
            out.push_str(&format!("  {key}\n"));
            if let Ok(guard) = shared.try_lock() {
                for line in guard.profile_info().lines() {
                    out.push_str(&format!("    {line}\n"));
                }
            };
        }
        out
    }

    /// Runs the module: merge, validate, digest, consult the cache, lock,
    /// invoke the body, store, return.
    pub fn run(&mut self, provided: FieldMap) -> Result<FieldMap> {
        let started = time_stamp();
        let clock = Instant::now();
        let base = self.base.clone().ok_or_else(no_module)?;

        for (key, spec) in provided.iter() {
            if !spec.ready() {
                return Err(PlugboardError::NotReady(format!(
                    "provided input {key} has no value"
                )));
            }
        }
        let missing = self.not_set(&provided)?;
        if !missing.is_empty() {
            return Err(PlugboardError::NotReady(format!(
                "inputs {:?}, submodules {:?}",
                missing.inputs, missing.submodules
            )));
        }
        let merged = self.merge_inputs(&provided)?;
        let digest = self.digest_merged(&merged)?.to_hex();
        let memoizable = self.is_memoizable();

        if memoizable {
            if let Some(cache) = &self.cache {
                if cache.contains(&digest)? {
                    debug!(module = base.implementation_key(), %digest, "memoized result reused");
                    let fetched = cache.fetch(&digest)?;
                    self.calls.push(CallRecord {
                        started,
                        elapsed: clock.elapsed(),
                        submodules: Vec::new(),
                    });
                    return Ok(fetched);
                }
            }
        }

        self.lock()?;

        let trace: CallTrace = Arc::new(Mutex::new(Vec::new()));
        let mut traced = SubmoduleMap::new();
        for (key, request) in self.submods.iter() {
            traced.insert(key, request.with_trace(trace.clone(), key));
        }

        debug!(module = base.implementation_key(), %digest, "running module body");
        let out = base.run_(&merged, &traced)?;
        let elapsed = clock.elapsed();
        let submodules = trace.lock().map(|t| t.clone()).unwrap_or_default();
        self.calls.push(CallRecord {
            started,
            elapsed,
            submodules,
        });

        if memoizable {
            if let Some(cache) = &self.cache {
                cache.insert(&digest, &out)?;
            }
        }
        Ok(out)
    }

    /// Deep copy with the lock released; how the manager duplicates modules.
    pub fn unlocked_copy(&self) -> Self {
        let mut copy = self.clone();
        copy.locked = false;
        copy
    }

    fn merge_inputs(&self, extra: &FieldMap) -> Result<FieldMap> {
        let mut merged = self.inputs.clone();
        for (key, spec) in extra.iter() {
            if merged.contains(key) {
                if spec.has_value() {
                    // adopt the caller's value, keep this instance's
                    // metadata (flags, checks, description)
                    merged.at_mut(key)?.change(spec.any_value().clone())?;
                }
            } else {
                merged.insert(key, spec.clone());
            }
        }
        Ok(merged)
    }

    fn assert_unlocked(&self) -> Result<()> {
        if self.locked {
            return Err(PlugboardError::Locked(
                "module state is frozen while locked".to_string(),
            ));
        }
        Ok(())
    }
}

impl PartialEq for ModuleInstance {
    fn eq(&self, other: &Self) -> bool {
        let same_impl = match (&self.base, &other.base) {
            (Some(a), Some(b)) => a.implementation_key() == b.implementation_key(),
            (None, None) => true,
            _ => false,
        };
        same_impl
            && self.locked == other.locked
            && self.property_types == other.property_types
            && self.inputs == other.inputs
            && self.submods == other.submods
    }
}

impl fmt::Debug for ModuleInstance {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ModuleInstance")
            .field(
                "implementation",
                &self.base.as_ref().map(|b| b.implementation_key()),
            )
            .field("locked", &self.locked)
            .field("inputs", &self.inputs.len())
            .field("submods", &self.submods.len())
            .finish()
    }
}

fn no_module() -> PlugboardError {
    PlugboardError::NoModule("module has no bound implementation".to_string())
}
