//! The module manager: the keyed registry callers talk to.
//!
//! A manager owns every registered [`ModuleInstance`] behind a shared
//! handle, remembers which module is the default implementation of each
//! property type, and is the dispatch site for [`ModuleManager::run_as`].
//! Submodule requests left open by a module are wired up from the defaults
//! when the module is retrieved.

use std::collections::HashMap;
use std::hash::BuildHasherDefault;
use std::path::Path;
use std::sync::{Arc, Mutex};

use seahash::SeaHasher;
use tracing::debug;

use crate::cache::ManagerCache;
use crate::error::{PlugboardError, Result};
use crate::field::{FieldMap, OrderedMap};
use crate::module::{ModuleBase, ModuleInstance, ModuleRef, SharedModule};
use crate::property::{PropertyType, TypeKey};
use crate::value::AnyValue;

type ManagerHasher = BuildHasherDefault<SeaHasher>;

/// Keyed registry of module instances plus the property-type defaults.
pub struct ModuleManager {
    modules: OrderedMap<SharedModule>,
    defaults: HashMap<TypeKey, (String, FieldMap), ManagerHasher>,
    cache: ManagerCache,
}

impl ModuleManager {
    pub fn new() -> Self {
        Self {
            modules: OrderedMap::new(),
            defaults: HashMap::default(),
            cache: ManagerCache::new(),
        }
    }

    /// Registers an implementation under `key`. The instance receives cache
    /// handles keyed by the implementation identity, so later copies share
    /// its memoized results.
    pub fn add_module(&mut self, key: &str, base: Arc<dyn ModuleBase>) -> Result<()> {
        if self.modules.contains(key) {
            return Err(PlugboardError::Invalid(format!(
                "module key {key} already registered"
            )));
        }
        let implementation = base.implementation_key();
        let cache = self.cache.module_cache(implementation)?;
        let user_cache = self.cache.user_cache(implementation)?;
        let instance = ModuleInstance::bind(base, Some(cache), Some(user_cache))?;
        debug!(key, implementation, "module registered");
        self.modules
            .insert(key, Arc::new(Mutex::new(instance)));
        Ok(())
    }

    /// Deep copy of an existing instance under a new key. The copy is
    /// unlocked and shares the original's implementation identity, and with
    /// it the cache entries.
    pub fn copy_module(&mut self, old_key: &str, new_key: &str) -> Result<()> {
        if self.modules.contains(new_key) {
            return Err(PlugboardError::Invalid(format!(
                "module key {new_key} already registered"
            )));
        }
        let copy = {
            let shared = self.modules.at(old_key)?;
            let guard = shared
                .try_lock()
                .map_err(|_| PlugboardError::Locked(format!("module {old_key} is in use")))?;
            guard.unlocked_copy()
        };
        self.modules
            .insert(new_key, Arc::new(Mutex::new(copy)));
        Ok(())
    }

    /// Drops the registration under `key`. Submodule bindings pointing at
    /// it fail readiness from the next check on.
    pub fn erase(&mut self, key: &str) -> Result<()> {
        self.modules
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| PlugboardError::NotFound(key.to_string()))
    }

    pub fn count(&self, key: &str) -> usize {
        usize::from(self.modules.contains(key))
    }

    pub fn size(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.modules.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SharedModule)> {
        self.modules.iter()
    }

    /// Retrieves the instance under `key`, filling every unsatisfied
    /// submodule request that has a ready default. The same shared instance
    /// is returned for the same key across calls.
    pub fn at(&self, key: &str) -> Result<SharedModule> {
        let shared = Arc::clone(self.modules.at(key)?);
        self.fill_defaults(key, &shared)?;
        Ok(shared)
    }

    fn fill_defaults(&self, key: &str, shared: &SharedModule) -> Result<()> {
        let mut guard = shared
            .try_lock()
            .map_err(|_| PlugboardError::Locked(format!("module {key} is in use")))?;
        if guard.locked() {
            return Ok(());
        }
        let open_slots: Vec<(String, TypeKey)> = guard
            .submods()
            .iter()
            .filter(|(_, request)| !request.ready())
            .filter_map(|(slot, request)| request.expected().map(|t| (slot.to_string(), t)))
            .collect();
        for (slot, property_type) in open_slots {
            let Some((default_key, probe_inputs)) = self.defaults.get(property_type) else {
                continue;
            };
            // Recursive so the default's own open slots get filled first. A
            // default chain looping back onto a held instance simply fails
            // the try_lock and is skipped.
            let Ok(default_shared) = self.at(default_key) else {
                continue;
            };
            let default_ready = match default_shared.try_lock() {
                Ok(default_guard) => default_guard.ready(probe_inputs).unwrap_or(false),
                Err(_) => false,
            };
            if default_ready {
                debug!(key, slot = slot.as_str(), default = default_key.as_str(), "submodule wired from default");
                let target = ModuleRef::new(default_key, &default_shared);
                guard.change_submod(&slot, target)?;
            }
        }
        Ok(())
    }

    /// Binds `value` to `input_key` of the module under `module_key`.
    pub fn change_input(&self, module_key: &str, input_key: &str, value: AnyValue) -> Result<()> {
        let shared = self.modules.at(module_key)?;
        let mut guard = shared
            .try_lock()
            .map_err(|_| PlugboardError::Locked(format!("module {module_key} is in use")))?;
        guard.change_input(input_key, value)
    }

    /// Wires `submod_key` of `module_key` to the instance under
    /// `target_key`.
    pub fn change_submod(
        &self,
        module_key: &str,
        submod_key: &str,
        target_key: &str,
    ) -> Result<()> {
        let target = Arc::clone(self.modules.at(target_key)?);
        let shared = self.modules.at(module_key)?;
        let mut guard = shared
            .try_lock()
            .map_err(|_| PlugboardError::Locked(format!("module {module_key} is in use")))?;
        guard.change_submod(submod_key, ModuleRef::new(target_key, &target))
    }

    /// Records `key` as the default implementation of `PT`. The contract's
    /// own inputs, plus whatever `probe_inputs` pre-binds, are assumed
    /// supplied when the default's readiness is probed. Replaces any
    /// previous default.
    pub fn set_default<PT: PropertyType>(&mut self, probe_inputs: FieldMap, key: &str) -> Result<()> {
        if !self.modules.contains(key) {
            return Err(PlugboardError::NotFound(key.to_string()));
        }
        let mut probe = PT::inputs();
        for (input_key, spec) in probe_inputs.iter() {
            probe.insert(input_key, spec.clone());
        }
        self.defaults
            .insert(PT::type_key(), (key.to_string(), probe));
        Ok(())
    }

    /// The dispatch entry point: wraps `args` per the contract, runs the
    /// module under `key`, and unwraps the declared results.
    pub fn run_as<PT: PropertyType>(&self, key: &str, args: PT::Inputs) -> Result<PT::Results> {
        let shared = self.at(key)?;
        let wrapped = PT::wrap_inputs(PT::inputs(), args)?;
        let out = {
            let mut guard = shared
                .try_lock()
                .map_err(|_| PlugboardError::Locked(format!("module {key} is in use")))?;
            if !guard.satisfies(PT::type_key()) {
                return Err(PlugboardError::WrongType {
                    expected: PT::type_key().to_string(),
                    found: format!("module {key}"),
                });
            }
            guard.run(wrapped)?
        };
        PT::unwrap_results(&out)
    }

    /// Points the shared caches at durable storage under `root`
    /// (`<root>/cache/` and `<root>/uuid/`), carrying current entries over.
    pub fn change_save_location(&mut self, root: &Path) -> Result<()> {
        self.cache.change_save_location(root)
    }

    /// Flushes the cache backends.
    pub fn backup(&self) -> Result<()> {
        self.cache.backup()
    }

    /// Drops every cache entry of every implementation.
    pub fn dump_caches(&self) -> Result<()> {
        self.cache.dump()
    }
}

impl Default for ModuleManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience for a default with no pre-bound inputs.
pub fn no_inputs() -> FieldMap {
    FieldMap::new()
}
