/*!
 * Module Loader
 *
 * Resolves a module by relative path and binds its exports by name into a
 * typed dispatch table. Resolution failures are setup errors, never runtime
 * ones.
 */

use super::abi::{
    BuildFrameFn, RaiseFn, Symbol, BUILD_HOSTED_FRAME, BUILD_NATIVE_FRAME, RAISE_FROM_HEAP,
    RAISE_FROM_STACK,
};
use super::exports;
use crate::core::errors::{SetupError, SetupResult};
use crate::core::limits::BUILTIN_MODULE_PATH;
use crate::core::types::{AllocationSite, ExceptionKind, ExecutionContext};
use crate::frames::{FrameBuilder, FrameCallback};
use ahash::HashMap;
use path_clean::clean;
use std::ffi::CStr;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// A loaded module that can be asked for symbols by name
pub trait SymbolSource: Send + Sync {
    fn name(&self) -> &str;

    fn lookup(&self, symbol: &str) -> Option<Symbol>;
}

/// Module backed by an in-process export table
#[derive(Clone)]
pub struct ExportTable {
    name: String,
    symbols: HashMap<String, Symbol>,
}

impl ExportTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbols: HashMap::default(),
        }
    }

    /// The frame module shipped with the harness
    pub fn builtin() -> Self {
        Self::new("unwind-frames")
            .export(
                RAISE_FROM_STACK,
                Symbol::Raise(exports::unwind_raise_from_stack as RaiseFn),
            )
            .export(
                RAISE_FROM_HEAP,
                Symbol::Raise(exports::unwind_raise_from_heap as RaiseFn),
            )
            .export(
                BUILD_NATIVE_FRAME,
                Symbol::BuildFrame(exports::unwind_build_native_frame as BuildFrameFn),
            )
            .export(
                BUILD_HOSTED_FRAME,
                Symbol::BuildFrame(exports::unwind_build_hosted_frame as BuildFrameFn),
            )
    }

    pub fn export(mut self, name: impl Into<String>, symbol: Symbol) -> Self {
        self.symbols.insert(name.into(), symbol);
        self
    }

    pub fn without(mut self, name: &str) -> Self {
        self.symbols.remove(name);
        self
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl SymbolSource for ExportTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookup(&self, symbol: &str) -> Option<Symbol> {
        self.symbols.get(symbol).copied()
    }
}

/// Modules addressable by relative path
pub struct ModuleRegistry {
    modules: HashMap<PathBuf, Arc<dyn SymbolSource>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self {
            modules: HashMap::default(),
        }
    }

    /// Registry holding the built-in frame module at its fixed path
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(BUILTIN_MODULE_PATH, ExportTable::builtin());
        registry
    }

    pub fn register<S>(&mut self, path: impl AsRef<Path>, module: S)
    where
        S: SymbolSource + 'static,
    {
        let path = clean(path.as_ref());
        debug!(path = %path.display(), module = module.name(), "registered module");
        self.modules.insert(path, Arc::new(module));
    }

    pub fn load(&self, path: impl AsRef<Path>) -> SetupResult<Arc<dyn SymbolSource>> {
        let path = clean(path.as_ref());
        self.modules
            .get(&path)
            .cloned()
            .ok_or(SetupError::ModuleNotFound { path })
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

/// Typed handles to a module's four exports
#[derive(Clone)]
pub struct DispatchTable {
    module: String,
    raise_from_stack: RaiseFn,
    raise_from_heap: RaiseFn,
    build_native_frame: BuildFrameFn,
    build_hosted_frame: BuildFrameFn,
}

impl DispatchTable {
    /// Bind every export of `source`
    pub fn resolve(source: &dyn SymbolSource) -> SetupResult<Self> {
        let module = source.name().to_string();
        let table = Self {
            raise_from_stack: resolve_raise(source, RAISE_FROM_STACK)?,
            raise_from_heap: resolve_raise(source, RAISE_FROM_HEAP)?,
            build_native_frame: resolve_frame(source, BUILD_NATIVE_FRAME)?,
            build_hosted_frame: resolve_frame(source, BUILD_HOSTED_FRAME)?,
            module,
        };
        info!(module = %table.module, "resolved all module exports");
        Ok(table)
    }

    /// Load the module at `path` from `registry` and bind its exports
    pub fn load(registry: &ModuleRegistry, path: impl AsRef<Path>) -> SetupResult<Self> {
        let source = registry.load(path)?;
        Self::resolve(source.as_ref())
    }

    /// Table bound to the built-in module
    pub fn builtin() -> SetupResult<Self> {
        Self::resolve(&ExportTable::builtin())
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    /// Call the raise export for `site`
    ///
    /// Returns only if the module failed to raise.
    pub fn raise(&self, site: AllocationSite, kind: ExceptionKind, message: &CStr, error_code: u32) {
        let func = match site {
            AllocationSite::Stack => self.raise_from_stack,
            AllocationSite::Heap => self.raise_from_heap,
        };
        // SAFETY: `message` is NUL-terminated and borrowed for the whole call.
        unsafe { func(kind, message.as_ptr(), error_code) }
    }
}

impl FrameBuilder for DispatchTable {
    fn build_frame(&self, context: ExecutionContext, depth: usize, callback: FrameCallback) {
        match context {
            ExecutionContext::Native => (self.build_native_frame)(depth, callback),
            ExecutionContext::Hosted => (self.build_hosted_frame)(depth, callback),
        }
    }
}

impl fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchTable")
            .field("module", &self.module)
            .finish_non_exhaustive()
    }
}

fn lookup(source: &dyn SymbolSource, symbol: &'static str) -> SetupResult<Symbol> {
    source.lookup(symbol).ok_or_else(|| SetupError::MissingSymbol {
        module: source.name().to_string(),
        symbol,
    })
}

fn resolve_raise(source: &dyn SymbolSource, symbol: &'static str) -> SetupResult<RaiseFn> {
    match lookup(source, symbol)? {
        Symbol::Raise(func) => Ok(func),
        Symbol::BuildFrame(_) => Err(SetupError::SignatureMismatch {
            module: source.name().to_string(),
            symbol,
        }),
    }
}

fn resolve_frame(source: &dyn SymbolSource, symbol: &'static str) -> SetupResult<BuildFrameFn> {
    match lookup(source, symbol)? {
        Symbol::BuildFrame(func) => Ok(func),
        Symbol::Raise(_) => Err(SetupError::SignatureMismatch {
            module: source.name().to_string(),
            symbol,
        }),
    }
}
