/*!
 * Function Registry
 * Routing names mapped to the functions a forked child can run
 */

use crate::channel::ArgReader;
use crate::core::{ForkError, ForkResult};
use crate::process::Function;
use crate::signature::{Arg, ForkFn, Signature, Target};
use ahash::RandomState;
use dashmap::mapref::entry::Entry as MapEntry;
use dashmap::DashMap;
use std::process::ExitCode;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

type Handler = Box<dyn Fn(&mut ArgReader) -> ForkResult<ExitCode> + Send + Sync>;

struct Entry {
    signature: Signature,
    handler: Handler,
}

static GLOBAL: OnceLock<Registry> = OnceLock::new();

/// Table of forkable functions
///
/// Parent and child run the same binary, so both build the same table before
/// any fork happens. The parent uses it to describe launches by name and the
/// child to find the function to call.
#[derive(Clone, Default)]
pub struct Registry {
    entries: Arc<DashMap<String, Arc<Entry>, RandomState>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::with_hasher(RandomState::new())),
        }
    }

    /// Process-wide registry used by [`register`], [`fork`] and [`crate::init`]
    pub fn global() -> &'static Registry {
        GLOBAL.get_or_init(Registry::new)
    }

    /// Register `f` under `name`
    pub fn register<M: 'static, F: ForkFn<M>>(&self, name: impl Into<String>, f: F) -> ForkResult<()> {
        let name = name.into();
        match self.entries.entry(name) {
            MapEntry::Occupied(occupied) => {
                Err(ForkError::DuplicateFunction(occupied.key().clone()))
            }
            MapEntry::Vacant(vacant) => {
                let signature = f.signature();
                debug!(name = %vacant.key(), signature = %signature, "Registered function");
                vacant.insert(Arc::new(Entry {
                    signature,
                    handler: Box::new(move |reader: &mut ArgReader| f.call(reader)),
                }));
                Ok(())
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn signature(&self, name: &str) -> Option<Signature> {
        self.entries.get(name).map(|entry| entry.signature.clone())
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build a launch descriptor for a registered function
    pub fn function(&self, name: &str) -> ForkResult<Function> {
        let signature = self
            .signature(name)
            .ok_or_else(|| ForkError::UnknownFunction(name.to_string()))?;
        Function::new(name, Target::Callable(signature))
    }

    /// Run a registered function on the arguments in `reader`
    pub fn invoke(&self, name: &str, reader: &mut ArgReader) -> ForkResult<ExitCode> {
        // release the shard lock before user code runs
        let entry = self
            .entries
            .get(name)
            .map(|e| Arc::clone(e.value()))
            .ok_or_else(|| ForkError::UnknownFunction(name.to_string()))?;

        info!(name, args = reader.remaining(), "Invoking forked function");
        (entry.handler)(reader)
    }
}

/// Register `f` in the global registry
pub fn register<M: 'static, F: ForkFn<M>>(name: impl Into<String>, f: F) -> ForkResult<()> {
    Registry::global().register(name, f)
}

/// Launch a globally registered function with `args`
///
/// Returns the descriptor of the running child.
pub fn fork(name: &str, args: &[Arg]) -> ForkResult<Function> {
    let mut function = Registry::global().function(name)?;
    function.fork(args)?;
    Ok(function)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use crate::channel::ChannelFrame;
    use crate::signature::Kind;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicI64, Ordering};

    fn same_code(a: ExitCode, b: ExitCode) -> bool {
        format!("{:?}", a) == format!("{:?}", b)
    }

    fn reader_for(name: &str, args: &[Arg]) -> ArgReader {
        let bytes = ChannelFrame::encode(name, args).unwrap().to_bytes().unwrap();
        ArgReader::from_bytes(&bytes).unwrap()
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = Registry::new();
        registry.register("add", |_a: i64, _b: i64| {}).unwrap();
        registry.register("noop", || {}).unwrap();

        assert!(registry.contains("add"));
        assert!(!registry.contains("missing"));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["add".to_string(), "noop".to_string()]);
        assert_eq!(
            registry.signature("add").unwrap().kinds().collect::<Vec<_>>(),
            vec![Kind::Int, Kind::Int]
        );
    }

    #[test]
    fn test_duplicate_name_is_rejected() {
        let registry = Registry::new();
        registry.register("job", || {}).unwrap();
        let err = registry.register("job", |_x: bool| {}).unwrap_err();
        assert!(matches!(err, ForkError::DuplicateFunction(ref name) if name == "job"));
        // first registration wins
        assert_eq!(registry.signature("job").unwrap().arity(), 0);
    }

    #[test]
    fn test_invoke_decodes_arguments() {
        static SEEN: AtomicI64 = AtomicI64::new(0);
        let registry = Registry::new();
        registry
            .register("store", |value: i64, scale: i32| {
                SEEN.store(value * scale as i64, Ordering::SeqCst);
            })
            .unwrap();

        let mut reader = reader_for("store", &args![21i64, 2i32]);
        let code = registry.invoke("store", &mut reader).unwrap();
        assert!(same_code(code, ExitCode::SUCCESS));
        assert_eq!(SEEN.load(Ordering::SeqCst), 42);
    }

    #[test]
    fn test_invoke_reports_return_value() {
        let registry = Registry::new();
        registry
            .register("fail", |msg: String| -> Result<(), String> { Err(msg) })
            .unwrap();

        let mut reader = reader_for("fail", &args!["nope"]);
        let code = registry.invoke("fail", &mut reader).unwrap();
        assert!(same_code(code, ExitCode::FAILURE));
    }

    #[test]
    fn test_invoke_rejects_wrong_arity() {
        let registry = Registry::new();
        registry.register("pair", |_a: i64, _b: i64| {}).unwrap();

        let mut reader = reader_for("pair", &args![1i64]);
        let err = registry.invoke("pair", &mut reader).unwrap_err();
        assert!(matches!(err, ForkError::ArgCount { expected: 2, got: 1, .. }));
    }

    #[test]
    fn test_invoke_unknown_name() {
        let registry = Registry::new();
        let mut reader = reader_for("ghost", &args![]);
        let err = registry.invoke("ghost", &mut reader).unwrap_err();
        assert!(matches!(err, ForkError::UnknownFunction(ref name) if name == "ghost"));
    }

    #[test]
    #[serial_test::parallel]
    fn test_function_uses_registered_signature() {
        let registry = Registry::new();
        registry.register("greet", |_who: String| {}).unwrap();

        let function = registry.function("greet").unwrap();
        assert_eq!(function.name(), "greet");
        assert_eq!(function.signature().arity(), 1);
        assert!(matches!(
            registry.function("other"),
            Err(ForkError::UnknownFunction(_))
        ));
    }

    #[test]
    fn test_clones_share_entries() {
        let registry = Registry::new();
        let clone = registry.clone();
        clone.register("shared", || {}).unwrap();
        assert!(registry.contains("shared"));
    }
}
