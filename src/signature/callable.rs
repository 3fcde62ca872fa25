/*!
 * Callable Signatures
 * Signature descriptors built once from plain Rust functions
 */

use super::kind::{ForkArg, Kind};
use super::validation::check_arity;
use crate::channel::ArgReader;
use crate::core::ForkResult;
use serde::de::DeserializeOwned;
use std::any::type_name;
use std::fmt;
use std::process::{ExitCode, Termination};

/// One declared parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Param {
    pub kind: Kind,
    pub schema: &'static str,
}

impl Param {
    pub fn new(kind: Kind, schema: &'static str) -> Self {
        Self { kind, schema }
    }

    pub fn of<T: ForkArg>() -> Self {
        Self::new(T::KIND, T::schema())
    }
}

/// Ordered parameter list of a forkable function
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    params: Vec<Param>,
    returns: &'static str,
}

impl Signature {
    pub fn new(params: Vec<Param>, returns: &'static str) -> Self {
        Self { params, returns }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn returns(&self) -> &'static str {
        self.returns
    }

    pub fn kinds(&self) -> impl Iterator<Item = Kind> + '_ {
        self.params.iter().map(|p| p.kind)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("fn(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(param.schema)?;
        }
        f.write_str(")")?;
        if self.returns != "()" {
            write!(f, " -> {}", self.returns)?;
        }
        Ok(())
    }
}

/// What a launch descriptor is bound to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Callable(Signature),
    /// A plain value; descriptors cannot be built from it
    Value { kind: Kind, schema: &'static str },
}

impl Target {
    /// Describe a function or closure
    pub fn of<M, F: ForkFn<M>>(f: F) -> Self {
        Target::Callable(f.signature())
    }

    /// Describe a non-callable value
    pub fn value<T: ForkArg>(_value: &T) -> Self {
        Target::Value {
            kind: T::KIND,
            schema: T::schema(),
        }
    }

    pub fn signature(&self) -> Option<&Signature> {
        match self {
            Target::Callable(signature) => Some(signature),
            Target::Value { .. } => None,
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Target::Callable(_))
    }
}

impl From<Signature> for Target {
    fn from(signature: Signature) -> Self {
        Target::Callable(signature)
    }
}

/// A function that can run in a forked child
///
/// Implemented for every `Fn(A1, .., An) -> R` up to eight parameters whose
/// parameters are [`ForkArg`]s and whose return type is a [`Termination`].
/// `M` is the function-pointer shape of `F` and only disambiguates impls.
pub trait ForkFn<M>: Send + Sync + 'static {
    fn signature(&self) -> Signature;

    /// Decode the arguments in order and run the function
    fn call(&self, args: &mut ArgReader) -> ForkResult<ExitCode>;
}

macro_rules! impl_fork_fn {
    ($($param:ident $value:ident),*) => {
        impl<F, R, $($param,)*> ForkFn<fn($($param,)*) -> R> for F
        where
            F: Fn($($param),*) -> R + Send + Sync + 'static,
            R: Termination + 'static,
            $($param: ForkArg + DeserializeOwned,)*
        {
            fn signature(&self) -> Signature {
                Signature::new(vec![$(Param::of::<$param>()),*], type_name::<R>())
            }

            fn call(&self, args: &mut ArgReader) -> ForkResult<ExitCode> {
                check_arity(&self.signature(), args.remaining())?;
                $(let $value = args.next_value::<$param>()?;)*
                args.finish()?;
                Ok((self)($($value),*).report())
            }
        }
    };
}

impl_fork_fn!();
impl_fork_fn!(A1 a1);
impl_fork_fn!(A1 a1, A2 a2);
impl_fork_fn!(A1 a1, A2 a2, A3 a3);
impl_fork_fn!(A1 a1, A2 a2, A3 a3, A4 a4);
impl_fork_fn!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5);
impl_fork_fn!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6);
impl_fork_fn!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7);
impl_fork_fn!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7, A8 a8);

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn worker(_a: i32, _b: String) {}

    fn exits(code: u8) -> ExitCode {
        ExitCode::from(code)
    }

    #[test]
    fn test_signature_from_fn_item() {
        let target = Target::of(worker);
        let signature = target.signature().unwrap();
        assert_eq!(signature.arity(), 2);
        assert_eq!(
            signature.kinds().collect::<Vec<_>>(),
            vec![Kind::Int, Kind::String]
        );
        assert_eq!(signature.to_string(), "fn(i32, alloc::string::String)");
    }

    #[test]
    fn test_signature_from_closure() {
        let target = Target::of(|_flag: bool, _items: Vec<u64>| {});
        let signature = target.signature().unwrap();
        assert_eq!(
            signature.params(),
            &[Param::of::<bool>(), Param::of::<Vec<u64>>()]
        );
    }

    #[test]
    fn test_signature_names_return_type() {
        let signature = Target::of(exits).signature().cloned().unwrap();
        assert_eq!(signature.returns(), type_name::<ExitCode>());
        assert!(signature.to_string().ends_with("ExitCode"));
    }

    #[test]
    fn test_zero_arity() {
        let target = Target::of(|| {});
        assert_eq!(target.signature().map(Signature::arity), Some(0));
        assert_eq!(target.signature().unwrap().to_string(), "fn()");
    }

    #[test]
    fn test_value_target_is_not_callable() {
        let target = Target::value(&42u32);
        assert!(!target.is_callable());
        assert_eq!(target.signature(), None);
        assert_eq!(
            target,
            Target::Value {
                kind: Kind::Int,
                schema: "u32"
            }
        );
    }
}
