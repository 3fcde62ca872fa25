/*!
 * Argument Kinds
 * Coarse type categories used to check calls across the process boundary
 */

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::Hash;
use std::path::PathBuf;

/// Coarse kind of a value
///
/// Variant order is the wire tag written into channel files; append only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Bool,
    /// Every signed and unsigned integer width
    Int,
    Float,
    Char,
    String,
    Slice,
    Map,
    Option,
    Tuple,
    Struct,
    Enum,
    Unit,
}

impl Kind {
    pub const ALL: [Kind; 12] = [
        Kind::Bool,
        Kind::Int,
        Kind::Float,
        Kind::Char,
        Kind::String,
        Kind::Slice,
        Kind::Map,
        Kind::Option,
        Kind::Tuple,
        Kind::Struct,
        Kind::Enum,
        Kind::Unit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::Char => "char",
            Kind::String => "string",
            Kind::Slice => "slice",
            Kind::Map => "map",
            Kind::Option => "option",
            Kind::Tuple => "tuple",
            Kind::Struct => "struct",
            Kind::Enum => "enum",
            Kind::Unit => "unit",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value that can be passed to a forked function
///
/// `KIND` drives the shallow signature check; `schema()` is the concrete type
/// tag compared under strict matching. Parent and child run the same binary,
/// so `type_name` is stable between them.
pub trait ForkArg: Serialize + Send + 'static {
    const KIND: Kind;

    fn schema() -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Implement [`ForkArg`] for types with a fixed kind
///
/// ```
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Job {
///     id: u64,
/// }
///
/// selffork::fork_arg!(Job => Struct);
/// ```
#[macro_export]
macro_rules! fork_arg {
    ($($ty:ty => $kind:ident),+ $(,)?) => {
        $(
            impl $crate::signature::ForkArg for $ty {
                const KIND: $crate::signature::Kind = $crate::signature::Kind::$kind;
            }
        )+
    };
}

fork_arg!(
    bool => Bool,
    i8 => Int,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    i128 => Int,
    isize => Int,
    u8 => Int,
    u16 => Int,
    u32 => Int,
    u64 => Int,
    u128 => Int,
    usize => Int,
    f32 => Float,
    f64 => Float,
    char => Char,
    String => String,
    PathBuf => String,
    () => Unit,
);

// Literals are sent as `String` so they line up with `String` parameters
// under strict matching too.
impl ForkArg for &'static str {
    const KIND: Kind = Kind::String;

    fn schema() -> &'static str {
        std::any::type_name::<String>()
    }
}

impl<T: ForkArg> ForkArg for Vec<T> {
    const KIND: Kind = Kind::Slice;
}

impl<T: ForkArg> ForkArg for Option<T> {
    const KIND: Kind = Kind::Option;
}

impl<K, V> ForkArg for HashMap<K, V>
where
    K: ForkArg + Eq + Hash,
    V: ForkArg,
{
    const KIND: Kind = Kind::Map;
}

impl<K, V> ForkArg for BTreeMap<K, V>
where
    K: ForkArg + Ord,
    V: ForkArg,
{
    const KIND: Kind = Kind::Map;
}

macro_rules! impl_fork_arg_tuple {
    ($($name:ident),+) => {
        impl<$($name: ForkArg),+> ForkArg for ($($name,)+) {
            const KIND: Kind = Kind::Tuple;
        }
    };
}

impl_fork_arg_tuple!(A);
impl_fork_arg_tuple!(A, B);
impl_fork_arg_tuple!(A, B, C);
impl_fork_arg_tuple!(A, B, C, D);
