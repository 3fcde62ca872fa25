/*!
 * Call Arguments
 * Type-erased argument values tagged with their kind and schema
 */

use super::kind::{ForkArg, Kind};
use crate::core::serialization::json::{self, JsonResult};
use serde::Serialize;
use std::fmt;

trait EncodeValue: Send {
    fn encode(&self) -> JsonResult<Vec<u8>>;
}

impl<T: Serialize + Send> EncodeValue for T {
    fn encode(&self) -> JsonResult<Vec<u8>> {
        json::to_vec(self)
    }
}

/// One argument of a forked call
///
/// The value is held as-is and only encoded when the argument channel is
/// written, after the call has been validated.
pub struct Arg {
    kind: Kind,
    schema: &'static str,
    value: Box<dyn EncodeValue>,
}

impl Arg {
    pub fn new<T: ForkArg>(value: T) -> Self {
        Self {
            kind: T::KIND,
            schema: T::schema(),
            value: Box::new(value),
        }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn schema(&self) -> &'static str {
        self.schema
    }

    /// Encode the value into its wire payload
    pub fn encode(&self) -> JsonResult<Vec<u8>> {
        self.value.encode()
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arg")
            .field("kind", &self.kind)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// Build a `Vec<Arg>` from a list of values
///
/// ```
/// let args = selffork::args![3, "x"];
/// assert_eq!(args.len(), 2);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::signature::Arg>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::signature::Arg::new($value)),+]
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_arg_tags() {
        let arg = Arg::new(3i64);
        assert_eq!(arg.kind(), Kind::Int);
        assert_eq!(arg.schema(), "i64");

        let arg = Arg::new("x");
        assert_eq!(arg.kind(), Kind::String);
        assert_eq!(arg.schema(), std::any::type_name::<String>());
    }

    #[test]
    fn test_encode_is_json() {
        assert_eq!(Arg::new(3).encode().unwrap(), b"3".to_vec());
        assert_eq!(Arg::new("x").encode().unwrap(), br#""x""#.to_vec());
        assert_eq!(
            Arg::new(vec![1u8, 2]).encode().unwrap(),
            b"[1,2]".to_vec()
        );
    }

    #[test]
    fn test_non_finite_value_fails_to_encode() {
        use crate::core::serialization::JsonError;

        let arg = Arg::new(f64::NAN);
        assert_eq!(arg.kind(), Kind::Float);
        assert!(matches!(arg.encode(), Err(JsonError::NotRepresentable { .. })));
        assert!(Arg::new(Some(f64::INFINITY)).encode().is_err());
        assert!(Arg::new(vec![1.0f32, f32::NEG_INFINITY]).encode().is_err());
    }

    #[test]
    fn test_args_macro() {
        let args = crate::args![1, "two", 3.0, vec![true]];
        let kinds: Vec<Kind> = args.iter().map(Arg::kind).collect();
        assert_eq!(
            kinds,
            vec![Kind::Int, Kind::String, Kind::Float, Kind::Slice]
        );
        assert!(crate::args![].is_empty());
    }

    #[test]
    fn test_debug_omits_value() {
        let rendered = format!("{:?}", Arg::new(5u8));
        assert!(rendered.contains("Int"));
        assert!(rendered.contains("u8"));
    }
}
