/*!
 * Signature Validation
 * Shallow call-compatibility check run before any process is started
 */

use super::arg::Arg;
use super::callable::Signature;
use crate::core::{ForkError, ForkResult, Matching};

/// Check an argument list against a target signature
///
/// Arity is checked first, then each position's kind in order. Under
/// [`Matching::Strict`] the schema tag of every argument must also equal the
/// declared parameter's.
pub fn validate_args(signature: &Signature, args: &[Arg], matching: Matching) -> ForkResult<()> {
    check_arity(signature, args.len())?;

    for (position, (param, arg)) in signature.params().iter().zip(args).enumerate() {
        if param.kind != arg.kind() {
            return Err(ForkError::ArgMismatch {
                position,
                expected: param.kind,
                got: arg.kind(),
            });
        }

        if matching == Matching::Strict && param.schema != arg.schema() {
            return Err(ForkError::SchemaMismatch {
                position,
                expected: param.schema.to_string(),
                got: arg.schema().to_string(),
            });
        }
    }

    Ok(())
}

/// Check only the argument count
pub(crate) fn check_arity(signature: &Signature, got: usize) -> ForkResult<()> {
    if got != signature.arity() {
        return Err(ForkError::ArgCount {
            signature: signature.to_string(),
            expected: signature.arity(),
            got,
        });
    }
    Ok(())
}
