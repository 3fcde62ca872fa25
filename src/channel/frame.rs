/*!
 * Channel Frame
 * On-disk layout of one argument channel file
 */

use crate::core::serialization::{from_slice_with_header, to_vec_with_header};
use crate::core::{ForkError, ForkResult};
use crate::signature::{Arg, Kind};
use serde::{Deserialize, Serialize};

/// One encoded argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireArg {
    pub kind: Kind,
    pub schema: String,
    /// JSON encoding of the value
    pub payload: Vec<u8>,
}

/// Everything the child needs to make the call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelFrame {
    pub name: String,
    pub args: Vec<WireArg>,
}

impl ChannelFrame {
    /// Encode each argument independently, in order
    pub fn encode(name: &str, args: &[Arg]) -> ForkResult<Self> {
        let args = args
            .iter()
            .enumerate()
            .map(|(position, arg)| -> ForkResult<WireArg> {
                let payload = arg
                    .encode()
                    .map_err(|source| ForkError::Encode { position, source })?;
                Ok(WireArg {
                    kind: arg.kind(),
                    schema: arg.schema().to_string(),
                    payload,
                })
            })
            .collect::<ForkResult<Vec<_>>>()?;

        Ok(Self {
            name: name.to_string(),
            args,
        })
    }

    pub fn to_bytes(&self) -> ForkResult<Vec<u8>> {
        Ok(to_vec_with_header(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> ForkResult<Self> {
        Ok(from_slice_with_header(bytes)?)
    }
}
