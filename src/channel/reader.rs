/*!
 * Channel Reader
 * Child side of the argument channel
 */

use super::frame::{ChannelFrame, WireArg};
use crate::core::serialization::json;
use crate::core::{ForkError, ForkResult};
use crate::signature::{ForkArg, Kind};
use serde::de::DeserializeOwned;
use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Ordered access to the arguments of one forked call
#[derive(Debug)]
pub struct ArgReader {
    name: String,
    args: VecDeque<WireArg>,
    position: usize,
}

impl ArgReader {
    /// Decode a channel file held in memory
    pub fn from_bytes(bytes: &[u8]) -> ForkResult<Self> {
        let frame = ChannelFrame::from_bytes(bytes)?;
        Ok(Self {
            name: frame.name,
            args: frame.args.into(),
            position: 0,
        })
    }

    /// Read a channel file, leaving it in place
    pub fn read(path: impl AsRef<Path>) -> ForkResult<Self> {
        let bytes = fs::read(path.as_ref()).map_err(ForkError::Channel)?;
        Self::from_bytes(&bytes)
    }

    /// Read a channel file and delete it
    ///
    /// The file is removed before decoding, so a corrupt channel does not
    /// outlive the child either.
    pub fn consume(path: impl AsRef<Path>) -> ForkResult<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(ForkError::Channel)?;
        if let Err(e) = fs::remove_file(path) {
            warn!(path = %path.display(), error = %e, "Failed to remove argument channel");
        }
        let reader = Self::from_bytes(&bytes)?;
        debug!(path = %path.display(), name = %reader.name, args = reader.args.len(), "Consumed argument channel");
        Ok(reader)
    }

    /// Routing name the parent wrote into the channel
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fail unless the channel was written for `name`
    pub fn expect_name(&self, name: &str) -> ForkResult<()> {
        if self.name != name {
            return Err(ForkError::ChannelCorrupt(format!(
                "channel written for '{}', expected '{}'",
                self.name, name
            )));
        }
        Ok(())
    }

    /// Arguments not yet decoded
    pub fn remaining(&self) -> usize {
        self.args.len()
    }

    /// Index of the next argument
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn peek_kind(&self) -> Option<Kind> {
        self.args.front().map(|arg| arg.kind)
    }

    /// Decode the next argument as `T`
    pub fn next_value<T: ForkArg + DeserializeOwned>(&mut self) -> ForkResult<T> {
        let position = self.position;
        let wire = self.args.pop_front().ok_or_else(|| {
            ForkError::ChannelCorrupt(format!("argument {} is missing", position))
        })?;
        self.position += 1;

        if wire.kind != T::KIND {
            return Err(ForkError::ArgMismatch {
                position,
                expected: T::KIND,
                got: wire.kind,
            });
        }

        Ok(json::from_slice(&wire.payload)?)
    }

    /// Fail if any argument was left undecoded
    pub fn finish(&self) -> ForkResult<()> {
        if !self.args.is_empty() {
            return Err(ForkError::ChannelCorrupt(format!(
                "{} undecoded argument(s) after position {}",
                self.args.len(),
                self.position
            )));
        }
        Ok(())
    }

    /// Decode every remaining argument without a target type
    pub fn into_values(self) -> ForkResult<Vec<serde_json::Value>> {
        self.args
            .iter()
            .map(|wire| -> ForkResult<serde_json::Value> {
                Ok(json::from_slice(&wire.payload)?)
            })
            .collect()
    }
}
