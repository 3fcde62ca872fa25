/*!
 * Binary Framing
 * bincode body behind a fixed header, used for argument channel files
 *
 * Layout: `[version: u8][body length: u32 LE][bincode body]`
 *
 * A child built from another revision of the binary rejects the file on the
 * version byte instead of misreading it.
 */

use serde::{de::DeserializeOwned, Serialize};

/// Bytes before the body
pub const HEADER_LEN: usize = 5;

/// Current frame layout; bump when `ChannelFrame` changes shape
pub const BINCODE_FORMAT_VERSION: u8 = 1;

pub type BincodeResult<T> = Result<T, BincodeError>;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BincodeError {
    #[error("could not encode frame body")]
    Encode(#[source] Box<bincode::ErrorKind>),

    #[error("could not decode frame body")]
    Decode(#[source] Box<bincode::ErrorKind>),

    #[error("frame truncated: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },

    #[error("unsupported frame version {found} (this build reads {})", BINCODE_FORMAT_VERSION)]
    UnsupportedVersion { found: u8 },

    #[error("frame body of {0} bytes does not fit the length field")]
    Oversized(usize),

    #[error("{0} unexpected bytes after the frame body")]
    TrailingBytes(usize),
}

/// Parsed frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrameHeader {
    version: u8,
    body_len: usize,
}

impl FrameHeader {
    fn for_body(body_len: usize) -> BincodeResult<Self> {
        u32::try_from(body_len).map_err(|_| BincodeError::Oversized(body_len))?;
        Ok(Self {
            version: BINCODE_FORMAT_VERSION,
            body_len,
        })
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        out.push(self.version);
        // checked in for_body
        out.extend_from_slice(&(self.body_len as u32).to_le_bytes());
    }

    fn parse(bytes: &[u8]) -> BincodeResult<Self> {
        let header: &[u8; HEADER_LEN] = bytes
            .get(..HEADER_LEN)
            .and_then(|head| head.try_into().ok())
            .ok_or(BincodeError::Truncated {
                needed: HEADER_LEN,
                available: bytes.len(),
            })?;

        let [version, l0, l1, l2, l3] = *header;
        if version != BINCODE_FORMAT_VERSION {
            return Err(BincodeError::UnsupportedVersion { found: version });
        }
        Ok(Self {
            version,
            body_len: u32::from_le_bytes([l0, l1, l2, l3]) as usize,
        })
    }
}

/// Frame `value` behind a versioned header
pub fn to_vec_with_header<T: Serialize>(value: &T) -> BincodeResult<Vec<u8>> {
    let body = bincode::serialize(value).map_err(BincodeError::Encode)?;
    let header = FrameHeader::for_body(body.len())?;

    let mut out = Vec::with_capacity(HEADER_LEN + body.len());
    header.write_to(&mut out);
    out.extend_from_slice(&body);
    Ok(out)
}

/// Read a value framed by [`to_vec_with_header`]
///
/// The buffer must hold exactly one frame.
pub fn from_slice_with_header<T: DeserializeOwned>(bytes: &[u8]) -> BincodeResult<T> {
    let header = FrameHeader::parse(bytes)?;
    let end = HEADER_LEN + header.body_len;

    match bytes.len() {
        n if n < end => Err(BincodeError::Truncated {
            needed: end,
            available: n,
        }),
        n if n > end => Err(BincodeError::TrailingBytes(n - end)),
        _ => bincode::deserialize(&bytes[HEADER_LEN..]).map_err(BincodeError::Decode),
    }
}
