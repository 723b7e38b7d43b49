use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use snafu::{OptionExt, ResultExt};

use super::data_source::{DataUriDecodeSnafu, InvalidDataUriSnafu};
use super::{DataSourceTrait, SourceError};

const SCHEME: &str = "data:";
const BASE64_MARKER: &str = "base64";

/// Content embedded in a `data:[<mime>][;base64],<payload>` URI.
///
/// The URI is validated on construction; the payload is decoded again on every read.
#[derive(Debug, Clone)]
pub struct DataUriSource {
    uri: Arc<str>,
    size: u64,
}

impl DataUriSource {
    pub fn new(uri: impl Into<Arc<str>>) -> Result<Self, SourceError> {
        let uri = uri.into();
        let size = decode(&uri)?.len() as u64;
        Ok(Self { uri, size })
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }
}

impl DataSourceTrait for DataUriSource {
    fn size(&self) -> u64 {
        self.size
    }

    async fn get_data(&self, on_progress: &mut dyn FnMut(u64)) -> Result<Vec<u8>, SourceError> {
        let data = decode(&self.uri)?;
        on_progress(data.len() as u64);
        Ok(data)
    }
}

fn decode(uri: &str) -> Result<Vec<u8>, SourceError> {
    let rest = uri.strip_prefix(SCHEME).context(InvalidDataUriSnafu {
        reason: "missing 'data:' scheme",
    })?;
    let (metadata, payload) = rest.split_once(',').context(InvalidDataUriSnafu {
        reason: "missing ',' before the payload",
    })?;

    let is_base64 = metadata
        .split(';')
        .any(|parameter| parameter.trim().eq_ignore_ascii_case(BASE64_MARKER));
    if is_base64 {
        STANDARD.decode(payload.trim()).context(DataUriDecodeSnafu)
    } else {
        Ok(payload.as_bytes().to_vec())
    }
}
