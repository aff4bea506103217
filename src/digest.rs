// used to render digests the way they appear in cache keys
use std::fmt;

/// Number of bytes in a content digest.
pub const DIGEST_LEN: usize = 16;

/// Hex digest of the zero-length stream: the published BLAKE3 empty-input
/// vector truncated to [`DIGEST_LEN`] bytes. An empty value container and a
/// typed field with no bound value both digest to exactly this string.
pub const EMPTY_STREAM_DIGEST: &str = "af1349b9f5f9a1a6a0404dea36dcc949";

/// A 128-bit content digest identifying a value, a field, or a whole
/// (module, inputs, submodules) configuration. Rendered as 32 lowercase
/// hexadecimal characters wherever a string key is needed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    /// The sentinel digest contributed by transparent fields.
    pub const ZERO: Digest = Digest([0u8; DIGEST_LEN]);

    pub fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Digest(bytes)
    }

    pub fn bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Incremental 128-bit content hasher. Feed bytes, then `finish`.
pub struct Digester {
    inner: blake3::Hasher,
}

impl Digester {
    pub fn new() -> Self {
        Self {
            inner: blake3::Hasher::new(),
        }
    }

    pub fn update(&mut self, bytes: &[u8]) -> &mut Self {
        self.inner.update(bytes);
        self
    }

    pub fn update_str(&mut self, s: &str) -> &mut Self {
        self.inner.update(s.as_bytes());
        self
    }

    pub fn finish(&self) -> Digest {
        let hash = self.inner.finalize();
        let mut out = [0u8; DIGEST_LEN];
        out.copy_from_slice(&hash.as_bytes()[..DIGEST_LEN]);
        Digest(out)
    }
}

impl Default for Digester {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot digest of a byte slice.
pub fn digest_of(bytes: &[u8]) -> Digest {
    let mut d = Digester::new();
    d.update(bytes);
    d.finish()
}
