//! Output digests.
//!
//! Translation runs are expected to be byte-for-byte reproducible for a fixed
//! ontology and fixed auxiliary tables. The CLI reports a digest of the
//! rendered output so two runs (or a run and a reference fixture) can be
//! compared without diffing large files.
//!
//! - algorithm: **FNV-1a 64-bit**
//! - input: the UTF-8 bytes of the rendered statements
//! - output: `"fnv1a64:<16 lowercase hex digits>"`
//!
//! This is **not** a security primitive.

use crate::atom::Atom;
use crate::sexpr::render;

/// Prefix used in serialized digests.
pub const DIGEST_V1_PREFIX: &str = "fnv1a64:";

const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x00000100000001b3;

/// Incremental FNV-1a hasher, so statements can be digested as they are written.
#[derive(Debug, Clone, Copy)]
pub struct Fnv1a64 {
    hash: u64,
}

impl Default for Fnv1a64 {
    fn default() -> Self {
        Self {
            hash: FNV_OFFSET_BASIS,
        }
    }
}

impl Fnv1a64 {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, bytes: &[u8]) {
        for b in bytes {
            self.hash ^= (*b) as u64;
            self.hash = self.hash.wrapping_mul(FNV_PRIME);
        }
    }

    pub fn finish(&self) -> String {
        format!("{DIGEST_V1_PREFIX}{:016x}", self.hash)
    }
}

/// Compute a v1 digest (FNV-1a 64-bit) over arbitrary bytes.
pub fn fnv1a64_digest_bytes(bytes: &[u8]) -> String {
    let mut hasher = Fnv1a64::new();
    hasher.update(bytes);
    hasher.finish()
}

/// Digest of a statement list exactly as `sexpr::render_statements` lays it out.
pub fn statements_digest_v1(statements: &[Atom]) -> String {
    let mut hasher = Fnv1a64::new();
    for (i, atom) in statements.iter().enumerate() {
        if i > 0 {
            hasher.update(crate::sexpr::STATEMENT_SEPARATOR.as_bytes());
        }
        hasher.update(render(atom).as_bytes());
    }
    if !statements.is_empty() {
        hasher.update(b"\n");
    }
    hasher.finish()
}
