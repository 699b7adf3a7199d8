mod address;

pub use address::{Address, ADDRESS_SIZE};

pub const HASH_SIZE: usize = 32;

// Domain-separated blake3 hash, used to derive identifiers from names
pub fn hash_with_domain(domain: &[u8], value: &[u8]) -> [u8; HASH_SIZE] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(domain);
    hasher.update(value);
    hasher.finalize().into()
}
