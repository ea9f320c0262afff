//! XXTEA block cipher used by the pack format.
//!
//! Index files and assets encipher only their leading block: the first
//! `min(512, len)` bytes, of which at most 128 little-endian 32-bit words
//! participate. The key is fixed across all packs and its words are read
//! big-endian. Everything past the leading block is stored in the clear.

/// Shared key for every pack.
pub const COMMON_KEY: [u8; 16] = [
    0x91, 0xbd, 0x7a, 0x0a, 0xa7, 0x54, 0x40, 0xa9, 0xbb, 0xd4, 0x9d, 0x6c, 0xe0, 0xdc, 0xc0, 0xe3,
];

/// Size of the enciphered leading block.
pub const CIPHER_BLOCK_LEN: usize = 512;

const MAX_CIPHER_WORDS: usize = 128;
const DELTA: u32 = 0x9e37_79b9;

fn mx(key: &[u32; 4], e: usize, p: usize, y: u32, z: u32, sum: u32) -> u32 {
    ((z >> 5 ^ y << 2).wrapping_add(y >> 3 ^ z << 4))
        ^ ((sum ^ y).wrapping_add(key[(p & 3) ^ e] ^ z))
}

/// Encipher `v` in place. No-op for fewer than two words.
pub fn encipher(v: &mut [u32], key: &[u32; 4]) {
    let n = v.len();
    if n < 2 {
        return;
    }
    let mut rounds = 1 + 52 / n;
    let mut sum = 0u32;
    let mut z = v[n - 1];
    while rounds > 0 {
        sum = sum.wrapping_add(DELTA);
        let e = ((sum >> 2) & 3) as usize;
        for p in 0..n - 1 {
            let y = v[p + 1];
            v[p] = v[p].wrapping_add(mx(key, e, p, y, z, sum));
            z = v[p];
        }
        let y = v[0];
        v[n - 1] = v[n - 1].wrapping_add(mx(key, e, n - 1, y, z, sum));
        z = v[n - 1];
        rounds -= 1;
    }
}

/// Decipher `v` in place. No-op for fewer than two words.
pub fn decipher(v: &mut [u32], key: &[u32; 4]) {
    let n = v.len();
    if n < 2 {
        return;
    }
    let rounds = 1 + 52 / n;
    let mut sum = (rounds as u32).wrapping_mul(DELTA);
    let mut y = v[0];
    for _ in 0..rounds {
        let e = ((sum >> 2) & 3) as usize;
        for p in (1..n).rev() {
            let z = v[p - 1];
            v[p] = v[p].wrapping_sub(mx(key, e, p, y, z, sum));
            y = v[p];
        }
        let z = v[n - 1];
        v[0] = v[0].wrapping_sub(mx(key, e, 0, y, z, sum));
        y = v[0];
        sum = sum.wrapping_sub(DELTA);
    }
}

/// The common key as cipher words.
pub fn common_key_words() -> [u32; 4] {
    let mut key = [0u32; 4];
    for (word, chunk) in key.iter_mut().zip(COMMON_KEY.chunks_exact(4)) {
        *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    key
}

/// Decipher the leading block of `data` in place.
///
/// Only whole words participate; a trailing partial word of a short file is
/// passed through untouched rather than truncated.
pub fn decipher_head(data: &mut [u8]) {
    transform_head(data, decipher);
}

/// Encipher the leading block of `data` in place. Used by pack-authoring
/// tooling and test fixtures.
pub fn encipher_head(data: &mut [u8]) {
    transform_head(data, encipher);
}

fn transform_head(data: &mut [u8], f: fn(&mut [u32], &[u32; 4])) {
    let head = CIPHER_BLOCK_LEN.min(data.len());
    let words = (head / 4).min(MAX_CIPHER_WORDS);
    if words < 2 {
        return;
    }
    let mut v: Vec<u32> = data[..words * 4]
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    f(&mut v, &common_key_words());
    for (chunk, word) in data[..words * 4].chunks_exact_mut(4).zip(&v) {
        chunk.copy_from_slice(&word.to_le_bytes());
    }
}
