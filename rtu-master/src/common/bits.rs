pub(crate) fn num_bytes_for_bits(count: usize) -> usize {
    (count + 7) / 8
}

/// Expand `count` packed bits, least significant bit of the first byte first
pub(crate) fn unpack_bits(bytes: &[u8], count: usize) -> Vec<bool> {
    (0..count)
        .map_while(|pos| bytes.get(pos / 8).map(|byte| byte & (1 << (pos % 8)) != 0))
        .collect()
}
