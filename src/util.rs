/// A simplified and const generic version of arrayref
#[inline]
fn take<const N: usize>(data: &[u8]) -> [u8; N] {
    debug_assert!(data.len() >= N);
    unsafe { *(data.as_ptr() as *const [u8; N]) }
}

/// https://youtu.be/wlvKAT7SZIQ?si=EndNPTY6f8oEBS--&t=2426
#[inline]
pub(crate) const fn fast_digit_parse(val: u64) -> Option<u64> {
    let is_digits = ((val & 0xF0F0_F0F0_F0F0_F0F0)
        | ((val.wrapping_add(0x0606_0606_0606_0606) & 0xF0F0_F0F0_F0F0_F0F0) >> 4))
        == 0x3333_3333_3333_3333;

    if !is_digits {
        None
    } else {
        let val = (val & 0x0F0F_0F0F_0F0F_0F0F).wrapping_mul(2561) >> 8;
        let val = (val & 0x00FF_00FF_00FF_00FF).wrapping_mul(6553601) >> 16;
        let val = (val & 0x0000_FFFF_0000_FFFF).wrapping_mul(42949672960001) >> 32;
        Some(val)
    }
}

#[inline]
pub(crate) fn le_u64(data: &[u8]) -> u64 {
    u64::from_le_bytes(take::<8>(data))
}

/// Returns true if every byte is ascii, checking 8 bytes at a time
#[inline]
pub(crate) fn is_ascii(data: &[u8]) -> bool {
    let mut chunks = data.chunks_exact(8);
    let wide = chunks
        .by_ref()
        .fold(0u64, |acc, chunk| acc | le_u64(chunk));
    wide & 0x8080_8080_8080_8080 == 0 && chunks.remainder().iter().all(|b| b.is_ascii())
}
