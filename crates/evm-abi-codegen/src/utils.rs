/// Rounds `x` up to the nearest multiple of 32.
pub fn ceil32(x: usize) -> usize {
    x.div_ceil(32) * 32
}
