/// Marker written into every coefficient of a frame for which an MSD stream
/// carries no data.
///
/// The value is part of the output buffer's contract with the waveform
/// stage: consumers recognize unvoiced frames by comparing against this
/// exact value (IEEE 754 bit pattern `0xC202A05F20000000`), so it must not
/// collide with any parameter the generation stage can produce.
pub const NODATA: f64 = -1e10;

/// Test whether a generated parameter cell holds [`NODATA`].
///
/// The comparison is exact. [`NODATA`] is only ever copied verbatim, never
/// computed, so no tolerance is involved.
pub fn is_nodata(value: f64) -> bool {
    value == NODATA
}
