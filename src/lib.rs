//! Assembly of generated acoustic-parameter streams into the frame-indexed
//! buffer a waveform-synthesis stage consumes.
//!
//! A parameter-generation stage produces one trajectory per stream (spectrum,
//! log F0, band aperiodicity, ...) and stores streams governed by a
//! multi-space distribution compactly: unvoiced frames carry no value.
//! [`gstream::GeneratedStreamSet`] re-expands those streams over all frames,
//! marking unvoiced cells with [`constants::NODATA`], and interleaves the
//! result with the plain streams into one buffer addressable by
//! (stream, frame, coefficient).

pub mod constants;
pub mod gstream;
pub mod pstream;
