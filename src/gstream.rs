//! Assembly of generated parameter streams into the frame-indexed buffer
//! consumed by the waveform-synthesis stage.

use std::io::{self, Write};

use byteorder::{LittleEndian, WriteBytesExt};

use crate::{
    constants::NODATA,
    pstream::{FrameIndex, ParameterSource, VoicedCursor, VoicedFrameIndex},
};

/// One materialized stream: a coefficient vector for every absolute frame.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedStream {
    vector_length: usize,
    par: Vec<Vec<f64>>,
}

/// Frame-indexed multi-stream parameter buffer.
///
/// Unlike the compact upstream storage, every stream here covers all
/// `total_frame` frames; unvoiced frames of MSD streams hold
/// [`NODATA`](crate::constants::NODATA) in every coefficient.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedStreamSet {
    total_nsample: usize,
    total_frame: usize,
    streams: Vec<GeneratedStream>,
}

impl GeneratedStreamSet {
    /// Materialize the upstream streams into a fully populated buffer.
    ///
    /// For an MSD stream, a [`VoicedCursor`] tracks how many voiced frames
    /// have passed, so values are read from the compact storage while the
    /// output stays absolute-frame-indexed. Streams are independent; the
    /// cursor is scoped to one stream.
    ///
    /// `fperiod` is the number of output samples per frame and only enters
    /// the derived `total_nsample`.
    ///
    /// # Panics
    ///
    /// Panics if `fperiod` is zero. Sources are expected to be validated
    /// before generation reaches this stage.
    pub fn create(pss: &impl ParameterSource, fperiod: usize) -> Self {
        if fperiod == 0 {
            panic!("The frame period must be positive.");
        }

        let nstream = pss.get_nstream();
        let total_frame = pss.get_total_frame();

        let mut streams = Vec::with_capacity(nstream);
        for i in 0..nstream {
            let vector_length = pss.get_vector_length(i);

            let par: Vec<Vec<f64>> = if pss.is_msd(i) {
                let mut cursor = VoicedCursor::new();
                (0..total_frame)
                    .map(|j| match cursor.advance(pss.get_msd_flag(i, FrameIndex(j))) {
                        Some(voiced) => (0..vector_length)
                            .map(|k| pss.get_parameter(i, voiced, k))
                            .collect(),
                        None => vec![NODATA; vector_length],
                    })
                    .collect()
            } else {
                // No compaction; absolute and value-bearing indices coincide.
                (0..total_frame)
                    .map(|j| {
                        (0..vector_length)
                            .map(|k| pss.get_parameter(i, VoicedFrameIndex(j), k))
                            .collect()
                    })
                    .collect()
            };

            streams.push(GeneratedStream { vector_length, par });
        }

        GeneratedStreamSet {
            total_nsample: fperiod * total_frame,
            total_frame,
            streams,
        }
    }

    /// Get number of streams
    pub fn get_nstream(&self) -> usize {
        self.streams.len()
    }
    /// Get total number of frames
    pub fn get_total_frame(&self) -> usize {
        self.total_frame
    }
    /// Get number of samples the waveform stage will produce
    pub fn get_total_nsample(&self) -> usize {
        self.total_nsample
    }
    /// Get feature length of a stream
    pub fn get_vector_length(&self, stream_index: usize) -> usize {
        self.streams[stream_index].vector_length
    }
    /// Get one generated parameter
    pub fn get_parameter(
        &self,
        stream_index: usize,
        frame: FrameIndex,
        vector_index: usize,
    ) -> f64 {
        self.streams[stream_index].par[frame.0][vector_index]
    }
    /// Get the coefficient vector of one frame
    pub fn get_frame(&self, stream_index: usize, frame: FrameIndex) -> &[f64] {
        &self.streams[stream_index].par[frame.0]
    }

    /// Write one stream as raw little-endian `f32` words, frame-major.
    ///
    /// Sentinel cells are written verbatim, matching the dump format of the
    /// surrounding toolchain.
    pub fn write_parameter_sequence<W: Write>(
        &self,
        stream_index: usize,
        writer: &mut W,
    ) -> io::Result<()> {
        for frame in &self.streams[stream_index].par {
            for &value in frame {
                writer.write_f32::<LittleEndian>(value as f32)?;
            }
        }
        Ok(())
    }
}
