//! Upstream parameter-stream source.
//!
//! The parameter-generation stage stores MSD streams compactly: only frames
//! whose voicing flag is set carry a value, so such a stream is addressed by
//! a [`VoicedFrameIndex`] that counts voiced frames only. All other lookups
//! use the absolute [`FrameIndex`]. The two index spaces are deliberately
//! separate types; the per-frame voicing flag, tracked by a [`VoicedCursor`],
//! is the only way to move from one to the other.

use serde::{Deserialize, Serialize};

/// Absolute frame index, ranging over `[0, total_frame)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameIndex(pub usize);

/// Index into the voiced subsequence of an MSD stream.
///
/// For a stream without MSD every frame bears a value, and this index
/// coincides with the absolute frame index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoicedFrameIndex(pub usize);

/// Running counter converting absolute frames to voiced frames.
///
/// Feeding it one voicing flag per absolute frame, in order, yields the next
/// [`VoicedFrameIndex`] exactly on voiced frames. One cursor serves one
/// stream; cursors are never shared or reset mid-stream.
#[derive(Debug, Default)]
pub struct VoicedCursor(usize);

impl VoicedCursor {
    pub fn new() -> Self {
        Self(0)
    }

    /// Consume the voicing flag of the next absolute frame.
    pub fn advance(&mut self, voiced: bool) -> Option<VoicedFrameIndex> {
        if voiced {
            let index = VoicedFrameIndex(self.0);
            self.0 += 1;
            Some(index)
        } else {
            None
        }
    }
}

/// Read-only accessor interface of the parameter-generation stage.
///
/// All streams share the same total frame count. Implementations must answer
/// every accessor consistently for the duration of a materialization call.
pub trait ParameterSource {
    /// Get number of streams
    fn get_nstream(&self) -> usize;
    /// Get total number of frames, shared by all streams
    fn get_total_frame(&self) -> usize;
    /// Get number of coefficients per frame of a stream
    fn get_vector_length(&self, stream_index: usize) -> usize;
    /// Whether the stream is governed by a multi-space distribution
    fn is_msd(&self, stream_index: usize) -> bool;
    /// Voicing flag of an absolute frame (meaningful only for MSD streams)
    fn get_msd_flag(&self, stream_index: usize, frame: FrameIndex) -> bool;
    /// Parameter value at a value-bearing frame
    fn get_parameter(
        &self,
        stream_index: usize,
        frame: VoicedFrameIndex,
        vector_index: usize,
    ) -> f64;
}

/// One generated parameter stream, stored compactly.
///
/// `par[vector_index]` is the trajectory of one coefficient over the
/// value-bearing frames. For an MSD stream, `msd_flag` marks which absolute
/// frames those are; `None` means every frame bears a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterStream {
    pub par: Vec<Vec<f64>>,
    pub msd_flag: Option<Vec<bool>>,
}

/// Shape violation found while assembling a [`ParameterStreamSet`].
#[derive(Debug, thiserror::Error)]
pub enum ParameterShapeError {
    /// Coefficient trajectories within one stream differ in length.
    #[error("stream {0}: coefficient trajectories differ in length")]
    RaggedStream(usize),
    /// A stream disagrees with the preceding streams on the frame count.
    #[error("stream {stream_index}: expected {expected} frames, got {actual}")]
    FrameCountMismatch {
        stream_index: usize,
        expected: usize,
        actual: usize,
    },
    /// The voicing flags of an MSD stream do not account for its stored frames.
    #[error("stream {stream_index}: {voiced} voiced frames, but {stored} value-bearing frames stored")]
    VoicedCountMismatch {
        stream_index: usize,
        voiced: usize,
        stored: usize,
    },
}

/// Owned, shape-checked set of generated parameter streams.
///
/// The canonical [`ParameterSource`]: construction validates the invariants
/// the materializer relies on, so accessors can stay infallible.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterStreamSet {
    total_frame: usize,
    streams: Vec<ParameterStream>,
}

impl ParameterStreamSet {
    /// Validate stream shapes and assemble a [`ParameterStreamSet`].
    ///
    /// The frame count of the set is inferred from the streams: the voicing
    /// mask length for an MSD stream, the trajectory length otherwise. Every
    /// stream must agree. A stream with no coefficients (vector length 0)
    /// and no mask places no constraint.
    pub fn new(streams: Vec<ParameterStream>) -> Result<Self, ParameterShapeError> {
        let mut total_frame: Option<usize> = None;

        for (stream_index, stream) in streams.iter().enumerate() {
            let stored = stream.par.first().map(|trajectory| trajectory.len());
            if let Some(stored) = stored {
                if stream.par.iter().any(|t| t.len() != stored) {
                    return Err(ParameterShapeError::RaggedStream(stream_index));
                }
            }

            // How many frames this stream says the whole set has.
            let claim = match &stream.msd_flag {
                Some(mask) => {
                    if let Some(stored) = stored {
                        let voiced = mask.iter().filter(|&&flag| flag).count();
                        if voiced != stored {
                            return Err(ParameterShapeError::VoicedCountMismatch {
                                stream_index,
                                voiced,
                                stored,
                            });
                        }
                    }
                    Some(mask.len())
                }
                None => stored,
            };

            match (total_frame, claim) {
                (Some(expected), Some(actual)) if expected != actual => {
                    return Err(ParameterShapeError::FrameCountMismatch {
                        stream_index,
                        expected,
                        actual,
                    });
                }
                (None, Some(_)) => total_frame = claim,
                _ => {}
            }
        }

        Ok(Self {
            total_frame: total_frame.unwrap_or(0),
            streams,
        })
    }
}

impl ParameterSource for ParameterStreamSet {
    fn get_nstream(&self) -> usize {
        self.streams.len()
    }
    fn get_total_frame(&self) -> usize {
        self.total_frame
    }
    fn get_vector_length(&self, stream_index: usize) -> usize {
        self.streams[stream_index].par.len()
    }
    fn is_msd(&self, stream_index: usize) -> bool {
        self.streams[stream_index].msd_flag.is_some()
    }
    fn get_msd_flag(&self, stream_index: usize, frame: FrameIndex) -> bool {
        self.streams[stream_index]
            .msd_flag
            .as_ref()
            .is_none_or(|mask| mask[frame.0])
    }
    fn get_parameter(
        &self,
        stream_index: usize,
        frame: VoicedFrameIndex,
        vector_index: usize,
    ) -> f64 {
        self.streams[stream_index].par[vector_index][frame.0]
    }
}

#[cfg(test)]
mod tests {
    use super::{
        FrameIndex, ParameterShapeError, ParameterSource, ParameterStream, ParameterStreamSet,
        VoicedCursor, VoicedFrameIndex,
    };

    #[test]
    fn voiced_cursor() {
        let mut cursor = VoicedCursor::new();
        let voicing = [true, false, true, true, false];
        let indices: Vec<_> = voicing.iter().map(|&flag| cursor.advance(flag)).collect();
        assert_eq!(
            indices,
            vec![
                Some(VoicedFrameIndex(0)),
                None,
                Some(VoicedFrameIndex(1)),
                Some(VoicedFrameIndex(2)),
                None,
            ]
        );
    }

    #[test]
    fn accessors() {
        let pss = ParameterStreamSet::new(vec![
            ParameterStream {
                par: vec![vec![1.0, 3.0, 5.0], vec![2.0, 4.0, 6.0]],
                msd_flag: None,
            },
            ParameterStream {
                par: vec![vec![10.0, 20.0]],
                msd_flag: Some(vec![true, false, true]),
            },
        ])
        .unwrap();

        assert_eq!(pss.get_nstream(), 2);
        assert_eq!(pss.get_total_frame(), 3);
        assert_eq!(pss.get_vector_length(0), 2);
        assert_eq!(pss.get_vector_length(1), 1);
        assert!(!pss.is_msd(0));
        assert!(pss.is_msd(1));
        assert!(!pss.get_msd_flag(1, FrameIndex(1)));
        assert_eq!(pss.get_parameter(0, VoicedFrameIndex(1), 1), 4.0);
        assert_eq!(pss.get_parameter(1, VoicedFrameIndex(1), 0), 20.0);
    }

    #[test]
    fn rejects_ragged_stream() {
        let result = ParameterStreamSet::new(vec![ParameterStream {
            par: vec![vec![1.0, 2.0], vec![3.0]],
            msd_flag: None,
        }]);
        assert!(matches!(result, Err(ParameterShapeError::RaggedStream(0))));
    }

    #[test]
    fn rejects_frame_count_mismatch() {
        let result = ParameterStreamSet::new(vec![
            ParameterStream {
                par: vec![vec![1.0, 2.0, 3.0]],
                msd_flag: None,
            },
            ParameterStream {
                par: vec![vec![1.0, 2.0]],
                msd_flag: None,
            },
        ]);
        assert!(matches!(
            result,
            Err(ParameterShapeError::FrameCountMismatch {
                stream_index: 1,
                expected: 3,
                actual: 2,
            })
        ));
    }

    #[test]
    fn rejects_voiced_count_mismatch() {
        let result = ParameterStreamSet::new(vec![ParameterStream {
            par: vec![vec![10.0, 20.0, 30.0]],
            msd_flag: Some(vec![true, false, true]),
        }]);
        assert!(matches!(
            result,
            Err(ParameterShapeError::VoicedCountMismatch {
                stream_index: 0,
                voiced: 2,
                stored: 3,
            })
        ));
    }

    #[test]
    fn mask_length_defines_frame_count() {
        // An all-unvoiced MSD stream stores nothing but still spans frames.
        let pss = ParameterStreamSet::new(vec![ParameterStream {
            par: vec![vec![]],
            msd_flag: Some(vec![false, false, false, false]),
        }])
        .unwrap();
        assert_eq!(pss.get_total_frame(), 4);
    }

    #[test]
    fn empty_set() {
        let pss = ParameterStreamSet::new(vec![]).unwrap();
        assert_eq!(pss.get_nstream(), 0);
        assert_eq!(pss.get_total_frame(), 0);
    }
}
