use std::iter;
use std::str::FromStr;

use itertools::Itertools;
use ndarray::{Array2, ArrayView1};

use crate::{Error, Result, F};

/// Equal length sample rows of a microphone array, one per channel.
#[must_use]
#[derive(Clone, Debug, PartialEq)]
pub struct Recording {
    pub(crate) sample_rate: F,
    pub(crate) data: Array2<F>,
}

impl Recording {
    #[must_use]
    pub fn channels(&self) -> usize {
        self.data.nrows()
    }

    #[must_use]
    pub fn samples(&self) -> usize {
        self.data.ncols()
    }

    #[must_use]
    pub fn sample_rate(&self) -> F {
        self.sample_rate
    }

    /// # Panics
    /// If `channel` does not exist.
    pub fn channel(&self, channel: usize) -> ArrayView1<F> {
        self.data.row(channel)
    }

    /// Builds a recording from interleaved samples, a trailing incomplete
    /// frame is dropped.
    ///
    /// # Panics
    /// If `channels` is zero.
    pub fn from_interleaved(
        sample_rate: F,
        channels: usize,
        data: impl IntoIterator<Item = impl Into<F>>,
    ) -> Self {
        assert!(channels > 0, "at least one channel");
        let data = data.into_iter().map_into::<F>().collect_vec();
        Self {
            sample_rate,
            data: Array2::from_shape_fn((channels, data.len() / channels), |(c, s)| {
                data[c + s * channels]
            }),
        }
    }

    /// Builds a recording from per channel samples, channels are cut to the
    /// shortest one.
    ///
    /// # Panics
    /// If there are no channels.
    pub fn from_channels(
        sample_rate: F,
        channels: impl IntoIterator<Item = impl IntoIterator<Item = impl Into<F>>>,
    ) -> Self {
        let mut channels = channels
            .into_iter()
            .map(IntoIterator::into_iter)
            .collect_vec();
        assert!(!channels.is_empty(), "at least one channel");
        let count = channels.len();
        let mut channel = count - 1;
        Self::from_interleaved(
            sample_rate,
            count,
            iter::from_fn(|| {
                channel = (channel + 1) % count;
                channels[channel].next()
            }),
        )
    }

    /// Decodes raw interleaved pcm bytes.
    pub fn from_pcm_bytes(format: PcmFormat, sample_rate: F, channels: usize, data: &[u8]) -> Self {
        Self::from_interleaved(sample_rate, channels, format.decode(data))
    }
}

/// Sample encoding of raw pcm data, parsed from names like `S16LE` or `F32BE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PcmFormat {
    Float {
        bytes: u8,
        little_endian: bool,
    },
    Int {
        signed: bool,
        bytes: u8,
        little_endian: bool,
    },
}

impl FromStr for PcmFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidPcmFormat(s.to_owned());
        let upper = s.to_ascii_uppercase();
        let (kind, rest) = upper.split_at(upper.chars().next().map_or(0, char::len_utf8));
        let digits = rest.chars().take_while(char::is_ascii_digit).count();
        let bits: u8 = rest[..digits].parse().map_err(|_| invalid())?;
        let little_endian = match &rest[digits..] {
            "" | "LE" => true,
            "BE" => false,
            _ => return Err(invalid()),
        };
        let bytes = bits / 8;
        match (kind, bytes) {
            ("F", 4 | 8) if bits % 8 == 0 => Ok(Self::Float {
                bytes,
                little_endian,
            }),
            ("S" | "U", 1..=4) if bits % 8 == 0 => Ok(Self::Int {
                signed: kind == "S",
                bytes,
                little_endian,
            }),
            _ => Err(invalid()),
        }
    }
}

impl PcmFormat {
    /// Amount of bytes per sample.
    #[must_use]
    pub fn bytes(self) -> u8 {
        match self {
            PcmFormat::Float { bytes, .. } | PcmFormat::Int { bytes, .. } => bytes,
        }
    }

    #[must_use]
    pub fn little_endian(self) -> bool {
        match self {
            PcmFormat::Int { little_endian, .. } | PcmFormat::Float { little_endian, .. } => {
                little_endian
            }
        }
    }

    /// Decodes `data` into samples, integers are normalized to `[-1, 1]`.
    pub fn decode(self, data: &[u8]) -> impl Iterator<Item = F> + '_ {
        let little_endian = self.little_endian();
        data.chunks_exact(self.bytes().into()).map(move |chunk| {
            // big endian view of the sample, padded with zeros in the front
            let mut be = [0u8; 8];
            let offset = 8 - chunk.len();
            be[offset..].copy_from_slice(chunk);
            if little_endian {
                be[offset..].reverse();
            }
            match self {
                PcmFormat::Float { bytes: 4, .. } => {
                    f32::from_be_bytes([be[4], be[5], be[6], be[7]]).into()
                }
                PcmFormat::Float { .. } => f64::from_be_bytes(be),
                PcmFormat::Int { signed, bytes, .. } => {
                    let bits = u32::from(bytes) * 8;
                    let raw = u64::from_be_bytes(be);
                    let full = (1u64 << (bits - 1)) as F;
                    #[allow(clippy::cast_possible_wrap, clippy::cast_precision_loss)]
                    let value = if signed {
                        // sign extend
                        ((raw << (64 - bits)) as i64 >> (64 - bits)) as F
                    } else {
                        raw as F - full
                    };
                    value / full
                }
            }
        })
    }
}

#[cfg(test)]
mod test {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn interleaved_and_channels_agree() {
        let a = Recording::from_interleaved(8000., 2, [1., 10., 2., 20., 3., 30., 4.]);
        let b = Recording::from_channels(8000., [vec![1., 2., 3.], vec![10., 20., 30., 40.]]);
        assert_eq!(a, b);
        assert_eq!(a.channels(), 2);
        assert_eq!(a.samples(), 3);
        assert_eq!(a.channel(1).to_vec(), [10., 20., 30.]);
    }

    #[test]
    fn parse_formats() {
        assert_eq!(
            "F32LE".parse::<PcmFormat>().unwrap(),
            PcmFormat::Float {
                bytes: 4,
                little_endian: true
            }
        );
        assert_eq!(
            "s16be".parse::<PcmFormat>().unwrap(),
            PcmFormat::Int {
                signed: true,
                bytes: 2,
                little_endian: false
            }
        );
        assert_eq!(
            "U8".parse::<PcmFormat>().unwrap(),
            PcmFormat::Int {
                signed: false,
                bytes: 1,
                little_endian: true
            }
        );
        for invalid in ["", "F", "F16LE", "S12", "X32LE", "S16XE"] {
            assert!(matches!(
                invalid.parse::<PcmFormat>(),
                Err(Error::InvalidPcmFormat(_))
            ));
        }
    }

    #[test]
    fn decode_samples() {
        let s16: PcmFormat = "S16LE".parse().unwrap();
        let samples = s16
            .decode(&[0x00, 0x40, 0x00, 0xc0, 0xff, 0x7f])
            .collect_vec();
        assert_approx_eq!(F, samples[0], 0.5);
        assert_approx_eq!(F, samples[1], -0.5);
        assert_approx_eq!(F, samples[2], 32767. / 32768.);

        let unsigned: PcmFormat = "U8".parse().unwrap();
        assert_eq!(unsigned.decode(&[0, 128]).collect_vec(), [-1., 0.]);

        let float: PcmFormat = "F32BE".parse().unwrap();
        assert_eq!(float.decode(&0.25f32.to_be_bytes()).collect_vec(), [0.25]);
    }

    #[test]
    fn pcm_round_trip() {
        let expected = Recording::from_channels(16000., [[0.5, -0.25], [0.125, 1.]]);
        let bytes = expected
            .data
            .t()
            .iter()
            .flat_map(|&s| (s as f32).to_le_bytes())
            .collect_vec();
        let actual = Recording::from_pcm_bytes("F32LE".parse().unwrap(), 16000., 2, &bytes);
        assert_eq!(actual, expected);
    }
}
