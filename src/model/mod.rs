//! In-memory audio model
//!
//! Produced once by the upstream ROM parser and read-only during export.
//! Soundfont tables are generic over how they point at samples: the model
//! holds a [`SampleKey`] into the pool, while decoded resources carry the
//! resolved reference string.

pub mod enums;

use crate::names::SampleNames;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Pool key of a sample: the bank it was read from and its data offset
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SampleKey {
    pub bank_id: u32,
    pub offset: u32,
}

impl SampleKey {
    pub fn new(bank_id: u32, offset: u32) -> Self {
        Self { bank_id, offset }
    }
}

/// ADPCM loop descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdpcmLoop {
    pub start: u32,
    pub end: u32,
    /// Repeat count, `u32::MAX` (-1) loops forever
    pub count: u32,
    /// Predictor state, empty unless the loop needs it
    #[serde(default)]
    pub states: Vec<i16>,
}

impl AdpcmLoop {
    /// Loop count as the signed value the runtime sees
    pub fn signed_count(&self) -> i32 {
        self.count as i32
    }
}

/// ADPCM prediction codebook
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdpcmBook {
    pub order: i32,
    pub npredictors: i32,
    #[serde(default)]
    pub books: Vec<i16>,
}

/// A single sample as stored in the pool
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    /// Codec code, see [`enums::Codec`]
    pub codec: u8,
    /// Medium code, see [`enums::Medium`]
    pub medium: u8,
    #[serde(default)]
    pub bit26: bool,
    /// Bit 25 of the sample header
    #[serde(default)]
    pub relocated: bool,
    #[serde(default)]
    pub data: Vec<u8>,
    #[serde(default, rename = "loop")]
    pub adpcm_loop: AdpcmLoop,
    #[serde(default)]
    pub book: AdpcmBook,
}

/// One envelope control point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopePoint {
    pub delay: i16,
    pub arg: i16,
}

/// Ordered list of envelope points, in playback order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Envelope {
    points: Vec<EnvelopePoint>,
}

impl Envelope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a point after the existing ones
    pub fn push(&mut self, delay: i16, arg: i16) {
        self.points.push(EnvelopePoint { delay, arg });
    }

    pub fn points(&self) -> &[EnvelopePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl FromIterator<EnvelopePoint> for Envelope {
    fn from_iter<I: IntoIterator<Item = EnvelopePoint>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

/// A sample bound to a slot, with its pitch scale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sound<S = SampleKey> {
    pub sample: S,
    pub tuning: f32,
}

impl<S> Sound<S> {
    fn try_map<T, E>(&self, f: &mut impl FnMut(&S) -> Result<T, E>) -> Result<Sound<T>, E> {
        Ok(Sound {
            sample: f(&self.sample)?,
            tuning: self.tuning,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drum<S = SampleKey> {
    pub release_rate: u8,
    pub pan: u8,
    pub loaded: bool,
    pub sample: Option<S>,
    /// Kept even when no sample is bound
    pub tuning: f32,
    #[serde(default)]
    pub envelope: Envelope,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument<S = SampleKey> {
    pub is_valid: bool,
    pub loaded: bool,
    /// Notes below this use `low_notes`
    pub normal_range_lo: u8,
    /// Notes above this use `high_notes`
    pub normal_range_hi: u8,
    pub release_rate: u8,
    #[serde(default)]
    pub envelope: Envelope,
    pub low_notes: Option<Sound<S>>,
    pub normal_notes: Option<Sound<S>>,
    pub high_notes: Option<Sound<S>>,
}

/// A soundfont table entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundFont<S = SampleKey> {
    pub medium: u8,
    pub cache_policy: u8,
    pub data1: u32,
    pub data2: u32,
    pub data3: u32,
    #[serde(default = "Vec::new")]
    pub drums: Vec<Drum<S>>,
    #[serde(default = "Vec::new")]
    pub instruments: Vec<Instrument<S>>,
    #[serde(default = "Vec::new")]
    pub sound_effects: Vec<Option<Sound<S>>>,
}

impl<S> SoundFont<S> {
    /// Every bound sample, in encoding order
    pub fn sample_refs(&self) -> impl Iterator<Item = &S> {
        let drums = self.drums.iter().filter_map(|d| d.sample.as_ref());
        let instruments = self.instruments.iter().flat_map(|i| {
            [&i.low_notes, &i.normal_notes, &i.high_notes]
                .into_iter()
                .flatten()
                .map(|s| &s.sample)
        });
        let sfx = self.sound_effects.iter().flatten().map(|s| &s.sample);
        drums.chain(instruments).chain(sfx)
    }

    /// Rebuild the table with every sample reference converted by `f`
    pub fn try_map_samples<T, E>(
        &self,
        mut f: impl FnMut(&S) -> Result<T, E>,
    ) -> Result<SoundFont<T>, E> {
        let drums = self
            .drums
            .iter()
            .map(|d| -> Result<Drum<T>, E> {
                Ok(Drum {
                    release_rate: d.release_rate,
                    pan: d.pan,
                    loaded: d.loaded,
                    sample: d.sample.as_ref().map(&mut f).transpose()?,
                    tuning: d.tuning,
                    envelope: d.envelope.clone(),
                })
            })
            .collect::<Result<_, E>>()?;
        let instruments = self
            .instruments
            .iter()
            .map(|i| -> Result<Instrument<T>, E> {
                Ok(Instrument {
                    is_valid: i.is_valid,
                    loaded: i.loaded,
                    normal_range_lo: i.normal_range_lo,
                    normal_range_hi: i.normal_range_hi,
                    release_rate: i.release_rate,
                    envelope: i.envelope.clone(),
                    low_notes: i.low_notes.as_ref().map(|s| s.try_map(&mut f)).transpose()?,
                    normal_notes: i
                        .normal_notes
                        .as_ref()
                        .map(|s| s.try_map(&mut f))
                        .transpose()?,
                    high_notes: i.high_notes.as_ref().map(|s| s.try_map(&mut f)).transpose()?,
                })
            })
            .collect::<Result<_, E>>()?;
        let sound_effects = self
            .sound_effects
            .iter()
            .map(|s| s.as_ref().map(|s| s.try_map(&mut f)).transpose())
            .collect::<Result<_, E>>()?;

        Ok(SoundFont {
            medium: self.medium,
            cache_policy: self.cache_policy,
            data1: self.data1,
            data2: self.data2,
            data3: self.data3,
            drums,
            instruments,
            sound_effects,
        })
    }
}

/// A music sequence and the soundfonts it plays through
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    #[serde(default)]
    pub data: Vec<u8>,
    pub medium: u8,
    pub cache_policy: u8,
    #[serde(default)]
    pub font_indices: Vec<u8>,
}

/// A table entry together with its display name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Named<T> {
    pub name: String,
    #[serde(flatten)]
    pub value: T,
}

impl<T> Named<T> {
    pub fn new(name: impl Into<String>, value: T) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Serialized form of one pool entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PooledSample {
    pub bank_id: u32,
    pub offset: u32,
    #[serde(flatten)]
    pub sample: Sample,
}

/// Samples keyed by bank and offset, iterated in key order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<PooledSample>", into = "Vec<PooledSample>")]
pub struct SamplePool {
    samples: BTreeMap<SampleKey, Sample>,
}

impl SamplePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: SampleKey, sample: Sample) -> Option<Sample> {
        self.samples.insert(key, sample)
    }

    pub fn get(&self, key: &SampleKey) -> Option<&Sample> {
        self.samples.get(key)
    }

    pub fn contains(&self, key: &SampleKey) -> bool {
        self.samples.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SampleKey, &Sample)> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl From<Vec<PooledSample>> for SamplePool {
    fn from(entries: Vec<PooledSample>) -> Self {
        Self {
            samples: entries
                .into_iter()
                .map(|e| (SampleKey::new(e.bank_id, e.offset), e.sample))
                .collect(),
        }
    }
}

impl From<SamplePool> for Vec<PooledSample> {
    fn from(pool: SamplePool) -> Self {
        pool.samples
            .into_iter()
            .map(|(key, sample)| PooledSample {
                bank_id: key.bank_id,
                offset: key.offset,
                sample,
            })
            .collect()
    }
}

/// Root of the audio model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioAsset {
    #[serde(default)]
    pub samples: SamplePool,
    #[serde(default)]
    pub sample_names: SampleNames,
    /// Position is the table index sequences refer to
    #[serde(default)]
    pub sound_fonts: Vec<Named<SoundFont>>,
    #[serde(default)]
    pub sequences: Vec<Named<Sequence>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(offset: u32) -> SampleKey {
        SampleKey::new(0, offset)
    }

    #[test]
    fn test_envelope_keeps_push_order() {
        let mut env = Envelope::new();
        env.push(2, 32700);
        env.push(1, 32700);
        env.push(-1, 0);
        let delays: Vec<i16> = env.points().iter().map(|p| p.delay).collect();
        assert_eq!(delays, vec![2, 1, -1]);
    }

    #[test]
    fn test_sample_refs_order() {
        let font = SoundFont {
            medium: 2,
            cache_policy: 0,
            data1: 0,
            data2: 0,
            data3: 0,
            drums: vec![Drum {
                release_rate: 10,
                pan: 64,
                loaded: false,
                sample: Some(key(1)),
                tuning: 1.0,
                envelope: Envelope::new(),
            }],
            instruments: vec![Instrument {
                is_valid: true,
                loaded: false,
                normal_range_lo: 0,
                normal_range_hi: 127,
                release_rate: 0,
                envelope: Envelope::new(),
                low_notes: Some(Sound { sample: key(2), tuning: 1.0 }),
                normal_notes: None,
                high_notes: Some(Sound { sample: key(3), tuning: 1.0 }),
            }],
            sound_effects: vec![None, Some(Sound { sample: key(4), tuning: 0.5 })],
        };

        let refs: Vec<u32> = font.sample_refs().map(|k| k.offset).collect();
        assert_eq!(refs, vec![1, 2, 3, 4]);

        let mapped = font
            .try_map_samples(|k| Ok::<_, ()>(k.offset * 10))
            .unwrap();
        assert_eq!(mapped.drums[0].sample, Some(10));
        assert!(mapped.instruments[0].normal_notes.is_none());
        assert_eq!(mapped.sound_effects[1].as_ref().map(|s| s.sample), Some(40));
    }

    #[test]
    fn test_asset_json() {
        let json = r#"{
            "samples": [
                { "bank_id": 1, "offset": 256, "codec": 0, "medium": 0, "data": [1, 2, 3] }
            ],
            "sample_names": { "1": { "256": "Kick" } },
            "sequences": [
                { "name": "Title", "medium": 2, "cache_policy": 2, "font_indices": [3] }
            ]
        }"#;
        let asset: AudioAsset = serde_json::from_str(json).unwrap();
        let sample = asset.samples.get(&SampleKey::new(1, 0x100)).unwrap();
        assert_eq!(sample.data, vec![1, 2, 3]);
        assert_eq!(asset.sample_names.get(SampleKey::new(1, 0x100)), Some("Kick"));
        assert_eq!(asset.sequences[0].name, "Title");
        assert!(asset.sequences[0].value.data.is_empty());
        assert!(asset.sound_fonts.is_empty());
    }
}
