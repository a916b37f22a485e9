//! A wrapper for the hound library that records what the participant would
//! hear: a carrier tone per ear at the feedback volume, with the cue clips
//! mixed on top.

use crate::event_code::CueClass;
use crate::paradigm::Paradigm;
use crate::scene::{Cue, IndicatorColor, SceneEngine, SceneError, SceneObject, Side, Vec3};

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::{info, warn};
use std::collections::HashMap;
use std::f32::consts::PI;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Output sample rate, in samples per second
pub const SAMPLE_RATE: u32 = 44100;

/// Frequency of the feedback carrier tone
const CARRIER_HZ: f32 = 440.0;

/// Leaves headroom for a cue on top of a full-volume carrier
const CARRIER_GAIN: f32 = 0.5;

/// Mono cue clips, resampled to [`SAMPLE_RATE`].
#[derive(Debug, Clone, Default)]
pub struct CueBank {
    clips: HashMap<Cue, Vec<f32>>,
}

impl CueBank {
    /// An empty bank.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the clip for each cue that has a path. A clip that cannot be
    /// read is logged and left out, which the session start then reports.
    pub fn load(left: Option<&Path>, right: Option<&Path>, rest: Option<&Path>) -> Self {
        let mut bank = Self::new();
        for (cue, path) in [
            (CueClass::Left, left),
            (CueClass::Right, right),
            (CueClass::Rest, rest),
        ] {
            let Some(path) = path else { continue };
            match read_clip(path) {
                Ok(samples) => {
                    info!("loaded {:?} cue from {}", cue, path.display());
                    bank.insert(cue, samples);
                }
                Err(e) => warn!("unable to load {:?} cue {}: {}", cue, path.display(), e),
            }
        }
        bank
    }

    /// Adds or replaces a clip. Samples are mono at [`SAMPLE_RATE`].
    pub fn insert(&mut self, cue: Cue, samples: Vec<f32>) {
        self.clips.insert(cue, samples);
    }

    #[allow(missing_docs)]
    pub fn contains(&self, cue: Cue) -> bool {
        self.clips.contains_key(&cue)
    }

    fn get(&self, cue: Cue) -> &[f32] {
        self.clips.get(&cue).map(|v| v.as_slice()).unwrap_or(&[])
    }
}

/// Reads a WAV file into mono `f32` samples at [`SAMPLE_RATE`].
fn read_clip(path: &Path) -> Result<Vec<f32>, hound::Error> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|s| s as f32 / scale))
                .collect::<Result<_, _>>()?
        }
    };

    let channels = spec.channels.max(1) as usize;
    let mono: Vec<f32> = interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect();

    Ok(resample(&mono, spec.sample_rate, SAMPLE_RATE))
}

/// Nearest-sample rate conversion. Cue clips are short prompts, so this is
/// plenty.
fn resample(samples: &[f32], from: u32, to: u32) -> Vec<f32> {
    if from == to || from == 0 || samples.is_empty() {
        return samples.to_vec();
    }
    let out_len = (samples.len() as u64 * to as u64 / from as u64) as usize;
    (0..out_len)
        .map(|i| {
            let src = (i as u64 * from as u64 / to as u64) as usize;
            samples[src.min(samples.len() - 1)]
        })
        .collect()
}

/// A [`SceneEngine`] that renders the audio side of the scene into a stereo
/// WAV file, one chunk per presented frame. Visual writes are ignored.
pub struct AudioRecorder {
    writer: Option<WavWriter<BufWriter<File>>>,
    bank: CueBank,
    volume: [f32; 2],
    playing: Vec<(Cue, usize)>,
    phase: f32,
    owed: f64,
}

impl AudioRecorder {
    /// Creates the output file. It is finalized on [`AudioRecorder::finalize`]
    /// or when the recorder is dropped.
    pub fn create(path: impl AsRef<Path>, bank: CueBank) -> Result<Self, SceneError> {
        let spec = WavSpec {
            channels: 2,
            sample_rate: SAMPLE_RATE,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let writer = WavWriter::create(path, spec)?;

        Ok(Self {
            writer: Some(writer),
            bank,
            volume: [0.0; 2],
            playing: Vec::new(),
            phase: 0.0,
            owed: 0.0,
        })
    }

    /// Flushes and closes the file. Further frames are dropped.
    pub fn finalize(&mut self) -> Result<(), SceneError> {
        match self.writer.take() {
            Some(writer) => Ok(writer.finalize()?),
            None => Ok(()),
        }
    }

    fn next_cue_sample(&mut self) -> f32 {
        let bank = &self.bank;
        let mut mix = 0.0;
        for (cue, cursor) in self.playing.iter_mut() {
            if let Some(s) = bank.get(*cue).get(*cursor) {
                mix += s;
            }
            *cursor += 1;
        }
        self.playing
            .retain(|(cue, cursor)| *cursor < bank.get(*cue).len());
        mix
    }
}

impl SceneEngine for AudioRecorder {
    fn load_scene(&mut self, _paradigm: Paradigm) {}

    fn has_object(&self, object: SceneObject) -> bool {
        match object {
            SceneObject::CueClip(cue) => self.bank.contains(cue),
            _ => true,
        }
    }

    fn set_active(&mut self, _object: SceneObject, _active: bool) {}

    fn set_position(&mut self, _cube: Side, _position: Vec3) {}

    fn set_sharpness(&mut self, _cube: Side, _sharpness: f32) {}

    fn set_volume(&mut self, channel: Side, volume: f32) {
        match channel {
            Side::Left => self.volume[0] = volume,
            Side::Right => self.volume[1] = volume,
        }
    }

    fn set_indicator_color(&mut self, _color: IndicatorColor) {}

    fn play_cue(&mut self, cue: Cue) {
        self.playing.push((cue, 0));
    }

    fn present(&mut self, dt: f32) -> Result<(), SceneError> {
        if self.writer.is_none() {
            return Ok(());
        }

        self.owed += dt.max(0.0) as f64 * SAMPLE_RATE as f64;
        let n = self.owed.floor() as usize;
        self.owed -= n as f64;

        let step = 2.0 * PI * CARRIER_HZ / SAMPLE_RATE as f32;
        for _ in 0..n {
            let carrier = self.phase.sin() * CARRIER_GAIN;
            self.phase = (self.phase + step) % (2.0 * PI);
            let cue = self.next_cue_sample();
            let left = carrier * self.volume[0] + cue;
            let right = carrier * self.volume[1] + cue;
            if let Some(writer) = self.writer.as_mut() {
                writer.write_sample(left)?;
                writer.write_sample(right)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_stereo(path: &Path) -> (Vec<f32>, Vec<f32>) {
        let mut reader = WavReader::open(path).unwrap();
        let all_samps = reader
            .samples::<f32>()
            .collect::<Result<Vec<f32>, hound::Error>>()
            .unwrap();
        let left = all_samps.iter().step_by(2).cloned().collect();
        let right = all_samps.iter().skip(1).step_by(2).cloned().collect();
        (left, right)
    }

    fn peak(samples: &[f32]) -> f32 {
        samples.iter().fold(0.0, |m, s| m.max(s.abs()))
    }

    #[test]
    fn volumes_shape_each_ear() {
        let tempfile = tempfile::NamedTempFile::new().unwrap();
        let mut recorder = AudioRecorder::create(tempfile.path(), CueBank::new()).unwrap();
        recorder.set_volume(Side::Left, 1.0);
        recorder.set_volume(Side::Right, 0.0);
        for _ in 0..60 {
            recorder.present(1.0 / 60.0).unwrap();
        }
        recorder.finalize().unwrap();

        let (left, right) = read_stereo(tempfile.path());
        assert!((left.len() as i64 - SAMPLE_RATE as i64).abs() <= 1);
        assert!((peak(&left) - CARRIER_GAIN).abs() < 0.01);
        assert_eq!(peak(&right), 0.0);
    }

    #[test]
    fn cue_is_mixed_into_both_ears() {
        let tempfile = tempfile::NamedTempFile::new().unwrap();
        let mut bank = CueBank::new();
        bank.insert(CueClass::Rest, vec![0.25; 100]);
        let mut recorder = AudioRecorder::create(tempfile.path(), bank).unwrap();

        recorder.play_cue(CueClass::Rest);
        recorder.present(200.0 / SAMPLE_RATE as f32).unwrap();
        recorder.finalize().unwrap();

        let (left, right) = read_stereo(tempfile.path());
        assert_eq!(&left[..100], &[0.25; 100][..]);
        assert_eq!(&right[..100], &[0.25; 100][..]);
        assert!(left[100..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn missing_clip_is_reported() {
        let clip = tempfile::NamedTempFile::new().unwrap();
        let spec = WavSpec {
            channels: 2,
            sample_rate: SAMPLE_RATE / 2,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(clip.path(), spec).unwrap();
        for _ in 0..50 {
            writer.write_sample(i16::MAX / 2).unwrap();
            writer.write_sample(i16::MAX / 2).unwrap();
        }
        writer.finalize().unwrap();

        let bank = CueBank::load(
            Some(clip.path()),
            Some(Path::new("/definitely/not/here.wav")),
            None,
        );
        assert!(bank.contains(CueClass::Left));
        assert!(!bank.contains(CueClass::Right));
        assert!(!bank.contains(CueClass::Rest));
        // 50 frames at half rate come back as 100 samples at the output rate
        assert_eq!(bank.get(CueClass::Left).len(), 100);
        assert!((bank.get(CueClass::Left)[0] - 0.5).abs() < 0.001);

        let out = tempfile::NamedTempFile::new().unwrap();
        let recorder = AudioRecorder::create(out.path(), bank).unwrap();
        assert!(recorder.has_object(SceneObject::CueClip(CueClass::Left)));
        assert!(!recorder.has_object(SceneObject::CueClip(CueClass::Right)));
        assert!(recorder.has_object(SceneObject::FixationCross));
    }
}
