//! Track decoding with Symphonia
//!
//! A track is decoded in full on the loader thread, converted to interleaved
//! stereo `f32` and resampled to the output device rate, so the audio
//! callback only ever copies samples.
//!
//! Every Symphonia sample format goes through the same interleaving helper;
//! only the per-format normalization differs:
//! - **Float formats**: pass through (F32) or cast (F64)
//! - **Signed ints**: divide by MAX
//! - **Unsigned ints**: normalize to [0,1], scale to [-1,1]
//! - **24-bit types**: extract `.inner()`, normalize

use crate::error::{AudioError, Result};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use std::fs::File;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Duration;
use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;
use tracing::{debug, warn};
use url::Url;

/// Decoded tracks are always interleaved stereo
pub const OUTPUT_CHANNELS: usize = 2;

/// Where a track's audio comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackSource {
    File(PathBuf),
    Http(Url),
}

impl TrackSource {
    /// Interpret a catalog `src` entry
    ///
    /// `http(s)://` URLs are fetched, `file://` URLs and bare paths are read
    /// from disk.
    pub fn parse(location: &str) -> Result<Self> {
        if location.trim().is_empty() {
            return Err(AudioError::InvalidSource(location.to_string()));
        }

        match Url::parse(location) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(TrackSource::Http(url)),
            Ok(url) if url.scheme() == "file" => url
                .to_file_path()
                .map(TrackSource::File)
                .map_err(|()| AudioError::InvalidSource(location.to_string())),
            // Windows drive letters parse as a one-letter scheme
            Ok(url) if url.scheme().len() > 1 => {
                Err(AudioError::InvalidSource(location.to_string()))
            }
            _ => Ok(TrackSource::File(PathBuf::from(location))),
        }
    }

    /// File extension, used as a probe hint
    fn extension(&self) -> Option<String> {
        let path = match self {
            TrackSource::File(path) => path.clone(),
            TrackSource::Http(url) => PathBuf::from(url.path()),
        };
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
    }

    fn open(&self) -> Result<Box<dyn MediaSource>> {
        match self {
            TrackSource::File(path) => {
                let file = File::open(path).map_err(|source| AudioError::Io {
                    path: path.clone(),
                    source,
                })?;
                Ok(Box::new(file))
            }
            TrackSource::Http(url) => {
                let bytes = reqwest::blocking::get(url.clone())?
                    .error_for_status()?
                    .bytes()?;
                Ok(Box::new(Cursor::new(bytes.to_vec())))
            }
        }
    }
}

/// A fully decoded track, ready for the audio callback
#[derive(Debug, Clone)]
pub struct DecodedTrack {
    /// Interleaved stereo samples
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl DecodedTrack {
    pub fn frames(&self) -> usize {
        self.samples.len() / OUTPUT_CHANNELS
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / f64::from(self.sample_rate))
    }
}

/// Decode `source` and resample it to `target_sample_rate`
pub fn decode(source: &TrackSource, target_sample_rate: u32) -> Result<DecodedTrack> {
    let mss = MediaSourceStream::new(source.open()?, Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = source.extension() {
        hint.with_extension(&ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AudioError::UnsupportedFormat(e.to_string()))?;
    let mut format_reader = probed.format;

    let track = format_reader
        .default_track()
        .ok_or_else(|| AudioError::UnsupportedFormat("No audio tracks found".into()))?;
    let track_id = track.id;
    let source_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| AudioError::UnsupportedFormat("Unknown sample rate".into()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AudioError::UnsupportedFormat(e.to_string()))?;

    let mut samples = Vec::new();
    loop {
        let packet = match format_reader.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(AudioError::Decode(e.to_string())),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => append_stereo_f32(decoded, &mut samples),
            Err(SymphoniaError::DecodeError(e)) => {
                warn!("Skipping undecodable packet: {}", e);
            }
            Err(e) => return Err(AudioError::Decode(e.to_string())),
        }
    }

    debug!(
        source_rate,
        target_sample_rate,
        frames = samples.len() / OUTPUT_CHANNELS,
        "Decoded track"
    );

    let samples = if source_rate == target_sample_rate {
        samples
    } else {
        resample(&samples, source_rate, target_sample_rate)?
    };

    Ok(DecodedTrack {
        samples,
        sample_rate: target_sample_rate,
    })
}

/// Decode a local file (convenience for callers holding a path)
pub fn decode_file(path: impl AsRef<Path>, target_sample_rate: u32) -> Result<DecodedTrack> {
    decode(
        &TrackSource::File(path.as_ref().to_path_buf()),
        target_sample_rate,
    )
}

/// Resample interleaved stereo from `source_rate` to `target_rate`
pub fn resample(samples: &[f32], source_rate: u32, target_rate: u32) -> Result<Vec<f32>> {
    let frames = samples.len() / OUTPUT_CHANNELS;
    if frames == 0 || source_rate == 0 {
        return Ok(Vec::new());
    }

    let params = SincInterpolationParameters {
        sinc_len: 128,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Cubic,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(
        f64::from(target_rate) / f64::from(source_rate),
        2.0,
        params,
        frames,
        OUTPUT_CHANNELS,
    )
    .map_err(|e| AudioError::ResampleError(e.to_string()))?;

    // Deinterleave input samples
    let mut deinterleaved = vec![Vec::with_capacity(frames); OUTPUT_CHANNELS];
    for frame in samples.chunks_exact(OUTPUT_CHANNELS) {
        for (channel, sample) in deinterleaved.iter_mut().zip(frame) {
            channel.push(*sample);
        }
    }

    let resampled = resampler
        .process(&deinterleaved, None)
        .map_err(|e| AudioError::ResampleError(e.to_string()))?;

    // Interleave output samples
    let output_frames = resampled[0].len();
    let mut interleaved = Vec::with_capacity(output_frames * OUTPUT_CHANNELS);
    for frame_idx in 0..output_frames {
        for channel_data in &resampled {
            interleaved.push(channel_data[frame_idx]);
        }
    }

    Ok(interleaved)
}

/// Append any Symphonia buffer to `out` as interleaved stereo f32
fn append_stereo_f32(decoded: AudioBufferRef<'_>, out: &mut Vec<f32>) {
    match decoded {
        AudioBufferRef::F32(buf) => interleave_to_stereo_f32(&buf, |s| s, out),
        AudioBufferRef::F64(buf) => interleave_to_stereo_f32(&buf, |s| s as f32, out),

        AudioBufferRef::S8(buf) => {
            interleave_to_stereo_f32(&buf, |s| f32::from(s) / f32::from(i8::MAX), out);
        }
        AudioBufferRef::S16(buf) => {
            interleave_to_stereo_f32(&buf, |s| f32::from(s) / f32::from(i16::MAX), out);
        }
        AudioBufferRef::S24(buf) => {
            interleave_to_stereo_f32(&buf, |s| s.inner() as f32 / 8_388_607.0, out);
        }
        AudioBufferRef::S32(buf) => {
            interleave_to_stereo_f32(&buf, |s| s as f32 / i32::MAX as f32, out);
        }

        AudioBufferRef::U8(buf) => {
            interleave_to_stereo_f32(&buf, |s| f32::from(s) / f32::from(u8::MAX) * 2.0 - 1.0, out);
        }
        AudioBufferRef::U16(buf) => {
            interleave_to_stereo_f32(&buf, |s| f32::from(s) / f32::from(u16::MAX) * 2.0 - 1.0, out);
        }
        AudioBufferRef::U24(buf) => {
            interleave_to_stereo_f32(&buf, |s| s.inner() as f32 / 16_777_215.0 * 2.0 - 1.0, out);
        }
        AudioBufferRef::U32(buf) => {
            interleave_to_stereo_f32(&buf, |s| s as f32 / u32::MAX as f32 * 2.0 - 1.0, out);
        }
    }
}

/// Interleave a planar buffer to stereo, duplicating mono and dropping
/// channels beyond the first two
fn interleave_to_stereo_f32<T, F>(buf: &AudioBuffer<T>, normalize: F, out: &mut Vec<f32>)
where
    T: Sample,
    F: Fn(T) -> f32,
{
    let channels = buf.spec().channels.count();
    if channels == 0 {
        return;
    }

    let left = buf.chan(0);
    let right = if channels > 1 { buf.chan(1) } else { left };

    out.reserve(buf.frames() * OUTPUT_CHANNELS);
    for (l, r) in left.iter().zip(right) {
        out.push(normalize(*l));
        out.push(normalize(*r));
    }
}
