//! FFmpeg-backed video source.
//!
//! [`MediaSource`] opens a media file via FFmpeg, locates the best video
//! stream, and implements [`VideoSource`] by decoding frames sequentially to
//! RGB. It also offers [`frame_at`](MediaSource::frame_at) random access so a
//! document assembler can pull the frame behind an insert decision.
//!
//! This module is available when the `ffmpeg` feature is enabled.
//!
//! # Example
//!
//! ```no_run
//! use chapterize::{ChapterizeError, MediaSource, VideoSource};
//!
//! let mut source = MediaSource::open("input.mp4")?;
//! println!("{} fps, {:?}", source.frame_rate(), source.duration());
//! while let Some((timestamp, _image)) = source.next_frame()? {
//!     println!("decoded frame at {timestamp:?}");
//! }
//! # Ok::<(), ChapterizeError>(())
//! ```

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use ffmpeg_next::{
    Error as FfmpegError, Packet, Rational,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::RgbImage;

use crate::error::ChapterizeError;
use crate::sampler::VideoSource;

/// A video file opened for sequential decoding and timestamped frame access.
///
/// Created via [`MediaSource::open`]. Holds the demuxer context, the video
/// decoder, and a lazily-created RGB scaler. Not `Send`: FFmpeg decoder
/// contexts must stay on the thread that created them, which is why the
/// pipeline keeps decoding single-threaded and parallelizes only embedding.
pub struct MediaSource {
    input_context: Input,
    decoder: VideoDecoder,
    /// Created on the first decoded frame, whose reported pixel format is
    /// authoritative. The decoder's format before decoding may differ from
    /// the real output (e.g. codec parameters say YUYV422 but frames arrive
    /// as YUV420P).
    scaler: Option<ScalingContext>,
    video_stream_index: usize,
    time_base: Rational,
    frame_rate: f64,
    duration: Duration,
    decoded_frame: VideoFrame,
    rgb_frame: VideoFrame,
    eof_sent: bool,
    file_path: PathBuf,
}

impl MediaSource {
    /// Open a media file for frame access.
    ///
    /// Initializes FFmpeg (idempotent), opens the file, locates the best
    /// video stream, and caches its time base and frame rate.
    ///
    /// # Errors
    ///
    /// - [`ChapterizeError::SourceUnavailable`] if the file cannot be opened.
    /// - [`ChapterizeError::NoVideoStream`] if it has no video stream.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ChapterizeError> {
        let path = path.as_ref();
        let file_path = path.to_path_buf();

        log::debug!("Opening video source: {}", file_path.display());

        ffmpeg_next::init().map_err(|error| ChapterizeError::SourceUnavailable {
            path: file_path.clone(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| ChapterizeError::SourceUnavailable {
                path: file_path.clone(),
                reason: error.to_string(),
            })?;

        let video_stream_index = input_context
            .streams()
            .best(Type::Video)
            .map(|stream| stream.index())
            .ok_or(ChapterizeError::NoVideoStream)?;

        let stream = input_context
            .stream(video_stream_index)
            .ok_or(ChapterizeError::NoVideoStream)?;
        let time_base = stream.time_base();

        // Average frame rate, falling back to the raw rate field for streams
        // that do not report an average.
        let average = stream.avg_frame_rate();
        let frame_rate = if average.denominator() != 0 {
            average.numerator() as f64 / average.denominator() as f64
        } else {
            let rate = stream.rate();
            if rate.denominator() != 0 {
                rate.numerator() as f64 / rate.denominator() as f64
            } else {
                0.0
            }
        };

        let codec_parameters = stream.parameters();
        let decoder_context =
            CodecContext::from_parameters(codec_parameters).map_err(|error| {
                ChapterizeError::SourceUnavailable {
                    path: file_path.clone(),
                    reason: format!("Failed to read video codec parameters: {error}"),
                }
            })?;
        let decoder =
            decoder_context
                .decoder()
                .video()
                .map_err(|error| ChapterizeError::SourceUnavailable {
                    path: file_path.clone(),
                    reason: format!("Failed to create video decoder: {error}"),
                })?;

        let duration_microseconds = input_context.duration();
        let duration = if duration_microseconds > 0 {
            Duration::from_micros(duration_microseconds as u64)
        } else {
            Duration::ZERO
        };

        Ok(Self {
            input_context,
            decoder,
            scaler: None,
            video_stream_index,
            time_base,
            frame_rate,
            duration,
            decoded_frame: VideoFrame::empty(),
            rgb_frame: VideoFrame::empty(),
            eof_sent: false,
            file_path,
        })
    }

    /// Total duration of the media file, or zero if the container does not
    /// report one.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Frame dimensions as reported by the decoder.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.decoder.width(), self.decoder.height())
    }

    /// Path this source was opened from.
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Decode and return the frame at (or immediately after) `timestamp`.
    ///
    /// Seeks to the nearest preceding keyframe and decodes forward with a
    /// fresh decoder, leaving the sequential decoder untouched. The demuxer
    /// position does move, so interleaving `frame_at` with
    /// [`next_frame`](VideoSource::next_frame) iteration is not supported;
    /// pull frames after the sequential pass has finished.
    ///
    /// # Errors
    ///
    /// - [`ChapterizeError::InvalidTimestamp`] if `timestamp` exceeds the
    ///   media duration or no frame could be decoded there.
    pub fn frame_at(&mut self, timestamp: Duration) -> Result<RgbImage, ChapterizeError> {
        if self.duration > Duration::ZERO && timestamp > self.duration {
            return Err(ChapterizeError::InvalidTimestamp(timestamp));
        }

        log::debug!("Seeking to {timestamp:?} in {}", self.file_path.display());

        // input_context.seek expects AV_TIME_BASE (microsecond) timestamps.
        let target = timestamp.as_micros() as i64;
        self.input_context
            .seek(target, ..target)
            .map_err(|error| ChapterizeError::VideoDecode(error.to_string()))?;

        // A fresh decoder avoids reviving the sequential decoder out of its
        // drained state after a completed pass.
        let stream = self
            .input_context
            .stream(self.video_stream_index)
            .ok_or(ChapterizeError::NoVideoStream)?;
        let decoder_context = CodecContext::from_parameters(stream.parameters())
            .map_err(|error| ChapterizeError::VideoDecode(error.to_string()))?;
        let mut decoder = decoder_context
            .decoder()
            .video()
            .map_err(|error| ChapterizeError::VideoDecode(error.to_string()))?;

        // Accept the first frame within one frame period of the target, so
        // rounding in the container's time base cannot skip past it.
        let tolerance = if self.frame_rate > 0.0 {
            Duration::from_secs_f64(1.0 / self.frame_rate)
        } else {
            Duration::from_millis(40)
        };

        let mut decoded_frame = VideoFrame::empty();
        let mut scaler: Option<ScalingContext> = None;
        let mut rgb_frame = VideoFrame::empty();

        let mut packet = Packet::empty();
        loop {
            let at_eof = match packet.read(&mut self.input_context) {
                Ok(()) => {
                    if packet.stream() != self.video_stream_index {
                        continue;
                    }
                    decoder
                        .send_packet(&packet)
                        .map_err(|error| ChapterizeError::VideoDecode(error.to_string()))?;
                    false
                }
                Err(FfmpegError::Eof) => {
                    decoder
                        .send_eof()
                        .map_err(|error| ChapterizeError::VideoDecode(error.to_string()))?;
                    true
                }
                Err(_) => continue,
            };

            while decoder.receive_frame(&mut decoded_frame).is_ok() {
                let pts = decoded_frame.pts().unwrap_or(0);
                let frame_time =
                    Duration::from_secs_f64(pts_to_seconds(pts, self.time_base).max(0.0));
                if frame_time + tolerance >= timestamp {
                    return convert_frame(&decoded_frame, &mut scaler, &mut rgb_frame);
                }
            }

            if at_eof {
                return Err(ChapterizeError::InvalidTimestamp(timestamp));
            }
        }
    }

    /// Core decode loop: receive a frame if the decoder has one buffered,
    /// otherwise pump packets until it does or the stream ends.
    fn decode_next(&mut self) -> Result<Option<(Duration, RgbImage)>, ChapterizeError> {
        loop {
            if self.decoder.receive_frame(&mut self.decoded_frame).is_ok() {
                let pts = self.decoded_frame.pts().unwrap_or(0);
                let seconds = pts_to_seconds(pts, self.time_base).max(0.0);
                let timestamp = Duration::from_secs_f64(seconds);
                let image =
                    convert_frame(&self.decoded_frame, &mut self.scaler, &mut self.rgb_frame)?;
                return Ok(Some((timestamp, image)));
            }

            if self.eof_sent {
                return Ok(None);
            }

            let mut packet = Packet::empty();
            match packet.read(&mut self.input_context) {
                Ok(()) => {
                    if packet.stream() == self.video_stream_index {
                        self.decoder
                            .send_packet(&packet)
                            .map_err(|error| ChapterizeError::VideoDecode(error.to_string()))?;
                    }
                    // Non-video packets are silently skipped.
                }
                Err(FfmpegError::Eof) => {
                    self.decoder
                        .send_eof()
                        .map_err(|error| ChapterizeError::VideoDecode(error.to_string()))?;
                    self.eof_sent = true;
                }
                Err(_) => {
                    // Non-fatal read error; try the next packet.
                }
            }
        }
    }
}

impl VideoSource for MediaSource {
    fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    fn next_frame(&mut self) -> Result<Option<(Duration, RgbImage)>, ChapterizeError> {
        self.decode_next()
    }
}

/// Scale a decoded frame to RGB24 and copy it into an [`RgbImage`].
///
/// The scaler is created on first use from the frame's reported pixel format,
/// which is authoritative only once a frame has actually been decoded.
fn convert_frame(
    decoded_frame: &VideoFrame,
    scaler: &mut Option<ScalingContext>,
    rgb_frame: &mut VideoFrame,
) -> Result<RgbImage, ChapterizeError> {
    let width = decoded_frame.width();
    let height = decoded_frame.height();

    if scaler.is_none() {
        let created = ScalingContext::get(
            decoded_frame.format(),
            width,
            height,
            Pixel::RGB24,
            width,
            height,
            ScalingFlags::BILINEAR,
        )
        .map_err(|error| ChapterizeError::VideoDecode(error.to_string()))?;
        *scaler = Some(created);
    }
    let scaler = scaler.as_mut().expect("scaler initialised above");

    scaler
        .run(decoded_frame, rgb_frame)
        .map_err(|error| ChapterizeError::VideoDecode(error.to_string()))?;

    let buffer = frame_to_buffer(rgb_frame, width, height, 3);
    RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
        ChapterizeError::VideoDecode(
            "Failed to construct RGB image from decoded frame data".to_string(),
        )
    })
}

/// Rescale a PTS value from stream time base to seconds.
fn pts_to_seconds(pts: i64, time_base: Rational) -> f64 {
    pts as f64 * time_base.numerator() as f64 / time_base.denominator() as f64
}

/// Copy pixel data from an FFmpeg video frame into a tightly-packed buffer.
///
/// FFmpeg may pad each row to an alignment boundary; the stride-aware path
/// drops that padding.
fn frame_to_buffer(
    video_frame: &VideoFrame,
    width: u32,
    height: u32,
    bytes_per_pixel: usize,
) -> Vec<u8> {
    let stride = video_frame.stride(0);
    let expected_stride = (width as usize) * bytes_per_pixel;
    let data = video_frame.data(0);

    if stride == expected_stride {
        data[..expected_stride * (height as usize)].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(expected_stride * (height as usize));
        for row in 0..(height as usize) {
            let row_start = row * stride;
            buffer.extend_from_slice(&data[row_start..row_start + expected_stride]);
        }
        buffer
    }
}
