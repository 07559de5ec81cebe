use std::path::{Path, PathBuf};

use crate::shared::frame::{Frame, CHANNELS};
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_source::VideoSource;

/// Container durations are reported in microseconds.
const DURATION_TIME_BASE: f64 = 1_000_000.0;

/// Decodes video frames via ffmpeg-next (libavformat + libavcodec).
///
/// Each decoded picture is converted to RGB24 and wrapped in a [`Frame`]
/// carrying its decode-order index. Seeking backwards reopens the file and
/// decodes forward from the start, so indices always match a full linear
/// decode.
pub struct FfmpegSource {
    path: Option<PathBuf>,
    state: Option<DecodeState>,
}

// Safety: FfmpegSource is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegSource {}

impl FfmpegSource {
    pub fn new() -> Self {
        Self {
            path: None,
            state: None,
        }
    }

    fn state_mut(&mut self) -> Result<&mut DecodeState, Box<dyn std::error::Error>> {
        self.state
            .as_mut()
            .ok_or_else(|| "FfmpegSource: not opened".into())
    }
}

impl Default for FfmpegSource {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoSource for FfmpegSource {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;
        let (state, metadata) = DecodeState::open(path)?;
        self.path = Some(path.to_path_buf());
        self.state = Some(state);
        Ok(metadata)
    }

    fn seek_to_frame(&mut self, index: usize) -> Result<(), Box<dyn std::error::Error>> {
        if self.state_mut()?.next_index > index {
            let path = self.path.clone().ok_or("FfmpegSource: not opened")?;
            let (state, _) = DecodeState::open(&path)?;
            self.state = Some(state);
        }

        let state = self.state_mut()?;
        while state.next_index < index {
            if state.decode_next()?.is_none() {
                break;
            }
        }
        Ok(())
    }

    fn read_next(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        self.state_mut()?.decode_next()
    }

    fn close(&mut self) {
        self.state = None;
        self.path = None;
    }
}

/// Open input plus the decoder and scaler reading from it.
struct DecodeState {
    ictx: ffmpeg_next::format::context::Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: ffmpeg_next::software::scaling::Context,
    stream_index: usize,
    width: u32,
    height: u32,
    next_index: usize,
    flushing: bool,
    done: bool,
}

impl DecodeState {
    fn open(path: &Path) -> Result<(Self, VideoMetadata), Box<dyn std::error::Error>> {
        let ictx = ffmpeg_next::format::input(path)?;

        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("No video stream found")?;

        let stream_index = stream.index();
        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = codec_ctx.decoder().video()?;

        let fps = rational_to_fps(stream.rate())
            .or_else(|| rational_to_fps(stream.avg_frame_rate()))
            .unwrap_or(0.0);
        let reported = stream.frames().max(0) as usize;
        let total_frames = if reported > 0 {
            reported
        } else {
            estimate_frame_count(ictx.duration(), fps)
        };

        let width = decoder.width();
        let height = decoder.height();
        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        let metadata = VideoMetadata {
            width,
            height,
            fps,
            total_frames,
            codec: decoder
                .codec()
                .map(|c| c.name().to_string())
                .unwrap_or_default(),
            source_path: Some(path.to_path_buf()),
        };
        log::debug!(
            "Opened {}: {}x{} @ {:.3} fps, {} frames ({})",
            path.display(),
            width,
            height,
            fps,
            total_frames,
            metadata.codec
        );

        let state = Self {
            ictx,
            decoder,
            scaler,
            stream_index,
            width,
            height,
            next_index: 0,
            flushing: false,
            done: false,
        };
        Ok((state, metadata))
    }

    /// Decodes one frame, feeding packets and flushing at end of input.
    fn decode_next(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        if self.done {
            return Ok(None);
        }
        loop {
            if let Some(frame) = self.try_receive()? {
                return Ok(Some(frame));
            }
            if self.flushing {
                self.done = true;
                return Ok(None);
            }

            match self.ictx.packets().next() {
                Some((stream, packet)) => {
                    if stream.index() != self.stream_index {
                        continue;
                    }
                    if let Err(e) = self.decoder.send_packet(&packet) {
                        log::debug!("Skipping undecodable packet: {e}");
                    }
                }
                None => {
                    let _ = self.decoder.send_eof();
                    self.flushing = true;
                }
            }
        }
    }

    fn try_receive(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        if self.decoder.receive_frame(&mut decoded).is_err() {
            return Ok(None);
        }
        let mut rgb_frame = ffmpeg_next::util::frame::video::Video::empty();
        self.scaler.run(&decoded, &mut rgb_frame)?;

        let pixels = extract_rgb_pixels(&rgb_frame, self.width, self.height);
        let frame = Frame::new(pixels, self.width, self.height, self.next_index);
        self.next_index += 1;
        Ok(Some(frame))
    }
}

fn rational_to_fps(rate: ffmpeg_next::Rational) -> Option<f64> {
    if rate.numerator() > 0 && rate.denominator() > 0 {
        Some(rate.numerator() as f64 / rate.denominator() as f64)
    } else {
        None
    }
}

/// Frame count from the container duration, for streams that do not
/// report one.
fn estimate_frame_count(duration: i64, fps: f64) -> usize {
    if duration <= 0 || fps <= 0.0 {
        return 0;
    }
    (duration as f64 / DURATION_TIME_BASE * fps).round() as usize
}

/// Copies pixel data from an ffmpeg frame into a contiguous RGB buffer,
/// dropping the row padding ffmpeg may add (stride > width * 3).
fn extract_rgb_pixels(
    rgb_frame: &ffmpeg_next::util::frame::video::Video,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let stride = rgb_frame.stride(0);
    let data = rgb_frame.data(0);
    let row_bytes = width as usize * CHANNELS;

    let mut pixels = Vec::with_capacity(row_bytes * height as usize);
    for row in 0..height as usize {
        let start = row * stride;
        pixels.extend_from_slice(&data[start..start + row_bytes]);
    }
    pixels
}
