use std::path::Path;

use crate::shared::constants::FALLBACK_FPS;
use crate::shared::frame::{Frame, CHANNELS};
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_sink::VideoSink;

/// Encodes RGB frames to MPEG-4 Part 2 (`mp4v`) via ffmpeg-next.
///
/// Only the video stream is written; source audio is not carried over.
pub struct FfmpegSink {
    octx: Option<ffmpeg_next::format::context::Output>,
    encoder: Option<ffmpeg_next::codec::encoder::video::Encoder>,
    scaler: Option<ffmpeg_next::software::scaling::Context>,
    width: u32,
    height: u32,
    time_base: ffmpeg_next::Rational,
    stream_time_base: ffmpeg_next::Rational,
    frames_written: usize,
}

// Safety: FfmpegSink is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegSink {}

const STREAM_INDEX: usize = 0;

impl FfmpegSink {
    pub fn new() -> Self {
        Self {
            octx: None,
            encoder: None,
            scaler: None,
            width: 0,
            height: 0,
            time_base: ffmpeg_next::Rational(1, FALLBACK_FPS),
            stream_time_base: ffmpeg_next::Rational(1, FALLBACK_FPS),
            frames_written: 0,
        }
    }

    pub fn frames_written(&self) -> usize {
        self.frames_written
    }

    /// Drains encoded packets into the container.
    fn drain(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let (Some(encoder), Some(octx)) = (self.encoder.as_mut(), self.octx.as_mut()) else {
            return Err("FfmpegSink: not opened".into());
        };
        let mut encoded = ffmpeg_next::Packet::empty();
        while encoder.receive_packet(&mut encoded).is_ok() {
            encoded.set_stream(STREAM_INDEX);
            encoded.rescale_ts(self.time_base, self.stream_time_base);
            encoded.write_interleaved(octx)?;
        }
        Ok(())
    }
}

impl Default for FfmpegSink {
    fn default() -> Self {
        Self::new()
    }
}

/// Integral encoder frame rate; non-positive rates fall back to 30.
fn encoder_fps(fps: f64) -> i32 {
    let rounded = fps.round() as i32;
    if rounded <= 0 {
        FALLBACK_FPS
    } else {
        rounded
    }
}

impl VideoSink for FfmpegSink {
    fn open(
        &mut self,
        path: &Path,
        metadata: &VideoMetadata,
    ) -> Result<(), Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let mut octx = ffmpeg_next::format::output(path)?;

        let global_header = octx
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

        let codec = ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::MPEG4)
            .ok_or("MPEG4 encoder not found")?;

        let mut ost = octx.add_stream(Some(codec))?;

        let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()?;

        let fps = encoder_fps(metadata.fps);
        let time_base = ffmpeg_next::Rational(1, fps);
        encoder_ctx.set_width(metadata.width);
        encoder_ctx.set_height(metadata.height);
        encoder_ctx.set_format(ffmpeg_next::format::Pixel::YUV420P);
        encoder_ctx.set_time_base(time_base);
        encoder_ctx.set_frame_rate(Some(ffmpeg_next::Rational(fps, 1)));

        if global_header {
            encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }

        let encoder = encoder_ctx.open_with(ffmpeg_next::Dictionary::new())?;
        ost.set_parameters(&encoder);

        octx.write_header()?;

        // The muxer may change the stream time base while writing the header.
        let stream_time_base = octx
            .stream(STREAM_INDEX)
            .ok_or("output stream missing after header")?
            .time_base();

        let scaler = ffmpeg_next::software::scaling::Context::get(
            ffmpeg_next::format::Pixel::RGB24,
            metadata.width,
            metadata.height,
            ffmpeg_next::format::Pixel::YUV420P,
            metadata.width,
            metadata.height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        log::debug!(
            "Encoding {} at {}x{}, {} fps",
            path.display(),
            metadata.width,
            metadata.height,
            fps
        );

        self.width = metadata.width;
        self.height = metadata.height;
        self.time_base = time_base;
        self.stream_time_base = stream_time_base;
        self.octx = Some(octx);
        self.encoder = Some(encoder);
        self.scaler = Some(scaler);
        self.frames_written = 0;

        Ok(())
    }

    fn write_frame(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        if frame.width() != self.width || frame.height() != self.height {
            return Err(format!(
                "frame {} is {}x{}, sink expects {}x{}",
                frame.index(),
                frame.width(),
                frame.height(),
                self.width,
                self.height
            )
            .into());
        }
        let scaler = self.scaler.as_mut().ok_or("FfmpegSink: not opened")?;

        let mut rgb_frame = ffmpeg_next::util::frame::video::Video::new(
            ffmpeg_next::format::Pixel::RGB24,
            self.width,
            self.height,
        );

        let stride = rgb_frame.stride(0);
        let row_bytes = self.width as usize * CHANNELS;
        let data = rgb_frame.data_mut(0);
        for (row, src) in frame.data().chunks_exact(row_bytes).enumerate() {
            let start = row * stride;
            data[start..start + row_bytes].copy_from_slice(src);
        }

        let mut yuv_frame = ffmpeg_next::util::frame::video::Video::empty();
        scaler.run(&rgb_frame, &mut yuv_frame)?;
        yuv_frame.set_pts(Some(self.frames_written as i64));

        self.encoder
            .as_mut()
            .ok_or("FfmpegSink: not opened")?
            .send_frame(&yuv_frame)?;
        self.drain()?;

        self.frames_written += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(encoder) = self.encoder.as_mut() {
            encoder.send_eof()?;
            self.drain()?;
            if let Some(octx) = self.octx.as_mut() {
                octx.write_trailer()?;
            }
        }

        self.octx = None;
        self.encoder = None;
        self.scaler = None;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{write_test_video, SolidFrames};
    use crate::video::domain::video_source::VideoSource;
    use crate::video::infrastructure::ffmpeg_source::FfmpegSource;

    fn metadata(width: u32, height: u32, fps: f64) -> VideoMetadata {
        VideoMetadata {
            width,
            height,
            fps,
            total_frames: 0,
            codec: String::new(),
            source_path: None,
        }
    }

    #[test]
    fn test_written_video_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mp4");
        write_test_video(&path, 6, 96, 64, 25.0, &SolidFrames);

        let mut source = FfmpegSource::new();
        let meta = source.open(&path).unwrap();
        assert_eq!((meta.width, meta.height), (96, 64));
        assert!((meta.fps - 25.0).abs() < 0.01);

        let mut count = 0;
        while source.read_next().unwrap().is_some() {
            count += 1;
        }
        assert_eq!(count, 6);
    }

    #[test]
    fn test_write_before_open_fails() {
        let mut sink = FfmpegSink::new();
        let frame = Frame::filled(0, 0, 0, 0);
        assert!(sink.write_frame(&frame).is_err());
    }

    #[test]
    fn test_mismatched_frame_size_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mp4");
        let mut sink = FfmpegSink::new();
        sink.open(&path, &metadata(64, 48, 30.0)).unwrap();
        assert!(sink.write_frame(&Frame::filled(32, 48, 0, 0)).is_err());
        assert_eq!(sink.frames_written(), 0);
        sink.close().unwrap();
    }

    #[test]
    fn test_open_in_missing_directory_fails() {
        let mut sink = FfmpegSink::new();
        let result = sink.open(Path::new("/nonexistent/dir/out.mp4"), &metadata(64, 48, 30.0));
        assert!(result.is_err());
    }

    #[test]
    fn test_close_without_open_is_noop() {
        let mut sink = FfmpegSink::new();
        sink.close().unwrap();
        sink.close().unwrap();
    }

    #[test]
    fn test_encoder_fps_fallback() {
        assert_eq!(encoder_fps(29.97), 30);
        assert_eq!(encoder_fps(0.0), 30);
        assert_eq!(encoder_fps(-5.0), 30);
        assert_eq!(encoder_fps(24.0), 24);
    }
}
