//! # Export
//!
//! Serializes a validated edit decision list into the interchange formats
//! NLEs import: Premiere Pro sequence XML (`xmeml`), Final Cut Pro X XML
//! (`fcpxml`) and CMX3600 EDL text.
//!
//! All positions are floored onto the frame grid before they are written,
//! so an exported out point never reaches past its source media. Each format
//! can be read back with [`reparse`] to check what an NLE would see.

mod cmx3600;
mod fcpx;
mod premiere;
mod xml;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use tracing::{debug, info};

use crate::config::ExportConfig;
use crate::error::{ExportError, Result, UnsupportedFormatError};
use crate::timecode::FrameRate;
use crate::timeline::{EditDecisionList, MatchedClip, Transition, TimelineValidator};

/// Target format of an export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// Premiere Pro / Final Cut 7 `xmeml`
    Premiere,

    /// Final Cut Pro X `fcpxml`
    Fcpx,

    /// CMX3600 edit decision list
    Cmx3600,
}

impl ExportFormat {
    pub fn all() -> [Self; 3] {
        [Self::Premiere, Self::Fcpx, Self::Cmx3600]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Premiere => "premiere",
            Self::Fcpx => "fcpx",
            Self::Cmx3600 => "cmx3600",
        }
    }

    /// Conventional file extension
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Premiere => "xml",
            Self::Fcpx => "fcpxml",
            Self::Cmx3600 => "edl",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = UnsupportedFormatError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "premiere" | "premiere-xml" | "xmeml" | "xml" => Ok(Self::Premiere),
            "fcpx" | "fcpxml" | "finalcut" => Ok(Self::Fcpx),
            "cmx3600" | "cmx" | "edl" => Ok(Self::Cmx3600),
            _ => Err(UnsupportedFormatError {
                format: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A clip as recovered from exported text, in frames
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedClip {
    /// Source clip name as written by the exporter
    pub name: String,
    pub record_in: i64,
    pub record_out: i64,
    pub source_in: i64,
    pub source_out: i64,
}

/// Writes edit decision lists in any [`ExportFormat`]
#[derive(Debug, Clone, Default)]
pub struct EdlSerializer {
    config: ExportConfig,
}

impl EdlSerializer {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Render `edl` as `format`.
    ///
    /// The list is validated first; an invalid timeline is never exported.
    pub fn export(&self, edl: &EditDecisionList, format: ExportFormat) -> Result<String> {
        TimelineValidator::validate(edl)?;

        if self.config.width == 0 || self.config.height == 0 {
            return Err(ExportError::InvalidParameters {
                details: format!("frame size {}x{}", self.config.width, self.config.height),
            }
            .into());
        }

        info!(
            "📤 Exporting '{}' as {} ({} clips, {})",
            edl.project_name(),
            format,
            edl.clips().len(),
            edl.rate()
        );

        let text = match format {
            ExportFormat::Premiere => premiere::write(edl, &self.config)?,
            ExportFormat::Fcpx => fcpx::write(edl, &self.config)?,
            ExportFormat::Cmx3600 => cmx3600::write(edl)?,
        };

        debug!("   {} bytes of {}", text.len(), format);
        Ok(text)
    }

    /// Render and write to `path`
    pub async fn export_to_file<P: AsRef<Path>>(
        &self,
        edl: &EditDecisionList,
        format: ExportFormat,
        path: P,
    ) -> Result<()> {
        let text = self.export(edl, format)?;
        tokio::fs::write(path.as_ref(), text).await?;
        info!("   ✅ Wrote {}", path.as_ref().display());
        Ok(())
    }
}

/// Read exported text back into clips, in document order.
///
/// `rate` is only consulted for CMX3600, whose timecodes carry no frame rate.
pub fn reparse(text: &str, format: ExportFormat, rate: FrameRate) -> Result<Vec<ParsedClip>> {
    match format {
        ExportFormat::Premiere => premiere::parse(text),
        ExportFormat::Fcpx => fcpx::parse(text),
        ExportFormat::Cmx3600 => cmx3600::parse(text, rate),
    }
}

/// Frame positions of one clip as written to every format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ClipFrames {
    pub record_in: i64,
    pub record_out: i64,
    pub source_in: i64,
    pub source_out: i64,
}

impl ClipFrames {
    /// Source out is derived from the record length so both spans agree,
    /// then capped at the last whole frame of the source
    pub fn of(clip: &MatchedClip, rate: FrameRate, source_length: Option<f64>) -> Self {
        let record_in = rate.seconds_to_frames(clip.timeline_in);
        let record_out = rate.seconds_to_frames(clip.timeline_out).max(record_in);
        let source_in = rate.seconds_to_frames(clip.source_in);

        let mut source_out = source_in + ((record_out - record_in) as f64 * clip.speed).round() as i64;
        if let Some(length) = source_length {
            source_out = source_out.min(rate.seconds_to_frames(length));
        }

        Self {
            record_in,
            record_out,
            source_in,
            source_out: source_out.max(source_in),
        }
    }
}

/// Start and end frame of a transition centred on its cut
pub(crate) fn transition_frames(transition: &Transition, rate: FrameRate) -> (i64, i64) {
    let length = rate.seconds_to_frames(transition.duration);
    let start = rate.seconds_to_frames(transition.center_point) - length / 2;
    (start, start + length)
}

/// `file://` URL for a media path
pub(crate) fn path_url(path: &str) -> String {
    let escaped = path.replace(' ', "%20");
    if escaped.starts_with("file://") {
        escaped
    } else if escaped.starts_with('/') {
        format!("file://{}", escaped)
    } else {
        format!("file:///{}", escaped)
    }
}

/// Clip fields collected while reading an XML document
#[derive(Debug, Default)]
pub(crate) struct PartialClip {
    pub name: Option<String>,
    pub record_in: Option<i64>,
    pub record_out: Option<i64>,
    pub source_in: Option<i64>,
    pub source_out: Option<i64>,
}

impl PartialClip {
    pub fn finish(self, format: &str) -> Result<ParsedClip> {
        let missing = |field: &str| xml::parse_error(format, format!("clip without {}", field));
        Ok(ParsedClip {
            name: self.name.unwrap_or_default(),
            record_in: self.record_in.ok_or_else(|| missing("record in"))?,
            record_out: self.record_out.ok_or_else(|| missing("record out"))?,
            source_in: self.source_in.ok_or_else(|| missing("source in"))?,
            source_out: self.source_out.ok_or_else(|| missing("source out"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EditError;
    use crate::timeline::fixtures::{three_clip_edl, three_clip_parts};
    use crate::timeline::EdlParts;

    fn assert_round_trip(edl: &EditDecisionList, format: ExportFormat) {
        let text = EdlSerializer::default().export(edl, format).unwrap();
        let parsed = reparse(&text, format, edl.rate()).unwrap();
        let rate = edl.rate();

        assert_eq!(parsed.len(), edl.clips().len(), "{} clip count", format);
        for (clip, parsed) in edl.clips().iter().zip(&parsed) {
            let within_frame = |got: i64, seconds: f64| (got - rate.seconds_to_frames(seconds)).abs() <= 1;
            assert!(within_frame(parsed.record_in, clip.timeline_in), "{} {}", format, clip.id);
            assert!(within_frame(parsed.record_out, clip.timeline_out), "{} {}", format, clip.id);
            assert!(within_frame(parsed.source_in, clip.source_in), "{} {}", format, clip.id);
            assert!(within_frame(parsed.source_out, clip.source_out), "{} {}", format, clip.id);
            assert_eq!(parsed.name, clip.source_id);
        }
    }

    fn ntsc_edl() -> EditDecisionList {
        EditDecisionList::from_parts(EdlParts {
            frame_rate: 29.97,
            ..three_clip_parts()
        })
    }

    #[test]
    fn test_format_names() {
        assert_eq!("premiere".parse::<ExportFormat>(), Ok(ExportFormat::Premiere));
        assert_eq!("FCPXML".parse::<ExportFormat>(), Ok(ExportFormat::Fcpx));
        assert_eq!("edl".parse::<ExportFormat>(), Ok(ExportFormat::Cmx3600));

        let err = "aaf".parse::<ExportFormat>().unwrap_err();
        assert_eq!(err.format, "aaf");
        assert!(matches!(EditError::from(err), EditError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_every_format_round_trips() {
        let edl = three_clip_edl();
        for format in ExportFormat::all() {
            assert_round_trip(&edl, format);
        }
    }

    #[test]
    fn test_ntsc_round_trips() {
        let edl = ntsc_edl();
        for format in ExportFormat::all() {
            assert_round_trip(&edl, format);
        }
    }

    #[test]
    fn test_invalid_timeline_is_not_exported() {
        let mut parts = three_clip_parts();
        parts.clips[1].timeline_in = 1.0;
        let edl = EditDecisionList::from_parts(parts);

        let result = EdlSerializer::default().export(&edl, ExportFormat::Fcpx);
        assert!(matches!(result, Err(EditError::Timeline(_))));
    }

    #[test]
    fn test_zero_frame_size_is_rejected() {
        let serializer = EdlSerializer::new(ExportConfig {
            width: 0,
            ..ExportConfig::default()
        });
        let result = serializer.export(&three_clip_edl(), ExportFormat::Premiere);
        assert!(matches!(
            result,
            Err(EditError::Export(ExportError::InvalidParameters { .. }))
        ));
    }

    #[test]
    fn test_clip_frames_stay_inside_source() {
        let rate = FrameRate::from_fps(30.0);
        let clip = MatchedClip {
            id: "clip-001".to_string(),
            source_id: "a".to_string(),
            track_type: crate::timeline::TrackType::Video,
            timeline_in: 0.95 / 30.0,
            timeline_out: 2.05 / 30.0,
            source_in: 0.0,
            source_out: 1.1 / 30.0,
            speed: 1.0,
            enabled: true,
        };

        let frames = ClipFrames::of(&clip, rate, Some(1.1 / 30.0));
        assert_eq!(frames.record_out - frames.record_in, 2);
        assert_eq!(frames.source_out, 1);
    }

    #[test]
    fn test_path_url() {
        assert_eq!(path_url("/media/a b.mp4"), "file:///media/a%20b.mp4");
        assert_eq!(path_url("C:/media/a.mp4"), "file:///C:/media/a.mp4");
        assert_eq!(path_url("file:///x.mov"), "file:///x.mov");
    }

    #[tokio::test]
    async fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cut.edl");

        EdlSerializer::default()
            .export_to_file(&three_clip_edl(), ExportFormat::Cmx3600, &path)
            .await
            .unwrap();

        let text = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(text.starts_with("TITLE:"));
    }
}
