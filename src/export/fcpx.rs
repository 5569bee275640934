//! Final Cut Pro X XML (`fcpxml`).
//!
//! Times are written as rational seconds in whole frames (`"60/30s"`,
//! `"60060/30000s"` for NTSC) so FCPX never has to resample a position.

use std::collections::BTreeMap;

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{debug, warn};

use super::xml::{attribute_map, parse_error, XmlOut};
use super::{path_url, transition_frames, ClipFrames, ParsedClip};
use crate::config::ExportConfig;
use crate::error::{ExportError, Result};
use crate::timecode::FrameRate;
use crate::timeline::{EditDecisionList, Marker, MatchedClip, TrackType};

const FORMAT: &str = "fcpx";
const FORMAT_ID: &str = "r1";

/// Rational time formatting for one frame rate
#[derive(Debug, Clone, Copy)]
struct Clock {
    numerator: u64,
    denominator: u64,
}

impl Clock {
    fn new(rate: FrameRate) -> Self {
        let (numerator, denominator) = rate.rational_frame_duration();
        Self {
            numerator,
            denominator,
        }
    }

    fn at(&self, frames: i64) -> String {
        if frames == 0 {
            "0s".to_string()
        } else {
            format!(
                "{}/{}s",
                frames * self.numerator as i64,
                self.denominator
            )
        }
    }
}

pub(super) fn write(edl: &EditDecisionList, config: &ExportConfig) -> Result<String> {
    let rate = edl.rate();
    let clock = Clock::new(rate);
    let name = edl.project_name().to_string();
    let mut out = XmlOut::new();

    let skipped = edl.clips_on(TrackType::Audio).count();
    if skipped > 0 {
        warn!("FCPX export leaves out {} audio-track clips", skipped);
    }

    out.prolog("fcpxml")?;
    out.open("fcpxml", &[("version", config.fcpx_version.clone())])?;

    // ===== RESOURCES =====
    out.open("resources", &[])?;
    out.empty(
        "format",
        &[
            ("id", FORMAT_ID.to_string()),
            ("name", format_name(rate, config)),
            ("frameDuration", clock.at(1)),
            ("width", config.width.to_string()),
            ("height", config.height.to_string()),
        ],
    )?;

    let mut asset_refs: BTreeMap<&str, String> = BTreeMap::new();
    for (index, source) in edl.sources().iter().enumerate() {
        let id = format!("r{}", index + 2);
        out.open(
            "asset",
            &[
                ("id", id.clone()),
                ("name", source.id.clone()),
                ("start", "0s".to_string()),
                ("duration", clock.at(rate.seconds_to_frames(source.duration))),
                ("hasVideo", "1".to_string()),
                ("format", FORMAT_ID.to_string()),
            ],
        )?;
        out.empty(
            "media-rep",
            &[
                ("kind", "original-media".to_string()),
                ("src", path_url(source.path.as_deref().unwrap_or(&source.id))),
            ],
        )?;
        out.close("asset")?;
        asset_refs.insert(source.id.as_str(), id);
    }
    out.close("resources")?;

    // ===== PROJECT =====
    let total = rate.seconds_to_frames_nearest(edl.total_duration());
    out.open("library", &[])?;
    out.open("event", &[("name", name.clone())])?;
    out.open("project", &[("name", name)])?;
    out.open(
        "sequence",
        &[
            ("format", FORMAT_ID.to_string()),
            ("duration", clock.at(total)),
            ("tcStart", "0s".to_string()),
            ("tcFormat", "NDF".to_string()),
        ],
    )?;
    out.open("spine", &[])?;
    write_spine(&mut out, edl, clock, &asset_refs, total)?;
    out.close("spine")?;
    out.close("sequence")?;
    out.close("project")?;
    out.close("event")?;
    out.close("library")?;
    out.close("fcpxml")?;

    out.finish()
}

/// `FFVideoFormat1080p30`, `FFVideoFormat1080p2997`, ...
fn format_name(rate: FrameRate, config: &ExportConfig) -> String {
    let label = if rate.is_ntsc() {
        format!("{}", (rate.fps() * 100.0).round() as u64)
    } else {
        format!("{}", rate.timebase())
    };
    format!("FFVideoFormat{}p{}", config.height, label)
}

fn write_spine(
    out: &mut XmlOut,
    edl: &EditDecisionList,
    clock: Clock,
    asset_refs: &BTreeMap<&str, String>,
    total: i64,
) -> Result<()> {
    let rate = edl.rate();
    let clips: Vec<&MatchedClip> = edl.clips_on(TrackType::Video).collect();
    let markers: Vec<(i64, &Marker)> = edl
        .cut_points()
        .iter()
        .map(|m| (rate.seconds_to_frames(m.position), m))
        .collect();

    let mut cursor = 0;
    for (index, clip) in clips.iter().enumerate() {
        let frames = ClipFrames::of(clip, rate, edl.source(&clip.source_id).map(|s| s.duration));

        if frames.record_in > cursor {
            write_gap(out, clock, cursor, frames.record_in - cursor)?;
        }

        if index > 0 {
            let soft = edl
                .transition_between(&clips[index - 1].id, &clip.id)
                .filter(|t| !t.kind.is_cut());
            if let Some(transition) = soft {
                let (start, end) = transition_frames(transition, rate);
                out.empty(
                    "transition",
                    &[
                        ("name", transition.kind.effect_name().to_string()),
                        ("offset", clock.at(start)),
                        ("duration", clock.at(end - start)),
                    ],
                )?;
            }
        }

        let asset = asset_refs.get(clip.source_id.as_str()).ok_or_else(|| {
            ExportError::InvalidParameters {
                details: format!("no asset for source '{}'", clip.source_id),
            }
        })?;

        let mut attrs = vec![
            ("ref", asset.clone()),
            ("offset", clock.at(frames.record_in)),
            ("name", clip.source_id.clone()),
            ("start", clock.at(frames.source_in)),
            ("duration", clock.at(frames.record_out - frames.record_in)),
        ];
        if !clip.enabled {
            attrs.push(("enabled", "0".to_string()));
        }

        // The final marker sits on the last out point and belongs to the last clip
        let is_last = index + 1 == clips.len();
        let contained: Vec<&(i64, &Marker)> = markers
            .iter()
            .filter(|(at, _)| {
                *at >= frames.record_in
                    && (*at < frames.record_out || (is_last && *at == frames.record_out))
            })
            .collect();

        if contained.is_empty() {
            out.empty("asset-clip", &attrs)?;
        } else {
            out.open("asset-clip", &attrs)?;
            for (at, marker) in contained {
                out.empty(
                    "marker",
                    &[
                        ("start", clock.at(frames.source_in + (at - frames.record_in))),
                        ("duration", clock.at(1)),
                        ("value", marker.label.clone()),
                    ],
                )?;
            }
            out.close("asset-clip")?;
        }

        cursor = cursor.max(frames.record_out);
    }

    if total > cursor {
        write_gap(out, clock, cursor, total - cursor)?;
    }

    debug!("   spine: {} clips, ends at frame {}", clips.len(), cursor.max(total));
    Ok(())
}

fn write_gap(out: &mut XmlOut, clock: Clock, offset: i64, length: i64) -> Result<()> {
    out.empty(
        "gap",
        &[
            ("name", "Gap".to_string()),
            ("offset", clock.at(offset)),
            ("duration", clock.at(length)),
        ],
    )
}

/// Parse `"N/Ds"` or `"Ns"` into seconds
fn parse_time(value: &str) -> Result<f64> {
    let bad = || parse_error(FORMAT, format!("bad time value '{}'", value));
    let body = value.strip_suffix('s').ok_or_else(bad)?;

    let seconds = match body.split_once('/') {
        Some((numerator, denominator)) => {
            let numerator: f64 = numerator.parse().map_err(|_| bad())?;
            let denominator: f64 = denominator.parse().map_err(|_| bad())?;
            if denominator == 0.0 {
                return Err(bad());
            }
            numerator / denominator
        }
        None => body.parse().map_err(|_| bad())?,
    };
    Ok(seconds)
}

fn frames_attr(attrs: &BTreeMap<String, String>, key: &str, frame_duration: f64) -> Result<i64> {
    let value = attrs
        .get(key)
        .ok_or_else(|| parse_error(FORMAT, format!("asset-clip without {}", key)))?;
    Ok((parse_time(value)? / frame_duration).round() as i64)
}

/// Asset-clips of the spine, in document order
pub(super) fn parse(text: &str) -> Result<Vec<ParsedClip>> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut frame_duration: Option<f64> = None;
    let mut clips = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"format" => {
                    let attrs = attribute_map(&e, FORMAT)?;
                    if let Some(value) = attrs.get("frameDuration") {
                        frame_duration = Some(parse_time(value)?);
                    }
                }
                b"asset-clip" => {
                    let attrs = attribute_map(&e, FORMAT)?;
                    let frame = frame_duration
                        .filter(|d| *d > 0.0)
                        .ok_or_else(|| parse_error(FORMAT, "asset-clip before its format"))?;

                    let record_in = frames_attr(&attrs, "offset", frame)?;
                    let source_in = frames_attr(&attrs, "start", frame)?;
                    let length = frames_attr(&attrs, "duration", frame)?;
                    clips.push(ParsedClip {
                        name: attrs.get("name").cloned().unwrap_or_default(),
                        record_in,
                        record_out: record_in + length,
                        source_in,
                        source_out: source_in + length,
                    });
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(parse_error(FORMAT, e)),
            _ => {}
        }
    }

    Ok(clips)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::fixtures::{three_clip_edl, three_clip_parts};
    use crate::timeline::EdlParts;

    #[test]
    fn test_three_clip_document() {
        let edl = three_clip_edl();
        let text = write(&edl, &ExportConfig::default()).unwrap();

        assert!(text.contains("<!DOCTYPE fcpxml>"));
        assert!(text.contains("<fcpxml version=\"1.9\">"));
        assert_eq!(text.matches("<asset-clip").count(), 3);

        // Sequence duration is the total rounded to the nearest frame
        let total = edl.rate().seconds_to_frames_nearest(edl.total_duration());
        assert_eq!(total, 180);
        assert!(text.contains("<sequence format=\"r1\" duration=\"180/30s\""));
        assert!(text.contains("frameDuration=\"1/30s\" width=\"1920\" height=\"1080\""));
    }

    #[test]
    fn test_version_follows_config() {
        let config = ExportConfig {
            fcpx_version: "1.10".to_string(),
            ..ExportConfig::default()
        };
        let text = write(&three_clip_edl(), &config).unwrap();
        assert!(text.contains("<fcpxml version=\"1.10\">"));
    }

    #[test]
    fn test_assets_transitions_and_markers() {
        let text = write(&three_clip_edl(), &ExportConfig::default()).unwrap();

        assert_eq!(text.matches("<asset id=").count(), 3);
        assert!(text.contains("src=\"file:///media/b.mp4\""));
        assert_eq!(text.matches("<transition ").count(), 1);
        assert!(text.contains("name=\"Cross Dissolve\" offset=\"53/30s\" duration=\"15/30s\""));
        // Every cut marker lands inside a clip, the end marker on the last one
        assert_eq!(text.matches("<marker ").count(), 4);
        assert!(!text.contains("<gap "));
    }

    #[test]
    fn test_ntsc_rational_times() {
        let edl = EditDecisionList::from_parts(EdlParts {
            frame_rate: 29.97,
            ..three_clip_parts()
        });
        let text = write(&edl, &ExportConfig::default()).unwrap();

        assert!(text.contains("frameDuration=\"1001/30000s\""));
        assert!(text.contains("name=\"FFVideoFormat1080p2997\""));
        assert!(text.contains("offset=\"59059/30000s\""));
    }

    #[test]
    fn test_gaps_fill_the_spine() {
        let mut parts = three_clip_parts();
        parts.transitions.clear();
        parts.clips.remove(1);
        let edl = EditDecisionList::from_parts(parts);

        let text = write(&edl, &ExportConfig::default()).unwrap();
        assert!(text.contains("<gap name=\"Gap\" offset=\"60/30s\" duration=\"60/30s\"/>"));
    }

    #[test]
    fn test_parse_time_values() {
        assert_eq!(parse_time("0s").unwrap(), 0.0);
        assert_eq!(parse_time("3s").unwrap(), 3.0);
        assert_eq!(parse_time("60/30s").unwrap(), 2.0);
        assert!(parse_time("60/0s").is_err());
        assert!(parse_time("12").is_err());
    }
}
