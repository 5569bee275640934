//! CMX3600 edit decision list text.
//!
//! Event lines are fixed width:
//!
//! ```text
//! 001  A        V     C        00:00:01:00 00:00:03:00 00:00:00:00 00:00:02:00
//! ```
//!
//! A dissolve or wipe uses the two-line form: a zero-length cut on the
//! outgoing reel followed by the incoming reel with the transition code and
//! its length in frames.
//!
//! The transition starts at the incoming event's record in, as CMX3600
//! readers expect, so its frames run after the cut. The XML formats centre
//! the same transition on the cut instead.
//!
//! Event numbers are three digits and wrap from 999 back to 001.

use std::collections::{BTreeMap, BTreeSet};

use super::xml::parse_error;
use super::{ClipFrames, ParsedClip};
use crate::error::Result;
use crate::timecode::FrameRate;
use crate::timeline::{EditDecisionList, MatchedClip, SourceMedia, TrackType, TransitionType};

const FORMAT: &str = "cmx3600";
const REEL_WIDTH: usize = 8;
const TITLE_WIDTH: usize = 70;
const FALLBACK_REEL: &str = "AX";
const MAX_EVENT: usize = 999;

/// One fixed-width event line
struct EventLine<'a> {
    number: usize,
    reel: &'a str,
    track: &'a str,
    code: &'a str,
    duration: Option<i64>,
    source: (i64, i64),
    record: (i64, i64),
}

impl EventLine<'_> {
    fn render(&self, rate: FrameRate) -> String {
        let duration = self
            .duration
            .map(|frames| format!("{:03}", frames))
            .unwrap_or_default();
        format!(
            "{:03}  {:<8} {:<5} {:<4} {:>3} {} {} {} {}",
            (self.number - 1) % MAX_EVENT + 1,
            self.reel,
            self.track,
            self.code,
            duration,
            rate.timecode(self.source.0),
            rate.timecode(self.source.1),
            rate.timecode(self.record.0),
            rate.timecode(self.record.1),
        )
    }
}

fn transition_code(kind: TransitionType) -> &'static str {
    match kind {
        TransitionType::Cut => "C",
        TransitionType::Dissolve | TransitionType::DipToBlack => "D",
        TransitionType::Wipe => "W001",
    }
}

fn track_code(track: TrackType) -> &'static str {
    match track {
        TrackType::Video => "V",
        TrackType::Audio => "A",
    }
}

/// Unique uppercase alphanumeric reel names of at most eight characters
fn assign_reels(sources: &[SourceMedia]) -> BTreeMap<&str, String> {
    let mut used = BTreeSet::new();
    let mut reels = BTreeMap::new();

    for source in sources {
        let base: String = source
            .id
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_uppercase())
            .take(REEL_WIDTH)
            .collect();
        let base = if base.is_empty() {
            FALLBACK_REEL.to_string()
        } else {
            base
        };

        let mut reel = base.clone();
        let mut counter = 1;
        while !used.insert(reel.clone()) {
            counter += 1;
            let suffix = counter.to_string();
            let keep = base.len().min(REEL_WIDTH - suffix.len());
            reel = format!("{}{}", &base[..keep], suffix);
        }
        reels.insert(source.id.as_str(), reel);
    }

    reels
}

pub(super) fn write(edl: &EditDecisionList) -> Result<String> {
    let rate = edl.rate();
    let reels = assign_reels(edl.sources());
    let reel_of = |clip: &MatchedClip| -> String {
        reels
            .get(clip.source_id.as_str())
            .cloned()
            .unwrap_or_else(|| FALLBACK_REEL.to_string())
    };
    let frames_of =
        |clip: &MatchedClip| ClipFrames::of(clip, rate, edl.source(&clip.source_id).map(|s| s.duration));

    let title: String = edl.project_name().chars().take(TITLE_WIDTH).collect();
    let mut lines = vec![
        format!("TITLE: {}", title),
        "FCM: NON-DROP FRAME".to_string(),
        String::new(),
    ];

    let mut number = 0;
    for track in [TrackType::Video, TrackType::Audio] {
        let mut previous: Option<&MatchedClip> = None;

        for clip in edl.clips_on(track) {
            number += 1;
            let frames = frames_of(clip);
            let reel = reel_of(clip);

            let soft = previous.and_then(|prev| {
                edl.transition_between(&prev.id, &clip.id)
                    .filter(|t| !t.kind.is_cut())
                    .map(|t| (prev, t))
            });

            if let Some((prev, transition)) = soft {
                let prev_frames = frames_of(prev);
                let prev_reel = reel_of(prev);
                lines.push(
                    EventLine {
                        number,
                        reel: &prev_reel,
                        track: track_code(track),
                        code: "C",
                        duration: None,
                        source: (prev_frames.source_out, prev_frames.source_out),
                        record: (frames.record_in, frames.record_in),
                    }
                    .render(rate),
                );
                lines.push(
                    EventLine {
                        number,
                        reel: &reel,
                        track: track_code(track),
                        code: transition_code(transition.kind),
                        duration: Some(rate.seconds_to_frames(transition.duration)),
                        source: (frames.source_in, frames.source_out),
                        record: (frames.record_in, frames.record_out),
                    }
                    .render(rate),
                );
            } else {
                lines.push(
                    EventLine {
                        number,
                        reel: &reel,
                        track: track_code(track),
                        code: "C",
                        duration: None,
                        source: (frames.source_in, frames.source_out),
                        record: (frames.record_in, frames.record_out),
                    }
                    .render(rate),
                );
            }

            lines.push(format!("* FROM CLIP NAME: {}", clip.source_id));
            lines.push(String::new());
            previous = Some(clip);
        }
    }

    Ok(lines.join("\n"))
}

/// Events with a non-zero record span, in document order.
///
/// A clip takes its name from the `FROM CLIP NAME` comment that follows it,
/// or its reel when there is none.
pub(super) fn parse(text: &str, rate: FrameRate) -> Result<Vec<ParsedClip>> {
    let mut clips: Vec<ParsedClip> = Vec::new();
    let mut named_by_comment = false;

    for (index, line) in text.lines().enumerate() {
        let line = line.trim();

        if let Some(name) = line.strip_prefix("* FROM CLIP NAME:") {
            if named_by_comment {
                if let Some(clip) = clips.last_mut() {
                    clip.name = name.trim().to_string();
                }
            }
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        let is_event = fields.len() >= 8 && fields[0].chars().all(|c| c.is_ascii_digit());
        if !is_event {
            continue;
        }

        let mut frames = [0i64; 4];
        for (slot, timecode) in frames.iter_mut().zip(&fields[fields.len() - 4..]) {
            *slot = rate.parse_timecode(timecode).ok_or_else(|| {
                parse_error(FORMAT, format!("line {}: bad timecode '{}'", index + 1, timecode))
            })?;
        }

        let [source_in, source_out, record_in, record_out] = frames;
        named_by_comment = record_out > record_in;
        if !named_by_comment {
            continue;
        }

        clips.push(ParsedClip {
            name: fields[1].to_string(),
            record_in,
            record_out,
            source_in,
            source_out,
        });
    }

    Ok(clips)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::fixtures::three_clip_edl;

    fn source(id: &str) -> SourceMedia {
        SourceMedia {
            id: id.to_string(),
            duration: 10.0,
            path: None,
        }
    }

    fn tokens(line: &str) -> Vec<&str> {
        line.split_whitespace().collect()
    }

    #[test]
    fn test_header_and_fixed_columns() {
        let text = write(&three_clip_edl()).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].starts_with("TITLE: "));
        assert_eq!(lines[1], "FCM: NON-DROP FRAME");

        let events: Vec<&str> = lines
            .iter()
            .copied()
            .filter(|l| l.starts_with(|c: char| c.is_ascii_digit()))
            .collect();
        assert_eq!(events.len(), 4);
        // Source in always starts at column 29
        for event in &events {
            assert_eq!(event.find("00:"), Some(29), "{}", event);
        }
    }

    #[test]
    fn test_event_numbers_wrap_after_999() {
        let rate = FrameRate::from_fps(30.0);
        let line = |number| {
            EventLine {
                number,
                reel: "A",
                track: "V",
                code: "C",
                duration: None,
                source: (0, 30),
                record: (0, 30),
            }
            .render(rate)
        };

        assert!(line(999).starts_with("999  A"));
        for (number, shown) in [(1000, "001"), (1001, "002"), (1998, "999"), (1999, "001")] {
            let rendered = line(number);
            assert_eq!(&rendered[..3], shown);
            assert_eq!(rendered.find("00:"), Some(29), "{}", rendered);
        }
    }

    #[test]
    fn test_dissolve_uses_two_line_form() {
        let text = write(&three_clip_edl()).unwrap();
        let events: Vec<Vec<&str>> = text
            .lines()
            .filter(|l| l.starts_with("002"))
            .map(tokens)
            .collect();

        assert_eq!(events.len(), 2);
        // The dissolve begins at the cut, not centred on it
        assert_eq!(
            events[0],
            ["002", "A", "V", "C", "00:00:03:00", "00:00:03:00", "00:00:02:00", "00:00:02:00"]
        );
        assert_eq!(
            events[1],
            ["002", "B", "V", "D", "015", "00:00:02:00", "00:00:04:00", "00:00:02:00", "00:00:04:00"]
        );
    }

    #[test]
    fn test_transition_codes() {
        assert_eq!(transition_code(TransitionType::Cut), "C");
        assert_eq!(transition_code(TransitionType::Dissolve), "D");
        assert_eq!(transition_code(TransitionType::DipToBlack), "D");
        assert_eq!(transition_code(TransitionType::Wipe), "W001");
    }

    #[test]
    fn test_reels_are_unique_and_short() {
        let sources = vec![
            source("interview_take_01.mov"),
            source("interview-take-02.mov"),
            source("___"),
        ];
        let reels = assign_reels(&sources);

        assert_eq!(reels["interview_take_01.mov"], "INTERVIE");
        assert_eq!(reels["interview-take-02.mov"], "INTERVI2");
        assert_eq!(reels["___"], "AX");
        assert!(reels.values().all(|r| r.len() <= REEL_WIDTH));
    }

    #[test]
    fn test_parse_skips_zero_length_lines() {
        let rate = FrameRate::from_fps(30.0);
        let clips = parse(&write(&three_clip_edl()).unwrap(), rate).unwrap();

        assert_eq!(clips.len(), 3);
        assert_eq!(clips[1].name, "b");
        assert_eq!((clips[1].record_in, clips[1].record_out), (60, 120));
    }

    #[test]
    fn test_parse_reports_bad_timecodes() {
        let rate = FrameRate::from_fps(25.0);
        let text = "001  A        V     C        00:00:00:00 00:00:01:00 00:00:00:00 00:00:01:99";
        assert!(parse(text, rate).is_err());
    }
}
