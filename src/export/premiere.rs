//! Premiere Pro sequence XML (`xmeml` version 4).

use std::collections::BTreeSet;

use quick_xml::events::Event;
use quick_xml::Reader;

use super::xml::{element_name, parse_error, XmlOut};
use super::{path_url, transition_frames, ClipFrames, ParsedClip, PartialClip};
use crate::config::ExportConfig;
use crate::error::Result;
use crate::timecode::FrameRate;
use crate::timeline::{EditDecisionList, MatchedClip, Transition, TrackType};

const FORMAT: &str = "premiere";
const XMEML_VERSION: &str = "4";

pub(super) fn write(edl: &EditDecisionList, config: &ExportConfig) -> Result<String> {
    let rate = edl.rate();
    let mut out = XmlOut::new();

    out.prolog("xmeml")?;
    out.open("xmeml", &[("version", XMEML_VERSION.to_string())])?;
    out.open("sequence", &[("id", "sequence-1".to_string())])?;
    out.text("name", edl.project_name())?;
    out.text(
        "duration",
        &rate.seconds_to_frames_nearest(edl.total_duration()).to_string(),
    )?;
    write_rate(&mut out, rate)?;

    // File descriptions are written in full once, then referenced by id
    let mut described = BTreeSet::new();

    out.open("media", &[])?;
    out.open("video", &[])?;
    out.open("format", &[])?;
    out.open("samplecharacteristics", &[])?;
    write_rate(&mut out, rate)?;
    out.text("width", &config.width.to_string())?;
    out.text("height", &config.height.to_string())?;
    out.text("pixelaspectratio", "square")?;
    out.close("samplecharacteristics")?;
    out.close("format")?;
    write_track(&mut out, edl, TrackType::Video, rate, &mut described)?;
    out.close("video")?;

    if edl.clips_on(TrackType::Audio).next().is_some() {
        out.open("audio", &[])?;
        write_track(&mut out, edl, TrackType::Audio, rate, &mut described)?;
        out.close("audio")?;
    }
    out.close("media")?;

    for marker in edl.cut_points() {
        out.open("marker", &[])?;
        out.text("name", &marker.label)?;
        out.text("comment", &marker.id)?;
        out.text("in", &rate.seconds_to_frames(marker.position).to_string())?;
        out.text("out", "-1")?;
        out.close("marker")?;
    }

    out.close("sequence")?;
    out.close("xmeml")?;
    out.finish()
}

fn write_rate(out: &mut XmlOut, rate: FrameRate) -> Result<()> {
    out.open("rate", &[])?;
    out.text("timebase", &rate.timebase().to_string())?;
    out.text("ntsc", if rate.is_ntsc() { "TRUE" } else { "FALSE" })?;
    out.close("rate")
}

fn write_track(
    out: &mut XmlOut,
    edl: &EditDecisionList,
    track: TrackType,
    rate: FrameRate,
    described: &mut BTreeSet<String>,
) -> Result<()> {
    out.open("track", &[])?;

    let mut previous: Option<&MatchedClip> = None;
    for clip in edl.clips_on(track) {
        if let Some(prev) = previous {
            let soft = edl
                .transition_between(&prev.id, &clip.id)
                .filter(|t| !t.kind.is_cut());
            if let Some(transition) = soft {
                write_transition(out, transition, rate)?;
            }
        }
        write_clipitem(out, edl, clip, rate, described)?;
        previous = Some(clip);
    }

    out.close("track")
}

fn write_clipitem(
    out: &mut XmlOut,
    edl: &EditDecisionList,
    clip: &MatchedClip,
    rate: FrameRate,
    described: &mut BTreeSet<String>,
) -> Result<()> {
    let source = edl.source(&clip.source_id);
    let frames = ClipFrames::of(clip, rate, source.map(|s| s.duration));

    out.open("clipitem", &[("id", clip.id.clone())])?;
    out.text("name", &clip.source_id)?;
    out.text("enabled", if clip.enabled { "TRUE" } else { "FALSE" })?;
    write_rate(out, rate)?;
    out.text("start", &frames.record_in.to_string())?;
    out.text("end", &frames.record_out.to_string())?;
    out.text("in", &frames.source_in.to_string())?;
    out.text("out", &frames.source_out.to_string())?;

    let file_id = format!("file-{}", clip.source_id);
    if described.insert(clip.source_id.clone()) {
        out.open("file", &[("id", file_id)])?;
        out.text("name", &clip.source_id)?;
        if let Some(path) = source.and_then(|s| s.path.as_deref()) {
            out.text("pathurl", &path_url(path))?;
        }
        write_rate(out, rate)?;
        if let Some(source) = source {
            out.text("duration", &rate.seconds_to_frames(source.duration).to_string())?;
        }
        out.close("file")?;
    } else {
        out.empty("file", &[("id", file_id)])?;
    }

    out.close("clipitem")
}

fn write_transition(out: &mut XmlOut, transition: &Transition, rate: FrameRate) -> Result<()> {
    let (start, end) = transition_frames(transition, rate);
    let effect = transition.kind.effect_name();

    out.open("transitionitem", &[])?;
    write_rate(out, rate)?;
    out.text("start", &start.to_string())?;
    out.text("end", &end.to_string())?;
    out.text("alignment", "center")?;
    out.open("effect", &[])?;
    out.text("name", effect)?;
    out.text("effectid", effect)?;
    out.text("effecttype", "transition")?;
    out.text("mediatype", "video")?;
    out.close("effect")?;
    out.close("transitionitem")
}

/// Clipitems of every track, in document order
pub(super) fn parse(text: &str) -> Result<Vec<ParsedClip>> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut path: Vec<String> = Vec::new();
    let mut current: Option<PartialClip> = None;
    let mut clips = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = element_name(&e);
                if name == "clipitem" {
                    current = Some(PartialClip::default());
                }
                path.push(name);
            }
            Ok(Event::Text(e)) => {
                let Some(clip) = current.as_mut() else {
                    continue;
                };
                // Only direct children of the clipitem, not its rate or file
                let parent = path.len().checked_sub(2).map(|i| path[i].as_str());
                if parent != Some("clipitem") {
                    continue;
                }

                let value = e.unescape().map_err(|err| parse_error(FORMAT, err))?;
                let frames = || {
                    value
                        .trim()
                        .parse::<i64>()
                        .map_err(|err| parse_error(FORMAT, format!("'{}': {}", value, err)))
                };
                match path.last().map(String::as_str) {
                    Some("name") => clip.name = Some(value.to_string()),
                    Some("start") => clip.record_in = Some(frames()?),
                    Some("end") => clip.record_out = Some(frames()?),
                    Some("in") => clip.source_in = Some(frames()?),
                    Some("out") => clip.source_out = Some(frames()?),
                    _ => {}
                }
            }
            Ok(Event::End(_)) => {
                if path.pop().as_deref() == Some("clipitem") {
                    if let Some(clip) = current.take() {
                        clips.push(clip.finish(FORMAT)?);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(parse_error(FORMAT, e)),
            _ => {}
        }
    }

    Ok(clips)
}
