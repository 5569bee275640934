//! Join barrier between the concurrent analysis tasks and edit generation.
//!
//! Audio and video analyses arrive independently and in any order. The
//! collector only releases them once everything expected is present.

use std::collections::BTreeSet;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::audio::AudioAnalysis;
use crate::composition::cancel::CancelToken;
use crate::error::{AnalysisError, EditError, Result};
use crate::video::{validate_video_set, VideoAnalysis};

/// How often a pending join looks at the cancel token
const CANCEL_POLL: Duration = Duration::from_millis(50);

/// Gathers analysis results until the set is complete
#[derive(Debug, Default)]
pub struct AnalysisCollector {
    expected_videos: usize,
    audio: Option<AudioAnalysis>,
    videos: Vec<VideoAnalysis>,
}

impl AnalysisCollector {
    /// Collector waiting for one audio analysis and `expected_videos` videos
    pub fn new(expected_videos: usize) -> Self {
        Self {
            expected_videos,
            audio: None,
            videos: Vec::new(),
        }
    }

    pub fn set_audio(&mut self, audio: AudioAnalysis) {
        if self.audio.is_some() {
            warn!("Audio analysis delivered twice, keeping the latest");
        }
        self.audio = Some(audio);
    }

    pub fn add_video(&mut self, video: VideoAnalysis) {
        debug!("Video analysis '{}' arrived", video.clip_id);
        self.videos.push(video);
    }

    pub fn is_complete(&self) -> bool {
        self.audio.is_some() && self.videos.len() >= self.expected_videos
    }

    /// Release the inputs for generation.
    ///
    /// Fails with `AnalysisError::Incomplete` while anything is missing.
    /// Videos come back sorted by clip id so arrival order never changes the
    /// edit.
    pub fn into_inputs(self) -> Result<(AudioAnalysis, Vec<VideoAnalysis>)> {
        let Some(audio) = self.audio else {
            return Err(AnalysisError::Incomplete {
                reason: "audio analysis has not arrived".to_string(),
            }
            .into());
        };

        if self.videos.len() < self.expected_videos {
            return Err(AnalysisError::Incomplete {
                reason: format!(
                    "{} of {} video analyses have arrived",
                    self.videos.len(),
                    self.expected_videos
                ),
            }
            .into());
        }

        let mut videos = self.videos;
        videos.sort_by(|a, b| a.clip_id.cmp(&b.clip_id));
        validate_video_set(&videos)?;

        Ok((audio, videos))
    }
}

/// Await the audio task and every video task, then hand back complete inputs.
///
/// When `cancel` fires first, the tasks still running are aborted and
/// `EditError::Cancelled` is returned.
pub async fn join_analysis_tasks(
    audio_task: JoinHandle<Result<AudioAnalysis>>,
    video_tasks: Vec<JoinHandle<Result<VideoAnalysis>>>,
    cancel: &CancelToken,
) -> Result<(AudioAnalysis, Vec<VideoAnalysis>)> {
    info!("⏳ Waiting for {} analysis tasks", video_tasks.len() + 1);

    let mut collector = AnalysisCollector::new(video_tasks.len());
    let abort_handles: Vec<_> = std::iter::once(audio_task.abort_handle())
        .chain(video_tasks.iter().map(JoinHandle::abort_handle))
        .collect();

    let outcome = {
        let join_all = async {
            let audio = flatten(audio_task.await)?;
            collector.set_audio(audio);
            for task in video_tasks {
                let video = flatten(task.await)?;
                collector.add_video(video);
            }
            Ok::<_, EditError>(())
        };
        tokio::pin!(join_all);

        loop {
            tokio::select! {
                result = &mut join_all => break result,
                _ = tokio::time::sleep(CANCEL_POLL) => {
                    if let Err(e) = cancel.check("analysis") {
                        break Err(e);
                    }
                }
            }
        }
    };

    if let Err(e) = outcome {
        for handle in &abort_handles {
            handle.abort();
        }
        warn!("Analysis join abandoned: {}", e);
        return Err(e);
    }

    let inputs = collector.into_inputs()?;
    let ids: BTreeSet<&str> = inputs.1.iter().map(|v| v.clip_id.as_str()).collect();
    info!("   ✅ Analyses complete: audio + {:?}", ids);
    Ok(inputs)
}

fn flatten<T>(joined: std::result::Result<Result<T>, tokio::task::JoinError>) -> Result<T> {
    match joined {
        Ok(result) => result,
        Err(e) if e.is_cancelled() => Err(EditError::Cancelled {
            reason: "analysis task aborted".to_string(),
        }),
        Err(e) => Err(AnalysisError::Incomplete {
            reason: format!("analysis task failed: {}", e),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::Beat;

    fn audio() -> AudioAnalysis {
        AudioAnalysis {
            beats: vec![Beat { time: 0.0, strength: 0.9 }],
            energy_segments: vec![],
            tempo: 120.0,
            total_duration: Some(4.0),
        }
    }

    fn video(id: &str) -> VideoAnalysis {
        VideoAnalysis {
            clip_id: id.to_string(),
            duration: 5.0,
            path: None,
            scenes: vec![],
        }
    }

    #[test]
    fn test_partial_set_fails_fast() {
        let mut collector = AnalysisCollector::new(2);
        collector.add_video(video("b"));
        assert!(!collector.is_complete());
        assert!(matches!(
            collector.into_inputs(),
            Err(EditError::Analysis(AnalysisError::Incomplete { .. }))
        ));

        let mut collector = AnalysisCollector::new(2);
        collector.set_audio(audio());
        collector.add_video(video("b"));
        assert!(collector.into_inputs().is_err());
    }

    #[test]
    fn test_arrival_order_does_not_matter() {
        let mut collector = AnalysisCollector::new(2);
        collector.add_video(video("b"));
        collector.set_audio(audio());
        collector.add_video(video("a"));
        assert!(collector.is_complete());

        let (_, videos) = collector.into_inputs().unwrap();
        assert_eq!(videos[0].clip_id, "a");
        assert_eq!(videos[1].clip_id, "b");
    }

    #[tokio::test]
    async fn test_join_collects_all_tasks() {
        let audio_task = tokio::spawn(async { Ok::<_, EditError>(audio()) });
        let video_tasks = vec![
            tokio::spawn(async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                Ok::<_, EditError>(video("late"))
            }),
            tokio::spawn(async { Ok::<_, EditError>(video("early")) }),
        ];

        let (_, videos) = join_analysis_tasks(audio_task, video_tasks, &CancelToken::new())
            .await
            .unwrap();
        assert_eq!(videos.len(), 2);
        assert_eq!(videos[0].clip_id, "early");
    }

    #[tokio::test]
    async fn test_failed_task_fails_join() {
        let audio_task = tokio::spawn(async { Ok::<_, EditError>(audio()) });
        let video_tasks = vec![tokio::spawn(async {
            Err::<VideoAnalysis, _>(EditError::from(AnalysisError::LoadFailed {
                path: "missing.json".to_string(),
                reason: "not found".to_string(),
            }))
        })];

        let result = join_analysis_tasks(audio_task, video_tasks, &CancelToken::new()).await;
        assert!(matches!(
            result,
            Err(EditError::Analysis(AnalysisError::LoadFailed { .. }))
        ));
    }

    #[tokio::test]
    async fn test_cancel_abandons_pending_tasks() {
        let audio_task = tokio::spawn(async { Ok::<_, EditError>(audio()) });
        let video_tasks = vec![tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, EditError>(video("slow"))
        })];

        let cancel = CancelToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let result = join_analysis_tasks(audio_task, video_tasks, &cancel).await;
        assert!(matches!(result, Err(EditError::Cancelled { .. })));
    }
}
