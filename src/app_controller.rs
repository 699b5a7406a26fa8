use anyhow::{anyhow, Context, Result};
use log::{error, warn, info, debug};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use crate::app_config::{Config, SynthesisBackend};
use crate::audio::FfmpegAudio;
use crate::file_utils::FileManager;
use crate::pipeline::{NarrationPipeline, NarrationResult, PipelineStage};
use crate::providers::SpeechSynthesizer;
use crate::providers::edge_tts::EdgeTts;
use crate::providers::remote::RemoteSynthesizer;
use crate::usage::UsageStats;

// @module: Application controller for narration runs

/// Files written for one narration
#[derive(Debug, Clone, PartialEq)]
pub struct NarrationOutput {
    // @field: Encoded narration audio
    pub audio_path: PathBuf,
    // @field: SRT captions
    pub srt_path: PathBuf,
    pub cue_count: usize,
    pub segments_total: usize,
    pub segments_skipped: usize,
}

/// Main application controller for narration
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Pipeline built from the configuration
    pipeline: NarrationPipeline,
    // @field: Usage counters reported after each run
    usage: Arc<UsageStats>,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let synthesizer: Arc<dyn SpeechSynthesizer> = match config.synthesis.backend {
            SynthesisBackend::EdgeTts => Arc::new(EdgeTts::new(
                config.synthesis.command.clone(),
                config.synthesis.timeout_secs,
            )),
            SynthesisBackend::Remote => Arc::new(RemoteSynthesizer::new(
                config.synthesis.endpoint.clone(),
                config.synthesis.timeout_secs,
            )),
        };

        let audio = FfmpegAudio::new(config.audio.ffmpeg_path.clone(), config.audio.ffprobe_path.clone())
            .with_silence_threshold(config.audio.silence_threshold_db, config.audio.trim_trailing_silence)
            .with_output_format(config.audio.output_format.clone(), 24_000);

        let usage = UsageStats::global();
        let pipeline = NarrationPipeline::new(synthesizer, Arc::new(audio))
            .with_estimator(config.estimator())
            .with_usage_sink(usage.clone());

        Ok(Self { config, pipeline, usage })
    }

    /// Create a controller around an already assembled pipeline
    pub fn with_pipeline(config: Config, pipeline: NarrationPipeline, usage: Arc<UsageStats>) -> Self {
        Self { config, pipeline, usage }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Make sure the synthesis backend answers before any input is read
    pub async fn check_backend(&self) -> Result<()> {
        let synthesizer = self.pipeline.synthesizer();
        debug!("Checking synthesis backend: {}", synthesizer.name());
        synthesizer.test_connection().await
            .with_context(|| format!("Synthesis backend '{}' is not available", synthesizer.name()))?;
        Ok(())
    }

    /// Narrate a text file into `<output_dir>/<base>.<format>` and `<base>.srt`
    pub async fn run(&self, input_file: PathBuf, output_dir: PathBuf, base_name: Option<String>, force_overwrite: bool) -> Result<Option<NarrationOutput>> {
        let multi_progress = MultiProgress::new();
        self.run_file_with_progress(&input_file, &output_dir, base_name, &multi_progress, force_overwrite).await
    }

    /// Narrate inline text
    pub async fn run_text(&self, text: &str, output_dir: PathBuf, base_name: Option<String>, force_overwrite: bool) -> Result<Option<NarrationOutput>> {
        let multi_progress = MultiProgress::new();
        let base_name = FileManager::sanitize_base_name(base_name.as_deref().unwrap_or_default());
        self.narrate_to_files(text, &output_dir, &base_name, &multi_progress, force_overwrite).await
    }

    async fn run_file_with_progress(&self, input_file: &Path, output_dir: &Path, base_name: Option<String>, multi_progress: &MultiProgress, force_overwrite: bool) -> Result<Option<NarrationOutput>> {
        if !FileManager::file_exists(input_file) {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }

        let base_name = match base_name {
            Some(name) => FileManager::sanitize_base_name(&name),
            None => FileManager::base_name_for(input_file),
        };

        let text = FileManager::read_to_string(input_file)?;
        self.narrate_to_files(&text, output_dir, &base_name, multi_progress, force_overwrite).await
    }

    fn output_paths(&self, output_dir: &Path, base_name: &str) -> (PathBuf, PathBuf) {
        (
            FileManager::generate_output_path(output_dir, base_name, &self.config.audio.output_format),
            FileManager::generate_output_path(output_dir, base_name, "srt"),
        )
    }

    fn outputs_exist(&self, output_dir: &Path, base_name: &str) -> bool {
        let (audio_path, srt_path) = self.output_paths(output_dir, base_name);
        audio_path.exists() || srt_path.exists()
    }

    async fn narrate_to_files(&self, text: &str, output_dir: &Path, base_name: &str, multi_progress: &MultiProgress, force_overwrite: bool) -> Result<Option<NarrationOutput>> {
        let start_time = std::time::Instant::now();

        if self.outputs_exist(output_dir, base_name) && !force_overwrite {
            warn!("Skipping '{}', narration already exists (use -f to force overwrite)", base_name);
            return Ok(None);
        }

        let (audio_path, srt_path) = self.output_paths(output_dir, base_name);
        let request = self.config.narration_request(text)?;

        info!("🎙️ {} - {} ({}, {})",
            self.config.synthesis.backend.display_name(),
            request.voice.display_name(),
            request.platform,
            self.pipeline.estimator().mode);

        let result = self.narrate_with_progress(&request, multi_progress).await?;

        if result.is_empty() {
            return Err(anyhow!("No segment of '{}' could be narrated ({} skipped)", base_name, result.segments_skipped));
        }

        FileManager::ensure_dir(output_dir)?;
        FileManager::write_bytes(&audio_path, &result.audio)
            .context("Failed to save narration audio")?;
        FileManager::write_to_file(&srt_path, &result.srt)
            .context("Failed to save captions")?;

        info!("Success: {}", audio_path.display());
        info!("Success: {}", srt_path.display());

        if result.segments_skipped > 0 {
            warn!("{} cues written, {} of {} segments skipped",
                result.cue_count(), result.segments_skipped, result.segments_total);
        } else {
            info!("{} cues written for {} segments", result.cue_count(), result.segments_total);
        }

        info!(
            "Narration complete in {} ({} of audio).",
            Self::format_duration(start_time.elapsed()),
            Self::format_duration(std::time::Duration::from_secs_f64(result.narrated_secs.max(0.0)))
        );
        info!("📊 {}", self.usage.snapshot());

        Ok(Some(NarrationOutput {
            audio_path,
            srt_path,
            cue_count: result.cue_count(),
            segments_total: result.segments_total,
            segments_skipped: result.segments_skipped,
        }))
    }

    /// Run the pipeline with a progress bar advancing per segment
    async fn narrate_with_progress(&self, request: &crate::pipeline::NarrationRequest, multi_progress: &MultiProgress) -> Result<NarrationResult> {
        let progress_bar = multi_progress.add(ProgressBar::new(0));
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} segments ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        progress_bar.set_message("Narrating");

        let pb = progress_bar.clone();
        let result = self.pipeline.run_with_progress(request, move |stage| {
            match stage {
                PipelineStage::Segmented { segment_count } => pb.set_length(*segment_count as u64),
                PipelineStage::Synthesizing { index, .. } => {
                    pb.set_position(*index as u64);
                    pb.set_message("Synthesizing");
                }
                PipelineStage::TimedAppend { index, .. } => pb.set_position(*index as u64 + 1),
                PipelineStage::Finalizing => pb.set_message("Exporting audio"),
                _ => {}
            }
            debug!("Stage: {}", stage);
        }).await;

        progress_bar.finish_and_clear();

        Ok(result?)
    }

    // Format duration in a human-readable format (HH:MM:SS)
    pub fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }

    /// Narrate every `.txt` file under `input_dir`, writing outputs next to
    /// each input unless `output_dir` is given.
    /// Files that already have narration outputs are skipped
    pub async fn run_folder(&self, input_dir: PathBuf, output_dir: Option<PathBuf>, force_overwrite: bool) -> Result<()> {
        let start_time = std::time::Instant::now();

        if !FileManager::dir_exists(&input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let text_files = FileManager::find_files(&input_dir, "txt")?;
        if text_files.is_empty() {
            return Err(anyhow!("No .txt files found in directory: {:?}", input_dir));
        }

        let multi_progress = MultiProgress::new();

        let folder_pb = multi_progress.add(ProgressBar::new(text_files.len() as u64));
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(template_result.progress_chars("█▓▒░"));
        folder_pb.set_message("Processing files");

        let mut success_count = 0;
        let mut error_count = 0;
        let mut skip_count = 0;

        for text_file in text_files.iter() {
            let file_name = text_file.file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());

            folder_pb.set_message(format!("Processing: {}", file_name));

            let target_dir = match (&output_dir, text_file.parent()) {
                (Some(dir), _) => dir.clone(),
                (None, Some(parent)) => parent.to_path_buf(),
                (None, None) => input_dir.clone(),
            };

            match self.run_file_with_progress(text_file, &target_dir, None, &multi_progress, force_overwrite).await {
                Ok(Some(_)) => success_count += 1,
                Ok(None) => skip_count += 1,
                Err(e) => {
                    error!("Error processing file {}: {:#}", file_name, e);
                    error_count += 1;
                }
            }

            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Folder processing complete");

        info!("Folder processing completed: {} narrated, {} skipped, {} errors in {}",
            success_count, skip_count, error_count, Self::format_duration(start_time.elapsed()));

        Ok(())
    }
}
