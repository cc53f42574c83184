use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use voxpipe::cli::{Cli, Commands};
use voxpipe::config::Config;
use voxpipe::conversion::PassthroughConverter;
use voxpipe::diarization::UnconfiguredDiarizer;
use voxpipe::service::protocol::{SpeechRequest, TranscriptionRequest};
use voxpipe::service::SpeechService;
use voxpipe::transcription::recognizer::SpeechRecognizer;
use voxpipe::transcription::whisper::{WhisperConfig, WhisperRecognizer};
use voxpipe::ConversionParameters;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(Config::default_path);
    let config = Config::load_or_default(&config_path)?.with_env_overrides();

    let service = build_service(config)?;

    match cli.command {
        Commands::Speak {
            text,
            voice,
            model,
            index,
            rate,
            pitch,
            format,
            split,
            output,
        } => {
            let request = SpeechRequest {
                text,
                voice,
                rate,
                params: ConversionParameters {
                    model_ref: model,
                    index_ref: index,
                    pitch,
                    split_audio: split,
                    export_format: format.parse()?,
                    ..Default::default()
                },
                return_inline: false,
                output_name: output,
            };
            let response = service.speak(&request).await;
            println!("{}", serde_json::to_string_pretty(&response)?);
            if !response.success {
                std::process::exit(1);
            }
        }
        Commands::Transcribe {
            audio,
            language,
            diarize,
            word_timestamps,
            model_size,
        } => {
            let request = TranscriptionRequest {
                audio,
                language,
                enable_diarization: diarize,
                word_timestamps,
                model_size: model_size.as_deref().map(str::parse).transpose()?,
            };
            let response = service.transcribe(&request).await;
            println!("{}", serde_json::to_string_pretty(&response)?);
            if !response.success {
                std::process::exit(1);
            }
        }
        Commands::Voices { language } => {
            let response = service.list_voices(language.as_deref()).await;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::Models => {
            let response = service.list_models();
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}

fn build_service(config: Config) -> Result<SpeechService> {
    #[cfg(feature = "edge")]
    let synthesizer: Arc<dyn voxpipe::SpeechSynthesizer> =
        Arc::new(voxpipe::synthesis::edge::EdgeSynthesizer::new());
    #[cfg(not(feature = "edge"))]
    let synthesizer: Arc<dyn voxpipe::SpeechSynthesizer> =
        Arc::new(voxpipe::MockSynthesizer::new());

    // Timbre conversion runs through the collaborator boundary; the
    // passthrough backend keeps the pipeline usable until an engine is
    // wired in.
    let converter: Arc<dyn voxpipe::VoiceConverter> = Arc::new(PassthroughConverter);

    let model_path = config
        .models_dir()
        .join(config.transcription.model_size.file_name());
    let recognizer: Arc<dyn SpeechRecognizer> = Arc::new(WhisperRecognizer::new(WhisperConfig {
        model_path,
        threads: None,
    })?);

    let diarizer: Arc<dyn voxpipe::Diarizer> = Arc::new(UnconfiguredDiarizer);

    Ok(SpeechService::new(
        config,
        synthesizer,
        converter,
        recognizer,
        diarizer,
    ))
}
