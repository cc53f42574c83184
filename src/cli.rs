//! Command-line interface for voxpipe
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Speech pipeline service core
#[derive(Parser, Debug)]
#[command(name = "voxpipe", version, about = "TTS synthesis, voice conversion, and diarized transcription")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Synthesize speech and convert it toward a target voice model
    Speak {
        /// Text to synthesize
        #[arg(long)]
        text: String,

        /// TTS voice short-name (e.g. en-US-GuyNeural)
        #[arg(long)]
        voice: String,

        /// Voice-conversion model reference
        #[arg(long)]
        model: String,

        /// Explicit retrieval-index path (auto-discovered when omitted)
        #[arg(long, value_name = "PATH")]
        index: Option<PathBuf>,

        /// Speaking-rate adjustment in percent (-100 to 100)
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        rate: i32,

        /// Pitch shift in semitones (-24 to 24)
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        pitch: i32,

        /// Output codec (wav, mp3, flac, ogg, m4a)
        #[arg(long, default_value = "wav")]
        format: String,

        /// Split the waveform into chunks before conversion
        #[arg(long)]
        split: bool,

        /// Output file name
        #[arg(long, short = 'o', value_name = "NAME")]
        output: Option<String>,
    },

    /// Transcribe an audio file with optional speaker diarization
    Transcribe {
        /// Audio file to transcribe
        audio: PathBuf,

        /// Language code (default: auto-detect)
        #[arg(long, value_name = "LANG")]
        language: Option<String>,

        /// Attribute segments to speakers
        #[arg(long)]
        diarize: bool,

        /// Populate word-level timestamps
        #[arg(long)]
        word_timestamps: bool,

        /// Recognizer model size (tiny, base, small, medium, large, large-v3, turbo)
        #[arg(long, value_name = "SIZE")]
        model_size: Option<String>,
    },

    /// List available TTS voices
    Voices {
        /// Filter by locale prefix (e.g. en, pt-BR)
        #[arg(long, value_name = "LANG")]
        language: Option<String>,
    },

    /// List available voice-conversion models
    Models,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_speak_command() {
        let cli = Cli::try_parse_from([
            "voxpipe", "speak", "--text", "Hello", "--voice", "en-US-GuyNeural", "--model",
            "lula/lula.pth", "--pitch", "-2",
        ])
        .unwrap();
        match cli.command {
            Commands::Speak {
                text,
                voice,
                model,
                pitch,
                ..
            } => {
                assert_eq!(text, "Hello");
                assert_eq!(voice, "en-US-GuyNeural");
                assert_eq!(model, "lula/lula.pth");
                assert_eq!(pitch, -2);
            }
            other => panic!("Expected Speak, got {:?}", other),
        }
    }

    #[test]
    fn cli_parses_transcribe_command() {
        let cli = Cli::try_parse_from(["voxpipe", "transcribe", "audio.wav", "--diarize"]).unwrap();
        match cli.command {
            Commands::Transcribe { audio, diarize, .. } => {
                assert_eq!(audio, PathBuf::from("audio.wav"));
                assert!(diarize);
            }
            other => panic!("Expected Transcribe, got {:?}", other),
        }
    }

    #[test]
    fn cli_requires_a_subcommand() {
        assert!(Cli::try_parse_from(["voxpipe"]).is_err());
    }
}
