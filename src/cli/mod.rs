//! Command-line interface for mynah.
//!
//! One command, modeled on the classic batch-tool flag set: input table,
//! output table, audio directory, and voice parameters. Service settings
//! (endpoint, token, admission ceilings) come from the environment, see
//! [`crate::config`].

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use crate::cache::DirBlobStore;
use crate::config::Settings;
use crate::domain::{EngineTier, VoiceProfile};
use crate::pipeline::Pipeline;
use crate::synth::{RateLimiter, SpeechClient};

/// mynah - batch text-to-speech synthesis with content-addressed caching
#[derive(Parser, Debug)]
#[command(name = "mynah")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the input file
    #[arg(short, long)]
    pub input: PathBuf,

    /// Path to the output file
    #[arg(short, long)]
    pub output: PathBuf,

    /// Path to the audio output directory
    #[arg(short, long)]
    pub audio_out: PathBuf,

    /// Language code for the input text
    #[arg(short, long)]
    pub language: String,

    /// Voice to synthesize with
    #[arg(short, long)]
    pub voice: String,

    /// Use the neural engine tier
    #[arg(short, long)]
    pub neural: bool,

    /// Region of the speech service to call
    #[arg(short, long, env = "MYNAH_REGION", default_value = "us-west-2")]
    pub region: String,

    /// Abort the run on a duplicate key instead of reporting it
    #[arg(long)]
    pub fail_on_duplicate: bool,
}

impl Cli {
    /// Execute the synthesis run
    pub async fn execute(self) -> Result<()> {
        let settings = Settings::from_env()?;
        let tier = if self.neural {
            EngineTier::Neural
        } else {
            EngineTier::Standard
        };

        tokio::fs::create_dir_all(&self.audio_out)
            .await
            .with_context(|| {
                format!(
                    "failed to create audio output directory {}",
                    self.audio_out.display()
                )
            })?;

        let mut client = match &settings.endpoint {
            Some(endpoint) => SpeechClient::with_endpoint(endpoint.clone()),
            None => SpeechClient::for_region(&self.region),
        };
        if let Some(key) = &settings.api_key {
            client = client.with_api_key(key.clone());
        }

        let voice = VoiceProfile {
            language: self.language.clone(),
            voice: self.voice.clone(),
            tier,
        };
        let pipeline = Pipeline::new(
            Arc::new(DirBlobStore::new(self.audio_out.clone())),
            Arc::new(client),
            Arc::new(RateLimiter::per_second(settings.ceiling(tier))),
            voice,
        )
        .fail_on_duplicate(self.fail_on_duplicate);

        let report = pipeline.run(&self.input, &self.output).await?;

        println!(
            "{} rows written ({} synthesized, {} cached, {} duplicate keys)",
            report.rows, report.synthesized, report.cache_hits, report.duplicates
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_required_flags() {
        let cli = Cli::parse_from([
            "mynah", "-i", "in.csv", "-o", "out.csv", "-a", "audio", "-l", "en-US", "-v",
            "Joanna",
        ]);
        assert_eq!(cli.input, PathBuf::from("in.csv"));
        assert_eq!(cli.region, "us-west-2");
        assert!(!cli.neural);
        assert!(!cli.fail_on_duplicate);
    }

    #[test]
    fn neural_and_region_flags() {
        let cli = Cli::parse_from([
            "mynah", "-i", "a", "-o", "b", "-a", "c", "-l", "d", "-v", "e", "-n", "-r",
            "eu-west-1", "--fail-on-duplicate",
        ]);
        assert!(cli.neural);
        assert_eq!(cli.region, "eu-west-1");
        assert!(cli.fail_on_duplicate);
    }

    #[test]
    fn missing_required_flag_is_rejected() {
        assert!(Cli::try_parse_from(["mynah", "-i", "in.csv"]).is_err());
    }
}
