use std::path::PathBuf;

use color_matcher::config::Settings;
use color_matcher::error::MatcherError;
use color_matcher::pipeline::models::ModelLearner;
use color_matcher::pipeline::services::ColorMatcher;
use tracing::{info, warn, Level};

fn init_logging(level: Level) {
    tracing_subscriber::fmt().with_max_level(level).init();
}

/// Learns color models from recorded results and writes them as model files.
///
/// Usage: `color-matcher-learn [settings.yaml]`
#[tokio::main]
async fn main() -> Result<(), MatcherError> {
    let settings_path = std::env::args().nth(1).map(PathBuf::from);
    let settings = Settings::load(settings_path.as_deref())?;
    init_logging(settings.log_level());

    let learning = settings.learning.clone();
    let matcher_settings = settings.matcher.clone();
    info!(
        "Learning color models from {}",
        learning.recordings_dir.display()
    );

    let written = tokio::task::spawn_blocking(move || -> Result<Vec<PathBuf>, MatcherError> {
        let mut learner = ModelLearner::new().with_model_names(&learning.model_names);

        let matcher = ColorMatcher::initialize(&matcher_settings);
        let measured = if matcher.is_enabled() {
            learner.learn_from_measurements(&matcher, &learning.recordings_dir)?
        } else {
            warn!("Color matcher disabled, recorded measurements are not classified");
            0
        };
        let recorded = learner.learn_from_recordings(&learning.recordings_dir)?;

        if learner.is_empty() {
            warn!("No recordings with color results found");
            return Ok(Vec::new());
        }
        info!(
            "Learned {} measurements and {} results for {} models",
            measured,
            recorded,
            learner.len()
        );
        Ok(learner.save_all(&learning.output_dir)?)
    })
    .await??;

    info!("Wrote {} model files", written.len());
    Ok(())
}
