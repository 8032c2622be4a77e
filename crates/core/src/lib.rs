//! SnapCaption Core Library
//!
//! This library provides the core workflow for the SnapCaption tool: turning
//! a user-selected photo into AI-generated caption suggestions the user can
//! copy or share.
//!
//! # Overview
//!
//! The workflow is a single-flight state machine. A photo is read and encoded
//! into a self-describing payload, exactly one caption request per user action
//! is in flight at a time, and a newer request supersedes any older one still
//! outstanding. The library handles:
//!
//! - **Image Loading**: async file read, progress, data-URI encoding via [`loader`]
//! - **Generation Session**: sequence-numbered single-flight requests via [`session`]
//! - **AI Integration**: the Gemini caption engine via [`engine`]
//! - **Progress Simulation**: display-only synthetic progress via [`progress`]
//! - **Selection & Export**: clipboard copy and tiered sharing via [`export`]
//!
//! # Quick Start
//!
//! The simplest way to use the library is through the [`SnapCaption`] facade:
//!
//! ```ignore
//! use snapcaption_core::{Config, SnapCaption};
//! use snapcaption_core::notify::NullNotifier;
//!
//! let config = Config::load()?;
//! let mut app = SnapCaption::from_config(&config, NullNotifier)?;
//!
//! // Upload a photo; captions are generated as soon as encoding completes.
//! app.upload("photo.jpg".as_ref(), |pct| println!("{pct}%")).await;
//! for caption in app.session().captions() {
//!     println!("{caption}");
//! }
//! ```
//!
//! # Module Structure
//!
//! - [`config`]: Environment configuration
//! - [`engine`]: Caption engine boundary and the Gemini implementation
//! - [`error`]: Error types and result aliases
//! - [`export`]: Clipboard and share targets
//! - [`loader`]: Image payload loading and encoding
//! - [`notify`]: The notification sink boundary
//! - [`progress`]: Simulated generation progress
//! - [`session`]: The caption generation session
//! - [`settings`]: Persisted user preferences
//! - [`style`]: Caption style options
//! - [`view`]: Pure view projection

pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod loader;
pub mod notify;
pub mod progress;
pub mod session;
pub mod settings;
pub mod style;
pub mod view;

// Re-export primary types for convenience
pub use config::Config;
pub use engine::{CaptionEngine, EngineRequest, GeminiEngine};
pub use error::{AppError, Result};
pub use export::{Exporter, ShareCapability, ShareOutcome, ShareTarget, SystemClipboard, UnsupportedShare};
pub use loader::{ImageLoader, ImagePayload, SOFT_MAX_UPLOAD_BYTES};
pub use notify::{Notification, Notifier, Severity};
pub use progress::{ProgressSimulator, ProgressTicker};
pub use session::{CaptionSession, GenerationRequest, RequestOutcome};
pub use settings::Settings;
pub use style::{CaptionStyle, ALL_STYLES};

use std::path::Path;
use std::time::Duration;

/// Runs an engine call, applying the optional request deadline.
///
/// With no deadline the call may stay outstanding indefinitely, which is the
/// product's default behavior.
pub async fn generate_with_deadline<E: CaptionEngine>(
    engine: &E,
    request: &EngineRequest,
    deadline_secs: Option<u64>,
) -> Result<Vec<String>> {
    match deadline_secs {
        Some(secs) => {
            match tokio::time::timeout(Duration::from_secs(secs), engine.generate(request)).await {
                Ok(result) => result,
                Err(_) => Err(AppError::EngineTimeout(secs)),
            }
        }
        None => engine.generate(request).await,
    }
}

/// Main entry point for the SnapCaption workflow.
///
/// This struct wires the image loader, generation session and caption engine
/// together, chaining upload completion into the first generation request and
/// funnelling every failure into the notification sink. It's the recommended
/// way to use the library for most use cases.
pub struct SnapCaption<E: CaptionEngine, N: Notifier> {
    engine: E,
    session: CaptionSession<N>,
    engine_timeout_secs: Option<u64>,
}

impl<N: Notifier> SnapCaption<GeminiEngine, N> {
    /// Builds the facade on the real Gemini engine from configuration.
    pub fn from_config(config: &Config, notifier: N) -> Result<Self> {
        let engine = GeminiEngine::new(config)?;
        Ok(Self::new(engine, notifier).with_engine_timeout(config.engine_timeout_secs))
    }
}

impl<E: CaptionEngine, N: Notifier> SnapCaption<E, N> {
    pub fn new(engine: E, notifier: N) -> Self {
        Self {
            engine,
            session: CaptionSession::new(notifier),
            engine_timeout_secs: None,
        }
    }

    /// Sets the per-request deadline; `None` waits indefinitely.
    pub fn with_engine_timeout(mut self, secs: Option<u64>) -> Self {
        self.engine_timeout_secs = secs;
        self
    }

    /// Loads a photo and immediately requests captions for it with the
    /// session's current style.
    ///
    /// Load failures (non-image file, unreadable file) are reported to the
    /// notification sink and leave the session untouched; `None` is returned
    /// when no request was issued.
    pub async fn upload(
        &mut self,
        path: &Path,
        on_progress: impl FnMut(u8),
    ) -> Option<RequestOutcome> {
        match ImageLoader::load(path, on_progress).await {
            Ok(payload) => {
                let request = self.session.attach_photo(payload);
                Some(self.run(request).await)
            }
            Err(err) => {
                self.session.report(&err);
                None
            }
        }
    }

    /// Switches the caption style, regenerating when a photo is present.
    pub async fn change_style(&mut self, style: CaptionStyle) -> Option<RequestOutcome> {
        let request = self.session.set_style(style)?;
        Some(self.run(request).await)
    }

    /// Discards the current photo and captions for a fresh upload.
    pub fn reset(&mut self) {
        self.session.reset();
    }

    async fn run(&mut self, request: GenerationRequest) -> RequestOutcome {
        let engine_request = request.engine_request();
        let result =
            generate_with_deadline(&self.engine, &engine_request, self.engine_timeout_secs).await;
        self.session.resolve(request.seq, result)
    }

    pub fn session(&self) -> &CaptionSession<N> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut CaptionSession<N> {
        &mut self.session
    }
}

/// Initializes the library by loading environment variables.
///
/// Call this once at application startup before using any other functions.
/// This loads `.env` files if present and sets up the environment.
pub fn init() {
    let _ = dotenvy::dotenv();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::test_support::RecordingNotifier;
    use std::io::Write;

    /// Engine scripted with a fixed response.
    struct FixedEngine(Result<Vec<String>>);

    impl CaptionEngine for FixedEngine {
        async fn generate(&self, _request: &EngineRequest) -> Result<Vec<String>> {
            match &self.0 {
                Ok(list) => Ok(list.clone()),
                Err(err) => Err(AppError::engine(err.to_string())),
            }
        }
    }

    /// Engine that never responds, for deadline tests.
    struct NeverEngine;

    impl CaptionEngine for NeverEngine {
        async fn generate(&self, _request: &EngineRequest) -> Result<Vec<String>> {
            std::future::pending().await
        }
    }

    fn jpeg_file(dir: &tempfile::TempDir, size: usize) -> std::path::PathBuf {
        let path = dir.path().join("photo.jpg");
        let mut contents = vec![0xFF, 0xD8, 0xFF, 0xE0];
        contents.resize(size, 0);
        std::fs::File::create(&path)
            .unwrap()
            .write_all(&contents)
            .unwrap();
        path
    }

    #[tokio::test]
    async fn upload_chains_into_a_generation_request() {
        let captions: Vec<String> =
            ["a", "b", "c", "d", "e"].iter().map(|s| s.to_string()).collect();
        let mut app = SnapCaption::new(
            FixedEngine(Ok(captions)),
            RecordingNotifier::default(),
        );

        let dir = tempfile::tempdir().unwrap();
        // A 2 MB upload: progress must end at 100 and yield 5 captions.
        let path = jpeg_file(&dir, 2 * 1024 * 1024);
        let mut last_pct = 0;
        let outcome = app.upload(&path, |pct| last_pct = pct).await;

        assert_eq!(outcome, Some(RequestOutcome::Applied));
        assert_eq!(last_pct, 100);
        assert_eq!(app.session().captions().len(), 5);
        assert_eq!(app.session().selected(), None);
        assert!(app.session_mut().notifier_mut().sent.is_empty());
    }

    #[tokio::test]
    async fn style_change_regenerates_and_replaces_the_list() {
        let mut app = SnapCaption::new(
            FixedEngine(Ok(vec!["x".into(), "y".into(), "z".into()])),
            RecordingNotifier::default(),
        );
        let dir = tempfile::tempdir().unwrap();
        app.upload(&jpeg_file(&dir, 1024), |_| {}).await;
        app.session_mut().select("y");

        let outcome = app.change_style(CaptionStyle::Witty).await;
        assert_eq!(outcome, Some(RequestOutcome::Applied));
        assert_eq!(app.session().style(), CaptionStyle::Witty);
        assert_eq!(app.session().captions().len(), 3);
        assert_eq!(app.session().selected(), None);
    }

    #[tokio::test]
    async fn style_change_without_a_photo_issues_nothing() {
        let mut app = SnapCaption::new(
            FixedEngine(Ok(vec!["unused".into()])),
            RecordingNotifier::default(),
        );
        assert_eq!(app.change_style(CaptionStyle::Bold).await, None);
        assert!(app.session().captions().is_empty());
    }

    #[tokio::test]
    async fn invalid_file_is_notified_without_touching_the_session() {
        let mut app = SnapCaption::new(
            FixedEngine(Ok(vec!["unused".into()])),
            RecordingNotifier::default(),
        );
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();

        let outcome = app.upload(&path, |_| {}).await;
        assert_eq!(outcome, None);
        assert!(app.session().photo().is_none());

        let sent = &app.session_mut().notifier_mut().sent;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].title, "Invalid file type");
    }

    #[tokio::test]
    async fn engine_failure_leaves_a_retryable_state() {
        let mut app = SnapCaption::new(
            FixedEngine(Err(AppError::engine("down"))),
            RecordingNotifier::default(),
        );
        let dir = tempfile::tempdir().unwrap();
        app.upload(&jpeg_file(&dir, 1024), |_| {}).await;

        assert!(app.session().photo().is_some(), "photo preview survives failure");
        assert!(app.session().captions().is_empty());
        assert_eq!(app.session_mut().notifier_mut().sent.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_turns_a_hung_engine_into_a_timeout_error() {
        let request = EngineRequest {
            payload: ImagePayload::from_bytes(&[1], "image/png"),
            style_hint: None,
        };
        let result = generate_with_deadline(&NeverEngine, &request, Some(3)).await;
        assert!(matches!(result, Err(AppError::EngineTimeout(3))));
    }
}
