//! Pure view projection.
//!
//! Derives what to render from the session and the display-only progress
//! values. Holds no state of its own; presentation layers consume this as a
//! read-only snapshot.

use crate::notify::Notifier;
use crate::session::CaptionSession;

/// What the presentation layer should currently show.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewState<'a> {
    /// No photo yet: show the drop zone.
    AwaitingUpload,
    /// A file read is in progress.
    Uploading { pct: u8 },
    /// A caption request is outstanding; `pct` is simulated.
    Generating { pct: u8 },
    /// Captions are available for selection.
    Captions {
        items: &'a [String],
        selected: Option<&'a str>,
    },
    /// Photo present but no captions (a failed request left a stable state).
    PhotoOnly,
}

/// Projects session + progress into a renderable state.
///
/// `upload_pct` is `Some` only while the image loader is running;
/// `generation_pct` is the progress simulator's current value.
pub fn project<'a, N: Notifier>(
    session: &'a CaptionSession<N>,
    upload_pct: Option<u8>,
    generation_pct: u8,
) -> ViewState<'a> {
    if let Some(pct) = upload_pct {
        return ViewState::Uploading { pct };
    }
    if session.photo().is_none() {
        return ViewState::AwaitingUpload;
    }
    if session.is_generating() {
        return ViewState::Generating { pct: generation_pct };
    }
    if session.captions().is_empty() {
        return ViewState::PhotoOnly;
    }
    ViewState::Captions {
        items: session.captions(),
        selected: session.selected(),
    }
}
