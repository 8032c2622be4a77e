//! Caption export: clipboard copy and tiered sharing.
//!
//! Sharing degrades across heterogeneous platform capabilities as an ordered
//! list of tiers with early exit: file+text share, text-only share (plus a
//! convenience copy), and finally plain copy when no share capability exists
//! at all. User cancellation of a share sheet is a silent no-op everywhere;
//! only unexpected failures reach the notification sink.

use crate::error::{AppError, Result};
use crate::loader::ImagePayload;
use crate::notify::{Notification, Notifier};
use std::time::{Duration, Instant};

/// How long the transient "copied" indicator stays visible.
pub const COPIED_FLASH: Duration = Duration::from_secs(2);

/// Write access to the system clipboard.
pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// The real clipboard, backed by arboard.
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

impl SystemClipboard {
    pub fn new() -> Result<Self> {
        let inner = arboard::Clipboard::new()
            .map_err(|e| AppError::clipboard(format!("Could not access clipboard: {}", e)))?;
        Ok(Self { inner })
    }
}

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        self.inner
            .set_text(text.to_string())
            .map_err(|e| AppError::clipboard(format!("Failed to copy to clipboard: {}", e)))
    }
}

/// What the platform's share surface can do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShareCapability {
    /// Can attach the image file alongside the caption text.
    FilesAndText,
    /// Can share plain text only.
    TextOnly,
    /// No share surface at all.
    Unsupported,
}

/// How a share attempt ended, cancellation excluded from the error path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    /// The user dismissed the share sheet. Not an error.
    Cancelled,
}

/// A platform share surface (native share sheet or equivalent).
pub trait ShareTarget {
    fn capability(&self) -> ShareCapability;
    fn share_file(&mut self, payload: &ImagePayload, caption: &str) -> Result<ShareOutcome>;
    fn share_text(&mut self, caption: &str) -> Result<ShareOutcome>;
}

/// The no-capability target for platforms without a share sheet.
pub struct UnsupportedShare;

impl ShareTarget for UnsupportedShare {
    fn capability(&self) -> ShareCapability {
        ShareCapability::Unsupported
    }

    fn share_file(&mut self, _payload: &ImagePayload, _caption: &str) -> Result<ShareOutcome> {
        Err(AppError::share("file sharing is not supported here"))
    }

    fn share_text(&mut self, _caption: &str) -> Result<ShareOutcome> {
        Err(AppError::share("text sharing is not supported here"))
    }
}

/// Drives copy and share for the user's chosen caption.
pub struct Exporter<C: Clipboard> {
    clipboard: C,
    copied_at: Option<Instant>,
}

impl<C: Clipboard> Exporter<C> {
    pub fn new(clipboard: C) -> Self {
        Self {
            clipboard,
            copied_at: None,
        }
    }

    /// Writes the caption to the clipboard and starts the "copied" flash.
    ///
    /// On failure the flash is simply not started; the caller decides whether
    /// to surface the error.
    pub fn copy(&mut self, caption: &str) -> Result<()> {
        self.clipboard.set_text(caption)?;
        self.copied_at = Some(Instant::now());
        Ok(())
    }

    /// True for [`COPIED_FLASH`] after a successful copy, then false again.
    pub fn is_copied(&self) -> bool {
        self.copied_at
            .is_some_and(|at| at.elapsed() < COPIED_FLASH)
    }

    /// Shares the caption for the current photo through the best available tier.
    ///
    /// Tier order, each final if it succeeds:
    /// 1. file+text share of the image with the caption attached;
    /// 2. text-only share of the caption, plus a convenience copy and a note
    ///    that the image was left out;
    /// 3. plain copy with a note that sharing is unsupported.
    ///
    /// Cancellation produces no notification and changes no state. An
    /// unexpected failure in the attempted tier becomes one error
    /// notification; there is no fallback past the capability-selected tier.
    pub fn share(
        &mut self,
        target: &mut impl ShareTarget,
        payload: &ImagePayload,
        caption: &str,
        notifier: &mut impl Notifier,
    ) {
        let attempt = match target.capability() {
            ShareCapability::FilesAndText => target.share_file(payload, caption),
            ShareCapability::TextOnly => target.share_text(caption),
            ShareCapability::Unsupported => {
                match self.copy(caption) {
                    Ok(()) => notifier.notify(Notification::success(
                        "Sharing unavailable",
                        "Sharing isn't supported on this device, so the caption was copied to your clipboard instead.",
                    )),
                    Err(err) => notifier.notify(err.notification()),
                }
                return;
            }
        };

        match attempt {
            Ok(ShareOutcome::Shared) => {
                if target.capability() == ShareCapability::TextOnly {
                    let _ = self.copy(caption);
                    notifier.notify(Notification::success(
                        "Caption shared",
                        "The image couldn't be attached, so only the caption was shared (and copied for you).",
                    ));
                }
            }
            Ok(ShareOutcome::Cancelled) => {}
            Err(err) => {
                tracing::warn!(error = %err, "share attempt failed");
                notifier.notify(AppError::share(err.to_string()).notification());
            }
        }
    }
}
