//! The caption generation session.
//!
//! A [`CaptionSession`] owns the "current photo + current style + current
//! caption list" context and enforces the single-flight discipline: every
//! request is tagged with a strictly increasing sequence number at issue
//! time, and a response is only applied if it belongs to the highest-issued
//! request. Responses for anything older are discarded wholesale, which is
//! how rapid style switching avoids flicker without cancelling network
//! calls.
//!
//! All engine failures terminate here: they become exactly one notification
//! and never propagate to a caller. The photo and style survive every
//! failure so the user is always left in a retryable state.

use crate::engine::EngineRequest;
use crate::error::{AppError, Result};
use crate::loader::ImagePayload;
use crate::notify::Notifier;
use crate::style::CaptionStyle;

/// One outstanding or completed call to the caption engine.
#[derive(Clone, Debug)]
pub struct GenerationRequest {
    /// Strictly increasing sequence number assigned at issue time.
    pub seq: u64,
    pub payload: ImagePayload,
    pub style: CaptionStyle,
}

impl GenerationRequest {
    /// The wire-level request, with the sentinel style mapped to "no hint".
    pub fn engine_request(&self) -> EngineRequest {
        EngineRequest {
            payload: self.payload.clone(),
            style_hint: self.style.hint().map(String::from),
        }
    }
}

/// What happened to a resolved response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestOutcome {
    /// The response belonged to the latest request and was applied.
    Applied,
    /// A newer request had been issued; the response was discarded.
    Superseded,
}

/// Owns the current photo, style, caption list and selection.
///
/// Single-threaded by design: mutations only happen in response to a direct
/// user action or a resolved async step, never interleaved.
pub struct CaptionSession<N: Notifier> {
    notifier: N,
    photo: Option<ImagePayload>,
    style: CaptionStyle,
    captions: Vec<String>,
    selected: Option<String>,
    /// Highest sequence number issued so far; only this request is authoritative.
    issued: u64,
    /// Highest sequence number whose response has been applied or reported.
    resolved: u64,
}

impl<N: Notifier> CaptionSession<N> {
    pub fn new(notifier: N) -> Self {
        Self {
            notifier,
            photo: None,
            style: CaptionStyle::Default,
            captions: Vec::new(),
            selected: None,
            issued: 0,
            resolved: 0,
        }
    }

    /// Attaches a freshly loaded photo and issues a generation request for it.
    ///
    /// A new upload always replaces the previous payload; any request still in
    /// flight for the old photo is superseded by the returned one.
    pub fn attach_photo(&mut self, payload: ImagePayload) -> GenerationRequest {
        self.photo = Some(payload.clone());
        self.begin_request(payload)
    }

    /// Changes the active style, issuing a new request if a photo is present.
    ///
    /// With no photo the style change is remembered and applied to the next
    /// upload.
    pub fn set_style(&mut self, style: CaptionStyle) -> Option<GenerationRequest> {
        self.style = style;
        let payload = self.photo.clone()?;
        Some(self.begin_request(payload))
    }

    /// Issues a request: bumps the sequence and clears stale captions so they
    /// never remain visible while the new request is outstanding.
    fn begin_request(&mut self, payload: ImagePayload) -> GenerationRequest {
        self.issued += 1;
        self.captions.clear();
        self.selected = None;
        GenerationRequest {
            seq: self.issued,
            payload,
            style: self.style,
        }
    }

    /// Applies an engine response, subject to the supersession rule.
    ///
    /// A response for anything but the highest-issued sequence number is
    /// discarded entirely: no state mutation, no notification. An applied
    /// failure (transport error or an empty caption list) becomes a single
    /// notification and leaves the photo and style intact.
    pub fn resolve(&mut self, seq: u64, result: Result<Vec<String>>) -> RequestOutcome {
        if seq != self.issued {
            tracing::debug!(seq, latest = self.issued, "discarding superseded caption response");
            return RequestOutcome::Superseded;
        }
        self.resolved = seq;

        match result {
            Ok(captions) if !captions.is_empty() => {
                tracing::debug!(seq, count = captions.len(), "applying caption list");
                self.captions = captions;
            }
            Ok(_) => self.report(&AppError::NoCaptionsGenerated),
            Err(err) => self.report(&err),
        }
        RequestOutcome::Applied
    }

    /// Sets the chosen caption. Silent no-op if it isn't in the current list.
    pub fn select(&mut self, caption: &str) {
        if self.captions.iter().any(|c| c == caption) {
            self.selected = Some(caption.to_string());
        }
    }

    /// Returns to the no-photo state for an "upload another photo" action.
    ///
    /// Bumping the sequence here marks any in-flight request as superseded, so
    /// a late response can never repopulate a session the user has reset.
    pub fn reset(&mut self) {
        self.photo = None;
        self.style = CaptionStyle::Default;
        self.captions.clear();
        self.selected = None;
        self.issued += 1;
        self.resolved = self.issued;
    }

    /// Converts an error into its user-facing notification.
    pub fn report(&mut self, err: &AppError) {
        tracing::warn!(error = %err, "caption workflow error");
        self.notifier.notify(err.notification());
    }

    /// True while the latest issued request has not resolved.
    pub fn is_generating(&self) -> bool {
        self.resolved < self.issued
    }

    pub fn photo(&self) -> Option<&ImagePayload> {
        self.photo.as_ref()
    }

    pub fn style(&self) -> CaptionStyle {
        self.style
    }

    pub fn captions(&self) -> &[String] {
        &self.captions
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::test_support::RecordingNotifier;
    use crate::notify::Severity;

    fn session() -> CaptionSession<RecordingNotifier> {
        CaptionSession::new(RecordingNotifier::default())
    }

    fn payload() -> ImagePayload {
        ImagePayload::from_bytes(&[0xFF, 0xD8, 0xFF], "image/jpeg")
    }

    fn captions(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn upload_then_resolve_applies_the_caption_list() {
        let mut s = session();
        let req = s.attach_photo(payload());
        assert_eq!(req.seq, 1);
        assert!(s.is_generating());

        let outcome = s.resolve(req.seq, Ok(captions(&["a", "b", "c", "d", "e"])));
        assert_eq!(outcome, RequestOutcome::Applied);
        assert_eq!(s.captions().len(), 5);
        assert_eq!(s.selected(), None);
        assert!(!s.is_generating());
    }

    #[test]
    fn only_the_last_issued_request_may_mutate_state() {
        let mut s = session();
        let first = s.attach_photo(payload());
        let second = s.set_style(CaptionStyle::Witty).unwrap();
        let third = s.set_style(CaptionStyle::Poetic).unwrap();
        assert!(first.seq < second.seq && second.seq < third.seq);

        // Resolution order scrambled: old responses land after newer ones.
        assert_eq!(s.resolve(second.seq, Ok(captions(&["stale"]))), RequestOutcome::Superseded);
        assert_eq!(s.resolve(third.seq, Ok(captions(&["fresh"]))), RequestOutcome::Applied);
        assert_eq!(s.resolve(first.seq, Ok(captions(&["older"]))), RequestOutcome::Superseded);

        assert_eq!(s.captions(), ["fresh".to_string()]);
        assert!(s.notifier_mut().sent.is_empty(), "superseded responses must be silent");
    }

    #[test]
    fn superseded_errors_are_discarded_silently() {
        let mut s = session();
        let first = s.attach_photo(payload());
        let second = s.set_style(CaptionStyle::Bold).unwrap();

        assert_eq!(
            s.resolve(first.seq, Err(AppError::engine("boom"))),
            RequestOutcome::Superseded
        );
        assert!(s.notifier_mut().sent.is_empty());

        s.resolve(second.seq, Ok(captions(&["ok"])));
        assert_eq!(s.captions(), ["ok".to_string()]);
    }

    #[test]
    fn sentinel_style_maps_to_no_hint() {
        let mut s = session();
        let req = s.attach_photo(payload());
        assert_eq!(req.engine_request().style_hint, None);

        let witty = s.set_style(CaptionStyle::Witty).unwrap();
        assert_eq!(witty.engine_request().style_hint.as_deref(), Some("witty"));
    }

    #[test]
    fn empty_result_is_a_failure_not_an_empty_success() {
        let mut s = session();
        let req = s.attach_photo(payload());
        s.resolve(req.seq, Ok(Vec::new()));

        let sent = &s.notifier_mut().sent;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].severity, Severity::Error);
        assert!(sent[0].description.contains("couldn't generate captions"));
        // Photo and style survive so the user can retry.
        assert!(s.photo().is_some());
    }

    #[test]
    fn transport_failure_retains_photo_and_style() {
        let mut s = session();
        s.attach_photo(payload());
        let req = s.set_style(CaptionStyle::Casual).unwrap();
        s.resolve(req.seq, Err(AppError::engine("connection reset")));

        assert_eq!(s.notifier_mut().sent.len(), 1);
        assert!(s.photo().is_some());
        assert_eq!(s.style(), CaptionStyle::Casual);
        assert!(s.captions().is_empty());
    }

    #[test]
    fn style_switch_clears_captions_and_selection_before_reissue() {
        let mut s = session();
        let first = s.attach_photo(payload());
        s.resolve(first.seq, Ok(captions(&["one", "two", "three", "four", "five"])));
        s.select("two");
        assert_eq!(s.selected(), Some("two"));

        let second = s.set_style(CaptionStyle::Witty).unwrap();
        assert!(s.captions().is_empty());
        assert_eq!(s.selected(), None);

        s.resolve(second.seq, Ok(captions(&["x", "y", "z"])));
        assert_eq!(s.captions().len(), 3);
        assert_eq!(s.selected(), None);
    }

    #[test]
    fn selecting_an_unknown_caption_is_a_no_op() {
        let mut s = session();
        let req = s.attach_photo(payload());
        s.resolve(req.seq, Ok(captions(&["real"])));

        s.select("imaginary");
        assert_eq!(s.selected(), None);
        s.select("real");
        assert_eq!(s.selected(), Some("real"));
    }

    #[test]
    fn reset_invalidates_an_in_flight_request() {
        let mut s = session();
        let req = s.attach_photo(payload());
        s.reset();

        assert_eq!(s.resolve(req.seq, Ok(captions(&["late"]))), RequestOutcome::Superseded);
        assert!(s.photo().is_none());
        assert!(s.captions().is_empty());
        assert_eq!(s.style(), CaptionStyle::Default);
        assert!(!s.is_generating());
    }

    #[test]
    fn style_set_without_a_photo_waits_for_the_next_upload() {
        let mut s = session();
        assert!(s.set_style(CaptionStyle::Poetic).is_none());

        let req = s.attach_photo(payload());
        assert_eq!(req.style, CaptionStyle::Poetic);
        assert_eq!(req.engine_request().style_hint.as_deref(), Some("poetic"));
    }
}
