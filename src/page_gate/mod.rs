//! Page gate: keeps a page's blocking overlays consistent with `isBlocking`.
//!
//! The gate is driven by a single event stream. DOM mutations add newly seen
//! video elements; blocking changes flip the desired state. After each event
//! every known element is reconciled, attaching or detaching overlays only
//! where the current state differs.

pub mod watch;

pub use watch::BlockingWatch;

use crate::coordinator::BlockReport;
use std::collections::HashSet;
use std::hash::Hash;
use url::Url;

/// Base used to resolve relative links found in the page.
const SITE_BASE: &str = "https://www.youtube.com/";

/// A video or thumbnail element on the page.
pub trait VideoElement {
    type Key: Eq + Hash + Clone;

    /// Identity of the underlying DOM node.
    fn key(&self) -> Self::Key;

    /// Target of the element's video link, if it has one.
    fn href(&self) -> Option<&str>;

    fn title(&self) -> Option<&str>;

    fn thumbnail(&self) -> Option<&str>;

    /// True for the page's playing video, false for a thumbnail.
    fn is_player(&self) -> bool;

    /// Cover the element, swallow clicks on it and pause any playback.
    fn attach_overlay(&mut self);

    /// Remove the overlay and restore the original element.
    fn detach_overlay(&mut self);
}

#[derive(Debug)]
pub enum GateEvent<E> {
    DomMutated(Vec<E>),
    BlockingChanged(bool),
}

/// What one event changed on the page.
#[derive(Debug)]
pub struct GateUpdate<K> {
    pub discovered: usize,
    pub attached: Vec<K>,
    pub detached: Vec<K>,
    /// Players that just got covered, to be reported as blocked videos.
    pub blocked: Vec<BlockReport>,
}

impl<K> Default for GateUpdate<K> {
    fn default() -> Self {
        Self {
            discovered: 0,
            attached: Vec::new(),
            detached: Vec::new(),
            blocked: Vec::new(),
        }
    }
}

impl<K> GateUpdate<K> {
    pub fn is_noop(&self) -> bool {
        self.attached.is_empty() && self.detached.is_empty()
    }
}

struct Tracked<E> {
    element: E,
    overlaid: bool,
}

pub struct PageGate<E: VideoElement> {
    tracked: Vec<Tracked<E>>,
    known: HashSet<E::Key>,
    blocking: bool,
}

impl<E: VideoElement> PageGate<E> {
    pub fn new(blocking: bool) -> Self {
        Self {
            tracked: Vec::new(),
            known: HashSet::new(),
            blocking,
        }
    }

    pub fn is_blocking(&self) -> bool {
        self.blocking
    }

    /// Number of video elements discovered so far.
    pub fn tracked_count(&self) -> usize {
        self.tracked.len()
    }

    pub fn overlaid_count(&self) -> usize {
        self.tracked.iter().filter(|t| t.overlaid).count()
    }

    pub fn handle(&mut self, event: GateEvent<E>) -> GateUpdate<E::Key> {
        let mut update = GateUpdate::default();
        match event {
            GateEvent::DomMutated(elements) => update.discovered = self.discover(elements),
            GateEvent::BlockingChanged(blocking) => self.blocking = blocking,
        }
        self.reconcile(&mut update);
        update
    }

    /// Track elements not seen before. Elements without a video link are skipped.
    fn discover(&mut self, elements: Vec<E>) -> usize {
        let mut added = 0;
        for element in elements {
            if !element.href().is_some_and(is_video_link) {
                continue;
            }
            if self.known.insert(element.key()) {
                self.tracked.push(Tracked { element, overlaid: false });
                added += 1;
            }
        }
        added
    }

    fn reconcile(&mut self, update: &mut GateUpdate<E::Key>) {
        for tracked in &mut self.tracked {
            if self.blocking && !tracked.overlaid {
                tracked.element.attach_overlay();
                tracked.overlaid = true;
                update.attached.push(tracked.element.key());
                if tracked.element.is_player() {
                    update.blocked.push(block_report(&tracked.element));
                }
            } else if !self.blocking && tracked.overlaid {
                tracked.element.detach_overlay();
                tracked.overlaid = false;
                update.detached.push(tracked.element.key());
            }
        }
    }
}

fn block_report<E: VideoElement>(element: &E) -> BlockReport {
    BlockReport {
        title: element.title().unwrap_or_default().to_string(),
        url: element.href().unwrap_or_default().to_string(),
        thumbnail: element.thumbnail().unwrap_or_default().to_string(),
    }
}

/// Regular videos (`/watch?v=`) and shorts (`/shorts/`). Relative links resolve
/// against the site root.
pub fn is_video_link(href: &str) -> bool {
    let Ok(url) = Url::parse(SITE_BASE).and_then(|base| base.join(href)) else {
        return false;
    };

    if url.path() == "/watch" {
        return url.query_pairs().any(|(key, value)| key == "v" && !value.is_empty());
    }
    url.path()
        .strip_prefix("/shorts/")
        .is_some_and(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct FakeElement {
        id: u32,
        href: Option<String>,
        player: bool,
        attach_calls: u32,
        detach_calls: u32,
    }

    impl FakeElement {
        fn card(id: u32) -> Self {
            Self {
                id,
                href: Some(format!("/watch?v=vid{id}")),
                player: false,
                attach_calls: 0,
                detach_calls: 0,
            }
        }

        fn player(id: u32) -> Self {
            Self {
                player: true,
                href: Some(format!("https://www.youtube.com/watch?v=vid{id}")),
                ..Self::card(id)
            }
        }
    }

    impl VideoElement for FakeElement {
        type Key = u32;

        fn key(&self) -> u32 {
            self.id
        }

        fn href(&self) -> Option<&str> {
            self.href.as_deref()
        }

        fn title(&self) -> Option<&str> {
            Some("A video")
        }

        fn thumbnail(&self) -> Option<&str> {
            None
        }

        fn is_player(&self) -> bool {
            self.player
        }

        fn attach_overlay(&mut self) {
            self.attach_calls += 1;
        }

        fn detach_overlay(&mut self) {
            self.detach_calls += 1;
        }
    }

    fn calls(gate: &PageGate<FakeElement>) -> Vec<(u32, u32)> {
        gate.tracked
            .iter()
            .map(|t| (t.element.attach_calls, t.element.detach_calls))
            .collect()
    }

    #[test]
    fn test_is_video_link() {
        assert!(is_video_link("/watch?v=dQw4w9WgXcQ"));
        assert!(is_video_link("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42"));
        assert!(is_video_link("/shorts/abc123"));
        assert!(!is_video_link("/watch"));
        assert!(!is_video_link("/watch?v="));
        assert!(!is_video_link("/shorts/"));
        assert!(!is_video_link("/channel/UC123"));
        assert!(!is_video_link("/feed/subscriptions"));
    }

    #[test]
    fn test_discovery_dedups_by_identity() {
        let mut gate = PageGate::new(false);

        let update = gate.handle(GateEvent::DomMutated(vec![FakeElement::card(1), FakeElement::card(2)]));
        assert_eq!(update.discovered, 2);

        let update = gate.handle(GateEvent::DomMutated(vec![FakeElement::card(2), FakeElement::card(3)]));
        assert_eq!(update.discovered, 1);
        assert_eq!(gate.tracked_count(), 3);
    }

    #[test]
    fn test_elements_without_video_link_are_skipped() {
        let mut gate = PageGate::new(true);
        let mut no_link = FakeElement::card(1);
        no_link.href = None;
        let mut channel = FakeElement::card(2);
        channel.href = Some("/channel/UC123".to_string());

        let update = gate.handle(GateEvent::DomMutated(vec![no_link, channel]));
        assert_eq!(update.discovered, 0);
        assert_eq!(gate.tracked_count(), 0);
    }

    #[test]
    fn test_blocking_attaches_and_unblocking_detaches() {
        let mut gate = PageGate::new(false);
        gate.handle(GateEvent::DomMutated(vec![FakeElement::card(1), FakeElement::card(2)]));
        assert_eq!(gate.overlaid_count(), 0);

        let update = gate.handle(GateEvent::BlockingChanged(true));
        assert_eq!(update.attached, vec![1, 2]);
        assert_eq!(gate.overlaid_count(), 2);

        let update = gate.handle(GateEvent::BlockingChanged(false));
        assert_eq!(update.detached, vec![1, 2]);
        assert_eq!(gate.overlaid_count(), 0);
        assert_eq!(calls(&gate), vec![(1, 1), (1, 1)]);
    }

    #[test]
    fn test_repeated_updates_cause_no_churn() {
        let mut gate = PageGate::new(true);
        gate.handle(GateEvent::DomMutated(vec![FakeElement::card(1)]));

        let update = gate.handle(GateEvent::BlockingChanged(true));
        assert!(update.is_noop());
        let update = gate.handle(GateEvent::DomMutated(Vec::new()));
        assert!(update.is_noop());
        assert_eq!(calls(&gate), vec![(1, 0)]);

        gate.handle(GateEvent::BlockingChanged(false));
        let update = gate.handle(GateEvent::BlockingChanged(false));
        assert!(update.is_noop());
        assert_eq!(calls(&gate), vec![(1, 1)]);
    }

    #[test]
    fn test_new_elements_are_covered_while_blocking() {
        let mut gate = PageGate::new(true);
        gate.handle(GateEvent::DomMutated(vec![FakeElement::card(1)]));

        let update = gate.handle(GateEvent::DomMutated(vec![FakeElement::card(2)]));
        assert_eq!(update.attached, vec![2]);
        assert_eq!(gate.overlaid_count(), 2);
    }

    #[test]
    fn test_only_players_are_reported() {
        let mut gate = PageGate::new(true);
        let update = gate.handle(GateEvent::DomMutated(vec![FakeElement::card(1), FakeElement::player(2)]));

        assert_eq!(update.attached.len(), 2);
        assert_eq!(update.blocked.len(), 1);
        let report = update.blocked.first().unwrap();
        assert_eq!(report.title, "A video");
        assert_eq!(report.url, "https://www.youtube.com/watch?v=vid2");
        assert_eq!(report.thumbnail, "");

        // Re-covering after an unblock reports again
        gate.handle(GateEvent::BlockingChanged(false));
        let update = gate.handle(GateEvent::BlockingChanged(true));
        assert_eq!(update.blocked.len(), 1);
    }
}
