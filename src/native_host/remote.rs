//! Page elements that live in the content script, mirrored host-side.
//!
//! Overlay changes are not applied here; the host collects them into an
//! [`OverlayPlan`] that the content script applies to the real DOM.

use super::messages::ElementSnapshot;
use crate::page_gate::VideoElement;

#[derive(Debug)]
pub struct RemoteElement {
    snapshot: ElementSnapshot,
}

impl From<ElementSnapshot> for RemoteElement {
    fn from(snapshot: ElementSnapshot) -> Self {
        Self { snapshot }
    }
}

impl VideoElement for RemoteElement {
    type Key = String;

    fn key(&self) -> String {
        self.snapshot.id.clone()
    }

    fn href(&self) -> Option<&str> {
        self.snapshot.href.as_deref()
    }

    fn title(&self) -> Option<&str> {
        self.snapshot.title.as_deref()
    }

    fn thumbnail(&self) -> Option<&str> {
        self.snapshot.thumbnail.as_deref()
    }

    fn is_player(&self) -> bool {
        self.snapshot.player
    }

    fn attach_overlay(&mut self) {}

    fn detach_overlay(&mut self) {}
}

/// Pending overlay changes for the content script, net of each other.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct OverlayPlan {
    pub attach: Vec<String>,
    pub detach: Vec<String>,
}

impl OverlayPlan {
    pub fn attach(&mut self, id: String) {
        if let Some(pos) = self.detach.iter().position(|d| *d == id) {
            self.detach.remove(pos);
        } else {
            self.attach.push(id);
        }
    }

    pub fn detach(&mut self, id: String) {
        if let Some(pos) = self.attach.iter().position(|a| *a == id) {
            self.attach.remove(pos);
        } else {
            self.detach.push(id);
        }
    }

    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }
}
