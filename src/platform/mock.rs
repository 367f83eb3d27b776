//! Recording test doubles for the platform traits

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::future::Future;

use futures::channel::oneshot;

use super::{ResourceFetcher, Surface};
use crate::chatter::ChatterLine;
use crate::error::FetchError;
use crate::section::SectionId;
use crate::settings::Theme;
use crate::ui_state::WidgetPosition;

#[derive(Debug, Clone, Default)]
pub struct MockContainer {
    pub id: String,
    pub markup: String,
    pub active: bool,
}

/// Surface that records every call
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub containers: RefCell<Vec<MockContainer>>,
    pub nav: RefCell<Option<String>>,
    pub panel_open: Cell<bool>,
    pub theme: Cell<Option<Theme>>,
    pub widget: Cell<Option<WidgetPosition>>,
    pub notices: RefCell<Vec<(String, String)>>,
    pub chatter: RefCell<Vec<ChatterLine>>,
}

impl RecordingSurface {
    fn find(&self, id: &str) -> Option<MockContainer> {
        self.containers.borrow().iter().find(|c| c.id == id).cloned()
    }

    pub fn markup_of(&self, id: &str) -> Option<String> {
        self.find(id).map(|c| c.markup)
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.find(id).is_some_and(|c| c.active)
    }

    pub fn active_ids(&self) -> Vec<String> {
        self.containers
            .borrow()
            .iter()
            .filter(|c| c.active)
            .map(|c| c.id.clone())
            .collect()
    }

    pub fn container_count(&self) -> usize {
        self.containers.borrow().len()
    }
}

impl Surface for RecordingSurface {
    type Container = usize;

    fn create_container(&self, id: &SectionId) -> usize {
        let mut containers = self.containers.borrow_mut();
        containers.push(MockContainer {
            id: id.to_string(),
            ..MockContainer::default()
        });
        containers.len() - 1
    }

    fn set_markup(&self, container: &usize, html: &str) {
        self.containers.borrow_mut()[*container].markup = html.to_string();
    }

    fn set_active(&self, container: &usize, active: bool) {
        self.containers.borrow_mut()[*container].active = active;
    }

    fn mark_nav(&self, id: &SectionId) {
        *self.nav.borrow_mut() = Some(id.to_string());
    }

    fn set_panel_open(&self, open: bool) {
        self.panel_open.set(open);
    }

    fn apply_theme(&self, theme: Theme) {
        self.theme.set(Some(theme));
    }

    fn place_widget(&self, position: &WidgetPosition) {
        self.widget.set(Some(*position));
    }

    fn show_notice(&self, title: &str, message: &str) {
        self.notices
            .borrow_mut()
            .push((title.to_string(), message.to_string()));
    }

    fn show_chatter(&self, line: &ChatterLine) {
        self.chatter.borrow_mut().push(line.clone());
    }
}

type Reply = Result<String, FetchError>;

/// Fetcher with canned responses and call counting
///
/// Unknown paths answer 404. Gated paths stay pending until [`StubFetcher::release`].
#[derive(Default)]
pub struct StubFetcher {
    responses: RefCell<HashMap<String, Reply>>,
    calls: RefCell<Vec<String>>,
    gated: RefCell<HashSet<String>>,
    pending: RefCell<Vec<(String, oneshot::Sender<Reply>)>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, path: &str, body: &str) -> Self {
        self.responses
            .borrow_mut()
            .insert(path.to_string(), Ok(body.to_string()));
        self
    }

    pub fn fail(self, path: &str, error: FetchError) -> Self {
        self.responses
            .borrow_mut()
            .insert(path.to_string(), Err(error));
        self
    }

    pub fn gate(self, path: &str) -> Self {
        self.gated.borrow_mut().insert(path.to_string());
        self
    }

    /// Complete the oldest pending request for `path`
    pub fn release(&self, path: &str, reply: Reply) -> bool {
        let mut pending = self.pending.borrow_mut();
        let Some(index) = pending.iter().position(|(p, _)| p == path) else {
            return false;
        };
        let (_, tx) = pending.remove(index);
        tx.send(reply).is_ok()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.calls.borrow().iter().filter(|p| *p == path).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl ResourceFetcher for StubFetcher {
    fn fetch_text(&self, path: &str) -> impl Future<Output = Reply> {
        self.calls.borrow_mut().push(path.to_string());
        let gate = if self.gated.borrow().contains(path) {
            let (tx, rx) = oneshot::channel();
            self.pending.borrow_mut().push((path.to_string(), tx));
            Some(rx)
        } else {
            None
        };
        let immediate = self.responses.borrow().get(path).cloned().unwrap_or_else(|| {
            Err(FetchError::Status {
                path: path.to_string(),
                status: 404,
                status_text: "Not Found".to_string(),
            })
        });
        async move {
            match gate {
                Some(rx) => rx
                    .await
                    .unwrap_or_else(|_| Err(FetchError::Network("request dropped".to_string()))),
                None => immediate,
            }
        }
    }
}
