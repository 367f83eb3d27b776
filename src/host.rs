//! Section host
//!
//! Tracks which section is active, lazily fetches each section's markup,
//! runs its behavior initializer, and persists the open/active state.
//!
//! All methods take `&self` so the host can sit in an `Rc` shared by event
//! listeners. Interior state lives in `RefCell`s that are never held across
//! an `.await`: two sections can be loading at once, and a second request
//! for a section whose markup is still in flight waits on the first instead
//! of fetching again.

use std::cell::RefCell;
use std::rc::Rc;

use crate::catalog::{AppState, Card, Session, parse_cards, parse_trivia};
use crate::chatter::{Chatter, ChatterLine};
use crate::config::HostConfig;
use crate::error::{CatalogError, FetchError, MessageError, StorageError};
use crate::escape_html;
use crate::events::{EventBus, HostEvent};
use crate::message::HostMessage;
use crate::persistence::KeyValueStore;
use crate::platform::{ResourceFetcher, Surface};
use crate::section::{BehaviorRegistry, InitContext, SectionId, SectionPhase, SectionRegistry};
use crate::settings::{Options, Theme};
use crate::ui_state::{UiState, WidgetPosition};

/// Inline message shown in a section whose markup failed to load
pub const SECTION_LOAD_FAILED: &str = "セクションの読み込みに失敗しました。";

/// Result of a `show_section` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Markup fetched and behavior initialized
    Loaded,
    /// Markup already present; behavior re-run
    Refreshed,
    /// Markup fetch for this section already in flight
    Pending,
    /// Markup fetch failed; container shows the error
    Failed(FetchError),
    /// Empty identifier, nothing done
    Ignored,
}

/// What to do after the active designation moved
enum Plan<C> {
    Fetch(C),
    Refresh,
    Wait,
}

pub struct SectionHost<S: Surface, F: ResourceFetcher, K: KeyValueStore + 'static> {
    surface: S,
    fetcher: F,
    store: Rc<K>,
    config: HostConfig,
    behaviors: BehaviorRegistry,
    state: RefCell<UiState>,
    registry: RefCell<SectionRegistry<S::Container>>,
    app: Rc<RefCell<AppState>>,
    events: EventBus,
    chatter: RefCell<Chatter>,
}

impl<S: Surface, F: ResourceFetcher, K: KeyValueStore + 'static> SectionHost<S, F, K> {
    pub fn new(
        surface: S,
        fetcher: F,
        store: K,
        config: HostConfig,
        behaviors: BehaviorRegistry,
    ) -> Self {
        let state = UiState::new(&config);
        Self {
            surface,
            fetcher,
            store: Rc::new(store),
            config,
            behaviors,
            state: RefCell::new(state),
            registry: RefCell::new(SectionRegistry::new()),
            app: Rc::new(RefCell::new(AppState::default())),
            events: EventBus::new(),
            chatter: RefCell::new(Chatter::new(0)),
        }
    }

    /// Seed the chatter picker
    pub fn with_chatter_seed(self, seed: u64) -> Self {
        *self.chatter.borrow_mut() = Chatter::new(seed);
        self
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn store(&self) -> &K {
        self.store.as_ref()
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn app(&self) -> &Rc<RefCell<AppState>> {
        &self.app
    }

    pub fn ui_state(&self) -> UiState {
        self.state.borrow().clone()
    }

    pub fn is_open(&self) -> bool {
        self.state.borrow().is_open
    }

    pub fn section_phase(&self, id: &str) -> Option<SectionPhase> {
        let id = SectionId::new(id)?;
        self.registry.borrow().get(&id).map(|r| r.phase.clone())
    }

    /// Markup fetches and initializer runs recorded for a section
    pub fn section_counts(&self, id: &str) -> Option<(u32, u32)> {
        let id = SectionId::new(id)?;
        self.registry.borrow().get(&id).map(|r| (r.fetches, r.inits))
    }

    pub fn active_section_id(&self) -> Option<SectionId> {
        self.registry.borrow().active_id().cloned()
    }

    pub fn active_section_count(&self) -> usize {
        self.registry.borrow().active_count()
    }

    /// Make `id` the active section, loading it on first display
    pub async fn show_section(&self, id: &str) -> LoadOutcome {
        let Some(id) = SectionId::new(id) else {
            log::debug!("Ignoring show_section with empty id");
            return LoadOutcome::Ignored;
        };

        match self.activate(&id) {
            Plan::Wait => {
                log::debug!("Section {} still loading", id);
                LoadOutcome::Pending
            }
            Plan::Refresh => {
                self.run_behavior(&id);
                LoadOutcome::Refreshed
            }
            Plan::Fetch(container) => self.load(&id, container).await,
        }
    }

    /// Open/close the panel; opening shows `id` or the last active section
    ///
    /// Returns the new open state.
    pub async fn toggle_sidebar(&self, id: Option<&str>, force_open: bool) -> bool {
        let (open, target) = {
            let mut state = self.state.borrow_mut();
            let open = force_open || !state.is_open;
            state.is_open = open;
            if let Err(e) = state.save_open(self.store.as_ref()) {
                log::warn!("Could not persist sidebar state: {}", e);
            }
            // A blank id falls back to the last active section
            let target = id
                .and_then(SectionId::new)
                .map(|id| id.to_string())
                .unwrap_or_else(|| state.active_section.clone());
            (open, target)
        };

        self.surface.set_panel_open(open);
        self.notify_state();

        if open {
            self.show_section(&target).await;
        }
        open
    }

    /// Navigation icon clicked: close if it is already the open section,
    /// otherwise open on it
    pub async fn nav_clicked(&self, id: &str) -> bool {
        let showing = {
            let state = self.state.borrow();
            state.is_open && state.active_section == id
        };
        if showing {
            self.toggle_sidebar(None, false).await
        } else {
            self.toggle_sidebar(Some(id), true).await
        }
    }

    /// Route a validated cross-document message
    pub async fn handle_message(&self, message: HostMessage) {
        match message {
            HostMessage::ShowSection {
                section,
                force_open: true,
            } => {
                self.toggle_sidebar(Some(section.as_str()), true).await;
            }
            HostMessage::ShowSection { section, .. } => {
                self.show_section(section.as_str()).await;
            }
            HostMessage::ApplyTheme(theme) => self.apply_theme(theme),
        }
    }

    /// Parse and route a raw JSON message; malformed messages are ignored
    pub async fn handle_raw_message(&self, json: &str) -> Result<(), MessageError> {
        match HostMessage::parse(json) {
            Ok(message) => {
                self.handle_message(message).await;
                Ok(())
            }
            Err(e) => {
                log::warn!("Ignoring message {}: {}", json, e);
                Err(e)
            }
        }
    }

    pub fn apply_theme(&self, theme: Theme) {
        self.surface.apply_theme(theme);
        log::info!("Applied theme: {}", theme.as_str());
        self.events.emit(HostEvent::ThemeApplied(theme));
    }

    /// Persist the bird position after a drag
    pub fn save_widget_position(&self, position: &WidgetPosition) -> Result<(), StorageError> {
        position.save(self.store.as_ref()).inspect_err(|e| {
            log::warn!("Could not persist bird position: {}", e);
        })
    }

    /// Startup: restore widget position, theme, and open/active state
    pub async fn restore(&self) {
        let restored = UiState::load(self.store.as_ref(), &self.config);
        log::info!(
            "Restored UI state: open={}, section={}",
            restored.is_open,
            restored.active_section
        );
        *self.state.borrow_mut() = restored.clone();

        if let Some(position) = WidgetPosition::load(self.store.as_ref()) {
            self.surface.place_widget(&position);
        }

        self.apply_theme(Options::load(self.store.as_ref()).theme);

        if restored.is_open {
            self.toggle_sidebar(None, true).await;
        } else {
            self.surface.set_panel_open(false);
            if let Some(id) = SectionId::new(&restored.active_section) {
                self.surface.mark_nav(&id);
            }
        }
    }

    /// Fetch the card catalog and trivia into app state
    pub async fn load_catalog(&self) -> Result<(usize, usize), CatalogError> {
        match self.fetch_catalog().await {
            Ok((cards, trivia)) => {
                let counts = (cards.len(), trivia.len());
                {
                    let mut app = self.app.borrow_mut();
                    app.cards = cards;
                    app.trivia = trivia;
                }
                log::info!("{} cards loaded, {} trivia lines", counts.0, counts.1);
                self.events.emit(HostEvent::CardsLoaded {
                    cards: counts.0,
                    trivia: counts.1,
                });
                Ok(counts)
            }
            Err(e) => {
                log::error!("Failed to load card data: {}", e);
                self.surface
                    .show_notice("エラー", &format!("データ読み込みエラー: {}", e));
                Err(e)
            }
        }
    }

    async fn fetch_catalog(&self) -> Result<(Vec<Card>, Vec<String>), CatalogError> {
        let cards_path = &self.config.cards_path;
        let cards = parse_cards(cards_path, &self.fetcher.fetch_text(cards_path).await?)?;
        let trivia_path = &self.config.trivia_path;
        let trivia = parse_trivia(trivia_path, &self.fetcher.fetch_text(trivia_path).await?)?;
        Ok((cards, trivia))
    }

    /// Show a random speech bubble, if there is anything to say
    pub fn chatter(&self) -> Option<ChatterLine> {
        let line = {
            let app = self.app.borrow();
            self.chatter.borrow_mut().pick(&app)
        }?;
        self.surface.show_chatter(&line);
        Some(line)
    }

    /// Replace the session and tell sections about it
    pub fn set_session(&self, session: Session) {
        self.app.borrow_mut().session = session;
        self.events.emit(HostEvent::LoginStateChanged);
    }

    /// Persist the active id, move the active designation, decide what loads
    fn activate(&self, id: &SectionId) -> Plan<S::Container> {
        {
            let mut state = self.state.borrow_mut();
            state.active_section = id.to_string();
            if let Err(e) = state.save_active(self.store.as_ref()) {
                log::warn!("Could not persist active section: {}", e);
            }
        }

        self.surface.mark_nav(id);

        let plan = {
            let mut registry = self.registry.borrow_mut();
            registry.ensure(id, || self.surface.create_container(id));
            for (container, active) in registry.set_active(id) {
                self.surface.set_active(&container, active);
            }
            match registry.get_mut(id) {
                Some(record) if record.phase.needs_fetch() => {
                    record.phase = SectionPhase::MarkupLoading;
                    record.fetches += 1;
                    Plan::Fetch(record.container.clone())
                }
                Some(record) if record.phase == SectionPhase::MarkupLoading => Plan::Wait,
                Some(_) => Plan::Refresh,
                None => Plan::Wait,
            }
        };

        self.notify_state();
        plan
    }

    async fn load(&self, id: &SectionId, container: S::Container) -> LoadOutcome {
        let path = self.config.markup_path(id);
        match self.fetcher.fetch_text(&path).await {
            Ok(html) => {
                self.surface.set_markup(&container, &html);
                self.set_phase(id, SectionPhase::BehaviorLoading);
                self.run_behavior(id);
                LoadOutcome::Loaded
            }
            Err(e) => {
                log::error!("Error loading section {}: {}", id, e);
                self.surface.set_markup(&container, &error_markup(&e));
                self.set_phase(
                    id,
                    SectionPhase::Failed {
                        reason: e.to_string(),
                    },
                );
                LoadOutcome::Failed(e)
            }
        }
    }

    /// Tear down the previous run's listeners and run the initializer, if any
    fn run_behavior(&self, id: &SectionId) {
        let previous = self
            .registry
            .borrow_mut()
            .get_mut(id)
            .map(|r| std::mem::take(&mut r.subscriptions));
        drop(previous);

        match self.behaviors.resolve(id) {
            Ok(init) => {
                let mut cx = InitContext::new(id, &self.app, &self.events, self.store.clone());
                let result = init(&mut cx);
                let subscriptions = cx.into_subscriptions();
                match result {
                    Ok(()) => log::debug!("Section {} initialized", id),
                    Err(e) => log::error!("{}", e),
                }
                if let Some(record) = self.registry.borrow_mut().get_mut(id) {
                    record.subscriptions = subscriptions;
                    record.inits += 1;
                }
            }
            Err(e) if e.is_missing() => log::debug!("No behavior for section {}", id),
            Err(e) => log::error!("Error loading behavior for {}: {}", id, e),
        }

        if let Some(record) = self.registry.borrow_mut().get_mut(id) {
            if record.phase == SectionPhase::BehaviorLoading {
                record.phase = SectionPhase::Loaded;
            }
        }
    }

    fn set_phase(&self, id: &SectionId, phase: SectionPhase) {
        if let Some(record) = self.registry.borrow_mut().get_mut(id) {
            record.phase = phase;
        }
    }

    fn notify_state(&self) {
        let snapshot = self.state.borrow().clone();
        self.events.emit(HostEvent::StateChanged(snapshot));
    }
}

fn error_markup(error: &FetchError) -> String {
    format!(
        "<p style=\"color: red;\">{}</p><p class=\"tcg-section-error-detail\">{}</p>",
        SECTION_LOAD_FAILED,
        escape_html(&error.to_string())
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{KEY_ACTIVE_SECTION, KEY_BIRD_POSITION, KEY_SIDEBAR_OPEN, KEY_THEME};
    use crate::error::BehaviorError;
    use crate::persistence::MemoryStore;
    use crate::platform::mock::{RecordingSurface, StubFetcher};
    use futures::executor::{LocalPool, block_on};
    use futures::task::LocalSpawnExt;
    use proptest::prelude::*;
    use std::cell::Cell;

    type TestHost = SectionHost<RecordingSurface, StubFetcher, MemoryStore>;

    const SECTIONS: [&str; 4] = ["home", "search", "memo", "options"];

    fn path(id: &str) -> String {
        format!("./html/sections/{}.html", id)
    }

    fn fetcher_with_all() -> StubFetcher {
        SECTIONS.iter().fold(StubFetcher::new(), |f, id| {
            f.respond(&path(id), &format!("<h2>{}</h2>", id))
        })
    }

    fn host_with(fetcher: StubFetcher, store: MemoryStore, behaviors: BehaviorRegistry) -> TestHost {
        SectionHost::new(
            RecordingSurface::default(),
            fetcher,
            store,
            HostConfig::default(),
            behaviors,
        )
    }

    fn host() -> TestHost {
        host_with(fetcher_with_all(), MemoryStore::new(), BehaviorRegistry::new())
    }

    fn counting_behavior(id: &str) -> (BehaviorRegistry, Rc<Cell<u32>>) {
        let runs = Rc::new(Cell::new(0));
        let mut behaviors = BehaviorRegistry::new();
        let counter = runs.clone();
        behaviors.register(SectionId::new(id).unwrap(), move |_| {
            counter.set(counter.get() + 1);
            Ok(())
        });
        (behaviors, runs)
    }

    #[test]
    fn test_first_show_loads_markup_and_initializes() {
        let (behaviors, runs) = counting_behavior("search");
        let host = host_with(fetcher_with_all(), MemoryStore::new(), behaviors);

        assert_eq!(block_on(host.show_section("search")), LoadOutcome::Loaded);
        assert_eq!(host.surface().markup_of("search").as_deref(), Some("<h2>search</h2>"));
        assert!(host.surface().is_active("search"));
        assert_eq!(host.surface().nav.borrow().as_deref(), Some("search"));
        assert_eq!(host.section_phase("search"), Some(SectionPhase::Loaded));
        assert_eq!(runs.get(), 1);
        assert_eq!(host.store().get(KEY_ACTIVE_SECTION).as_deref(), Some("search"));
    }

    #[test]
    fn test_redisplay_reinitializes_without_refetch() {
        let (behaviors, runs) = counting_behavior("search");
        let host = host_with(fetcher_with_all(), MemoryStore::new(), behaviors);

        block_on(host.show_section("search"));
        block_on(host.show_section("home"));
        assert_eq!(block_on(host.show_section("search")), LoadOutcome::Refreshed);
        assert_eq!(block_on(host.show_section("search")), LoadOutcome::Refreshed);

        assert_eq!(host.fetcher.calls_to(&path("search")), 1);
        assert_eq!(runs.get(), 3);
        assert_eq!(host.section_counts("search"), Some((1, 3)));
        assert_eq!(host.surface().container_count(), 2);
    }

    #[test]
    fn test_missing_behavior_is_skipped() {
        let host = host();
        assert_eq!(block_on(host.show_section("memo")), LoadOutcome::Loaded);
        assert_eq!(host.section_phase("memo"), Some(SectionPhase::Loaded));
        assert_eq!(host.section_counts("memo"), Some((1, 0)));
    }

    #[test]
    fn test_failing_initializer_keeps_markup() {
        let mut behaviors = BehaviorRegistry::new();
        behaviors.register(SectionId::new("home").unwrap(), |cx| Err(cx.fail("boom")));
        let host = host_with(fetcher_with_all(), MemoryStore::new(), behaviors);

        assert_eq!(block_on(host.show_section("home")), LoadOutcome::Loaded);
        assert_eq!(host.surface().markup_of("home").as_deref(), Some("<h2>home</h2>"));
        assert_eq!(host.section_phase("home"), Some(SectionPhase::Loaded));
    }

    #[test]
    fn test_fetch_failure_shows_inline_error() {
        let error = FetchError::Network("offline".to_string());
        let fetcher = StubFetcher::new().fail(&path("memo"), error.clone());
        let (behaviors, runs) = counting_behavior("memo");
        let host = host_with(fetcher, MemoryStore::new(), behaviors);

        assert_eq!(block_on(host.show_section("memo")), LoadOutcome::Failed(error));
        let markup = host.surface().markup_of("memo").unwrap();
        assert!(markup.contains(SECTION_LOAD_FAILED));
        assert!(markup.contains("network error: offline"));
        // Active with the error visible
        assert!(host.surface().is_active("memo"));
        assert!(matches!(host.section_phase("memo"), Some(SectionPhase::Failed { .. })));
        assert_eq!(runs.get(), 0);
    }

    #[test]
    fn test_failed_section_retries_on_next_show() {
        let host = host();
        assert!(matches!(
            block_on(host.show_section("battleRecord")),
            LoadOutcome::Failed(FetchError::Status { status: 404, .. })
        ));
        assert!(matches!(
            block_on(host.show_section("battleRecord")),
            LoadOutcome::Failed(_)
        ));
        assert_eq!(host.fetcher.calls_to(&path("battleRecord")), 2);
    }

    #[test]
    fn test_empty_id_ignored() {
        let host = host();
        assert_eq!(block_on(host.show_section("  ")), LoadOutcome::Ignored);
        assert_eq!(host.fetcher.total_calls(), 0);
        assert_eq!(host.surface().container_count(), 0);
    }

    #[test]
    fn test_concurrent_show_fetches_once() {
        let fetcher = StubFetcher::new().gate(&path("search"));
        let (behaviors, runs) = counting_behavior("search");
        let host = Rc::new(host_with(fetcher, MemoryStore::new(), behaviors));
        let mut pool = LocalPool::new();
        let spawner = pool.spawner();

        let outcomes = Rc::new(RefCell::new(Vec::new()));
        for _ in 0..2 {
            let host = host.clone();
            let outcomes = outcomes.clone();
            spawner
                .spawn_local(async move {
                    let outcome = host.show_section("search").await;
                    outcomes.borrow_mut().push(outcome);
                })
                .unwrap();
        }
        pool.run_until_stalled();
        assert_eq!(host.fetcher.calls_to(&path("search")), 1);
        assert_eq!(*outcomes.borrow(), vec![LoadOutcome::Pending]);
        assert_eq!(host.section_phase("search"), Some(SectionPhase::MarkupLoading));

        assert!(host.fetcher.release(&path("search"), Ok("<p>results</p>".into())));
        pool.run_until_stalled();
        assert_eq!(*outcomes.borrow(), vec![LoadOutcome::Pending, LoadOutcome::Loaded]);
        assert_eq!(runs.get(), 1);
        assert_eq!(host.surface().markup_of("search").as_deref(), Some("<p>results</p>"));
    }

    #[test]
    fn test_late_fetch_does_not_steal_active() {
        let fetcher = fetcher_with_all().gate(&path("memo"));
        let host = Rc::new(host_with(fetcher, MemoryStore::new(), BehaviorRegistry::new()));
        let mut pool = LocalPool::new();
        {
            let host = host.clone();
            pool.spawner()
                .spawn_local(async move {
                    host.show_section("memo").await;
                })
                .unwrap();
        }
        pool.run_until_stalled();
        assert!(host.surface().is_active("memo"));

        block_on(host.show_section("home"));
        assert!(host.fetcher.release(&path("memo"), Ok("<p>memo</p>".into())));
        pool.run_until_stalled();

        assert_eq!(host.surface().markup_of("memo").as_deref(), Some("<p>memo</p>"));
        assert_eq!(host.surface().active_ids(), vec!["home".to_string()]);
        assert_eq!(host.active_section_id(), SectionId::new("home"));
    }

    #[test]
    fn test_reinit_tears_down_previous_listeners() {
        let mut behaviors = BehaviorRegistry::new();
        behaviors.register(SectionId::new("home").unwrap(), |cx| {
            cx.subscribe(|_| {});
            Ok(())
        });
        let host = host_with(fetcher_with_all(), MemoryStore::new(), behaviors);

        for _ in 0..3 {
            block_on(host.show_section("home"));
        }
        assert_eq!(host.events().listener_count(), 1);
    }

    #[test]
    fn test_toggle_flips_and_persists() {
        let host = host();
        assert!(block_on(host.toggle_sidebar(None, false)));
        assert!(host.surface().panel_open.get());
        assert_eq!(host.store().get(KEY_SIDEBAR_OPEN).as_deref(), Some("true"));
        // Opening shows the default section
        assert!(host.surface().is_active("home"));

        assert!(!block_on(host.toggle_sidebar(None, false)));
        assert!(!host.surface().panel_open.get());
        assert_eq!(host.store().get(KEY_SIDEBAR_OPEN).as_deref(), Some("false"));
        // Closing leaves the section designation alone
        assert!(host.surface().is_active("home"));
        assert_eq!(host.fetcher.total_calls(), 1);
    }

    #[test]
    fn test_force_open_stays_open() {
        let host = host();
        assert!(block_on(host.toggle_sidebar(Some("memo"), true)));
        assert!(block_on(host.toggle_sidebar(Some("search"), true)));
        assert!(host.is_open());
        assert_eq!(host.ui_state().active_section, "search");
    }

    #[test]
    fn test_blank_id_opens_last_active_section() {
        let host = host();
        assert!(block_on(host.toggle_sidebar(Some(""), true)));
        assert_eq!(host.surface().active_ids(), vec!["home".to_string()]);
        assert_eq!(host.fetcher.calls_to(&path("home")), 1);

        block_on(host.show_section("memo"));
        block_on(host.toggle_sidebar(None, false));
        assert!(block_on(host.toggle_sidebar(Some("  "), false)));
        assert_eq!(host.surface().active_ids(), vec!["memo".to_string()]);
    }

    #[test]
    fn test_nav_click_policy() {
        let host = host();
        assert!(block_on(host.nav_clicked("memo")));
        assert!(host.surface().is_active("memo"));
        // Same icon again closes
        assert!(!block_on(host.nav_clicked("memo")));
        // Closed: any icon opens on it
        assert!(block_on(host.nav_clicked("memo")));
        assert!(block_on(host.nav_clicked("search")));
        assert!(host.surface().is_active("search"));
        assert!(host.is_open());
    }

    #[test]
    fn test_restore_open_search() {
        let store = MemoryStore::with_items([
            (KEY_SIDEBAR_OPEN, "true"),
            (KEY_ACTIVE_SECTION, "search"),
            (KEY_BIRD_POSITION, r#"{"top":"300px","left":"20px"}"#),
            (KEY_THEME, "dark"),
        ]);
        let host = host_with(fetcher_with_all(), store, BehaviorRegistry::new());
        block_on(host.restore());

        assert!(host.is_open());
        assert!(host.surface().panel_open.get());
        assert_eq!(host.surface().active_ids(), vec!["search".to_string()]);
        assert_eq!(host.surface().widget.get(), Some(WidgetPosition::new(300.0, 20.0)));
        assert_eq!(host.surface().theme.get(), Some(Theme::Dark));
    }

    #[test]
    fn test_restore_closed_only_marks_nav() {
        let store = MemoryStore::with_items([(KEY_ACTIVE_SECTION, "memo")]);
        let host = host_with(fetcher_with_all(), store, BehaviorRegistry::new());
        block_on(host.restore());

        assert!(!host.is_open());
        assert_eq!(host.surface().nav.borrow().as_deref(), Some("memo"));
        assert_eq!(host.surface().container_count(), 0);
        assert_eq!(host.fetcher.total_calls(), 0);
        assert_eq!(host.surface().theme.get(), Some(Theme::Default));
    }

    #[test]
    fn test_state_changed_notifications() {
        let host = host();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let _sub = {
            let seen = seen.clone();
            host.events().subscribe(move |event| {
                if let HostEvent::StateChanged(state) = event {
                    seen.borrow_mut().push(state.clone());
                }
            })
        };
        block_on(host.toggle_sidebar(Some("memo"), true));

        let seen = seen.borrow();
        assert!(seen.iter().any(|s| s.is_open));
        assert_eq!(seen.last().unwrap().active_section, "memo");
    }

    #[test]
    fn test_messages() {
        let host = host();
        block_on(host.handle_raw_message(r#"{"type":"SHOW_SECTION","section":"memo"}"#)).unwrap();
        // Not forced: content loads, panel stays closed
        assert!(host.surface().is_active("memo"));
        assert!(!host.is_open());

        block_on(host.handle_raw_message(
            r#"{"type":"SHOW_SECTION","section":"search","forceOpenSidebar":true}"#,
        ))
        .unwrap();
        assert!(host.is_open());
        assert!(host.surface().is_active("search"));

        block_on(host.handle_raw_message(r#"{"type":"APPLY_THEME","theme":"dark"}"#)).unwrap();
        assert_eq!(host.surface().theme.get(), Some(Theme::Dark));

        assert!(block_on(host.handle_raw_message(r#"{"type":"NOPE"}"#)).is_err());
        assert_eq!(host.surface().active_ids(), vec!["search".to_string()]);
    }

    #[test]
    fn test_widget_release_persists_final_position() {
        use crate::widget::{DragController, Size};

        let host = host();
        let mut drag = DragController::new();
        drag.press(1200.0, 650.0, 1180.0, 620.0);
        drag.drag_to(400.0, 250.0, Size::new(1280.0, 720.0), Size::new(80.0, 80.0));
        let position = drag.release().unwrap();
        host.save_widget_position(&position).unwrap();

        assert_eq!(
            WidgetPosition::load(host.store()),
            Some(WidgetPosition::new(220.0, 380.0))
        );
    }

    #[test]
    fn test_load_catalog_and_chatter() {
        let fetcher = StubFetcher::new()
            .respond(
                "./json/cards.json",
                r#"[{"name":"炎竜","image_filename":"dragon","info":["このカードの世界観は、「火山の奥深くで眠り続ける古の竜」です。"]}]"#,
            )
            .respond("./json/trivia.json", r#"["豆知識"]"#);
        let host = host_with(fetcher, MemoryStore::new(), BehaviorRegistry::new())
            .with_chatter_seed(9);

        let loaded = Rc::new(Cell::new(false));
        let _sub = {
            let loaded = loaded.clone();
            host.events().subscribe(move |event| {
                if matches!(event, HostEvent::CardsLoaded { cards: 1, trivia: 1 }) {
                    loaded.set(true);
                }
            })
        };
        assert_eq!(block_on(host.load_catalog()).unwrap(), (1, 1));
        assert!(loaded.get());

        let line = host.chatter().unwrap();
        assert!(line.html == "豆知識" || line.answer.as_deref() == Some("炎竜"));
        assert_eq!(host.surface().chatter.borrow().len(), 1);
    }

    #[test]
    fn test_load_catalog_failure_shows_notice() {
        let host = host();
        assert!(matches!(
            block_on(host.load_catalog()),
            Err(CatalogError::Fetch(FetchError::Status { status: 404, .. }))
        ));
        let notices = host.surface().notices.borrow();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].1.starts_with("データ読み込みエラー"));
        assert!(host.chatter().is_none());
    }

    #[test]
    fn test_set_session_notifies() {
        let host = host();
        let hits = Rc::new(Cell::new(0));
        let _sub = {
            let hits = hits.clone();
            host.events().subscribe(move |event| {
                if *event == HostEvent::LoginStateChanged {
                    hits.set(hits.get() + 1);
                }
            })
        };
        host.set_session(Session::logged_in("u1", "alice", 1600));
        assert_eq!(hits.get(), 1);
        assert_eq!(host.app().borrow().session.user(), Some("alice"));
    }

    #[test]
    fn test_behavior_error_variant_for_unregistered() {
        let host = host();
        let id = SectionId::new("minigames").unwrap();
        assert!(matches!(
            host.behaviors.resolve(&id),
            Err(BehaviorError::NotRegistered(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_exactly_one_active(ops in prop::collection::vec((0usize..6, any::<bool>()), 1..40)) {
            // Indices past SECTIONS hit sections whose markup 404s
            let host = host();
            for (index, via_toggle) in ops {
                let id = ["home", "search", "memo", "options", "rateMatch", "minigames"][index];
                if via_toggle {
                    block_on(host.nav_clicked(id));
                } else {
                    block_on(host.show_section(id));
                }
                prop_assert!(host.surface().active_ids().len() == 1);
                prop_assert_eq!(host.active_section_count(), 1);
            }
            let ids = host.surface().active_ids();
            let state = host.ui_state();
            prop_assert_eq!(ids[0].as_str(), state.active_section.as_str());
        }
    }
}
