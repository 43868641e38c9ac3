//! Application State and Logic
//!
//! This module defines the core application state and event handling for the
//! catalog admin client. It manages:
//!
//! - Routing between the login screen and the catalog area
//! - Tab navigation and mounting/unmounting of the list views
//! - Spawning repository calls and applying their completions
//! - Translating key presses into list, editor and login actions
//!
//! The `App` struct is the central state container, and `run_app` is the
//! main event loop. Every store call runs in its own task and reports back
//! on a channel the loop drains, so state is only ever mutated here.

use super::editor::SaveBlocked;
use super::list::ListView;
use super::login::{LoginForm, LoginMode, LOGIN_FAILED};
use super::notice::Notice;
use crate::api::{AuthClient, HttpStore};
use crate::catalog::{
    CatalogEntity, CatalogError, CatalogStore, Catalog, Category, EntityId, EntityKind,
    MemoryStore, Product, RefreshSignal, Subcategory,
};
use crate::config::Settings;
use crate::session::{Route, Session};
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::future::Future;
use std::io::Stdout;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

pub type AppResult<T> = Result<T>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    Categories,
    Subcategories,
    Products,
}

impl View {
    pub fn all() -> Vec<View> {
        vec![
            View::Home,
            View::Categories,
            View::Subcategories,
            View::Products,
        ]
    }

    pub fn title(&self) -> &'static str {
        match self {
            View::Home => "Home",
            View::Categories => "Category",
            View::Subcategories => "Subcategory",
            View::Products => "Products",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Catalog,
}

/// Where catalog data and credentials come from.
#[derive(Clone)]
pub enum Backend {
    Http { server: String, auth: AuthClient },
    Demo(Arc<MemoryStore>),
}

impl Backend {
    pub fn http(server: &str) -> Result<Self> {
        Ok(Backend::Http {
            server: server.to_string(),
            auth: AuthClient::new(server)?,
        })
    }

    pub fn demo() -> Self {
        Backend::Demo(Arc::new(MemoryStore::seeded()))
    }

    pub fn is_demo(&self) -> bool {
        matches!(self, Backend::Demo(_))
    }

    fn store(&self, token: Option<&str>) -> Result<Arc<dyn CatalogStore>> {
        match self {
            Backend::Http { server, .. } => {
                Ok(Arc::new(HttpStore::new(server, token.map(str::to_string))?))
            }
            Backend::Demo(store) => Ok(store.clone()),
        }
    }

    /// Demo mode accepts any credentials.
    async fn login(&self, username: &str, password: &str) -> Result<String> {
        match self {
            Backend::Http { auth, .. } => auth.login(username, password).await,
            Backend::Demo(_) => Ok(format!("demo-{}", username)),
        }
    }

    async fn register(&self, username: &str, password: &str) -> Result<()> {
        match self {
            Backend::Http { auth, .. } => auth.register(username, password).await,
            Backend::Demo(_) => Ok(()),
        }
    }
}

/// Result of a spawned call, handed back to the event loop.
pub enum Completion {
    Categories(Result<Vec<Category>, CatalogError>),
    Subcategories(Result<Vec<Subcategory>, CatalogError>),
    Products(Result<Vec<Product>, CatalogError>),
    Saved {
        kind: EntityKind,
        generation: u64,
        result: Result<(), CatalogError>,
    },
    Deleted {
        kind: EntityKind,
        result: Result<(), CatalogError>,
    },
    EditorCategories {
        kind: EntityKind,
        result: Result<Vec<Category>, CatalogError>,
    },
    EditorSubcategories {
        kind: EntityKind,
        category: EntityId,
        result: Result<Vec<Subcategory>, CatalogError>,
    },
    LoggedIn(Result<String>),
    Registered(Result<()>),
}

/// Spawns calls whose completions are tagged with the route generation
/// they were issued under, so results from before a logout are dropped.
#[derive(Clone)]
struct Spawner {
    tx: mpsc::UnboundedSender<(u64, Completion)>,
    generation: u64,
}

impl Spawner {
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = Completion> + Send + 'static,
    {
        let tx = self.tx.clone();
        let generation = self.generation;
        tokio::spawn(async move {
            let _ = tx.send((generation, fut.await));
        });
    }
}

/// The authenticated area: one catalog and a list view per tab.
pub struct Workspace {
    catalog: Catalog,
    pub categories: ListView<Category>,
    pub subcategories: ListView<Subcategory>,
    pub products: ListView<Product>,
}

impl Workspace {
    fn new(store: Arc<dyn CatalogStore>) -> Self {
        let catalog = Catalog::new(store, RefreshSignal::new());
        Workspace {
            categories: ListView::new(catalog.repository()),
            subcategories: ListView::new(catalog.repository()),
            products: ListView::new(catalog.repository()),
            catalog,
        }
    }

    fn mount(&mut self, view: View) {
        match view {
            View::Home => {}
            View::Categories => self.categories.mount(),
            View::Subcategories => self.subcategories.mount(),
            View::Products => self.products.mount(),
        }
    }

    fn unmount(&mut self, view: View) {
        match view {
            View::Home => {}
            View::Categories => self.categories.unmount(),
            View::Subcategories => self.subcategories.unmount(),
            View::Products => self.products.unmount(),
        }
    }

    fn editor_mut(&mut self, kind: EntityKind) -> Option<&mut super::editor::Editor> {
        match kind {
            EntityKind::Category => self.categories.editor_mut(),
            EntityKind::Subcategory => self.subcategories.editor_mut(),
            EntityKind::Product => self.products.editor_mut(),
        }
    }

    pub fn notice(&self, view: View) -> Option<&Notice> {
        match view {
            View::Home => None,
            View::Categories => self.categories.notice(),
            View::Subcategories => self.subcategories.notice(),
            View::Products => self.products.notice(),
        }
    }
}

pub struct App {
    settings: Settings,
    session: Session,
    backend: Backend,
    spawner: Spawner,
    rx: mpsc::UnboundedReceiver<(u64, Completion)>,

    pub screen: Screen,
    pub current_view: View,
    pub workspace: Option<Workspace>,
    pub login: LoginForm,
    notice: Option<Notice>,
    pub running: bool,
}

impl App {
    pub fn new(settings: Settings, session: Session, backend: Backend) -> Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut app = App {
            settings,
            session,
            backend,
            spawner: Spawner { tx, generation: 0 },
            rx,
            screen: Screen::Login,
            current_view: View::Home,
            workspace: None,
            login: LoginForm::default(),
            notice: None,
            running: true,
        };
        app.enter_route()?;
        Ok(app)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_demo(&self) -> bool {
        self.backend.is_demo()
    }

    /// Decide the area from the session token, once, and rebuild the
    /// catalog for it.
    fn enter_route(&mut self) -> Result<()> {
        self.spawner.generation += 1;
        self.current_view = View::Home;
        match self.session.route() {
            Route::Login => {
                self.workspace = None;
                self.screen = Screen::Login;
            }
            Route::Catalog => {
                let store = self.backend.store(self.session.current_token())?;
                self.workspace = Some(Workspace::new(store));
                self.screen = Screen::Catalog;
            }
        }
        tracing::debug!(screen = ?self.screen, "route entered");
        Ok(())
    }

    fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    /// The newest notice between the app's own and the current tab's.
    pub fn notice(&self) -> Option<&Notice> {
        let tab = self
            .workspace
            .as_ref()
            .and_then(|ws| ws.notice(self.current_view));
        match (self.notice.as_ref(), tab) {
            (Some(a), Some(b)) => Some(if b.at >= a.at { b } else { a }),
            (a, b) => a.or(b),
        }
    }

    // Navigation

    fn switch_view(&mut self, view: View) {
        if view == self.current_view {
            return;
        }
        if let Some(ws) = self.workspace.as_mut() {
            ws.unmount(self.current_view);
            ws.mount(view);
        }
        self.current_view = view;
    }

    pub fn next_view(&mut self) {
        let views = View::all();
        let idx = views
            .iter()
            .position(|v| *v == self.current_view)
            .unwrap_or(0);
        self.switch_view(views[(idx + 1) % views.len()]);
    }

    pub fn prev_view(&mut self) {
        let views = View::all();
        let idx = views
            .iter()
            .position(|v| *v == self.current_view)
            .unwrap_or(0);
        self.switch_view(views[(idx + views.len() - 1) % views.len()]);
    }

    pub fn goto_view(&mut self, index: usize) {
        let views = View::all();
        if index < views.len() {
            self.switch_view(views[index]);
        }
    }

    pub fn logout(&mut self) {
        if let Err(e) = self.session.set_token(None) {
            tracing::warn!(error = %e, "failed to forget session token");
        }
        if let Err(e) = self.enter_route() {
            tracing::warn!(error = %e, "failed to enter login route");
        }
        tracing::info!("logged out");
    }

    // Background work

    /// Start whatever fetches the mounted views and open editors are due.
    pub fn tick(&mut self) {
        let Some(ws) = self.workspace.as_mut() else {
            return;
        };
        pump(&mut ws.categories, &ws.catalog, &self.spawner, Completion::Categories);
        pump(&mut ws.subcategories, &ws.catalog, &self.spawner, Completion::Subcategories);
        pump(&mut ws.products, &ws.catalog, &self.spawner, Completion::Products);
    }

    pub fn drain(&mut self) {
        while let Ok((generation, completion)) = self.rx.try_recv() {
            self.apply(generation, completion);
        }
    }

    fn apply(&mut self, generation: u64, completion: Completion) {
        if generation != self.spawner.generation {
            tracing::debug!("dropping completion from a previous session");
            return;
        }
        match completion {
            Completion::LoggedIn(result) => self.finish_login(result),
            Completion::Registered(result) => match result {
                Ok(()) => {
                    tracing::info!("registered");
                    self.login.finish_register();
                }
                Err(e) => {
                    tracing::warn!(error = %e, "registration failed");
                    self.login.fail(format!("Registration failed: {}", e));
                }
            },
            other => {
                let Some(ws) = self.workspace.as_mut() else {
                    return;
                };
                apply_catalog(ws, other);
            }
        }
    }

    fn finish_login(&mut self, result: Result<String>) {
        let token = match result {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "login failed");
                self.login.fail(LOGIN_FAILED);
                return;
            }
        };
        if let Err(e) = self.session.set_token(Some(token)) {
            tracing::warn!(error = %e, "failed to remember session token");
            self.set_notice(Notice::error(format!("Session not saved: {}", e)));
        }
        self.login.succeeded();
        if let Err(e) = self.enter_route() {
            tracing::warn!(error = %e, "failed to enter catalog");
            self.set_notice(Notice::error(e.to_string()));
            return;
        }
        tracing::info!("logged in");
    }

    // Input

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.running = false;
            return;
        }
        match self.screen {
            Screen::Login => self.handle_login_key(key),
            Screen::Catalog => self.handle_catalog_key(key),
        }
    }

    fn handle_login_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.running = false,
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.login.next_field()
            }
            KeyCode::F(2) => self.login.toggle_mode(),
            KeyCode::Enter => {
                let Some(creds) = self.login.begin_submit() else {
                    return;
                };
                let backend = self.backend.clone();
                self.spawner.spawn(async move {
                    match creds.mode {
                        LoginMode::Login => Completion::LoggedIn(
                            backend.login(&creds.username, &creds.password).await,
                        ),
                        LoginMode::Register => Completion::Registered(
                            backend.register(&creds.username, &creds.password).await,
                        ),
                    }
                });
            }
            KeyCode::Char(c) => self.login.input_char(c),
            KeyCode::Backspace => self.login.backspace(),
            _ => {}
        }
    }

    fn handle_catalog_key(&mut self, key: KeyEvent) {
        let consumed = match self.workspace.as_mut() {
            Some(ws) => match self.current_view {
                View::Home => false,
                View::Categories => handle_list_key(&mut ws.categories, &ws.catalog, &self.spawner, key),
                View::Subcategories => {
                    handle_list_key(&mut ws.subcategories, &ws.catalog, &self.spawner, key)
                }
                View::Products => handle_list_key(&mut ws.products, &ws.catalog, &self.spawner, key),
            },
            None => false,
        };
        if consumed {
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Tab | KeyCode::Right => self.next_view(),
            KeyCode::BackTab | KeyCode::Left => self.prev_view(),
            KeyCode::Char('1') => self.goto_view(0),
            KeyCode::Char('2') => self.goto_view(1),
            KeyCode::Char('3') => self.goto_view(2),
            KeyCode::Char('4') => self.goto_view(3),
            KeyCode::Char('L') => self.logout(),
            _ => {}
        }
    }
}

fn pump<E: CatalogEntity>(
    view: &mut ListView<E>,
    catalog: &Catalog,
    spawner: &Spawner,
    wrap: fn(Result<Vec<E>, CatalogError>) -> Completion,
) {
    if let Some(repo) = view.poll_refresh() {
        spawner.spawn(async move { wrap(repo.list().await) });
    }

    let Some(editor) = view.editor_mut() else {
        return;
    };
    let kind = editor.kind();
    if editor.needs_categories() {
        let catalog = catalog.clone();
        spawner.spawn(async move {
            Completion::EditorCategories {
                kind,
                result: catalog.list::<Category>(None).await,
            }
        });
    }
    if let Some(category) = editor.pending_subcategory_fetch() {
        let catalog = catalog.clone();
        spawner.spawn(async move {
            let result = catalog.list::<Subcategory>(Some(&category)).await;
            Completion::EditorSubcategories {
                kind,
                category,
                result,
            }
        });
    }
}

fn apply_catalog(ws: &mut Workspace, completion: Completion) {
    match completion {
        Completion::Categories(result) => ws.categories.apply_listing(result),
        Completion::Subcategories(result) => ws.subcategories.apply_listing(result),
        Completion::Products(result) => ws.products.apply_listing(result),
        Completion::Saved {
            kind,
            generation,
            result,
        } => match kind {
            EntityKind::Category => ws.categories.finish_save(generation, result),
            EntityKind::Subcategory => ws.subcategories.finish_save(generation, result),
            EntityKind::Product => ws.products.finish_save(generation, result),
        },
        Completion::Deleted { kind, result } => match kind {
            EntityKind::Category => ws.categories.finish_delete(result),
            EntityKind::Subcategory => ws.subcategories.finish_delete(result),
            EntityKind::Product => ws.products.finish_delete(result),
        },
        Completion::EditorCategories { kind, result } => {
            if let Some(editor) = ws.editor_mut(kind) {
                editor.apply_categories(result);
            }
        }
        Completion::EditorSubcategories {
            kind,
            category,
            result,
        } => {
            if let Some(editor) = ws.editor_mut(kind) {
                editor.apply_subcategories(&category, result);
            }
        }
        Completion::LoggedIn(_) | Completion::Registered(_) => {}
    }
}

/// Keys for one list tab. Returns false when the key is left for the
/// app-level bindings.
fn handle_list_key<E: CatalogEntity>(
    view: &mut ListView<E>,
    catalog: &Catalog,
    spawner: &Spawner,
    key: KeyEvent,
) -> bool {
    // Editor overlay
    if let Some(editor) = view.editor_mut() {
        match key.code {
            KeyCode::Esc => view.cancel_editor(),
            KeyCode::Tab | KeyCode::Down => editor.focus_next(),
            KeyCode::BackTab | KeyCode::Up => editor.focus_prev(),
            KeyCode::Left if !editor.focused().is_text() => editor.cycle(false),
            KeyCode::Right if !editor.focused().is_text() => editor.cycle(true),
            KeyCode::Char(' ') if !editor.focused().is_text() => editor.cycle(true),
            KeyCode::Enter => match view.begin_save() {
                Ok((generation, request)) => {
                    let catalog = catalog.clone();
                    spawner.spawn(async move {
                        Completion::Saved {
                            kind: E::KIND,
                            generation,
                            result: request.execute(&catalog).await,
                        }
                    });
                }
                Err(SaveBlocked::Invalid) => {
                    tracing::debug!(kind = E::KIND.path(), "save refused, form invalid")
                }
                Err(SaveBlocked::InFlight | SaveBlocked::Closed) => {}
            },
            KeyCode::Char(c) => editor.input_char(c),
            KeyCode::Backspace => editor.backspace(),
            _ => {}
        }
        return true;
    }

    // Delete confirmation
    if view.pending_delete().is_some() {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                if let Some(request) = view.confirm_delete() {
                    spawner.spawn(async move {
                        Completion::Deleted {
                            kind: E::KIND,
                            result: request.execute().await,
                        }
                    });
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => view.decline_delete(),
            _ => {}
        }
        return true;
    }

    // Search box
    if view.is_searching() {
        match key.code {
            KeyCode::Esc => view.clear_search(),
            KeyCode::Enter => view.stop_search(),
            KeyCode::Down => view.select_next(),
            KeyCode::Up => view.select_prev(),
            KeyCode::Char(c) => view.push_search(c),
            KeyCode::Backspace => view.pop_search(),
            _ => {}
        }
        return true;
    }

    match key.code {
        KeyCode::Char('/') => view.start_search(),
        KeyCode::Char('a') => view.open_create(),
        KeyCode::Char('e') | KeyCode::Enter => {
            view.open_edit();
        }
        KeyCode::Char('d') | KeyCode::Delete if !view.is_deleting() => view.request_delete(),
        KeyCode::Char('r') => view.request_reload(),
        KeyCode::Down | KeyCode::Char('j') => view.select_next(),
        KeyCode::Up | KeyCode::Char('k') => view.select_prev(),
        KeyCode::Home => view.select_first(),
        KeyCode::End => view.select_last(),
        KeyCode::Esc if !view.search().is_empty() => view.clear_search(),
        _ => return false,
    }
    true
}

pub async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    mut app: App,
) -> AppResult<()> {
    loop {
        app.tick();
        terminal.draw(|f| super::views::draw(f, &mut app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }
        app.drain();

        if !app.running {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FileConfig, Overrides};

    fn settings() -> Settings {
        let mut settings = Settings::resolve(FileConfig::default(), Overrides::default());
        settings.token_file = None;
        settings
    }

    fn demo_app(token: Option<&str>) -> App {
        let session = Session::restore(token.map(str::to_string), None);
        App::new(settings(), session, Backend::demo()).unwrap()
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App, text: &str) {
        text.chars().for_each(|c| press(app, KeyCode::Char(c)));
    }

    /// Run spawned work until nothing new arrives.
    async fn settle(app: &mut App) {
        loop {
            app.tick();
            match tokio::time::timeout(Duration::from_millis(200), app.rx.recv()).await {
                Ok(Some((generation, completion))) => app.apply(generation, completion),
                _ => break,
            }
        }
    }

    fn category_names(app: &App) -> Vec<String> {
        let ws = app.workspace.as_ref().unwrap();
        ws.categories.items().iter().map(|c| c.name.clone()).collect()
    }

    #[tokio::test]
    async fn token_decides_the_first_screen() {
        assert_eq!(demo_app(None).screen, Screen::Login);
        let app = demo_app(Some("t"));
        assert_eq!(app.screen, Screen::Catalog);
        assert_eq!(app.current_view, View::Home);
    }

    #[tokio::test]
    async fn login_enters_catalog_and_logout_leaves_it() {
        let mut app = demo_app(None);
        type_text(&mut app, "admin");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "pw");
        press(&mut app, KeyCode::Enter);
        settle(&mut app).await;

        assert_eq!(app.screen, Screen::Catalog);
        assert!(app.login.username.is_empty());

        type_text(&mut app, "L");
        assert_eq!(app.screen, Screen::Login);
        assert!(app.workspace.is_none());
    }

    #[tokio::test]
    async fn switching_tabs_mounts_and_unmounts() {
        let mut app = demo_app(Some("t"));
        press(&mut app, KeyCode::Right);
        assert_eq!(app.current_view, View::Categories);
        settle(&mut app).await;
        assert_eq!(category_names(&app), vec!["Shoes", "Hats"]);

        press(&mut app, KeyCode::Char('3'));
        settle(&mut app).await;
        let ws = app.workspace.as_ref().unwrap();
        assert!(!ws.categories.is_mounted());
        assert!(ws.categories.items().is_empty());
        assert_eq!(ws.subcategories.items().len(), 3);
    }

    #[tokio::test]
    async fn adding_a_category_from_the_keyboard() {
        let mut app = demo_app(Some("t"));
        press(&mut app, KeyCode::Char('2'));
        settle(&mut app).await;

        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "Bags");
        press(&mut app, KeyCode::Enter);
        settle(&mut app).await;

        let ws = app.workspace.as_ref().unwrap();
        assert!(ws.categories.editor().is_none());
        assert_eq!(category_names(&app), vec!["Shoes", "Hats", "Bags"]);
    }

    #[tokio::test]
    async fn declined_delete_keeps_the_row() {
        let mut app = demo_app(Some("t"));
        press(&mut app, KeyCode::Char('2'));
        settle(&mut app).await;

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('n'));
        settle(&mut app).await;
        assert_eq!(category_names(&app), vec!["Shoes", "Hats"]);

        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        settle(&mut app).await;
        assert_eq!(category_names(&app), vec!["Shoes"]);
    }

    #[tokio::test]
    async fn product_editor_loads_dependent_options() {
        let mut app = demo_app(Some("t"));
        press(&mut app, KeyCode::Char('4'));
        settle(&mut app).await;

        press(&mut app, KeyCode::Char('e'));
        settle(&mut app).await;

        let ws = app.workspace.as_ref().unwrap();
        let editor = ws.products.editor().unwrap();
        assert_eq!(editor.categories().len(), 2);
        assert_eq!(editor.subcategories().len(), 2);
        assert_eq!(editor.selected_subcategory(), Some(&EntityId::new("mem-3")));
    }

    #[tokio::test]
    async fn search_keys_stay_in_the_search_box() {
        let mut app = demo_app(Some("t"));
        press(&mut app, KeyCode::Char('2'));
        settle(&mut app).await;

        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "q");
        assert!(app.running);
        let ws = app.workspace.as_ref().unwrap();
        assert_eq!(ws.categories.search(), "q");
        assert!(ws.categories.visible().is_empty());
    }

    #[tokio::test]
    async fn escaping_a_running_save_does_not_allow_a_second_one() {
        let mut app = demo_app(Some("t"));
        press(&mut app, KeyCode::Char('2'));
        settle(&mut app).await;

        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "Bags");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "Belts");
        press(&mut app, KeyCode::Enter);
        settle(&mut app).await;

        assert_eq!(category_names(&app), vec!["Shoes", "Hats", "Bags"]);
        let ws = app.workspace.as_ref().unwrap();
        let editor = ws.categories.editor().unwrap();
        assert_eq!(editor.value(crate::ui::editor::Field::Name), "Belts");
    }
}
