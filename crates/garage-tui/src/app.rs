//! App — owns the components, the event loop, and action dispatch.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::future::Future;
use std::io;
use std::pin::Pin;
use std::rc::Rc;
use std::time::Duration;

use futures_util::stream::{FuturesUnordered, StreamExt};
use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame, Terminal,
};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use garage_proto::config::Config;
use garage_proto::model::GarageSnapshot;
use garage_proto::protocol::Command;

use crate::action::{Action, ComponentId};
use crate::bridge::{MessageBridge, Subscription};
use crate::component::Component;
use crate::components::{vehicle_detail::VehicleDetail, vehicle_list::VehicleList};
use crate::connection;
use crate::dispatch::{CommandDispatcher, DispatchError};
use crate::focus::FocusRing;
use crate::panel::Panel;
use crate::store::{GarageStore, ViewFilter};
use crate::theme::{style_muted, style_secondary, C_GARAGED, C_IMPOUNDED};
use crate::widgets::status_bar::{draw_filter_tabs, draw_key_hints};
use crate::widgets::toast::ToastManager;

/// Everything the background tasks report into the App loop.
#[derive(Debug)]
pub enum AppMessage {
    /// Terminal input from the blocking reader task.
    Event(Event),
    /// One decoded push envelope, discriminator still attached.
    HostPush(Value),
    Connected,
    Disconnected,
}

/// Lifecycle transitions queued by the bridge handlers and drained after
/// each dispatch, so handlers never need a mutable handle on the App.
enum PanelEvent {
    Open(GarageSnapshot),
    Close,
}

/// Outcome of one fire-and-forget command: a short label for toasts, whether
/// the App surfaces the result at all, and the result itself.
type PendingOutcome = (&'static str, bool, Result<Value, DispatchError>);
type PendingFuture = Pin<Box<dyn Future<Output = PendingOutcome>>>;

pub struct App {
    config: Config,
    bridge: MessageBridge,
    panel: Panel,
    store: Rc<RefCell<GarageStore>>,
    dispatcher: CommandDispatcher,

    vehicle_list: VehicleList,
    vehicle_detail: VehicleDetail,
    focus: FocusRing,
    toast: ToastManager,

    pending: FuturesUnordered<PendingFuture>,
    panel_events: Rc<RefCell<VecDeque<PanelEvent>>>,
    _open_sub: Subscription,
    _close_sub: Subscription,

    connected: bool,
    should_quit: bool,
}

impl App {
    pub fn new(config: Config) -> Self {
        let bridge = MessageBridge::new();
        let store = Rc::new(RefCell::new(GarageStore::new()));
        let panel = Panel::new(store.clone());
        let panel_events: Rc<RefCell<VecDeque<PanelEvent>>> =
            Rc::new(RefCell::new(VecDeque::new()));

        // The open/close subscriptions live for the whole App; only the
        // vehicle-delta subscription is tied to panel visibility.
        let open_events = panel_events.clone();
        let open_sub = bridge.subscribe("openUI", move |payload: Value| {
            match serde_json::from_value::<GarageSnapshot>(payload) {
                Ok(snap) => open_events.borrow_mut().push_back(PanelEvent::Open(snap)),
                Err(err) => warn!(%err, "malformed openUI push, ignoring"),
            }
        });
        let close_events = panel_events.clone();
        let close_sub = bridge.subscribe("closeUI", move |_| {
            close_events.borrow_mut().push_back(PanelEvent::Close);
        });

        let dispatcher = CommandDispatcher::new(
            config.host.command_base_url.clone(),
            config.simulation.enabled,
        );

        Self {
            config,
            bridge,
            panel,
            store,
            dispatcher,
            vehicle_list: VehicleList::new(),
            vehicle_detail: VehicleDetail::new(),
            focus: FocusRing::new(vec![ComponentId::VehicleList, ComponentId::VehicleDetail]),
            toast: ToastManager::new(),
            pending: FuturesUnordered::new(),
            panel_events,
            _open_sub: open_sub,
            _close_sub: close_sub,
            connected: false,
            should_quit: false,
        }
    }

    // ── Main run loop ─────────────────────────────────────────────────────────

    pub async fn run(mut self) -> anyhow::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let (tx, mut rx) = mpsc::channel::<AppMessage>(1024);

        // ── Background task: keyboard events ──────────────────────────────────
        let event_tx = tx.clone();
        tokio::task::spawn_blocking(move || loop {
            match event::read() {
                Ok(ev) => {
                    if event_tx.blocking_send(AppMessage::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        });

        // ── Background task: host push reader ─────────────────────────────────
        tokio::spawn(connection::run_reader(
            self.config.host.push_address.clone(),
            tx.clone(),
        ));

        let mut ui_tick = tokio::time::interval(Duration::from_millis(100));
        ui_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal.draw(|f| self.draw(f))?;
            }
            needs_redraw = false;

            if self.should_quit {
                break;
            }

            tokio::select! {
                Some(msg) = rx.recv() => {
                    needs_redraw = self.handle_message(msg);
                    // Drain whatever else is queued before redrawing.
                    while let Ok(next) = rx.try_recv() {
                        needs_redraw |= self.handle_message(next);
                    }
                }

                Some((label, surface, result)) = self.pending.next() => {
                    if surface {
                        match result {
                            Ok(_) => self.toast.success(format!("{} sent", label)),
                            Err(e) => self.toast.error(format!("{} failed: {}", label, e)),
                        }
                    } else if let Err(e) = result {
                        debug!(%label, %e, "background command failed");
                    }
                    needs_redraw = true;
                }

                _ = ui_tick.tick() => {
                    self.toast.tick();
                    let store = self.store.borrow();
                    let mut actions = Vec::new();
                    actions.extend(self.vehicle_list.tick(&store));
                    actions.extend(self.vehicle_detail.tick(&store));
                    drop(store);
                    for action in actions {
                        self.dispatch(action);
                    }
                    needs_redraw = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        Ok(())
    }

    // ── Message handling ──────────────────────────────────────────────────────

    fn handle_message(&mut self, msg: AppMessage) -> bool {
        match msg {
            AppMessage::Event(Event::Key(key)) => {
                let actions = self.handle_key(key);
                for action in actions {
                    self.dispatch(action);
                }
                true
            }
            AppMessage::Event(Event::Resize(_, _)) => true,
            AppMessage::Event(_) => false,
            AppMessage::HostPush(value) => {
                self.bridge.dispatch(value);
                self.drain_panel_events();
                true
            }
            AppMessage::Connected => {
                self.connected = true;
                self.toast.info("host connected");
                true
            }
            AppMessage::Disconnected => {
                self.connected = false;
                self.toast.warning("host disconnected");
                true
            }
        }
    }

    fn drain_panel_events(&mut self) {
        loop {
            let event = self.panel_events.borrow_mut().pop_front();
            match event {
                Some(PanelEvent::Open(snap)) => {
                    debug!(garage = %snap.garage_name, vehicles = snap.vehicles.len(), "panel opened");
                    self.panel.open(&self.bridge, snap);
                }
                Some(PanelEvent::Close) => {
                    debug!("panel closed by host");
                    self.panel.close();
                }
                None => break,
            }
        }
    }

    // ── Key routing ───────────────────────────────────────────────────────────

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }

        // Quit works in every state.
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return vec![Action::Quit];
        }

        if !self.panel.is_visible() {
            return match key.code {
                KeyCode::Char('q') => vec![Action::Quit],
                _ => vec![],
            };
        }

        // The search input consumes keys (including its own Esc handling)
        // before any global binding.
        if self.vehicle_list.is_searching() {
            let store = self.store.borrow();
            return self.vehicle_list.handle_key(key, &store);
        }

        match key.code {
            KeyCode::Esc => vec![Action::Cancel],
            KeyCode::Char('q') => vec![Action::Quit],
            KeyCode::Tab => vec![Action::FocusNext],
            KeyCode::BackTab => vec![Action::FocusPrev],
            _ => {
                let store = self.store.borrow();
                match self.focus.current() {
                    Some(ComponentId::VehicleList) => self.vehicle_list.handle_key(key, &store),
                    Some(ComponentId::VehicleDetail) => {
                        self.vehicle_detail.handle_key(key, &store)
                    }
                    None => vec![],
                }
            }
        }
    }

    // ── Action dispatch ───────────────────────────────────────────────────────

    fn dispatch(&mut self, action: Action) {
        // Let components observe the action first.
        let follow_ups: Vec<Action> = {
            let store = self.store.borrow();
            let mut all = Vec::new();
            all.extend(self.vehicle_list.on_action(&action, &store));
            all.extend(self.vehicle_detail.on_action(&action, &store));
            all
        };

        match action {
            Action::FocusNext => {
                self.focus.next();
            }
            Action::FocusPrev => {
                self.focus.prev();
            }
            Action::FocusPane(id) => self.focus.set(id),
            Action::SelectVehicle(id) => self.store.borrow_mut().select(&id),
            Action::SelectUp(n) => self.move_selection(-(n as isize)),
            Action::SelectDown(n) => self.move_selection(n as isize),
            Action::SelectFirst => {
                let id = self
                    .store
                    .borrow()
                    .filtered_vehicles()
                    .first()
                    .map(|v| v.id.clone());
                if let Some(id) = id {
                    self.store.borrow_mut().select(&id);
                }
            }
            Action::SelectLast => {
                let id = self
                    .store
                    .borrow()
                    .filtered_vehicles()
                    .last()
                    .map(|v| v.id.clone());
                if let Some(id) = id {
                    self.store.borrow_mut().select(&id);
                }
            }
            Action::QueryChanged(q) => self.store.borrow_mut().set_query(q),
            Action::ClearQuery => self.store.borrow_mut().set_query(""),
            Action::SetFilter(f) => self.store.borrow_mut().set_filter(f),
            Action::CycleFilter => self.cycle_filter(1),
            Action::CycleFilterBack => self.cycle_filter(-1),
            Action::OpenSearch | Action::CloseSearch => {} // handled by on_action above
            Action::RequestVehicle(id) => self.request_vehicle(id),
            Action::CopyToClipboard(text) => self.copy_to_clipboard(text),
            Action::Cancel => {
                if let Some(cmd) = self.panel.cancel() {
                    self.queue_command(cmd, "close", false);
                }
            }
            Action::SendCommand(cmd) => self.queue_command(cmd, "command", true),
            Action::ShowToast(severity, msg) => {
                self.toast.push(msg, severity, Duration::from_secs(3))
            }
            Action::Quit => self.should_quit = true,
            Action::Tick | Action::Render | Action::Resize(_, _) | Action::Noop => {}
        }

        for follow_up in follow_ups {
            self.dispatch(follow_up);
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let id = {
            let store = self.store.borrow();
            let filtered = store.filtered_vehicles();
            if filtered.is_empty() {
                return;
            }
            let pos = store
                .selected()
                .and_then(|sel| filtered.iter().position(|v| v.id == sel.id));
            let target = match pos {
                Some(p) => (p as isize + delta).clamp(0, filtered.len() as isize - 1) as usize,
                None => 0,
            };
            filtered[target].id.clone()
        };
        self.store.borrow_mut().select(&id);
    }

    fn cycle_filter(&mut self, dir: isize) {
        let mut store = self.store.borrow_mut();
        let tabs = ViewFilter::ALL;
        let pos = tabs.iter().position(|f| *f == store.filter()).unwrap_or(0);
        let next = (pos as isize + dir).rem_euclid(tabs.len() as isize) as usize;
        store.set_filter(tabs[next]);
    }

    fn request_vehicle(&mut self, id: String) {
        let label = {
            let store = self.store.borrow();
            match store.vehicles().iter().find(|v| v.id == id) {
                Some(v) => match v.status {
                    garage_proto::model::VehicleStatus::Garaged => "take-out",
                    garage_proto::model::VehicleStatus::Outside => "track",
                    garage_proto::model::VehicleStatus::Impounded => "transfer",
                    garage_proto::model::VehicleStatus::Unknown => "request",
                },
                None => return,
            }
        };
        self.queue_command(Command::DriveVehicle { vehicle_id: id }, label, true);
    }

    /// Park a command on the pending set.  The select loop polls it to
    /// completion; nothing blocks on the response.
    fn queue_command(&mut self, cmd: Command, label: &'static str, surface: bool) {
        let dispatcher = self.dispatcher.clone();
        let canned = self
            .config
            .simulation
            .enabled
            .then(|| serde_json::json!({ "ok": true }));
        self.pending.push(Box::pin(async move {
            let result = dispatcher.send(cmd.name(), cmd.payload(), canned).await;
            (label, surface, result)
        }));
    }

    fn copy_to_clipboard(&mut self, text: String) {
        match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(text)) {
            Ok(()) => self.toast.success("plate copied"),
            Err(e) => self.toast.warning(format!("clipboard: {}", e)),
        }
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();

        if !self.panel.is_visible() {
            self.draw_hidden(frame, area);
            self.toast.draw(frame, area);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(area);

        {
            let store = self.store.borrow();
            draw_filter_tabs(frame, chunks[0], store.filter(), &store.counts());
        }

        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(chunks[1]);
        {
            let store = self.store.borrow();
            self.vehicle_list.draw(
                frame,
                panes[0],
                self.focus.is_focused(ComponentId::VehicleList),
                &store,
            );
            self.vehicle_detail.draw(
                frame,
                panes[1],
                self.focus.is_focused(ComponentId::VehicleDetail),
                &store,
            );
        }

        draw_key_hints(frame, chunks[2], self.vehicle_list.is_searching());
        self.toast.draw(frame, area);
    }

    fn draw_hidden(&self, frame: &mut Frame, area: Rect) {
        let (status, color) = if self.connected {
            ("host connected", C_GARAGED)
        } else {
            ("waiting for host...", C_IMPOUNDED)
        };
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled("vgarage", style_secondary())),
            Line::from(Span::styled(
                "panel hidden — the host opens it at a garage",
                style_muted(),
            )),
            Line::from(""),
            Line::from(Span::styled(status, ratatui::style::Style::default().fg(color))),
            Line::from(""),
            Line::from(Span::styled("q to quit", style_muted())),
        ];
        frame.render_widget(
            Paragraph::new(lines).alignment(Alignment::Center),
            area,
        );
    }
}
