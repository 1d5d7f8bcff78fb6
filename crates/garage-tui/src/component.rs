//! Component trait — the interface both garage panes implement.
//!
//! Components are self-contained: they own their view-local state (scroll
//! offsets, input widgets) and render themselves.  Shared garage data comes
//! in read-only via `&GarageStore`; mutations happen by returning `Action`s
//! for the App to dispatch.

use ratatui::crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};

use crate::action::{Action, ComponentId};
use crate::store::GarageStore;

pub trait Component {
    fn id(&self) -> ComponentId;

    /// Handle a key event. Only called when this component has focus
    /// (global keys are handled by the App before routing).
    fn handle_key(&mut self, key: KeyEvent, store: &GarageStore) -> Vec<Action>;

    /// Receive an action dispatched by the App. Components can react to
    /// actions even when not focused.
    fn on_action(&mut self, action: &Action, store: &GarageStore) -> Vec<Action>;

    /// Called each tick (~100ms).
    fn tick(&mut self, _store: &GarageStore) -> Vec<Action> {
        Vec::new()
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, store: &GarageStore);
}
