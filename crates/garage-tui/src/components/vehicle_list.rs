//! VehicleList component — left pane of the garage panel.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use garage_proto::model::Vehicle;

use crate::{
    action::{Action, ComponentId},
    component::Component,
    store::{GarageStore, ViewFilter},
    theme::{
        status_color, C_FAVORITE, C_MUTED, C_PRIMARY, C_SECONDARY, C_SELECTION_BG, C_SHARED,
    },
    widgets::{
        pane_chrome::{pane_chrome, Badge},
        search_input::{SearchAction, SearchInput},
    },
};

pub struct VehicleList {
    pub search: SearchInput,
    scroll_offset: usize,
}

impl VehicleList {
    pub fn new() -> Self {
        Self {
            search: SearchInput::default(),
            scroll_offset: 0,
        }
    }

    pub fn is_searching(&self) -> bool {
        self.search.is_active()
    }

    /// Index of the selected vehicle within the filtered list.
    fn selected_pos(&self, store: &GarageStore) -> Option<usize> {
        let selected = store.selected()?;
        store
            .filtered_vehicles()
            .iter()
            .position(|v| v.id == selected.id)
    }

    /// Move the selection by `delta` rows within the filtered list.  When
    /// nothing is selected (or the selection is filtered out), land on the
    /// first visible vehicle.
    fn move_selection(&self, store: &GarageStore, delta: isize) -> Vec<Action> {
        let filtered = store.filtered_vehicles();
        if filtered.is_empty() {
            return vec![];
        }
        let target = match self.selected_pos(store) {
            Some(pos) => {
                let pos = pos as isize + delta;
                pos.clamp(0, filtered.len() as isize - 1) as usize
            }
            None => 0,
        };
        vec![Action::SelectVehicle(filtered[target].id.clone())]
    }

    fn ensure_visible(&mut self, pos: usize, height: usize) {
        if height == 0 {
            return;
        }
        if pos < self.scroll_offset {
            self.scroll_offset = pos;
        } else if pos >= self.scroll_offset + height {
            self.scroll_offset = pos.saturating_sub(height - 1);
        }
    }

    fn render_item<'a>(
        &self,
        vehicle: &'a Vehicle,
        is_selected: bool,
        store: &GarageStore,
        width: usize,
    ) -> ListItem<'a> {
        let icon_color = status_color(vehicle.status);
        let star = if vehicle.is_favorite { "✹ " } else { "  " };

        // Nicknames lead when the host enables them, model name in parens.
        let display_name = match (&vehicle.nickname, store.nicknames) {
            (Some(nick), true) => format!("{} ({})", nick, vehicle.name),
            _ => vehicle.name.clone(),
        };
        let name_width = width.saturating_sub(star.width() + 3 + vehicle.plate.len() + 4);
        let name = truncate_to_width(&display_name, name_width);

        let name_style = if is_selected {
            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(C_SECONDARY)
        };

        let mut spans = vec![
            Span::styled(star, Style::default().fg(C_FAVORITE)),
            Span::styled("●", Style::default().fg(icon_color)),
            Span::raw("  "),
            Span::styled(name, name_style),
            Span::styled("  ", Style::default()),
            Span::styled(vehicle.plate.clone(), Style::default().fg(C_MUTED)),
        ];
        if vehicle.shared {
            spans.push(Span::styled(" ⇄", Style::default().fg(C_SHARED)));
        }

        let item_bg = if is_selected {
            Style::default().bg(C_SELECTION_BG)
        } else {
            Style::default()
        };
        ListItem::new(Line::from(spans)).style(item_bg)
    }
}

fn truncate_to_width(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push('…');
    out
}

impl Component for VehicleList {
    fn id(&self) -> ComponentId {
        ComponentId::VehicleList
    }

    fn handle_key(&mut self, key: KeyEvent, store: &GarageStore) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }

        if self.search.is_active() {
            match key.code {
                KeyCode::Up => return self.move_selection(store, -1),
                KeyCode::Down => return self.move_selection(store, 1),
                _ => {}
            }
            return match self.search.handle_key(key) {
                SearchAction::Changed(q) => vec![Action::QueryChanged(q)],
                SearchAction::Confirmed => vec![Action::CloseSearch],
                SearchAction::Cancelled => {
                    vec![Action::QueryChanged(String::new()), Action::CloseSearch]
                }
            };
        }

        let step: isize = if key.modifiers.contains(KeyModifiers::SHIFT) {
            5
        } else {
            1
        };
        match key.code {
            KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K') => {
                self.move_selection(store, -step)
            }
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J') => {
                self.move_selection(store, step)
            }
            KeyCode::Char('g') | KeyCode::Home => vec![Action::SelectFirst],
            KeyCode::Char('G') | KeyCode::End => vec![Action::SelectLast],
            KeyCode::Char('f') => vec![Action::CycleFilter],
            KeyCode::Char('F') => vec![Action::CycleFilterBack],
            KeyCode::Char('1') => vec![Action::SetFilter(ViewFilter::All)],
            KeyCode::Char('2') => vec![Action::SetFilter(ViewFilter::Garaged)],
            KeyCode::Char('3') => vec![Action::SetFilter(ViewFilter::Outside)],
            KeyCode::Char('4') => vec![Action::SetFilter(ViewFilter::Impounded)],
            KeyCode::Char('/') => vec![Action::OpenSearch],
            KeyCode::Enter => match store.selected() {
                Some(v) => vec![Action::RequestVehicle(v.id.clone())],
                None => vec![],
            },
            KeyCode::Char('y') => match store.selected() {
                Some(v) => vec![Action::CopyToClipboard(v.plate.clone())],
                None => vec![],
            },
            _ => vec![],
        }
    }

    fn on_action(&mut self, action: &Action, _store: &GarageStore) -> Vec<Action> {
        match action {
            Action::OpenSearch => self.search.activate(),
            Action::CloseSearch => self.search.deactivate(),
            Action::ClearQuery => self.search.clear(),
            _ => {}
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, store: &GarageStore) {
        let badge = store.is_job.then_some(Badge {
            text: "JOB",
            color: C_SHARED,
        });
        let block = pane_chrome(&store.garage_name, Some('1'), focused, badge);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let show_search = self.search.is_active() || !self.search.is_empty();
        let (search_area, list_area) = if show_search {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(1), Constraint::Min(0)])
                .split(inner);
            (Some(chunks[0]), chunks[1])
        } else {
            (None, inner)
        };
        if let Some(sa) = search_area {
            self.search.draw(frame, sa);
        }

        let filtered = store.filtered_vehicles();
        if filtered.is_empty() {
            let msg = if store.vehicles().is_empty() {
                "garage is empty"
            } else {
                "no vehicles match"
            };
            frame.render_widget(
                ratatui::widgets::Paragraph::new(Span::styled(
                    msg,
                    Style::default().fg(C_MUTED),
                )),
                list_area,
            );
            return;
        }

        let height = list_area.height as usize;
        // A narrowing filter or query can shrink the list below the offset
        // left over from scrolling the longer one.
        if self.scroll_offset >= filtered.len() {
            self.scroll_offset = filtered.len().saturating_sub(1);
        }
        let selected_pos = self.selected_pos(store);
        if let Some(pos) = selected_pos {
            self.ensure_visible(pos, height);
        }
        let end = (self.scroll_offset + height).min(filtered.len());
        let items: Vec<ListItem> = filtered[self.scroll_offset..end]
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let is_selected = selected_pos == Some(self.scroll_offset + i);
                self.render_item(v, is_selected, store, list_area.width as usize)
            })
            .collect();
        frame.render_widget(List::new(items), list_area);
    }
}

impl Default for VehicleList {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use garage_proto::model::{GarageSnapshot, VehicleStatus};
    use ratatui::{backend::TestBackend, Terminal};

    fn deep_store() -> GarageStore {
        let vehicles = (0..50)
            .map(|i| Vehicle {
                id: format!("v{i}"),
                name: format!("Sultan {i}"),
                plate: format!("PLT{i:03}"),
                status: if i % 10 == 0 {
                    VehicleStatus::Outside
                } else {
                    VehicleStatus::Garaged
                },
                ..Vehicle::default()
            })
            .collect();
        let mut store = GarageStore::new();
        store.apply_snapshot(GarageSnapshot {
            garage_name: "Pillbox".into(),
            vehicles,
            ..GarageSnapshot::default()
        });
        store
    }

    #[test]
    fn test_draw_survives_filter_shrinking_scrolled_list() {
        let mut store = deep_store();
        store.select("v49");
        let mut list = VehicleList::new();
        let mut terminal = Terminal::new(TestBackend::new(44, 12)).unwrap();

        // Scroll deep, then narrow to the 5 Outside vehicles.  The stale
        // offset must not index past the shorter list.
        terminal
            .draw(|f| list.draw(f, f.area(), true, &store))
            .unwrap();
        store.set_filter(ViewFilter::Outside);
        terminal
            .draw(|f| list.draw(f, f.area(), true, &store))
            .unwrap();
    }

    #[test]
    fn test_draw_survives_query_shrinking_scrolled_list() {
        let mut store = deep_store();
        store.select("v49");
        let mut list = VehicleList::new();
        let mut terminal = Terminal::new(TestBackend::new(44, 12)).unwrap();

        terminal
            .draw(|f| list.draw(f, f.area(), true, &store))
            .unwrap();
        store.set_query("Sultan 7");
        terminal
            .draw(|f| list.draw(f, f.area(), true, &store))
            .unwrap();
    }
}
