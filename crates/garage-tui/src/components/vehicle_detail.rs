//! VehicleDetail component — right pane showing the selected vehicle.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use garage_proto::model::{Vehicle, VehicleStatus};

use crate::{
    action::{Action, ComponentId},
    component::Component,
    store::GarageStore,
    theme::{
        gauge_color, status_color, style_muted, style_secondary, C_FAVORITE, C_FEE, C_MUTED,
        C_PRIMARY, C_SHARED,
    },
    widgets::pane_chrome::pane_chrome,
};

const GAUGE_WIDTH: usize = 20;

/// What pressing Enter on this vehicle asks the host to do, as shown to the
/// user.  Impound transfers carry the garage's retrieval fee.
pub fn action_label(status: VehicleStatus, fee: f64) -> String {
    match status {
        VehicleStatus::Garaged => "Drive".to_string(),
        VehicleStatus::Outside => "Track".to_string(),
        VehicleStatus::Impounded => {
            if fee > 0.0 {
                format!("Transfer (${:.0})", fee)
            } else {
                "Transfer (Free)".to_string()
            }
        }
        VehicleStatus::Unknown => "Request".to_string(),
    }
}

pub struct VehicleDetail;

impl VehicleDetail {
    pub fn new() -> Self {
        Self
    }

    fn gauge_line<'a>(label: &'a str, value: f64) -> Line<'a> {
        let clamped = value.clamp(0.0, 100.0);
        let filled = ((clamped / 100.0) * GAUGE_WIDTH as f64).round() as usize;
        let bar = format!(
            "{}{}",
            "█".repeat(filled),
            "░".repeat(GAUGE_WIDTH - filled)
        );
        Line::from(vec![
            Span::styled(format!("{:<8}", label), style_secondary()),
            Span::styled(bar, Style::default().fg(gauge_color(clamped))),
            Span::styled(format!(" {:>3.0}%", clamped), style_muted()),
        ])
    }

    fn detail_lines<'a>(&self, vehicle: &'a Vehicle, store: &GarageStore) -> Vec<Line<'a>> {
        let mut lines = Vec::new();

        let mut title = vec![Span::styled(
            vehicle.name.clone(),
            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
        )];
        if vehicle.is_favorite {
            title.push(Span::styled(" ✹", Style::default().fg(C_FAVORITE)));
        }
        if vehicle.shared {
            title.push(Span::styled(" ⇄ shared", Style::default().fg(C_SHARED)));
        }
        lines.push(Line::from(title));

        if store.nicknames {
            if let Some(nick) = &vehicle.nickname {
                lines.push(Line::from(Span::styled(
                    format!("\"{}\"", nick),
                    style_secondary(),
                )));
            }
        }
        lines.push(Line::from(""));

        lines.push(Line::from(vec![
            Span::styled("Plate   ", style_secondary()),
            Span::styled(vehicle.plate.clone(), Style::default().fg(C_PRIMARY)),
        ]));
        lines.push(Line::from(vec![
            Span::styled("Status  ", style_secondary()),
            Span::styled(
                vehicle.status.label(),
                Style::default().fg(status_color(vehicle.status)),
            ),
        ]));
        if store.mileage {
            if let Some(km) = vehicle.mileage {
                lines.push(Line::from(vec![
                    Span::styled("Mileage ", style_secondary()),
                    Span::styled(format!("{:.1} km", km), Style::default().fg(C_PRIMARY)),
                ]));
            }
        }
        lines.push(Line::from(""));

        if let Some(fuel) = vehicle.fuel {
            lines.push(Self::gauge_line("Fuel", fuel));
        }
        if let Some(engine) = vehicle.engine {
            lines.push(Self::gauge_line("Engine", engine));
        }
        if let Some(body) = vehicle.body {
            lines.push(Self::gauge_line("Body", body));
        }
        lines.push(Line::from(""));

        if vehicle.status == VehicleStatus::Impounded && store.fee > 0.0 {
            lines.push(Line::from(vec![
                Span::styled("Retrieval fee ", style_secondary()),
                Span::styled(format!("${:.0}", store.fee), Style::default().fg(C_FEE)),
            ]));
            lines.push(Line::from(""));
        }

        lines.push(Line::from(vec![
            Span::styled("Enter ", Style::default().fg(C_MUTED)),
            Span::styled(
                action_label(vehicle.status, store.fee),
                Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
            ),
        ]));
        lines
    }
}

impl Component for VehicleDetail {
    fn id(&self) -> ComponentId {
        ComponentId::VehicleDetail
    }

    fn handle_key(&mut self, key: KeyEvent, store: &GarageStore) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        match key.code {
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

    fn on_action(&mut self, _action: &Action, _store: &GarageStore) -> Vec<Action> {
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, store: &GarageStore) {
        let block = pane_chrome("vehicle", Some('2'), focused, None);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        match store.selected() {
            Some(vehicle) => {
                let lines = self.detail_lines(vehicle, store);
                frame.render_widget(Paragraph::new(lines), inner);
            }
            None => {
                frame.render_widget(
                    Paragraph::new(Span::styled("no vehicle selected", style_muted())),
                    inner,
                );
            }
        }
    }
}

impl Default for VehicleDetail {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_label_tracks_status_and_fee() {
        assert_eq!(action_label(VehicleStatus::Garaged, 250.0), "Drive");
        assert_eq!(action_label(VehicleStatus::Outside, 250.0), "Track");
        assert_eq!(
            action_label(VehicleStatus::Impounded, 250.0),
            "Transfer ($250)"
        );
        assert_eq!(
            action_label(VehicleStatus::Impounded, 0.0),
            "Transfer (Free)"
        );
    }
}
