//! Action enum — all user-initiated intents and internal events.

use garage_proto::protocol::Command;

use crate::store::ViewFilter;
use crate::widgets::toast::Severity;

/// Unique identifier for a focusable component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    VehicleList,
    VehicleDetail,
}

/// All actions that can flow through the system.
/// Components produce Actions; the App dispatches them.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Navigation ───────────────────────────────────────────────────────────
    FocusNext,
    FocusPrev,
    FocusPane(ComponentId),
    SelectUp(usize),
    SelectDown(usize),
    SelectFirst,
    SelectLast,
    SelectVehicle(String), // by id

    // ── Filter/search ────────────────────────────────────────────────────────
    OpenSearch,
    CloseSearch,
    QueryChanged(String),
    ClearQuery,
    CycleFilter,
    CycleFilterBack,
    SetFilter(ViewFilter),

    // ── Vehicle operations ───────────────────────────────────────────────────
    /// Ask the host to hand over the selected vehicle (drive, track, or
    /// transfer depending on its status).
    RequestVehicle(String),
    CopyToClipboard(String),

    // ── Panel lifecycle ──────────────────────────────────────────────────────
    Cancel, // Esc — hide the panel and notify the host

    // ── System ───────────────────────────────────────────────────────────────
    SendCommand(Command),
    ShowToast(Severity, String),
    Quit,
    Tick,
    Render,
    Resize(u16, u16),
    Noop,
}
