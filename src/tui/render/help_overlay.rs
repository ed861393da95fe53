use ratatui::Frame;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::tui::overlay::OverlayKind;
use crate::tui::state::BoardState;
use crate::tui::theme::Theme;

use super::popup::{PopupLayout, heading, render_popup};

const BINDINGS: &[(&str, &[(&str, &str)])] = &[
    (
        "Navigation",
        &[
            ("\u{2190} \u{2192}", "Previous / next lane"),
            ("\u{2191} \u{2193}", "Previous / next task"),
            ("Home / End", "First / last task"),
            ("PgUp / PgDn", "Scroll the lane"),
            ("Backspace", "Go back"),
            ("Tab", "Cycle board / details / help"),
        ],
    ),
    (
        "Tasks",
        &[
            ("1 2 3", "Move to pending / in progress / done"),
            ("u", "Undo last status change"),
            ("v", "View task"),
            ("i", "Task info"),
            ("e", "Edit title"),
            ("d", "Delete task"),
        ],
    ),
    (
        "Board",
        &[
            ("/", "Search"),
            ("f", "Cycle quick filter"),
            ("x", "Clear filters and search"),
            ("r", "Reload tasks file"),
            ("s", "Statistics"),
            ("h ?", "This help"),
            ("q  Ctrl+C", "Quit"),
        ],
    ),
    (
        "Popups",
        &[
            ("\u{2191} \u{2193} PgUp PgDn", "Scroll"),
            ("c  Esc", "Close"),
        ],
    ),
];

pub fn help_lines(theme: &Theme) -> Vec<Line<'static>> {
    let key_style = Style::default()
        .fg(theme.highlight)
        .add_modifier(Modifier::BOLD);
    let desc_style = Style::default().fg(theme.text);

    let mut lines = Vec::new();
    for (i, (section, bindings)) in BINDINGS.iter().enumerate() {
        if i > 0 {
            lines.push(Line::default());
        }
        lines.push(heading(section, theme));
        for (key, desc) in *bindings {
            add_binding(&mut lines, key, desc, key_style, desc_style);
        }
    }
    lines
}

fn add_binding(
    lines: &mut Vec<Line<'static>>,
    key: &'static str,
    desc: &'static str,
    key_style: Style,
    desc_style: Style,
) {
    let key_width = 22;
    let padded_key = format!(" {:<width$}", key, width = key_width);
    lines.push(Line::from(vec![
        Span::styled(padded_key, key_style),
        Span::styled(desc, desc_style),
    ]));
}

pub fn render_help_overlay(frame: &mut Frame, state: &BoardState, layout: &PopupLayout) {
    render_popup(
        frame,
        layout,
        OverlayKind::Help.title(),
        help_lines(&state.theme),
        state.overlays.scroll_of(OverlayKind::Help),
        "\u{2191}\u{2193} scroll  c/Esc close",
        &state.theme,
    );
}
