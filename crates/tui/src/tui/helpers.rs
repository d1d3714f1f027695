use std::cmp::min;

use chrono::{DateTime, Local, Utc};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::core::schema::{CustomFieldDefinition, CustomFieldType, SchemaRegistry};
use crate::core::sort::SortRules;
use crate::model::Task;

pub const BG_BASE: Color = Color::Rgb(14, 17, 23);
pub const BG_PANEL: Color = Color::Rgb(22, 26, 34);
pub const BG_ACCENT: Color = Color::Rgb(32, 37, 47);
pub const FG_ACCENT: Color = Color::Rgb(120, 161, 255);

pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = min(width, area.width);
    let h = min(height, area.height);
    Rect {
        x: area.x + (area.width.saturating_sub(w)) / 2,
        y: area.y + (area.height.saturating_sub(h)) / 2,
        width: w,
        height: h,
    }
}

pub fn inset_rect(area: Rect, padding: u16) -> Rect {
    if area.width == 0 || area.height == 0 {
        return area;
    }
    let px = padding.min(area.width / 2);
    let py = padding.min(area.height / 2);
    Rect {
        x: area.x + px,
        y: area.y + py,
        width: area.width.saturating_sub(px * 2),
        height: area.height.saturating_sub(py * 2),
    }
}

pub fn accent_title(text: &str) -> Line<'static> {
    Line::from(vec![Span::styled(
        text.to_owned(),
        Style::default().fg(FG_ACCENT).add_modifier(Modifier::BOLD),
    )])
}

pub fn format_datetime(value: &DateTime<Utc>) -> String {
    let local: DateTime<Local> = (*value).into();
    local.format("%Y-%m-%d %H:%M").to_string()
}

/// Text shown in a custom-field cell: checkboxes as `[x]`/`[ ]`, other
/// values verbatim, and `N/A` when neither the task nor the field has one.
pub fn custom_cell_text(schema: &SchemaRegistry, field: &CustomFieldDefinition, task: &Task) -> String {
    let value = schema.effective_value(task, &field.name);
    match field.field_type {
        CustomFieldType::Checkbox => {
            let checked = value.and_then(|v| v.as_bool()).unwrap_or(false);
            String::from(if checked { "[x]" } else { "[ ]" })
        }
        CustomFieldType::Text | CustomFieldType::Number => value
            .map(ToString::to_string)
            .unwrap_or_else(|| String::from("N/A")),
    }
}

/// Header label with a sort arrow and, for multi-key sorts, the rule's rank.
pub fn header_label(label: &str, column: &str, sort: &SortRules) -> String {
    match sort.order_for(column) {
        Some((rank, order)) if sort.rules().len() > 1 => {
            format!("{label} {}{}", order.arrow(), rank + 1)
        }
        Some((_, order)) => format!("{label} {}", order.arrow()),
        None => label.to_string(),
    }
}

pub fn build_help_lines() -> Vec<(&'static str, &'static str)> {
    vec![
        ("j / k or ↓ / ↑", "Move selection"),
        ("n / p", "Next / previous page"),
        ("z", "Cycle page size (10/20/50)"),
        ("[ / ]", "Move header cursor"),
        ("s", "Sort by focused column (asc → desc → off)"),
        ("space", "Toggle row selection"),
        ("a", "Add a task"),
        ("e", "Edit selected task"),
        ("x / Delete", "Delete task (with confirmation)"),
        ("D", "Delete all selected tasks"),
        ("t", "Toggle or set focused custom field on the row"),
        ("/", "Search titles"),
        ("f", "Open filter builder"),
        ("c", "Active filter chips"),
        ("m", "Manage custom fields"),
        (":", "Command palette"),
        ("h", "Toggle this help overlay"),
        ("q", "Quit"),
        ("Esc", "Cancel/close overlays"),
    ]
}
