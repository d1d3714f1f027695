use std::time::Duration;

pub(crate) const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub(crate) const TICK_RATE: Duration = Duration::from_millis(200);
pub(crate) const STATUS_TTL: Duration = Duration::from_secs(5);

pub(crate) const COMMAND_HELP: &str = concat!(
    "Commands: :help, :add <title>, :search <text>, :filter clear, ",
    ":page <n>, :size <10|20|50>, :quit"
);

pub(crate) const STATUS_SEARCH: &str = "Search titles • Enter apply • Esc cancel";
pub(crate) const STATUS_COMMAND_PALETTE: &str =
    "Type a :command • Up/Down: navigate • Tab/Right: complete • Enter: run • Esc: cancel";
pub(crate) const STATUS_FILTER_COLUMN: &str =
    "Filter — ↑/↓ choose column • Enter next • Esc cancel";
pub(crate) const STATUS_FILTER_VALUE: &str =
    "Filter — choose or type a value • Enter apply • Backspace on empty returns • Esc cancel";
pub(crate) const STATUS_CHIPS: &str =
    "Active filters — ↑/↓ move • x remove • C remove all • Esc close";
pub(crate) const STATUS_TASK_FORM: &str =
    "Tab/↑/↓ move between fields • ←/→ change choice • Enter save • Esc cancel";
pub(crate) const STATUS_FIELD_EDITOR: &str =
    "Custom fields — Tab switch Add/Remove • Enter confirm • Esc close";
pub(crate) const STATUS_SET_VALUE: &str = "Enter a value • empty clears it • Esc cancel";
pub(crate) const STATUS_HELP: &str = "Keyboard reference — Enter/Esc to close";
pub(crate) const STATUS_CONFIRM_DELETE: &str =
    "Confirm deletion — arrows choose, Enter confirms, Esc cancels";
