//! Terminal front end
//!
//! Keyboard wedge scanners show up as ordinary key presses, so every key is
//! read through crossterm and routed either to the scan recognizer or to a
//! screen action. Arrow and page keys move the item and rate highlights;
//! the scanner never sends those.

use crate::core::ScreenSnapshot;
use crate::scan::KeyInput;
use shared::models::{Address, ProviderRates, ShippingRate};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, ModifierKeyCode};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue, style::Print};
use rust_decimal::Decimal;
use std::io::{self, Write};
use std::str::FromStr;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Screen actions bound to function keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    RequestRates,
    PurchaseLabel,
    PrintLabel,
    VoidLabel,
    CompleteOrder,
    CyclePrinter,
    CycleBox,
    /// Apply the highlighted rate, or the cheapest when none is highlighted
    ApplyRate,
    ViewLabel,
    EditAddress,
    ItemUp,
    ItemDown,
    PackItem,
    UnpackItem,
    RateUp,
    RateDown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Scan(KeyInput),
    Action(Action),
    Weight(Decimal),
    Address(Address),
    /// Keystroke consumed by the router itself
    Ignored,
    Quit,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Scanning,
    /// Typing a weight in pounds
    Weight(String),
    Address(AddressForm),
}

const ADDRESS_FIELDS: [&str; 9] = [
    "Name",
    "Company",
    "Street",
    "Street 2",
    "City",
    "State",
    "Postal code",
    "Country",
    "Phone",
];

/// Ship-to address being edited one field at a time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressForm {
    values: [String; 9],
    field: usize,
}

impl AddressForm {
    pub fn new(current: Option<&Address>) -> Self {
        let Some(a) = current else {
            return Self::default();
        };
        let opt = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            values: [
                a.name.clone(),
                opt(&a.company),
                a.street1.clone(),
                opt(&a.street2),
                a.city.clone(),
                a.state.clone(),
                a.postal_code.clone(),
                a.country.clone(),
                opt(&a.phone),
            ],
            field: 0,
        }
    }

    pub fn label(&self) -> &'static str {
        ADDRESS_FIELDS[self.field]
    }

    pub fn value(&self) -> &str {
        &self.values[self.field]
    }

    pub fn is_last(&self) -> bool {
        self.field + 1 == ADDRESS_FIELDS.len()
    }

    fn next(&mut self) {
        self.field = (self.field + 1).min(ADDRESS_FIELDS.len() - 1);
    }

    fn prev(&mut self) {
        self.field = self.field.saturating_sub(1);
    }

    pub fn to_address(&self) -> Address {
        let text = |i: usize| self.values[i].trim().to_string();
        let opt = |i: usize| Some(text(i)).filter(|v| !v.is_empty());
        Address {
            name: text(0),
            company: opt(1),
            street1: text(2),
            street2: opt(3),
            city: text(4),
            state: text(5),
            postal_code: text(6),
            country: text(7),
            phone: opt(8),
        }
    }
}

/// Item and rate highlights
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub item: usize,
    pub rate: Option<usize>,
}

impl Cursor {
    pub fn step_item(&mut self, delta: isize, len: usize) {
        self.item = step(self.item, delta, len);
    }

    pub fn step_rate(&mut self, delta: isize, len: usize) {
        self.rate = match self.rate {
            _ if len == 0 => None,
            None if delta < 0 => Some(len - 1),
            None => Some(0),
            Some(i) => Some(step(i, delta, len)),
        };
    }
}

fn step(index: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (index as isize + delta).rem_euclid(len as isize) as usize
}

/// Rate at a position of the provider-ordered list
pub fn rate_at(groups: &[ProviderRates], index: usize) -> Option<&ShippingRate> {
    groups.iter().flat_map(|g| g.rates.iter()).nth(index)
}

/// Turns raw key events into screen input
#[derive(Debug, Default)]
pub struct KeyRouter {
    mode: InputMode,
}

impl KeyRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> &InputMode {
        &self.mode
    }

    /// Switch to address entry, starting from the order's ship-to
    pub fn edit_address(&mut self, current: Option<&Address>) {
        self.mode = InputMode::Address(AddressForm::new(current));
    }

    pub fn route(&mut self, key: KeyEvent) -> Input {
        if key.kind != KeyEventKind::Press {
            return Input::Ignored;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Input::Quit;
        }

        match &mut self.mode {
            InputMode::Scanning => match key.code {
                KeyCode::F(9) => {
                    self.mode = InputMode::Weight(String::new());
                    Input::Ignored
                }
                KeyCode::Esc => Input::Quit,
                code => map_key(code),
            },
            InputMode::Weight(buffer) => match key.code {
                KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => {
                    buffer.push(c);
                    Input::Ignored
                }
                KeyCode::Backspace => {
                    buffer.pop();
                    Input::Ignored
                }
                KeyCode::Esc => {
                    self.mode = InputMode::Scanning;
                    Input::Ignored
                }
                KeyCode::Enter => match Decimal::from_str(buffer) {
                    Ok(value) => {
                        self.mode = InputMode::Scanning;
                        Input::Weight(value)
                    }
                    Err(e) => {
                        debug!(input = %buffer, error = %e, "Weight not a number");
                        buffer.clear();
                        Input::Ignored
                    }
                },
                _ => Input::Ignored,
            },
            InputMode::Address(form) => match key.code {
                KeyCode::Char(c) => {
                    form.values[form.field].push(c);
                    Input::Ignored
                }
                KeyCode::Backspace => {
                    form.values[form.field].pop();
                    Input::Ignored
                }
                KeyCode::Tab | KeyCode::Down => {
                    form.next();
                    Input::Ignored
                }
                KeyCode::BackTab | KeyCode::Up => {
                    form.prev();
                    Input::Ignored
                }
                KeyCode::Enter if form.is_last() => {
                    let address = form.to_address();
                    self.mode = InputMode::Scanning;
                    Input::Address(address)
                }
                KeyCode::Enter => {
                    form.next();
                    Input::Ignored
                }
                KeyCode::Esc => {
                    self.mode = InputMode::Scanning;
                    Input::Ignored
                }
                _ => Input::Ignored,
            },
        }
    }
}

/// Key mapping outside of weight entry
pub fn map_key(code: KeyCode) -> Input {
    match code {
        KeyCode::Char(c) => Input::Scan(KeyInput::Char(c)),
        KeyCode::Enter => Input::Scan(KeyInput::Enter),
        KeyCode::Modifier(ModifierKeyCode::LeftShift | ModifierKeyCode::RightShift) => {
            Input::Scan(KeyInput::Shift)
        }
        KeyCode::F(2) => Input::Action(Action::RequestRates),
        KeyCode::F(3) => Input::Action(Action::PurchaseLabel),
        KeyCode::F(4) => Input::Action(Action::PrintLabel),
        KeyCode::F(5) => Input::Action(Action::VoidLabel),
        KeyCode::F(6) => Input::Action(Action::CompleteOrder),
        KeyCode::F(7) => Input::Action(Action::CyclePrinter),
        KeyCode::F(8) => Input::Action(Action::CycleBox),
        KeyCode::F(10) => Input::Action(Action::ApplyRate),
        KeyCode::F(11) => Input::Action(Action::ViewLabel),
        KeyCode::F(1) => Input::Action(Action::EditAddress),
        KeyCode::Up => Input::Action(Action::ItemUp),
        KeyCode::Down => Input::Action(Action::ItemDown),
        KeyCode::Right => Input::Action(Action::PackItem),
        KeyCode::Left => Input::Action(Action::UnpackItem),
        KeyCode::PageUp => Input::Action(Action::RateUp),
        KeyCode::PageDown => Input::Action(Action::RateDown),
        _ => Input::Scan(KeyInput::Other),
    }
}

/// Read key events on a blocking thread
pub fn spawn_reader() -> mpsc::UnboundedReceiver<KeyEvent> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        loop {
            match event::read() {
                Ok(Event::Key(key)) => {
                    if tx.send(key).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "Terminal read failed");
                    break;
                }
            }
        }
    });
    rx
}

/// Raw mode and alternate screen for the lifetime of the value
pub struct TerminalGuard;

impl TerminalGuard {
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen, cursor::Hide)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), cursor::Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

fn mark(on: bool) -> &'static str {
    if on { "x" } else { " " }
}

fn pointer(on: bool) -> &'static str {
    if on { ">" } else { " " }
}

/// Render the screen as plain lines
pub fn render_lines(snap: &ScreenSnapshot, mode: &InputMode, cursor: &Cursor) -> Vec<String> {
    let mut lines = Vec::new();
    let reference = snap.reference.as_deref().unwrap_or("loading...");
    lines.push(format!("Order {}  ({} left to pack)", reference, snap.remaining));
    if let Some(to) = &snap.ship_to {
        lines.push(format!(
            "Ship to {}, {}, {} {} {} {}",
            to.name, to.street1, to.city, to.state, to.postal_code, to.country
        ));
    }
    if let (Some(carrier), Some(service)) = (&snap.carrier, &snap.service) {
        lines.push(format!("Ship via {} {}", carrier, service));
    }
    lines.push(String::new());

    for (row, item) in snap.items.iter().enumerate() {
        let sku = item.sku.as_deref().unwrap_or("-");
        lines.push(format!(
            "{}[{}] {:>8}  {:<32} x{}  {}",
            pointer(row == cursor.item),
            mark(item.packed),
            item.id,
            item.name,
            item.quantity,
            sku
        ));
    }
    lines.push(String::new());

    let printer = snap.selected_printer.as_deref().unwrap_or("(none)");
    let box_name = snap
        .selected_box
        .as_ref()
        .and_then(|id| snap.boxes.iter().find(|b| &b.id == id))
        .map(|b| b.name.as_str())
        .unwrap_or("(none)");
    let weight = snap
        .weight
        .map(|w| format!("{} {:?}", w.value, w.unit).to_lowercase())
        .unwrap_or_else(|| "(none)".into());
    lines.push(format!("Printer: {}  Box: {}  Weight: {}", printer, box_name, weight));

    for shipment in &snap.shipments {
        lines.push(format!(
            "Shipment {} {} {}{}",
            shipment.id,
            shipment.carrier.as_deref().unwrap_or(""),
            shipment.tracking_number.as_deref().unwrap_or(""),
            if shipment.voided { " (voided)" } else { "" }
        ));
    }
    let rates = snap.rates.iter().flat_map(|g| g.rates.iter());
    for (row, rate) in rates.enumerate() {
        lines.push(format!(
            "{} {:<12} {} {} {} {}",
            pointer(cursor.rate == Some(row)),
            rate.provider,
            rate.carrier,
            rate.service,
            rate.amount,
            rate.currency
        ));
    }
    if let Some(url) = &snap.last_label_url {
        lines.push(format!("Label: {}", url));
    }
    lines.push(String::new());

    let errors = [
        ("Order", &snap.errors.order),
        ("Shipping", &snap.errors.shipping_form),
        ("Rates", &snap.errors.rates),
        ("Printing", &snap.errors.printing),
    ];
    for (label, message) in errors {
        if let Some(message) = message {
            lines.push(format!("{} error: {}", label, message));
        }
    }

    lines.push(format!(
        "F1 address  F2 rates  F3 buy  F4 print[{}]  F5 void  F6 complete[{}]  F7 printer  F8 box  F9 weight  F10 apply rate  F11 label  Esc quit",
        mark(snap.gates.print_label),
        mark(snap.gates.complete_order)
    ));
    lines.push("Up/Down item  Right pack  Left unpack  PgUp/PgDn rate".into());
    match mode {
        InputMode::Scanning => {}
        InputMode::Weight(buffer) => lines.push(format!("Weight (lb): {}_", buffer)),
        InputMode::Address(form) => {
            let action = if form.is_last() { "save" } else { "next" };
            lines.push(format!(
                "{}: {}_  (Enter {}, Tab next, Esc cancel)",
                form.label(),
                form.value(),
                action
            ));
        }
    }
    if snap.completed {
        lines.push("Order completed.".into());
    }
    lines
}

pub fn render(
    out: &mut impl Write,
    snap: &ScreenSnapshot,
    mode: &InputMode,
    cursor: &Cursor,
) -> io::Result<()> {
    queue!(out, Clear(ClearType::All))?;
    for (row, line) in render_lines(snap, mode, cursor).iter().enumerate() {
        queue!(out, cursor::MoveTo(0, row as u16), Print(line))?;
    }
    out.flush()
}
