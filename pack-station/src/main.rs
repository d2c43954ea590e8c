use anyhow::Context;
use clap::Parser;
use pack_printer::{LabelSpooler, PrinterRegistry};
use pack_station::core::ScreenController;
use pack_station::terminal::{self, Action, Cursor, Input, KeyRouter, TerminalGuard, rate_at};
use pack_station::{Cli, Config};
use shared::models::{BoxId, MethodSelection, OrderId, UserId, cheapest};
use std::sync::Arc;
use tokio::time::sleep_until;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    let config = Config::from_env().merge(&cli);
    config.validate()?;

    let _log_guard = pack_station::init_logging(config.log_dir.as_deref())?;
    tracing::info!(order_id = %cli.order_id, hq = %config.hq_base_url, "Pack station starting");

    let backend = config.client_config().build().context("HQ client")?;
    let registry = PrinterRegistry::parse(&config.printers).context("PACK_PRINTERS")?;
    if registry.is_empty() {
        tracing::warn!("No printers configured, labels cannot be printed");
    }
    let spooler = LabelSpooler::new(registry)?;

    let mut controller = ScreenController::new(
        OrderId::from(cli.order_id.as_str()),
        config.user_id.as_deref().map(UserId::from),
        Arc::new(backend),
        Arc::new(spooler),
    )
    .with_scan_timeout(config.scan_timeout());
    controller.load();

    let guard = TerminalGuard::enter()?;
    let result = run(&mut controller).await;

    // Release the order for the next packer before leaving
    if !controller.screen().is_completed() {
        controller.unlock();
    }
    controller.dispose();
    controller.settle().await;
    drop(guard);

    tracing::info!("Pack station stopped");
    result
}

async fn run(controller: &mut ScreenController) -> anyhow::Result<()> {
    let mut keys = terminal::spawn_reader();
    let mut router = KeyRouter::new();
    let mut cursor = Cursor::default();
    let mut stdout = std::io::stdout();

    loop {
        terminal::render(&mut stdout, &controller.snapshot(), router.mode(), &cursor)?;
        if controller.screen().is_completed() && controller.in_flight() == 0 {
            return Ok(());
        }

        let deadline = controller.scan_deadline();
        tokio::select! {
            key = keys.recv() => {
                let Some(key) = key else {
                    return Ok(());
                };
                match router.route(key) {
                    Input::Scan(key) => {
                        controller.on_key(key);
                    }
                    Input::Action(Action::EditAddress) => {
                        let current = controller.screen().order().and_then(|o| o.ship_to.as_ref());
                        router.edit_address(current);
                    }
                    Input::Action(action) => dispatch(controller, &mut cursor, action),
                    Input::Weight(value) => {
                        let _ = controller.set_weight(value);
                    }
                    Input::Address(address) => controller.update_address(address),
                    Input::Ignored => {}
                    Input::Quit => return Ok(()),
                }
            }
            completion = controller.recv_completion() => {
                if let Some((id, outcome)) = completion {
                    controller.apply_completion(id, outcome);
                }
            }
            _ = async {
                match deadline {
                    Some(at) => sleep_until(at).await,
                    None => std::future::pending().await,
                }
            } => controller.flush_scan(),
        }
    }
}

fn dispatch(controller: &mut ScreenController, cursor: &mut Cursor, action: Action) {
    let screen = controller.screen();
    let rate_count: usize = screen.rates().iter().map(|g| g.rates.len()).sum();
    match action {
        Action::RequestRates => {
            cursor.rate = None;
            controller.request_rates();
        }
        Action::PurchaseLabel => controller.purchase_label(),
        Action::PrintLabel => controller.print_label(),
        Action::CompleteOrder => controller.complete_order(),
        Action::VoidLabel => {
            if let Some(shipment) = screen.shipments().iter().rev().find(|s| s.is_active()) {
                let id = shipment.id.clone();
                controller.void_label(id);
            }
        }
        Action::ViewLabel => {
            if let Some(shipment) = screen.active_shipment() {
                let id = shipment.id.clone();
                controller.view_label(id);
            }
        }
        Action::CyclePrinter => {
            let next = next_after(
                screen.printers().iter().map(|p| p.name.as_str()),
                screen.selected_printer(),
            );
            if let Some(name) = next {
                let name = name.to_string();
                let _ = controller.select_printer(&name);
            }
        }
        Action::CycleBox => {
            let next = next_after(
                screen.boxes().iter().map(|b| b.id.as_str()),
                screen.selected_box().map(|b| b.as_str()),
            );
            if let Some(id) = next {
                let id = BoxId::from(id);
                let _ = controller.select_box(id);
            }
        }
        Action::ApplyRate => {
            let chosen = match cursor.rate {
                Some(index) => rate_at(screen.rates(), index),
                None => cheapest(screen.rates()),
            };
            if let Some(rate) = chosen {
                let selection = MethodSelection::new(rate.carrier.clone(), rate.service.clone());
                controller.update_method(selection);
            }
        }
        Action::ItemUp => cursor.step_item(-1, screen.pack().len()),
        Action::ItemDown => cursor.step_item(1, screen.pack().len()),
        Action::PackItem | Action::UnpackItem => {
            if let Some(entry) = screen.pack().entries().get(cursor.item) {
                let id = entry.item_id.clone();
                if action == Action::PackItem {
                    controller.pack_item(&id);
                } else {
                    controller.unpack_item(&id);
                }
            }
        }
        Action::RateUp => cursor.step_rate(-1, rate_count),
        Action::RateDown => cursor.step_rate(1, rate_count),
        Action::EditAddress => {}
    }
}

/// Entry following `current`, wrapping around
fn next_after<'a>(
    items: impl Iterator<Item = &'a str> + Clone,
    current: Option<&str>,
) -> Option<&'a str> {
    let position = current.and_then(|c| items.clone().position(|i| i == c));
    match position {
        Some(i) => items.clone().nth(i + 1).or_else(|| items.clone().next()),
        None => items.clone().next(),
    }
}
