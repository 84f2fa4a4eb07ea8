//! Drive a payment button without a browser
//!
//! Reads the widget endpoints from `PAYBUTTON_*` environment variables, opens the
//! checkout for the reference given on the command line and prints every event
//! until the payment is accepted or Ctrl-C closes the overlay.
//!
//! ```text
//! cargo run --example headless_checkout -- <embed-token> <usd-amount> [reference]
//! ```

use paybutton::{ButtonOptions, CloseTrigger, EventKind, HeadlessHost, Widget};
use std::sync::Arc;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let (Some(token), Some(amount)) = (args.next(), args.next()) else {
        eprintln!("usage: headless_checkout <embed-token> <usd-amount> [reference]");
        std::process::exit(2);
    };

    let mut options = ButtonOptions::new(token).with_usd(amount);
    if let Some(reference) = args.next() {
        options = options.with_reference(reference);
    }

    let widget = Widget::from_env()?;
    let host = Arc::new(HeadlessHost::new());
    let button = widget.create(options, host.clone())?;

    for warning in button.config().warnings() {
        println!("⚠️  {:?}", warning);
    }

    let mut events = button.subscribe();
    button.activate()?;

    if let Some(overlay) = host.overlay() {
        println!("🧾 Checkout: {}", overlay.frame_url);
    }
    println!("🔄 Polling status for reference {}", button.reference());

    loop {
        tokio::select! {
            event = events.recv() => {
                let event = event?;
                match &event.detail {
                    Some(detail) => println!("📨 {} {}", event.kind, serde_json::to_string(detail)?),
                    None => println!("📨 {}", event.kind),
                }
                if event.kind == EventKind::PaymentAccepted {
                    for url in host.navigations() {
                        println!("➡️  Redirect: {}", url);
                    }
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                button.request_close(CloseTrigger::CloseControl);
                println!("❌ Checkout closed");
                break;
            }
        }
    }

    Ok(())
}
