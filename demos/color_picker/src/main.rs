//! Color Picker Demo
//!
//! Serves interactive messages for a small color picker:
//!
//! - `pick_color` buttons and menus (the `rainbow` choice is slow enough to
//!   miss the response deadline and arrives through `response_url`)
//! - `color_menu` dynamic menu options, filtered by what the user typed
//! - `color_dialog` dialog submission with field validation
//! - `preview_*` buttons inside app unfurls
//!
//! # Usage
//!
//! ```bash
//! cargo run --package color-picker -- --config demos/color_picker/switchboard.toml
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use regex::Regex;
use serde_json::{Value, json};
use switchboard::core::payload::DIALOG_SUBMISSION;
use switchboard::prelude::*;

const COLORS: &[&str] = &["red", "orange", "yellow", "green", "blue", "purple"];

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Configuration file to load.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Configuration profile, e.g. `production`.
    #[arg(short, long)]
    profile: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Button click or menu selection on the color picker.
fn pick_color(payload: Arc<InteractionPayload>, respond: Option<Respond>) -> Reply {
    let choice = payload
        .actions
        .first()
        .and_then(|action| {
            action
                .extra
                .get("value")
                .or_else(|| action.extra.get("selected_options")?.get(0)?.get("value"))
        })
        .and_then(Value::as_str)
        .unwrap_or("none")
        .to_string();

    info!(choice = %choice, "Color picked");

    Reply::deferred(async move {
        if let Some(respond) = &respond {
            respond
                .send(json!({
                    "text": format!("Mixing {choice}..."),
                    "replace_original": false,
                }))?
                .await?;
        }

        let mixing = if choice == "rainbow" { 4 } else { 1 };
        tokio::time::sleep(Duration::from_secs(mixing)).await;

        Ok::<_, BoxError>(json!({
            "text": format!("You picked {choice}"),
            "replace_original": true,
        }))
    })
}

/// Menu options, filtered by the typed prefix.
fn color_options(payload: Arc<InteractionPayload>) -> Reply {
    let query = payload
        .extra
        .get("value")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_lowercase();

    let options: Vec<Value> = COLORS
        .iter()
        .filter(|color| color.starts_with(&query))
        .map(|color| json!({ "text": color, "value": color }))
        .collect();

    Reply::deferred(std::future::ready(Ok::<_, BoxError>(
        json!({ "options": options }),
    )))
}

/// Dialog submission. An empty body closes the dialog.
fn submit_dialog(payload: Arc<InteractionPayload>, _respond: Option<Respond>) -> Reply {
    let name = payload
        .extra
        .get("submission")
        .and_then(|submission| submission.get("color_name"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_lowercase();

    Reply::deferred(async move {
        if COLORS.contains(&name.as_str()) {
            info!(color = %name, "Dialog accepted");
            return Ok::<_, BoxError>(json!(""));
        }

        Ok(json!({
            "errors": [{
                "name": "color_name",
                "error": format!("'{name}' is not a color we know"),
            }]
        }))
    })
}

/// Buttons in unfurled links only need an acknowledgement.
fn preview_unfurl(payload: Arc<InteractionPayload>, _respond: Option<Respond>) {
    info!(callback_id = %payload.callback_id, "Unfurl preview clicked");
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut builder = SwitchboardRuntime::builder();
    if let Some(path) = args.config {
        builder = builder.config_file(path);
    }
    if let Some(profile) = args.profile {
        builder = builder.profile(profile);
    }
    let mut runtime = builder.build()?;

    runtime
        .action(
            Constraints::new().callback_id("pick_color").kind("button"),
            pick_color,
        )?
        .action(
            Constraints::new().callback_id("pick_color").kind("select"),
            pick_color,
        )?
        .options("color_menu", color_options)?
        .action(
            Constraints::new()
                .callback_id("color_dialog")
                .kind(DIALOG_SUBMISSION),
            submit_dialog,
        )?
        .action(
            Constraints::new()
                .callback_id(Regex::new("^preview_")?)
                .unfurl(true),
            preview_unfurl,
        )?;

    runtime.run().await?;

    Ok(())
}
