// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::ValueEnum;
use devlog_core::Event;

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub fn print_events(events: &[Event], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(events)?),
        OutputFormat::Text => {
            if events.is_empty() {
                println!("No events found.");
                return Ok(());
            }
            for event in events {
                println!(
                    "{}  {:<12} {:<14} {}",
                    event.timestamp.to_rfc3339(),
                    event.source,
                    event.event_type,
                    event.text_projection(),
                );
            }
        }
    }
    Ok(())
}
