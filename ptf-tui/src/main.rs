//! Terminal UI for ptf that lists the features of GeoServer layers and shows their details.

mod app;
mod config;
mod input;
mod logging;
mod ui;

use std::{
    io::{self, Write},
    sync::Arc,
    time::Duration as StdDuration,
};

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ptf_core::{EndpointName, Endpoints, plugin::LayerRegistry, service::PtfService};
use ptf_provider_geoserver as geoserver;
use ratatui::{Terminal, backend::CrosstermBackend};
use reqwest::Client;
use tracing::{info, warn};

use crate::app::{App, Entry};
use crate::config::Cli;
use crate::input::Action;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_file.as_deref())?;

    let endpoints = cli.endpoints()?;
    if cli.print_endpoints {
        return print_endpoints(&endpoints);
    }

    // HTTP + service setup
    let client = Client::builder().user_agent("ptf/0.1").build()?;

    let plugins = endpoints
        .iter()
        .map(|layer| geoserver::plugin(client.clone(), &cli.origin, layer))
        .collect::<Result<Vec<_>, _>>()?;
    info!(origin = %cli.origin, layers = plugins.len(), "starting ptf");

    let registry = Arc::new(LayerRegistry::new(plugins));
    let service = Arc::new(PtfService::new(registry));

    // App state
    let app = App::new(service, cli.near, cli.limit);

    // Terminal init
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run event loop
    let res = run(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

fn print_endpoints(endpoints: &[Endpoints]) -> Result<()> {
    let mut out = io::stdout().lock();
    for (idx, layer) in endpoints.iter().enumerate() {
        if idx > 0 {
            writeln!(out)?;
        }
        for name in EndpointName::ALL {
            writeln!(out, "{}={}", name.key(), layer.get(name))?;
        }
    }
    Ok(())
}

async fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, mut app: App) -> Result<()> {
    loop {
        // Draw current UI
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Poll for input (non-blocking, small timeout to keep CPU low)
        if event::poll(StdDuration::from_millis(100))?
            && let CEvent::Key(key) = event::read()?
        {
            match input::handle_key_event(key, &mut app) {
                Action::Quit => break,
                Action::None => {}
                Action::LoadFeatures => {
                    app.is_loading = true;
                    app.error_message = None;
                    terminal.draw(|frame| ui::draw(frame, &app))?;

                    load_features(&mut app).await;
                    app.is_loading = false;
                }
            }
        }
    }

    Ok(())
}

async fn load_features(app: &mut App) {
    let Some(layer) = app.selected_layer.clone() else {
        app.error_message = Some("Select a layer first".into());
        return;
    };

    let query = app.query();
    let res = match app.near {
        Some(from) => app.service.nearest(&layer, from, query).await.map(|ranked| {
            ranked
                .into_iter()
                .map(|(feature, distance)| Entry::new(feature, Some(distance)))
                .collect::<Vec<_>>()
        }),
        None => app.service.features(&layer, query).await.map(|features| {
            features
                .into_iter()
                .map(|feature| Entry::new(feature, None))
                .collect::<Vec<_>>()
        }),
    };

    match res {
        Ok(entries) => app.set_entries(entries),
        Err(err) => {
            warn!(%layer, error = %err, "failed to load features");
            app.set_entries(Vec::new());
            app.error_message = Some(format!("Failed to load features: {err}"));
        }
    }
}
