//! Terminal dashboard for binroute: bin priorities, van routes, worker notifications,
//! and waste analytics.

mod app;
mod cli;
mod config;
mod input;
mod telemetry;
mod ui;

use std::{io, sync::Arc, time::Duration as StdDuration};

use anyhow::Result;
use binroute_core::{
    DirectionsPort, DispatchService, NearestAssigner, NotifierPort, RouteOutcome, Unconfigured,
    WorkerDirectory, dataset, simulate::Simulator,
};
use binroute_provider_google as google;
use binroute_provider_twilio as twilio;
use chrono::{Days, Local, NaiveDate};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use reqwest::Client;
use tracing::info;

use crate::app::{App, DataSource};
use crate::cli::Cli;
use crate::config::AppConfig;
use crate::input::Action;

/// Days of waste history shown on the analytics screen.
const HISTORY_DAYS: u32 = 30;

/// First day of the history window that ends on `today`.
fn history_start(today: NaiveDate) -> NaiveDate {
    today
        .checked_sub_days(Days::new(u64::from(HISTORY_DAYS - 1)))
        .unwrap_or(today)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    // HTTP + service setup
    let client = Client::builder().user_agent("binroute/0.1").build()?;

    let directions: Arc<dyn DirectionsPort> = match &config.providers.google_api_key {
        Some(key) => google::port(client.clone(), key.clone()),
        None => Arc::new(Unconfigured::new("directions")),
    };
    let notifier: Arc<dyn NotifierPort> = match &config.providers.twilio {
        Some(credentials) => twilio::port(client.clone(), credentials.clone()),
        None => Arc::new(Unconfigured::new("sms")),
    };
    let workers = match &config.workers_file {
        Some(path) => WorkerDirectory::new(dataset::workers_from_path(path)?),
        None => WorkerDirectory::demo(),
    };

    let service = Arc::new(DispatchService::new(
        directions,
        notifier,
        workers,
        NearestAssigner::new(config.distance),
    ));

    // Data setup
    let mut simulator = Simulator::new(cli.seed);
    // History is simulated for `--bins` bins even when the live batch comes from CSV.
    let start = history_start(Local::now().date_naive());
    let waste = simulator.monthly_waste(cli.bins, start, HISTORY_DAYS);

    let source = match (cli.bins_csv, cli.vans_csv) {
        (Some(bins), Some(vans)) => DataSource::Files { bins, vans },
        _ => DataSource::Simulated {
            simulator,
            bins: cli.bins,
            vans: cli.vans,
        },
    };

    info!(
        seed = cli.seed,
        metric = ?config.distance,
        directions = config.providers.google_api_key.is_some(),
        sms = config.providers.twilio.is_some(),
        "starting dashboard"
    );

    // App state
    let app = App::new(service, source, waste);

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

async fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, mut app: App) -> Result<()> {
    loop {
        // Draw current UI
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Poll for input (non-blocking, small timeout to keep CPU low)
        if event::poll(StdDuration::from_millis(100))?
            && let CEvent::Key(key) = event::read()?
        {
            let action = input::handle_key_event(key, &mut app);

            match action {
                Action::Quit => break,
                Action::None => {}
                Action::Refresh => app.refresh(),
                Action::LoadRoutes => {
                    let Some(plan) = app.plan.clone() else {
                        app.error_message = Some("No dispatch plan, press r to refresh".into());
                        continue;
                    };
                    let selection = app.route_selection();

                    app.is_loading = true;
                    app.error_message = None;
                    app.info_message = None;
                    terminal.draw(|frame| ui::draw(frame, &app))?;

                    let res = app.service.routes(&plan, &selection).await;

                    app.is_loading = false;
                    match res {
                        Ok(routes) => {
                            let failed = routes
                                .iter()
                                .filter(|route| matches!(route.outcome, RouteOutcome::Failed { .. }))
                                .count();
                            app.info_message = Some(format!(
                                "Fetched {} routes, {failed} failed",
                                routes.len()
                            ));
                            app.routes = routes;
                        }
                        Err(err) => {
                            app.routes.clear();
                            app.error_message = Some(format!("Failed to load routes: {err}"));
                        }
                    }
                }
                Action::NotifyWorker => {
                    let Some(plan) = app.plan.clone() else {
                        app.error_message = Some("No dispatch plan, press r to refresh".into());
                        continue;
                    };
                    let Some(worker_id) = app.selected_worker().map(|worker| worker.worker_id)
                    else {
                        app.error_message = Some("No worker selected".into());
                        continue;
                    };
                    let Some(bin_id) = app.notify_bin().cloned() else {
                        app.error_message = Some("No bin to assign".into());
                        continue;
                    };

                    app.is_loading = true;
                    app.error_message = None;
                    app.info_message = None;
                    terminal.draw(|frame| ui::draw(frame, &app))?;

                    let res = app.service.notify_worker(&plan, worker_id, &bin_id).await;

                    app.is_loading = false;
                    match res {
                        Ok(notice) => {
                            app.info_message = Some(format!(
                                "Notified worker {} at {}",
                                notice.worker_id, notice.phone
                            ));
                        }
                        Err(err) => {
                            app.error_message = Some(format!("Notification failed: {err}"));
                        }
                    }
                }
                Action::NotifyDriver => {
                    let Some(plan) = app.plan.clone() else {
                        app.error_message = Some("No dispatch plan, press r to refresh".into());
                        continue;
                    };
                    let Some(vehicle_id) = app
                        .selected_worker()
                        .and_then(|worker| worker.vehicle.clone())
                    else {
                        app.error_message = Some("Selected worker does not drive a van".into());
                        continue;
                    };

                    app.is_loading = true;
                    app.error_message = None;
                    app.info_message = None;
                    terminal.draw(|frame| ui::draw(frame, &app))?;

                    let res = app.service.notify_driver(&plan, &vehicle_id).await;

                    app.is_loading = false;
                    match res {
                        Ok(notice) => {
                            app.info_message =
                                Some(format!("Sent {vehicle_id} route to {}", notice.phone));
                        }
                        Err(err) => {
                            app.error_message = Some(format!("Notification failed: {err}"));
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_window_ends_today() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).expect("valid date");

        let start = history_start(today);

        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 2, 10).expect("valid date"));
        let days = Simulator::new(1)
            .monthly_waste(1, start, HISTORY_DAYS)
            .into_iter()
            .map(|record| record.date)
            .max();
        assert_eq!(days, Some(today));
    }
}
