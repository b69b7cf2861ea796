use binroute_core::{
    DispatchPlan, RouteOutcome, VehicleRoute, analytics,
    model::{Coordinate, VehicleId},
};
use chrono::NaiveDate;
use ratatui::{
    prelude::*,
    symbols::Marker,
    widgets::{
        Axis, Block, Borders, Cell, Chart, Dataset, GraphType, List, ListItem, ListState,
        Paragraph, Row, Table, TableState, Tabs, Wrap,
        canvas::{Canvas, Line as CanvasLine, Points},
    },
};

use crate::app::{App, Screen};

const ROUTE_COLORS: [Color; 6] = [
    Color::Cyan,
    Color::Magenta,
    Color::Green,
    Color::Yellow,
    Color::LightBlue,
    Color::LightRed,
];

pub(crate) fn draw(frame: &mut Frame<'_>, app: &App) {
    let area = frame.area();

    // Outer layout: tabs, main content, status line
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [header_area, content_area, status_area] = chunks else {
        return;
    };

    let selected_tab = Screen::ALL
        .iter()
        .position(|screen| *screen == app.screen)
        .unwrap_or_default();
    let tabs = Tabs::new(Screen::ALL.iter().map(|screen| screen.title()))
        .select(selected_tab)
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("binroute – smart waste collection"),
        );
    frame.render_widget(tabs, *header_area);

    match app.screen {
        Screen::Bins => draw_bins(frame, app, *content_area),
        Screen::Routes => draw_routes(frame, app, *content_area),
        Screen::Workers => draw_workers(frame, app, *content_area),
        Screen::Analytics => draw_analytics(frame, app, *content_area),
    }

    // Status bar
    let nav_hint = match app.screen {
        Screen::Bins => "↑/↓ move · r refresh · Tab/1-4 screens · q/Ctrl-C quit",
        Screen::Routes => "↑/↓ pick van · Enter fetch routes · r refresh · q/Ctrl-C quit",
        Screen::Workers => {
            "↑/↓ worker · ←/→ bin · Enter notify worker · d notify driver · q/Ctrl-C quit"
        }
        Screen::Analytics => "←/→ pick bin · Tab/1-4 screens · q/Ctrl-C quit",
    };

    let status_text = if app.is_loading {
        format!("Loading… · {nav_hint}")
    } else if let Some(msg) = &app.error_message {
        format!("{msg} · {nav_hint}")
    } else if let Some(msg) = &app.info_message {
        format!("{msg} · {nav_hint}")
    } else {
        nav_hint.to_owned()
    };

    let status_style = if app.error_message.is_some() {
        Style::default().fg(Color::Red)
    } else if app.is_loading {
        Style::default().fg(Color::Yellow)
    } else if app.info_message.is_some() {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };

    let status = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(status_style)
        .wrap(Wrap { trim: true });

    frame.render_widget(status, *status_area);
}

fn no_plan(frame: &mut Frame<'_>, area: Rect, title: &str) {
    let paragraph = Paragraph::new("No dispatch plan. Press r to load a new batch.")
        .block(Block::default().borders(Borders::ALL).title(title.to_owned()))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn draw_bins(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let title = "Bins by priority";
    let Some(plan) = app.plan.as_ref() else {
        no_plan(frame, area, title);
        return;
    };

    let rows = plan.bins().iter().map(|bin| {
        let reading = &bin.reading;
        let van = plan
            .assignment()
            .vehicle_for(bin.bin_id())
            .map_or_else(|| "-".to_owned(), ToString::to_string);
        let fill_style = match reading.fill_level_pct {
            level if level >= 80.0 => Style::default().fg(Color::Red),
            level if level >= 50.0 => Style::default().fg(Color::Yellow),
            _ => Style::default().fg(Color::Green),
        };

        Row::new(vec![
            Cell::from(bin.bin_id().to_string()),
            Cell::from(format!("{:.0}%", reading.fill_level_pct)).style(fill_style),
            Cell::from(format!("{:.1} °C", reading.temperature_c)),
            Cell::from(format!("{:.0}%", reading.humidity_pct)),
            Cell::from(if reading.tilt { "yes" } else { "no" }),
            Cell::from(format!("{:.2}", bin.priority)),
            Cell::from(van),
            Cell::from(reading.timestamp.format("%d.%m. %H:%M").to_string()),
        ])
    });

    let column_widths = [
        Constraint::Length(10),
        Constraint::Length(6),
        Constraint::Length(9),
        Constraint::Length(9),
        Constraint::Length(5),
        Constraint::Length(9),
        Constraint::Length(8),
        Constraint::Min(12),
    ];

    let table = Table::new(rows, column_widths)
        .header(
            Row::new(vec![
                "Bin", "Fill", "Temp", "Humidity", "Tilt", "Priority", "Van", "Updated",
            ])
            .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .column_spacing(1);

    let mut state = TableState::default();
    if !plan.bins().is_empty() {
        state.select(Some(app.bin_list_index));
    }
    frame.render_stateful_widget(table, area, &mut state);
}

fn draw_routes(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let title = "Routes";
    let Some(plan) = app.plan.as_ref() else {
        no_plan(frame, area, title);
        return;
    };

    let layout_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(0)])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [list_area, map_area] = chunks else {
        return;
    };

    let mut items = vec![ListItem::new("All vans")];
    items.extend(plan.vehicles().iter().enumerate().map(|(idx, vehicle)| {
        let stops = plan.assigned_bins(&vehicle.vehicle_id).count();
        let mut label = format!("{} ({stops} bins)", vehicle.vehicle_id);
        if let Some(reason) = failure_for(&app.routes, &vehicle.vehicle_id) {
            label = format!("{label} ✗ {reason}");
        }
        ListItem::new(label).style(Style::default().fg(route_color(idx)))
    }));

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Vans (Enter to route)"),
        )
        .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED));

    let mut state = ListState::default();
    state.select(Some(app.route_list_index));
    frame.render_stateful_widget(list, *list_area, &mut state);

    draw_map(frame, plan, &app.routes, *map_area);
}

fn failure_for<'routes>(
    routes: &'routes [VehicleRoute],
    vehicle: &VehicleId,
) -> Option<&'routes str> {
    routes
        .iter()
        .find(|route| &route.vehicle_id == vehicle)
        .and_then(|route| match &route.outcome {
            RouteOutcome::Failed { reason } => Some(reason.as_str()),
            RouteOutcome::Routed { .. } => None,
        })
}

fn draw_map(frame: &mut Frame<'_>, plan: &DispatchPlan, routes: &[VehicleRoute], area: Rect) {
    let positions = plan
        .bins()
        .iter()
        .map(|bin| bin.reading.location)
        .chain(plan.vehicles().iter().map(|vehicle| vehicle.location));
    let (lon_bounds, lat_bounds) = bounds(positions);

    let canvas = Canvas::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Map (bins •, vans ■)"),
        )
        .marker(Marker::Braille)
        .x_bounds(lon_bounds)
        .y_bounds(lat_bounds)
        .paint(|ctx| {
            for route in routes {
                let RouteOutcome::Routed { path } = &route.outcome else {
                    continue;
                };
                let color = vehicle_color(plan, &route.vehicle_id);
                for leg in path.windows(2) {
                    if let [from, to] = leg {
                        ctx.draw(&CanvasLine {
                            x1: from.lon,
                            y1: from.lat,
                            x2: to.lon,
                            y2: to.lat,
                            color,
                        });
                    }
                }
            }
            ctx.layer();

            for bin in plan.bins() {
                let color = plan
                    .assignment()
                    .vehicle_for(bin.bin_id())
                    .map_or(Color::Gray, |van| vehicle_color(plan, van));
                let location = bin.reading.location;
                ctx.draw(&Points {
                    coords: &[(location.lon, location.lat)],
                    color,
                });
            }
            for (idx, vehicle) in plan.vehicles().iter().enumerate() {
                let location = vehicle.location;
                ctx.print(
                    location.lon,
                    location.lat,
                    Span::styled("■", Style::default().fg(route_color(idx))),
                );
            }
        });

    frame.render_widget(canvas, area);
}

/// Longitude and latitude bounds around all points, padded so markers stay inside.
fn bounds(points: impl Iterator<Item = Coordinate>) -> ([f64; 2], [f64; 2]) {
    let (mut west, mut east) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut south, mut north) = (f64::INFINITY, f64::NEG_INFINITY);
    for point in points {
        west = west.min(point.lon);
        east = east.max(point.lon);
        south = south.min(point.lat);
        north = north.max(point.lat);
    }
    if !west.is_finite() || !south.is_finite() {
        return ([-180.0, 180.0], [-90.0, 90.0]);
    }
    let pad_lon = ((east - west) * 0.05).max(0.01);
    let pad_lat = ((north - south) * 0.05).max(0.01);
    (
        [west - pad_lon, east + pad_lon],
        [south - pad_lat, north + pad_lat],
    )
}

fn route_color(idx: usize) -> Color {
    ROUTE_COLORS
        .get(idx % ROUTE_COLORS.len())
        .copied()
        .unwrap_or(Color::White)
}

fn vehicle_color(plan: &DispatchPlan, vehicle: &VehicleId) -> Color {
    plan.vehicles()
        .iter()
        .position(|candidate| &candidate.vehicle_id == vehicle)
        .map_or(Color::Gray, route_color)
}

fn draw_workers(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [table_area, bin_area] = chunks else {
        return;
    };

    let rows = app.workers().iter().map(|worker| {
        Row::new(vec![
            Cell::from(worker.worker_id.to_string()),
            Cell::from(worker.name.clone()),
            Cell::from(worker.zone.clone()),
            Cell::from(worker.phone.to_string()),
            Cell::from(
                worker
                    .vehicle
                    .as_ref()
                    .map_or_else(|| "-".to_owned(), ToString::to_string),
            ),
        ])
    });

    let column_widths = [
        Constraint::Length(6),
        Constraint::Length(16),
        Constraint::Length(10),
        Constraint::Length(16),
        Constraint::Min(8),
    ];

    let table = Table::new(rows, column_widths)
        .header(
            Row::new(vec!["ID", "Name", "Zone", "Phone", "Van"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL).title("Workers"))
        .row_highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .column_spacing(1);

    let mut state = TableState::default();
    if !app.workers().is_empty() {
        state.select(Some(app.worker_list_index));
    }
    frame.render_stateful_widget(table, *table_area, &mut state);

    let bin_text = match app.notify_bin() {
        Some(bin_id) => {
            let van = app
                .plan
                .as_ref()
                .and_then(|plan| plan.assignment().vehicle_for(bin_id))
                .map_or_else(|| "unassigned".to_owned(), |van| format!("on {van}"));
            format!("{bin_id} ({van})")
        }
        None => "<no bins>".to_owned(),
    };
    let bin = Paragraph::new(bin_text).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Bin to assign (←/→)"),
    );
    frame.render_widget(bin, *bin_area);
}

fn draw_analytics(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(0)])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [summary_area, chart_area] = chunks else {
        return;
    };

    let summary_text = match &app.summary {
        Some(summary) => format!(
            "Total waste: {:.1} kg\nCarbon footprint: {:.2} kg CO2\nPeak day: {}",
            summary.total_waste_kg,
            summary.total_carbon_kg,
            summary.peak_day.format("%d.%m.%Y"),
        ),
        None => "No waste history recorded.".to_owned(),
    };
    let summary = Paragraph::new(summary_text)
        .block(Block::default().borders(Borders::ALL).title("Monthly summary"));
    frame.render_widget(summary, *summary_area);

    let Some(first_day) = app.daily_totals.first().map(|total| total.date) else {
        return;
    };
    let day_offset = |date: NaiveDate| {
        i32::try_from((date - first_day).num_days()).map_or(0.0, f64::from)
    };

    let totals: Vec<(f64, f64)> = app
        .daily_totals
        .iter()
        .map(|total| (day_offset(total.date), total.waste_kg))
        .collect();

    let bin_label = app
        .analytics_bin()
        .map_or_else(|| "<none>".to_owned(), ToString::to_string);
    let series: Vec<(f64, f64)> = app
        .analytics_bin()
        .map(|bin_id| analytics::per_bin_series(&app.waste, bin_id))
        .unwrap_or_default()
        .into_iter()
        .map(|(date, waste_kg)| (day_offset(date), waste_kg))
        .collect();

    let max_day = totals.last().map_or(1.0, |(day, _)| day.max(1.0));
    let max_waste = totals
        .iter()
        .map(|(_, waste_kg)| *waste_kg)
        .fold(0.0_f64, f64::max)
        .max(1.0);

    let datasets = vec![
        Dataset::default()
            .name("All bins")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&totals),
        Dataset::default()
            .name(bin_label.clone())
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Yellow))
            .data(&series),
    ];

    let last_day = app
        .daily_totals
        .last()
        .map_or(first_day, |total| total.date);
    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Daily waste (kg) · {bin_label} (←/→)")),
        )
        .x_axis(
            Axis::default()
                .title("Day")
                .bounds([0.0, max_day])
                .labels([
                    first_day.format("%d.%m.").to_string(),
                    last_day.format("%d.%m.").to_string(),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("kg")
                .bounds([0.0, max_waste])
                .labels(["0".to_owned(), format!("{max_waste:.0}")]),
        );

    frame.render_widget(chart, *chart_area);
}

#[cfg(test)]
mod tests {
    use std::iter;

    use super::*;

    #[test]
    fn bounds_are_padded_around_points() {
        let (lon, lat) =
            bounds([Coordinate::new(28.5, 77.0), Coordinate::new(28.9, 77.5)].into_iter());

        assert!(lon[0] < 77.0 && lon[1] > 77.5, "longitude padded: {lon:?}");
        assert!(lat[0] < 28.5 && lat[1] > 28.9, "latitude padded: {lat:?}");
    }

    #[test]
    fn bounds_fall_back_to_world_without_points() {
        let (lon, lat) = bounds(iter::empty());

        assert_eq!(lon, [-180.0, 180.0]);
        assert_eq!(lat, [-90.0, 90.0]);
    }

    #[test]
    fn route_colors_repeat() {
        assert_eq!(route_color(0), route_color(ROUTE_COLORS.len()));
    }
}
