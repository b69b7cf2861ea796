use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use binroute_core::{
    BinReading, DispatchPlan, DispatchService, RouteSelection, Vehicle, VehicleRoute,
    analytics::{self, DailyTotal, MonthlySummary},
    dataset,
    model::{BinId, DailyWaste, VehicleId, Worker},
    simulate::Simulator,
};
use chrono::Local;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Bins,
    Routes,
    Workers,
    Analytics,
}

impl Screen {
    pub(crate) const ALL: [Screen; 4] = [
        Screen::Bins,
        Screen::Routes,
        Screen::Workers,
        Screen::Analytics,
    ];

    pub(crate) fn title(self) -> &'static str {
        match self {
            Screen::Bins => "1 Bins",
            Screen::Routes => "2 Routes",
            Screen::Workers => "3 Workers",
            Screen::Analytics => "4 Analytics",
        }
    }

    pub(crate) fn next(self) -> Self {
        match self {
            Screen::Bins => Screen::Routes,
            Screen::Routes => Screen::Workers,
            Screen::Workers => Screen::Analytics,
            Screen::Analytics => Screen::Bins,
        }
    }
}

/// Where each refresh takes its bins and vans from.
pub(crate) enum DataSource {
    Simulated {
        simulator: Simulator,
        bins: usize,
        vans: usize,
    },
    Files {
        bins: PathBuf,
        vans: PathBuf,
    },
}

impl DataSource {
    fn load(&mut self) -> Result<(Vec<BinReading>, Vec<Vehicle>)> {
        match self {
            DataSource::Simulated {
                simulator,
                bins,
                vans,
            } => {
                let now = Local::now().naive_local();
                Ok((simulator.bins(*bins, now), simulator.vans(*vans)))
            }
            DataSource::Files { bins, vans } => Ok((
                dataset::bins_from_path(bins.as_path())?,
                dataset::vehicles_from_path(vans.as_path())?,
            )),
        }
    }
}

pub(crate) struct App {
    pub service: Arc<DispatchService>,
    source: DataSource,

    pub screen: Screen,
    pub plan: Option<DispatchPlan>,
    pub bin_list_index: usize,

    /// 0 is "All", `n` is the n-th van of the plan.
    pub route_list_index: usize,
    pub routes: Vec<VehicleRoute>,

    pub worker_list_index: usize,
    pub notify_bin_index: usize,

    pub waste: Vec<DailyWaste>,
    pub daily_totals: Vec<DailyTotal>,
    pub summary: Option<MonthlySummary>,
    pub analytics_bin_index: usize,

    pub is_loading: bool,
    pub error_message: Option<String>,
    pub info_message: Option<String>,
}

impl App {
    pub(crate) fn new(
        service: Arc<DispatchService>,
        source: DataSource,
        waste: Vec<DailyWaste>,
    ) -> Self {
        let daily_totals = analytics::daily_totals(&waste);
        let summary = analytics::summarize(&waste);
        let mut app = Self {
            service,
            source,
            screen: Screen::Bins,
            plan: None,
            bin_list_index: 0,
            route_list_index: 0,
            routes: Vec::new(),
            worker_list_index: 0,
            notify_bin_index: 0,
            waste,
            daily_totals,
            summary,
            analytics_bin_index: 0,
            is_loading: false,
            error_message: None,
            info_message: None,
        };
        app.refresh();
        app
    }

    /// Pull a fresh batch and plan it. Routes of the previous batch are dropped.
    pub(crate) fn refresh(&mut self) {
        self.routes.clear();
        self.info_message = None;

        let planned = self
            .source
            .load()
            .and_then(|(bins, vans)| {
                self.service
                    .plan(bins, vans)
                    .map_err(anyhow::Error::from)
            });

        match planned {
            Ok(plan) => {
                info!(bins = plan.bins().len(), "dashboard refreshed");
                self.plan = Some(plan);
                self.error_message = None;
                self.clamp_indices();
            }
            Err(err) => {
                warn!(error = %err, "refresh failed");
                self.plan = None;
                self.error_message = Some(format!("Refresh failed: {err}"));
            }
        }
    }

    pub(crate) fn bins_len(&self) -> usize {
        self.plan.as_ref().map_or(0, |plan| plan.bins().len())
    }

    pub(crate) fn vans_len(&self) -> usize {
        self.plan.as_ref().map_or(0, |plan| plan.vehicles().len())
    }

    pub(crate) fn workers(&self) -> &[Worker] {
        self.service.workers().workers()
    }

    pub(crate) fn selected_van(&self) -> Option<&VehicleId> {
        let plan = self.plan.as_ref()?;
        let idx = self.route_list_index.checked_sub(1)?;
        plan.vehicles().get(idx).map(|vehicle| &vehicle.vehicle_id)
    }

    pub(crate) fn route_selection(&self) -> RouteSelection {
        self.selected_van()
            .map_or(RouteSelection::All, |van| RouteSelection::Vehicle(van.clone()))
    }

    pub(crate) fn selected_worker(&self) -> Option<&Worker> {
        self.workers().get(self.worker_list_index)
    }

    pub(crate) fn notify_bin(&self) -> Option<&BinId> {
        self.plan
            .as_ref()?
            .bins()
            .get(self.notify_bin_index)
            .map(|bin| bin.bin_id())
    }

    /// Bin ids that have waste history, in first-seen order.
    pub(crate) fn waste_bins(&self) -> Vec<&BinId> {
        let mut ids: Vec<&BinId> = Vec::new();
        for record in &self.waste {
            if !ids.contains(&&record.bin_id) {
                ids.push(&record.bin_id);
            }
        }
        ids
    }

    pub(crate) fn analytics_bin(&self) -> Option<&BinId> {
        self.waste_bins().get(self.analytics_bin_index).copied()
    }

    fn clamp_indices(&mut self) {
        let bins = self.bins_len();
        let vans = self.vans_len();
        self.bin_list_index = self.bin_list_index.min(bins.saturating_sub(1));
        self.notify_bin_index = self.notify_bin_index.min(bins.saturating_sub(1));
        self.route_list_index = self.route_list_index.min(vans);
    }
}

/// Move a list cursor by one, staying within `0..len`.
pub(crate) fn step(index: usize, len: usize, forward: bool) -> usize {
    if forward {
        if index + 1 < len { index + 1 } else { index }
    } else {
        index.saturating_sub(1)
    }
}

/// Move a cursor by one, wrapping around at both ends.
pub(crate) fn cycle(index: usize, len: usize, forward: bool) -> usize {
    match (len, forward) {
        (0, _) => 0,
        (_, true) => (index + 1) % len,
        (_, false) => index.checked_sub(1).unwrap_or(len - 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_stops_at_edges() {
        assert_eq!(step(0, 3, false), 0);
        assert_eq!(step(1, 3, true), 2);
        assert_eq!(step(2, 3, true), 2);
        assert_eq!(step(0, 0, true), 0);
    }

    #[test]
    fn cycle_wraps_around() {
        assert_eq!(cycle(2, 3, true), 0);
        assert_eq!(cycle(0, 3, false), 2);
        assert_eq!(cycle(0, 0, false), 0);
    }
}
