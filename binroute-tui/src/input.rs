use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, Screen, cycle, step};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    None,
    Quit,
    /// Pull a new batch and re-plan
    Refresh,
    /// Run `service.routes`(...) for the selected van or all vans
    LoadRoutes,
    /// Run `service.notify_worker`(...) for the selected worker and bin
    NotifyWorker,
    /// Run `service.notify_driver`(...) for the selected worker's van
    NotifyDriver,
}

pub(crate) fn handle_key_event(key: KeyEvent, app: &mut App) -> Action {
    use KeyCode::{Char, Down, Enter, Left, Right, Tab, Up};

    // Global shortcuts
    if key.code == Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }
    if !key.modifiers.is_empty() && key.modifiers != KeyModifiers::SHIFT {
        return Action::None;
    }
    match key.code {
        Char('q') => return Action::Quit,
        Char('r') => return Action::Refresh,
        Tab => {
            app.screen = app.screen.next();
            return Action::None;
        }
        Char(digit @ '1'..='4') => {
            let position = digit.to_digit(10).and_then(|n| usize::try_from(n).ok());
            if let Some(screen) = position
                .and_then(|n| n.checked_sub(1))
                .and_then(|idx| Screen::ALL.get(idx))
            {
                app.screen = *screen;
            }
            return Action::None;
        }
        _ => {}
    }

    let mut action = Action::None;

    match app.screen {
        Screen::Bins => match key.code {
            Up | Char('k') => app.bin_list_index = step(app.bin_list_index, app.bins_len(), false),
            Down | Char('j') => app.bin_list_index = step(app.bin_list_index, app.bins_len(), true),
            _ => {}
        },

        Screen::Routes => match key.code {
            // One extra entry for "All"
            Up | Char('k') => {
                app.route_list_index = step(app.route_list_index, app.vans_len() + 1, false);
            }
            Down | Char('j') => {
                app.route_list_index = step(app.route_list_index, app.vans_len() + 1, true);
            }
            Enter | Char(' ') => action = Action::LoadRoutes,
            _ => {}
        },

        Screen::Workers => match key.code {
            Up | Char('k') => {
                app.worker_list_index = step(app.worker_list_index, app.workers().len(), false);
            }
            Down | Char('j') => {
                app.worker_list_index = step(app.worker_list_index, app.workers().len(), true);
            }
            Left | Char('h') => {
                app.notify_bin_index = cycle(app.notify_bin_index, app.bins_len(), false);
            }
            Right | Char('l') => {
                app.notify_bin_index = cycle(app.notify_bin_index, app.bins_len(), true);
            }
            Enter => action = Action::NotifyWorker,
            Char('d') => action = Action::NotifyDriver,
            _ => {}
        },

        Screen::Analytics => match key.code {
            Left | Char('h') => {
                app.analytics_bin_index =
                    cycle(app.analytics_bin_index, app.waste_bins().len(), false);
            }
            Right | Char('l') => {
                app.analytics_bin_index =
                    cycle(app.analytics_bin_index, app.waste_bins().len(), true);
            }
            _ => {}
        },
    }
    action
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use binroute_core::{
        DispatchService, NearestAssigner, Unconfigured, WorkerDirectory, simulate::Simulator,
    };

    use super::*;
    use crate::app::DataSource;

    fn app() -> App {
        let service = DispatchService::new(
            Arc::new(Unconfigured::new("directions")),
            Arc::new(Unconfigured::new("sms")),
            WorkerDirectory::demo(),
            NearestAssigner::default(),
        );
        let source = DataSource::Simulated {
            simulator: Simulator::new(7),
            bins: 5,
            vans: 2,
        };
        App::new(Arc::new(service), source, Vec::new())
    }

    fn press(app: &mut App, code: KeyCode) -> Action {
        handle_key_event(KeyEvent::new(code, KeyModifiers::NONE), app)
    }

    #[test]
    fn quit_keys() {
        let mut app = app();

        assert_eq!(press(&mut app, KeyCode::Char('q')), Action::Quit);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handle_key_event(ctrl_c, &mut app), Action::Quit);
    }

    #[test]
    fn digits_and_tab_switch_screens() {
        let mut app = app();

        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.screen, Screen::Workers);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.screen, Screen::Analytics);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.screen, Screen::Bins);
    }

    #[test]
    fn route_cursor_covers_all_plus_each_van() {
        let mut app = app();
        press(&mut app, KeyCode::Char('2'));

        for _ in 0..5 {
            press(&mut app, KeyCode::Down);
        }
        assert_eq!(app.route_list_index, 2, "All + 2 vans");
        assert_eq!(press(&mut app, KeyCode::Enter), Action::LoadRoutes);
    }

    #[test]
    fn worker_screen_actions() {
        let mut app = app();
        press(&mut app, KeyCode::Char('3'));

        press(&mut app, KeyCode::Left);
        assert_eq!(app.notify_bin_index, 4, "bin cursor wraps");
        assert_eq!(press(&mut app, KeyCode::Enter), Action::NotifyWorker);
        assert_eq!(press(&mut app, KeyCode::Char('d')), Action::NotifyDriver);
    }
}
