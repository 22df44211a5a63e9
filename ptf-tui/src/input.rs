use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, Screen};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    None,
    Quit,
    /// Run `service.features`/`service.nearest` for the selected layer
    LoadFeatures,
}

pub(crate) fn handle_key_event(key: KeyEvent, app: &mut App) -> Action {
    use KeyCode::{Backspace, Char, Down, Enter, Esc, Left, Right, Tab, Up};

    let control = key.modifiers.contains(KeyModifiers::CONTROL);

    // Global shortcuts
    if key.code == Char('c') && control {
        return Action::Quit;
    }
    // `q` is a filter character on the feature list
    if key.code == Char('q') && key.modifiers.is_empty() && app.screen != Screen::FeatureList {
        return Action::Quit;
    }

    let mut action = Action::None;

    match app.screen {
        Screen::LayerSelect => match key.code {
            Up | Char('k') => {
                app.layer_list_index = app.layer_list_index.saturating_sub(1);
            }
            Down | Char('j') => {
                if app.layer_list_index + 1 < app.layers.len() {
                    app.layer_list_index += 1;
                }
            }
            Enter | Char(' ') => {
                if app.select_current_layer().is_some() {
                    action = Action::LoadFeatures;
                }
            }
            _ => {}
        },

        Screen::FeatureList => match key.code {
            Char('r') if control => {
                action = Action::LoadFeatures;
            }
            Up => {
                app.entry_list_index = app.entry_list_index.saturating_sub(1);
            }
            Down => {
                if app.entry_list_index + 1 < app.visible_entries().len() {
                    app.entry_list_index += 1;
                }
            }
            Char(character) => {
                if !control && !key.modifiers.contains(KeyModifiers::ALT) {
                    app.filter_input.push(character);
                    app.entry_list_index = 0;
                }
            }
            Backspace => {
                app.filter_input.pop();
                app.entry_list_index = 0;
            }
            Enter | Right | Tab => {
                if app.select_current_entry().is_none() {
                    app.error_message = Some("No feature selected".into());
                }
            }
            Left | Esc => {
                app.back_to_layers();
            }
            _ => {}
        },

        Screen::FeatureDetail => match key.code {
            Char('r') if control => {
                app.screen = Screen::FeatureList;
                action = Action::LoadFeatures;
            }
            Left | Esc | Char('b') => {
                app.screen = Screen::FeatureList;
            }
            _ => {}
        },
    }
    action
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::{empty_app, entry};

    fn press(app: &mut App, code: KeyCode) -> Action {
        handle_key_event(KeyEvent::new(code, KeyModifiers::NONE), app)
    }

    #[test]
    fn quits_from_layer_select() {
        let mut app = empty_app();
        assert_eq!(press(&mut app, KeyCode::Char('q')), Action::Quit);

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handle_key_event(ctrl_c, &mut app), Action::Quit);
    }

    #[test]
    fn layer_navigation_stays_in_bounds() {
        let mut app = empty_app();
        press(&mut app, KeyCode::Up);
        assert_eq!(app.layer_list_index, 0);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.layer_list_index, 1);
    }

    #[test]
    fn entering_a_layer_requests_features() {
        let mut app = empty_app();
        assert_eq!(press(&mut app, KeyCode::Enter), Action::LoadFeatures);
        assert_eq!(app.screen, Screen::FeatureList);
    }

    #[test]
    fn typing_filters_and_q_is_text() {
        let mut app = empty_app();
        press(&mut app, KeyCode::Enter);
        app.set_entries(vec![entry("1", "Quai"), entry("2", "Markt")]);

        assert_eq!(press(&mut app, KeyCode::Char('q')), Action::None);
        assert_eq!(app.filter_input, "q");
        assert_eq!(app.visible_entries().len(), 1);

        press(&mut app, KeyCode::Backspace);
        assert!(app.filter_input.is_empty());

        let reload = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL);
        assert_eq!(handle_key_event(reload, &mut app), Action::LoadFeatures);
        assert!(app.filter_input.is_empty());
    }

    #[test]
    fn detail_and_back() {
        let mut app = empty_app();
        press(&mut app, KeyCode::Enter);
        app.set_entries(vec![entry("1", "Markt")]);

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen, Screen::FeatureDetail);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen, Screen::FeatureList);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen, Screen::LayerSelect);
        assert!(app.entries.is_empty());
    }

    #[test]
    fn detail_view_reloads_and_quits() {
        let mut app = empty_app();
        press(&mut app, KeyCode::Enter);
        app.set_entries(vec![entry("1", "Markt")]);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen, Screen::FeatureDetail);

        // Plain `r` is not bound on the detail view.
        assert_eq!(press(&mut app, KeyCode::Char('r')), Action::None);
        assert_eq!(app.screen, Screen::FeatureDetail);

        let reload = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL);
        assert_eq!(handle_key_event(reload, &mut app), Action::LoadFeatures);
        assert_eq!(app.screen, Screen::FeatureList);

        press(&mut app, KeyCode::Enter);
        assert_eq!(press(&mut app, KeyCode::Char('q')), Action::Quit);
    }
}
