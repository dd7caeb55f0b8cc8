//! Keyboard input handling for the TUI.
//!
//! Translates key events into application state changes. Dispatch is
//! state-first: overlays capture every key until closed.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{App, AppState, Focus};

/// Handle a key event. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match app.state {
        AppState::AddingPet => {
            handle_pet_form_input(app, key);
            return Ok(false);
        }
        AppState::AddingCare => {
            handle_care_form_input(app, key);
            return Ok(false);
        }
        AppState::ConfirmingDelete => {
            handle_delete_confirm_input(app, key);
            return Ok(false);
        }
        AppState::ShowingHelp => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.state = AppState::Browsing;
            }
            return Ok(false);
        }
        AppState::Browsing | AppState::Quitting => {}
    }

    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::Quitting;
            return Ok(true);
        }
        KeyCode::Char('?') => app.state = AppState::ShowingHelp,
        KeyCode::Tab | KeyCode::BackTab => {
            // The cares pane only takes focus once a pet is open
            app.focus = match app.focus {
                Focus::Pets if app.selected_pet.is_some() => Focus::Cares,
                _ => Focus::Pets,
            };
        }
        KeyCode::Up | KeyCode::Char('k') => app.move_selection(false),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(true),
        KeyCode::Enter => {
            if matches!(app.focus, Focus::Pets) {
                app.toggle_cares_pane();
            }
        }
        KeyCode::Char('a') => app.start_add_pet(),
        KeyCode::Char('c') => app.start_add_care(),
        KeyCode::Char('d') | KeyCode::Delete => app.request_delete(),
        KeyCode::Char('r') => app.refresh(),
        _ => {}
    }

    Ok(false)
}

fn handle_pet_form_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            if !app.pet_form.submitting {
                app.state = AppState::Browsing;
            }
        }
        KeyCode::Enter => app.submit_pet_form(),
        KeyCode::Tab | KeyCode::Down => app.pet_form.focus = app.pet_form.focus.next(),
        KeyCode::BackTab | KeyCode::Up => app.pet_form.focus = app.pet_form.focus.prev(),
        KeyCode::Left => app.pet_form.cycle(false),
        KeyCode::Right => app.pet_form.cycle(true),
        KeyCode::Backspace => app.pet_form.backspace(),
        KeyCode::Char(c) => app.pet_form.push_char(c),
        _ => {}
    }
}

fn handle_care_form_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            if !app.care_form.submitting {
                app.state = AppState::Browsing;
            }
        }
        KeyCode::Enter => app.submit_care_form(),
        KeyCode::Tab | KeyCode::Down => app.care_form.focus = app.care_form.focus.next(),
        KeyCode::BackTab | KeyCode::Up => app.care_form.focus = app.care_form.focus.prev(),
        KeyCode::Left => app.care_form.cycle(false),
        KeyCode::Right => app.care_form.cycle(true),
        KeyCode::Backspace => app.care_form.backspace(),
        KeyCode::Char(c) => app.care_form.push_char(c),
        _ => {}
    }
}

fn handle_delete_confirm_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm_delete(),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_delete(),
        _ => {}
    }
}
