//! Keyboard and terminal events mapped onto runtime commands.

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use livedisplay_runtime::Command;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// Step applied by `+` and `-`, in seconds
pub const TIMEOUT_STEP_SECS: i64 = 1;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Command(Command),
    ToggleSettingsPanel,
}

pub fn map_key(key: &KeyEvent) -> Option<InputAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(InputAction::Command(Command::Quit)),
            _ => None,
        };
    }

    let command = match key.code {
        KeyCode::Char('s') => return Some(InputAction::ToggleSettingsPanel),
        KeyCode::Char('t') => Command::ToggleTheme,
        KeyCode::Char('c') => Command::ToggleQuickChange,
        KeyCode::Char('+') | KeyCode::Char('=') => Command::AdjustTimeout(TIMEOUT_STEP_SECS),
        KeyCode::Char('-') => Command::AdjustTimeout(-TIMEOUT_STEP_SECS),
        KeyCode::Char('n') | KeyCode::Right => Command::NextPage,
        KeyCode::Char('q') | KeyCode::Esc => Command::Quit,
        _ => return None,
    };
    Some(InputAction::Command(command))
}

pub fn map_event(event: &Event) -> Option<InputAction> {
    match event {
        Event::Key(key) => map_key(key),
        Event::FocusLost => Some(InputAction::Command(Command::Visibility(false))),
        Event::FocusGained => Some(InputAction::Command(Command::Visibility(true))),
        Event::Resize(_, _) => Some(InputAction::Command(Command::Resize)),
        _ => None,
    }
}

/// Read terminal events on a dedicated thread until the runtime stops
/// listening or the user quits.
pub fn spawn(commands: UnboundedSender<Command>, panel_open: Arc<AtomicBool>) -> JoinHandle<()> {
    std::thread::spawn(move || {
        while !commands.is_closed() {
            let ready = match event::poll(POLL_INTERVAL) {
                Ok(ready) => ready,
                Err(err) => {
                    tracing::warn!(error = %err, "terminal input failed");
                    let _ = commands.send(Command::Quit);
                    break;
                }
            };
            if !ready {
                continue;
            }

            let event = match event::read() {
                Ok(event) => event,
                Err(err) => {
                    tracing::warn!(error = %err, "terminal input failed");
                    let _ = commands.send(Command::Quit);
                    break;
                }
            };

            match map_event(&event) {
                Some(InputAction::ToggleSettingsPanel) => {
                    panel_open.fetch_xor(true, Ordering::SeqCst);
                }
                Some(InputAction::Command(command)) => {
                    if commands.send(command).is_err() || command == Command::Quit {
                        break;
                    }
                }
                None => {}
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_key_bindings() {
        assert_eq!(
            map_event(&key(KeyCode::Char('t'))),
            Some(InputAction::Command(Command::ToggleTheme))
        );
        assert_eq!(
            map_event(&key(KeyCode::Char('c'))),
            Some(InputAction::Command(Command::ToggleQuickChange))
        );
        assert_eq!(
            map_event(&key(KeyCode::Right)),
            Some(InputAction::Command(Command::NextPage))
        );
        assert_eq!(
            map_event(&key(KeyCode::Char('-'))),
            Some(InputAction::Command(Command::AdjustTimeout(-1)))
        );
        assert_eq!(
            map_event(&key(KeyCode::Char('s'))),
            Some(InputAction::ToggleSettingsPanel)
        );
        assert_eq!(map_event(&key(KeyCode::Char('x'))), None);
    }

    #[test]
    fn test_ctrl_c_quits_instead_of_toggling() {
        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(
            map_event(&ctrl_c),
            Some(InputAction::Command(Command::Quit))
        );
        assert_eq!(
            map_event(&key(KeyCode::Esc)),
            Some(InputAction::Command(Command::Quit))
        );
    }

    #[test]
    fn test_focus_and_resize() {
        assert_eq!(
            map_event(&Event::FocusLost),
            Some(InputAction::Command(Command::Visibility(false)))
        );
        assert_eq!(
            map_event(&Event::FocusGained),
            Some(InputAction::Command(Command::Visibility(true)))
        );
        assert_eq!(
            map_event(&Event::Resize(120, 40)),
            Some(InputAction::Command(Command::Resize))
        );
    }
}
