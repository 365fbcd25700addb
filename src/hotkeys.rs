use std::sync::Mutex;

use log::{info, warn};
use tauri::{AppHandle, Manager, Runtime};
use tauri_plugin_global_shortcut::{
    Code, GlobalShortcutExt, Modifiers, Shortcut, ShortcutEvent, ShortcutState,
};

use crate::error::BindingError;
use crate::overlay::{Direction, OverlayController};
use crate::pipeline;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyAction {
    ToggleVisibility,
    CaptureAndAnalyze,
    MoveUp,
    MoveDown,
    ToggleAlwaysOnTop,
    Quit,
}

/// System-wide binding table, managed in Tauri state.
///
/// Insertion is idempotent per combo (re-binding replaces the action);
/// `clear` empties the table so a released combo dispatches nothing even if a
/// stray OS event still arrives.
#[derive(Default)]
pub struct Bindings {
    entries: Mutex<Vec<(Shortcut, HotkeyAction)>>,
}

impl Bindings {
    pub fn insert(&self, combo: Shortcut, action: HotkeyAction) {
        let mut entries = self.entries.lock().unwrap();
        if let Some(entry) = entries.iter_mut().find(|(existing, _)| *existing == combo) {
            entry.1 = action;
        } else {
            entries.push((combo, action));
        }
    }

    pub fn action_for(&self, combo: &Shortcut) -> Option<HotkeyAction> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .find(|(existing, _)| existing == combo)
            .map(|(_, action)| *action)
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn primary_modifiers() -> Modifiers {
    #[cfg(target_os = "macos")]
    {
        Modifiers::SUPER | Modifiers::SHIFT
    }
    #[cfg(not(target_os = "macos"))]
    {
        Modifiers::CONTROL | Modifiers::SHIFT
    }
}

/// Fixed hotkey surface; no user remapping.
pub fn default_bindings() -> Vec<(Shortcut, HotkeyAction)> {
    let mods = Some(primary_modifiers());
    vec![
        (Shortcut::new(mods, Code::KeyH), HotkeyAction::ToggleVisibility),
        (Shortcut::new(mods, Code::KeyJ), HotkeyAction::CaptureAndAnalyze),
        (Shortcut::new(mods, Code::ArrowUp), HotkeyAction::MoveUp),
        (Shortcut::new(mods, Code::ArrowDown), HotkeyAction::MoveDown),
        (Shortcut::new(mods, Code::KeyT), HotkeyAction::ToggleAlwaysOnTop),
        (Shortcut::new(mods, Code::KeyQ), HotkeyAction::Quit),
    ]
}

/// Register every default binding. A combo claimed by another process is
/// logged and skipped; the rest of the app keeps working without it.
pub fn register_all<R: Runtime>(app: &AppHandle<R>) -> anyhow::Result<()> {
    let bindings = app.state::<Bindings>();
    for (combo, action) in default_bindings() {
        match bind(app, &bindings, combo, action) {
            Ok(()) => info!("hotkey bound: {combo} -> {action:?}"),
            Err(err) => warn!("{err}"),
        }
    }
    Ok(())
}

fn bind<R: Runtime>(
    app: &AppHandle<R>,
    bindings: &Bindings,
    combo: Shortcut,
    action: HotkeyAction,
) -> Result<(), BindingError> {
    let shortcuts = app.global_shortcut();

    // Re-registering a combo replaces its previous binding.
    if bindings.action_for(&combo).is_some() {
        let _ = shortcuts.unregister(combo);
    }

    shortcuts.register(combo).map_err(|err| BindingError {
        combo: combo.to_string(),
        reason: err.to_string(),
    })?;

    bindings.insert(combo, action);
    Ok(())
}

/// Unregister every system hook and empty the dispatch table. Runs when
/// shutdown begins, before the process exits, so no hook outlives us.
pub fn release_all<R: Runtime>(app: &AppHandle<R>) {
    if let Err(err) = app.global_shortcut().unregister_all() {
        warn!("failed to unregister global shortcuts: {err}");
    }
    app.state::<Bindings>().clear();
    info!("global shortcuts released");
}

/// Global shortcut handler wired into the plugin at build time.
pub fn handle<R: Runtime>(app: &AppHandle<R>, shortcut: &Shortcut, event: ShortcutEvent) {
    if event.state != ShortcutState::Pressed {
        return;
    }
    let Some(action) = app.state::<Bindings>().action_for(shortcut) else {
        return;
    };
    dispatch(app, action);
}

fn dispatch<R: Runtime>(app: &AppHandle<R>, action: HotkeyAction) {
    let overlay = app.state::<OverlayController>();
    let result = match action {
        HotkeyAction::ToggleVisibility => overlay.toggle_visibility(app).map(|_| ()),
        HotkeyAction::CaptureAndAnalyze => {
            pipeline::spawn_cycle(app.clone());
            Ok(())
        }
        HotkeyAction::MoveUp => overlay.nudge(app, Direction::Up),
        HotkeyAction::MoveDown => overlay.nudge(app, Direction::Down),
        HotkeyAction::ToggleAlwaysOnTop => overlay.toggle_always_on_top(app).map(|_| ()),
        HotkeyAction::Quit => {
            info!("quit requested via hotkey");
            app.exit(0);
            Ok(())
        }
    };

    if let Err(err) = result {
        warn!("hotkey action {action:?} failed: {err:#}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bindings_cover_all_actions_with_unique_combos() {
        let bindings = default_bindings();
        assert_eq!(bindings.len(), 6);
        for i in 0..bindings.len() {
            for j in (i + 1)..bindings.len() {
                assert_ne!(bindings[i].0, bindings[j].0);
            }
        }
    }

    #[test]
    fn rebinding_a_combo_replaces_the_action() {
        let table = Bindings::default();
        let combo = Shortcut::new(Some(primary_modifiers()), Code::KeyH);

        table.insert(combo, HotkeyAction::ToggleVisibility);
        table.insert(combo, HotkeyAction::Quit);

        assert_eq!(table.len(), 1);
        assert_eq!(table.action_for(&combo), Some(HotkeyAction::Quit));
    }

    #[test]
    fn cleared_table_dispatches_nothing() {
        let table = Bindings::default();
        for (combo, action) in default_bindings() {
            table.insert(combo, action);
        }
        assert!(!table.is_empty());

        table.clear();

        assert!(table.is_empty());
        for (combo, _) in default_bindings() {
            assert_eq!(table.action_for(&combo), None);
        }
    }
}
