use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::config::ShellConfig;
use super::dispatch::{DispatchRequest, DispatchResponse, Dispatcher};
use super::editor::{LineEditor, LineOutcome};
use super::error::DispatchError;
use super::key::KeyEvent;
use super::surface::DisplaySurface;

/// State shared between the shell and its in-flight dispatch callback
struct ShellState {
    surface: Box<dyn DisplaySurface>,
    editor: LineEditor,
    mounted: bool,
    /// Id of the dispatch whose answer is awaited
    pending_dispatch: Option<u64>,
    next_dispatch_id: u64,
}

impl ShellState {
    /// Start a new line and show the prompt on it
    fn render_fresh_prompt(&mut self) {
        self.surface.write("\r\n");
        self.editor.render_prompt(self.surface.as_mut());
    }

    fn finish_dispatch(&mut self, id: u64, result: Result<DispatchResponse, DispatchError>) {
        if !self.mounted {
            log::warn!("Dispatch completed after unmount, response discarded");
            return;
        }
        if self.pending_dispatch != Some(id) {
            log::warn!("Dispatch {} was abandoned, response discarded", id);
            return;
        }
        self.pending_dispatch = None;

        self.surface.write("\r\n");
        match result {
            Ok(response) => {
                for line in response.rendered_lines() {
                    self.surface.write_line(line);
                }
            }
            Err(e) => {
                log::error!("Dispatcher contract violation: {}", e);
            }
        }
        self.editor.render_prompt(self.surface.as_mut());
        self.surface.focus();
    }
}

/// Interactive line-editing shell over a display surface
///
/// Owns one surface for its whole mounted lifetime. Commands other than the
/// clear command go to the dispatcher, one at a time: key input other than
/// Ctrl+C is ignored while a dispatch is outstanding, and Ctrl+C abandons it.
pub struct Shell {
    state: Rc<RefCell<ShellState>>,
    dispatcher: Option<Rc<dyn Dispatcher>>,
}

impl Shell {
    /// Take ownership of the surface, show the prompt and grab focus
    pub fn mount(
        surface: Box<dyn DisplaySurface>,
        config: &ShellConfig,
        dispatcher: Option<Rc<dyn Dispatcher>>,
    ) -> Self {
        let mut state = ShellState {
            surface,
            editor: LineEditor::new(config.prompt.clone(), config.clear_command.clone()),
            mounted: true,
            pending_dispatch: None,
            next_dispatch_id: 0,
        };
        state.editor.render_prompt(state.surface.as_mut());
        state.surface.focus();

        log::info!(
            "Shell mounted (dispatcher: {})",
            if dispatcher.is_some() { "yes" } else { "none" }
        );

        Self {
            state: Rc::new(RefCell::new(state)),
            dispatcher,
        }
    }

    /// Feed a chunk of raw terminal input
    pub fn handle_input(&self, data: &str) {
        for key in KeyEvent::decode(data) {
            self.handle_key(key);
        }
    }

    /// Apply a single key event
    pub fn handle_key(&self, key: KeyEvent) {
        let (id, request) = {
            let mut guard = self.state.borrow_mut();
            let state = &mut *guard;

            if !state.mounted {
                log::debug!("Ignoring {:?} on unmounted shell", key);
                return;
            }
            if let Some(id) = state.pending_dispatch {
                if key == KeyEvent::Interrupt {
                    log::info!("Dispatch {} abandoned", id);
                    state.pending_dispatch = None;
                    state.surface.write("^C");
                    state.render_fresh_prompt();
                } else {
                    log::debug!("Ignoring {:?} while a command is running", key);
                }
                return;
            }

            match state.editor.handle_key(key, state.surface.as_mut()) {
                LineOutcome::Editing => return,
                LineOutcome::Blank | LineOutcome::Interrupted => {
                    state.render_fresh_prompt();
                    return;
                }
                LineOutcome::Cleared => {
                    state.editor.render_prompt(state.surface.as_mut());
                    return;
                }
                LineOutcome::Command(command) => {
                    if self.dispatcher.is_none() {
                        log::debug!("No dispatcher configured, '{}' accepted without effect", command);
                        state.render_fresh_prompt();
                        return;
                    }
                    let id = state.next_dispatch_id;
                    state.next_dispatch_id += 1;
                    state.pending_dispatch = Some(id);
                    log::debug!("Dispatching '{}' as {}", command, id);
                    (id, DispatchRequest::run_command(command))
                }
            }
        };

        // The borrow is released here, a dispatcher may answer synchronously
        if let Some(dispatcher) = &self.dispatcher {
            let state = Rc::downgrade(&self.state);
            dispatcher.dispatch(request, Box::new(move |result| complete_dispatch(&state, id, result)));
        }
    }

    /// Release the surface
    /// Idempotent. Pending dispatch callbacks become no-ops.
    pub fn unmount(&self) {
        let mut state = self.state.borrow_mut();
        if !state.mounted {
            return;
        }
        state.mounted = false;
        state.surface.dispose();
        log::info!("Shell unmounted");
    }

    pub fn is_mounted(&self) -> bool {
        self.state.borrow().mounted
    }

    pub fn is_dispatch_pending(&self) -> bool {
        self.state.borrow().pending_dispatch.is_some()
    }

    /// Current contents of the input line
    pub fn input(&self) -> String {
        self.state.borrow().editor.buffer().to_string()
    }

    /// Submitted commands, oldest first
    pub fn history(&self) -> Vec<String> {
        self.state.borrow().editor.history().entries().to_vec()
    }

    pub fn history_cursor(&self) -> usize {
        self.state.borrow().editor.history().cursor()
    }
}

impl Drop for Shell {
    fn drop(&mut self) {
        self.unmount();
    }
}

fn complete_dispatch(
    state: &Weak<RefCell<ShellState>>,
    id: u64,
    result: Result<DispatchResponse, DispatchError>,
) {
    let Some(state) = state.upgrade() else {
        log::warn!("Dispatch completed after the shell was dropped");
        return;
    };
    let Ok(mut state) = state.try_borrow_mut() else {
        log::error!("Dispatcher answered re-entrantly, response discarded");
        return;
    };
    state.finish_dispatch(id, result);
}
