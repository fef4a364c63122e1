#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use webterm_shell::{
    DispatchCallback, DispatchError, DispatchRequest, DispatchResponse, Dispatcher,
    HeadlessSurface, Shell, ShellAction, ShellConfig,
};

/// How the test dispatcher answers
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    /// Call back from inside `dispatch`
    Immediately,
    /// Hold the callback until `complete_next`
    Later,
}

/// Dispatcher with canned responses per command
pub struct ScriptedDispatcher {
    answer: Answer,
    responses: RefCell<HashMap<String, Result<DispatchResponse, String>>>,
    requests: RefCell<Vec<DispatchRequest>>,
    pending: RefCell<VecDeque<(String, DispatchCallback)>>,
}

impl ScriptedDispatcher {
    pub fn new(answer: Answer) -> Rc<Self> {
        Rc::new(Self {
            answer,
            responses: RefCell::new(HashMap::new()),
            requests: RefCell::new(Vec::new()),
            pending: RefCell::new(VecDeque::new()),
        })
    }

    pub fn respond(&self, command: &str, response: DispatchResponse) {
        self.responses
            .borrow_mut()
            .insert(command.to_string(), Ok(response));
    }

    pub fn fail(&self, command: &str, message: &str) {
        self.responses
            .borrow_mut()
            .insert(command.to_string(), Err(message.to_string()));
    }

    /// Commands received so far, in order
    pub fn commands(&self) -> Vec<String> {
        self.requests
            .borrow()
            .iter()
            .map(|request| match &request.action {
                ShellAction::RunCommand { command } => command.clone(),
            })
            .collect()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Answer the oldest held request
    pub fn complete_next(&self) -> bool {
        let next = self.pending.borrow_mut().pop_front();
        match next {
            Some((command, callback)) => {
                callback(self.result_for(&command));
                true
            }
            None => false,
        }
    }

    fn result_for(&self, command: &str) -> Result<DispatchResponse, DispatchError> {
        match self.responses.borrow().get(command) {
            Some(Ok(response)) => Ok(response.clone()),
            Some(Err(message)) => Err(DispatchError::Invocation(message.clone())),
            None => Ok(DispatchResponse::default()),
        }
    }
}

impl Dispatcher for ScriptedDispatcher {
    fn dispatch(&self, request: DispatchRequest, on_complete: DispatchCallback) {
        let ShellAction::RunCommand { command } = &request.action;
        let command = command.clone();
        self.requests.borrow_mut().push(request);

        match self.answer {
            Answer::Immediately => on_complete(self.result_for(&command)),
            Answer::Later => self.pending.borrow_mut().push_back((command, on_complete)),
        }
    }
}

/// Shell mounted on a fresh headless surface
pub struct TestShell {
    pub shell: Shell,
    pub surface: HeadlessSurface,
    pub config: ShellConfig,
}

impl TestShell {
    pub fn new(dispatcher: Option<Rc<ScriptedDispatcher>>) -> Self {
        Self::with_config(ShellConfig::default(), dispatcher)
    }

    pub fn with_config(config: ShellConfig, dispatcher: Option<Rc<ScriptedDispatcher>>) -> Self {
        let surface = HeadlessSurface::default();
        let dispatcher = dispatcher.map(|d| d as Rc<dyn Dispatcher>);
        let shell = Shell::mount(Box::new(surface.clone()), &config, dispatcher);
        Self {
            shell,
            surface,
            config,
        }
    }

    pub fn type_text(&self, text: &str) {
        self.shell.handle_input(text);
    }

    pub fn submit(&self, line: &str) {
        self.shell.handle_input(line);
        self.shell.handle_input("\r");
    }

    pub fn up(&self) {
        self.shell.handle_input("\x1b[A");
    }

    pub fn down(&self) {
        self.shell.handle_input("\x1b[B");
    }

    /// What is rendered after the prompt on the cursor's row
    pub fn rendered_input(&self) -> String {
        let line = self.surface.current_line();
        line.strip_prefix(&self.config.prompt)
            .unwrap_or("")
            .trim_end()
            .to_string()
    }

    /// Forget everything written so far
    pub fn reset_transcript(&mut self) {
        self.surface.clear_transcript();
    }
}
