use std::cell::RefCell;
use std::time::Instant;

use redeploy_core::runner::{CommandOutput, CommandRunner};
use redeploy_core::step::Invocation;

enum Response {
    Output(CommandOutput),
    SpawnError,
}

/// Records every invocation; commands succeed unless scripted otherwise.
#[derive(Default)]
pub struct FakeRunner {
    calls: RefCell<Vec<Invocation>>,
    started: RefCell<Vec<Instant>>,
    responses: Vec<(String, Response)>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands starting with `prefix` exit with `code` and `stderr`.
    pub fn fail(mut self, prefix: &str, code: i32, stderr: &str) -> Self {
        self.responses.push((
            prefix.to_string(),
            Response::Output(CommandOutput::failure(code, stderr)),
        ));
        self
    }

    /// Commands starting with `prefix` cannot be spawned.
    pub fn missing(mut self, prefix: &str) -> Self {
        self.responses.push((prefix.to_string(), Response::SpawnError));
        self
    }

    pub fn commands(&self) -> Vec<String> {
        self.calls.borrow().iter().map(ToString::to_string).collect()
    }

    /// When each recorded call started, in call order.
    pub fn started(&self) -> Vec<Instant> {
        self.started.borrow().clone()
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, invocation: &Invocation) -> std::io::Result<CommandOutput> {
        self.calls.borrow_mut().push(invocation.clone());
        self.started.borrow_mut().push(Instant::now());
        let command = invocation.to_string();
        match self
            .responses
            .iter()
            .find(|(prefix, _)| command.starts_with(prefix.as_str()))
        {
            Some((_, Response::Output(output))) => Ok(output.clone()),
            Some((_, Response::SpawnError)) => Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{}: not found", invocation.program),
            )),
            None => Ok(CommandOutput::success()),
        }
    }
}
