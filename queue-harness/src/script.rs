//! Queue scripts.
//!
//! A script is a list of commands, one per line. Blank lines and text after
//! `#` are ignored. Queues are named by the script; names are bound to the
//! handle returned by the most recent `create`.
//!
//! ```text
//! create <name>              bind <name> to a new queue
//! destroy <name>             destroy the queue bound to <name>
//! enqueue <name> <byte>...   append bytes (decimal, 0-255)
//! dequeue <name> [count]     remove bytes and print them in decimal
//! newline                    end the current output line
//! stats                      print segment pool statistics
//! ```
//!
//! A destroyed queue's name stays bound to its old handle, so using it again
//! is reported by the queue manager as an illegal operation.

use std::collections::HashMap;
use std::io::{self, Write};

use queue_core::{Illegal, QueueError, QueueHandle, QueueManager};
use tracing::{debug, trace};

use crate::metrics;

/// The scenario run when no script is given. Prints `01`, `25`, `346`.
pub const REFERENCE: &str = "\
create a
enqueue a 0 1
create b
enqueue b 3
enqueue a 2
enqueue b 4
dequeue a 2
newline
enqueue a 5
enqueue b 6
dequeue a 2
newline
destroy a
dequeue b 3
newline
destroy b
";

/// One script command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create { name: String },
    Destroy { name: String },
    Enqueue { name: String, bytes: Vec<u8> },
    Dequeue { name: String, count: usize },
    Newline,
    Stats,
}

/// A command with the line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub line: usize,
    pub command: Command,
}

/// A parsed script.
#[derive(Debug, Clone, Default)]
pub struct Script {
    steps: Vec<Step>,
}

/// Script parse error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("line {line}: unknown command '{command}'")]
    UnknownCommand { line: usize, command: String },
    #[error("line {line}: '{command}' needs a queue name")]
    MissingName { line: usize, command: &'static str },
    #[error("line {line}: 'enqueue' needs at least one byte")]
    MissingBytes { line: usize },
    #[error("line {line}: invalid byte '{value}'")]
    InvalidByte { line: usize, value: String },
    #[error("line {line}: invalid count '{value}'")]
    InvalidCount { line: usize, value: String },
    #[error("line {line}: unexpected argument '{value}'")]
    UnexpectedArgument { line: usize, value: String },
}

impl Script {
    /// Parse a script from source text.
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        let mut steps = Vec::new();

        for (index, raw) in source.lines().enumerate() {
            let line = index + 1;
            let text = raw.split('#').next().unwrap_or_default();
            let mut words = text.split_whitespace();
            let Some(keyword) = words.next() else {
                continue;
            };

            let command = match keyword {
                "create" => Command::Create {
                    name: name(&mut words, line, "create")?,
                },
                "destroy" => Command::Destroy {
                    name: name(&mut words, line, "destroy")?,
                },
                "enqueue" => {
                    let name = name(&mut words, line, "enqueue")?;
                    let bytes = words
                        .by_ref()
                        .map(|word| {
                            word.parse::<u8>().map_err(|_| ParseError::InvalidByte {
                                line,
                                value: word.to_string(),
                            })
                        })
                        .collect::<Result<Vec<u8>, _>>()?;
                    if bytes.is_empty() {
                        return Err(ParseError::MissingBytes { line });
                    }
                    Command::Enqueue { name, bytes }
                }
                "dequeue" => {
                    let name = name(&mut words, line, "dequeue")?;
                    let count = match words.next() {
                        None => 1,
                        Some(word) => word.parse::<usize>().map_err(|_| {
                            ParseError::InvalidCount {
                                line,
                                value: word.to_string(),
                            }
                        })?,
                    };
                    Command::Dequeue { name, count }
                }
                "newline" => Command::Newline,
                "stats" => Command::Stats,
                other => {
                    return Err(ParseError::UnknownCommand {
                        line,
                        command: other.to_string(),
                    });
                }
            };

            if let Some(extra) = words.next() {
                return Err(ParseError::UnexpectedArgument {
                    line,
                    value: extra.to_string(),
                });
            }

            steps.push(Step { line, command });
        }

        Ok(Self { steps })
    }

    /// The parsed steps.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

fn name<'a>(
    words: &mut impl Iterator<Item = &'a str>,
    line: usize,
    command: &'static str,
) -> Result<String, ParseError> {
    words
        .next()
        .map(str::to_string)
        .ok_or(ParseError::MissingName { line, command })
}

/// Error while running a script.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("line {line}: {source}")]
    Queue { line: usize, source: QueueError },
    #[error("output error: {0}")]
    Io(#[from] io::Error),
}

/// Executes scripts against one queue manager.
pub struct Runner<W> {
    manager: QueueManager,
    queues: HashMap<String, QueueHandle>,
    out: W,
}

impl<W: Write> Runner<W> {
    /// Create a runner with a fresh queue manager.
    pub fn new(out: W) -> Self {
        Self {
            manager: QueueManager::new(),
            queues: HashMap::new(),
            out,
        }
    }

    /// The queue manager the script runs against.
    pub fn manager(&self) -> &QueueManager {
        &self.manager
    }

    /// Run every step, stopping at the first queue fault.
    ///
    /// Output written before a fault is flushed before returning.
    pub fn run(&mut self, script: &Script) -> Result<(), RunError> {
        let result = script.steps().iter().try_for_each(|step| self.step(step));
        self.out.flush()?;
        result
    }

    fn step(&mut self, step: &Step) -> Result<(), RunError> {
        trace!(line = step.line, command = ?step.command, "step");
        let line = step.line;
        let fault = |source| RunError::Queue { line, source };

        match &step.command {
            Command::Create { name } => {
                let handle = self.manager.create_queue().map_err(fault)?;
                metrics::QUEUE_CREATE.increment();
                debug!(name = %name, ?handle, "bound queue");
                self.queues.insert(name.clone(), handle);
            }
            Command::Destroy { name } => {
                let handle = self.handle(name).map_err(fault)?;
                self.manager.destroy_queue(handle).map_err(fault)?;
                metrics::QUEUE_DESTROY.increment();
            }
            Command::Enqueue { name, bytes } => {
                let handle = self.handle(name).map_err(fault)?;
                for &byte in bytes {
                    self.manager.enqueue_byte(handle, byte).map_err(fault)?;
                    metrics::QUEUE_ENQUEUE.increment();
                }
            }
            Command::Dequeue { name, count } => {
                let handle = self.handle(name).map_err(fault)?;
                for _ in 0..*count {
                    let byte = self.manager.dequeue_byte(handle).map_err(fault)?;
                    metrics::QUEUE_DEQUEUE.increment();
                    write!(self.out, "{byte}")?;
                }
            }
            Command::Newline => writeln!(self.out)?,
            Command::Stats => {
                let stats = self.manager.pool_stats();
                writeln!(
                    self.out,
                    "queues={} segments_in_use={} free_listed={} touched={}/{}",
                    self.manager.live_queues(),
                    stats.in_use,
                    stats.free_listed,
                    stats.touched,
                    stats.total,
                )?;
            }
        }

        metrics::record_pool(&self.manager.pool_stats());
        Ok(())
    }

    /// A name that was never bound is a null handle.
    fn handle(&self, name: &str) -> Result<QueueHandle, QueueError> {
        self.queues
            .get(name)
            .copied()
            .ok_or(QueueError::IllegalOperation(Illegal::MissingHandle))
    }
}
