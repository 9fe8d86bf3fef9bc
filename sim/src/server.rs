//! Servers that hold at most one task at a time

use crate::task::Task;

/// Server state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Idle,
    Busy,
}

/// Processing unit with a countdown for the task in service
#[derive(Debug)]
pub struct Server {
    id: usize,
    current_task: Option<Task>,
    remaining_time: u32,
}

impl Server {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            current_task: None,
            remaining_time: 0,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn is_busy(&self) -> bool {
        self.current_task.is_some()
    }

    pub fn state(&self) -> ServerState {
        if self.is_busy() {
            ServerState::Busy
        } else {
            ServerState::Idle
        }
    }

    pub fn current_task(&self) -> Option<&Task> {
        self.current_task.as_ref()
    }

    pub fn remaining_time(&self) -> u32 {
        self.remaining_time
    }

    /// Take ownership of `task` and start serving it.
    ///
    /// # Panics
    ///
    /// Panics if the server is already busy.
    pub fn start_new_task(&mut self, task: Task) {
        if let Some(current) = &self.current_task {
            panic!(
                "server {} assigned task {:?} while serving task {:?}",
                self.id,
                task.id(),
                current.id()
            );
        }
        self.remaining_time = task.processing_time();
        self.current_task = Some(task);
    }

    /// Advance one tick. Returns the task if it finished on this tick.
    pub fn tick(&mut self) -> Option<Task> {
        if self.current_task.is_none() {
            return None;
        }

        self.remaining_time = self.remaining_time.saturating_sub(1);
        if self.remaining_time == 0 {
            self.current_task.take()
        } else {
            None
        }
    }
}
