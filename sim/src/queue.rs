//! FIFO queue of tasks awaiting a server

use crate::task::Task;
use std::collections::VecDeque;

/// Strict FIFO: append at tail, remove from head
#[derive(Debug, Default)]
pub struct TaskQueue {
    tasks: VecDeque<Task>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_back(&mut self, task: Task) {
        self.tasks.push_back(task);
    }

    pub fn pop_front(&mut self) -> Option<Task> {
        self.tasks.pop_front()
    }

    /// Oldest waiting task
    pub fn front(&self) -> Option<&Task> {
        self.tasks.front()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskId;

    #[test]
    fn test_fifo_order() {
        let mut queue = TaskQueue::new();
        for i in 0..4 {
            queue.push_back(Task::new(TaskId(i), i, 1));
        }
        assert_eq!(queue.len(), 4);
        assert_eq!(queue.front().map(Task::id), Some(TaskId(0)));

        let order: Vec<TaskId> = std::iter::from_fn(|| queue.pop_front())
            .map(|t| t.id())
            .collect();
        assert_eq!(order, vec![TaskId(0), TaskId(1), TaskId(2), TaskId(3)]);
        assert!(queue.is_empty());
    }
}
