use std::collections::{HashMap, VecDeque};

use super::types::WorkflowResult;

/// Running workflows plus a bounded history of finished ones.
#[derive(Debug)]
pub struct WorkflowRegistry {
    capacity: usize,
    active: HashMap<String, WorkflowResult>,
    completed: VecDeque<WorkflowResult>,
}

impl WorkflowRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            active: HashMap::new(),
            completed: VecDeque::new(),
        }
    }

    pub fn start(&mut self, workflow: WorkflowResult) {
        self.active.insert(workflow.workflow_id.clone(), workflow);
    }

    /// Move a workflow to history, evicting the oldest beyond capacity.
    pub fn finish(&mut self, workflow: WorkflowResult) {
        self.active.remove(&workflow.workflow_id);
        self.completed.push_back(workflow);
        while self.completed.len() > self.capacity {
            if let Some(evicted) = self.completed.pop_front() {
                tracing::debug!(workflow_id = %evicted.workflow_id, "Evicted workflow from history");
            }
        }
    }

    /// Active runs first, then history.
    pub fn get(&self, workflow_id: &str) -> Option<WorkflowResult> {
        self.active
            .get(workflow_id)
            .or_else(|| self.completed.iter().find(|w| w.workflow_id == workflow_id))
            .cloned()
    }

    /// Finished workflows, most recent first.
    pub fn recent(&self, limit: usize) -> Vec<WorkflowResult> {
        self.completed.iter().rev().take(limit).cloned().collect()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }
}
