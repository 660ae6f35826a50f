use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use clap::ValueEnum;
use tracing::trace;

use crate::task::Task;

#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  ValueEnum,
)]
pub enum FilterMode {
  #[default]
  All,
  Active,
  #[value(alias = "done")]
  Completed
}

impl FilterMode {
  pub fn matches(
    self,
    task: &Task
  ) -> bool {
    match self {
      | FilterMode::All => true,
      | FilterMode::Active => {
        !task.completed
      }
      | FilterMode::Completed => {
        task.completed
      }
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      | FilterMode::All => "all",
      | FilterMode::Active => "active",
      | FilterMode::Completed => {
        "completed"
      }
    }
  }

  pub fn empty_message(
    self
  ) -> &'static str {
    match self {
      | FilterMode::All => {
        "No todos yet. Add one to get \
         started!"
      }
      | FilterMode::Active => {
        "No active todos"
      }
      | FilterMode::Completed => {
        "No completed todos"
      }
    }
  }
}

impl fmt::Display for FilterMode {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for FilterMode {
  type Err = anyhow::Error;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    match s
      .trim()
      .to_ascii_lowercase()
      .as_str()
    {
      | "all" => Ok(FilterMode::All),
      | "active" => {
        Ok(FilterMode::Active)
      }
      | "completed" | "done" => {
        Ok(FilterMode::Completed)
      }
      | other => {
        Err(anyhow!(
          "unknown filter: {other} \
           (expected all, active or \
           completed)"
        ))
      }
    }
  }
}

/// Projects `tasks` through `mode`, keeping the original order.
pub fn filter_tasks(
  tasks: &[Task],
  mode: FilterMode
) -> Vec<&Task> {
  let view: Vec<&Task> = tasks
    .iter()
    .filter(|task| mode.matches(task))
    .collect();
  trace!(
    mode = %mode,
    total = tasks.len(),
    matched = view.len(),
    "filtered tasks"
  );
  view
}
