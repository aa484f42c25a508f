//! Concrete and virtual occurrences of dated tasks.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::{Recurring, Task};

/// Stable reference to an occurrence.
///
/// Virtual occurrences are identified by their template and nominal instant,
/// so the same query always yields the same reference and it can never be
/// mistaken for a stored id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OccurrenceRef {
    Stored {
        id: String,
    },
    Virtual {
        template_id: String,
        occurrence: DateTime<Utc>,
    },
}

impl fmt::Display for OccurrenceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OccurrenceRef::Stored { id } => write!(f, "{}", id),
            OccurrenceRef::Virtual {
                template_id,
                occurrence,
            } => write!(f, "{} @ {}", template_id, occurrence.to_rfc3339()),
        }
    }
}

/// A computed, unsaved projection of a template for one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirtualOccurrence {
    pub template_id: String,
    /// Nominal instant; equals `start_time`.
    pub occurrence: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub owner_id: String,
    pub assigned_to_id: String,
    pub project_id: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub recurring: Option<Recurring>,
}

impl VirtualOccurrence {
    pub fn from_template(template: &Task, occurrence: DateTime<Utc>) -> Self {
        VirtualOccurrence {
            template_id: template.id.clone(),
            occurrence,
            title: template.title.clone(),
            description: template.description.clone(),
            owner_id: template.owner_id.clone(),
            assigned_to_id: template.assigned_to_id.clone(),
            project_id: template.project_id.clone(),
            start_time: occurrence,
            end_time: occurrence + template.duration(),
            recurring: template.recurring().cloned(),
        }
    }
}

/// A dated task as it appears on the calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Occurrence {
    /// A plain task or a materialized instance.
    Stored(Task),
    Virtual(VirtualOccurrence),
}

impl Occurrence {
    pub fn reference(&self) -> OccurrenceRef {
        match self {
            Occurrence::Stored(task) => OccurrenceRef::Stored {
                id: task.id.clone(),
            },
            Occurrence::Virtual(v) => OccurrenceRef::Virtual {
                template_id: v.template_id.clone(),
                occurrence: v.occurrence,
            },
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Occurrence::Stored(task) => &task.title,
            Occurrence::Virtual(v) => &v.title,
        }
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        match self {
            Occurrence::Stored(task) => task.start_time,
            Occurrence::Virtual(v) => v.start_time,
        }
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        match self {
            Occurrence::Stored(task) => task.end_time,
            Occurrence::Virtual(v) => v.end_time,
        }
    }

    /// Virtual occurrences are never completed; completing one materializes it.
    pub fn completed(&self) -> bool {
        match self {
            Occurrence::Stored(task) => task.completed,
            Occurrence::Virtual(_) => false,
        }
    }

    pub fn is_virtual(&self) -> bool {
        matches!(self, Occurrence::Virtual(_))
    }

    /// Template this occurrence belongs to, if any.
    pub fn template_id(&self) -> Option<&str> {
        match self {
            Occurrence::Stored(task) => task.recurring_template_id(),
            Occurrence::Virtual(v) => Some(&v.template_id),
        }
    }

    /// Closed-interval overlap with `[from, to]`.
    pub fn overlaps(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
        self.start_time() <= to && self.end_time() >= from
    }
}
