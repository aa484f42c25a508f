//! Reconcile computed occurrences with materialized instances.
//!
//! An instance claims the occurrence whose day (in the calendar frame) matches
//! the instance's nominal `occurrence_date`. The instance's current
//! `start_time` plays no part: an instance moved to another time, or another
//! day, still stands in for its original slot.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::date_range::{local_date, same_day};
use crate::occurrence::{Occurrence, OccurrenceRef, VirtualOccurrence};
use crate::task::Task;

/// Merge the computed `instants` of `template` with its stored `instances`.
///
/// Each computed day yields exactly one entry: the materialized instance when
/// one exists for that day, a virtual occurrence otherwise. Instances of other
/// templates are ignored.
pub fn resolve<I>(template: &Task, instants: I, instances: &[Task], tz: Tz) -> Vec<Occurrence>
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    let by_day = index_by_day(template, instances, tz);
    let mut seen_days = HashSet::new();
    let mut resolved = Vec::new();

    for instant in instants {
        let day = local_date(instant, tz);
        if !seen_days.insert(day) {
            continue;
        }

        match by_day.get(&day) {
            Some(instance) => resolved.push(Occurrence::Stored((*instance).clone())),
            None => resolved.push(Occurrence::Virtual(VirtualOccurrence::from_template(
                template, instant,
            ))),
        }
    }

    resolved
}

/// The materialized instance of `template` for the day of `occurrence`, if any.
pub fn find_materialized<'a>(
    template: &Task,
    occurrence: DateTime<Utc>,
    instances: &'a [Task],
    tz: Tz,
) -> Option<&'a Task> {
    instances.iter().find(|instance| {
        instance.recurring_template_id() == Some(template.id.as_str())
            && instance
                .occurrence_date()
                .is_some_and(|nominal| same_day(nominal, occurrence, tz))
    })
}

/// Combine plain tasks, resolved template occurrences and every materialized
/// instance not already claimed by a computed occurrence.
///
/// Unclaimed instances (their slot is no longer produced, or their template
/// is gone) are kept so an edit is never dropped from the calendar.
pub fn merge(plain: Vec<Task>, resolved: Vec<Occurrence>, instances: Vec<Task>) -> Vec<Occurrence> {
    let mut seen: HashSet<OccurrenceRef> = HashSet::new();
    let mut merged = Vec::with_capacity(plain.len() + resolved.len());

    let candidates = plain
        .into_iter()
        .map(Occurrence::Stored)
        .chain(resolved)
        .chain(instances.into_iter().map(Occurrence::Stored));

    for occurrence in candidates {
        if seen.insert(occurrence.reference()) {
            merged.push(occurrence);
        }
    }

    merged
}

/// First instance per nominal day; later duplicates are ignored.
fn index_by_day<'a>(template: &Task, instances: &'a [Task], tz: Tz) -> HashMap<NaiveDate, &'a Task> {
    let mut by_day = HashMap::new();
    for instance in instances {
        if instance.recurring_template_id() != Some(template.id.as_str()) {
            continue;
        }
        if let Some(nominal) = instance.occurrence_date() {
            by_day.entry(local_date(nominal, tz)).or_insert(instance);
        }
    }
    by_day
}
