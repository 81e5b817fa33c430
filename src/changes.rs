//! Reviewable diff between an original and an optimized route.
//!
//! A diff is a list of [`RouteChange`]s, one per activity that moved. The
//! traveller approves or rejects each one in an [`ApprovalSession`], and
//! [`apply_approved_changes_with`] turns the approved subset into a new
//! itinerary.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::error::{PlannerError, Result};
use crate::models::{Activity, TransportPreferences};
use crate::schedule::{Route, build_route_with};
use crate::solver::OptimizationResult;
use crate::traits::TravelEstimator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    Reorder,
}

/// One activity that moved between the original and the optimized route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteChange {
    pub activity_id: String,
    pub activity_name: String,
    pub change_type: ChangeType,
    /// 1-based position in the original route.
    pub from_position: usize,
    /// 1-based position in the optimized route.
    pub to_position: usize,
    pub original_time: NaiveDateTime,
    pub new_time: NaiveDateTime,
    /// Arrival difference in minutes; negative means earlier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_delta: Option<i64>,
    pub reason: String,
    pub impact: String,
}

impl RouteChange {
    /// Changes are keyed by the activity they move.
    pub fn id(&self) -> &str {
        &self.activity_id
    }
}

fn minutes(n: i64) -> String {
    if n == 1 { "1 minute".to_string() } else { format!("{n} minutes") }
}

fn impact_text(delta: Option<i64>) -> String {
    match delta {
        Some(d) if d < 0 => format!("Arrives {} earlier", minutes(-d)),
        Some(d) if d > 0 => format!("Arrives {} later", minutes(d)),
        _ => "No significant time change".to_string(),
    }
}

/// Annotate `optimized` stops against `original` and list what moved.
///
/// Sets `original_order`, `was_reordered` and, for moved stops, `time_delta`.
pub fn compare_routes(original: &Route, optimized: &mut Route) -> Vec<RouteChange> {
    let mut changes = Vec::new();
    for stop in &mut optimized.stops {
        let Some(before) = original.stop_for(&stop.activity.id) else {
            continue;
        };
        stop.original_order = Some(before.order);
        stop.was_reordered = before.order != stop.order;
        if !stop.was_reordered {
            continue;
        }
        stop.time_delta = Some((stop.arrival_time - before.arrival_time).num_minutes());

        let from_position = before.order + 1;
        let to_position = stop.order + 1;
        let reason = if to_position < from_position {
            "Moved earlier to reduce travel time"
        } else {
            "Moved later to optimize route flow"
        };
        changes.push(RouteChange {
            activity_id: stop.activity.id.clone(),
            activity_name: stop.activity.name.clone(),
            change_type: ChangeType::Reorder,
            from_position,
            to_position,
            original_time: before.arrival_time,
            new_time: stop.arrival_time,
            time_delta: stop.time_delta,
            reason: reason.to_string(),
            impact: impact_text(stop.time_delta),
        });
    }
    changes
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

/// Roll-up of every change's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Pending,
    Approved,
    Rejected,
    PartiallyApproved,
}

/// Review state for one optimization result.
///
/// Owned by a single review; every change starts pending and can be flipped
/// any number of times until the session is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalSession {
    decisions: Vec<(String, ApprovalStatus)>,
}

impl ApprovalSession {
    pub fn new(result: &OptimizationResult) -> Self {
        Self::for_changes(&result.changes)
    }

    pub fn for_changes(changes: &[RouteChange]) -> Self {
        Self {
            decisions: changes
                .iter()
                .map(|c| (c.activity_id.clone(), ApprovalStatus::Pending))
                .collect(),
        }
    }

    fn set(&mut self, change_id: &str, status: ApprovalStatus) -> Result<()> {
        let entry = self
            .decisions
            .iter_mut()
            .find(|(id, _)| id == change_id)
            .ok_or_else(|| PlannerError::UnknownChange(change_id.to_string()))?;
        entry.1 = status;
        Ok(())
    }

    pub fn approve(&mut self, change_id: &str) -> Result<()> {
        self.set(change_id, ApprovalStatus::Approved)
    }

    pub fn reject(&mut self, change_id: &str) -> Result<()> {
        self.set(change_id, ApprovalStatus::Rejected)
    }

    /// Back to undecided.
    pub fn reset(&mut self, change_id: &str) -> Result<()> {
        self.set(change_id, ApprovalStatus::Pending)
    }

    pub fn approve_all(&mut self) {
        for (_, status) in &mut self.decisions {
            *status = ApprovalStatus::Approved;
        }
    }

    pub fn reject_all(&mut self) {
        for (_, status) in &mut self.decisions {
            *status = ApprovalStatus::Rejected;
        }
    }

    pub fn status(&self, change_id: &str) -> Option<ApprovalStatus> {
        self.decisions
            .iter()
            .find(|(id, _)| id == change_id)
            .map(|(_, status)| *status)
    }

    fn count(&self, status: ApprovalStatus) -> usize {
        self.decisions.iter().filter(|(_, s)| *s == status).count()
    }

    pub fn approved_count(&self) -> usize {
        self.count(ApprovalStatus::Approved)
    }

    pub fn rejected_count(&self) -> usize {
        self.count(ApprovalStatus::Rejected)
    }

    pub fn pending_count(&self) -> usize {
        self.count(ApprovalStatus::Pending)
    }

    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    pub fn approved_ids(&self) -> impl Iterator<Item = &str> {
        self.decisions
            .iter()
            .filter(|(_, s)| *s == ApprovalStatus::Approved)
            .map(|(id, _)| id.as_str())
    }

    pub fn overall_status(&self) -> SessionStatus {
        let approved = self.approved_count();
        let rejected = self.rejected_count();
        if approved + rejected == 0 {
            SessionStatus::Pending
        } else if approved == self.len() {
            SessionStatus::Approved
        } else if rejected == self.len() {
            SessionStatus::Rejected
        } else {
            SessionStatus::PartiallyApproved
        }
    }
}

/// New itinerary after applying a review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedPlan {
    pub activities: Vec<Activity>,
    pub route: Route,
}

fn find_activity<'a>(original: &'a [Activity], id: &str) -> Result<&'a Activity> {
    original
        .iter()
        .find(|a| a.id == id)
        .ok_or_else(|| PlannerError::ActivityNotFound(id.to_string()))
}

/// Put each approved activity at its target slot and fill the remaining
/// slots with everything else in original order.
///
/// Identity based, so the order in which changes are listed does not matter.
fn place_approved(original: &[Activity], approved: &[&RouteChange]) -> Result<Vec<Activity>> {
    let mut slots: Vec<Option<Activity>> = vec![None; original.len()];
    for change in approved {
        let activity = find_activity(original, &change.activity_id)?;
        let slot = change
            .to_position
            .checked_sub(1)
            .and_then(|index| slots.get_mut(index))
            .filter(|slot| slot.is_none())
            .ok_or_else(|| PlannerError::InconsistentChange(change.activity_id.clone()))?;
        *slot = Some(activity.clone());
    }

    let mut rest = original
        .iter()
        .filter(|a| !approved.iter().any(|c| c.activity_id == a.id))
        .cloned();
    Ok(slots
        .into_iter()
        .filter_map(|slot| slot.or_else(|| rest.next()))
        .collect())
}

/// Apply the approved part of a review and rebuild the day.
///
/// Consumes the result and the session: a fresh optimization is needed for
/// a new diff. Approving everything adopts the optimized order as is.
#[instrument(skip_all, fields(changes = result.changes.len(), approved = session.approved_count()))]
pub fn apply_approved_changes_with<E: TravelEstimator + ?Sized>(
    estimator: &E,
    result: OptimizationResult,
    session: ApprovalSession,
    original: &[Activity],
    prefs: &TransportPreferences,
) -> Result<AppliedPlan> {
    if let Some((stray, _)) = session
        .decisions
        .iter()
        .find(|(id, _)| !result.changes.iter().any(|c| &c.activity_id == id))
    {
        warn!(change = %stray, "approval session does not match optimization result");
        return Err(PlannerError::UnknownChange(stray.clone()));
    }

    let approved: Vec<&RouteChange> = result
        .changes
        .iter()
        .filter(|c| session.status(&c.activity_id) == Some(ApprovalStatus::Approved))
        .collect();

    let activities = if approved.len() == result.changes.len() {
        result
            .optimized_route
            .stops
            .iter()
            .map(|stop| find_activity(original, &stop.activity.id).cloned())
            .collect::<Result<Vec<_>>>()?
    } else {
        place_approved(original, &approved)?
    };

    let start = result.original_route.start_time;
    let route = build_route_with(
        estimator,
        &activities,
        start.date(),
        start.time(),
        prefs,
        result.original_route.start_location.as_ref(),
        result.original_route.end_location.as_ref(),
    );
    info!(
        approved = approved.len(),
        total = result.changes.len(),
        travel = route.total_travel_time,
        "applied route changes"
    );
    Ok(AppliedPlan { activities, route })
}

/// Changes ordered by ascending target position, the only order in which
/// [`replay_splices`] reproduces the optimized slots.
pub fn sorted_for_replay<'a>(
    changes: impl IntoIterator<Item = &'a RouteChange>,
) -> Vec<&'a RouteChange> {
    let mut sorted: Vec<&RouteChange> = changes.into_iter().collect();
    sorted.sort_by_key(|c| c.to_position);
    sorted
}

/// Positional replay for clients that persisted index-based diffs.
///
/// Each change removes whatever sits at `from_position` and reinserts it at
/// `to_position`. Splices shift later indices, so the result depends on the
/// order of `changes`; see [`sorted_for_replay`].
pub fn replay_splices<T: Clone>(order: &[T], changes: &[&RouteChange]) -> Vec<T> {
    let mut replayed = order.to_vec();
    for change in changes {
        let from = change.from_position.saturating_sub(1);
        if from >= replayed.len() {
            warn!(
                change = %change.activity_id,
                from = change.from_position,
                len = replayed.len(),
                "positional change out of range, skipped"
            );
            continue;
        }
        let item = replayed.remove(from);
        let to = change.to_position.saturating_sub(1).min(replayed.len());
        replayed.insert(to, item);
    }
    replayed
}
