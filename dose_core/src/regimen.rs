//! Regimen rule set: which doses are due on a given day.
//!
//! A regimen is an ordered list of independent [`DoseRule`]s. Each rule
//! expands to zero or more obligations for a day; the rule set concatenates
//! them in rule order. Presentation relies on that order for display, so
//! rules are never re-sorted.

use crate::{CalendarDay, Medication, Obligation, TimeOfDay};
use chrono::Weekday;

/// A cadence that expands into concrete doses for one day
///
/// Implementations must be pure: the same day always yields the same
/// obligations in the same order.
pub trait DoseRule {
    fn applies(&self, day: CalendarDay) -> Vec<Obligation>;
}

/// Sort and dedup so Morning always precedes Evening within a rule
fn normalize_times(times: &[TimeOfDay]) -> Vec<TimeOfDay> {
    let mut times = times.to_vec();
    times.sort();
    times.dedup();
    times
}

fn expand(
    day: CalendarDay,
    medication: &Medication,
    times: &[TimeOfDay],
    note: &str,
) -> Vec<Obligation> {
    times
        .iter()
        .map(|time| Obligation::new(day, medication, *time, note))
        .collect()
}

// ============================================================================
// Rules
// ============================================================================

/// Due every day
pub struct DailyRule {
    medication: Medication,
    times: Vec<TimeOfDay>,
    note: String,
}

impl DailyRule {
    pub fn new(medication: Medication, times: &[TimeOfDay], note: impl Into<String>) -> Self {
        Self {
            medication,
            times: normalize_times(times),
            note: note.into(),
        }
    }
}

impl DoseRule for DailyRule {
    fn applies(&self, day: CalendarDay) -> Vec<Obligation> {
        expand(day, &self.medication, &self.times, &self.note)
    }
}

/// Due only on a fixed set of weekdays
pub struct WeekdaySetRule {
    medication: Medication,
    weekdays: Vec<Weekday>,
    times: Vec<TimeOfDay>,
    note: String,
}

impl WeekdaySetRule {
    pub fn new(
        medication: Medication,
        weekdays: &[Weekday],
        times: &[TimeOfDay],
        note: impl Into<String>,
    ) -> Self {
        Self {
            medication,
            weekdays: weekdays.to_vec(),
            times: normalize_times(times),
            note: note.into(),
        }
    }
}

impl DoseRule for WeekdaySetRule {
    fn applies(&self, day: CalendarDay) -> Vec<Obligation> {
        if !self.weekdays.contains(&day.weekday()) {
            return Vec::new();
        }
        expand(day, &self.medication, &self.times, &self.note)
    }
}

/// Elapsed-day window of one course phase
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhaseWindow {
    /// Whole 1-based course weeks, inclusive on both ends
    Weeks { first: u32, last: u32 },
    /// `length` consecutive days starting on the first day of `first_week`
    ///
    /// The day count is authoritative even when the window runs past the
    /// end of `first_week`.
    Days { first_week: u32, length: u32 },
}

impl PhaseWindow {
    /// Whether a non-negative elapsed-day offset falls inside the window
    pub fn contains(&self, elapsed: i64) -> bool {
        if elapsed < 0 {
            return false;
        }
        match *self {
            PhaseWindow::Weeks { first, last } => {
                let week = elapsed / 7 + 1;
                week >= i64::from(first) && week <= i64::from(last)
            }
            PhaseWindow::Days { first_week, length } => {
                let first_day = (i64::from(first_week) - 1) * 7;
                elapsed >= first_day && elapsed < first_day + i64::from(length)
            }
        }
    }
}

/// One medication's part of a phased course
pub struct CoursePhase {
    medication: Medication,
    window: PhaseWindow,
    /// `None` means every day inside the window
    weekdays: Option<Vec<Weekday>>,
    times: Vec<TimeOfDay>,
    note: String,
}

impl CoursePhase {
    pub fn new(
        medication: Medication,
        window: PhaseWindow,
        weekdays: Option<&[Weekday]>,
        times: &[TimeOfDay],
        note: impl Into<String>,
    ) -> Self {
        Self {
            medication,
            window,
            weekdays: weekdays.map(<[Weekday]>::to_vec),
            times: normalize_times(times),
            note: note.into(),
        }
    }

    fn applies(&self, day: CalendarDay, elapsed: i64) -> Vec<Obligation> {
        if !self.window.contains(elapsed) {
            return Vec::new();
        }
        if let Some(ref weekdays) = self.weekdays {
            if !weekdays.contains(&day.weekday()) {
                return Vec::new();
            }
        }
        expand(day, &self.medication, &self.times, &self.note)
    }
}

/// A course of phases counted from a start day
///
/// Inert for every day before `start`.
pub struct PhasedCourseRule {
    start: CalendarDay,
    phases: Vec<CoursePhase>,
}

impl PhasedCourseRule {
    pub fn new(start: CalendarDay, phases: Vec<CoursePhase>) -> Self {
        Self { start, phases }
    }

    pub fn start(&self) -> CalendarDay {
        self.start
    }
}

impl DoseRule for PhasedCourseRule {
    fn applies(&self, day: CalendarDay) -> Vec<Obligation> {
        let elapsed = CalendarDay::days_between(self.start, day);
        if elapsed < 0 {
            return Vec::new();
        }
        self.phases
            .iter()
            .flat_map(|phase| phase.applies(day, elapsed))
            .collect()
    }
}

// ============================================================================
// Rule Set
// ============================================================================

/// Ordered collection of dose rules
#[derive(Default)]
pub struct RegimenRuleSet {
    rules: Vec<Box<dyn DoseRule>>,
}

impl RegimenRuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule; its doses are listed after those of earlier rules
    pub fn with_rule(mut self, rule: impl DoseRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// All doses due on `day`, in rule order
    pub fn obligations_for(&self, day: CalendarDay) -> Vec<Obligation> {
        self.rules.iter().flat_map(|rule| rule.applies(day)).collect()
    }

    /// Doses for `days` consecutive days starting at `from`
    pub fn obligations_between(
        &self,
        from: CalendarDay,
        days: u32,
    ) -> Vec<(CalendarDay, Vec<Obligation>)> {
        (0..i64::from(days))
            .map(|offset| {
                let day = from.add_days(offset);
                (day, self.obligations_for(day))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Builds the default regimen for a course starting on `start`
///
/// - Prosentials every morning
/// - Vitamin D on Sunday and Wednesday mornings
/// - Isoprinosine morning and evening on Tuesdays and Saturdays of weeks 1-3
/// - Valvir morning and evening for 10 days from the start of week 4
pub fn build_default_regimen(start: CalendarDay) -> RegimenRuleSet {
    use TimeOfDay::{Evening, Morning};

    RegimenRuleSet::new()
        .with_rule(DailyRule::new(
            Medication::new("Prosentials", "prosentials", "1 tablet"),
            &[Morning],
            "Daily",
        ))
        .with_rule(WeekdaySetRule::new(
            Medication::new("Vitamin D", "vitd", "1 tablet"),
            &[Weekday::Sun, Weekday::Wed],
            &[Morning],
            "Twice a week (Sun & Wed)",
        ))
        .with_rule(PhasedCourseRule::new(
            start,
            vec![
                CoursePhase::new(
                    Medication::new("Isoprinosine", "isoprinosine", "1 tablet"),
                    PhaseWindow::Weeks { first: 1, last: 3 },
                    Some(&[Weekday::Tue, Weekday::Sat][..]),
                    &[Morning, Evening],
                    "Weeks 1–3: Tue & Sat",
                ),
                CoursePhase::new(
                    Medication::new("Valvir", "valvir", "1 tablet"),
                    PhaseWindow::Days {
                        first_week: 4,
                        length: 10,
                    },
                    None,
                    &[Morning, Evening],
                    "Week 4: 10 days",
                ),
            ],
        ))
}
