//! Calendar event projection.
//!
//! Expenses and contributions are reshaped into one date-indexed stream of
//! [`CalendarEvent`]s. The projection is rebuilt from its inputs on every
//! call.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::dates::{Period, same_day};
use crate::models::{Contribution, EventKind, EventStatus, Expense, Investor, InvestorId};

/// Title shared by every contribution event.
const CONTRIBUTION_TITLE: &str = "Contribution";

/// Who an event is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Attribution {
    /// A single known investor.
    Investor {
        /// Investor id.
        id: InvestorId,
        /// Investor display name.
        name: String,
    },
    /// Several investors share the expense.
    Multiple {
        /// Distinct participants in split order.
        investor_ids: Vec<InvestorId>,
    },
    /// The expense has no split yet.
    Unassigned,
    /// The referenced investor is not in the catalog.
    Unknown {
        /// The dangling investor id.
        id: InvestorId,
    },
}

impl Attribution {
    /// Short label for display.
    #[must_use]
    pub fn label(&self) -> &str {
        match *self {
            Self::Investor { ref name, .. } => name,
            Self::Multiple { .. } => "multiple investors",
            Self::Unassigned => "unassigned",
            Self::Unknown { .. } => "unknown investor",
        }
    }
}

/// An expense or contribution placed on the calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    /// `expense:<id>` or `contribution:<id>`.
    pub id: String,
    /// Expense description, or `Contribution`.
    pub title: String,
    /// Extra detail shown under the title.
    pub description: String,
    /// Due date (expenses) or contribution date.
    pub date: NaiveDate,
    /// Amount moved.
    pub amount: Decimal,
    /// Source record type.
    pub kind: EventKind,
    /// Payment state; contributions are always confirmed.
    pub status: EventStatus,
    /// Investor(s) behind the event.
    pub attribution: Attribution,
}

/// Projects expenses and contributions into calendar events.
///
/// Events are ordered by date, then expenses before contributions, then
/// id.
#[must_use]
pub fn project_events(
    expenses: &[Expense],
    contributions: &[Contribution],
    investors: &[Investor],
) -> Vec<CalendarEvent> {
    let names: HashMap<&InvestorId, &str> = investors
        .iter()
        .map(|inv| (&inv.id, inv.name.as_str()))
        .collect();

    let mut events: Vec<CalendarEvent> = expenses
        .iter()
        .map(|expense| expense_event(expense, &names))
        .chain(
            contributions
                .iter()
                .map(|contribution| contribution_event(contribution, &names)),
        )
        .collect();
    events.sort_by(|left, right| {
        left.date
            .cmp(&right.date)
            .then_with(|| left.kind.cmp(&right.kind))
            .then_with(|| left.id.cmp(&right.id))
    });
    events
}

/// Events falling on `day`.
#[must_use]
pub fn events_on_day(events: &[CalendarEvent], day: NaiveDate) -> Vec<&CalendarEvent> {
    events
        .iter()
        .filter(|event| same_day(event.date, day))
        .collect()
}

/// Events inside `period` grouped by day. Days without events are absent.
#[must_use]
pub fn events_in_period(
    events: &[CalendarEvent],
    period: Period,
) -> BTreeMap<NaiveDate, Vec<&CalendarEvent>> {
    let mut days: BTreeMap<NaiveDate, Vec<&CalendarEvent>> = BTreeMap::new();
    for event in events.iter().filter(|event| period.contains(event.date)) {
        days.entry(event.date).or_default().push(event);
    }
    days
}

/// Projects one expense onto its due date.
fn expense_event(expense: &Expense, names: &HashMap<&InvestorId, &str>) -> CalendarEvent {
    let attribution = match expense.participants().as_slice() {
        [] => Attribution::Unassigned,
        [single] => resolve(single, names),
        several => Attribution::Multiple {
            investor_ids: several.iter().map(|&id| id.clone()).collect(),
        },
    };
    let description = match expense.installment_label() {
        Some(marker) if expense.source.is_empty() => marker,
        Some(marker) => format!("{} {marker}", expense.source),
        None => expense.source.clone(),
    };
    CalendarEvent {
        id: format!("expense:{}", expense.id),
        title: expense.description.clone(),
        description,
        date: expense.due_date,
        amount: expense.amount,
        kind: EventKind::Expense,
        status: EventStatus::from(expense.status),
        attribution,
    }
}

/// Projects one contribution onto its date.
fn contribution_event(
    contribution: &Contribution,
    names: &HashMap<&InvestorId, &str>,
) -> CalendarEvent {
    CalendarEvent {
        id: format!("contribution:{}", contribution.id),
        title: CONTRIBUTION_TITLE.to_owned(),
        description: contribution.description.clone(),
        date: contribution.date,
        amount: contribution.amount,
        kind: EventKind::Contribution,
        status: EventStatus::Confirmed,
        attribution: resolve(&contribution.investor_id, names),
    }
}

/// Attribution for a single investor id.
fn resolve(id: &InvestorId, names: &HashMap<&InvestorId, &str>) -> Attribution {
    names.get(id).map_or_else(
        || {
            tracing::warn!(investor = %id, "calendar event references unknown investor");
            Attribution::Unknown { id: id.clone() }
        },
        |&name| Attribution::Investor {
            id: id.clone(),
            name: name.to_owned(),
        },
    )
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{
        CategoryId, ContributionId, ExpenseId, ExpenseKind, ExpenseStatus, InvestorShare,
        PaymentMethod,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn investor(id: &str, name: &str) -> Investor {
        Investor {
            id: InvestorId::from(id),
            name: name.to_owned(),
            email: format!("{id}@example.com"),
            active: true,
            current_balance: Decimal::ZERO,
        }
    }

    fn share(id: &str, amount: Decimal) -> InvestorShare {
        InvestorShare {
            investor_id: InvestorId::from(id),
            amount,
        }
    }

    fn expense(id: &str, due: NaiveDate, split: Vec<InvestorShare>) -> Expense {
        Expense {
            id: ExpenseId::from(id),
            description: format!("Expense {id}"),
            source: "Market".to_owned(),
            category_id: CategoryId::from("food"),
            amount: dec!(40.00),
            purchase_date: due,
            due_date: due,
            payment: PaymentMethod::Cash,
            status: ExpenseStatus::Pending,
            kind: ExpenseKind::Single,
            investor_split: split,
        }
    }

    fn contribution(id: &str, investor: &str, on: NaiveDate) -> Contribution {
        Contribution {
            id: ContributionId::from(id),
            investor_id: InvestorId::from(investor),
            amount: dec!(500.00),
            date: on,
            description: "monthly".to_owned(),
        }
    }

    #[test]
    fn projects_both_record_types() {
        let investors = vec![investor("a", "Ana"), investor("b", "Bruno")];
        let mut paid = expense("e1", date(2024, 5, 10), vec![share("a", dec!(40.00))]);
        paid.status = ExpenseStatus::Paid;
        let events = project_events(
            &[paid],
            &[contribution("c1", "b", date(2024, 5, 2))],
            &investors,
        );
        assert_eq!(events.len(), 2);

        let first = events.first().unwrap();
        assert_eq!(first.id, "contribution:c1");
        assert_eq!(first.title, "Contribution");
        assert_eq!(first.kind, EventKind::Contribution);
        assert_eq!(first.status, EventStatus::Confirmed);
        assert_eq!(first.attribution.label(), "Bruno");

        let second = events.get(1).unwrap();
        assert_eq!(second.id, "expense:e1");
        assert_eq!(second.title, "Expense e1");
        assert_eq!(second.date, date(2024, 5, 10));
        assert_eq!(second.status, EventStatus::Paid);
        assert_eq!(
            second.attribution,
            Attribution::Investor {
                id: InvestorId::from("a"),
                name: "Ana".to_owned(),
            }
        );
    }

    #[test]
    fn attribution_covers_every_split_shape() {
        let investors = vec![investor("a", "Ana"), investor("b", "Bruno")];
        let day = date(2024, 6, 1);
        let expenses = vec![
            expense(
                "multi",
                day,
                vec![share("a", dec!(20.00)), share("b", dec!(20.00))],
            ),
            expense("none", day, Vec::new()),
            expense("ghost", day, vec![share("zed", dec!(40.00))]),
            expense(
                "same",
                day,
                vec![share("b", dec!(20.00)), share("b", dec!(20.00))],
            ),
        ];
        let events = project_events(&expenses, &[], &investors);
        let by_id = |id: &str| {
            events
                .iter()
                .find(|event| event.id == format!("expense:{id}"))
                .unwrap()
        };

        assert_eq!(
            by_id("multi").attribution,
            Attribution::Multiple {
                investor_ids: vec![InvestorId::from("a"), InvestorId::from("b")],
            }
        );
        assert_eq!(by_id("multi").attribution.label(), "multiple investors");
        assert_eq!(by_id("none").attribution, Attribution::Unassigned);
        assert_eq!(by_id("ghost").attribution.label(), "unknown investor");
        assert_eq!(by_id("same").attribution.label(), "Bruno");
    }

    #[test]
    fn installment_marker_in_description() {
        let mut exp = expense("e1", date(2024, 2, 5), Vec::new());
        exp.kind = ExpenseKind::Installment {
            current_installment: 3,
            total_installments: 10,
        };
        let events = project_events(&[exp], &[], &[]);
        assert_eq!(events.first().unwrap().description, "Market 3/10");
    }

    #[test]
    fn ordering_is_date_then_kind_then_id() {
        let day = date(2024, 3, 3);
        let events = project_events(
            &[
                expense("b", day, Vec::new()),
                expense("a", day, Vec::new()),
                expense("early", date(2024, 3, 1), Vec::new()),
            ],
            &[contribution("c", "x", day)],
            &[],
        );
        let ids: Vec<&str> = events.iter().map(|event| event.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["expense:early", "expense:a", "expense:b", "contribution:c"]
        );
    }

    #[test]
    fn events_on_day_filters_by_calendar_day() {
        let events = project_events(
            &[
                expense("e1", date(2024, 4, 9), Vec::new()),
                expense("e2", date(2024, 4, 10), Vec::new()),
            ],
            &[contribution("c1", "a", date(2024, 4, 10))],
            &[investor("a", "Ana")],
        );
        let today = events_on_day(&events, date(2024, 4, 10));
        assert_eq!(today.len(), 2);
        assert!(today.iter().all(|event| event.date == date(2024, 4, 10)));
        assert!(events_on_day(&events, date(2025, 4, 10)).is_empty());
    }

    #[test]
    fn projection_is_repeatable() {
        let expenses = vec![expense("e1", date(2024, 1, 1), Vec::new())];
        let contributions = vec![contribution("c1", "a", date(2024, 1, 1))];
        let investors = vec![investor("a", "Ana")];
        assert_eq!(
            project_events(&expenses, &contributions, &investors),
            project_events(&expenses, &contributions, &investors)
        );
    }

    #[test]
    fn events_grouped_by_day_within_period() {
        let events = project_events(
            &[
                expense("e1", date(2024, 4, 30), Vec::new()),
                expense("e2", date(2024, 5, 2), Vec::new()),
                expense("e3", date(2024, 5, 2), Vec::new()),
                expense("e4", date(2024, 5, 20), Vec::new()),
            ],
            &[],
            &[],
        );
        let may = Period::parse("2024-05").unwrap();
        let grouped = events_in_period(&events, may);
        let days: Vec<NaiveDate> = grouped.keys().copied().collect();
        assert_eq!(days, vec![date(2024, 5, 2), date(2024, 5, 20)]);
        assert_eq!(grouped.get(&date(2024, 5, 2)).map(Vec::len), Some(2));
    }
}
