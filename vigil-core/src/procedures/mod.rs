//! Projection of stored declarations onto the frontend procedures board.

use chrono::{Datelike, Duration, NaiveDate};

use vigil_model::{DeclarationKind, DeclarationRecord, ProcedureView};

/// Shape a stored declaration for the board: mapped status and category, a
/// display name, a progress percentage, and a derived deadline.
pub fn to_procedure_view(record: &DeclarationRecord) -> ProcedureView {
    let total_steps = if record.total_steps > 0 {
        record.total_steps
    } else {
        record.kind.default_total_steps()
    };

    let period = record.period().map(str::to_string);
    let period_label = period.as_deref().unwrap_or("unscheduled");

    let progress = if total_steps > 0 {
        ((record.current_step.max(0) as f64 / total_steps as f64) * 100.0)
            as i32
    } else {
        0
    };

    ProcedureView {
        id: record.id,
        name: record.kind.display_name(period_label),
        category: record.kind.category(),
        deadline: deadline_for(period.as_deref(), record.kind),
        status: record.status.board_column(),
        progress: progress.min(100),
        current_step: record.current_step,
        total_steps,
        period,
        updated_at: record.updated_at,
    }
}

/// Deadline derived from a `YYYY-MM` filing period: the kind's slack days
/// counted from the start of the following month. Returns `None` when no
/// parsable period has been recorded yet.
pub fn deadline_for(
    period: Option<&str>,
    kind: DeclarationKind,
) -> Option<NaiveDate> {
    let period = period?;
    let (year, month) = period.split_once('-')?;
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;

    let first_of_period = NaiveDate::from_ymd_opt(year, month, 1)?;
    let first_of_next = if first_of_period.month() == 12 {
        NaiveDate::from_ymd_opt(first_of_period.year() + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(
            first_of_period.year(),
            first_of_period.month() + 1,
            1,
        )?
    };

    Some(first_of_next + Duration::days(kind.deadline_slack_days() as i64 - 1))
}
