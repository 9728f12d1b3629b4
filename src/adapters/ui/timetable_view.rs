//! Text rendering of a weekly timetable grid (periods × Mon..Fri).

use crate::domain::timeslot::MAX_PERIOD;
use crate::domain::{Course, Period, TimeSlot, Timetable, Weekday};

const CELL_WIDTH: usize = 10;

/// Shortens `name` to fit a cell, counting characters rather than bytes.
fn fit(name: &str) -> String {
    let max = CELL_WIDTH / 2;
    if name.chars().count() <= max {
        name.to_string()
    } else {
        let mut s: String = name.chars().take(max - 1).collect();
        s.push('…');
        s
    }
}

fn cell_label(courses: &[&Course]) -> String {
    match courses {
        [] => String::new(),
        [only] => fit(&only.name),
        [first, rest @ ..] => format!("{}+{}", fit(&first.name), rest.len()),
    }
}

/// Renders the grid. Overlapping courses show as `name+N`. Unscheduled courses are listed below.
pub fn render_grid(timetable: &Timetable) -> String {
    let mut out = String::new();
    out.push_str("교시");
    for day in Weekday::ALL {
        out.push_str(&format!(" | {:^w$}", day.glyph(), w = CELL_WIDTH - 2));
    }
    out.push('\n');

    for p in 1..=MAX_PERIOD {
        let Ok(period) = Period::new(p) else { continue };
        out.push_str(&format!("{:^4}", p));
        for day in Weekday::ALL {
            let slot = TimeSlot::new(day, period);
            let here: Vec<&Course> = timetable
                .courses()
                .iter()
                .filter(|c| c.slots.contains(&slot))
                .collect();
            out.push_str(" | ");
            out.push_str(&cell_label(&here));
        }
        out.push('\n');
    }

    let unscheduled: Vec<&str> = timetable
        .courses()
        .iter()
        .filter(|c| c.slots.is_unscheduled())
        .map(|c| c.name.as_str())
        .collect();
    if !unscheduled.is_empty() {
        out.push_str(&format!("시간 미지정: {}\n", unscheduled.join(", ")));
    }
    out
}
