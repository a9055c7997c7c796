use crate::errors::AppError;
use crate::models::{Appointment, Slot, SlotView, TodayView, UpsertOutcome};
use chrono::{Duration, Local, NaiveDate};

pub const SLOTS_PER_DAY: usize = 8;
pub const DEFAULT_PROVIDER: &str = "Dr. A. Kumar";
const FIRST_SLOT_MINUTE: usize = 9 * 60;
const SLOT_MINUTES: usize = 30;
const UPCOMING_DAYS: i64 = 3;

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn day_label(offset: i64) -> &'static str {
    match offset {
        0 => "Today",
        1 => "Tomorrow",
        _ => "Day After",
    }
}

pub fn build_slots(offset: i64) -> Vec<Slot> {
    build_slots_at(today(), offset)
}

/// Half-hour slots from 09:00 for the day `offset` days after `today`.
pub fn build_slots_at(today: NaiveDate, offset: i64) -> Vec<Slot> {
    let date = date_key(today + Duration::days(offset));

    (0..SLOTS_PER_DAY)
        .map(|index| {
            let minute_of_day = FIRST_SLOT_MINUTE + index * SLOT_MINUTES;
            let (hour, minute) = (minute_of_day / 60, minute_of_day % 60);
            Slot {
                date: date.clone(),
                time: format!("{hour:02}:{minute:02}"),
                label: twelve_hour_label(hour, minute),
            }
        })
        .collect()
}

fn twelve_hour_label(hour: usize, minute: usize) -> String {
    let meridiem = if hour >= 12 { "PM" } else { "AM" };
    let hour12 = (hour + 11) % 12 + 1;
    format!("{hour12}:{minute:02} {meridiem}")
}

pub fn resolve_booking<'a>(list: &'a [Appointment], slot: &Slot) -> Option<&'a Appointment> {
    list.iter().find(|appt| appt.occupies(&slot.date, &slot.time))
}

pub fn slot_grid(list: &[Appointment], slots: Vec<Slot>) -> Vec<SlotView> {
    slots
        .into_iter()
        .map(|slot| {
            let appointment = resolve_booking(list, &slot).cloned();
            SlotView {
                booked: appointment.is_some(),
                appointment,
                slot,
            }
        })
        .collect()
}

/// Replaces the first booking with the same date and time, or appends.
/// Returns the outcome and the record's index in `list`.
///
/// Text fields are trimmed. The list is untouched when the name is empty.
pub fn upsert(
    list: &mut Vec<Appointment>,
    appt: Appointment,
) -> Result<(UpsertOutcome, usize), AppError> {
    let appt = Appointment {
        name: appt.name.trim().to_string(),
        mrn: appt.mrn.trim().to_string(),
        provider: appt.provider.trim().to_string(),
        reason: appt.reason.trim().to_string(),
        ..appt
    };
    if appt.name.is_empty() {
        return Err(AppError::bad_request("Enter patient name"));
    }

    match list
        .iter()
        .position(|existing| existing.occupies(&appt.date, &appt.time))
    {
        Some(index) => {
            list[index] = appt;
            Ok((UpsertOutcome::Updated, index))
        }
        None => {
            list.push(appt);
            Ok((UpsertOutcome::Created, list.len() - 1))
        }
    }
}

pub fn todays_appointments(list: &[Appointment]) -> TodayView {
    todays_appointments_at(list, today())
}

/// Today's bookings by time, or the next few days' bookings when today is empty.
pub fn todays_appointments_at(list: &[Appointment], today: NaiveDate) -> TodayView {
    let today_key = date_key(today);
    let mut todays: Vec<Appointment> = list
        .iter()
        .filter(|appt| appt.date == today_key)
        .cloned()
        .collect();
    if !todays.is_empty() {
        todays.sort_by(|a, b| a.time.cmp(&b.time));
        return TodayView::Today(todays);
    }

    let window: Vec<String> = (0..UPCOMING_DAYS)
        .map(|offset| date_key(today + Duration::days(offset)))
        .collect();
    let mut upcoming: Vec<Appointment> = list
        .iter()
        .filter(|appt| window.contains(&appt.date))
        .cloned()
        .collect();
    upcoming.sort_by(|a, b| (&a.date, &a.time).cmp(&(&b.date, &b.time)));
    TodayView::Upcoming(upcoming)
}
