use serde::{Deserialize, Serialize};

/// A booked appointment as stored under the appointments key.
///
/// Older entries may lack the optional fields, so every field except the
/// slot identity reads as empty when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub date: String,
    pub time: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mrn: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub reason: String,
}

impl Appointment {
    pub fn occupies(&self, date: &str, time: &str) -> bool {
        self.date == date && self.time == time
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub date: String,
    pub time: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotView {
    #[serde(flatten)]
    pub slot: Slot,
    pub booked: bool,
    pub appointment: Option<Appointment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertOutcome {
    Created,
    Updated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodayView {
    Today(Vec<Appointment>),
    Upcoming(Vec<Appointment>),
}

impl TodayView {
    /// Number shown in the dashboard's slot counter; only same-day entries count.
    pub fn count(&self) -> usize {
        match self {
            TodayView::Today(list) => list.len(),
            TodayView::Upcoming(_) => 0,
        }
    }

    pub fn appointments(&self) -> &[Appointment] {
        match self {
            TodayView::Today(list) | TodayView::Upcoming(list) => list,
        }
    }

    pub fn is_today(&self) -> bool {
        matches!(self, TodayView::Today(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Patient {
    pub name: String,
    pub dob: String,
    pub mrn: String,
    pub phone: String,
}

impl Patient {
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .take(2)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Visit {
    pub id: String,
    pub date: String,
    pub mrn: String,
    pub patient: String,
    pub note: String,
    pub provider: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SoapSections {
    #[serde(default)]
    pub subjective: String,
    #[serde(default)]
    pub objective: String,
    #[serde(default)]
    pub assessment: String,
    #[serde(default)]
    pub plan: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SoapNote {
    pub subjective: String,
    pub objective: String,
    pub assessment: String,
    pub plan: String,
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub struct AppointmentRequest {
    pub date: String,
    pub time: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mrn: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub reason: String,
}

impl From<AppointmentRequest> for Appointment {
    fn from(req: AppointmentRequest) -> Self {
        Self {
            date: req.date,
            time: req.time,
            name: req.name,
            mrn: req.mrn,
            provider: req.provider,
            reason: req.reason,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UpsertResponse {
    pub outcome: UpsertOutcome,
    pub appointment: Appointment,
}

#[derive(Debug, Serialize)]
pub struct TodayResponse {
    pub view: &'static str,
    pub count: usize,
    pub appointments: Vec<Appointment>,
}

impl From<TodayView> for TodayResponse {
    fn from(view: TodayView) -> Self {
        let count = view.count();
        let (label, appointments) = match view {
            TodayView::Today(list) => ("today", list),
            TodayView::Upcoming(list) => ("upcoming", list),
        };
        Self {
            view: label,
            count,
            appointments,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SlotQuery {
    #[serde(default)]
    pub offset: i64,
}

#[derive(Debug, Deserialize)]
pub struct BookingQuery {
    pub date: String,
    pub time: String,
    #[serde(default)]
    pub label: String,
}

impl From<BookingQuery> for Slot {
    fn from(query: BookingQuery) -> Self {
        Self {
            date: query.date,
            time: query.time,
            label: query.label,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SlotsResponse {
    pub offset: i64,
    pub label: &'static str,
    pub slots: Vec<SlotView>,
}

#[derive(Debug, Deserialize)]
pub struct NavigateRequest {
    pub page: String,
    #[serde(default = "default_push_history")]
    pub push_history: bool,
}

fn default_push_history() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct PopStateRequest {
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub fragment: Option<String>,
}

#[derive(Debug, Serialize, Default)]
pub struct NavigationResponse {
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PatientResponse {
    #[serde(flatten)]
    pub patient: Patient,
    pub initials: String,
}

#[derive(Debug, Deserialize)]
pub struct PageStateRequest {
    #[serde(default)]
    pub offset: Option<i64>,
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default)]
    pub patient: Option<String>,
}
