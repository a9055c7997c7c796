//! Per-route controllers and the session-scoped demo state they work on.

use crate::errors::AppError;
use crate::models::{Patient, SlotView, SoapNote, SoapSections, TodayView, Visit};
use crate::router::{PageController, PageRouter, Route, RouterError, TemplateSource};
use crate::scheduler::{
    build_slots_at, date_key, day_label, slot_grid, todays_appointments_at,
};
use crate::storage::{KvStore, load_appointments};
use chrono::NaiveDate;

pub const DEFAULT_PATIENT_ID: &str = "1001";
pub const DAY_OFFSETS: [i64; 3] = [0, 1, 2];

/// Everything a controller may touch while a page loads.
pub struct PageContext<'a> {
    pub store: &'a mut KvStore,
    pub demo: &'a mut DemoState,
    pub today: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct DemoState {
    pub patient_id: String,
    pub day_offset: i64,
    pub visit_filter: String,
    /// Present only while the patient page is open.
    pub workspace: Option<PatientWorkspace>,
}

impl Default for DemoState {
    fn default() -> Self {
        Self {
            patient_id: DEFAULT_PATIENT_ID.to_string(),
            day_offset: 0,
            visit_filter: String::new(),
            workspace: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEntry {
    pub at: String,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct PatientWorkspace {
    pub patient: Patient,
    pub visits: Vec<Visit>,
    pub soaps: Vec<SoapNote>,
    pub timeline: Vec<TimelineEntry>,
}

impl PatientWorkspace {
    pub fn open(patient: Patient) -> Self {
        let visits = visit_log()
            .into_iter()
            .filter(|visit| visit.mrn == patient.mrn)
            .collect();
        Self {
            patient,
            visits,
            soaps: Vec::new(),
            timeline: Vec::new(),
        }
    }

    pub fn save_soap(&mut self, sections: SoapSections, today: NaiveDate) -> Result<&SoapNote, AppError> {
        let note = SoapNote {
            subjective: sections.subjective.trim().to_string(),
            objective: sections.objective.trim().to_string(),
            assessment: sections.assessment.trim().to_string(),
            plan: sections.plan.trim().to_string(),
            date: date_key(today),
        };
        if [&note.subjective, &note.objective, &note.assessment, &note.plan]
            .iter()
            .all(|text| text.is_empty())
        {
            return Err(AppError::bad_request("Enter at least one field"));
        }

        // newest first, like the on-page timeline
        self.timeline.insert(
            0,
            TimelineEntry {
                at: note.date.clone(),
                text: "Saved SOAP note".to_string(),
            },
        );
        self.soaps.push(note);
        Ok(&self.soaps[self.soaps.len() - 1])
    }
}

fn patient(name: &str, dob: &str, mrn: &str) -> Patient {
    Patient {
        name: name.to_string(),
        dob: dob.to_string(),
        mrn: mrn.to_string(),
        phone: "+".to_string(),
    }
}

pub fn patient_fixtures() -> Vec<Patient> {
    vec![
        patient("Jane Smith", "1990-08-12", "1000"),
        patient("John Doe", "1986-05-02", "1001"),
        patient("Rahul Mehta", "1978-02-04", "1002"),
        patient("Priya Kapoor", "1992-11-09", "1003"),
    ]
}

fn visit(id: &str, date: &str, mrn: &str, patient: &str, note: &str, provider: &str) -> Visit {
    Visit {
        id: id.to_string(),
        date: date.to_string(),
        mrn: mrn.to_string(),
        patient: patient.to_string(),
        note: note.to_string(),
        provider: provider.to_string(),
    }
}

pub fn visit_log() -> Vec<Visit> {
    vec![
        visit("V-1001", "2025-09-16", "1001", "John Doe", "Chest pain", "Dr. A. Kumar"),
        visit("V-1002", "2025-09-12", "1000", "Jane Smith", "Annual physical", "Dr. A. Kumar"),
        visit("V-1003", "2025-09-10", "1002", "Rahul Mehta", "Hypertension review", "Dr. S. Patel"),
        visit("V-1004", "2025-08-10", "1001", "John Doe", "Follow-up", "Dr. S. Patel"),
    ]
}

/// Fixture patient, else the latest booking carrying the MRN, else `Unknown`.
pub fn lookup_patient(store: &KvStore, id: &str) -> Patient {
    if let Some(found) = patient_fixtures().into_iter().find(|p| p.mrn == id) {
        return found;
    }

    let name = load_appointments(store)
        .into_iter()
        .rev()
        .find(|appt| appt.mrn == id && !appt.name.is_empty())
        .map(|appt| appt.name)
        .unwrap_or_else(|| "Unknown".to_string());
    Patient {
        name,
        dob: String::new(),
        mrn: id.to_string(),
        phone: String::new(),
    }
}

pub fn filter_visits(visits: &[Visit], query: &str) -> Vec<Visit> {
    let query = query.trim().to_lowercase();
    visits
        .iter()
        .filter(|visit| {
            query.is_empty()
                || [&visit.id, &visit.date, &visit.patient, &visit.note, &visit.provider]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&query))
        })
        .cloned()
        .collect()
}

/// Escapes text for element content; line breaks become `<br>`.
pub fn escape_html(text: &str) -> String {
    escape(text, "<br>")
}

/// Escapes text for a quoted attribute value. Inserts no markup.
pub fn escape_attr(text: &str) -> String {
    escape(text, "&#10;")
}

fn escape(text: &str, newline: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '\n' => out.push_str(newline),
            _ => out.push(ch),
        }
    }
    out
}

fn patient_link(mrn: &str, name: &str) -> String {
    if mrn.is_empty() {
        format!(r##"<a href="#">{}</a>"##, escape_html(name))
    } else {
        format!(
            r##"<a href="#patient" data-patient="{}">{}</a>"##,
            escape_html(mrn),
            escape_html(name)
        )
    }
}

fn render_today(view: &TodayView) -> String {
    if view.appointments().is_empty() {
        return r#"<div class="muted">No appointments yet.</div>"#.to_string();
    }
    view.appointments()
        .iter()
        .map(|appt| {
            let date = if view.is_today() {
                String::new()
            } else {
                format!(" • {}", escape_html(&appt.date))
            };
            format!(
                r#"<div class="appt"><div><strong>{}</strong> — {}</div><div class="muted">{}{}</div></div>"#,
                escape_html(&appt.time),
                patient_link(&appt.mrn, &appt.name),
                escape_html(&appt.provider),
                date,
            )
        })
        .collect()
}

fn render_slot_grid(grid: &[SlotView]) -> String {
    grid.iter()
        .map(|view| {
            let (class, detail) = match &view.appointment {
                Some(appt) => (" slot-booked", escape_html(&appt.name)),
                None => ("", "+".to_string()),
            };
            format!(
                r#"<button class="btn ghost{class}" data-slot data-date="{}" data-time="{}" data-label="{}"><span>{}</span><span>{detail}</span></button>"#,
                view.slot.date, view.slot.time, view.slot.label, view.slot.label,
            )
        })
        .collect()
}

fn render_day_tabs(active: i64) -> String {
    DAY_OFFSETS
        .iter()
        .map(|&offset| {
            let pressed = offset == active;
            format!(
                r#"<button class="appt-day-tab{}" data-offset="{offset}" aria-pressed="{pressed}">{}</button>"#,
                if pressed { " active" } else { "" },
                day_label(offset),
            )
        })
        .collect()
}

fn render_visit_rows(visits: &[Visit]) -> String {
    visits
        .iter()
        .map(|visit| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_html(&visit.id),
                escape_html(&visit.date),
                escape_html(&visit.patient),
                escape_html(&visit.note),
                escape_html(&visit.provider),
            )
        })
        .collect()
}

fn render_soaps(soaps: &[SoapNote]) -> String {
    if soaps.is_empty() {
        return r#"<div class="muted">No SOAP notes yet.</div>"#.to_string();
    }
    soaps
        .iter()
        .rev()
        .map(|soap| {
            format!(
                r#"<div class="soap-block"><strong>SOAP — {}</strong><div><strong>Subjective:</strong> {}</div><div><strong>Objective:</strong> {}</div><div><strong>Assessment:</strong> {}</div><div><strong>Plan:</strong> {}</div></div>"#,
                escape_html(&soap.date),
                escape_html(&soap.subjective),
                escape_html(&soap.objective),
                escape_html(&soap.assessment),
                escape_html(&soap.plan),
            )
        })
        .collect()
}

pub struct DashboardPage;

impl PageController for DashboardPage {
    fn init(&self, ctx: &mut PageContext<'_>, html: String) -> String {
        let list = load_appointments(ctx.store);
        let view = todays_appointments_at(&list, ctx.today);
        let count = view.count();
        html.replace("{{APPOINTMENTS}}", &render_today(&view))
            .replace(
                "{{APPT_COUNT}}",
                &format!("{count} slot{}", if count == 1 { "" } else { "s" }),
            )
    }
}

pub struct VisitsPage;

impl PageController for VisitsPage {
    fn init(&self, ctx: &mut PageContext<'_>, html: String) -> String {
        let rows = filter_visits(&visit_log(), &ctx.demo.visit_filter);
        html.replace("{{FILTER}}", &escape_attr(&ctx.demo.visit_filter))
            .replace("{{VISIT_ROWS}}", &render_visit_rows(&rows))
    }
}

pub struct AppointmentsPage;

impl PageController for AppointmentsPage {
    fn init(&self, ctx: &mut PageContext<'_>, html: String) -> String {
        let offset = ctx.demo.day_offset;
        let list = load_appointments(ctx.store);
        let grid = slot_grid(&list, build_slots_at(ctx.today, offset));
        html.replace("{{DAY_TABS}}", &render_day_tabs(offset))
            .replace("{{SLOT_GRID}}", &render_slot_grid(&grid))
    }
}

pub struct SettingsPage;

impl PageController for SettingsPage {
    fn init(&self, _ctx: &mut PageContext<'_>, html: String) -> String {
        html
    }
}

pub struct PatientPage;

impl PageController for PatientPage {
    fn init(&self, ctx: &mut PageContext<'_>, html: String) -> String {
        let workspace = match ctx.demo.workspace.take() {
            Some(open) if open.patient.mrn == ctx.demo.patient_id => open,
            _ => PatientWorkspace::open(lookup_patient(ctx.store, &ctx.demo.patient_id)),
        };

        let patient = &workspace.patient;
        let visits: String = workspace
            .visits
            .iter()
            .map(|visit| {
                format!(
                    r#"<div class="soap-block"><strong>{}</strong><div class="muted">{} • {}</div></div>"#,
                    escape_html(&visit.date),
                    escape_html(&visit.note),
                    escape_html(&visit.provider),
                )
            })
            .collect();
        let timeline: String = workspace
            .timeline
            .iter()
            .map(|entry| {
                format!(
                    "<div><strong>{}</strong> — {}</div>",
                    escape_html(&entry.at),
                    escape_html(&entry.text)
                )
            })
            .collect();

        let rendered = html
            .replace("{{PATIENT_NAME}}", &escape_html(&patient.name))
            .replace("{{INITIALS}}", &escape_html(&patient.initials()))
            .replace("{{MRN}}", &escape_html(&patient.mrn))
            .replace("{{DOB}}", &escape_html(if patient.dob.is_empty() { "-" } else { &patient.dob }))
            .replace("{{PHONE}}", &escape_html(&patient.phone))
            .replace("{{VISITS}}", &visits)
            .replace("{{SOAPS}}", &render_soaps(&workspace.soaps))
            .replace("{{TIMELINE}}", &timeline);
        ctx.demo.workspace = Some(workspace);
        rendered
    }

    fn cleanup(&self, ctx: &mut PageContext<'_>) {
        ctx.demo.workspace = None;
    }
}

/// Registers the five EMR pages in navigation order.
pub fn register_pages<T: TemplateSource>(router: &mut PageRouter<T>) -> Result<(), RouterError> {
    let pages: [(&str, &str, Box<dyn PageController>); 5] = [
        ("dashboard", "Helix EMR — Dashboard", Box::new(DashboardPage)),
        ("visits", "Helix EMR — Patient Visits", Box::new(VisitsPage)),
        ("appointments", "Helix EMR — Appointments", Box::new(AppointmentsPage)),
        ("settings", "Helix EMR — Settings", Box::new(SettingsPage)),
        ("patient", "Patient — Helix EMR", Box::new(PatientPage)),
    ];
    for (name, title, controller) in pages {
        router.register_route(Route {
            name: name.to_string(),
            title: title.to_string(),
            template: format!("{name}.html"),
            controller,
        })?;
    }
    Ok(())
}
