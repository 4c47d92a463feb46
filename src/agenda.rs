//! In-memory agenda of campus activities.
//!
//! The dataset is a fixed list seeded relative to a reference instant and kept
//! sorted by start time, so paging is stable. Calls sleep briefly to behave like
//! a remote service.

use std::time::Duration;

use chrono::{DateTime, Datelike, SecondsFormat, TimeDelta, TimeZone, Timelike, Utc};
use serde::Serialize;
use thiserror::Error;

const LIST_LATENCY: Duration = Duration::from_millis(50);
const GET_LATENCY: Duration = Duration::from_millis(30);

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AgendaError {
    #[error("Actividad no encontrada")]
    NotFound(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Estado {
    Programada,
    EnCurso,
    Suspendida,
    Finalizada,
}

impl Estado {
    /// Wire value, also used as a CSS class suffix.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Programada => "programada",
            Self::EnCurso => "en_curso",
            Self::Suspendida => "suspendida",
            Self::Finalizada => "finalizada",
        }
    }

    pub fn label(self) -> String {
        self.as_str().replace('_', " ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Actividad {
    pub id: u32,
    pub titulo: String,
    /// UTC ISO-8601 with millisecond precision (`2026-03-10T13:00:00.000Z`).
    pub datetime: String,
    pub espacio: String,
    pub estado: Estado,
}

impl Actividad {
    pub fn starts_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.datetime)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub page_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgendaPage {
    pub items: Vec<Actividad>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOptions {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub page: usize,
    pub page_size: usize,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            from: None,
            to: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Format shared by stored datetimes and range bounds, so string order is time order.
pub fn iso(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

struct Seed {
    id: u32,
    titulo: &'static str,
    days: i64,
    hour: u32,
    minute: u32,
    espacio: &'static str,
    estado: Estado,
}

const SEEDS: [Seed; 10] = [
    Seed {
        id: 1,
        titulo: "Charla de bienvenida",
        days: 2,
        hour: 10,
        minute: 0,
        espacio: "Aula Magna",
        estado: Estado::Programada,
    },
    Seed {
        id: 2,
        titulo: "Taller de React",
        days: 5,
        hour: 14,
        minute: 30,
        espacio: "Lab 2",
        estado: Estado::Programada,
    },
    Seed {
        id: 3,
        titulo: "Feria de proyectos",
        days: 9,
        hour: 9,
        minute: 0,
        espacio: "Hall central",
        estado: Estado::EnCurso,
    },
    Seed {
        id: 4,
        titulo: "Capacitación Docente",
        days: 12,
        hour: 16,
        minute: 0,
        espacio: "Sala de reuniones",
        estado: Estado::Programada,
    },
    Seed {
        id: 5,
        titulo: "Asamblea Estudiantil",
        days: 15,
        hour: 11,
        minute: 0,
        espacio: "Patio",
        estado: Estado::Suspendida,
    },
    Seed {
        id: 6,
        titulo: "Jornada de Puertas Abiertas",
        days: 20,
        hour: 10,
        minute: 0,
        espacio: "Campus",
        estado: Estado::Programada,
    },
    Seed {
        id: 7,
        titulo: "Hackatón",
        days: 25,
        hour: 9,
        minute: 0,
        espacio: "Lab 1",
        estado: Estado::Programada,
    },
    Seed {
        id: 8,
        titulo: "Seminario de IA",
        days: 32,
        hour: 15,
        minute: 0,
        espacio: "Auditorio",
        estado: Estado::Programada,
    },
    Seed {
        id: 9,
        titulo: "Encuentro de Graduados",
        days: -3,
        hour: 18,
        minute: 0,
        espacio: "Salón principal",
        estado: Estado::Finalizada,
    },
    Seed {
        id: 10,
        titulo: "Mesa de Examen",
        days: 1,
        hour: 8,
        minute: 0,
        espacio: "Aula 101",
        estado: Estado::Programada,
    },
];

/// `now` shifted by `days` calendar days, at `hour:minute` wall time in `now`'s zone.
fn wall_time<Tz: TimeZone>(
    now: &DateTime<Tz>,
    days: i64,
    hour: u32,
    minute: u32,
) -> Option<DateTime<Utc>> {
    let date = now.date_naive().checked_add_signed(TimeDelta::days(days))?;
    let naive = date.and_hms_opt(hour, minute, 0)?;
    let local = now.timezone().from_local_datetime(&naive).earliest()?;
    Some(local.with_timezone(&Utc))
}

#[derive(Debug, Clone)]
pub struct AgendaService {
    data: Vec<Actividad>,
}

impl AgendaService {
    /// Dataset seeded relative to the current local time.
    pub fn new() -> Self {
        Self::seeded_at(&chrono::Local::now())
    }

    pub fn seeded_at<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        let mut data: Vec<Actividad> = SEEDS
            .iter()
            .filter_map(|seed| {
                let at = wall_time(now, seed.days, seed.hour, seed.minute)?;
                Some(Actividad {
                    id: seed.id,
                    titulo: seed.titulo.to_owned(),
                    datetime: iso(&at),
                    espacio: seed.espacio.to_owned(),
                    estado: seed.estado,
                })
            })
            .collect();
        data.sort_by(|a, b| a.datetime.cmp(&b.datetime));
        Self { data }
    }

    pub fn all(&self) -> &[Actividad] {
        &self.data
    }

    pub async fn list(&self, options: ListOptions) -> AgendaPage {
        tokio::time::sleep(LIST_LATENCY).await;
        self.page(&options)
    }

    pub async fn get(&self, id: u32) -> Result<Actividad, AgendaError> {
        tokio::time::sleep(GET_LATENCY).await;
        self.data
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or(AgendaError::NotFound(id))
    }

    /// Inclusive range filter, then a page clamped into `[1, page_count]`.
    pub fn page(&self, options: &ListOptions) -> AgendaPage {
        let from = options.from.as_ref().map(iso);
        let to = options.to.as_ref().map(iso);
        let filtered: Vec<&Actividad> = self
            .data
            .iter()
            .filter(|a| from.as_deref().is_none_or(|f| a.datetime.as_str() >= f))
            .filter(|a| to.as_deref().is_none_or(|t| a.datetime.as_str() <= t))
            .collect();

        let page_size = options.page_size.max(1);
        let total = filtered.len();
        let page_count = total.div_ceil(page_size).max(1);
        let page = options.page.clamp(1, page_count);
        let items = filtered
            .into_iter()
            .skip((page - 1) * page_size)
            .take(page_size)
            .cloned()
            .collect();

        AgendaPage {
            items,
            pagination: Pagination {
                page,
                page_size,
                total,
                page_count,
            },
        }
    }
}

impl Default for AgendaService {
    fn default() -> Self {
        Self::new()
    }
}

const WEEKDAYS: [&str; 7] = ["lun", "mar", "mié", "jue", "vie", "sáb", "dom"];
const WEEKDAYS_LONG: [&str; 7] = [
    "lunes", "martes", "miércoles", "jueves", "viernes", "sábado", "domingo",
];
const MONTHS: [&str; 12] = [
    "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sept", "oct", "nov", "dic",
];
const MONTHS_LONG: [&str; 12] = [
    "enero", "febrero", "marzo", "abril", "mayo", "junio", "julio", "agosto", "septiembre",
    "octubre", "noviembre", "diciembre",
];

/// `mar, 10 mar, 10:00`
pub fn format_short<Tz: TimeZone>(dt: &DateTime<Tz>) -> String {
    format!(
        "{}, {:02} {}, {:02}:{:02}",
        WEEKDAYS[dt.weekday().num_days_from_monday() as usize],
        dt.day(),
        MONTHS[dt.month0() as usize],
        dt.hour(),
        dt.minute()
    )
}

/// `martes, 10 de marzo de 2026, 10:00`
pub fn format_long<Tz: TimeZone>(dt: &DateTime<Tz>) -> String {
    format!(
        "{}, {:02} de {} de {}, {:02}:{:02}",
        WEEKDAYS_LONG[dt.weekday().num_days_from_monday() as usize],
        dt.day(),
        MONTHS_LONG[dt.month0() as usize],
        dt.year(),
        dt.hour(),
        dt.minute()
    )
}
