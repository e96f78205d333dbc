//! Booking request form

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// ASCII word characters only
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"^[\w\-.]+@([\w-]+\.)+[\w-]{2,}$")
        .case_insensitive(true)
        .unicode(false)
        .build()
        .expect("email pattern is a valid regex")
});

pub const SUCCESS_MESSAGE: &str = "¡Gracias! Te contactaremos pronto.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Concierto,
    Festival,
    Privado,
    Corporativo,
    Otro,
}

impl EventType {
    pub const ALL: [EventType; 5] = [
        EventType::Concierto,
        EventType::Festival,
        EventType::Privado,
        EventType::Corporativo,
        EventType::Otro,
    ];

    pub fn value(&self) -> &'static str {
        match self {
            EventType::Concierto => "concierto",
            EventType::Festival => "festival",
            EventType::Privado => "privado",
            EventType::Corporativo => "corporativo",
            EventType::Otro => "otro",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.value() == value)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EventType::Concierto => "Concierto",
            EventType::Festival => "Festival",
            EventType::Privado => "Evento privado",
            EventType::Corporativo => "Corporativo",
            EventType::Otro => "Otro",
        };
        write!(f, "{}", label)
    }
}

/// Raw form submission, exactly as entered
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BookingForm {
    pub name: String,
    pub email: String,
    pub event_type: String,
    pub budget: String,
    pub event_date: String,
    pub message: String,
}

/// A validated booking request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingRequest {
    pub name: String,
    pub email: String,
    pub event_type: EventType,
    pub budget: f64,
    pub event_date: NaiveDate,
    pub message: String,
}

/// Validation messages keyed by form field name
pub type FieldErrors = BTreeMap<&'static str, &'static str>;

impl BookingForm {
    pub fn validate(&self) -> Result<BookingRequest, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.insert("name", "Ingresa tu nombre de contacto.");
        }

        let email = self.email.trim();
        if email.is_empty() {
            errors.insert("email", "Necesitamos un correo para responderte.");
        } else if !is_valid_email(email) {
            errors.insert("email", "Ingresa un correo electrónico válido.");
        }

        let event_type = EventType::parse(self.event_type.trim());
        if event_type.is_none() {
            errors.insert("event_type", "Selecciona el tipo de evento.");
        }

        let budget = self.budget.trim();
        let parsed_budget = budget.parse::<f64>().ok().filter(|b| b.is_finite() && *b > 0.0);
        if budget.is_empty() {
            errors.insert("budget", "Indica el presupuesto estimado.");
        } else if parsed_budget.is_none() {
            errors.insert("budget", "El presupuesto debe ser un número mayor a cero.");
        }

        let event_date = NaiveDate::parse_from_str(self.event_date.trim(), "%Y-%m-%d").ok();
        if event_date.is_none() {
            errors.insert("event_date", "Selecciona una fecha tentativa.");
        }

        let message = self.message.trim();
        if message.is_empty() {
            errors.insert("message", "Cuéntanos más detalles del evento.");
        }

        match (event_type, parsed_budget, event_date) {
            (Some(event_type), Some(budget), Some(event_date)) if errors.is_empty() => {
                Ok(BookingRequest {
                    name: name.to_string(),
                    email: email.to_string(),
                    event_type,
                    budget,
                    event_date,
                    message: message.to_string(),
                })
            }
            _ => Err(errors),
        }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Record an accepted booking request
pub fn submit(request: &BookingRequest) {
    tracing::info!(
        name = %request.name,
        email = %request.email,
        event_type = request.event_type.value(),
        budget = request.budget,
        event_date = %request.event_date,
        "Booking request received"
    );
}
