//! Message Decoding Engine
//!
//! Turns the free-text message column of a log line into its level, event
//! type, component, event text and telemetry conditions. Decoding runs as an
//! ordered pipeline of stages; every stage is allowed not to match.

use crate::conditions::conditions_to_map;
use crate::types::{Component, Conditions, EventType, LogLevel};
use regex::Regex;
use std::sync::LazyLock;

/// Level prefixes, more specific prefixes first
const LEVEL_PREFIXES: &[(&str, LogLevel)] = &[
    ("- DEBUG:", LogLevel::Debug),
    ("WARNING:", LogLevel::Warning),
    ("ERROR:", LogLevel::Error),
    ("DEBUG:", LogLevel::Debug),
    ("INFO:", LogLevel::Info),
];

const TYPE_PREFIXES: &[(&str, EventType)] = &[
    ("0x", EventType::Unknown),
    ("Riding", EventType::Riding),
    ("Charging", EventType::Charging),
    ("Enabling", EventType::Enabling),
    ("Disabling", EventType::Disabling),
];

const TYPE_SUFFIXES: &[(&str, EventType)] = &[
    (" Connected", EventType::Connected),
    (" Link Up", EventType::Connected),
    (" Disconnected", EventType::Disconnected),
    (" Link Down", EventType::Disconnected),
    (" On", EventType::On),
    (" Off", EventType::Off),
];

/// Substring markers checked after the `Module ` prefix; first match wins
const COMPONENT_MARKERS: &[(&str, Component)] = &[
    ("Battery", Component::Battery),
    ("Sevcon", Component::Controller),
    ("DCDC", Component::DcDcConverter),
    ("Calex", Component::Charger),
    ("External Chg", Component::ExternalCharger),
    ("Charger 6", Component::ChargeTank),
];

/// Sub-fields packed positionally into a Charge Tank `SW` condition
const CHARGE_TANK_SW_FIELDS: &[&str] = &["SW", "EVSE Voltage", "EVSE Frequency", "EVSE Amps"];

const CURRENT_LIMITED: &str = "Batt Dischg Cur Limited";
const LOW_CHASSIS_ISOLATION: &str = "Low Chassis Isolation";

static TURNING_ON_OFF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Turning .*\b(ON|OFF)\b").expect("valid turning regex"));

static FIRST_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z]+:").expect("valid keyword regex"));

static CURRENT_LIMIT_VALUES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+) A \((\d+\.?\d+%)\)").expect("valid current limit regex")
});

static ISOLATION_VALUES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+ KOhms) to cell (\d+)").expect("valid isolation regex")
});

static MODULE_NOT_CONNECTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Module (\d+) not connected,?\s*(.*)$").expect("valid module regex")
});

static MODULE_CONTACTOR_CLOSED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Battery module (\d+) contactor closed").expect("valid contactor regex")
});

static MODULE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Module (\d{2})\b").expect("valid module number regex"));

/// Everything decoded from the message column of one log line
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DecodedMessage {
    pub level: Option<LogLevel>,
    pub event_type: Option<EventType>,
    pub component: Component,
    pub event: String,
    pub conditions: Conditions,
}

/// Message decoder - classifies and splits log message text
pub struct MessageDecoder;

impl MessageDecoder {
    /// Decode the message column of a log line
    ///
    /// # Example
    /// ```
    /// use zero_log_decoder::message_decoder::MessageDecoder;
    /// use zero_log_decoder::{Component, LogLevel};
    ///
    /// let decoded = MessageDecoder::decode_message("DEBUG: Sevcon Contactor Drive ON.");
    /// assert_eq!(decoded.level, Some(LogLevel::Debug));
    /// assert_eq!(decoded.component, Component::Controller);
    /// ```
    pub fn decode_message(message: &str) -> DecodedMessage {
        let (level, contents) = Self::decode_level(message.trim());

        let event_type = Self::decode_type(contents);
        let contents = if event_type == Some(EventType::Unknown) {
            ""
        } else {
            contents
        };

        let component = Self::decode_component(contents);

        let (event, conditions) = match FIRST_KEYWORD.find(contents) {
            Some(keyword) => {
                let conditions_field = contents[keyword.start()..].trim();
                (
                    contents[..keyword.start()].trim().to_string(),
                    conditions_to_map(conditions_field),
                )
            }
            None => (contents.to_string(), Conditions::new()),
        };

        let mut decoded = DecodedMessage {
            level,
            event_type,
            component,
            event,
            conditions,
        };
        Self::apply_special_cases(&mut decoded);
        decoded
    }

    /// Strip a known level prefix, returning the level and the remainder
    pub fn decode_level(message: &str) -> (Option<LogLevel>, &str) {
        for (prefix, level) in LEVEL_PREFIXES {
            if let Some(rest) = message.strip_prefix(prefix) {
                return (Some(*level), rest.trim());
            }
        }
        (None, message)
    }

    /// Classify the event type; later rules override earlier ones
    pub fn decode_type(message: &str) -> Option<EventType> {
        let mut event_type = TYPE_PREFIXES
            .iter()
            .find(|(prefix, _)| message.starts_with(prefix))
            .map(|(_, t)| *t);

        for (suffix, t) in TYPE_SUFFIXES {
            if message.ends_with(suffix) {
                event_type = Some(*t);
            }
        }
        if message.contains(" On ") {
            event_type = Some(EventType::On);
        }
        if message.contains(" Off ") {
            event_type = Some(EventType::Off);
        }

        if let Some(caps) = TURNING_ON_OFF.captures(message) {
            event_type = match &caps[1] {
                "ON" => Some(EventType::On),
                _ => Some(EventType::Off),
            };
        }

        let charging = message
            .match_indices("Charging")
            .any(|(idx, _)| !message[..idx].ends_with("from "));
        if charging {
            event_type = Some(EventType::Charging);
        }

        if message.contains("Limit") {
            event_type = Some(EventType::Limit);
        }

        event_type
    }

    /// Classify the subsystem that emitted the message
    pub fn decode_component(message: &str) -> Component {
        if message.starts_with("Module ") {
            return Component::Battery;
        }
        COMPONENT_MARKERS
            .iter()
            .find(|(marker, _)| message.contains(marker))
            .map(|(_, component)| *component)
            .unwrap_or_default()
    }

    /// Canonicalize known message shapes and lift their numbers into conditions
    fn apply_special_cases(decoded: &mut DecodedMessage) {
        if decoded.event.starts_with(CURRENT_LIMITED) {
            if let Some(caps) = CURRENT_LIMIT_VALUES.captures(&decoded.event) {
                let (amps, soc) = (caps[1].to_string(), caps[2].to_string());
                decoded.conditions.insert("BattAmps".to_string(), amps);
                decoded.conditions.insert("PackSOC".to_string(), soc);
                decoded.event = CURRENT_LIMITED.to_string();
            }
        }

        if decoded.event.starts_with(LOW_CHASSIS_ISOLATION) {
            if let Some(caps) = ISOLATION_VALUES.captures(&decoded.event) {
                let (impedance, cell) = (caps[1].to_string(), caps[2].to_string());
                decoded.conditions.insert("ImpedanceKOhms".to_string(), impedance);
                decoded.conditions.insert("Cell".to_string(), cell);
                decoded.event = LOW_CHASSIS_ISOLATION.to_string();
            }
        }

        if let Some(caps) = MODULE_NOT_CONNECTED.captures(&decoded.event) {
            let module = caps[1].to_string();
            let clauses = caps[2].to_string();
            decoded.conditions.insert("Module".to_string(), module);
            for clause in clauses.split(',') {
                let Some((label, value)) = clause.trim().rsplit_once(' ') else {
                    continue;
                };
                if value.starts_with(|c: char| c.is_ascii_digit()) {
                    decoded
                        .conditions
                        .insert(label.trim().to_string(), value.to_string());
                }
            }
            decoded.event = "Module not connected".to_string();
        }

        if let Some(caps) = MODULE_CONTACTOR_CLOSED.captures(&decoded.event) {
            let module = caps[1].to_string();
            decoded.conditions.insert("Module".to_string(), module);
            decoded.event = "Battery module contactor closed".to_string();
        }

        if let Some(caps) = MODULE_NUMBER.captures(&decoded.event) {
            let module = caps.get(1).map(|m| (m.as_str().to_string(), m.range()));
            if let Some((number, range)) = module {
                let rest = decoded.event[range.end..].to_string();
                decoded.conditions.insert("Module".to_string(), number);
                decoded.event = format!("Module{}", rest);
            }
        }

        if decoded.component == Component::ChargeTank {
            Self::split_charge_tank_switch(&mut decoded.conditions);
        }
    }

    /// Unpack `SW: 1 230V 50Hz 16A` into its positional sub-fields
    fn split_charge_tank_switch(conditions: &mut Conditions) {
        let parts: Vec<String> = match conditions.get("SW") {
            Some(sw) if sw.contains(char::is_whitespace) => {
                sw.split_whitespace().map(str::to_string).collect()
            }
            _ => return,
        };
        log::trace!("Splitting Charge Tank SW condition into {} fields", parts.len());
        for (label, value) in CHARGE_TANK_SW_FIELDS.iter().zip(parts) {
            conditions.insert(label.to_string(), value);
        }
    }
}
