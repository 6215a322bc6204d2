//! VIN decoding
//!
//! Maps a 17-character Zero Motorcycles VIN onto the static code tables for
//! model year, model line, motor and model. A code missing from its table is
//! a hard error: the VIN is malformed or an unrecognized variant.

use crate::types::{DecoderError, Result};
use serde::{Deserialize, Serialize};

/// Length of every VIN
pub const VIN_LENGTH: usize = 17;

const YEARS_BY_CODE: &[(char, u16)] = &[
    ('9', 2009),
    ('A', 2010),
    ('B', 2011),
    ('C', 2012),
    ('D', 2013),
    ('E', 2014),
    ('F', 2015),
    ('G', 2016),
    ('H', 2017),
    ('J', 2018),
    ('K', 2019),
    ('L', 2020),
    ('M', 2021),
    ('N', 2022),
    ('P', 2023),
    ('R', 2024),
    ('S', 2025),
];

const MOTORS_BY_CODE: &[(&str, &str)] = &[
    ("M3", "9.1kW"),
    ("ZA", "11kW 75-5"),
    ("ZB", "11kW 75-7"),
    ("Z1", "13kW"),
    ("Z2", "16kW 75-7"),
    ("Z3", "16kW 75-7R"),
    ("Z4", "17kW 75-5"),
    ("Z5", "21kW 75-7"),
    ("Z6", "21kW 75-7R"),
    ("Z7", "40kW 75-10R"),
];

const MODEL_LINES_BY_CODE: &[(&str, &str)] = &[
    ("M2", "S"),
    ("M3", "S"),
    ("M4", "S/SR/SP 8.5"),
    ("M5", "S/SR/SP 11.4"),
    ("M7", "S/SR/SP 9.4"),
    ("M8", "S/SR/SP 12.5"),
    ("M9", "S/SR/SP 13.0"),
    ("M0", "S/SR/SP 9.8"),
    ("MB", "S/SP 6.5"),
    ("MC", "S/SR/SP/SRP 13.0"),
    ("MD", "S 13.0 (11kW)"),
    ("ME", "S 7.2 (11kW)"),
    ("MF", "S/SR 14.4"),
    ("MG", "S 14.4 (11kW)"),
    ("MH", "S 7.2 (11kW)"),
    ("MK", "S 14.4 (11kW)"),
    ("D2", "DS"),
    ("D3", "DS"),
    ("D4", "DS"),
    ("D5", "DS/DSR/DSP 11.4"),
    ("D6", "DS/DSR/DSP 8.5"),
    ("D7", "DS/DSR/DSP 9.4"),
    ("D8", "DS/DSR/DSP 12.5"),
    ("D9", "DS/DSR/DSP 13.0"),
    ("D0", "DS/DSR/DSP 9.8"),
    ("DA", "DS 6.5"),
    ("DB", "DS/DSR/DSP/DSRP 13.0"),
    ("DC", "DS 7.2 (11kW)"),
    ("DD", "DS/DSR 14.4"),
    ("DE", "DS 14.4 (11kW)"),
    ("DF", "DS 7.2 (11kW)"),
    ("DH", "DS 14.4 (11kW)"),
    ("X2", "MX"),
    ("X3", "FX"),
    ("X4", "FX/FXL"),
    ("X5", "FXP/FXLP"),
    ("X6", "FX/FXS"),
    ("X7", "FXP"),
    ("X8", "FX/FXS"),
    ("X9", "FXP"),
    ("XB", "FX/FXS/FXP"),
    ("XC", "FX/FXS/FXP"),
    ("C2", "XU-LSM (CA)"),
    ("L2", "XU-M (EU)"),
    ("U1", "XU"),
    ("U2", "XU"),
    ("U3", "XU"),
    ("FA", "SRF"),
];

const MODELS_BY_CODE: &[(char, &str)] = &[
    ('A', "S"),
    ('B', "DS"),
    ('C', "FX"),
    ('E', "XU"),
    ('G', "SR/DSR"),
    ('H', "FXP"),
    ('J', "FXS"),
    ('K', "SRF"),
];

/// Motor rating decoded from the VIN
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotorDescriptor {
    /// Rated power, e.g. "16kW"
    pub power: String,
    /// Motor frame size, e.g. "75-7R"
    pub size: Option<String>,
}

/// Vehicle attributes decoded from a VIN
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VinDescriptor {
    pub manufacturer: Option<String>,
    pub plant_location: Option<String>,
    pub year: u16,
    pub platform: Option<String>,
    pub model: String,
    pub motor: MotorDescriptor,
    pub pack_capacity: Option<String>,
}

impl VinDescriptor {
    /// Flatten into ordered key/value pairs, the motor as `MOTOR_POWER`/`MOTOR_SIZE`
    pub fn flatten(&self) -> Vec<(String, Option<String>)> {
        vec![
            ("manufacturer".to_string(), self.manufacturer.clone()),
            ("plant_location".to_string(), self.plant_location.clone()),
            ("year".to_string(), Some(self.year.to_string())),
            ("platform".to_string(), self.platform.clone()),
            ("model".to_string(), Some(self.model.clone())),
            ("MOTOR_POWER".to_string(), Some(self.motor.power.clone())),
            ("MOTOR_SIZE".to_string(), self.motor.size.clone()),
            ("pack_capacity".to_string(), self.pack_capacity.clone()),
        ]
    }

    /// Human readable `Label:\tvalue` lines
    pub fn to_text(&self) -> String {
        self.flatten()
            .into_iter()
            .map(|(key, value)| {
                format!(
                    "{}:\t{}",
                    human_label(&key),
                    value.as_deref().unwrap_or("None")
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// `plant_location` -> `Plant Location`, `MOTOR_POWER` -> `Motor Power`
fn human_label(key: &str) -> String {
    key.split('_')
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn lookup<K: PartialEq + Copy, V: Copy>(table: &[(K, V)], key: K) -> Option<V> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Decode a VIN into its vehicle attributes
///
/// # Example
/// ```
/// use zero_log_decoder::vin::decode_vin;
///
/// let descriptor = decode_vin("538SD9Z37GCG06073").unwrap();
/// assert_eq!(descriptor.year, 2016);
/// assert_eq!(descriptor.model, "DSR");
/// ```
pub fn decode_vin(vin: &str) -> Result<VinDescriptor> {
    if !vin.is_ascii() || vin.len() != VIN_LENGTH {
        return Err(DecoderError::InvalidVin {
            vin: vin.to_string(),
            reason: format!("expected {} ASCII characters", VIN_LENGTH),
        });
    }
    let chars: Vec<char> = vin.chars().collect();

    let model_year = lookup(YEARS_BY_CODE, chars[9]).ok_or_else(|| DecoderError::VinLookup {
        segment: "model year",
        code: chars[9].to_string(),
    })?;

    let platform = match chars[3] {
        'X' if model_year > 2012 => Some("XMX".to_string()),
        'S' if model_year > 2012 => Some("SDS".to_string()),
        code @ ('X' | 'S') => Some(code.to_string()),
        'Z' => Some("FST".to_string()),
        _ => None,
    };

    let line_code = &vin[4..6];
    let model_line = lookup(MODEL_LINES_BY_CODE, line_code).ok_or_else(|| {
        DecoderError::VinLookup {
            segment: "model line",
            code: line_code.to_string(),
        }
    })?;
    let mut line_parts = model_line.split(' ');
    let model_from_line = line_parts.next().unwrap_or_default();
    let pack_capacity = line_parts.next().map(str::to_string);
    let line_power = line_parts.next();

    let motor_code = &vin[6..8];
    let motor = lookup(MOTORS_BY_CODE, motor_code).ok_or_else(|| DecoderError::VinLookup {
        segment: "motor",
        code: motor_code.to_string(),
    })?;
    let mut motor_parts = motor.splitn(2, ' ');
    let motor_power = match motor_parts.next() {
        Some(power) if !power.is_empty() => power.to_string(),
        _ => line_power.unwrap_or_default().to_string(),
    };
    let motor_size = motor_parts.next().map(str::to_string);

    let model_code = chars[11];
    let model = lookup(MODELS_BY_CODE, model_code).ok_or_else(|| DecoderError::VinLookup {
        segment: "model",
        code: model_code.to_string(),
    })?;
    let model = resolve_model(model, model_year, model_from_line, motor_size.as_deref());

    Ok(VinDescriptor {
        manufacturer: (&vin[..3] == "538").then(|| "Zero Motorcycles".to_string()),
        plant_location: (chars[10] == 'C').then(|| "Santa Cruz, CA".to_string()),
        year: model_year,
        platform,
        model,
        motor: MotorDescriptor {
            power: motor_power,
            size: motor_size,
        },
        pack_capacity,
    })
}

/// Pick one model out of an ambiguous `/`-separated model code
fn resolve_model(model: &str, year: u16, model_from_line: &str, motor_size: Option<&str>) -> String {
    if !model.contains('/') {
        return model.to_string();
    }
    let mut resolved = model;
    if resolved == "SR/DSR" {
        resolved = if 2013 < year && year < 2016 {
            "SR"
        } else if model_from_line.contains("DS") {
            "DSR"
        } else {
            "SR"
        };
    }
    if let Some(size) = motor_size {
        let high_output = size == "75-7R";
        if resolved.contains("DS/DSR") {
            resolved = if high_output { "DSR" } else { "DS" };
        } else if resolved.contains("S/SR") {
            resolved = if high_output { "SR" } else { "S" };
        }
    }
    resolved.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_known_vin() {
        let descriptor = decode_vin("538SD9Z37GCG06073").unwrap();
        assert_eq!(descriptor.year, 2016);
        assert_eq!(descriptor.platform.as_deref(), Some("SDS"));
        assert_eq!(descriptor.model, "DSR");
        assert_eq!(descriptor.motor.power, "16kW");
        assert_eq!(descriptor.motor.size.as_deref(), Some("75-7R"));
        assert_eq!(descriptor.pack_capacity.as_deref(), Some("13.0"));
        assert_eq!(descriptor.manufacturer.as_deref(), Some("Zero Motorcycles"));
        assert_eq!(descriptor.plant_location.as_deref(), Some("Santa Cruz, CA"));
    }

    #[test]
    fn test_sr_dsr_resolution_by_year() {
        // 2014: SR/DSR resolves to SR even with a DS model line
        let descriptor = decode_vin("538SD9Z37ECG06073").unwrap();
        assert_eq!(descriptor.year, 2014);
        assert_eq!(descriptor.model, "SR");
    }

    #[test]
    fn test_motor_without_size() {
        let descriptor = decode_vin("538SMDM37HCG06073").unwrap();
        assert_eq!(descriptor.model, "SR");
        assert_eq!(descriptor.motor.power, "9.1kW");
        assert_eq!(descriptor.motor.size, None);
        assert_eq!(descriptor.pack_capacity.as_deref(), Some("13.0"));
    }

    #[test]
    fn test_platform_rules() {
        assert_eq!(decode_vin("538XX2Z37CCC06073").unwrap().platform.as_deref(), Some("X"));
        assert_eq!(decode_vin("538XX2Z37DCC06073").unwrap().platform.as_deref(), Some("XMX"));
        assert_eq!(decode_vin("538ZFAZ37KCK06073").unwrap().platform.as_deref(), Some("FST"));
        assert_eq!(decode_vin("538QFAZ37KCK06073").unwrap().platform, None);
    }

    #[test]
    fn test_non_zero_manufacturer_and_plant() {
        let descriptor = decode_vin("123SD9Z37GXG06073").unwrap();
        assert_eq!(descriptor.manufacturer, None);
        assert_eq!(descriptor.plant_location, None);
    }

    #[test]
    fn test_lookup_miss_is_an_error() {
        let err = decode_vin("538SD9Z37ICG06073").unwrap_err();
        assert!(matches!(err, DecoderError::VinLookup { segment: "model year", .. }));

        let err = decode_vin("538SQQZ37GCG06073").unwrap_err();
        assert!(matches!(err, DecoderError::VinLookup { segment: "model line", .. }));

        let err = decode_vin("538SD9Z37GCZ06073").unwrap_err();
        assert!(matches!(err, DecoderError::VinLookup { segment: "model", .. }));
    }

    #[test]
    fn test_wrong_length_is_an_error() {
        assert!(matches!(
            decode_vin("538SD9Z37GC").unwrap_err(),
            DecoderError::InvalidVin { .. }
        ));
    }

    #[test]
    fn test_total_over_code_tables() {
        for (year_code, _) in YEARS_BY_CODE {
            for (line_code, _) in MODEL_LINES_BY_CODE {
                for (motor_code, _) in MOTORS_BY_CODE {
                    for (model_code, _) in MODELS_BY_CODE {
                        let vin = format!(
                            "538S{}{}3{}C{}06073",
                            line_code, motor_code, year_code, model_code
                        );
                        assert!(decode_vin(&vin).is_ok(), "failed on {}", vin);
                    }
                }
            }
        }
    }

    #[test]
    fn test_flatten_and_text() {
        let descriptor = decode_vin("538SD9Z37GCG06073").unwrap();
        let flat = descriptor.flatten();
        assert!(flat.contains(&("MOTOR_POWER".to_string(), Some("16kW".to_string()))));
        assert!(flat.contains(&("MOTOR_SIZE".to_string(), Some("75-7R".to_string()))));
        let text = descriptor.to_text();
        assert!(text.contains("Plant Location:\tSanta Cruz, CA"));
        assert!(text.contains("Motor Power:\t16kW"));
    }
}
