//! Telemetry condition parsing
//!
//! Log messages carry trailing `Key: value` lists such as
//! `PackTemp: h 21C, l 20C, PackSOC: 91%, Vpack:113.044V`. This module turns
//! that text into an ordered map and renders stored values for tabular output.

use crate::types::Conditions;
use regex::Regex;
use std::sync::LazyLock;

/// A `key:` marker, one or two words, swallowing the separating comma before it
static KEY_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r",?\s*([A-Za-z]+\s*[A-Za-z]*):\s*").expect("valid key marker regex")
});

static VALUE_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*").expect("valid value separator regex"));

static UNIT_SUFFIXED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d*\.?\d+[VAC]$").expect("valid unit regex"));

static MILLIVOLTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d*\.?\d+mV$").expect("valid millivolt regex"));

struct KeyMarker<'a> {
    key: &'a str,
    start: usize,
    end: usize,
}

/// Parse a conditions field into an ordered label -> value map
///
/// Values holding a comma-separated list of `subkey value` pieces are stored
/// under composite `"<key> (<subkey>)"` labels. A piece without a space stores
/// the whole unsplit value under the plain key, replacing whatever was there.
///
/// # Example
/// ```
/// use zero_log_decoder::conditions::conditions_to_map;
///
/// let conditions = conditions_to_map("PackTemp: h 21C, l 20C, PackSOC: 91%");
/// assert_eq!(conditions["PackTemp (h)"], "21C");
/// assert_eq!(conditions["PackSOC"], "91%");
/// ```
pub fn conditions_to_map(text: &str) -> Conditions {
    let mut result = Conditions::new();

    let markers: Vec<KeyMarker<'_>> = KEY_MARKER
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let key = caps.get(1)?;
            Some(KeyMarker {
                key: key.as_str().trim(),
                start: whole.start(),
                end: whole.end(),
            })
        })
        .collect();

    for pair in markers.windows(2) {
        let (current, next) = (&pair[0], &pair[1]);
        let value = text[current.end..next.start].trim();
        if value.contains(',') {
            for piece in VALUE_SEPARATOR.split(value) {
                match piece.trim().split_once(char::is_whitespace) {
                    Some((subkey, sub_value)) => {
                        result.insert(
                            format!("{} ({})", current.key, subkey),
                            sub_value.trim().to_string(),
                        );
                    }
                    None => {
                        result.insert(current.key.to_string(), value.to_string());
                    }
                }
            }
        } else {
            result.insert(current.key.to_string(), value.to_string());
        }
    }

    if let Some(last) = markers.last() {
        result.insert(last.key.to_string(), text[last.end..].trim().to_string());
    }

    result
}

/// Render a stored condition value for CSV/TSV output
///
/// With `omit_units`, `12.5V`/`3A`/`21C` lose their unit letter and
/// millivolt readings are converted to volts.
pub fn tabular_value(value: &str, omit_units: bool) -> String {
    if !omit_units {
        return value.to_string();
    }
    if UNIT_SUFFIXED.is_match(value) {
        return value[..value.len() - 1].to_string();
    }
    if MILLIVOLTS.is_match(value) {
        if let Ok(millivolts) = value[..value.len() - 2].parse::<f64>() {
            return (millivolts / 1000.0).to_string();
        }
    }
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn map(pairs: &[(&str, &str)]) -> Conditions {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_sub_keyed_values() {
        let conditions = conditions_to_map("PackTemp: h 21C, l 20C, PackSOC: 91%, Vpack:113.044V");
        assert_eq!(
            conditions,
            map(&[
                ("PackTemp (h)", "21C"),
                ("PackTemp (l)", "20C"),
                ("PackSOC", "91%"),
                ("Vpack", "113.044V"),
            ])
        );
    }

    #[test]
    fn test_full_riding_conditions() {
        let conditions = conditions_to_map(
            "PackTemp: h 21C, l 20C, PackSOC: 91%, Vpack:113.044V, MotAmps:   0, BattAmps:   2, \
             Mods: 11,  MotTemp:  26C, CtrlTemp:  19C, AmbTemp:  20C, MotRPM:   0, Odo:48809km",
        );
        assert_eq!(
            conditions,
            map(&[
                ("PackTemp (h)", "21C"),
                ("PackTemp (l)", "20C"),
                ("PackSOC", "91%"),
                ("Vpack", "113.044V"),
                ("MotAmps", "0"),
                ("BattAmps", "2"),
                ("Mods", "11"),
                ("MotTemp", "26C"),
                ("CtrlTemp", "19C"),
                ("AmbTemp", "20C"),
                ("MotRPM", "0"),
                ("Odo", "48809km"),
            ])
        );
    }

    #[test]
    fn test_plain_values() {
        let conditions = conditions_to_map("Bmvolts: 92062, Cmvolts: 118937, Amps: 0, RPM: 0");
        assert_eq!(
            conditions,
            map(&[
                ("Bmvolts", "92062"),
                ("Cmvolts", "118937"),
                ("Amps", "0"),
                ("RPM", "0"),
            ])
        );
    }

    #[test]
    fn test_two_word_key() {
        let conditions = conditions_to_map("Allowed diff: 750mV, State: 2");
        assert_eq!(conditions["Allowed diff"], "750mV");
        assert_eq!(conditions["State"], "2");
    }

    #[test]
    fn test_unsplit_piece_overwrites_with_raw_value() {
        let conditions = conditions_to_map("Temps: h 21C, 20C, Next: 1");
        assert_eq!(conditions["Temps (h)"], "21C");
        assert_eq!(conditions["Temps"], "h 21C, 20C");
    }

    #[test]
    fn test_last_value_stored_unconditionally() {
        let conditions = conditions_to_map("Flags: a, b");
        assert_eq!(conditions, map(&[("Flags", "a, b")]));
    }

    #[test]
    fn test_no_markers() {
        assert!(conditions_to_map("").is_empty());
        assert!(conditions_to_map("nothing to see").is_empty());
    }

    #[test]
    fn test_tabular_value_units() {
        assert_eq!(tabular_value("113.044V", true), "113.044");
        assert_eq!(tabular_value("2A", true), "2");
        assert_eq!(tabular_value("21C", true), "21");
        assert_eq!(tabular_value("3383mV", true), "3.383");
        assert_eq!(tabular_value("91%", true), "91%");
        assert_eq!(tabular_value("48809km", true), "48809km");
        assert_eq!(tabular_value("3383mV", false), "3383mV");
    }
}
