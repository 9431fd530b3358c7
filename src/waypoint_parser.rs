//! Text form of waypoint records: `<id>,<v1>,<v2>,...`

use std::fmt;
use crate::math_tools::is_number;

pub const DEFAULT_DELIMITER: char = ',';

#[derive(Debug, Clone, PartialEq)]
pub enum WaypointError {
    /// The identifier is missing or is itself a number.
    InvalidId(String),
    /// A value field is not a finite decimal number.
    InvalidNumber(String),
    /// The record does not carry the expected number of values.
    WrongSize { expected: usize, found: usize },
}

impl fmt::Display for WaypointError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            WaypointError::InvalidId(id) =>
                write!(f, "Invalid ID: '{}' should not only be a number", id),
            WaypointError::InvalidNumber(token) =>
                write!(f, "Invalid argument: '{}' should be a number", token),
            WaypointError::WrongSize { expected, found } =>
                write!(f, "Waypoint should have {} values instead of {}", expected, found),
        }
    }
}

impl std::error::Error for WaypointError {}

/// Identifier and numeric payload of a waypoint record.
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoint {
    pub id: String,
    pub values: Vec<f64>,
}

impl Waypoint {
    pub fn check_size(&self, expected: usize) -> Result<(), WaypointError> {
        if self.values.len() != expected {
            return Err(WaypointError::WrongSize { expected, found: self.values.len() });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WaypointParser {
    delimiter: char,
}

impl Default for WaypointParser {
    fn default() -> Self {
        WaypointParser { delimiter: DEFAULT_DELIMITER }
    }
}

impl WaypointParser {
    pub fn new(delimiter: char) -> Self {
        WaypointParser { delimiter }
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Split the record on the delimiter and parse it. Surrounding whitespace of fields is ignored.
    pub fn unpack_waypoint(&self, text: &str) -> Result<Waypoint, WaypointError> {
        let fields: Vec<&str> = text.trim().split(self.delimiter).collect();
        self.parse_fields(&fields)
    }

    /// Parse already separated fields: the first is the identifier, the rest are numbers.
    pub fn parse_fields<S: AsRef<str>>(&self, fields: &[S]) -> Result<Waypoint, WaypointError> {
        let (id, rest) = fields.split_first()
            .ok_or_else(|| WaypointError::InvalidId(String::new()))?;
        let id = id.as_ref().trim();
        if id.is_empty() || is_number(id) {
            return Err(WaypointError::InvalidId(id.to_string()));
        }
        let values = rest.iter()
            .map(|token| {
                let token = token.as_ref().trim();
                token.parse::<f64>().ok()
                    .filter(|value| value.is_finite())
                    .ok_or_else(|| WaypointError::InvalidNumber(token.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Waypoint { id: id.to_string(), values })
    }

    /// Format the record so that `unpack_waypoint` reads it back.
    pub fn pack_waypoint(&self, id: &str, values: &[f64]) -> Result<String, WaypointError> {
        if id.trim().is_empty() || is_number(id) || id.contains(self.delimiter) {
            return Err(WaypointError::InvalidId(id.to_string()));
        }
        let mut text = id.to_string();
        for value in values {
            text.push(self.delimiter);
            text.push_str(&value.to_string());
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unpack() {
        let parser = WaypointParser::default();
        let waypoint = parser.unpack_waypoint("wp_12, 0.5,-1,2e-1 ,3,4,5,6").unwrap();
        assert_eq!(waypoint.id, "wp_12");
        assert_eq!(waypoint.values, vec![0.5, -1.0, 0.2, 3.0, 4.0, 5.0, 6.0]);
        assert!(waypoint.check_size(7).is_ok());
    }

    #[test]
    fn test_numeric_id_rejected() {
        let parser = WaypointParser::default();
        assert_eq!(parser.unpack_waypoint("12,1,2,3"),
                   Err(WaypointError::InvalidId("12".to_string())));
        assert!(matches!(parser.unpack_waypoint(""), Err(WaypointError::InvalidId(_))));
    }

    #[test]
    fn test_bad_number_rejected() {
        let parser = WaypointParser::default();
        assert_eq!(parser.unpack_waypoint("wp,1,x,3"),
                   Err(WaypointError::InvalidNumber("x".to_string())));
        assert_eq!(parser.unpack_waypoint("wp,1,,3"),
                   Err(WaypointError::InvalidNumber(String::new())));
        for token in ["nan", "inf", "-infinity", "1e400"] {
            assert_eq!(parser.unpack_waypoint(&format!("wp,{},0,0", token)),
                       Err(WaypointError::InvalidNumber(token.to_string())));
        }
    }

    #[test]
    fn test_short_record_size() {
        let waypoint = WaypointParser::default().unpack_waypoint("id1,1.0,2.0,3.0").unwrap();
        assert_eq!(waypoint.check_size(7), Err(WaypointError::WrongSize { expected: 7, found: 3 }));
    }

    #[test]
    fn test_pack_reads_back() {
        let parser = WaypointParser::new(';');
        let text = parser.pack_waypoint("crack_3", &[0.25, -1.5, 3.0]).unwrap();
        assert_eq!(text, "crack_3;0.25;-1.5;3");
        let waypoint = parser.unpack_waypoint(&text).unwrap();
        assert_eq!(waypoint.values, vec![0.25, -1.5, 3.0]);
        assert!(parser.pack_waypoint("7", &[]).is_err());
        assert!(parser.pack_waypoint("a;b", &[]).is_err());
    }

    #[test]
    fn test_parse_fields() {
        let parser = WaypointParser::default();
        let waypoint = parser.parse_fields(&["roi", "1", "2"]).unwrap();
        assert_eq!(waypoint.values, vec![1.0, 2.0]);
        assert!(parser.parse_fields::<&str>(&[]).is_err());
    }
}
