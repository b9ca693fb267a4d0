use serde::Serialize;

const EMPTY_BUFFER: &str = "0";

/// Numpad display buffer. Never persisted; reset after every submit or clear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PendingInput(String);

impl Default for PendingInput {
    fn default() -> Self {
        Self(EMPTY_BUFFER.to_string())
    }
}

impl PendingInput {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Appends a digit or decimal point. A lone leading "0" is overwritten
    /// rather than extended. Returns false when the key was ignored.
    pub fn push(&mut self, key: char) -> bool {
        let accepted = key.is_ascii_digit() || (key == '.' && !self.0.contains('.'));
        if !accepted {
            return false;
        }

        if self.0 == EMPTY_BUFFER {
            self.0.clear();
        }
        self.0.push(key);
        true
    }

    pub fn backspace(&mut self) {
        if self.0.chars().count() <= 1 {
            self.clear();
        } else {
            self.0.pop();
        }
    }

    pub fn clear(&mut self) {
        self.0 = EMPTY_BUFFER.to_string();
    }

    /// The buffer as a measurement, or `None` when it is not a finite number.
    pub fn parse(&self) -> Option<f64> {
        self.0.parse::<f64>().ok().filter(|value| value.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(keys: &str) -> PendingInput {
        let mut input = PendingInput::default();
        for key in keys.chars() {
            input.push(key);
        }
        input
    }

    #[test]
    fn leading_zero_is_overwritten() {
        assert_eq!(typed("5").as_str(), "5");
        assert_eq!(typed("05").as_str(), "5");
        assert_eq!(typed("0").as_str(), "0");
        assert_eq!(typed("12.5").as_str(), "12.5");
    }

    #[test]
    fn decimal_point_on_empty_buffer_replaces_zero() {
        let input = typed(".");
        assert_eq!(input.as_str(), ".");
        assert_eq!(input.parse(), None);
    }

    #[test]
    fn second_decimal_point_is_ignored() {
        let mut input = typed("1.2");
        assert!(!input.push('.'));
        assert_eq!(input.as_str(), "1.2");
    }

    #[test]
    fn non_numeric_keys_are_ignored() {
        let mut input = typed("7");
        assert!(!input.push('x'));
        assert!(!input.push('-'));
        assert_eq!(input.as_str(), "7");
    }

    #[test]
    fn backspace_falls_back_to_zero() {
        let mut input = typed("42");
        input.backspace();
        assert_eq!(input.as_str(), "4");
        input.backspace();
        assert_eq!(input.as_str(), "0");
        input.backspace();
        assert_eq!(input.as_str(), "0");
    }

    #[test]
    fn clear_resets_buffer() {
        let mut input = typed("99.1");
        input.clear();
        assert_eq!(input, PendingInput::default());
    }

    #[test]
    fn parse_reads_decimal_values() {
        assert_eq!(typed("12.75").parse(), Some(12.75));
        assert_eq!(typed("3.").parse(), Some(3.0));
        assert_eq!(PendingInput::default().parse(), Some(0.0));
    }
}
