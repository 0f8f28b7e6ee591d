//! Optimal balance recommendation, value formatting and the sticky autofill rule.

use tailor_kernel_math::round2;

/// Bust circumference above which the recommendation stops growing.
const BALANCE_BUST_CLAMP: f64 = 150.0;

/// Recommended front/back length balance for a bust circumference in cm.
///
/// Returns `None` for NaN input.
pub fn recommended_optimal_balance(bust: f64) -> Option<f64> {
    if bust.is_nan() {
        return None;
    }
    let bust = bust.min(BALANCE_BUST_CLAMP);
    if bust <= 89.0 {
        return Some(3.5);
    }
    if bust <= 99.0 {
        return Some(4.0);
    }
    let k = if bust <= 109.0 {
        4.5
    } else if bust <= 119.0 {
        5.0
    } else if bust <= 129.0 {
        5.5
    } else {
        6.0
    };
    Some((bust - 100.0) / 10.0 + k)
}

/// Format a value the way form fields show it: two fixed decimals.
pub fn format_value(value: f64) -> String {
    format!("{:.2}", round2(value))
}

/// Normalize an ease-range note.
///
/// Dash variants become `-`, dashes get one space on each side, runs of
/// whitespace collapse, and a `cm` suffix after whitespace is lowercased.
pub fn normalize_note(note: &str) -> String {
    let dashed: String = note
        .chars()
        .map(|c| match c {
            '\u{2012}'..='\u{2015}' | '\u{2212}' => '-',
            c => c,
        })
        .collect();
    let spaced = dashed.split('-').map(str::trim).collect::<Vec<_>>().join(" - ");

    let mut out = String::with_capacity(spaced.len());
    for (i, token) in spaced.split_whitespace().enumerate() {
        if i > 0 {
            out.push(' ');
            if let Some(head) = token.get(..2) {
                if head.eq_ignore_ascii_case("cm") {
                    out.push_str("cm");
                    out.push_str(&token[2..]);
                    continue;
                }
            }
        }
        out.push_str(token);
    }
    out
}

/// Auto-fills a user-editable field until the user diverges from it.
///
/// A refresh writes the recommendation when the field is empty, still
/// shows the previous recommendation, or no recommendation was made yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StickyAutofill {
    last: Option<String>,
}

impl StickyAutofill {
    /// Create an autofill with no previous recommendation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last recommended text, if any.
    pub fn last(&self) -> Option<&str> {
        self.last.as_deref()
    }

    /// Apply `recommended` to `field`. Returns whether the field changed.
    pub fn refresh(&mut self, field: &mut String, recommended: Option<f64>) -> bool {
        let Some(value) = recommended else {
            self.last = None;
            return false;
        };
        let text = format_value(value);
        let current = field.trim();
        let overwrite = current.is_empty()
            || self.last.is_none()
            || self.last.as_deref() == Some(current);
        let changed = overwrite && *field != text;
        if overwrite {
            *field = text.clone();
        }
        self.last = Some(text);
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_recommended_balance_table() {
        assert_eq!(recommended_optimal_balance(70.0), Some(3.5));
        assert_eq!(recommended_optimal_balance(88.0), Some(3.5));
        assert_eq!(recommended_optimal_balance(89.0), Some(3.5));
        assert_eq!(recommended_optimal_balance(95.0), Some(4.0));
        assert_relative_eq!(recommended_optimal_balance(104.0).unwrap(), 4.9);
        assert_relative_eq!(recommended_optimal_balance(110.0).unwrap(), 6.0);
        assert_relative_eq!(recommended_optimal_balance(125.0).unwrap(), 8.0);
        assert_relative_eq!(recommended_optimal_balance(140.0).unwrap(), 10.0);
        assert_relative_eq!(recommended_optimal_balance(150.0).unwrap(), 11.0);
        assert_relative_eq!(recommended_optimal_balance(180.0).unwrap(), 11.0);
        assert_eq!(recommended_optimal_balance(f64::NAN), None);
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(3.5), "3.50");
        assert_eq!(format_value(4.0), "4.00");
        assert_eq!(format_value(1.005 + 1e-9), "1.01");
        assert_eq!(format_value(-0.25), "-0.25");
    }

    #[test]
    fn test_normalize_note() {
        assert_eq!(normalize_note("0\u{2013}0.5 cm"), "0 - 0.5 cm");
        assert_eq!(normalize_note("  4   -  6   CM "), "4 - 6 cm");
        assert_eq!(normalize_note("- / +"), "- / +");
        assert_eq!(normalize_note("1cm - 1.5cm"), "1cm - 1.5cm");
        assert_eq!(normalize_note(""), "");
    }

    #[test]
    fn test_sticky_autofill_mirrors_untouched_field() {
        let mut sticky = StickyAutofill::new();
        let mut field = String::from("3.5");
        assert!(sticky.refresh(&mut field, recommended_optimal_balance(88.0)));
        assert_eq!(field, "3.50");
        assert!(sticky.refresh(&mut field, recommended_optimal_balance(95.0)));
        assert_eq!(field, "4.00");
        assert_eq!(sticky.last(), Some("4.00"));
    }

    #[test]
    fn test_sticky_autofill_keeps_user_value() {
        let mut sticky = StickyAutofill::new();
        let mut field = String::new();
        sticky.refresh(&mut field, Some(3.5));
        field = String::from("5");
        assert!(!sticky.refresh(&mut field, Some(4.0)));
        assert!(!sticky.refresh(&mut field, Some(4.9)));
        assert_eq!(field, "5");

        // Clearing the field re-enables autofill.
        field.clear();
        assert!(sticky.refresh(&mut field, Some(4.9)));
        assert_eq!(field, "4.90");
    }

    #[test]
    fn test_sticky_autofill_without_recommendation() {
        let mut sticky = StickyAutofill::new();
        let mut field = String::from("7");
        sticky.refresh(&mut field, None);
        assert_eq!(sticky.last(), None);
        assert_eq!(field, "7");
        // No previous recommendation: the next one overwrites.
        assert!(sticky.refresh(&mut field, Some(3.5)));
        assert_eq!(field, "3.50");
    }
}
