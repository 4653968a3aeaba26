use super::Field;

/// Maximum digits kept by [`format_phone`]
const PHONE_DIGITS: usize = 10;

/// Re-format phone input as it is typed: digits only, hyphens after the third
/// and sixth digit. `"5551234567"` becomes `"555-123-4567"`, partial input
/// stays partial (`"555"`, `"555-123"`).
pub fn format_phone(input: &str) -> String {
    let digits: Vec<char> = input
        .chars()
        .filter(char::is_ascii_digit)
        .take(PHONE_DIGITS)
        .collect();

    let mut out = String::with_capacity(PHONE_DIGITS + 2);
    for (i, digit) in digits.into_iter().enumerate() {
        if i == 3 || i == 6 {
            out.push('-');
        }
        out.push(digit);
    }
    out
}

/// Upper-case state input, keeping at most two characters
pub fn normalize_state(input: &str) -> String {
    input.trim().chars().take(2).collect::<String>().to_uppercase()
}

/// Apply the per-field input normalization used on entry
pub fn normalize_input(field: Field, value: &str) -> String {
    match field {
        Field::PhoneNumber => format_phone(value),
        Field::State => normalize_state(value),
        _ => value.to_string(),
    }
}
