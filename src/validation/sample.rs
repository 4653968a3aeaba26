use rand::seq::SliceRandom;
use rand::Rng;

use crate::contact::Contact;

const NAME_PAIRS: &[(&str, &str)] = &[
    ("John", "Smith"),
    ("Jane", "Doe"),
    ("Maria", "Garcia"),
    ("James", "Johnson"),
    ("Linda", "Williams"),
    ("Robert", "Brown"),
    ("Patricia", "Jones"),
    ("Michael", "Miller"),
    ("Barbara", "Davis"),
    ("David", "Wilson"),
    ("Susan", "Anderson"),
    ("Kevin", "O'Neil"),
    ("Anne-Marie", "Taylor"),
];

const FALLBACK_PAIR: (&str, &str) = ("Test", "User");

/// A random record that satisfies every validation rule by construction
pub fn sample_contact<R: Rng + ?Sized>(rng: &mut R) -> Contact {
    let (first, last) = *NAME_PAIRS.choose(rng).unwrap_or(&FALLBACK_PAIR);
    let suffix: u32 = rng.gen_range(1..100);

    Contact {
        id: None,
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: format!("{}.{}{}@example.com", email_part(first), email_part(last), suffix),
        phone_number: format!("555-{}-{}", rng.gen_range(100..1000), rng.gen_range(1000..10000)),
        address: Some(format!("{} Main Street", rng.gen_range(1000..10000))),
        city: "Seattle".to_string(),
        state: "WA".to_string(),
        zip_code: "98101".to_string(),
    }
}

// Keep only characters the email pattern accepts in the local part
fn email_part(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_lowercase()
}
