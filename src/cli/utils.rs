use serde_json::{json, Value};
use std::io::{self, BufRead, Write};

use crate::cli::OutputFormat;
use crate::contact::Contact;
use crate::controller::Pagination;
use crate::validation::{Field, FieldErrors};

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let Some(Value::Object(extra)) = data {
                if let Some(object) = response.as_object_mut() {
                    object.extend(extra);
                }
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output a list of contacts as a table or a JSON document
pub fn output_contacts(
    output_format: &OutputFormat,
    contacts: &[&Contact],
    pagination: Option<&Pagination>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({ "contacts": contacts });
            if let Some(p) = pagination {
                response["pagination"] = json!({
                    "page": p.page,
                    "pageSize": p.page_size,
                    "totalCount": p.total_count,
                    "totalPages": p.total_pages(),
                });
            }
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            if contacts.is_empty() {
                println!("No contacts found");
                return Ok(());
            }
            println!("{:<6} {:<28} {:<32} {:<14} {:<18} {:<5} {:<10}", "ID", "NAME", "EMAIL", "PHONE", "CITY", "STATE", "ZIP");
            for c in contacts {
                println!(
                    "{:<6} {:<28} {:<32} {:<14} {:<18} {:<5} {:<10}",
                    c.id.as_ref().map(ToString::to_string).unwrap_or_default(),
                    c.full_name(),
                    c.email,
                    c.phone_number,
                    c.city,
                    c.state,
                    c.zip_code
                );
            }
            if let Some(p) = pagination {
                println!("Page {} of {} ({} contacts)", p.page, p.total_pages(), p.total_count);
            }
        }
    }
    Ok(())
}

/// Output a single contact with every field
pub fn output_contact(output_format: &OutputFormat, contact: &Contact) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(contact)?),
        OutputFormat::Text => {
            if let Some(id) = &contact.id {
                println!("{:<14} {}", "ID:", id);
            }
            for field in Field::ALL {
                println!("{:<14} {}", format!("{}:", field.label()), field.value_of(contact));
            }
        }
    }
    Ok(())
}

/// Output form errors, one per field
pub fn output_field_errors(output_format: &OutputFormat, errors: &FieldErrors) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let fields: serde_json::Map<String, Value> = errors
                .iter()
                .map(|(field, msg)| (field.name().to_string(), Value::String(msg.clone())))
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({ "success": false, "fieldErrors": fields }))?
            );
        }
        OutputFormat::Text => {
            for (field, msg) in errors {
                eprintln!("  {}: {}", field.label(), msg);
            }
        }
    }
    Ok(())
}

/// Read one line from stdin after printing `prompt` to stderr
pub fn prompt(prompt: &str) -> anyhow::Result<String> {
    eprint!("{}", prompt);
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Ask a yes/no question; anything but y/yes is a no
pub fn confirm(question: &str) -> anyhow::Result<bool> {
    let answer = prompt(&format!("{} [y/N] ", question))?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_explicit_yes_confirms() {
        assert!(is_yes("y"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("no"));
        assert!(!is_yes("yeah"));
    }
}
