use clap::Args;

use crate::cli::config::CliContext;
use crate::cli::utils::{confirm, output_contact, output_contacts, output_field_errors, output_success};
use crate::cli::OutputFormat;
use crate::config::ListMode;
use crate::contact::ContactId;
use crate::controller::{ContactListController, MessageKind, ViewState};
use crate::gateway::HttpContactGateway;
use crate::sort::SortKey;
use crate::validation::{ContactForm, Field};

type Controller = ContactListController<HttpContactGateway>;

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    #[arg(long, help = "Free-text search")]
    pub search: Option<String>,
    #[arg(long, help = "Filter by name (paged mode)")]
    pub name: Option<String>,
    #[arg(long, help = "Filter by city (paged mode)")]
    pub city: Option<String>,
    #[arg(long, help = "Filter by state (paged mode)")]
    pub state: Option<String>,
    #[arg(long, help = "Sort column and direction, e.g. \"name\" or \"city desc\"")]
    pub sort: Option<String>,
    #[arg(long, help = "Page to show (paged mode)")]
    pub page: Option<u32>,
    #[arg(long, help = "Use the paged endpoint regardless of configuration")]
    pub paged: bool,
}

/// Field values given on the command line; unset flags leave the field alone
#[derive(Args, Debug, Default)]
pub struct ContactFields {
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub state: Option<String>,
    #[arg(long)]
    pub zip: Option<String>,
}

impl ContactFields {
    fn values(&self) -> [(Field, &Option<String>); 8] {
        [
            (Field::FirstName, &self.first_name),
            (Field::LastName, &self.last_name),
            (Field::Email, &self.email),
            (Field::PhoneNumber, &self.phone),
            (Field::Address, &self.address),
            (Field::City, &self.city),
            (Field::State, &self.state),
            (Field::ZipCode, &self.zip),
        ]
    }

    pub fn apply(&self, form: &mut ContactForm) {
        for (field, value) in self.values() {
            if let Some(value) = value {
                form.set_field(field, value);
            }
        }
    }
}

pub async fn list(ctx: &CliContext, args: ListArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut controller = if args.paged {
        let mut config = ctx.config.clone();
        config.view.list_mode = ListMode::Paged;
        ctx.controller_for(&config)
    } else {
        ctx.controller()
    };

    let sort = match args.sort.as_deref() {
        Some(s) => Some(SortKey::parse(s).ok_or_else(|| anyhow::anyhow!("Unknown sort column '{}'", s))?),
        None => None,
    };

    mount(&mut controller).await?;
    if sort.is_some() {
        controller.set_sort(sort).await;
    }
    if let Some(search) = &args.search {
        controller.set_search(search).await;
    }
    if args.name.is_some() || args.city.is_some() || args.state.is_some() {
        controller
            .set_filters(args.name.as_deref(), args.city.as_deref(), args.state.as_deref())
            .await;
    }
    if let Some(page) = args.page {
        controller.go_to_page(page).await;
    }
    ensure_listed(&controller)?;

    let paged = controller.settings().list_mode == ListMode::Paged;
    output_contacts(
        &output_format,
        &controller.sorted_contacts(),
        paged.then(|| controller.pagination()),
    )
}

pub async fn show(ctx: &CliContext, id: String, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut controller = ctx.controller();
    controller.view_contact(ContactId::from(id.as_str())).await;
    match controller.detail() {
        Some(contact) => output_contact(&output_format, contact),
        None => Err(failure(&controller)),
    }
}

pub async fn create(
    ctx: &CliContext,
    fields: ContactFields,
    sample: bool,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let mut controller = ctx.controller();
    mount(&mut controller).await?;

    controller.open_create();
    if sample {
        controller.fill_sample_data(&mut rand::thread_rng());
    }
    if let Some(form) = controller.form_mut() {
        fields.apply(form);
    }
    submit(&mut controller, output_format).await
}

pub async fn update(
    ctx: &CliContext,
    id: String,
    fields: ContactFields,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let mut controller = ctx.controller();
    mount(&mut controller).await?;

    controller.toggle_selection(ContactId::from(id.as_str()));
    controller.open_update().await;
    if !matches!(controller.state(), ViewState::FormOpen(_)) {
        return Err(failure(&controller));
    }
    if let Some(form) = controller.form_mut() {
        fields.apply(form);
    }
    submit(&mut controller, output_format).await
}

pub async fn delete(ctx: &CliContext, id: String, yes: bool, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut controller = ctx.controller();
    mount(&mut controller).await?;

    let id = ContactId::from(id.as_str());
    controller.toggle_selection(id.clone());
    controller.request_delete();

    let label = controller
        .selected_contact()
        .map(|c| format!("{} ({})", c.full_name(), id))
        .unwrap_or_else(|| id.to_string());
    if !yes && !confirm(&format!("Delete contact {}?", label))? {
        controller.cancel_delete();
        return output_success(&output_format, "Delete cancelled", None);
    }

    if !controller.confirm_delete().await {
        return Err(failure(&controller));
    }
    output_success(&output_format, &message_or(&controller, "Contact deleted successfully"), None)
}

async fn submit(controller: &mut Controller, output_format: OutputFormat) -> anyhow::Result<()> {
    match controller.submit_form().await {
        Some(saved) => {
            output_success(&output_format, &message_or(controller, "Saved"), None)?;
            output_contact(&output_format, &saved)
        }
        None => {
            if let Some(form) = controller.form() {
                let errors = form.visible_errors();
                if !errors.is_empty() {
                    output_field_errors(&output_format, &errors)?;
                }
            }
            Err(failure(controller))
        }
    }
}

async fn mount(controller: &mut Controller) -> anyhow::Result<()> {
    controller.mount().await;
    ensure_listed(controller)
}

fn ensure_listed(controller: &Controller) -> anyhow::Result<()> {
    match controller.state() {
        ViewState::RedirectToLogin | ViewState::Error => Err(failure(controller)),
        _ => Ok(()),
    }
}

/// The most specific explanation the controller has for the last action failing
fn failure(controller: &Controller) -> anyhow::Error {
    if controller.is_redirected() {
        return anyhow::anyhow!("Not logged in. Run `contacts auth login <username>`");
    }
    if let Some(error) = controller.error() {
        return anyhow::anyhow!("{}", error);
    }
    match controller.current_message() {
        Some(m) if m.kind != MessageKind::Success => anyhow::anyhow!("{}", m.text),
        _ => anyhow::anyhow!("Please correct the highlighted fields"),
    }
}

fn message_or(controller: &Controller, fallback: &str) -> String {
    controller
        .current_message()
        .filter(|m| m.kind == MessageKind::Success)
        .map(|m| m.text.clone())
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_given_fields_are_applied() {
        let fields = ContactFields {
            first_name: Some("Jo".to_string()),
            phone: Some("5551234567".to_string()),
            state: Some("wa".to_string()),
            ..ContactFields::default()
        };
        let mut form = ContactForm::new();
        form.set_field(Field::City, "Tacoma");
        fields.apply(&mut form);

        assert_eq!(form.value(Field::FirstName), "Jo");
        assert_eq!(form.value(Field::PhoneNumber), "555-123-4567");
        assert_eq!(form.value(Field::State), "WA");
        assert_eq!(form.value(Field::City), "Tacoma");
        assert_eq!(form.value(Field::LastName), "");
    }
}
