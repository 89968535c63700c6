//! Contact CRUD and search command handlers.

use std::io::IsTerminal;

use dialoguer::Confirm;
use tabled::Tabled;

use rolo_api::{
    Contact, ContactEmail, ContactPhone, ContactRequest, EmailType, PageResponse, PhoneType,
};
use rolo_core::Directory;

use crate::cli::{ContactFields, GlobalOpts, PageArgs, SearchArgs};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ContactRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Emails")]
    emails: String,
    #[tabled(rename = "Phones")]
    phones: String,
}

impl From<&Contact> for ContactRow {
    fn from(c: &Contact) -> Self {
        Self {
            id: c.id,
            name: format!("{} {}", c.first_name, c.last_name),
            title: c.title.clone().unwrap_or_default(),
            emails: c
                .emails
                .iter()
                .map(|e| e.email.clone())
                .collect::<Vec<_>>()
                .join(", "),
            phones: c
                .phones
                .iter()
                .map(|p| p.phone_number.clone())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

fn detail(c: &Contact) -> String {
    let mut lines = vec![
        format!("ID:      {}", c.id),
        format!("Name:    {} {}", c.first_name, c.last_name),
        format!("Title:   {}", c.title.as_deref().unwrap_or("-")),
    ];
    for email in &c.emails {
        lines.push(format!("Email:   {} ({})", email.email, email.r#type.as_label()));
    }
    for phone in &c.phones {
        lines.push(format!(
            "Phone:   {} ({})",
            phone.phone_number,
            phone.r#type.as_label()
        ));
    }
    lines.push(format!("Updated: {}", c.updated_at.format("%Y-%m-%d %H:%M")));
    lines.join("\n")
}

fn print_page(page: &PageResponse<Contact>, global: &GlobalOpts) {
    let out = output::render_list(
        &global.output,
        &page.content,
        |c| ContactRow::from(c),
        |c| c.id.to_string(),
    );
    output::print_output(&out, global.quiet);
    if matches!(global.output, crate::cli::OutputFormat::Table) && page.total_pages > 1 {
        output::print_output(
            &format!(
                "Page {}/{} ({} contacts)",
                page.number + 1,
                page.total_pages,
                page.total_elements
            ),
            global.quiet,
        );
    }
}

/// Apply page/sort flags to the search controller.
fn apply_page_args(directory: &Directory, args: &PageArgs) {
    let search = directory.search();
    if let Some(size) = args.size {
        search.set_size(size);
    }
    search.set_sort(args.sort_by.clone(), args.sort_dir.into());
    search.set_page(args.page);
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn list(
    directory: &Directory,
    args: &PageArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    directory.search().clear();
    apply_page_args(directory, args);

    let page = directory.active_page().await?;
    print_page(&page, global);
    Ok(())
}

pub async fn search(
    directory: &Directory,
    args: &SearchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    // One-shot invocation: commit immediately, no debounce.
    directory.search().commit(&args.query);
    apply_page_args(directory, &args.page);

    let page = directory.active_page().await?;
    print_page(&page, global);
    Ok(())
}

pub async fn show(directory: &Directory, id: u64, global: &GlobalOpts) -> Result<(), CliError> {
    let contact = directory.contact(id).await?;
    let out = output::render_single(&global.output, &contact, detail, |c| c.id.to_string());
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn create(
    directory: &Directory,
    fields: &ContactFields,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let request = ContactRequest {
        first_name: required(&fields.first_name, "first-name")?,
        last_name: required(&fields.last_name, "last-name")?,
        title: fields.title.clone(),
        emails: parse_emails(&fields.emails)?,
        phones: parse_phones(&fields.phones)?,
    };

    let contact = directory.create_contact(request).await?;
    output::print_output(
        &format!("Created contact {} ({} {})", contact.id, contact.first_name, contact.last_name),
        global.quiet,
    );
    Ok(())
}

pub async fn update(
    directory: &Directory,
    id: u64,
    fields: &ContactFields,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    // Merge over the current state so unset flags keep their values.
    let current = directory.contact(id).await?;
    let request = ContactRequest {
        first_name: fields.first_name.clone().unwrap_or(current.first_name),
        last_name: fields.last_name.clone().unwrap_or(current.last_name),
        title: fields.title.clone().or(current.title),
        emails: if fields.emails.is_empty() {
            current.emails
        } else {
            parse_emails(&fields.emails)?
        },
        phones: if fields.phones.is_empty() {
            current.phones
        } else {
            parse_phones(&fields.phones)?
        },
    };

    let contact = directory.update_contact(id, request).await?;
    output::print_output(&format!("Updated contact {}", contact.id), global.quiet);
    Ok(())
}

pub async fn delete(directory: &Directory, id: u64, global: &GlobalOpts) -> Result<(), CliError> {
    if !global.yes {
        if !std::io::stdin().is_terminal() {
            return Err(CliError::ConfirmationRequired);
        }
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete contact {id}?"))
            .default(false)
            .interact()?;
        if !confirmed {
            output::print_output("Aborted", global.quiet);
            return Ok(());
        }
    }

    directory.delete_contact(id).await?;
    output::print_output(&format!("Deleted contact {id}"), global.quiet);
    Ok(())
}

// ── Flag parsing ────────────────────────────────────────────────────

fn required(value: &Option<String>, flag: &str) -> Result<String, CliError> {
    value.clone().ok_or_else(|| CliError::Validation {
        reason: format!("--{flag} is required"),
    })
}

/// Split a `VALUE[:TYPE]` flag into its parts. Untyped values default to
/// PERSONAL.
fn split_typed(spec: &str) -> (&str, Option<&str>) {
    match spec.rsplit_once(':') {
        Some((value, label)) if !label.is_empty() && !label.contains('@') => (value, Some(label)),
        _ => (spec, None),
    }
}

fn parse_emails(specs: &[String]) -> Result<Vec<ContactEmail>, CliError> {
    specs
        .iter()
        .map(|spec| {
            let (email, label) = split_typed(spec);
            let r#type = match label {
                None => EmailType::Personal,
                Some(label) => {
                    EmailType::from_label(label).ok_or_else(|| CliError::Validation {
                        reason: format!("unknown email type '{label}' in '{spec}'"),
                    })?
                }
            };
            Ok(ContactEmail {
                id: None,
                email: email.to_owned(),
                r#type,
            })
        })
        .collect()
}

fn parse_phones(specs: &[String]) -> Result<Vec<ContactPhone>, CliError> {
    specs
        .iter()
        .map(|spec| {
            let (number, label) = split_typed(spec);
            let r#type = match label {
                None => PhoneType::Personal,
                Some(label) => {
                    PhoneType::from_label(label).ok_or_else(|| CliError::Validation {
                        reason: format!("unknown phone type '{label}' in '{spec}'"),
                    })?
                }
            };
            Ok(ContactPhone {
                id: None,
                phone_number: number.to_owned(),
                r#type,
            })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn typed_flag_specs_parse() {
        let emails = parse_emails(&["a@x.com:work".into(), "b@y.com".into()]).unwrap();
        assert_eq!(emails[0].r#type, EmailType::Work);
        assert_eq!(emails[0].email, "a@x.com");
        assert_eq!(emails[1].r#type, EmailType::Personal);

        let phones = parse_phones(&["+1555:home".into()]).unwrap();
        assert_eq!(phones[0].r#type, PhoneType::Home);
        assert_eq!(phones[0].phone_number, "+1555");
    }

    #[test]
    fn unknown_type_label_is_an_error() {
        assert!(parse_emails(&["a@x.com:office".into()]).is_err());
    }

    #[test]
    fn bare_email_with_colon_in_value_is_untyped() {
        // No label after the colon -> the whole spec is the value.
        let (value, label) = split_typed("mailto:a@x.com");
        assert_eq!(value, "mailto:a@x.com");
        assert!(label.is_none());
    }
}
