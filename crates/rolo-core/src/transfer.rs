// ── Import / export pipeline ────────────────────────────────────────
//
// Import is all-or-nothing: the file is parsed and validated locally and
// any malformed row rejects the whole batch before a byte is uploaded.
// Export is the server's rendering, passed through untouched.
//
// CSV shape: header `First Name,Last Name,Title,Emails,Phones`; the
// multi-value cells hold `value (TYPE)` entries joined by `"; "`. A value
// without a parenthetical type gets OTHER; a parenthetical the server
// doesn't know gets PERSONAL.

use rolo_api::{
    ContactEmail, ContactPhone, ContactRequest, EmailType, PhoneType, TransferFormat,
};
use tracing::debug;

use crate::error::CoreError;

const CSV_HEADERS: [&str; 5] = ["First Name", "Last Name", "Title", "Emails", "Phones"];
const CELL_SEPARATOR: &str = ";";

/// An import file staged for upload.
#[derive(Debug, Clone)]
pub struct ImportFile {
    pub name: String,
    pub format: TransferFormat,
    pub bytes: Vec<u8>,
}

impl ImportFile {
    /// Stage a file, inferring the format from its extension.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, CoreError> {
        let name = name.into();
        let format = detect_format(&name)?;
        Ok(Self {
            name,
            format,
            bytes,
        })
    }
}

/// An export blob as produced by the server.
#[derive(Debug, Clone)]
pub struct ExportPayload {
    pub format: TransferFormat,
    pub bytes: Vec<u8>,
}

impl ExportPayload {
    /// Suggested download name, e.g. `contacts.csv`.
    pub fn file_name(&self) -> String {
        format!("contacts.{}", self.format.extension())
    }
}

/// Infer the transfer format from a file name. Case-insensitive on the
/// extension; anything but `.json`/`.csv` is rejected up front.
pub fn detect_format(file_name: &str) -> Result<TransferFormat, CoreError> {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("json") => Ok(TransferFormat::Json),
        Some("csv") => Ok(TransferFormat::Csv),
        _ => Err(CoreError::UnsupportedFormat {
            file_name: file_name.to_owned(),
        }),
    }
}

/// Parse and validate an import file. Returns the full batch or the first
/// reason the batch is unusable.
pub fn parse_import(file: &ImportFile) -> Result<Vec<ContactRequest>, CoreError> {
    let contacts = match file.format {
        TransferFormat::Json => parse_json(file)?,
        TransferFormat::Csv => parse_csv(file)?,
    };
    debug!(file = %file.name, count = contacts.len(), "import batch parsed");
    Ok(contacts)
}

fn parse_json(file: &ImportFile) -> Result<Vec<ContactRequest>, CoreError> {
    let contacts: Vec<ContactRequest> =
        serde_json::from_slice(&file.bytes).map_err(|e| CoreError::MalformedImport {
            file_name: file.name.clone(),
            reason: e.to_string(),
        })?;
    for (index, contact) in contacts.iter().enumerate() {
        validate_contact(contact).map_err(|e| CoreError::MalformedImport {
            file_name: file.name.clone(),
            reason: format!("entry {}: {e}", index + 1),
        })?;
    }
    Ok(contacts)
}

fn parse_csv(file: &ImportFile) -> Result<Vec<ContactRequest>, CoreError> {
    let malformed = |reason: String| CoreError::MalformedImport {
        file_name: file.name.clone(),
        reason,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file.bytes.as_slice());

    let headers = reader
        .headers()
        .map_err(|e| malformed(e.to_string()))?
        .clone();
    if headers.iter().ne(CSV_HEADERS) {
        return Err(malformed(format!(
            "unexpected header row (want: {})",
            CSV_HEADERS.join(",")
        )));
    }

    let mut contacts = Vec::new();
    for (index, record) in reader.records().enumerate() {
        // +2: one for the header row, one for one-based numbering.
        let row = index + 2;
        let record = record.map_err(|e| malformed(format!("row {row}: {e}")))?;

        let field = |i: usize| record.get(i).unwrap_or_default().trim();
        let title = field(2);
        let contact = ContactRequest {
            first_name: field(0).to_owned(),
            last_name: field(1).to_owned(),
            title: (!title.is_empty()).then(|| title.to_owned()),
            emails: parse_email_cell(field(3)),
            phones: parse_phone_cell(field(4)),
        };
        validate_contact(&contact).map_err(|e| malformed(format!("row {row}: {e}")))?;
        contacts.push(contact);
    }
    Ok(contacts)
}

fn parse_email_cell(cell: &str) -> Vec<ContactEmail> {
    split_cell(cell)
        .map(|(value, label)| ContactEmail {
            id: None,
            email: value,
            r#type: match label {
                None => EmailType::Other,
                Some(l) => EmailType::from_label(&l).unwrap_or(EmailType::Personal),
            },
        })
        .collect()
}

fn parse_phone_cell(cell: &str) -> Vec<ContactPhone> {
    split_cell(cell)
        .map(|(value, label)| ContactPhone {
            id: None,
            phone_number: value,
            r#type: match label {
                None => PhoneType::Other,
                Some(l) => PhoneType::from_label(&l).unwrap_or(PhoneType::Personal),
            },
        })
        .collect()
}

/// Split a multi-value cell into `(value, type label)` pairs.
fn split_cell(cell: &str) -> impl Iterator<Item = (String, Option<String>)> + '_ {
    cell.split(CELL_SEPARATOR)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            if part.ends_with(')') {
                if let Some(open) = part.rfind('(') {
                    let value = part[..open].trim();
                    let label = part[open + 1..part.len() - 1].trim();
                    if !value.is_empty() {
                        return (value.to_owned(), Some(label.to_owned()));
                    }
                }
            }
            (part.to_owned(), None)
        })
}

/// Client-side checks applied before any contact payload leaves the
/// machine, for single creates and imports alike.
pub fn validate_contact(contact: &ContactRequest) -> Result<(), CoreError> {
    let invalid = |reason: &str| CoreError::InvalidContact {
        reason: reason.to_owned(),
    };

    if contact.first_name.trim().is_empty() {
        return Err(invalid("first name is required"));
    }
    if contact.last_name.trim().is_empty() {
        return Err(invalid("last name is required"));
    }
    if contact.emails.is_empty() {
        return Err(invalid("at least one email is required"));
    }
    if contact.phones.is_empty() {
        return Err(invalid("at least one phone is required"));
    }
    for email in &contact.emails {
        if !email.email.contains('@') {
            return Err(CoreError::InvalidContact {
                reason: format!("invalid email address: {}", email.email),
            });
        }
    }
    for phone in &contact.phones {
        if phone.phone_number.trim().is_empty() {
            return Err(invalid("phone number must not be empty"));
        }
    }
    Ok(())
}
