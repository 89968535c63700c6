// Bulk import/export endpoints
//
// Import uploads the original file bytes as a multipart `file` field --
// the server is the batch boundary, so client-side validation happens
// before this call (in rolo-core). Export downloads a fully rendered
// blob; the client never pages through results to assemble one.

use reqwest::multipart::{Form, Part};

use crate::client::DirectoryClient;
use crate::error::Error;
use crate::model::{Contact, TransferFormat};

impl DirectoryClient {
    /// `POST /contacts/import/{json,csv}` -- returns the created contacts.
    pub async fn import_contacts(
        &self,
        format: TransferFormat,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Vec<Contact>, Error> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_owned())
            .mime_str(format.content_type())
            .map_err(Error::Transport)?;
        let form = Form::new().part("file", part);

        self.post_multipart(&format!("contacts/import/{}", format.extension()), form)
            .await
    }

    /// `GET /contacts/export/{json,csv}` -- the user's entire contact set
    /// as a downloadable blob.
    pub async fn export_contacts(&self, format: TransferFormat) -> Result<Vec<u8>, Error> {
        self.get_bytes(&format!("contacts/export/{}", format.extension()))
            .await
    }
}
