// Contact CRUD and search endpoints.

use crate::client::DirectoryClient;
use crate::error::Error;
use crate::model::{Contact, ContactRequest, PageRequest, PageResponse};

impl DirectoryClient {
    /// `GET /contacts` -- one page of the unfiltered listing.
    pub async fn list_contacts(&self, page: &PageRequest) -> Result<PageResponse<Contact>, Error> {
        self.get_with_params("contacts", &page.as_query()).await
    }

    /// `GET /contacts/search` -- one page of results matching `query`.
    pub async fn search_contacts(
        &self,
        query: &str,
        page: &PageRequest,
    ) -> Result<PageResponse<Contact>, Error> {
        let mut params = vec![("query", query.to_owned())];
        params.extend(page.as_query());
        self.get_with_params("contacts/search", &params).await
    }

    /// `GET /contacts/{id}`
    pub async fn get_contact(&self, id: u64) -> Result<Contact, Error> {
        self.get(&format!("contacts/{id}")).await
    }

    /// `POST /contacts`
    pub async fn create_contact(&self, request: &ContactRequest) -> Result<Contact, Error> {
        self.post("contacts", request).await
    }

    /// `PUT /contacts/{id}`
    pub async fn update_contact(&self, id: u64, request: &ContactRequest) -> Result<Contact, Error> {
        self.put(&format!("contacts/{id}"), request).await
    }

    /// `DELETE /contacts/{id}`
    pub async fn delete_contact(&self, id: u64) -> Result<(), Error> {
        self.delete(&format!("contacts/{id}")).await
    }
}
