//! models/contact_model.rs
//! Destinatario de una campaña.

use email_address::EmailAddress;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Contact {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default, alias = "jobTitle")]
    pub job_title: Option<String>,
}

impl Contact {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            company: None,
            job_title: None,
        }
    }

    #[cfg(test)]
    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    #[cfg(test)]
    pub fn with_job_title(mut self, job_title: impl Into<String>) -> Self {
        self.job_title = Some(job_title.into());
        self
    }

    /// Sintaxis RFC 5322 de la dirección (no comprueba que exista el buzón).
    pub fn has_valid_email(&self) -> bool {
        EmailAddress::is_valid(self.email.trim())
    }
}
