//! services/personalization_service.rs
//! Sustitución literal de placeholders en el cuerpo de la plantilla.

use crate::models::contact_model::Contact;

/// Reemplaza `{name}`, `{email}`, `{company}` y `{jobTitle}` con los datos del
/// contacto. Un campo vacío o ausente deja su token tal cual; cualquier otro
/// token no se toca.
pub fn render(template_body: &str, contact: &Contact) -> String {
    let substitutions: [(&str, Option<&str>); 4] = [
        ("{name}", Some(contact.name.as_str())),
        ("{email}", Some(contact.email.as_str())),
        ("{company}", contact.company.as_deref()),
        ("{jobTitle}", contact.job_title.as_deref()),
    ];

    substitutions
        .iter()
        .fold(template_body.to_string(), |body, (token, value)| match value {
            Some(v) if !v.is_empty() => body.replace(token, v),
            _ => body,
        })
}
