//! services/composer_service.rs
//! Construye el mensaje final (texto + HTML + adjuntos) para un contacto.

use lettre::{
    address::AddressError,
    message::{
        header::{ContentDisposition, ContentType},
        Body, Mailbox, MultiPart, SinglePart,
    },
    Address, Message,
};
use pulldown_cmark::{html, Options, Parser};

use crate::{
    models::{
        contact_model::Contact,
        email_model::{DecodedAttachment, EmailAttachment, SenderSettings},
        template_model::EmailTemplate,
    },
    services::personalization_service,
};

const OCTET_STREAM: &str = "application/octet-stream";

#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error("Invalid sender address '{address}': {source}")]
    InvalidSender {
        address: String,
        source: AddressError,
    },
    #[error("Invalid recipient address '{address}': {source}")]
    InvalidRecipient {
        address: String,
        source: AddressError,
    },
    #[error("Invalid content type '{0}'")]
    InvalidContentType(String),
    #[error("Failed to build message: {0}")]
    Build(#[from] lettre::error::Error),
}

/// Mensaje listo para entregar al transporte.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub recipient: String,
    pub message: Message,
}

/// Decodifica los adjuntos una sola vez por campaña. Un adjunto con base64
/// inválido se loguea y se omite; nunca aborta la campaña.
pub fn decode_attachments(attachments: &[EmailAttachment]) -> Vec<DecodedAttachment> {
    attachments
        .iter()
        .filter_map(|attach| match base64::decode(attach.content.trim()) {
            Ok(data) => Some(DecodedAttachment {
                filename: attach.filename.clone(),
                content_type: attach.content_type.clone(),
                data,
            }),
            Err(e) => {
                log::error!(
                    "(decode_attachments) No se pudo decodificar '{}', se omite: {}",
                    attach.filename,
                    e
                );
                None
            }
        })
        .collect()
}

/// Un cuerpo que empieza con `<` y termina con `>` se toma como HTML completo.
pub fn is_preformatted_markup(body: &str) -> bool {
    body.starts_with('<') && body.ends_with('>')
}

pub fn markdown_to_html(source: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(source, options);
    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Arma el mensaje para `contact`. El subject no se personaliza.
pub fn compose(
    template: &EmailTemplate,
    contact: &Contact,
    attachments: &[DecodedAttachment],
    sender: &SenderSettings,
) -> Result<OutboundMessage, ComposeError> {
    let text = personalization_service::render(&template.body, contact);
    let html_body = if is_preformatted_markup(&text) {
        text.clone()
    } else {
        markdown_to_html(&text)
    };

    let from_address: Address =
        sender
            .user
            .trim()
            .parse()
            .map_err(|source| ComposeError::InvalidSender {
                address: sender.user.clone(),
                source,
            })?;
    let from = Mailbox::new(Some(sender.display_name.clone()), from_address);

    let to_address: Address =
        contact
            .email
            .trim()
            .parse()
            .map_err(|source| ComposeError::InvalidRecipient {
                address: contact.email.clone(),
                source,
            })?;

    let alternative = MultiPart::alternative()
        .singlepart(
            SinglePart::builder()
                .header(ContentType::TEXT_PLAIN)
                .body(text),
        )
        .singlepart(
            SinglePart::builder()
                .header(ContentType::TEXT_HTML)
                .body(html_body),
        );

    let builder = Message::builder()
        .from(from)
        .to(Mailbox::new(None, to_address))
        .subject(template.subject.clone());

    let message = if attachments.is_empty() {
        builder.multipart(alternative)?
    } else {
        let mut mixed = MultiPart::mixed().multipart(alternative);
        for attach in attachments {
            mixed = mixed.singlepart(attachment_part(attach)?);
        }
        builder.multipart(mixed)?
    };

    Ok(OutboundMessage {
        recipient: contact.email.trim().to_string(),
        message,
    })
}

fn attachment_part(attach: &DecodedAttachment) -> Result<SinglePart, ComposeError> {
    let content_type = ContentType::parse(&attach.content_type)
        .or_else(|_| {
            log::warn!(
                "(compose) Content-Type inválido '{}' para '{}', usando {}",
                attach.content_type,
                attach.filename,
                OCTET_STREAM
            );
            ContentType::parse(OCTET_STREAM)
        })
        .map_err(|_| ComposeError::InvalidContentType(attach.content_type.clone()))?;

    Ok(SinglePart::builder()
        .header(content_type)
        .header(ContentDisposition::attachment(&attach.filename))
        .body(Body::new(attach.data.clone())))
}
