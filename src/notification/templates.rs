//! Mail renderings for the notifications the platform sends.

use super::mail::{MailPayload, MailRender, Notifiable};

/// Ad-hoc delivery target: CLI test sends, one-off recipients.
#[derive(Debug, Clone)]
pub struct Recipient {
    pub email: String,
    pub name: String,
}

impl Notifiable for Recipient {
    fn route_email(&self) -> Option<String> {
        Some(self.email.clone())
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }
}

/// Issued-certificate notice with a download link.
#[derive(Debug, Clone)]
pub struct CertificateIssued {
    pub student_name: String,
    pub course: String,
    pub certificate_url: String,
}

impl MailRender for CertificateIssued {
    fn to_mail(&self) -> MailPayload {
        MailPayload::new(
            format!("Seu certificado de {} está disponível", self.course),
            format!(
                "<p>Olá {},</p>\
                 <p>Seu certificado do curso <b>{}</b> já pode ser baixado.</p>\
                 <p><a href=\"{}\">Baixar certificado</a></p>",
                self.student_name, self.course, self.certificate_url
            ),
        )
    }
}

/// Payment confirmation receipt.
#[derive(Debug, Clone)]
pub struct PaymentReceived {
    pub client_name: String,
    pub amount: String,
    pub reference: String,
}

impl MailRender for PaymentReceived {
    fn to_mail(&self) -> MailPayload {
        MailPayload::new(
            format!("Pagamento recebido — {}", self.reference),
            format!(
                "<p>Olá {},</p>\
                 <p>Confirmamos o recebimento do pagamento de <b>{}</b> \
                 referente a <b>{}</b>.</p>\
                 <p>Obrigado!</p>",
                self.client_name, self.amount, self.reference
            ),
        )
    }
}

/// Plain test message used by `mail test` and the management API.
#[derive(Debug, Clone)]
pub struct TestMessage;

impl MailRender for TestMessage {
    fn to_mail(&self) -> MailPayload {
        MailPayload::new(
            "Gestor — mensagem de teste",
            "<p>O serviço de e-mail está configurado corretamente.</p>",
        )
    }
}
