//! Subject and body composition for outgoing notifications.
//!
//! Bodies are plain HTML fragments; the storefront's branded templates are
//! rendered elsewhere.

use crate::ports::Notification;

/// A composed email ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Brand name used in subjects and greetings.
pub const BRAND_NAME: &str = "Beauty Academy";

pub fn compose(notification: &Notification) -> ComposedEmail {
    match notification {
        Notification::Welcome {
            email,
            name,
            temporary_password,
            login_url,
        } => ComposedEmail {
            to: email.clone(),
            subject: format!("Vitajte v {}!", BRAND_NAME),
            html: format!(
                "<p>Dobrý deň {name},</p>\
                 <p>váš účet v {brand} bol vytvorený.</p>\
                 <p>Prihlasovací email: <strong>{email}</strong><br>\
                 Dočasné heslo: <strong>{password}</strong></p>\
                 <p><a href=\"{login_url}\">Prihlásiť sa</a></p>\
                 <p>Po prihlásení si heslo zmeňte.</p>",
                name = escape(name),
                brand = BRAND_NAME,
                email = escape(email),
                password = escape(temporary_password),
                login_url = escape(login_url),
            ),
        },
        Notification::PurchaseConfirmation {
            email,
            name,
            course_title,
            course_url,
            order_number,
            amount,
            ..
        } => ComposedEmail {
            to: email.clone(),
            subject: format!("Kurz \"{}\" je aktívny | {}", course_title, BRAND_NAME),
            html: format!(
                "<p>Dobrý deň {name},</p>\
                 <p>ďakujeme za nákup kurzu <strong>{title}</strong>.</p>\
                 <p>Číslo objednávky: {order}<br>Suma: {amount}</p>\
                 <p><a href=\"{course_url}\">Začať kurz</a></p>",
                name = escape(name),
                title = escape(course_title),
                order = escape(order_number),
                amount = amount,
                course_url = escape(course_url),
            ),
        },
    }
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
