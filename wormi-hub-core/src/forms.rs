//! Signup forms and the third-party relay they are posted to.

use std::{collections::HashMap, fmt, sync::LazyLock};

use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormKind {
    Volunteer,
    Host,
    Newsletter,
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Volunteer => "volunteer",
            Self::Host => "host",
            Self::Newsletter => "newsletter",
        })
    }
}

/// A form that can be checked and posted as JSON
pub trait Submission: Serialize + Send + Sync {
    const KIND: FormKind;

    /// Fields that must not be empty
    fn required(&self) -> Vec<(&'static str, &str)>;

    fn email(&self) -> &str;

    /// Missing fields first, then the email format
    fn validate(&self) -> Result<()> {
        let missing: Vec<&'static str> = self
            .required()
            .into_iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(name, _)| name)
            .collect();
        if !missing.is_empty() {
            return Err(Error::MissingFields(missing));
        }

        if !is_valid_email(self.email()) {
            return Err(Error::InvalidEmail(self.email().to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolunteerSignup {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub interests: String,
    pub availability: String,
}

impl Submission for VolunteerSignup {
    const KIND: FormKind = FormKind::Volunteer;

    fn required(&self) -> Vec<(&'static str, &str)> {
        vec![("name", self.name.as_str()), ("email", self.email.as_str())]
    }

    fn email(&self) -> &str {
        &self.email
    }
}

/// Application to host a drop-off node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostApplication {
    pub name: String,
    pub email: String,
    pub address: String,
    pub space_description: String,
    pub commitment: String,
}

impl Submission for HostApplication {
    const KIND: FormKind = FormKind::Host;

    fn required(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("name", self.name.as_str()),
            ("email", self.email.as_str()),
            ("address", self.address.as_str()),
        ]
    }

    fn email(&self) -> &str {
        &self.email
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsletterSignup {
    pub email: String,
}

impl Submission for NewsletterSignup {
    const KIND: FormKind = FormKind::Newsletter;

    // Email format only
    fn required(&self) -> Vec<(&'static str, &str)> {
        Vec::new()
    }

    fn email(&self) -> &str {
        &self.email
    }
}

/// Accepted submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub kind: FormKind,
    pub status: u16,
}

/// Client for the form relay service, one endpoint per form
#[derive(Debug, Clone)]
pub struct FormRelay {
    client: Client,
    endpoints: HashMap<FormKind, String>,
}

impl FormRelay {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            endpoints: HashMap::new(),
        }
    }

    pub fn with_endpoint(mut self, kind: FormKind, url: impl Into<String>) -> Self {
        self.endpoints.insert(kind, url.into());
        self
    }

    pub fn endpoint(&self, kind: FormKind) -> Option<&str> {
        self.endpoints.get(&kind).map(String::as_str)
    }

    /// Validate and post the form
    pub async fn submit<S: Submission>(&self, form: &S) -> Result<SubmissionReceipt> {
        form.validate()?;

        let url = self
            .endpoint(S::KIND)
            .ok_or_else(|| {
                Error::Config(format!("No relay endpoint configured for {} form", S::KIND))
            })?;

        tracing::info!(kind = %S::KIND, "submitting form to relay");
        let response = self.client.post(url).json(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(kind = %S::KIND, %status, "form relay rejected submission");
            return Err(Error::Relay {
                kind: S::KIND,
                status: status.as_u16(),
            });
        }

        Ok(SubmissionReceipt {
            kind: S::KIND,
            status: status.as_u16(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_pattern() {
        for ok in ["a@b.co", "first.last@mail.example.org", "x+tag@y.z"] {
            assert!(is_valid_email(ok), "{} should be valid", ok);
        }
        for bad in ["", "plain", "a@b", "a b@c.d", "a@@b.c", "@b.c", "a@b."] {
            assert!(!is_valid_email(bad), "{:?} should be invalid", bad);
        }
    }

    #[test]
    fn missing_fields_are_reported_before_email_format() {
        let form = HostApplication {
            email: "not-an-email".to_string(),
            ..Default::default()
        };

        match form.validate().unwrap_err() {
            Error::MissingFields(fields) => assert_eq!(fields, vec!["name", "address"]),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn invalid_email_after_required_fields() {
        let form = VolunteerSignup {
            name: "Sam".to_string(),
            email: "sam at example".to_string(),
            ..Default::default()
        };
        assert!(matches!(form.validate(), Err(Error::InvalidEmail(_))));

        let form = VolunteerSignup {
            email: "sam@example.org".to_string(),
            ..form
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn newsletter_only_checks_email() {
        assert!(NewsletterSignup { email: "a@b.co".to_string() }.validate().is_ok());
        assert!(matches!(
            NewsletterSignup::default().validate(),
            Err(Error::InvalidEmail(_))
        ));
    }

    #[tokio::test]
    async fn submit_without_endpoint_is_a_config_error() {
        let relay = FormRelay::new(Client::new())
            .with_endpoint(FormKind::Volunteer, "https://relay.example/f/volunteer");
        let form = NewsletterSignup {
            email: "a@b.co".to_string(),
        };

        assert!(matches!(relay.submit(&form).await, Err(Error::Config(_))));
        assert_eq!(
            relay.endpoint(FormKind::Volunteer),
            Some("https://relay.example/f/volunteer")
        );
    }

    #[tokio::test]
    async fn accepted_submission_returns_receipt() {
        use wiremock::{Mock, MockServer, ResponseTemplate, matchers};

        let server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .and(matchers::path("/f/newsletter"))
            .and(matchers::body_json(serde_json::json!({ "email": "a@b.co" })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let relay = FormRelay::new(Client::new())
            .with_endpoint(FormKind::Newsletter, format!("{}/f/newsletter", server.uri()));
        let receipt = relay
            .submit(&NewsletterSignup {
                email: "a@b.co".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(
            receipt,
            SubmissionReceipt {
                kind: FormKind::Newsletter,
                status: 200,
            }
        );
    }

    #[tokio::test]
    async fn rejected_submission_is_a_relay_error() {
        use wiremock::{Mock, MockServer, ResponseTemplate, matchers};

        let server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let relay = FormRelay::new(Client::new())
            .with_endpoint(FormKind::Volunteer, format!("{}/f/volunteer", server.uri()));
        let form = VolunteerSignup {
            name: "Sam".to_string(),
            email: "sam@example.org".to_string(),
            ..Default::default()
        };

        match relay.submit(&form).await.unwrap_err() {
            Error::Relay { kind, status } => {
                assert_eq!(kind, FormKind::Volunteer);
                assert_eq!(status, 500);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn invalid_form_is_never_sent() {
        // Nothing listens on port 9; validation must fail first
        let relay = FormRelay::new(Client::new())
            .with_endpoint(FormKind::Host, "http://127.0.0.1:9/unreachable");

        let result = relay.submit(&HostApplication::default()).await;
        assert!(matches!(result, Err(Error::MissingFields(_))));
    }

    #[test]
    fn host_application_serializes_with_site_field_names() {
        let form = HostApplication {
            name: "Ana".to_string(),
            email: "ana@example.org".to_string(),
            address: "4 Oak Ln".to_string(),
            space_description: "Shaded side yard".to_string(),
            commitment: "Weekly".to_string(),
        };
        let json = serde_json::to_value(&form).unwrap();
        assert_eq!(json["space_description"], "Shaded side yard");
    }
}
