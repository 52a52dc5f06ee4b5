use super::{Mailer, SUBJECT, text_body};
use crate::config::SesConfig;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::Serialize;
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

const SES_PATH: &str = "/v2/email/outbound-emails";
const SERVICE: &str = "ses";
const SIGNED_HEADERS: &str = "content-type;host;x-amz-date";
const SIGNED_HEADERS_WITH_TOKEN: &str = "content-type;host;x-amz-date;x-amz-security-token";

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailBody {
    from_email_address: String,
    destination: Destination,
    content: Content,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Destination {
    to_addresses: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Content {
    simple: SimpleMessage,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SimpleMessage {
    subject: TextPart,
    body: MessageBody,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct MessageBody {
    text: TextPart,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct TextPart {
    data: String,
    charset: &'static str,
}

impl TextPart {
    fn utf8(data: String) -> Self {
        Self {
            data,
            charset: "UTF-8",
        }
    }
}

/// Headers that must accompany a SigV4-signed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    pub amz_date: String,
    pub authorization: String,
}

/// Amazon SES v2 `SendEmail` over HTTPS, signed with AWS Signature V4.
#[derive(Clone)]
pub struct SesMailer {
    client: Client,
    region: String,
    access_key_id: String,
    secret_access_key: String,
    session_token: Option<String>,
    from_email: String,
}

fn required(value: &Option<String>, name: &str) -> AppResult<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .ok_or_else(|| AppError::ConfigError(format!("{name} is required for SES")))
}

impl SesMailer {
    pub fn new(config: &SesConfig, client: Client) -> AppResult<Self> {
        Ok(Self {
            client,
            region: required(&config.region, "AWS_REGION")?,
            access_key_id: required(&config.access_key_id, "AWS_ACCESS_KEY_ID")?,
            secret_access_key: required(&config.secret_access_key, "AWS_SECRET_ACCESS_KEY")?,
            session_token: config
                .session_token
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from),
            from_email: required(&config.from_email, "SES_FROM_EMAIL")?,
        })
    }

    fn host(&self) -> String {
        format!("email.{}.amazonaws.com", self.region)
    }

    fn build_body(&self, to: &str, code: &str) -> AppResult<String> {
        let body = SendEmailBody {
            from_email_address: self.from_email.clone(),
            destination: Destination {
                to_addresses: vec![to.to_string()],
            },
            content: Content {
                simple: SimpleMessage {
                    subject: TextPart::utf8(SUBJECT.to_string()),
                    body: MessageBody {
                        text: TextPart::utf8(text_body(code)),
                    },
                },
            },
        };
        Ok(serde_json::to_string(&body)?)
    }

    pub fn sign(&self, body: &str, now: DateTime<Utc>) -> SignedHeaders {
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();
        let host = self.host();

        let mut canonical_headers =
            format!("content-type:application/json\nhost:{host}\nx-amz-date:{amz_date}\n");
        let signed_headers = match &self.session_token {
            Some(token) => {
                canonical_headers.push_str(&format!("x-amz-security-token:{token}\n"));
                SIGNED_HEADERS_WITH_TOKEN
            }
            None => SIGNED_HEADERS,
        };
        let canonical_request = format!(
            "POST\n{SES_PATH}\n\n{canonical_headers}\n{signed_headers}\n{}",
            sha256_hex(body.as_bytes())
        );

        let scope = format!("{date}/{}/{SERVICE}/aws4_request", self.region);
        let string_to_sign = format!(
            "AWS4-HMAC-SHA256\n{amz_date}\n{scope}\n{}",
            sha256_hex(canonical_request.as_bytes())
        );

        let key = signing_key(&self.secret_access_key, &date, &self.region, SERVICE);
        let signature = hex::encode(hmac_sha256(&key, string_to_sign.as_bytes()));

        SignedHeaders {
            authorization: format!(
                "AWS4-HMAC-SHA256 Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
                self.access_key_id
            ),
            amz_date,
        }
    }
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

fn signing_key(secret: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    let k_date = hmac_sha256(format!("AWS4{secret}").as_bytes(), date.as_bytes());
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, service.as_bytes());
    hmac_sha256(&k_service, b"aws4_request")
}

#[async_trait]
impl Mailer for SesMailer {
    fn provider(&self) -> &'static str {
        "ses"
    }

    async fn send_code(&self, to: &str, code: &str) -> AppResult<()> {
        let body = self.build_body(to, code)?;
        let signed = self.sign(&body, Utc::now());

        let mut request = self
            .client
            .post(format!("https://{}{SES_PATH}", self.host()))
            .header("content-type", "application/json")
            .header("x-amz-date", &signed.amz_date)
            .header("authorization", &signed.authorization);
        if let Some(token) = &self.session_token {
            request = request.header("x-amz-security-token", token);
        }

        let response = request
            .body(body)
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("SES request failed: {e}")))?;

        if response.status().is_success() {
            log::info!("Verification email sent via SES: {}", to);
            return Ok(());
        }

        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        log::error!("SES rejected email to {}: HTTP {}: {}", to, status, error_text);
        Err(AppError::ExternalApiError(format!(
            "SES send failed: HTTP {}",
            status.as_u16()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn mailer() -> SesMailer {
        mailer_with_token(None)
    }

    fn mailer_with_token(session_token: Option<&str>) -> SesMailer {
        SesMailer::new(
            &SesConfig {
                session_token: session_token.map(String::from),
                region: Some("us-east-1".into()),
                access_key_id: Some("AKIDEXAMPLE".into()),
                secret_access_key: Some("wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".into()),
                from_email: Some("noreply@untlove.app".into()),
                ..Default::default()
            },
            Client::new(),
        )
        .unwrap()
    }

    #[test]
    fn signing_key_matches_aws_reference() {
        // reference derivation from the AWS SigV4 documentation
        let key = signing_key(
            "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
            "20120215",
            "us-east-1",
            "iam",
        );
        assert_eq!(
            hex::encode(key),
            "f4780e2d9f65fa895f9c67b32ce1baf0b0d8a43505a000a1a9e090d414db404d"
        );
    }

    #[test]
    fn authorization_header_has_scope_and_signature() {
        let mailer = mailer();
        let now = Utc.with_ymd_and_hms(2026, 2, 1, 12, 30, 0).unwrap();
        let signed = mailer.sign("{}", now);

        assert_eq!(signed.amz_date, "20260201T123000Z");
        assert!(signed.authorization.starts_with(
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20260201/us-east-1/ses/aws4_request, SignedHeaders=content-type;host;x-amz-date, Signature="
        ));
        let signature = signed.authorization.rsplit('=').next().unwrap();
        assert_eq!(signature.len(), 64);

        // deterministic for identical input, sensitive to the body
        assert_eq!(signed, mailer.sign("{}", now));
        assert_ne!(signed, mailer.sign("{\"a\":1}", now));
    }

    #[test]
    fn session_token_is_signed_when_present() {
        let now = Utc.with_ymd_and_hms(2026, 2, 1, 12, 30, 0).unwrap();
        let temporary = mailer_with_token(Some("FwoGZXIvYXdzEXAMPLETOKEN"));
        let signed = temporary.sign("{}", now);

        assert!(signed.authorization.contains(
            "SignedHeaders=content-type;host;x-amz-date;x-amz-security-token, Signature="
        ));
        assert_ne!(signed, mailer().sign("{}", now));
        assert_ne!(signed, mailer_with_token(Some("another-token")).sign("{}", now));

        // blank tokens from the environment are ignored
        assert_eq!(mailer_with_token(Some("  ")).sign("{}", now), mailer().sign("{}", now));
    }

    #[test]
    fn body_uses_ses_v2_shape() {
        let body = mailer().build_body("jdoe@my.unt.edu", "482913").unwrap();
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();

        assert_eq!(json["FromEmailAddress"], "noreply@untlove.app");
        assert_eq!(json["Destination"]["ToAddresses"][0], "jdoe@my.unt.edu");
        assert_eq!(json["Content"]["Simple"]["Subject"]["Data"], "Your UNT Love Code");
        assert_eq!(
            json["Content"]["Simple"]["Body"]["Text"]["Data"],
            "Your verification code is: 482913"
        );
    }

    #[test]
    fn incomplete_config_is_rejected() {
        let result = SesMailer::new(&SesConfig::default(), Client::new());
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }
}
