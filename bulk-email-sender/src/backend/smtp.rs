//! SMTP backend for sending mail
//!
//! Uses the `lettre` crate. The resolved body is sent as raw `DATA`, so
//! whatever headers the message file carries are what the recipients see.
//! Bare `\n` line endings are sent as `\r\n`.
//!
//! PLAIN credentials only go over an encrypted connection, unless the server
//! is `localhost`, `127.0.0.1` or `::1`.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use async_trait::async_trait;
use lettre::{
    address::Envelope,
    transport::smtp::{
        authentication::{Credentials, Mechanism},
        client::{Tls, TlsParameters},
    },
    Address, AsyncSmtpTransport, AsyncTransport, Tokio1Executor,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{Mail, MailError, MailSender};

/// How the connection to the SMTP server is secured
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TlsMode {
    /// Upgrade with STARTTLS when the server offers it; mandatory for
    /// hosts other than the local machine
    #[default]
    Opportunistic,
    /// Fail unless the server accepts STARTTLS
    Required,
    /// Implicit TLS from the first byte (usually port 465)
    Wrapper,
    /// Plaintext connection, refused for hosts other than the local machine
    None,
}

/// SMTP backend configuration
#[derive(Clone)]
pub struct SmtpConfig {
    /// SMTP server hostname
    pub host: String,

    /// SMTP server port
    pub port: u16,

    /// SMTP username (PLAIN auth)
    pub username: String,

    /// SMTP password (PLAIN auth)
    pub password: String,

    /// Connection security
    pub tls: TlsMode,
}

impl SmtpConfig {
    /// Create a configuration with opportunistic TLS
    #[must_use]
    pub fn new(host: &str, port: u16, username: &str, password: &str) -> Self {
        Self {
            host: host.to_string(),
            port,
            username: username.to_string(),
            password: password.to_string(),
            tls: TlsMode::default(),
        }
    }

    /// Set the connection security mode
    #[must_use]
    pub const fn with_tls(mut self, tls: TlsMode) -> Self {
        self.tls = tls;
        self
    }
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("tls", &self.tls)
            .finish()
    }
}

/// SMTP mail backend
///
/// Opens one connection per [`send`](MailSender::send), authenticates with
/// PLAIN and delivers to every recipient in a single transaction.
#[derive(Debug)]
pub struct SmtpBackend {
    config: SmtpConfig,
}

impl SmtpBackend {
    /// Create a new SMTP backend with the given configuration
    #[must_use]
    pub const fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    /// Build the SMTP envelope for a mail
    fn build_envelope(mail: &Mail) -> Result<Envelope, MailError> {
        mail.validate()?;

        let from = parse_address(&mail.from)?;
        let to = mail
            .to
            .iter()
            .map(|address| parse_address(address))
            .collect::<Result<Vec<_>, _>>()?;

        Envelope::new(Some(from), to).map_err(|e| MailError::transport(e.to_string()))
    }

    /// Create SMTP transport from config
    fn create_transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, MailError> {
        let credentials =
            Credentials::new(self.config.username.clone(), self.config.password.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.config.host)
            .port(self.config.port)
            .tls(self.tls()?)
            .credentials(credentials)
            .authentication(vec![Mechanism::Plain])
            .build();

        Ok(transport)
    }

    /// Connection security actually used for the configured host
    fn tls(&self) -> Result<Tls, MailError> {
        let local = is_local_host(&self.config.host);

        let tls = match self.config.tls {
            TlsMode::Opportunistic if local => Tls::Opportunistic(self.tls_parameters()?),
            TlsMode::Opportunistic | TlsMode::Required => Tls::Required(self.tls_parameters()?),
            TlsMode::Wrapper => Tls::Wrapper(self.tls_parameters()?),
            TlsMode::None if local => Tls::None,
            TlsMode::None => return Err(MailError::transport("unencrypted connection")),
        };

        Ok(tls)
    }

    fn tls_parameters(&self) -> Result<TlsParameters, MailError> {
        TlsParameters::new(self.config.host.clone())
            .map_err(|e| MailError::transport(format!("TLS parameters error: {e}")))
    }
}

/// Hosts PLAIN credentials may be sent to in the clear
fn is_local_host(host: &str) -> bool {
    host == "localhost"
        || host.parse::<IpAddr>().is_ok_and(|ip| {
            ip == IpAddr::V4(Ipv4Addr::LOCALHOST) || ip == IpAddr::V6(Ipv6Addr::LOCALHOST)
        })
}

/// Turn every bare `\n` into `\r\n`
///
/// The transport dot-stuffs lines only after `\r\n`, so this also makes a
/// line holding a single `.` safe to send.
fn crlf_line_endings(body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + body.len() / 32);
    let mut previous = None;

    for &byte in body {
        if byte == b'\n' && previous != Some(b'\r') {
            out.push(b'\r');
        }
        out.push(byte);
        previous = Some(byte);
    }

    out
}

fn parse_address(address: &str) -> Result<Address, MailError> {
    address
        .parse()
        .map_err(|_| MailError::InvalidAddress(address.to_string()))
}

#[async_trait]
impl MailSender for SmtpBackend {
    async fn send(&self, mail: Mail) -> Result<(), MailError> {
        let envelope = Self::build_envelope(&mail)?;
        let transport = self.create_transport()?;

        debug!(
            host = %self.config.host,
            port = self.config.port,
            tls = ?self.config.tls,
            recipients = mail.to.len(),
            bytes = mail.body.len(),
            "Sending mail over SMTP"
        );

        let data = crlf_line_endings(&mail.body);
        let response = transport
            .send_raw(&envelope, &data)
            .await
            .map_err(|e| MailError::transport(e.to_string()))?;

        info!(
            code = %response.code(),
            recipients = mail.to.len(),
            "SMTP server accepted mail"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(tls: TlsMode) -> SmtpBackend {
        SmtpBackend::new(
            SmtpConfig::new("smtp.example.com", 587, "me@example.com", "password123").with_tls(tls),
        )
    }

    #[test]
    fn test_config_defaults_to_opportunistic_tls() {
        let config = SmtpConfig::new("smtp.example.com", 25, "me", "pw");
        assert_eq!(config.tls, TlsMode::Opportunistic);
    }

    #[test]
    fn test_config_debug_redacts_password() {
        let config = SmtpConfig::new("smtp.example.com", 587, "me", "hunter2");
        let debug = format!("{config:?}");

        assert!(debug.contains("smtp.example.com"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_build_envelope_all_recipients() {
        let mail = Mail::new()
            .from("me@example.com")
            .to_multiple(&["a@x.com", "b@y.com"])
            .body(b"Hello".to_vec());

        let envelope = SmtpBackend::build_envelope(&mail).unwrap();

        assert_eq!(envelope.from().map(ToString::to_string), Some("me@example.com".to_string()));
        let to: Vec<String> = envelope.to().iter().map(ToString::to_string).collect();
        assert_eq!(to, vec!["a@x.com", "b@y.com"]);
    }

    #[test]
    fn test_build_envelope_rejects_blank_recipient() {
        let mail = Mail::new().from("me@example.com").to("a@x.com").to("");

        let result = SmtpBackend::build_envelope(&mail);
        assert!(matches!(result, Err(MailError::InvalidAddress(ref a)) if a.is_empty()));
    }

    #[test]
    fn test_build_envelope_rejects_username_that_is_not_an_address() {
        let mail = Mail::new().from("apikey").to("a@x.com");

        let result = SmtpBackend::build_envelope(&mail);
        assert!(matches!(result, Err(MailError::InvalidAddress(ref a)) if a == "apikey"));
    }

    #[test]
    fn test_build_envelope_requires_recipients() {
        let mail = Mail::new().from("me@example.com");
        assert!(matches!(
            SmtpBackend::build_envelope(&mail),
            Err(MailError::NoRecipients)
        ));
    }

    #[tokio::test]
    async fn test_create_transport_every_tls_mode() {
        for mode in [
            TlsMode::Opportunistic,
            TlsMode::Required,
            TlsMode::Wrapper,
            TlsMode::None,
        ] {
            let local = SmtpBackend::new(
                SmtpConfig::new("localhost", 25, "me@example.com", "pw").with_tls(mode),
            );
            assert!(local.create_transport().is_ok(), "mode {mode:?}");
        }
    }

    #[test]
    fn test_remote_host_never_authenticates_in_clear() {
        assert!(matches!(backend(TlsMode::Opportunistic).tls(), Ok(Tls::Required(_))));
        assert!(matches!(backend(TlsMode::Required).tls(), Ok(Tls::Required(_))));
        assert!(matches!(backend(TlsMode::Wrapper).tls(), Ok(Tls::Wrapper(_))));
        assert!(matches!(
            backend(TlsMode::None).tls(),
            Err(MailError::MailTransport(ref m)) if m == "unencrypted connection"
        ));
    }

    #[test]
    fn test_local_host_may_authenticate_in_clear() {
        for host in ["localhost", "127.0.0.1", "::1"] {
            let opportunistic = SmtpBackend::new(SmtpConfig::new(host, 25, "me", "pw"));
            assert!(matches!(opportunistic.tls(), Ok(Tls::Opportunistic(_))), "{host}");

            let plain = SmtpBackend::new(SmtpConfig::new(host, 25, "me", "pw").with_tls(TlsMode::None));
            assert!(matches!(plain.tls(), Ok(Tls::None)), "{host}");
        }
    }

    #[test]
    fn test_is_local_host() {
        assert!(is_local_host("localhost"));
        assert!(is_local_host("127.0.0.1"));
        assert!(is_local_host("::1"));
        assert!(!is_local_host("127.0.0.2"));
        assert!(!is_local_host("smtp.example.com"));
        assert!(!is_local_host("localhost.example.com"));
    }

    #[test]
    fn test_crlf_line_endings() {
        assert_eq!(
            crlf_line_endings(b"Subject: hi\n\nline1\n.\nline3\n"),
            b"Subject: hi\r\n\r\nline1\r\n.\r\nline3\r\n"
        );
        assert_eq!(crlf_line_endings(b"a\r\nb\r\n"), b"a\r\nb\r\n");
        assert_eq!(crlf_line_endings(b"a\r\nb\nc"), b"a\r\nb\r\nc");
        assert_eq!(crlf_line_endings(b"\n"), b"\r\n");
        assert!(crlf_line_endings(b"").is_empty());
    }

    #[tokio::test]
    async fn test_send_rejects_incomplete_mail_before_connecting() {
        let result = backend(TlsMode::None).send(Mail::new().to("a@x.com")).await;
        assert!(matches!(result, Err(MailError::NoSender)));
    }

    #[tokio::test]
    async fn test_send_refuses_plaintext_to_remote_host() {
        let mail = Mail::new().from("me@example.com").to("a@x.com");

        let result = backend(TlsMode::None).send(mail).await;
        assert!(matches!(result, Err(MailError::MailTransport(ref m)) if m == "unencrypted connection"));
    }

    mod wire {
        use crate::backend::smtp::{SmtpBackend, SmtpConfig, TlsMode};
        use crate::{Mail, MailError, MailSender};
        use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
        use tokio::net::TcpListener;

        /// `\0me@example.com\0hunter2`
        const AUTH_PLAIN: &str = "AUTH PLAIN AG1lQGV4YW1wbGUuY29tAGh1bnRlcjI=";

        /// What the fake server received
        #[derive(Debug, Default)]
        struct Session {
            commands: Vec<String>,
            data: Vec<String>,
        }

        /// Accept one client, answer like a plaintext server offering only
        /// `AUTH PLAIN`, and stop after the message data or on disconnect
        async fn serve_once(listener: TcpListener) -> Session {
            let (stream, _) = listener.accept().await.unwrap();
            let (reader, mut writer) = stream.into_split();
            let mut reader = BufReader::new(reader);
            let mut session = Session::default();
            let mut in_data = false;

            writer.write_all(b"220 localhost ESMTP\r\n").await.unwrap();

            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).await.unwrap() == 0 {
                    break;
                }

                if in_data {
                    if line == ".\r\n" {
                        writer.write_all(b"250 2.0.0 Queued\r\n").await.unwrap();
                        break;
                    }
                    session.data.push(line);
                    continue;
                }

                let command = line.trim_end().to_string();
                let verb = command
                    .split_whitespace()
                    .next()
                    .unwrap_or_default()
                    .to_ascii_uppercase();
                session.commands.push(command);

                let reply: &[u8] = match verb.as_str() {
                    "EHLO" => b"250-localhost\r\n250 AUTH PLAIN\r\n",
                    "AUTH" => b"235 2.7.0 Authentication successful\r\n",
                    "DATA" => {
                        in_data = true;
                        b"354 End data with <CR><LF>.<CR><LF>\r\n"
                    }
                    "QUIT" => b"221 2.0.0 Bye\r\n",
                    _ => b"250 2.0.0 OK\r\n",
                };
                writer.write_all(reply).await.unwrap();
            }

            session
        }

        async fn start() -> (u16, tokio::task::JoinHandle<Session>) {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let port = listener.local_addr().unwrap().port();
            (port, tokio::spawn(serve_once(listener)))
        }

        fn local_backend(port: u16, tls: TlsMode) -> SmtpBackend {
            SmtpBackend::new(
                SmtpConfig::new("127.0.0.1", port, "me@example.com", "hunter2").with_tls(tls),
            )
        }

        #[tokio::test]
        async fn test_send_delivers_one_transaction() {
            let (port, server) = start().await;

            let mail = Mail::new()
                .from("me@example.com")
                .to_multiple(&["a@x.com", "b@y.com"])
                .body(b"Subject: hi\n\nline1\n.\nline3\n".to_vec());

            local_backend(port, TlsMode::Opportunistic)
                .send(mail)
                .await
                .unwrap();
            let session = server.await.unwrap();

            assert!(session.commands.iter().any(|c| c == AUTH_PLAIN));
            assert_eq!(
                session
                    .commands
                    .iter()
                    .filter(|c| c.starts_with("MAIL FROM:"))
                    .collect::<Vec<_>>(),
                vec!["MAIL FROM:<me@example.com>"]
            );
            let rcpt: Vec<&String> = session
                .commands
                .iter()
                .filter(|c| c.starts_with("RCPT TO:"))
                .collect();
            assert_eq!(rcpt, vec!["RCPT TO:<a@x.com>", "RCPT TO:<b@y.com>"]);
            assert_eq!(session.commands.iter().filter(|c| *c == "DATA").count(), 1);

            assert!(session.data.iter().all(|line| line.ends_with("\r\n")));
            let data = session.data.concat();
            assert!(
                data.starts_with("Subject: hi\r\n\r\nline1\r\n..\r\nline3\r\n"),
                "{data:?}"
            );
        }

        #[tokio::test]
        async fn test_required_tls_fails_without_starttls_and_never_authenticates() {
            let (port, server) = start().await;

            let mail = Mail::new().from("me@example.com").to("a@x.com").body(b"Hello".to_vec());

            let result = local_backend(port, TlsMode::Required).send(mail).await;
            assert!(matches!(result, Err(MailError::MailTransport(_))));

            let session = server.await.unwrap();
            assert!(session.commands.iter().all(|c| !c.starts_with("AUTH")));
            assert!(session.data.is_empty());
        }
    }
}
