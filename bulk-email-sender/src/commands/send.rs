//! Interactive send command

use anyhow::{Context, Result};
use bulk_email_sender::{
    AppConfig, ConsoleBackend, MessageFormat, Outbox, SendForm, SmtpBackend,
};
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Password, Select};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::runtime::Runtime;
use tracing::info;

/// Environment variable that supplies the password instead of the prompt
pub const PASSWORD_ENV: &str = "BULK_EMAIL_SMTP_PASSWORD";

/// Envelope sender for dry runs with no username configured
const DRY_RUN_FROM: &str = "bulk-email-sender@localhost";

/// Values given on the command line; anything missing is asked for
#[derive(Debug, Default)]
pub struct SendArgs {
    /// Message format
    pub format: Option<MessageFormat>,
    /// SMTP username
    pub username: Option<String>,
    /// SMTP hostname
    pub host: Option<String>,
    /// SMTP port
    pub port: Option<u16>,
    /// Print instead of sending
    pub dry_run: bool,
    /// Skip the confirmation
    pub assume_yes: bool,
}

/// Choose a format, prepare the message, fill in the form and send
pub struct SendCommand {
    config: AppConfig,
    args: SendArgs,
    theme: ColorfulTheme,
}

impl SendCommand {
    /// Create a new command instance
    pub fn new(config: AppConfig, args: SendArgs) -> Self {
        Self {
            config,
            args,
            theme: ColorfulTheme::default(),
        }
    }

    /// Execute the command
    pub fn execute(&self, runtime: &Runtime) -> Result<()> {
        println!("{}", style("Bulk Email Sender").bold());
        println!();

        let format = self.choose_format()?;
        info!("User choice set to {format}");

        let outbox = Outbox::prepare(format, &self.config)?;
        self.print_summary(&outbox);

        if self.args.dry_run {
            let from = self
                .config
                .envelope_from(self.args.username.as_deref().unwrap_or(&self.config.smtp.username));
            let from = if from.is_empty() { DRY_RUN_FROM } else { from };
            runtime.block_on(outbox.submit(from, &ConsoleBackend::verbose()))?;
            return Ok(());
        }

        let form = self.fill_form()?;
        form.validate()?;

        if !self.confirm_send(&outbox, &form)? {
            println!("{}", style("Nothing sent.").yellow());
            return Ok(());
        }

        self.on_submit(runtime, &outbox, &form)
    }

    /// Send button handler
    fn on_submit(&self, runtime: &Runtime, outbox: &Outbox, form: &SendForm) -> Result<()> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .context("Failed to set progress style")?,
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(100));
        spinner.set_message(format!("Sending via {}...", form.address()));

        let sender = SmtpBackend::new(form.smtp_config(self.config.smtp.tls));
        let from = self.config.envelope_from(&form.username);
        let result = runtime.block_on(outbox.submit(from, &sender));

        spinner.finish_and_clear();
        result?;

        println!(
            "{} {}",
            style("✓ Sent to").green().bold(),
            style(format!("{} recipient(s)", outbox.recipients().len())).cyan().bold()
        );

        Ok(())
    }

    fn choose_format(&self) -> Result<MessageFormat> {
        if let Some(format) = self.args.format {
            return Ok(format);
        }

        let index = Select::with_theme(&self.theme)
            .with_prompt("Message format")
            .items(&MessageFormat::ALL)
            .default(0)
            .interact()?;

        Ok(MessageFormat::ALL[index])
    }

    fn fill_form(&self) -> Result<SendForm> {
        let smtp = &self.config.smtp;

        let username = self.text_field("Username", self.args.username.as_deref(), &smtp.username)?;
        let hostname = self.text_field("Hostname", self.args.host.as_deref(), &smtp.host)?;

        let password = match std::env::var(PASSWORD_ENV) {
            Ok(password) => password,
            Err(_) => Password::with_theme(&self.theme)
                .with_prompt("Password")
                .allow_empty_password(true)
                .interact()?,
        };

        let port = match self.args.port {
            Some(port) => port,
            None => Input::<u16>::with_theme(&self.theme)
                .with_prompt("Port")
                .default(smtp.port)
                .interact_text()?,
        };

        Ok(SendForm {
            username,
            hostname,
            password,
            port,
        })
    }

    fn text_field(&self, label: &str, preset: Option<&str>, default: &str) -> Result<String> {
        if let Some(value) = preset {
            return Ok(value.to_string());
        }

        let mut input = Input::<String>::with_theme(&self.theme).with_prompt(label);
        if !default.is_empty() {
            input = input.default(default.to_string());
        }

        Ok(input.interact_text()?)
    }

    fn confirm_send(&self, outbox: &Outbox, form: &SendForm) -> Result<bool> {
        if self.args.assume_yes {
            return Ok(true);
        }

        let prompt = format!(
            "Send to {} recipient(s) via {}?",
            outbox.recipients().len(),
            form.address()
        );

        Ok(Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(false)
            .interact()?)
    }

    fn print_summary(&self, outbox: &Outbox) {
        let source = match outbox.format() {
            MessageFormat::Html => &self.config.files.html_template,
            MessageFormat::Plaintxt => &self.config.files.plain_text,
        };

        println!(
            "  {} {} ({} bytes)",
            style("Message:").dim(),
            style(source.display()).cyan(),
            outbox.body().len()
        );
        println!(
            "  {} {} ({} recipient(s))",
            style("Recipients:").dim(),
            style(self.config.files.recipients.display()).cyan(),
            outbox.recipients().len()
        );
        println!();
    }
}
