//! ISO-DEP loyalty card session
//!
//! SELECT the loyalty AID, check the status word, compare the returned
//! account number and, on a match, send the commit command. A card that
//! answers with another status word or another account is not ours; that is
//! logged and is not an error.

use tracing::{Level, debug, info, instrument, warn};

use crate::{
    Error, ReaderConfig, Response, codec,
    report::{SessionOutcome, SessionReport},
    transport::ByteTransport,
};

/// Drives one ISO-DEP exchange
#[derive(Debug, Clone, Default)]
pub struct IsoDepSession {
    config: ReaderConfig,
}

impl IsoDepSession {
    /// Create a session with the given configuration
    pub const fn new(config: ReaderConfig) -> Self {
        Self { config }
    }

    /// The configuration in use
    pub const fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Run the session to completion and return its report
    pub fn run(&self, transport: impl ByteTransport) -> SessionReport {
        let mut report = SessionReport::new();
        self.run_into(transport, &mut report);
        report
    }

    /// Run the session, appending to an existing report
    #[instrument(level = "debug", skip_all, fields(aid = %self.config.aid))]
    pub fn run_into(&self, mut transport: impl ByteTransport, report: &mut SessionReport) {
        let outcome = match transport
            .connect()
            .map_err(Error::from)
            .and_then(|()| self.exchange(&mut transport, report))
        {
            Ok(()) => SessionOutcome::Completed,
            Err(e) if e.is_mismatch() => {
                report.info(e.to_string());
                SessionOutcome::NotApplicable
            }
            Err(e) if e.is_transport() => {
                report.error(format!("Error communicating with card: {e}"));
                SessionOutcome::Failed
            }
            Err(e) => {
                report.error(format!("Invalid session configuration: {e}"));
                SessionOutcome::Failed
            }
        };
        transport.close();
        report.set_outcome(outcome);
    }

    fn exchange(
        &self,
        transport: &mut impl ByteTransport,
        report: &mut SessionReport,
    ) -> Result<(), Error> {
        report.info(format!("Requesting remote AID: {}", self.config.aid));
        let command = codec::build_select_apdu(&self.config.select_header, &self.config.aid)?;
        report.info(format!("Sending: {}", codec::bytes_to_hex(&command)));

        let raw = transport.transceive(&command)?;
        let response = Response::from_bytes(&raw)?;
        let status = response.status();
        report.info(format!(
            "Received: {} status: {}",
            codec::bytes_to_hex(&raw),
            codec::bytes_to_hex(status.to_bytes())
        ));

        if !response.is_success() {
            match status.tracing_level() {
                Level::WARN => warn!(%status, "SELECT rejected: {}", status.description()),
                Level::INFO => info!(%status, "SELECT warning: {}", status.description()),
                _ => debug!(%status, "SELECT not completed: {}", status.description()),
            }
            return Err(Error::StatusMismatch { status });
        }

        let account = codec::bytes_to_hex(response.payload());
        report.info(format!("Received: {account}"));
        if !account.eq_ignore_ascii_case(&self.config.expected_account) {
            return Err(Error::protocol_mismatch("account number wrong"));
        }

        self.commit(transport, report)
    }

    /// Send the follow-up command. Its response is logged, not interpreted.
    fn commit(
        &self,
        transport: &mut impl ByteTransport,
        report: &mut SessionReport,
    ) -> Result<(), Error> {
        let command = codec::hex_to_bytes(&self.config.commit_command)?;
        report.info(format!("Sending: {}", codec::bytes_to_hex(&command)));
        let raw = transport.transceive(&command)?;
        report.info(format!("Received: {}", codec::bytes_to_hex(&raw)));
        Ok(())
    }
}
