use anyhow::{Result, anyhow};
use native_tls::TlsConnector;

use crate::batch::MailSource;
use crate::domain::email::MessageHandle;
use crate::mail::decoders::header_pairs;

type TlsSession = imap::Session<native_tls::TlsStream<std::net::TcpStream>>;

/// IMAP-backed [`MailSource`]; handles are message UIDs in `mailbox`.
///
/// The session is opened on first use and kept for the rest of the run.
pub struct ImapSource {
    pub server: String,
    pub port: u16,
    pub user: String,
    pub mailbox: String,
    password: String,
    session: Option<TlsSession>,
}

impl ImapSource {
    pub fn new(
        server: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        password: impl Into<String>,
        mailbox: impl Into<String>,
    ) -> Self {
        Self {
            server: server.into(),
            port,
            user: user.into(),
            mailbox: mailbox.into(),
            password: password.into(),
            session: None,
        }
    }

    fn connect(&self) -> Result<TlsSession> {
        log::info!("connecting to {}:{}", self.server, self.port);
        let tls = TlsConnector::builder().build()?;
        let client = imap::connect((self.server.as_str(), self.port), self.server.as_str(), &tls)?;

        let mut session = client
            .login(&self.user, &self.password)
            .map_err(|(e, _)| anyhow!("IMAP login for {} failed: {e}", self.user))?;
        session.select(&self.mailbox)?;
        Ok(session)
    }

    fn session(&mut self) -> Result<&mut TlsSession> {
        if self.session.is_none() {
            self.session = Some(self.connect()?);
        }
        self.session
            .as_mut()
            .ok_or_else(|| anyhow!("IMAP session not available"))
    }
}

impl MailSource for ImapSource {
    fn list_message_ids(&mut self, query: &str, max: usize) -> Result<Vec<MessageHandle>> {
        let session = self.session()?;
        let mut uids: Vec<u32> = session.uid_search(query)?.into_iter().collect();
        // newest first
        uids.sort_unstable_by(|a, b| b.cmp(a));
        uids.truncate(max);
        Ok(uids
            .into_iter()
            .map(|uid| MessageHandle::new(uid.to_string()))
            .collect())
    }

    fn get_headers(&mut self, handle: &MessageHandle) -> Result<Vec<(String, String)>> {
        let uid: u32 = handle
            .as_str()
            .parse()
            .map_err(|_| anyhow!("not an IMAP UID: {handle}"))?;

        let session = self.session()?;
        // RFC822.HEADER does not set \Seen
        let fetches = session.uid_fetch(uid.to_string(), "(UID RFC822.HEADER)")?;
        let f = fetches
            .iter()
            .next()
            .ok_or_else(|| anyhow!("email UID {uid} not found"))?;
        let raw = f
            .header()
            .ok_or_else(|| anyhow!("UID {uid}: no header block in response"))?;
        header_pairs(raw)
    }
}

impl Drop for ImapSource {
    fn drop(&mut self) {
        if let Some(mut s) = self.session.take() {
            let _ = s.logout();
        }
    }
}
