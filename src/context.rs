use crate::ignore::IgnoreFilter;
use crate::remote::{CommandRunner, RemoteFs, SshSession, SystemRunner};
use crate::settings::{SettingsEvent, SettingsStore};
use crate::ClipError;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, info, warn};

/// Settings plus the SSH session they configure.
pub struct AppContext<R: CommandRunner = SystemRunner> {
    store: SettingsStore,
    ssh: SshSession<R>,
    events: broadcast::Receiver<SettingsEvent>,
}

impl AppContext<SystemRunner> {
    pub fn new(store: SettingsStore) -> Self {
        AppContext::with_runner(store, SystemRunner)
    }
}

impl<R: CommandRunner> AppContext<R> {
    pub fn with_runner(store: SettingsStore, runner: R) -> Self {
        let settings = store.settings();
        let ssh = SshSession::with_runner(
            Some(settings.ssh_host.clone()),
            Some(settings.ssh_username.clone()),
            runner,
        );
        let events = store.subscribe();
        AppContext { store, ssh, events }
    }

    pub fn store(&self) -> &SettingsStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SettingsStore {
        &mut self.store
    }

    pub fn ssh(&self) -> &SshSession<R> {
        &self.ssh
    }

    pub fn ssh_mut(&mut self) -> &mut SshSession<R> {
        &mut self.ssh
    }

    /// The session as a filesystem, but only while it is connected.
    pub fn remote(&self) -> Option<&dyn RemoteFs> {
        if self.ssh.is_connected() {
            Some(&self.ssh)
        } else {
            None
        }
    }

    pub fn ignore_filter(&self) -> IgnoreFilter {
        IgnoreFilter::new(self.store.settings().ignore_filters())
    }

    /// Applies pending settings events. Returns how many were handled.
    pub async fn process_events(&mut self) -> usize {
        let mut handled = 0;
        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    handled += 1;
                    self.apply(event).await;
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!("Dropped {} settings events", skipped);
                    let settings = self.store.settings();
                    let (host, user) = (settings.ssh_host.clone(), settings.ssh_username.clone());
                    self.ssh.configure(&host, &user).await;
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        handled
    }

    async fn apply(&mut self, event: SettingsEvent) {
        match event {
            SettingsEvent::SshConfigChanged { host, username } => {
                info!("SSH settings changed, reconfiguring session");
                self.ssh.configure(&host, &username).await;
            }
            SettingsEvent::ExtensionFiltersChanged(filters) => {
                debug!("Extension filters now: {:?}", filters);
            }
            SettingsEvent::IgnoreFiltersChanged(folders) => {
                debug!("Ignore folders now: {:?}", folders);
            }
            SettingsEvent::Changed => {}
        }
    }

    /// Connects when SSH is configured. Unconfigured SSH is not an error.
    pub async fn connect_if_configured(
        &mut self,
        allow_interactive: bool,
    ) -> Result<bool, ClipError> {
        if !self.ssh.is_configured() {
            return Ok(false);
        }
        self.ssh.connect(allow_interactive).await?;
        Ok(true)
    }

    pub async fn shutdown(&mut self) {
        self.ssh.close().await;
    }

    /// Closes the SSH session, then hands back `outcome` unchanged.
    pub async fn finish<T>(&mut self, outcome: Result<T, ClipError>) -> Result<T, ClipError> {
        self.shutdown().await;
        outcome
    }
}
