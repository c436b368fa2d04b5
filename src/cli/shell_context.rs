//! Runtime state shared by shell commands.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::config::ConfigManager;
use crate::core::{LedgerStore, SystemClock};
use crate::dialogue::{Attachment, Dialogue, InboundEvent, MemorySessionStore, Menu, Reply};
use crate::storage::SqliteStorage;
use crate::utils::{instance_lock::InstanceLock, paths};

use super::{output, CliArgs, CliError};

const EXPORT_DIR: &str = "exports";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

pub struct ShellContext {
    pub mode: CliMode,
    pub user_id: i64,
    pub username: Option<String>,
    pub dialogue: Dialogue,
    pub last_menu: Option<Menu>,
    pub running: bool,
    base_dir: PathBuf,
    _lock: InstanceLock,
}

impl ShellContext {
    /// Loads configuration, locks the resolved database, and opens it.
    pub fn new(mode: CliMode, args: &CliArgs) -> Result<Self, CliError> {
        let config_manager = ConfigManager::new()?;
        let config = config_manager.load()?;
        let db_path = config.database_path(config_manager.base_dir());
        let lock = InstanceLock::acquire(paths::lock_file_for(&db_path))?;
        let storage = SqliteStorage::open(&db_path, &config.connection())?;
        let store = LedgerStore::new(Box::new(storage), Arc::new(SystemClock));
        let dialogue = Dialogue::new(
            Arc::new(store),
            Arc::new(MemorySessionStore::new()),
            config,
        );
        Ok(Self {
            mode,
            user_id: args.user_id,
            username: args.username.clone(),
            dialogue,
            last_menu: None,
            running: true,
            base_dir: config_manager.base_dir().to_path_buf(),
            _lock: lock,
        })
    }

    pub fn prompt(&self) -> String {
        format!("fintrack[{}]> ", self.user_id)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolves `tap` arguments: a 1-based button number from the last menu, or a raw payload.
    pub fn resolve_button(&self, raw: &str) -> String {
        raw.parse::<usize>()
            .ok()
            .and_then(|index| index.checked_sub(1))
            .and_then(|index| self.last_menu.as_ref()?.buttons().nth(index))
            .map(|button| button.data())
            .unwrap_or_else(|| raw.to_string())
    }

    pub fn send_callback(&mut self, data: &str) -> Result<(), CliError> {
        let event = self.event(InboundEvent::callback(self.user_id, data));
        self.deliver(&event)
    }

    pub fn send_message(&mut self, text: &str) -> Result<(), CliError> {
        let event = self.event(InboundEvent::message(self.user_id, text));
        self.deliver(&event)
    }

    fn event(&self, event: InboundEvent) -> InboundEvent {
        match &self.username {
            Some(name) => event.from_user(name.clone()),
            None => event,
        }
    }

    fn deliver(&mut self, event: &InboundEvent) -> Result<(), CliError> {
        let reply = self.dialogue.handle(event);
        self.render(&reply)
    }

    fn render(&mut self, reply: &Reply) -> Result<(), CliError> {
        output::reply(reply);
        if let Some(Attachment::Export(file)) = reply.attachment() {
            let dir = self.base_dir.join(EXPORT_DIR);
            fs::create_dir_all(&dir)?;
            let path = dir.join(&file.file_name);
            fs::write(&path, &file.bytes)?;
            output::success(format!("Saved {}", path.display()));
        }
        if let Some(menu) = reply.menu() {
            self.last_menu = Some(menu.clone());
        }
        Ok(())
    }
}
