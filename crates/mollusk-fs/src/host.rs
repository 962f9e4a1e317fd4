//! Hosts and their mount tables.
//!
//! A [`Host`] is a named machine. It always carries its home filesystem and
//! may have further filesystems mounted next to it, keyed by root name.
//! Exactly one of them is current; the shell's verbs go to that one.

use std::collections::BTreeMap;

use crate::error::{FsError, FsResult};
use crate::filesystem::FileSystem;

/// A named machine with a home filesystem and a mount table.
#[derive(Debug, Clone)]
pub struct Host {
    name: String,
    home: FileSystem,
    /// Mounted filesystems, keyed by root name. Never holds the home fs.
    mounted: BTreeMap<String, FileSystem>,
    /// Name of the current mount; `None` means the home filesystem.
    current: Option<String>,
}

impl Host {
    /// Create a host around its home filesystem.
    pub fn new(name: impl Into<String>, home: FileSystem) -> Self {
        Self {
            name: name.into(),
            home,
            mounted: BTreeMap::new(),
            current: None,
        }
    }

    /// The host name shown in the prompt.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The current filesystem.
    pub fn fs(&self) -> &FileSystem {
        self.current
            .as_ref()
            .and_then(|name| self.mounted.get(name))
            .unwrap_or(&self.home)
    }

    /// The current filesystem, mutably.
    pub fn fs_mut(&mut self) -> &mut FileSystem {
        match self.current.as_ref().and_then(|name| self.mounted.get_mut(name)) {
            Some(fs) => fs,
            None => &mut self.home,
        }
    }

    /// The home filesystem, whichever is current.
    pub fn home(&self) -> &FileSystem {
        &self.home
    }

    /// The home filesystem, mutably.
    pub fn home_mut(&mut self) -> &mut FileSystem {
        &mut self.home
    }

    /// Swap in a new home filesystem, returning the old one.
    ///
    /// Mounts are kept; the home filesystem becomes current.
    pub fn replace_home(&mut self, home: FileSystem) -> FileSystem {
        self.go_home();
        std::mem::replace(&mut self.home, home)
    }

    /// Returns true while the home filesystem is current.
    pub fn is_home(&self) -> bool {
        self.current.is_none()
    }

    /// Mount `fs` under its root name.
    ///
    /// Fails with [`FsError::AlreadyExists`] if the home filesystem or
    /// another mount already uses that name.
    pub fn mount(&mut self, fs: FileSystem) -> FsResult<()> {
        let name = fs.name().to_string();
        if name == self.home.name() || self.mounted.contains_key(&name) {
            return Err(FsError::already_exists(name));
        }
        self.mounted.insert(name, fs);
        Ok(())
    }

    /// Make the home filesystem current.
    pub fn go_home(&mut self) {
        self.current = None;
    }

    /// Make a mounted filesystem current; `None` goes back home.
    pub fn switch(&mut self, name: Option<&str>) -> FsResult<()> {
        match name {
            None => self.go_home(),
            Some(name) if name == self.home.name() => self.go_home(),
            Some(name) if self.mounted.contains_key(name) => {
                self.current = Some(name.to_string());
            }
            Some(name) => return Err(FsError::not_found(name, &self.name)),
        }
        Ok(())
    }

    /// Remove a mount and hand it back.
    ///
    /// The home filesystem cannot be unmounted. Unmounting the current
    /// filesystem switches back home.
    pub fn unmount(&mut self, name: &str) -> FsResult<FileSystem> {
        if name == self.home.name() {
            return Err(FsError::invalid_target(format!(
                "'{name}' is the home filesystem"
            )));
        }
        let fs = self
            .mounted
            .remove(name)
            .ok_or_else(|| FsError::not_found(name, &self.name))?;
        if self.current.as_deref() == Some(name) {
            self.current = None;
        }
        Ok(fs)
    }

    /// Names of every filesystem on this host, home first.
    pub fn mounts(&self) -> Vec<&str> {
        std::iter::once(self.home.name())
            .chain(self.mounted.keys().map(String::as_str))
            .collect()
    }
}
