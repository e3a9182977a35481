use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use freshen_fs::{atomic_write, from_io, read_to_string};
use freshen_notify::{Classified, Guard, Handler, Notifier, Source};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::codec::{Codec, JsonCodec};
use crate::error::{Error, ErrorKind, Result};

/// A value of type `T` persisted at `<location>/<name>.<extension>`.
///
/// Filesystem and format failures are reported through the notifier under
/// `config*` categories and never returned, except for values that cannot
/// be encoded at all.
#[derive(Debug)]
pub struct ConfigFile<T, C = JsonCodec> {
    location: PathBuf,
    name: String,
    data: T,
    notifier: Notifier,
    codec: PhantomData<C>,
}

impl<T, C> ConfigFile<T, C>
where
    T: Serialize + DeserializeOwned + Default,
    C: Codec,
{
    /// Creates the location, loads the file, and writes defaults if there
    /// was no file yet.
    pub fn open(location: impl AsRef<Path>, name: impl Into<String>, notifier: Notifier) -> Result<Self> {
        let mut file = Self {
            location: location.as_ref().to_path_buf(),
            name: name.into(),
            data: T::default(),
            notifier,
            codec: PhantomData,
        };

        if let Err(e) = std::fs::create_dir_all(&file.location) {
            let guard = Guard::<Error, ()>::new(file.notifier.clone()).on(
                ErrorKind::Permission,
                Handler::new("configDirPermissions")
                    .message(file.name.clone())
                    .detail(file.location.display().to_string()),
            );
            guard.handle(from_io(&file.location, e, true).into())?;
        }

        file.load();
        if !file.path().is_file() {
            file.save()?;
        }
        Ok(file)
    }

    pub fn path(&self) -> PathBuf {
        self.location.join(format!("{}.{}", self.name, C::EXTENSION))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn get(&self) -> &T {
        &self.data
    }

    /// Changes made through the reference are persisted by the next [`save`](Self::save).
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.data
    }

    /// Applies `f` to the value and saves it.
    pub fn update(&mut self, f: impl FnOnce(&mut T)) -> Result<bool> {
        f(&mut self.data);
        self.save()
    }

    /// Replaces the value with the file contents.
    ///
    /// Returns `false` if there is no file or it could not be read. A file
    /// that does not decode resets the value to its default.
    pub fn load(&mut self) -> bool {
        let path = self.path();
        if !path.is_file() {
            return false;
        }

        let loaded = read_to_string(&path)
            .map_err(Error::from)
            .and_then(|text| {
                C::decode::<T>(&text).map_err(|e| Error::Decode {
                    path: path.clone(),
                    format: C::NAME,
                    source: Box::new(e),
                })
            });

        match loaded {
            Ok(data) => {
                self.data = data;
                debug!(path = %path.display(), "loaded config");
                true
            }
            Err(err) => {
                if err.is_kind(ErrorKind::Decode) {
                    self.data = T::default();
                }
                self.load_guard().handle(err)
            }
        }
    }

    /// Writes the value atomically.
    ///
    /// `Ok(false)` means the write failed and was reported; `Err` means the
    /// value could not be encoded.
    pub fn save(&self) -> Result<bool> {
        let text = C::encode(&self.data).map_err(|e| Error::Encode {
            format: C::NAME,
            source: Box::new(e),
        })?;

        let path = self.path();
        self.save_guard().run(|| {
            atomic_write(&path, text.as_bytes())?;
            debug!(path = %path.display(), "saved config");
            Ok(true)
        })
    }

    /// Restores the default value, saving it when `save` is set.
    pub fn reset(&mut self, save: bool) -> Result<bool> {
        self.data = T::default();
        if save { self.save() } else { Ok(true) }
    }

    /// Resets and saves if `condition` holds; returns `condition`.
    pub fn reset_if(&mut self, condition: bool) -> Result<bool> {
        if condition {
            self.reset(true)?;
        }
        Ok(condition)
    }

    fn load_guard(&self) -> freshen_notify::TotalGuard<Error, bool> {
        Guard::<Error, bool>::new(self.notifier.clone())
            .on(
                ErrorKind::Permission,
                Handler::new("configLoadPermissions").message(self.name.clone()),
            )
            .on(
                ErrorKind::Decode,
                Handler::new(format!("configLoad{}", C::NAME))
                    .message(self.name.clone())
                    .detail(Source::Display),
            )
            .otherwise(
                Handler::new("configLoad")
                    .message(self.name.clone())
                    .detail(Source::Display),
            )
    }

    fn save_guard(&self) -> Guard<Error, bool> {
        Guard::<Error, bool>::new(self.notifier.clone())
            .on(
                ErrorKind::Permission,
                Handler::new("configSavePermissions").message(self.name.clone()),
            )
            .on(
                ErrorKind::NotFound,
                Handler::new("configSaveNotFound").message(self.name.clone()),
            )
            .on(
                ErrorKind::Io,
                Handler::new("configSave")
                    .message(self.name.clone())
                    .detail(Source::Display),
            )
    }
}
