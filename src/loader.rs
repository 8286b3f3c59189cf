//! Dynamic backend module loading.
//!
//! One portable surface over the platform's library-loading mechanism
//! (`dlopen` on unix, `LoadLibraryW` on windows, via `libloading`). A
//! [`Module`] owns the OS handle; entry points resolved from it are raw
//! function pointers, so they must be stored next to the module that keeps
//! them valid (see [`Backend`](crate::Backend)).

use core::fmt;
use std::ffi::{OsString, c_void};
use std::path::{Path, PathBuf};

use libloading::Library;
use log::debug;

use crate::error::BridgeError;

/// Map a bare library stem to the platform's shared-library file name
/// (`codec` becomes `libcodec.so`, `codec.dll`, or `libcodec.dylib`).
pub fn library_filename(stem: &str) -> OsString {
    libloading::library_filename(stem)
}

/// A loaded backend module.
///
/// Owns the OS-level handle to the loaded code image. Dropping (or
/// [`close`](Self::close)) unloads the module; entry points resolved from
/// it must not be invoked afterwards.
pub struct Module {
    lib: Library,
    path: PathBuf,
}

impl Module {
    /// Load a module from a filesystem path.
    ///
    /// # Safety
    ///
    /// Loading a library executes its initialization routines. The module,
    /// and everything it links against, must be sound to load into this
    /// process.
    pub unsafe fn open(path: impl AsRef<Path>) -> Result<Self, BridgeError> {
        let path = path.as_ref();
        let lib = unsafe { Library::new(path) }.map_err(|source| BridgeError::Unavailable {
            path: path.to_owned(),
            source,
        })?;
        debug!("loaded backend module {}", path.display());
        Ok(Self {
            lib,
            path: path.to_owned(),
        })
    }

    /// Resolve a named export to a value of type `T`.
    ///
    /// An absent export is [`BridgeError::SymbolNotFound`]; it is never
    /// returned as a null address.
    ///
    /// # Safety
    ///
    /// `T` must be the correct function pointer type for the export. The
    /// returned pointer is only valid while this module stays loaded.
    pub unsafe fn resolve<T: Copy>(&self, name: &'static str) -> Result<T, BridgeError> {
        // dlsym can resolve a present export to a null address (an
        // unresolved weak symbol). Read the address as a plain pointer
        // first; null must never be copied into a fn pointer type.
        let addr: *mut c_void = *unsafe { self.lib.get::<*mut c_void>(name.as_bytes()) }
            .map_err(|source| BridgeError::SymbolNotFound {
                name,
                source: Some(source),
            })?;
        if addr.is_null() {
            return Err(BridgeError::SymbolNotFound { name, source: None });
        }
        let symbol = unsafe { self.lib.get::<T>(name.as_bytes()) }
            .map_err(|source| BridgeError::SymbolNotFound {
                name,
                source: Some(source),
            })?;
        debug!("resolved entry point `{}` in {}", name, self.path.display());
        Ok(*symbol)
    }

    /// Path the module was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Unload the module.
    ///
    /// Consuming `self` makes it impossible to resolve from, or hold, a
    /// closed handle. Dropping has the same effect without the log line.
    pub fn close(self) {
        debug!("closing backend module {}", self.path.display());
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Module({})", self.path.display())
    }
}
