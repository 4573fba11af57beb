//! Struct archiving functionality
//!
//! To add archiving functionality to a struct implement the `Archived` trait.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use std::path::Path;
use std::fs::{File, OpenOptions};
use csv::WriterBuilder;
pub use csv::Writer;
use serde::Serialize;
use thiserror::Error;

// Internal imports
use crate::session::Session;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An object used to write CSV archive files.
///
/// A default archiver has no file behind it and silently discards records,
/// which is how archiving is disabled.
#[derive(Default)]
pub struct Archiver {
    writer: Option<Writer<File>>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur while archiving.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Cannot create the archive file: {0}")]
    FileError(std::io::Error),

    #[error("Cannot write the archive record: {0}")]
    WriteError(csv::Error),

    #[error("Cannot flush the archive: {0}")]
    FlushError(std::io::Error),
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A trait which enables a struct to be archived as a csv.
///
/// To implement this trait, the struct shall have an `Archiver` member which
/// shall be setup in the struct's `init` or `new` functions. Records written
/// must be flat (no nested sequences or structs).
pub trait Archived {
    /// Write the archives for this struct
    fn write(&mut self) -> Result<(), ArchiveError>;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Archiver {
    /// Create a new archiver from a paricular path relative to the session's
    /// archive root.
    ///
    /// Any missing parent directories are created.
    pub fn from_path<P: AsRef<Path>>(
        session: &Session, path: P
    ) -> Result<Self, ArchiveError> {
        let mut session_path = session.arch_root.clone();
        session_path.push(path);

        if let Some(parent) = session_path.parent() {
            std::fs::create_dir_all(parent).map_err(ArchiveError::FileError)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(session_path)
            .map_err(ArchiveError::FileError)?;

        let w = WriterBuilder::new()
            .has_headers(true)
            .from_writer(file);

        Ok(Self {
            writer: Some(w)
        })
    }

    /// Serialise a record into the archive.
    pub fn serialise<T: Serialize>(
        &mut self, record: T
    ) -> Result<(), ArchiveError> {
        if let Some(ref mut w) = self.writer {
            w.serialize(record).map_err(ArchiveError::WriteError)?;
            w.flush().map_err(ArchiveError::FlushError)?;
        }

        Ok(())
    }
}
