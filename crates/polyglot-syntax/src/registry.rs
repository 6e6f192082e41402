//! Registry for readers and writers.

use crate::traits::{Reader, Writer};
use std::sync::{OnceLock, PoisonError, RwLock};

/// Global reader registry.
static READERS: RwLock<Vec<&'static dyn Reader>> = RwLock::new(Vec::new());
static READERS_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Global writer registry.
static WRITERS: RwLock<Vec<&'static dyn Writer>> = RwLock::new(Vec::new());
static WRITERS_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Register a custom reader. Later registrations do not shadow built-ins.
pub fn register_reader(reader: &'static dyn Reader) {
    READERS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .push(reader);
}

/// Register a custom writer.
pub fn register_writer(writer: &'static dyn Writer) {
    WRITERS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .push(writer);
}

fn init_readers() {
    READERS_INITIALIZED.get_or_init(|| {
        #[cfg(feature = "read-python")]
        register_reader(&crate::input::python::PYTHON_READER);
        #[cfg(feature = "read-javascript")]
        register_reader(&crate::input::javascript::JAVASCRIPT_READER);
        #[cfg(feature = "read-typescript")]
        register_reader(&crate::input::typescript::TYPESCRIPT_READER);
        #[cfg(feature = "read-java")]
        register_reader(&crate::input::java::JAVA_READER);
    });
}

fn init_writers() {
    WRITERS_INITIALIZED.get_or_init(|| {
        #[cfg(feature = "write-python")]
        register_writer(&crate::output::python::PYTHON_WRITER);
        #[cfg(feature = "write-javascript")]
        register_writer(&crate::output::javascript::JAVASCRIPT_WRITER);
        #[cfg(feature = "write-typescript")]
        register_writer(&crate::output::typescript::TYPESCRIPT_WRITER);
        #[cfg(feature = "write-java")]
        register_writer(&crate::output::java::JAVA_WRITER);
        #[cfg(feature = "write-haskell")]
        register_writer(&crate::output::haskell::HASKELL_WRITER);
    });
}

/// Get a reader by language name.
pub fn reader_for_language(lang: &str) -> Option<&'static dyn Reader> {
    readers().into_iter().find(|r| r.language() == lang)
}

/// Get a reader by file extension (without the dot).
pub fn reader_for_extension(ext: &str) -> Option<&'static dyn Reader> {
    readers()
        .into_iter()
        .find(|r| r.extensions().contains(&ext))
}

/// Get a writer by language name.
pub fn writer_for_language(lang: &str) -> Option<&'static dyn Writer> {
    writers().into_iter().find(|w| w.language() == lang)
}

/// Get a writer by output file extension.
pub fn writer_for_extension(ext: &str) -> Option<&'static dyn Writer> {
    writers().into_iter().find(|w| w.extension() == ext)
}

/// Get all registered readers.
pub fn readers() -> Vec<&'static dyn Reader> {
    init_readers();
    READERS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Get all registered writers.
pub fn writers() -> Vec<&'static dyn Writer> {
    init_writers();
    WRITERS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(feature = "read-javascript")]
    fn test_reader_lookup() {
        let reader = reader_for_language("javascript").expect("javascript reader");
        assert_eq!(reader.language(), "javascript");

        let reader = reader_for_extension("mjs").expect("mjs extension");
        assert_eq!(reader.language(), "javascript");
        assert!(reader_for_extension("hs").is_none());
    }

    #[test]
    #[cfg(feature = "write-haskell")]
    fn test_writer_lookup() {
        let writer = writer_for_language("haskell").expect("haskell writer");
        assert_eq!(writer.extension(), "hs");
        assert_eq!(
            writer_for_extension("hs").map(|w| w.language()),
            Some("haskell")
        );
        assert!(reader_for_language("haskell").is_none());
    }

    #[test]
    fn test_builtins_registered_once() {
        let first = readers().len();
        let _ = reader_for_language("python");
        assert_eq!(readers().len(), first);
    }

    #[test]
    #[cfg(all(feature = "read-typescript", feature = "write-python"))]
    fn test_roundtrip_via_registry() {
        let reader = reader_for_language("typescript").unwrap();
        let writer = writer_for_language("python").unwrap();

        let ast = reader.read("const x = 1 + 2;").unwrap();
        assert_eq!(writer.write(&ast), "x = 1 + 2");
    }
}
