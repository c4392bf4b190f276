/*!
 * XLIFF 1.2 document handling.
 *
 * - `dom`: mutable XML tree read and written with quick-xml
 * - `tokenizer`: inline markup to `__XLF_TAG_i__` tokens and back
 * - `processor`: per-unit document translation
 * - `logger`: audit log of skipped, failed and cached units
 */

pub mod dom;
pub mod logger;
pub mod processor;
pub mod tokenizer;

// Re-export main types
pub use dom::{XmlDocument, XmlElement, XmlNode};
pub use logger::{FileTranslationLogger, NullTranslationLogger, TranslationLogger};
pub use processor::{CancellationFlag, FileStats, ProcessingOptions, XLIFF_NS, XliffProcessor};
