//! Content classification and storage key derivation.
//!
//! Both functions are pure: the key and the binary/text treatment of a saved
//! payload depend only on the client-supplied name and the canvas flag, never
//! on the payload itself.
//!
//! ```
//! use story_store::naming::{derive_key, resolve_content_type};
//!
//! let kind = resolve_content_type("My Story", false);
//! assert_eq!(derive_key("My Story", kind.extension()), "My_Story.txt");
//! ```

mod content_type;
mod key;

pub use content_type::{resolve_content_type, ContentKind, PNG_CONTENT_TYPE, TEXT_CONTENT_TYPE};
pub use key::{derive_key, sanitize_name};
