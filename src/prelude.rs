// prelude.rs - Convenient re-exports for the context API.
//
//! # Prelude
//!
//! ```
//! use ferrocoll::prelude::*;
//!
//! let mut ctx: CollationContext<PortableEngine> = CollationContext::default();
//! let en = CharsetInfo::new(325, "en_US", 1);
//! assert_eq!(ctx.strnncollsp(&en, b"Apple", b"apple"), 0);
//! ```

pub use crate::cache::{CollationHandle, CollatorCache, SharedCollatorCache};
pub use crate::charset::{CharsetInfo, XfrmFlags};
pub use crate::config::CollationConfig;
pub use crate::context::CollationContext;
pub use crate::engine::{Collator, Engine};
pub use crate::engines::{DefaultEngine, PortableCollator, PortableEngine};
pub use crate::error::CollationError;
pub use crate::plugin::CollationHandler;
pub use crate::resolver::{ResolutionStrategy, Strength};
