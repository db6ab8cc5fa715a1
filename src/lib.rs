//! # Ferrocoll
//!
//! Locale-aware case mapping, comparison and sort keys for a host database's
//! pluggable charset framework.
//!
//! Ferrocoll is the glue between the host and a collation engine: it maps a
//! charset descriptor to a configured collator, caches one collator per
//! charset per worker, composes tailoring rules deterministically, and moves
//! strings between host buffers and the engine without ever writing past a
//! buffer's capacity.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::cmp::Ordering;
//! use ferrocoll::prelude::*;
//!
//! let mut ctx = CollationContext::new(PortableEngine, CollationConfig::default());
//! let nb = CharsetInfo::new(324, "nb_NO", 3);
//!
//! assert_eq!(ctx.compare(&nb, "å".as_bytes(), "z".as_bytes()).unwrap(), Ordering::Greater);
//!
//! let mut key = [0u8; 64];
//! let len = ctx.sort_key(&nb, b"fjord", &mut key, XfrmFlags::empty()).unwrap();
//! assert!(len <= key.len());
//! ```
//!
//! For non-default deployments, use [`CollationConfig::builder`](config::CollationConfig::builder):
//!
//! ```rust
//! use ferrocoll::prelude::*;
//!
//! let config = CollationConfig::builder()
//!     .strategy(ResolutionStrategy::Locale)
//!     .tailoring_prefix_size(1)
//!     .build()
//!     .unwrap();
//! let mut ctx = CollationContext::new(PortableEngine, config);
//! assert!(ctx.init(&CharsetInfo::new(2001, "fr-FR", 2)).is_ok());
//! ```
//!
//! ## Host Vtable and C ABI
//!
//! [`plugin::CollationHandler`] is the host's callback table (init, uninit,
//! caseup, casedn, strnncoll, strnncollsp, strnxfrm) implemented over a
//! context. [`capi`] exports the same table as `extern "C"` functions over a
//! per-thread context.
//!
//! ## Engines
//!
//! The default [`engines::PortableEngine`] is pure Rust. With the `icu`
//! feature, [`engines::DefaultEngine`] becomes the ICU4C-backed `IcuEngine`;
//! `build.rs` compiles the shim in `csrc/` and links the system ICU.
//!
//! ## Module Structure
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`tailoring`] | Tailoring prefix composition |
//! | [`tables`] | Built-in base rules per charset id and language |
//! | [`resolver`] | Charset to rules/locale and strength |
//! | [`engine`] | Engine and collator traits |
//! | [`engines`] | Portable and ICU4C engines |
//! | [`cache`] | Per-thread and process-wide collator caches |
//! | [`context`] | Per-worker context and string operations |
//! | [`bridge`] | Host buffer helpers |
//! | [`plugin`] | Host callback table |
//! | [`capi`] | C ABI entry points |
//! | [`charset`] | Charset descriptor and sort-key flags |
//! | [`config`] | Deployment configuration |
//! | [`error`] | Error type and status codes |

pub mod bridge;
pub mod cache;
pub mod capi;
pub mod charset;
pub mod config;
pub mod context;
pub mod engine;
pub mod engines;
pub mod error;
pub mod plugin;
pub mod prelude;
pub mod resolver;
pub mod tables;
pub mod tailoring;
