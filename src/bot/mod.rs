//! Server-side reply logic.
//!
//! # Architecture
//!
//! - [`DialogueEngine`]: picks a reply for a visitor's message
//! - [`KnowledgeBase`]: free-form questions answered from a JSON file
//! - [`intent`]: yes/no detection
//! - [`script`]: the scripted question sequence
//!
//! # Example
//!
//! ```rust
//! use chat_widget::bot::{DialogueEngine, KnowledgeBase};
//! use chat_widget::session::VisitorStore;
//!
//! let engine = DialogueEngine::new(KnowledgeBase::default(), VisitorStore::new());
//! let greeting = engine.reply("127.0.0.1", "");
//! assert!(!greeting.end);
//!
//! let bye = engine.reply("127.0.0.1", "no");
//! assert!(bye.end);
//! ```

mod engine;
pub mod intent;
mod knowledge;
pub mod script;

pub use engine::DialogueEngine;
pub use knowledge::{DEFAULT_CUTOFF, KnowledgeBase, KnowledgeEntry, similarity};
